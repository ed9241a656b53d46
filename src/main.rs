mod charts;
mod classify;
mod dataset;
mod filter;
mod ipc;
mod stats;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};

fn main() -> Result<()> {
    env_logger::init();

    let mut state = ipc::AppState::new();

    // Optional preload: argv[1] is a dataset path loaded before the first
    // request. A failed preload installs the empty dataset so queries
    // degrade to zero payloads instead of erroring.
    if let Some(arg) = std::env::args().nth(1) {
        let path = PathBuf::from(arg);
        match dataset::load_dataset(&path) {
            Ok(ds) => {
                log::info!(
                    "loaded {} records ({} students) from {}",
                    ds.record_count(),
                    ds.student_count(),
                    path.display()
                );
                state.dataset = Some(ds);
            }
            Err(e) => {
                log::error!("dataset preload failed: {}", e);
                state.dataset = Some(dataset::GradeDataset::empty());
            }
        }
        state.dataset_path = Some(path);
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = line.context("reading request line")?;
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // Can't reply without an id; report and move on.
                let _ = writeln!(
                    stdout,
                    "{{\"ok\":false,\"error\":{{\"code\":\"bad_json\",\"message\":\"{}\"}}}}",
                    e
                );
                let _ = stdout.flush();
                continue;
            }
        };

        let resp = ipc::handle_request(&mut state, req);
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }

    Ok(())
}
