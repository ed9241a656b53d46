use std::path::PathBuf;

use serde_json::json;

use crate::dataset::{self, GradeDataset};
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "datasetPath": state
                .dataset_path
                .as_ref()
                .map(|p| p.to_string_lossy().to_string()),
            "recordCount": state.dataset.as_ref().map(|d| d.record_count()).unwrap_or(0),
        }),
    )
}

fn handle_dataset_load(state: &mut AppState, req: &Request) -> serde_json::Value {
    let p = req
        .params
        .get("path")
        .and_then(|v| v.as_str())
        .map(PathBuf::from);
    let Some(path) = p else {
        return err(&req.id, "bad_params", "missing params.path", None);
    };

    match dataset::load_dataset(&path) {
        Ok(ds) => {
            log::info!(
                "loaded {} records ({} students) from {}",
                ds.record_count(),
                ds.student_count(),
                path.display()
            );
            let counts = json!({
                "recordCount": ds.record_count(),
                "studentCount": ds.student_count(),
            });
            state.dataset_path = Some(path);
            state.dataset = Some(ds);
            ok(&req.id, counts)
        }
        Err(e) => {
            // A failed load must never leave a populated-looking dataset
            // behind; queries degrade to zero payloads instead.
            log::error!("dataset load failed: {}", e);
            state.dataset_path = Some(path);
            state.dataset = Some(GradeDataset::empty());
            err(&req.id, "load_failed", e.to_string(), None)
        }
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "dataset.load" => Some(handle_dataset_load(state, req)),
        _ => None,
    }
}
