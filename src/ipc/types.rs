use std::path::PathBuf;

use serde::Deserialize;

use crate::dataset::GradeDataset;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub dataset_path: Option<PathBuf>,
    /// Loaded once, read-only afterwards. A reload replaces the whole
    /// value; nothing mutates it in place.
    pub dataset: Option<GradeDataset>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            dataset_path: None,
            dataset: None,
        }
    }
}
