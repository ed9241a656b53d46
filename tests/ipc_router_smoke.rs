
use serde_json::json;
use test_support::{request_err, request_ok, spawn_sidecar, temp_dir, write_sample_csv};

#[test]
fn health_reports_version_and_empty_state() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let health = request_ok(&mut stdin, &mut reader, "1", "health", json!({}));
    assert_eq!(
        health.get("version").and_then(|v| v.as_str()),
        Some(env!("CARGO_PKG_VERSION"))
    );
    assert!(health
        .get("datasetPath")
        .map(|v| v.is_null())
        .unwrap_or(false));
    assert_eq!(health.get("recordCount").and_then(|v| v.as_u64()), Some(0));
}

#[test]
fn unknown_method_is_not_implemented() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let error = request_err(&mut stdin, &mut reader, "1", "grades.mutate", json!({}));
    assert_eq!(
        error.get("code").and_then(|v| v.as_str()),
        Some("not_implemented")
    );
}

#[test]
fn query_without_dataset_is_rejected() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let error = request_err(&mut stdin, &mut reader, "1", "analytics.query", json!({}));
    assert_eq!(
        error.get("code").and_then(|v| v.as_str()),
        Some("no_dataset")
    );

    let error = request_err(&mut stdin, &mut reader, "2", "filters.options", json!({}));
    assert_eq!(
        error.get("code").and_then(|v| v.as_str()),
        Some("no_dataset")
    );
}

#[test]
fn health_reflects_loaded_dataset() {
    let dir = temp_dir("gradelensd-smoke");
    let csv_path = write_sample_csv(&dir);
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let loaded = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "dataset.load",
        json!({ "path": csv_path.to_string_lossy() }),
    );
    assert_eq!(loaded.get("recordCount").and_then(|v| v.as_u64()), Some(15));
    assert_eq!(loaded.get("studentCount").and_then(|v| v.as_u64()), Some(5));

    let health = request_ok(&mut stdin, &mut reader, "2", "health", json!({}));
    assert_eq!(health.get("recordCount").and_then(|v| v.as_u64()), Some(15));
    assert_eq!(
        health.get("datasetPath").and_then(|v| v.as_str()),
        Some(csv_path.to_string_lossy().as_ref())
    );
}
