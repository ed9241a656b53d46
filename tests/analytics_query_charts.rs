
use std::io::BufReader;
use std::process::{ChildStdin, ChildStdout};

use serde_json::json;
use test_support::{request_ok, spawn_sidecar, temp_dir, write_sample_csv};

fn loaded_sidecar() -> (
    std::process::Child,
    ChildStdin,
    BufReader<ChildStdout>,
) {
    let dir = temp_dir("gradelensd-charts");
    let csv_path = write_sample_csv(&dir);
    let (child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "load",
        "dataset.load",
        json!({ "path": csv_path.to_string_lossy() }),
    );
    (child, stdin, reader)
}

fn chart(result: &serde_json::Value) -> &serde_json::Value {
    result.get("chart").expect("chart payload")
}

fn labels(chart: &serde_json::Value) -> Vec<String> {
    chart
        .get("labels")
        .and_then(|v| v.as_array())
        .expect("labels")
        .iter()
        .map(|v| v.as_str().expect("label").to_string())
        .collect()
}

fn data(chart: &serde_json::Value) -> Vec<f64> {
    chart
        .get("data")
        .and_then(|v| v.as_array())
        .expect("data")
        .iter()
        .map(|v| v.as_f64().expect("number"))
        .collect()
}

#[test]
fn branch_comparison_emits_three_aligned_series() {
    let (_child, mut stdin, mut reader) = loaded_sidecar();

    let result = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "analytics.query",
        json!({ "chartKind": "branch_comparison" }),
    );
    let chart = chart(&result);
    assert_eq!(labels(chart), vec!["School b1", "School b2"]);

    let datasets = chart
        .get("datasets")
        .and_then(|v| v.as_array())
        .expect("datasets");
    assert_eq!(datasets.len(), 3);

    let series: Vec<(String, Vec<f64>)> = datasets
        .iter()
        .map(|d| {
            (
                d.get("label").and_then(|v| v.as_str()).unwrap().to_string(),
                data(d),
            )
        })
        .collect();
    assert_eq!(
        series,
        vec![
            ("Failed".to_string(), vec![1.0, 0.0]),
            ("Remedial".to_string(), vec![1.0, 1.0]),
            ("Approved".to_string(), vec![1.0, 1.0]),
        ]
    );
    // Default single series is the failed counts.
    assert_eq!(data(chart), vec![1.0, 0.0]);
    for d in datasets {
        assert!(d.get("color").and_then(|v| v.as_str()).is_some());
    }
}

#[test]
fn subject_average_sorts_descending_by_mean() {
    let (_child, mut stdin, mut reader) = loaded_sidecar();

    let result = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "analytics.query",
        json!({ "chartKind": "subject_average" }),
    );
    let chart = chart(&result);
    assert_eq!(labels(chart), vec!["Math", "History"]);
    assert_eq!(data(chart), vec![8.5, 6.4]);
}

#[test]
fn status_distribution_counts_distinct_students() {
    let (_child, mut stdin, mut reader) = loaded_sidecar();

    let result = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "analytics.query",
        json!({ "chartKind": "student_status_distribution" }),
    );
    let chart = chart(&result);
    // Remedial and Approved tie at 2; Remedial was seen first (s2 < s3).
    assert_eq!(labels(chart), vec!["Remedial", "Approved", "Failed"]);
    assert_eq!(data(chart), vec![2.0, 2.0, 1.0]);
}

#[test]
fn grade_by_type_sorts_labels_ascending() {
    let (_child, mut stdin, mut reader) = loaded_sidecar();

    let result = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "analytics.query",
        json!({ "chartKind": "grade_by_type" }),
    );
    let chart = chart(&result);
    assert_eq!(labels(chart), vec!["FINAL", "P1", "P2", "P3", "P4"]);
    assert_eq!(data(chart), vec![6.67, 8.0, 7.6, 9.0, 10.0]);
}

#[test]
fn score_bands_count_students_not_records() {
    let (_child, mut stdin, mut reader) = loaded_sidecar();

    let result = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "analytics.query",
        json!({ "chartKind": "score_band_distribution" }),
    );
    let chart = chart(&result);
    assert_eq!(
        labels(chart),
        vec![
            "Critical (0-4)",
            "Remedial (4-6)",
            "Good (6-8)",
            "Excellent (8-10)"
        ]
    );
    // s5 critical; s1+s2 in remedial band; s2+s3 good; s1,s3,s4,s5 excellent.
    assert_eq!(data(chart), vec![1.0, 2.0, 2.0, 4.0]);
}

#[test]
fn omitted_chart_kind_defaults_to_score_bands() {
    let (_child, mut stdin, mut reader) = loaded_sidecar();

    let result = request_ok(&mut stdin, &mut reader, "1", "analytics.query", json!({}));
    assert_eq!(
        chart(&result).get("title").and_then(|v| v.as_str()),
        Some("Students per performance band")
    );
}

#[test]
fn unrecognized_chart_kind_degrades_to_fixed_payload() {
    let (_child, mut stdin, mut reader) = loaded_sidecar();

    let result = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "analytics.query",
        json!({ "chartKind": "word_cloud" }),
    );
    let chart = chart(&result);
    assert_eq!(
        chart.get("title").and_then(|v| v.as_str()),
        Some("Unrecognized chart type")
    );
    assert!(labels(chart).is_empty());
    assert!(data(chart).is_empty());
}

#[test]
fn identical_queries_return_identical_payloads() {
    let (_child, mut stdin, mut reader) = loaded_sidecar();

    let params = json!({
        "filters": { "branch": "b1" },
        "chartKind": "branch_comparison"
    });
    let first = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "analytics.query",
        params.clone(),
    );
    let second = request_ok(&mut stdin, &mut reader, "2", "analytics.query", params);
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn report_echoes_applied_filters() {
    let (_child, mut stdin, mut reader) = loaded_sidecar();

    let result = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "analytics.report",
        json!({
            "filters": { "branch": "b1", "subject": "Math" },
            "chartKind": "subject_average"
        }),
    );
    assert_eq!(
        result.get("title").and_then(|v| v.as_str()),
        Some("Grade analysis report")
    );
    assert_eq!(
        result.get("appliedFilters"),
        Some(&json!({ "branch": "b1", "subject": "Math" }))
    );
    assert!(result.get("chart").is_some());
    assert!(result.get("statistics").is_some());

    // b1 Math rows belong to s1 and s3 only.
    let stats = result.get("statistics").unwrap();
    assert_eq!(stats.get("totalRecords").and_then(|v| v.as_u64()), Some(8));
    assert_eq!(stats.get("totalStudents").and_then(|v| v.as_u64()), Some(2));
}
