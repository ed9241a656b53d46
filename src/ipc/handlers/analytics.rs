use std::collections::BTreeSet;

use serde_json::json;

use crate::charts;
use crate::dataset::GradeDataset;
use crate::filter::{self, RecordFilters};
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::stats;

const DEFAULT_CHART_KIND: &str = "score_band_distribution";

const STATUS_OPTIONS: [&str; 3] = ["Approved", "Remedial", "Failed"];

fn dataset<'a>(state: &'a AppState, req: &Request) -> Result<&'a GradeDataset, serde_json::Value> {
    state
        .dataset
        .as_ref()
        .ok_or_else(|| err(&req.id, "no_dataset", "load a dataset first", None))
}

fn parse_filters(req: &Request) -> Result<RecordFilters, serde_json::Value> {
    filter::parse_record_filters(req.params.get("filters"))
        .map_err(|e| err(&req.id, &e.code, e.message, e.details))
}

fn parse_chart_kind(req: &Request) -> Result<String, serde_json::Value> {
    match req.params.get("chartKind") {
        None => Ok(DEFAULT_CHART_KIND.to_string()),
        Some(v) if v.is_null() => Ok(DEFAULT_CHART_KIND.to_string()),
        Some(v) => v
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| err(&req.id, "bad_params", "chartKind must be a string", None)),
    }
}

fn handle_query(state: &mut AppState, req: &Request) -> serde_json::Value {
    let ds = match dataset(state, req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let filters = match parse_filters(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let chart_kind = match parse_chart_kind(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let subset = filter::apply_filters(&ds.records, &filters);
    log::debug!(
        "query chartKind={} matched {} of {} records",
        chart_kind,
        subset.len(),
        ds.record_count()
    );

    let chart = charts::build_chart(&subset, &chart_kind);
    let statistics = stats::compute_statistics(&subset);
    ok(
        &req.id,
        json!({
            "chart": chart,
            "statistics": statistics,
        }),
    )
}

fn handle_report(state: &mut AppState, req: &Request) -> serde_json::Value {
    let ds = match dataset(state, req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let filters = match parse_filters(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let chart_kind = match parse_chart_kind(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let subset = filter::apply_filters(&ds.records, &filters);
    let chart = charts::build_chart(&subset, &chart_kind);
    let statistics = stats::compute_statistics(&subset);
    ok(
        &req.id,
        json!({
            "title": "Grade analysis report",
            "appliedFilters": filters,
            "chart": chart,
            "statistics": statistics,
        }),
    )
}

fn handle_filter_options(state: &mut AppState, req: &Request) -> serde_json::Value {
    let ds = match dataset(state, req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let mut branches = BTreeSet::new();
    let mut class_labels = BTreeSet::new();
    let mut subjects = BTreeSet::new();
    let mut assessment_types = BTreeSet::new();
    for r in &ds.records {
        branches.insert(r.branch_id.as_str());
        class_labels.insert(r.class_label.as_str());
        subjects.insert(r.subject_name.as_str());
        assessment_types.insert(r.assessment_type.as_str());
    }

    ok(
        &req.id,
        json!({
            "branches": branches,
            "classLabels": class_labels,
            "subjects": subjects,
            "assessmentTypes": assessment_types,
            "statuses": STATUS_OPTIONS,
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "analytics.query" => Some(handle_query(state, req)),
        "analytics.report" => Some(handle_report(state, req)),
        "filters.options" => Some(handle_filter_options(state, req)),
        _ => None,
    }
}
