use serde::{Deserialize, Serialize};

use crate::dataset::GradeRecord;

#[derive(Debug, Clone, Serialize)]
pub struct QueryError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl QueryError {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            details: None,
        }
    }
}

/// Closed set of filterable columns. Every field is an exact-equality
/// predicate on the already-trimmed record value; unset fields apply no
/// predicate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assessment_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

const FILTER_KEYS: [&str; 5] = [
    "branch",
    "classLabel",
    "subject",
    "assessmentType",
    "status",
];

fn optional_field(
    obj: &serde_json::Map<String, serde_json::Value>,
    key: &str,
) -> Result<Option<String>, QueryError> {
    match obj.get(key) {
        None => Ok(None),
        Some(v) if v.is_null() => Ok(None),
        Some(v) => {
            let Some(s) = v.as_str() else {
                return Err(QueryError::new(
                    "bad_params",
                    format!("filters.{} must be string or null", key),
                ));
            };
            let t = s.trim();
            if t.is_empty() {
                Ok(None)
            } else {
                Ok(Some(t.to_string()))
            }
        }
    }
}

/// Parse the caller's filter object. Absent object means no filters.
/// Unknown keys are rejected here, at the boundary, so the engine itself
/// only ever sees the closed field set.
pub fn parse_record_filters(
    raw: Option<&serde_json::Value>,
) -> Result<RecordFilters, QueryError> {
    let Some(raw) = raw else {
        return Ok(RecordFilters::default());
    };
    if raw.is_null() {
        return Ok(RecordFilters::default());
    }
    let Some(obj) = raw.as_object() else {
        return Err(QueryError::new("bad_params", "filters must be an object"));
    };

    if let Some(unknown) = obj.keys().find(|k| !FILTER_KEYS.contains(&k.as_str())) {
        return Err(QueryError::new(
            "bad_params",
            format!(
                "unknown filter field '{}'; expected one of: {}",
                unknown,
                FILTER_KEYS.join(", ")
            ),
        ));
    }

    Ok(RecordFilters {
        branch: optional_field(obj, "branch")?,
        class_label: optional_field(obj, "classLabel")?,
        subject: optional_field(obj, "subject")?,
        assessment_type: optional_field(obj, "assessmentType")?,
        status: optional_field(obj, "status")?,
    })
}

/// Apply the filter conjunction, borrowing matching records out of the
/// immutable dataset. An empty filter set returns every record.
pub fn apply_filters<'a>(
    records: &'a [GradeRecord],
    filters: &RecordFilters,
) -> Vec<&'a GradeRecord> {
    records
        .iter()
        .filter(|r| {
            filters.branch.as_deref().map_or(true, |v| r.branch_id == v)
                && filters
                    .class_label
                    .as_deref()
                    .map_or(true, |v| r.class_label == v)
                && filters
                    .subject
                    .as_deref()
                    .map_or(true, |v| r.subject_name == v)
                && filters
                    .assessment_type
                    .as_deref()
                    .map_or(true, |v| r.assessment_type == v)
                && filters
                    .status
                    .as_deref()
                    .map_or(true, |v| r.student_status.as_str() == v)
        })
        .collect()
}
