use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::classify;

pub const REQUIRED_COLUMNS: [&str; 8] = [
    "record_id",
    "student_id",
    "grade_value",
    "branch_id",
    "class_title",
    "grade_level_name",
    "subject_name",
    "assessment_type",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StudentStatus {
    Approved,
    Remedial,
    Failed,
}

impl StudentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            StudentStatus::Approved => "Approved",
            StudentStatus::Remedial => "Remedial",
            StudentStatus::Failed => "Failed",
        }
    }

    pub fn parse(s: &str) -> Option<StudentStatus> {
        match s {
            "Approved" => Some(StudentStatus::Approved),
            "Remedial" => Some(StudentStatus::Remedial),
            "Failed" => Some(StudentStatus::Failed),
            _ => None,
        }
    }
}

/// One row of the source file: a single (student, assessment-type) grade.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeRecord {
    pub record_id: String,
    pub student_id: String,
    pub grade_value: f64,
    pub branch_id: String,
    pub class_title: String,
    pub grade_level_name: String,
    pub subject_name: String,
    pub assessment_type: String,
    /// Derived at load: `grade_level_name + " - " + class_title`.
    pub class_label: String,
    /// Back-filled after the classification pass; identical across all
    /// records sharing a `student_id`.
    pub student_status: StudentStatus,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot open dataset {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: csv::Error,
    },
    #[error("dataset is missing required column '{name}'")]
    MissingColumn { name: String },
    #[error("dataset row {row}: {source}")]
    Row {
        row: usize,
        #[source]
        source: csv::Error,
    },
    #[error("dataset row {row}: grade value '{value}' is not a number")]
    BadGradeValue { row: usize, value: String },
}

/// The loaded record set plus the per-student status side table.
///
/// Immutable after `load_dataset` returns; every query path borrows
/// records out of it and never writes back.
#[derive(Debug, Default)]
pub struct GradeDataset {
    pub records: Vec<GradeRecord>,
    pub status_by_student: HashMap<String, StudentStatus>,
}

impl GradeDataset {
    /// The explicit empty-but-valid dataset installed when a load fails.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    pub fn student_count(&self) -> usize {
        self.status_by_student.len()
    }
}

/// Load a grade dataset from a CSV file, trim its text fields, derive
/// `class_label`, and run the one-time classification pass.
///
/// Fails whole: on any error the caller gets `Err` and must fall back to
/// `GradeDataset::empty()` rather than keep a partial set.
pub fn load_dataset(path: &Path) -> Result<GradeDataset, LoadError> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| LoadError::Open {
        path: path.display().to_string(),
        source: e,
    })?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| LoadError::Row { row: 0, source: e })?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut col = HashMap::new();
    for name in REQUIRED_COLUMNS {
        let idx = headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| LoadError::MissingColumn {
                name: name.to_string(),
            })?;
        col.insert(name, idx);
    }

    let field = |rec: &csv::StringRecord, name: &str| -> String {
        rec.get(col[name]).unwrap_or("").trim().to_string()
    };

    let mut records = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let row = i + 1;
        let rec = result.map_err(|e| LoadError::Row { row, source: e })?;

        let raw_grade = field(&rec, "grade_value");
        let grade_value = raw_grade
            .parse::<f64>()
            .map_err(|_| LoadError::BadGradeValue {
                row,
                value: raw_grade.clone(),
            })?;

        let class_title = field(&rec, "class_title");
        let grade_level_name = field(&rec, "grade_level_name");
        let class_label = format!("{} - {}", grade_level_name, class_title);

        records.push(GradeRecord {
            record_id: field(&rec, "record_id"),
            student_id: field(&rec, "student_id"),
            grade_value,
            branch_id: field(&rec, "branch_id"),
            class_title,
            grade_level_name,
            subject_name: field(&rec, "subject_name"),
            assessment_type: field(&rec, "assessment_type"),
            class_label,
            // Placeholder until the classification pass below.
            student_status: StudentStatus::Approved,
        });
    }

    let status_by_student = classify::classify_students(&records);
    for r in &mut records {
        if let Some(status) = status_by_student.get(&r.student_id) {
            r.student_status = *status;
        }
    }

    Ok(GradeDataset {
        records,
        status_by_student,
    })
}
