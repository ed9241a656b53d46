use std::collections::HashSet;

use serde::Serialize;

use crate::charts::round2;
use crate::dataset::{GradeRecord, StudentStatus};

/// Dataset-level descriptive statistics for a filtered subset. Record
/// counts are per row; every status figure counts distinct students.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_records: usize,
    pub overall_mean: f64,
    pub max_grade: f64,
    pub min_grade: f64,
    pub total_students: usize,
    pub approved: usize,
    pub remedial: usize,
    pub failed: usize,
}

impl Statistics {
    pub fn zero() -> Self {
        Self {
            total_records: 0,
            overall_mean: 0.0,
            max_grade: 0.0,
            min_grade: 0.0,
            total_students: 0,
            approved: 0,
            remedial: 0,
            failed: 0,
        }
    }
}

pub fn compute_statistics(records: &[&GradeRecord]) -> Statistics {
    if records.is_empty() {
        return Statistics::zero();
    }

    let mut sum = 0.0;
    let mut max = f64::NEG_INFINITY;
    let mut min = f64::INFINITY;
    for r in records {
        sum += r.grade_value;
        max = max.max(r.grade_value);
        min = min.min(r.grade_value);
    }

    // First-seen status per student, so a student with many rows still
    // contributes exactly one to each status figure.
    let mut seen: HashSet<&str> = HashSet::new();
    let mut approved = 0;
    let mut remedial = 0;
    let mut failed = 0;
    for r in records {
        if seen.insert(r.student_id.as_str()) {
            match r.student_status {
                StudentStatus::Approved => approved += 1,
                StudentStatus::Remedial => remedial += 1,
                StudentStatus::Failed => failed += 1,
            }
        }
    }

    Statistics {
        total_records: records.len(),
        overall_mean: round2(sum / records.len() as f64),
        max_grade: round2(max),
        min_grade: round2(min),
        total_students: seen.len(),
        approved,
        remedial,
        failed,
    }
}
