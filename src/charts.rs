use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::dataset::{GradeRecord, StudentStatus};

pub const NO_DATA_TITLE: &str = "No data for the selected filters";
pub const UNRECOGNIZED_TITLE: &str = "Unrecognized chart type";

const SCHOOL_LABEL_PREFIX: &str = "School";

const FAILED_COLOR: &str = "rgba(220, 53, 69, 0.7)";
const REMEDIAL_COLOR: &str = "rgba(255, 193, 7, 0.7)";
const APPROVED_COLOR: &str = "rgba(40, 167, 69, 0.7)";

/// Chart-ready aggregate: aligned label/value lists plus optional named
/// series for grouped views.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPayload {
    pub labels: Vec<String>,
    pub data: Vec<f64>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datasets: Option<Vec<ChartSeries>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSeries {
    pub label: String,
    pub data: Vec<f64>,
    pub color: String,
}

impl ChartPayload {
    fn flat(labels: Vec<String>, data: Vec<f64>, title: &str) -> Self {
        Self {
            labels,
            data,
            title: title.to_string(),
            datasets: None,
        }
    }

    pub fn no_data() -> Self {
        Self::flat(Vec::new(), Vec::new(), NO_DATA_TITLE)
    }

    pub fn unrecognized() -> Self {
        Self::flat(Vec::new(), Vec::new(), UNRECOGNIZED_TITLE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    BranchComparison,
    SubjectAverage,
    StudentStatusDistribution,
    GradeByType,
    ScoreBandDistribution,
}

impl ChartKind {
    pub fn parse(s: &str) -> Option<ChartKind> {
        match s {
            "branch_comparison" => Some(ChartKind::BranchComparison),
            "subject_average" => Some(ChartKind::SubjectAverage),
            "student_status_distribution" => Some(ChartKind::StudentStatusDistribution),
            "grade_by_type" => Some(ChartKind::GradeByType),
            "score_band_distribution" => Some(ChartKind::ScoreBandDistribution),
            _ => None,
        }
    }
}

/// 2-decimal rounding applied to every mean the aggregator emits.
pub fn round2(x: f64) -> f64 {
    (100.0 * x).round() / 100.0
}

/// One record per student, first in input order. Status counting is
/// per student, never per row, so grouped views dedupe through this.
fn first_record_per_student<'a>(records: &[&'a GradeRecord]) -> Vec<&'a GradeRecord> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for r in records {
        if seen.insert(r.student_id.as_str()) {
            out.push(*r);
        }
    }
    out
}

/// Build the chart payload for a filtered subset. Degrades rather than
/// errs: empty input and unknown kinds both return fixed payloads.
pub fn build_chart(records: &[&GradeRecord], kind: &str) -> ChartPayload {
    if records.is_empty() {
        return ChartPayload::no_data();
    }
    match ChartKind::parse(kind) {
        Some(ChartKind::BranchComparison) => branch_comparison(records),
        Some(ChartKind::SubjectAverage) => subject_average(records),
        Some(ChartKind::StudentStatusDistribution) => student_status_distribution(records),
        Some(ChartKind::GradeByType) => grade_by_type(records),
        Some(ChartKind::ScoreBandDistribution) => score_band_distribution(records),
        None => ChartPayload::unrecognized(),
    }
}

fn branch_comparison(records: &[&GradeRecord]) -> ChartPayload {
    // Indexed [failed, remedial, approved]; branches sorted ascending.
    let mut per_branch: BTreeMap<&str, [u64; 3]> = BTreeMap::new();
    for r in first_record_per_student(records) {
        let counts = per_branch.entry(r.branch_id.as_str()).or_insert([0; 3]);
        match r.student_status {
            StudentStatus::Failed => counts[0] += 1,
            StudentStatus::Remedial => counts[1] += 1,
            StudentStatus::Approved => counts[2] += 1,
        }
    }

    let labels: Vec<String> = per_branch
        .keys()
        .map(|b| format!("{} {}", SCHOOL_LABEL_PREFIX, b))
        .collect();
    let failed: Vec<f64> = per_branch.values().map(|c| c[0] as f64).collect();
    let remedial: Vec<f64> = per_branch.values().map(|c| c[1] as f64).collect();
    let approved: Vec<f64> = per_branch.values().map(|c| c[2] as f64).collect();

    ChartPayload {
        labels,
        // Default single series shows the failed counts.
        data: failed.clone(),
        title: "Branch comparison (Failed, Remedial and Approved)".to_string(),
        datasets: Some(vec![
            ChartSeries {
                label: "Failed".to_string(),
                data: failed,
                color: FAILED_COLOR.to_string(),
            },
            ChartSeries {
                label: "Remedial".to_string(),
                data: remedial,
                color: REMEDIAL_COLOR.to_string(),
            },
            ChartSeries {
                label: "Approved".to_string(),
                data: approved,
                color: APPROVED_COLOR.to_string(),
            },
        ]),
    }
}

fn subject_average(records: &[&GradeRecord]) -> ChartPayload {
    let mut sums: BTreeMap<&str, (f64, u64)> = BTreeMap::new();
    for r in records {
        let entry = sums.entry(r.subject_name.as_str()).or_insert((0.0, 0));
        entry.0 += r.grade_value;
        entry.1 += 1;
    }

    // BTreeMap gives ascending subject order; the stable sort below keeps
    // that order for equal means.
    let mut averages: Vec<(&str, f64)> = sums
        .into_iter()
        .map(|(subject, (sum, count))| (subject, round2(sum / count as f64)))
        .collect();
    averages.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    ChartPayload::flat(
        averages.iter().map(|(s, _)| s.to_string()).collect(),
        averages.iter().map(|(_, avg)| *avg).collect(),
        "Average grade by subject",
    )
}

fn student_status_distribution(records: &[&GradeRecord]) -> ChartPayload {
    // Categories accumulate in first-seen order, then a stable sort puts
    // the biggest count first; ties keep first-seen order.
    let mut counts: Vec<(StudentStatus, u64)> = Vec::new();
    for r in first_record_per_student(records) {
        match counts.iter_mut().find(|(s, _)| *s == r.student_status) {
            Some((_, n)) => *n += 1,
            None => counts.push((r.student_status, 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    ChartPayload::flat(
        counts.iter().map(|(s, _)| s.as_str().to_string()).collect(),
        counts.iter().map(|(_, n)| *n as f64).collect(),
        "Student status (distinct students)",
    )
}

fn grade_by_type(records: &[&GradeRecord]) -> ChartPayload {
    let mut sums: BTreeMap<&str, (f64, u64)> = BTreeMap::new();
    for r in records {
        let entry = sums.entry(r.assessment_type.as_str()).or_insert((0.0, 0));
        entry.0 += r.grade_value;
        entry.1 += 1;
    }

    ChartPayload::flat(
        sums.keys().map(|t| t.to_string()).collect(),
        sums.values()
            .map(|(sum, count)| round2(sum / *count as f64))
            .collect(),
        "Average grade by assessment type",
    )
}

const BAND_LABELS: [&str; 4] = [
    "Critical (0-4)",
    "Remedial (4-6)",
    "Good (6-8)",
    "Excellent (8-10)",
];

/// Band index for a grade. Lowest bound inclusive, every upper edge
/// inclusive; values outside [0, 10] land in no band.
fn band_index(grade: f64) -> Option<usize> {
    if !(0.0..=10.0).contains(&grade) {
        return None;
    }
    if grade <= 4.0 {
        Some(0)
    } else if grade <= 6.0 {
        Some(1)
    } else if grade <= 8.0 {
        Some(2)
    } else {
        Some(3)
    }
}

fn score_band_distribution(records: &[&GradeRecord]) -> ChartPayload {
    let mut students_per_band: [HashSet<&str>; 4] = Default::default();
    for r in records {
        if let Some(idx) = band_index(r.grade_value) {
            students_per_band[idx].insert(r.student_id.as_str());
        }
    }

    ChartPayload::flat(
        BAND_LABELS.iter().map(|l| l.to_string()).collect(),
        students_per_band.iter().map(|s| s.len() as f64).collect(),
        "Students per performance band",
    )
}
