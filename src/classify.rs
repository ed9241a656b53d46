use std::collections::HashMap;

use crate::dataset::{GradeRecord, StudentStatus};

/// Grades below this value fail the assessment they belong to.
pub const PASSING_GRADE: f64 = 6.0;

pub const FINAL_TAG: &str = "FINAL";
pub const PERIODIC_TAGS: [&str; 4] = ["P1", "P2", "P3", "P4"];

#[derive(Debug, Default)]
struct StudentGrades {
    final_grade: Option<f64>,
    periodic: Vec<f64>,
}

/// Compute one status per student from the full record set.
///
/// The rule is a per-student aggregate, not a per-row one:
/// - `FINAL < 6` fails the student outright, periodic grades ignored;
/// - otherwise any periodic grade `< 6` puts the student in remedial;
/// - otherwise the student is approved, including students with no
///   recognized assessment rows at all (absence-of-failure default).
///
/// Records are scanned in input order and the first `FINAL` row per
/// student wins, so duplicate finals resolve deterministically.
pub fn classify_students(records: &[GradeRecord]) -> HashMap<String, StudentStatus> {
    let mut grades: HashMap<String, StudentGrades> = HashMap::new();
    let mut seen_order: Vec<String> = Vec::new();

    for r in records {
        if !grades.contains_key(&r.student_id) {
            seen_order.push(r.student_id.clone());
        }
        let entry = grades.entry(r.student_id.clone()).or_default();
        if r.assessment_type == FINAL_TAG {
            if entry.final_grade.is_none() {
                entry.final_grade = Some(r.grade_value);
            }
        } else if PERIODIC_TAGS.contains(&r.assessment_type.as_str()) {
            entry.periodic.push(r.grade_value);
        }
    }

    let mut out = HashMap::with_capacity(grades.len());
    for student_id in seen_order {
        let g = &grades[&student_id];
        let status = match g.final_grade {
            Some(f) if f < PASSING_GRADE => StudentStatus::Failed,
            _ => {
                if g.periodic.iter().any(|v| *v < PASSING_GRADE) {
                    StudentStatus::Remedial
                } else {
                    StudentStatus::Approved
                }
            }
        };
        out.insert(student_id, status);
    }
    out
}
