use std::cmp::Ordering;
use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::error::GpaError;
use crate::grade::Grade;
use crate::models::{CgpaPoint, GpaResults, ResultRow, SemesterGpa, SemesterResult, SubjectEntry};
use crate::validate::{validate_entry, ValidEntry};

/// Shown in place of a GPA when there are no credits to divide by.
pub const NO_GPA: &str = "-";
/// Overall GPA reported when nothing carries credit.
pub const ZERO_GPA: &str = "0";

/// Validates every entry, then scores and aggregates them. Any invalid row
/// fails the whole calculation; the valid rows are not scored on their own.
pub fn calculate_gpa(entries: &[SubjectEntry]) -> Result<GpaResults, GpaError> {
    let mut issues = Vec::new();
    let mut rows = Vec::with_capacity(entries.len());

    for (position, entry) in entries.iter().enumerate() {
        match validate_entry(entry) {
            Ok(valid) => rows.push(score_row(position + 1, entry, valid)),
            Err(issue) => issues.push((position + 1, issue)),
        }
    }

    if !issues.is_empty() {
        warn!(invalid = issues.len(), total = entries.len(), "rejected subject rows");
        return Err(GpaError::from_issues(issues));
    }

    let results = assemble(rows);
    debug!(
        rows = results.rows.len(),
        semesters = results.semester_results.len(),
        gpa = %results.gpa,
        "calculated gpa"
    );
    Ok(results)
}

pub fn score_row(index: usize, entry: &SubjectEntry, valid: ValidEntry) -> ResultRow {
    ResultRow {
        index,
        subject_code: entry.code.trim().to_string(),
        semester: entry.semester.trim().to_string(),
        name: valid.display_name,
        credits: valid.credits,
        grade: valid.grade,
        score: valid.credits * valid.grade.points(),
    }
}

/// Three decimals of the exact binary value. Exact ties round up, which
/// `{:.3}` alone would send to even.
pub fn format_gpa(value: f64) -> String {
    let exact = format!("{value:.60}");
    let beyond = exact
        .split_once('.')
        .map_or("", |(_, fraction)| &fraction[3..]);
    let is_tie = beyond.starts_with('5') && beyond[1..].bytes().all(|digit| digit == b'0');

    if is_tie && value > 0.0 {
        format!("{:.3}", f64::from_bits(value.to_bits() + 1))
    } else {
        format!("{value:.3}")
    }
}

/// `score / credits` formatted, or `None` when there is no credit.
pub fn ratio(total_score: f64, total_credits: f64) -> Option<String> {
    (total_credits > 0.0).then(|| format_gpa(total_score / total_credits))
}

/// Numeric value of a semester tag; blank and non-numeric tags have none.
pub fn semester_order_key(semester: &str) -> Option<f64> {
    semester
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

pub fn compare_semesters(a: &str, b: &str) -> Ordering {
    match (semester_order_key(a), semester_order_key(b)) {
        (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub fn aggregate_semesters(rows: &[ResultRow]) -> Vec<SemesterResult> {
    let mut groups: Vec<SemesterResult> = Vec::new();

    for row in rows {
        let position = match groups.iter().position(|group| group.semester == row.semester) {
            Some(position) => position,
            None => {
                groups.push(SemesterResult {
                    semester: row.semester.clone(),
                    total_credits: 0.0,
                    total_score: 0.0,
                    gpa: NO_GPA.to_string(),
                    rows: Vec::new(),
                });
                groups.len() - 1
            }
        };

        let group = &mut groups[position];
        group.total_credits += row.credits;
        group.total_score += row.score;
        group.rows.push(row.clone());
    }

    for group in groups.iter_mut() {
        group.gpa = ratio(group.total_score, group.total_credits)
            .unwrap_or_else(|| NO_GPA.to_string());
    }

    // Stable, so tags without a numeric value keep first-seen order.
    groups.sort_by(|a, b| compare_semesters(&a.semester, &b.semester));
    groups
}

pub fn build_trend(semesters: &[SemesterResult]) -> Vec<CgpaPoint> {
    let mut running_credits = 0.0;
    let mut running_score = 0.0;

    semesters
        .iter()
        .map(|semester| {
            running_credits += semester.total_credits;
            running_score += semester.total_score;
            CgpaPoint {
                semester: semester.semester.clone(),
                cgpa: ratio(running_score, running_credits)
                    .unwrap_or_else(|| NO_GPA.to_string()),
            }
        })
        .collect()
}

pub fn grade_distribution(rows: &[ResultRow]) -> BTreeMap<Grade, usize> {
    let mut counts = BTreeMap::new();
    for row in rows {
        *counts.entry(row.grade).or_insert(0) += 1;
    }
    counts
}

/// Best and worst semester by GPA. Semesters without a GPA are skipped and
/// the earliest semester wins a tie.
pub fn semester_extremes(
    semesters: &[SemesterResult],
) -> (Option<SemesterGpa>, Option<SemesterGpa>) {
    let mut max: Option<(f64, &SemesterResult)> = None;
    let mut min: Option<(f64, &SemesterResult)> = None;

    for semester in semesters {
        let Ok(value) = semester.gpa.parse::<f64>() else {
            continue;
        };

        if max.map_or(true, |(best, _)| value > best) {
            max = Some((value, semester));
        }
        if min.map_or(true, |(worst, _)| value < worst) {
            min = Some((value, semester));
        }
    }

    let pick = |found: Option<(f64, &SemesterResult)>| {
        found.map(|(_, semester)| SemesterGpa {
            semester: semester.semester.clone(),
            gpa: semester.gpa.clone(),
        })
    };

    (pick(max), pick(min))
}

pub fn assemble(rows: Vec<ResultRow>) -> GpaResults {
    let total_credits: f64 = rows.iter().map(|row| row.credits).sum();
    let total_score: f64 = rows.iter().map(|row| row.score).sum();
    let gpa = ratio(total_score, total_credits).unwrap_or_else(|| ZERO_GPA.to_string());

    let semester_results = aggregate_semesters(&rows);
    let cgpa_trend = build_trend(&semester_results);
    let grade_distribution = grade_distribution(&rows);
    let (max_semester_gpa, min_semester_gpa) = semester_extremes(&semester_results);

    GpaResults {
        rows,
        total_credits,
        total_score,
        gpa,
        semester_results,
        grade_distribution,
        max_semester_gpa,
        min_semester_gpa,
        cgpa_trend,
    }
}
