use std::collections::BTreeSet;

use anyhow::bail;
use tracing::warn;

use crate::gpa::compare_semesters;
use crate::models::SubjectEntry;

pub fn has_row_content(entry: &SubjectEntry) -> bool {
    [
        &entry.code,
        &entry.name,
        &entry.credits,
        &entry.grade,
        &entry.semester,
    ]
    .iter()
    .any(|field| !field.trim().is_empty())
}

/// Distinct non-blank semester tags, in numeric order.
pub fn available_semesters(entries: &[SubjectEntry]) -> Vec<String> {
    let mut semesters: Vec<String> = Vec::new();
    for entry in entries {
        let semester = entry.semester.trim();
        if !semester.is_empty() && !semesters.iter().any(|seen| seen == semester) {
            semesters.push(semester.to_string());
        }
    }
    semesters.sort_by(|a, b| compare_semesters(a, b));
    semesters
}

/// Whole-numbered semesters between the lowest and highest selected one
/// that were left out. Tags that are not integers are ignored.
pub fn missing_semesters(selected: &[String]) -> Vec<i64> {
    let numbers: BTreeSet<i64> = selected
        .iter()
        .filter_map(|semester| semester.trim().parse::<i64>().ok())
        .collect();

    let (Some(&first), Some(&last)) = (numbers.first(), numbers.last()) else {
        return Vec::new();
    };

    (first..=last).filter(|n| !numbers.contains(n)).collect()
}

pub fn select_semesters(
    entries: &[SubjectEntry],
    selected: &[String],
) -> anyhow::Result<Vec<SubjectEntry>> {
    if selected.is_empty() {
        bail!("Select at least one semester to apply.");
    }

    let missing = missing_semesters(selected);
    if !missing.is_empty() {
        let listed = missing
            .iter()
            .map(i64::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        warn!("Missing semesters: {listed}. You can still apply if you want.");
    }

    let chosen: Vec<SubjectEntry> = entries
        .iter()
        .filter(|entry| {
            selected
                .iter()
                .any(|semester| semester.trim() == entry.semester.trim())
        })
        .cloned()
        .collect();

    if chosen.is_empty() {
        bail!("No rows found for selected semesters.");
    }

    Ok(chosen)
}

/// Appended rows are renumbered to continue after the existing ones.
pub fn append_subjects(
    mut existing: Vec<SubjectEntry>,
    applied: Vec<SubjectEntry>,
) -> Vec<SubjectEntry> {
    let offset = existing.len();
    existing.extend(applied.into_iter().enumerate().map(|(i, entry)| SubjectEntry {
        number: offset + i + 1,
        ..entry
    }));
    existing
}
