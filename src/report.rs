use std::fmt::Write;

use chrono::NaiveDate;

use crate::gpa::NO_GPA;
use crate::models::{GpaResults, ResultRow};
use crate::tabs::Tab;

pub(crate) const COLUMNS: [&str; 7] = ["Index", "Semester", "Code", "Name", "Credits", "Grade", "Score"];

pub(crate) fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        NO_GPA
    } else {
        value
    }
}

pub(crate) fn row_cells(row: &ResultRow) -> [String; 7] {
    [
        row.index.to_string(),
        or_dash(&row.semester).to_string(),
        or_dash(&row.subject_code).to_string(),
        row.name.clone(),
        row.credits.to_string(),
        row.grade.to_string(),
        format!("{:.2}", row.score),
    ]
}

pub(crate) fn summary_line(results: &GpaResults, tab: &Tab) -> String {
    format!(
        "GPA: {} | CGPA: {}",
        results.semester_gpa(tab),
        results.cgpa_till(tab)
    )
}

/// Plain-text table for one tab, as printed by `calculate`.
pub fn render_tab(results: &GpaResults, tab: &Tab) -> String {
    let summary = results.summary(tab);
    let mut output = String::new();

    let _ = writeln!(output, "{}", tab.label());
    let _ = writeln!(
        output,
        "{:<6} {:<9} {:<10} {:<28} {:>7} {:<6} {:>7}",
        COLUMNS[0], COLUMNS[1], COLUMNS[2], COLUMNS[3], COLUMNS[4], COLUMNS[5], COLUMNS[6]
    );

    if summary.rows.is_empty() {
        let _ = writeln!(output, "No subjects in this tab.");
    }

    for row in summary.rows {
        let [index, semester, code, name, credits, grade, score] = row_cells(row);
        let _ = writeln!(
            output,
            "{index:<6} {semester:<9} {code:<10} {name:<28} {credits:>7} {grade:<6} {score:>7}"
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "Total credits: {}", summary.total_credits);
    let _ = writeln!(output, "Total score: {:.2}", summary.total_score);
    let _ = writeln!(output, "{}", summary_line(results, tab));
    output
}

pub fn build_report(results: &GpaResults, generated: NaiveDate) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# GPA Report");
    let _ = writeln!(output, "Generated on {generated}");
    let _ = writeln!(output);
    let _ = writeln!(output, "## Overview");
    let _ = writeln!(output, "- Subjects: {}", results.rows.len());
    let _ = writeln!(output, "- Total credits: {}", results.total_credits);
    let _ = writeln!(output, "- Total score: {:.2}", results.total_score);
    let _ = writeln!(output, "- GPA/CGPA: {}", results.gpa);

    if let Some(best) = &results.max_semester_gpa {
        let _ = writeln!(
            output,
            "- Highest semester GPA: {} ({})",
            or_dash(&best.semester),
            best.gpa
        );
    }
    if let Some(worst) = &results.min_semester_gpa {
        let _ = writeln!(
            output,
            "- Lowest semester GPA: {} ({})",
            or_dash(&worst.semester),
            worst.gpa
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Grade Distribution");

    if results.grade_distribution.is_empty() {
        let _ = writeln!(output, "No grades recorded.");
    } else {
        for (grade, count) in &results.grade_distribution {
            let _ = writeln!(output, "- {grade}: {count}");
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## CGPA Trend");

    if results.cgpa_trend.is_empty() {
        let _ = writeln!(output, "No semesters recorded.");
    } else {
        for point in &results.cgpa_trend {
            let _ = writeln!(output, "- Semester {}: {}", or_dash(&point.semester), point.cgpa);
        }
    }

    for tab in results.semester_tabs() {
        let _ = writeln!(output);
        let _ = writeln!(output, "## {}", tab.label());
        let _ = writeln!(output);
        let _ = writeln!(output, "| # | Sem | Code | Name | Credits | Grade | Score |");
        let _ = writeln!(output, "|---|-----|------|------|---------|-------|-------|");

        for row in results.rows_for(&tab) {
            let _ = writeln!(output, "| {} |", row_cells(row).join(" | "));
        }

        let _ = writeln!(output);
        let _ = writeln!(output, "{}", summary_line(results, &tab));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpa::calculate_gpa;
    use crate::models::SubjectEntry;

    fn sample_results() -> GpaResults {
        let entries = vec![
            SubjectEntry {
                number: 1,
                code: "CS101".to_string(),
                semester: "1".to_string(),
                name: "Programming".to_string(),
                credits: "3".to_string(),
                grade: "O".to_string(),
            },
            SubjectEntry {
                number: 2,
                code: String::new(),
                semester: "2".to_string(),
                name: "Statistics".to_string(),
                credits: "3".to_string(),
                grade: "B".to_string(),
            },
        ];
        calculate_gpa(&entries).unwrap()
    }

    fn generated() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
    }

    #[test]
    fn report_lists_overview_and_trend() {
        let report = build_report(&sample_results(), generated());

        assert!(report.starts_with("# GPA Report\nGenerated on 2026-03-01\n"));
        assert!(report.contains("- GPA/CGPA: 8.000"));
        assert!(report.contains("- Highest semester GPA: 1 (10.000)"));
        assert!(report.contains("- Lowest semester GPA: 2 (6.000)"));
        assert!(report.contains("- O: 1\n- B: 1\n"));
        assert!(report.contains("- Semester 1: 10.000\n- Semester 2: 8.000\n"));
    }

    #[test]
    fn report_has_a_section_per_tab() {
        let report = build_report(&sample_results(), generated());

        assert!(report.contains("## All Semesters"));
        assert!(report.contains("## Semester 1"));
        assert!(report.contains("## Semester 2"));
        assert!(report.contains("| 2 | 2 | - | Statistics | 3 | B | 18.00 |"));
        assert!(report.contains("GPA: 6.000 | CGPA: 8.000"));
    }

    #[test]
    fn empty_results_still_render() {
        let results = calculate_gpa(&[]).unwrap();
        let report = build_report(&results, generated());
        assert!(report.contains("No grades recorded."));
        assert!(report.contains("No semesters recorded."));
        assert!(render_tab(&results, &Tab::All).contains("No subjects in this tab."));
    }

    #[test]
    fn terminal_table_shows_tab_totals() {
        let table = render_tab(&sample_results(), &Tab::parse("1"));
        assert!(table.starts_with("Semester 1\n"));
        assert!(table.contains("Programming"));
        assert!(!table.contains("Statistics"));
        assert!(table.contains("Total credits: 3\n"));
        assert!(table.contains("GPA: 10.000 | CGPA: 10.000"));
    }
}
