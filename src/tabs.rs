//! Read-only views over a [`GpaResults`] keyed by semester tab, shared by
//! the terminal table and the exporters.

use std::fmt;

use serde::Serialize;

use crate::gpa::{ratio, NO_GPA};
use crate::models::{GpaResults, ResultRow, SemesterResult};

pub const ALL_TAB: &str = "all";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Tab {
    All,
    Semester(String),
}

impl Tab {
    /// Accepts what [`Display`](fmt::Display) prints, so `-` names the
    /// untagged semester.
    pub fn parse(raw: &str) -> Tab {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case(ALL_TAB) {
            Tab::All
        } else if raw == NO_GPA {
            Tab::Semester(String::new())
        } else {
            Tab::Semester(raw.to_string())
        }
    }

    /// Heading used by exports: "All Semesters" or "Semester 3".
    pub fn label(&self) -> String {
        match self {
            Tab::All => "All Semesters".to_string(),
            Tab::Semester(id) if id.is_empty() => format!("Semester {NO_GPA}"),
            Tab::Semester(id) => format!("Semester {id}"),
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tab::All => f.write_str(ALL_TAB),
            Tab::Semester(id) if id.is_empty() => f.write_str(NO_GPA),
            Tab::Semester(id) => f.write_str(id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TabSummary<'a> {
    pub rows: &'a [ResultRow],
    pub total_credits: f64,
    pub total_score: f64,
    pub semester_gpa: String,
    pub cgpa_till: String,
}

impl GpaResults {
    pub fn semester_tabs(&self) -> Vec<Tab> {
        std::iter::once(Tab::All)
            .chain(
                self.semester_results
                    .iter()
                    .map(|semester| Tab::Semester(semester.semester.clone())),
            )
            .collect()
    }

    fn semester_position(&self, id: &str) -> Option<usize> {
        self.semester_results
            .iter()
            .position(|semester| semester.semester == id)
    }

    pub fn semester(&self, id: &str) -> Option<&SemesterResult> {
        self.semester_position(id).map(|pos| &self.semester_results[pos])
    }

    pub fn rows_for(&self, tab: &Tab) -> &[ResultRow] {
        match tab {
            Tab::All => &self.rows,
            Tab::Semester(id) => self
                .semester(id)
                .map(|semester| semester.rows.as_slice())
                .unwrap_or(&[]),
        }
    }

    pub fn semester_gpa(&self, tab: &Tab) -> String {
        match tab {
            Tab::All => self.gpa.clone(),
            Tab::Semester(id) => self
                .semester(id)
                .map(|semester| semester.gpa.clone())
                .unwrap_or_else(|| NO_GPA.to_string()),
        }
    }

    /// CGPA over every semester up to and including `tab`. An unknown
    /// semester falls back to the overall GPA.
    pub fn cgpa_till(&self, tab: &Tab) -> String {
        let Tab::Semester(id) = tab else {
            return self.gpa.clone();
        };
        let Some(pos) = self.semester_position(id) else {
            return self.gpa.clone();
        };

        let through = &self.semester_results[..=pos];
        let credits: f64 = through.iter().map(|s| s.total_credits).sum();
        let score: f64 = through.iter().map(|s| s.total_score).sum();
        ratio(score, credits).unwrap_or_else(|| NO_GPA.to_string())
    }

    pub fn summary(&self, tab: &Tab) -> TabSummary<'_> {
        let rows = self.rows_for(tab);
        TabSummary {
            rows,
            total_credits: rows.iter().map(|row| row.credits).sum(),
            total_score: rows.iter().map(|row| row.score).sum(),
            semester_gpa: self.semester_gpa(tab),
            cgpa_till: self.cgpa_till(tab),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpa::calculate_gpa;
    use crate::models::SubjectEntry;

    fn results() -> GpaResults {
        let entries = [("1", "3", "O"), ("2", "3", "B"), ("2", "2", "A"), ("3", "0", "C")]
            .iter()
            .enumerate()
            .map(|(i, (semester, credits, grade))| SubjectEntry {
                number: i + 1,
                semester: semester.to_string(),
                credits: credits.to_string(),
                grade: grade.to_string(),
                ..SubjectEntry::default()
            })
            .collect::<Vec<_>>();
        calculate_gpa(&entries).unwrap()
    }

    #[test]
    fn tabs_start_with_all_then_semesters() {
        let tabs: Vec<String> = results().semester_tabs().iter().map(Tab::to_string).collect();
        assert_eq!(tabs, vec!["all", "1", "2", "3"]);
    }

    #[test]
    fn parse_recognizes_all_in_any_case() {
        assert_eq!(Tab::parse("ALL"), Tab::All);
        assert_eq!(Tab::parse(" 2 "), Tab::Semester("2".to_string()));
    }

    #[test]
    fn displayed_dash_parses_back_to_untagged_semester() {
        let untagged = Tab::Semester(String::new());
        assert_eq!(untagged.to_string(), "-");
        assert_eq!(Tab::parse("-"), untagged);
        assert_eq!(Tab::parse(&Tab::parse("7").to_string()), Tab::parse("7"));
    }

    #[test]
    fn semester_gpa_per_tab() {
        let results = results();
        assert_eq!(results.semester_gpa(&Tab::All), results.gpa);
        assert_eq!(results.semester_gpa(&Tab::parse("2")), "6.800");
        assert_eq!(results.semester_gpa(&Tab::parse("3")), "-");
        assert_eq!(results.semester_gpa(&Tab::parse("9")), "-");
    }

    #[test]
    fn cgpa_accumulates_through_tab() {
        let results = results();
        assert_eq!(results.cgpa_till(&Tab::parse("1")), "10.000");
        // (30 + 18 + 16) / 8
        assert_eq!(results.cgpa_till(&Tab::parse("2")), "8.000");
        assert_eq!(results.cgpa_till(&Tab::parse("3")), "8.000");
        assert_eq!(results.cgpa_till(&Tab::parse("9")), results.gpa);
    }

    #[test]
    fn summary_totals_cover_tab_rows_only() {
        let results = results();
        let summary = results.summary(&Tab::parse("2"));
        assert_eq!(summary.rows.len(), 2);
        assert_eq!(summary.total_credits, 5.0);
        assert_eq!(summary.total_score, 34.0);
        assert!(results.rows_for(&Tab::parse("7")).is_empty());
    }

    #[test]
    fn labels_name_the_semester() {
        assert_eq!(Tab::All.label(), "All Semesters");
        assert_eq!(Tab::parse("4").label(), "Semester 4");
        assert_eq!(Tab::Semester(String::new()).label(), "Semester -");
    }
}
