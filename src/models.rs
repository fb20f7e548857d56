use std::collections::BTreeMap;

use serde::Serialize;

use crate::grade::Grade;

/// One subject as typed into the form or pulled out of a spreadsheet.
/// Credits and grade stay raw text until validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectEntry {
    pub number: usize,
    pub code: String,
    pub semester: String,
    pub name: String,
    pub credits: String,
    pub grade: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRow {
    pub index: usize,
    pub subject_code: String,
    pub semester: String,
    pub name: String,
    pub credits: f64,
    pub grade: Grade,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SemesterResult {
    pub semester: String,
    pub total_credits: f64,
    pub total_score: f64,
    pub gpa: String,
    pub rows: Vec<ResultRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SemesterGpa {
    pub semester: String,
    pub gpa: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CgpaPoint {
    pub semester: String,
    pub cgpa: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GpaResults {
    pub rows: Vec<ResultRow>,
    pub total_credits: f64,
    pub total_score: f64,
    pub gpa: String,
    pub semester_results: Vec<SemesterResult>,
    pub grade_distribution: BTreeMap<Grade, usize>,
    #[serde(rename = "maxSemesterGPA", skip_serializing_if = "Option::is_none")]
    pub max_semester_gpa: Option<SemesterGpa>,
    #[serde(rename = "minSemesterGPA", skip_serializing_if = "Option::is_none")]
    pub min_semester_gpa: Option<SemesterGpa>,
    pub cgpa_trend: Vec<CgpaPoint>,
}
