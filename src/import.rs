use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context};
use calamine::{open_workbook_auto, Data, Reader};
use csv::{ReaderBuilder, Trim};
use tracing::{debug, info};

use crate::models::SubjectEntry;

pub const UNSUPPORTED_FILE: &str = "Please upload a valid Excel (.xls or .xlsx) or CSV (.csv) file.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedSubjects {
    pub subjects: Vec<SubjectEntry>,
    pub has_grades: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SheetKind {
    Excel,
    Csv,
}

fn sheet_kind(path: &Path) -> Option<SheetKind> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "xls" | "xlsx" => Some(SheetKind::Excel),
        "csv" => Some(SheetKind::Csv),
        _ => None,
    }
}

struct Columns {
    semester: Option<usize>,
    code: Option<usize>,
    name: Option<usize>,
    credits: Option<usize>,
    grade: Option<usize>,
}

impl Columns {
    fn locate(headers: &[String]) -> Self {
        let find = |wanted: &str| {
            headers
                .iter()
                .position(|header| header.trim().eq_ignore_ascii_case(wanted))
        };

        Columns {
            semester: find("semester"),
            code: find("subjectcode"),
            name: find("subjectname"),
            credits: find("credits"),
            grade: find("grade"),
        }
    }
}

fn cell(row: &[String], column: Option<usize>) -> String {
    column
        .and_then(|index| row.get(index))
        .map(|value| value.trim().to_string())
        .unwrap_or_default()
}

/// Imports the first sheet of an Excel workbook, or a CSV file.
pub fn import_sheet(path: &Path) -> anyhow::Result<ImportedSubjects> {
    let imported = match sheet_kind(path) {
        Some(SheetKind::Excel) => read_workbook(path),
        Some(SheetKind::Csv) => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            read_subjects(file)
        }
        None => bail!(UNSUPPORTED_FILE),
    }
    .with_context(|| format!("failed to import {}", path.display()))?;

    info!(
        path = %path.display(),
        subjects = imported.subjects.len(),
        has_grades = imported.has_grades,
        "imported subjects"
    );
    Ok(imported)
}

fn data_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        other => other.to_string(),
    }
}

pub fn read_workbook(path: &Path) -> anyhow::Result<ImportedSubjects> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    let Some(first) = workbook.sheet_names().first().cloned() else {
        bail!("Workbook contains no sheets");
    };
    let range = workbook
        .worksheet_range(&first)
        .with_context(|| format!("failed to read sheet {first}"))?;

    let mut rows = range
        .rows()
        .map(|row| row.iter().map(data_text).collect::<Vec<_>>());
    let headers = rows.next().unwrap_or_default();

    collect_subjects(&headers, rows.map(Ok))
}

pub fn read_subjects<R: Read>(input: R) -> anyhow::Result<ImportedSubjects> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(input);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let rows = reader.records().map(|record| {
        record
            .map(|record| record.iter().map(str::to_string).collect::<Vec<_>>())
            .map_err(anyhow::Error::from)
    });

    collect_subjects(&headers, rows)
}

/// Rows whose credits cell is blank are skipped; `number` keeps the row's
/// position in the sheet.
fn collect_subjects<I>(headers: &[String], rows: I) -> anyhow::Result<ImportedSubjects>
where
    I: Iterator<Item = anyhow::Result<Vec<String>>>,
{
    let columns = Columns::locate(headers);
    let mut subjects = Vec::new();
    let mut has_grades = false;

    for (idx, row) in rows.enumerate() {
        let row = row?;
        let grade = cell(&row, columns.grade);
        has_grades |= !grade.is_empty();

        let credits = cell(&row, columns.credits);
        if credits.is_empty() {
            debug!(row = idx + 1, "skipping row without credits");
            continue;
        }

        subjects.push(SubjectEntry {
            number: idx + 1,
            code: cell(&row, columns.code),
            semester: cell(&row, columns.semester),
            name: cell(&row, columns.name),
            credits,
            grade,
        });
    }

    if subjects.is_empty() {
        bail!("No valid rows found. Each row must include credits.");
    }

    Ok(ImportedSubjects {
        subjects,
        has_grades,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;

    #[test]
    fn reads_known_columns_in_any_order() {
        let data = "Grade,Credits,SubjectName,SubjectCode,Semester\n\
                    A, 4 ,Data Structures,CS201,3\n\
                    o,3,Discrete Maths,MA110,1\n";
        let imported = read_subjects(data.as_bytes()).unwrap();

        assert!(imported.has_grades);
        assert_eq!(
            imported.subjects[0],
            SubjectEntry {
                number: 1,
                code: "CS201".to_string(),
                semester: "3".to_string(),
                name: "Data Structures".to_string(),
                credits: "4".to_string(),
                grade: "A".to_string(),
            }
        );
        assert_eq!(imported.subjects[1].grade, "o");
    }

    #[test]
    fn skips_rows_without_credits_and_keeps_numbering() {
        let data = "semester,subjectname,credits\n1,Lab,\n1,Physics,4\n";
        let imported = read_subjects(data.as_bytes()).unwrap();

        assert_eq!(imported.subjects.len(), 1);
        assert_eq!(imported.subjects[0].number, 2);
        assert_eq!(imported.subjects[0].grade, "");
        assert!(!imported.has_grades);
    }

    #[test]
    fn fails_when_nothing_has_credits() {
        let data = "semester,subjectname,credits,grade\n1,Lab,,A\n";
        let error = read_subjects(data.as_bytes()).unwrap_err();
        assert_eq!(
            error.to_string(),
            "No valid rows found. Each row must include credits."
        );
    }

    #[test]
    fn rejects_other_file_types() {
        let error = import_sheet(Path::new("grades.ods")).unwrap_err();
        assert_eq!(error.root_cause().to_string(), UNSUPPORTED_FILE);
    }

    #[test]
    fn imports_csv_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("marks.csv");
        std::fs::write(&path, "credits,grade\n3,B+\n").unwrap();

        let imported = import_sheet(&path).unwrap();
        assert_eq!(imported.subjects.len(), 1);
        assert_eq!(imported.subjects[0].credits, "3");
    }

    #[test]
    fn imports_first_sheet_of_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("marks.xlsx");

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (col, header) in ["semester", "subjectcode", "subjectname", "credits", "grade"]
            .iter()
            .enumerate()
        {
            sheet.write_string(0, col as u16, *header).unwrap();
        }
        sheet.write_number(1, 0, 2.0).unwrap();
        sheet.write_string(1, 1, "PH102").unwrap();
        sheet.write_string(1, 2, " Optics ").unwrap();
        sheet.write_number(1, 3, 4.0).unwrap();
        sheet.write_string(1, 4, "a+").unwrap();
        sheet.write_string(2, 2, "Library hour").unwrap();
        sheet.write_number(3, 3, 1.5).unwrap();
        workbook.save(&path).unwrap();

        let imported = import_sheet(&path).unwrap();

        assert!(imported.has_grades);
        assert_eq!(imported.subjects.len(), 2);
        assert_eq!(
            imported.subjects[0],
            SubjectEntry {
                number: 1,
                code: "PH102".to_string(),
                semester: "2".to_string(),
                name: "Optics".to_string(),
                credits: "4".to_string(),
                grade: "a+".to_string(),
            }
        );
        assert_eq!(imported.subjects[1].number, 3);
        assert_eq!(imported.subjects[1].credits, "1.5");
        assert_eq!(imported.subjects[1].grade, "");
    }
}
