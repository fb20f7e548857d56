//! Spreadsheet exports: one Excel worksheet per semester tab, or one CSV
//! file per tab.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::Context;
use csv::WriterBuilder;
use rust_xlsxwriter::{Format, FormatAlign, Workbook};
use tracing::info;

use crate::gpa::semester_order_key;
use crate::models::GpaResults;
use crate::report::{or_dash, row_cells, summary_line, COLUMNS};
use crate::tabs::Tab;

const FONT: &str = "Times New Roman";
const COLUMN_WIDTHS: [f64; 7] = [10.0, 15.0, 15.0, 30.0, 10.0, 10.0, 10.0];
/// Excel rejects longer worksheet names.
const MAX_SHEET_NAME: usize = 31;

/// Hands out the first candidate not already taken, compared without case.
/// `candidate(None)` is the preferred name, `candidate(Some(n))` the n-th
/// fallback starting at 2.
fn claim_name(used: &mut HashSet<String>, candidate: impl Fn(Option<usize>) -> String) -> String {
    let mut attempt = 1;
    loop {
        let name = candidate((attempt > 1).then_some(attempt));
        if used.insert(name.to_lowercase()) {
            return name;
        }
        attempt += 1;
    }
}

fn truncate(value: &str, max_chars: usize) -> String {
    value.chars().take(max_chars).collect()
}

pub fn csv_file_stem(tab: &Tab) -> String {
    match tab {
        Tab::All => "all".to_string(),
        Tab::Semester(id) if id.is_empty() => "semester-none".to_string(),
        Tab::Semester(id) => {
            let safe: String = id
                .chars()
                .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
                .collect();
            format!("semester-{safe}")
        }
    }
}

pub fn sheet_base_name(tab: &Tab) -> String {
    tab.label()
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' | '\'' => '_',
            c => c,
        })
        .collect()
}

fn rounded_score(score: f64) -> f64 {
    format!("{score:.2}").parse().unwrap_or(score)
}

/// Writes one workbook with a worksheet per tab and returns the sheet names.
pub fn export_workbook(results: &GpaResults, path: &Path) -> anyhow::Result<Vec<String>> {
    let title = Format::new()
        .set_bold()
        .set_font_name(FONT)
        .set_font_size(16.0)
        .set_align(FormatAlign::Center);
    let heading = Format::new()
        .set_bold()
        .set_font_name(FONT)
        .set_font_size(14.0)
        .set_align(FormatAlign::Center);
    let bold = Format::new().set_bold().set_font_name(FONT).set_font_size(14.0);
    let body = Format::new().set_font_name(FONT).set_font_size(12.0);

    let mut xlsx = Workbook::new();
    let mut used = HashSet::new();
    let mut sheet_names = Vec::new();

    for tab in results.semester_tabs() {
        let base = sheet_base_name(&tab);
        let name = claim_name(&mut used, |attempt| match attempt {
            None => truncate(&base, MAX_SHEET_NAME),
            Some(n) => {
                let suffix = format!(" ({n})");
                format!("{}{suffix}", truncate(&base, MAX_SHEET_NAME - suffix.len()))
            }
        });

        let label = tab.label();
        let summary = results.summary(&tab);
        let worksheet = xlsx.add_worksheet();
        worksheet.set_name(&name)?;

        for (col, width) in COLUMN_WIDTHS.iter().enumerate() {
            worksheet.set_column_width(col as u16, *width)?;
        }

        worksheet.merge_range(0, 0, 0, 6, &label, &title)?;
        worksheet.merge_range(
            1,
            0,
            1,
            6,
            &format!("CGPA upto {label}: {}", summary.cgpa_till),
            &heading,
        )?;
        worksheet.merge_range(
            2,
            0,
            2,
            6,
            &format!("GPA for {label}: {}", summary.semester_gpa),
            &heading,
        )?;

        for (col, header) in COLUMNS.iter().enumerate() {
            worksheet.write_string_with_format(4, col as u16, *header, &bold)?;
        }

        let mut line: u32 = 5;
        for row in summary.rows {
            worksheet.write_number_with_format(line, 0, row.index as f64, &body)?;
            match semester_order_key(&row.semester) {
                Some(number) => worksheet.write_number_with_format(line, 1, number, &body)?,
                None => worksheet.write_string_with_format(line, 1, or_dash(&row.semester), &body)?,
            };
            worksheet.write_string_with_format(line, 2, or_dash(&row.subject_code), &body)?;
            worksheet.write_string_with_format(line, 3, &row.name, &body)?;
            worksheet.write_number_with_format(line, 4, row.credits, &body)?;
            worksheet.write_string_with_format(line, 5, row.grade.letter(), &body)?;
            worksheet.write_number_with_format(line, 6, rounded_score(row.score), &body)?;
            line += 1;
        }

        worksheet.write_string_with_format(line, 3, "Total", &bold)?;
        worksheet.write_number_with_format(line, 4, summary.total_credits, &bold)?;
        worksheet.write_number_with_format(line, 6, rounded_score(summary.total_score), &bold)?;
        worksheet.write_string_with_format(line + 1, 3, "Summary", &bold)?;
        worksheet.write_string_with_format(line + 1, 5, summary_line(results, &tab), &bold)?;

        sheet_names.push(name);
    }

    xlsx.save(path)
        .with_context(|| format!("failed to write {}", path.display()))?;

    info!(sheets = sheet_names.len(), path = %path.display(), "exported workbook");
    Ok(sheet_names)
}

/// Writes one CSV file per tab into `out_dir` and returns the paths written.
pub fn export_csv(results: &GpaResults, out_dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;

    let mut used = HashSet::new();
    let mut written = Vec::new();

    for tab in results.semester_tabs() {
        let stem = csv_file_stem(&tab);
        let file_name = claim_name(&mut used, |attempt| match attempt {
            None => format!("{stem}.csv"),
            Some(n) => format!("{stem}-{n}.csv"),
        });
        let path = out_dir.join(file_name);
        let mut writer = WriterBuilder::new()
            .flexible(true)
            .from_path(&path)
            .with_context(|| format!("failed to create {}", path.display()))?;

        let label = tab.label();
        let summary = results.summary(&tab);

        writer.write_record([label.as_str()])?;
        writer.write_record([format!("CGPA upto {label}: {}", summary.cgpa_till)])?;
        writer.write_record([format!("GPA for {label}: {}", summary.semester_gpa)])?;
        writer.write_record([""; 7])?;
        writer.write_record(COLUMNS)?;

        for row in summary.rows {
            writer.write_record(row_cells(row))?;
        }

        writer.write_record([
            String::new(),
            String::new(),
            String::new(),
            "Total".to_string(),
            summary.total_credits.to_string(),
            String::new(),
            format!("{:.2}", summary.total_score),
        ])?;
        writer.write_record([
            String::new(),
            String::new(),
            String::new(),
            "Summary".to_string(),
            String::new(),
            summary_line(results, &tab),
            String::new(),
        ])?;
        writer.flush()?;

        written.push(path);
    }

    info!(sheets = written.len(), dir = %out_dir.display(), "exported csv sheets");
    Ok(written)
}
