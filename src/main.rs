use std::path::PathBuf;

use anyhow::{bail, Context};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod error;
mod export;
mod gpa;
mod grade;
mod import;
mod models;
mod presets;
mod report;
mod tabs;
mod validate;

use models::{GpaResults, SubjectEntry};
use tabs::Tab;

#[derive(Parser)]
#[command(name = "gradepoint")]
#[command(about = "Grade-point calculator for semester marksheets", long_about = None)]
struct Cli {
    /// Log filter, e.g. `info` or `gradepoint=debug`
    #[arg(long, global = true, env = "GRADEPOINT_LOG", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct InputArgs {
    /// Subject sheet(s), .xlsx/.xls or .csv; rows from later files are appended
    #[arg(long, required = true)]
    sheet: Vec<PathBuf>,
    /// Only use these semesters, comma separated
    #[arg(long, value_delimiter = ',')]
    semesters: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute GPA, semester GPAs and the CGPA trend
    Calculate {
        #[command(flatten)]
        input: InputArgs,
        /// `all` or a semester id
        #[arg(long, default_value = tabs::ALL_TAB)]
        tab: String,
        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the semesters found in a sheet
    Semesters {
        #[arg(long)]
        sheet: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Generate a markdown report
    Report {
        #[command(flatten)]
        input: InputArgs,
        #[arg(long, default_value = "gpa-report.md")]
        out: PathBuf,
    },
    /// Write an Excel workbook with one worksheet per semester tab
    Export {
        #[command(flatten)]
        input: InputArgs,
        #[arg(long, default_value = "gpa-results.xlsx")]
        out: PathBuf,
    },
    /// Write one CSV file per semester tab
    ExportCsv {
        #[command(flatten)]
        input: InputArgs,
        #[arg(long, default_value = "gpa-export")]
        out_dir: PathBuf,
    },
}

fn init_logging(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn load_subjects(input: &InputArgs) -> anyhow::Result<Vec<SubjectEntry>> {
    let mut subjects = Vec::new();
    for path in &input.sheet {
        let imported = import::import_sheet(path)?;
        subjects = presets::append_subjects(subjects, imported.subjects);
    }

    subjects.retain(presets::has_row_content);

    if input.semesters.is_empty() {
        Ok(subjects)
    } else {
        presets::select_semesters(&subjects, &input.semesters)
    }
}

fn calculate(input: &InputArgs) -> anyhow::Result<GpaResults> {
    let subjects = load_subjects(input)?;
    debug!(subjects = subjects.len(), "calculating");
    Ok(gpa::calculate_gpa(&subjects)?)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match cli.command {
        Commands::Calculate { input, tab, json } => {
            let results = calculate(&input)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
                return Ok(());
            }

            let tab = Tab::parse(&tab);
            if !results.semester_tabs().contains(&tab) {
                bail!("No semester {tab} in the calculated results.");
            }
            print!("{}", report::render_tab(&results, &tab));
        }
        Commands::Semesters { sheet, json } => {
            let imported = import::import_sheet(&sheet)?;
            let available = presets::available_semesters(&imported.subjects);

            if json {
                let listing = serde_json::json!({
                    "semesters": available,
                    "hasGrades": imported.has_grades,
                    "subjects": imported.subjects.len(),
                });
                println!("{}", serde_json::to_string_pretty(&listing)?);
                return Ok(());
            }

            if available.is_empty() {
                println!("No semesters tagged in {}.", sheet.display());
            } else {
                println!("Semesters: {}", available.join(", "));
            }
            if !imported.has_grades {
                println!("Sheet has no grades; fill them in before calculating.");
            }
        }
        Commands::Report { input, out } => {
            let results = calculate(&input)?;
            let report = report::build_report(&results, Utc::now().date_naive());
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Export { input, out } => {
            let results = calculate(&input)?;
            let sheets = export::export_workbook(&results, &out)?;
            println!("Wrote {} worksheets to {}.", sheets.len(), out.display());
        }
        Commands::ExportCsv { input, out_dir } => {
            let results = calculate(&input)?;
            let written = export::export_csv(&results, &out_dir)?;
            println!("Wrote {} sheets to {}.", written.len(), out_dir.display());
        }
    }

    Ok(())
}
