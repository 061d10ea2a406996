use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;
use clap::{Args, Parser, Subcommand};

mod coverage;
mod error;
mod models;
mod reader;
mod report;
mod title;

use models::{NormalizedRecord, RequiredAssignments, SubmissionIndex};

#[derive(Parser)]
#[command(name = "submission-tracker")]
#[command(about = "Track missing assignment submissions from free-text titles", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct PipelineArgs {
    /// Tab-separated export: issue_id, state, title, ...
    #[arg(long, default_value = "subjects.txt")]
    input: PathBuf,
    /// Comma-separated assignment tags every student must submit
    #[arg(
        long,
        env = "SUBMISSION_REQUIRED",
        value_delimiter = ',',
        default_values_t = default_required()
    )]
    required: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the normalized titles CSV
    Normalize {
        #[command(flatten)]
        pipeline: PipelineArgs,
        #[arg(long, default_value = "normalized_titles.csv")]
        out: PathBuf,
    },
    /// Write the per-student missing submissions CSV
    Missing {
        #[command(flatten)]
        pipeline: PipelineArgs,
        #[arg(long, default_value = "missing_submissions.csv")]
        out: PathBuf,
    },
    /// Print assignment coverage, lowest rate first
    Coverage {
        #[command(flatten)]
        pipeline: PipelineArgs,
        #[arg(long)]
        json: bool,
    },
    /// Write both CSVs and the markdown report
    Report {
        #[command(flatten)]
        pipeline: PipelineArgs,
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Show how a single title is interpreted
    Title { text: String },
}

const NORMALIZED_CSV: &str = "normalized_titles.csv";
const MISSING_CSV: &str = "missing_submissions.csv";
const REPORT_MD: &str = "missing_submissions_report.md";

fn default_required() -> Vec<String> {
    ["day01", "day02", "day03", "day04", "day05", "day06", "day08"]
        .iter()
        .map(|tag| tag.to_string())
        .collect()
}

struct Pipeline {
    records: Vec<NormalizedRecord>,
    index: SubmissionIndex,
    required: RequiredAssignments,
}

impl PipelineArgs {
    fn run(&self) -> anyhow::Result<Pipeline> {
        let raw = reader::read_subjects(&self.input)?;
        let records = title::normalize_records(&raw);
        let index = coverage::build_index(&records);
        let required = RequiredAssignments::new(&self.required);
        if required.is_empty() {
            tracing::warn!("no required assignments configured");
        }

        Ok(Pipeline {
            records,
            index,
            required,
        })
    }
}

fn create(path: &Path) -> anyhow::Result<File> {
    File::create(path).with_context(|| format!("failed to create {}", path.display()))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("submission_tracker=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Normalize { pipeline, out } => {
            let pipeline = pipeline.run()?;
            report::write_normalized_csv(create(&out)?, &pipeline.records)?;
            println!(
                "Wrote {} normalized titles to {}.",
                pipeline.records.len(),
                out.display()
            );
        }
        Commands::Missing { pipeline, out } => {
            let pipeline = pipeline.run()?;
            let rows = coverage::missing_rows(&pipeline.index, &pipeline.required);
            report::write_missing_csv(create(&out)?, &rows)?;
            let incomplete = rows.iter().filter(|row| !row.missing.is_empty()).count();
            println!(
                "{incomplete} of {} students are missing submissions.",
                rows.len()
            );
            println!("Wrote: {}", out.display());
        }
        Commands::Coverage { pipeline, json } => {
            let pipeline = pipeline.run()?;
            let rows = coverage::coverage(&pipeline.index, &pipeline.required);

            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
                return Ok(());
            }

            if rows.is_empty() {
                println!("No required assignments configured.");
                return Ok(());
            }

            println!("Assignment coverage (lowest first):");
            for row in rows.iter() {
                println!(
                    "- {}: {}/{} ({:.1}%)",
                    row.assignment,
                    row.submitted_count,
                    row.total_students,
                    row.rate * 100.0
                );
            }
        }
        Commands::Report { pipeline, out_dir } => {
            let input = file_name(&pipeline.input);
            let pipeline = pipeline.run()?;
            std::fs::create_dir_all(&out_dir)
                .with_context(|| format!("failed to create {}", out_dir.display()))?;

            let normalized_path = out_dir.join(NORMALIZED_CSV);
            let missing_path = out_dir.join(MISSING_CSV);
            let report_path = out_dir.join(REPORT_MD);

            report::write_normalized_csv(create(&normalized_path)?, &pipeline.records)?;
            let rows = coverage::missing_rows(&pipeline.index, &pipeline.required);
            report::write_missing_csv(create(&missing_path)?, &rows)?;

            let names = report::ArtifactNames {
                input,
                normalized_csv: NORMALIZED_CSV.to_string(),
                missing_csv: MISSING_CSV.to_string(),
            };
            let markdown =
                report::build_report(Utc::now(), &names, &pipeline.index, &pipeline.required);
            std::fs::write(&report_path, markdown)
                .with_context(|| format!("failed to write {}", report_path.display()))?;
            tracing::info!("wrote report artifacts to {}", out_dir.display());

            let incomplete = rows.iter().filter(|row| !row.missing.is_empty()).count();
            println!("Missing Submissions Report");
            println!("==========================");
            println!("Total students: {}", pipeline.index.len());
            println!("Students missing >=1: {incomplete}");
            println!("Wrote: {}", normalized_path.display());
            println!("Wrote: {}", missing_path.display());
            println!("Wrote: {}", report_path.display());
        }
        Commands::Title { text } => {
            let parts = title::normalize_title(&text);
            println!("{}", serde_json::to_string_pretty(&parts)?);
        }
    }

    Ok(())
}
