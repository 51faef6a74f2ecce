//! grade_pages — read hand-marked grades from a batch of scanned answer sheets.

use clap::Parser;
use grade_grid::batch::{collect_image_paths, grade_paths, grade_paths_with, BatchSummary};
use grade_grid::config::{load_params, load_run_config, RunConfig};
use grade_grid::diagnostics::DetailedPageResult;
use grade_grid::image::io::{save_gray_png, write_json_file};
use grade_grid::report::{apply_ground_truth, load_ground_truth, write_csv_report, write_json_report};
use grade_grid::{GradeError, GradeReader, PageResult};
use log::info;
use std::path::{Path, PathBuf};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser, Debug)]
#[command(name = "grade_pages", version)]
#[command(about = "Read hand-marked grade grids from scanned answer sheets")]
struct Cli {
    /// Image files or directories of images.
    inputs: Vec<PathBuf>,

    /// Run configuration (JSON): inputs, outputs and reader parameters.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Reader parameters (JSON); replaces those of --config.
    #[arg(long)]
    params: Option<PathBuf>,

    /// Write all page results as JSON.
    #[arg(long)]
    json_out: Option<PathBuf>,

    /// Write all page results as CSV.
    #[arg(long)]
    csv_out: Option<PathBuf>,

    /// Directory for per-page mask PNGs and trace JSON.
    #[arg(long)]
    debug_dir: Option<PathBuf>,

    /// JSON object mapping file names to expected grades.
    #[arg(long)]
    ground_truth: Option<PathBuf>,

    /// Skip the QR orientation check.
    #[arg(long)]
    no_orientation: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(err) = run(Cli::parse()) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> CliResult<()> {
    let config = merge_config(&cli)?;
    if config.inputs.is_empty() {
        return Err("no input images given (pass paths or set \"inputs\" in --config)".into());
    }

    let paths = collect_image_paths(&config.inputs)?;
    info!("Grading {} page(s)", paths.len());
    let reader = GradeReader::new(config.params.clone())?;

    let results = match &config.output.debug_dir {
        Some(dir) => grade_paths_with(&reader, &paths, |path, detailed| {
            save_debug_artifacts(dir, path, detailed)
        }),
        None => grade_paths(&reader, &paths),
    };

    let results = match &config.ground_truth {
        Some(path) => apply_ground_truth(results, &load_ground_truth(path)?),
        None => results,
    };

    print_table(&results);

    if let Some(path) = &config.output.json_out {
        write_json_report(path, &results)?;
        info!("JSON report written to {}", path.display());
    }
    if let Some(path) = &config.output.csv_out {
        write_csv_report(path, &results)?;
        info!("CSV report written to {}", path.display());
    }

    let summary = BatchSummary::from_results(&results);
    info!(
        "Pages: {} graded: {} invalid grid: {} failed: {}",
        summary.total, summary.graded, summary.invalid_grid, summary.failed
    );
    if let Some(acc) = summary.accuracy() {
        info!(
            "Correct: {}/{} ({:.1}%)",
            summary.correct,
            summary.compared,
            acc * 100.0
        );
    }
    Ok(())
}

/// Command-line values win over the run configuration.
fn merge_config(cli: &Cli) -> Result<RunConfig, GradeError> {
    let mut config = match &cli.config {
        Some(path) => load_run_config(path)?,
        None => RunConfig::default(),
    };
    if !cli.inputs.is_empty() {
        config.inputs = cli.inputs.clone();
    }
    if let Some(path) = &cli.params {
        config.params = load_params(path)?;
    }
    if cli.json_out.is_some() {
        config.output.json_out = cli.json_out.clone();
    }
    if cli.csv_out.is_some() {
        config.output.csv_out = cli.csv_out.clone();
    }
    if cli.debug_dir.is_some() {
        config.output.debug_dir = cli.debug_dir.clone();
    }
    if cli.ground_truth.is_some() {
        config.ground_truth = cli.ground_truth.clone();
    }
    if cli.no_orientation {
        config.params.correct_orientation = false;
    }
    Ok(config)
}

fn save_debug_artifacts(
    dir: &Path,
    path: &Path,
    detailed: &DetailedPageResult,
) -> Result<(), GradeError> {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "page".to_string());
    if let Some(mask) = &detailed.trace.mask {
        save_gray_png(mask, &dir.join(format!("{stem}_mask.png")))?;
    }
    write_json_file(&dir.join(format!("{stem}_trace.json")), detailed)
}

fn print_table(results: &[PageResult]) {
    for r in results {
        let outcome = match (r.note_detected, r.error) {
            (Some(grade), _) => format!("{grade:.2}"),
            (None, Some(err)) => err.to_string(),
            (None, None) => "no grade".to_string(),
        };
        let truth = match (r.note_ground_truth, r.correct) {
            (Some(t), Some(ok)) => format!("  truth {t:.2} {}", if ok { "ok" } else { "MISMATCH" }),
            (Some(t), None) => format!("  truth {t:.2}"),
            _ => String::new(),
        };
        println!(
            "{:<32} {:<18} int={:<24} dec={:<24}{}",
            r.filename, outcome, r.status_int, r.status_dec, truth
        );
    }
}
