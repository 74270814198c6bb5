//! Batch command - match a set of invoice documents against ledger sheets.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{Local, NaiveDate};
use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use invmatch_core::batch::{DocumentInput, Pipeline};
use invmatch_core::ledger::{apply_updates, Ledger};
use invmatch_core::models::result::{BatchReport, DocumentResult, MatchOutcome};
use invmatch_core::nominal::NominalTable;
use invmatch_core::source::{read_path, supported_extension};

use super::load_config;

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Ledger sheet as CSV; the file stem is the sheet id. Repeatable.
    #[arg(short, long = "ledger", required = true)]
    ledgers: Vec<PathBuf>,

    /// Nominal-code table (JSON array of {supplier, nominal_code, description})
    #[arg(short, long)]
    nominal: Option<PathBuf>,

    /// Output directory for results and updated ledgers
    #[arg(short, long, default_value = "invmatch-output")]
    output_dir: PathBuf,

    /// Date written to the invoice-signed column (YYYY-MM-DD, default today)
    #[arg(long)]
    signed_on: Option<NaiveDate>,

    /// Report matches without writing updated ledgers
    #[arg(long)]
    dry_run: bool,
}

/// A ledger sheet as read from disk.
struct SheetFile {
    sheet_id: String,
    path: PathBuf,
    grid: Vec<Vec<String>>,
}

pub fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    // Expand glob pattern
    let mut files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| supported_extension(p))
        .collect();
    files.sort();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    // A sheet without a header row fails the whole run
    let mut sheets = Vec::with_capacity(args.ledgers.len());
    let mut ledger = Ledger::new();
    for path in &args.ledgers {
        let sheet = read_sheet(path)?;
        ledger
            .load_sheet(&sheet.sheet_id, &sheet.grid, &config.ledger)
            .map_err(|e| anyhow::anyhow!("Failed to load ledger {}: {}", path.display(), e))?;
        sheets.push(sheet);
    }
    info!("Loaded {} ledger sheets", ledger.len());

    let mut pipeline = Pipeline::new(config);
    if let Some(path) = &args.nominal {
        let table = NominalTable::from_file(path)
            .map_err(|e| anyhow::anyhow!("Failed to load nominal table {}: {}", path.display(), e))?;
        pipeline = pipeline.with_nominal_table(table);
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let mut inputs = Vec::with_capacity(files.len());
    for path in &files {
        let id = path.display().to_string();
        let input = match read_path(&id, path) {
            Ok(document) => DocumentInput::Text(document),
            Err(error) => DocumentInput::Unreadable {
                source_filename: file_name(path),
                id,
                error,
            },
        };
        inputs.push(input);
        pb.inc(1);
    }
    pb.finish_with_message("Read");

    let signed_on = args.signed_on.unwrap_or_else(|| Local::now().date_naive());
    let report = pipeline.run(inputs, &ledger, signed_on);

    fs::create_dir_all(&args.output_dir)?;

    let results_path = args.output_dir.join("results.json");
    fs::write(&results_path, serde_json::to_string_pretty(&report)?)?;
    debug!("Wrote results to {}", results_path.display());

    let summary_path = args.output_dir.join("summary.csv");
    write_summary(&summary_path, &report.results)?;

    if args.dry_run {
        println!(
            "{} Dry run: {} ledger updates not written",
            style("ℹ").blue(),
            report.updates.len()
        );
    } else {
        write_ledgers(&args.output_dir, &mut sheets, &ledger, &report)?;
    }

    print_summary(&report, start);
    println!(
        "{} Results written to {}",
        style("✓").green(),
        args.output_dir.display()
    );

    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_string()
}

/// Read a ledger CSV as a raw grid. Title rows above the header and ragged
/// rows are expected.
fn read_sheet(path: &Path) -> anyhow::Result<SheetFile> {
    let sheet_id = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| anyhow::anyhow!("Invalid ledger file name: {}", path.display()))?
        .to_string();

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut grid = Vec::new();
    for record in rdr.records() {
        let record = record?;
        grid.push(record.iter().map(String::from).collect());
    }

    debug!("Read {} rows from {}", grid.len(), path.display());
    Ok(SheetFile {
        sheet_id,
        path: path.to_path_buf(),
        grid,
    })
}

/// Apply updates and write every touched sheet to the output directory.
fn write_ledgers(
    output_dir: &Path,
    sheets: &mut [SheetFile],
    ledger: &Ledger,
    report: &BatchReport,
) -> anyhow::Result<()> {
    for sheet in sheets.iter_mut() {
        let index = ledger
            .sheet(&sheet.sheet_id)
            .ok_or_else(|| anyhow::anyhow!("Sheet '{}' not loaded", sheet.sheet_id))?;

        let written = apply_updates(&mut sheet.grid, index, &report.updates)
            .map_err(|e| anyhow::anyhow!("Failed to update {}: {}", sheet.path.display(), e))?;
        if written == 0 {
            continue;
        }

        let out_path = output_dir.join(file_name(&sheet.path));
        let mut wtr = csv::WriterBuilder::new().flexible(true).from_path(&out_path)?;
        for row in &sheet.grid {
            wtr.write_record(row)?;
        }
        wtr.flush()?;

        println!(
            "{} Updated {} rows in {}",
            style("✓").green(),
            written,
            out_path.display()
        );
    }
    Ok(())
}

fn outcome_label(outcome: MatchOutcome) -> &'static str {
    match outcome {
        MatchOutcome::Matched => "matched",
        MatchOutcome::Ambiguous => "ambiguous",
        MatchOutcome::NotFound => "not_found",
    }
}

fn write_summary(path: &Path, results: &[DocumentResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "supplier",
        "invoice_number",
        "po_number",
        "net_amount",
        "sheet",
        "outcome",
        "strategy",
        "row",
        "confidence",
        "nominal_code",
        "severity",
        "detail",
    ])?;

    for result in results {
        let invoice = result.invoice.as_ref();
        let matched = result.match_result.as_ref();
        let detail = match (&result.error, matched) {
            (Some(error), _) => error.clone(),
            (None, Some(m)) => m.reasons.last().cloned().unwrap_or_default(),
            (None, None) => String::new(),
        };

        wtr.write_record([
            result.source_filename.as_str(),
            &result.status.to_string(),
            invoice.map(|i| i.supplier_name.as_str()).unwrap_or(""),
            invoice.and_then(|i| i.invoice_number.as_deref()).unwrap_or(""),
            invoice.and_then(|i| i.po_number.as_deref()).unwrap_or(""),
            &invoice.map(|i| i.net_amount.to_string()).unwrap_or_default(),
            result.sheet_id.as_deref().unwrap_or(""),
            matched.map(|m| outcome_label(m.outcome)).unwrap_or(""),
            &matched
                .and_then(|m| m.strategy_used)
                .map(|s| s.to_string())
                .unwrap_or_default(),
            &matched
                .and_then(|m| m.matched_row.as_ref())
                .map(|r| r.display_row().to_string())
                .unwrap_or_default(),
            &matched.map(|m| format!("{:.2}", m.confidence)).unwrap_or_default(),
            result.nominal_code.as_deref().unwrap_or(""),
            &result
                .worst_severity()
                .map(|s| format!("{:?}", s).to_lowercase())
                .unwrap_or_default(),
            &detail,
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

fn print_summary(report: &BatchReport, start: Instant) {
    let summary = &report.summary;

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        summary.total,
        start.elapsed()
    );
    println!(
        "   {} matched, {} need review, {} failed",
        style(summary.matched).green(),
        style(summary.needs_review).yellow(),
        style(summary.failed).red()
    );

    let review: Vec<&DocumentResult> = report
        .results
        .iter()
        .filter(|r| r.error.is_some() || r.match_result.as_ref().is_some_and(|m| !m.is_matched()))
        .collect();

    if !review.is_empty() {
        println!();
        println!("{}", style("Needs attention:").yellow());
        for result in review {
            let reason = result
                .error
                .clone()
                .or_else(|| result.match_result.as_ref().and_then(|m| m.reasons.last().cloned()))
                .unwrap_or_else(|| "unknown".to_string());
            println!("  - {}: {}", result.source_filename, reason);
        }
    }
}
