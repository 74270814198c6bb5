//! Process command - extract fields from a single invoice document.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::info;

use invmatch_core::invoice::{InvoiceParser, RuleInvoiceParser};
use invmatch_core::models::invoice::InvoiceRecord;
use invmatch_core::source::read_path;

use super::load_config;

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (PDF or pre-extracted text)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Show which rule produced each field
    #[arg(long)]
    show_rules: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

pub fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let document = read_path("doc-1", &args.input)?;
    let parser = RuleInvoiceParser::new().with_config(config.extraction.clone());
    let result = parser.parse(&document)?;
    let invoice = result.invoice;

    for warning in &result.warnings {
        eprintln!("{} {}", style("⚠").yellow(), warning);
    }

    let output = format_invoice(&invoice, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if args.show_rules {
        println!();
        for (field, rule) in &invoice.provenance {
            println!("{} {:<14} {}", style("ℹ").blue(), field.as_str(), rule);
        }
        println!(
            "{} Routed to sheet '{}'",
            style("ℹ").blue(),
            config.sheet_for(invoice.supplier_code.as_deref())
        );
        println!("{} Processing time: {:?}", style("ℹ").blue(), start.elapsed());
    }

    Ok(())
}

fn format_invoice(invoice: &InvoiceRecord, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(invoice)?),
        OutputFormat::Csv => format_csv(invoice),
        OutputFormat::Text => Ok(format_text(invoice)),
    }
}

fn format_csv(invoice: &InvoiceRecord) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "supplier",
        "invoice_number",
        "po_number",
        "invoice_date",
        "store",
        "net_amount",
        "vat_amount",
        "total_amount",
        "currency",
    ])?;

    wtr.write_record([
        invoice.supplier_name.as_str(),
        invoice.invoice_number.as_deref().unwrap_or(""),
        invoice.po_number.as_deref().unwrap_or(""),
        &invoice.invoice_date.map(|d| d.to_string()).unwrap_or_default(),
        invoice.store_name.as_deref().unwrap_or(""),
        &invoice.net_amount.to_string(),
        &invoice.vat_amount.map(|a| a.to_string()).unwrap_or_default(),
        &invoice.total_amount.map(|a| a.to_string()).unwrap_or_default(),
        invoice.currency.as_str(),
    ])?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(invoice: &InvoiceRecord) -> String {
    let mut output = String::new();

    output.push_str(&format!("Supplier: {}", invoice.supplier_name));
    if let Some(code) = &invoice.supplier_code {
        output.push_str(&format!(" ({})", code));
    }
    output.push('\n');

    let optional = [
        ("Invoice", invoice.invoice_number.clone()),
        ("PO", invoice.po_number.clone()),
        ("Date", invoice.invoice_date.map(|d| d.format("%d/%m/%Y").to_string())),
        ("Store", invoice.store_name.clone()),
    ];
    for (label, value) in &optional {
        output.push_str(&format!("{}: {}\n", label, value.as_deref().unwrap_or("-")));
    }
    output.push('\n');

    output.push_str("Amounts:\n");
    output.push_str(&format!("  Net:   {} {}\n", invoice.net_amount, invoice.currency));
    if let Some(vat) = invoice.vat_amount {
        output.push_str(&format!("  VAT:   {} {}\n", vat, invoice.currency));
    }
    if let Some(total) = invoice.total_amount {
        output.push_str(&format!("  Gross: {} {}\n", total, invoice.currency));
    }

    if let Some(description) = &invoice.description {
        output.push_str(&format!("\nWork: {}\n", description));
    }

    output
}
