//! Process command - extract data from a single receipt file.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use recibo_core::document::process_file;
use recibo_core::output::to_json;
use recibo_core::{InvoiceRecord, ReceiptParser};

use super::load_config;

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (PDF, or text already extracted from one)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Validate extracted data
    #[arg(long)]
    validate: bool,

    /// List fields that fell back to their defaults
    #[arg(long)]
    show_warnings: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output, one row per line item
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    /// File extension used when writing this format.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    // Check input file exists
    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let parser = ReceiptParser::from_config(&config.extraction);
    let result = process_file(&args.input, &parser, &config.pdf)?;
    let record = &result.record;

    // Validate if requested
    if args.validate {
        let issues = record.validate();
        if !issues.is_empty() {
            eprintln!("{}", style("Validation issues:").yellow());
            for issue in &issues {
                eprintln!("  - {}", issue);
            }
        }
    }

    let output = format_record(record, args.format, config.output.indent)?;

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

    if args.show_warnings {
        eprintln!();
        if result.warnings.is_empty() {
            eprintln!("{} All fields found", style("ℹ").blue());
        }
        for warning in &result.warnings {
            eprintln!("{} {}", style("⚠").yellow(), warning);
        }
        eprintln!(
            "{} Processing time: {}ms",
            style("ℹ").blue(),
            result.processing_time_ms
        );
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Render a record in the requested format.
pub fn format_record(
    record: &InvoiceRecord,
    format: OutputFormat,
    indent: usize,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(to_json(record, indent)?),
        OutputFormat::Csv => format_csv(record),
        OutputFormat::Text => Ok(format_text(record)),
    }
}

fn format_csv(record: &InvoiceRecord) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "archivo_pdf",
        "proveedor",
        "comprobante",
        "fecha",
        "tipo_cambio",
        "iva",
        "percepciones",
        "codigo",
        "cantidad",
        "importe_pesos",
    ])?;

    let header = [
        record.source_file.clone(),
        record.supplier_name.clone(),
        record.receipt_reference.to_string(),
        record.issue_date.to_string(),
        record.exchange_rate.to_string(),
        record.tax_amount_local.to_string(),
        record.withholding_amount_local.to_string(),
    ];

    if record.line_items.is_empty() {
        wtr.write_record(header.iter().map(String::as_str).chain(["", "", ""]))?;
    }

    for item in &record.line_items {
        let quantity = item.quantity.to_string();
        let amount = item.amount_local.to_string();
        wtr.write_record(
            header
                .iter()
                .map(String::as_str)
                .chain([item.product_code.as_str(), quantity.as_str(), amount.as_str()]),
        )?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(record: &InvoiceRecord) -> String {
    let mut output = String::new();

    output.push_str(&format!("File: {}\n", record.source_file));
    output.push_str(&format!("Supplier: {}\n", record.supplier_name));
    output.push_str(&format!("Receipt: {}\n", record.receipt_reference));
    output.push_str(&format!("Date: {}\n", record.issue_date));
    output.push_str(&format!("Exchange rate: {}\n", record.exchange_rate));
    output.push('\n');

    output.push_str("Items:\n");
    for item in &record.line_items {
        output.push_str(&format!(
            "  {:<12} {:>10} {:>14}\n",
            item.product_code, item.quantity, item.amount_local
        ));
    }
    output.push('\n');

    output.push_str("Summary:\n");
    output.push_str(&format!("  Items:        {}\n", record.items_total_local()));
    output.push_str(&format!("  VAT 21%:      {}\n", record.tax_amount_local));
    output.push_str(&format!("  Perceptions:  {}\n", record.withholding_amount_local));

    output
}
