//! Latest command - extract the newest PDF in a directory.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use recibo_core::document::process_file;
use recibo_core::output::{output_path_for, to_json, write_record};
use recibo_core::{select_latest_pdf, ReceiptParser};

use super::load_config;

/// Exit status when the directory holds no PDF.
pub const EXIT_NOTHING_TO_DO: u8 = 3;

/// Arguments for the latest command.
#[derive(Args)]
pub struct LatestArgs {
    /// Directory to search for PDF receipts
    #[arg(default_value = ".")]
    dir: PathBuf,

    /// Also print the JSON to stdout
    #[arg(long)]
    print: bool,
}

pub async fn run(args: LatestArgs, config_path: Option<&str>) -> anyhow::Result<ExitCode> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let Some(pdf) = select_latest_pdf(&args.dir)? else {
        eprintln!(
            "{} No PDF files found in {}",
            style("✗").red(),
            args.dir.display()
        );
        return Ok(ExitCode::from(EXIT_NOTHING_TO_DO));
    };

    info!("Latest PDF: {}", pdf.display());

    let parser = ReceiptParser::from_config(&config.extraction);
    let result = process_file(&pdf, &parser, &config.pdf)?;
    for warning in &result.warnings {
        info!("{}", warning);
    }

    let output_path = output_path_for(&pdf);
    if output_path.exists() && !config.output.overwrite {
        anyhow::bail!(
            "Output file already exists: {} (output.overwrite is false)",
            output_path.display()
        );
    }

    write_record(&result.record, &output_path, config.output.indent)?;

    if args.print {
        println!("{}", to_json(&result.record, config.output.indent)?);
    }

    println!(
        "{} Data exported to {}",
        style("✓").green(),
        output_path.display()
    );

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(ExitCode::SUCCESS)
}
