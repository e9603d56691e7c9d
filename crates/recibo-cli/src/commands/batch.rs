//! Batch processing command for multiple receipt files.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tracing::{debug, error, warn};

use recibo_core::document::{process_file, DocumentKind};
use recibo_core::models::config::PdfConfig;
use recibo_core::output::output_path_for;
use recibo_core::{InvoiceRecord, ReceiptParser};

use super::load_config;
use super::process::{format_record, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern matching the input files
    #[arg(required = true)]
    input: String,

    /// Output directory (default: next to each input)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of parallel workers
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    record: Option<InvoiceRecord>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    // Expand glob pattern
    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file() && DocumentKind::from_path(p).is_some())
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some((first, second, output)) =
        find_output_collision(&files, args.output_dir.as_deref(), args.format)
    {
        anyhow::bail!(
            "{} and {} would both write {}",
            first.display(),
            second.display(),
            output.display()
        );
    }

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let parser = Arc::new(ReceiptParser::from_config(&config.extraction));
    let pdf_config = Arc::new(config.pdf.clone());
    let semaphore = Arc::new(Semaphore::new(args.jobs.max(1)));

    let handles: Vec<_> = files
        .into_iter()
        .map(|path| {
            let parser = Arc::clone(&parser);
            let pdf_config = Arc::clone(&pdf_config);
            let semaphore = Arc::clone(&semaphore);
            tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await?;
                let result = tokio::task::spawn_blocking(move || {
                    process_single_file(path, &parser, &pdf_config)
                })
                .await?;
                anyhow::Ok(result)
            })
        })
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    let mut handles = handles.into_iter();

    while let Some(handle) = handles.next() {
        let result = handle.await??;
        pb.inc(1);

        if let Some(ref error_msg) = result.error {
            if args.continue_on_error {
                warn!("Failed to process {}: {}", result.path.display(), error_msg);
            } else {
                error!("Failed to process {}: {}", result.path.display(), error_msg);
                handles.for_each(|h| h.abort());
                pb.abandon();
                anyhow::bail!("Processing failed for {}: {}", result.path.display(), error_msg);
            }
        }

        results.push(result);
    }

    pb.finish_and_clear();

    // Write outputs
    for result in &results {
        if let Some(record) = &result.record {
            let output_path = output_path(&result.path, args.output_dir.as_deref(), args.format);
            if output_path.exists() && !config.output.overwrite {
                warn!("Skipping existing output {}", output_path.display());
                continue;
            }
            let content = format_record(record, args.format, config.output.indent)?;
            fs::write(&output_path, content)?;
            debug!("Wrote output to {}", output_path.display());
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(results.len() - failed.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn process_single_file(path: PathBuf, parser: &ReceiptParser, pdf_config: &PdfConfig) -> ProcessResult {
    let file_start = Instant::now();
    let outcome = process_file(&path, parser, pdf_config);
    let processing_time_ms = file_start.elapsed().as_millis() as u64;

    match outcome {
        Ok(extraction) => ProcessResult {
            path,
            record: Some(extraction.record),
            error: None,
            processing_time_ms,
        },
        Err(e) => ProcessResult {
            path,
            record: None,
            error: Some(e.to_string()),
            processing_time_ms,
        },
    }
}

/// Where the output for `input` goes: into `output_dir` when given, else
/// next to the input.
fn output_path(input: &Path, output_dir: Option<&Path>, format: OutputFormat) -> PathBuf {
    let beside = output_path_for(input).with_extension(format.extension());
    match (output_dir, beside.file_name()) {
        (Some(dir), Some(name)) => dir.join(name),
        _ => beside,
    }
}

/// First pair of inputs that map to the same output file, if any.
fn find_output_collision(
    files: &[PathBuf],
    output_dir: Option<&Path>,
    format: OutputFormat,
) -> Option<(PathBuf, PathBuf, PathBuf)> {
    let mut seen: HashMap<PathBuf, &PathBuf> = HashMap::new();
    for file in files {
        let output = output_path(file, output_dir, format);
        if let Some(first) = seen.get(&output) {
            return Some(((*first).clone(), file.clone(), output));
        }
        seen.insert(output, file);
    }
    None
}

fn write_summary(path: &Path, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "proveedor",
        "comprobante",
        "fecha",
        "tipo_cambio",
        "iva",
        "percepciones",
        "productos",
        "total_productos",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");

        if let Some(record) = &result.record {
            wtr.write_record([
                filename,
                "success",
                &record.supplier_name,
                &record.receipt_reference.to_string(),
                &record.issue_date.to_string(),
                &record.exchange_rate.to_string(),
                &record.tax_amount_local.to_string(),
                &record.withholding_amount_local.to_string(),
                &record.line_items.len().to_string(),
                &record.items_total_local().to_string(),
                &result.processing_time_ms.to_string(),
                "",
            ])?;
        } else {
            wtr.write_record([
                filename,
                "error",
                "",
                "",
                "",
                "",
                "",
                "",
                "",
                "",
                &result.processing_time_ms.to_string(),
                result.error.as_deref().unwrap_or(""),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_beside_input() {
        assert_eq!(
            output_path(Path::new("in/a.pdf"), None, OutputFormat::Json),
            PathBuf::from("in/a.json")
        );
        assert_eq!(
            output_path(Path::new("in/a.txt"), Some(Path::new("out")), OutputFormat::Csv),
            PathBuf::from("out/a.csv")
        );
    }

    #[test]
    fn test_same_stem_inputs_collide() {
        let files = vec![
            PathBuf::from("in/a.pdf"),
            PathBuf::from("in/b.pdf"),
            PathBuf::from("in/a.txt"),
        ];
        assert_eq!(
            find_output_collision(&files, None, OutputFormat::Json),
            Some((
                PathBuf::from("in/a.pdf"),
                PathBuf::from("in/a.txt"),
                PathBuf::from("in/a.json"),
            ))
        );

        let files = vec![PathBuf::from("x/a.pdf"), PathBuf::from("y/a.pdf")];
        assert_eq!(find_output_collision(&files, None, OutputFormat::Json), None);
        assert!(find_output_collision(&files, Some(Path::new("out")), OutputFormat::Json).is_some());
    }

    #[test]
    fn test_summary_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.csv");
        let results = vec![
            ProcessResult {
                path: PathBuf::from("a.pdf"),
                record: Some(InvoiceRecord::new("a.pdf")),
                error: None,
                processing_time_ms: 3,
            },
            ProcessResult {
                path: PathBuf::from("b.pdf"),
                record: None,
                error: Some("broken".to_string()),
                processing_time_ms: 1,
            },
        ];

        write_summary(&path, &results).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("a.pdf,success,"));
        assert!(lines[2].starts_with("b.pdf,error,"));
        assert!(lines[2].ends_with(",1,broken"));
    }
}
