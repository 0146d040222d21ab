//! Ingest command - extract text from PDFs and report what would be loaded.

use super::{format_size, load_config};
use anyhow::{Context, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use jee_ingest::{Ingestor, UploadLimits};
use std::path::Path;

pub fn run(path: &Path) -> Result<()> {
    let (config, _paths) = load_config()?;
    let ingestor = Ingestor::new(UploadLimits::from_config(&config.ingest));

    println!("{} {}", "Scanning:".cyan(), path.display());
    let uploads = ingestor
        .collect_uploads(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    if uploads.is_empty() {
        println!("{}", "No PDF files found.".yellow());
        return Ok(());
    }

    let total_bytes: u64 = uploads.iter().map(|u| u.size()).sum();
    println!(
        "Found {} PDF(s), {}",
        uploads.len(),
        format_size(total_bytes)
    );

    let pb = ProgressBar::new(uploads.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let report = ingestor.ingest_batch(&uploads, |index, _total, name| {
        pb.set_position(index as u64);
        pb.set_message(name.to_string());
    });
    pb.finish_and_clear();

    println!();
    println!("{}", "Documents".white().bold());
    println!("{}", "─".repeat(50));
    for doc in &report.documents {
        println!(
            "  {} {} ({} pages, {} chars) {}",
            "✓".green(),
            doc.name,
            doc.pages,
            doc.char_count(),
            format!("[{}]", &doc.content_hash[..12.min(doc.content_hash.len())]).dimmed()
        );
    }
    for failure in &report.failures {
        println!("  {} {}: {}", "✗".red(), failure.name, failure.error);
    }

    println!();
    let summary = format!(
        "Processed {} out of {} PDF(s)",
        report.succeeded(),
        report.total()
    );
    if report.is_success() {
        println!("{}", summary.green().bold());
        let chars: usize = report.documents.iter().map(|d| d.char_count()).sum();
        let limit = config.chat.max_material_chars;
        if chars > limit {
            println!(
                "{} Only the first {} of {} characters are sent with each question.",
                "Note:".yellow(),
                limit,
                chars
            );
        }
    } else {
        println!("{}", "No PDFs could be processed successfully.".red().bold());
    }

    Ok(())
}
