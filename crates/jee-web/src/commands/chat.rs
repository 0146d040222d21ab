//! Chat command - talk to the tutor from the terminal.

use super::load_config;
use anyhow::{Context, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use jee_config::ENV_GEMINI_API_KEY;
use jee_core::{StudySession, UserInfo};
use jee_gemini::{Tutor, TurnOutcome};
use jee_ingest::{Ingestor, UploadLimits};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;
use std::time::Duration;
use tokio::runtime::Runtime;

pub fn run(pdfs: &[PathBuf]) -> Result<()> {
    let (config, paths) = load_config()?;

    let tutor = Tutor::from_config(&config.gemini, &config.chat);
    if !tutor.is_ready() {
        anyhow::bail!(
            "Gemini is not configured. Set {} or run 'chatjee config set gemini.api_key <KEY>'.",
            ENV_GEMINI_API_KEY
        );
    }

    let mut session =
        StudySession::new(config.chat.history_capacity).with_user(UserInfo::guest());

    if !pdfs.is_empty() {
        load_pdfs(&mut session, pdfs, &config.ingest)?;
    }

    let rt = Runtime::new().context("Failed to create async runtime")?;
    let mut rl = DefaultEditor::new()?;

    let history_path = paths.data_dir.join("chat_history");
    let _ = rl.load_history(&history_path);

    println!("{}", "Chat Jee".cyan().bold());
    println!("{}", "─".repeat(50));
    println!(
        "Ask anything about JEE preparation. Type {} for commands, {} to leave.",
        "help".cyan(),
        "exit".cyan()
    );
    println!();

    loop {
        let readline = rl.readline(&format!("{} ", "you>".green().bold()));
        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line);

                match line {
                    "exit" | "quit" => {
                        println!("Goodbye!");
                        break;
                    }
                    "help" | "?" => print_help(),
                    "clear" => {
                        session.clear_history();
                        println!("{} Chat history cleared!", "✓".green());
                    }
                    "stats" => print_stats(&session),
                    _ => ask(&rt, &tutor, &mut session, line),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("Goodbye!");
                break;
            }
            Err(err) => {
                eprintln!("{} {:?}", "Error:".red(), err);
                break;
            }
        }
    }

    if let Some(parent) = history_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let _ = rl.save_history(&history_path);

    Ok(())
}

fn load_pdfs(
    session: &mut StudySession,
    pdfs: &[PathBuf],
    limits: &jee_config::IngestConfig,
) -> Result<()> {
    let ingestor = Ingestor::new(UploadLimits::from_config(limits));
    let mut documents = Vec::new();
    let mut total = 0;

    for path in pdfs {
        let report = ingestor
            .ingest_path(path, |_, _, _| {})
            .with_context(|| format!("Failed to read {}", path.display()))?;

        total += report.total();
        for failure in &report.failures {
            println!("  {} {}: {}", "✗".red(), failure.name, failure.error);
        }
        documents.extend(report.documents.into_iter().map(|doc| doc.into_document()));
    }

    if documents.is_empty() {
        println!("{}", "No PDFs could be processed successfully.".yellow());
        return Ok(());
    }

    println!(
        "{} Loaded {} out of {} PDF(s) as study material",
        "✓".green(),
        documents.len(),
        total
    );
    session.load_materials(documents);
    Ok(())
}

fn ask(rt: &Runtime, tutor: &Tutor, session: &mut StudySession, question: &str) {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message("Chat Jee is thinking...");
    pb.enable_steady_tick(Duration::from_millis(100));

    let outcome = rt.block_on(tutor.chat(session, question));
    pb.finish_and_clear();

    println!();
    match &outcome {
        TurnOutcome::Answered(text) => {
            println!("{}", "Chat Jee:".cyan().bold());
            println!("{}", text);
        }
        TurnOutcome::Rejected(text) => println!("{}", text.yellow()),
        TurnOutcome::Failed(text) => println!("{}", text.red()),
    }
    println!();
}

fn print_stats(session: &StudySession) {
    let stats = session.stats();
    println!("{}", "Session Statistics".white().bold());
    println!("  Messages: {}", stats.messages);
    println!("  Session Time: {}", stats.duration);
    println!("  PDFs Processed: {}", stats.pdfs_processed);
    println!(
        "  Materials: {}",
        if stats.has_materials { "Yes" } else { "No" }
    );
}

fn print_help() {
    println!("{}", "Commands".white().bold());
    println!("  {}   clear the conversation", "clear".cyan());
    println!("  {}   show session statistics", "stats".cyan());
    println!("  {}    leave the chat (also: quit)", "exit".cyan());
    println!();
    println!("Anything else is sent to the tutor.");
}
