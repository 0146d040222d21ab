//! Status command - configuration, AI and sign-in state at a glance.

use super::{load_authenticator, load_config};
use anyhow::{Context, Result};
use colored::Colorize;
use jee_auth::TokenStore;
use jee_db::Database;
use jee_gemini::GeminiClient;
use tokio::runtime::Runtime;

pub fn run() -> Result<()> {
    let (config, paths) = load_config()?;

    println!("{}", "Chat Jee Status".cyan().bold());
    println!("{}", "─".repeat(50));

    println!();
    println!("{}", "Configuration".white().bold());
    println!(
        "  {} Config: {}",
        marker(paths.config_file.exists()),
        paths.config_file.display()
    );
    println!(
        "  {} Database: {}",
        marker(paths.database_file.exists()),
        paths.database_file.display()
    );
    println!("  Bind: {}", config.server.bind);

    println!();
    println!("{}", "Gemini".white().bold());
    match GeminiClient::from_config(&config.gemini) {
        Ok(client) => {
            let rt = Runtime::new().context("Failed to create async runtime")?;
            let available = rt.block_on(client.is_available());
            println!("  Model: {}", client.model());
            if available {
                println!("  {} AI Ready", "✓".green());
            } else {
                println!(
                    "  {} Could not reach {} with the configured key",
                    "✗".red(),
                    client.base_url()
                );
            }
        }
        Err(e) => println!("  {} {}", "✗".red(), e),
    }

    println!();
    println!("{}", "Sign-in".white().bold());
    if !config.auth.required {
        println!("  {} Disabled (guest mode)", "○".yellow());
    }
    match load_authenticator(&config, &paths) {
        Ok(_) => println!(
            "  {} Client secrets: {}",
            "✓".green(),
            config.client_secrets_path(&paths).display()
        ),
        Err(e) => println!("  {} {:#}", "✗".red(), e),
    }

    let store = TokenStore::new(&paths.token_file);
    match store.load() {
        Some(credentials) if credentials.is_valid() => {
            println!("  {} CLI token valid", "✓".green())
        }
        Some(credentials) if credentials.can_refresh() => {
            println!("  {} CLI token expired (refreshable)", "◐".blue())
        }
        Some(_) => println!("  {} CLI token expired", "✗".red()),
        None => println!("  {} Not signed in from the terminal", "○".yellow()),
    }

    if paths.database_file.exists() {
        let db = Database::open(&paths.database_file).context("Failed to open database")?;
        println!();
        println!("{}", "Usage".white().bold());
        println!("  Registered users: {}", db.count_users()?);
        println!("  PDFs processed: {}", db.count_ingests()?);
    }

    Ok(())
}

fn marker(ok: bool) -> colored::ColoredString {
    if ok {
        "✓".green()
    } else {
        "✗".red()
    }
}
