//! Serve command - run the web app.

use super::{load_authenticator, load_config};
use crate::server::{self, AppState};
use anyhow::{Context, Result};
use colored::Colorize;
use jee_db::Database;
use tokio::runtime::Runtime;
use tracing::warn;

pub fn run(bind: Option<String>) -> Result<()> {
    let (mut config, paths) = load_config()?;
    if let Some(bind) = bind {
        config.server.bind = bind;
    }

    paths.ensure_dirs().context("Failed to create directories")?;
    let db = Database::open(&paths.database_file).context("Failed to open database")?;

    let authenticator = match load_authenticator(&config, &paths) {
        Ok(auth) => Some(auth),
        Err(e) => {
            if config.auth.required {
                warn!("Google sign-in unavailable: {:#}", e);
            }
            None
        }
    };

    let state = AppState::new(config.clone(), paths, db, authenticator);

    println!("{}", "Chat Jee".cyan().bold());
    println!("{}", "─".repeat(50));
    println!("  Listening on: {}", format!("http://{}", config.server.bind).cyan());
    println!(
        "  AI: {}",
        if state.tutor().is_ready() {
            "ready".green()
        } else {
            "not configured".yellow()
        }
    );
    println!(
        "  Sign-in: {}",
        if !config.auth.required {
            "disabled (guest mode)".yellow()
        } else if state.sign_in_available() {
            "Google".green()
        } else {
            "unavailable (client secrets missing)".red()
        }
    );
    println!();

    let rt = Runtime::new().context("Failed to create async runtime")?;
    rt.block_on(server::serve(state, &config.server.bind))
}
