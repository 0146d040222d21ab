//! Initialize Chat Jee.

use super::get_paths;
use anyhow::{Context, Result};
use colored::Colorize;
use jee_config::Config;
use jee_db::Database;

pub fn run() -> Result<()> {
    let paths = get_paths()?;

    if paths.is_initialized() {
        println!("{} Chat Jee is already initialized.", "Note:".yellow().bold());
        println!("  Config: {}", paths.config_file.display());
        println!("  Database: {}", paths.database_file.display());
        return Ok(());
    }

    println!("{}", "Initializing Chat Jee...".cyan().bold());

    paths.ensure_dirs().context("Failed to create directories")?;
    println!("  {} Created directories", "✓".green());

    if !paths.config_file.exists() {
        Config::create_default_file(&paths.config_file)
            .context("Failed to create config file")?;
        println!(
            "  {} Created config: {}",
            "✓".green(),
            paths.config_file.display()
        );
    }

    // Honour a data_dir that was set before init.
    let config = Config::load_from(&paths.config_file).context("Failed to load config")?;
    let paths = config.resolve_paths(paths);
    paths.ensure_dirs().context("Failed to create directories")?;

    let _db = Database::open(&paths.database_file).context("Failed to initialize database")?;
    println!(
        "  {} Created database: {}",
        "✓".green(),
        paths.database_file.display()
    );

    println!();
    println!("{}", "Chat Jee initialized successfully!".green().bold());
    println!();
    println!("Next steps:");
    println!(
        "  1. Add your Gemini key: {}",
        "chatjee config set gemini.api_key <KEY>".cyan()
    );
    println!(
        "  2. Save Google OAuth client secrets to: {}",
        paths.client_secrets_file.display().to_string().cyan()
    );
    println!("  3. Start the app: {}", "chatjee serve".cyan());

    Ok(())
}
