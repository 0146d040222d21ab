//! Login and logout commands - Google sign-in for the terminal.

use super::{load_authenticator, load_config};
use anyhow::{Context, Result};
use colored::Colorize;
use jee_auth::{LoopbackReceiver, TokenStore};
use jee_db::Database;
use tokio::runtime::Runtime;

pub fn run() -> Result<()> {
    let (config, paths) = load_config()?;
    paths.ensure_dirs().context("Failed to create directories")?;

    let authenticator = load_authenticator(&config, &paths)?;
    let store = TokenStore::new(&paths.token_file);
    let db = Database::open(&paths.database_file).context("Failed to open database")?;

    let rt = Runtime::new().context("Failed to create async runtime")?;
    let user = rt.block_on(async {
        let receiver = LoopbackReceiver::bind(config.auth.loopback_port)
            .await
            .context("Failed to start the sign-in listener")?;

        let credentials = authenticator
            .login_interactive(&store, receiver, |url| {
                println!("{}", "Sign in with Google".cyan().bold());
                println!("{}", "─".repeat(50));
                println!("Open this URL in your browser:");
                println!();
                println!("  {}", url);
                println!();
                println!("{}", "Waiting for the browser to come back...".dimmed());
            })
            .await
            .context("Sign-in failed")?;

        authenticator
            .identify(&credentials, &db)
            .await
            .context("Failed to fetch user profile")
    })?;

    println!(
        "{} Signed in as {} <{}>",
        "✓".green(),
        user.display_name().bold(),
        user.email
    );
    println!("  Credentials: {}", store.path().display());

    Ok(())
}

pub fn logout() -> Result<()> {
    let (_config, paths) = load_config()?;
    let store = TokenStore::new(&paths.token_file);

    if store.remove().context("Failed to remove stored credentials")? {
        println!("{} Signed out", "✓".green());
    } else {
        println!("{} Not signed in.", "Note:".yellow().bold());
    }

    Ok(())
}
