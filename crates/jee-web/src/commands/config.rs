//! Configuration commands.

use super::get_paths;
use anyhow::{Context, Result};
use colored::Colorize;
use jee_config::Config;

pub fn show() -> Result<()> {
    let paths = get_paths()?;

    if !paths.config_file.exists() {
        anyhow::bail!("Config file not found. Run 'chatjee init' first.");
    }

    let mut config = Config::load_from(&paths.config_file).context("Failed to load config")?;
    config.apply_env();

    // Never echo the key itself.
    if let Some(key) = config.gemini.api_key.as_mut() {
        *key = mask_secret(key);
    }

    let contents = toml::to_string_pretty(&config).context("Failed to render config")?;

    println!("{}", "Current Configuration".cyan().bold());
    println!("{}", "─".repeat(50));
    println!("{}", contents);

    Ok(())
}

pub fn path() -> Result<()> {
    let paths = get_paths()?;
    println!("{}", paths.config_file.display());
    Ok(())
}

pub fn set(key: &str, value: &str) -> Result<()> {
    let paths = get_paths()?;

    let mut config = Config::load_from(&paths.config_file).context("Failed to load config")?;
    config.set(key, value)?;
    config
        .save_to(&paths.config_file)
        .context("Failed to save config")?;

    let shown = if key == "gemini.api_key" {
        mask_secret(value)
    } else {
        value.to_string()
    };
    println!("{} Set {} = {}", "✓".green(), key.cyan(), shown);

    Ok(())
}

fn mask_secret(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    format!("{}…", visible)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret("AIzaSyExample"), "AIza…");
        assert_eq!(mask_secret("ab"), "ab…");
    }
}
