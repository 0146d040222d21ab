//! Users command - list everyone who has signed in.

use super::{get_database, load_config};
use anyhow::Result;
use colored::Colorize;

pub fn run() -> Result<()> {
    let (_config, paths) = load_config()?;
    let db = get_database(&paths)?;

    let users = db.list_users()?;
    if users.is_empty() {
        println!("{}", "No registered users yet.".dimmed());
        return Ok(());
    }

    println!("{}", "Registered Users".cyan().bold());
    println!("{}", "─".repeat(70));

    for user in &users {
        let documents = db.list_ingests(&user.email, 5)?;
        println!(
            "  {} {} <{}>",
            "●".green(),
            user.name.white().bold(),
            user.email
        );
        println!(
            "    Joined: {}  Last login: {}",
            user.created_at.format("%Y-%m-%d %H:%M"),
            user.last_login_at.format("%Y-%m-%d %H:%M")
        );
        if !documents.is_empty() {
            let names: Vec<&str> = documents.iter().map(|d| d.file_name.as_str()).collect();
            println!("    Recent PDFs: {}", names.join(", ").dimmed());
        }
    }

    println!();
    println!(
        "{} user(s), {} document(s) processed",
        users.len(),
        db.count_ingests()?
    );

    Ok(())
}
