//! Chat Jee - AI-powered JEE preparation assistant

mod commands;
mod server;

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Chat Jee - your AI-powered JEE preparation assistant
#[derive(Parser)]
#[command(name = "chatjee")]
#[command(author = "Shreyansh <shreyansh260@github.com>")]
#[command(version)]
#[command(about = "Your AI-powered JEE preparation assistant", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the web app
    Serve {
        /// Address to listen on (default: from config)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Initialize Chat Jee (create config and database)
    Init,

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Chat with the tutor in the terminal
    Chat {
        /// PDF files or directories to load as study material
        #[arg(short, long = "pdf")]
        pdfs: Vec<PathBuf>,
    },

    /// Extract text from PDFs and show what would be loaded
    Ingest {
        /// Path to a PDF or a directory of PDFs
        path: PathBuf,
    },

    /// Sign in with Google
    Login,

    /// Forget stored Google credentials
    Logout,

    /// List registered users
    Users,

    /// Show configuration, AI and sign-in status
    Status,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Print the config file location
    Path,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., gemini.model)
        key: String,

        /// Value to set
        value: String,
    },
}

const LOG_TARGETS: &[&str] = &[
    "chatjee",
    "jee_auth",
    "jee_config",
    "jee_db",
    "jee_gemini",
    "jee_ingest",
];

fn default_filter(level: &str, fallback: &str) -> String {
    let mut directives: Vec<String> = LOG_TARGETS
        .iter()
        .map(|target| format!("{}={}", target, level))
        .collect();
    directives.push(fallback.to_string());
    directives.join(",")
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_filter("debug", "info")))
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_filter("info", "warn")))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

fn main() {
    // A missing .env is fine; real environment variables still apply.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Serve { bind } => commands::serve::run(bind),
        Commands::Init => commands::init::run(),
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Show => commands::config::show(),
            ConfigCommands::Path => commands::config::path(),
            ConfigCommands::Set { key, value } => commands::config::set(&key, &value),
        },
        Commands::Chat { pdfs } => commands::chat::run(&pdfs),
        Commands::Ingest { path } => commands::ingest::run(&path),
        Commands::Login => commands::login::run(),
        Commands::Logout => commands::login::logout(),
        Commands::Users => commands::users::run(),
        Commands::Status => commands::status::run(),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}
