//! Command-line front end for tc-helper.

mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{markdown, topic, user};
use std::path::PathBuf;

/// Topcoder user/topic lookups and markdown rendering
#[derive(Parser)]
#[command(name = "tc-helper")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Output format
    #[arg(short, long, global = true, default_value = "plain")]
    format: output::OutputFormat,

    /// Show verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file
    #[arg(short, long, global = true, env = "TC_HELPER_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up users by ID
    #[command(alias = "u")]
    Users(user::UsersArgs),

    /// Read a topic
    #[command(alias = "t")]
    Topic(topic::TopicArgs),

    /// Render markdown to HTML
    #[command(alias = "md")]
    Markdown(markdown::MarkdownArgs),

    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let path = match cli.config {
        Some(path) => path,
        None => config::config_path()?,
    };
    let cfg = config::load_config(&path)?.with_env();
    tracing::debug!(path = %path.display(), "configuration loaded");

    match cli.command {
        Commands::Users(args) => user::handle(args, &cfg, cli.format).await,
        Commands::Topic(args) => topic::handle(args, &cfg).await,
        Commands::Markdown(args) => markdown::handle(args),
        Commands::Config => {
            println!("Config file: {}", path.display());
            print!("{}", toml::to_string_pretty(&cfg.redacted())?);
            Ok(())
        }
    }
}
