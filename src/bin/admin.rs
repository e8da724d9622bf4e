//! CLI administration tool for shortlink.
//!
//! Works directly on the file store, without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Shorten a URL (60 minute validity, preferred code)
//! cargo run --bin admin -- shorten https://example.com --validity 60 --code promo
//!
//! # List live links with click counts
//! cargo run --bin admin -- stats
//!
//! # Show where a shortcode points (no click is recorded)
//! cargo run --bin admin -- resolve promo
//!
//! # Inspect or clear pending form drafts
//! cargo run --bin admin -- drafts list
//! cargo run --bin admin -- drafts clear -y
//! ```
//!
//! # Environment Variables
//!
//! Read through [`shortlink::config::load_from_env`], so the same values and
//! validation rules apply as for the server. The ones used here:
//!
//! - `STORE_PATH` (optional): data directory, default `./data`
//! - `DEFAULT_VALIDITY_MINUTES` (optional): default link lifetime, default 30
//!
//! The file store is locked while a server has it open; stop the server
//! before running commands against the same directory.

use shortlink::application::services::{LinkService, StatsService};
use shortlink::config::{self, Config};
use shortlink::domain::entities::ShortenRequest;
use shortlink::domain::repositories::DraftRepository;
use shortlink::error::AppError;
use shortlink::infrastructure::persistence::FileLinkRepository;
use shortlink::infrastructure::telemetry::NullTelemetry;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use std::path::PathBuf;
use std::sync::Arc;

/// CLI tool for managing shortlink data.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Data directory (overrides STORE_PATH)
    #[arg(long, global = true)]
    path: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level commands.
#[derive(Subcommand)]
enum Commands {
    /// Shorten a URL
    Shorten {
        /// The URL to shorten
        url: String,

        /// Validity in minutes
        #[arg(short, long)]
        validity: Option<i64>,

        /// Preferred shortcode (4-10 letters or digits)
        #[arg(short, long)]
        code: Option<String>,
    },

    /// Show live links with click counts
    Stats,

    /// Show where a shortcode points
    Resolve {
        shortcode: String,
    },

    /// Manage pending form drafts
    Drafts {
        #[command(subcommand)]
        action: DraftsAction,
    },
}

/// Draft subcommands.
#[derive(Subcommand)]
enum DraftsAction {
    /// List saved drafts
    List,

    /// Remove every saved draft
    Clear {
        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = config::load_from_env().context("Invalid configuration")?;

    let path = cli.path.unwrap_or_else(|| config.store_path.clone());

    let store = Arc::new(FileLinkRepository::open(&path).await.with_context(|| {
        format!(
            "Failed to open store at {} (is the server running on it?)",
            path.display()
        )
    })?);

    match cli.command {
        Commands::Shorten {
            url,
            validity,
            code,
        } => shorten(store, &config, url, validity, code).await?,
        Commands::Stats => show_stats(store).await?,
        Commands::Resolve { shortcode } => resolve(store, &shortcode).await?,
        Commands::Drafts { action } => match action {
            DraftsAction::List => list_drafts(store).await?,
            DraftsAction::Clear { yes } => clear_drafts(store, yes).await?,
        },
    }

    Ok(())
}

/// Creates one link and prints its details.
async fn shorten(
    store: Arc<FileLinkRepository>,
    config: &Config,
    url: String,
    validity: Option<i64>,
    code: Option<String>,
) -> Result<()> {
    println!("{}", "🔗 Shorten URL".bright_blue().bold());
    println!();

    let service = LinkService::new(store, Arc::new(NullTelemetry::default()))
        .with_default_validity(config.default_validity_minutes);

    let mut request = ShortenRequest::new(url);
    request.requested_validity_minutes = validity;
    request.preferred_shortcode = code;

    match service.shorten(&request).await {
        Ok(record) => {
            println!("{}", "✅ Link created".green().bold());
            println!("  Shortcode: {}", record.shortcode.bright_yellow().bold());
            println!("  Target:    {}", record.original_url.cyan());
            if let Some(expires_at) = record.expires_at {
                println!(
                    "  Expires:   {}",
                    expires_at.format("%Y-%m-%d %H:%M:%S UTC").to_string().bright_black()
                );
            }
            println!();
            Ok(())
        }
        Err(e) => {
            println!("{} {}", "❌".red(), e.to_string().red());
            Err(anyhow::anyhow!("shorten failed: {}", e.code()))
        }
    }
}

/// Lists live links, most recent first.
///
/// # Output Format
///
/// ```text
/// 📊 Live links
///
///   Code        Clicks  Expires           Target
///   ──────────────────────────────────────────────────────────────
///   promo       3       2025-01-01 13:00  https://example.com
/// ```
async fn show_stats(store: Arc<FileLinkRepository>) -> Result<()> {
    println!("{}", "📊 Live links".bright_blue().bold());
    println!();

    let summaries = StatsService::new(store)
        .summarize(Utc::now())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read store: {}", e))?;

    if summaries.is_empty() {
        println!("{}", "  No live links".yellow());
        println!();
        println!(
            "  Create one with: {} admin shorten <url>",
            "cargo run --bin".bright_cyan()
        );
        return Ok(());
    }

    println!(
        "  {:<11} {:<7} {:<17} {}",
        "Code".bright_white().bold(),
        "Clicks".bright_white().bold(),
        "Expires".bright_white().bold(),
        "Target".bright_white().bold()
    );
    println!("  {}", "─".repeat(75).bright_black());

    for summary in &summaries {
        let expires = summary
            .expires_at
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "never".to_string());

        println!(
            "  {:<11} {:<7} {:<17} {}",
            summary.shortcode.cyan(),
            summary.click_count.to_string().bright_white(),
            expires.bright_black(),
            summary.original_url
        );
    }

    println!();
    println!(
        "  Total: {}",
        summaries.len().to_string().bright_white().bold()
    );
    println!();

    Ok(())
}

/// Looks a shortcode up without recording a click.
async fn resolve(store: Arc<FileLinkRepository>, shortcode: &str) -> Result<()> {
    match StatsService::new(store)
        .link_summary(shortcode, Utc::now())
        .await
    {
        Ok(summary) => {
            println!(
                "{} {} {}",
                shortcode.bright_yellow().bold(),
                "→".bright_black(),
                summary.original_url.cyan()
            );
            println!("  Clicks: {}", summary.click_count);
            Ok(())
        }
        Err(AppError::Expired { expired_at, .. }) => {
            let when = expired_at
                .map(|at| at.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                .unwrap_or_default();
            println!("{} {}", "⌛ Expired".yellow().bold(), when.bright_black());
            Ok(())
        }
        Err(AppError::NotFound { .. }) => {
            println!("{}", "❌ No such shortcode".red());
            Ok(())
        }
        Err(e) => Err(anyhow::anyhow!("Failed to resolve: {}", e)),
    }
}

async fn list_drafts(store: Arc<FileLinkRepository>) -> Result<()> {
    println!("{}", "📝 Drafts".bright_blue().bold());
    println!();

    let drafts = store
        .load_drafts()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read drafts: {}", e))?;

    if drafts.is_empty() {
        println!("{}", "  No drafts".yellow());
        return Ok(());
    }

    for (idx, draft) in drafts.iter().enumerate() {
        let validity = draft
            .requested_validity_minutes
            .map(|m| format!("{m} min"))
            .unwrap_or_else(|| "default".to_string());

        println!(
            "  {}. {} [{}] {}",
            idx + 1,
            draft.url().unwrap_or("<empty>").cyan(),
            validity.bright_black(),
            draft.preferred().unwrap_or("").bright_yellow()
        );
    }
    println!();

    Ok(())
}

async fn clear_drafts(store: Arc<FileLinkRepository>, skip_confirm: bool) -> Result<()> {
    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Remove all saved drafts?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    store
        .save_drafts(Vec::new())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to clear drafts: {}", e))?;

    println!("{}", "✅ Drafts cleared".green().bold());
    Ok(())
}
