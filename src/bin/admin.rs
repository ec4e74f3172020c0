//! CLI administration tool for slug-service.
//!
//! Inspects and removes short links, shows totals, and checks the database
//! without going through the HTTP API. Deletion is only available here.
//!
//! # Usage
//!
//! ```bash
//! # Show one link
//! cargo run --bin slug-admin -- link show abc12
//!
//! # Delete a link (asks for confirmation unless -y)
//! cargo run --bin slug-admin -- link delete abc12
//!
//! # View statistics
//! cargo run --bin slug-admin -- stats
//!
//! # Check database connection
//! cargo run --bin slug-admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (required): PostgreSQL connection string

use slug_service::domain::repositories::LinkRepository;
use slug_service::infrastructure::persistence::PgLinkRepository;
use slug_service::utils::slug::normalize_slug;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing slug-service.
#[derive(Parser)]
#[command(name = "slug-admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Inspect or remove short links
    Link {
        #[command(subcommand)]
        action: LinkAction,
    },

    /// Show statistics
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Link subcommands.
#[derive(Subcommand)]
enum LinkAction {
    /// Show a link and its click count
    Show {
        /// Slug to look up (case-insensitive)
        slug: String,
    },

    /// Delete a link permanently
    Delete {
        /// Slug to delete (case-insensitive)
        slug: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    let repo = PgLinkRepository::new(Arc::new(pool.clone()));

    match cli.command {
        Commands::Link { action } => handle_link_action(action, &repo).await?,
        Commands::Stats => handle_stats(&repo).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

async fn handle_link_action(action: LinkAction, repo: &PgLinkRepository) -> Result<()> {
    match action {
        LinkAction::Show { slug } => show_link(repo, &normalize_slug(&slug)).await,
        LinkAction::Delete { slug, yes } => delete_link(repo, &normalize_slug(&slug), yes).await,
    }
}

async fn show_link(repo: &PgLinkRepository, slug: &str) -> Result<()> {
    let link = repo
        .find(slug)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?;

    let Some(link) = link else {
        println!("{} {}", "No link with slug".yellow(), slug.cyan());
        return Ok(());
    };

    println!("{}", "Short link".bright_blue().bold());
    println!();
    println!("  ID:      {}", link.id.to_string().bright_black());
    println!("  Slug:    {}", link.slug.cyan());
    println!("  Target:  {}", link.target.bright_white());
    println!(
        "  Clicks:  {}",
        link.clicks.to_string().bright_green().bold()
    );
    println!(
        "  Created: {}",
        link.created_at.format("%Y-%m-%d %H:%M").to_string().bright_black()
    );
    println!(
        "  Updated: {}",
        link.updated_at.format("%Y-%m-%d %H:%M").to_string().bright_black()
    );
    println!();

    Ok(())
}

/// Deletes a link after showing it.
///
/// Requires confirmation (default: No) unless `--yes` is passed.
async fn delete_link(repo: &PgLinkRepository, slug: &str, skip_confirm: bool) -> Result<()> {
    let link = repo
        .find(slug)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
        .context("Link not found")?;

    println!("{}", "Delete short link".bright_blue().bold());
    println!();
    println!("  Slug:   {}", link.slug.cyan());
    println!("  Target: {}", link.target.bright_white());
    println!("  Clicks: {}", link.clicks.to_string().bright_black());
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Delete this link? Its slug becomes available again.")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "Cancelled".red());
            return Ok(());
        }
    }

    let deleted = repo
        .delete(slug)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to delete link: {}", e))?;

    if deleted {
        println!("{}", "Link deleted".green().bold());
    } else {
        println!("{}", "Link was already gone".yellow());
    }
    println!();

    Ok(())
}

/// Displays link and click totals.
async fn handle_stats(repo: &PgLinkRepository) -> Result<()> {
    println!("{}", "Statistics".bright_blue().bold());
    println!();

    let links = repo
        .count()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to count links: {}", e))?;
    let clicks = repo
        .total_clicks()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to count clicks: {}", e))?;

    println!("  Links:  {}", links.to_string().bright_green().bold());
    println!("  Clicks: {}", clicks.to_string().bright_green().bold());
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            let links: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM short_links")
                .fetch_one(pool)
                .await?;

            let size: String =
                sqlx::query_scalar("SELECT pg_size_pretty(pg_total_relation_size('short_links'))")
                    .fetch_one(pool)
                    .await?;

            println!("  PostgreSQL:  {}", version.bright_white());
            println!("  short_links: {} rows, {}", links, size);
            println!();
        }
    }

    Ok(())
}
