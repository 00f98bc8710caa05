//! Sweets CLI - Database migrations and maintenance tools.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! sweets-cli migrate
//!
//! # Load the starter cookie catalog into an empty database
//! sweets-cli seed products
//!
//! # Grant or revoke admin access for an existing account
//! sweets-cli admin grant -e dani@example.com
//! sweets-cli admin revoke -e dani@example.com
//!
//! # Remove checkout leftovers (orders that never received items)
//! sweets-cli orders purge-orphans --older-than-minutes 60
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "sweets-cli")]
#[command(author, version, about = "Sweets by Dani CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run storefront database migrations
    Migrate,
    /// Seed the database
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
    /// Manage the admin flag on customer profiles
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Order maintenance
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Insert the starter cookie catalog (skipped when products exist)
    Products,
}

#[derive(Subcommand)]
enum AdminAction {
    /// Give an existing account admin access
    Grant {
        /// Account email address
        #[arg(short, long)]
        email: String,
    },
    /// Remove admin access from an account
    Revoke {
        /// Account email address
        #[arg(short, long)]
        email: String,
    },
}

#[derive(Subcommand)]
enum OrdersAction {
    /// Delete pending orders that have no items
    PurgeOrphans {
        /// Only remove orders older than this many minutes
        #[arg(long, default_value_t = 30)]
        older_than_minutes: u32,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::storefront().await?,
        Commands::Seed { target } => match target {
            SeedTarget::Products => {
                commands::seed::products().await?;
            }
        },
        Commands::Admin { action } => match action {
            AdminAction::Grant { email } => commands::admin::set_admin(&email, true).await?,
            AdminAction::Revoke { email } => commands::admin::set_admin(&email, false).await?,
        },
        Commands::Orders { action } => match action {
            OrdersAction::PurgeOrphans { older_than_minutes } => {
                commands::orders::purge_orphans(older_than_minutes).await?;
            }
        },
    }
    Ok(())
}
