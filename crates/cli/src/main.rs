//! Nursery CLI - storefront and back office from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! nursery products list --category 3 --search fern
//! nursery categories tree
//!
//! # Shop
//! nursery auth sign-in -e fern@example.in
//! nursery cart add monstera-deliciosa -q 2
//! nursery cart checkout --name "Asha Rao" --line1 "12 Garden Road" \
//!     --city Pune --state MH --postal-code 411001 --phone "+91 98200 00000"
//!
//! # Back office (admin role required)
//! nursery admin import products.csv
//! nursery admin category-move --from 2 --to 0
//!
//! # Follow category changes
//! nursery watch
//! ```
//!
//! # Environment Variables
//!
//! See `nursery_storefront::config` for the full list. `NURSERY_API_URL` is
//! required; `RUST_LOG` overrides the default log filter.

#![cfg_attr(not(test), forbid(unsafe_code))]
// Command output goes to stdout.
#![allow(clippy::print_stdout)]

use clap::{Parser, Subcommand};
use nursery_storefront::{Storefront, StorefrontConfig};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::{AdminAction, AuthAction, CartAction, CategoriesAction, OrdersAction, ProductsAction};

#[derive(Parser)]
#[command(name = "nursery")]
#[command(author, version, about = "Nursery plant shop CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse products
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
    /// Browse categories
    Categories {
        #[command(subcommand)]
        action: CategoriesAction,
    },
    /// Manage the shopping cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// View your orders
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
    /// Sign in, sign up, sign out
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },
    /// Back-office operations
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Follow category change events
    Watch,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "nursery_storefront=info,nursery_admin=info,nursery_cli=info".into()
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing();
            tracing::error!("Configuration error: {e}");
            std::process::exit(1);
        }
    };

    let sentry_guard = init_sentry(&config);
    init_tracing();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli, config).await;

    if let Err(e) = result {
        if sentry_guard.is_some() {
            sentry::capture_error(e.as_ref());
        }
        tracing::error!("Command failed: {e}");
        // Flush Sentry before exiting.
        drop(sentry_guard);
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: StorefrontConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut storefront = Storefront::new(config)?;

    match cli.command {
        Commands::Products { action } => commands::catalog::products(&mut storefront, action).await?,
        Commands::Categories { action } => commands::catalog::categories(&storefront, action).await?,
        Commands::Cart { action } => commands::cart::run(&mut storefront, action).await?,
        Commands::Orders { action } => commands::orders::run(&storefront, action).await?,
        Commands::Auth { action } => commands::auth::run(&mut storefront, action).await?,
        Commands::Admin { action } => commands::admin::run(&storefront, action).await?,
        Commands::Watch => commands::watch::run(&storefront).await?,
    }
    Ok(())
}
