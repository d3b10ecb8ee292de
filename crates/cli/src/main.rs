//! QKart CLI - Terminal front end for the QKart storefront.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! qkart products
//! qkart search "tan shoes"
//!
//! # Search as you type (one line per keystroke burst)
//! qkart browse
//!
//! # Account
//! qkart register -u crio.do -p learnwithcrio -c learnwithcrio
//! qkart login -u crio.do -p learnwithcrio
//! qkart whoami
//! qkart logout
//!
//! # Cart
//! qkart add BW0jAAeDJmlZCF8i
//! qkart set BW0jAAeDJmlZCF8i 3
//! qkart cart
//! ```
//!
//! Configuration comes from the environment (and `.env`); see
//! `qkart_storefront::config`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use qkart_core::ProductId;
use qkart_storefront::{Storefront, StorefrontConfig, report};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod output;

use commands::CommandError;

#[derive(Parser)]
#[command(name = "qkart")]
#[command(author, version, about = "QKart storefront in the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every product
    Products,
    /// Search products by name or category
    Search {
        /// Text to search for
        text: String,
    },
    /// Search interactively; each input line replaces the search text.
    /// The last line is still searched when input ends
    Browse,
    /// Show the cart with totals
    Cart,
    /// Add one of a product to the cart
    Add {
        /// Product id
        product_id: String,
    },
    /// Change the quantity of a cart item (0 removes it)
    Set {
        /// Product id
        product_id: String,
        /// New quantity
        qty: u32,
    },
    /// Create an account
    Register {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
        /// Password again
        #[arg(short = 'c', long)]
        confirm_password: String,
    },
    /// Log in and remember the session
    Login {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
    },
    /// Forget the saved session
    Logout,
    /// Show who is logged in
    Whoami,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
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
        tracing::Level::TRACE => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = StorefrontConfig::from_env();

    // Sentry goes first so the tracing layer has a client to report to
    let _sentry_guard = config.as_ref().ok().and_then(init_sentry);

    // Logs go to stderr; stdout is for command output
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "qkart_storefront=info,qkart_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    let mut storefront = match Storefront::from_config(config) {
        Ok(storefront) => storefront,
        Err(e) => {
            tracing::error!(error = %e, "Failed to initialize storefront");
            return ExitCode::FAILURE;
        }
    };

    match run(cli, &mut storefront).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(CommandError { action, source }) => {
            if let Some(notice) = report(action, &source) {
                output::notice(&notice);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, storefront: &mut Storefront) -> Result<(), CommandError> {
    match cli.command {
        Commands::Products => commands::catalog::products(storefront).await,
        Commands::Search { text } => commands::catalog::search(storefront, &text).await,
        Commands::Browse => commands::catalog::browse(storefront).await,
        Commands::Cart => commands::cart::show(storefront).await,
        Commands::Add { product_id } => {
            commands::cart::add(storefront, &ProductId::new(product_id)).await
        }
        Commands::Set { product_id, qty } => {
            commands::cart::set(storefront, &ProductId::new(product_id), qty).await
        }
        Commands::Register {
            username,
            password,
            confirm_password,
        } => commands::account::register(storefront, username, password, confirm_password).await,
        Commands::Login { username, password } => {
            commands::account::login(storefront, username, password).await
        }
        Commands::Logout => commands::account::logout(storefront),
        Commands::Whoami => {
            commands::account::whoami(storefront);
            Ok(())
        }
    }
}
