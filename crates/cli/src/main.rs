//! Points Mall CLI - Drive the client library from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Store a token and profile returned by the login endpoint
//! pm-cli session login -t eyJhbGciOi... -p '{"id":1,"username":"alice","role":"USER"}'
//!
//! # Put two mugs in the cart and look at the totals
//! pm-cli cart add --id 7 -n "Mug" -q 2 -p 150
//! pm-cli cart show
//!
//! # See where the guard sends you
//! pm-cli navigate /admin/products
//!
//! # Call the backend with the stored token
//! pm-cli api get /products -q page=1
//! ```
//!
//! # Commands
//!
//! - `session` - Show, set or clear the stored session
//! - `cart` - Add, update, remove and list cart lines
//! - `navigate` - Resolve a page path through the router and guard
//! - `api` - Send a request to the backend

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use clap::{Parser, Subcommand};
use points_mall_client::config::ClientConfig;
use points_mall_client::notify::TracingNotifier;
use points_mall_client::state::AppState;
use points_mall_core::ProductId;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::CommandError;

#[derive(Parser)]
#[command(name = "pm-cli")]
#[command(author, version, about = "Points Mall client tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the stored session
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Resolve a page path through the router and guard
    Navigate {
        /// Page path, e.g. `/product/7`
        path: String,
    },
    /// Send a request to the backend
    Api {
        #[command(subcommand)]
        action: ApiAction,
    },
}

#[derive(Subcommand)]
enum SessionAction {
    /// Store a token and, optionally, the user profile
    Login {
        /// Bearer token returned by the login endpoint
        #[arg(short, long)]
        token: String,

        /// User profile as JSON
        #[arg(short, long)]
        profile: Option<String>,
    },
    /// Set the points balance
    Points {
        /// New balance
        #[arg(allow_negative_numbers = true)]
        points: i64,
    },
    /// Show the stored session
    Show,
    /// Clear the stored session
    Logout,
}

#[derive(Subcommand)]
enum CartAction {
    /// Add units of a product
    Add {
        /// Product ID
        #[arg(long)]
        id: ProductId,

        /// Product name
        #[arg(short, long)]
        name: String,

        /// Number of units
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,

        /// Points cost of one unit
        #[arg(short, long)]
        points: u64,

        /// Product image URL
        #[arg(long)]
        image: Option<String>,
    },
    /// Remove a product
    Remove {
        /// Product ID
        id: ProductId,
    },
    /// Set the number of units of a product (0 removes it)
    Update {
        /// Product ID
        id: ProductId,

        /// New number of units
        quantity: u32,
    },
    /// Remove every product
    Clear,
    /// List lines and totals
    Show,
}

#[derive(Subcommand)]
enum ApiAction {
    /// GET a path
    Get {
        /// API path, e.g. `/products`
        path: String,

        /// Query parameter as `key=value` (repeatable)
        #[arg(short, long = "query", value_parser = commands::api::parse_pair)]
        query: Vec<(String, String)>,
    },
    /// POST a JSON body to a path
    Post {
        /// API path
        path: String,

        /// JSON body
        #[arg(short, long, default_value = "{}")]
        body: String,
    },
    /// PUT a JSON body to a path
    Put {
        /// API path
        path: String,

        /// JSON body
        #[arg(short, long, default_value = "{}")]
        body: String,
    },
    /// DELETE a path
    Delete {
        /// API path
        path: String,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ClientConfig) -> Option<sentry::ClientInitGuard> {
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
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing_subscriber::fmt::init();
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "points_mall_client=info,pm_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    if let Err(e) = run(cli, &config).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &ClientConfig) -> Result<(), CommandError> {
    let state = AppState::open(config, Arc::new(TracingNotifier))?;

    match cli.command {
        Commands::Session { action } => match action {
            SessionAction::Login { token, profile } => {
                commands::session::login(&state, token, profile.as_deref())?;
            }
            SessionAction::Points { points } => commands::session::set_points(&state, points),
            SessionAction::Show => commands::session::show(&state)?,
            SessionAction::Logout => commands::session::logout(&state),
        },
        Commands::Cart { action } => match action {
            CartAction::Add {
                id,
                name,
                quantity,
                points,
                image,
            } => commands::cart::add(&state, id, name, quantity, points, image)?,
            CartAction::Remove { id } => commands::cart::remove(&state, id),
            CartAction::Update { id, quantity } => commands::cart::update(&state, id, quantity),
            CartAction::Clear => commands::cart::clear(&state),
            CartAction::Show => commands::cart::show(&state)?,
        },
        Commands::Navigate { path } => commands::navigate::run(&state, &path)?,
        Commands::Api { action } => match action {
            ApiAction::Get { path, query } => commands::api::get(&state, &path, &query).await?,
            ApiAction::Post { path, body } => commands::api::post(&state, &path, &body).await?,
            ApiAction::Put { path, body } => commands::api::put(&state, &path, &body).await?,
            ApiAction::Delete { path } => commands::api::delete(&state, &path).await?,
        },
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_product_ids_are_parsed() {
        let cli = Cli::try_parse_from(["pm-cli", "cart", "update", "7", "3"]).unwrap();
        let Commands::Cart {
            action: CartAction::Update { id, quantity },
        } = cli.command
        else {
            panic!("expected cart update");
        };
        assert_eq!(id, ProductId::new(7));
        assert_eq!(quantity, 3);

        assert!(Cli::try_parse_from(["pm-cli", "cart", "remove", "seven"]).is_err());
    }
}
