//! Subcommand implementations.
//!
//! Commands write their results to stdout as pretty JSON; logs go to stderr.

pub mod api;
pub mod cart;
pub mod navigate;
pub mod session;

use std::io::Write;

use points_mall_client::ClientError;
use points_mall_client::api::ApiError;
use points_mall_client::cart::CartError;
use points_mall_client::router::NavigationError;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Client state could not be set up.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Backend request failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Cart rejected the change.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Path could not be navigated to.
    #[error(transparent)]
    Navigation(#[from] NavigationError),

    /// Argument was not valid JSON.
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Writing output failed.
    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),
}

/// Write `value` to stdout as pretty JSON.
fn emit(value: &serde_json::Value) -> Result<(), CommandError> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}
