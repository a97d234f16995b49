//! API commands.
//!
//! # Usage
//!
//! ```bash
//! pm-cli api get /products -q page=1 -q size=20
//! pm-cli api post /orders -b '{"items":[{"productId":7,"quantity":2}]}'
//! pm-cli api delete /cart/7
//! ```
//!
//! Failures are reported through the notifier before the command exits.

use points_mall_client::state::AppState;
use serde_json::Value;

use super::{CommandError, emit};

/// Parse a `key=value` query argument.
///
/// # Errors
///
/// Returns an error if the argument has no `=` or an empty key.
pub fn parse_pair(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got {raw}")),
    }
}

/// GET `path` and print the body.
pub async fn get(
    state: &AppState,
    path: &str,
    query: &[(String, String)],
) -> Result<(), CommandError> {
    let query: Vec<(&str, &str)> = query
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    let body: Value = state.api().get_with_query(path, &query).await?;
    emit(&body)
}

/// POST a JSON body to `path` and print the response.
pub async fn post(state: &AppState, path: &str, body: &str) -> Result<(), CommandError> {
    let body: Value = serde_json::from_str(body)?;
    let response: Value = state.api().post(path, &body).await?;
    emit(&response)
}

/// PUT a JSON body to `path` and print the response.
pub async fn put(state: &AppState, path: &str, body: &str) -> Result<(), CommandError> {
    let body: Value = serde_json::from_str(body)?;
    let response: Value = state.api().put(path, &body).await?;
    emit(&response)
}

/// DELETE `path` and print the response.
pub async fn delete(state: &AppState, path: &str) -> Result<(), CommandError> {
    let response: Value = state.api().delete(path).await?;
    emit(&response)
}
