//! Navigate command.
//!
//! # Usage
//!
//! ```bash
//! pm-cli navigate /admin/products
//! ```

use points_mall_client::state::AppState;
use serde_json::json;

use super::{CommandError, emit};

/// Resolve `path` through the router and print where it lands.
pub fn run(state: &AppState, path: &str) -> Result<(), CommandError> {
    let location = state.router().navigate(path)?;

    if let Some(from) = &location.redirected_from {
        tracing::info!("Redirected from {from} to {}", location.path);
    }

    emit(&json!({
        "route": format!("{:?}", location.name),
        "path": location.path,
        "params": location.params,
        "hideLayout": location.meta.hide_layout,
        "requiresAdmin": location.meta.requires_admin,
        "redirectedFrom": location.redirected_from,
    }))
}
