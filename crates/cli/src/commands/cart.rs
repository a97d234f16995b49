//! Cart commands.
//!
//! # Usage
//!
//! ```bash
//! pm-cli cart add --id 7 -n "Mug" -q 2 -p 150
//! pm-cli cart update 7 5
//! pm-cli cart remove 7
//! pm-cli cart clear
//! pm-cli cart show
//! ```

use points_mall_client::cart::CartLine;
use points_mall_client::state::AppState;
use points_mall_core::ProductId;
use serde_json::json;

use super::{CommandError, emit};

/// Add units of a product.
pub fn add(
    state: &AppState,
    id: ProductId,
    name: String,
    quantity: u32,
    points_required: u64,
    image: Option<String>,
) -> Result<(), CommandError> {
    state.cart().add_to_cart(CartLine {
        id,
        name,
        image,
        quantity,
        points_required,
    })?;
    tracing::info!("Cart now holds {} item(s)", state.cart().cart_count());
    Ok(())
}

/// Remove a product.
pub fn remove(state: &AppState, id: ProductId) {
    state.cart().remove_from_cart(id);
}

/// Set the number of units of a product.
pub fn update(state: &AppState, id: ProductId, quantity: u32) {
    state.cart().update_quantity(id, quantity);
}

/// Remove every product.
pub fn clear(state: &AppState) {
    state.cart().clear_cart();
    tracing::info!("Cart cleared");
}

/// Print lines and totals, warning when the balance does not cover them.
pub fn show(state: &AppState) -> Result<(), CommandError> {
    let cart = state.cart();
    let total_points = cart.total_points();
    let balance = state.session().points();

    if !i64::try_from(total_points).is_ok_and(|total| total <= balance) {
        tracing::warn!("Cart needs {total_points} points but the balance is {balance}");
    }

    emit(&json!({
        "items": cart.lines(),
        "cartCount": cart.cart_count(),
        "totalPoints": total_points,
        "balance": balance,
    }))
}
