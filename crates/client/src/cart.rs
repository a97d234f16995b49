//! Shopping cart state.
//!
//! The cart is an ordered list of lines, at most one per product. Insertion
//! order is display order. Aggregates (`cart_count`, `total_points`) are
//! recomputed from the lines on every call and never stored.
//!
//! A cart built with [`Cart::new`] lives for the process only. A cart built
//! with [`Cart::persistent`] rehydrates from storage and writes itself back
//! after every mutation.

use std::sync::Arc;

use parking_lot::RwLock;
use points_mall_core::ProductId;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::storage::{KeyValueStore, keys};

/// Errors returned by cart mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// Lines must carry at least one unit.
    #[error("quantity must be at least 1")]
    ZeroQuantity,
}

/// One product in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Product the line refers to.
    pub id: ProductId,
    /// Product name for display.
    pub name: String,
    /// Product image URL for display.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Number of units.
    pub quantity: u32,
    /// Points cost of a single unit.
    pub points_required: u64,
}

impl CartLine {
    /// Points cost of the whole line.
    #[must_use]
    pub fn line_points(&self) -> u64 {
        u64::from(self.quantity).saturating_mul(self.points_required)
    }
}

/// Shared handle to the cart.
#[derive(Clone)]
pub struct Cart {
    inner: Arc<CartInner>,
}

struct CartInner {
    storage: Option<Arc<dyn KeyValueStore>>,
    lines: RwLock<Vec<CartLine>>,
}

impl Cart {
    /// Create an empty, process-lifetime cart.
    #[must_use]
    pub fn new() -> Self {
        Self::build(None, Vec::new())
    }

    /// Create a cart that rehydrates from and writes through to `storage`.
    ///
    /// Unreadable stored lines are discarded and the cart starts empty.
    #[must_use]
    pub fn persistent(storage: Arc<dyn KeyValueStore>) -> Self {
        let lines = match storage.get(keys::CART) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "Discarding unreadable stored cart");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read stored cart");
                Vec::new()
            }
        };

        Self::build(Some(storage), lines)
    }

    fn build(storage: Option<Arc<dyn KeyValueStore>>, lines: Vec<CartLine>) -> Self {
        Self {
            inner: Arc::new(CartInner {
                storage,
                lines: RwLock::new(lines),
            }),
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Lines in display order.
    #[must_use]
    pub fn lines(&self) -> Vec<CartLine> {
        self.inner.lines.read().clone()
    }

    /// Line for `id`, if present.
    #[must_use]
    pub fn line(&self, id: ProductId) -> Option<CartLine> {
        self.inner
            .lines
            .read()
            .iter()
            .find(|line| line.id == id)
            .cloned()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lines.read().is_empty()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn cart_count(&self) -> u64 {
        self.inner
            .lines
            .read()
            .iter()
            .map(|line| u64::from(line.quantity))
            .sum()
    }

    /// Points needed to check out the whole cart.
    #[must_use]
    pub fn total_points(&self) -> u64 {
        self.inner
            .lines
            .read()
            .iter()
            .fold(0, |total, line| total.saturating_add(line.line_points()))
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add `item` to the cart.
    ///
    /// If a line for the same product exists its quantity grows by
    /// `item.quantity`; otherwise `item` is appended.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ZeroQuantity`] if `item.quantity` is 0. The cart
    /// is left unchanged.
    pub fn add_to_cart(&self, item: CartLine) -> Result<(), CartError> {
        if item.quantity == 0 {
            return Err(CartError::ZeroQuantity);
        }

        self.mutate(|lines| {
            if let Some(existing) = lines.iter_mut().find(|line| line.id == item.id) {
                existing.quantity = existing.quantity.saturating_add(item.quantity);
                debug!(product_id = %item.id, quantity = existing.quantity, "Cart line increased");
            } else {
                debug!(product_id = %item.id, quantity = item.quantity, "Cart line added");
                lines.push(item);
            }
        });
        Ok(())
    }

    /// Remove the line for `id`. No-op if absent.
    pub fn remove_from_cart(&self, id: ProductId) {
        self.mutate(|lines| {
            if let Some(index) = lines.iter().position(|line| line.id == id) {
                lines.remove(index);
                debug!(product_id = %id, "Cart line removed");
            }
        });
    }

    /// Set the quantity of the line for `id`. No-op if absent.
    ///
    /// A quantity of 0 removes the line.
    pub fn update_quantity(&self, id: ProductId, quantity: u32) {
        if quantity == 0 {
            self.remove_from_cart(id);
            return;
        }

        self.mutate(|lines| {
            if let Some(line) = lines.iter_mut().find(|line| line.id == id) {
                line.quantity = quantity;
                debug!(product_id = %id, quantity, "Cart line quantity set");
            }
        });
    }

    /// Remove every line.
    pub fn clear_cart(&self) {
        self.mutate(Vec::clear);
        debug!("Cart cleared");
    }

    fn mutate(&self, f: impl FnOnce(&mut Vec<CartLine>)) {
        let mut lines = self.inner.lines.write();
        f(&mut lines);

        let Some(storage) = &self.inner.storage else {
            return;
        };
        let result = serde_json::to_string(&*lines)
            .map_err(crate::storage::StorageError::from)
            .and_then(|serialized| storage.set(keys::CART, &serialized));
        if let Err(e) = result {
            warn!(error = %e, "Failed to persist cart");
        }
    }
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Cart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cart")
            .field("lines", &*self.inner.lines.read())
            .field("persistent", &self.inner.storage.is_some())
            .finish()
    }
}
