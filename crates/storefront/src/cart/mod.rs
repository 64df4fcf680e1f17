//! The persisted shopping cart.
//!
//! Storage is the only source of truth. Every operation re-reads the cart,
//! applies one change, and writes the whole list back before returning, so
//! a fresh page context always sees the latest state.
//!
//! Lines are addressed by index. Indices shift down after a removal, so
//! callers re-derive them from [`CartStore::lines`] after every mutation.

pub mod handlers;

use std::sync::Arc;

use neon_core::{CartLine, CartSummary, DeliveryFeePolicy, Product, ProductId};
use serde_json::Value;
use thiserror::Error;

use crate::error::add_breadcrumb;
use crate::storage::{KeyValueStore, StorageError, keys, write_json};
use crate::validate::validate_cart_line;

/// Errors from cart mutations.
#[derive(Debug, Error)]
pub enum CartError {
    /// No line exists at the index.
    #[error("no cart line at index {index} (cart has {len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// The line at the index is not the one the caller rendered.
    #[error("cart line {index} holds {found}, expected {expected}")]
    StaleIndex {
        index: usize,
        expected: ProductId,
        found: ProductId,
    },

    /// Checkout was requested with nothing in the cart.
    #[error("cart is empty")]
    Empty,

    /// Storage failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// The variant chosen when adding a product.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariantSelection {
    pub color: Option<String>,
    pub image: Option<String>,
}

/// Owns the persisted cart.
pub struct CartStore<S> {
    store: Arc<S>,
    policy: DeliveryFeePolicy,
}

impl<S> Clone for CartStore<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            policy: self.policy,
        }
    }
}

impl<S: KeyValueStore> CartStore<S> {
    #[must_use]
    pub const fn new(store: Arc<S>, policy: DeliveryFeePolicy) -> Self {
        Self { store, policy }
    }

    /// The delivery-fee policy used for summaries.
    #[must_use]
    pub const fn policy(&self) -> DeliveryFeePolicy {
        self.policy
    }

    /// Read the cart. Malformed lines and lines without an id are skipped;
    /// an unparseable cart reads as empty.
    ///
    /// # Errors
    ///
    /// Returns an error only if the storage backend fails.
    pub fn lines(&self) -> Result<Vec<CartLine>, StorageError> {
        let Some(raw) = self.store.get(keys::CART)? else {
            return Ok(Vec::new());
        };

        let items = match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(items)) => items,
            Ok(_) => {
                tracing::warn!("Persisted cart is not a list, treating it as empty");
                return Ok(Vec::new());
            }
            Err(e) => {
                tracing::warn!(error = %e, "Persisted cart is corrupt, treating it as empty");
                return Ok(Vec::new());
            }
        };

        let total = items.len();
        let lines: Vec<CartLine> = items
            .iter()
            .filter_map(validate_cart_line)
            .filter(|line| !line.id.is_empty())
            .collect();
        if lines.len() < total {
            tracing::warn!(
                skipped = total - lines.len(),
                "Skipped malformed cart lines"
            );
        }
        Ok(lines)
    }

    /// Sum of line quantities.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails.
    pub fn item_count(&self) -> Result<u64, StorageError> {
        Ok(self.lines()?.iter().map(|line| u64::from(line.qty)).sum())
    }

    /// Add one unit of `product`.
    ///
    /// An existing line with the same id is incremented and keeps its
    /// variant; otherwise a new line is appended with the chosen variant,
    /// defaulting to the first image.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails.
    pub fn add_or_increment(
        &self,
        product: &Product,
        variant: Option<VariantSelection>,
    ) -> Result<CartSummary, CartError> {
        let mut lines = self.lines()?;

        if let Some(line) = lines.iter_mut().find(|line| line.id == product.id) {
            line.qty = line.qty.saturating_add(1);
        } else {
            let mut line = CartLine::from_product(product);
            if let Some(variant) = variant {
                line.selected_color = variant.color;
                line.selected_image = variant.image.or(line.selected_image);
            }
            lines.push(line);
        }

        add_breadcrumb(
            "cart",
            "Added to cart",
            Some(&[("product_id", product.id.as_str())]),
        );
        self.save(&lines)
    }

    /// Set a line's quantity, clamped to at least 1.
    ///
    /// # Errors
    ///
    /// Returns an error if the index is out of range or storage fails.
    pub fn set_quantity(&self, index: usize, qty: i64) -> Result<CartSummary, CartError> {
        let mut lines = self.lines()?;
        let len = lines.len();
        let line = lines
            .get_mut(index)
            .ok_or(CartError::IndexOutOfRange { index, len })?;
        line.qty = clamp_quantity(qty);
        self.save(&lines)
    }

    /// Change a line's quantity by `delta`, clamped to at least 1.
    ///
    /// # Errors
    ///
    /// Returns an error if the index is out of range or storage fails.
    pub fn adjust_quantity(&self, index: usize, delta: i64) -> Result<CartSummary, CartError> {
        let lines = self.lines()?;
        let current = lines
            .get(index)
            .map(|line| i64::from(line.qty))
            .ok_or(CartError::IndexOutOfRange {
                index,
                len: lines.len(),
            })?;
        self.set_quantity(index, current.saturating_add(delta))
    }

    /// Set the colour and image of a line, provided it still holds `expected_id`.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::StaleIndex`] if the line holds another product,
    /// or an error if the index is out of range or storage fails.
    pub fn update_variant(
        &self,
        index: usize,
        expected_id: &ProductId,
        color: Option<String>,
        image: Option<String>,
    ) -> Result<CartSummary, CartError> {
        let mut lines = self.lines()?;
        let len = lines.len();
        let line = lines
            .get_mut(index)
            .ok_or(CartError::IndexOutOfRange { index, len })?;
        if &line.id != expected_id {
            return Err(CartError::StaleIndex {
                index,
                expected: expected_id.clone(),
                found: line.id.clone(),
            });
        }
        line.selected_color = color;
        line.selected_image = image;
        self.save(&lines)
    }

    /// Set or clear a line's size.
    ///
    /// # Errors
    ///
    /// Returns an error if the index is out of range or storage fails.
    pub fn update_size(&self, index: usize, size: Option<String>) -> Result<CartSummary, CartError> {
        let mut lines = self.lines()?;
        let len = lines.len();
        let line = lines
            .get_mut(index)
            .ok_or(CartError::IndexOutOfRange { index, len })?;
        line.size = size.filter(|s| !s.trim().is_empty());
        self.save(&lines)
    }

    /// Delete the line at `index`. Later lines move down by one.
    ///
    /// # Errors
    ///
    /// Returns an error if the index is out of range or storage fails.
    pub fn remove(&self, index: usize) -> Result<CartSummary, CartError> {
        let mut lines = self.lines()?;
        if index >= lines.len() {
            return Err(CartError::IndexOutOfRange {
                index,
                len: lines.len(),
            });
        }
        let removed = lines.remove(index);
        add_breadcrumb(
            "cart",
            "Removed from cart",
            Some(&[("product_id", removed.id.as_str())]),
        );
        self.save(&lines)
    }

    /// Compute totals and persist the checkout total.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails.
    pub fn compute_summary(&self) -> Result<CartSummary, StorageError> {
        let summary = CartSummary::compute(&self.lines()?, self.policy);
        self.store
            .set(keys::CHECKOUT_TOTAL, &summary.checkout_total())?;
        Ok(summary)
    }

    /// Fail with [`CartError::Empty`] when there is nothing to check out.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart is empty or storage fails.
    pub fn ensure_not_empty(&self) -> Result<(), CartError> {
        if self.lines()?.is_empty() {
            return Err(CartError::Empty);
        }
        Ok(())
    }

    /// Remove the cart and the checkout total.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.store.remove(keys::CART)?;
        self.store.remove(keys::CHECKOUT_TOTAL)
    }

    fn save(&self, lines: &[CartLine]) -> Result<CartSummary, CartError> {
        write_json(&*self.store, keys::CART, lines)?;
        let summary = CartSummary::compute(lines, self.policy);
        self.store
            .set(keys::CHECKOUT_TOTAL, &summary.checkout_total())?;
        Ok(summary)
    }
}

fn clamp_quantity(qty: i64) -> u32 {
    u32::try_from(qty.max(1)).unwrap_or(u32::MAX)
}
