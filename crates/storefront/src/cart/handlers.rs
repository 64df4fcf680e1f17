//! Page actions on the cart.
//!
//! Each handler takes the payload a page control sends, applies exactly one
//! cart mutation, and returns the fresh summary so the caller can re-render
//! both the item list and the totals.

use neon_core::{CartSummary, ProductId};
use serde::Deserialize;

use super::{CartStore, VariantSelection};
use crate::catalog::Catalog;
use crate::error::{AppError, Result};
use crate::sheets::gviz::leading_integer;
use crate::storage::KeyValueStore;

/// "Add to cart" on a product card or detail view.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddPayload {
    pub product_id: ProductId,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// The remove button on a line.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RemovePayload {
    pub index: usize,
}

/// A typed edit of the quantity input.
#[derive(Debug, Clone, Deserialize)]
pub struct QtyChangePayload {
    pub index: usize,
    /// The raw input text.
    pub value: String,
}

/// The decrease/increase buttons.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct QtyStepPayload {
    pub index: usize,
    pub delta: i64,
}

/// A colour radio on a line.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantPayload {
    pub index: usize,
    pub product_id: ProductId,
    pub color: String,
    pub image: String,
}

/// The size selector on a line.
#[derive(Debug, Clone, Deserialize)]
pub struct SizePayload {
    pub index: usize,
    #[serde(default)]
    pub size: Option<String>,
}

/// Add a catalog product to the cart.
///
/// # Errors
///
/// Returns [`AppError::NotFound`] if the id is not in the catalog.
pub fn on_add<S: KeyValueStore>(
    cart: &CartStore<S>,
    catalog: &Catalog,
    payload: AddPayload,
) -> Result<CartSummary> {
    let product = catalog
        .find(&payload.product_id)
        .ok_or_else(|| AppError::NotFound(payload.product_id.to_string()))?;

    let variant = (payload.color.is_some() || payload.image.is_some()).then(|| VariantSelection {
        color: payload.color,
        image: payload.image,
    });
    Ok(cart.add_or_increment(product, variant)?)
}

/// Remove a line.
///
/// # Errors
///
/// Returns an error if the index is out of range or storage fails.
pub fn on_remove<S: KeyValueStore>(
    cart: &CartStore<S>,
    payload: RemovePayload,
) -> Result<CartSummary> {
    Ok(cart.remove(payload.index)?)
}

/// Apply a typed quantity. Text that does not start with a number counts as 1.
///
/// # Errors
///
/// Returns an error if the index is out of range or storage fails.
pub fn on_qty_change<S: KeyValueStore>(
    cart: &CartStore<S>,
    payload: &QtyChangePayload,
) -> Result<CartSummary> {
    let qty = leading_integer(&payload.value).unwrap_or(1);
    Ok(cart.set_quantity(payload.index, qty)?)
}

/// Step a quantity up or down.
///
/// # Errors
///
/// Returns an error if the index is out of range or storage fails.
pub fn on_qty_step<S: KeyValueStore>(
    cart: &CartStore<S>,
    payload: QtyStepPayload,
) -> Result<CartSummary> {
    Ok(cart.adjust_quantity(payload.index, payload.delta)?)
}

/// Switch a line's colour.
///
/// # Errors
///
/// Returns an error if the line no longer holds the product the page
/// rendered, the index is out of range, or storage fails.
pub fn on_variant_change<S: KeyValueStore>(
    cart: &CartStore<S>,
    payload: VariantPayload,
) -> Result<CartSummary> {
    Ok(cart.update_variant(
        payload.index,
        &payload.product_id,
        Some(payload.color),
        Some(payload.image),
    )?)
}

/// Set or clear a line's size.
///
/// # Errors
///
/// Returns an error if the index is out of range or storage fails.
pub fn on_size_change<S: KeyValueStore>(
    cart: &CartStore<S>,
    payload: SizePayload,
) -> Result<CartSummary> {
    Ok(cart.update_size(payload.index, payload.size)?)
}

/// The checkout button. Refuses an empty cart, otherwise persists the
/// checkout total one last time.
///
/// # Errors
///
/// Returns an error if the cart is empty or storage fails.
pub fn on_checkout<S: KeyValueStore>(cart: &CartStore<S>) -> Result<CartSummary> {
    cart.ensure_not_empty()?;
    Ok(cart.compute_summary()?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use neon_core::{DeliveryFeePolicy, Price, Product, ProductStatus};
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::*;
    use crate::cart::CartError;
    use crate::storage::MemoryStore;

    fn setup() -> (CartStore<MemoryStore>, Catalog) {
        let product = Product {
            id: ProductId::new("LS00001"),
            name: "Neon Keyring".to_string(),
            price: Price::new(Decimal::new(25, 0)),
            images: vec!["a.png".to_string(), "b.png".to_string()],
            description: String::new(),
            details: String::new(),
            size: String::new(),
            stock: 5,
            status: ProductStatus::Active,
        };
        let cart = CartStore::new(Arc::new(MemoryStore::new()), DeliveryFeePolicy::Included);
        (cart, Catalog::from_products(vec![product]))
    }

    #[test]
    fn test_add_unknown_product() {
        let (cart, catalog) = setup();
        let payload: AddPayload = serde_json::from_value(json!({"productId": "nope"})).unwrap();
        assert!(matches!(
            on_add(&cart, &catalog, payload),
            Err(AppError::NotFound(id)) if id == "nope"
        ));
    }

    #[test]
    fn test_add_with_colour() {
        let (cart, catalog) = setup();
        let payload: AddPayload = serde_json::from_value(json!({
            "productId": "LS00001",
            "color": "Color 2",
            "image": "b.png"
        }))
        .unwrap();
        let summary = on_add(&cart, &catalog, payload).unwrap();
        assert_eq!(summary.total, Decimal::new(25, 0));
        assert_eq!(cart.lines().unwrap()[0].display_image(), Some("b.png"));
    }

    #[test]
    fn test_typed_quantity() {
        let (cart, catalog) = setup();
        on_add(
            &cart,
            &catalog,
            AddPayload {
                product_id: ProductId::new("LS00001"),
                color: None,
                image: None,
            },
        )
        .unwrap();

        let typed = |value: &str| QtyChangePayload {
            index: 0,
            value: value.to_string(),
        };
        assert_eq!(on_qty_change(&cart, &typed("4")).unwrap().item_count, 4);
        assert_eq!(on_qty_change(&cart, &typed("-2")).unwrap().item_count, 1);
        assert_eq!(on_qty_change(&cart, &typed("3 pcs")).unwrap().item_count, 3);
        assert_eq!(on_qty_change(&cart, &typed("abc")).unwrap().item_count, 1);

        let summary = on_qty_step(&cart, QtyStepPayload { index: 0, delta: 1 }).unwrap();
        assert_eq!(summary.total, Decimal::new(50, 0));
    }

    #[test]
    fn test_checkout_refuses_empty_cart() {
        let (cart, _) = setup();
        assert!(matches!(
            on_checkout(&cart),
            Err(AppError::Cart(CartError::Empty))
        ));
    }
}
