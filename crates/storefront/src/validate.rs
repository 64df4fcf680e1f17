//! Normalisation of untrusted records.
//!
//! Persisted carts and cached catalogs may have been written by older
//! versions, edited by hand, or truncated. Records pass through here before
//! any typed code sees them: defects are repaired with defaults, and only
//! non-object input is rejected outright.
//!
//! A repaired record may still carry an empty id. Callers skip those.

use neon_core::{CartLine, Price, Product, ProductId, ProductStatus};
use rust_decimal::Decimal;
use serde_json::Value;

use crate::sheets::gviz::{is_truthy, leading_decimal, leading_integer, value_to_string};

/// Normalise a raw product record.
///
/// Returns `None` only when `raw` is not a JSON object.
#[must_use]
pub fn validate_product(raw: &Value) -> Option<Product> {
    let record = raw.as_object()?;
    let field = |name: &str| record.get(name).unwrap_or(&Value::Null);

    Some(Product {
        id: ProductId::new(text(field("id"))),
        name: text(field("name")),
        price: price(field("price")),
        images: images(field("images"), field("img")),
        description: text(field("description")).trim().to_string(),
        details: text(field("details")).trim().to_string(),
        size: text(field("size")).trim().to_string(),
        stock: stock(field("stock")),
        status: status(field("status")),
    })
}

/// Normalise a raw cart line.
///
/// Quantity is repaired to at least 1. Variant and size selections survive
/// when they are non-empty strings.
///
/// Returns `None` only when `raw` is not a JSON object.
#[must_use]
pub fn validate_cart_line(raw: &Value) -> Option<CartLine> {
    let record = raw.as_object()?;
    let field = |name: &str| record.get(name).unwrap_or(&Value::Null);

    Some(CartLine {
        id: ProductId::new(text(field("id"))),
        name: text(field("name")),
        price: price(field("price")),
        images: images(field("images"), field("img")),
        qty: quantity(field("qty")),
        selected_color: optional_text(field("selectedColor")),
        selected_image: optional_text(field("selectedImage")),
        size: optional_text(field("size")),
    })
}

/// Stringified value, or empty when the value is falsy.
fn text(value: &Value) -> String {
    if is_truthy(value) {
        value_to_string(value)
    } else {
        String::new()
    }
}

fn optional_text(value: &Value) -> Option<String> {
    value.as_str().filter(|s| !s.is_empty()).map(str::to_owned)
}

fn price(value: &Value) -> Price {
    let amount = match value {
        Value::Number(_) | Value::String(_) => leading_decimal(&value_to_string(value)),
        _ => None,
    };
    Price::new(amount.unwrap_or(Decimal::ZERO))
}

/// String entries of `images`, else the legacy singular `img`, else nothing.
fn images(images: &Value, legacy: &Value) -> Vec<String> {
    match images {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_owned)
            .collect(),
        _ if is_truthy(legacy) => vec![value_to_string(legacy)],
        _ => Vec::new(),
    }
}

fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(_) | Value::String(_) => leading_integer(&value_to_string(value)),
        _ => None,
    }
}

fn stock(value: &Value) -> u32 {
    integer(value).map_or(0, |n| u32::try_from(n.max(0)).unwrap_or(u32::MAX))
}

fn quantity(value: &Value) -> u32 {
    integer(value)
        .filter(|n| *n != 0)
        .map_or(1, |n| u32::try_from(n.max(1)).unwrap_or(u32::MAX))
}

/// Absent status means active; an unrecognised one is treated as inactive.
fn status(value: &Value) -> ProductStatus {
    if !is_truthy(value) {
        return ProductStatus::Active;
    }
    ProductStatus::from_token(&value_to_string(value)).unwrap_or(ProductStatus::Inactive)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_rejects_non_objects() {
        assert!(validate_product(&json!(null)).is_none());
        assert!(validate_product(&json!("LS00001")).is_none());
        assert!(validate_product(&json!([1, 2])).is_none());
        assert!(validate_cart_line(&json!(42)).is_none());
    }

    #[test]
    fn test_repairs_product_fields() {
        let product = validate_product(&json!({
            "id": 7,
            "name": "Keyring",
            "price": "12.5",
            "images": ["a.png", 3, null, "b.png"],
            "description": "  Bright  ",
            "stock": "4 left",
        }))
        .unwrap();

        assert_eq!(product.id.as_str(), "7");
        assert_eq!(product.price.amount(), Decimal::new(125, 1));
        assert_eq!(product.images, vec!["a.png", "b.png"]);
        assert_eq!(product.description, "Bright");
        assert_eq!(product.details, "");
        assert_eq!(product.stock, 4);
        assert_eq!(product.status, ProductStatus::Active);
    }

    #[test]
    fn test_unparseable_price_is_zero() {
        let product = validate_product(&json!({"id": "A", "name": "B", "price": "free"})).unwrap();
        assert_eq!(product.price, Price::ZERO);
        assert!(!product.is_listable());
    }

    #[test]
    fn test_legacy_single_image() {
        let product = validate_product(&json!({"id": "A", "img": "legacy.png"})).unwrap();
        assert_eq!(product.images, vec!["legacy.png"]);
    }

    #[test]
    fn test_missing_id_is_repaired_to_empty() {
        let product = validate_product(&json!({"name": "No id"})).unwrap();
        assert!(product.id.is_empty());
    }

    #[test]
    fn test_status_tokens() {
        let inactive = validate_product(&json!({"id": "A", "status": "Inactive"})).unwrap();
        assert_eq!(inactive.status, ProductStatus::Inactive);
        let unknown = validate_product(&json!({"id": "A", "status": "archived"})).unwrap();
        assert_eq!(unknown.status, ProductStatus::Inactive);
    }

    #[test]
    fn test_cart_line_quantity_repair() {
        let zero = validate_cart_line(&json!({"id": "A", "qty": 0})).unwrap();
        assert_eq!(zero.qty, 1);
        let negative = validate_cart_line(&json!({"id": "A", "qty": -3})).unwrap();
        assert_eq!(negative.qty, 1);
        let text = validate_cart_line(&json!({"id": "A", "qty": "3"})).unwrap();
        assert_eq!(text.qty, 3);
        let missing = validate_cart_line(&json!({"id": "A"})).unwrap();
        assert_eq!(missing.qty, 1);
    }

    #[test]
    fn test_cart_line_keeps_selections() {
        let line = validate_cart_line(&json!({
            "id": "A",
            "name": "Scarf",
            "price": 10,
            "qty": 2,
            "images": ["a.png", "b.png"],
            "selectedColor": "Color 2",
            "selectedImage": "b.png",
            "size": "",
        }))
        .unwrap();
        assert_eq!(line.selected_color.as_deref(), Some("Color 2"));
        assert_eq!(line.selected_image.as_deref(), Some("b.png"));
        assert_eq!(line.size, None);
        assert_eq!(line.line_total(), Decimal::new(20, 0));
    }
}
