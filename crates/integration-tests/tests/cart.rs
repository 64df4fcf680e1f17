//! Cart scenarios driven through the page handlers.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use neon_core::{Language, ProductId};
use neon_integration_tests::{
    PRODUCTS_SHEET, ScriptedSheet, TestStorefront, product_row, product_sheet, storefront,
};
use neon_storefront::cart::handlers::{
    AddPayload, QtyChangePayload, QtyStepPayload, RemovePayload, SizePayload, VariantPayload,
    on_add, on_checkout, on_qty_change, on_qty_step, on_remove, on_size_change, on_variant_change,
};
use neon_storefront::catalog::Catalog;
use neon_storefront::error::AppError;
use neon_storefront::storage::{KeyValueStore, MemoryStore, keys};
use rust_decimal::Decimal;

async fn shop_with(policy: &str) -> (TestStorefront, Catalog) {
    let body = product_sheet(&[
        product_row("LS00001", "Neon Keyring", 25.0, "active"),
        product_row("LS00002", "Glow Badge", 12.5, "active"),
    ]);
    let sheet = ScriptedSheet::new().answer(PRODUCTS_SHEET, Ok(body));
    let shop = storefront(Arc::new(MemoryStore::new()), sheet, policy, None).unwrap();
    let catalog = shop.catalog().load(false).await;
    (shop, catalog)
}

fn add(id: &str) -> AddPayload {
    AddPayload {
        product_id: ProductId::new(id),
        color: None,
        image: None,
    }
}

#[tokio::test]
async fn test_adding_twice_merges_into_one_line() {
    let (shop, catalog) = shop_with("included").await;

    on_add(shop.cart(), &catalog, add("LS00001")).unwrap();
    let summary = on_add(shop.cart(), &catalog, add("LS00001")).unwrap();

    let lines = shop.cart().lines().unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].qty, 2);
    assert_eq!(summary.item_count, 2);
    assert_eq!(summary.total, Decimal::new(50, 0));
}

#[tokio::test]
async fn test_quantity_never_drops_below_one() {
    let (shop, catalog) = shop_with("included").await;
    on_add(shop.cart(), &catalog, add("LS00001")).unwrap();

    let summary = on_qty_step(shop.cart(), QtyStepPayload { index: 0, delta: -100 }).unwrap();
    assert_eq!(summary.item_count, 1);

    let typed = QtyChangePayload {
        index: 0,
        value: "0".to_string(),
    };
    assert_eq!(on_qty_change(shop.cart(), &typed).unwrap().item_count, 1);
    assert_eq!(shop.cart().lines().unwrap()[0].qty, 1);
}

#[tokio::test]
async fn test_percentage_delivery_fee() {
    let (shop, catalog) = shop_with("percent:5").await;
    let summary = on_add(shop.cart(), &catalog, add("LS00001")).unwrap();

    assert_eq!(summary.subtotal, Decimal::new(25, 0));
    assert_eq!(summary.delivery, Decimal::new(125, 2));
    assert_eq!(summary.total, Decimal::new(2625, 2));
    assert_eq!(
        shop.store().get(keys::CHECKOUT_TOTAL).unwrap().as_deref(),
        Some("26.25")
    );

    let rendered = shop.render_cart().unwrap();
    assert!(rendered.totals.contains("26.25"));
    assert!(rendered.totals.contains("1.25"));
}

#[tokio::test]
async fn test_included_delivery_fee() {
    let (shop, catalog) = shop_with("included").await;
    let summary = on_add(shop.cart(), &catalog, add("LS00001")).unwrap();

    assert_eq!(summary.delivery, Decimal::ZERO);
    assert_eq!(summary.total, Decimal::new(25, 0));
    assert_eq!(
        shop.store().get(keys::CHECKOUT_TOTAL).unwrap().as_deref(),
        Some("25.00")
    );
}

#[tokio::test]
async fn test_removing_a_line_shifts_the_rest() {
    let (shop, catalog) = shop_with("included").await;
    on_add(shop.cart(), &catalog, add("LS00001")).unwrap();
    on_add(shop.cart(), &catalog, add("LS00002")).unwrap();

    let summary = on_remove(shop.cart(), RemovePayload { index: 0 }).unwrap();

    let lines = shop.cart().lines().unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].id.as_str(), "LS00002");
    assert_eq!(summary.total, Decimal::new(125, 1));

    // The old index 1 is gone now.
    assert!(on_remove(shop.cart(), RemovePayload { index: 1 }).is_err());
}

#[tokio::test]
async fn test_variant_and_size_changes() {
    let (shop, catalog) = shop_with("included").await;
    on_add(shop.cart(), &catalog, add("LS00001")).unwrap();
    let second_image = shop.cart().lines().unwrap()[0].images[1].clone();

    on_variant_change(
        shop.cart(),
        VariantPayload {
            index: 0,
            product_id: ProductId::new("LS00001"),
            color: "Color 2".to_string(),
            image: second_image.clone(),
        },
    )
    .unwrap();
    on_size_change(
        shop.cart(),
        SizePayload {
            index: 0,
            size: Some("M".to_string()),
        },
    )
    .unwrap();

    let line = &shop.cart().lines().unwrap()[0];
    assert_eq!(line.selected_color.as_deref(), Some("Color 2"));
    assert_eq!(line.display_image(), Some(second_image.as_str()));
    assert_eq!(line.size.as_deref(), Some("M"));

    // A stale page that still thinks index 0 holds another product is refused.
    let stale = on_variant_change(
        shop.cart(),
        VariantPayload {
            index: 0,
            product_id: ProductId::new("LS00002"),
            color: "Color 1".to_string(),
            image: second_image,
        },
    );
    assert!(matches!(stale, Err(AppError::Cart(_))));
}

#[tokio::test]
async fn test_empty_cart_page_and_checkout_refusal() {
    let (shop, _) = shop_with("included").await;
    shop.preferences().set_language(Language::En).unwrap();

    let rendered = shop.render_cart().unwrap();
    assert!(rendered.items.contains("Your cart is empty"));
    assert_eq!(rendered.summary.item_count, 0);

    let refused = on_checkout(shop.cart()).unwrap_err();
    assert!(refused.user_message().contains("Your cart is empty"));
}

#[tokio::test]
async fn test_corrupt_cart_reads_as_empty() {
    let (shop, catalog) = shop_with("included").await;
    shop.store().set(keys::CART, "[{\"broken\"").unwrap();

    assert!(shop.cart().lines().unwrap().is_empty());

    let summary = on_add(shop.cart(), &catalog, add("LS00002")).unwrap();
    assert_eq!(summary.item_count, 1);
}

#[tokio::test]
async fn test_page_actions_re_render_or_alert() {
    let (shop, catalog) = shop_with("included").await;
    shop.preferences().set_language(Language::En).unwrap();

    let rendered = shop
        .cart_action(|cart| on_add(cart, &catalog, add("LS00002")))
        .unwrap();
    assert!(rendered.items.contains("Glow Badge"));
    assert!(rendered.totals.contains("12.50"));

    let alert = shop
        .cart_action(|cart| on_add(cart, &catalog, add("LS09999")))
        .unwrap_err();
    assert_eq!(alert, "找不到商品 Product not found");

    let alert = shop
        .cart_action(|cart| on_remove(cart, RemovePayload { index: 5 }))
        .unwrap_err();
    assert!(alert.contains("Your cart changed"));
    assert_eq!(shop.cart().lines().unwrap().len(), 1);
}

#[tokio::test]
async fn test_huge_cached_price_does_not_break_the_cart_page() {
    let (shop, _) = shop_with("percent:5").await;
    shop.store()
        .set(
            keys::CART,
            r#"[{"id":"A","name":"X","price":"79228162514264337593543950335","qty":2}]"#,
        )
        .unwrap();

    let rendered = shop.render_cart().unwrap();
    assert_eq!(rendered.summary.total, Decimal::MAX);
    assert_eq!(rendered.summary.item_count, 2);
}
