//! Cart item list and totals.

use askama::Template;
use neon_core::{CartLine, CartSummary, Language, format_money};

use super::empty_cart_message;
use crate::filters;

/// A colour radio on a cart line, bound to one of the line's images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorOption {
    /// `Color 1`, `Color 2`, ...
    pub label: String,
    pub image: String,
    pub checked: bool,
}

/// Cart item display data for templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItemView {
    /// Position in the cart at render time.
    pub index: usize,
    pub id: String,
    pub name: String,
    pub price: String,
    pub line_price: String,
    pub image: Option<String>,
    /// Empty unless the line has more than one image.
    pub color_options: Vec<ColorOption>,
    pub qty: u32,
    pub size: Option<String>,
}

impl CartItemView {
    #[must_use]
    pub fn new(index: usize, line: &CartLine) -> Self {
        Self {
            index,
            id: line.id.to_string(),
            name: line.name.clone(),
            price: line.price.to_string(),
            line_price: format_money(line.line_total()),
            image: line.display_image().map(str::to_owned),
            color_options: color_options(line),
            qty: line.qty,
            size: line.size.clone(),
        }
    }
}

fn color_options(line: &CartLine) -> Vec<ColorOption> {
    if line.images.len() <= 1 {
        return Vec::new();
    }
    let selected = line
        .selected_image
        .as_deref()
        .and_then(|image| line.images.iter().position(|candidate| candidate == image))
        .unwrap_or(0);
    line.images
        .iter()
        .enumerate()
        .map(|(idx, image)| ColorOption {
            label: format!("Color {}", idx + 1),
            image: image.clone(),
            checked: idx == selected,
        })
        .collect()
}

/// Totals display data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartSummaryView {
    pub subtotal: String,
    pub delivery: String,
    pub total: String,
    pub item_count: u64,
}

impl From<&CartSummary> for CartSummaryView {
    fn from(summary: &CartSummary) -> Self {
        Self {
            subtotal: format_money(summary.subtotal),
            delivery: format_money(summary.delivery),
            total: format_money(summary.total),
            item_count: summary.item_count,
        }
    }
}

/// Cart display data for templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub summary: CartSummaryView,
}

impl CartView {
    #[must_use]
    pub fn new(lines: &[CartLine], summary: &CartSummary) -> Self {
        Self {
            items: lines
                .iter()
                .enumerate()
                .map(|(index, line)| CartItemView::new(index, line))
                .collect(),
            summary: CartSummaryView::from(summary),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// The cart item list.
#[derive(Template)]
#[template(path = "cart/items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
    pub empty_message: &'static str,
}

impl CartItemsTemplate {
    #[must_use]
    pub const fn new(cart: CartView, language: Language) -> Self {
        Self {
            cart,
            empty_message: empty_cart_message(language),
        }
    }
}

/// The totals panel.
#[derive(Template)]
#[template(path = "cart/summary.html")]
pub struct CartSummaryTemplate {
    pub summary: CartSummaryView,
}
