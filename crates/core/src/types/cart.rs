//! Cart line records, totals, and the delivery-fee policy.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::price::format_amount;
use super::{Price, Product, ProductId};

/// One line of the persisted cart.
///
/// Name, price and images are snapshots taken when the product was added;
/// they are not live-linked to the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    #[serde(default)]
    pub images: Vec<String>,
    /// Always at least 1.
    pub qty: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

impl CartLine {
    /// Snapshot a product into a new line with quantity 1. The first image
    /// becomes the default variant.
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            price: product.price,
            images: product.images.clone(),
            qty: 1,
            selected_color: None,
            selected_image: product.first_image().map(str::to_owned),
            size: None,
        }
    }

    /// Price multiplied by quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price.times(self.qty)
    }

    /// The image to show for this line: the chosen variant, else the first image.
    #[must_use]
    pub fn display_image(&self) -> Option<&str> {
        self.selected_image
            .as_deref()
            .or_else(|| self.images.first().map(String::as_str))
    }
}

/// Totals derived from the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CartSummary {
    pub subtotal: Decimal,
    pub delivery: Decimal,
    pub total: Decimal,
    /// Sum of all line quantities.
    pub item_count: u64,
}

impl CartSummary {
    /// Compute the summary of a list of lines under a delivery policy.
    #[must_use]
    pub fn compute(lines: &[CartLine], policy: DeliveryFeePolicy) -> Self {
        let subtotal = lines
            .iter()
            .map(CartLine::line_total)
            .fold(Decimal::ZERO, Decimal::saturating_add);
        let delivery = policy.fee(subtotal);
        Self {
            subtotal,
            delivery,
            total: subtotal.saturating_add(delivery),
            item_count: lines.iter().map(|line| u64::from(line.qty)).sum(),
        }
    }

    /// The total as persisted for the checkout hand-off, e.g. `"26.25"`.
    #[must_use]
    pub fn checkout_total(&self) -> String {
        format_amount(self.total)
    }
}

/// Errors parsing a [`DeliveryFeePolicy`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeliveryPolicyError {
    #[error("unknown delivery fee policy: {0}")]
    Unknown(String),
    #[error("invalid delivery fee percentage: {0}")]
    InvalidPercentage(String),
}

/// How the delivery fee is derived from the subtotal.
///
/// This is a deployment choice, not computed from weight or distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeliveryFeePolicy {
    /// Delivery is included in the price; the fee is always zero.
    #[default]
    Included,
    /// The fee is this percentage of the subtotal (5 means 5%).
    Percentage(Decimal),
}

impl DeliveryFeePolicy {
    /// The fee for a given subtotal.
    #[must_use]
    pub fn fee(&self, subtotal: Decimal) -> Decimal {
        match self {
            Self::Included => Decimal::ZERO,
            Self::Percentage(percent) => subtotal.saturating_mul(*percent) / Decimal::ONE_HUNDRED,
        }
    }
}

impl std::str::FromStr for DeliveryFeePolicy {
    type Err = DeliveryPolicyError;

    /// Accepts `included` / `free` / `flat-zero`, `percent:<n>` and `<n>%`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if ["included", "free", "flat-zero"]
            .iter()
            .any(|name| s.eq_ignore_ascii_case(name))
        {
            return Ok(Self::Included);
        }

        let percent = s
            .strip_prefix("percent:")
            .or_else(|| s.strip_suffix('%'))
            .ok_or_else(|| DeliveryPolicyError::Unknown(s.to_owned()))?;

        let value: Decimal = percent
            .trim()
            .parse()
            .map_err(|_| DeliveryPolicyError::InvalidPercentage(percent.to_owned()))?;
        if value.is_sign_negative() {
            return Err(DeliveryPolicyError::InvalidPercentage(percent.to_owned()));
        }
        Ok(Self::Percentage(value))
    }
}
