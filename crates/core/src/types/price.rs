//! Type-safe price representation using decimal arithmetic.

use core::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A non-negative unit price.
///
/// Serialized transparently as its decimal amount so persisted carts and
/// cached catalogs keep a flat `"price"` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new price. Negative amounts are clamped to zero.
    #[must_use]
    pub fn new(amount: Decimal) -> Self {
        Self(amount.max(Decimal::ZERO))
    }

    /// The decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Whether the price is strictly greater than zero.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Price multiplied by a quantity, saturating at [`Decimal::MAX`].
    #[must_use]
    pub fn times(&self, quantity: u32) -> Decimal {
        self.0.saturating_mul(Decimal::from(quantity))
    }

    /// Format for display with the store currency suffix (e.g., "$19.99 HKD").
    #[must_use]
    pub fn display_with_currency(&self) -> String {
        format!("{self} {}", CurrencyCode::default().code())
    }
}

/// Formats as `$` followed by the amount rounded to two decimals.
impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_money(self.0))
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self::new(amount)
    }
}

/// Format any decimal amount as `$x.xx`.
#[must_use]
pub fn format_money(amount: Decimal) -> String {
    format!("${}", format_amount(amount))
}

/// Format any decimal amount with exactly two decimals and no symbol.
#[must_use]
pub fn format_amount(amount: Decimal) -> String {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded.to_string()
}

/// ISO 4217 currency codes the store can display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    HKD,
    USD,
}

impl CurrencyCode {
    /// The ISO code as a string.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::HKD => "HKD",
            Self::USD => "USD",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_clamped() {
        assert_eq!(Price::new(Decimal::new(-5, 0)), Price::ZERO);
    }

    #[test]
    fn test_display_two_decimals() {
        assert_eq!(Price::new(Decimal::new(348, 0)).to_string(), "$348.00");
        assert_eq!(Price::new(Decimal::new(1999, 2)).to_string(), "$19.99");
        assert_eq!(Price::new(Decimal::new(12345, 3)).to_string(), "$12.35");
    }

    #[test]
    fn test_display_with_currency() {
        let price = Price::new(Decimal::new(688, 0));
        assert_eq!(price.display_with_currency(), "$688.00 HKD");
    }

    #[test]
    fn test_times() {
        let price = Price::new(Decimal::new(10, 0));
        assert_eq!(price.times(3), Decimal::new(30, 0));
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(Decimal::new(2625, 2)), "26.25");
        assert_eq!(format_amount(Decimal::ZERO), "0.00");
        assert_eq!(format_amount(Decimal::new(125, 2)), "1.25");
    }

    #[test]
    fn test_serde_roundtrip_accepts_number() {
        let price: Price = serde_json::from_str("10.5").unwrap();
        assert_eq!(price.amount(), Decimal::new(105, 1));
    }
}
