//! Status and preference enums for various entities.

use serde::{Deserialize, Serialize};

/// Listing status of a catalog product. Only active products are displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    #[default]
    Active,
    Inactive,
}

impl ProductStatus {
    /// Recognise a status token, ignoring case and surrounding whitespace.
    ///
    /// Returns `None` for anything other than `active` / `inactive`.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        let token = token.trim();
        if token.eq_ignore_ascii_case("active") {
            Some(Self::Active)
        } else if token.eq_ignore_ascii_case("inactive") {
            Some(Self::Inactive)
        } else {
            None
        }
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl std::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Inactive => write!(f, "inactive"),
        }
    }
}

/// Order processing status. Orders are created in `Processing` and never
/// advanced by the storefront itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    #[default]
    Processing,
}

/// How an order reaches the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMethod {
    /// In-person handover, no address needed.
    #[default]
    Pickup,
    /// Posted to a customer-supplied address.
    Shipping,
}

impl DeliveryMethod {
    /// Whether the checkout form must carry an address for this method.
    #[must_use]
    pub const fn requires_address(&self) -> bool {
        matches!(self, Self::Shipping)
    }

    /// Bilingual label used in order records and notifications.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Pickup => "面交 Pickup",
            Self::Shipping => "郵寄 Shipping",
        }
    }
}

impl std::str::FromStr for DeliveryMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pickup" => Ok(Self::Pickup),
            "shipping" => Ok(Self::Shipping),
            _ => Err(format!("invalid delivery method: {s}")),
        }
    }
}

/// Display language of the storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Zh,
    En,
}

impl Language {
    /// The persisted language code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Zh => "zh",
            Self::En => "en",
        }
    }
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "zh" => Ok(Self::Zh),
            "en" => Ok(Self::En),
            _ => Err(format!("invalid language: {s}")),
        }
    }
}

/// Colour theme of the storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Theme {
    #[default]
    DarkMode,
    LightMode,
}

impl Theme {
    /// The persisted theme name, also used as the body CSS class.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::DarkMode => "dark-mode",
            Self::LightMode => "light-mode",
        }
    }

    /// The other theme.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::DarkMode => Self::LightMode,
            Self::LightMode => Self::DarkMode,
        }
    }
}

impl std::str::FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dark-mode" => Ok(Self::DarkMode),
            "light-mode" => Ok(Self::LightMode),
            _ => Err(format!("invalid theme: {s}")),
        }
    }
}
