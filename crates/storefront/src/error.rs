//! Unified error handling with Sentry integration.
//!
//! Page-level operations return [`Result<T>`]. Failures the shopper can fix
//! (bad form input, a product that vanished) carry a bilingual message for
//! the page; everything else is captured to Sentry and shown as a generic
//! notice.

use thiserror::Error;

use crate::cart::CartError;
use crate::checkout::CheckoutError;
use crate::checkout::notify::NotifyError;
use crate::config::ConfigError;
use crate::sheets::SheetsError;
use crate::storage::StorageError;

const INTERNAL_MESSAGE: &str = "系統錯誤，請稍後再試 Something went wrong, please try again later";

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Persisted storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// A spreadsheet could not be fetched or parsed.
    #[error("Sheets error: {0}")]
    Sheets(#[from] SheetsError),

    /// A cart mutation was rejected.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Checkout was rejected.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// The order notification could not be sent.
    #[error("Notification error: {0}")]
    Notify(#[from] NotifyError),

    /// A template failed to render.
    #[error("Render error: {0}")]
    Render(#[from] askama::Error),

    /// Configuration is missing or invalid.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl AppError {
    /// Whether this is a fault on our side rather than the shopper's.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        match self {
            Self::Storage(_)
            | Self::Sheets(_)
            | Self::Render(_)
            | Self::Notify(_)
            | Self::Config(_) => true,
            Self::Cart(err) => matches!(err, CartError::Storage(_)),
            Self::Checkout(err) => matches!(err, CheckoutError::Storage(_)),
            Self::NotFound(_) => false,
        }
    }

    /// The message to show on the page. Internal details are never exposed.
    #[must_use]
    pub fn user_message(&self) -> String {
        if self.is_internal() {
            return INTERNAL_MESSAGE.to_string();
        }
        match self {
            Self::Checkout(err) => err.user_message().to_string(),
            Self::Cart(CartError::Empty) => "您的購物車是空的 Your cart is empty!".to_string(),
            Self::Cart(_) => "購物車已更新，請重試 Your cart changed, please try again".to_string(),
            Self::NotFound(_) => "找不到商品 Product not found".to_string(),
            _ => INTERNAL_MESSAGE.to_string(),
        }
    }

    /// Report the error: internal faults go to Sentry, the rest are logged.
    pub fn capture(&self) {
        if self.is_internal() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Storefront error"
            );
        } else {
            tracing::info!(error = %self, "Rejected storefront action");
        }
    }

    /// Report the error and turn it into the alert text for the page.
    #[must_use]
    pub fn into_alert(self) -> String {
        self.capture();
        self.user_message()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for shopper actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("product_id", "LS00001")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    for (key, value) in data.unwrap_or_default() {
        breadcrumb.data.insert(
            (*key).to_string(),
            serde_json::Value::String((*value).to_string()),
        );
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use neon_core::ProductId;

    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("LS00001".to_string());
        assert_eq!(err.to_string(), "Not found: LS00001");
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let err = AppError::Storage(StorageError::Poisoned);
        assert!(err.is_internal());
        assert!(!err.user_message().contains("poisoned"));

        let err = AppError::Cart(CartError::Storage(StorageError::Poisoned));
        assert!(err.is_internal());
    }

    #[test]
    fn test_shopper_errors_are_not_internal() {
        let stale = AppError::Cart(CartError::StaleIndex {
            index: 0,
            expected: ProductId::new("A"),
            found: ProductId::new("B"),
        });
        assert!(!stale.is_internal());
        assert!(AppError::Cart(CartError::Empty).user_message().contains("Your cart is empty"));
        assert!(!AppError::Checkout(CheckoutError::MissingFields).is_internal());
    }

    #[test]
    fn test_into_alert() {
        let alert = AppError::NotFound("LS00009".to_string()).into_alert();
        assert_eq!(alert, "找不到商品 Product not found");

        let alert = AppError::Storage(StorageError::Poisoned).into_alert();
        assert!(alert.contains("Something went wrong"));
    }
}
