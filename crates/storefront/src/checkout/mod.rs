//! Checkout: form validation, order creation and the order history.
//!
//! Submission runs in a fixed order. The form is validated first, and the
//! first failure stops everything with nothing written. A valid form
//! becomes an [`Order`] built from the persisted cart and checkout total,
//! which is appended to the order history before the cart is cleared.
//! The owner notification goes out last and cannot fail the submission.

pub mod notify;

use std::sync::Arc;

use askama::Template;
use chrono::{DateTime, Utc};
use neon_core::{
    DeliveryMethod, Email, EmailError, Order, OrderId, OrderStatus, Phone, PhoneError,
};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::instrument;

use self::notify::OrderNotifier;
use crate::cart::CartStore;
use crate::error::add_breadcrumb;
use crate::storage::{KeyValueStore, StorageError, keys, write_json};

/// Longest accepted name, in characters.
pub const MAX_NAME_CHARS: usize = 100;
/// Longest accepted email, in characters.
pub const MAX_EMAIL_CHARS: usize = 100;
/// Longest accepted phone number, in characters.
pub const MAX_PHONE_CHARS: usize = 20;
/// Longest accepted address, in characters.
pub const MAX_ADDRESS_CHARS: usize = 200;

/// Checkout total used when none was persisted.
const DEFAULT_TOTAL: &str = "0.00";

/// Errors that stop a checkout submission.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("name, email and phone are required")]
    MissingFields,

    #[error("shipping requires an address")]
    MissingAddress,

    #[error("invalid email: {0}")]
    InvalidEmail(#[source] EmailError),

    #[error("invalid phone: {0}")]
    InvalidPhone(#[source] PhoneError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl CheckoutError {
    /// Bilingual message for the shopper.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::MissingFields => "請填寫完整的資料 Please fill in all required information",
            Self::MissingAddress => "請填寫郵寄地址 Please fill in shipping address",
            Self::InvalidEmail(_) => "請輸入有效的電子郵件地址 Please enter a valid email address",
            Self::InvalidPhone(_) => "請輸入有效的電話號碼 Please enter a valid phone number",
            Self::Storage(_) => "系統錯誤，請稍後再試 Something went wrong, please try again later",
        }
    }
}

/// The checkout form as submitted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub delivery_method: DeliveryMethod,
    #[serde(default)]
    pub address: String,
}

/// A form that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCheckout {
    pub name: String,
    pub email: Email,
    pub phone: Phone,
    pub delivery_method: DeliveryMethod,
    /// Present exactly when the method is shipping.
    pub address: Option<String>,
}

impl CheckoutForm {
    /// Trim and truncate every field, then validate.
    ///
    /// Checks run in order and the first failure is returned: required
    /// fields, then the address for shipping, then email, then phone.
    ///
    /// # Errors
    ///
    /// Returns the first [`CheckoutError`] found.
    pub fn validate(&self) -> Result<ValidatedCheckout, CheckoutError> {
        let name = clean(&self.name, MAX_NAME_CHARS);
        let email = clean(&self.email, MAX_EMAIL_CHARS);
        let phone = clean(&self.phone, MAX_PHONE_CHARS);
        let address = self
            .delivery_method
            .requires_address()
            .then(|| clean(&self.address, MAX_ADDRESS_CHARS));

        if name.is_empty() || email.is_empty() || phone.is_empty() {
            return Err(CheckoutError::MissingFields);
        }
        if address.as_ref().is_some_and(String::is_empty) {
            return Err(CheckoutError::MissingAddress);
        }
        let email = Email::parse(&email).map_err(CheckoutError::InvalidEmail)?;
        let phone = Phone::parse(&phone).map_err(CheckoutError::InvalidPhone)?;

        Ok(ValidatedCheckout {
            name,
            email,
            phone,
            delivery_method: self.delivery_method,
            address,
        })
    }
}

fn clean(value: &str, max_chars: usize) -> String {
    value.trim().chars().take(max_chars).collect()
}

/// Places orders from the persisted cart.
pub struct CheckoutService<S, N> {
    store: Arc<S>,
    cart: CartStore<S>,
    notifier: Option<N>,
}

impl<S: KeyValueStore, N: OrderNotifier> CheckoutService<S, N> {
    /// Without a notifier, orders are placed silently.
    #[must_use]
    pub const fn new(store: Arc<S>, cart: CartStore<S>, notifier: Option<N>) -> Self {
        Self {
            store,
            cart,
            notifier,
        }
    }

    /// The checkout total handed over by the cart page, `0.00` when absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails.
    pub fn saved_total(&self) -> Result<String, StorageError> {
        Ok(self
            .store
            .get(keys::CHECKOUT_TOTAL)?
            .filter(|total| !total.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TOTAL.to_string()))
    }

    /// Submit the checkout form.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails or the order cannot be stored.
    pub async fn submit(&self, form: &CheckoutForm) -> Result<Order, CheckoutError> {
        self.submit_at(form, Utc::now()).await
    }

    /// [`submit`](Self::submit) with an explicit clock.
    #[instrument(skip(self, form), fields(delivery = ?form.delivery_method))]
    pub async fn submit_at(
        &self,
        form: &CheckoutForm,
        now: DateTime<Utc>,
    ) -> Result<Order, CheckoutError> {
        let checkout = form.validate()?;

        let order = Order {
            id: OrderId::from_timestamp_millis(now.timestamp_millis()),
            user_email: checkout.email.into_inner(),
            user_name: checkout.name,
            user_phone: checkout.phone.as_str().to_string(),
            delivery_method: checkout.delivery_method,
            user_address: checkout
                .address
                .unwrap_or_else(|| DeliveryMethod::Pickup.label().to_string()),
            total: self.saved_total()?,
            status: OrderStatus::Processing,
            date: now,
            delivery_date: Order::estimated_delivery(now),
            items: self.cart.lines()?,
        };

        self.append_order(&order)?;
        self.cart.clear()?;

        add_breadcrumb(
            "checkout",
            "Order placed",
            Some(&[("order_id", order.id.as_str())]),
        );
        tracing::info!(
            order_id = %order.id,
            total = %order.total,
            units = order.unit_count(),
            "Order placed"
        );

        self.send_notification(&order).await;
        Ok(order)
    }

    /// The order history, oldest first. Unreadable entries are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails.
    pub fn orders(&self) -> Result<Vec<Order>, StorageError> {
        Ok(self
            .history()?
            .into_iter()
            .filter_map(|entry| serde_json::from_value(entry).ok())
            .collect())
    }

    fn history(&self) -> Result<Vec<Value>, StorageError> {
        let Some(raw) = self.store.get(keys::ORDERS)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(entries)) => Ok(entries),
            _ => {
                tracing::warn!("Order history is corrupt, starting a new one");
                Ok(Vec::new())
            }
        }
    }

    /// Existing entries are kept exactly as stored, readable or not.
    fn append_order(&self, order: &Order) -> Result<(), StorageError> {
        let mut history = self.history()?;
        let entry = serde_json::to_value(order).map_err(|source| StorageError::Serialize {
            key: keys::ORDERS.to_string(),
            source,
        })?;
        history.push(entry);
        write_json(&*self.store, keys::ORDERS, &history)
    }

    async fn send_notification(&self, order: &Order) {
        let Some(notifier) = &self.notifier else {
            tracing::info!(order_id = %order.id, "Order notification not configured, skipping");
            return;
        };
        if let Err(e) = notifier.notify(order).await {
            tracing::warn!(order_id = %order.id, error = %e, "Order notification failed");
        }
    }
}

/// The confirmation page shown after a successful checkout.
#[derive(Template)]
#[template(path = "checkout/confirmation.html")]
pub struct OrderConfirmationTemplate {
    pub order_id: String,
    pub total: String,
    /// Plain-text summary offered for download.
    pub details: String,
    pub details_file_name: String,
}

impl From<&Order> for OrderConfirmationTemplate {
    fn from(order: &Order) -> Self {
        Self {
            order_id: order.id.to_string(),
            total: order.total.clone(),
            details: order.details_text(),
            details_file_name: order.details_file_name(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::TimeZone;
    use neon_core::{DeliveryFeePolicy, Price, Product, ProductId, ProductStatus};
    use rust_decimal::Decimal;

    use super::notify::NotifyError;
    use super::*;
    use crate::storage::MemoryStore;

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<OrderId>>,
        failures: AtomicUsize,
        fail: bool,
    }

    impl OrderNotifier for Arc<RecordingNotifier> {
        async fn notify(&self, order: &Order) -> Result<(), NotifyError> {
            if self.fail {
                self.failures.fetch_add(1, Ordering::SeqCst);
                return Err(NotifyError::Api {
                    status: 500,
                    message: "down".to_string(),
                });
            }
            self.sent.lock().unwrap().push(order.id.clone());
            Ok(())
        }
    }

    fn form(email: &str) -> CheckoutForm {
        CheckoutForm {
            name: "  Chan Tai Man  ".to_string(),
            email: email.to_string(),
            phone: "9123 4567".to_string(),
            delivery_method: DeliveryMethod::Pickup,
            address: "ignored".to_string(),
        }
    }

    fn service(
        notifier: Option<Arc<RecordingNotifier>>,
    ) -> (Arc<MemoryStore>, CheckoutService<MemoryStore, Arc<RecordingNotifier>>) {
        let store = Arc::new(MemoryStore::new());
        let cart = CartStore::new(store.clone(), DeliveryFeePolicy::Included);
        cart.add_or_increment(
            &Product {
                id: ProductId::new("LS00001"),
                name: "Keyring".to_string(),
                price: Price::new(Decimal::new(25, 0)),
                images: Vec::new(),
                description: String::new(),
                details: String::new(),
                size: String::new(),
                stock: 1,
                status: ProductStatus::Active,
            },
            None,
        )
        .unwrap();
        (store.clone(), CheckoutService::new(store, cart, notifier))
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_validation_order() {
        let mut f = form("");
        f.phone = "x".to_string();
        assert!(matches!(f.validate(), Err(CheckoutError::MissingFields)));

        let mut f = form("foo@bar");
        f.delivery_method = DeliveryMethod::Shipping;
        f.address = "   ".to_string();
        assert!(matches!(f.validate(), Err(CheckoutError::MissingAddress)));

        let mut f = form("foo@bar");
        f.phone = "abc".to_string();
        assert!(matches!(f.validate(), Err(CheckoutError::InvalidEmail(_))));

        let mut f = form("a@b.hk");
        f.phone = "1234".to_string();
        assert!(matches!(f.validate(), Err(CheckoutError::InvalidPhone(_))));
    }

    #[test]
    fn test_fields_are_trimmed_and_truncated() {
        let mut f = form("a@b.hk");
        f.name = "名".repeat(150);
        f.delivery_method = DeliveryMethod::Shipping;
        f.address = format!("  {}  ", "a".repeat(250));
        let checkout = f.validate().unwrap();
        assert_eq!(checkout.name.chars().count(), MAX_NAME_CHARS);
        assert_eq!(checkout.address.unwrap().len(), MAX_ADDRESS_CHARS);

        let checkout = form("a@b.hk").validate().unwrap();
        assert_eq!(checkout.name, "Chan Tai Man");
        assert_eq!(checkout.address, None);
    }

    #[tokio::test]
    async fn test_submit_records_order_and_clears_cart() {
        let notifier = Arc::new(RecordingNotifier::default());
        let (store, service) = service(Some(notifier.clone()));
        service.cart.compute_summary().unwrap();

        let order = service.submit_at(&form("a@b.hk"), now()).await.unwrap();
        assert_eq!(order.id.as_str(), "ORD-1714564800000");
        assert_eq!(order.total, "25.00");
        assert_eq!(order.user_address, "面交 Pickup");
        assert_eq!(order.status, OrderStatus::Processing);
        assert_eq!(order.delivery_date, Utc.with_ymd_and_hms(2024, 5, 8, 12, 0, 0).unwrap());
        assert_eq!(order.items.len(), 1);

        assert_eq!(service.orders().unwrap(), vec![order.clone()]);
        assert_eq!(store.get(keys::CART).unwrap(), None);
        assert_eq!(store.get(keys::CHECKOUT_TOTAL).unwrap(), None);
        assert_eq!(*notifier.sent.lock().unwrap(), vec![order.id]);
    }

    #[tokio::test]
    async fn test_invalid_email_writes_nothing() {
        let (store, service) = service(None);
        let result = service.submit_at(&form("foo@bar"), now()).await;
        assert!(matches!(result, Err(CheckoutError::InvalidEmail(_))));
        assert!(service.orders().unwrap().is_empty());
        assert!(store.get(keys::CART).unwrap().is_some());
    }

    #[tokio::test]
    async fn test_notification_failure_does_not_fail_checkout() {
        let notifier = Arc::new(RecordingNotifier {
            fail: true,
            ..RecordingNotifier::default()
        });
        let (store, service) = service(Some(notifier.clone()));
        store.remove(keys::CHECKOUT_TOTAL).unwrap();
        let order = service.submit_at(&form("a@b.hk"), now()).await.unwrap();
        assert_eq!(order.total, "0.00");
        assert_eq!(notifier.failures.load(Ordering::SeqCst), 1);
        assert_eq!(service.orders().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_history_is_replaced() {
        let (store, service) = service(None);
        store.set(keys::ORDERS, "{broken").unwrap();
        service.submit_at(&form("a@b.hk"), now()).await.unwrap();
        assert_eq!(service.orders().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unreadable_history_entries_are_preserved() {
        let (store, service) = service(None);
        store.set(keys::ORDERS, r#"[{"legacy": true}]"#).unwrap();
        service.submit_at(&form("a@b.hk"), now()).await.unwrap();

        let raw: Vec<Value> = serde_json::from_str(&store.get(keys::ORDERS).unwrap().unwrap()).unwrap();
        assert_eq!(raw.len(), 2);
        assert_eq!(service.orders().unwrap().len(), 1);
    }

    #[test]
    fn test_confirmation_template() {
        let order = Order {
            id: OrderId::new("ORD-1"),
            user_email: "a@b.hk".to_string(),
            user_name: "Chan".to_string(),
            user_phone: "91234567".to_string(),
            delivery_method: DeliveryMethod::Pickup,
            user_address: "面交 Pickup".to_string(),
            total: "25.00".to_string(),
            status: OrderStatus::Processing,
            date: now(),
            delivery_date: Order::estimated_delivery(now()),
            items: Vec::new(),
        };
        let html = OrderConfirmationTemplate::from(&order).render().unwrap();
        assert!(html.contains("$25.00 HKD"));
        assert!(html.contains("Order_ORD-1.txt"));
    }
}
