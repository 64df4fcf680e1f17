//! Order notification email.
//!
//! The shop owner is told about every order through EmailJS, a hosted
//! template mailer. Sending is best-effort: checkout never waits on it to
//! decide success.

use std::future::Future;
use std::sync::Arc;

use chrono::FixedOffset;
use neon_core::Order;
use secrecy::ExposeSecret;
use serde::Serialize;
use thiserror::Error;
use tracing::instrument;

use crate::config::EmailJsConfig;

/// EmailJS send endpoint.
pub const EMAILJS_SEND_URL: &str = "https://api.emailjs.com/api/v1.0/email/send";

/// Hong Kong is UTC+8 all year.
const HONG_KONG_OFFSET_SECS: i32 = 8 * 3600;

/// Errors that can occur when sending a notification.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
}

/// Something that can announce a placed order.
pub trait OrderNotifier: Send + Sync {
    /// Send the notification for `order`.
    fn notify(&self, order: &Order) -> impl Future<Output = Result<(), NotifyError>> + Send;
}

/// Template variables for the order email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderEmailParams {
    pub order_id: String,
    /// Placement time in Hong Kong, e.g. `2024/5/1 20:00:00`.
    pub order_date: String,
    /// `$26.25 HKD`.
    pub order_total: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: String,
    pub delivery_method: String,
    pub delivery_address: String,
    pub items_list: String,
    pub items_count: u64,
    pub to_email: String,
}

impl OrderEmailParams {
    #[must_use]
    pub fn new(order: &Order, to_email: &str) -> Self {
        let order_date = FixedOffset::east_opt(HONG_KONG_OFFSET_SECS).map_or_else(
            || order.date.format("%Y/%-m/%-d %H:%M:%S").to_string(),
            |hong_kong| {
                order
                    .date
                    .with_timezone(&hong_kong)
                    .format("%Y/%-m/%-d %H:%M:%S")
                    .to_string()
            },
        );

        Self {
            order_id: order.id.to_string(),
            order_date,
            order_total: format!("${} HKD", order.total),
            customer_name: order.user_name.clone(),
            customer_phone: order.user_phone.clone(),
            customer_email: order.user_email.clone(),
            delivery_method: order.delivery_method.label().to_string(),
            delivery_address: order.user_address.clone(),
            items_list: order.items_list(" HKD"),
            items_count: order.unit_count(),
            to_email: to_email.to_string(),
        }
    }
}

#[derive(Serialize)]
struct SendRequest<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    template_params: OrderEmailParams,
}

/// EmailJS REST client.
#[derive(Clone)]
pub struct EmailJsClient {
    inner: Arc<EmailJsClientInner>,
}

struct EmailJsClientInner {
    client: reqwest::Client,
    endpoint: String,
    config: EmailJsConfig,
}

impl EmailJsClient {
    /// Create a client for the production endpoint.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: EmailJsConfig) -> Result<Self, NotifyError> {
        Self::with_endpoint(config, EMAILJS_SEND_URL)
    }

    /// Create a client posting to `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn with_endpoint(config: EmailJsConfig, endpoint: impl Into<String>) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("neon-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            inner: Arc::new(EmailJsClientInner {
                client,
                endpoint: endpoint.into(),
                config,
            }),
        })
    }
}

impl OrderNotifier for EmailJsClient {
    #[instrument(skip(self, order), fields(order_id = %order.id))]
    async fn notify(&self, order: &Order) -> Result<(), NotifyError> {
        let config = &self.inner.config;
        let body = SendRequest {
            service_id: &config.service_id,
            template_id: &config.template_id,
            user_id: config.public_key.expose_secret(),
            template_params: OrderEmailParams::new(order, &config.notify_email),
        };

        let response = self
            .inner
            .client
            .post(&self.inner.endpoint)
            .json(&body)
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::error!(
                status = %status,
                body = %message.chars().take(500).collect::<String>(),
                "EmailJS send failed"
            );
            return Err(NotifyError::Api {
                status: status.as_u16(),
                message,
            });
        }

        tracing::info!("Order notification sent");
        Ok(())
    }
}
