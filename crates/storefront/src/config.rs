//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `PRODUCTS_SHEET_ID` - Product spreadsheet id
//!
//! ## Optional
//! - `ADDRESS_SHEET_ID` - Pickup-locker address spreadsheet id
//! - `SHEETS_BASE_URL` - Spreadsheet endpoint (default: `https://docs.google.com/spreadsheets/d`)
//! - `CATALOG_CACHE_TTL_SECS` - Catalog cache freshness (default: 3600)
//! - `ADDRESS_CACHE_TTL_SECS` - Address cache freshness (default: 86400)
//! - `DELIVERY_FEE_POLICY` - `included` (default), `percent:<n>` or `<n>%`
//! - `STOREFRONT_DATA_DIR` - Root of the file-backed store (default: `.storefront`)
//! - `EMAILJS_SERVICE_ID`, `EMAILJS_TEMPLATE_ID`, `EMAILJS_PUBLIC_KEY`,
//!   `ORDER_NOTIFY_EMAIL` - Order notification; enabled only when all four are set
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::path::PathBuf;

use chrono::TimeDelta;
use neon_core::DeliveryFeePolicy;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

const DEFAULT_SHEETS_BASE_URL: &str = "https://docs.google.com/spreadsheets/d";
const DEFAULT_CATALOG_TTL_SECS: &str = "3600";
const DEFAULT_ADDRESS_TTL_SECS: &str = "86400";
const DEFAULT_DATA_DIR: &str = ".storefront";

/// Values shipped in setup guides that must never reach production (case-insensitive).
const PLACEHOLDER_PATTERNS: &[&str] = &["your_", "your-", "changeme", "placeholder", "replace", "xxx"];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Product spreadsheet id
    pub products_sheet_id: String,
    /// Address spreadsheet id; autocomplete is off without it
    pub address_sheet_id: Option<String>,
    /// Spreadsheet endpoint the sheet id is appended to
    pub sheets_base_url: Url,
    /// Catalog cache freshness window
    pub catalog_ttl: TimeDelta,
    /// Address cache freshness window
    pub address_ttl: TimeDelta,
    /// How delivery is charged
    pub delivery_fee_policy: DeliveryFeePolicy,
    /// Root directory of the file-backed store
    pub data_dir: PathBuf,
    /// Order notification settings
    pub emailjs: Option<EmailJsConfig>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// EmailJS order notification configuration.
///
/// Implements `Debug` manually to redact the public key.
#[derive(Clone)]
pub struct EmailJsConfig {
    pub service_id: String,
    pub template_id: String,
    /// Account key sent as `user_id`
    pub public_key: SecretString,
    /// Recipient of order notifications
    pub notify_email: String,
}

impl std::fmt::Debug for EmailJsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailJsConfig")
            .field("service_id", &self.service_id)
            .field("template_id", &self.template_id)
            .field("public_key", &"[REDACTED]")
            .field("notify_email", &self.notify_email)
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup(env: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = &env;
        let sheets_base_url = get_env_or_default(env, "SHEETS_BASE_URL", DEFAULT_SHEETS_BASE_URL);
        let sheets_base_url = Url::parse(&sheets_base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("SHEETS_BASE_URL".to_string(), e.to_string())
        })?;

        let delivery_fee_policy = get_optional_env(env, "DELIVERY_FEE_POLICY")
            .map(|raw| {
                raw.parse::<DeliveryFeePolicy>().map_err(|e| {
                    ConfigError::InvalidEnvVar("DELIVERY_FEE_POLICY".to_string(), e.to_string())
                })
            })
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            products_sheet_id: get_required_env(env, "PRODUCTS_SHEET_ID")?,
            address_sheet_id: get_optional_env(env, "ADDRESS_SHEET_ID"),
            sheets_base_url,
            catalog_ttl: get_ttl(env, "CATALOG_CACHE_TTL_SECS", DEFAULT_CATALOG_TTL_SECS)?,
            address_ttl: get_ttl(env, "ADDRESS_CACHE_TTL_SECS", DEFAULT_ADDRESS_TTL_SECS)?,
            delivery_fee_policy,
            data_dir: PathBuf::from(get_env_or_default(env, "STOREFRONT_DATA_DIR", DEFAULT_DATA_DIR)),
            emailjs: EmailJsConfig::from_lookup(env)?,
            sentry_dsn: get_optional_env(env, "SENTRY_DSN"),
        })
    }
}

impl EmailJsConfig {
    /// `None` unless every variable is set.
    fn from_lookup(env: &impl Fn(&str) -> Option<String>) -> Result<Option<Self>, ConfigError> {
        let (Some(service_id), Some(template_id), Some(public_key), Some(notify_email)) = (
            get_optional_env(env, "EMAILJS_SERVICE_ID"),
            get_optional_env(env, "EMAILJS_TEMPLATE_ID"),
            get_optional_env(env, "EMAILJS_PUBLIC_KEY"),
            get_optional_env(env, "ORDER_NOTIFY_EMAIL"),
        ) else {
            return Ok(None);
        };

        let public_key = SecretString::from(public_key);
        reject_placeholder(&public_key, "EMAILJS_PUBLIC_KEY")?;
        if template_id.to_lowercase().contains("your_") {
            return Err(ConfigError::InvalidEnvVar(
                "EMAILJS_TEMPLATE_ID".to_string(),
                "appears to be a placeholder".to_string(),
            ));
        }

        Ok(Some(Self {
            service_id,
            template_id,
            public_key,
            notify_email,
        }))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required variable.
fn get_required_env(env: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String, ConfigError> {
    get_optional_env(env, key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional variable. Blank values count as unset.
fn get_optional_env(env: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    env(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Get a variable with a default value.
fn get_env_or_default(env: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    get_optional_env(env, key).unwrap_or_else(|| default.to_string())
}

/// Get a cache window given in whole seconds.
fn get_ttl(
    env: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: &str,
) -> Result<TimeDelta, ConfigError> {
    let secs = get_env_or_default(env, key, default)
        .parse::<u32>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    Ok(TimeDelta::seconds(i64::from(secs)))
}

/// Reject values copied verbatim from setup instructions.
fn reject_placeholder(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.expose_secret().to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }
    Ok(())
}
