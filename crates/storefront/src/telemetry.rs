//! Logging and error tracking setup.
//!
//! Call [`init_sentry`] before [`init_tracing`] and keep the returned guard
//! alive for the lifetime of the page context.

use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::StorefrontConfig;

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "neon_storefront=info";

/// Initialize Sentry error tracking. Returns `None` when no DSN is configured.
#[must_use]
pub fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Map tracing levels to Sentry: warnings and errors become events, info and
/// debug become breadcrumbs.
#[must_use]
pub fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Install the global subscriber: `EnvFilter`, formatted output and the
/// Sentry layer.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_tracing() -> Result<(), TryInitError> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .try_init()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;

    use chrono::TimeDelta;
    use neon_core::DeliveryFeePolicy;
    use url::Url;

    use super::*;

    #[test]
    fn test_no_dsn_no_sentry() {
        let config = StorefrontConfig {
            products_sheet_id: "s".to_string(),
            address_sheet_id: None,
            sheets_base_url: Url::parse("https://docs.google.com/spreadsheets/d").unwrap(),
            catalog_ttl: TimeDelta::hours(1),
            address_ttl: TimeDelta::hours(24),
            delivery_fee_policy: DeliveryFeePolicy::Included,
            data_dir: PathBuf::from(".storefront"),
            emailjs: None,
            sentry_dsn: None,
        };
        assert!(init_sentry(&config).is_none());
    }

    #[test]
    fn test_second_init_is_an_error() {
        let _ = init_tracing();
        assert!(init_tracing().is_err());
    }
}
