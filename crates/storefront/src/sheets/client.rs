//! HTTP client for the gviz query endpoint.

use std::sync::Arc;

use tracing::instrument;
use url::Url;

use super::{SheetSource, SheetsError};

/// Client for public spreadsheets.
///
/// Cheaply cloneable; all clones share one connection pool.
#[derive(Clone)]
pub struct SheetsClient {
    inner: Arc<SheetsClientInner>,
}

struct SheetsClientInner {
    client: reqwest::Client,
    base_url: Url,
}

impl SheetsClient {
    /// Create a client for sheets under `base_url`
    /// (e.g. `https://docs.google.com/spreadsheets/d`).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(base_url: Url) -> Result<Self, SheetsError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("neon-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(SheetsClientInner { client, base_url }),
        })
    }

    /// The query URL for a sheet: `{base}/{id}/gviz/tq?tqx=out:json&tq=SELECT *`.
    ///
    /// # Errors
    ///
    /// Returns [`SheetsError::Url`] if the base URL cannot carry a path.
    pub fn query_url(&self, sheet_id: &str) -> Result<Url, SheetsError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| SheetsError::Url(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .push(sheet_id)
            .push("gviz")
            .push("tq");
        url.query_pairs_mut()
            .append_pair("tqx", "out:json")
            .append_pair("tq", "SELECT *");
        Ok(url)
    }
}

impl SheetSource for SheetsClient {
    #[instrument(skip(self))]
    async fn fetch(&self, sheet_id: &str) -> Result<String, SheetsError> {
        let url = self.query_url(sheet_id)?;
        let response = self
            .inner
            .client
            .get(url)
            .header("Cache-Control", "no-cache")
            .send()
            .await?;

        let status = response.status();

        // Read the body first so failures can be logged with context
        let body = response.text().await?;

        if status == reqwest::StatusCode::FORBIDDEN {
            tracing::warn!(
                sheet_id,
                "Sheet access denied; it must be shared as \"Anyone with the link can view\""
            );
            return Err(SheetsError::Status {
                status: status.as_u16(),
            });
        }

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Sheet request returned non-success status"
            );
            return Err(SheetsError::Status {
                status: status.as_u16(),
            });
        }

        Ok(body)
    }
}
