//! Spreadsheet-backed data source.
//!
//! Products and pickup addresses are maintained in public spreadsheets and
//! read through the visualization ("gviz") query endpoint, which answers
//! with a JSON table wrapped in a script callback.
//!
//! # Layers
//!
//! - [`SheetSource`] - fetch the raw response text for a sheet id
//! - [`SheetsClient`] - the HTTP implementation
//! - [`gviz`] - strip the callback wrapper and read cells with the loose
//!   value semantics the sheets were authored against

mod client;
pub mod gviz;

pub use client::SheetsClient;
pub use gviz::{GvizCell, GvizRow, GvizTable};

use std::future::Future;

use thiserror::Error;

/// Errors fetching or parsing a sheet.
#[derive(Debug, Error)]
pub enum SheetsError {
    /// Transport-level failure.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("sheet request returned HTTP {status}")]
    Status { status: u16 },

    /// The response did not contain a parseable table.
    #[error("parse error: {0}")]
    Parse(String),

    /// The configured endpoint cannot be turned into a request URL.
    #[error("invalid sheet URL: {0}")]
    Url(String),
}

impl SheetsError {
    /// Whether the sheet exists but is not shared publicly.
    #[must_use]
    pub const fn is_forbidden(&self) -> bool {
        matches!(self, Self::Status { status: 403 })
    }
}

/// Something that can fetch the raw gviz response for a sheet.
pub trait SheetSource: Send + Sync {
    /// Fetch the full response body for `sheet_id`.
    fn fetch(&self, sheet_id: &str) -> impl Future<Output = Result<String, SheetsError>> + Send;
}

/// Fetch a sheet and parse its table.
///
/// # Errors
///
/// Returns the source's error, or [`SheetsError::Parse`] if the body holds
/// no JSON object or the object is not a gviz table.
pub async fn fetch_table<S: SheetSource>(
    source: &S,
    sheet_id: &str,
) -> Result<GvizTable, SheetsError> {
    let text = source.fetch(sheet_id).await?;
    gviz::parse_response(&text)
}
