//! Cross-component scenarios for the Neon storefront.
//!
//! Tests drive a full [`Storefront`] against in-memory or temp-dir storage,
//! a scripted spreadsheet and a recording notifier, so nothing touches the
//! network.
//!
//! ```bash
//! cargo test -p neon-integration-tests
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use neon_core::{Order, OrderId};
use neon_storefront::checkout::notify::{NotifyError, OrderNotifier};
use neon_storefront::config::{ConfigError, StorefrontConfig};
use neon_storefront::sheets::{SheetSource, SheetsError};
use neon_storefront::state::Storefront;
use neon_storefront::storage::MemoryStore;
use serde_json::{Value, json};

/// Sheet id the test config uses for products.
pub const PRODUCTS_SHEET: &str = "products-sheet";

/// Sheet id the test config uses for addresses.
pub const ADDRESS_SHEET: &str = "address-sheet";

/// A spreadsheet that answers from a script, per sheet id.
///
/// Each fetch pops the next scripted answer for its sheet; `Err(status)`
/// answers become HTTP status errors. An exhausted script answers 503.
#[derive(Clone, Default)]
pub struct ScriptedSheet {
    answers: Arc<Mutex<Vec<(String, VecDeque<Result<String, u16>>)>>>,
    fetches: Arc<Mutex<Vec<String>>>,
}

impl ScriptedSheet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an answer for `sheet_id`.
    #[must_use]
    pub fn answer(self, sheet_id: &str, answer: Result<String, u16>) -> Self {
        {
            let mut answers = self.answers.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some((_, queue)) = answers.iter_mut().find(|(id, _)| id == sheet_id) {
                queue.push_back(answer);
            } else {
                answers.push((sheet_id.to_string(), VecDeque::from([answer])));
            }
        }
        self
    }

    /// How many times `sheet_id` was fetched.
    #[must_use]
    pub fn fetch_count(&self, sheet_id: &str) -> usize {
        self.fetches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|id| *id == sheet_id)
            .count()
    }
}

impl SheetSource for ScriptedSheet {
    async fn fetch(&self, sheet_id: &str) -> Result<String, SheetsError> {
        self.fetches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(sheet_id.to_string());
        let next = self
            .answers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter_mut()
            .find(|(id, _)| id == sheet_id)
            .and_then(|(_, queue)| queue.pop_front());
        match next {
            Some(Ok(body)) => Ok(body),
            Some(Err(status)) => Err(SheetsError::Status { status }),
            None => Err(SheetsError::Status { status: 503 }),
        }
    }
}

/// Records every order it is asked to announce.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<OrderId>>>,
}

impl RecordingNotifier {
    #[must_use]
    pub fn sent(&self) -> Vec<OrderId> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl OrderNotifier for RecordingNotifier {
    async fn notify(&self, order: &Order) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(order.id.clone());
        Ok(())
    }
}

/// Wrap rows in the callback envelope the sheet endpoint returns.
#[must_use]
pub fn gviz_body(rows: &[Value]) -> String {
    let table = json!({
        "version": "0.6",
        "status": "ok",
        "table": { "cols": [], "rows": rows }
    });
    format!("/*O_o*/\ngoogle.visualization.Query.setResponse({table});")
}

/// A product sheet with a header row followed by `rows`.
#[must_use]
pub fn product_sheet(rows: &[Value]) -> String {
    let mut all = vec![product_header()];
    all.extend_from_slice(rows);
    gviz_body(&all)
}

fn product_header() -> Value {
    json!({"c": [
        {"v": "ID"}, {"v": "Name"}, {"v": "Price"},
        {"v": "Image 1"}, {"v": "Image 2"}, {"v": "Image 3"},
        {"v": "Description"}, {"v": "Details"}, {"v": "Size"},
        {"v": "Stock"}, {"v": "Status"}
    ]})
}

/// One product row with two images and an explicit status.
#[must_use]
pub fn product_row(id: &str, name: &str, price: f64, status: &str) -> Value {
    json!({"c": [
        {"v": id}, {"v": name}, {"v": price, "f": price.to_string()},
        {"v": format!("https://imgur.com/{id}a")}, {"v": format!("https://i.imgur.com/{id}b.png")}, null,
        {"v": format!("{name} description")}, null, null,
        {"v": 5.0}, {"v": status}
    ]})
}

/// Configuration for tests: both sheets set, no notification settings.
///
/// # Errors
///
/// Returns an error if `policy` is not a valid delivery fee policy.
pub fn test_config(policy: &str) -> Result<StorefrontConfig, ConfigError> {
    StorefrontConfig::from_lookup(|key| {
        let value = match key {
            "PRODUCTS_SHEET_ID" => PRODUCTS_SHEET,
            "ADDRESS_SHEET_ID" => ADDRESS_SHEET,
            "SHEETS_BASE_URL" => "https://sheets.invalid/spreadsheets/d",
            "DELIVERY_FEE_POLICY" => policy,
            _ => return None,
        };
        Some(value.to_string())
    })
}

/// A storefront over an in-memory store.
pub type TestStorefront = Storefront<MemoryStore, ScriptedSheet, RecordingNotifier>;

/// Build a storefront over `store` with the given delivery fee policy.
///
/// # Errors
///
/// Returns an error if `policy` is not a valid delivery fee policy.
pub fn storefront(
    store: Arc<MemoryStore>,
    sheet: ScriptedSheet,
    policy: &str,
    notifier: Option<RecordingNotifier>,
) -> Result<TestStorefront, ConfigError> {
    Ok(Storefront::new(&test_config(policy)?, store, sheet, notifier))
}
