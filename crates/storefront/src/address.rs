//! Pickup-locker address autocomplete for the shipping form.
//!
//! Addresses come from a second spreadsheet, loaded the first time the
//! shopper picks shipping, and are cached for a day with the same fallback
//! rules as the catalog.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use serde_json::Value;
use tracing::instrument;

use crate::sheets::{self, GvizRow, GvizTable, SheetSource, SheetsError};
use crate::storage::{KeyValueStore, TimestampedEntry, keys};

/// Maximum number of suggestions shown at once.
pub const MAX_RESULTS: usize = 10;

/// Join the trimmed, non-empty cells of a row with single spaces.
#[must_use]
pub fn address_from_row(row: &GvizRow) -> Option<String> {
    let parts: Vec<String> = (0..row.len())
        .filter_map(|idx| row.text(idx))
        .filter(|part| !part.is_empty())
        .collect();
    let address = parts.join(" ");
    (!address.is_empty()).then_some(address)
}

/// Every address in a sheet. Row 0 is the header.
#[must_use]
pub fn addresses_from_table(table: &GvizTable) -> Vec<String> {
    table.rows.iter().skip(1).filter_map(address_from_row).collect()
}

/// Loads the address list through a storage cache.
pub struct AddressBook<S, Src> {
    store: Arc<S>,
    source: Src,
    sheet_id: String,
    cache: TimestampedEntry,
}

impl<S: KeyValueStore, Src: SheetSource> AddressBook<S, Src> {
    #[must_use]
    pub fn new(store: Arc<S>, source: Src, sheet_id: impl Into<String>, ttl: TimeDelta) -> Self {
        Self {
            store,
            source,
            sheet_id: sheet_id.into(),
            cache: TimestampedEntry::new(keys::ADDRESS_DATA, keys::ADDRESS_DATA_TIME, ttl),
        }
    }

    /// Load the addresses. Never fails: errors fall back to the cache of
    /// any age, then to an empty list.
    pub async fn load(&self) -> Vec<String> {
        self.load_at(Utc::now()).await
    }

    /// [`load`](Self::load) with an explicit clock.
    #[instrument(skip(self), fields(sheet_id = %self.sheet_id))]
    pub async fn load_at(&self, now: DateTime<Utc>) -> Vec<String> {
        match self.cache.fresh(&*self.store, now) {
            Ok(Some(value)) => {
                tracing::debug!("Serving cached addresses");
                return addresses_from_cache(&value);
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "Ignoring unreadable address cache"),
        }

        match self.fetch().await {
            Ok(addresses) => {
                if let Err(e) = self.cache.write(&*self.store, &addresses, now) {
                    tracing::error!(error = %e, "Failed to cache addresses");
                }
                tracing::info!(count = addresses.len(), "Loaded addresses from sheet");
                addresses
            }
            Err(e) => {
                if e.is_forbidden() {
                    tracing::warn!(
                        sheet_id = %self.sheet_id,
                        "Sheet is not public, share it as \"Anyone with the link can view\""
                    );
                }
                tracing::warn!(error = %e, "Address fetch failed, falling back to cache");
                match self.cache.any_age(&*self.store) {
                    Ok(Some(value)) => addresses_from_cache(&value),
                    Ok(None) => Vec::new(),
                    Err(e) => {
                        tracing::warn!(error = %e, "Address cache is unreadable");
                        Vec::new()
                    }
                }
            }
        }
    }

    async fn fetch(&self) -> Result<Vec<String>, SheetsError> {
        let table = sheets::fetch_table(&self.source, &self.sheet_id).await?;
        Ok(addresses_from_table(&table))
    }
}

fn addresses_from_cache(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|address| !address.is_empty())
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

/// A keyboard the suggestion list responds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    Down,
    Up,
    Enter,
    Escape,
}

/// Suggestion state for the address input.
#[derive(Debug, Clone, Default)]
pub struct AddressAutocomplete {
    addresses: Vec<String>,
    results: Vec<String>,
    selected: Option<usize>,
    visible: bool,
}

impl AddressAutocomplete {
    #[must_use]
    pub fn new(addresses: Vec<String>) -> Self {
        Self {
            addresses,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn has_addresses(&self) -> bool {
        !self.addresses.is_empty()
    }

    /// Replace the address list, e.g. after a lazy load.
    pub fn set_addresses(&mut self, addresses: Vec<String>) {
        self.addresses = addresses;
        self.hide();
    }

    /// Filter by a case-insensitive substring. An empty query, or one with
    /// no matches, hides the list.
    pub fn search(&mut self, query: &str) -> &[String] {
        let needle = query.trim().to_lowercase();
        self.selected = None;
        if needle.is_empty() {
            self.hide();
            return &self.results;
        }

        self.results = self
            .addresses
            .iter()
            .filter(|address| address.to_lowercase().contains(&needle))
            .take(MAX_RESULTS)
            .cloned()
            .collect();
        self.visible = !self.results.is_empty();
        &self.results
    }

    /// Apply a key press. Returns the address picked by Enter, if any.
    /// Keys do nothing while the list is hidden.
    pub fn key(&mut self, key: NavKey) -> Option<String> {
        if !self.visible {
            return None;
        }
        match key {
            NavKey::Down => {
                let last = self.results.len().saturating_sub(1);
                self.selected = Some(self.selected.map_or(0, |idx| (idx + 1).min(last)));
                None
            }
            NavKey::Up => {
                self.selected = self.selected.and_then(|idx| idx.checked_sub(1));
                None
            }
            NavKey::Enter => {
                let picked = self.selected.and_then(|idx| self.results.get(idx).cloned());
                if picked.is_some() {
                    self.hide();
                }
                picked
            }
            NavKey::Escape => {
                self.hide();
                None
            }
        }
    }

    /// Pick a suggestion directly (pointer click).
    pub fn pick(&mut self, index: usize) -> Option<String> {
        let picked = self.results.get(index).cloned();
        self.hide();
        picked
    }

    pub fn hide(&mut self) {
        self.visible = false;
        self.selected = None;
    }

    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    #[must_use]
    pub const fn selected(&self) -> Option<usize> {
        self.selected
    }

    #[must_use]
    pub fn results(&self) -> &[String] {
        if self.visible { &self.results } else { &[] }
    }
}
