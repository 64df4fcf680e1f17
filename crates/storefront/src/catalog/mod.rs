//! Product catalog loading.
//!
//! The catalog is read from the product spreadsheet and cached in storage
//! with a timestamp. Loading never fails: on any network or parse error the
//! most recent cache is served regardless of age, and with no cache the
//! catalog is simply empty.
//!
//! ```text
//! fresh cache? ──yes──> cached catalog
//!      │ no (or forced)
//!      v
//! fetch sheet ──ok──> parse rows -> filter -> sort -> cache -> catalog
//!      │ error
//!      v
//! stale cache, else empty
//! ```

mod row;

pub use row::{RowError, parse_row};

use std::cmp::Ordering;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use neon_core::{Product, ProductId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;
use url::Url;

use crate::sheets::{self, GvizTable, SheetSource, SheetsError};
use crate::storage::{KeyValueStore, TimestampedEntry, keys};
use crate::validate::validate_product;

/// Number of products in the landing-page subset.
pub const DISPLAY_LIMIT: usize = 12;

/// Size of each landing-page section.
pub const SECTION_SIZE: usize = 4;

/// The loaded catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    /// Every listable product, sorted by id.
    pub products: Vec<Product>,
    /// The first [`DISPLAY_LIMIT`] products.
    pub display_products: Vec<Product>,
}

impl Catalog {
    /// Build a catalog from listable products: sort, then take the display subset.
    #[must_use]
    pub fn from_products(mut products: Vec<Product>) -> Self {
        sort_catalog(&mut products);
        let display_products = products.iter().take(DISPLAY_LIMIT).cloned().collect();
        Self {
            products,
            display_products,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Look up a product by id.
    #[must_use]
    pub fn find(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| &p.id == id)
    }

    /// Split the display subset into the three landing-page sections.
    #[must_use]
    pub fn landing_sections(&self) -> LandingSections<'_> {
        let section = |n: usize| {
            let start = (n * SECTION_SIZE).min(self.display_products.len());
            let end = (start + SECTION_SIZE).min(self.display_products.len());
            self.display_products.get(start..end).unwrap_or_default()
        };
        LandingSections {
            on_sale: section(0),
            new_arrivals: section(1),
            top_selling: section(2),
        }
    }
}

/// Landing-page sections, each up to [`SECTION_SIZE`] products.
#[derive(Debug, Clone, Copy)]
pub struct LandingSections<'a> {
    pub on_sale: &'a [Product],
    pub new_arrivals: &'a [Product],
    pub top_selling: &'a [Product],
}

/// Compare ids by their digits read as a number, then as plain strings.
///
/// `"LS00002"` reads as 2 and `"3"` as 3; ids without digits read as 0.
#[must_use]
pub fn compare_ids(a: &ProductId, b: &ProductId) -> Ordering {
    a.numeric_key()
        .cmp(&b.numeric_key())
        .then_with(|| a.as_str().cmp(b.as_str()))
}

/// Stable sort by [`compare_ids`].
pub fn sort_catalog(products: &mut [Product]) {
    products.sort_by(|a, b| compare_ids(&a.id, &b.id));
}

/// Turn a product sheet into listable products. Row 0 is the header.
#[must_use]
pub fn products_from_table(table: &GvizTable) -> Vec<Product> {
    table
        .rows
        .iter()
        .skip(1)
        .filter_map(|row| match parse_row(row) {
            Ok(product) => Some(product),
            Err(e) => {
                tracing::debug!(reason = %e, "Skipping product row");
                None
            }
        })
        .collect()
}

/// Whether the page address asks for a forced refresh (`?refresh=true`).
#[must_use]
pub fn refresh_requested(page: &Url) -> bool {
    page.query_pairs()
        .any(|(key, value)| key == "refresh" && value == "true")
}

/// Loads the catalog from the product sheet through a storage cache.
pub struct CatalogLoader<S, Src> {
    store: Arc<S>,
    source: Src,
    sheet_id: String,
    cache: TimestampedEntry,
}

impl<S: KeyValueStore, Src: SheetSource> CatalogLoader<S, Src> {
    /// Create a loader for `sheet_id`, serving cached data younger than `ttl`.
    #[must_use]
    pub fn new(store: Arc<S>, source: Src, sheet_id: impl Into<String>, ttl: TimeDelta) -> Self {
        Self {
            store,
            source,
            sheet_id: sheet_id.into(),
            cache: TimestampedEntry::new(keys::PRODUCTS_DATA, keys::PRODUCTS_DATA_TIME, ttl),
        }
    }

    /// Load the catalog, bypassing a fresh cache when `force_refresh` is set.
    pub async fn load(&self, force_refresh: bool) -> Catalog {
        self.load_at(force_refresh, Utc::now()).await
    }

    /// [`load`](Self::load) with an explicit clock.
    #[instrument(skip(self), fields(sheet_id = %self.sheet_id))]
    pub async fn load_at(&self, force_refresh: bool, now: DateTime<Utc>) -> Catalog {
        if !force_refresh {
            match self.cache.fresh(&*self.store, now) {
                Ok(Some(value)) => {
                    let catalog = catalog_from_cache(&value);
                    tracing::debug!(products = catalog.products.len(), "Serving cached catalog");
                    return catalog;
                }
                Ok(None) => {}
                Err(e) => tracing::warn!(error = %e, "Ignoring unreadable catalog cache"),
            }
        }

        match self.fetch().await {
            Ok(catalog) => {
                if let Err(e) = self.cache.write(&*self.store, &catalog, now) {
                    tracing::error!(error = %e, "Failed to cache catalog");
                }
                tracing::info!(
                    products = catalog.products.len(),
                    displayed = catalog.display_products.len(),
                    "Loaded catalog from sheet"
                );
                catalog
            }
            Err(e) => {
                if e.is_forbidden() {
                    tracing::warn!(
                        sheet_id = %self.sheet_id,
                        "Sheet is not public, share it as \"Anyone with the link can view\""
                    );
                }
                tracing::warn!(error = %e, "Catalog fetch failed, falling back to cache");
                self.cached().unwrap_or_default()
            }
        }
    }

    /// The cached catalog regardless of age, if readable.
    #[must_use]
    pub fn cached(&self) -> Option<Catalog> {
        match self.cache.any_age(&*self.store) {
            Ok(value) => value.as_ref().map(catalog_from_cache),
            Err(e) => {
                tracing::warn!(error = %e, "Catalog cache is unreadable, treating it as absent");
                None
            }
        }
    }

    async fn fetch(&self) -> Result<Catalog, SheetsError> {
        let table = sheets::fetch_table(&self.source, &self.sheet_id).await?;
        Ok(Catalog::from_products(products_from_table(&table)))
    }
}

/// Re-validate a cached `{ products, displayProducts }` object.
///
/// Only listable records survive, and the display subset is derived again
/// from them rather than trusted from the cache.
fn catalog_from_cache(value: &Value) -> Catalog {
    let products = value
        .get("products")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(validate_product)
                .filter(Product::is_listable)
                .collect()
        })
        .unwrap_or_default();
    Catalog::from_products(products)
}
