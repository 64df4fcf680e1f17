//! Persisted key-value storage.
//!
//! Every component reads and writes through a [`KeyValueStore`]: a
//! string-keyed blob store holding JSON-serialized values. Nothing is kept
//! in memory between page loads; each load re-parses the persisted form.
//!
//! # Implementations
//!
//! - [`MemoryStore`] - process-local map, used by tests and short-lived contexts
//! - [`FileStore`] - one file per key under a data directory

mod cache;
mod file;
mod memory;

pub use cache::TimestampedEntry;
pub use file::FileStore;
pub use memory::MemoryStore;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Persisted key names.
pub mod keys {
    /// The cart, an array of cart lines.
    pub const CART: &str = "cart";

    /// Two-decimal total handed from the cart page to checkout.
    pub const CHECKOUT_TOTAL: &str = "checkoutTotal";

    /// Cached catalog: `{ products, displayProducts }`.
    pub const PRODUCTS_DATA: &str = "productsData";

    /// Unix-millis timestamp of the cached catalog.
    pub const PRODUCTS_DATA_TIME: &str = "productsDataTime";

    /// Cached address-autocomplete list.
    pub const ADDRESS_DATA: &str = "smartLockerAddresses";

    /// Unix-millis timestamp of the cached address list.
    pub const ADDRESS_DATA_TIME: &str = "smartLockerAddressesTime";

    /// Append-only order history.
    pub const ORDERS: &str = "orders";

    /// Theme preference.
    pub const THEME: &str = "theme";

    /// Display language preference.
    pub const LANGUAGE: &str = "language";
}

/// Errors raised by storage backends.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Backend I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A lock guarding the store was poisoned by a panicking writer.
    #[error("storage lock poisoned")]
    Poisoned,

    /// The key cannot be mapped onto the backend.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),

    /// A value could not be serialized for writing.
    #[error("failed to serialize {key}: {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// A persisted value is not valid JSON for the expected shape.
    #[error("corrupt value under {key}: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A string-keyed blob store.
///
/// Writes are synchronous: a value is durable (for the backend's notion of
/// durable) when `set` returns. There is no cross-context locking, so two
/// contexts sharing one backend are last-writer-wins.
pub trait KeyValueStore: Send + Sync {
    /// Read the raw value under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// Read and deserialize the JSON value under `key`.
///
/// # Errors
///
/// Returns [`StorageError::Corrupt`] if the stored text does not parse as `T`.
pub fn read_json<T: DeserializeOwned>(
    store: &(impl KeyValueStore + ?Sized),
    key: &str,
) -> Result<Option<T>, StorageError> {
    store
        .get(key)?
        .map(|raw| {
            serde_json::from_str(&raw).map_err(|source| StorageError::Corrupt {
                key: key.to_string(),
                source,
            })
        })
        .transpose()
}

/// Serialize `value` as JSON and store it under `key`.
///
/// # Errors
///
/// Returns an error if serialization or the backend write fails.
pub fn write_json<T: Serialize + ?Sized>(
    store: &(impl KeyValueStore + ?Sized),
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value).map_err(|source| StorageError::Serialize {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &raw)
}

/// Read a Unix-millis timestamp stored as a decimal string.
///
/// Unparseable values read as absent.
///
/// # Errors
///
/// Returns an error only if the backend cannot be read.
pub fn read_timestamp(
    store: &(impl KeyValueStore + ?Sized),
    key: &str,
) -> Result<Option<DateTime<Utc>>, StorageError> {
    Ok(store
        .get(key)?
        .and_then(|raw| raw.trim().parse::<i64>().ok())
        .and_then(DateTime::from_timestamp_millis))
}

/// Store a timestamp as a Unix-millis decimal string.
///
/// # Errors
///
/// Returns an error if the backend cannot be written.
pub fn write_timestamp(
    store: &(impl KeyValueStore + ?Sized),
    key: &str,
    at: DateTime<Utc>,
) -> Result<(), StorageError> {
    store.set(key, &at.timestamp_millis().to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_json_helpers() {
        let store = MemoryStore::new();
        write_json(&store, "list", &vec![1, 2, 3]).unwrap();
        assert_eq!(store.get("list").unwrap().as_deref(), Some("[1,2,3]"));

        let list: Option<Vec<u32>> = read_json(&store, "list").unwrap();
        assert_eq!(list, Some(vec![1, 2, 3]));

        let missing: Option<Vec<u32>> = read_json(&store, "missing").unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn test_read_json_reports_corruption() {
        let store = MemoryStore::new();
        store.set("list", "{not json").unwrap();
        let result: Result<Option<Vec<u32>>, _> = read_json(&store, "list");
        assert!(matches!(result, Err(StorageError::Corrupt { .. })));
    }

    #[test]
    fn test_timestamp_round_trip_as_millis() {
        let store = MemoryStore::new();
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        write_timestamp(&store, keys::PRODUCTS_DATA_TIME, at).unwrap();
        assert_eq!(
            store.get(keys::PRODUCTS_DATA_TIME).unwrap().as_deref(),
            Some("1714564800000")
        );
        assert_eq!(
            read_timestamp(&store, keys::PRODUCTS_DATA_TIME).unwrap(),
            Some(at)
        );

        store.set(keys::PRODUCTS_DATA_TIME, "yesterday").unwrap();
        assert_eq!(read_timestamp(&store, keys::PRODUCTS_DATA_TIME).unwrap(), None);
    }
}
