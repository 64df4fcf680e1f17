//! Timestamped cache entries.

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use serde_json::Value;

use super::{KeyValueStore, StorageError, read_json, read_timestamp, write_json, write_timestamp};

/// A cached JSON value stored under `data_key`, with its write time under
/// `time_key`.
#[derive(Debug, Clone, Copy)]
pub struct TimestampedEntry {
    pub data_key: &'static str,
    pub time_key: &'static str,
    /// Entries younger than this are served without refetching.
    pub ttl: TimeDelta,
}

impl TimestampedEntry {
    #[must_use]
    pub const fn new(data_key: &'static str, time_key: &'static str, ttl: TimeDelta) -> Self {
        Self {
            data_key,
            time_key,
            ttl,
        }
    }

    /// The cached value if both it and its timestamp exist and the entry is
    /// younger than the freshness window at `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails or the value is not JSON.
    pub fn fresh(
        &self,
        store: &(impl KeyValueStore + ?Sized),
        now: DateTime<Utc>,
    ) -> Result<Option<Value>, StorageError> {
        let Some(written) = read_timestamp(store, self.time_key)? else {
            return Ok(None);
        };
        if now - written >= self.ttl {
            return Ok(None);
        }
        read_json(store, self.data_key)
    }

    /// The cached value regardless of age.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails or the value is not JSON.
    pub fn any_age(&self, store: &(impl KeyValueStore + ?Sized)) -> Result<Option<Value>, StorageError> {
        read_json(store, self.data_key)
    }

    /// Overwrite the entry and stamp it with `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the backend write fails.
    pub fn write<T: Serialize + ?Sized>(
        &self,
        store: &(impl KeyValueStore + ?Sized),
        value: &T,
        now: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        write_json(store, self.data_key, value)?;
        write_timestamp(store, self.time_key, now)
    }
}
