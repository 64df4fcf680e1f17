//! Theme and language preferences.

use std::sync::Arc;

use neon_core::{Language, Theme};

use crate::storage::{KeyValueStore, StorageError, keys};

/// Persisted display preferences. Values are stored as bare strings
/// (`dark-mode`, `zh`); anything unrecognised reads as the default.
pub struct Preferences<S> {
    store: Arc<S>,
}

impl<S> Clone for Preferences<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: KeyValueStore> Preferences<S> {
    #[must_use]
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// # Errors
    ///
    /// Returns an error if the storage backend fails.
    pub fn theme(&self) -> Result<Theme, StorageError> {
        self.read(keys::THEME)
    }

    /// # Errors
    ///
    /// Returns an error if the storage backend fails.
    pub fn set_theme(&self, theme: Theme) -> Result<(), StorageError> {
        self.store.set(keys::THEME, theme.as_str())
    }

    /// Switch between dark and light, returning the new theme.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails.
    pub fn toggle_theme(&self) -> Result<Theme, StorageError> {
        let theme = self.theme()?.toggled();
        self.set_theme(theme)?;
        Ok(theme)
    }

    /// # Errors
    ///
    /// Returns an error if the storage backend fails.
    pub fn language(&self) -> Result<Language, StorageError> {
        self.read(keys::LANGUAGE)
    }

    /// # Errors
    ///
    /// Returns an error if the storage backend fails.
    pub fn set_language(&self, language: Language) -> Result<(), StorageError> {
        self.store.set(keys::LANGUAGE, language.code())
    }

    fn read<T: std::str::FromStr + Default>(&self, key: &str) -> Result<T, StorageError> {
        Ok(self
            .store
            .get(key)?
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or_default())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_defaults() {
        let prefs = Preferences::new(Arc::new(MemoryStore::new()));
        assert_eq!(prefs.theme().unwrap(), Theme::DarkMode);
        assert_eq!(prefs.language().unwrap(), Language::Zh);
    }

    #[test]
    fn test_persists_bare_strings() {
        let store = Arc::new(MemoryStore::new());
        let prefs = Preferences::new(store.clone());
        prefs.set_language(Language::En).unwrap();
        assert_eq!(prefs.toggle_theme().unwrap(), Theme::LightMode);

        assert_eq!(store.get(keys::LANGUAGE).unwrap().as_deref(), Some("en"));
        assert_eq!(store.get(keys::THEME).unwrap().as_deref(), Some("light-mode"));
        assert_eq!(prefs.toggle_theme().unwrap(), Theme::DarkMode);
    }

    #[test]
    fn test_unknown_values_fall_back() {
        let store = Arc::new(MemoryStore::new());
        store.set(keys::THEME, "\"sepia\"").unwrap();
        store.set(keys::LANGUAGE, "fr").unwrap();
        let prefs = Preferences::new(store);
        assert_eq!(prefs.theme().unwrap(), Theme::DarkMode);
        assert_eq!(prefs.language().unwrap(), Language::Zh);
    }
}
