//! Key/value backends and the typed record store on top of them

use std::collections::HashMap;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::consts::{DRAFT_KEY, SETTINGS_KEY, STORAGE_KEY};
use crate::error::StorageError;
use crate::flow::{Draft, UserRecord};
use crate::settings::Settings;

/// Minimal string key/value storage (the shape of `window.localStorage`)
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&mut self, key: &str) -> Result<(), StorageError>;
}

/// In-memory backend used natively and in tests
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    items: HashMap<String, String>,
    /// Total bytes allowed across keys and values (`None` = unlimited)
    quota: Option<usize>,
    /// Simulate a disabled storage area
    unavailable: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota: usize) -> Self {
        Self {
            quota: Some(quota),
            ..Self::default()
        }
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.items.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn used_without(&self, key: &str) -> usize {
        self.items
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }

    fn check_available(&self) -> Result<(), StorageError> {
        if self.unavailable {
            return Err(StorageError::Unavailable("memory store disabled".into()));
        }
        Ok(())
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check_available()?;
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check_available()?;
        if let Some(quota) = self.quota {
            if self.used_without(key) + key.len() + value.len() > quota {
                return Err(StorageError::QuotaExceeded);
            }
        }
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        self.check_available()?;
        self.items.remove(key);
        Ok(())
    }
}

/// `window.localStorage` backend
#[cfg(target_arch = "wasm32")]
pub struct LocalStore {
    storage: web_sys::Storage,
}

#[cfg(target_arch = "wasm32")]
impl LocalStore {
    /// Open LocalStorage (fails in private modes that disable it)
    pub fn open() -> Result<Self, StorageError> {
        let window = web_sys::window()
            .ok_or_else(|| StorageError::Unavailable("no window".into()))?;
        let storage = window
            .local_storage()
            .map_err(|e| StorageError::Unavailable(format!("{:?}", e)))?
            .ok_or_else(|| StorageError::Unavailable("localStorage disabled".into()))?;
        Ok(Self { storage })
    }
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for LocalStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage
            .get_item(key)
            .map_err(|e| StorageError::Unavailable(format!("{:?}", e)))
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        // Browsers only fail writes on quota
        self.storage
            .set_item(key, value)
            .map_err(|_| StorageError::QuotaExceeded)
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        self.storage
            .remove_item(key)
            .map_err(|e| StorageError::Unavailable(format!("{:?}", e)))
    }
}

/// Typed access to the record and draft entries
#[derive(Debug, Clone, Default)]
pub struct RecordStore<S> {
    backend: S,
}

impl<S: KeyValueStore> RecordStore<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn save(&mut self, record: &UserRecord) -> Result<(), StorageError> {
        self.put(STORAGE_KEY, record)?;
        log::debug!("User record saved");
        Ok(())
    }

    pub fn load(&self) -> Result<Option<UserRecord>, StorageError> {
        self.get(STORAGE_KEY)
    }

    /// Remove the record and the draft
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.backend.remove_item(STORAGE_KEY)?;
        self.backend.remove_item(DRAFT_KEY)?;
        log::info!("Stored user data cleared");
        Ok(())
    }

    /// Save the entry form draft (an empty draft removes the entry)
    pub fn save_draft(&mut self, draft: &Draft) -> Result<(), StorageError> {
        if draft.is_empty() {
            return self.backend.remove_item(DRAFT_KEY);
        }
        self.put(DRAFT_KEY, draft)
    }

    pub fn load_draft(&self) -> Result<Option<Draft>, StorageError> {
        self.get(DRAFT_KEY)
    }

    /// Preferences survive `clear`
    pub fn save_settings(&mut self, settings: &Settings) -> Result<(), StorageError> {
        self.put(SETTINGS_KEY, settings)?;
        log::info!("Settings saved");
        Ok(())
    }

    pub fn load_settings(&self) -> Result<Option<Settings>, StorageError> {
        self.get(SETTINGS_KEY)
    }

    fn put<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), StorageError> {
        let json = serde_json::to_string(value).map_err(StorageError::Serialize)?;
        self.backend.set_item(key, &json)
    }

    fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        match self.backend.get_item(key)? {
            Some(json) => serde_json::from_str(&json)
                .map(Some)
                .map_err(StorageError::Corrupt),
            None => Ok(None),
        }
    }
}
