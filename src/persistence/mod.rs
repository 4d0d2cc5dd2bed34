//! Save/load of the user record
//!
//! Features:
//! - JSON values under fixed namespaced keys
//! - Pluggable key/value backend (LocalStorage on web, memory elsewhere)
//! - Corrupt entries reported as `StorageError::Corrupt`

pub mod store;

pub use store::{KeyValueStore, MemoryStore, RecordStore};

#[cfg(target_arch = "wasm32")]
pub use store::LocalStore;
