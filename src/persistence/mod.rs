//! Key-value persistence
//!
//! Features:
//! - Synchronous string store abstraction (LocalStorage on web)
//! - JSON helpers with typed parse errors
//! - In-memory store for native builds and tests

#[cfg(target_arch = "wasm32")]
pub mod local;

use std::collections::HashMap;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::StorageError;

#[cfg(target_arch = "wasm32")]
pub use local::LocalStore;

/// Persisted key names
pub mod keys {
    pub const LAST_CHALLENGE_GENERATION: &str = "flappy_last_challenge_generation";
    pub const DAILY_CHALLENGES: &str = "flappy_daily_challenges";
    pub const DIFFICULTY_PRESET: &str = "flappy_difficulty";
    pub const ADAPTIVE_ENABLED: &str = "flappy_adaptive_enabled";
    pub const UNLOCKED_SKINS: &str = "flappy_unlocked_skins";
    pub const PROFILE: &str = "flappy_profile";
}

/// Synchronous string key-value store. No transactions.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;

    /// # Errors
    ///
    /// Returns an error if the backing storage rejects the write.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Read and parse a JSON value. `Ok(None)` when the key is absent.
///
/// # Errors
///
/// Returns [`StorageError::Parse`] if the stored value is malformed.
pub fn load_json<T, S>(store: &S, key: &str) -> Result<Option<T>, StorageError>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    match store.get(key) {
        Some(json) => serde_json::from_str(&json)
            .map(Some)
            .map_err(|source| StorageError::Parse {
                key: key.to_string(),
                source,
            }),
        None => Ok(None),
    }
}

/// Serialize and write a JSON value.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn save_json<T, S>(store: &mut S, key: &str, value: &T) -> Result<(), StorageError>
where
    T: Serialize,
    S: KeyValueStore + ?Sized,
{
    let json = serde_json::to_string(value)?;
    store.set(key, &json)
}

/// In-memory store (native builds, tests)
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
