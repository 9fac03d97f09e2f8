//! Persistent key-value store
//!
//! JSON (de)serialization over a `StorageBackend` with a fail-silent
//! policy: `save` never reports failure and `load` answers with the
//! caller's fallback whenever the stored value is absent, empty,
//! unreadable or the wrong shape. Failures are logged and otherwise lost.

use super::backend::StorageBackend;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

#[derive(Clone)]
pub struct KeyValueStore {
    backend: Arc<dyn StorageBackend>,
}

impl KeyValueStore {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// Serialize `value` and store it under `key`
    pub async fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let text = match serde_json::to_string(value) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Failed to serialize value for {}: {}", key, e);
                return;
            }
        };

        if let Err(e) = self.backend.set(key, text).await {
            tracing::warn!("Failed to save {}: {}", key, e);
        }
    }

    /// Deserialize the value stored under `key`, or return `fallback`
    pub async fn load<T: DeserializeOwned>(&self, key: &str, fallback: T) -> T {
        let raw = match self.backend.get(key).await {
            Ok(Some(raw)) if !raw.is_empty() => raw,
            Ok(_) => return fallback,
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", key, e);
                return fallback;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Stored value for {} is malformed, using fallback: {}", key, e);
                fallback
            }
        }
    }

    /// Load a stored JSON array record by record.
    ///
    /// Records that do not fit `T` are skipped and logged; the rest are
    /// kept. Anything that is not an array loads as empty.
    pub async fn load_list<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        let records: Vec<serde_json::Value> = self.load(key, Vec::new()).await;
        let total = records.len();

        let items: Vec<T> = records
            .into_iter()
            .enumerate()
            .filter_map(|(i, record)| match serde_json::from_value(record) {
                Ok(item) => Some(item),
                Err(e) => {
                    tracing::warn!("Skipping malformed record {} in {}: {}", i, key, e);
                    None
                }
            })
            .collect();

        if items.len() < total {
            tracing::warn!("Kept {} of {} records in {}", items.len(), total, key);
        }
        items
    }

    /// Remove whatever is stored under `key`
    pub async fn clear(&self, key: &str) {
        if let Err(e) = self.backend.remove(key).await {
            tracing::warn!("Failed to clear {}: {}", key, e);
        }
    }
}
