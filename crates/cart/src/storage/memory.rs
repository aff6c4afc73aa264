//! In-memory cart storage.

use std::{collections::HashMap, sync::Arc};

use parking_lot::Mutex;
use tokio::sync::broadcast;

use crate::{
    partition::PartitionKey,
    storage::{CHANGE_CHANNEL_CAPACITY, CartStorage, StorageError},
};

#[derive(Debug)]
struct Inner {
    records: Mutex<HashMap<String, String>>,
    quota_bytes: Option<usize>,
    changes: broadcast::Sender<PartitionKey>,
}

/// Cart storage held in process memory.
///
/// Clones share the same records and change channel, so several cart managers built from
/// clones of one storage behave like several tabs of one browser profile.
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    inner: Arc<Inner>,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStorage {
    /// Create an empty, unbounded storage.
    #[must_use]
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Create an empty storage that rejects writes once the stored bytes would exceed `bytes`.
    #[must_use]
    pub fn with_quota(bytes: usize) -> Self {
        Self::build(Some(bytes))
    }

    fn build(quota_bytes: Option<usize>) -> Self {
        let (changes, _receiver) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);

        Self {
            inner: Arc::new(Inner {
                records: Mutex::new(HashMap::new()),
                quota_bytes,
                changes,
            }),
        }
    }

    /// Storage keys currently holding a record.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.inner.records.lock().keys().cloned().collect();

        keys.sort();

        keys
    }

    fn notify(&self, key: &PartitionKey) {
        // No receivers is fine: nobody else is looking at this store.
        let _receivers = self.inner.changes.send(key.clone());
    }
}

impl CartStorage for MemoryStorage {
    fn read(&self, key: &PartitionKey) -> Result<Option<String>, StorageError> {
        Ok(self.inner.records.lock().get(&key.storage_key()).cloned())
    }

    fn write(&self, key: &PartitionKey, value: &str) -> Result<(), StorageError> {
        let storage_key = key.storage_key();

        {
            let mut records = self.inner.records.lock();

            if let Some(quota) = self.inner.quota_bytes {
                let used: usize = records
                    .iter()
                    .filter(|(existing, _)| **existing != storage_key)
                    .map(|(existing, record)| existing.len() + record.len())
                    .sum();

                let needed = storage_key.len() + value.len();
                let available = quota.saturating_sub(used);

                if needed > available {
                    return Err(StorageError::QuotaExceeded { needed, available });
                }
            }

            records.insert(storage_key, value.to_string());
        }

        self.notify(key);

        Ok(())
    }

    fn remove(&self, key: &PartitionKey) -> Result<(), StorageError> {
        let removed = self
            .inner
            .records
            .lock()
            .remove(&key.storage_key())
            .is_some();

        if removed {
            self.notify(key);
        }

        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<PartitionKey> {
        self.inner.changes.subscribe()
    }
}
