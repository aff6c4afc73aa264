//! Local cart storage.
//!
//! A cart storage holds one string record per partition key, the way a browser profile's
//! local storage does. Every instance sharing the same backing store sees every other
//! instance's writes and receives a change signal for them.

use std::io;

use mockall::automock;
use thiserror::Error;
use tokio::sync::broadcast;

use crate::partition::PartitionKey;

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

/// Capacity of the change signal channel. Lagging receivers only lose signals, which is
/// harmless because every signal triggers a full re-read.
pub(crate) const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// Errors raised by cart storage backends.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backing store could not be read or written.
    #[error("storage io error")]
    Io(#[from] io::Error),

    /// The write would exceed the store's capacity.
    #[error("storage quota exceeded ({needed} bytes needed, {available} available)")]
    QuotaExceeded { needed: usize, available: usize },
}

/// Key-value store for persisted cart records.
#[automock]
pub trait CartStorage: Send + Sync {
    /// Read the raw record for a partition, `None` when nothing was stored.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing store cannot be read.
    fn read(&self, key: &PartitionKey) -> Result<Option<String>, StorageError>;

    /// Replace the record for a partition.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing store cannot be written.
    fn write(&self, key: &PartitionKey, value: &str) -> Result<(), StorageError>;

    /// Remove the record for a partition. Removing a missing record is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing store cannot be written.
    fn remove(&self, key: &PartitionKey) -> Result<(), StorageError>;

    /// Subscribe to "partition changed" signals emitted after writes and removals.
    fn subscribe(&self) -> broadcast::Receiver<PartitionKey>;
}
