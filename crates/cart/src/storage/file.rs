//! File-backed cart storage.

use std::{
    fmt::Write as _,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

use tokio::sync::broadcast;
use tracing::debug;

use crate::{
    partition::PartitionKey,
    storage::{CHANGE_CHANNEL_CAPACITY, CartStorage, StorageError},
};

const RECORD_EXTENSION: &str = "json";

/// Cart storage keeping one JSON file per partition in a directory.
///
/// Clones share the change channel; separate instances pointed at the same directory share the
/// records but not the signals.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
    changes: Arc<broadcast::Sender<PartitionKey>>,
}

impl FileStorage {
    /// Open (creating if needed) a storage directory.
    ///
    /// # Errors
    ///
    /// Returns an error when the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();

        fs::create_dir_all(&dir)?;

        let (changes, _receiver) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);

        Ok(Self {
            dir,
            changes: Arc::new(changes),
        })
    }

    /// Directory holding the records.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, key: &PartitionKey) -> PathBuf {
        self.dir
            .join(format!("{}.{RECORD_EXTENSION}", file_stem(&key.storage_key())))
    }

    fn notify(&self, key: &PartitionKey) {
        let _receivers = self.changes.send(key.clone());
    }
}

impl CartStorage for FileStorage {
    fn read(&self, key: &PartitionKey) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.record_path(key)) {
            Ok(record) => Ok(Some(record)),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    fn write(&self, key: &PartitionKey, value: &str) -> Result<(), StorageError> {
        let path = self.record_path(key);
        let staging = path.with_extension("tmp");

        fs::write(&staging, value)?;
        fs::rename(&staging, &path)?;

        debug!(partition = %key, path = %path.display(), "persisted cart record");

        self.notify(key);

        Ok(())
    }

    fn remove(&self, key: &PartitionKey) -> Result<(), StorageError> {
        match fs::remove_file(self.record_path(key)) {
            Ok(()) => {
                self.notify(key);

                Ok(())
            }
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error.into()),
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<PartitionKey> {
        self.changes.subscribe()
    }
}

/// Encode a storage key into a portable file stem. Alphanumerics, `-`, `.` and `@` are kept;
/// every other byte becomes `_xx` (lowercase hex), so distinct keys never collide.
fn file_stem(key: &str) -> String {
    let mut stem = String::with_capacity(key.len());

    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'@') {
            stem.push(char::from(byte));
        } else {
            let _infallible = write!(stem, "_{byte:02x}");
        }
    }

    stem
}
