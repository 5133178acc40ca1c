//! Directory-backed slot store.
//!
//! Layout of a store directory:
//!
//! ```text
//! <dir>/
//! ├─ 0.json        # slot 0
//! ├─ 1.json        # slot 1
//! ├─ ...
//! ├─ 0.json.tmp    # transient, during atomic writes
//! └─ LOCK          # advisory lock, only when locking is requested
//! ```

use crate::error::{StorageError, StorageResult};
use crate::store::{SlotId, SlotStore};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::trace;

/// File extension used for slot files.
pub const SLOT_EXTENSION: &str = "json";

/// Name of the advisory lock file.
pub const LOCK_FILE: &str = "LOCK";

/// Suffix appended to a slot file name during atomic writes.
const TEMP_SUFFIX: &str = "tmp";

/// A slot store keeping one file per slot inside a directory.
///
/// Slot `n` lives at `<dir>/<n>.json`, whatever bytes it holds.
///
/// # Durability
///
/// - With `sync_writes` enabled (the default), every write is followed by
///   `File::sync_all()`
/// - `write_slot_atomic` writes a temporary file, syncs it, renames it over
///   the slot file and syncs the directory
///
/// # Example
///
/// ```no_run
/// use snapring_storage::{FileSlotStore, SlotStore};
/// use std::path::Path;
///
/// let mut store = FileSlotStore::open(Path::new("history"), true).unwrap();
/// store.write_slot(1, b"persistent data").unwrap();
/// ```
#[derive(Debug)]
pub struct FileSlotStore {
    /// Root directory path.
    dir: PathBuf,
    /// Whether to fsync after each write.
    sync_writes: bool,
    /// Lock file handle, held for exclusive access when locked.
    lock_file: Option<File>,
}

impl FileSlotStore {
    /// Opens a store rooted at `dir`.
    ///
    /// # Arguments
    ///
    /// * `dir` - Path to the store directory
    /// * `create_if_missing` - If true, creates the directory if it doesn't exist
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The directory doesn't exist and `create_if_missing` is false
    /// - The path exists but is not a directory
    /// - I/O errors occur
    pub fn open(dir: &Path, create_if_missing: bool) -> StorageResult<Self> {
        if !dir.exists() {
            if create_if_missing {
                fs::create_dir_all(dir)?;
            } else {
                return Err(StorageError::InvalidLocation {
                    path: dir.to_path_buf(),
                    message: "directory does not exist".into(),
                });
            }
        }

        if !dir.is_dir() {
            return Err(StorageError::InvalidLocation {
                path: dir.to_path_buf(),
                message: "path is not a directory".into(),
            });
        }

        Ok(Self {
            dir: dir.to_path_buf(),
            sync_writes: true,
            lock_file: None,
        })
    }

    /// Sets whether writes are followed by an fsync.
    #[must_use]
    pub fn sync_writes(mut self, value: bool) -> Self {
        self.sync_writes = value;
        self
    }

    /// Takes an exclusive advisory lock on the directory.
    ///
    /// The lock is held until the store is dropped. Locking an already
    /// locked store is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Locked`] if another handle holds the lock.
    pub fn lock(&mut self) -> StorageResult<()> {
        if self.lock_file.is_some() {
            return Ok(());
        }

        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(self.dir.join(LOCK_FILE))?;

        if lock_file.try_lock_exclusive().is_err() {
            return Err(StorageError::Locked);
        }

        self.lock_file = Some(lock_file);
        Ok(())
    }

    /// Returns whether this store holds the directory lock.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.lock_file.is_some()
    }

    /// Returns the store directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the path of the file backing `slot`.
    #[must_use]
    pub fn slot_path(&self, slot: SlotId) -> PathBuf {
        self.dir.join(format!("{slot}.{SLOT_EXTENSION}"))
    }

    fn temp_path(&self, slot: SlotId) -> PathBuf {
        self.dir.join(format!("{slot}.{SLOT_EXTENSION}.{TEMP_SUFFIX}"))
    }

    fn write_file(&self, path: &Path, data: &[u8]) -> StorageResult<()> {
        let mut file = File::create(path)?;
        file.write_all(data)?;
        if self.sync_writes {
            file.sync_all()?;
        }
        Ok(())
    }

    /// Syncs the directory so that renames and removals are durable.
    ///
    /// Windows NTFS journals metadata updates, so this is a no-op there.
    #[cfg(unix)]
    fn sync_directory(&self) -> StorageResult<()> {
        File::open(&self.dir)?.sync_all()?;
        Ok(())
    }

    #[cfg(not(unix))]
    fn sync_directory(&self) -> StorageResult<()> {
        Ok(())
    }
}

impl SlotStore for FileSlotStore {
    fn location(&self) -> String {
        self.dir.display().to_string()
    }

    fn read_slot(&self, slot: SlotId) -> StorageResult<Vec<u8>> {
        match fs::read(self.slot_path(slot)) {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(StorageError::SlotNotFound { slot })
            }
            Err(e) => Err(e.into()),
        }
    }

    fn write_slot(&mut self, slot: SlotId, data: &[u8]) -> StorageResult<()> {
        trace!(slot, len = data.len(), "writing slot file");
        self.write_file(&self.slot_path(slot), data)
    }

    fn write_slot_atomic(&mut self, slot: SlotId, data: &[u8]) -> StorageResult<()> {
        trace!(slot, len = data.len(), "atomically replacing slot file");
        let temp_path = self.temp_path(slot);

        let mut file = File::create(&temp_path)?;
        file.write_all(data)?;
        file.sync_all()?;
        drop(file);

        fs::rename(&temp_path, self.slot_path(slot))?;
        self.sync_directory()
    }

    fn contains_slot(&self, slot: SlotId) -> StorageResult<bool> {
        Ok(self.slot_path(slot).is_file())
    }

    fn remove_slot(&mut self, slot: SlotId) -> StorageResult<bool> {
        match fs::remove_file(self.slot_path(slot)) {
            Ok(()) => {
                self.sync_directory()?;
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn slots(&self) -> StorageResult<Vec<SlotId>> {
        let mut slots = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(SLOT_EXTENSION) {
                continue;
            }
            let slot = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.parse::<SlotId>().ok());
            if let Some(slot) = slot {
                slots.push(slot);
            }
        }
        slots.sort_unstable();
        Ok(slots)
    }
}
