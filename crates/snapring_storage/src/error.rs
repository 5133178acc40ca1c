//! Error types for slot store operations.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::store::SlotId;

/// Result type for slot store operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during slot store operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The requested slot has never been written.
    #[error("slot {slot} not found")]
    SlotNotFound {
        /// The missing slot.
        slot: SlotId,
    },

    /// The store location is missing or is not a directory.
    #[error("invalid store location {path:?}: {message}")]
    InvalidLocation {
        /// The offending path.
        path: PathBuf,
        /// Why the location was rejected.
        message: String,
    },

    /// Another process holds the directory lock.
    #[error("store locked: another process has exclusive access")]
    Locked,
}
