//! Error types for SnapRing core.

use snapring_storage::{SlotId, StorageError};
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in version ring operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Slot store error, including all underlying I/O failures.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// JSON encoding or decoding failed.
    #[error("codec error: {0}")]
    Json(#[from] serde_json::Error),

    /// An argument was outside its accepted range.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of the rejected argument.
        message: String,
    },

    /// Navigation or lookup outside the available history window.
    #[error("{message}")]
    NavigationBounds {
        /// Which bound was hit.
        message: String,
    },

    /// An object failed validation before being pushed.
    #[error("validation failed: {}", violations.join("; "))]
    ValidationFailed {
        /// Every violated constraint.
        violations: Vec<String>,
    },

    /// The metadata record decoded but is not a consistent ring.
    #[error("corrupt metadata: {message}")]
    CorruptMetadata {
        /// Description of the inconsistency.
        message: String,
    },

    /// Slot contents do not match the fingerprint recorded in the ledger.
    #[error("fingerprint mismatch in slot {slot}: expected {expected}, got {actual}")]
    FingerprintMismatch {
        /// The slot that was checked.
        slot: SlotId,
        /// Fingerprint recorded in the ledger.
        expected: String,
        /// Fingerprint of the bytes on disk.
        actual: String,
    },

    /// A reachable slot has no ledger entry.
    #[error("slot {slot} has no ledger entry")]
    UntrackedSlot {
        /// The slot without an entry.
        slot: SlotId,
    },

    /// Another process holds the directory lock.
    #[error("ring locked: another process has exclusive access")]
    Locked,
}

impl CoreError {
    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates a navigation bounds error.
    pub fn navigation_bounds(message: impl Into<String>) -> Self {
        Self::NavigationBounds {
            message: message.into(),
        }
    }

    /// Creates a corrupt metadata error.
    pub fn corrupt_metadata(message: impl Into<String>) -> Self {
        Self::CorruptMetadata {
            message: message.into(),
        }
    }
}
