//! # SnapRing Storage
//!
//! Slot store trait and implementations for SnapRing.
//!
//! A slot store is the lowest layer of a version ring: a directory-like
//! collection of numbered, **opaque** byte blobs. Stores do not interpret
//! the bytes they hold and know nothing about which slot carries metadata.
//!
//! ## Available Stores
//!
//! - [`FileSlotStore`] - One `<slot>.json` file per slot inside a directory
//! - [`InMemorySlotStore`] - For testing and ephemeral rings
//!
//! ## Example
//!
//! ```rust
//! use snapring_storage::{InMemorySlotStore, SlotStore};
//!
//! let mut store = InMemorySlotStore::new();
//! store.write_slot(1, b"hello world").unwrap();
//! assert_eq!(store.read_slot(1).unwrap(), b"hello world");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod file;
mod memory;
mod store;

pub use error::{StorageError, StorageResult};
pub use file::{FileSlotStore, LOCK_FILE, SLOT_EXTENSION};
pub use memory::InMemorySlotStore;
pub use store::{SlotId, SlotStore};
