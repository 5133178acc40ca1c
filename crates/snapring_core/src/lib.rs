//! # SnapRing Core
//!
//! A fixed-capacity, disk-backed version history for a single document.
//!
//! This crate provides:
//! - [`VersionRing`], a circular ring of numbered snapshot slots with
//!   undo/redo navigation
//! - The persisted [`Metadata`] record kept in slot 0, including the
//!   per-slot [`Ledger`] of fingerprints and timestamps
//! - The [`Validate`] facility used to check objects before they are pushed
//!
//! ## Example
//!
//! ```rust,no_run
//! use snapring_core::VersionRing;
//! use std::path::Path;
//!
//! let mut ring = VersionRing::open(Path::new("history")).unwrap();
//! ring.push(b"first draft").unwrap();
//! ring.push(b"second draft").unwrap();
//! ring.back().unwrap();
//! assert_eq!(ring.pick(0).unwrap(), b"first draft");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod fingerprint;
mod ledger;
mod metadata;
mod ring;
pub mod slot;
mod validate;

pub use config::Config;
pub use error::{CoreError, CoreResult};
pub use fingerprint::Fingerprint;
pub use ledger::{Ledger, LedgerEntry};
pub use metadata::{Metadata, METADATA_VERSION};
pub use ring::VersionRing;
pub use slot::{DEFAULT_CAPACITY, MAX_CAPACITY, METADATA_SLOT};
pub use validate::{Required, Validate, Violations};

pub use snapring_storage::{FileSlotStore, InMemorySlotStore, SlotId, SlotStore};
