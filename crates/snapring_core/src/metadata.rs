//! The metadata record persisted in slot 0.
//!
//! ```json
//! {
//!   "version": "0.1.0",
//!   "dir": "history",
//!   "length": 10,
//!   "current": 3,
//!   "left": 2,
//!   "right": 0,
//!   "once": "1714550400.5c0f8e3a7d3b4f0c9e6b2a1d8f7e6c5b",
//!   "files": { "1": { "sha1": "...", "time": "2024-05-01T08:00:00Z" } }
//! }
//! ```

use crate::error::{CoreError, CoreResult};
use crate::ledger::Ledger;
use crate::slot::{self, METADATA_SLOT};
use crate::validate::{Validate, Violations};
use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize};
use snapring_storage::SlotId;
use uuid::Uuid;

/// Schema tag written into every new record.
pub const METADATA_VERSION: &str = "0.1.0";

/// Bookkeeping of a version ring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Informational schema tag.
    pub version: String,
    /// Location of the slot files when the ring was initialized.
    pub dir: String,
    /// Capacity: number of content slots.
    pub length: u64,
    /// Slot of the active version, 0 while nothing has been pushed.
    pub current: SlotId,
    /// Back steps available.
    pub left: u64,
    /// Forward steps available.
    pub right: u64,
    /// Identifier of the initialization that created this record.
    pub once: String,
    /// Fingerprint and timestamp per slot.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub files: Ledger,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Ledger, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Ledger>::deserialize(deserializer)?.unwrap_or_default())
}

/// Generates an identifier from the current time and a random UUID.
fn new_instance_id() -> String {
    format!("{}.{}", Utc::now().timestamp(), Uuid::new_v4().simple())
}

impl Metadata {
    /// Creates the record of a fresh, empty ring.
    #[must_use]
    pub fn new(dir: impl Into<String>, length: u64) -> Self {
        Self {
            version: METADATA_VERSION.to_string(),
            dir: dir.into(),
            length,
            current: METADATA_SLOT,
            left: 0,
            right: 0,
            once: new_instance_id(),
            files: Ledger::new(),
        }
    }

    /// Encodes the record as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn encode(&self) -> CoreResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decodes a record and checks that it describes a consistent ring.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Json`] for malformed bytes and
    /// [`CoreError::CorruptMetadata`] for a record that breaks the ring
    /// invariants.
    pub fn decode(data: &[u8]) -> CoreResult<Self> {
        let metadata: Self = serde_json::from_slice(data)?;
        metadata.check().map_err(|e| match e {
            CoreError::ValidationFailed { violations } => {
                CoreError::corrupt_metadata(violations.join("; "))
            }
            other => other,
        })?;
        Ok(metadata)
    }

    /// Returns whether nothing has been pushed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.current == METADATA_SLOT
    }

    /// Lists the slots reachable from the active version, oldest first.
    #[must_use]
    pub fn reachable(&self) -> Vec<SlotId> {
        slot::reachable(self.current, self.left, self.right, self.length)
    }
}

impl Validate for Metadata {
    fn validate(&self, v: &mut Violations) {
        v.require("dir", &self.dir).require("once", &self.once);

        if slot::check_capacity(self.length).is_err() {
            v.ensure(false, format!("length: {} out of range", self.length));
            return;
        }

        v.ensure(
            self.current <= self.length,
            format!("current: slot {} beyond length {}", self.current, self.length),
        );
        if self.is_empty() {
            v.ensure(
                self.left == 0 && self.right == 0,
                "left/right: history without an active version",
            );
        }
        v.ensure(
            self.left.saturating_add(self.right) < self.length,
            format!(
                "left/right: {} + {} steps exceed length {}",
                self.left, self.right, self.length
            ),
        );

        for (slot, _) in self.files.iter() {
            v.ensure(
                (1..=self.length).contains(&slot),
                format!("files: slot {slot} outside 1..={}", self.length),
            );
        }
        if v.is_empty() {
            for slot in self.reachable() {
                v.ensure(
                    self.files.get(slot).is_some(),
                    format!("files: reachable slot {slot} has no entry"),
                );
            }
        }
        v.nested("files", &self.files);
    }
}
