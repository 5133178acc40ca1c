//! The version ring.

use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use crate::fingerprint::Fingerprint;
use crate::ledger::{Ledger, LedgerEntry};
use crate::metadata::Metadata;
use crate::slot::{self, METADATA_SLOT};
use crate::validate::Validate;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use snapring_storage::{FileSlotStore, InMemorySlotStore, SlotId, SlotStore, StorageError};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::debug;

/// Slot that holds the surviving version after a capacity change.
const FIRST_SLOT: SlotId = 1;

/// A fixed-capacity history of snapshots stored in numbered slots.
///
/// Versions live in content slots `1..=capacity`, visited circularly. The
/// ring tracks the active slot plus how many versions are reachable behind
/// it (`left`, for [`back`](Self::back)) and ahead of it (`right`, for
/// [`forward`](Self::forward)). Pushing discards everything ahead of the
/// active version; once `capacity` versions are retained, each push makes
/// the oldest one unreachable and later overwrites its slot.
///
/// Every mutating call writes the full [`Metadata`] record to slot 0 before
/// returning. Content and metadata writes are separate: a crash between them
/// can leave a slot whose bytes disagree with its ledger entry, which
/// [`verify`](Self::verify) reports.
///
/// # Thread Safety
///
/// A ring assumes it is the only writer of its slots. Enable
/// [`Config::lock_directory`] to have a second opener fail instead of
/// corrupting shared state.
#[derive(Debug)]
pub struct VersionRing<S: SlotStore = FileSlotStore> {
    store: S,
    meta: Metadata,
}

impl VersionRing<FileSlotStore> {
    /// Opens the ring in `dir`, initializing a fresh one of capacity 10 if
    /// the directory holds none.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or read, or if
    /// its metadata cannot be decoded.
    pub fn open(dir: &Path) -> CoreResult<Self> {
        Self::open_with_config(dir, Config::default())
    }

    /// Opens the ring in `dir` with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Locked`] if locking is requested and another
    /// handle holds the lock, plus any error of [`VersionRing::with_store`].
    pub fn open_with_config(dir: &Path, config: Config) -> CoreResult<Self> {
        let mut store =
            FileSlotStore::open(dir, config.create_if_missing)?.sync_writes(config.sync_writes);

        if config.lock_directory {
            store.lock().map_err(|e| match e {
                StorageError::Locked => CoreError::Locked,
                other => other.into(),
            })?;
        }

        Self::with_store(store, config)
    }
}

impl VersionRing<InMemorySlotStore> {
    /// Creates an empty ring kept entirely in memory.
    ///
    /// # Errors
    ///
    /// Never fails in practice; the signature matches the other constructors.
    pub fn in_memory() -> CoreResult<Self> {
        Self::with_store(InMemorySlotStore::new(), Config::default())
    }
}

impl<S: SlotStore> VersionRing<S> {
    /// Opens the ring held by `store`.
    ///
    /// If slot 0 is empty, a fresh ring with capacity
    /// [`Config::default_capacity`] and a new instance id is initialized and
    /// persisted immediately. Otherwise slot 0 is decoded as-is; no repair is
    /// attempted.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No ring exists and `create_if_missing` is false
    /// - The default capacity is out of range
    /// - Slot 0 is malformed ([`CoreError::Json`]) or inconsistent
    ///   ([`CoreError::CorruptMetadata`])
    /// - I/O errors occur
    pub fn with_store(store: S, config: Config) -> CoreResult<Self> {
        if store.contains_slot(METADATA_SLOT)? {
            let meta = Metadata::decode(&store.read_slot(METADATA_SLOT)?)?;
            debug!(
                location = %store.location(),
                capacity = meta.length,
                current = meta.current,
                left = meta.left,
                right = meta.right,
                "opened version ring"
            );
            return Ok(Self { store, meta });
        }

        if !config.create_if_missing {
            return Err(CoreError::invalid_argument(format!(
                "no version ring at {}",
                store.location()
            )));
        }
        slot::check_capacity(config.default_capacity)?;

        let meta = Metadata::new(store.location(), config.default_capacity);
        let mut ring = Self { store, meta };
        ring.note()?;
        debug!(
            location = %ring.store.location(),
            capacity = ring.meta.length,
            once = %ring.meta.once,
            "initialized version ring"
        );
        Ok(ring)
    }

    /// Changes the capacity, collapsing history to the active version.
    ///
    /// The active version is moved to slot 1 and becomes the only reachable
    /// one. Files of every other slot stay on disk until [`prune`](Self::prune).
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidArgument`] without changing anything if
    /// `capacity` is outside `1..=10_000`, or an error if reading or writing
    /// a slot fails.
    pub fn set_length(&mut self, capacity: u64) -> CoreResult<()> {
        slot::check_capacity(capacity)?;

        if !self.is_empty() {
            let data = self.pick(0)?;
            let time = self
                .meta
                .files
                .get(self.meta.current)
                .map_or_else(Utc::now, |entry| entry.time);

            if self.meta.current != FIRST_SLOT {
                self.store.write_slot(FIRST_SLOT, &data)?;
            }

            let mut files = Ledger::new();
            files.insert(
                FIRST_SLOT,
                LedgerEntry {
                    sha1: Fingerprint::of(&data),
                    time,
                },
            );
            self.meta.files = files;
            self.meta.current = FIRST_SLOT;
        }

        debug!(from = self.meta.length, to = capacity, "changing ring capacity");
        self.meta.left = 0;
        self.meta.right = 0;
        self.meta.length = capacity;
        self.note()
    }

    /// Steps back to the previous version.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NavigationBounds`] if no older version is
    /// reachable, or an error if persisting fails.
    pub fn back(&mut self) -> CoreResult<()> {
        if self.meta.left == 0 {
            return Err(CoreError::navigation_bounds("no backward steps"));
        }
        self.meta.current = self.slot_at(-1);
        self.meta.left -= 1;
        self.meta.right += 1;
        debug!(current = self.meta.current, "stepped back");
        self.note()
    }

    /// Steps forward to the next version.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NavigationBounds`] if no newer version is
    /// reachable, or an error if persisting fails.
    pub fn forward(&mut self) -> CoreResult<()> {
        if self.meta.right == 0 {
            return Err(CoreError::navigation_bounds("no forward steps"));
        }
        self.meta.current = self.slot_at(1);
        self.meta.left += 1;
        self.meta.right -= 1;
        debug!(current = self.meta.current, "stepped forward");
        self.note()
    }

    /// Appends a new version after the active one and makes it active.
    ///
    /// Versions ahead of the active one become unreachable. When the ring is
    /// full the oldest version drops out of reach.
    ///
    /// # Errors
    ///
    /// Returns an error if writing the slot or the metadata fails.
    pub fn push(&mut self, data: &[u8]) -> CoreResult<()> {
        let had_version = !self.is_empty();
        let next = self.slot_at(1);
        self.store.write_slot(next, data)?;

        self.meta.current = next;
        self.meta.right = 0;
        if had_version && self.meta.left + 1 < self.meta.length {
            self.meta.left += 1;
        }
        self.meta.files.insert(next, LedgerEntry::record(data));

        debug!(
            slot = next,
            len = data.len(),
            left = self.meta.left,
            "pushed version"
        );
        self.note()
    }

    /// Validates `value`, encodes it as JSON and pushes it.
    ///
    /// Nothing is written when validation fails.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ValidationFailed`] listing every violated
    /// constraint, [`CoreError::Json`] if encoding fails, or any error of
    /// [`push`](Self::push).
    pub fn push_json<T>(&mut self, value: &T) -> CoreResult<()>
    where
        T: Serialize + Validate + ?Sized,
    {
        value.check()?;
        let data = serde_json::to_vec(value)?;
        self.push(&data)
    }

    /// Reads the version `offset` steps from the active one.
    ///
    /// Negative offsets look back, positive ones look forward, `0` is the
    /// active version.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NavigationBounds`] if the offset falls outside
    /// the reachable window or nothing has been pushed, or an error if
    /// reading the slot fails.
    pub fn pick(&self, offset: i64) -> CoreResult<Vec<u8>> {
        let slot = self.locate(offset)?;
        Ok(self.store.read_slot(slot)?)
    }

    /// Reads and decodes the JSON version `offset` steps from the active one.
    ///
    /// # Errors
    ///
    /// Returns any error of [`pick`](Self::pick), or [`CoreError::Json`] if
    /// the bytes do not decode as `T`.
    pub fn pick_json<T: DeserializeOwned>(&self, offset: i64) -> CoreResult<T> {
        Ok(serde_json::from_slice(&self.pick(offset)?)?)
    }

    /// Makes the version `offset` steps away active and returns its bytes.
    ///
    /// # Errors
    ///
    /// Returns any error of [`pick`](Self::pick) without moving, or an
    /// error if persisting fails.
    pub fn reset(&mut self, offset: i64) -> CoreResult<Vec<u8>> {
        let data = self.pick(offset)?;
        let left = self.meta.left.checked_add_signed(offset);
        let right = offset
            .checked_neg()
            .and_then(|back| self.meta.right.checked_add_signed(back));
        let (Some(left), Some(right)) = (left, right) else {
            return Err(CoreError::navigation_bounds("no such version"));
        };
        self.meta.current = self.slot_at(offset);
        self.meta.left = left;
        self.meta.right = right;
        debug!(offset, current = self.meta.current, "reset to version");
        self.note()?;
        Ok(data)
    }

    /// Checks the version `offset` steps away against its ledger entry.
    ///
    /// Returns the fingerprint of the bytes on disk when they match.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::FingerprintMismatch`] if the bytes changed since
    /// they were recorded, [`CoreError::UntrackedSlot`] if there is no
    /// record, or any error of [`pick`](Self::pick).
    pub fn verify(&self, offset: i64) -> CoreResult<Fingerprint> {
        let slot = self.locate(offset)?;
        let actual = Fingerprint::of(&self.store.read_slot(slot)?);
        let entry = self
            .meta
            .files
            .get(slot)
            .ok_or(CoreError::UntrackedSlot { slot })?;

        if entry.sha1 != actual {
            return Err(CoreError::FingerprintMismatch {
                slot,
                expected: entry.sha1.to_string(),
                actual: actual.to_string(),
            });
        }
        Ok(actual)
    }

    /// Removes every content slot that is no longer reachable.
    ///
    /// This covers versions discarded by [`push`](Self::push), versions that
    /// fell out of a full ring and slots orphaned by
    /// [`set_length`](Self::set_length). Returns the number of slots removed.
    ///
    /// # Errors
    ///
    /// Returns an error if listing or removing slots fails, or if persisting
    /// fails.
    pub fn prune(&mut self) -> CoreResult<usize> {
        let keep: BTreeSet<SlotId> = self.meta.reachable().into_iter().collect();

        let mut removed = 0;
        for slot in self.store.slots()? {
            if slot == METADATA_SLOT || keep.contains(&slot) {
                continue;
            }
            if self.store.remove_slot(slot)? {
                removed += 1;
            }
        }

        self.meta.files.retain(|slot| keep.contains(&slot));
        debug!(removed, kept = keep.len(), "pruned unreachable slots");
        self.note()?;
        Ok(removed)
    }

    /// Returns the number of content slots.
    #[must_use]
    pub fn capacity(&self) -> u64 {
        self.meta.length
    }

    /// Returns the slot of the active version, 0 if nothing was pushed.
    #[must_use]
    pub fn current(&self) -> SlotId {
        self.meta.current
    }

    /// Returns how many times [`back`](Self::back) can succeed.
    #[must_use]
    pub fn left(&self) -> u64 {
        self.meta.left
    }

    /// Returns how many times [`forward`](Self::forward) can succeed.
    #[must_use]
    pub fn right(&self) -> u64 {
        self.meta.right
    }

    /// Returns the identifier of the initialization that created this ring.
    ///
    /// A changed id after reopening a directory means the ring was
    /// reinitialized in between.
    #[must_use]
    pub fn instance_id(&self) -> &str {
        &self.meta.once
    }

    /// Returns the directory recorded when the ring was initialized.
    #[must_use]
    pub fn directory(&self) -> &str {
        &self.meta.dir
    }

    /// Returns whether nothing has been pushed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.meta.is_empty()
    }

    /// Returns the number of reachable versions.
    #[must_use]
    pub fn history_len(&self) -> u64 {
        if self.is_empty() {
            0
        } else {
            self.meta.left + self.meta.right + 1
        }
    }

    /// Returns the ledger entry of `slot`.
    #[must_use]
    pub fn entry(&self, slot: SlotId) -> Option<&LedgerEntry> {
        self.meta.files.get(slot)
    }

    /// Returns the full ledger.
    #[must_use]
    pub fn ledger(&self) -> &Ledger {
        &self.meta.files
    }

    /// Returns the persisted metadata record.
    #[must_use]
    pub fn metadata(&self) -> &Metadata {
        &self.meta
    }

    /// Returns the underlying slot store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    fn slot_at(&self, offset: i64) -> SlotId {
        slot::step(self.meta.current, offset, self.meta.length)
    }

    fn locate(&self, offset: i64) -> CoreResult<SlotId> {
        if self.is_empty() {
            return Err(CoreError::navigation_bounds("no version has been pushed"));
        }
        if offset < -(self.meta.left as i64) {
            return Err(CoreError::navigation_bounds("no such older version"));
        }
        if offset > self.meta.right as i64 {
            return Err(CoreError::navigation_bounds("no such newer version"));
        }
        Ok(self.slot_at(offset))
    }

    /// Persists the metadata record to slot 0.
    fn note(&mut self) -> CoreResult<()> {
        let data = self.meta.encode()?;
        self.store.write_slot_atomic(METADATA_SLOT, &data)?;
        Ok(())
    }
}
