//! Slot store trait definition.

use crate::error::StorageResult;

/// Index of a slot within a store.
pub type SlotId = u64;

/// A numbered collection of opaque byte blobs.
///
/// Each slot holds the complete bytes of its last write; writes replace the
/// previous contents wholesale. Callers own the meaning of slot numbers.
///
/// # Invariants
///
/// - `read_slot` returns exactly the bytes of the last successful write
/// - `read_slot` on a never-written (or removed) slot fails with
///   [`crate::StorageError::SlotNotFound`]
/// - `write_slot_atomic` either leaves the previous contents or the new
///   contents in place, never a torn mix
///
/// # Implementors
///
/// - [`super::FileSlotStore`] - For persistent storage
/// - [`super::InMemorySlotStore`] - For testing
pub trait SlotStore: Send + Sync {
    /// Returns a human-readable location for this store.
    ///
    /// For file stores this is the directory path.
    fn location(&self) -> String;

    /// Reads the full contents of `slot`.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot does not exist or an I/O error occurs.
    fn read_slot(&self, slot: SlotId) -> StorageResult<Vec<u8>>;

    /// Replaces the contents of `slot` with `data`.
    ///
    /// # Errors
    ///
    /// Returns an error if an I/O error occurs.
    fn write_slot(&mut self, slot: SlotId, data: &[u8]) -> StorageResult<()>;

    /// Replaces the contents of `slot` so that a crash leaves either the old
    /// or the new bytes.
    ///
    /// The default implementation defers to [`SlotStore::write_slot`], which
    /// is sufficient for stores without partial writes.
    ///
    /// # Errors
    ///
    /// Returns an error if an I/O error occurs.
    fn write_slot_atomic(&mut self, slot: SlotId, data: &[u8]) -> StorageResult<()> {
        self.write_slot(slot, data)
    }

    /// Returns whether `slot` currently holds data.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot cannot be inspected.
    fn contains_slot(&self, slot: SlotId) -> StorageResult<bool>;

    /// Removes `slot`. Returns `false` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if an I/O error occurs.
    fn remove_slot(&mut self, slot: SlotId) -> StorageResult<bool>;

    /// Lists every slot currently holding data, in ascending order.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be enumerated.
    fn slots(&self) -> StorageResult<Vec<SlotId>>;
}

impl<S: SlotStore + ?Sized> SlotStore for Box<S> {
    fn location(&self) -> String {
        (**self).location()
    }

    fn read_slot(&self, slot: SlotId) -> StorageResult<Vec<u8>> {
        (**self).read_slot(slot)
    }

    fn write_slot(&mut self, slot: SlotId, data: &[u8]) -> StorageResult<()> {
        (**self).write_slot(slot, data)
    }

    fn write_slot_atomic(&mut self, slot: SlotId, data: &[u8]) -> StorageResult<()> {
        (**self).write_slot_atomic(slot, data)
    }

    fn contains_slot(&self, slot: SlotId) -> StorageResult<bool> {
        (**self).contains_slot(slot)
    }

    fn remove_slot(&mut self, slot: SlotId) -> StorageResult<bool> {
        (**self).remove_slot(slot)
    }

    fn slots(&self) -> StorageResult<Vec<SlotId>> {
        (**self).slots()
    }
}
