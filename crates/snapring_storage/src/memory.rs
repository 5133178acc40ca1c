//! In-memory slot store for testing.

use crate::error::{StorageError, StorageResult};
use crate::store::{SlotId, SlotStore};
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// An in-memory slot store.
///
/// This store keeps every slot in memory and is suitable for:
/// - Unit tests
/// - Integration tests
/// - Ephemeral rings that don't need persistence
///
/// # Example
///
/// ```rust
/// use snapring_storage::{InMemorySlotStore, SlotStore};
///
/// let mut store = InMemorySlotStore::new();
/// store.write_slot(2, b"test data").unwrap();
/// assert_eq!(store.slots().unwrap(), vec![2]);
/// ```
#[derive(Debug, Default)]
pub struct InMemorySlotStore {
    slots: RwLock<BTreeMap<SlotId, Vec<u8>>>,
}

impl InMemorySlotStore {
    /// Creates a new empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store with pre-existing slots.
    ///
    /// Useful for testing recovery scenarios.
    #[must_use]
    pub fn with_slots(slots: BTreeMap<SlotId, Vec<u8>>) -> Self {
        Self {
            slots: RwLock::new(slots),
        }
    }

    /// Returns a copy of every slot.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<SlotId, Vec<u8>> {
        self.slots.read().clone()
    }
}

impl SlotStore for InMemorySlotStore {
    fn location(&self) -> String {
        ":memory:".to_string()
    }

    fn read_slot(&self, slot: SlotId) -> StorageResult<Vec<u8>> {
        self.slots
            .read()
            .get(&slot)
            .cloned()
            .ok_or(StorageError::SlotNotFound { slot })
    }

    fn write_slot(&mut self, slot: SlotId, data: &[u8]) -> StorageResult<()> {
        self.slots.write().insert(slot, data.to_vec());
        Ok(())
    }

    fn contains_slot(&self, slot: SlotId) -> StorageResult<bool> {
        Ok(self.slots.read().contains_key(&slot))
    }

    fn remove_slot(&mut self, slot: SlotId) -> StorageResult<bool> {
        Ok(self.slots.write().remove(&slot).is_some())
    }

    fn slots(&self) -> StorageResult<Vec<SlotId>> {
        Ok(self.slots.read().keys().copied().collect())
    }
}
