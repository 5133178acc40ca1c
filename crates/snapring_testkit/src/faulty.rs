//! Fault injection for ring persistence.
//!
//! [`FaultySlotStore`] wraps another store and fails writes on demand. It
//! is used to check that rejected operations write nothing, and to reproduce
//! the window between a content write and the metadata write that follows.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use snapring_testkit::faulty::FaultySlotStore;
//!
//! let (store, faults) = FaultySlotStore::new(Box::new(InMemorySlotStore::new()));
//! let mut ring = VersionRing::with_store(store, Config::default())?;
//! faults.fail_after_writes(1);
//! ```

use snapring_storage::{SlotId, SlotStore, StorageError, StorageResult};
use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug)]
struct FaultState {
    writes: AtomicUsize,
    fail_after: AtomicUsize,
    failing: AtomicBool,
}

/// Controls the faults of a [`FaultySlotStore`] after it has been moved
/// into a ring.
#[derive(Debug, Clone)]
pub struct FaultHandle {
    state: Arc<FaultState>,
}

impl FaultHandle {
    /// Lets `count` more writes succeed, then fails every write.
    pub fn fail_after_writes(&self, count: usize) {
        let writes = self.state.writes.load(Ordering::SeqCst);
        self.state
            .fail_after
            .store(writes.saturating_add(count), Ordering::SeqCst);
    }

    /// Fails every write from now on.
    pub fn fail_writes(&self) {
        self.fail_after_writes(0);
    }

    /// Clears all faults.
    pub fn reset(&self) {
        self.state.fail_after.store(usize::MAX, Ordering::SeqCst);
        self.state.failing.store(false, Ordering::SeqCst);
    }

    /// Returns the number of successful writes so far.
    pub fn writes(&self) -> usize {
        self.state.writes.load(Ordering::SeqCst)
    }

    /// Returns whether a write has been refused.
    pub fn has_failed(&self) -> bool {
        self.state.failing.load(Ordering::SeqCst)
    }
}

/// A slot store wrapper that refuses writes on demand.
pub struct FaultySlotStore {
    inner: Box<dyn SlotStore>,
    state: Arc<FaultState>,
}

impl FaultySlotStore {
    /// Wraps `inner`, returning the store and the handle controlling it.
    pub fn new(inner: Box<dyn SlotStore>) -> (Self, FaultHandle) {
        let state = Arc::new(FaultState {
            writes: AtomicUsize::new(0),
            fail_after: AtomicUsize::new(usize::MAX),
            failing: AtomicBool::new(false),
        });
        let handle = FaultHandle {
            state: Arc::clone(&state),
        };
        (Self { inner, state }, handle)
    }

    fn admit_write(&self) -> StorageResult<()> {
        let writes = self.state.writes.load(Ordering::SeqCst);
        if writes >= self.state.fail_after.load(Ordering::SeqCst) {
            self.state.failing.store(true, Ordering::SeqCst);
            return Err(StorageError::Io(io::Error::new(
                io::ErrorKind::Other,
                "injected write failure",
            )));
        }
        self.state.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl SlotStore for FaultySlotStore {
    fn location(&self) -> String {
        self.inner.location()
    }

    fn read_slot(&self, slot: SlotId) -> StorageResult<Vec<u8>> {
        self.inner.read_slot(slot)
    }

    fn write_slot(&mut self, slot: SlotId, data: &[u8]) -> StorageResult<()> {
        self.admit_write()?;
        self.inner.write_slot(slot, data)
    }

    fn write_slot_atomic(&mut self, slot: SlotId, data: &[u8]) -> StorageResult<()> {
        self.admit_write()?;
        self.inner.write_slot_atomic(slot, data)
    }

    fn contains_slot(&self, slot: SlotId) -> StorageResult<bool> {
        self.inner.contains_slot(slot)
    }

    fn remove_slot(&mut self, slot: SlotId) -> StorageResult<bool> {
        self.admit_write()?;
        self.inner.remove_slot(slot)
    }

    fn slots(&self) -> StorageResult<Vec<SlotId>> {
        self.inner.slots()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use snapring_core::{
        Config, CoreError, FileSlotStore, InMemorySlotStore, Validate, VersionRing, Violations,
    };
    use tempfile::tempdir;

    #[derive(Serialize)]
    struct Note {
        title: String,
        body: String,
    }

    impl Validate for Note {
        fn validate(&self, v: &mut Violations) {
            v.require("title", &self.title).require("body", &self.body);
        }
    }

    fn faulty_ring(capacity: u64) -> (VersionRing<FaultySlotStore>, FaultHandle) {
        let (store, faults) = FaultySlotStore::new(Box::new(InMemorySlotStore::new()));
        let ring =
            VersionRing::with_store(store, Config::new().default_capacity(capacity)).unwrap();
        (ring, faults)
    }

    #[test]
    fn failing_store_refuses_writes() {
        let (mut store, faults) = FaultySlotStore::new(Box::new(InMemorySlotStore::new()));
        store.write_slot(1, b"ok").unwrap();
        faults.fail_writes();

        assert!(matches!(store.write_slot(1, b"no"), Err(StorageError::Io(_))));
        assert!(faults.has_failed());
        assert_eq!(store.read_slot(1).unwrap(), b"ok");

        faults.reset();
        store.write_slot(1, b"again").unwrap();
        assert_eq!(faults.writes(), 2);
    }

    #[test]
    fn rejected_push_json_writes_nothing() {
        let (mut ring, faults) = faulty_ring(10);
        ring.push(b"seed").unwrap();
        let writes = faults.writes();
        let metadata = ring.store().read_slot(0).unwrap();

        let result = ring.push_json(&Note {
            title: String::new(),
            body: String::new(),
        });

        match result {
            Err(CoreError::ValidationFailed { violations }) => assert_eq!(violations.len(), 2),
            other => panic!("expected validation failure, got {other:?}"),
        }
        assert_eq!(faults.writes(), writes);
        assert_eq!(ring.store().read_slot(0).unwrap(), metadata);
    }

    #[test]
    fn rejected_navigation_writes_nothing() {
        let (mut ring, faults) = faulty_ring(10);
        let writes = faults.writes();

        assert!(ring.back().is_err());
        assert!(ring.forward().is_err());
        assert!(ring.set_length(0).is_err());
        assert!(ring.reset(1).is_err());
        assert_eq!(faults.writes(), writes);
    }

    #[test]
    fn failed_content_write_keeps_counters() {
        let (mut ring, faults) = faulty_ring(10);
        ring.push(b"one").unwrap();
        faults.fail_writes();

        assert!(matches!(ring.push(b"two"), Err(CoreError::Storage(_))));
        assert_eq!(ring.current(), 1);
        assert_eq!(ring.left(), 0);
        assert_eq!(ring.pick(0).unwrap(), b"one");
    }

    #[test]
    fn failed_metadata_write_is_detected_after_reopen() {
        let temp = tempdir().unwrap();
        let inner = FileSlotStore::open(temp.path(), true).unwrap();
        let (store, faults) = FaultySlotStore::new(Box::new(inner));
        let mut ring = VersionRing::with_store(store, Config::new().default_capacity(2)).unwrap();

        ring.push(b"a").unwrap();
        ring.push(b"b").unwrap();

        // the third push overwrites slot 1, then fails to record it
        faults.fail_after_writes(1);
        assert!(ring.push(b"c").is_err());
        drop(ring);

        let ring = VersionRing::open(temp.path()).unwrap();
        assert_eq!(ring.current(), 2);
        assert_eq!(ring.pick(0).unwrap(), b"b");
        assert!(matches!(
            ring.verify(-1),
            Err(CoreError::FingerprintMismatch { slot: 1, .. })
        ));
    }
}
