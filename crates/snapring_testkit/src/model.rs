//! Reference model of ring navigation.
//!
//! [`RingModel`] keeps the reachable history as a plain list of versions,
//! oldest first, with an index pointing at the active one. It has no slots
//! and no wrap-around, which makes it easy to trust; model-based tests drive
//! a [`VersionRing`] and a model with the same operations and compare them.

use crate::generators::RingOp;
use snapring_core::{CoreError, SlotStore, Validate, VersionRing, MAX_CAPACITY};
use std::collections::VecDeque;

/// Slot-free model of a version ring.
#[derive(Debug, Clone)]
pub struct RingModel {
    capacity: u64,
    /// Reachable versions, oldest at the front.
    versions: VecDeque<Vec<u8>>,
    /// Index of the active version in `versions`.
    ///
    /// **Invariant**: `index < versions.len()` unless `versions` is empty.
    index: usize,
}

impl RingModel {
    /// Creates an empty model.
    pub fn new(capacity: u64) -> Self {
        Self {
            capacity,
            versions: VecDeque::new(),
            index: 0,
        }
    }

    /// Returns the capacity.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Returns whether nothing has been pushed.
    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// Returns the number of older reachable versions.
    pub fn left(&self) -> u64 {
        self.index as u64
    }

    /// Returns the number of newer reachable versions.
    pub fn right(&self) -> u64 {
        if self.is_empty() {
            0
        } else {
            (self.versions.len() - 1 - self.index) as u64
        }
    }

    /// Appends a version after the active one, dropping newer versions and
    /// the oldest one once over capacity.
    pub fn push(&mut self, data: Vec<u8>) {
        if !self.is_empty() {
            self.versions.truncate(self.index + 1);
        }
        self.versions.push_back(data);
        while self.versions.len() as u64 > self.capacity {
            self.versions.pop_front();
        }
        self.index = self.versions.len() - 1;
    }

    /// Steps back; returns `false` if there is nothing older.
    pub fn back(&mut self) -> bool {
        if self.index == 0 {
            return false;
        }
        self.index -= 1;
        true
    }

    /// Steps forward; returns `false` if there is nothing newer.
    pub fn forward(&mut self) -> bool {
        if self.right() == 0 {
            return false;
        }
        self.index += 1;
        true
    }

    fn position(&self, offset: i64) -> Option<usize> {
        let position = self.index as i64 + offset;
        if self.is_empty() || position < 0 || position >= self.versions.len() as i64 {
            None
        } else {
            Some(position as usize)
        }
    }

    /// Returns the version `offset` steps from the active one.
    pub fn pick(&self, offset: i64) -> Option<&[u8]> {
        self.position(offset)
            .map(|position| self.versions[position].as_slice())
    }

    /// Makes the version `offset` steps away active.
    pub fn reset(&mut self, offset: i64) -> Option<Vec<u8>> {
        let position = self.position(offset)?;
        self.index = position;
        Some(self.versions[position].clone())
    }

    /// Collapses history to the active version; returns `false` for an
    /// out-of-range capacity.
    pub fn set_length(&mut self, capacity: u64) -> bool {
        if !(1..=MAX_CAPACITY).contains(&capacity) {
            return false;
        }
        if let Some(active) = self.versions.get(self.index).cloned() {
            self.versions = VecDeque::from([active]);
        }
        self.index = 0;
        self.capacity = capacity;
        true
    }
}

/// Applies `op` to both `ring` and `model` and panics on any divergence.
pub fn apply_and_compare<S: SlotStore>(
    ring: &mut VersionRing<S>,
    model: &mut RingModel,
    op: &RingOp,
) {
    match op {
        RingOp::Push(data) => {
            ring.push(data).expect("push failed");
            model.push(data.clone());
        }
        RingOp::Back => {
            let expected = model.back();
            let result = ring.back();
            assert_eq!(result.is_ok(), expected, "back: {result:?}");
            if let Err(e) = result {
                assert!(matches!(e, CoreError::NavigationBounds { .. }));
            }
        }
        RingOp::Forward => {
            let expected = model.forward();
            let result = ring.forward();
            assert_eq!(result.is_ok(), expected, "forward: {result:?}");
            if let Err(e) = result {
                assert!(matches!(e, CoreError::NavigationBounds { .. }));
            }
        }
        RingOp::Pick(offset) => match (ring.pick(*offset), model.pick(*offset)) {
            (Ok(actual), Some(expected)) => assert_eq!(actual, expected, "pick({offset})"),
            (Err(CoreError::NavigationBounds { .. }), None) => {}
            (actual, expected) => panic!("pick({offset}): ring {actual:?}, model {expected:?}"),
        },
        RingOp::Reset(offset) => match (ring.reset(*offset), model.reset(*offset)) {
            (Ok(actual), Some(expected)) => assert_eq!(actual, expected, "reset({offset})"),
            (Err(CoreError::NavigationBounds { .. }), None) => {}
            (actual, expected) => panic!("reset({offset}): ring {actual:?}, model {expected:?}"),
        },
        RingOp::SetLength(capacity) => {
            let expected = model.set_length(*capacity);
            let result = ring.set_length(*capacity);
            assert_eq!(result.is_ok(), expected, "set_length({capacity}): {result:?}");
            if let Err(e) = result {
                assert!(matches!(e, CoreError::InvalidArgument { .. }));
            }
        }
    }
    assert_matches_model(ring, model);
}

/// Panics unless `ring` exposes exactly the history held by `model`.
pub fn assert_matches_model<S: SlotStore>(ring: &VersionRing<S>, model: &RingModel) {
    assert_eq!(ring.capacity(), model.capacity(), "capacity");
    assert_eq!(ring.is_empty(), model.is_empty(), "is_empty");
    assert_eq!(ring.left(), model.left(), "left");
    assert_eq!(ring.right(), model.right(), "right");
    assert!(
        ring.left() + ring.right() < ring.capacity(),
        "history exceeds capacity"
    );
    if let Err(e) = ring.metadata().check() {
        panic!("metadata invariants broken: {e}");
    }
    if ring.is_empty() {
        return;
    }

    for offset in -(ring.left() as i64)..=ring.right() as i64 {
        let expected = model.pick(offset).expect("model offset in range");
        assert_eq!(ring.pick(offset).expect("pick in range"), expected, "pick({offset})");
        ring.verify(offset).expect("fingerprint matches");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::TestRing;
    use crate::generators::*;
    use proptest::prelude::*;
    use snapring_core::{Config, InMemorySlotStore};

    fn memory_ring(capacity: u64) -> VersionRing<InMemorySlotStore> {
        VersionRing::with_store(
            InMemorySlotStore::new(),
            Config::new().default_capacity(capacity),
        )
        .unwrap()
    }

    #[test]
    fn model_push_and_navigate() {
        let mut model = RingModel::new(3);
        assert!(!model.back());

        for v in [b"a", b"b", b"c", b"d"] {
            model.push(v.to_vec());
        }
        assert_eq!(model.left(), 2);
        assert_eq!(model.pick(-2).unwrap(), b"b");
        assert!(model.pick(-3).is_none());

        assert!(model.back());
        model.push(b"e".to_vec());
        assert_eq!(model.right(), 0);
        assert_eq!(model.pick(-1).unwrap(), b"c");
    }

    #[test]
    fn model_set_length() {
        let mut model = RingModel::new(5);
        assert!(!model.set_length(0));
        assert!(model.set_length(2));
        assert!(model.is_empty());

        model.push(b"x".to_vec());
        model.push(b"y".to_vec());
        assert!(model.set_length(4));
        assert_eq!(model.left(), 0);
        assert_eq!(model.pick(0).unwrap(), b"y");
    }

    #[test]
    fn fixed_sequence_matches_model() {
        let ops = vec![
            RingOp::Push(b"1".to_vec()),
            RingOp::Push(b"2".to_vec()),
            RingOp::Push(b"3".to_vec()),
            RingOp::Back,
            RingOp::Back,
            RingOp::Back,
            RingOp::Forward,
            RingOp::Pick(1),
            RingOp::Reset(-1),
            RingOp::Push(b"4".to_vec()),
            RingOp::SetLength(2),
            RingOp::Push(b"5".to_vec()),
            RingOp::Push(b"6".to_vec()),
            RingOp::Back,
            RingOp::SetLength(0),
        ];

        let mut ring = memory_ring(3);
        let mut model = RingModel::new(3);
        for op in &ops {
            apply_and_compare(&mut ring, &mut model, op);
        }
    }

    proptest! {
        #![proptest_config(PropTestConfig::default().to_proptest_config())]

        #[test]
        fn ring_matches_model(capacity in 1u64..=6, ops in ring_ops_strategy(64)) {
            let mut ring = memory_ring(capacity);
            let mut model = RingModel::new(capacity);
            for op in &ops {
                apply_and_compare(&mut ring, &mut model, op);
            }
        }

        #[test]
        fn set_length_preserves_active_version(
            capacity in capacity_strategy(),
            versions in prop::collection::vec(version_strategy(), 1..12),
            back in 0usize..12,
        ) {
            let mut ring = memory_ring(10);
            for version in &versions {
                ring.push(version).unwrap();
            }
            for _ in 0..back.min(ring.left() as usize) {
                ring.back().unwrap();
            }
            let active = ring.pick(0).unwrap();

            ring.set_length(capacity).unwrap();
            prop_assert_eq!(ring.pick(0).unwrap(), active);
            prop_assert_eq!(ring.capacity(), capacity);
            prop_assert_eq!(ring.left(), 0);
            prop_assert_eq!(ring.right(), 0);
        }

        #[test]
        fn invalid_set_length_changes_nothing(
            capacity in invalid_capacity_strategy(),
            count in 0usize..5,
        ) {
            let mut ring = memory_ring(4);
            for i in 0..count {
                ring.push(&[i as u8]).unwrap();
            }
            let before = ring.metadata().clone();

            let result = ring.set_length(capacity);
            let rejected = matches!(result, Err(CoreError::InvalidArgument { .. }));
            prop_assert!(rejected, "expected invalid argument, got {:?}", result);
            prop_assert_eq!(ring.metadata(), &before);
        }

        #[test]
        fn pick_is_idempotent(versions in prop::collection::vec(version_strategy(), 1..6), offset in -5i64..=0) {
            let mut ring = memory_ring(8);
            for version in &versions {
                ring.push(version).unwrap();
            }
            let first = ring.pick(offset).ok();
            let second = ring.pick(offset).ok();
            prop_assert_eq!(first, second);
        }
    }

    proptest! {
        #![proptest_config(PropTestConfig::quick().to_proptest_config())]

        #[test]
        fn file_ring_matches_model_across_reopen(capacity in 1u64..=4, ops in ring_ops_strategy(24)) {
            let mut test_ring = TestRing::with_capacity(capacity);
            let mut model = RingModel::new(capacity);
            for op in &ops {
                apply_and_compare(&mut test_ring.ring, &mut model, op);
            }

            let test_ring = test_ring.reopen();
            assert_matches_model(&test_ring.ring, &model);
        }
    }
}
