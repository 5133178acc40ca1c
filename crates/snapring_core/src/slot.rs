//! Slot arithmetic for the version ring.
//!
//! Slot 0 is reserved for metadata, so content slots form a 1-indexed ring
//! `1..=capacity`. Every step from one content slot to another goes through
//! [`wrap`], which never yields slot 0.

use crate::error::{CoreError, CoreResult};
use snapring_storage::SlotId;

/// Slot holding the metadata record. Never holds content.
pub const METADATA_SLOT: SlotId = 0;

/// Capacity of a freshly initialized ring.
pub const DEFAULT_CAPACITY: u64 = 10;

/// Largest accepted capacity.
pub const MAX_CAPACITY: u64 = 10_000;

/// Maps any position onto a content slot in `[1, capacity]`.
///
/// Computes `((position - 1) mod capacity) + 1` with a non-negative modulus,
/// so `0` maps to `capacity` and `capacity + 1` maps to `1`.
///
/// `capacity` must be at least 1.
#[must_use]
pub fn wrap(position: i64, capacity: u64) -> SlotId {
    debug_assert!(capacity >= 1, "capacity must be at least 1");
    let capacity = capacity as i64;
    ((position - 1).rem_euclid(capacity) + 1) as SlotId
}

/// Returns the content slot `offset` steps away from `slot`.
#[must_use]
pub fn step(slot: SlotId, offset: i64, capacity: u64) -> SlotId {
    wrap(slot as i64 + offset, capacity)
}

/// Checks that `capacity` is within `1..=MAX_CAPACITY`.
///
/// # Errors
///
/// Returns [`CoreError::InvalidArgument`] otherwise.
pub fn check_capacity(capacity: u64) -> CoreResult<()> {
    if capacity < 1 {
        return Err(CoreError::invalid_argument(
            "history length should be at least 1",
        ));
    }
    if capacity > MAX_CAPACITY {
        return Err(CoreError::invalid_argument(format!(
            "history length is too long: {capacity} > {MAX_CAPACITY}"
        )));
    }
    Ok(())
}

/// Lists the slots reachable from `current`, oldest first.
///
/// Returns an empty list when `current` is the metadata slot, i.e. nothing
/// has been pushed.
#[must_use]
pub fn reachable(current: SlotId, left: u64, right: u64, capacity: u64) -> Vec<SlotId> {
    if current == METADATA_SLOT {
        return Vec::new();
    }
    (-(left as i64)..=right as i64)
        .map(|offset| step(current, offset, capacity))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn wrap_boundaries() {
        assert_eq!(wrap(1, 10), 1);
        assert_eq!(wrap(10, 10), 10);
        assert_eq!(wrap(11, 10), 1);
        assert_eq!(wrap(0, 10), 10);
        assert_eq!(wrap(-1, 10), 9);
        assert_eq!(wrap(21, 10), 1);
    }

    #[test]
    fn wrap_capacity_one() {
        for position in -3..5 {
            assert_eq!(wrap(position, 1), 1);
        }
    }

    #[test]
    fn step_from_empty_ring_lands_on_first_slot() {
        assert_eq!(step(METADATA_SLOT, 1, 10), 1);
        assert_eq!(step(METADATA_SLOT, 1, 1), 1);
    }

    #[test]
    fn step_wraps_both_ways() {
        assert_eq!(step(10, 1, 10), 1);
        assert_eq!(step(1, -1, 10), 10);
        assert_eq!(step(3, 0, 10), 3);
    }

    #[test]
    fn capacity_bounds() {
        assert!(check_capacity(1).is_ok());
        assert!(check_capacity(MAX_CAPACITY).is_ok());
        assert!(matches!(
            check_capacity(0),
            Err(CoreError::InvalidArgument { .. })
        ));
        assert!(matches!(
            check_capacity(MAX_CAPACITY + 1),
            Err(CoreError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn reachable_window() {
        assert!(reachable(METADATA_SLOT, 0, 0, 5).is_empty());
        assert_eq!(reachable(1, 0, 0, 5), vec![1]);
        assert_eq!(reachable(2, 2, 1, 5), vec![5, 1, 2, 3]);
    }

    fn window_strategy() -> impl Strategy<Value = (u64, SlotId, u64, u64)> {
        (1u64..=40)
            .prop_flat_map(|capacity| (Just(capacity), 1..=capacity, 0..capacity))
            .prop_flat_map(|(capacity, current, left)| {
                (Just(capacity), Just(current), Just(left), 0..capacity - left)
            })
    }

    proptest! {
        #[test]
        fn wrap_never_yields_metadata_slot(position in -100_000i64..100_000, capacity in 1u64..=MAX_CAPACITY) {
            let slot = wrap(position, capacity);
            prop_assert!(slot >= 1);
            prop_assert!(slot <= capacity);
        }

        #[test]
        fn step_round_trips(slot in 1u64..=50, offset in -200i64..200, capacity in 50u64..=60) {
            let there = step(slot, offset, capacity);
            prop_assert_eq!(step(there, -offset, capacity), slot);
        }

        #[test]
        fn reachable_slots_are_distinct((capacity, current, left, right) in window_strategy()) {
            let mut slots = reachable(current, left, right, capacity);
            let len = slots.len();
            slots.sort_unstable();
            slots.dedup();
            prop_assert_eq!(slots.len(), len);
        }
    }
}
