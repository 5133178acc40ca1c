//! Property-based test generators using proptest.
//!
//! Provides strategies for generating random versions, capacities and
//! sequences of ring operations.

use proptest::prelude::*;
use snapring_core::MAX_CAPACITY;

/// An operation applied to a ring under test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RingOp {
    /// Push the given bytes.
    Push(Vec<u8>),
    /// Step back.
    Back,
    /// Step forward.
    Forward,
    /// Read the version at an offset.
    Pick(i64),
    /// Make the version at an offset active.
    Reset(i64),
    /// Change the capacity.
    SetLength(u64),
}

/// Strategy for generating version contents (arbitrary bytes).
pub fn version_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..256)
}

/// Strategy for generating valid capacities, biased towards small rings
/// where wrap-around happens quickly.
pub fn capacity_strategy() -> impl Strategy<Value = u64> {
    prop_oneof![
        4 => 1u64..=8,
        1 => 1u64..=MAX_CAPACITY,
    ]
}

/// Strategy for generating capacities outside the accepted range.
pub fn invalid_capacity_strategy() -> impl Strategy<Value = u64> {
    prop_oneof![Just(0u64), (MAX_CAPACITY + 1)..=u64::from(u32::MAX)]
}

/// Strategy for generating a single ring operation.
///
/// Offsets and capacities may be out of range; the ring must reject those
/// without changing state.
pub fn ring_op_strategy() -> impl Strategy<Value = RingOp> {
    prop_oneof![
        6 => prop::collection::vec(any::<u8>(), 0..16).prop_map(RingOp::Push),
        3 => Just(RingOp::Back),
        2 => Just(RingOp::Forward),
        2 => (-10i64..=10).prop_map(RingOp::Pick),
        2 => (-10i64..=10).prop_map(RingOp::Reset),
        1 => (0u64..=12).prop_map(RingOp::SetLength),
    ]
}

/// Strategy for generating sequences of ring operations.
pub fn ring_ops_strategy(max_len: usize) -> impl Strategy<Value = Vec<RingOp>> {
    prop::collection::vec(ring_op_strategy(), 0..max_len)
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a quick configuration for CI.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Creates a thorough configuration for extensive testing.
    #[must_use]
    pub fn thorough() -> Self {
        Self {
            cases: 1024,
            max_shrink_iters: 10000,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}
