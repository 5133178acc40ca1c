//! Test fixtures and ring helpers.
//!
//! Provides convenience functions for setting up rings in temporary
//! directories and common test scenarios.

use snapring_core::{Config, FileSlotStore, VersionRing};
use std::path::Path;
use tempfile::TempDir;

/// A file-backed test ring with automatic cleanup.
pub struct TestRing {
    /// The ring instance.
    pub ring: VersionRing<FileSlotStore>,
    /// The temporary directory (kept alive to prevent cleanup).
    temp_dir: TempDir,
}

impl TestRing {
    /// Creates a fresh ring with the default capacity.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates a fresh ring with the given capacity.
    pub fn with_capacity(capacity: u64) -> Self {
        Self::with_config(Config::new().default_capacity(capacity))
    }

    /// Creates a fresh ring with explicit configuration.
    pub fn with_config(config: Config) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let ring = VersionRing::open_with_config(temp_dir.path(), config)
            .expect("Failed to open test ring");
        Self { ring, temp_dir }
    }

    /// Returns the ring directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Drops the ring handle and opens the directory again.
    pub fn reopen(self) -> Self {
        let Self { ring, temp_dir } = self;
        drop(ring);
        let ring = VersionRing::open(temp_dir.path()).expect("Failed to reopen test ring");
        Self { ring, temp_dir }
    }

    /// Returns the raw bytes of a slot file.
    pub fn slot_file(&self, slot: u64) -> Option<Vec<u8>> {
        std::fs::read(self.path().join(format!("{slot}.json"))).ok()
    }
}

impl Default for TestRing {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Deref for TestRing {
    type Target = VersionRing<FileSlotStore>;

    fn deref(&self) -> &Self::Target {
        &self.ring
    }
}

impl std::ops::DerefMut for TestRing {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.ring
    }
}

/// Runs a test with a fresh ring in a temporary directory.
///
/// # Example
///
/// ```rust,ignore
/// use snapring_testkit::with_temp_ring;
///
/// #[test]
/// fn my_test() {
///     with_temp_ring(|ring| {
///         ring.push(b"draft").unwrap();
///     });
/// }
/// ```
pub fn with_temp_ring<F, R>(f: F) -> R
where
    F: FnOnce(&mut VersionRing<FileSlotStore>) -> R,
{
    let mut test_ring = TestRing::new();
    f(&mut test_ring.ring)
}

/// Test scenario helpers.
pub mod scenarios {
    use super::*;

    /// Creates a ring of `capacity` holding `count` pushed versions.
    ///
    /// Version `i` has the bytes `version-i`.
    pub fn populated_ring(capacity: u64, count: usize) -> TestRing {
        let mut test_ring = TestRing::with_capacity(capacity);
        for i in 0..count {
            test_ring
                .push(format!("version-{i}").as_bytes())
                .expect("Failed to push version");
        }
        test_ring
    }

    /// Creates a ring with `count` versions, stepped back `steps` times.
    pub fn rewound_ring(capacity: u64, count: usize, steps: usize) -> TestRing {
        let mut test_ring = populated_ring(capacity, count);
        for _ in 0..steps {
            test_ring.back().expect("Failed to step back");
        }
        test_ring
    }
}

#[cfg(test)]
mod tests {
    use super::scenarios::*;
    use super::*;
    use snapring_core::{CoreError, Fingerprint};

    #[test]
    fn test_ring_starts_empty() {
        let test_ring = TestRing::new();
        assert!(test_ring.is_empty());
        assert_eq!(test_ring.capacity(), 10);
        assert!(test_ring.slot_file(0).is_some());
    }

    #[test]
    fn with_temp_ring_runs_closure() {
        let current = with_temp_ring(|ring| {
            ring.push(b"x").unwrap();
            ring.current()
        });
        assert_eq!(current, 1);
    }

    #[test]
    fn reopen_preserves_state() {
        let mut test_ring = populated_ring(10, 2);
        test_ring.back().unwrap();
        let id = test_ring.instance_id().to_string();

        let test_ring = test_ring.reopen();
        assert_eq!(test_ring.instance_id(), id);
        assert_eq!(test_ring.pick(0).unwrap(), b"version-0");
        assert_eq!(test_ring.pick(1).unwrap(), b"version-1");
    }

    #[test]
    fn reopen_round_trip_fingerprint() {
        let mut test_ring = TestRing::new();
        test_ring.push(b"payload").unwrap();

        let test_ring = test_ring.reopen();
        let slot = test_ring.current();
        assert_eq!(test_ring.pick(0).unwrap(), b"payload");
        assert_eq!(
            test_ring.entry(slot).unwrap().sha1,
            Fingerprint::of(b"payload")
        );
    }

    #[test]
    fn set_length_round_trip_on_disk() {
        let mut test_ring = rewound_ring(10, 5, 2);
        let active = test_ring.pick(0).unwrap();

        test_ring.set_length(3).unwrap();
        let test_ring = test_ring.reopen();

        assert_eq!(test_ring.capacity(), 3);
        assert_eq!(test_ring.pick(0).unwrap(), active);
        assert_eq!(test_ring.slot_file(1).unwrap(), active);
    }

    #[test]
    fn wrapped_slot_reflects_latest_push() {
        let test_ring = populated_ring(2, 3);
        assert_eq!(test_ring.slot_file(1).unwrap(), b"version-2");
        assert_eq!(
            test_ring.entry(1).unwrap().sha1,
            Fingerprint::of(b"version-2")
        );
    }

    #[test]
    fn corrupt_metadata_blocks_reopen() {
        let test_ring = populated_ring(4, 2);
        std::fs::write(test_ring.path().join("0.json"), b"[]").unwrap();

        let result = VersionRing::open(test_ring.path());
        assert!(matches!(result, Err(CoreError::Json(_))));
    }
}
