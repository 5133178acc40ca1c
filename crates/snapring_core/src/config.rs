//! Ring configuration.

use crate::slot::DEFAULT_CAPACITY;

/// Configuration for opening a version ring.
#[derive(Debug, Clone)]
pub struct Config {
    /// Whether to create the directory and a fresh ring if none exists.
    pub create_if_missing: bool,

    /// Capacity given to a freshly initialized ring.
    pub default_capacity: u64,

    /// Whether to fsync each slot file after writing it.
    pub sync_writes: bool,

    /// Whether to hold an exclusive advisory lock on the directory.
    pub lock_directory: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            create_if_missing: true,
            default_capacity: DEFAULT_CAPACITY,
            sync_writes: true,
            lock_directory: false,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether to create the ring if missing.
    #[must_use]
    pub const fn create_if_missing(mut self, value: bool) -> Self {
        self.create_if_missing = value;
        self
    }

    /// Sets the capacity of freshly initialized rings.
    #[must_use]
    pub const fn default_capacity(mut self, capacity: u64) -> Self {
        self.default_capacity = capacity;
        self
    }

    /// Sets whether to fsync slot files after writing.
    #[must_use]
    pub const fn sync_writes(mut self, value: bool) -> Self {
        self.sync_writes = value;
        self
    }

    /// Sets whether to lock the directory for the ring's lifetime.
    #[must_use]
    pub const fn lock_directory(mut self, value: bool) -> Self {
        self.lock_directory = value;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert!(config.create_if_missing);
        assert_eq!(config.default_capacity, 10);
        assert!(config.sync_writes);
        assert!(!config.lock_directory);
    }

    #[test]
    fn builder_pattern() {
        let config = Config::new()
            .create_if_missing(false)
            .default_capacity(3)
            .sync_writes(false)
            .lock_directory(true);

        assert!(!config.create_if_missing);
        assert_eq!(config.default_capacity, 3);
        assert!(!config.sync_writes);
        assert!(config.lock_directory);
    }
}
