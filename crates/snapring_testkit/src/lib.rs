//! # SnapRing Testkit
//!
//! Test utilities for SnapRing.
//!
//! This crate provides:
//! - Temporary-directory ring fixtures
//! - Property-based test generators using proptest
//! - A slot store that injects write failures
//! - A reference model of ring navigation for model-based tests
//!
//! ## Usage
//!
//! ```rust,ignore
//! use snapring_testkit::prelude::*;
//!
//! #[test]
//! fn test_with_ring() {
//!     with_temp_ring(|ring| {
//!         ring.push(b"v1").unwrap();
//!     });
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod faulty;
pub mod fixtures;
pub mod generators;
pub mod model;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::faulty::*;
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::model::*;
}

pub use faulty::*;
pub use fixtures::*;
pub use generators::*;
pub use model::*;
