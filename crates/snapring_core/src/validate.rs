//! Required-field validation for pushed objects and metadata.
//!
//! Types opt in by implementing [`Validate`] and listing their required
//! fields against a [`Violations`] collector:
//!
//! ```rust
//! use snapring_core::{Validate, Violations};
//!
//! struct Draft {
//!     title: String,
//!     words: u32,
//! }
//!
//! impl Validate for Draft {
//!     fn validate(&self, v: &mut Violations) {
//!         v.require("title", &self.title).require("words", &self.words);
//!     }
//! }
//!
//! let draft = Draft { title: String::new(), words: 3 };
//! assert!(draft.check().is_err());
//! ```

use crate::error::{CoreError, CoreResult};
use chrono::{DateTime, TimeZone};
use std::collections::{BTreeMap, HashMap};

/// A value that can be absent.
///
/// A required field is violated when its value is the zero value of its
/// type: an empty string or collection, zero, `false` or `None`.
pub trait Required {
    /// Returns whether the value counts as present.
    fn is_present(&self) -> bool;
}

impl Required for str {
    fn is_present(&self) -> bool {
        !self.is_empty()
    }
}

impl Required for String {
    fn is_present(&self) -> bool {
        !self.is_empty()
    }
}

impl Required for bool {
    fn is_present(&self) -> bool {
        *self
    }
}

macro_rules! impl_required_for_numbers {
    ($($ty:ty),*) => {
        $(
            impl Required for $ty {
                #[allow(clippy::float_cmp)]
                fn is_present(&self) -> bool {
                    *self != <$ty>::default()
                }
            }
        )*
    };
}

impl_required_for_numbers!(
    u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64
);

impl<T> Required for Option<T> {
    fn is_present(&self) -> bool {
        self.is_some()
    }
}

impl<T> Required for Vec<T> {
    fn is_present(&self) -> bool {
        !self.is_empty()
    }
}

impl<T> Required for [T] {
    fn is_present(&self) -> bool {
        !self.is_empty()
    }
}

impl<K, V> Required for BTreeMap<K, V> {
    fn is_present(&self) -> bool {
        !self.is_empty()
    }
}

impl<K, V, S> Required for HashMap<K, V, S> {
    fn is_present(&self) -> bool {
        !self.is_empty()
    }
}

impl<Tz: TimeZone> Required for DateTime<Tz> {
    fn is_present(&self) -> bool {
        self.timestamp() != 0 || self.timestamp_subsec_nanos() != 0
    }
}

impl<T: Required + ?Sized> Required for &T {
    fn is_present(&self) -> bool {
        (**self).is_present()
    }
}

/// Collects violated constraints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Violations {
    prefix: String,
    items: Vec<String>,
}

impl Violations {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a violation if `value` is absent.
    pub fn require<T: Required + ?Sized>(&mut self, field: &str, value: &T) -> &mut Self {
        if !value.is_present() {
            self.items
                .push(format!("{}{field}: required field is missing", self.prefix));
        }
        self
    }

    /// Records `message` unless `condition` holds.
    pub fn ensure(&mut self, condition: bool, message: impl AsRef<str>) -> &mut Self {
        if !condition {
            self.items.push(format!("{}{}", self.prefix, message.as_ref()));
        }
        self
    }

    /// Validates a nested value, prefixing its field names with `field.`.
    pub fn nested<T: Validate + ?Sized>(&mut self, field: &str, value: &T) -> &mut Self {
        let outer = std::mem::take(&mut self.prefix);
        self.prefix = format!("{outer}{field}.");
        value.validate(self);
        self.prefix = outer;
        self
    }

    /// Returns whether no constraint was violated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the recorded violations.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.items
    }

    /// Converts into `Ok(())` or [`CoreError::ValidationFailed`].
    ///
    /// # Errors
    ///
    /// Returns an error if any violation was recorded.
    pub fn into_result(self) -> CoreResult<()> {
        if self.items.is_empty() {
            Ok(())
        } else {
            Err(CoreError::ValidationFailed {
                violations: self.items,
            })
        }
    }
}

/// A type with required-field constraints.
pub trait Validate {
    /// Records every violated constraint of `self` into `v`.
    fn validate(&self, v: &mut Violations);

    /// Runs [`Validate::validate`] against a fresh collector.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ValidationFailed`] listing every violation.
    fn check(&self) -> CoreResult<()> {
        let mut violations = Violations::new();
        self.validate(&mut violations);
        violations.into_result()
    }
}

impl<T: Validate + ?Sized> Validate for &T {
    fn validate(&self, v: &mut Violations) {
        (**self).validate(v);
    }
}
