//! Per-slot fingerprint and timestamp ledger.

use crate::fingerprint::Fingerprint;
use crate::validate::{Validate, Violations};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use snapring_storage::SlotId;
use std::collections::BTreeMap;

/// Fingerprint and creation time of the version held in one slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// SHA-1 of the slot's bytes.
    pub sha1: Fingerprint,
    /// When the version was pushed.
    pub time: DateTime<Utc>,
}

impl LedgerEntry {
    /// Records `data` as pushed now.
    #[must_use]
    pub fn record(data: &[u8]) -> Self {
        Self {
            sha1: Fingerprint::of(data),
            time: Utc::now(),
        }
    }
}

impl Validate for LedgerEntry {
    fn validate(&self, v: &mut Violations) {
        v.require("sha1", self.sha1.as_str()).require("time", &self.time);
        if !self.sha1.as_str().is_empty() {
            v.ensure(self.sha1.is_well_formed(), "sha1: not a SHA-1 hex digest");
        }
    }
}

/// Map from slot to the entry describing its version.
///
/// Serialized as a JSON object keyed by the slot number in decimal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger(BTreeMap<SlotId, LedgerEntry>);

impl Ledger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the entry for `slot`.
    #[must_use]
    pub fn get(&self, slot: SlotId) -> Option<&LedgerEntry> {
        self.0.get(&slot)
    }

    /// Sets the entry for `slot`, returning the one it replaced.
    pub fn insert(&mut self, slot: SlotId, entry: LedgerEntry) -> Option<LedgerEntry> {
        self.0.insert(slot, entry)
    }

    /// Keeps only the entries whose slot satisfies `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(SlotId) -> bool) {
        self.0.retain(|slot, _| keep(*slot));
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether the ledger has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates entries in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (SlotId, &LedgerEntry)> {
        self.0.iter().map(|(slot, entry)| (*slot, entry))
    }
}

impl Validate for Ledger {
    fn validate(&self, v: &mut Violations) {
        for (slot, entry) in self.iter() {
            v.nested(&slot.to_string(), entry);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_fingerprints_bytes() {
        let entry = LedgerEntry::record(b"abc");
        assert_eq!(entry.sha1, Fingerprint::of(b"abc"));
        assert!(entry.check().is_ok());
    }

    #[test]
    fn insert_replaces_entry() {
        let mut ledger = Ledger::new();
        assert!(ledger.insert(1, LedgerEntry::record(b"one")).is_none());
        let old = ledger.insert(1, LedgerEntry::record(b"uno")).unwrap();

        assert_eq!(old.sha1, Fingerprint::of(b"one"));
        assert_eq!(ledger.get(1).unwrap().sha1, Fingerprint::of(b"uno"));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn retain_drops_entries() {
        let mut ledger = Ledger::new();
        for slot in 1..=4 {
            ledger.insert(slot, LedgerEntry::record(&[slot as u8]));
        }
        ledger.retain(|slot| slot % 2 == 0);
        assert_eq!(ledger.iter().map(|(s, _)| s).collect::<Vec<_>>(), vec![2, 4]);
    }

    #[test]
    fn json_keys_are_decimal_strings() {
        let mut ledger = Ledger::new();
        ledger.insert(10, LedgerEntry::record(b"ten"));
        ledger.insert(2, LedgerEntry::record(b"two"));

        let value = serde_json::to_value(&ledger).unwrap();
        let object = value.as_object().unwrap();
        assert!(object.contains_key("2"));
        assert!(object.contains_key("10"));
        assert!(object["2"]["sha1"].is_string());
        assert!(object["2"]["time"].is_string());

        let decoded: Ledger = serde_json::from_value(value).unwrap();
        assert_eq!(decoded, ledger);
    }

    #[test]
    fn decodes_offset_timestamps() {
        let json = r#"{"3":{"sha1":"a9993e364706816aba3e25717850c26c9cd0d89d","time":"2024-05-01T10:20:30.123456789+08:00"}}"#;
        let ledger: Ledger = serde_json::from_str(json).unwrap();
        let entry = ledger.get(3).unwrap();
        assert_eq!(entry.time.to_rfc3339(), "2024-05-01T02:20:30.123456789+00:00");
    }

    #[test]
    fn non_numeric_key_is_rejected() {
        let json = r#"{"x":{"sha1":"a9993e364706816aba3e25717850c26c9cd0d89d","time":"2024-05-01T10:20:30Z"}}"#;
        assert!(serde_json::from_str::<Ledger>(json).is_err());
    }

    #[test]
    fn malformed_entry_fails_validation() {
        let mut ledger = Ledger::new();
        ledger.insert(
            1,
            LedgerEntry {
                sha1: serde_json::from_str("\"nothex\"").unwrap(),
                time: Utc::now(),
            },
        );
        assert!(ledger.check().is_err());
    }
}
