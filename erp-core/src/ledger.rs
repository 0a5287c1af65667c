//! Simulated append-only ledger
//!
//! Entries are prepended: index 0 is the head (newest). Each entry's
//! `previous_hash` is the head hash at the moment it was appended, so the
//! chain is referential only. Hashes are random and nothing is recomputed
//! on lookup, which means tampering cannot be detected here.
//!
//! # Example
//!
//! ```
//! use erp_core::{Ledger, RecordType, Verification};
//! use rand::SeedableRng;
//!
//! let mut ledger = Ledger::new(rand::rngs::StdRng::seed_from_u64(1));
//! let hash = ledger
//!     .append(RecordType::Order, "ORD00001", serde_json::Map::new())
//!     .hash
//!     .clone();
//!
//! match ledger.search("ord00001") {
//!     Verification::Found(entry) => assert_eq!(entry.hash, hash),
//!     other => panic!("unexpected {:?}", other),
//! }
//! ```

use crate::ids::{self, ZERO_HASH};
use crate::types::{LedgerEntry, RecordType};
use chrono::Utc;
use rand::rngs::StdRng;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::VecDeque;

/// Verdict shown for a found, verified record
pub const VERDICT_VERIFIED: &str = "Record verified and integrity confirmed";
/// Verdict shown for a found record whose flag is false
pub const VERDICT_TAMPERED: &str =
    "Warning: Record integrity check failed - possible tampering detected";
/// Verdict shown when no entry references the record
pub const VERDICT_NOT_FOUND: &str = "Record not found in blockchain";

/// Outcome of a free-text verification search
#[derive(Debug, Clone, Copy)]
pub enum Verification<'a> {
    /// Blank query; nothing was searched
    NotSearched,
    /// No entry matched
    NotFound,
    /// First (newest) matching entry
    Found(&'a LedgerEntry),
}

impl<'a> Verification<'a> {
    /// Matched entry, if any
    pub fn entry(&self) -> Option<&'a LedgerEntry> {
        match self {
            Verification::Found(entry) => Some(entry),
            _ => None,
        }
    }

    /// True if an entry matched
    pub fn is_found(&self) -> bool {
        matches!(self, Verification::Found(_))
    }
}

/// Outcome of an exact record-ID verification
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordVerdict {
    /// Whether any entry references the record
    pub found: bool,
    /// Newest entry for the record
    pub transaction: Option<LedgerEntry>,
    /// Message shown to the user
    pub verification: &'static str,
}

/// In-memory ledger
#[derive(Debug)]
pub struct Ledger {
    /// Newest first
    entries: VecDeque<LedgerEntry>,

    /// Source for entry IDs and hashes
    rng: StdRng,
}

impl Ledger {
    /// Empty ledger
    pub fn new(rng: StdRng) -> Self {
        Self {
            entries: VecDeque::new(),
            rng,
        }
    }

    /// Ledger pre-populated with entries ordered newest first
    pub fn from_entries(entries: Vec<LedgerEntry>, rng: StdRng) -> Self {
        Self {
            entries: entries.into(),
            rng,
        }
    }

    /// Append a new entry at the head
    ///
    /// The hash is drawn at random; `previous_hash` is the current head's
    /// hash or [`ZERO_HASH`] when empty. Cannot fail.
    pub fn append(
        &mut self,
        record_type: RecordType,
        record_id: impl Into<String>,
        data: Map<String, Value>,
    ) -> &LedgerEntry {
        let previous_hash = self
            .head()
            .map(|entry| entry.hash.clone())
            .unwrap_or_else(|| ZERO_HASH.to_string());

        let entry = LedgerEntry {
            id: ids::prefixed_id("BLK", &mut self.rng),
            hash: ids::generate_hash(&mut self.rng),
            record_type,
            record_id: record_id.into(),
            timestamp: Utc::now(),
            previous_hash,
            verified: true,
            data,
        };

        tracing::debug!(
            record_type = %entry.record_type,
            record_id = %entry.record_id,
            hash = %entry.hash,
            "Ledger entry appended"
        );

        self.entries.push_front(entry);
        &self.entries[0]
    }

    /// Current head (newest entry)
    pub fn head(&self) -> Option<&LedgerEntry> {
        self.entries.front()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing was appended yet
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries, newest first
    pub fn entries(&self) -> impl Iterator<Item = &LedgerEntry> + '_ {
        self.entries.iter()
    }

    /// Newest `limit` entries
    pub fn recent(&self, limit: usize) -> Vec<&LedgerEntry> {
        self.entries.iter().take(limit).collect()
    }

    /// All entries that reference a record, newest first
    pub fn history(&self, record_id: &str) -> Vec<&LedgerEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.record_id == record_id)
            .collect()
    }

    /// Verification lookup by record ID or hash fragment
    ///
    /// Case-insensitive substring match over `record_id` and `hash`;
    /// returns the first match scanning from the head.
    pub fn search(&self, query: &str) -> Verification<'_> {
        let query = query.trim();
        if query.is_empty() {
            return Verification::NotSearched;
        }

        let needle = query.to_lowercase();
        self.entries
            .iter()
            .find(|entry| {
                entry.record_id.to_lowercase().contains(&needle)
                    || entry.hash.to_lowercase().contains(&needle)
            })
            .map_or(Verification::NotFound, Verification::Found)
    }

    /// Exact record-ID verification with the user-facing verdict
    pub fn verify_record(&self, record_id: &str) -> RecordVerdict {
        match self.entries.iter().find(|entry| entry.record_id == record_id) {
            Some(entry) => RecordVerdict {
                found: true,
                transaction: Some(entry.clone()),
                verification: if entry.verified {
                    VERDICT_VERIFIED
                } else {
                    VERDICT_TAMPERED
                },
            },
            None => RecordVerdict {
                found: false,
                transaction: None,
                verification: VERDICT_NOT_FOUND,
            },
        }
    }

    /// Check that each entry points at the hash of the entry appended before it
    pub fn is_linked(&self) -> bool {
        let linked = self
            .entries
            .iter()
            .zip(self.entries.iter().skip(1))
            .all(|(newer, older)| newer.previous_hash == older.hash);

        let genesis_ok = self
            .entries
            .back()
            .map_or(true, |oldest| oldest.previous_hash == ZERO_HASH);

        linked && genesis_ok
    }
}

/// Build a ledger payload from key/value pairs
pub fn payload<I, K>(fields: I) -> Map<String, Value>
where
    I: IntoIterator<Item = (K, Value)>,
    K: Into<String>,
{
    fields.into_iter().map(|(k, v)| (k.into(), v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use serde_json::json;

    fn create_test_ledger() -> Ledger {
        Ledger::new(StdRng::seed_from_u64(42))
    }

    #[test]
    fn test_first_append_uses_zero_hash() {
        let mut ledger = create_test_ledger();
        let entry = ledger.append(RecordType::Order, "ORD1", Map::new());

        assert_eq!(entry.previous_hash, ZERO_HASH);
        assert!(entry.verified);
        assert!(ids::is_well_formed_hash(&entry.hash));
        assert!(entry.id.starts_with("BLK"));
    }

    #[test]
    fn test_append_links_to_previous_head() {
        let mut ledger = create_test_ledger();
        let first = ledger.append(RecordType::Order, "ORD1", Map::new()).hash.clone();
        let second = ledger
            .append(RecordType::Invoice, "INV1", Map::new())
            .clone();

        assert_eq!(second.previous_hash, first);
        assert_eq!(ledger.head().unwrap().hash, second.hash);
        assert_eq!(ledger.len(), 2);
        assert!(ledger.is_linked());
    }

    #[test]
    fn test_search_is_case_insensitive_and_newest_first() {
        let mut ledger = create_test_ledger();
        ledger.append(RecordType::Order, "ORD00001", payload([("status", json!("pending"))]));
        let newer = ledger
            .append(
                RecordType::Order,
                "ORD00001",
                payload([("status", json!("shipped"))]),
            )
            .hash
            .clone();

        let found = ledger.search("  ord00001 ");
        assert_eq!(found.entry().unwrap().hash, newer);

        let by_hash = ledger.search(&newer[2..12].to_uppercase());
        assert_eq!(by_hash.entry().unwrap().hash, newer);
    }

    #[test]
    fn test_search_blank_and_missing() {
        let mut ledger = create_test_ledger();
        ledger.append(RecordType::Inventory, "PRD001", Map::new());

        assert!(matches!(ledger.search("   "), Verification::NotSearched));
        assert!(matches!(ledger.search("INV999"), Verification::NotFound));
    }

    #[test]
    fn test_verify_record_verdicts() {
        let mut ledger = create_test_ledger();
        ledger.append(RecordType::Invoice, "INV1", Map::new());

        let verdict = ledger.verify_record("INV1");
        assert!(verdict.found);
        assert_eq!(verdict.verification, VERDICT_VERIFIED);

        let missing = ledger.verify_record("INV2");
        assert!(!missing.found);
        assert_eq!(missing.verification, VERDICT_NOT_FOUND);

        let mut flagged = ledger.head().unwrap().clone();
        flagged.verified = false;
        flagged.record_id = "INV3".to_string();
        let tampered = Ledger::from_entries(vec![flagged], StdRng::seed_from_u64(1));
        assert_eq!(tampered.verify_record("INV3").verification, VERDICT_TAMPERED);
    }

    #[test]
    fn test_history_and_recent() {
        let mut ledger = create_test_ledger();
        for i in 0..5 {
            ledger.append(RecordType::Order, format!("ORD{}", i % 2), Map::new());
        }

        assert_eq!(ledger.history("ORD0").len(), 3);
        assert_eq!(ledger.history("ORD1").len(), 2);
        assert_eq!(ledger.recent(3).len(), 3);
        assert_eq!(ledger.recent(10).len(), 5);
    }
}
