//! Audit trail
//!
//! Human-readable history of every mutation, kept separately from the
//! ledger. Entries are prepended so index 0 is the newest.

use crate::ids;
use crate::types::{AuditChange, AuditLogEntry, User};
use crate::{Error, Result};
use chrono::Utc;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Who performed an action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// User ID
    pub id: String,
    /// Display name
    pub name: String,
}

impl Actor {
    /// Actor used when nobody is logged in
    pub fn system() -> Self {
        Self {
            id: "USR001".to_string(),
            name: "System".to_string(),
        }
    }
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
        }
    }
}

/// Coarse action category, used for badges in the audit table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    /// Create / Add
    Create,
    /// Update / Change
    Update,
    /// Delete / Remove
    Delete,
    /// Anything else
    Other,
}

impl ActionKind {
    /// Classify an action label
    pub fn classify(action: &str) -> Self {
        if action.contains("Create") || action.contains("Add") {
            ActionKind::Create
        } else if action.contains("Update") || action.contains("Change") {
            ActionKind::Update
        } else if action.contains("Delete") || action.contains("Remove") {
            ActionKind::Delete
        } else {
            ActionKind::Other
        }
    }
}

/// One audit record to append
#[derive(Debug, Clone)]
pub struct AuditRecord<'a> {
    /// Action label
    pub action: &'a str,
    /// Entity type label
    pub entity_type: &'a str,
    /// Entity ID
    pub entity_id: &'a str,
    /// Before/after values
    pub changes: Option<AuditChange>,
    /// Ledger hash written by the same action
    pub ledger_hash: Option<String>,
}

impl<'a> AuditRecord<'a> {
    /// Record without changes or ledger hash
    pub fn new(action: &'a str, entity_type: &'a str, entity_id: &'a str) -> Self {
        Self {
            action,
            entity_type,
            entity_id,
            changes: None,
            ledger_hash: None,
        }
    }

    /// Attach before/after values
    pub fn with_change(mut self, before: impl Into<String>, after: impl Into<String>) -> Self {
        self.changes = Some(AuditChange {
            before: before.into(),
            after: after.into(),
        });
        self
    }

    /// Attach the ledger hash
    pub fn with_ledger_hash(mut self, hash: impl Into<String>) -> Self {
        self.ledger_hash = Some(hash.into());
        self
    }
}

/// Audit log
#[derive(Debug)]
pub struct AuditLog {
    entries: VecDeque<AuditLogEntry>,
    rng: StdRng,
}

impl AuditLog {
    /// Empty log
    pub fn new(rng: StdRng) -> Self {
        Self {
            entries: VecDeque::new(),
            rng,
        }
    }

    /// Log pre-populated with entries ordered newest first
    pub fn from_entries(entries: Vec<AuditLogEntry>, rng: StdRng) -> Self {
        Self {
            entries: entries.into(),
            rng,
        }
    }

    /// Prepend an entry
    ///
    /// Records without a ledger hash get a fresh one, so every runtime entry
    /// carries a hash.
    pub fn append(&mut self, record: AuditRecord<'_>, actor: &Actor) -> &AuditLogEntry {
        let blockchain_hash = record
            .ledger_hash
            .unwrap_or_else(|| ids::generate_hash(&mut self.rng));
        let entry = AuditLogEntry {
            id: ids::prefixed_id("AUD", &mut self.rng),
            action: record.action.to_string(),
            entity_type: record.entity_type.to_string(),
            entity_id: record.entity_id.to_string(),
            user_id: actor.id.clone(),
            user_name: actor.name.clone(),
            timestamp: Utc::now(),
            details: format!(
                "{} - {} {}",
                record.action, record.entity_type, record.entity_id
            ),
            ip_address: None,
            changes: record.changes,
            blockchain_hash: Some(blockchain_hash),
        };

        tracing::info!(
            action = %entry.action,
            entity_type = %entry.entity_type,
            entity_id = %entry.entity_id,
            actor = %entry.user_name,
            "Audit entry recorded"
        );

        self.entries.push_front(entry);
        &self.entries[0]
    }

    /// Entry by ID
    pub fn get(&self, id: &str) -> Option<&AuditLogEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Entries, newest first
    pub fn entries(&self) -> impl Iterator<Item = &AuditLogEntry> + '_ {
        self.entries.iter()
    }

    /// Entries for one entity, newest first
    pub fn for_entity(&self, entity_id: &str) -> Vec<&AuditLogEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.entity_id == entity_id)
            .collect()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Prefix check on the attached ledger hash
    ///
    /// Seeded entries without a hash report `false`.
    pub fn verify_entry(&self, id: &str) -> Result<bool> {
        self.get(id)
            .map(AuditLogEntry::is_chain_verified)
            .ok_or_else(|| Error::AuditEntryNotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn create_test_log() -> AuditLog {
        AuditLog::new(StdRng::seed_from_u64(3))
    }

    #[test]
    fn test_append_formats_details() {
        let mut log = create_test_log();
        let entry = log.append(
            AuditRecord::new("Created order", "Order", "ORD1").with_ledger_hash("0xabc"),
            &Actor::system(),
        );

        assert_eq!(entry.details, "Created order - Order ORD1");
        assert_eq!(entry.user_id, "USR001");
        assert_eq!(entry.user_name, "System");
        assert!(entry.id.starts_with("AUD"));
        assert_eq!(entry.blockchain_hash.as_deref(), Some("0xabc"));
    }

    #[test]
    fn test_newest_first() {
        let mut log = create_test_log();
        log.append(AuditRecord::new("Added customer", "Customer", "CUS1"), &Actor::system());
        log.append(
            AuditRecord::new("Updated customer status", "Customer", "CUS1")
                .with_change("lead", "prospect"),
            &Actor::system(),
        );

        let newest = log.entries().next().unwrap();
        assert_eq!(newest.action, "Updated customer status");
        assert_eq!(newest.changes.as_ref().unwrap().after, "prospect");
        assert_eq!(log.for_entity("CUS1").len(), 2);
    }

    #[test]
    fn test_verify_entry() {
        let mut log = create_test_log();
        let with_hash = log
            .append(
                AuditRecord::new("Generated invoice", "Invoice", "INV1").with_ledger_hash("0x12"),
                &Actor::system(),
            )
            .id
            .clone();
        let generated = log
            .append(AuditRecord::new("Added customer", "Customer", "CUS1"), &Actor::system())
            .clone();
        assert!(log.verify_entry(&with_hash).unwrap());

        let mut seeded = generated.clone();
        seeded.id = "AUDSEEDED".to_string();
        seeded.blockchain_hash = None;
        let log = AuditLog::from_entries(
            vec![seeded, generated.clone()],
            StdRng::seed_from_u64(4),
        );

        assert!(generated.blockchain_hash.as_deref().is_some_and(|h| h.starts_with("0x")));
        assert!(log.verify_entry(&generated.id).unwrap());
        assert!(!log.verify_entry("AUDSEEDED").unwrap());
        assert!(log.verify_entry("AUDMISSING").unwrap_err().is_not_found());
    }

    #[test]
    fn test_action_kind_classify() {
        assert_eq!(ActionKind::classify("Created order"), ActionKind::Create);
        assert_eq!(ActionKind::classify("Added customer"), ActionKind::Create);
        assert_eq!(ActionKind::classify("Updated order status"), ActionKind::Update);
        assert_eq!(ActionKind::classify("Removed user"), ActionKind::Delete);
        assert_eq!(ActionKind::classify("Exported report"), ActionKind::Other);
    }
}
