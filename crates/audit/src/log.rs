//! Bounded in-memory audit trail.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use windlass_core::{EntityType, UserId};

use crate::entry::AuditEntry;

/// Default number of retained entries.
pub const DEFAULT_CAPACITY: usize = 1000;

/// In-memory audit trail bounded to the most recent entries.
///
/// A ring buffer behind a mutex: `record` appends and evicts the oldest
/// past capacity. Queries clone entries out, newest first.
#[derive(Debug)]
pub struct AuditLog {
    entries: Mutex<VecDeque<AuditEntry>>,
    capacity: usize,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::new()),
            capacity,
        }
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append an entry, evicting the oldest past capacity.
    pub fn record(&self, entry: AuditEntry) {
        let mut entries = self.entries.lock().unwrap();
        entries.push_back(entry);
        while entries.len() > self.capacity {
            entries.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Most recent entries, newest first.
    pub fn recent(&self, limit: usize) -> Vec<AuditEntry> {
        let entries = self.entries.lock().unwrap();
        entries.iter().rev().take(limit).cloned().collect()
    }

    /// Entries recorded by one user, newest first.
    pub fn by_user(&self, user_id: UserId, limit: usize) -> Vec<AuditEntry> {
        self.filtered(limit, |e| e.user_id == user_id)
    }

    /// Entries with a given action, newest first.
    pub fn by_action(&self, action: &str, limit: usize) -> Vec<AuditEntry> {
        self.filtered(limit, |e| e.action == action)
    }

    /// Entries touching an entity type, newest first.
    pub fn by_entity_type(&self, entity_type: &EntityType, limit: usize) -> Vec<AuditEntry> {
        self.filtered(limit, |e| e.entity_type == *entity_type)
    }

    /// Entries at or after `since`, newest first.
    pub fn since(&self, since: DateTime<Utc>) -> Vec<AuditEntry> {
        let entries = self.entries.lock().unwrap();
        entries
            .iter()
            .rev()
            .filter(|e| e.occurred_at >= since)
            .cloned()
            .collect()
    }

    fn filtered<F>(&self, limit: usize, keep: F) -> Vec<AuditEntry>
    where
        F: Fn(&AuditEntry) -> bool,
    {
        let entries = self.entries.lock().unwrap();
        entries
            .iter()
            .rev()
            .filter(|e| keep(e))
            .take(limit)
            .cloned()
            .collect()
    }
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::AuditSeverity;

    fn entry(action: &str) -> AuditEntry {
        AuditEntry::new(UserId::new(), action, EntityType::from_static("customers"))
    }

    #[test]
    fn capacity_evicts_oldest() {
        let log = AuditLog::with_capacity(3);
        for i in 0..5 {
            log.record(entry(&format!("action_{}", i)));
        }

        assert_eq!(log.len(), 3);
        let recent = log.recent(10);
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].action, "action_4");
        assert_eq!(recent[2].action, "action_2");
    }

    #[test]
    fn recent_returns_newest_first() {
        let log = AuditLog::new();
        log.record(entry("first"));
        log.record(entry("second"));

        let recent = log.recent(10);
        assert_eq!(recent[0].action, "second");
        assert_eq!(recent[1].action, "first");
    }

    #[test]
    fn filters_by_user_action_and_entity_type() {
        let log = AuditLog::new();
        let alice = UserId::new();
        let customers = EntityType::from_static("customers");
        let shipments = EntityType::from_static("shipments");

        log.record(AuditEntry::new(alice, "import", customers.clone()));
        log.record(AuditEntry::new(UserId::new(), "import", shipments.clone()));
        log.record(AuditEntry::new(alice, "rollback", customers.clone()));

        assert_eq!(log.by_user(alice, 10).len(), 2);
        assert_eq!(log.by_action("import", 10).len(), 2);
        assert_eq!(log.by_entity_type(&customers, 10).len(), 2);
        assert_eq!(log.by_entity_type(&shipments, 10).len(), 1);
    }

    #[test]
    fn since_honors_the_cutoff() {
        let log = AuditLog::new();
        let mut old = entry("old");
        old.occurred_at = Utc::now() - chrono::Duration::minutes(10);
        log.record(old);
        log.record(entry("new"));

        let entries = log.since(Utc::now() - chrono::Duration::minutes(5));
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, "new");
    }

    #[test]
    fn builder_setters_apply() {
        let e = entry("import")
            .with_entity_id("c-42")
            .with_severity(AuditSeverity::Warning)
            .with_details(serde_json::json!({"rows": 10}));

        assert_eq!(e.entity_id.as_deref(), Some("c-42"));
        assert_eq!(e.severity, AuditSeverity::Warning);
        assert_eq!(e.details["rows"], 10);
    }
}
