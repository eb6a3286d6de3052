//! Audit trail entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use windlass_core::{EntityType, UserId};

/// Unique audit entry identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuditEntryId(pub Uuid);

impl AuditEntryId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for AuditEntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AuditEntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How serious an audited action is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditSeverity {
    Info,
    Warning,
    Critical,
}

impl Default for AuditSeverity {
    fn default() -> Self {
        Self::Info
    }
}

/// One audited action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: AuditEntryId,
    pub occurred_at: DateTime<Utc>,
    /// Who performed the action
    pub user_id: UserId,
    /// Action identifier, e.g. `transaction_recorded`
    pub action: String,
    /// Entity collection the action touched
    pub entity_type: EntityType,
    /// Specific entity, when the action targets one
    pub entity_id: Option<String>,
    pub severity: AuditSeverity,
    /// Free-form structured context
    pub details: JsonValue,
}

impl AuditEntry {
    pub fn new(user_id: UserId, action: impl Into<String>, entity_type: EntityType) -> Self {
        Self {
            id: AuditEntryId::new(),
            occurred_at: Utc::now(),
            user_id,
            action: action.into(),
            entity_type,
            entity_id: None,
            severity: AuditSeverity::Info,
            details: JsonValue::Null,
        }
    }

    pub fn with_entity_id(mut self, entity_id: impl Into<String>) -> Self {
        self.entity_id = Some(entity_id.into());
        self
    }

    pub fn with_severity(mut self, severity: AuditSeverity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_details(mut self, details: JsonValue) -> Self {
        self.details = details;
        self
    }
}
