//! Operations captured inside a ledger transaction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use windlass_core::EntityType;

/// Unique operation identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationId(pub Uuid);

impl OperationId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for OperationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for OperationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What an operation did, with enough captured state to undo it.
///
/// `create` keeps the row it wrote, `update` keeps both sides of the
/// change, `delete` keeps the row it removed. The inverse of every kind is
/// therefore always constructible; there is no unreversible shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum OperationKind {
    /// Wrote a new row; `after` is what it wrote
    Create { after: JsonValue },
    /// Replaced a row; `before` is the old data, `after` the new
    Update { before: JsonValue, after: JsonValue },
    /// Removed a row; `before` is what was removed
    Delete { before: JsonValue },
}

impl OperationKind {
    pub fn name(&self) -> &'static str {
        match self {
            OperationKind::Create { .. } => "create",
            OperationKind::Update { .. } => "update",
            OperationKind::Delete { .. } => "delete",
        }
    }

    /// State before the operation ran, if the kind captures one.
    pub fn before_data(&self) -> Option<&JsonValue> {
        match self {
            OperationKind::Create { .. } => None,
            OperationKind::Update { before, .. } | OperationKind::Delete { before } => Some(before),
        }
    }

    /// State after the operation ran, if the kind captures one.
    pub fn after_data(&self) -> Option<&JsonValue> {
        match self {
            OperationKind::Create { after } | OperationKind::Update { after, .. } => Some(after),
            OperationKind::Delete { .. } => None,
        }
    }

    /// The operation that structurally undoes this one.
    ///
    /// Create becomes delete, delete becomes create, update swaps its two
    /// sides. Applying `inverse` twice yields the original.
    pub fn inverse(&self) -> OperationKind {
        match self {
            OperationKind::Create { after } => OperationKind::Delete {
                before: after.clone(),
            },
            OperationKind::Update { before, after } => OperationKind::Update {
                before: after.clone(),
                after: before.clone(),
            },
            OperationKind::Delete { before } => OperationKind::Create {
                after: before.clone(),
            },
        }
    }
}

/// One atomic mutation captured inside a transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation {
    pub id: OperationId,
    pub entity_type: EntityType,
    pub entity_id: String,
    #[serde(flatten)]
    pub kind: OperationKind,
    /// Shared with the surrounding transaction
    pub occurred_at: DateTime<Utc>,
}

impl Operation {
    /// Draft of the operation that undoes this one.
    pub fn inverse_draft(&self) -> OperationDraft {
        OperationDraft {
            entity_type: self.entity_type.clone(),
            entity_id: self.entity_id.clone(),
            kind: self.kind.inverse(),
        }
    }
}

/// A not-yet-recorded operation: what callers hand to the ledger.
///
/// The ledger stamps the id and timestamp when the surrounding transaction
/// is recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationDraft {
    pub entity_type: EntityType,
    pub entity_id: String,
    #[serde(flatten)]
    pub kind: OperationKind,
}

impl OperationDraft {
    pub fn create(entity_type: EntityType, entity_id: impl Into<String>, after: JsonValue) -> Self {
        Self {
            entity_type,
            entity_id: entity_id.into(),
            kind: OperationKind::Create { after },
        }
    }

    pub fn update(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        before: JsonValue,
        after: JsonValue,
    ) -> Self {
        Self {
            entity_type,
            entity_id: entity_id.into(),
            kind: OperationKind::Update { before, after },
        }
    }

    pub fn delete(entity_type: EntityType, entity_id: impl Into<String>, before: JsonValue) -> Self {
        Self {
            entity_type,
            entity_id: entity_id.into(),
            kind: OperationKind::Delete { before },
        }
    }
}
