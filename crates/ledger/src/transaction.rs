//! Ledger transactions: recorded batches of operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use windlass_core::{EntityType, UserId};

use crate::operation::{Operation, OperationDraft, OperationId, OperationKind};

/// Unique transaction identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(pub Uuid);

impl TransactionId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Transaction outcome status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    /// Batch applied fully
    Completed,
    /// Batch aborted midway; the operations describe what ran before the abort
    Failed,
    /// Reversed by a later rollback
    RolledBack,
}

/// Counts of the operations inside a transaction, by kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationSummary {
    pub creates: usize,
    pub updates: usize,
    pub deletes: usize,
    pub total: usize,
}

impl OperationSummary {
    pub fn of(operations: &[Operation]) -> Self {
        let mut summary = OperationSummary::default();
        for op in operations {
            match op.kind {
                OperationKind::Create { .. } => summary.creates += 1,
                OperationKind::Update { .. } => summary.updates += 1,
                OperationKind::Delete { .. } => summary.deletes += 1,
            }
            summary.total += 1;
        }
        summary
    }
}

/// A recorded batch of operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique transaction ID
    pub id: TransactionId,
    /// Ledger-assigned insertion number; monotonic, used as recency tie-break
    pub sequence: u64,
    /// When the batch was recorded
    pub occurred_at: DateTime<Utc>,
    /// Entity collection the batch targeted
    pub entity_type: EntityType,
    /// Who performed the batch
    pub user_id: UserId,
    /// Current status
    pub status: TransactionStatus,
    /// Operation counts by kind
    pub summary: OperationSummary,
    /// The operations, in application order
    pub operations: Vec<Operation>,
    /// Id of the reversal transaction, set once when this one is rolled back
    pub rollback_id: Option<TransactionId>,
}

impl Transaction {
    /// Stamp drafts into a recorded transaction.
    ///
    /// Operations get fresh ids and share the transaction's timestamp.
    pub(crate) fn from_drafts(
        id: TransactionId,
        sequence: u64,
        entity_type: EntityType,
        user_id: UserId,
        drafts: Vec<OperationDraft>,
        status: TransactionStatus,
    ) -> Self {
        let now = Utc::now();
        let operations: Vec<Operation> = drafts
            .into_iter()
            .map(|draft| Operation {
                id: OperationId::new(),
                entity_type: draft.entity_type,
                entity_id: draft.entity_id,
                kind: draft.kind,
                occurred_at: now,
            })
            .collect();
        let summary = OperationSummary::of(&operations);

        Self {
            id,
            sequence,
            occurred_at: now,
            entity_type,
            user_id,
            status,
            summary,
            operations,
            rollback_id: None,
        }
    }

    pub fn is_rolled_back(&self) -> bool {
        self.status == TransactionStatus::RolledBack
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn customers() -> EntityType {
        EntityType::from_static("customers")
    }

    #[test]
    fn stamping_shares_the_timestamp() {
        let drafts = vec![
            OperationDraft::create(customers(), "c-1", json!({"name": "A"})),
            OperationDraft::update(customers(), "c-2", json!({"qty": 1}), json!({"qty": 2})),
            OperationDraft::delete(customers(), "c-3", json!({"name": "C"})),
        ];
        let txn = Transaction::from_drafts(
            TransactionId::new(),
            0,
            customers(),
            UserId::new(),
            drafts,
            TransactionStatus::Completed,
        );

        assert_eq!(txn.summary.creates, 1);
        assert_eq!(txn.summary.updates, 1);
        assert_eq!(txn.summary.deletes, 1);
        assert_eq!(txn.summary.total, 3);
        assert!(txn.operations.iter().all(|op| op.occurred_at == txn.occurred_at));
        assert_eq!(txn.rollback_id, None);
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&TransactionStatus::RolledBack).unwrap();
        assert_eq!(json, "\"rolled_back\"");
    }

    proptest! {
        /// Property: summary counts always sum to the operation count.
        #[test]
        fn summary_counts_sum_to_total(kinds in prop::collection::vec(0usize..3, 0..20)) {
            let drafts: Vec<OperationDraft> = kinds
                .iter()
                .enumerate()
                .map(|(i, kind)| {
                    let id = format!("e-{}", i);
                    match kind {
                        0 => OperationDraft::create(customers(), id, json!({})),
                        1 => OperationDraft::update(customers(), id, json!({}), json!({})),
                        _ => OperationDraft::delete(customers(), id, json!({})),
                    }
                })
                .collect();

            let txn = Transaction::from_drafts(
                TransactionId::new(),
                0,
                customers(),
                UserId::new(),
                drafts,
                TransactionStatus::Completed,
            );

            prop_assert_eq!(txn.summary.total, txn.operations.len());
            prop_assert_eq!(
                txn.summary.creates + txn.summary.updates + txn.summary.deletes,
                txn.summary.total
            );
        }
    }
}
