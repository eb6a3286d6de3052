//! Serializable export shape for the transaction log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use windlass_core::{EntityType, UserId};

use crate::transaction::{OperationSummary, Transaction, TransactionId, TransactionStatus};

/// Bumped when the export layout changes.
pub const EXPORT_FORMAT_VERSION: u32 = 1;

/// One transaction as it appears in an export: metadata plus an
/// operation count, without the operation payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedTransaction {
    pub id: TransactionId,
    pub occurred_at: DateTime<Utc>,
    pub entity_type: EntityType,
    pub user_id: UserId,
    pub status: TransactionStatus,
    pub summary: OperationSummary,
    pub operations: usize,
    pub rollback_id: Option<TransactionId>,
}

impl From<&Transaction> for ExportedTransaction {
    fn from(txn: &Transaction) -> Self {
        Self {
            id: txn.id,
            occurred_at: txn.occurred_at,
            entity_type: txn.entity_type.clone(),
            user_id: txn.user_id,
            status: txn.status,
            summary: txn.summary,
            operations: txn.operations.len(),
            rollback_id: txn.rollback_id,
        }
    }
}

/// Top-level export document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportDocument {
    pub version: u32,
    pub exported_at: DateTime<Utc>,
    pub transactions: Vec<ExportedTransaction>,
}

impl ExportDocument {
    pub fn new(transactions: Vec<ExportedTransaction>) -> Self {
        Self {
            version: EXPORT_FORMAT_VERSION,
            exported_at: Utc::now(),
            transactions,
        }
    }
}
