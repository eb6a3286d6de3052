//! The transaction ledger: bounded history, best-effort rollback.
//!
//! The ledger is a compensating-action log, not a database transaction
//! manager. Rollback applies structural inverses one operation at a time
//! through the injected executor; a failure on one operation never aborts
//! the rest, and partial outcomes are reported, not raised.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info, warn};

use windlass_audit::{AuditEntry, AuditLog, AuditSeverity};
use windlass_core::{EntityType, UserId};

use crate::executor::{apply_draft, MutationExecutor};
use crate::export::{ExportDocument, ExportedTransaction};
use crate::operation::OperationDraft;
use crate::transaction::{Transaction, TransactionId, TransactionStatus};

/// Default `limit` callers pass to [`TransactionLedger::history`].
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Ledger tuning knobs.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Most-recent transactions retained; older ones are evicted
    pub max_history: usize,
    /// Advisory age window consulted by `can_rollback`
    pub rollback_window: Duration,
}

impl LedgerConfig {
    pub fn new() -> Self {
        Self {
            max_history: 100,
            rollback_window: Duration::days(30),
        }
    }

    pub fn with_max_history(mut self, max_history: usize) -> Self {
        self.max_history = max_history;
        self
    }

    pub fn with_rollback_window(mut self, rollback_window: Duration) -> Self {
        self.rollback_window = rollback_window;
        self
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Cooperative cancellation signal checked between rollback operations.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Outcome of a rollback attempt.
///
/// `success` means every operation reversed cleanly. A partial rollback
/// still flips the original to `rolled_back` and still records whatever
/// inverses did succeed.
#[derive(Debug, Clone, Serialize)]
pub struct RollbackResult {
    pub success: bool,
    /// Id of the recorded reversal transaction; absent when the attempt
    /// was rejected before any claim was made
    pub rollback_id: Option<TransactionId>,
    /// Operations that reversed cleanly
    pub operations_rolled_back: usize,
    pub errors: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl RollbackResult {
    fn rejected(error: impl Into<String>) -> Self {
        Self {
            success: false,
            rollback_id: None,
            operations_rolled_back: 0,
            errors: vec![error.into()],
            timestamp: Utc::now(),
        }
    }
}

/// Advisory answer from [`TransactionLedger::can_rollback`].
#[derive(Debug, Clone, Serialize)]
pub struct RollbackEligibility {
    pub can_rollback: bool,
    pub reason: Option<String>,
}

impl RollbackEligibility {
    pub fn eligible() -> Self {
        Self { can_rollback: true, reason: None }
    }

    pub fn blocked(reason: impl Into<String>) -> Self {
        Self { can_rollback: false, reason: Some(reason.into()) }
    }
}

/// Aggregate counts over the retained transactions.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LedgerStats {
    pub total_transactions: usize,
    pub completed_transactions: usize,
    pub rolled_back_transactions: usize,
    pub failed_transactions: usize,
    pub total_operations: usize,
    /// Operation counts keyed by kind (`create` / `update` / `delete`)
    pub operations_by_type: BTreeMap<String, usize>,
}

struct LedgerInner {
    transactions: HashMap<TransactionId, Transaction>,
    next_sequence: u64,
}

/// Bounded in-memory transaction log with rollback support.
///
/// Shared freely across threads; the transaction map sits behind one
/// `RwLock` and the rollback claim is a critical section, so two racing
/// rollbacks of the same transaction resolve to exactly one winner.
pub struct TransactionLedger<E> {
    inner: RwLock<LedgerInner>,
    executor: E,
    config: LedgerConfig,
    audit: Option<Arc<AuditLog>>,
}

impl<E: MutationExecutor> TransactionLedger<E> {
    pub fn new(executor: E) -> Self {
        Self::with_config(executor, LedgerConfig::new())
    }

    pub fn with_config(executor: E, config: LedgerConfig) -> Self {
        Self {
            inner: RwLock::new(LedgerInner {
                transactions: HashMap::new(),
                next_sequence: 0,
            }),
            executor,
            config,
            audit: None,
        }
    }

    /// Attach an audit trail; record and rollback then append entries to it.
    pub fn with_audit_log(mut self, audit: Arc<AuditLog>) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Record a batch that was applied in full.
    ///
    /// The caller describes what happened; the ledger stamps ids and the
    /// shared timestamp. This is the only path by which a transaction
    /// enters the ledger.
    pub fn record_transaction(
        &self,
        entity_type: EntityType,
        user_id: UserId,
        drafts: Vec<OperationDraft>,
    ) -> Transaction {
        self.record_with_status(
            TransactionId::new(),
            entity_type,
            user_id,
            drafts,
            TransactionStatus::Completed,
        )
    }

    /// Record a batch that aborted midway. The drafts describe the
    /// operations applied before the abort.
    pub fn record_failed(
        &self,
        entity_type: EntityType,
        user_id: UserId,
        drafts: Vec<OperationDraft>,
    ) -> Transaction {
        self.record_with_status(
            TransactionId::new(),
            entity_type,
            user_id,
            drafts,
            TransactionStatus::Failed,
        )
    }

    fn record_with_status(
        &self,
        id: TransactionId,
        entity_type: EntityType,
        user_id: UserId,
        drafts: Vec<OperationDraft>,
        status: TransactionStatus,
    ) -> Transaction {
        let txn = {
            let mut inner = self.inner.write().unwrap();
            let sequence = inner.next_sequence;
            inner.next_sequence += 1;

            let txn = Transaction::from_drafts(id, sequence, entity_type, user_id, drafts, status);
            inner.transactions.insert(txn.id, txn.clone());
            self.evict_past_bound(&mut inner);
            txn
        };

        debug!(
            transaction_id = %txn.id,
            entity_type = %txn.entity_type,
            operations = txn.summary.total,
            status = ?txn.status,
            "recorded transaction"
        );
        self.audit_record(&txn);
        txn
    }

    fn evict_past_bound(&self, inner: &mut LedgerInner) {
        while inner.transactions.len() > self.config.max_history {
            let oldest = inner
                .transactions
                .values()
                .min_by_key(|t| (t.occurred_at, t.sequence))
                .map(|t| t.id);
            match oldest {
                Some(id) => {
                    inner.transactions.remove(&id);
                    debug!(transaction_id = %id, "evicted transaction past history bound");
                }
                None => break,
            }
        }
    }

    /// Roll back a recorded transaction, best effort.
    ///
    /// Guards only against a missing id and a transaction already rolled
    /// back; age and conflict checks are advisory and live in
    /// [`can_rollback`](Self::can_rollback). Operations are undone in
    /// strict reverse order, each attempted independently: an executor
    /// failure is captured as an error string and the loop continues.
    /// Whatever the outcome, a claimed transaction ends `rolled_back` and
    /// the inverses that succeeded are recorded as a reversal transaction
    /// under the `rollback_`-prefixed entity type.
    pub fn rollback(&self, transaction_id: TransactionId, user_id: UserId) -> RollbackResult {
        self.rollback_inner(transaction_id, user_id, None)
    }

    /// Like [`rollback`](Self::rollback), checking `cancel` between
    /// operations. Once the flag is set, remaining operations are skipped
    /// and each is reported as an error; partial-success semantics are
    /// unchanged.
    pub fn rollback_with_cancellation(
        &self,
        transaction_id: TransactionId,
        user_id: UserId,
        cancel: &CancellationFlag,
    ) -> RollbackResult {
        self.rollback_inner(transaction_id, user_id, Some(cancel))
    }

    fn rollback_inner(
        &self,
        transaction_id: TransactionId,
        user_id: UserId,
        cancel: Option<&CancellationFlag>,
    ) -> RollbackResult {
        // Claim: status check and flip are one critical section, so a
        // racing caller observes already-rolled-back.
        let (rollback_id, entity_type, operations) = {
            let mut inner = self.inner.write().unwrap();
            let Some(txn) = inner.transactions.get_mut(&transaction_id) else {
                return RollbackResult::rejected("Transaction not found");
            };
            if txn.is_rolled_back() {
                return RollbackResult::rejected("Transaction has already been rolled back");
            }

            let rollback_id = TransactionId::new();
            txn.status = TransactionStatus::RolledBack;
            txn.rollback_id = Some(rollback_id);
            (rollback_id, txn.entity_type.clone(), txn.operations.clone())
        };

        // Undo newest-first, outside the lock. Later operations may depend
        // on entities earlier ones touched, hence strictly sequential.
        let mut errors = Vec::new();
        let mut reversal_drafts = Vec::new();
        let mut cancelled = false;
        for op in operations.iter().rev() {
            if !cancelled && cancel.is_some_and(|flag| flag.is_cancelled()) {
                cancelled = true;
            }
            if cancelled {
                errors.push(format!("Rollback cancelled before {}", op.id));
                continue;
            }

            let draft = op.inverse_draft();
            match apply_draft(&self.executor, &draft) {
                Ok(()) => reversal_drafts.push(draft),
                Err(e) => errors.push(format!("Failed to rollback {}: {}", op.id, e.message)),
            }
        }

        let operations_rolled_back = reversal_drafts.len();
        let reversal = self.record_with_status(
            rollback_id,
            entity_type.rollback_of(),
            user_id,
            reversal_drafts,
            TransactionStatus::Completed,
        );

        if errors.is_empty() {
            info!(
                transaction_id = %transaction_id,
                rollback_id = %reversal.id,
                operations = operations_rolled_back,
                "rolled back transaction"
            );
        } else {
            warn!(
                transaction_id = %transaction_id,
                rollback_id = %reversal.id,
                operations = operations_rolled_back,
                failures = errors.len(),
                "rolled back transaction with failures"
            );
        }
        self.audit_rollback(user_id, transaction_id, &entity_type, reversal.id, operations_rolled_back, errors.len());

        RollbackResult {
            success: errors.is_empty(),
            rollback_id: Some(reversal.id),
            operations_rolled_back,
            errors,
            timestamp: Utc::now(),
        }
    }

    /// Advisory eligibility check, a dry run for UIs to consult before
    /// offering the rollback action. Checks run in order: existence,
    /// already rolled back, failed status, age window, newer imports on
    /// the same entity type (or its reversal derivative).
    pub fn can_rollback(&self, transaction_id: TransactionId) -> RollbackEligibility {
        let inner = self.inner.read().unwrap();
        let Some(txn) = inner.transactions.get(&transaction_id) else {
            return RollbackEligibility::blocked("Transaction not found");
        };
        match txn.status {
            TransactionStatus::RolledBack => {
                return RollbackEligibility::blocked("Already rolled back");
            }
            TransactionStatus::Failed => {
                return RollbackEligibility::blocked("Cannot rollback failed transaction");
            }
            TransactionStatus::Completed => {}
        }

        let window = self.config.rollback_window;
        if txn.occurred_at < Utc::now() - window {
            return RollbackEligibility::blocked(format!(
                "Transaction is older than {} days and can no longer be rolled back",
                window.num_days()
            ));
        }

        // Later imports may have built on rows this rollback would remove
        // or restore.
        let newer_import = inner.transactions.values().any(|other| {
            other.id != txn.id
                && other.status == TransactionStatus::Completed
                && (other.entity_type == txn.entity_type
                    || other.entity_type == txn.entity_type.rollback_of())
                && (other.occurred_at, other.sequence) > (txn.occurred_at, txn.sequence)
        });
        if newer_import {
            return RollbackEligibility::blocked(format!(
                "Newer imports exist for {}. Rollback may cause conflicts.",
                txn.entity_type
            ));
        }

        RollbackEligibility::eligible()
    }

    /// Direct lookup, cloned out.
    pub fn transaction(&self, transaction_id: TransactionId) -> Option<Transaction> {
        let inner = self.inner.read().unwrap();
        inner.transactions.get(&transaction_id).cloned()
    }

    /// Transactions newest first, optionally filtered to an entity type
    /// and its `rollback_`-prefixed derivative, truncated to `limit`.
    pub fn history(&self, entity_type: Option<&EntityType>, limit: usize) -> Vec<Transaction> {
        let mut txns: Vec<Transaction> = {
            let inner = self.inner.read().unwrap();
            inner
                .transactions
                .values()
                .filter(|t| {
                    entity_type.map_or(true, |wanted| {
                        t.entity_type == *wanted || t.entity_type == wanted.rollback_of()
                    })
                })
                .cloned()
                .collect()
        };
        txns.sort_by_key(|t| std::cmp::Reverse((t.occurred_at, t.sequence)));
        txns.truncate(limit);
        txns
    }

    /// Aggregate counts, recomputed from the retained set on each call.
    pub fn statistics(&self) -> LedgerStats {
        let inner = self.inner.read().unwrap();
        let mut stats = LedgerStats::default();
        let (mut creates, mut updates, mut deletes) = (0, 0, 0);
        for txn in inner.transactions.values() {
            stats.total_transactions += 1;
            match txn.status {
                TransactionStatus::Completed => stats.completed_transactions += 1,
                TransactionStatus::Failed => stats.failed_transactions += 1,
                TransactionStatus::RolledBack => stats.rolled_back_transactions += 1,
            }
            stats.total_operations += txn.summary.total;
            creates += txn.summary.creates;
            updates += txn.summary.updates;
            deletes += txn.summary.deletes;
        }
        stats.operations_by_type = BTreeMap::from([
            ("create".to_owned(), creates),
            ("update".to_owned(), updates),
            ("delete".to_owned(), deletes),
        ]);
        stats
    }

    /// Export one transaction, or all of them newest first, as a JSON
    /// document. Each transaction's operations appear only as a count;
    /// payloads never leave the ledger this way. An unknown id exports an
    /// empty list.
    pub fn export_log(&self, transaction_id: Option<TransactionId>) -> Result<String, serde_json::Error> {
        let doc = {
            let inner = self.inner.read().unwrap();
            let mut selected: Vec<&Transaction> = match transaction_id {
                Some(id) => inner.transactions.get(&id).into_iter().collect(),
                None => inner.transactions.values().collect(),
            };
            selected.sort_by_key(|t| std::cmp::Reverse((t.occurred_at, t.sequence)));
            ExportDocument::new(selected.into_iter().map(ExportedTransaction::from).collect())
        };
        serde_json::to_string_pretty(&doc)
    }

    #[cfg(test)]
    pub(crate) fn set_occurred_at(&self, transaction_id: TransactionId, when: DateTime<Utc>) {
        let mut inner = self.inner.write().unwrap();
        if let Some(txn) = inner.transactions.get_mut(&transaction_id) {
            txn.occurred_at = when;
        }
    }

    fn audit_record(&self, txn: &Transaction) {
        if let Some(audit) = &self.audit {
            let severity = if txn.status == TransactionStatus::Failed {
                AuditSeverity::Warning
            } else {
                AuditSeverity::Info
            };
            audit.record(
                AuditEntry::new(txn.user_id, "transaction_recorded", txn.entity_type.clone())
                    .with_entity_id(txn.id.to_string())
                    .with_severity(severity)
                    .with_details(json!({
                        "operations": txn.summary.total,
                        "status": txn.status,
                    })),
            );
        }
    }

    fn audit_rollback(
        &self,
        user_id: UserId,
        transaction_id: TransactionId,
        entity_type: &EntityType,
        rollback_id: TransactionId,
        operations_rolled_back: usize,
        failures: usize,
    ) {
        if let Some(audit) = &self.audit {
            let severity = if failures > 0 {
                AuditSeverity::Warning
            } else {
                AuditSeverity::Info
            };
            audit.record(
                AuditEntry::new(user_id, "transaction_rolled_back", entity_type.clone())
                    .with_entity_id(transaction_id.to_string())
                    .with_severity(severity)
                    .with_details(json!({
                        "rollback_id": rollback_id.to_string(),
                        "operations_rolled_back": operations_rolled_back,
                        "failures": failures,
                    })),
            );
        }
    }
}
