//! `windlass-ledger` — reversible transaction log for bulk mutations.
//!
//! Records batches of create/update/delete operations with enough captured
//! state to undo them, and reverses a batch best-effort through an injected
//! [`MutationExecutor`]. The log is bounded to the most recent transactions;
//! reversal safety checks are advisory and separate from the hard guards.

pub mod executor;
pub mod export;
pub mod ledger;
pub mod operation;
pub mod transaction;

pub use executor::{InMemoryExecutor, MutationError, MutationExecutor};
pub use export::{EXPORT_FORMAT_VERSION, ExportDocument, ExportedTransaction};
pub use ledger::{
    CancellationFlag, DEFAULT_HISTORY_LIMIT, LedgerConfig, LedgerStats, RollbackEligibility,
    RollbackResult, TransactionLedger,
};
pub use operation::{Operation, OperationDraft, OperationId, OperationKind};
pub use transaction::{OperationSummary, Transaction, TransactionId, TransactionStatus};
