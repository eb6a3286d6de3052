//! `windlass-audit` — bounded audit trail for back-office actions.
//!
//! A ring buffer of structured entries with filtering queries. The ledger
//! appends here when an audit log is attached; dashboard surfaces read it.

pub mod entry;
pub mod log;

pub use entry::{AuditEntry, AuditEntryId, AuditSeverity};
pub use log::{AuditLog, DEFAULT_CAPACITY};
