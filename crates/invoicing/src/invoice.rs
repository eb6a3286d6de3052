//! Invoice facts read by transition validation.

use chrono::{DateTime, Utc};

/// The slice of an invoice the transition rules consult.
///
/// The lifecycle is deliberately decoupled from any invoice aggregate or
/// storage row; callers hand in the two facts the predicates read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvoiceSnapshot {
    /// Total in smallest currency unit (e.g., cents).
    pub total_amount: u64,
    pub due_date: Option<DateTime<Utc>>,
}

impl InvoiceSnapshot {
    pub fn new(total_amount: u64) -> Self {
        Self {
            total_amount,
            due_date: None,
        }
    }

    pub fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }
}
