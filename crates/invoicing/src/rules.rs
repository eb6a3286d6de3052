//! The transition rule table: which edges exist, who may take them, and
//! what each edge demands of its payload.

use chrono::Utc;
use serde_json::Value as JsonValue;

use windlass_core::Role;

use crate::invoice::InvoiceSnapshot;
use crate::payload::{self, fields};
use crate::status::InvoiceStatus;

const ADMIN: &str = "admin";
const MANAGER: &str = "manager";
const ACCOUNTANT: &str = "accountant";
const SYSTEM: &str = "system";

/// Predicate over the invoice facts and the transition payload.
pub type TransitionCheck = fn(&InvoiceSnapshot, &JsonValue) -> bool;

/// A declarative edge in the status graph.
#[derive(Debug, Clone, Copy)]
pub struct TransitionRule {
    pub from: InvoiceStatus,
    pub to: InvoiceStatus,
    /// Role names permitted to perform the transition. Listing `system`
    /// marks the edge automation-driven.
    pub allowed_by: &'static [&'static str],
    /// Payload fields that must be present and truthy.
    pub requires_data: &'static [&'static str],
    /// Extra business validation beyond field presence.
    pub validate: Option<TransitionCheck>,
}

impl TransitionRule {
    /// True when `role` passes this rule's authorization.
    ///
    /// Three ways in: the role is listed, the caller is `system` (automation
    /// may take any edge), or the rule itself lists `system` (the edge fires
    /// off webhooks/schedulers, so any caller relaying it passes).
    pub fn permits(&self, role: &Role) -> bool {
        role.is_system()
            || self.allowed_by.contains(&role.as_str())
            || self.allowed_by.contains(&SYSTEM)
    }
}

fn due_date_elapsed(invoice: &InvoiceSnapshot, _payload: &JsonValue) -> bool {
    invoice.due_date.is_some_and(|due| Utc::now() > due)
}

fn payment_covers_total(invoice: &InvoiceSnapshot, payload: &JsonValue) -> bool {
    payload::number(payload, fields::PAYMENT_AMOUNT)
        .is_some_and(|amount| amount >= invoice.total_amount as f64)
}

const PAYMENT_FIELDS: &[&str] = &[
    fields::PAID_DATE,
    fields::PAYMENT_AMOUNT,
    fields::PAYMENT_METHOD,
];

/// One rule per legal edge of the status graph.
///
/// Cancellation edges are authorization-only: any non-terminal invoice can
/// be cancelled without extra data, and a paid invoice only by an admin.
pub const TRANSITION_RULES: &[TransitionRule] = &[
    TransitionRule {
        from: InvoiceStatus::Draft,
        to: InvoiceStatus::Sent,
        allowed_by: &[ADMIN, MANAGER, ACCOUNTANT],
        requires_data: &[fields::SENT_DATE, fields::RECIPIENT_EMAIL],
        validate: None,
    },
    TransitionRule {
        from: InvoiceStatus::Sent,
        to: InvoiceStatus::Viewed,
        allowed_by: &[SYSTEM],
        requires_data: &[fields::VIEWED_DATE],
        validate: None,
    },
    TransitionRule {
        from: InvoiceStatus::Sent,
        to: InvoiceStatus::Overdue,
        allowed_by: &[SYSTEM],
        requires_data: &[fields::OVERDUE_DATE],
        validate: Some(due_date_elapsed),
    },
    TransitionRule {
        from: InvoiceStatus::Viewed,
        to: InvoiceStatus::Overdue,
        allowed_by: &[SYSTEM],
        requires_data: &[fields::OVERDUE_DATE],
        validate: Some(due_date_elapsed),
    },
    TransitionRule {
        from: InvoiceStatus::Sent,
        to: InvoiceStatus::Paid,
        allowed_by: &[ADMIN, ACCOUNTANT],
        requires_data: PAYMENT_FIELDS,
        validate: Some(payment_covers_total),
    },
    TransitionRule {
        from: InvoiceStatus::Viewed,
        to: InvoiceStatus::Paid,
        allowed_by: &[ADMIN, ACCOUNTANT],
        requires_data: PAYMENT_FIELDS,
        validate: Some(payment_covers_total),
    },
    TransitionRule {
        from: InvoiceStatus::Overdue,
        to: InvoiceStatus::Paid,
        allowed_by: &[ADMIN, ACCOUNTANT],
        requires_data: PAYMENT_FIELDS,
        validate: Some(payment_covers_total),
    },
    TransitionRule {
        from: InvoiceStatus::Draft,
        to: InvoiceStatus::Cancelled,
        allowed_by: &[ADMIN, MANAGER],
        requires_data: &[],
        validate: None,
    },
    TransitionRule {
        from: InvoiceStatus::Sent,
        to: InvoiceStatus::Cancelled,
        allowed_by: &[ADMIN, MANAGER],
        requires_data: &[],
        validate: None,
    },
    TransitionRule {
        from: InvoiceStatus::Viewed,
        to: InvoiceStatus::Cancelled,
        allowed_by: &[ADMIN, MANAGER],
        requires_data: &[],
        validate: None,
    },
    TransitionRule {
        from: InvoiceStatus::Overdue,
        to: InvoiceStatus::Cancelled,
        allowed_by: &[ADMIN, MANAGER],
        requires_data: &[],
        validate: None,
    },
    TransitionRule {
        from: InvoiceStatus::Paid,
        to: InvoiceStatus::Cancelled,
        allowed_by: &[ADMIN],
        requires_data: &[],
        validate: None,
    },
];

/// Look up the rule for an edge.
pub fn rule(from: InvoiceStatus, to: InvoiceStatus) -> Option<&'static TransitionRule> {
    TRANSITION_RULES.iter().find(|r| r.from == from && r.to == to)
}
