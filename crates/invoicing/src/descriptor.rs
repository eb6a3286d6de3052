//! Per-status metadata consumed by dashboard surfaces.

use crate::status::InvoiceStatus;

/// Static metadata describing one lifecycle status.
///
/// `allowed_transitions` is the edge list of the status graph; the rule
/// table refines every edge with authorization and data requirements, and a
/// test keeps the two tables aligned edge for edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateDescriptor {
    pub status: InvoiceStatus,
    pub allowed_transitions: &'static [InvoiceStatus],
    /// UI action identifiers surfaced while an invoice sits in this status.
    pub actions: &'static [&'static str],
    pub is_editable: bool,
    pub requires_reminder: bool,
}

/// One descriptor per status.
pub const STATE_DESCRIPTORS: &[StateDescriptor] = &[
    StateDescriptor {
        status: InvoiceStatus::Draft,
        allowed_transitions: &[InvoiceStatus::Sent, InvoiceStatus::Cancelled],
        actions: &["edit", "send", "delete"],
        is_editable: true,
        requires_reminder: false,
    },
    StateDescriptor {
        status: InvoiceStatus::Sent,
        allowed_transitions: &[
            InvoiceStatus::Viewed,
            InvoiceStatus::Overdue,
            InvoiceStatus::Paid,
            InvoiceStatus::Cancelled,
        ],
        actions: &["view", "send_reminder", "record_payment", "cancel"],
        is_editable: false,
        requires_reminder: true,
    },
    StateDescriptor {
        status: InvoiceStatus::Viewed,
        allowed_transitions: &[
            InvoiceStatus::Overdue,
            InvoiceStatus::Paid,
            InvoiceStatus::Cancelled,
        ],
        actions: &["send_reminder", "record_payment", "cancel"],
        is_editable: false,
        requires_reminder: false,
    },
    StateDescriptor {
        status: InvoiceStatus::Overdue,
        allowed_transitions: &[InvoiceStatus::Paid, InvoiceStatus::Cancelled],
        actions: &["send_reminder", "record_payment", "cancel", "escalate"],
        is_editable: false,
        requires_reminder: true,
    },
    StateDescriptor {
        status: InvoiceStatus::Paid,
        allowed_transitions: &[InvoiceStatus::Cancelled],
        actions: &["download_receipt", "cancel"],
        is_editable: false,
        requires_reminder: false,
    },
    StateDescriptor {
        status: InvoiceStatus::Cancelled,
        allowed_transitions: &[],
        actions: &[],
        is_editable: false,
        requires_reminder: false,
    },
];

/// Look up the descriptor for a status.
pub fn descriptor(status: InvoiceStatus) -> Option<&'static StateDescriptor> {
    STATE_DESCRIPTORS.iter().find(|d| d.status == status)
}
