//! Invoice lifecycle statuses.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use windlass_core::DomainError;

/// Invoice status lifecycle.
///
/// Exactly one status applies to an invoice at any time. `cancelled` is
/// terminal; every other status has at least one outgoing transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Viewed,
    Overdue,
    Paid,
    Cancelled,
}

impl InvoiceStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [InvoiceStatus; 6] = [
        InvoiceStatus::Draft,
        InvoiceStatus::Sent,
        InvoiceStatus::Viewed,
        InvoiceStatus::Overdue,
        InvoiceStatus::Paid,
        InvoiceStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Sent => "sent",
            InvoiceStatus::Viewed => "viewed",
            InvoiceStatus::Overdue => "overdue",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Cancelled => "cancelled",
        }
    }

    /// A terminal status has no outgoing transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, InvoiceStatus::Cancelled)
    }
}

impl core::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(InvoiceStatus::Draft),
            "sent" => Ok(InvoiceStatus::Sent),
            "viewed" => Ok(InvoiceStatus::Viewed),
            "overdue" => Ok(InvoiceStatus::Overdue),
            "paid" => Ok(InvoiceStatus::Paid),
            "cancelled" => Ok(InvoiceStatus::Cancelled),
            other => Err(DomainError::validation(format!(
                "unknown invoice status: {}",
                other
            ))),
        }
    }
}
