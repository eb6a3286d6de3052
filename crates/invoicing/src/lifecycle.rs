//! Pure transition queries and validation over the rule tables.
//!
//! - No IO beyond reading the clock inside the overdue predicate
//! - No panics
//! - No stored state; safe to call from any thread

use serde_json::Value as JsonValue;

use windlass_core::{DomainError, DomainResult, Role};

use crate::descriptor::descriptor;
use crate::invoice::InvoiceSnapshot;
use crate::payload::is_truthy;
use crate::rules::rule;
use crate::status::InvoiceStatus;

/// Check whether `actor` may move an invoice from `from` to `to`.
///
/// No rule for the pair means nobody may: unknown edges are denied, never
/// erred on.
pub fn can_transition(from: InvoiceStatus, to: InvoiceStatus, actor: &Role) -> bool {
    rule(from, to).is_some_and(|r| r.permits(actor))
}

/// Statuses reachable directly from `status`.
pub fn valid_transitions(status: InvoiceStatus) -> &'static [InvoiceStatus] {
    descriptor(status)
        .map(|d| d.allowed_transitions)
        .unwrap_or(&[])
}

/// UI action identifiers surfaced for `status`.
pub fn available_actions(status: InvoiceStatus) -> &'static [&'static str] {
    descriptor(status).map(|d| d.actions).unwrap_or(&[])
}

/// Whether invoice content may still be edited in `status`.
pub fn is_editable(status: InvoiceStatus) -> bool {
    descriptor(status).is_some_and(|d| d.is_editable)
}

/// Whether the dashboard should offer payment reminders in `status`.
pub fn requires_reminder(status: InvoiceStatus) -> bool {
    descriptor(status).is_some_and(|d| d.requires_reminder)
}

/// Outcome of validating a requested transition.
///
/// Collects every failure rather than stopping at the first, so a form can
/// surface all problems in one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionValidation {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl TransitionValidation {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    /// Convert into a `DomainResult`, joining the collected failures.
    pub fn into_result(self) -> DomainResult<()> {
        if self.valid {
            Ok(())
        } else {
            Err(DomainError::validation(self.errors.join("; ")))
        }
    }
}

/// Validate a requested transition end to end.
///
/// Three independent checks run and every failure is reported:
/// 1. authorization (`can_transition`),
/// 2. required payload fields, each missing one reported separately,
/// 3. the edge's business predicate, if any.
///
/// When no rule exists for the pair, only the authorization failure is
/// reported.
pub fn validate_transition(
    from: InvoiceStatus,
    to: InvoiceStatus,
    invoice: &InvoiceSnapshot,
    payload: &JsonValue,
    actor: &Role,
) -> TransitionValidation {
    let mut errors = Vec::new();

    if !can_transition(from, to, actor) {
        errors.push(format!(
            "Transition from {} to {} not allowed for role {}",
            from, to, actor
        ));
    }

    if let Some(rule) = rule(from, to) {
        for field in rule.requires_data {
            if !is_truthy(payload.get(*field)) {
                errors.push(format!("Required field missing: {}", field));
            }
        }

        if let Some(check) = rule.validate {
            if !check(invoice, payload) {
                errors.push(format!(
                    "Transition validation failed for {} -> {}",
                    from, to
                ));
            }
        }
    }

    TransitionValidation::from_errors(errors)
}
