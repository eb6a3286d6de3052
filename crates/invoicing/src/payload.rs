//! Transition payload contract.
//!
//! Payloads are free-form JSON objects. The rule table names the fields a
//! transition requires; presence is judged with the truthiness rules below
//! so a form can submit `""` or `null` for an untouched input and have it
//! count as missing.

use serde_json::Value as JsonValue;

/// Field names the transition rules read from payloads.
pub mod fields {
    pub const SENT_DATE: &str = "sent_date";
    pub const RECIPIENT_EMAIL: &str = "recipient_email";
    pub const VIEWED_DATE: &str = "viewed_date";
    pub const OVERDUE_DATE: &str = "overdue_date";
    pub const PAID_DATE: &str = "paid_date";
    pub const PAYMENT_AMOUNT: &str = "payment_amount";
    pub const PAYMENT_METHOD: &str = "payment_method";
}

/// Presence check for required payload fields.
///
/// `null`, `false`, `0`, and `""` count as missing; any other value counts
/// as present, including empty arrays and objects.
pub fn is_truthy(value: Option<&JsonValue>) -> bool {
    match value {
        None | Some(JsonValue::Null) => false,
        Some(JsonValue::Bool(b)) => *b,
        Some(JsonValue::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
        Some(JsonValue::String(s)) => !s.is_empty(),
        Some(JsonValue::Array(_)) | Some(JsonValue::Object(_)) => true,
    }
}

/// Read a numeric payload field, accepting integer or float representations.
pub fn number(payload: &JsonValue, field: &str) -> Option<f64> {
    payload.get(field).and_then(JsonValue::as_f64)
}
