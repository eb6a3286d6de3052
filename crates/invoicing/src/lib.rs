//! `windlass-invoicing` — invoice lifecycle state machine.
//!
//! Table-driven status transitions with role authorization and
//! per-transition payload validation. The component is stateless: callers
//! pass in the invoice facts and the transition payload, and nothing here
//! touches storage.

pub mod descriptor;
pub mod invoice;
pub mod lifecycle;
pub mod payload;
pub mod rules;
pub mod status;

pub use descriptor::{STATE_DESCRIPTORS, StateDescriptor, descriptor};
pub use invoice::InvoiceSnapshot;
pub use lifecycle::{
    TransitionValidation, available_actions, can_transition, is_editable, requires_reminder,
    valid_transitions, validate_transition,
};
pub use rules::{TRANSITION_RULES, TransitionCheck, TransitionRule, rule};
pub use status::InvoiceStatus;
