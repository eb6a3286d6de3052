//! `windlass-core` — shared vocabulary for the lifecycle and ledger crates.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod entity;
pub mod error;
pub mod id;
pub mod role;

pub use entity::EntityType;
pub use error::{DomainError, DomainResult};
pub use id::UserId;
pub use role::Role;
