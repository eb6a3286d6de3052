//! Actor roles.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Role identifier carried by a caller when it asks for a transition.
///
/// Roles are intentionally opaque strings at this layer; mapping roles to
/// allowed transitions is done by the policy layer (the lifecycle rule
/// tables). The one name with cross-cutting meaning is `system`, the role
/// automation acts under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    /// The role automated processes (schedulers, webhooks) act under.
    pub const SYSTEM: Role = Role::from_static("system");

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    /// Const constructor for well-known role names.
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_system(&self) -> bool {
        self.as_str() == Self::SYSTEM.as_str()
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
