//! Logical entity types mutated by bulk actions.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Name of a logical resource collection (`customers`, `shipments`, ...).
///
/// The ledger derives a companion name for reversal transactions by
/// prefixing `rollback_`, so a rollback of a `customers` import is recorded
/// under `rollback_customers`. That naming scheme lives here because both
/// the ledger and the audit trail need to recognize it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityType(Cow<'static, str>);

impl EntityType {
    /// Prefix marking a reversal transaction's entity type.
    pub const ROLLBACK_PREFIX: &'static str = "rollback_";

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The entity type a reversal of this type is recorded under.
    pub fn rollback_of(&self) -> EntityType {
        EntityType::new(format!("{}{}", Self::ROLLBACK_PREFIX, self.0))
    }

    pub fn is_rollback(&self) -> bool {
        self.0.starts_with(Self::ROLLBACK_PREFIX)
    }

    /// The underlying type with any reversal prefix stripped.
    pub fn base(&self) -> &str {
        self.0
            .strip_prefix(Self::ROLLBACK_PREFIX)
            .unwrap_or(&self.0)
    }
}

impl core::fmt::Display for EntityType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rollback_naming_round_trip() {
        let customers = EntityType::from_static("customers");
        let reversal = customers.rollback_of();

        assert_eq!(reversal.as_str(), "rollback_customers");
        assert!(reversal.is_rollback());
        assert!(!customers.is_rollback());
        assert_eq!(reversal.base(), "customers");
        assert_eq!(customers.base(), "customers");
    }
}
