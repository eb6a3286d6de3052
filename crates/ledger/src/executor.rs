//! Mutation execution seam.
//!
//! The ledger records history but never touches stored data itself; undoing
//! an operation goes through a [`MutationExecutor`] supplied by the caller.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde_json::Value as JsonValue;

use windlass_core::EntityType;

use crate::operation::{OperationDraft, OperationKind};

/// Failure reported by a mutation executor.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct MutationError {
    pub message: String,
}

impl MutationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Applies entity mutations on behalf of the ledger.
///
/// Implementations must be safe to call from multiple threads; the ledger
/// holds no lock of its own while executing.
pub trait MutationExecutor: Send + Sync {
    fn create(
        &self,
        entity_type: &EntityType,
        entity_id: &str,
        data: &JsonValue,
    ) -> Result<(), MutationError>;

    fn update(
        &self,
        entity_type: &EntityType,
        entity_id: &str,
        data: &JsonValue,
    ) -> Result<(), MutationError>;

    fn delete(&self, entity_type: &EntityType, entity_id: &str) -> Result<(), MutationError>;
}

impl<E: MutationExecutor + ?Sized> MutationExecutor for Arc<E> {
    fn create(
        &self,
        entity_type: &EntityType,
        entity_id: &str,
        data: &JsonValue,
    ) -> Result<(), MutationError> {
        (**self).create(entity_type, entity_id, data)
    }

    fn update(
        &self,
        entity_type: &EntityType,
        entity_id: &str,
        data: &JsonValue,
    ) -> Result<(), MutationError> {
        (**self).update(entity_type, entity_id, data)
    }

    fn delete(&self, entity_type: &EntityType, entity_id: &str) -> Result<(), MutationError> {
        (**self).delete(entity_type, entity_id)
    }
}

/// Apply a draft through an executor, dispatching on the operation kind.
pub(crate) fn apply_draft<E: MutationExecutor + ?Sized>(
    executor: &E,
    draft: &OperationDraft,
) -> Result<(), MutationError> {
    match &draft.kind {
        OperationKind::Create { after } => {
            executor.create(&draft.entity_type, &draft.entity_id, after)
        }
        OperationKind::Update { after, .. } => {
            executor.update(&draft.entity_type, &draft.entity_id, after)
        }
        OperationKind::Delete { .. } => executor.delete(&draft.entity_type, &draft.entity_id),
    }
}

/// JSON-document executor backed by an in-process map.
///
/// Strict about row existence so that replayed inverses surface drift:
/// creating an existing row or touching a missing one is an error.
pub struct InMemoryExecutor {
    rows: RwLock<HashMap<(String, String), JsonValue>>,
}

impl InMemoryExecutor {
    pub fn new() -> Self {
        Self { rows: RwLock::new(HashMap::new()) }
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    pub fn get(&self, entity_type: &EntityType, entity_id: &str) -> Option<JsonValue> {
        let rows = self.rows.read().unwrap();
        rows.get(&(entity_type.as_str().to_owned(), entity_id.to_owned())).cloned()
    }

    pub fn len(&self) -> usize {
        self.rows.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.read().unwrap().is_empty()
    }
}

impl Default for InMemoryExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl MutationExecutor for InMemoryExecutor {
    fn create(
        &self,
        entity_type: &EntityType,
        entity_id: &str,
        data: &JsonValue,
    ) -> Result<(), MutationError> {
        let mut rows = self.rows.write().unwrap();
        let key = (entity_type.as_str().to_owned(), entity_id.to_owned());
        if rows.contains_key(&key) {
            return Err(MutationError::new(format!(
                "{} {} already exists",
                entity_type, entity_id
            )));
        }
        rows.insert(key, data.clone());
        Ok(())
    }

    fn update(
        &self,
        entity_type: &EntityType,
        entity_id: &str,
        data: &JsonValue,
    ) -> Result<(), MutationError> {
        let mut rows = self.rows.write().unwrap();
        let key = (entity_type.as_str().to_owned(), entity_id.to_owned());
        match rows.get_mut(&key) {
            Some(row) => {
                *row = data.clone();
                Ok(())
            }
            None => Err(MutationError::new(format!("{} {} not found", entity_type, entity_id))),
        }
    }

    fn delete(&self, entity_type: &EntityType, entity_id: &str) -> Result<(), MutationError> {
        let mut rows = self.rows.write().unwrap();
        let key = (entity_type.as_str().to_owned(), entity_id.to_owned());
        match rows.remove(&key) {
            Some(_) => Ok(()),
            None => Err(MutationError::new(format!("{} {} not found", entity_type, entity_id))),
        }
    }
}
