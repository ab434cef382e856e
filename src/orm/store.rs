//! Storage contract consumed by actions.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::error::ErrorCode;
use crate::orm::schema::EntitySchema;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("unknown entity {0}")]
    UnknownEntity(String),

    #[error("unknown object {entity}#{id}")]
    UnknownObject { entity: String, id: u64 },

    /// A field value rejected by the store, e.g. `missing_mandatory`.
    #[error("field {field} rejected: {code}")]
    Validation { field: String, code: String },
}

impl StoreError {
    pub fn class(&self) -> ErrorCode {
        match self {
            StoreError::UnknownEntity(_) | StoreError::UnknownObject { .. } => ErrorCode::UnknownObject,
            StoreError::Validation { .. } => ErrorCode::InvalidParam,
        }
    }

    /// Message part of the wire payload.
    pub fn message(&self) -> Value {
        match self {
            StoreError::UnknownEntity(entity) => Value::String(entity.clone()),
            StoreError::UnknownObject { id, .. } => Value::from(*id),
            StoreError::Validation { field, code } => {
                let mut map = Map::new();
                map.insert(field.clone(), Value::String(code.clone()));
                Value::Object(map)
            }
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Id-based access to entity objects.
pub trait ObjectStore {
    fn model(&self, entity: &str) -> Option<&EntitySchema>;

    /// Values of `fields` for each id, in `lang`; `id` is always included.
    fn read(
        &self,
        entity: &str,
        ids: &[u64],
        fields: &[&str],
        lang: &str,
    ) -> StoreResult<Vec<Map<String, Value>>>;

    fn create(&mut self, entity: &str, values: Map<String, Value>, lang: &str) -> StoreResult<u64>;

    /// Write `values` to every object, validating the result first.
    fn update(
        &mut self,
        entity: &str,
        ids: &[u64],
        values: &Map<String, Value>,
        lang: &str,
    ) -> StoreResult<()>;

    /// Duplicate objects, returning the new ids in order.
    fn clone_objects(&mut self, entity: &str, ids: &[u64], lang: &str) -> StoreResult<Vec<u64>>;
}
