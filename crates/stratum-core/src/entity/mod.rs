//! Immutable node/edge value objects.

mod edge;
mod node;

pub use edge::Edge;
pub use node::Node;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{CoreError, Result};
use crate::value::Value;

/// Access metadata shared by nodes and edges.
///
/// Never part of public equality: `access_count`/`last_accessed` are used
/// only by the tier store and are not semantic fields of the entity.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AccessMeta {
    pub access_count: u64,
    pub last_accessed: DateTime<Utc>,
}

impl AccessMeta {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            access_count: 0,
            last_accessed: now,
        }
    }

    fn touched(&self, now: DateTime<Utc>) -> Self {
        Self {
            access_count: self.access_count + 1,
            last_accessed: now,
        }
    }
}

/// Deep-copies a property map and validates that every key is non-empty.
///
/// Containers nested inside `Value::List`/`Value::Map` are owned values
/// already (not references), so the clone here is a full deep copy:
/// nothing in the caller's original map can be reached again through the
/// stored entity.
pub(crate) fn normalize_properties(
    properties: BTreeMap<String, Value>,
) -> Result<BTreeMap<String, Value>> {
    for key in properties.keys() {
        if key.is_empty() {
            return Err(CoreError::InvalidEntity(
                "property key must not be empty".to_string(),
            ));
        }
    }
    Ok(properties)
}

pub(crate) fn new_id() -> Uuid {
    Uuid::new_v4()
}
