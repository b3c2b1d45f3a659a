//! Node entity.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{new_id, normalize_properties, AccessMeta};
use crate::error::{CoreError, Result};
use crate::value::Value;

/// A graph node: an identified, labelled bag of properties.
///
/// Construction is the only way to obtain a `Node`; once built its `id`,
/// `label`, `properties`, and `created_at` never change. The only
/// permitted derivation is [`Node::with_access`], which returns a new value
/// with refreshed access metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: Uuid,
    pub label: String,
    pub properties: BTreeMap<String, Value>,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    access: AccessMeta,
}

impl Node {
    /// Builds a new node, failing with [`CoreError::InvalidEntity`] on an
    /// empty label or a malformed property key.
    pub fn new(
        label: impl Into<String>,
        properties: BTreeMap<String, Value>,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        let label = label.into();
        if label.trim().is_empty() {
            return Err(CoreError::InvalidEntity(
                "node label must not be empty".to_string(),
            ));
        }
        Ok(Self {
            id: new_id(),
            label,
            properties: normalize_properties(properties)?,
            created_at: now,
            access: AccessMeta::new(now),
        })
    }

    pub fn access_count(&self) -> u64 {
        self.access.access_count
    }

    pub fn last_accessed(&self) -> DateTime<Utc> {
        self.access.last_accessed
    }

    /// Returns a copy of this node with incremented access metadata.
    /// This is the sole permitted "mutation" of a live node and is observed
    /// only by the tier store, never returned from a query result.
    #[must_use]
    pub fn with_access(&self, now: DateTime<Utc>) -> Self {
        Self {
            access: self.access.touched(now),
            ..self.clone()
        }
    }

    /// Equality ignoring access metadata, matching the public API's notion
    /// of entity equality.
    pub fn semantically_eq(&self, other: &Node) -> bool {
        self.id == other.id
            && self.label == other.label
            && self.properties == other.properties
            && self.created_at == other.created_at
    }
}
