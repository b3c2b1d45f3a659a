//! Edge entity.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{new_id, normalize_properties, AccessMeta};
use crate::error::{CoreError, Result};
use crate::value::Value;

/// A graph edge: a directed, labelled relationship between two nodes.
///
/// `source_id`/`target_id` are validated against the live node set only at
/// insertion time; a node deleted afterwards does not invalidate an
/// already-inserted edge (the dangling policy).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub id: Uuid,
    pub source_id: Uuid,
    pub target_id: Uuid,
    pub relationship: String,
    pub properties: BTreeMap<String, Value>,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    access: AccessMeta,
}

impl Edge {
    pub fn new(
        source_id: Uuid,
        target_id: Uuid,
        relationship: impl Into<String>,
        properties: BTreeMap<String, Value>,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        let relationship = relationship.into();
        if relationship.trim().is_empty() {
            return Err(CoreError::InvalidEntity(
                "edge relationship must not be empty".to_string(),
            ));
        }
        Ok(Self {
            id: new_id(),
            source_id,
            target_id,
            relationship,
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

    #[must_use]
    pub fn with_access(&self, now: DateTime<Utc>) -> Self {
        Self {
            access: self.access.touched(now),
            ..self.clone()
        }
    }

    pub fn semantically_eq(&self, other: &Edge) -> bool {
        self.id == other.id
            && self.source_id == other.source_id
            && self.target_id == other.target_id
            && self.relationship == other.relationship
            && self.properties == other.properties
            && self.created_at == other.created_at
    }
}
