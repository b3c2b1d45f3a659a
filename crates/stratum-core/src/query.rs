//! Query engine.

use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::entity::Edge;
use crate::tier::Tier;
use crate::value::Value;

/// Traversal direction for a connected-node query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Outgoing,
    Incoming,
    Both,
}

/// Equality constraints composing a node query: all AND-composed.
#[derive(Debug, Clone, Default)]
pub struct NodeQuery {
    pub label: Option<String>,
    pub properties: Vec<(String, Value)>,
}

impl NodeQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, value: Value) -> Self {
        self.properties.push((name.into(), value));
        self
    }
}

/// Equality constraints composing an edge query: all AND-composed.
#[derive(Debug, Clone, Default)]
pub struct EdgeQuery {
    pub relationship: Option<String>,
    pub source_id: Option<Uuid>,
    pub target_id: Option<Uuid>,
    pub properties: Vec<(String, Value)>,
}

impl EdgeQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_relationship(mut self, relationship: impl Into<String>) -> Self {
        self.relationship = Some(relationship.into());
        self
    }

    pub fn with_source(mut self, source_id: Uuid) -> Self {
        self.source_id = Some(source_id);
        self
    }

    pub fn with_target(mut self, target_id: Uuid) -> Self {
        self.target_id = Some(target_id);
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, value: Value) -> Self {
        self.properties.push((name.into(), value));
        self
    }
}

/// Result of a node or edge query: materialised entities plus the
/// observability fields callers need for tier/latency diagnostics.
#[derive(Debug, Clone)]
pub struct QueryResult<T> {
    pub items: Vec<T>,
    pub duration: Duration,
    pub primary_tier: Option<Tier>,
}

pub(crate) struct Timing {
    start: Instant,
}

impl Timing {
    pub(crate) fn start() -> Self {
        Self { start: Instant::now() }
    }

    pub(crate) fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Picks the tier from which the majority of materialised results were
/// drawn ("primary tier"). Ties resolve to the hottest tier involved,
/// matching the intuition that a mixed-tier result is "at least as hot as"
/// its most common tier.
pub(crate) fn primary_tier(tiers: &[Tier]) -> Option<Tier> {
    if tiers.is_empty() {
        return None;
    }
    let mut runtime = 0usize;
    let mut warm = 0usize;
    let mut cold = 0usize;
    for t in tiers {
        match t {
            Tier::Runtime => runtime += 1,
            Tier::Warm => warm += 1,
            Tier::Cold => cold += 1,
        }
    }
    [(Tier::Runtime, runtime), (Tier::Warm, warm), (Tier::Cold, cold)]
        .into_iter()
        .max_by_key(|(_, count)| *count)
        .map(|(tier, _)| tier)
}

/// Filters a set of candidate entities by the unhashable-valued property
/// constraints a posting-set intersection could not apply.
pub(crate) fn matches_property(properties: &std::collections::BTreeMap<String, Value>, name: &str, expected: &Value) -> bool {
    properties.get(name).map(|actual| actual == expected).unwrap_or(false)
}

/// Node entity identifiers reachable from `edges` in the given direction,
/// deduplicated.
pub(crate) fn opposite_endpoints(edges: &[&Edge], direction: Direction, start: Uuid) -> BTreeSet<Uuid> {
    let mut out = BTreeSet::new();
    for edge in edges {
        match direction {
            Direction::Outgoing => {
                if edge.source_id == start {
                    out.insert(edge.target_id);
                }
            }
            Direction::Incoming => {
                if edge.target_id == start {
                    out.insert(edge.source_id);
                }
            }
            Direction::Both => {
                if edge.source_id == start {
                    out.insert(edge.target_id);
                }
                if edge.target_id == start {
                    out.insert(edge.source_id);
                }
            }
        }
    }
    out
}
