//! Export/import snapshot schema.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::diff::Diff;
use crate::entity::{Edge, Node};

/// Aggregate counts and the export timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    pub total_nodes: usize,
    pub total_edges: usize,
    pub total_diffs: usize,
    pub export_time: DateTime<Utc>,
}

/// A self-describing snapshot of the full live state plus the full diff
/// log, sufficient to reconstruct an identical store.
///
/// Index state is deliberately not part of this schema: `import` rebuilds
/// all indexes from `nodes`/`edges` rather than trusting any serialized
/// index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub metadata: SnapshotMetadata,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub diffs: Vec<Diff>,
}
