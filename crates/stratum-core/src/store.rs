//! Core facade: the single public entry point coordinating the diff
//! log, tier store, and index manager under one logical lock.

use std::collections::BTreeSet;
use std::sync::{Mutex, RwLock};

use chrono::Utc;
use uuid::Uuid;

use crate::config::StoreConfig;
use crate::diff::{Diff, DiffLog, LogicalClock, Op, Payload};
use crate::entity::{Edge, Node};
use crate::error::{CoreError, Result};
use crate::index::{intersect, EdgeIndex, NodeIndex};
use crate::query::{matches_property, opposite_endpoints, primary_tier, Direction, EdgeQuery, NodeQuery, QueryResult, Timing};
use crate::snapshot::{Snapshot, SnapshotMetadata};
use crate::tier::{Tier, TierStore};

/// Provenance tags a caller may attach to a mutation. Both are opaque
/// to the core.
#[derive(Debug, Clone, Default)]
pub struct Provenance {
    pub agent_id: Option<String>,
    pub session_id: Option<String>,
}

/// The in-memory graph knowledge store.
///
/// Construct with [`GraphStore::new`], operate through its public methods,
/// optionally [`GraphStore::export`], then drop. There is no background
/// task and no global/singleton state: everything reachable from a
/// `GraphStore` lives only as long as the value itself.
pub struct GraphStore {
    inner: RwLock<Inner>,
}

/// Tier residency is guarded by its own mutex so that query operations —
/// which only need a shared lock on the log/index — can still promote an
/// entity's tier on access. Tier membership never affects rollback or
/// index consistency (it carries no diffs, no index keys), so this
/// narrower lock cannot violate the facade's ordering guarantees.
struct Inner {
    nodes: Mutex<TierStore<Node>>,
    edges: Mutex<TierStore<Edge>>,
    node_index: NodeIndex,
    edge_index: EdgeIndex,
    log: DiffLog,
    clock: LogicalClock,
    config: StoreConfig,
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphStore {
    /// Constructs a store with no default tier limits — equivalent to
    /// `Self::with_config(StoreConfig::default())`.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Constructs a store from an explicit [`StoreConfig`].
    #[tracing::instrument(skip(config))]
    pub fn with_config(config: StoreConfig) -> Self {
        tracing::debug!(
            runtime_limit = ?config.default_runtime_limit,
            warm_limit = ?config.default_warm_limit,
            "constructed graph store"
        );
        Self {
            inner: RwLock::new(Inner {
                nodes: Mutex::new(TierStore::new()),
                edges: Mutex::new(TierStore::new()),
                node_index: NodeIndex::new(),
                edge_index: EdgeIndex::new(),
                log: DiffLog::new(),
                clock: LogicalClock::new(),
                config,
            }),
        }
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    #[tracing::instrument(skip(self, properties, provenance))]
    pub fn insert_node(
        &self,
        label: impl Into<String> + std::fmt::Debug,
        properties: std::collections::BTreeMap<String, crate::value::Value>,
        provenance: Provenance,
    ) -> Result<Diff> {
        let mut guard = self.inner.write().expect("graph store lock poisoned");
        let now = Utc::now();
        let node = Node::new(label, properties, now)?;
        let diff = Diff {
            id: Uuid::new_v4(),
            op: Op::InsertNode,
            timestamp: guard.clock.tick(),
            payload: Payload::Node(node.clone()),
            agent_id: provenance.agent_id,
            session_id: provenance.session_id,
        };
        guard.node_index.insert(&node);
        guard.nodes.lock().expect("tier lock poisoned").insert(node);
        guard.log.append(diff.clone());
        tracing::debug!(diff_id = %diff.id, "inserted node");
        Ok(diff)
    }

    #[tracing::instrument(skip(self, properties, provenance))]
    pub fn insert_edge(
        &self,
        source_id: Uuid,
        target_id: Uuid,
        relationship: impl Into<String> + std::fmt::Debug,
        properties: std::collections::BTreeMap<String, crate::value::Value>,
        provenance: Provenance,
    ) -> Result<Diff> {
        let mut guard = self.inner.write().expect("graph store lock poisoned");
        {
            let nodes = guard.nodes.lock().expect("tier lock poisoned");
            if !nodes.contains(source_id) {
                return Err(CoreError::UnknownEndpoint(source_id));
            }
            if !nodes.contains(target_id) {
                return Err(CoreError::UnknownEndpoint(target_id));
            }
        }
        let now = Utc::now();
        let edge = Edge::new(source_id, target_id, relationship, properties, now)?;
        let diff = Diff {
            id: Uuid::new_v4(),
            op: Op::InsertEdge,
            timestamp: guard.clock.tick(),
            payload: Payload::Edge(edge.clone()),
            agent_id: provenance.agent_id,
            session_id: provenance.session_id,
        };
        guard.edge_index.insert(&edge);
        guard.edges.lock().expect("tier lock poisoned").insert(edge);
        guard.log.append(diff.clone());
        tracing::debug!(diff_id = %diff.id, "inserted edge");
        Ok(diff)
    }

    #[tracing::instrument(skip(self, provenance))]
    pub fn delete_node(&self, id: Uuid, provenance: Provenance) -> Result<Diff> {
        let mut guard = self.inner.write().expect("graph store lock poisoned");
        let removed = guard
            .nodes
            .lock()
            .expect("tier lock poisoned")
            .remove(id)
            .ok_or(CoreError::NotFound(id))?;
        guard.node_index.remove(id);
        let diff = Diff {
            id: Uuid::new_v4(),
            op: Op::DeleteNode,
            timestamp: guard.clock.tick(),
            payload: Payload::Node(removed),
            agent_id: provenance.agent_id,
            session_id: provenance.session_id,
        };
        guard.log.append(diff.clone());
        tracing::debug!(diff_id = %diff.id, "deleted node");
        Ok(diff)
    }

    #[tracing::instrument(skip(self, provenance))]
    pub fn delete_edge(&self, id: Uuid, provenance: Provenance) -> Result<Diff> {
        let mut guard = self.inner.write().expect("graph store lock poisoned");
        let removed = guard
            .edges
            .lock()
            .expect("tier lock poisoned")
            .remove(id)
            .ok_or(CoreError::NotFound(id))?;
        guard.edge_index.remove(id);
        let diff = Diff {
            id: Uuid::new_v4(),
            op: Op::DeleteEdge,
            timestamp: guard.clock.tick(),
            payload: Payload::Edge(removed),
            agent_id: provenance.agent_id,
            session_id: provenance.session_id,
        };
        guard.log.append(diff.clone());
        tracing::debug!(diff_id = %diff.id, "deleted edge");
        Ok(diff)
    }

    // ------------------------------------------------------------------
    // Rollback
    // ------------------------------------------------------------------

    #[tracing::instrument(skip(self))]
    pub fn rollback(&self, steps: usize) -> Result<()> {
        if steps == 0 {
            return Ok(());
        }
        let mut guard = self.inner.write().expect("graph store lock poisoned");
        let inverses = guard.log.last_k_reversed(steps)?;
        for inverse_source in &inverses {
            apply_inverse(&mut guard, inverse_source);
        }
        guard.log.truncate_last(steps);
        tracing::info!(steps, "rolled back");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub fn rollback_to_timestamp(&self, t: i64) -> Result<()> {
        let mut guard = self.inner.write().expect("graph store lock poisoned");
        let steps = guard.log.steps_after(t)?;
        if steps == 0 {
            return Ok(());
        }
        let inverses = guard.log.last_k_reversed(steps)?;
        for inverse_source in &inverses {
            apply_inverse(&mut guard, inverse_source);
        }
        guard.log.truncate_last(steps);
        tracing::info!(steps, timestamp = t, "rolled back to timestamp");
        Ok(())
    }

    /// Ordered view of the full diff log.
    ///
    /// Returns an owned copy rather than a borrowed slice: the facade holds
    /// its state behind a lock, so there is no lifetime a `&[Diff]` could
    /// safely carry past this call. This mirrors query results, which also
    /// own independent copies of what they return.
    pub fn diff_history(&self) -> Vec<Diff> {
        let guard = self.inner.read().expect("graph store lock poisoned");
        guard.log.entries().to_vec()
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn query_nodes(&self, query: &NodeQuery) -> QueryResult<Node> {
        let timing = Timing::start();
        let guard = self.inner.read().expect("graph store lock poisoned");

        let mut candidates: Option<BTreeSet<Uuid>> = None;
        let mut unhashable: Vec<(String, crate::value::Value)> = Vec::new();

        if let Some(label) = &query.label {
            candidates = Some(guard.node_index.by_label(label).cloned().unwrap_or_default());
        }
        for (name, value) in &query.properties {
            if value.is_hashable() {
                let set = guard.node_index.by_property(name, value).cloned().unwrap_or_default();
                candidates = Some(match candidates {
                    Some(existing) => intersect(&existing, &set),
                    None => set,
                });
            } else {
                unhashable.push((name.clone(), value.clone()));
            }
        }

        let universe = candidates.unwrap_or_else(|| guard.node_index.all_labelled_ids());

        let mut nodes_tier = guard.nodes.lock().expect("tier lock poisoned");
        let now = Utc::now();
        let mut items = Vec::new();
        let mut tiers = Vec::new();
        for id in universe {
            // Capture the tier the entity was resident in *before* `get`
            // promotes it, so `primary_tier` reflects where results were
            // actually drawn from rather than always reporting `Runtime`.
            let source_tier = nodes_tier.tier_of(id);
            let Some(node) = nodes_tier.get(id, now) else {
                continue;
            };
            if unhashable
                .iter()
                .all(|(name, expected)| matches_property(&node.properties, name, expected))
            {
                if let Some(t) = source_tier {
                    tiers.push(t);
                }
                items.push(node);
            }
        }
        items.sort_by_key(|n| n.id);

        QueryResult {
            items,
            duration: timing.elapsed(),
            primary_tier: primary_tier(&tiers),
        }
    }

    pub fn query_edges(&self, query: &EdgeQuery) -> QueryResult<Edge> {
        let timing = Timing::start();
        let guard = self.inner.read().expect("graph store lock poisoned");

        let mut candidates: Option<BTreeSet<Uuid>> = None;
        let mut unhashable: Vec<(String, crate::value::Value)> = Vec::new();

        if let Some(relationship) = &query.relationship {
            candidates = Some(guard.edge_index.by_relationship(relationship).cloned().unwrap_or_default());
        }
        if let Some(source_id) = query.source_id {
            let set = guard.edge_index.by_source(source_id).cloned().unwrap_or_default();
            candidates = Some(match candidates {
                Some(existing) => intersect(&existing, &set),
                None => set,
            });
        }
        if let Some(target_id) = query.target_id {
            let set = guard.edge_index.by_target(target_id).cloned().unwrap_or_default();
            candidates = Some(match candidates {
                Some(existing) => intersect(&existing, &set),
                None => set,
            });
        }
        for (name, value) in &query.properties {
            if value.is_hashable() {
                let set = guard.edge_index.by_property(name, value).cloned().unwrap_or_default();
                candidates = Some(match candidates {
                    Some(existing) => intersect(&existing, &set),
                    None => set,
                });
            } else {
                unhashable.push((name.clone(), value.clone()));
            }
        }

        let universe = candidates.unwrap_or_else(|| guard.edge_index.all_ids());

        let mut edges_tier = guard.edges.lock().expect("tier lock poisoned");
        let now = Utc::now();
        let mut items = Vec::new();
        let mut tiers = Vec::new();
        for id in universe {
            // See the matching comment in `query_nodes`: read the tier
            // before the promoting fetch, not after.
            let source_tier = edges_tier.tier_of(id);
            let Some(edge) = edges_tier.get(id, now) else {
                continue;
            };
            if unhashable
                .iter()
                .all(|(name, expected)| matches_property(&edge.properties, name, expected))
            {
                if let Some(t) = source_tier {
                    tiers.push(t);
                }
                items.push(edge);
            }
        }
        items.sort_by_key(|e| e.id);

        QueryResult {
            items,
            duration: timing.elapsed(),
            primary_tier: primary_tier(&tiers),
        }
    }

    pub fn query_connected_nodes(
        &self,
        start: Uuid,
        relationship: &str,
        direction: Direction,
    ) -> QueryResult<Node> {
        let timing = Timing::start();
        let guard = self.inner.read().expect("graph store lock poisoned");

        let endpoint_set = match direction {
            Direction::Outgoing => guard.edge_index.by_source(start).cloned().unwrap_or_default(),
            Direction::Incoming => guard.edge_index.by_target(start).cloned().unwrap_or_default(),
            Direction::Both => {
                let src = guard.edge_index.by_source(start).cloned().unwrap_or_default();
                let tgt = guard.edge_index.by_target(start).cloned().unwrap_or_default();
                src.union(&tgt).copied().collect()
            }
        };
        let relationship_set = guard.edge_index.by_relationship(relationship).cloned().unwrap_or_default();
        let matching_edges = intersect(&endpoint_set, &relationship_set);

        let mut edges_tier = guard.edges.lock().expect("tier lock poisoned");
        let now = Utc::now();
        let mut edges = Vec::new();
        for id in matching_edges {
            if let Some(edge) = edges_tier.get(id, now) {
                edges.push(edge);
            }
        }
        drop(edges_tier);

        let edge_refs: Vec<&Edge> = edges.iter().collect();
        let endpoints = opposite_endpoints(&edge_refs, direction, start);

        let mut nodes_tier = guard.nodes.lock().expect("tier lock poisoned");
        let mut items = Vec::new();
        let mut tiers = Vec::new();
        for id in endpoints {
            let source_tier = nodes_tier.tier_of(id);
            let Some(node) = nodes_tier.get(id, now) else {
                // Dangling endpoint: the node was deleted after this edge
                // was inserted. Skipped silently per the dangling policy.
                continue;
            };
            if let Some(t) = source_tier {
                tiers.push(t);
            }
            items.push(node);
        }
        items.sort_by_key(|n| n.id);

        QueryResult {
            items,
            duration: timing.elapsed(),
            primary_tier: primary_tier(&tiers),
        }
    }

    /// Direct lookup by id: probes runtime, then warm, then cold,
    /// promoting the entity into runtime on a hit. Exposes the tier store's
    /// lookup primitive at the facade so a caller can target a specific
    /// entity without going through a query's posting-set machinery.
    pub fn get_node(&self, id: Uuid) -> Option<Node> {
        let guard = self.inner.read().expect("graph store lock poisoned");
        guard.nodes.lock().expect("tier lock poisoned").get(id, Utc::now())
    }

    /// See [`GraphStore::get_node`].
    pub fn get_edge(&self, id: Uuid) -> Option<Edge> {
        let guard = self.inner.read().expect("graph store lock poisoned");
        guard.edges.lock().expect("tier lock poisoned").get(id, Utc::now())
    }

    // ------------------------------------------------------------------
    // Counts and pruning
    // ------------------------------------------------------------------

    pub fn count_nodes(&self, tier: Option<Tier>) -> usize {
        let guard = self.inner.read().expect("graph store lock poisoned");
        guard.nodes.lock().expect("tier lock poisoned").count(tier)
    }

    pub fn count_edges(&self, tier: Option<Tier>) -> usize {
        let guard = self.inner.read().expect("graph store lock poisoned");
        guard.edges.lock().expect("tier lock poisoned").count(tier)
    }

    #[tracing::instrument(skip(self))]
    pub fn prune(&self, runtime_limit: Option<usize>, warm_limit: Option<usize>) -> usize {
        let guard = self.inner.read().expect("graph store lock poisoned");
        let node_demoted = guard.nodes.lock().expect("tier lock poisoned").prune(runtime_limit, warm_limit);
        let edge_demoted = guard.edges.lock().expect("tier lock poisoned").prune(runtime_limit, warm_limit);
        let total = node_demoted + edge_demoted;
        tracing::debug!(demoted = total, "pruned");
        total
    }

    /// Applies [`StoreConfig`]'s configured tier limits, as given to
    /// [`GraphStore::with_config`]. A no-op for any tier whose limit is
    /// `None`.
    pub fn prune_to_config(&self) -> usize {
        let (runtime_limit, warm_limit) = {
            let guard = self.inner.read().expect("graph store lock poisoned");
            (guard.config.default_runtime_limit, guard.config.default_warm_limit)
        };
        self.prune(runtime_limit, warm_limit)
    }

    // ------------------------------------------------------------------
    // Export / import
    // ------------------------------------------------------------------

    pub fn export(&self) -> Snapshot {
        let guard = self.inner.read().expect("graph store lock poisoned");
        let nodes: Vec<Node> = guard.nodes.lock().expect("tier lock poisoned").iter_all().cloned().collect();
        let edges: Vec<Edge> = guard.edges.lock().expect("tier lock poisoned").iter_all().cloned().collect();
        let diffs = guard.log.entries().to_vec();
        Snapshot {
            metadata: SnapshotMetadata {
                total_nodes: nodes.len(),
                total_edges: edges.len(),
                total_diffs: diffs.len(),
                export_time: Utc::now(),
            },
            nodes,
            edges,
            diffs,
        }
    }

    /// Reconstructs a store from a snapshot. Every entity re-enters the
    /// runtime tier and indexes are rebuilt from scratch — the schema does
    /// not carry index state. Returns `Result` to match the
    /// facade's other constructive operations even though, in this
    /// implementation, rebuilding from an already-validated snapshot cannot
    /// fail.
    pub fn import(snapshot: Snapshot) -> Result<Self> {
        let store = Self::new();
        {
            let mut guard = store.inner.write().expect("graph store lock poisoned");
            for node in snapshot.nodes {
                guard.node_index.insert(&node);
                guard.nodes.lock().expect("tier lock poisoned").insert(node);
            }
            for edge in snapshot.edges {
                guard.edge_index.insert(&edge);
                guard.edges.lock().expect("tier lock poisoned").insert(edge);
            }
            for diff in snapshot.diffs {
                guard.log.append(diff);
            }
        }
        Ok(store)
    }
}

/// Applies the inverse of `source` (whose `op` is the diff *being rolled
/// back*, not yet inverted) through the normal tier/index update path,
/// without appending a new diff to the log.
fn apply_inverse(guard: &mut Inner, source: &Diff) {
    let inverse = source.inverse();
    match (&inverse.op, &inverse.payload) {
        (Op::InsertNode, Payload::Node(node)) => {
            guard.node_index.insert(node);
            guard.nodes.lock().expect("tier lock poisoned").insert(node.clone());
        }
        (Op::DeleteNode, Payload::Node(node)) => {
            guard.node_index.remove(node.id);
            guard.nodes.lock().expect("tier lock poisoned").remove(node.id);
        }
        (Op::InsertEdge, Payload::Edge(edge)) => {
            guard.edge_index.insert(edge);
            guard.edges.lock().expect("tier lock poisoned").insert(edge.clone());
        }
        (Op::DeleteEdge, Payload::Edge(edge)) => {
            guard.edge_index.remove(edge.id);
            guard.edges.lock().expect("tier lock poisoned").remove(edge.id);
        }
        _ => unreachable!("op/payload kind always match"),
    }
}
