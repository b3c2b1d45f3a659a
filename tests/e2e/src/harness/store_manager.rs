//! Test Store Manager
//!
//! Provides isolated [`GraphStore`] instances for integration tests:
//! - Fresh stores seeded with varying shapes of data
//! - Snapshot/restore helpers for exercising export/import end to end
//! - Deterministic access-pattern seeding for tier and pruning tests

use std::collections::BTreeMap;

use stratum_core::{GraphStore, NodeQuery, Provenance, Snapshot, Value};
use uuid::Uuid;

/// Wraps a fresh [`GraphStore`] with seeding helpers shared across the
/// integration suite. Each test constructs its own manager — there is no
/// shared or global store.
pub struct TestStoreManager {
    pub store: GraphStore,
    snapshot: Option<Snapshot>,
}

impl TestStoreManager {
    pub fn new() -> Self {
        Self { store: GraphStore::new(), snapshot: None }
    }

    /// Seed `count` bare `Person` nodes, returning their ids in insertion order.
    pub fn seed_nodes(&mut self, count: usize) -> Vec<Uuid> {
        (0..count)
            .map(|i| {
                let diff = self
                    .store
                    .insert_node("Person", props(&[("name", Value::String(format!("person-{i}")))]), Provenance::default())
                    .expect("seed insert should not fail");
                node_id(&diff)
            })
            .collect()
    }

    /// Seed `count_per_label` nodes under each of a handful of distinct labels.
    pub fn seed_diverse(&mut self, count_per_label: usize) -> Vec<Uuid> {
        let labels = ["Person", "Organization", "Document", "Tag"];
        let mut ids = Vec::with_capacity(count_per_label * labels.len());
        for label in labels {
            for i in 0..count_per_label {
                let diff = self
                    .store
                    .insert_node(label, props(&[("seq", Value::Int(i as i64))]), Provenance::default())
                    .expect("seed insert should not fail");
                ids.push(node_id(&diff));
            }
        }
        ids
    }

    /// Seed `count` nodes, connecting each consecutive pair with a `knows`
    /// edge, returning (node_ids, edge_ids).
    pub fn seed_chain(&mut self, count: usize) -> (Vec<Uuid>, Vec<Uuid>) {
        let node_ids = self.seed_nodes(count);
        let mut edge_ids = Vec::new();
        for pair in node_ids.windows(2) {
            let diff = self
                .store
                .insert_edge(pair[0], pair[1], "knows", BTreeMap::new(), Provenance::default())
                .expect("seed edge insert should not fail");
            edge_ids.push(edge_id(&diff));
        }
        (node_ids, edge_ids)
    }

    /// Seed `count` nodes, then touch the first `hot` of them `reads` times
    /// each via [`GraphStore::get_node`] — used to give promotion/demotion
    /// tests a deterministic access-count ordering.
    pub fn seed_with_access_pattern(&mut self, count: usize, hot: usize, reads: usize) -> Vec<Uuid> {
        let ids = self.seed_nodes(count);
        for id in ids.iter().take(hot) {
            for _ in 0..reads {
                self.store.get_node(*id);
            }
        }
        ids
    }

    /// Record the current state for later restoration via [`Self::restore_snapshot`].
    pub fn take_snapshot(&mut self) {
        self.snapshot = Some(self.store.export());
    }

    pub fn has_snapshot(&self) -> bool {
        self.snapshot.is_some()
    }

    /// Replace the managed store with one rebuilt from the last snapshot.
    pub fn restore_snapshot(&mut self) -> bool {
        let Some(snapshot) = self.snapshot.clone() else {
            return false;
        };
        self.store = GraphStore::import(snapshot).expect("restore from a valid snapshot cannot fail");
        true
    }

    /// Delete every node currently visible to an unconstrained query. Edges
    /// dangling off deleted nodes are left in place, matching the store's
    /// dangling-edge policy.
    pub fn clear(&mut self) {
        let all = self.store.query_nodes(&NodeQuery::new());
        for node in all.items {
            let _ = self.store.delete_node(node.id, Provenance::default());
        }
    }

    pub fn node_count(&self) -> usize {
        self.store.count_nodes(None)
    }

    pub fn is_empty(&self) -> bool {
        self.node_count() == 0
    }
}

impl Default for TestStoreManager {
    fn default() -> Self {
        Self::new()
    }
}

fn props(pairs: &[(&str, Value)]) -> BTreeMap<String, Value> {
    pairs.iter().cloned().map(|(k, v)| (k.to_string(), v)).collect()
}

fn node_id(diff: &stratum_core::Diff) -> Uuid {
    match &diff.payload {
        stratum_core::Payload::Node(n) => n.id,
        stratum_core::Payload::Edge(_) => panic!("expected node payload"),
    }
}

fn edge_id(diff: &stratum_core::Diff) -> Uuid {
    match &diff.payload {
        stratum_core::Payload::Edge(e) => e.id,
        stratum_core::Payload::Node(_) => panic!("expected edge payload"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_manager_is_empty() {
        let manager = TestStoreManager::new();
        assert!(manager.is_empty());
    }

    #[test]
    fn seed_nodes_reports_accurate_count() {
        let mut manager = TestStoreManager::new();
        let ids = manager.seed_nodes(10);
        assert_eq!(ids.len(), 10);
        assert_eq!(manager.node_count(), 10);
    }

    #[test]
    fn seed_diverse_covers_every_label() {
        let mut manager = TestStoreManager::new();
        let ids = manager.seed_diverse(3);
        assert_eq!(ids.len(), 12);
        assert_eq!(manager.node_count(), 12);
    }

    #[test]
    fn clear_removes_every_node() {
        let mut manager = TestStoreManager::new();
        manager.seed_nodes(5);
        manager.clear();
        assert!(manager.is_empty());
    }

    #[test]
    fn snapshot_restore_round_trips_node_count() {
        let mut manager = TestStoreManager::new();
        manager.seed_nodes(5);
        manager.take_snapshot();
        manager.clear();
        assert!(manager.is_empty());
        manager.restore_snapshot();
        assert_eq!(manager.node_count(), 5);
    }
}
