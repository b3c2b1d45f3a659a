//! Graph Data Factory
//!
//! Utilities for generating realistic graph shapes against a live
//! [`GraphStore`]: single entities, batches, and pre-built scenarios for
//! common integration test cases.

use std::collections::{BTreeMap, HashMap};

use stratum_core::{Diff, GraphStore, Payload, Provenance, Value};
use uuid::Uuid;

pub struct GraphDataFactory;

/// A named graph shape built for a specific test, plus the ids an assertion
/// needs to refer back to.
#[derive(Debug)]
pub struct GraphScenario {
    pub node_ids: Vec<Uuid>,
    pub edge_ids: Vec<Uuid>,
    pub description: String,
    pub metadata: HashMap<String, Uuid>,
}

impl GraphDataFactory {
    /// Insert a single node with one string property.
    pub fn create_node(store: &GraphStore, label: &str, property: &str, value: &str) -> Uuid {
        let diff = store
            .insert_node(label, props(&[(property, Value::String(value.to_string()))]), Provenance::default())
            .expect("fixture insert should not fail");
        node_id(&diff)
    }

    /// Insert `count` nodes under `label`, numbering a `seq` property.
    pub fn create_batch(store: &GraphStore, label: &str, count: usize) -> Vec<Uuid> {
        (0..count)
            .map(|i| {
                let diff = store
                    .insert_node(label, props(&[("seq", Value::Int(i as i64))]), Provenance::default())
                    .expect("fixture insert should not fail");
                node_id(&diff)
            })
            .collect()
    }

    /// A small social-graph scenario: three people, two `knows` edges, one
    /// isolated organization node with no edges.
    pub fn create_social_scenario(store: &GraphStore) -> GraphScenario {
        let mut metadata = HashMap::new();
        let mut node_ids = Vec::new();
        let mut edge_ids = Vec::new();

        let alice = Self::create_node(store, "Person", "name", "Alice");
        let bob = Self::create_node(store, "Person", "name", "Bob");
        let carol = Self::create_node(store, "Person", "name", "Carol");
        node_ids.extend([alice, bob, carol]);
        metadata.insert("alice".to_string(), alice);
        metadata.insert("bob".to_string(), bob);
        metadata.insert("carol".to_string(), carol);

        let e1 = store.insert_edge(alice, bob, "knows", BTreeMap::new(), Provenance::default()).unwrap();
        let e2 = store.insert_edge(alice, carol, "knows", BTreeMap::new(), Provenance::default()).unwrap();
        edge_ids.push(edge_id(&e1));
        edge_ids.push(edge_id(&e2));

        let org = Self::create_node(store, "Organization", "name", "Acme");
        node_ids.push(org);
        metadata.insert("acme".to_string(), org);

        GraphScenario {
            node_ids,
            edge_ids,
            description: "three people, two `knows` edges, one unconnected organization".to_string(),
            metadata,
        }
    }

    /// A scenario with one property value repeated across several nodes and
    /// one unique value, for exercising property-index selectivity.
    pub fn create_property_scenario(store: &GraphStore) -> GraphScenario {
        let mut metadata = HashMap::new();
        let mut node_ids = Vec::new();

        for i in 0..4 {
            let id = store
                .insert_node("Document", props(&[("status", Value::String("draft".to_string())), ("seq", Value::Int(i))]), Provenance::default())
                .map(|d| node_id(&d))
                .unwrap();
            node_ids.push(id);
        }
        let published = store
            .insert_node("Document", props(&[("status", Value::String("published".to_string()))]), Provenance::default())
            .map(|d| node_id(&d))
            .unwrap();
        node_ids.push(published);
        metadata.insert("published".to_string(), published);

        GraphScenario {
            node_ids,
            edge_ids: Vec::new(),
            description: "four draft documents and one published document".to_string(),
            metadata,
        }
    }
}

fn props(pairs: &[(&str, Value)]) -> BTreeMap<String, Value> {
    pairs.iter().cloned().map(|(k, v)| (k.to_string(), v)).collect()
}

fn node_id(diff: &Diff) -> Uuid {
    match &diff.payload {
        Payload::Node(n) => n.id,
        Payload::Edge(_) => panic!("expected node payload"),
    }
}

fn edge_id(diff: &Diff) -> Uuid {
    match &diff.payload {
        Payload::Edge(e) => e.id,
        Payload::Node(_) => panic!("expected edge payload"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_batch_inserts_requested_count() {
        let store = GraphStore::new();
        let ids = GraphDataFactory::create_batch(&store, "Person", 10);
        assert_eq!(ids.len(), 10);
        assert_eq!(store.count_nodes(None), 10);
    }

    #[test]
    fn social_scenario_links_alice_to_bob_and_carol() {
        let store = GraphStore::new();
        let scenario = GraphDataFactory::create_social_scenario(&store);
        assert_eq!(scenario.node_ids.len(), 4);
        assert_eq!(scenario.edge_ids.len(), 2);
        assert!(scenario.metadata.contains_key("alice"));
        assert!(scenario.metadata.contains_key("acme"));
    }

    #[test]
    fn property_scenario_has_one_published_document() {
        let store = GraphStore::new();
        let scenario = GraphDataFactory::create_property_scenario(&store);
        assert_eq!(scenario.node_ids.len(), 5);
        assert!(scenario.metadata.contains_key("published"));
    }
}
