//! B-tree-backed secondary indexes.

use std::collections::{BTreeMap, BTreeSet};

use uuid::Uuid;

use crate::entity::{Edge, Node};
use crate::value::Value;

type PropertyKey = (String, crate::value::HashableValue);

/// Ordered posting set for one index key.
type Posting = BTreeSet<Uuid>;

/// Every index key an entity was inserted under, so deletion never needs a
/// reverse scan over the index contents.
#[derive(Debug, Default, Clone)]
struct EntryKeys {
    label_or_relationship: Option<String>,
    source_id: Option<Uuid>,
    target_id: Option<Uuid>,
    properties: Vec<PropertyKey>,
}

/// Secondary indexes over node labels and properties.
#[derive(Debug, Default)]
pub struct NodeIndex {
    by_label: BTreeMap<String, Posting>,
    by_property: BTreeMap<PropertyKey, Posting>,
    keys_of: BTreeMap<Uuid, EntryKeys>,
}

impl NodeIndex {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, node: &Node) {
        let mut keys = EntryKeys::default();
        self.by_label
            .entry(node.label.clone())
            .or_default()
            .insert(node.id);
        keys.label_or_relationship = Some(node.label.clone());

        for (name, value) in &node.properties {
            if value.is_hashable() {
                let key = (name.clone(), value.index_key());
                self.by_property.entry(key.clone()).or_default().insert(node.id);
                keys.properties.push(key);
            }
        }
        self.keys_of.insert(node.id, keys);
    }

    pub(crate) fn remove(&mut self, id: Uuid) {
        let Some(keys) = self.keys_of.remove(&id) else {
            return;
        };
        if let Some(label) = keys.label_or_relationship {
            if let Some(set) = self.by_label.get_mut(&label) {
                set.remove(&id);
                if set.is_empty() {
                    self.by_label.remove(&label);
                }
            }
        }
        for key in keys.properties {
            if let Some(set) = self.by_property.get_mut(&key) {
                set.remove(&id);
                if set.is_empty() {
                    self.by_property.remove(&key);
                }
            }
        }
    }

    pub(crate) fn by_label(&self, label: &str) -> Option<&Posting> {
        self.by_label.get(label)
    }

    pub(crate) fn by_property(&self, name: &str, value: &Value) -> Option<&Posting> {
        if !value.is_hashable() {
            return None;
        }
        self.by_property.get(&(name.to_string(), value.index_key()))
    }

    pub(crate) fn all_labelled_ids(&self) -> Posting {
        self.keys_of.keys().copied().collect()
    }
}

/// Secondary indexes over edge relationships, endpoints, and properties.
#[derive(Debug, Default)]
pub struct EdgeIndex {
    by_relationship: BTreeMap<String, Posting>,
    by_source: BTreeMap<Uuid, Posting>,
    by_target: BTreeMap<Uuid, Posting>,
    by_property: BTreeMap<PropertyKey, Posting>,
    keys_of: BTreeMap<Uuid, EntryKeys>,
}

impl EdgeIndex {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, edge: &Edge) {
        let mut keys = EntryKeys::default();
        self.by_relationship
            .entry(edge.relationship.clone())
            .or_default()
            .insert(edge.id);
        keys.label_or_relationship = Some(edge.relationship.clone());

        self.by_source.entry(edge.source_id).or_default().insert(edge.id);
        keys.source_id = Some(edge.source_id);
        self.by_target.entry(edge.target_id).or_default().insert(edge.id);
        keys.target_id = Some(edge.target_id);

        for (name, value) in &edge.properties {
            if value.is_hashable() {
                let key = (name.clone(), value.index_key());
                self.by_property.entry(key.clone()).or_default().insert(edge.id);
                keys.properties.push(key);
            }
        }
        self.keys_of.insert(edge.id, keys);
    }

    pub(crate) fn remove(&mut self, id: Uuid) {
        let Some(keys) = self.keys_of.remove(&id) else {
            return;
        };
        if let Some(rel) = keys.label_or_relationship {
            if let Some(set) = self.by_relationship.get_mut(&rel) {
                set.remove(&id);
                if set.is_empty() {
                    self.by_relationship.remove(&rel);
                }
            }
        }
        if let Some(src) = keys.source_id {
            if let Some(set) = self.by_source.get_mut(&src) {
                set.remove(&id);
                if set.is_empty() {
                    self.by_source.remove(&src);
                }
            }
        }
        if let Some(tgt) = keys.target_id {
            if let Some(set) = self.by_target.get_mut(&tgt) {
                set.remove(&id);
                if set.is_empty() {
                    self.by_target.remove(&tgt);
                }
            }
        }
        for key in keys.properties {
            if let Some(set) = self.by_property.get_mut(&key) {
                set.remove(&id);
                if set.is_empty() {
                    self.by_property.remove(&key);
                }
            }
        }
    }

    pub(crate) fn by_relationship(&self, relationship: &str) -> Option<&Posting> {
        self.by_relationship.get(relationship)
    }

    pub(crate) fn by_source(&self, source_id: Uuid) -> Option<&Posting> {
        self.by_source.get(&source_id)
    }

    pub(crate) fn by_target(&self, target_id: Uuid) -> Option<&Posting> {
        self.by_target.get(&target_id)
    }

    pub(crate) fn by_property(&self, name: &str, value: &Value) -> Option<&Posting> {
        if !value.is_hashable() {
            return None;
        }
        self.by_property.get(&(name.to_string(), value.index_key()))
    }

    pub(crate) fn all_ids(&self) -> Posting {
        self.keys_of.keys().copied().collect()
    }
}

/// Intersects two posting sets in `O(|a| + |b|)` by walking both ordered
/// sets in lockstep, advancing whichever cursor points at the smaller id.
pub(crate) fn intersect(a: &Posting, b: &Posting) -> Posting {
    let mut result = Posting::new();
    let mut ai = a.iter();
    let mut bi = b.iter();
    let mut next_a = ai.next();
    let mut next_b = bi.next();
    while let (Some(x), Some(y)) = (next_a, next_b) {
        match x.cmp(y) {
            std::cmp::Ordering::Equal => {
                result.insert(*x);
                next_a = ai.next();
                next_b = bi.next();
            }
            std::cmp::Ordering::Less => next_a = ai.next(),
            std::cmp::Ordering::Greater => next_b = bi.next(),
        }
    }
    result
}
