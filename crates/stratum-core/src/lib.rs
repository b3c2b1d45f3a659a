//! # Stratum Core
//!
//! An embedded, in-process graph knowledge store: immutable insert/delete
//! semantics, a complete append-only operation log enabling arbitrary-length
//! rollback, a three-tier access-driven storage hierarchy (hot/warm/cold),
//! and B-tree-backed property and relationship indexes.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::collections::BTreeMap;
//! use stratum_core::{GraphStore, NodeQuery, Provenance, Value};
//!
//! let store = GraphStore::new();
//!
//! let mut props = BTreeMap::new();
//! props.insert("name".to_string(), Value::String("Alice".to_string()));
//! let diff = store.insert_node("Person", props, Provenance::default()).unwrap();
//!
//! let result = store.query_nodes(&NodeQuery::new().with_label("Person"));
//! assert_eq!(result.items.len(), 1);
//! # let _ = diff;
//! ```
//!
//! ## Scope
//!
//! This crate has no wire protocol, no CLI, and no on-disk persistence.
//! Vector similarity search, full-text search, cross-process concurrency,
//! and distributed replication are explicitly out of scope — a host
//! process builds those on top of the operations this crate exposes.

mod config;
mod diff;
mod entity;
mod error;
mod index;
mod query;
mod snapshot;
mod store;
mod tier;
mod value;

pub use config::StoreConfig;
pub use diff::{Diff, DiffLog, Op, Payload};
pub use entity::{Edge, Node};
pub use error::{CoreError, Result};
pub use query::{Direction, EdgeQuery, NodeQuery, QueryResult};
pub use snapshot::{Snapshot, SnapshotMetadata};
pub use store::{GraphStore, Provenance};
pub use tier::Tier;
pub use value::Value;
