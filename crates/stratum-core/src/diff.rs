//! Append-only diff log.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::{Edge, Node};
use crate::error::{CoreError, Result};

/// The kind of mutation a [`Diff`] records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Op {
    InsertNode,
    DeleteNode,
    InsertEdge,
    DeleteEdge,
}

impl Op {
    fn inverse(self) -> Op {
        match self {
            Op::InsertNode => Op::DeleteNode,
            Op::DeleteNode => Op::InsertNode,
            Op::InsertEdge => Op::DeleteEdge,
            Op::DeleteEdge => Op::InsertEdge,
        }
    }
}

/// The entity a [`Diff`] carries: whichever payload the operation touched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Payload {
    Node(Node),
    Edge(Edge),
}

/// A single, immutable record of one mutation, carrying everything needed
/// to invert it.
///
/// `agent_id`/`session_id` are opaque caller-supplied provenance tags; the
/// core never interprets them, it only stores and replays them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diff {
    pub id: Uuid,
    pub op: Op,
    pub timestamp: i64,
    pub payload: Payload,
    pub agent_id: Option<String>,
    pub session_id: Option<String>,
}

impl Diff {
    /// The diff that, if applied, exactly undoes this one.
    pub fn inverse(&self) -> Diff {
        Diff {
            id: new_diff_id(),
            op: self.op.inverse(),
            timestamp: self.timestamp,
            payload: self.payload.clone(),
            agent_id: self.agent_id.clone(),
            session_id: self.session_id.clone(),
        }
    }
}

fn new_diff_id() -> Uuid {
    Uuid::new_v4()
}

/// Monotonic logical clock for diff timestamps.
///
/// Wall-clock `Utc::now()` alone cannot guarantee strict ordering between
/// two operations issued back to back within the same microsecond, so the
/// log seeds an atomic counter from `Utc::now()` and then only ever
/// increments.
#[derive(Debug)]
pub(crate) struct LogicalClock {
    next: AtomicI64,
}

impl LogicalClock {
    pub(crate) fn new() -> Self {
        Self {
            next: AtomicI64::new(Utc::now().timestamp_nanos_opt().unwrap_or(0)),
        }
    }

    pub(crate) fn tick(&self) -> i64 {
        self.next.fetch_add(1, Ordering::SeqCst)
    }
}

/// The append-only operation log.
#[derive(Debug, Default)]
pub struct DiffLog {
    entries: Vec<Diff>,
}

impl DiffLog {
    pub(crate) fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub(crate) fn append(&mut self, diff: Diff) {
        self.entries.push(diff);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ordered, read-only view of the full log.
    pub fn entries(&self) -> &[Diff] {
        &self.entries
    }

    /// Validates and returns the last `k` diffs in reverse (most-recent
    /// first) order, without mutating the log.
    pub(crate) fn last_k_reversed(&self, k: usize) -> Result<Vec<Diff>> {
        if k > self.entries.len() {
            return Err(CoreError::OutOfHistory {
                requested: k,
                available: self.entries.len(),
            });
        }
        Ok(self.entries[self.entries.len() - k..]
            .iter()
            .rev()
            .cloned()
            .collect())
    }

    /// Number of diffs with `timestamp > t`, validating that `t` is not
    /// older than the log's earliest entry.
    pub(crate) fn steps_after(&self, t: i64) -> Result<usize> {
        if let Some(first) = self.entries.first() {
            if t < first.timestamp {
                return Err(CoreError::OutOfHistory {
                    requested: self.entries.len(),
                    available: self.entries.len(),
                });
            }
        }
        Ok(self.entries.iter().filter(|d| d.timestamp > t).count())
    }

    /// Truncates the last `k` entries after their inverses have been
    /// applied — the inverses themselves are never recorded.
    pub(crate) fn truncate_last(&mut self, k: usize) {
        let new_len = self.entries.len() - k;
        self.entries.truncate(new_len);
    }
}
