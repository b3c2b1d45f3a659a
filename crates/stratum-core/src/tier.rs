//! Three-tier access-driven residency store.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A residency class. Ordered runtime (hottest) to cold (coldest); purely
/// performance-affecting and never visible to query semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    Runtime,
    Warm,
    Cold,
}

impl Tier {
    fn colder(self) -> Option<Tier> {
        match self {
            Tier::Runtime => Some(Tier::Warm),
            Tier::Warm => Some(Tier::Cold),
            Tier::Cold => None,
        }
    }
}

/// A trait over whatever minimal access-metadata view a tier store needs
/// from an entity, so [`TierStore`] can be generic over nodes and edges
/// without duplicating the promotion/demotion algorithm.
pub trait Resident: Clone {
    fn id(&self) -> Uuid;
    fn access_count(&self) -> u64;
    fn last_accessed(&self) -> DateTime<Utc>;
    #[must_use]
    fn with_access(&self, now: DateTime<Utc>) -> Self;
}

impl Resident for crate::entity::Node {
    fn id(&self) -> Uuid {
        self.id
    }
    fn access_count(&self) -> u64 {
        crate::entity::Node::access_count(self)
    }
    fn last_accessed(&self) -> DateTime<Utc> {
        crate::entity::Node::last_accessed(self)
    }
    fn with_access(&self, now: DateTime<Utc>) -> Self {
        crate::entity::Node::with_access(self, now)
    }
}

impl Resident for crate::entity::Edge {
    fn id(&self) -> Uuid {
        self.id
    }
    fn access_count(&self) -> u64 {
        crate::entity::Edge::access_count(self)
    }
    fn last_accessed(&self) -> DateTime<Utc> {
        crate::entity::Edge::last_accessed(self)
    }
    fn with_access(&self, now: DateTime<Utc>) -> Self {
        crate::entity::Edge::with_access(self, now)
    }
}

/// Three ordered residency sets holding live entities of one kind (all
/// nodes, or all edges).
#[derive(Debug, Default)]
pub struct TierStore<T: Resident> {
    runtime: HashMap<Uuid, T>,
    warm: HashMap<Uuid, T>,
    cold: HashMap<Uuid, T>,
}

impl<T: Resident> TierStore<T> {
    pub(crate) fn new() -> Self {
        Self {
            runtime: HashMap::new(),
            warm: HashMap::new(),
            cold: HashMap::new(),
        }
    }

    fn set_mut(&mut self, tier: Tier) -> &mut HashMap<Uuid, T> {
        match tier {
            Tier::Runtime => &mut self.runtime,
            Tier::Warm => &mut self.warm,
            Tier::Cold => &mut self.cold,
        }
    }

    fn set(&self, tier: Tier) -> &HashMap<Uuid, T> {
        match tier {
            Tier::Runtime => &self.runtime,
            Tier::Warm => &self.warm,
            Tier::Cold => &self.cold,
        }
    }

    /// Inserts a newly created entity into the runtime tier.
    pub(crate) fn insert(&mut self, entity: T) {
        self.runtime.insert(entity.id(), entity);
    }

    /// Removes an entity, wherever it currently resides, without
    /// rebalancing other tiers.
    pub(crate) fn remove(&mut self, id: Uuid) -> Option<T> {
        self.runtime
            .remove(&id)
            .or_else(|| self.warm.remove(&id))
            .or_else(|| self.cold.remove(&id))
    }

    /// Looks up an entity by id, probing runtime then warm then cold.
    /// A successful fetch records an access and single-step-promotes the
    /// entity into runtime if it was not already there.
    pub(crate) fn get(&mut self, id: Uuid, now: DateTime<Utc>) -> Option<T> {
        let found_tier = if self.runtime.contains_key(&id) {
            Tier::Runtime
        } else if self.warm.contains_key(&id) {
            Tier::Warm
        } else if self.cold.contains_key(&id) {
            Tier::Cold
        } else {
            return None;
        };

        let entity = self.set_mut(found_tier).remove(&id)?;
        let touched = entity.with_access(now);
        self.runtime.insert(id, touched.clone());
        Some(touched)
    }

    /// Looks up an entity without recording an access or promoting it.
    /// Used internally where touching access metadata would be an
    /// unwanted side effect (e.g. resolving dangling edge endpoints during
    /// a connectivity query materializes the node through `get`, but
    /// existence probes for edge-insert validation use this).
    pub(crate) fn contains(&self, id: Uuid) -> bool {
        self.runtime.contains_key(&id) || self.warm.contains_key(&id) || self.cold.contains_key(&id)
    }

    pub(crate) fn tier_of(&self, id: Uuid) -> Option<Tier> {
        if self.runtime.contains_key(&id) {
            Some(Tier::Runtime)
        } else if self.warm.contains_key(&id) {
            Some(Tier::Warm)
        } else if self.cold.contains_key(&id) {
            Some(Tier::Cold)
        } else {
            None
        }
    }

    pub(crate) fn count(&self, tier: Option<Tier>) -> usize {
        match tier {
            Some(t) => self.set(t).len(),
            None => self.runtime.len() + self.warm.len() + self.cold.len(),
        }
    }

    pub(crate) fn iter_all(&self) -> impl Iterator<Item = &T> {
        self.runtime.values().chain(self.warm.values()).chain(self.cold.values())
    }

    /// Demotes excess entities out of `tier` into the next colder tier,
    /// selecting victims in ascending `(access_count, last_accessed, id)`
    /// order (least-used first) until `tier` is at or below `limit`.
    /// Returns the ids moved.
    fn demote_tier(&mut self, tier: Tier, limit: usize) -> Vec<Uuid> {
        let Some(colder) = tier.colder() else {
            return Vec::new();
        };
        let current_len = self.set(tier).len();
        if current_len <= limit {
            return Vec::new();
        }
        let excess = current_len - limit;

        let mut candidates: Vec<(u64, DateTime<Utc>, Uuid)> = self
            .set(tier)
            .values()
            .map(|e| (e.access_count(), e.last_accessed(), e.id()))
            .collect();
        candidates.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)).then(a.2.cmp(&b.2)));

        let mut moved = Vec::new();
        for (_, _, id) in candidates.into_iter().take(excess) {
            if let Some(entity) = self.set_mut(tier).remove(&id) {
                self.set_mut(colder).insert(id, entity);
                moved.push(id);
            }
        }
        moved
    }

    /// Applies `prune(runtime_limit, warm_limit)`: demotes
    /// runtime down to `runtime_limit` (if given) into warm, then warm down
    /// to `warm_limit` (if given) into cold. Cold has no limit.
    ///
    /// Returns the number of *distinct* entities whose tier changed — an
    /// entity demoted twice in the same call (runtime -> warm -> cold)
    /// counts once, matching "count of entities demoted" rather than a
    /// count of individual hops.
    pub(crate) fn prune(&mut self, runtime_limit: Option<usize>, warm_limit: Option<usize>) -> usize {
        let mut moved: std::collections::HashSet<Uuid> = std::collections::HashSet::new();
        if let Some(limit) = runtime_limit {
            moved.extend(self.demote_tier(Tier::Runtime, limit));
        }
        if let Some(limit) = warm_limit {
            moved.extend(self.demote_tier(Tier::Warm, limit));
        }
        moved.len()
    }
}
