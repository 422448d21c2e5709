//! Directed similarity graph over thoughts.
//!
//! Every insertion is scored against every earlier thought, so building a
//! graph of n thoughts costs O(n²) comparisons. That is the dominant cost
//! of the engine and is only acceptable at small scale.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::affinity::{AffinityScorer, ThoughtContext};
use crate::config::WeaverConfig;
use crate::fingerprint::Fingerprint;
use crate::ids::ThoughtId;

/// Directed weighted edge from a thought to an earlier one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub target: ThoughtId,
    pub strength: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ThoughtRecord {
    pub id: ThoughtId,
    pub fingerprint: Fingerprint,
    pub context: ThoughtContext,
    /// Outbound edges in the order they were formed.
    pub connections: Vec<Connection>,
}

impl ThoughtRecord {
    /// Strength of the outbound edge to `target`, if one formed.
    pub fn strength_to(&self, target: &ThoughtId) -> Option<f64> {
        self.connections
            .iter()
            .find(|c| &c.target == target)
            .map(|c| c.strength)
    }
}

/// One reached node in a constellation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstellationEntry {
    pub depth: usize,
    /// Every outbound edge examined while expanding this node.
    pub connections: Vec<Connection>,
    /// Strength of the edge that first reached this node. `None` for the root.
    pub strength_from_origin: Option<f64>,
}

/// Result of a depth-bounded traversal from a root thought.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Constellation {
    pub root: Option<ThoughtId>,
    pub nodes: BTreeMap<ThoughtId, ConstellationEntry>,
}

impl Constellation {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: &ThoughtId) -> Option<&ConstellationEntry> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &ThoughtId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn max_depth(&self) -> usize {
        self.nodes.values().map(|e| e.depth).max().unwrap_or(0)
    }
}

/// Append-only registry of fingerprinted thoughts plus their outbound edges.
#[derive(Clone, Debug)]
pub struct ThoughtGraph {
    scorer: AffinityScorer,
    cluster_strength: f64,
    influence_depth: usize,
    records: Vec<ThoughtRecord>,
    index: HashMap<ThoughtId, usize>,
}

impl Default for ThoughtGraph {
    fn default() -> Self {
        Self::new(&WeaverConfig::default())
    }
}

impl ThoughtGraph {
    pub fn new(config: &WeaverConfig) -> Self {
        Self {
            scorer: AffinityScorer::new(config),
            cluster_strength: config.cluster_strength,
            influence_depth: config.influence_depth,
            records: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn scorer(&self) -> &AffinityScorer {
        &self.scorer
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &ThoughtId) -> Option<&ThoughtRecord> {
        self.index.get(id).map(|&i| &self.records[i])
    }

    /// Records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &ThoughtRecord> {
        self.records.iter()
    }

    pub fn edge_count(&self) -> usize {
        self.records.iter().map(|r| r.connections.len()).sum()
    }

    /// Insert a thought and connect it to every earlier thought whose
    /// contextual score clears the threshold. Returns the new edges.
    ///
    /// An id that is already registered is left untouched and yields no edges.
    pub fn add_and_connect(
        &mut self,
        id: ThoughtId,
        fingerprint: Fingerprint,
        context: ThoughtContext,
    ) -> Vec<Connection> {
        if self.index.contains_key(&id) {
            tracing::warn!(%id, "thought already registered, skipping");
            return Vec::new();
        }

        let mut connections = Vec::new();
        for existing in &self.records {
            let score = self.scorer.score(
                &fingerprint,
                &context,
                &existing.fingerprint,
                &existing.context,
            );
            tracing::trace!(from = %id, to = %existing.id, score, "scored pair");
            if self.scorer.connects(score) {
                connections.push(Connection {
                    target: existing.id.clone(),
                    strength: score,
                });
            }
        }

        tracing::debug!(
            %id,
            compared = self.records.len(),
            formed = connections.len(),
            "thought woven"
        );

        self.index.insert(id.clone(), self.records.len());
        self.records.push(ThoughtRecord {
            id,
            fingerprint,
            context,
            connections: connections.clone(),
        });
        connections
    }

    /// Breadth-first traversal along outbound edges, at most `max_depth`
    /// hops from `root`. Each node is entered once at its first-discovered
    /// depth. Unknown roots give an empty constellation.
    pub fn traverse(&self, root: &ThoughtId, max_depth: usize) -> Constellation {
        let Some(&root_idx) = self.index.get(root) else {
            return Constellation::default();
        };

        let mut nodes = BTreeMap::new();
        nodes.insert(root.clone(), ConstellationEntry::default());
        let mut queue = VecDeque::from([(root_idx, 0usize)]);

        while let Some((idx, depth)) = queue.pop_front() {
            if depth >= max_depth {
                continue;
            }
            let record = &self.records[idx];
            for conn in &record.connections {
                if !nodes.contains_key(&conn.target) {
                    nodes.insert(
                        conn.target.clone(),
                        ConstellationEntry {
                            depth: depth + 1,
                            connections: Vec::new(),
                            strength_from_origin: Some(conn.strength),
                        },
                    );
                    if let Some(&target_idx) = self.index.get(&conn.target) {
                        queue.push_back((target_idx, depth + 1));
                    }
                }
                if let Some(entry) = nodes.get_mut(&record.id) {
                    entry.connections.push(conn.clone());
                }
            }
        }

        Constellation {
            root: Some(root.clone()),
            nodes,
        }
    }

    /// Groups of thoughts joined by strong edges (strength above the
    /// cluster threshold), keeping groups of at least `min_size`.
    ///
    /// Seeds are taken newest first, since edges point from newer thoughts
    /// to older ones. Nodes absorbed by a group that turns out too small
    /// stay consumed and are never reconsidered.
    pub fn find_clusters(&self, min_size: usize) -> Vec<BTreeSet<ThoughtId>> {
        let mut visited = vec![false; self.records.len()];
        let mut clusters = Vec::new();

        for seed in (0..self.records.len()).rev() {
            if visited[seed] {
                continue;
            }
            let cluster = self.grow_cluster(seed, &mut visited);
            if cluster.len() >= min_size {
                clusters.push(cluster);
            }
        }

        clusters
    }

    fn grow_cluster(&self, seed: usize, visited: &mut [bool]) -> BTreeSet<ThoughtId> {
        let mut cluster = BTreeSet::from([self.records[seed].id.clone()]);
        visited[seed] = true;
        let mut queue = VecDeque::from([seed]);

        while let Some(current) = queue.pop_front() {
            for conn in &self.records[current].connections {
                if conn.strength <= self.cluster_strength {
                    continue;
                }
                let Some(&target) = self.index.get(&conn.target) else {
                    continue;
                };
                if !visited[target] {
                    visited[target] = true;
                    cluster.insert(conn.target.clone());
                    queue.push_back(target);
                }
            }
        }

        cluster
    }

    /// Mean number of thoughts reachable (excluding the start) within the
    /// influence depth, over every thought by `author`. 0 for unknown authors.
    pub fn influence_radius(&self, author: &str) -> f64 {
        let reaches: Vec<usize> = self
            .records
            .iter()
            .filter(|r| r.context.author == author)
            .map(|r| self.traverse(&r.id, self.influence_depth).len() - 1)
            .collect();

        if reaches.is_empty() {
            return 0.0;
        }
        reaches.iter().sum::<usize>() as f64 / reaches.len() as f64
    }
}
