use std::collections::{BTreeSet, HashMap};

use crate::affinity::ThoughtContext;
use crate::config::EngineConfig;
use crate::constants::ID_RETRIES;
use crate::error::Result;
use crate::fingerprint::{FeatureExtractor, Fingerprint};
use crate::graph::{Constellation, ThoughtGraph, ThoughtRecord};
use crate::ids::{IdGenerator, ThoughtId, UuidIds};
use crate::lattice::{CrystalNode, Lattice, StructureMetrics};
use crate::spatial::classify_face;
use crate::time::now_unix_secs;

/// Owns both registries and the id source. Every mutation takes `&mut self`,
/// so ingestions are serialized; wrap the engine in a single mutex to share
/// it across threads.
pub struct WeaveEngine {
    config: EngineConfig,
    extractor: FeatureExtractor,
    graph: ThoughtGraph,
    lattice: Lattice,
    ids: Box<dyn IdGenerator>,
    reputations: HashMap<String, f64>,
}

impl WeaveEngine {
    /// Engine with random v4 ids. Fails on an invalid config.
    pub fn new(config: EngineConfig) -> Result<Self> {
        Self::with_id_generator(config, UuidIds::from_os_rng())
    }

    pub fn with_id_generator(
        config: EngineConfig,
        ids: impl IdGenerator + 'static,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            extractor: FeatureExtractor::new(&config.weaver),
            graph: ThoughtGraph::new(&config.weaver),
            lattice: Lattice::new(&config.lattice),
            ids: Box::new(ids),
            reputations: HashMap::new(),
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn graph(&self) -> &ThoughtGraph {
        &self.graph
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    pub fn len(&self) -> usize {
        self.graph.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    /// Set an author's reputation, clamped to [0, 1]. NaN is ignored.
    pub fn set_reputation(&mut self, author: &str, score: f64) {
        if score.is_nan() {
            tracing::warn!(author, "ignoring NaN reputation");
            return;
        }
        let clamped = score.clamp(0.0, 1.0);
        if clamped != score {
            tracing::warn!(author, score, clamped, "reputation clamped into [0, 1]");
        }
        self.reputations.insert(author.to_string(), clamped);
    }

    pub fn reputation(&self, author: &str) -> f64 {
        self.reputations
            .get(author)
            .copied()
            .unwrap_or(self.config.default_reputation)
    }

    /// Add content to both structures and return its new id.
    ///
    /// The category defaults to the content's crystal face and the timestamp
    /// to now. Identical content ingested twice yields two distinct thoughts.
    pub fn ingest(
        &mut self,
        content: &str,
        author: &str,
        category: Option<&str>,
        timestamp: Option<u64>,
    ) -> ThoughtId {
        let id = self.weave(content, author, category, timestamp);
        let reputation = self.reputation(author);
        self.lattice.nucleate(id.clone(), content, reputation);
        self.lattice.bond_with_all(&id);
        id
    }

    /// Ingest `(content, author)` pairs into the graph as usual, but grow the
    /// lattice only around `seed` and its neighbors. Returns the ids that
    /// bonded to the seed. Nothing is ingested when the seed is unknown.
    pub fn grow_crystal(&mut self, seed: &ThoughtId, items: &[(&str, &str)]) -> Vec<ThoughtId> {
        if self.lattice.get(seed).is_none() {
            return Vec::new();
        }

        let woven: Vec<(ThoughtId, &str, f64)> = items
            .iter()
            .map(|&(content, author)| {
                let id = self.weave(content, author, None, None);
                (id, content, self.reputation(author))
            })
            .collect();

        let attached = self.lattice.grow(seed, woven);
        tracing::info!(%seed, offered = items.len(), attached = attached.len(), "crystal grown");
        attached
    }

    /// Graph half of ingestion.
    fn weave(
        &mut self,
        content: &str,
        author: &str,
        category: Option<&str>,
        timestamp: Option<u64>,
    ) -> ThoughtId {
        let id = self.fresh_id();
        let fingerprint = self.extractor.extract(content);
        let category = match category {
            Some(c) => c.to_string(),
            None => classify_face(content).as_str().to_string(),
        };
        let context = ThoughtContext::new(
            author,
            category,
            timestamp.unwrap_or_else(now_unix_secs),
        );
        self.graph.add_and_connect(id.clone(), fingerprint, context);
        id
    }

    /// Next id not yet registered in either structure. Repeated collisions
    /// fall back to suffixing the last draw, so this always terminates.
    fn fresh_id(&mut self) -> ThoughtId {
        let mut id = self.ids.next_id();
        for _ in 0..ID_RETRIES {
            if !self.is_registered(&id) {
                return id;
            }
            tracing::warn!(%id, "id generator returned a registered id, drawing again");
            id = self.ids.next_id();
        }

        let mut suffix = 1usize;
        loop {
            let candidate = ThoughtId::new(format!("{id}-{suffix}"));
            if !self.is_registered(&candidate) {
                return candidate;
            }
            suffix += 1;
        }
    }

    fn is_registered(&self, id: &ThoughtId) -> bool {
        self.graph.get(id).is_some() || self.lattice.get(id).is_some()
    }

    /// Constellation reached from `id` within `depth` hops.
    pub fn connections_of(&self, id: &ThoughtId, depth: usize) -> Constellation {
        self.graph.traverse(id, depth)
    }

    pub fn clusters(&self, min_size: usize) -> Vec<BTreeSet<ThoughtId>> {
        self.graph.find_clusters(min_size)
    }

    pub fn influence_radius(&self, author: &str) -> f64 {
        self.graph.influence_radius(author)
    }

    pub fn structure_metrics(&self, id: &ThoughtId) -> StructureMetrics {
        self.lattice.analyze_structure(id)
    }

    pub fn fingerprint(&self, id: &ThoughtId) -> Option<&Fingerprint> {
        self.graph.get(id).map(|r| &r.fingerprint)
    }

    pub fn thought(&self, id: &ThoughtId) -> Option<&ThoughtRecord> {
        self.graph.get(id)
    }

    pub fn crystal(&self, id: &ThoughtId) -> Option<&CrystalNode> {
        self.lattice.get(id)
    }
}
