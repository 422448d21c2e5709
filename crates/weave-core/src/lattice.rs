//! Spatial lattice: thoughts embedded in 3D and bonded into crystals.
//!
//! Bonds are undirected and gated by distance and binding-energy
//! similarity. Neighbor sets only grow.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::affinity::{BondRule, distance};
use crate::config::LatticeConfig;
use crate::ids::ThoughtId;
use crate::spatial::{CrystalFace, SpatialMapper, classify_face};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CrystalNode {
    pub id: ThoughtId,
    pub position: [f64; 3],
    pub binding_energy: f64,
    pub face: CrystalFace,
    pub neighbors: BTreeSet<ThoughtId>,
}

impl CrystalNode {
    /// Coordination number: size of the neighbor set.
    pub fn coordination(&self) -> usize {
        self.neighbors.len()
    }
}

/// Aggregate geometry of everything reachable from a seed node.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StructureMetrics {
    pub node_count: usize,
    pub total_binding_energy: f64,
    pub average_coordination: f64,
    pub face_distribution: BTreeMap<CrystalFace, usize>,
    /// Most common face; ties go to the alphabetically first face.
    pub dominant_face: Option<CrystalFace>,
    /// 1 / (1 + mean squared distance from the centroid), in (0, 1].
    pub symmetry: f64,
}

#[derive(Clone, Debug)]
pub struct Lattice {
    mapper: SpatialMapper,
    rule: BondRule,
    nodes: Vec<CrystalNode>,
    index: HashMap<ThoughtId, usize>,
}

impl Default for Lattice {
    fn default() -> Self {
        Self::new(&LatticeConfig::default())
    }
}

impl Lattice {
    pub fn new(config: &LatticeConfig) -> Self {
        Self {
            mapper: SpatialMapper::new(config),
            rule: BondRule::new(config),
            nodes: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn mapper(&self) -> &SpatialMapper {
        &self.mapper
    }

    pub fn rule(&self) -> &BondRule {
        &self.rule
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: &ThoughtId) -> Option<&CrystalNode> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    /// Nodes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &CrystalNode> {
        self.nodes.iter()
    }

    /// Number of undirected bonds.
    pub fn bond_count(&self) -> usize {
        self.nodes.iter().map(|n| n.neighbors.len()).sum::<usize>() / 2
    }

    /// Create a node from text without bonding it. Re-nucleating a known id
    /// returns the existing node unchanged.
    pub fn nucleate(&mut self, id: ThoughtId, text: &str, reputation: f64) -> &CrystalNode {
        if let Some(&idx) = self.index.get(&id) {
            tracing::warn!(%id, "crystal node already exists, keeping original");
            return &self.nodes[idx];
        }

        let node = CrystalNode {
            position: self.mapper.map_to_space(text),
            binding_energy: self.mapper.binding_energy(text, reputation),
            face: classify_face(text),
            neighbors: BTreeSet::new(),
            id: id.clone(),
        };
        let idx = self.nodes.len();
        self.index.insert(id, idx);
        self.nodes.push(node);
        &self.nodes[idx]
    }

    /// Bond `new` to `existing` if they are close enough in space and
    /// energy. Records the bond on both nodes. Never bonds a node to itself.
    pub fn attach(&mut self, new: &ThoughtId, existing: &ThoughtId) -> bool {
        let (Some(&a), Some(&b)) = (self.index.get(new), self.index.get(existing)) else {
            return false;
        };
        if a == b {
            return false;
        }

        let (na, nb) = (&self.nodes[a], &self.nodes[b]);
        if !self
            .rule
            .bonds(na.position, na.binding_energy, nb.position, nb.binding_energy)
        {
            return false;
        }

        self.nodes[a].neighbors.insert(existing.clone());
        self.nodes[b].neighbors.insert(new.clone());
        true
    }

    /// Try to bond `id` with every node created before it. Returns the ids
    /// it bonded with, oldest first.
    pub fn bond_with_all(&mut self, id: &ThoughtId) -> Vec<ThoughtId> {
        let Some(&idx) = self.index.get(id) else {
            return Vec::new();
        };
        let earlier: Vec<ThoughtId> = self.nodes[..idx].iter().map(|n| n.id.clone()).collect();

        let bonded: Vec<ThoughtId> = earlier
            .into_iter()
            .filter(|other| self.attach(id, other))
            .collect();
        tracing::debug!(%id, compared = idx, bonded = bonded.len(), "node crystallized");
        bonded
    }

    /// Seed-directed growth. Each new node tries the seed; when that bond
    /// forms it also tries the seed's other neighbors. Returns the ids that
    /// bonded to the seed. Unknown seeds grow nothing.
    pub fn grow<'a, I>(&mut self, seed: &ThoughtId, items: I) -> Vec<ThoughtId>
    where
        I: IntoIterator<Item = (ThoughtId, &'a str, f64)>,
    {
        if !self.index.contains_key(seed) {
            return Vec::new();
        }

        let mut attached = Vec::new();
        for (id, text, reputation) in items {
            self.nucleate(id.clone(), text, reputation);
            if !self.attach(&id, seed) {
                continue;
            }
            let neighbors: Vec<ThoughtId> = self
                .get(seed)
                .map(|node| {
                    node.neighbors
                        .iter()
                        .filter(|&other| other != &id)
                        .cloned()
                        .collect()
                })
                .unwrap_or_default();
            for neighbor in &neighbors {
                self.attach(&id, neighbor);
            }
            attached.push(id);
        }
        attached
    }

    /// Every node reachable from `seed` through bonds, seed first.
    pub fn reachable(&self, seed: &ThoughtId) -> Vec<&CrystalNode> {
        let Some(&start) = self.index.get(seed) else {
            return Vec::new();
        };

        let mut visited = HashSet::from([start]);
        let mut stack = vec![start];
        let mut found = Vec::new();

        while let Some(idx) = stack.pop() {
            let node = &self.nodes[idx];
            found.push(node);
            for neighbor in &node.neighbors {
                if let Some(&n) = self.index.get(neighbor)
                    && visited.insert(n)
                {
                    stack.push(n);
                }
            }
        }
        found
    }

    /// Metrics over the crystal containing `seed`. Zeroed for unknown seeds.
    pub fn analyze_structure(&self, seed: &ThoughtId) -> StructureMetrics {
        let nodes = self.reachable(seed);
        if nodes.is_empty() {
            return StructureMetrics::default();
        }

        let count = nodes.len() as f64;
        let total_binding_energy: f64 = nodes.iter().map(|n| n.binding_energy).sum();
        let average_coordination =
            nodes.iter().map(|n| n.coordination()).sum::<usize>() as f64 / count;

        let mut face_distribution = BTreeMap::new();
        for node in &nodes {
            *face_distribution.entry(node.face).or_insert(0) += 1;
        }

        StructureMetrics {
            node_count: nodes.len(),
            total_binding_energy,
            average_coordination,
            dominant_face: dominant_face(&face_distribution),
            face_distribution,
            symmetry: symmetry(&nodes),
        }
    }
}

/// Highest count wins; BTreeMap order makes the first maximum the
/// alphabetically first face.
fn dominant_face(distribution: &BTreeMap<CrystalFace, usize>) -> Option<CrystalFace> {
    let mut best: Option<(CrystalFace, usize)> = None;
    for (&face, &count) in distribution {
        if best.is_none_or(|(_, c)| count > c) {
            best = Some((face, count));
        }
    }
    best.map(|(face, _)| face)
}

fn symmetry(nodes: &[&CrystalNode]) -> f64 {
    if nodes.is_empty() {
        return 0.0;
    }
    let n = nodes.len() as f64;
    let mut centroid = [0.0; 3];
    for node in nodes {
        for (c, p) in centroid.iter_mut().zip(node.position) {
            *c += p / n;
        }
    }
    let variance = nodes
        .iter()
        .map(|node| distance(node.position, centroid).powi(2))
        .sum::<f64>()
        / n;
    1.0 / (1.0 + variance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn id(s: &str) -> ThoughtId {
        ThoughtId::new(s)
    }

    /// Lattice with hand-placed nodes, bypassing text mapping.
    fn place(
        lattice: &mut Lattice,
        name: &str,
        position: [f64; 3],
        energy: f64,
        face: CrystalFace,
    ) {
        lattice.index.insert(id(name), lattice.nodes.len());
        lattice.nodes.push(CrystalNode {
            id: id(name),
            position,
            binding_energy: energy,
            face,
            neighbors: BTreeSet::new(),
        });
    }

    #[test]
    fn test_nucleate_from_text() {
        let mut lattice = Lattice::default();
        let node = lattice.nucleate(id("a"), "the cat, the dog", 0.5).clone();
        assert_eq!(node.position, lattice.mapper().map_to_space("the cat, the dog"));
        assert!(node.neighbors.is_empty());
        assert_eq!(lattice.len(), 1);
    }

    #[test]
    fn test_nucleate_duplicate_keeps_original() {
        let mut lattice = Lattice::default();
        let first = lattice.nucleate(id("a"), "first text", 0.5).clone();
        let again = lattice.nucleate(id("a"), "something else entirely", 0.9).clone();
        assert_eq!(first, again);
        assert_eq!(lattice.len(), 1);
    }

    #[test]
    fn test_attach_symmetric() {
        let mut lattice = Lattice::default();
        place(&mut lattice, "a", [0.0, 0.0, 0.0], 0.5, CrystalFace::Cubic);
        place(&mut lattice, "b", [1.0, 0.0, 0.0], 0.55, CrystalFace::Cubic);
        assert!(lattice.attach(&id("b"), &id("a")));
        assert!(lattice.get(&id("a")).unwrap().neighbors.contains(&id("b")));
        assert!(lattice.get(&id("b")).unwrap().neighbors.contains(&id("a")));
        assert_eq!(lattice.bond_count(), 1);
    }

    #[test]
    fn test_attach_rejects_far_nodes_regardless_of_energy() {
        let mut lattice = Lattice::default();
        let far = lattice.rule().radius() + 0.001;
        place(&mut lattice, "a", [0.0, 0.0, 0.0], 0.5, CrystalFace::Cubic);
        place(&mut lattice, "b", [0.0, far, 0.0], 0.5, CrystalFace::Cubic);
        assert!(!lattice.attach(&id("b"), &id("a")));
        assert_eq!(lattice.bond_count(), 0);
    }

    #[test]
    fn test_attach_rejects_self_and_unknown() {
        let mut lattice = Lattice::default();
        place(&mut lattice, "a", [0.0, 0.0, 0.0], 0.5, CrystalFace::Cubic);
        assert!(!lattice.attach(&id("a"), &id("a")));
        assert!(!lattice.attach(&id("a"), &id("ghost")));
    }

    #[test]
    fn test_bond_with_all_only_earlier_nodes() {
        let mut lattice = Lattice::default();
        place(&mut lattice, "a", [0.0, 0.0, 0.0], 0.5, CrystalFace::Cubic);
        place(&mut lattice, "b", [0.5, 0.0, 0.0], 0.5, CrystalFace::Cubic);
        place(&mut lattice, "c", [9.0, 0.0, 0.0], 0.5, CrystalFace::Cubic);
        place(&mut lattice, "d", [0.2, 0.0, 0.0], 0.5, CrystalFace::Cubic);
        assert_eq!(lattice.bond_with_all(&id("b")), vec![id("a")]);
        assert_eq!(lattice.bond_with_all(&id("d")), vec![id("a"), id("b")]);
        assert!(lattice.bond_with_all(&id("ghost")).is_empty());
    }

    #[test]
    fn test_iter_in_insertion_order() {
        let mut lattice = Lattice::default();
        lattice.nucleate(id("b"), "second letter", 0.5);
        lattice.nucleate(id("a"), "first letter", 0.5);
        lattice.nucleate(id("b"), "ignored duplicate", 0.5);
        let order: Vec<&str> = lattice.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(order, vec!["b", "a"]);
    }

    #[test]
    fn test_grow_unknown_seed() {
        let mut lattice = Lattice::default();
        let grown = lattice.grow(&id("seed"), [(id("x"), "text", 0.5)]);
        assert!(grown.is_empty());
        assert!(lattice.is_empty());
    }

    #[test]
    fn test_grow_attaches_to_seed_and_its_neighbors() {
        let mut lattice = Lattice::default();
        let text = "crystals grow in quiet caves";
        lattice.nucleate(id("seed"), text, 0.5);
        let grown = lattice.grow(
            &id("seed"),
            [(id("n1"), text, 0.5), (id("n2"), text, 0.5), (id("far"), "", 0.0)],
        );
        assert_eq!(grown, vec![id("n1"), id("n2")]);

        let seed = lattice.get(&id("seed")).unwrap();
        assert_eq!(seed.coordination(), 2);
        // n2 also bonded to n1 through the seed's neighbor list
        let n2 = lattice.get(&id("n2")).unwrap();
        assert!(n2.neighbors.contains(&id("n1")));
        assert!(!n2.neighbors.contains(&id("n2")));
        // nucleated even though it did not bond
        assert!(lattice.get(&id("far")).unwrap().neighbors.is_empty());
    }

    #[test]
    fn test_analyze_unknown_seed() {
        let lattice = Lattice::default();
        assert_eq!(lattice.analyze_structure(&id("nope")), StructureMetrics::default());
    }

    #[test]
    fn test_analyze_single_node() {
        let mut lattice = Lattice::default();
        place(&mut lattice, "a", [1.0, 2.0, 3.0], 0.6, CrystalFace::Hexagonal);
        let m = lattice.analyze_structure(&id("a"));
        assert_eq!(m.node_count, 1);
        assert_relative_eq!(m.total_binding_energy, 0.6);
        assert_eq!(m.average_coordination, 0.0);
        assert_eq!(m.dominant_face, Some(CrystalFace::Hexagonal));
        assert_eq!(m.symmetry, 1.0);
    }

    #[test]
    fn test_analyze_chain_metrics() {
        let mut lattice = Lattice::default();
        place(&mut lattice, "a", [0.0, 0.0, 0.0], 0.5, CrystalFace::Tetragonal);
        place(&mut lattice, "b", [1.0, 0.0, 0.0], 0.5, CrystalFace::Cubic);
        place(&mut lattice, "c", [2.0, 0.0, 0.0], 0.5, CrystalFace::Tetragonal);
        place(&mut lattice, "lone", [0.0, 0.5, 0.0], 0.5, CrystalFace::Cubic);
        assert!(lattice.attach(&id("b"), &id("a")));
        assert!(lattice.attach(&id("c"), &id("b")));

        let m = lattice.analyze_structure(&id("a"));
        assert_eq!(m.node_count, 3);
        assert_relative_eq!(m.total_binding_energy, 1.5);
        // coordination 1, 2, 1
        assert_relative_eq!(m.average_coordination, 4.0 / 3.0);
        assert_eq!(m.face_distribution[&CrystalFace::Tetragonal], 2);
        assert_eq!(m.dominant_face, Some(CrystalFace::Tetragonal));
        // centroid (1,0,0): squared distances 1, 0, 1
        assert_relative_eq!(m.symmetry, 1.0 / (1.0 + 2.0 / 3.0));
    }

    #[test]
    fn test_dominant_face_tie_is_alphabetical() {
        let mut lattice = Lattice::default();
        place(&mut lattice, "a", [0.0, 0.0, 0.0], 0.5, CrystalFace::Tetragonal);
        place(&mut lattice, "b", [0.1, 0.0, 0.0], 0.5, CrystalFace::Monoclinic);
        assert!(lattice.attach(&id("b"), &id("a")));
        let m = lattice.analyze_structure(&id("a"));
        assert_eq!(m.dominant_face, Some(CrystalFace::Monoclinic));
    }

    #[test]
    fn test_reachable_handles_cycles() {
        let mut lattice = Lattice::default();
        for (name, x) in [("a", 0.0), ("b", 0.3), ("c", 0.6)] {
            place(&mut lattice, name, [x, 0.0, 0.0], 0.5, CrystalFace::Cubic);
        }
        lattice.bond_with_all(&id("b"));
        lattice.bond_with_all(&id("c"));
        // triangle a-b-c
        assert_eq!(lattice.bond_count(), 3);
        let reached = lattice.reachable(&id("c"));
        assert_eq!(reached.len(), 3);
        assert_eq!(reached[0].id, id("c"));
    }
}
