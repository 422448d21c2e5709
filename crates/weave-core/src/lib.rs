//! Thought weaving engine.
//!
//! Fingerprints discussion content with hand-rolled text statistics and
//! organizes it into two parallel structures: a directed similarity graph
//! (constellations, clusters, influence) and a 3D lattice whose bonded
//! crystals expose coordination, face and symmetry metrics.
//!
//! Pure computation over in-memory registries owned by one [`WeaveEngine`].
//! The only I/O is the optional config file loader.

pub mod affinity;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod graph;
pub mod ids;
pub mod lattice;
pub mod spatial;
pub mod time;
pub mod tokenizer;

pub use affinity::{AffinityScorer, BondRule, SimilarityBreakdown, ThoughtContext, distance};
pub use config::{EngineConfig, LatticeConfig, SimilarityWeights, WeaverConfig};
pub use constants::{BINDING_THRESHOLD, CONNECTION_THRESHOLD, PHI};
pub use engine::WeaveEngine;
pub use error::{Result, WeaveError};
pub use fingerprint::{FeatureExtractor, Fingerprint};
pub use graph::{Connection, Constellation, ConstellationEntry, ThoughtGraph, ThoughtRecord};
pub use ids::{IdGenerator, SequentialIds, ThoughtId, UuidIds};
pub use lattice::{CrystalNode, Lattice, StructureMetrics};
pub use spatial::{CrystalFace, SpatialMapper, classify_face};
