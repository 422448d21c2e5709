use std::fmt;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Opaque identifier naming one ingested thought in both the graph and
/// the lattice. Callers must not parse it.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThoughtId(String);

impl ThoughtId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ThoughtId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ThoughtId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Source of fresh identifiers for an engine.
pub trait IdGenerator: Send {
    fn next_id(&mut self) -> ThoughtId;
}

/// Random v4 UUIDs drawn from an injected RNG.
pub struct UuidIds<R: Rng> {
    rng: R,
}

impl<R: Rng> UuidIds<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl UuidIds<SmallRng> {
    /// Reproducible id stream.
    pub fn from_seed(seed: u64) -> Self {
        Self::new(SmallRng::seed_from_u64(seed))
    }

    pub fn from_os_rng() -> Self {
        Self::new(SmallRng::from_os_rng())
    }
}

impl<R: Rng + Send> IdGenerator for UuidIds<R> {
    fn next_id(&mut self) -> ThoughtId {
        let mut bytes = [0u8; 16];
        self.rng.fill(&mut bytes);
        ThoughtId(uuid::Builder::from_random_bytes(bytes).into_uuid().to_string())
    }
}

/// Monotonic `thought-000001`, `thought-000002`, ...
#[derive(Debug, Default)]
pub struct SequentialIds {
    next: u64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> ThoughtId {
        self.next += 1;
        ThoughtId(format!("thought-{:06}", self.next))
    }
}
