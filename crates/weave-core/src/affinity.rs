//! Pairwise affinity: fingerprint similarity for the thought graph and
//! distance/energy gating for the lattice.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::config::{LatticeConfig, SimilarityWeights, WeaverConfig};
use crate::constants::SMOOTHING;
use crate::fingerprint::Fingerprint;
use crate::time::hours_between;

/// Who wrote a thought, how it is filed, and when (Unix seconds).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThoughtContext {
    pub author: String,
    pub category: String,
    pub timestamp: u64,
}

impl ThoughtContext {
    pub fn new(author: impl Into<String>, category: impl Into<String>, timestamp: u64) -> Self {
        Self {
            author: author.into(),
            category: category.into(),
            timestamp,
        }
    }
}

/// The four sub-scores behind a base similarity, each in [0, 1].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimilarityBreakdown {
    pub ngram_overlap: f64,
    pub pattern_correlation: f64,
    pub density: f64,
    pub length: f64,
}

impl SimilarityBreakdown {
    pub fn weighted(&self, w: &SimilarityWeights) -> f64 {
        self.ngram_overlap * w.ngram
            + self.pattern_correlation * w.pattern
            + self.density * w.density
            + self.length * w.length
    }
}

/// Scores fingerprint pairs and applies contextual multipliers.
#[derive(Clone, Debug)]
pub struct AffinityScorer {
    weights: SimilarityWeights,
    same_author_boost: f64,
    same_category_boost: f64,
    resonance_decay_factor: f64,
    decay_hours: f64,
    threshold: f64,
}

impl Default for AffinityScorer {
    fn default() -> Self {
        Self::new(&WeaverConfig::default())
    }
}

impl AffinityScorer {
    pub fn new(config: &WeaverConfig) -> Self {
        Self {
            weights: config.weights,
            same_author_boost: config.same_author_boost,
            same_category_boost: config.same_category_boost,
            resonance_decay_factor: config.resonance_decay_factor,
            decay_hours: config.decay_hours,
            threshold: config.connection_threshold,
        }
    }

    pub fn breakdown(&self, a: &Fingerprint, b: &Fingerprint) -> SimilarityBreakdown {
        SimilarityBreakdown {
            ngram_overlap: ngram_overlap(a, b),
            pattern_correlation: pattern_correlation(&a.pattern, &b.pattern),
            density: 1.0 / (1.0 + (a.semantic_density - b.semantic_density).abs() * 3.0),
            length: 1.0 / (1.0 + (a.length_log - b.length_log).abs()),
        }
    }

    /// Base similarity in [0, 1]. Symmetric in its arguments.
    pub fn similarity(&self, a: &Fingerprint, b: &Fingerprint) -> f64 {
        self.breakdown(a, b).weighted(&self.weights)
    }

    /// exp(-hours/decay_hours) · resonance factor, hours measured from the
    /// candidate's creation to the new thought's creation.
    pub fn time_decay(&self, candidate_ts: u64, new_ts: u64) -> f64 {
        let hours = hours_between(candidate_ts, new_ts);
        (-hours / self.decay_hours).exp() * self.resonance_decay_factor
    }

    /// Apply author boost, then category boost, then decay to `base`.
    pub fn contextual(&self, base: f64, new: &ThoughtContext, candidate: &ThoughtContext) -> f64 {
        let mut score = base;
        if new.author == candidate.author {
            score *= self.same_author_boost;
        }
        if new.category == candidate.category {
            score *= self.same_category_boost;
        }
        score * self.time_decay(candidate.timestamp, new.timestamp)
    }

    /// Final directed score from `new` toward `candidate`.
    pub fn score(
        &self,
        new_fp: &Fingerprint,
        new_ctx: &ThoughtContext,
        candidate_fp: &Fingerprint,
        candidate_ctx: &ThoughtContext,
    ) -> f64 {
        self.contextual(self.similarity(new_fp, candidate_fp), new_ctx, candidate_ctx)
    }

    /// Edges form strictly above the threshold.
    pub fn connects(&self, score: f64) -> bool {
        score > self.threshold
    }
}

/// |A ∩ B| / (|A ∪ B| + 0.1) over the ranked n-gram sets.
fn ngram_overlap(a: &Fingerprint, b: &Fingerprint) -> f64 {
    let set_a: HashSet<&str> = a.ngrams().collect();
    let set_b: HashSet<&str> = b.ngrams().collect();
    let inter = set_a.intersection(&set_b).count() as f64;
    let union = set_a.union(&set_b).count() as f64;
    inter / (union + SMOOTHING)
}

/// Smoothed cosine, floored at 0. Anti-correlated patterns contribute nothing.
fn pattern_correlation(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = (a.iter().map(|x| x * x).sum::<f64>() + SMOOTHING).sqrt();
    let norm_b = (b.iter().map(|x| x * x).sum::<f64>() + SMOOTHING).sqrt();
    (dot / (norm_a * norm_b + SMOOTHING)).max(0.0)
}

/// Euclidean distance in 3D.
pub fn distance(a: [f64; 3], b: [f64; 3]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// Distance and energy gate for lattice bonds.
#[derive(Clone, Debug)]
pub struct BondRule {
    radius: f64,
    temperature: f64,
    threshold: f64,
}

impl Default for BondRule {
    fn default() -> Self {
        Self::new(&LatticeConfig::default())
    }
}

impl BondRule {
    pub fn new(config: &LatticeConfig) -> Self {
        Self {
            radius: config.bond_radius(),
            temperature: config.temperature,
            threshold: config.binding_threshold,
        }
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// exp(-|Δenergy| / T), in (0, 1].
    pub fn binding_probability(&self, energy_a: f64, energy_b: f64) -> f64 {
        (-(energy_a - energy_b).abs() / self.temperature).exp()
    }

    /// Within the radius (inclusive) and probability strictly above threshold.
    pub fn bonds(&self, pos_a: [f64; 3], energy_a: f64, pos_b: [f64; 3], energy_b: f64) -> bool {
        distance(pos_a, pos_b) <= self.radius
            && self.binding_probability(energy_a, energy_b) > self.threshold
    }
}
