//! Engine configuration.
//!
//! Every threshold, weight and constant used by scoring and bonding lives
//! here and is fixed for the lifetime of an engine. Values are checked once
//! by [`EngineConfig::validate`] when the engine is built, so scoring calls
//! never see an out-of-range setting.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{
    BINDING_TEMPERATURE, BINDING_THRESHOLD, BOND_RADIUS_FACTOR, CLUSTER_STRENGTH,
    CONNECTION_THRESHOLD, DECAY_HOURS, DEFAULT_REPUTATION, INFLUENCE_DEPTH, LENGTH_SATURATION,
    NGRAM_LEN, NGRAM_TOP_K, PATTERN_FREQUENCIES, PHI, RESONANCE_DECAY_FACTOR, SAME_AUTHOR_BOOST,
    SAME_CATEGORY_BOOST, WEIGHT_SUM_TOLERANCE,
};
use crate::error::{Result, WeaveError};

/// Weights of the four similarity sub-scores. Must sum to 1.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityWeights {
    pub ngram: f64,
    pub pattern: f64,
    pub density: f64,
    pub length: f64,
}

impl Default for SimilarityWeights {
    fn default() -> Self {
        Self {
            ngram: 0.35,
            pattern: 0.25,
            density: 0.20,
            length: 0.20,
        }
    }
}

impl SimilarityWeights {
    pub fn sum(&self) -> f64 {
        self.ngram + self.pattern + self.density + self.length
    }
}

/// Settings for fingerprinting and the similarity graph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaverConfig {
    pub ngram_len: usize,
    pub top_k: usize,
    pub frequencies: Vec<f64>,
    pub weights: SimilarityWeights,
    pub same_author_boost: f64,
    pub same_category_boost: f64,
    pub resonance_decay_factor: f64,
    pub decay_hours: f64,
    pub connection_threshold: f64,
    pub cluster_strength: f64,
    pub influence_depth: usize,
}

impl Default for WeaverConfig {
    fn default() -> Self {
        Self {
            ngram_len: NGRAM_LEN,
            top_k: NGRAM_TOP_K,
            frequencies: PATTERN_FREQUENCIES.to_vec(),
            weights: SimilarityWeights::default(),
            same_author_boost: SAME_AUTHOR_BOOST,
            same_category_boost: SAME_CATEGORY_BOOST,
            resonance_decay_factor: RESONANCE_DECAY_FACTOR,
            decay_hours: DECAY_HOURS,
            connection_threshold: CONNECTION_THRESHOLD,
            cluster_strength: CLUSTER_STRENGTH,
            influence_depth: INFLUENCE_DEPTH,
        }
    }
}

/// Settings for spatial mapping and lattice bonding.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LatticeConfig {
    pub lattice_constant: f64,
    pub bond_radius_factor: f64,
    pub binding_threshold: f64,
    pub temperature: f64,
    /// Scale applied to lexical diversity on the x axis.
    pub x_scale: f64,
    pub length_saturation: f64,
}

impl Default for LatticeConfig {
    fn default() -> Self {
        Self {
            lattice_constant: PHI,
            bond_radius_factor: BOND_RADIUS_FACTOR,
            binding_threshold: BINDING_THRESHOLD,
            temperature: BINDING_TEMPERATURE,
            x_scale: std::f64::consts::PI,
            length_saturation: LENGTH_SATURATION,
        }
    }
}

impl LatticeConfig {
    /// Maximum distance at which two nodes may bond.
    pub fn bond_radius(&self) -> f64 {
        self.lattice_constant * self.bond_radius_factor
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub weaver: WeaverConfig,
    pub lattice: LatticeConfig,
    pub default_reputation: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            weaver: WeaverConfig::default(),
            lattice: LatticeConfig::default(),
            default_reputation: DEFAULT_REPUTATION,
        }
    }
}

fn require(cond: bool, msg: impl FnOnce() -> String) -> Result<()> {
    if cond {
        Ok(())
    } else {
        Err(WeaveError::InvalidConfig(msg()))
    }
}

fn non_negative(name: &str, v: f64) -> Result<()> {
    require(v.is_finite() && v >= 0.0, || {
        format!("{name} must be finite and >= 0, got {v}")
    })
}

fn positive(name: &str, v: f64) -> Result<()> {
    require(v.is_finite() && v > 0.0, || {
        format!("{name} must be finite and > 0, got {v}")
    })
}

fn unit_interval(name: &str, v: f64) -> Result<()> {
    require((0.0..=1.0).contains(&v), || {
        format!("{name} must be in [0, 1], got {v}")
    })
}

impl EngineConfig {
    /// Parse TOML and validate. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a TOML config file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        self.weaver.validate()?;
        self.lattice.validate()?;
        unit_interval("default_reputation", self.default_reputation)
    }
}

impl WeaverConfig {
    pub fn validate(&self) -> Result<()> {
        require(self.ngram_len > 0, || "ngram_len must be > 0".to_string())?;
        require(!self.frequencies.is_empty(), || {
            "frequencies must not be empty".to_string()
        })?;
        for f in &self.frequencies {
            require(f.is_finite(), || format!("frequency must be finite, got {f}"))?;
        }

        let w = &self.weights;
        for (name, v) in [
            ("weights.ngram", w.ngram),
            ("weights.pattern", w.pattern),
            ("weights.density", w.density),
            ("weights.length", w.length),
        ] {
            non_negative(name, v)?;
        }
        let sum = w.sum();
        require((sum - 1.0).abs() <= WEIGHT_SUM_TOLERANCE, || {
            format!("similarity weights must sum to 1, got {sum}")
        })?;

        non_negative("same_author_boost", self.same_author_boost)?;
        non_negative("same_category_boost", self.same_category_boost)?;
        non_negative("resonance_decay_factor", self.resonance_decay_factor)?;
        positive("decay_hours", self.decay_hours)?;
        non_negative("connection_threshold", self.connection_threshold)?;
        non_negative("cluster_strength", self.cluster_strength)
    }
}

impl LatticeConfig {
    pub fn validate(&self) -> Result<()> {
        positive("lattice_constant", self.lattice_constant)?;
        non_negative("bond_radius_factor", self.bond_radius_factor)?;
        unit_interval("binding_threshold", self.binding_threshold)?;
        positive("temperature", self.temperature)?;
        non_negative("x_scale", self.x_scale)?;
        positive("length_saturation", self.length_saturation)
    }
}
