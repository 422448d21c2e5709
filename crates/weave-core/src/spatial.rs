use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::LatticeConfig;
use crate::tokenizer::{char_len, clauses, estimate_syllables, lowercase_words, unique_ratio, words};

/// Lattice category of a node, chosen from character-class counts.
///
/// Variants are declared alphabetically; `Ord` follows that order and every
/// tie between faces resolves to the smaller one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrystalFace {
    Cubic,
    Hexagonal,
    Monoclinic,
    Orthorhombic,
    Tetragonal,
}

impl CrystalFace {
    pub const ALL: [CrystalFace; 5] = [
        Self::Cubic,
        Self::Hexagonal,
        Self::Monoclinic,
        Self::Orthorhombic,
        Self::Tetragonal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cubic => "cubic",
            Self::Hexagonal => "hexagonal",
            Self::Monoclinic => "monoclinic",
            Self::Orthorhombic => "orthorhombic",
            Self::Tetragonal => "tetragonal",
        }
    }

    /// Characters whose counts make up this face's score.
    fn signature(&self) -> [char; 2] {
        match self {
            Self::Cubic => ['a', 'e'],
            Self::Hexagonal => ['i', 'o'],
            Self::Monoclinic => ['n', 'r'],
            Self::Orthorhombic => ['s', 't'],
            Self::Tetragonal => ['u', 'y'],
        }
    }
}

impl fmt::Display for CrystalFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Face with the highest character-class score. Ties go to the
/// alphabetically first face, so empty text is `Cubic`.
pub fn classify_face(text: &str) -> CrystalFace {
    let lower = text.to_lowercase();
    let mut best = CrystalFace::Cubic;
    let mut best_score = 0usize;
    for face in CrystalFace::ALL {
        let sig = face.signature();
        let score = lower.chars().filter(|c| sig.contains(c)).count();
        if score > best_score {
            best = face;
            best_score = score;
        }
    }
    best
}

/// Projects text into 3D and derives binding energy.
#[derive(Clone, Debug)]
pub struct SpatialMapper {
    x_scale: f64,
    length_saturation: f64,
}

impl Default for SpatialMapper {
    fn default() -> Self {
        Self::new(&LatticeConfig::default())
    }
}

impl SpatialMapper {
    pub fn new(config: &LatticeConfig) -> Self {
        Self {
            x_scale: config.x_scale,
            length_saturation: config.length_saturation,
        }
    }

    /// x: lexical diversity · scale, y: ln(1 + mean clause length),
    /// z: √(syllables) / 10.
    pub fn map_to_space(&self, text: &str) -> [f64; 3] {
        let tokens = lowercase_words(text);
        let x = unique_ratio(&tokens) * self.x_scale;

        let parts = clauses(text);
        let clause_words: usize = parts.iter().map(|c| c.split_whitespace().count()).sum();
        let mean_clause = clause_words as f64 / parts.len() as f64;
        let y = (mean_clause + 1.0).ln();

        let syllables: usize = tokens.iter().map(|t| estimate_syllables(t)).sum();
        let z = (syllables as f64).sqrt() / 10.0;

        [x, y, z]
    }

    /// 0.3·length + 0.4·reputation + 0.3·uniqueness, each term in [0, 1].
    pub fn binding_energy(&self, text: &str, reputation: f64) -> f64 {
        let length_factor = (char_len(text) as f64 / self.length_saturation).min(1.0);
        let uniqueness = unique_ratio(&words(text));
        length_factor * 0.3 + reputation * 0.4 + uniqueness * 0.3
    }
}
