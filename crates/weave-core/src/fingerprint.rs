use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::WeaverConfig;
use crate::tokenizer::{char_len, lowercase_words, unique_ratio, vowel_signal};

/// Numeric descriptor of a piece of text, compared pairwise by the
/// affinity scorer. Immutable once computed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Fingerprint {
    /// Top-ranked alphabetic n-grams with their counts, most frequent first.
    pub ngram_top: Vec<(String, usize)>,
    /// Vowel/consonant signal projected onto a fixed sinusoidal basis.
    pub pattern: Vec<f64>,
    pub semantic_density: f64,
    pub punct_rhythm: f64,
    pub length_log: f64,
}

impl Fingerprint {
    pub fn ngrams(&self) -> impl Iterator<Item = &str> {
        self.ngram_top.iter().map(|(g, _)| g.as_str())
    }
}

/// Turns raw text into a [`Fingerprint`]. Pure function of the text for a
/// given configuration.
#[derive(Clone, Debug)]
pub struct FeatureExtractor {
    ngram_len: usize,
    top_k: usize,
    frequencies: Vec<f64>,
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new(&WeaverConfig::default())
    }
}

impl FeatureExtractor {
    pub fn new(config: &WeaverConfig) -> Self {
        Self {
            ngram_len: config.ngram_len,
            top_k: config.top_k,
            frequencies: config.frequencies.clone(),
        }
    }

    /// Length of every pattern vector this extractor produces.
    pub fn pattern_len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn extract(&self, text: &str) -> Fingerprint {
        let lower = text.to_lowercase();
        let words = lowercase_words(text);
        let len = char_len(text);

        Fingerprint {
            ngram_top: self.rank_ngrams(&lower),
            pattern: self.pattern_vector(&lower),
            semantic_density: unique_ratio(&words),
            punct_rhythm: punct_rhythm(text, len),
            length_log: (len as f64 + 1.0).ln(),
        }
    }

    /// Count purely alphabetic windows; rank by count, ties by first occurrence.
    fn rank_ngrams(&self, lower: &str) -> Vec<(String, usize)> {
        if self.ngram_len == 0 {
            return Vec::new();
        }
        let chars: Vec<char> = lower.chars().collect();
        let mut counts: Vec<(String, usize)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for window in chars.windows(self.ngram_len) {
            if !window.iter().all(|c| c.is_alphabetic()) {
                continue;
            }
            let gram: String = window.iter().collect();
            match index.get(&gram) {
                Some(&i) => counts[i].1 += 1,
                None => {
                    index.insert(gram.clone(), counts.len());
                    counts.push((gram, 1));
                }
            }
        }

        // Stable sort keeps first-occurrence order among equal counts.
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts.truncate(self.top_k);
        counts
    }

    /// Σ s[i]·sin(2π·f·i/L) per frequency. All zeros when there are no letters.
    fn pattern_vector(&self, lower: &str) -> Vec<f64> {
        let signal = vowel_signal(lower);
        if signal.is_empty() {
            return vec![0.0; self.frequencies.len()];
        }
        let n = signal.len() as f64;
        self.frequencies
            .iter()
            .map(|&freq| {
                signal
                    .iter()
                    .enumerate()
                    .filter(|&(_, &bit)| bit == 1)
                    .map(|(i, _)| (std::f64::consts::TAU * freq * i as f64 / n).sin())
                    .sum::<f64>()
            })
            .collect()
    }
}

fn punct_rhythm(text: &str, len: usize) -> f64 {
    let exclaims = text.matches('!').count() as f64;
    let questions = text.matches('?').count() as f64;
    (exclaims * 2.3 + questions * 1.7) / (len as f64 + 1.0)
}
