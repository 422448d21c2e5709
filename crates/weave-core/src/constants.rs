/// Golden ratio: (1 + √5) / 2. Default lattice spacing.
pub const PHI: f64 = 1.618_033_988_749_895;

/// Smoothing term added to n-gram union size and pattern norms.
pub const SMOOTHING: f64 = 0.1;

/// Vowel set used by the pattern signal and syllable estimation.
pub const VOWELS: &str = "aeiou";

/// Default character n-gram length
pub const NGRAM_LEN: usize = 3;

/// Default number of ranked n-grams kept per fingerprint
pub const NGRAM_TOP_K: usize = 10;

/// Default sampling frequencies for the vowel/consonant pattern vector
pub const PATTERN_FREQUENCIES: [f64; 5] = [1.0, 2.0, 3.0, 5.0, 8.0];

/// Minimum final score (exclusive) for a thought connection
pub const CONNECTION_THRESHOLD: f64 = 0.3;

/// Minimum edge strength (exclusive) followed when growing clusters
pub const CLUSTER_STRENGTH: f64 = 0.5;

/// Traversal depth used for author influence radius
pub const INFLUENCE_DEPTH: usize = 2;

/// Multiplier applied when both thoughts share an author
pub const SAME_AUTHOR_BOOST: f64 = 1.4;

/// Multiplier applied when both thoughts share a category
pub const SAME_CATEGORY_BOOST: f64 = 1.3;

/// Ceiling of the time-decay factor
pub const RESONANCE_DECAY_FACTOR: f64 = 0.87;

/// e-folding time of the time-decay factor, in hours
pub const DECAY_HOURS: f64 = 24.0;

/// Bond radius as a multiple of the lattice constant
pub const BOND_RADIUS_FACTOR: f64 = 1.5;

/// Minimum acceptance probability (exclusive) for a lattice bond
pub const BINDING_THRESHOLD: f64 = 0.7;

/// Boltzmann temperature for bond acceptance
pub const BINDING_TEMPERATURE: f64 = 0.5;

/// Text length (chars) at which the binding-energy length term saturates
pub const LENGTH_SATURATION: f64 = 500.0;

/// Reputation used for authors without an explicit score
pub const DEFAULT_REPUTATION: f64 = 0.5;

/// Tolerance on the similarity weight sum
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Fresh draws from the id generator before a colliding id is suffixed
pub const ID_RETRIES: usize = 16;
