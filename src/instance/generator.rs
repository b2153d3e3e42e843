//! Reproducible instance generation for fixtures and benchmarks

use crate::instance::types::Element;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Configuration for instance generation
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Number of elements to generate
    pub size: usize,
    /// Values are drawn from `-range..=range` (or `1..=range` for positive instances)
    pub range: Element,
    /// Seed for the ChaCha8 stream; `None` draws a seed from the OS
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            size: 20,
            range: 100,
            seed: None,
        }
    }
}

impl GeneratorConfig {
    pub fn with_size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    pub fn with_range(mut self, range: Element) -> Self {
        self.range = range.max(1);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_seed_option(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    fn rng(&self) -> ChaCha8Rng {
        match self.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_os_rng(),
        }
    }
}

/// Generate an instance whose elements sum to exactly zero.
///
/// The first `size - 1` elements are drawn uniformly from `-range..=range`;
/// the last one cancels their sum. Any non-empty instance therefore admits a
/// zero-sum subset (the whole sequence).
pub fn generate_resonance_instance(config: &GeneratorConfig) -> Vec<Element> {
    if config.size == 0 {
        return Vec::new();
    }

    let mut rng = config.rng();
    // Keeps the running total (and so the cancelling element) within i64
    let range = config.range.clamp(1, Element::MAX / config.size as Element);
    let mut instance = Vec::with_capacity(config.size);
    let mut running: Element = 0;

    for _ in 0..config.size - 1 {
        let value = rng.random_range(-range..=range);
        running += value;
        instance.push(value);
    }
    instance.push(-running);

    instance
}

/// Generate an instance of strictly positive values in `1..=range`.
pub fn generate_positive_instance(config: &GeneratorConfig) -> Vec<Element> {
    let mut rng = config.rng();
    let range = config.range.max(1);
    (0..config.size)
        .map(|_| rng.random_range(1..=range))
        .collect()
}
