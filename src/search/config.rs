//! Configuration types for the subset-sum search

use crate::instance::{Element, MAX_TRANCHE_BITS};
use crate::search::parallel::ParallelConfig;

/// Default cap on the number of elements the vault enumerates (2^32 subsets).
pub const DEFAULT_MAX_TRANCHE_LEN: usize = 32;

/// What the search is looking for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Goal {
    /// A subset summing to exactly this value
    Target(Element),
    /// A non-empty subset summing to zero
    Resonance,
    /// The subset with the largest achievable sum
    MaxSum,
}

impl Goal {
    /// The exact sum a solution must have, if the goal fixes one
    pub fn required_sum(&self) -> Option<Element> {
        match self {
            Goal::Target(t) => Some(*t),
            Goal::Resonance => Some(0),
            Goal::MaxSum => None,
        }
    }
}

impl std::fmt::Display for Goal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Goal::Target(t) => write!(f, "target {}", t),
            Goal::Resonance => write!(f, "resonance"),
            Goal::MaxSum => write!(f, "max-sum"),
        }
    }
}

impl std::str::FromStr for Goal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        match lowered.as_str() {
            "resonance" | "zero" | "res" => Ok(Goal::Resonance),
            "max" | "max-sum" | "maxsum" => Ok(Goal::MaxSum),
            other => {
                let value = other.strip_prefix("target").unwrap_or(other).trim();
                value.parse::<Element>().map(Goal::Target).map_err(|_| {
                    format!(
                        "Unknown goal: '{}'. Valid options: <integer>, resonance, max-sum",
                        s
                    )
                })
            }
        }
    }
}

/// Configuration for a single solve
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Run probe tasks on a worker pool (false = in the calling thread)
    pub parallel: bool,
    /// Worker pool settings, used when `parallel` is set
    pub parallel_config: ParallelConfig,
    /// Largest tranche the vault builder will enumerate
    pub max_tranche_len: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            parallel_config: ParallelConfig::default(),
            max_tranche_len: DEFAULT_MAX_TRANCHE_LEN,
        }
    }
}

impl SearchConfig {
    /// Configuration that probes sequentially in the calling thread
    pub fn sequential() -> Self {
        Self::default().with_parallel(false)
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set the worker count (clamped to at least one)
    pub fn with_workers(mut self, num_workers: usize) -> Self {
        self.parallel_config = self.parallel_config.with_workers(num_workers);
        self
    }

    /// Set the worker count from an Option, keeping the default on `None`
    pub fn with_workers_option(self, num_workers: Option<usize>) -> Self {
        match num_workers {
            Some(n) => self.with_workers(n),
            None => self,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.parallel_config = self.parallel_config.with_batch_size(batch_size);
        self
    }

    /// Set the per-worker depth of the completion channel
    pub fn with_channel_depth(mut self, depth: usize) -> Self {
        self.parallel_config = self.parallel_config.with_channel_depth(depth);
        self
    }

    /// Set the largest tranche the vault may enumerate (clamped to 63)
    pub fn with_max_tranche_len(mut self, len: usize) -> Self {
        self.max_tranche_len = len.min(MAX_TRANCHE_BITS);
        self
    }

    /// Whether probing will actually fan out over more than one thread
    pub fn uses_worker_pool(&self) -> bool {
        self.parallel && self.parallel_config.num_workers > 1
    }
}
