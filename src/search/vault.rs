//! The vault: every achievable partial sum of one tranche
//!
//! The builder walks the full powerset of a tranche in a fixed order
//! (ascending subset size, then lexicographic index order) and keeps the
//! first subset found for each distinct sum. Bounds are tracked while
//! inserting, so they are always the exact minimum and maximum key.

use crate::error::SolveError;
use crate::instance::{Element, MAX_TRANCHE_BITS, SubsetMask, Tranche};
use crate::search::candidate::Candidate;
use crate::search::enumerate::Combinations;
use crate::search::result::Hit;
use std::collections::HashMap;
use std::collections::hash_map::Entry;

/// Closed interval of achievable sums.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub min: Element,
    pub max: Element,
}

impl Bounds {
    /// Bounds containing only `value`
    pub fn point(value: Element) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    pub fn contains(&self, value: Element) -> bool {
        self.min <= value && value <= self.max
    }

    fn widen(&mut self, value: Element) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }
}

impl std::fmt::Display for Bounds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

/// Map from achievable sum to one witnessing subset of a tranche.
///
/// Read-only once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vault {
    sums: HashMap<Element, SubsetMask>,
    bounds: Bounds,
    zero_witness: Option<SubsetMask>,
    subsets_enumerated: u64,
}

impl Vault {
    /// Witness subset for `sum`, if the tranche can reach it
    pub fn get(&self, sum: Element) -> Option<SubsetMask> {
        self.sums.get(&sum).copied()
    }

    pub fn contains(&self, sum: Element) -> bool {
        self.sums.contains_key(&sum)
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Number of distinct sums
    pub fn len(&self) -> usize {
        self.sums.len()
    }

    /// Always false: the empty subset contributes the sum 0.
    pub fn is_empty(&self) -> bool {
        self.sums.is_empty()
    }

    /// First non-empty subset summing to zero, if one exists
    pub fn zero_witness(&self) -> Option<SubsetMask> {
        self.zero_witness
    }

    /// Exact membership check for a probed candidate.
    pub fn confirm(&self, candidate: &Candidate) -> Option<Hit> {
        self.get(candidate.target).map(|left| Hit {
            left,
            right: candidate.subset,
        })
    }

    /// Witness for the largest achievable sum
    pub fn max_witness(&self) -> (Element, SubsetMask) {
        let max = self.bounds.max;
        (max, self.sums[&max])
    }

    /// Number of subsets walked while building (2^m)
    pub fn subsets_enumerated(&self) -> u64 {
        self.subsets_enumerated
    }
}

/// Builds a [`Vault`] for a tranche, refusing tranches that are too large.
#[derive(Debug, Clone, Copy)]
pub struct VaultBuilder {
    max_tranche_len: usize,
}

impl VaultBuilder {
    pub fn new(max_tranche_len: usize) -> Self {
        Self {
            max_tranche_len: max_tranche_len.min(MAX_TRANCHE_BITS),
        }
    }

    pub fn max_tranche_len(&self) -> usize {
        self.max_tranche_len
    }

    /// Check that `tranche` is small enough to enumerate, without allocating.
    pub fn check(&self, tranche: &Tranche) -> Result<(), SolveError> {
        if tranche.len() > self.max_tranche_len {
            return Err(SolveError::ResourceExhausted {
                side: tranche.side(),
                len: tranche.len(),
                reason: format!(
                    "2^{} subsets exceeds the limit of 2^{}",
                    tranche.len(),
                    self.max_tranche_len
                ),
            });
        }
        Ok(())
    }

    /// Enumerate the powerset of `tranche` into a vault.
    ///
    /// Capacity is grown with fallible reservation so an allocation failure
    /// surfaces as [`SolveError::ResourceExhausted`] instead of aborting.
    pub fn build(&self, tranche: &Tranche) -> Result<Vault, SolveError> {
        self.check(tranche)?;

        let exhausted = |reason: String| SolveError::ResourceExhausted {
            side: tranche.side(),
            len: tranche.len(),
            reason,
        };

        let m = tranche.len();
        let mut sums: HashMap<Element, SubsetMask> = HashMap::new();
        sums.try_reserve(initial_capacity(m))
            .map_err(|e| exhausted(e.to_string()))?;

        let mut bounds = Bounds::point(0);
        let mut zero_witness = None;
        let mut subsets_enumerated = 0u64;

        for size in 0..=m {
            for mask in Combinations::new(m, size) {
                subsets_enumerated += 1;
                let sum = tranche.mask_sum(mask);

                if sum == 0 && mask != 0 && zero_witness.is_none() {
                    zero_witness = Some(mask);
                }

                if sums.len() == sums.capacity() {
                    sums.try_reserve(sums.len().max(16))
                        .map_err(|e| exhausted(e.to_string()))?;
                }

                if let Entry::Vacant(slot) = sums.entry(sum) {
                    slot.insert(mask);
                    bounds.widen(sum);
                }
            }
        }

        tracing::debug!(
            side = %tranche.side(),
            elements = m,
            distinct_sums = sums.len(),
            bounds = %bounds,
            "vault built"
        );

        Ok(Vault {
            sums,
            bounds,
            zero_witness,
            subsets_enumerated,
        })
    }
}

impl Default for VaultBuilder {
    fn default() -> Self {
        Self::new(crate::search::config::DEFAULT_MAX_TRANCHE_LEN)
    }
}

/// Up-front reservation: the full powerset for small tranches, a slice of it
/// otherwise (distinct sums are often far fewer than 2^m).
fn initial_capacity(m: usize) -> usize {
    1usize << m.min(16)
}
