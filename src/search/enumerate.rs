//! Index-based combination generation
//!
//! Subsets are enumerated by size class: [`Combinations`] walks every
//! `r`-element subset of `n` positions in lexicographic index order without
//! recursion, holding only the current index vector. A generator is consumed
//! as it runs; enumerating again requires a fresh one.

use crate::instance::SubsetMask;

/// Lazy iterator over all `r`-subsets of `0..n`, as bit masks.
#[derive(Debug, Clone)]
pub struct Combinations {
    n: usize,
    indices: Vec<usize>,
    started: bool,
    done: bool,
}

impl Combinations {
    pub fn new(n: usize, r: usize) -> Self {
        Self {
            n,
            indices: (0..r).collect(),
            started: false,
            done: r > n,
        }
    }

    fn current_mask(&self) -> SubsetMask {
        self.indices.iter().fold(0, |mask, &i| mask | (1 << i))
    }

    /// Step `indices` to the next combination; false when exhausted.
    fn advance(&mut self) -> bool {
        let r = self.indices.len();
        // Rightmost index that can still move right
        let Some(i) = (0..r).rev().find(|&i| self.indices[i] != i + self.n - r) else {
            return false;
        };
        self.indices[i] += 1;
        for j in i + 1..r {
            self.indices[j] = self.indices[j - 1] + 1;
        }
        true
    }
}

impl Iterator for Combinations {
    type Item = SubsetMask;

    fn next(&mut self) -> Option<SubsetMask> {
        if self.done {
            return None;
        }
        if !self.started {
            self.started = true;
        } else if !self.advance() {
            self.done = true;
            return None;
        }
        Some(self.current_mask())
    }
}

/// Binomial coefficient C(n, r), saturating at `u64::MAX`.
pub fn binomial(n: usize, r: usize) -> u64 {
    if r > n {
        return 0;
    }
    let r = r.min(n - r);
    let mut result: u128 = 1;
    for i in 0..r {
        result = result * (n - i) as u128 / (i + 1) as u128;
        if result > u64::MAX as u128 {
            return u64::MAX;
        }
    }
    result as u64
}
