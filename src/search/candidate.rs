//! Probing: candidate generation for one subset-size class
//!
//! A probe walks every `r`-subset of the probed tranche, derives the sum the
//! vault side would have to contribute, and drops any subset whose
//! complement falls outside the vault's bounds (the sieve). Survivors are
//! [`Candidate`]s; whether they are real hits is decided by an exact vault
//! lookup in the coordinator.

use crate::instance::{Element, SubsetMask, Tranche};
use crate::search::enumerate::{Combinations, binomial};
use crate::search::vault::Bounds;
use std::sync::atomic::{AtomicBool, Ordering};

/// Subsets examined between polls of the cancellation flag.
pub const CANCEL_CHECK_INTERVAL: u64 = 1024;

/// A probed subset together with the sum its partner must supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    /// Sum required from the vault side
    pub target: Element,
    /// The probed subset
    pub subset: SubsetMask,
}

/// How a probed subset's sum turns into a vault target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Complement {
    /// `target - sum`
    Target(Element),
    /// `-sum`
    Resonance,
}

impl Complement {
    /// Sum the vault side must contribute to pair with `sum`.
    pub fn needed(&self, sum: Element) -> Element {
        match self {
            Complement::Target(target) => target - sum,
            Complement::Resonance => -sum,
        }
    }
}

/// Everything a prober needs for one size class.
#[derive(Debug, Clone, Copy)]
pub struct ProbeTask<'a> {
    pub tranche: &'a Tranche,
    /// Exact subset size to enumerate
    pub size: usize,
    pub bounds: Bounds,
    pub complement: Complement,
    /// Polled every [`CANCEL_CHECK_INTERVAL`] subsets when present
    pub stop: Option<&'a AtomicBool>,
}

/// Lazy candidate stream for one size class.
#[derive(Debug)]
pub struct Probe<'a> {
    task: ProbeTask<'a>,
    combinations: Combinations,
    examined: u64,
    emitted: u64,
    cancelled: bool,
}

impl<'a> Probe<'a> {
    pub fn new(task: ProbeTask<'a>) -> Self {
        Self {
            combinations: Combinations::new(task.tranche.len(), task.size),
            task,
            examined: 0,
            emitted: 0,
            cancelled: false,
        }
    }

    /// Subsets enumerated so far
    pub fn examined(&self) -> u64 {
        self.examined
    }

    /// Candidates that passed the sieve so far
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    /// Subsets rejected by the bounds check so far
    pub fn pruned(&self) -> u64 {
        self.examined - self.emitted
    }

    /// Whether the probe stopped early because the stop flag was raised
    pub fn was_cancelled(&self) -> bool {
        self.cancelled
    }

    fn should_stop(&self) -> bool {
        self.task
            .stop
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

impl Iterator for Probe<'_> {
    type Item = Candidate;

    fn next(&mut self) -> Option<Candidate> {
        if self.cancelled {
            return None;
        }
        loop {
            if self.examined % CANCEL_CHECK_INTERVAL == 0 && self.should_stop() {
                self.cancelled = true;
                return None;
            }

            let subset = self.combinations.next()?;
            self.examined += 1;

            let sum = self.task.tranche.mask_sum(subset);
            let target = self.task.complement.needed(sum);
            if self.task.bounds.contains(target) {
                self.emitted += 1;
                return Some(Candidate { target, subset });
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.cancelled {
            return (0, Some(0));
        }
        let remaining = binomial(self.task.tranche.len(), self.task.size) - self.examined;
        (0, usize::try_from(remaining).ok())
    }
}

/// Strategy that turns a probe task into a candidate stream.
///
/// Implementations must be pure: the same task always yields the same
/// candidates, and nothing is shared between tasks.
pub trait Prober: Send + Sync {
    fn probe<'a>(&self, task: ProbeTask<'a>) -> Probe<'a>;

    /// Name used in logs
    fn name(&self) -> &str;
}

/// The bound-filtered exhaustive prober.
#[derive(Debug, Clone, Copy, Default)]
pub struct SieveProber;

impl Prober for SieveProber {
    fn probe<'a>(&self, task: ProbeTask<'a>) -> Probe<'a> {
        Probe::new(task)
    }

    fn name(&self) -> &str {
        "sieve"
    }
}
