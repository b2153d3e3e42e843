//! Meet-in-the-middle subset-sum search
//!
//! The input is split into two tranches. The left tranche is enumerated into
//! a [`Vault`] of every achievable sum; the right tranche is probed one
//! subset-size class at a time, either in the calling thread or across a
//! worker pool, and each probed subset whose complement lies within the
//! vault's bounds is confirmed by an exact lookup.

pub mod candidate;
pub mod config;
pub mod enumerate;
pub mod parallel;
pub mod result;
pub mod sequential;
pub mod solver;
pub mod splitter;
pub mod vault;

pub use candidate::{Candidate, Complement, Probe, ProbeTask, Prober, SieveProber};
pub use config::{Goal, SearchConfig};
pub use parallel::{ParallelConfig, run_parallel_search};
pub use result::{
    SearchOutcome, SearchPhase, SearchReport, SearchStatistics, Solution, TaskFailure,
};
pub use sequential::run_sequential_search;
pub use solver::{solve, solve_with_prober};
pub use splitter::split_tranches;
pub use vault::{Bounds, Vault, VaultBuilder};
