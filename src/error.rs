//! Error types surfaced by the solver

use crate::instance::Side;
use thiserror::Error;

/// Conditions that stop a solve before it can return a definite answer.
///
/// A target that simply cannot be reached is not an error; it is reported as
/// [`SearchOutcome::NotFound`](crate::search::SearchOutcome::NotFound).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolveError {
    /// The input cannot be searched at all (e.g. its subset sums overflow `i64`).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Enumerating a tranche would exceed the configured or available memory.
    #[error("resource exhausted: {side} tranche of {len} elements cannot be enumerated ({reason})")]
    ResourceExhausted {
        side: Side,
        len: usize,
        reason: String,
    },

    /// Every dispatched probe task failed, so "not found" cannot be concluded.
    #[error("search inconclusive: all {failed_tasks} probe tasks failed")]
    Inconclusive { failed_tasks: usize },
}
