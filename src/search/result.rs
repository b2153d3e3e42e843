//! Search result types and statistics

use crate::instance::{Element, SubsetMask, Tranche};
use std::any::Any;
use std::time::Duration;

/// A subset of the input that satisfies the goal.
///
/// Built from one witness per tranche; the vault keeps its own copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    left_indices: Vec<usize>,
    right_indices: Vec<usize>,
    elements: Vec<Element>,
    sum: Element,
}

impl Solution {
    /// The empty subset (sum 0)
    pub fn empty() -> Self {
        Self {
            left_indices: Vec::new(),
            right_indices: Vec::new(),
            elements: Vec::new(),
            sum: 0,
        }
    }

    /// Combine a left witness and a right witness.
    pub fn combine(
        left: &Tranche,
        left_mask: SubsetMask,
        right: &Tranche,
        right_mask: SubsetMask,
    ) -> Self {
        let mut elements = left.mask_elements(left_mask);
        elements.extend(right.mask_elements(right_mask));
        let sum = elements.iter().sum();
        Self {
            left_indices: left.mask_indices(left_mask),
            right_indices: right.mask_indices(right_mask),
            elements,
            sum,
        }
    }

    /// Original-sequence indices of the chosen elements, ascending
    pub fn indices(&self) -> Vec<usize> {
        self.left_indices
            .iter()
            .chain(self.right_indices.iter())
            .copied()
            .collect()
    }

    pub fn left_indices(&self) -> &[usize] {
        &self.left_indices
    }

    pub fn right_indices(&self) -> &[usize] {
        &self.right_indices
    }

    /// Values of the chosen elements, in index order
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn sum(&self) -> Element {
        self.sum
    }

    /// Number of chosen elements
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// Witness pair confirmed by a vault lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub left: SubsetMask,
    pub right: SubsetMask,
}

/// Definite answer of a solve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    Found(Solution),
    NotFound,
}

/// Lifecycle of a solve.
///
/// `Init → VaultBuilt → Dispatched → Running → {Solved | Exhausted}`; the
/// trivial and max-sum paths jump straight to a terminal phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchPhase {
    #[default]
    Init,
    VaultBuilt,
    Dispatched,
    Running,
    Solved,
    Exhausted,
}

impl SearchPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SearchPhase::Solved | SearchPhase::Exhausted)
    }

    /// Whether `next` is a legal successor of this phase.
    pub fn can_advance_to(&self, next: SearchPhase) -> bool {
        use SearchPhase::*;
        match (self, next) {
            (Init, VaultBuilt) => true,
            (VaultBuilt, Dispatched) => true,
            (Dispatched, Running) => true,
            (Running, Solved | Exhausted) => true,
            (current, Solved | Exhausted) => !current.is_terminal(),
            _ => false,
        }
    }
}

impl std::fmt::Display for SearchPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SearchPhase::Init => "init",
            SearchPhase::VaultBuilt => "vault-built",
            SearchPhase::Dispatched => "dispatched",
            SearchPhase::Running => "running",
            SearchPhase::Solved => "solved",
            SearchPhase::Exhausted => "exhausted",
        };
        write!(f, "{}", name)
    }
}

/// A probe task that panicked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFailure {
    /// Subset-size class of the failed task
    pub size: usize,
    pub message: String,
}

impl TaskFailure {
    /// Build a failure record from a caught panic payload.
    pub fn from_panic(size: usize, payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };
        Self { size, message }
    }
}

/// What the probing stage produced: the committed hit, if any, and the
/// task-level counters.
#[derive(Debug, Clone, Default)]
pub struct ProbeRun {
    pub hit: Option<Hit>,
    pub statistics: SearchStatistics,
}

/// Statistics from a solve
#[derive(Debug, Clone, Default)]
pub struct SearchStatistics {
    /// Elements in the vault (left) tranche
    pub left_len: usize,
    /// Elements in the probed (right) tranche
    pub right_len: usize,
    /// Distinct sums stored in the vault
    pub vault_size: usize,
    /// Subsets walked while building the vault(s)
    pub vault_subsets: u64,
    /// Probe tasks dispatched (one per size class)
    pub tasks_dispatched: usize,
    /// Tasks that ran to completion or were stopped mid-way
    pub tasks_completed: usize,
    /// Tasks stopped early by cancellation
    pub tasks_cancelled: usize,
    /// Tasks never started because a solution was already committed
    pub tasks_discarded: usize,
    /// Tasks that panicked
    pub tasks_failed: usize,
    /// Right-tranche subsets enumerated by probes
    pub subsets_probed: u64,
    /// Candidates that passed the sieve
    pub candidates_emitted: u64,
    /// Exact vault lookups performed by the coordinator
    pub lookups: u64,
    /// Worker threads used (0 for sequential runs)
    pub workers: usize,
    pub time_split: Duration,
    pub time_vault: Duration,
    pub time_sieve: Duration,
    /// Total time spent solving
    pub elapsed_time: Duration,
    /// Details of each failed task
    pub failures: Vec<TaskFailure>,
}

impl SearchStatistics {
    /// Subsets rejected by the bounds check
    pub fn candidates_pruned(&self) -> u64 {
        self.subsets_probed.saturating_sub(self.candidates_emitted)
    }

    /// Fraction of probed subsets that survived the sieve (0.0 to 1.0)
    pub fn sieve_pass_rate(&self) -> f64 {
        if self.subsets_probed == 0 {
            0.0
        } else {
            self.candidates_emitted as f64 / self.subsets_probed as f64
        }
    }

    /// Probed subsets per second of sieve time
    pub fn throughput(&self) -> f64 {
        let secs = self.time_sieve.as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            self.subsets_probed as f64 / secs
        }
    }

    /// True when some tasks failed, so a "not found" covers only part of the space
    pub fn is_partially_explored(&self) -> bool {
        self.tasks_failed > 0
    }

    /// Fold one finished task's counters in
    pub fn record_task(&mut self, examined: u64, emitted: u64, cancelled: bool) {
        self.tasks_completed += 1;
        self.subsets_probed += examined;
        self.candidates_emitted += emitted;
        if cancelled {
            self.tasks_cancelled += 1;
        }
    }

    pub fn record_failure(&mut self, failure: TaskFailure) {
        self.tasks_failed += 1;
        self.failures.push(failure);
    }

    /// Format statistics as a human-readable string
    pub fn format_summary(&self) -> String {
        let mut s = String::new();
        s.push_str(&format!(
            "Tranches: {} left / {} right\n",
            self.left_len, self.right_len
        ));
        s.push_str(&format!(
            "Vault entries: {} ({} subsets enumerated)\n",
            self.vault_size, self.vault_subsets
        ));
        s.push_str(&format!(
            "Time: split {:.2?}, vault {:.2?}, sieve {:.2?}, total {:.2?}\n",
            self.time_split, self.time_vault, self.time_sieve, self.elapsed_time
        ));

        if self.tasks_dispatched > 0 {
            s.push_str(&format!(
                "Tasks: {} dispatched, {} completed, {} cancelled, {} discarded, {} failed\n",
                self.tasks_dispatched,
                self.tasks_completed,
                self.tasks_cancelled,
                self.tasks_discarded,
                self.tasks_failed
            ));
            if self.workers > 0 {
                s.push_str(&format!("Workers: {}\n", self.workers));
            }
            s.push_str(&format!("Subsets probed: {}\n", self.subsets_probed));
            s.push_str(&format!(
                "Sieve pass rate: {:.2}%\n",
                self.sieve_pass_rate() * 100.0
            ));
            s.push_str(&format!("Vault lookups: {}\n", self.lookups));
            s.push_str(&format!(
                "Throughput: {:.0} subsets/sec\n",
                self.throughput()
            ));
        }

        for failure in &self.failures {
            s.push_str(&format!(
                "Failed task (size {}): {}\n",
                failure.size, failure.message
            ));
        }

        s
    }
}

/// Everything a solve returns: the answer, how far the run got, and counters.
#[derive(Debug, Clone)]
pub struct SearchReport {
    pub outcome: SearchOutcome,
    pub phase: SearchPhase,
    pub statistics: SearchStatistics,
}

impl SearchReport {
    pub fn is_found(&self) -> bool {
        matches!(self.outcome, SearchOutcome::Found(_))
    }

    pub fn solution(&self) -> Option<&Solution> {
        match &self.outcome {
            SearchOutcome::Found(solution) => Some(solution),
            SearchOutcome::NotFound => None,
        }
    }

    pub fn into_solution(self) -> Option<Solution> {
        match self.outcome {
            SearchOutcome::Found(solution) => Some(solution),
            SearchOutcome::NotFound => None,
        }
    }
}

impl std::fmt::Display for Solution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Subset ({} elements):", self.len())?;
        let elements: Vec<String> = self.elements.iter().map(|e| e.to_string()).collect();
        writeln!(f, "  elements: [{}]", elements.join(", "))?;
        let indices: Vec<String> = self.indices().iter().map(|i| i.to_string()).collect();
        writeln!(f, "  indices:  [{}]", indices.join(", "))?;
        writeln!(f, "Sum: {}", self.sum)
    }
}

impl std::fmt::Display for SearchReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.outcome {
            SearchOutcome::Found(solution) => {
                writeln!(f, "Solution found!")?;
                write!(f, "{}", solution)?;
            }
            SearchOutcome::NotFound => {
                writeln!(f, "No solution exists.")?;
                if self.statistics.is_partially_explored() {
                    writeln!(
                        f,
                        "Warning: {} of {} probe tasks failed; the search space was only partially explored.",
                        self.statistics.tasks_failed, self.statistics.tasks_dispatched
                    )?;
                }
            }
        }
        Ok(())
    }
}
