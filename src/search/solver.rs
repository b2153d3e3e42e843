//! The solve entry point: split, build the vault, probe, report

use crate::error::SolveError;
use crate::instance::{Element, MAX_TRANCHE_BITS, Tranche, reachable_range};
use crate::search::candidate::{Complement, Prober, SieveProber};
use crate::search::config::{Goal, SearchConfig};
use crate::search::parallel::run_parallel_search;
use crate::search::result::{
    Hit, ProbeRun, SearchOutcome, SearchPhase, SearchReport, SearchStatistics, Solution,
};
use crate::search::sequential::run_sequential_search;
use crate::search::splitter::split_tranches;
use crate::search::vault::{Vault, VaultBuilder};
use std::sync::Arc;
use std::time::Instant;

/// Search `sequence` for a subset meeting `goal`.
///
/// Returns a report whose outcome is either a concrete [`Solution`] or
/// [`SearchOutcome::NotFound`]. Errors are reserved for inputs that cannot be
/// searched and for runs where every probe task failed.
pub fn solve(
    sequence: &[Element],
    goal: Goal,
    config: &SearchConfig,
) -> Result<SearchReport, SolveError> {
    solve_with_prober(sequence, goal, config, Arc::new(SieveProber))
}

/// [`solve`] with a caller-supplied probe strategy.
///
/// A prober that panics only loses its own size class: the panic is caught,
/// logged at `warn`, and recorded in [`SearchStatistics::failures`]. The
/// process-wide panic hook still runs first, so under the default hook each
/// caught panic is also printed to stderr. Callers that need silence install
/// their own hook with [`std::panic::set_hook`].
pub fn solve_with_prober(
    sequence: &[Element],
    goal: Goal,
    config: &SearchConfig,
    prober: Arc<dyn Prober>,
) -> Result<SearchReport, SolveError> {
    let span = tracing::info_span!("solve", elements = sequence.len(), %goal);
    let _enter = span.enter();
    Solver::new(config, prober).run(sequence, goal)
}

/// Per-call solver state. Nothing outlives a single solve.
struct Solver<'c> {
    config: &'c SearchConfig,
    prober: Arc<dyn Prober>,
    phase: SearchPhase,
    statistics: SearchStatistics,
    start_time: Instant,
}

impl<'c> Solver<'c> {
    fn new(config: &'c SearchConfig, prober: Arc<dyn Prober>) -> Self {
        Self {
            config,
            prober,
            phase: SearchPhase::Init,
            statistics: SearchStatistics::default(),
            start_time: Instant::now(),
        }
    }

    fn advance(&mut self, next: SearchPhase) {
        debug_assert!(
            self.phase.can_advance_to(next),
            "illegal phase transition {} -> {}",
            self.phase,
            next
        );
        tracing::debug!(from = %self.phase, to = %next, "phase transition");
        self.phase = next;
    }

    fn finish(mut self, outcome: SearchOutcome) -> SearchReport {
        let terminal = match outcome {
            SearchOutcome::Found(_) => SearchPhase::Solved,
            SearchOutcome::NotFound => SearchPhase::Exhausted,
        };
        self.advance(terminal);
        self.statistics.elapsed_time = self.start_time.elapsed();
        SearchReport {
            outcome,
            phase: self.phase,
            statistics: self.statistics,
        }
    }

    fn run(mut self, sequence: &[Element], goal: Goal) -> Result<SearchReport, SolveError> {
        let (negative, positive) = reachable_range(sequence).ok_or_else(|| {
            SolveError::InvalidInput(
                "absolute sum of the input overflows a 64-bit integer".to_string(),
            )
        })?;

        if sequence.is_empty() {
            // Only the empty subset exists
            let outcome = match goal.required_sum() {
                Some(0) | None => SearchOutcome::Found(Solution::empty()),
                Some(_) => SearchOutcome::NotFound,
            };
            return Ok(self.finish(outcome));
        }

        if let Goal::Target(target) = goal
            && !(negative..=positive).contains(&target)
        {
            tracing::debug!(goal_sum = target, negative, positive, "target outside reachable range");
            return Ok(self.finish(SearchOutcome::NotFound));
        }

        let split_start = Instant::now();
        let (left, right) = split_tranches(sequence);
        self.statistics.time_split = split_start.elapsed();
        self.statistics.left_len = left.len();
        self.statistics.right_len = right.len();

        // Fail fast on either side before paying for the vault
        let builder = VaultBuilder::new(self.config.max_tranche_len);
        builder.check(&left)?;
        if goal == Goal::MaxSum {
            builder.check(&right)?;
        } else {
            VaultBuilder::new(MAX_TRANCHE_BITS).check(&right)?;
        }

        let vault_start = Instant::now();
        let vault = builder.build(&left)?;
        self.statistics.time_vault = vault_start.elapsed();
        self.statistics.vault_size = vault.len();
        self.statistics.vault_subsets = vault.subsets_enumerated();
        self.advance(SearchPhase::VaultBuilt);

        let complement = match goal {
            Goal::Target(target) => Complement::Target(target),
            Goal::Resonance => Complement::Resonance,
            Goal::MaxSum => {
                let right_vault = builder.build(&right)?;
                self.statistics.vault_size += right_vault.len();
                self.statistics.vault_subsets += right_vault.subsets_enumerated();
                let (_, left_mask) = vault.max_witness();
                let (_, right_mask) = right_vault.max_witness();
                let solution = Solution::combine(&left, left_mask, &right, right_mask);
                return Ok(self.finish(SearchOutcome::Found(solution)));
            }
        };

        // Size class 0: the right side contributes nothing
        let direct = match complement {
            Complement::Target(target) => vault.get(target),
            Complement::Resonance => vault.zero_witness(),
        };
        if let Some(left_mask) = direct {
            tracing::debug!("solution found in the vault without probing");
            let solution = Solution::combine(&left, left_mask, &right, 0);
            return Ok(self.finish(SearchOutcome::Found(solution)));
        }

        self.advance(SearchPhase::Dispatched);
        let right = Arc::new(right);
        let run = self.probe(&vault, Arc::clone(&right), complement);
        self.advance(SearchPhase::Running);

        self.merge_probe_statistics(&run.statistics);

        match run.hit {
            Some(Hit {
                left: left_mask,
                right: right_mask,
            }) => {
                let solution = Solution::combine(&left, left_mask, &right, right_mask);
                Ok(self.finish(SearchOutcome::Found(solution)))
            }
            None => {
                let failed = run.statistics.tasks_failed;
                if failed > 0 && failed == run.statistics.tasks_dispatched {
                    return Err(SolveError::Inconclusive {
                        failed_tasks: failed,
                    });
                }
                if failed > 0 {
                    tracing::warn!(
                        failed,
                        dispatched = run.statistics.tasks_dispatched,
                        "search exhausted with failed tasks; result covers a partial space"
                    );
                }
                Ok(self.finish(SearchOutcome::NotFound))
            }
        }
    }

    fn probe(&self, vault: &Vault, right: Arc<Tranche>, complement: Complement) -> ProbeRun {
        if self.config.uses_worker_pool() {
            run_parallel_search(
                vault,
                right,
                complement,
                Arc::clone(&self.prober),
                &self.config.parallel_config,
            )
        } else {
            run_sequential_search(vault, &right, complement, self.prober.as_ref())
        }
    }

    fn merge_probe_statistics(&mut self, probe: &SearchStatistics) {
        let s = &mut self.statistics;
        s.tasks_dispatched = probe.tasks_dispatched;
        s.tasks_completed = probe.tasks_completed;
        s.tasks_cancelled = probe.tasks_cancelled;
        s.tasks_discarded = probe.tasks_discarded;
        s.tasks_failed = probe.tasks_failed;
        s.subsets_probed = probe.subsets_probed;
        s.candidates_emitted = probe.candidates_emitted;
        s.lookups = probe.lookups;
        s.workers = probe.workers;
        s.time_sieve = probe.time_sieve;
        s.failures = probe.failures.clone();
    }
}
