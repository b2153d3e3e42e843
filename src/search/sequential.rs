//! In-thread probing, used when the worker pool is disabled

use crate::instance::Tranche;
use crate::search::candidate::{Complement, ProbeTask, Prober};
use crate::search::result::{ProbeRun, SearchStatistics, TaskFailure};
use crate::search::vault::Vault;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

/// Probe every size class of `tranche` in ascending size order.
///
/// Uses the same lookup and failure isolation as the parallel coordinator,
/// so found/not-found answers agree between the two modes.
pub fn run_sequential_search(
    vault: &Vault,
    tranche: &Tranche,
    complement: Complement,
    prober: &dyn Prober,
) -> ProbeRun {
    let start_time = Instant::now();
    let bounds = vault.bounds();
    let mut statistics = SearchStatistics {
        tasks_dispatched: tranche.len(),
        ..Default::default()
    };
    let mut hit = None;

    for size in 1..=tranche.len() {
        if hit.is_some() {
            statistics.tasks_discarded += 1;
            continue;
        }

        let task = ProbeTask {
            tranche,
            size,
            bounds,
            complement,
            stop: None,
        };

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let mut probe = prober.probe(task);
            let mut lookups = 0u64;
            let mut found = None;
            for candidate in probe.by_ref() {
                lookups += 1;
                if let Some(h) = vault.confirm(&candidate) {
                    found = Some(h);
                    break;
                }
            }
            (found, lookups, probe.examined(), probe.emitted())
        }));

        match outcome {
            Ok((found, lookups, examined, emitted)) => {
                statistics.lookups += lookups;
                statistics.record_task(examined, emitted, false);
                if found.is_some() {
                    tracing::debug!(size, "solution committed");
                    hit = found;
                }
            }
            Err(payload) => {
                let failure = TaskFailure::from_panic(size, payload.as_ref());
                tracing::warn!(size, message = %failure.message, "probe task failed");
                statistics.record_failure(failure);
            }
        }
    }

    statistics.time_sieve = start_time.elapsed();
    ProbeRun { hit, statistics }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::{Element, Side};
    use crate::search::candidate::{Probe, SieveProber};
    use crate::search::vault::VaultBuilder;

    fn setup(left: &[Element], right: &[Element]) -> (Tranche, Vault, Tranche) {
        let left = Tranche::new(Side::Left, 0, left.to_vec());
        let right = Tranche::new(Side::Right, left.len(), right.to_vec());
        let vault = VaultBuilder::default().build(&left).unwrap();
        (left, vault, right)
    }

    struct PanicsOnSize(usize);

    impl Prober for PanicsOnSize {
        fn probe<'a>(&self, task: ProbeTask<'a>) -> Probe<'a> {
            assert_ne!(task.size, self.0, "size class is poisoned");
            Probe::new(task)
        }

        fn name(&self) -> &str {
            "panics-on-size"
        }
    }

    #[test]
    fn test_sequential_finds_hit_and_discards_rest() {
        let (left, vault, right) = setup(&[1, 2, 3], &[10, 20, 30]);
        let run = run_sequential_search(&vault, &right, Complement::Target(13), &SieveProber);

        let hit = run.hit.expect("3 + 10 = 13");
        assert_eq!(left.mask_sum(hit.left) + right.mask_sum(hit.right), 13);
        assert_eq!(run.statistics.tasks_completed, 1);
        assert_eq!(run.statistics.tasks_discarded, 2);
        assert_eq!(run.statistics.workers, 0);
    }

    #[test]
    fn test_sequential_exhausts() {
        let (_, vault, right) = setup(&[1, 2], &[4, 8]);
        let run = run_sequential_search(&vault, &right, Complement::Target(100), &SieveProber);

        assert!(run.hit.is_none());
        assert_eq!(run.statistics.tasks_completed, 2);
        // Vault bounds are [0, 3]; every right subset needs far more
        assert_eq!(run.statistics.candidates_emitted, 0);
        assert_eq!(run.statistics.candidates_pruned(), 3);
        assert_eq!(run.statistics.lookups, 0);
    }

    #[test]
    fn test_sequential_isolates_failure() {
        let (_, vault, right) = setup(&[1, 2], &[5, 6, 7]);
        // 1 + 5 + 6 needs size 2; size 1 is poisoned
        let run = run_sequential_search(&vault, &right, Complement::Target(12), &PanicsOnSize(1));

        assert!(run.hit.is_some());
        assert_eq!(run.statistics.tasks_failed, 1);
        assert_eq!(run.statistics.failures[0].size, 1);
    }
}
