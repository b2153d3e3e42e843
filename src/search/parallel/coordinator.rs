//! Parallel probe coordinator (the hydra).
//!
//! One task per subset-size class of the probed tranche is queued before any
//! worker starts. Workers pull tasks, stream sieve survivors back in batches,
//! and the coordinator confirms each candidate against the vault in arrival
//! order. The first confirmed hit is committed, the stop flag is raised, and
//! the coordinator keeps draining until every worker has exited so the task
//! counters are complete.

use crate::instance::Tranche;
use crate::search::candidate::{Complement, ProbeTask, Prober};
use crate::search::parallel::channel::{
    CoordinatorChannels, ProbeJob, WorkerChannels, WorkerMessage, create_channels,
};
use crate::search::parallel::config::ParallelConfig;
use crate::search::result::{ProbeRun, SearchStatistics, TaskFailure};
use crate::search::vault::{Bounds, Vault};
use crossbeam_channel::{SendError, Sender};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

/// Probe every size class of `tranche` on a worker pool.
pub fn run_parallel_search(
    vault: &Vault,
    tranche: Arc<Tranche>,
    complement: Complement,
    prober: Arc<dyn Prober>,
    config: &ParallelConfig,
) -> ProbeRun {
    let start_time = Instant::now();
    let jobs: Vec<ProbeJob> = (1..=tranche.len()).map(|size| ProbeJob { size }).collect();
    let num_workers = config.effective_workers(jobs.len());
    let bounds = vault.bounds();

    let (coordinator_channels, worker_channels) =
        create_channels(num_workers, &jobs, config.channel_capacity());

    tracing::debug!(
        tasks = jobs.len(),
        workers = num_workers,
        prober = prober.name(),
        "probe tasks dispatched"
    );

    let worker_handles: Vec<_> = worker_channels
        .into_iter()
        .enumerate()
        .map(|(worker_id, channels)| {
            let tranche = Arc::clone(&tranche);
            let prober = Arc::clone(&prober);
            let batch_size = config.batch_size;

            std::thread::spawn(move || {
                run_worker(
                    worker_id,
                    &tranche,
                    bounds,
                    complement,
                    prober.as_ref(),
                    batch_size,
                    channels,
                )
            })
        })
        .collect();

    let mut run = run_coordinator(vault, coordinator_channels, jobs.len());

    for handle in worker_handles {
        if handle.join().is_err() {
            tracing::warn!("worker thread panicked outside a probe task");
        }
    }

    run.statistics.workers = num_workers;
    run.statistics.time_sieve = start_time.elapsed();
    run
}

/// Coordinator loop: confirm candidates, commit the first hit, count tasks.
fn run_coordinator(vault: &Vault, channels: CoordinatorChannels, dispatched: usize) -> ProbeRun {
    let mut statistics = SearchStatistics {
        tasks_dispatched: dispatched,
        ..Default::default()
    };
    let mut hit = None;
    let mut running = false;

    // Blocks until the next message; ends once every worker dropped its sender
    for message in channels.from_workers.iter() {
        if !running {
            running = true;
            tracing::debug!("probe tasks running");
        }

        match message {
            WorkerMessage::Candidates {
                worker_id,
                size,
                batch,
            } => {
                if hit.is_some() {
                    continue;
                }
                tracing::trace!(worker_id, size, candidates = batch.len(), "batch received");

                for candidate in &batch {
                    statistics.lookups += 1;
                    if let Some(found) = vault.confirm(candidate) {
                        if channels.shared.try_commit() {
                            channels.shared.signal_stop();
                            tracing::debug!(
                                worker_id,
                                size,
                                needed = candidate.target,
                                "solution committed, cancelling remaining tasks"
                            );
                            hit = Some(found);
                        }
                        break;
                    }
                }
            }
            WorkerMessage::Finished {
                worker_id,
                size,
                examined,
                emitted,
                cancelled,
            } => {
                tracing::trace!(worker_id, size, examined, emitted, cancelled, "task finished");
                statistics.record_task(examined, emitted, cancelled);
            }
            WorkerMessage::Failed {
                worker_id,
                size,
                message,
            } => {
                tracing::warn!(worker_id, size, %message, "probe task failed");
                statistics.record_failure(TaskFailure { size, message });
            }
            WorkerMessage::Discarded { worker_id, size } => {
                tracing::trace!(worker_id, size, "task discarded");
                statistics.tasks_discarded += 1;
            }
        }
    }

    ProbeRun { hit, statistics }
}

/// Counters from one probe task.
struct TaskTally {
    examined: u64,
    emitted: u64,
    cancelled: bool,
}

/// Worker loop: pull tasks until the queue is empty.
fn run_worker(
    worker_id: usize,
    tranche: &Tranche,
    bounds: Bounds,
    complement: Complement,
    prober: &dyn Prober,
    batch_size: usize,
    channels: WorkerChannels,
) {
    while let Ok(job) = channels.tasks.try_recv() {
        // Not-yet-started tasks are dropped once a solution is committed
        if channels.shared.should_stop() {
            let discarded = WorkerMessage::Discarded {
                worker_id,
                size: job.size,
            };
            if channels.to_coordinator.send(discarded).is_err() {
                return;
            }
            continue;
        }

        let task = ProbeTask {
            tranche,
            size: job.size,
            bounds,
            complement,
            stop: Some(channels.shared.stop_flag()),
        };

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            stream_candidates(worker_id, prober, task, batch_size, &channels.to_coordinator)
        }));

        let message = match outcome {
            Ok(Ok(tally)) => WorkerMessage::Finished {
                worker_id,
                size: job.size,
                examined: tally.examined,
                emitted: tally.emitted,
                cancelled: tally.cancelled,
            },
            // Coordinator is gone; nobody is listening
            Ok(Err(_)) => return,
            Err(payload) => {
                let failure = TaskFailure::from_panic(job.size, payload.as_ref());
                WorkerMessage::Failed {
                    worker_id,
                    size: failure.size,
                    message: failure.message,
                }
            }
        };

        if channels.to_coordinator.send(message).is_err() {
            return;
        }
    }
}

/// Run one probe, sending survivors in batches of `batch_size`.
fn stream_candidates(
    worker_id: usize,
    prober: &dyn Prober,
    task: ProbeTask<'_>,
    batch_size: usize,
    to_coordinator: &Sender<WorkerMessage>,
) -> Result<TaskTally, SendError<WorkerMessage>> {
    let size = task.size;
    let mut probe = prober.probe(task);
    let mut batch = Vec::with_capacity(batch_size);

    for candidate in probe.by_ref() {
        batch.push(candidate);
        if batch.len() == batch_size {
            let full = std::mem::replace(&mut batch, Vec::with_capacity(batch_size));
            to_coordinator.send(WorkerMessage::Candidates {
                worker_id,
                size,
                batch: full,
            })?;
        }
    }

    if !batch.is_empty() && !probe.was_cancelled() {
        to_coordinator.send(WorkerMessage::Candidates {
            worker_id,
            size,
            batch,
        })?;
    }

    Ok(TaskTally {
        examined: probe.examined(),
        emitted: probe.emitted(),
        cancelled: probe.was_cancelled(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::{Element, Side};
    use crate::search::candidate::{Probe, SieveProber};
    use crate::search::vault::VaultBuilder;

    fn setup(left: &[Element], right: &[Element]) -> (Vault, Arc<Tranche>) {
        let left = Tranche::new(Side::Left, 0, left.to_vec());
        let right = Tranche::new(Side::Right, left.len(), right.to_vec());
        (VaultBuilder::default().build(&left).unwrap(), Arc::new(right))
    }

    /// Panics for the listed size classes, probes normally otherwise.
    struct FaultyProber {
        failing_sizes: Vec<usize>,
    }

    impl Prober for FaultyProber {
        fn probe<'a>(&self, task: ProbeTask<'a>) -> Probe<'a> {
            if self.failing_sizes.contains(&task.size) {
                panic!("injected fault for size {}", task.size);
            }
            Probe::new(task)
        }

        fn name(&self) -> &str {
            "faulty"
        }
    }

    #[test]
    fn test_parallel_search_finds_hit() {
        let (vault, right) = setup(&[3, 5, 7, 11, 13], &[17, 19, 23, 29, 31]);
        let config = ParallelConfig::default().with_workers(4).with_batch_size(2);

        let run = run_parallel_search(
            &vault,
            Arc::clone(&right),
            Complement::Target(50),
            Arc::new(SieveProber),
            &config,
        );

        let hit = run.hit.expect("50 is reachable");
        let left = Tranche::new(Side::Left, 0, vec![3, 5, 7, 11, 13]);
        assert_eq!(left.mask_sum(hit.left) + right.mask_sum(hit.right), 50);
        assert_ne!(hit.right, 0);
        assert_eq!(run.statistics.tasks_dispatched, 5);
        assert_eq!(
            run.statistics.tasks_completed + run.statistics.tasks_discarded,
            5
        );
    }

    #[test]
    fn test_parallel_search_exhausts() {
        // Only even sums are reachable
        let (vault, right) = setup(&[2, 4, 6], &[8, 10, 12, 14]);
        let config = ParallelConfig::default().with_workers(3);

        let run = run_parallel_search(
            &vault,
            right,
            Complement::Target(31),
            Arc::new(SieveProber),
            &config,
        );

        assert!(run.hit.is_none());
        assert_eq!(run.statistics.tasks_dispatched, 4);
        assert_eq!(run.statistics.tasks_completed, 4);
        assert_eq!(run.statistics.tasks_failed, 0);
        assert_eq!(run.statistics.tasks_discarded, 0);
        assert_eq!(run.statistics.subsets_probed, 15);
        assert_eq!(run.statistics.workers, 3);
    }

    #[test]
    fn test_failed_task_is_isolated() {
        let (vault, right) = setup(&[1, 2, 3], &[10, 20, 30]);
        let prober = Arc::new(FaultyProber {
            failing_sizes: vec![1],
        });
        // One worker takes the queue in size order, so size 1 always runs first
        let config = ParallelConfig::default().with_workers(1);

        // 1 + 20 + 30 needs a size-2 right subset, which still runs
        let run = run_parallel_search(&vault, right, Complement::Target(51), prober, &config);

        assert!(run.hit.is_some());
        let stats = &run.statistics;
        assert_eq!(stats.tasks_failed, 1);
        assert_eq!(stats.failures[0].size, 1);
        assert!(stats.failures[0].message.contains("size 1"));
        assert_eq!(
            stats.tasks_completed + stats.tasks_failed + stats.tasks_discarded,
            3
        );
    }

    #[test]
    fn test_every_task_failing_is_counted() {
        let (vault, right) = setup(&[1, 2], &[5, 6, 7]);
        let prober = Arc::new(FaultyProber {
            failing_sizes: vec![1, 2, 3],
        });
        let config = ParallelConfig::default().with_workers(2);

        let run = run_parallel_search(&vault, right, Complement::Target(8), prober, &config);

        assert!(run.hit.is_none());
        assert_eq!(run.statistics.tasks_failed, 3);
        assert_eq!(run.statistics.failures.len(), 3);
        assert!(
            run.statistics
                .failures
                .iter()
                .all(|f| f.message.starts_with("injected fault"))
        );
    }

    #[test]
    fn test_queued_tasks_are_discarded_after_hit() {
        // Wide vault bounds: every right subset survives the sieve
        let (vault, right) = setup(&[-1000, 1000, 1], &(1..=14).collect::<Vec<_>>());
        // Batches of one keep the lone worker blocked on the completion
        // channel until the coordinator has seen the size-1 hit
        let config = ParallelConfig::default()
            .with_workers(1)
            .with_batch_size(1)
            .with_channel_depth(1);

        // {1000} + {1}
        let run = run_parallel_search(
            &vault,
            right,
            Complement::Target(1001),
            Arc::new(SieveProber),
            &config,
        );

        let hit = run.hit.expect("1001 is reachable with one right element");
        assert_eq!(hit.right, 0b1);
        let stats = &run.statistics;
        assert_eq!(stats.tasks_dispatched, 14);
        assert!(stats.tasks_discarded > 0, "queued tasks must not run after a hit");
        assert_eq!(stats.tasks_failed, 0);
        assert_eq!(stats.tasks_completed + stats.tasks_discarded, 14);
    }

    #[test]
    fn test_in_flight_tasks_are_cancelled_after_hit() {
        // Only {10} can pair with the vault; every other subset is pruned
        let mut elements: Vec<Element> = vec![10];
        elements.extend(100..127);
        let (vault, right) = setup(&[1, 2, 3], &elements);
        let config = ParallelConfig::default().with_workers(4);

        let run = run_parallel_search(
            &vault,
            right,
            Complement::Target(11),
            Arc::new(SieveProber),
            &config,
        );

        assert_eq!(run.hit.map(|h| h.right), Some(0b1));
        let stats = &run.statistics;
        assert_eq!(stats.tasks_dispatched, 28);
        assert!(stats.tasks_cancelled >= 1, "large size classes must stop early");
        assert!(stats.tasks_discarded > 0);
        assert_eq!(
            stats.tasks_completed + stats.tasks_discarded + stats.tasks_failed,
            28
        );
        // A full sweep would walk 2^28 - 1 subsets
        assert!(stats.subsets_probed < 1 << 24, "walked {} subsets", stats.subsets_probed);
    }

    #[test]
    fn test_empty_tranche_dispatches_nothing() {
        let (vault, right) = setup(&[4], &[]);
        let run = run_parallel_search(
            &vault,
            right,
            Complement::Resonance,
            Arc::new(SieveProber),
            &ParallelConfig::default(),
        );
        assert!(run.hit.is_none());
        assert_eq!(run.statistics.tasks_dispatched, 0);
        assert_eq!(run.statistics.tasks_completed, 0);
    }
}
