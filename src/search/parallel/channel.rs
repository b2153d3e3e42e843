//! Task queue and completion channel between the coordinator and workers.

use crate::search::candidate::Candidate;
use crossbeam_channel::{Receiver, Sender, bounded, unbounded};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A unit of probe work: one subset-size class of the probed tranche.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeJob {
    pub size: usize,
}

/// Message sent from workers to the coordinator.
#[derive(Debug, Clone)]
pub enum WorkerMessage {
    /// Candidates that passed the sieve.
    Candidates {
        worker_id: usize,
        size: usize,
        batch: Vec<Candidate>,
    },
    /// Worker finished a task (fully, or cut short by the stop flag).
    Finished {
        worker_id: usize,
        size: usize,
        examined: u64,
        emitted: u64,
        cancelled: bool,
    },
    /// Task panicked; the worker moves on to the next one.
    Failed {
        worker_id: usize,
        size: usize,
        message: String,
    },
    /// Task was dequeued after the stop signal and never run.
    Discarded { worker_id: usize, size: usize },
}

/// Shared flags for cancellation and single-commit.
#[derive(Debug, Default)]
pub struct SharedState {
    /// Set once a solution is committed; workers poll it.
    pub should_stop: AtomicBool,
    /// Guards the single solution commit.
    pub committed: AtomicBool,
}

impl SharedState {
    /// Claim the right to commit a solution. Returns true exactly once.
    pub fn try_commit(&self) -> bool {
        self.committed
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    /// Check if we should stop searching.
    pub fn should_stop(&self) -> bool {
        self.should_stop.load(Ordering::SeqCst)
    }

    /// Signal all workers to stop.
    pub fn signal_stop(&self) {
        self.should_stop.store(true, Ordering::SeqCst);
    }

    /// The raw flag handed to probes for checkpoint polling.
    pub fn stop_flag(&self) -> &AtomicBool {
        &self.should_stop
    }
}

/// Channel endpoints for a worker.
pub struct WorkerChannels {
    /// Send messages to coordinator.
    pub to_coordinator: Sender<WorkerMessage>,
    /// Pull the next task; shared by every worker.
    pub tasks: Receiver<ProbeJob>,
    /// Shared state for cheap stop checks.
    pub shared: Arc<SharedState>,
}

/// Channel endpoints for the coordinator.
pub struct CoordinatorChannels {
    /// Receive messages from workers.
    pub from_workers: Receiver<WorkerMessage>,
    /// Shared state.
    pub shared: Arc<SharedState>,
}

/// Create the task queue and completion channel.
///
/// The queue is filled with `jobs` and closed before any worker starts, so a
/// worker that finds it empty knows all work has been handed out. The
/// coordinator holds no sender, so its receive loop ends once every worker
/// has exited.
pub fn create_channels(
    num_workers: usize,
    jobs: &[ProbeJob],
    capacity: usize,
) -> (CoordinatorChannels, Vec<WorkerChannels>) {
    let shared = Arc::new(SharedState::default());

    let (task_tx, task_rx) = unbounded();
    for &job in jobs {
        // Receiver is alive in this scope
        let _ = task_tx.send(job);
    }
    drop(task_tx);

    // Bounded so a slow coordinator applies backpressure to the probes
    let (worker_tx, coordinator_rx) = bounded(capacity.max(1));

    let worker_channels = (0..num_workers)
        .map(|_| WorkerChannels {
            to_coordinator: worker_tx.clone(),
            tasks: task_rx.clone(),
            shared: Arc::clone(&shared),
        })
        .collect();

    let coordinator = CoordinatorChannels {
        from_workers: coordinator_rx,
        shared,
    };

    (coordinator, worker_channels)
}
