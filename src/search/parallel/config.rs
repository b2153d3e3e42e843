//! Configuration for the parallel probe pool.

/// Configuration for parallel probe execution.
#[derive(Debug, Clone)]
pub struct ParallelConfig {
    /// Number of worker threads to spawn.
    pub num_workers: usize,
    /// Candidates buffered per message from a worker to the coordinator.
    pub batch_size: usize,
    /// Messages the completion channel holds per worker before senders block.
    pub channel_depth: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            num_workers: num_cpus::get(),
            batch_size: 1024,
            channel_depth: 4,
        }
    }
}

impl ParallelConfig {
    /// Create a new parallel config with the specified number of workers.
    pub fn with_workers(mut self, num_workers: usize) -> Self {
        self.num_workers = num_workers.max(1);
        self
    }

    /// Set the number of candidates sent per message.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Set the per-worker depth of the completion channel.
    pub fn with_channel_depth(mut self, depth: usize) -> Self {
        self.channel_depth = depth.max(1);
        self
    }

    /// Capacity of the completion channel shared by all workers.
    pub fn channel_capacity(&self) -> usize {
        self.num_workers * self.channel_depth
    }

    /// Workers actually worth spawning for `tasks` probe tasks.
    pub fn effective_workers(&self, tasks: usize) -> usize {
        self.num_workers.min(tasks).max(1)
    }
}
