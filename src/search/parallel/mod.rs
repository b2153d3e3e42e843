//! Parallel probing for running size-class tasks concurrently.
//!
//! # Architecture
//!
//! - A **coordinator** owns the vault, confirms candidates and commits the
//!   first hit
//! - **Workers** pull size-class tasks from a shared queue and run probes
//! - A **channel system** carries candidate batches and task completions
//! - **Shared state** holds the stop flag and the single-commit guard
//!
//! # Example
//!
//! ```ignore
//! use titan::search::parallel::{ParallelConfig, run_parallel_search};
//!
//! let config = ParallelConfig::default().with_workers(4);
//! let run = run_parallel_search(&vault, right, complement, Arc::new(SieveProber), &config);
//! ```

pub mod channel;
pub mod config;
pub mod coordinator;

pub use config::ParallelConfig;
pub use coordinator::run_parallel_search;
