//! Titan: an exact meet-in-the-middle subset-sum engine.
//!
//! ```
//! use titan::{Goal, SearchConfig, solve};
//!
//! let report = solve(&[3, 5, 7, 11, 13], Goal::Target(20), &SearchConfig::default()).unwrap();
//! assert_eq!(report.solution().unwrap().sum(), 20);
//! ```

pub mod error;
pub mod instance;
pub mod search;

pub use error::SolveError;
pub use instance::{Element, GeneratorConfig, generate_positive_instance, generate_resonance_instance};
pub use search::{Goal, SearchConfig, SearchOutcome, SearchReport, Solution, solve};
