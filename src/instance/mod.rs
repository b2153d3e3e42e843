//! Subset-sum instances: elements, tranches, and fixture generation

pub mod generator;
pub mod types;

pub use generator::{GeneratorConfig, generate_positive_instance, generate_resonance_instance};
pub use types::{Element, MAX_TRANCHE_BITS, MaskBits, Side, SubsetMask, Tranche, reachable_range};
