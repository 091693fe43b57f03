//! # Model Module
//!
//! The LD-block algorithms, leaf-first:
//! - `correlation`: windowed r² computation over a genotype source
//! - `matrix`: banded r² matrix with crossing metrics and in-place splitting
//! - `parameters`: splitter hyperparameters
//! - `splitter`: greedy, largest-block-first search for break points
//! - `refine`: break positions recomputed on unfiltered data

pub mod correlation;
pub mod matrix;
pub mod parameters;
pub mod refine;
pub mod splitter;

pub use correlation::CorrelationEngine;
pub use matrix::BandedCorrelationMatrix;
pub use parameters::{SmallBlockPolicy, SplitParams};
pub use refine::Refiner;
pub use splitter::{Split, Splitter};
