//! # Pipeline Module
//!
//! High-level orchestration of the LD-block workflow.
//! Coordinates I/O, correlation, splitting and refinement.

pub mod blocks;

pub use blocks::{BlockPipeline, RunSummary};
