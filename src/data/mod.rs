//! # Data Module
//!
//! In-memory representations of genotype data as the correlation engine sees
//! it: marker coordinates, QC/normalization of raw calls, and fixed-capacity
//! column pages.

pub mod genotype;
pub mod marker;
pub mod page;

// Re-export commonly used types
pub use genotype::{normalize_dosages, GenotypeCounts, Standardizer, MISSING};
pub use marker::{MarkerIdx, MarkerPosition};
pub use page::ColumnPage;
