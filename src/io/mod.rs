//! # I/O Module
//!
//! File reading/writing boundaries. Genotype sources page normalized columns
//! into memory; the report writer turns break points into output files.

pub mod plink;
pub mod report;
pub mod source;
pub mod window;

pub use plink::PlinkSource;
pub use report::BreakReport;
pub use source::{GenotypeSource, MemorySource, PageLoad};
pub use window::SlidingWindowIterator;
