//! # ldblock Library
//!
//! Partitions chromosome-ordered SNPs into blocks of linkage disequilibrium,
//! cutting where short-range correlation is weakest.
//!
//! ## Modules
//! - `config`: CLI argument parsing and validation
//! - `data`: Marker coordinates, genotype normalization, column pages
//! - `error`: Error types and result aliases
//! - `io`: Genotype sources (PLINK, in-memory), sliding window, report output
//! - `model`: Correlation engine, banded matrix, splitter, refiner
//! - `pipelines`: High-level workflow orchestration

pub mod config;
pub mod data;
pub mod error;
pub mod io;
pub mod model;
pub mod pipelines;

// Re-export commonly used types
pub use config::Config;
pub use data::{ColumnPage, MarkerIdx, MarkerPosition};
pub use error::{LdBlockError, Result};
pub use io::{BreakReport, GenotypeSource, MemorySource, PlinkSource, SlidingWindowIterator};
pub use model::{
    BandedCorrelationMatrix, CorrelationEngine, Refiner, SmallBlockPolicy, Split, SplitParams,
    Splitter,
};

pub use pipelines::{BlockPipeline, RunSummary};
