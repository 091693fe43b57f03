//! # Configuration Logic
//!
//! ## Role
//! CLI argument parsing and validation.
//!
//! ## Validation
//! - `--frq` and `--min-prop` between 0 and 0.4, `--margin` between 0 and 0.1
//! - `--win` at least 1, `--min-size` at least 50, `--max` greater than 0
//! - the input prefix is not a directory and `<input>.bed/.bim/.fam` exist
//!
//! ## Example CLI
//! ```bash
//! ldblock data/chr22 --win 200 --min-size 1000 --out chr22_blocks
//! ```

use std::path::PathBuf;

use clap::Parser;

use crate::error::{LdBlockError, Result};
use crate::io::plink::fileset_paths;
use crate::model::parameters::{SmallBlockPolicy, SplitParams};

/// Split PLINK genotype data into LD blocks
#[derive(Parser, Debug, Clone)]
#[command(name = "ldblock", version, about)]
pub struct Config {
    /// PLINK binary fileset prefix (<input>.bed/.bim/.fam)
    pub input: PathBuf,

    /// Minor allele frequency threshold for retaining SNPs
    #[arg(long, default_value_t = 0.01)]
    pub frq: f64,

    /// Correlation window, in retained SNPs
    #[arg(long, default_value_t = 200)]
    pub win: usize,

    /// Minimum number of SNPs on each side of a break
    #[arg(long = "min-size", default_value_t = 1000)]
    pub min_size: usize,

    /// Minimum proportion of a block on each side of a break
    #[arg(long = "min-prop", visible_alias = "split-prop", default_value_t = 0.1)]
    pub min_prop: f64,

    /// Tolerance for moving a break towards the center of its block
    #[arg(long, default_value_t = 0.01)]
    pub margin: f64,

    /// Maximum crossing metric for a break to be accepted
    #[arg(long, default_value_t = 0.25)]
    pub max: f64,

    /// Output file prefix
    #[arg(long, default_value = "ldblock")]
    pub out: PathBuf,

    /// Also write the crossing metric of every cut point to <out>.metric
    #[arg(long = "print-metric")]
    pub print_metric: bool,

    /// Refine break positions on unfiltered data (0 or 1)
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(0..=1))]
    pub refine: u8,

    /// Skip blocks too small to split instead of stopping the search
    #[arg(long = "skip-small-blocks")]
    pub skip_small_blocks: bool,

    /// Report span timings on stderr
    #[arg(long)]
    pub profile: bool,
}

impl Config {
    /// Parse command line arguments and validate
    pub fn parse_and_validate() -> Result<Self> {
        let config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges and input files
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=0.4).contains(&self.frq) {
            return Err(LdBlockError::config("value for argument '--frq' should be between 0 and 0.4"));
        }
        if self.win < 1 {
            return Err(LdBlockError::config("value for argument '--win' should be at least 1"));
        }
        if self.min_size < 50 {
            return Err(LdBlockError::config("value for argument '--min-size' should be at least 50"));
        }
        if !(0.0..=0.4).contains(&self.min_prop) {
            return Err(LdBlockError::config(
                "value for argument '--min-prop' should be between 0 and 0.4",
            ));
        }
        if !(0.0..=0.1).contains(&self.margin) {
            return Err(LdBlockError::config("value for argument '--margin' should be between 0 and 0.1"));
        }
        if self.max.is_nan() || self.max <= 0.0 {
            return Err(LdBlockError::config("value for argument '--max' should be greater than 0"));
        }

        if self.input.is_dir() {
            return Err(LdBlockError::config(format!(
                "file prefix '{}' is a directory",
                self.input.display()
            )));
        }
        for path in fileset_paths(&self.input) {
            if !path.is_file() {
                return Err(LdBlockError::config(format!("file '{}' not found", path.display())));
            }
        }
        Ok(())
    }

    /// Refinement runs only with an active MAF filter
    pub fn refine_enabled(&self) -> bool {
        self.refine == 1 && self.frq > 0.0
    }

    pub fn small_block_policy(&self) -> SmallBlockPolicy {
        if self.skip_small_blocks {
            SmallBlockPolicy::Skip
        } else {
            SmallBlockPolicy::Halt
        }
    }

    pub fn split_params(&self) -> SplitParams {
        SplitParams {
            min_size: self.min_size,
            min_prop: self.min_prop,
            metric_margin: self.margin,
            metric_max: self.max,
            small_blocks: self.small_block_policy(),
        }
    }
}
