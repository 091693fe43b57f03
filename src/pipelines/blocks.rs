//! # LD Block Pipeline
//!
//! Orchestrates one run:
//! 1. Open the PLINK fileset
//! 2. Compute windowed r² over the retained SNPs
//! 3. Optionally dump the crossing metric
//! 4. Split into blocks (fails if no break point is found)
//! 5. Optionally refine break positions on unfiltered data
//! 6. Write the break point report

use std::path::PathBuf;

use tracing::{info, instrument};

use crate::config::Config;
use crate::error::{LdBlockError, Result};
use crate::io::plink::PlinkSource;
use crate::io::report::BreakReport;
use crate::io::source::GenotypeSource;
use crate::model::correlation::CorrelationEngine;
use crate::model::refine::Refiner;
use crate::model::splitter::Splitter;

/// Outcome of a completed run
#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    /// SNPs retained by the MAF filter
    pub retained: usize,
    /// Break points found
    pub breaks: usize,
    /// Path of the `.breaks` report
    pub report: PathBuf,
    /// Path of the `.metric` dump, if written
    pub metric: Option<PathBuf>,
}

/// LD block pipeline
pub struct BlockPipeline {
    config: Config,
}

impl BlockPipeline {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run on the PLINK fileset named by the configuration
    pub fn run(&mut self) -> Result<RunSummary> {
        let mut source = PlinkSource::open(&self.config.input, self.config.frq)?;
        self.run_with_source(&mut source)
    }

    /// Run on an already opened genotype source
    #[instrument(name = "ldblock", skip_all, fields(n_markers = source.n_markers()))]
    pub fn run_with_source<S: GenotypeSource + ?Sized>(&mut self, source: &mut S) -> Result<RunSummary> {
        let config = &self.config;
        let report = BreakReport::new(&config.out);

        info!(
            "computing correlations (window = {}, MAF threshold = {})",
            config.win, config.frq
        );
        let mut engine = CorrelationEngine::new(config.win);
        let retained = engine.compute(source)?;
        info!("retained {} SNPs after filtering", retained);
        if retained == 0 {
            return Err(LdBlockError::NoMarkers);
        }
        let matrix = engine.take_matrix();
        let positions = engine.positions().to_vec();

        let metric = if config.print_metric {
            Some(report.write_metrics(matrix.get_metric())?)
        } else {
            None
        };

        let params = config.split_params();
        info!(
            "computing break points (minimum size = {}, minimum proportion = {}, metric margin = {}, metric maximum = {})",
            params.min_size,
            params.min_prop,
            params.metric_margin,
            params.metric_max.min(1.0)
        );
        let mut splitter = Splitter::new(params);
        if splitter.run(matrix)? == 0 {
            return Err(LdBlockError::NoBreakPoints);
        }
        let mut breaks = splitter.into_breaks();

        if config.refine_enabled() {
            info!("refining break points for unfiltered data");
            Refiner::new(&mut *source, config.win).refine(&mut breaks, &positions)?;
        }

        let path = report.write_breaks(&breaks, &positions, source.position_bounds(), source.n_markers())?;
        Ok(RunSummary {
            retained,
            breaks: breaks.len(),
            report: path,
            metric,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::source::MemorySource;
    use clap::Parser;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn config(out: &std::path::Path, extra: &[&str]) -> Config {
        let mut args = vec!["ldblock", "unused", "--out", out.to_str().unwrap()];
        args.extend_from_slice(extra);
        Config::try_parse_from(args).unwrap()
    }

    /// Each block copies one random founder, with one call changed per marker
    fn two_block_source(block_len: usize, n: usize) -> MemorySource {
        let mut rng = StdRng::seed_from_u64(21);
        let mut src = MemorySource::new(n, 0.01);
        let mut pos = 1000;
        for _ in 0..2 {
            let founder: Vec<u8> = (0..n).map(|_| rng.gen_range(0..3)).collect();
            for _ in 0..block_len {
                let mut d = founder.clone();
                let flip = rng.gen_range(0..n);
                d[flip] = (d[flip] + 1) % 3;
                src.push_marker(pos, d).unwrap();
                pos += 100;
            }
        }
        src
    }

    #[test]
    fn test_finds_block_boundary() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("run");
        let config = config(&out, &["--win", "10", "--min-size", "50", "--min-prop", "0", "--margin", "0"]);

        let mut src = two_block_source(60, 40);
        let summary = BlockPipeline::new(config).run_with_source(&mut src).unwrap();
        assert_eq!(summary.retained, 120);
        assert_eq!(summary.breaks, 1);
        assert_eq!(summary.metric, None);

        let text = std::fs::read_to_string(&summary.report).unwrap();
        let row: Vec<&str> = text.lines().nth(2).unwrap().split('\t').collect();
        assert_eq!(row[0], "1");
        assert_eq!(row[3], "59");
        assert_eq!(row[6], "6900");
        assert_eq!(row[7], "7000");
    }

    #[test]
    fn test_no_break_points_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(&dir.path().join("none"), &["--min-size", "1000"]);
        let mut src = two_block_source(60, 40);
        let err = BlockPipeline::new(config).run_with_source(&mut src).unwrap_err();
        assert!(matches!(err, LdBlockError::NoBreakPoints));
    }

    #[test]
    fn test_no_markers_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(&dir.path().join("empty"), &["--print-metric"]);
        let mut src = MemorySource::new(10, 0.01);
        src.push_marker(100, vec![1; 10]).unwrap();
        let err = BlockPipeline::new(config).run_with_source(&mut src).unwrap_err();
        assert!(matches!(err, LdBlockError::NoMarkers));
    }
}
