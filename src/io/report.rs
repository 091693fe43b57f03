//! # Break Point Report
//!
//! Writes `<prefix>.breaks`, a tab-delimited table with one row per break
//! point framed by two boundary rows, and optionally `<prefix>.metric`, the
//! crossing metric of every cut point of the full matrix.
//!
//! ```text
//! RANK  METRIC  METRIC_MIN  INDEX_FILT  INDEX_ALL  POSITION  POS_LOWER  POS_UPPER
//! 0     0       0           0           0          <first>   NA         NA
//! ...   one row per break, ascending by INDEX_FILT
//! 0     0       0           <retained>  <total>    <last>    NA         NA
//! ```
//!
//! RANK is the order in which the splitter found the break (1-based).

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::data::marker::midpoint_rounded;
use crate::data::MarkerPosition;
use crate::error::{LdBlockError, Result};
use crate::model::splitter::Split;

const HEADER: &str = "RANK\tMETRIC\tMETRIC_MIN\tINDEX_FILT\tINDEX_ALL\tPOSITION\tPOS_LOWER\tPOS_UPPER";

/// Writer for the output files sharing one prefix
#[derive(Clone, Debug)]
pub struct BreakReport {
    prefix: PathBuf,
}

impl BreakReport {
    pub fn new(prefix: impl AsRef<Path>) -> Self {
        Self {
            prefix: prefix.as_ref().to_path_buf(),
        }
    }

    fn path_with(&self, suffix: &str) -> PathBuf {
        let mut name = self.prefix.as_os_str().to_owned();
        name.push(suffix);
        PathBuf::from(name)
    }

    pub fn breaks_path(&self) -> PathBuf {
        self.path_with(".breaks")
    }

    pub fn metric_path(&self) -> PathBuf {
        self.path_with(".metric")
    }

    /// Write the break table; returns the path written.
    ///
    /// `positions` are the retained markers the break offsets refer to,
    /// `bounds` the first and last valid positions of the full data and
    /// `n_markers` the full marker count.
    pub fn write_breaks(
        &self,
        breaks: &[Split],
        positions: &[MarkerPosition],
        bounds: (u32, u32),
        n_markers: usize,
    ) -> Result<PathBuf> {
        let path = self.breaks_path();
        info!("writing break point output to file '{}'", path.display());

        let mut order: Vec<usize> = (0..breaks.len()).collect();
        order.sort_by_key(|&i| breaks[i].offset);

        let mut out = BufWriter::new(File::create(&path)?);
        writeln!(out, "{}", HEADER)?;
        writeln!(out, "0\t0\t0\t0\t0\t{}\tNA\tNA", bounds.0)?;
        for rank in order {
            let split = &breaks[rank];
            let (lower, upper) = match (positions.get(split.offset), positions.get(split.offset + 1)) {
                (Some(l), Some(u)) => (l, u),
                _ => {
                    return Err(LdBlockError::invalid_data(format!(
                        "break offset {} outside {} retained SNPs",
                        split.offset,
                        positions.len()
                    )))
                }
            };
            let position = split
                .position
                .unwrap_or_else(|| midpoint_rounded(lower.pos, upper.pos));
            writeln!(
                out,
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                rank + 1,
                format_metric(split.metric),
                format_metric(split.metric_min),
                split.offset,
                lower.index.0,
                position,
                lower.pos,
                upper.pos
            )?;
        }
        writeln!(
            out,
            "0\t0\t0\t{}\t{}\t{}\tNA\tNA",
            positions.len(),
            n_markers,
            bounds.1
        )?;
        out.flush()?;
        Ok(path)
    }

    /// Write one metric value per line; returns the path written
    pub fn write_metrics(&self, metric: &[f64]) -> Result<PathBuf> {
        let path = self.metric_path();
        info!("writing base metric values to file '{}'", path.display());

        let mut out = BufWriter::new(File::create(&path)?);
        for &m in metric {
            writeln!(out, "{}", format_metric(m))?;
        }
        out.flush()?;
        Ok(path)
    }
}

/// Six decimals; undefined metrics are written as NA
fn format_metric(value: f64) -> String {
    if value.is_nan() {
        "NA".to_string()
    } else {
        format!("{:.6}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positions() -> Vec<MarkerPosition> {
        vec![
            MarkerPosition::new(100, 0),
            MarkerPosition::new(200, 1),
            MarkerPosition::new(301, 3),
            MarkerPosition::new(400, 4),
            MarkerPosition::new(500, 6),
        ]
    }

    #[test]
    fn test_breaks_file() {
        let dir = tempfile::tempdir().unwrap();
        let report = BreakReport::new(dir.path().join("out"));

        let mut refined = Split::new(3, 0.05);
        refined.position = Some(450);
        let mut second = Split::new(1, 0.125);
        second.metric_min = 0.1;
        let breaks = vec![refined, second];

        let path = report.write_breaks(&breaks, &positions(), (100, 550), 7).unwrap();
        assert_eq!(path, dir.path().join("out.breaks"));

        let text = std::fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                HEADER,
                "0\t0\t0\t0\t0\t100\tNA\tNA",
                "2\t0.125000\t0.100000\t1\t1\t251\t200\t301",
                "1\t0.050000\t0.050000\t3\t4\t450\t400\t500",
                "0\t0\t0\t5\t7\t550\tNA\tNA",
            ]
        );
    }

    #[test]
    fn test_break_past_last_marker() {
        let dir = tempfile::tempdir().unwrap();
        let report = BreakReport::new(dir.path().join("bad"));
        let err = report
            .write_breaks(&[Split::new(4, 0.1)], &positions(), (100, 500), 7)
            .unwrap_err();
        assert!(matches!(err, LdBlockError::InvalidData { .. }));
    }

    #[test]
    fn test_metric_file() {
        let dir = tempfile::tempdir().unwrap();
        let report = BreakReport::new(dir.path().join("m"));
        let path = report.write_metrics(&[0.5, 0.25, f64::NAN]).unwrap();
        assert_eq!(path, dir.path().join("m.metric"));
        assert_eq!(
            std::fs::read_to_string(path).unwrap(),
            "0.500000\n0.250000\nNA\n"
        );
    }
}
