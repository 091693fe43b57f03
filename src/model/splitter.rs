//! # Greedy Block Splitter
//!
//! ## Role
//! Divides a `BandedCorrelationMatrix` into LD blocks, largest block first.
//!
//! ## Algorithm
//! Pending blocks are kept ordered by size. Each iteration takes the largest
//! block and looks for the cut with the lowest crossing metric that leaves at
//! least `margin` markers on either side. A cut is accepted only below
//! `metric_max`; when `metric_margin > 0` a near-optimal cut closer to the
//! middle of the block may replace it. Accepted cuts split the matrix and
//! both halves go back into the queue.

use tracing::{debug, info, instrument};

use crate::error::{LdBlockError, Result};
use crate::model::matrix::BandedCorrelationMatrix;
use crate::model::parameters::{SmallBlockPolicy, SplitParams};

/// One accepted cut
#[derive(Clone, Debug, PartialEq)]
pub struct Split {
    /// Retained-marker index the cut follows
    pub offset: usize,
    /// Crossing metric of the chosen cut
    pub metric: f64,
    /// Lowest crossing metric seen while choosing the cut
    pub metric_min: f64,
    /// Refined base-pair position of the break, if computed
    pub position: Option<u32>,
}

impl Split {
    pub fn new(offset: usize, metric: f64) -> Self {
        Self {
            offset,
            metric,
            metric_min: metric,
            position: None,
        }
    }

    fn set(&mut self, offset: usize, metric: f64) {
        self.offset = offset;
        self.metric = metric;
        self.metric_min = self.metric_min.min(metric);
    }
}

/// Size-ordered divide-and-conquer search for block boundaries
#[derive(Debug)]
pub struct Splitter {
    params: SplitParams,
    /// Pending blocks, ascending by size; the next block is at the back
    queue: Vec<BandedCorrelationMatrix>,
    breaks: Vec<Split>,
}

impl Splitter {
    pub fn new(params: SplitParams) -> Self {
        Self {
            params,
            queue: Vec::new(),
            breaks: Vec::new(),
        }
    }

    /// Breaks in discovery order
    pub fn breaks(&self) -> &[Split] {
        &self.breaks
    }

    pub fn into_breaks(self) -> Vec<Split> {
        self.breaks
    }

    /// Queue a block ahead of every pending block of the same or smaller size
    fn insert_block(&mut self, block: BandedCorrelationMatrix) {
        let size = block.size();
        let at = self.queue.partition_point(|b| b.size() <= size);
        self.queue.insert(at, block);
    }

    /// Split `matrix` until no block can be cut. Returns the number of breaks.
    #[instrument(name = "split_blocks", skip_all, fields(markers = matrix.size()))]
    pub fn run(&mut self, matrix: BandedCorrelationMatrix) -> Result<usize> {
        self.queue.clear();
        self.breaks.clear();
        self.queue.push(matrix);

        while let Some(mut block) = self.queue.pop() {
            let size = block.size();
            let margin = self.params.margin(size);

            if size < 2 * margin {
                match self.params.small_blocks {
                    SmallBlockPolicy::Halt => {
                        debug!(size, margin, "block below minimum size, stopping");
                        self.queue.clear();
                        break;
                    }
                    SmallBlockPolicy::Skip => continue,
                }
            }

            let split = self.choose_cut(&block, margin)?;
            if split.metric.is_nan() || split.metric >= self.params.metric_max {
                continue;
            }

            let mut right = block.split(split.offset)?;
            let offset = split.offset + block.offset();
            debug!(offset, metric = split.metric, size, "break");
            self.breaks.push(Split { offset, ..split });

            if right.size() > block.size() {
                std::mem::swap(&mut block, &mut right);
            }
            self.insert_block(block);
            self.insert_block(right);
        }

        info!("found {} break points", self.breaks.len());
        Ok(self.breaks.len())
    }

    /// Best cut of a block with `size >= 2 * margin`, as a local index
    fn choose_cut(&self, block: &BandedCorrelationMatrix, margin: usize) -> Result<Split> {
        let size = block.size();
        let metric = block.get_metric();

        if size == 2 * margin {
            // a 2-marker block has a single cut
            let index = if margin + 1 < size { margin } else { margin - 1 };
            return Ok(Split::new(index, metric[index]));
        }

        let mut best: Option<(usize, f64)> = None;
        for (i, &m) in metric.iter().enumerate().take(size - margin).skip(margin) {
            if m < best.map_or(f64::INFINITY, |(_, b)| b) {
                best = Some((i, m));
            }
        }
        let (index, value) =
            best.ok_or_else(|| LdBlockError::algorithm("unknown failure when splitting block"))?;
        let mut curr = Split::new(index, value);

        if curr.metric < self.params.metric_max && self.params.metric_margin > 0.0 {
            self.center_cut(&mut curr, metric, size);
        }
        Ok(curr)
    }

    /// Move the cut towards the middle of the block while its metric stays
    /// within `metric_margin` of the best one
    fn center_cut(&self, curr: &mut Split, metric: &[f64], size: usize) {
        let start = curr.offset.min(size - curr.offset) + 1;
        let mid = size / 2;
        let mut end = size.saturating_sub(start);
        let thresh = (curr.metric + self.params.metric_margin).min(self.params.metric_max);

        let mut i = start;
        while i < end {
            let m = metric[i];
            if m < thresh {
                if i < mid {
                    curr.set(i, m);
                    end = size - i;
                } else {
                    if i + 1 < end || m < curr.metric {
                        curr.set(i, m);
                    }
                    break;
                }
            }
            i += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Depth-1 matrix whose metric is exactly `metric`
    fn chain(metric: &[f32]) -> BandedCorrelationMatrix {
        let mut rows = vec![vec![]];
        rows.extend(metric.iter().map(|&m| vec![m]));
        BandedCorrelationMatrix::from_rows(rows).unwrap()
    }

    fn params(min_size: usize, min_prop: f64, metric_margin: f64, metric_max: f64) -> SplitParams {
        SplitParams {
            min_size,
            min_prop,
            metric_margin,
            metric_max,
            small_blocks: SmallBlockPolicy::Halt,
        }
    }

    fn offsets(splitter: &Splitter) -> Vec<usize> {
        splitter.breaks().iter().map(|s| s.offset).collect()
    }

    #[test]
    fn test_scenario() {
        let matrix = BandedCorrelationMatrix::from_rows(vec![
            vec![],
            vec![0.9],
            vec![0.1, 0.2],
            vec![0.05, 0.03],
            vec![0.5, 0.4],
        ])
        .unwrap();

        let mut splitter = Splitter::new(params(1, 0.0, 0.0, 1.0));
        assert_eq!(splitter.run(matrix).unwrap(), 4);
        assert_eq!(offsets(&splitter), vec![1, 3, 2, 0]);

        let first = &splitter.breaks()[0];
        assert!((first.metric - 0.35 / 3.0).abs() < 1e-6);
        assert_eq!(first.metric, first.metric_min);
        assert!(first.position.is_none());
    }

    #[test]
    fn test_min_size_covering_block() {
        let mut splitter = Splitter::new(params(5, 0.0, 0.0, 1.0));
        assert_eq!(splitter.run(chain(&[0.1, 0.2, 0.3, 0.4])).unwrap(), 0);
        assert!(splitter.breaks().is_empty());
    }

    #[test]
    fn test_small_block_policy() {
        let metric = [0.3f32; 4];

        // the 3-marker half needs a margin of 2 and halts the run
        let mut halt = Splitter::new(params(1, 0.4, 0.0, 1.0));
        assert_eq!(halt.run(chain(&metric)).unwrap(), 1);
        assert_eq!(offsets(&halt), vec![2]);

        let mut skip = Splitter::new(SplitParams {
            small_blocks: SmallBlockPolicy::Skip,
            ..params(1, 0.4, 0.0, 1.0)
        });
        assert_eq!(skip.run(chain(&metric)).unwrap(), 2);
        assert_eq!(offsets(&skip), vec![2, 3]);
    }

    #[test]
    fn test_metric_max_rejects_cuts() {
        let mut splitter = Splitter::new(params(1, 0.0, 0.0, 0.25));
        assert_eq!(splitter.run(chain(&[0.3, 0.4, 0.3, 0.5])).unwrap(), 0);

        // only the weak cut qualifies; both halves are left strong
        let mut splitter = Splitter::new(params(1, 0.0, 0.0, 0.25));
        assert_eq!(splitter.run(chain(&[0.3, 0.4, 0.1, 0.5, 0.3])).unwrap(), 1);
        assert_eq!(offsets(&splitter), vec![2]);
    }

    #[test]
    fn test_equal_size_block_cuts_after_margin() {
        let mut splitter = Splitter::new(params(2, 0.0, 0.0, 1.0));
        assert_eq!(splitter.run(chain(&[0.1, 0.7, 0.2])).unwrap(), 1);
        assert_eq!(splitter.breaks()[0], Split::new(2, 0.2f32 as f64));

        let mut splitter = Splitter::new(params(50, 0.0, 0.0, 1.0));
        let metric: Vec<f32> = (0..99).map(|i| if i == 49 { 0.01 } else { 0.3 }).collect();
        assert_eq!(splitter.run(chain(&metric)).unwrap(), 1);
        assert_eq!(splitter.breaks()[0].offset, 50);
    }

    #[test]
    fn test_two_marker_block_has_one_cut() {
        let mut splitter = Splitter::new(params(1, 0.0, 0.0, 1.0));
        assert_eq!(splitter.run(chain(&[0.4])).unwrap(), 1);
        assert_eq!(splitter.breaks()[0], Split::new(0, 0.4f32 as f64));
    }

    #[test]
    fn test_centering_moves_cut_inwards() {
        let metric = [0.5, 0.5, 0.10, 0.5, 0.5, 0.12, 0.5, 0.5, 0.5];
        let mut splitter = Splitter::new(params(2, 0.0, 0.05, 1.0));
        splitter.run(chain(&metric)).unwrap();

        let first = &splitter.breaks()[0];
        assert_eq!(first.offset, 5);
        assert!((first.metric - 0.12).abs() < 1e-6);
        assert!((first.metric_min - 0.10).abs() < 1e-6);
    }

    #[test]
    fn test_centering_keeps_better_cut_at_far_edge() {
        let metric = [0.5, 0.5, 0.10, 0.5, 0.5, 0.5, 0.12, 0.5, 0.5];
        let mut splitter = Splitter::new(params(2, 0.0, 0.05, 1.0));
        splitter.run(chain(&metric)).unwrap();
        assert_eq!(splitter.breaks()[0].offset, 2);

        let metric = [0.5, 0.5, 0.5, 0.5, 0.12, 0.5, 0.5, 0.10, 0.5];
        let mut splitter = Splitter::new(params(2, 0.0, 0.05, 1.0));
        splitter.run(chain(&metric)).unwrap();
        let first = &splitter.breaks()[0];
        assert_eq!(first.offset, 4);
        assert!((first.metric_min - 0.10).abs() < 1e-6);
    }

    #[test]
    fn test_no_candidate_is_an_error() {
        // a band of empty rows has no crossing pairs anywhere
        let matrix = BandedCorrelationMatrix::from_rows(vec![vec![]; 6]).unwrap();
        let mut splitter = Splitter::new(params(1, 0.0, 0.0, 1.0));
        assert!(matches!(splitter.run(matrix), Err(LdBlockError::Algorithm { .. })));
    }

    #[test]
    fn test_larger_blocks_first() {
        let metric = [0.2, 0.2, 0.2, 0.2, 0.2, 0.01, 0.2, 0.2, 0.2, 0.2, 0.2];
        let mut splitter = Splitter::new(params(3, 0.0, 0.0, 1.0));
        splitter.run(chain(&metric)).unwrap();
        // 12 markers cut after 5, then both 6-marker halves after their
        // margin, the right half first
        assert_eq!(offsets(&splitter), vec![5, 9, 3]);
    }
}
