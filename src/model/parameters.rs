//! # Split Parameters
//!
//! ## Role
//! Pure data structures for the block-splitting hyperparameters.
//!
//! ### Margin
//! A block of `size` markers may only be cut at indices that leave at least
//! `margin` markers on each side:
//!
//! ```text
//! margin = max(ceil(size * min_prop), min_size)
//! ```

/// What the splitter does with a block smaller than twice its margin
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SmallBlockPolicy {
    /// Discard the block and stop processing all remaining blocks
    #[default]
    Halt,
    /// Discard only this block
    Skip,
}

/// Hyperparameters of the greedy splitter
#[derive(Clone, Debug, PartialEq)]
pub struct SplitParams {
    /// Minimum number of markers on each side of a cut
    pub min_size: usize,
    /// Minimum proportion of the block on each side of a cut
    pub min_prop: f64,
    /// Tolerance above the best metric for moving a cut towards the center
    pub metric_margin: f64,
    /// Cuts with a metric at or above this value are rejected
    pub metric_max: f64,
    pub small_blocks: SmallBlockPolicy,
}

impl Default for SplitParams {
    fn default() -> Self {
        Self {
            min_size: 1000,
            min_prop: 0.1,
            metric_margin: 0.01,
            metric_max: 0.25,
            small_blocks: SmallBlockPolicy::Halt,
        }
    }
}

impl SplitParams {
    /// Minimum markers per side for a block of `size` markers (at least 1)
    pub fn margin(&self, size: usize) -> usize {
        let by_prop = (size as f64 * self.min_prop).ceil() as usize;
        by_prop.max(self.min_size).max(1)
    }
}
