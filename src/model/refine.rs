//! # Break Position Refinement
//!
//! Breaks are found between retained markers, but the MAF filter may have
//! dropped markers in between. The refiner turns the filter off, recomputes
//! correlations over a small unfiltered block around each break and moves the
//! break to the weakest cut between its two bracketing markers.

use tracing::{debug, info_span};

use crate::data::MarkerPosition;
use crate::error::{LdBlockError, Result};
use crate::io::source::GenotypeSource;
use crate::model::correlation::CorrelationEngine;
use crate::model::splitter::Split;

/// Second pass over unfiltered data around each break
pub struct Refiner<'a, S: GenotypeSource + ?Sized> {
    source: &'a mut S,
    engine: CorrelationEngine,
}

impl<'a, S: GenotypeSource + ?Sized> Refiner<'a, S> {
    /// Wrap `source`, disabling its MAF filter
    pub fn new(source: &'a mut S, depth: usize) -> Self {
        source.set_maf_threshold(0.0);
        Self {
            source,
            engine: CorrelationEngine::new(depth),
        }
    }

    /// Set `position` of every break whose bracketing markers are not adjacent.
    ///
    /// `positions` are the retained markers of the filtered pass that produced
    /// the break offsets.
    pub fn refine(&mut self, breaks: &mut [Split], positions: &[MarkerPosition]) -> Result<()> {
        let _span = info_span!("refine_breaks", breaks = breaks.len()).entered();
        let depth = self.engine.depth();

        for split in breaks.iter_mut() {
            let (lower, upper) = match (positions.get(split.offset), positions.get(split.offset + 1)) {
                (Some(l), Some(u)) => (l.index, u.index),
                _ => {
                    return Err(LdBlockError::invalid_data(format!(
                        "break offset {} outside {} retained SNPs",
                        split.offset,
                        positions.len()
                    )))
                }
            };
            if lower.is_adjacent(upper) {
                continue;
            }

            let from = lower.as_usize().saturating_sub(depth);
            let to = upper.as_usize() + depth;
            self.engine.compute_block(&mut *self.source, from, to)?;

            let local = self.engine.positions();
            let i_lower = local.iter().position(|p| p.index == lower);
            let i_upper = local.iter().position(|p| p.index == upper);
            let (Some(i_lower), Some(i_upper)) = (i_lower, i_upper) else {
                continue;
            };
            if i_upper <= i_lower {
                continue;
            }

            let lower_pos = local[i_lower].pos;
            let matrix = self.engine.take_matrix();
            let metric = matrix.get_metric();
            let local = self.engine.positions();

            let mut i_min = i_lower;
            let mut min_value = metric[i_lower];
            for (i, &m) in metric.iter().enumerate().take(i_upper).skip(i_lower + 1) {
                if m < min_value {
                    i_min = i;
                    min_value = m;
                }
            }

            let position = ((local[i_min].pos as u64 + local[i_min + 1].pos as u64) / 2) as u32;
            debug!(
                offset = split.offset,
                lower = lower_pos,
                upper = local[i_upper].pos,
                position,
                "refined break"
            );
            split.position = Some(position);
        }
        Ok(())
    }
}
