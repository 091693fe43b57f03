//! # Genotype Sources
//!
//! ## Role
//! The boundary between genotype storage and the correlation engine. A source
//! hands out quality-filtered, normalized columns in full-data order, one page
//! at a time, together with the coordinates of every retained marker.
//!
//! ## Contract
//! `load(page, positions, offset, total, end)`:
//! - reshapes `page` to `n_samples x total` and fills it with up to `total`
//!   retained columns, scanning full-data markers `offset..end`;
//! - appends one `MarkerPosition` per retained column to `positions`;
//! - reports how many columns were retained and how many full-data markers
//!   were consumed, so the caller can continue at `offset + consumed`.

use crate::data::{normalize_dosages, ColumnPage, MarkerPosition};
use crate::error::{LdBlockError, Result};

/// Outcome of one page load
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PageLoad {
    /// Columns written to the page
    pub retained: usize,
    /// Full-data markers scanned
    pub consumed: usize,
}

/// Supplier of normalized genotype columns
pub trait GenotypeSource {
    /// Number of individuals (values per column)
    fn n_samples(&self) -> usize;

    /// Number of markers in the full, unfiltered data
    fn n_markers(&self) -> usize;

    /// Current minor allele frequency threshold
    fn maf_threshold(&self) -> f64;

    /// Override the MAF threshold; 0 disables frequency filtering
    fn set_maf_threshold(&mut self, threshold: f64);

    /// First and last valid base-pair positions in the full data
    fn position_bounds(&self) -> (u32, u32);

    /// Load up to `total` retained columns from full-data markers `offset..end`
    fn load(
        &mut self,
        page: &mut ColumnPage,
        positions: &mut Vec<MarkerPosition>,
        offset: usize,
        total: usize,
        end: usize,
    ) -> Result<PageLoad>;

    /// Load up to `total` retained columns starting at `offset`
    fn load_page(
        &mut self,
        page: &mut ColumnPage,
        positions: &mut Vec<MarkerPosition>,
        offset: usize,
        total: usize,
    ) -> Result<PageLoad> {
        self.load(page, positions, offset, total, usize::MAX)
    }

    /// Load every retained column in full-data range `from..to`
    fn load_range(
        &mut self,
        page: &mut ColumnPage,
        positions: &mut Vec<MarkerPosition>,
        from: usize,
        to: usize,
    ) -> Result<PageLoad> {
        self.load(page, positions, from, to.saturating_sub(from), to)
    }
}

/// Shared scan loop for source implementations.
///
/// `marker(idx, slot)` normalizes full-data marker `idx` into `slot` and
/// returns its position, or `None` if the marker is filtered out.
pub(crate) fn fill_page<F>(
    page: &mut ColumnPage,
    positions: &mut Vec<MarkerPosition>,
    n_samples: usize,
    n_markers: usize,
    offset: usize,
    total: usize,
    end: usize,
    mut marker: F,
) -> Result<PageLoad>
where
    F: FnMut(usize, &mut [f32]) -> Result<Option<u32>>,
{
    page.reset(n_samples, total);

    let stop = end.min(n_markers);
    let mut load = PageLoad::default();
    let mut idx = offset;
    while idx < stop && load.retained < total {
        let slot = page
            .spare_column()
            .ok_or_else(|| LdBlockError::invalid_data("page overflow while loading genotypes"))?;
        load.consumed += 1;
        if let Some(pos) = marker(idx, slot)? {
            page.commit_column();
            positions.push(MarkerPosition::new(pos, idx));
            load.retained += 1;
        }
        idx += 1;
    }

    Ok(load)
}

/// One marker held by `MemorySource`
#[derive(Clone, Debug)]
struct MemoryMarker {
    /// Base-pair position; 0 marks an unusable marker
    pos: u32,
    dosages: Vec<u8>,
}

/// Genotype source over in-memory dosage vectors.
///
/// Applies the same QC and normalization as the PLINK reader.
#[derive(Clone, Debug)]
pub struct MemorySource {
    n_samples: usize,
    maf_threshold: f64,
    markers: Vec<MemoryMarker>,
}

impl MemorySource {
    /// Create an empty source for `n_samples` individuals
    pub fn new(n_samples: usize, maf_threshold: f64) -> Self {
        Self {
            n_samples,
            maf_threshold,
            markers: Vec::new(),
        }
    }

    /// Append a marker. `dosages` holds one call per individual (0/1/2 or `MISSING`).
    pub fn push_marker(&mut self, pos: u32, dosages: Vec<u8>) -> Result<()> {
        if dosages.len() != self.n_samples {
            return Err(LdBlockError::invalid_data(format!(
                "marker at position {} has {} calls, expected {}",
                pos,
                dosages.len(),
                self.n_samples
            )));
        }
        if let Some(last) = self.markers.iter().rev().find(|m| m.pos > 0) {
            if pos > 0 && pos <= last.pos {
                return Err(LdBlockError::invalid_data(format!(
                    "marker positions out of order: {} after {}",
                    pos, last.pos
                )));
            }
        }
        self.markers.push(MemoryMarker { pos, dosages });
        Ok(())
    }
}

impl GenotypeSource for MemorySource {
    fn n_samples(&self) -> usize {
        self.n_samples
    }

    fn n_markers(&self) -> usize {
        self.markers.len()
    }

    fn maf_threshold(&self) -> f64 {
        self.maf_threshold
    }

    fn set_maf_threshold(&mut self, threshold: f64) {
        self.maf_threshold = threshold;
    }

    fn position_bounds(&self) -> (u32, u32) {
        let first = self.markers.iter().map(|m| m.pos).find(|&p| p > 0);
        let last = self.markers.iter().rev().map(|m| m.pos).find(|&p| p > 0);
        (first.unwrap_or(0), last.unwrap_or(0))
    }

    fn load(
        &mut self,
        page: &mut ColumnPage,
        positions: &mut Vec<MarkerPosition>,
        offset: usize,
        total: usize,
        end: usize,
    ) -> Result<PageLoad> {
        let markers = &self.markers;
        let maf = self.maf_threshold;
        fill_page(
            page,
            positions,
            self.n_samples,
            markers.len(),
            offset,
            total,
            end,
            |idx, slot| {
                let marker = &markers[idx];
                if marker.pos > 0 && normalize_dosages(&marker.dosages, maf, slot) {
                    Ok(Some(marker.pos))
                } else {
                    Ok(None)
                }
            },
        )
    }
}
