//! # Windowed Correlation Engine
//!
//! Computes r² between every retained marker and its `depth` retained
//! predecessors, producing the rows of a `BandedCorrelationMatrix`.
//!
//! Columns arrive already standardized, so the correlation of two columns
//! `x`, `y` of length `n` is `sum(x * y) / (n - 1)`.
//!
//! Rows are appended to a single growable store owned by the engine and are
//! addressed by offsets, so they stay valid when the store reallocates. The
//! store is handed over to the matrix by `take_matrix`.

use tracing::{debug, instrument};

use crate::data::{ColumnPage, MarkerPosition};
use crate::error::{LdBlockError, Result};
use crate::io::source::GenotypeSource;
use crate::io::window::SlidingWindowIterator;
use crate::model::matrix::{BandedCorrelationMatrix, RowSpan};

/// Rows reserved per storage extension
const STORAGE_ROWS: usize = 10_000;

/// Pearson correlation of two standardized columns
#[inline]
pub fn correlation(x: &[f32], y: &[f32], n: usize) -> f64 {
    let sum: f64 = x.iter().zip(y).map(|(&a, &b)| (a * b) as f64).sum();
    sum / (n - 1) as f64
}

/// Builder of banded r² rows from a genotype source
#[derive(Debug)]
pub struct CorrelationEngine {
    depth: usize,
    values: Vec<f32>,
    rows: Vec<RowSpan>,
    positions: Vec<MarkerPosition>,
}

impl CorrelationEngine {
    /// Engine correlating each marker with its `depth` predecessors
    pub fn new(depth: usize) -> Self {
        Self {
            depth,
            values: Vec::new(),
            rows: Vec::new(),
            positions: Vec::new(),
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Number of rows held
    pub fn size(&self) -> usize {
        self.rows.len()
    }

    /// Positions of the markers of the last computation pass
    pub fn positions(&self) -> &[MarkerPosition] {
        &self.positions
    }

    fn clear(&mut self) {
        self.values.clear();
        self.rows.clear();
        self.positions.clear();
    }

    /// Make room for one more row of up to `depth` values
    fn reserve_row(&mut self) {
        if self.values.capacity() - self.values.len() < self.depth {
            self.values.reserve(self.depth * STORAGE_ROWS);
        }
    }

    /// Streaming pass over the whole source. Returns the number of rows.
    #[instrument(name = "compute_correlations", skip_all, fields(depth = self.depth))]
    pub fn compute<S: GenotypeSource + ?Sized>(&mut self, source: &mut S) -> Result<usize> {
        self.clear();
        let n = check_samples(source.n_samples())?;
        self.values.reserve_exact(self.depth * (self.depth + 1) / 2);

        let mut window = SlidingWindowIterator::new(source, self.depth)?;
        while let Some(lead) = window.advance_lead()? {
            self.reserve_row();
            let start = self.values.len();
            while let Some(trail) = window.get_next() {
                let r = correlation(window.column(lead), window.column(trail), n) as f32;
                self.values.push(r * r);
            }
            self.rows.push(RowSpan::new(start, self.values.len()));
        }
        self.positions = window.into_positions();

        self.check_consistency()?;
        debug!(rows = self.rows.len(), values = self.values.len(), "correlation pass complete");
        Ok(self.rows.len())
    }

    /// Non-streaming pass over full-data markers `from..to`.
    ///
    /// All retained columns of the range are loaded at once; each marker is
    /// correlated with its `depth` predecessors inside the range only.
    pub fn compute_block<S: GenotypeSource + ?Sized>(
        &mut self,
        source: &mut S,
        from: usize,
        to: usize,
    ) -> Result<usize> {
        self.clear();
        let n = check_samples(source.n_samples())?;

        let mut page = ColumnPage::new();
        let load = source.load_range(&mut page, &mut self.positions, from, to)?;
        if page.len() != load.retained {
            return Err(LdBlockError::invalid_data(format!(
                "genotype source filled {} columns, reported {}",
                page.len(),
                load.retained
            )));
        }

        self.values.reserve_exact(self.depth * load.retained);
        for lead in 0..load.retained {
            let lead_col = loaded_column(&page, lead)?;
            let start = self.values.len();
            for trail in lead.saturating_sub(self.depth)..lead {
                let r = correlation(lead_col, loaded_column(&page, trail)?, n) as f32;
                self.values.push(r * r);
            }
            self.rows.push(RowSpan::new(start, self.values.len()));
        }

        self.check_consistency()?;
        Ok(self.rows.len())
    }

    /// Hand the current rows over to a new matrix (offset 0).
    ///
    /// The engine keeps the positions of the pass but no longer holds rows.
    pub fn take_matrix(&mut self) -> BandedCorrelationMatrix {
        let values = std::mem::take(&mut self.values);
        let rows = std::mem::take(&mut self.rows);
        BandedCorrelationMatrix::from_store(values, rows, 0)
    }

    fn check_consistency(&self) -> Result<()> {
        if self.rows.len() != self.positions.len() {
            return Err(LdBlockError::invalid_data(format!(
                "number of SNP positions ({}) does not match size of correlation matrix ({})",
                self.positions.len(),
                self.rows.len()
            )));
        }
        Ok(())
    }
}

fn check_samples(n: usize) -> Result<usize> {
    if n < 2 {
        return Err(LdBlockError::invalid_data(format!(
            "correlations need at least 2 individuals, found {}",
            n
        )));
    }
    Ok(n)
}

fn loaded_column(page: &ColumnPage, c: usize) -> Result<&[f32]> {
    page.column(c)
        .ok_or_else(|| LdBlockError::invalid_data(format!("column {} missing from loaded block", c)))
}
