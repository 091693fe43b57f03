//! # Banded Correlation Matrix
//!
//! ## Role
//! Holds the r² band of a contiguous run of retained markers together with the
//! crossing metric of every cut point, and splits itself in two.
//!
//! ## Layout
//! Row `i` holds r² of marker `i` against its `min(i, depth)` predecessors,
//! farthest first. All rows live in one contiguous `Vec<f32>` owned by the
//! matrix and are addressed by `RowSpan` ranges into it. A split hands the
//! tail of the store to the new matrix (`Vec::split_off`), so two matrices
//! never share storage.
//!
//! ## Crossing metric
//! `metric[i]` (cut after row `i`) is the mean r² over stored pairs `(p, q)`
//! with `p <= i < q`. Row `i + 1 + r` contributes the first `len - r` of its
//! values; the scan stops at the first downstream row that no longer reaches
//! back to `i`. With no crossing pair the value is NaN, which never wins a
//! `<` comparison and so drops out of every minimum search.

use crate::error::{LdBlockError, Result};

/// Half-open range of one row inside a matrix's value store
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RowSpan {
    pub start: usize,
    pub end: usize,
}

impl RowSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }

    fn rebase(self, base: usize) -> Self {
        Self::new(self.start - base, self.end - base)
    }
}

/// Banded r² matrix with its crossing-metric sequence
#[derive(Clone, Debug, Default)]
pub struct BandedCorrelationMatrix {
    values: Vec<f32>,
    rows: Vec<RowSpan>,
    metric: Vec<f64>,
    /// Index of row 0 in the full retained-marker ordering
    offset: usize,
    /// Length of the last row
    max_depth: usize,
}

impl BandedCorrelationMatrix {
    /// Empty matrix: no rows, no metrics
    pub fn empty() -> Self {
        Self::default()
    }

    /// Take ownership of a row store and compute all metrics
    pub(crate) fn from_store(values: Vec<f32>, rows: Vec<RowSpan>, offset: usize) -> Self {
        let max_depth = rows.last().map_or(0, RowSpan::len);
        let mut matrix = Self {
            values,
            rows,
            metric: Vec::new(),
            offset,
            max_depth,
        };
        matrix.compute_metric(0, usize::MAX);
        matrix
    }

    /// Build a matrix from explicit rows (farthest-to-nearest r² values).
    ///
    /// Rows must be regular: row 0 is empty and each row is as long as its
    /// predecessor or exactly one longer.
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self> {
        let mut prev_len = 0;
        for (i, row) in rows.iter().enumerate() {
            let ok = if i == 0 {
                row.is_empty()
            } else {
                row.len() == prev_len || row.len() == prev_len + 1
            };
            if !ok {
                return Err(LdBlockError::invalid_data(format!(
                    "row {} has length {} after a row of length {}",
                    i,
                    row.len(),
                    prev_len
                )));
            }
            prev_len = row.len();
        }

        let mut values = Vec::with_capacity(rows.iter().map(Vec::len).sum());
        let mut spans = Vec::with_capacity(rows.len());
        for row in rows {
            let start = values.len();
            values.extend(row);
            spans.push(RowSpan::new(start, values.len()));
        }
        Ok(Self::from_store(values, spans, 0))
    }

    /// Number of rows (markers)
    pub fn size(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the first row in the full retained-marker ordering
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Stored r² values of row `i`, farthest first
    pub fn row(&self, i: usize) -> &[f32] {
        let span = self.rows[i];
        &self.values[span.start..span.end]
    }

    /// Crossing metric per cut point; length `size - 1`
    pub fn get_metric(&self) -> &[f64] {
        &self.metric
    }

    /// Mean r² over stored pairs straddling the cut after row `i`
    fn crossing_mean(&self, i: usize) -> f64 {
        let mut sum = 0.0f64;
        let mut count = 0usize;
        for (r, span) in self.rows[i + 1..].iter().enumerate() {
            let len = span.len();
            if len <= r {
                break;
            }
            let used = len - r;
            sum += self.values[span.start..span.start + used]
                .iter()
                .map(|&v| v as f64)
                .sum::<f64>();
            count += used;
        }
        if count == 0 {
            f64::NAN
        } else {
            sum / count as f64
        }
    }

    /// Resize the metric to `size - 1` and recompute entries `from..to` (clamped)
    fn compute_metric(&mut self, from: usize, to: usize) {
        let n = self.rows.len().saturating_sub(1);
        self.metric.resize(n, f64::NAN);
        for i in from..to.min(n) {
            self.metric[i] = self.crossing_mean(i);
        }
    }

    /// Split after row `index`.
    ///
    /// `self` keeps rows `0..=index`; the returned matrix owns the rest, with
    /// its offset advanced by `index + 1`. Only metrics within `max_depth` of
    /// the cut are recomputed on either side.
    pub fn split(&mut self, index: usize) -> Result<BandedCorrelationMatrix> {
        let size = self.size();
        if size < 2 || index >= size - 1 {
            return Err(LdBlockError::InvalidSplit { index, size });
        }

        let cut = self.rows[index].end;
        let right_values = self.values.split_off(cut);
        let mut right_rows: Vec<RowSpan> = self
            .rows
            .split_off(index + 1)
            .into_iter()
            .map(|span| span.rebase(cut))
            .collect();
        let right_metric = self.metric.split_off(index + 1);
        self.metric.truncate(index);

        // rows that reached back across the cut keep only their local suffix
        let mut trimmed = 0;
        for (j, span) in right_rows.iter_mut().enumerate().take(self.max_depth + 1) {
            if span.len() > j {
                span.start = span.end - j;
                trimmed = j + 1;
            }
        }

        let right_depth = right_rows.last().map_or(0, RowSpan::len);
        let mut right = BandedCorrelationMatrix {
            values: right_values,
            rows: right_rows,
            metric: right_metric,
            offset: self.offset + index + 1,
            max_depth: right_depth,
        };
        right.compute_metric(0, trimmed);

        // the last max_depth cuts of the left part lost downstream rows
        self.compute_metric((index + 1).saturating_sub(self.max_depth), usize::MAX);
        self.max_depth = self.rows.last().map_or(0, RowSpan::len);

        Ok(right)
    }
}
