//! # Column Pages
//!
//! A page is a fixed-capacity, column-major block of normalized genotype
//! columns (individuals x markers). Sources fill pages; the window iterator
//! and the correlation engine only read them.
//!
//! Columns past `len()` are sentinels: `column()` returns `None` for them, which
//! is how a short final page signals end-of-data.

/// Column-major buffer of normalized dosages
#[derive(Clone, Debug, Default)]
pub struct ColumnPage {
    data: Vec<f32>,
    n_rows: usize,
    capacity: usize,
    len: usize,
}

impl ColumnPage {
    /// Create an empty page
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a page ready to receive `n_cols` columns of `n_rows` values
    pub fn with_shape(n_rows: usize, n_cols: usize) -> Self {
        let mut page = Self::new();
        page.reset(n_rows, n_cols);
        page
    }

    /// Drop all loaded columns and reshape. The allocation is reused when large enough.
    pub fn reset(&mut self, n_rows: usize, n_cols: usize) {
        self.n_rows = n_rows;
        self.capacity = n_cols;
        self.len = 0;
        self.data.resize(n_rows * n_cols, 0.0);
    }

    /// Values per column (number of individuals)
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Number of column slots
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of loaded columns
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len >= self.capacity
    }

    /// Loaded column `c`, or `None` for a sentinel slot
    #[inline]
    pub fn column(&self, c: usize) -> Option<&[f32]> {
        if c < self.len {
            let start = c * self.n_rows;
            Some(&self.data[start..start + self.n_rows])
        } else {
            None
        }
    }

    /// The next free slot, without claiming it. Returns `None` when the page is full.
    pub fn spare_column(&mut self) -> Option<&mut [f32]> {
        if self.is_full() {
            return None;
        }
        let start = self.len * self.n_rows;
        Some(&mut self.data[start..start + self.n_rows])
    }

    /// Claim the slot last handed out by `spare_column`
    pub fn commit_column(&mut self) {
        debug_assert!(!self.is_full());
        self.len += 1;
    }
}
