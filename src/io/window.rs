//! # Sliding Window Infrastructure
//!
//! Streams retained markers out of a `GenotypeSource` so that each marker, in
//! turn the "lead", can be paired with the `depth` retained markers before it
//! (its "trail").
//!
//! Two pages of `page_size >= depth + 1` columns are held: the current page and
//! the lookahead page. Slots `0..page_size` address the current page and
//! `page_size..2 * page_size` the lookahead page. When the lead walks off the
//! end of the lookahead page, the pages swap roles and the stale page is
//! refilled from the source, so the trail of any lead always lies within the
//! two resident pages.

use crate::data::{ColumnPage, MarkerPosition};
use crate::error::{LdBlockError, Result};
use crate::io::source::GenotypeSource;

/// Handle to a resident column
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Slot(usize);

/// Double-buffered lead/trail iterator over a genotype source
pub struct SlidingWindowIterator<'a, S: GenotypeSource + ?Sized> {
    source: &'a mut S,
    depth: usize,
    page_size: usize,
    pages: [ColumnPage; 2],
    /// Index into `pages` of the current page
    current: usize,
    /// Full-data index where the next page load starts
    next_offset: usize,
    /// Positions of all retained markers paged in so far
    positions: Vec<MarkerPosition>,
    lead: usize,
    trail: usize,
    started: bool,
    finished: bool,
}

impl<'a, S: GenotypeSource + ?Sized> SlidingWindowIterator<'a, S> {
    /// Iterator with the minimal page size `depth + 1`
    pub fn new(source: &'a mut S, depth: usize) -> Result<Self> {
        Self::with_page_size(source, depth, depth + 1)
    }

    /// Iterator with an explicit page capacity
    pub fn with_page_size(source: &'a mut S, depth: usize, page_size: usize) -> Result<Self> {
        if depth == 0 {
            return Err(LdBlockError::config("window depth must be at least 1"));
        }
        if page_size < depth + 1 {
            return Err(LdBlockError::config(format!(
                "page size {} is too small for window depth {}",
                page_size, depth
            )));
        }
        Ok(Self {
            source,
            depth,
            page_size,
            pages: [ColumnPage::new(), ColumnPage::new()],
            current: 0,
            next_offset: 0,
            positions: Vec::new(),
            lead: 0,
            trail: 0,
            started: false,
            finished: false,
        })
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Number of individuals per column
    pub fn n_samples(&self) -> usize {
        self.source.n_samples()
    }

    /// Positions of the retained markers paged in so far
    pub fn positions(&self) -> &[MarkerPosition] {
        &self.positions
    }

    pub fn into_positions(self) -> Vec<MarkerPosition> {
        self.positions
    }

    /// Move to the next retained marker. Returns `None` at end of data.
    pub fn advance_lead(&mut self) -> Result<Option<Slot>> {
        if self.finished {
            return Ok(None);
        }

        if !self.started {
            self.started = true;
            self.fill(self.current)?;
            self.fill(1 - self.current)?;
            self.lead = 0;
        } else {
            self.lead += 1;
            if self.lead >= 2 * self.page_size {
                // lookahead becomes current; the old current page is refilled as lookahead
                self.current = 1 - self.current;
                self.fill(1 - self.current)?;
                self.lead = self.page_size;
            }
        }

        self.trail = self.lead.saturating_sub(self.depth);
        if self.resident(Slot(self.lead)).is_none() {
            self.finished = true;
            return Ok(None);
        }
        Ok(Some(Slot(self.lead)))
    }

    /// Next trailing marker of the current lead, farthest first.
    ///
    /// Yields at most `depth` slots per lead.
    pub fn get_next(&mut self) -> Option<Slot> {
        if self.finished || !self.started || self.trail >= self.lead {
            return None;
        }
        let slot = Slot(self.trail);
        self.trail += 1;
        Some(slot)
    }

    /// Column held in `slot`; sentinel slots are empty
    #[inline]
    pub fn column(&self, slot: Slot) -> &[f32] {
        self.resident(slot).unwrap_or(&[])
    }

    fn resident(&self, slot: Slot) -> Option<&[f32]> {
        let Slot(s) = slot;
        if s < self.page_size {
            self.pages[self.current].column(s)
        } else {
            self.pages[1 - self.current].column(s - self.page_size)
        }
    }

    /// Load the next page from the source into `pages[which]`
    fn fill(&mut self, which: usize) -> Result<()> {
        let load = self.source.load_page(
            &mut self.pages[which],
            &mut self.positions,
            self.next_offset,
            self.page_size,
        )?;

        let page = &self.pages[which];
        if page.capacity() != self.page_size || page.len() != load.retained {
            return Err(LdBlockError::invalid_data(format!(
                "genotype source returned {} of {} page slots filled, reported {} retained",
                page.len(),
                page.capacity(),
                load.retained
            )));
        }
        if page.len() > 0 && page.n_rows() != self.source.n_samples() {
            return Err(LdBlockError::invalid_data(format!(
                "genotype columns hold {} values, expected {}",
                page.n_rows(),
                self.source.n_samples()
            )));
        }

        self.next_offset += load.consumed;
        Ok(())
    }
}
