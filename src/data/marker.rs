//! # Marker Positions
//!
//! ## Role
//! Location of a retained marker in both coordinate systems the tool uses:
//! the genomic base-pair position and the index into the full (unfiltered)
//! marker list of the genotype source.
//!
//! Retained markers are kept in ascending full-data index order, so a
//! `Vec<MarkerPosition>` doubles as the map from filtered index to full index.

/// Full-data marker index (0-based row of the `.bim` file)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerIdx(pub u32);

impl MarkerIdx {
    pub fn new(idx: u32) -> Self {
        Self(idx)
    }

    pub fn as_usize(self) -> usize {
        self.0 as usize
    }

    /// True if `other` immediately follows this marker in the full data
    pub fn is_adjacent(self, other: MarkerIdx) -> bool {
        other.0 == self.0 + 1
    }
}

impl From<usize> for MarkerIdx {
    fn from(idx: usize) -> Self {
        Self(idx as u32)
    }
}

/// A retained marker: genomic position plus full-data index
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MarkerPosition {
    /// 1-based base-pair position
    pub pos: u32,
    /// Index in the full marker list
    pub index: MarkerIdx,
}

impl MarkerPosition {
    pub fn new(pos: u32, index: usize) -> Self {
        Self {
            pos,
            index: MarkerIdx::from(index),
        }
    }
}

/// Integer midpoint of two base-pair positions, rounded half up
pub fn midpoint_rounded(lower: u32, upper: u32) -> u32 {
    ((lower as f64 + upper as f64) / 2.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adjacency() {
        let a = MarkerIdx::new(10);
        assert!(a.is_adjacent(MarkerIdx::new(11)));
        assert!(!a.is_adjacent(MarkerIdx::new(12)));
        assert!(!a.is_adjacent(MarkerIdx::new(10)));
    }

    #[test]
    fn test_midpoint() {
        assert_eq!(midpoint_rounded(100, 200), 150);
        assert_eq!(midpoint_rounded(100, 201), 151);
    }
}
