//! # Genotype Quality Control and Normalization
//!
//! ## Role
//! Turns one marker's raw genotype calls into a standardized dosage column, or
//! rejects the marker. Shared by every `GenotypeSource` so that the PLINK
//! reader and the in-memory source filter identically.
//!
//! ## Rules
//! - Calls are dosages 0/1/2 (copies of the second allele) or `MISSING`.
//! - Reject if fewer than two distinct genotypes are observed, if the minor
//!   allele frequency (over observed alleles) is below the threshold, or if
//!   the standard deviation is zero.
//! - The mean dosage is taken over all individuals, with missing calls adding
//!   nothing to the sum. Missing calls sit at the mean: they add `mean²` to
//!   the sum of squares and normalize to 0.
//! - The standard deviation uses the `n - 1` denominator over all individuals.

/// Dosage code for a missing call
pub const MISSING: u8 = 3;

/// Summary of one marker's calls
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GenotypeCounts {
    /// Counts indexed by dosage 0, 1, 2, then missing
    pub counts: [usize; 4],
}

impl GenotypeCounts {
    pub fn from_dosages(dosages: &[u8]) -> Self {
        let mut counts = [0usize; 4];
        for &d in dosages {
            counts[d.min(MISSING) as usize] += 1;
        }
        Self { counts }
    }

    pub fn n_observed(&self) -> usize {
        self.counts[0] + self.counts[1] + self.counts[2]
    }

    pub fn n_total(&self) -> usize {
        self.n_observed() + self.counts[MISSING as usize]
    }

    /// Number of distinct observed genotype classes
    pub fn n_classes(&self) -> usize {
        self.counts[..3].iter().filter(|&&c| c > 0).count()
    }

    /// Frequency of the counted allele among observed alleles
    pub fn allele_freq(&self) -> f64 {
        let n_obs = self.n_observed();
        if n_obs == 0 {
            return 0.0;
        }
        (self.counts[1] + 2 * self.counts[2]) as f64 / (2 * n_obs) as f64
    }

    pub fn maf(&self) -> f64 {
        let freq = self.allele_freq();
        freq.min(1.0 - freq)
    }
}

/// Standardization parameters for a marker that passed QC
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Standardizer {
    pub mean: f64,
    pub sd: f64,
}

impl Standardizer {
    /// Apply QC; `None` means the marker is filtered out.
    pub fn fit(counts: &GenotypeCounts, maf_threshold: f64) -> Option<Self> {
        let n = counts.n_total();
        let n_obs = counts.n_observed();
        if n < 2 || n_obs == 0 || counts.n_classes() < 2 {
            return None;
        }
        if counts.maf() < maf_threshold {
            return None;
        }

        let sum = (counts.counts[1] + 2 * counts.counts[2]) as f64;
        let mean = sum / n as f64;
        let n_missing = counts.counts[MISSING as usize] as f64;
        let sq = (counts.counts[1] + 4 * counts.counts[2]) as f64 + n_missing * mean * mean;

        let ss = sq - mean * sum;
        let var = ss / (n - 1) as f64;
        if var <= 0.0 {
            return None;
        }

        Some(Self {
            mean,
            sd: var.sqrt(),
        })
    }

    /// Lookup table from dosage code to normalized value
    pub fn table(&self) -> [f32; 4] {
        let mut values = [0.0f32; 4];
        for (d, v) in values.iter_mut().take(3).enumerate() {
            *v = ((d as f64 - self.mean) / self.sd) as f32;
        }
        values
    }
}

/// Normalize `dosages` into `target` if the marker passes QC.
///
/// Returns false (leaving `target` untouched) for filtered markers.
pub fn normalize_dosages(dosages: &[u8], maf_threshold: f64, target: &mut [f32]) -> bool {
    let counts = GenotypeCounts::from_dosages(dosages);
    let Some(standardizer) = Standardizer::fit(&counts, maf_threshold) else {
        return false;
    };
    let values = standardizer.table();
    for (out, &d) in target.iter_mut().zip(dosages) {
        *out = values[d.min(MISSING) as usize];
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts() {
        let counts = GenotypeCounts::from_dosages(&[0, 1, 2, 2, MISSING]);
        assert_eq!(counts.counts, [1, 1, 2, 1]);
        assert_eq!(counts.n_observed(), 4);
        assert_eq!(counts.n_classes(), 3);
        assert!((counts.allele_freq() - 5.0 / 8.0).abs() < 1e-12);
        assert!((counts.maf() - 3.0 / 8.0).abs() < 1e-12);
    }

    #[test]
    fn test_monomorphic_rejected() {
        let mut out = vec![9.0f32; 4];
        assert!(!normalize_dosages(&[1, 1, 1, 1], 0.0, &mut out));
        assert_eq!(out, vec![9.0; 4]);
    }

    #[test]
    fn test_maf_filter() {
        // one heterozygote among 20 individuals: maf = 1/40
        let mut dosages = vec![0u8; 20];
        dosages[3] = 1;
        let mut out = vec![0.0f32; 20];
        assert!(!normalize_dosages(&dosages, 0.05, &mut out));
        assert!(normalize_dosages(&dosages, 0.0, &mut out));
    }

    #[test]
    fn test_normalized_column_has_unit_variance() {
        let dosages = [0u8, 1, 2, 1, 0, 2, 1, 1];
        let mut out = vec![0.0f32; dosages.len()];
        assert!(normalize_dosages(&dosages, 0.01, &mut out));

        let n = out.len() as f64;
        let mean: f64 = out.iter().map(|&v| v as f64).sum::<f64>() / n;
        let ss: f64 = out.iter().map(|&v| (v as f64) * (v as f64)).sum();
        assert!(mean.abs() < 1e-6);
        assert!((ss / (n - 1.0) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_missing_normalizes_to_zero() {
        let dosages = [0u8, 2, MISSING, 1, 2, 0];
        let mut out = vec![1.0f32; dosages.len()];
        assert!(normalize_dosages(&dosages, 0.0, &mut out));
        assert_eq!(out[2], 0.0);
    }

    #[test]
    fn test_missing_calls_count_towards_mean() {
        // sum = 6 over 8 individuals: mean = 0.75
        // sq = 10 + 2 * 0.75² = 11.125; var = (11.125 - 0.75 * 6) / 7
        let dosages = [0u8, 2, MISSING, 1, 2, 0, MISSING, 1];
        let counts = GenotypeCounts::from_dosages(&dosages);
        let standardizer = Standardizer::fit(&counts, 0.0).unwrap();
        let sd = (6.625f64 / 7.0).sqrt();
        assert!((standardizer.mean - 0.75).abs() < 1e-12);
        assert!((standardizer.sd - sd).abs() < 1e-12);

        let mut out = vec![9.0f32; dosages.len()];
        assert!(normalize_dosages(&dosages, 0.0, &mut out));
        let expected = [-0.771, 1.285, 0.0, 0.257, 1.285, -0.771, 0.0, 0.257];
        for (got, want) in out.iter().zip(expected) {
            assert!((*got as f64 - want).abs() < 1e-3, "got {}, expected {}", got, want);
        }
    }
}
