//! # PLINK Binary Fileset Reader
//!
//! Reads a `.bed/.bim/.fam` triple and serves it as a `GenotypeSource`.
//!
//! Format:
//! - `.fam`: one line per individual (only the count is used)
//! - `.bim`: one line per marker; the 4th whitespace-separated field is the
//!   base-pair position. Markers with a non-numeric or non-positive position
//!   are never retained.
//! - `.bed`: [Magic 2 bytes] `0x6c 0x1b`, [Mode 1 byte] `0x01` (SNP-major),
//!   then one block of `ceil(n_indiv / 4)` bytes per marker with 2-bit calls,
//!   lowest bits first: `00` hom, `01` missing, `10` het, `11` hom.
//!
//! The `.bed` file is memory-mapped; pages are decoded on demand.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use memmap2::Mmap;
use tracing::{debug, info};

use crate::data::{normalize_dosages, ColumnPage, MarkerPosition, MISSING};
use crate::error::{LdBlockError, Result};
use crate::io::source::{fill_page, GenotypeSource, PageLoad};

const MAGIC: [u8; 2] = [0x6c, 0x1b];
const SNP_MAJOR: u8 = 1;
const HEADER_LEN: usize = 3;

/// Dosage for each 2-bit code
const CODE_TO_DOSAGE: [u8; 4] = [0, MISSING, 1, 2];

/// Paths of the three fileset members for a prefix
pub fn fileset_paths(prefix: &Path) -> [PathBuf; 3] {
    let with_suffix = |suffix: &str| {
        let mut name = prefix.as_os_str().to_owned();
        name.push(suffix);
        PathBuf::from(name)
    };
    [with_suffix(".bed"), with_suffix(".bim"), with_suffix(".fam")]
}

/// Genotype source backed by a PLINK binary fileset
pub struct PlinkSource {
    mmap: Mmap,
    n_samples: usize,
    /// Bytes per marker in the .bed file
    block_len: usize,
    /// Base-pair position per full-data marker; 0 means unusable
    positions: Vec<u32>,
    bounds: (u32, u32),
    maf_threshold: f64,
    /// Decoded calls of the marker being processed
    dosages: Vec<u8>,
    /// Per-byte lookup of the four calls it packs
    decode: [[u8; 4]; 256],
}

impl PlinkSource {
    /// Open the fileset `<prefix>.bed/.bim/.fam`
    pub fn open(prefix: &Path, maf_threshold: f64) -> Result<Self> {
        let [bed_path, bim_path, fam_path] = fileset_paths(prefix);
        for path in [&bed_path, &bim_path, &fam_path] {
            if !path.is_file() {
                return Err(LdBlockError::FileNotFound { path: path.clone() });
            }
        }

        let n_samples = read_fam(&fam_path)?;
        let positions = read_bim(&bim_path)?;
        let n_markers = positions.len();
        let n_valid = positions.iter().filter(|&&p| p > 0).count();
        info!(
            "found {} individuals and {} SNPs (out of {}) in {}",
            n_samples,
            n_valid,
            n_markers,
            prefix.display()
        );

        let file = File::open(&bed_path)?;
        // SAFETY: the mapping is read-only and the file is not modified while mapped
        let mmap = unsafe { Mmap::map(&file)? };

        if mmap.len() < HEADER_LEN || mmap[0..2] != MAGIC {
            return Err(LdBlockError::genotype("file is not a valid .bed file"));
        }
        match mmap[2] {
            SNP_MAJOR => {}
            0 => return Err(LdBlockError::genotype("file is in individual-major format")),
            _ => return Err(LdBlockError::genotype("file-format specifier is not valid")),
        }

        let block_len = n_samples.div_ceil(4);
        let expected = block_len * n_markers + HEADER_LEN;
        if mmap.len() != expected {
            return Err(LdBlockError::genotype(format!(
                "size of .bed file ({} bytes) is inconsistent with {} SNPs and {} individuals (expected {} bytes)",
                mmap.len(),
                n_markers,
                n_samples,
                expected
            )));
        }

        let first = positions.iter().copied().find(|&p| p > 0).unwrap_or(0);
        let last = positions.iter().rev().copied().find(|&p| p > 0).unwrap_or(0);

        let mut decode = [[0u8; 4]; 256];
        for (byte, calls) in decode.iter_mut().enumerate() {
            for (j, call) in calls.iter_mut().enumerate() {
                *call = CODE_TO_DOSAGE[(byte >> (2 * j)) & 3];
            }
        }

        Ok(Self {
            mmap,
            n_samples,
            block_len,
            positions,
            bounds: (first, last),
            maf_threshold,
            dosages: vec![0; n_samples],
            decode,
        })
    }
}

/// Count individuals in a .fam file
fn read_fam(path: &Path) -> Result<usize> {
    let reader = BufReader::new(File::open(path)?);
    let mut count = 0;
    for line in reader.lines() {
        line?;
        count += 1;
    }
    if count < 2 {
        return Err(LdBlockError::genotype(format!(
            "{} lists {} individuals; at least 2 are required",
            path.display(),
            count
        )));
    }
    Ok(count)
}

/// Read marker positions from a .bim file
fn read_bim(path: &Path) -> Result<Vec<u32>> {
    let reader = BufReader::new(File::open(path)?);
    let mut positions = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let field = line
            .split_whitespace()
            .nth(3)
            .ok_or_else(|| LdBlockError::parse(line_no + 1, "not enough values on line"))?;
        let pos = match field.parse::<i64>() {
            Ok(p) if p > 0 && p <= u32::MAX as i64 => p as u32,
            _ => {
                debug!("skipping SNP on line {} with position '{}'", line_no + 1, field);
                0
            }
        };
        positions.push(pos);
    }
    Ok(positions)
}

impl GenotypeSource for PlinkSource {
    fn n_samples(&self) -> usize {
        self.n_samples
    }

    fn n_markers(&self) -> usize {
        self.positions.len()
    }

    fn maf_threshold(&self) -> f64 {
        self.maf_threshold
    }

    fn set_maf_threshold(&mut self, threshold: f64) {
        self.maf_threshold = threshold;
    }

    fn position_bounds(&self) -> (u32, u32) {
        self.bounds
    }

    fn load(
        &mut self,
        page: &mut ColumnPage,
        positions: &mut Vec<MarkerPosition>,
        offset: usize,
        total: usize,
        end: usize,
    ) -> Result<PageLoad> {
        let n_samples = self.n_samples;
        let block_len = self.block_len;
        let maf = self.maf_threshold;
        let bim = &self.positions;
        let mmap = &self.mmap;
        let decode = &self.decode;
        let dosages = &mut self.dosages;

        fill_page(
            page,
            positions,
            n_samples,
            bim.len(),
            offset,
            total,
            end,
            |idx, slot| {
                let pos = bim[idx];
                if pos == 0 {
                    return Ok(None);
                }
                let start = HEADER_LEN + idx * block_len;
                let raw = &mmap[start..start + block_len];
                for (i, call) in dosages.iter_mut().enumerate() {
                    *call = decode[raw[i / 4] as usize][i % 4];
                }
                Ok(normalize_dosages(dosages.as_slice(), maf, slot).then_some(pos))
            },
        )
    }
}
