//! Shared helpers for integration tests: synthetic genotypes written as PLINK
//! binary filesets.

#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use ldblock::io::plink::fileset_paths;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Base-pair position of full-data marker `m`
pub fn position(m: usize) -> u32 {
    1000 + 100 * m as u32
}

/// Write `<dir>/<name>.bed/.bim/.fam`; one dosage vector (0/1/2, 3 = missing) per marker
pub fn write_fileset(dir: &Path, name: &str, genotypes: &[Vec<u8>]) -> PathBuf {
    let prefix = dir.join(name);
    let [bed, bim, fam] = fileset_paths(&prefix);
    let n = genotypes[0].len();

    let mut f = File::create(fam).unwrap();
    for i in 0..n {
        writeln!(f, "FAM{i} IND{i} 0 0 0 -9").unwrap();
    }
    let mut f = File::create(bim).unwrap();
    for m in 0..genotypes.len() {
        writeln!(f, "22\trs{m}\t0\t{}\tA\tG", position(m)).unwrap();
    }

    let mut bytes = vec![0x6c, 0x1b, 0x01];
    for geno in genotypes {
        let mut block = vec![0u8; n.div_ceil(4)];
        for (i, &d) in geno.iter().enumerate() {
            let code = match d {
                0 => 0b00,
                1 => 0b10,
                2 => 0b11,
                _ => 0b01,
            };
            block[i / 4] |= code << (2 * (i % 4));
        }
        bytes.extend(block);
    }
    std::fs::write(bed, bytes).unwrap();
    prefix
}

/// Blocks of markers copied from one random founder each, with one call
/// changed per marker. Markers of different blocks are unrelated.
pub fn block_genotypes(block_lens: &[usize], n: usize, seed: u64) -> Vec<Vec<u8>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut genotypes = Vec::new();
    for &len in block_lens {
        let founder: Vec<u8> = (0..n).map(|_| rng.gen_range(0..3)).collect();
        for _ in 0..len {
            let mut d = founder.clone();
            let i = rng.gen_range(0..n);
            d[i] = (d[i] + 1) % 3;
            genotypes.push(d);
        }
    }
    genotypes
}

/// A marker carried by a single heterozygous individual
pub fn rare_marker(n: usize) -> Vec<u8> {
    let mut d = vec![0u8; n];
    d[n / 2] = 1;
    d
}
