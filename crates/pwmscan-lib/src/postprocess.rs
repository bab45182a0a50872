//! Helpers applied to hit tables after scanning
//!
//! GC content of matched substrings, start/stop swapping for hits on the
//! reverse strand, and re-insertion of gap placeholders into sequences.

use crate::constants::GAP_PLACEHOLDER;
use crate::hits::Hit;
use anyhow::{bail, Result};

/// Strand a hit was found on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strand {
    /// Forward strand (`+`)
    Forward,
    /// Reverse strand (`-`)
    Reverse,
}

impl Strand {
    /// The conventional one-character label
    pub fn symbol(self) -> char {
        match self {
            Strand::Forward => '+',
            Strand::Reverse => '-',
        }
    }
}

/// A hit tagged with its strand
#[derive(Debug, Clone, PartialEq)]
pub struct StrandedHit {
    /// The hit, in forward-strand coordinates
    pub hit: Hit,
    /// Strand the window was read from
    pub strand: Strand,
}

/// GC fraction of each string
///
/// `G`, `C` and `S` count as GC. By default the denominator is the full
/// string length; with `ignore_ambiguous` only `A/C/G/T/U/S/W` count toward
/// it, and a string without any of them yields NaN.
pub fn gc_content<S: AsRef<[u8]>>(strings: &[S], ignore_ambiguous: bool) -> Vec<f64> {
    strings
        .iter()
        .map(|s| {
            let s = s.as_ref();
            let gc = s.iter().filter(|&&b| matches!(b, b'G' | b'C' | b'S')).count();
            let total = if ignore_ambiguous {
                gc + s.iter().filter(|&&b| matches!(b, b'A' | b'T' | b'U' | b'W')).count()
            } else {
                s.len()
            };
            gc as f64 / total as f64
        })
        .collect()
}

/// Swap start and stop of every reverse-strand hit
///
/// Reverse hits then read from their 5' end, so `start > stop`.
pub fn switch_antisense_coords(hits: &mut [StrandedHit]) {
    for stranded in hits.iter_mut().filter(|h| h.strand == Strand::Reverse) {
        std::mem::swap(&mut stranded.hit.start, &mut stranded.hit.stop);
    }
}

/// Overwrite the given 1-based positions of each sequence with `.`
///
/// `gap_positions[i]` applies to `sequences[i]`.
///
/// # Errors
/// Returns an error if the two slices differ in length or a position is
/// outside its sequence.
pub fn add_gap_dots(sequences: &mut [Vec<u8>], gap_positions: &[Vec<usize>]) -> Result<()> {
    if sequences.len() != gap_positions.len() {
        bail!(
            "Got gap positions for {} sequences, expected {}",
            gap_positions.len(),
            sequences.len()
        );
    }
    for (i, (seq, positions)) in sequences.iter_mut().zip(gap_positions).enumerate() {
        for &pos in positions {
            if pos == 0 || pos > seq.len() {
                bail!(
                    "Gap position {} is outside sequence {} of length {}",
                    pos,
                    i + 1,
                    seq.len()
                );
            }
            seq[pos - 1] = GAP_PLACEHOLDER;
        }
    }
    Ok(())
}

/// Reverse complement of a nucleotide sequence
///
/// Handles upper and lower case IUPAC codes. `U` complements to `A`;
/// unknown characters are kept as they are.
pub fn reverse_complement(sequence: &[u8]) -> Vec<u8> {
    sequence.iter().rev().map(|&b| complement(b)).collect()
}

fn complement(base: u8) -> u8 {
    match base {
        b'A' => b'T',
        b'T' | b'U' => b'A',
        b'C' => b'G',
        b'G' => b'C',
        b'R' => b'Y',
        b'Y' => b'R',
        b'K' => b'M',
        b'M' => b'K',
        b'B' => b'V',
        b'V' => b'B',
        b'D' => b'H',
        b'H' => b'D',
        b'a' => b't',
        b't' | b'u' => b'a',
        b'c' => b'g',
        b'g' => b'c',
        other => other,
    }
}

/// Map a hit found on the reverse complement of a sequence of length
/// `seq_len` back to forward-strand coordinates (`start <= stop`)
pub fn to_forward_coords(hit: &mut Hit, seq_len: usize) {
    let start = seq_len - hit.stop + 1;
    let stop = seq_len - hit.start + 1;
    hit.start = start;
    hit.stop = stop;
}
