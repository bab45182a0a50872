//! Higher-order (k-mer) recoding of encoded streams
//!
//! For an order `k > 1`, each run of `k` symbols starting at offset `j` is
//! collapsed into one composite symbol
//!
//! ```text
//! composite[j] = Σ_{b<k} symbol[j + b] * radix^(k-1-b)
//! ```
//!
//! written back in place at offset `j`. Only the first `len - k + 1`
//! entries of a stream are meaningful afterward. Under the
//! [`SentinelAware`](crate::policy::SentinelAware) policy a window
//! containing the sentinel recodes to the sentinel.

use crate::constants::UNRECOGNIZED;
use crate::error::ScanError;
use crate::policy::ScoringPolicy;
use rayon::prelude::*;

/// Composite radix `base^k`, checked against the `i32` symbol range
///
/// # Errors
/// Returns [`ScanError::RadixOverflow`] if the result does not fit
pub fn composite_radix(base: usize, k: usize) -> Result<usize, ScanError> {
    let overflow = || ScanError::RadixOverflow { size: base, k };
    let k32 = u32::try_from(k).map_err(|_| overflow())?;
    let radix = base.checked_pow(k32).ok_or_else(overflow)?;
    if radix > i32::MAX as usize {
        return Err(overflow());
    }
    Ok(radix)
}

/// Positional weights `base^(k-1-b)` for `b` in `0..k`
pub fn place_values(base: usize, k: usize) -> Vec<i32> {
    let mut weights = vec![1i32; k];
    for b in (0..k.saturating_sub(1)).rev() {
        weights[b] = weights[b + 1] * base as i32;
    }
    weights
}

/// Number of meaningful entries in a stream of `len` raw symbols after
/// recoding with order `k`
#[inline]
pub fn recoded_len(len: usize, k: usize) -> usize {
    (len + 1).saturating_sub(k)
}

/// Recode one stream in place
///
/// `weights` comes from [`place_values`]; its length is the order `k`.
/// Streams shorter than `k` are left untouched.
pub fn recode_in_place<P: ScoringPolicy>(stream: &mut [i32], weights: &[i32]) {
    let k = weights.len();
    if k <= 1 || stream.len() < k {
        return;
    }

    for j in 0..recoded_len(stream.len(), k) {
        let window = &stream[j..j + k];
        let mut composite = 0i32;
        for (&symbol, &weight) in window.iter().zip(weights) {
            if P::SENTINEL_AWARE && symbol == UNRECOGNIZED {
                composite = UNRECOGNIZED;
                break;
            }
            composite += symbol * weight;
        }
        stream[j] = composite;
    }
}

/// Recode every stream in parallel with the same order and radix
///
/// Does nothing for `k <= 1`.
pub fn recode_all<P: ScoringPolicy>(streams: &mut [Vec<i32>], k: usize, base: usize) {
    if k <= 1 {
        return;
    }
    let weights = place_values(base, k);
    streams
        .par_iter_mut()
        .for_each(|stream| recode_in_place::<P>(stream, &weights));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{SentinelAware, Strict};

    #[test]
    fn test_composite_radix() {
        assert_eq!(composite_radix(4, 1).unwrap(), 4);
        assert_eq!(composite_radix(4, 3).unwrap(), 64);
        assert_eq!(composite_radix(20, 2).unwrap(), 400);
        assert!(composite_radix(4, 16).is_err());
        assert!(composite_radix(20, 10).is_err());
    }

    #[test]
    fn test_place_values() {
        assert_eq!(place_values(4, 1), vec![1]);
        assert_eq!(place_values(4, 2), vec![4, 1]);
        assert_eq!(place_values(4, 3), vec![16, 4, 1]);
        assert_eq!(place_values(20, 2), vec![20, 1]);
    }

    #[test]
    fn test_recoded_len() {
        assert_eq!(recoded_len(8, 1), 8);
        assert_eq!(recoded_len(8, 2), 7);
        assert_eq!(recoded_len(8, 8), 1);
        assert_eq!(recoded_len(3, 5), 0);
    }

    #[test]
    fn test_recode_strict_dinucleotides() {
        // ACGT -> AC, CG, GT
        let mut stream = vec![0, 1, 2, 3];
        recode_in_place::<Strict>(&mut stream, &place_values(4, 2));
        assert_eq!(&stream[..3], &[1, 6, 11]);
    }

    #[test]
    fn test_recode_trinucleotides() {
        // TGA = 3*16 + 2*4 + 0 = 56; GAC = 2*16 + 0 + 1 = 33
        let mut stream = vec![3, 2, 0, 1];
        recode_in_place::<Strict>(&mut stream, &place_values(4, 3));
        assert_eq!(&stream[..2], &[56, 33]);
    }

    #[test]
    fn test_recode_sentinel_propagates() {
        let mut stream = vec![0, 1, UNRECOGNIZED, 3, 0];
        recode_in_place::<SentinelAware>(&mut stream, &place_values(4, 2));
        assert_eq!(&stream[..4], &[1, UNRECOGNIZED, UNRECOGNIZED, 12]);
    }

    #[test]
    fn test_policies_agree_on_clean_streams() {
        let original = vec![0, 3, 2, 2, 1, 0, 3];
        let weights = place_values(4, 3);

        let mut strict = original.clone();
        let mut aware = original.clone();
        recode_in_place::<Strict>(&mut strict, &weights);
        recode_in_place::<SentinelAware>(&mut aware, &weights);

        let n = recoded_len(original.len(), 3);
        assert_eq!(&strict[..n], &aware[..n]);
    }

    #[test]
    fn test_homopolymer_recodes_to_constant() {
        let mut stream = vec![2; 10];
        recode_in_place::<Strict>(&mut stream, &place_values(4, 3));
        let n = recoded_len(10, 3);
        assert!(stream[..n].iter().all(|&c| c == 2 * 16 + 2 * 4 + 2));
    }

    #[test]
    fn test_recode_all() {
        let mut streams = vec![vec![0, 1, 2, 3], vec![3, 3], vec![1]];
        recode_all::<Strict>(&mut streams, 2, 4);
        assert_eq!(&streams[0][..3], &[1, 6, 11]);
        assert_eq!(&streams[1][..1], &[15]);
        // Shorter than k: untouched
        assert_eq!(streams[2], vec![1]);

        let mut unchanged = vec![vec![0, 1, 2]];
        recode_all::<Strict>(&mut unchanged, 1, 4);
        assert_eq!(unchanged[0], vec![0, 1, 2]);
    }
}
