//! Sliding-window scoring of one encoded stream against one matrix

use crate::constants::{UNRECOGNIZED, UNRECOGNIZED_PENALTY};
use crate::matrix::ScoreMatrix;
use crate::policy::ScoringPolicy;

/// Number of windows a matrix of `width` positions has over `stream_len`
/// meaningful symbols
#[inline]
pub fn num_windows(stream_len: usize, width: usize) -> usize {
    (stream_len + 1).saturating_sub(width)
}

/// Score every window of `stream` against `matrix`
///
/// `stream` must hold only the meaningful (recoded) symbols, and every
/// symbol must be below `matrix.row_len()` or, under a sentinel-aware
/// policy, equal to [`UNRECOGNIZED`]. Both are validated once by the
/// scanner, not here.
///
/// The score at offset `i` is `Σ_p matrix[p][stream[i + p]]` in fixed point.
/// Under [`SentinelAware`](crate::policy::SentinelAware) each sentinel in
/// the window contributes [`UNRECOGNIZED_PENALTY`] instead.
pub fn score_windows<P: ScoringPolicy>(matrix: &ScoreMatrix, stream: &[i32]) -> Vec<i64> {
    let width = matrix.width();
    let row_len = matrix.row_len();
    let flat = matrix.as_flat();

    let n = num_windows(stream.len(), width);
    let mut scores = Vec::with_capacity(n);

    for window in stream.windows(width) {
        let mut total = 0i64;
        for (pos, &symbol) in window.iter().enumerate() {
            if P::SENTINEL_AWARE && symbol == UNRECOGNIZED {
                total += UNRECOGNIZED_PENALTY;
            } else {
                total += flat[pos * row_len + symbol as usize] as i64;
            }
        }
        scores.push(total);
    }

    debug_assert_eq!(scores.len(), n);
    scores
}
