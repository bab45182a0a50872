//! Fixed-point score matrices
//!
//! A [`ScoreMatrix`] holds one row per motif position and one column per
//! (composite) symbol. Caller scores are scaled by
//! [`SCORE_SCALE`](crate::constants::SCORE_SCALE) and truncated toward zero
//! once, at construction, so that window sums are exact integer arithmetic.

use crate::constants::{from_fixed, to_fixed, NONFINITE_FLOOR, SCORE_SCALE};
use crate::error::ScanError;

/// A motif's position-by-symbol score table in fixed point
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreMatrix {
    /// Optional display name
    name: Option<String>,
    /// Flattened rows: `scores[pos * row_len + symbol]`
    scores: Vec<i32>,
    /// Number of positions
    width: usize,
    /// Number of (composite) symbols per position
    row_len: usize,
    /// Whether any entry came from `-inf`
    has_nonfinite: bool,
}

impl ScoreMatrix {
    /// Build a matrix from rows of caller scores, one row per position
    ///
    /// # Errors
    /// Returns [`ScanError::InvalidMatrix`] if there are no positions, rows
    /// are empty or ragged, a score is non-finite, or a scaled score does not
    /// fit in `i32`. `-inf` is accepted when `allow_nonfinite` is set and maps
    /// to [`NONFINITE_FLOOR`](crate::constants::NONFINITE_FLOOR); the scanner
    /// then also requires
    /// [`ScanConfiguration::allow_nonfinite`](crate::ScanConfiguration::allow_nonfinite).
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R], allow_nonfinite: bool) -> Result<Self, ScanError> {
        let Some(first) = rows.first() else {
            return Err(ScanError::InvalidMatrix(
                "score matrix must have at least one position".into(),
            ));
        };
        let row_len = first.as_ref().len();
        if row_len == 0 {
            return Err(ScanError::InvalidMatrix(
                "score matrix rows must have at least one column".into(),
            ));
        }

        let mut scores = Vec::with_capacity(rows.len() * row_len);
        let mut has_nonfinite = false;
        for (pos, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != row_len {
                return Err(ScanError::InvalidMatrix(format!(
                    "position {} has {} scores, expected {}",
                    pos + 1,
                    row.len(),
                    row_len
                )));
            }
            for &value in row {
                has_nonfinite |= value == f64::NEG_INFINITY;
                scores.push(scale_score(value, pos, allow_nonfinite)?);
            }
        }

        Ok(Self { name: None, scores, width: rows.len(), row_len, has_nonfinite })
    }

    /// Attach a display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Display name, if any
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Number of positions (window length in scored units)
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of columns per position
    #[inline]
    pub fn row_len(&self) -> usize {
        self.row_len
    }

    /// Window span in raw characters when scored at order `k`
    #[inline]
    pub fn raw_width(&self, k: usize) -> usize {
        self.width + k.saturating_sub(1)
    }

    /// Whether any entry was `-inf` in the caller's scores
    #[inline]
    pub fn has_nonfinite(&self) -> bool {
        self.has_nonfinite
    }

    /// Fixed-point row for one position
    #[inline]
    pub fn row(&self, pos: usize) -> &[i32] {
        &self.scores[pos * self.row_len..(pos + 1) * self.row_len]
    }

    /// Fixed-point scores, flattened row-major
    #[inline]
    pub fn as_flat(&self) -> &[i32] {
        &self.scores
    }

    /// Best attainable window score, in caller units
    pub fn max_score(&self) -> f64 {
        let total: i64 = (0..self.width)
            .map(|p| self.row(p).iter().copied().max().unwrap_or(0) as i64)
            .sum();
        from_fixed(total)
    }

    /// Worst attainable window score over recognized symbols, in caller units
    pub fn min_score(&self) -> f64 {
        let total: i64 = (0..self.width)
            .map(|p| self.row(p).iter().copied().min().unwrap_or(0) as i64)
            .sum();
        from_fixed(total)
    }
}

fn scale_score(value: f64, pos: usize, allow_nonfinite: bool) -> Result<i32, ScanError> {
    if value.is_finite() {
        let scaled = (value * SCORE_SCALE).trunc();
        if scaled < i32::MIN as f64 || scaled > i32::MAX as f64 {
            return Err(ScanError::InvalidMatrix(format!(
                "position {} score {} is out of range after scaling by {}",
                pos + 1,
                value,
                SCORE_SCALE
            )));
        }
        return Ok(to_fixed(value));
    }
    if allow_nonfinite && value == f64::NEG_INFINITY {
        return Ok(NONFINITE_FLOOR);
    }
    Err(ScanError::InvalidMatrix(format!(
        "position {} contains non-finite score {}",
        pos + 1,
        value
    )))
}
