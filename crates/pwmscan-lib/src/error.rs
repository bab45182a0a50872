//! Error type for scanning operations

use thiserror::Error;

/// Errors raised before any scanning work is dispatched
///
/// Every variant is a caller contract violation or a failed precondition.
/// Once scoring starts nothing can fail, so there is no partial result.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScanError {
    /// The alphabet has no symbols
    #[error("Alphabet must contain at least one symbol")]
    EmptyAlphabet,

    /// The scan configuration is invalid
    #[error("Invalid scan configuration: {0}")]
    InvalidConfiguration(String),

    /// `|alphabet|^k` does not fit the symbol type
    #[error("Composite alphabet size {size}^{k} overflows the symbol range")]
    RadixOverflow {
        /// Alphabet size
        size: usize,
        /// Scoring order
        k: usize,
    },

    /// A score matrix could not be built
    #[error("Invalid score matrix: {0}")]
    InvalidMatrix(String),

    /// A matrix row does not have one column per (composite) symbol
    #[error("Motif {motif} has rows of length {actual}, expected {expected} for this alphabet and k")]
    RowLengthMismatch {
        /// 1-based motif index
        motif: usize,
        /// Required row length (`|alphabet|^k`)
        expected: usize,
        /// Row length of the matrix
        actual: usize,
    },

    /// Thresholds and matrices are not paired one to one
    #[error("Number of thresholds ({thresholds}) does not match number of motifs ({motifs})")]
    ThresholdCountMismatch {
        /// Number of thresholds supplied
        thresholds: usize,
        /// Number of motifs supplied
        motifs: usize,
    },

    /// A threshold is NaN or infinite
    #[error("Threshold for motif {motif} is not finite: {value}")]
    NonFiniteThreshold {
        /// 1-based motif index
        motif: usize,
        /// Offending value
        value: f64,
    },

    /// A sequence cannot hold even one window of some motif
    #[error(
        "Found sequence(s) shorter than the width of the motif(s): sequence {sequence} \
         has length {length}, motif {motif} spans {width}"
    )]
    SequenceTooShort {
        /// 1-based sequence index
        sequence: usize,
        /// Sequence length in raw characters
        length: usize,
        /// 1-based motif index
        motif: usize,
        /// Motif span in raw characters
        width: usize,
    },

    /// The rayon pool could not be created
    #[error("Failed to create thread pool: {0}")]
    ThreadPool(String),
}
