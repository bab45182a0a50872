// pwmscan: parallel position-weight matrix scanning
//
// Scores biological sequences against score matrices ("motifs") and reports
// every window whose score meets a per-motif threshold.

#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod constants;
pub mod error;
pub mod policy;
pub mod alphabet;
pub mod recode;
pub mod matrix;
pub mod scorer;
pub mod hits;
pub mod config;
pub mod scanner;
pub mod postprocess;
pub mod parse;

// Re-export common types at crate root
pub use alphabet::{Alphabet, EncodedBatch, EncodedSequence};
pub use config::ScanConfiguration;
pub use error::ScanError;
pub use hits::{Hit, HitTable, ScanNotice};
pub use matrix::ScoreMatrix;
pub use policy::{ScoringMode, ScoringPolicy, SentinelAware, Strict};
pub use scanner::{scan_sequences, ScanStatistics, ScoredBatch, Scanner};

/// Version information
pub fn version() -> (u8, u8, u8) {
    constants::VERSION
}
