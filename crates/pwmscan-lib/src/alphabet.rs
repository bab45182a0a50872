//! Alphabet encoding
//!
//! Maps raw sequence bytes to symbol indices in `[0, |alphabet|)`.
//! Characters outside the alphabet become [`UNRECOGNIZED`]. Matching is
//! exact and case-sensitive; if the alphabet repeats a character, its first
//! occurrence wins.

use crate::constants::UNRECOGNIZED;
use crate::error::ScanError;
use rayon::prelude::*;
use tracing::debug;

/// An ordered set of symbol characters defining the symbol radix
#[derive(Clone)]
pub struct Alphabet {
    symbols: Vec<u8>,
    lookup: [i32; 256],
}

impl Alphabet {
    /// Build an alphabet from its symbols, in index order
    ///
    /// # Errors
    /// Returns [`ScanError::EmptyAlphabet`] if `symbols` is empty
    pub fn new(symbols: &[u8]) -> Result<Self, ScanError> {
        if symbols.is_empty() {
            return Err(ScanError::EmptyAlphabet);
        }

        let mut lookup = [UNRECOGNIZED; 256];
        for (index, &symbol) in symbols.iter().enumerate() {
            let slot = &mut lookup[symbol as usize];
            if *slot == UNRECOGNIZED {
                *slot = index as i32;
            } else {
                debug!(
                    "Alphabet repeats {:?} at index {}; keeping index {}",
                    symbol as char, index, *slot
                );
            }
        }

        Ok(Self { symbols: symbols.to_vec(), lookup })
    }

    /// Number of symbols (the radix of a single encoded position)
    #[inline]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Always false; an alphabet is never empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Symbols in index order
    pub fn symbols(&self) -> &[u8] {
        &self.symbols
    }

    /// Encode a single character
    #[inline]
    pub fn encode_symbol(&self, byte: u8) -> i32 {
        self.lookup[byte as usize]
    }

    /// Encode a sequence, returning its symbol stream
    pub fn encode(&self, sequence: &[u8]) -> EncodedSequence {
        let mut symbols = Vec::with_capacity(sequence.len());
        let mut num_unrecognized = 0usize;
        for &byte in sequence {
            let code = self.encode_symbol(byte);
            if code == UNRECOGNIZED {
                num_unrecognized += 1;
            }
            symbols.push(code);
        }
        EncodedSequence { symbols, num_unrecognized }
    }

    /// Encode every sequence in parallel
    ///
    /// Runs on the current rayon pool. The returned batch keeps input order.
    pub fn encode_all<S>(&self, sequences: &[S]) -> EncodedBatch
    where
        S: AsRef<[u8]> + Sync,
    {
        let encoded: Vec<EncodedSequence> = sequences
            .par_iter()
            .map(|seq| self.encode(seq.as_ref()))
            .collect();

        let sequences_with_unrecognized =
            encoded.iter().filter(|e| e.has_unrecognized()).count();
        let streams = encoded.into_iter().map(|e| e.symbols).collect();

        EncodedBatch { streams, sequences_with_unrecognized }
    }
}

impl std::fmt::Debug for Alphabet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Alphabet")
            .field(&String::from_utf8_lossy(&self.symbols))
            .finish()
    }
}

impl std::str::FromStr for Alphabet {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.as_bytes())
    }
}

/// One encoded sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedSequence {
    /// Symbol indices, or [`UNRECOGNIZED`]
    pub symbols: Vec<i32>,
    /// Number of characters outside the alphabet
    pub num_unrecognized: usize,
}

impl EncodedSequence {
    /// Whether any character fell outside the alphabet
    pub fn has_unrecognized(&self) -> bool {
        self.num_unrecognized > 0
    }
}

/// Encoded streams for a whole scan, plus the global sentinel flag
#[derive(Debug, Clone)]
pub struct EncodedBatch {
    /// One stream per input sequence, in input order
    pub streams: Vec<Vec<i32>>,
    /// Number of sequences that contained at least one unrecognized character
    pub sequences_with_unrecognized: usize,
}

impl EncodedBatch {
    /// Whether any sequence contained an unrecognized character
    pub fn any_unrecognized(&self) -> bool {
        self.sequences_with_unrecognized > 0
    }
}
