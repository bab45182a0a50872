//! Scan orchestration
//!
//! Coordinates the pipeline for one scan call:
//! 1. Validate inputs (all fatal errors are raised here, before any work)
//! 2. Encode sequences in parallel and settle the global sentinel flag
//! 3. Recode to composite symbols when k > 1
//! 4. Score every (motif, sequence) pair in parallel
//! 5. Extract hits in motif/sequence/offset order and slice matches

use crate::{
    alphabet::Alphabet,
    config::ScanConfiguration,
    constants::threshold_to_fixed,
    dispatch_on_mode,
    error::ScanError,
    hits::{attach_matches, extract_hits, HitTable, ScanNotice, ScoreVectors},
    matrix::ScoreMatrix,
    policy::{ScoringMode, ScoringPolicy},
    recode::{composite_radix, recode_all, recoded_len},
    scorer::score_windows,
};
use rayon::prelude::*;
use tracing::{debug, info, warn};

/// Scans sequences against score matrices
pub struct Scanner {
    config: ScanConfiguration,
}

/// Score vectors for every (motif, sequence) pair, before thresholding
#[derive(Debug, Clone)]
pub struct ScoredBatch {
    /// Fixed-point scores indexed `[motif][sequence][offset]`
    pub scores: ScoreVectors,
    /// Scoring path chosen for the whole call
    pub mode: ScoringMode,
    /// Number of sequences containing characters outside the alphabet
    pub sequences_with_unrecognized: usize,
}

impl Scanner {
    /// Create a new scanner with the given configuration
    pub fn new(config: ScanConfiguration) -> Result<Self, ScanError> {
        config.validate().map_err(ScanError::InvalidConfiguration)?;
        Ok(Self { config })
    }

    /// The scanner's configuration
    pub fn config(&self) -> &ScanConfiguration {
        &self.config
    }

    /// Scan `sequences` against `matrices` and return every qualifying hit
    ///
    /// `thresholds[m]` is the cutoff for `matrices[m]`, in caller units.
    ///
    /// # Parallelism
    /// The number of threads is controlled by `config.num_threads`:
    /// - `0`: use all available CPU cores (rayon default)
    /// - `N`: use exactly N threads
    ///
    /// # Errors
    /// Any contract violation or a sequence shorter than a motif's raw width
    /// aborts the call before scanning starts; no partial table is returned.
    pub fn scan<S>(
        &self,
        matrices: &[ScoreMatrix],
        sequences: &[S],
        thresholds: &[f64],
        alphabet: &Alphabet,
    ) -> Result<HitTable, ScanError>
    where
        S: AsRef<[u8]> + Sync,
    {
        self.validate_thresholds(matrices, thresholds)?;
        self.validate_inputs(matrices, sequences, alphabet)?;

        let pool = self.build_pool()?;
        Ok(pool.install(|| self.scan_inner(matrices, sequences, thresholds, alphabet)))
    }

    /// Compute score vectors for every (motif, sequence) pair
    ///
    /// Performs the same validation as [`Scanner::scan`] except for
    /// thresholds.
    pub fn score<S>(
        &self,
        matrices: &[ScoreMatrix],
        sequences: &[S],
        alphabet: &Alphabet,
    ) -> Result<ScoredBatch, ScanError>
    where
        S: AsRef<[u8]> + Sync,
    {
        self.validate_inputs(matrices, sequences, alphabet)?;

        let pool = self.build_pool()?;
        Ok(pool.install(|| self.score_inner(matrices, sequences, alphabet)))
    }

    fn build_pool(&self) -> Result<rayon::ThreadPool, ScanError> {
        // num_threads == 0 means "all cores" (rayon default).
        rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.num_threads)
            .build()
            .map_err(|e| ScanError::ThreadPool(e.to_string()))
    }

    fn validate_thresholds(&self, matrices: &[ScoreMatrix], thresholds: &[f64]) -> Result<(), ScanError> {
        if thresholds.len() != matrices.len() {
            return Err(ScanError::ThresholdCountMismatch {
                thresholds: thresholds.len(),
                motifs: matrices.len(),
            });
        }
        for (i, &value) in thresholds.iter().enumerate() {
            if !value.is_finite() {
                return Err(ScanError::NonFiniteThreshold { motif: i + 1, value });
            }
        }
        Ok(())
    }

    fn validate_inputs<S: AsRef<[u8]>>(
        &self,
        matrices: &[ScoreMatrix],
        sequences: &[S],
        alphabet: &Alphabet,
    ) -> Result<(), ScanError> {
        let k = self.config.k;
        let radix = composite_radix(alphabet.len(), k)?;

        for (i, matrix) in matrices.iter().enumerate() {
            if matrix.has_nonfinite() && !self.config.allow_nonfinite {
                return Err(ScanError::InvalidMatrix(format!(
                    "motif {} contains -inf scores but non-finite scores are not allowed",
                    i + 1
                )));
            }
            if matrix.row_len() != radix {
                return Err(ScanError::RowLengthMismatch {
                    motif: i + 1,
                    expected: radix,
                    actual: matrix.row_len(),
                });
            }
        }

        for (i, matrix) in matrices.iter().enumerate() {
            let width = matrix.raw_width(k);
            for (j, seq) in sequences.iter().enumerate() {
                let length = seq.as_ref().len();
                if length < width {
                    return Err(ScanError::SequenceTooShort {
                        sequence: j + 1,
                        length,
                        motif: i + 1,
                        width,
                    });
                }
            }
        }

        Ok(())
    }

    /// Inner scan logic, runs inside the rayon thread pool
    fn scan_inner<S>(
        &self,
        matrices: &[ScoreMatrix],
        sequences: &[S],
        thresholds: &[f64],
        alphabet: &Alphabet,
    ) -> HitTable
    where
        S: AsRef<[u8]> + Sync,
    {
        self.config.print();
        info!("Scanning {} sequence(s) against {} motif(s)", sequences.len(), matrices.len());

        let batch = self.score_inner(matrices, sequences, alphabet);

        let mut notices = Vec::new();
        if batch.sequences_with_unrecognized > 0 && self.config.warn_on_unrecognized {
            let notice = ScanNotice::UnrecognizedSymbols {
                sequences: batch.sequences_with_unrecognized,
            };
            warn!("{}", notice);
            notices.push(notice);
        }

        let fixed_thresholds: Vec<i64> = thresholds.iter().map(|&t| threshold_to_fixed(t)).collect();
        let raw_hits = extract_hits(&batch.scores, &fixed_thresholds);

        let raw_widths: Vec<usize> = matrices.iter().map(|m| m.raw_width(self.config.k)).collect();
        let hits = attach_matches(&raw_hits, sequences, &raw_widths);

        let mut stats = ScanStatistics::new();
        stats.add_sequences(sequences);
        stats.add_scores(&batch.scores);
        stats.num_hits = hits.len() as u64;
        stats.sequences_with_unrecognized = batch.sequences_with_unrecognized as u64;
        stats.print_summary();

        let motif_names = matrices
            .iter()
            .enumerate()
            .map(|(i, m)| m.name().map_or_else(|| (i + 1).to_string(), str::to_string))
            .collect();

        HitTable::new(hits, motif_names, notices)
    }

    fn score_inner<S>(&self, matrices: &[ScoreMatrix], sequences: &[S], alphabet: &Alphabet) -> ScoredBatch
    where
        S: AsRef<[u8]> + Sync,
    {
        let k = self.config.k;

        // Phase 1: encoding; the sentinel flag is final once this returns
        let mut encoded = alphabet.encode_all(sequences);
        let mode = ScoringMode::from_unrecognized(encoded.any_unrecognized());
        debug!(
            "Encoded {} sequence(s); {} with unrecognized characters; scoring mode {}",
            encoded.streams.len(),
            encoded.sequences_with_unrecognized,
            mode
        );

        if k > 1 {
            dispatch_on_mode!(mode, P => {
                recode_all::<P>(&mut encoded.streams, k, alphabet.len())
            });
        }

        // Phase 2: scoring
        let scores = dispatch_on_mode!(mode, P => {
            score_all::<P>(matrices, &encoded.streams, k)
        });

        ScoredBatch {
            scores,
            mode,
            sequences_with_unrecognized: encoded.sequences_with_unrecognized,
        }
    }
}

/// Score every motif against every stream, one rayon task per motif
fn score_all<P: ScoringPolicy>(matrices: &[ScoreMatrix], streams: &[Vec<i32>], k: usize) -> ScoreVectors {
    matrices
        .par_iter()
        .map(|matrix| {
            streams
                .iter()
                .map(|stream| {
                    let len = recoded_len(stream.len(), k);
                    score_windows::<P>(matrix, &stream[..len])
                })
                .collect()
        })
        .collect()
}

/// Scan with a one-off [`Scanner`]
///
/// Equivalent to `Scanner::new(config.clone())?.scan(..)`.
pub fn scan_sequences<S>(
    matrices: &[ScoreMatrix],
    sequences: &[S],
    thresholds: &[f64],
    alphabet: &Alphabet,
    config: &ScanConfiguration,
) -> Result<HitTable, ScanError>
where
    S: AsRef<[u8]> + Sync,
{
    Scanner::new(config.clone())?.scan(matrices, sequences, thresholds, alphabet)
}

/// Summary counts for a finished scan
#[derive(Debug, Clone, Default)]
pub struct ScanStatistics {
    /// Number of sequences scanned
    pub num_sequences: u64,

    /// Total raw characters across all sequences
    pub total_bases: u64,

    /// Number of motifs
    pub num_motifs: u64,

    /// Number of windows scored across all pairs
    pub num_windows: u64,

    /// Number of windows that passed their threshold
    pub num_hits: u64,

    /// Sequences containing characters outside the alphabet
    pub sequences_with_unrecognized: u64,
}

impl ScanStatistics {
    /// Create a new statistics tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the input sequences
    pub fn add_sequences<S: AsRef<[u8]>>(&mut self, sequences: &[S]) {
        self.num_sequences += sequences.len() as u64;
        self.total_bases += sequences.iter().map(|s| s.as_ref().len() as u64).sum::<u64>();
    }

    /// Record the score vectors
    pub fn add_scores(&mut self, scores: &ScoreVectors) {
        self.num_motifs += scores.len() as u64;
        self.num_windows += scores
            .iter()
            .flat_map(|per_motif| per_motif.iter())
            .map(|v| v.len() as u64)
            .sum::<u64>();
    }

    /// Log statistics summary via tracing
    pub fn print_summary(&self) {
        info!("Scan Statistics:");
        info!("  Sequences: {}", self.num_sequences);
        info!("  Total bases: {}", self.total_bases);
        info!("  Motifs: {}", self.num_motifs);
        info!("  Windows scored: {}", self.num_windows);
        info!("  Hits: {}", self.num_hits);
        if self.sequences_with_unrecognized > 0 {
            info!("  Sequences with unrecognized characters: {}", self.sequences_with_unrecognized);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acgt_matrix() -> ScoreMatrix {
        let mut rows = vec![vec![0.0; 4]; 4];
        for (p, row) in rows.iter_mut().enumerate() {
            row[p] = 10.0;
        }
        ScoreMatrix::from_rows(&rows, false).unwrap()
    }

    fn scanner(k: usize) -> Scanner {
        Scanner::new(ScanConfiguration::new(k).unwrap().with_threads(2)).unwrap()
    }

    #[test]
    fn test_scanner_creation() {
        assert!(Scanner::new(ScanConfiguration::default()).is_ok());
        let bad = ScanConfiguration { k: 0, ..ScanConfiguration::default() };
        assert!(matches!(Scanner::new(bad), Err(ScanError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_exact_matches() {
        let alph = Alphabet::new(b"ACGT").unwrap();
        let table = scanner(1).scan(&[acgt_matrix()], &["ACGTACGT"], &[40.0], &alph).unwrap();

        assert_eq!(table.len(), 2);
        let starts: Vec<_> = table.iter().map(|h| h.start).collect();
        assert_eq!(starts, vec![1, 5]);
        for hit in &table {
            assert_eq!(hit.score, 40.0);
            assert_eq!(hit.matched, "ACGT");
            assert_eq!(hit.stop - hit.start + 1, 4);
        }
        assert!(table.notices().is_empty());
        assert_eq!(table.motif_name(1), "1");
    }

    #[test]
    fn test_unrecognized_notice() {
        let alph = Alphabet::new(b"ACGT").unwrap();
        let table = scanner(1).scan(&[acgt_matrix()], &["ACGNACGT"], &[40.0], &alph).unwrap();

        assert_eq!(table.notices(), &[ScanNotice::UnrecognizedSymbols { sequences: 1 }]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.hits()[0].start, 5);
        assert_eq!(table.hits()[0].score, 40.0);
    }

    #[test]
    fn test_notice_suppressed() {
        let alph = Alphabet::new(b"ACGT").unwrap();
        let config = ScanConfiguration { warn_on_unrecognized: false, ..ScanConfiguration::default() };
        let table = Scanner::new(config)
            .unwrap()
            .scan(&[acgt_matrix()], &["ACGNACGT"], &[40.0], &alph)
            .unwrap();
        assert!(table.notices().is_empty());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_sequence_too_short() {
        let alph = Alphabet::new(b"ACGT").unwrap();
        let err = scanner(1).scan(&[acgt_matrix()], &["ACG"], &[40.0], &alph).unwrap_err();
        assert_eq!(err, ScanError::SequenceTooShort { sequence: 1, length: 3, motif: 1, width: 4 });
    }

    #[test]
    fn test_contract_violations() {
        let alph = Alphabet::new(b"ACGT").unwrap();
        let s = scanner(1);

        let err = s.scan(&[acgt_matrix()], &["ACGTACGT"], &[], &alph).unwrap_err();
        assert_eq!(err, ScanError::ThresholdCountMismatch { thresholds: 0, motifs: 1 });

        let err = s.scan(&[acgt_matrix()], &["ACGTACGT"], &[f64::NAN], &alph).unwrap_err();
        assert!(matches!(err, ScanError::NonFiniteThreshold { motif: 1, .. }));

        let rna = Alphabet::new(b"ACGUN").unwrap();
        let err = s.scan(&[acgt_matrix()], &["ACGTACGT"], &[1.0], &rna).unwrap_err();
        assert_eq!(err, ScanError::RowLengthMismatch { motif: 1, expected: 5, actual: 4 });
    }

    #[test]
    fn test_nonfinite_matrix_requires_config() {
        let alph = Alphabet::new(b"ACGT").unwrap();
        let m = ScoreMatrix::from_rows(&[[f64::NEG_INFINITY, 1.0, 1.0, 1.0]], true).unwrap();

        let err = scanner(1).scan(&[m.clone()], &["CCAGT"], &[1.0], &alph).unwrap_err();
        assert!(matches!(err, ScanError::InvalidMatrix(_)));

        let config = ScanConfiguration { allow_nonfinite: true, ..ScanConfiguration::default() };
        let table = Scanner::new(config).unwrap().scan(&[m], &["CCAGT"], &[1.0], &alph).unwrap();
        // The window on A scores the floor and never passes
        let starts: Vec<_> = table.iter().map(|h| h.start).collect();
        assert_eq!(starts, vec![1, 2, 4, 5]);
    }

    #[test]
    fn test_window_counts() {
        let alph = Alphabet::new(b"ACGT").unwrap();
        let seqs = ["ACGTACGTAC", "ACGT", "TTTTTTT"];
        let batch = scanner(1).score(&[acgt_matrix()], &seqs, &alph).unwrap();
        assert_eq!(batch.mode, ScoringMode::Strict);
        let lens: Vec<_> = batch.scores[0].iter().map(Vec::len).collect();
        assert_eq!(lens, vec![7, 1, 4]);
    }

    #[test]
    fn test_higher_order_scan() {
        // Dinucleotide matrix, 3 positions => 4 raw characters; rewards "GATC"
        let alph = Alphabet::new(b"ACGT").unwrap();
        let ga = 2 * 4;
        let at = 3;
        let tc = 3 * 4 + 1;
        let mut rows = vec![vec![0.0; 16]; 3];
        rows[0][ga] = 1.0;
        rows[1][at] = 1.0;
        rows[2][tc] = 1.0;
        let m = ScoreMatrix::from_rows(&rows, false).unwrap();

        let table = scanner(2).scan(&[m], &["GGATCC"], &[3.0], &alph).unwrap();
        assert_eq!(table.len(), 1);
        let hit = &table.hits()[0];
        assert_eq!((hit.start, hit.stop), (2, 5));
        assert_eq!(hit.matched, "GATC");
        assert_eq!(hit.score, 3.0);
    }

    #[test]
    fn test_uniform_sentinel_mode() {
        let alph = Alphabet::new(b"ACGT").unwrap();
        let batch = scanner(1).score(&[acgt_matrix()], &["ACGTACGT", "ACGTNNNN"], &alph).unwrap();
        assert_eq!(batch.mode, ScoringMode::SentinelAware);
        assert_eq!(batch.sequences_with_unrecognized, 1);
        // The clean sequence still scores as it would on the strict path
        assert_eq!(batch.scores[0][0], vec![40_000, 0, 0, 0, 40_000]);
    }

    #[test]
    fn test_named_motifs_and_statistics() {
        let alph = Alphabet::new(b"ACGT").unwrap();
        let table = scan_sequences(
            &[acgt_matrix().with_name("box")],
            &["ACGTACGT"],
            &[40.0],
            &alph,
            &ScanConfiguration::default(),
        )
        .unwrap();
        assert_eq!(table.motif_name(1), "box");

        let mut stats = ScanStatistics::new();
        stats.add_sequences(&["ACGT", "ACGTAC"]);
        stats.add_scores(&vec![vec![vec![0], vec![0, 0, 0]]]);
        assert_eq!(stats.num_sequences, 2);
        assert_eq!(stats.total_bases, 10);
        assert_eq!(stats.num_motifs, 1);
        assert_eq!(stats.num_windows, 4);
    }

    #[test]
    fn test_empty_inputs() {
        let alph = Alphabet::new(b"ACGT").unwrap();
        let no_seqs: [&str; 0] = [];
        let table = scanner(1).scan(&[acgt_matrix()], &no_seqs, &[1.0], &alph).unwrap();
        assert!(table.is_empty());

        let table = scanner(1).scan(&[], &["ACGT"], &[], &alph).unwrap();
        assert!(table.is_empty());
    }
}
