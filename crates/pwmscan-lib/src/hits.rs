//! Hit extraction and the hit table
//!
//! Score vectors are walked motif-major, then sequence-major, then by
//! offset. That order is part of the output contract: rows come out sorted
//! by `(motif, sequence, start)` with no duplicates, independent of how the
//! scoring work was scheduled.

use crate::constants::from_fixed;
use std::io::{self, Write};

/// Score vectors indexed `[motif][sequence][offset]`, in fixed point
pub type ScoreVectors = Vec<Vec<Vec<i64>>>;

/// A qualifying window before its substring is sliced (all indices 0-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawHit {
    /// Motif index
    pub motif: usize,
    /// Sequence index
    pub sequence: usize,
    /// Window start offset
    pub offset: usize,
    /// Fixed-point score
    pub score: i64,
}

/// One row of the hit table
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    /// 1-based motif index
    pub motif: usize,
    /// 1-based sequence index
    pub sequence: usize,
    /// 1-based start, in raw characters
    pub start: usize,
    /// 1-based inclusive stop, in raw characters
    pub stop: usize,
    /// Score in caller units
    pub score: f64,
    /// Matched substring from the raw sequence
    pub matched: String,
}

impl Hit {
    /// Window span in raw characters
    pub fn width(&self) -> usize {
        self.stop + 1 - self.start
    }
}

/// Non-fatal conditions observed during a scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanNotice {
    /// Characters outside the alphabet were found and scored as penalties
    UnrecognizedSymbols {
        /// Number of sequences containing at least one such character
        sequences: usize,
    },
}

impl std::fmt::Display for ScanNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanNotice::UnrecognizedSymbols { sequences } => write!(
                f,
                "Non-standard letters detected in {} sequence(s). These were ignored.",
                sequences
            ),
        }
    }
}

/// Collect every window meeting its motif's threshold, in output order
///
/// `thresholds` are fixed-point, one per motif.
pub fn extract_hits(scores: &ScoreVectors, thresholds: &[i64]) -> Vec<RawHit> {
    let mut hits = Vec::new();
    for (motif, per_motif) in scores.iter().enumerate() {
        let threshold = thresholds[motif];
        for (sequence, per_sequence) in per_motif.iter().enumerate() {
            for (offset, &score) in per_sequence.iter().enumerate() {
                if score >= threshold {
                    hits.push(RawHit { motif, sequence, offset, score });
                }
            }
        }
    }
    hits
}

/// Convert raw hits into table rows, slicing matches from the raw sequences
///
/// `raw_widths[m]` is motif `m`'s span in raw characters.
pub fn attach_matches<S: AsRef<[u8]>>(
    raw_hits: &[RawHit],
    sequences: &[S],
    raw_widths: &[usize],
) -> Vec<Hit> {
    raw_hits
        .iter()
        .map(|raw| {
            let width = raw_widths[raw.motif];
            let seq = sequences[raw.sequence].as_ref();
            let matched = String::from_utf8_lossy(&seq[raw.offset..raw.offset + width]).into_owned();
            Hit {
                motif: raw.motif + 1,
                sequence: raw.sequence + 1,
                start: raw.offset + 1,
                stop: raw.offset + width,
                score: from_fixed(raw.score),
                matched,
            }
        })
        .collect()
}

/// The result of a scan
#[derive(Debug, Clone, Default)]
pub struct HitTable {
    hits: Vec<Hit>,
    motif_names: Vec<String>,
    notices: Vec<ScanNotice>,
}

impl HitTable {
    /// Assemble a table; `motif_names[m]` labels motif `m + 1`
    pub fn new(hits: Vec<Hit>, motif_names: Vec<String>, notices: Vec<ScanNotice>) -> Self {
        Self { hits, motif_names, notices }
    }

    /// Number of hits
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    /// Whether no window passed its threshold
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Hits in output order
    pub fn hits(&self) -> &[Hit] {
        &self.hits
    }

    /// Iterate hits in output order
    pub fn iter(&self) -> std::slice::Iter<'_, Hit> {
        self.hits.iter()
    }

    /// Take ownership of the hits
    pub fn into_hits(self) -> Vec<Hit> {
        self.hits
    }

    /// Label of a 1-based motif index
    pub fn motif_name(&self, motif: usize) -> &str {
        &self.motif_names[motif - 1]
    }

    /// Non-fatal notices raised during the scan
    pub fn notices(&self) -> &[ScanNotice] {
        &self.notices
    }

    /// Write the table as tab-separated values with a header line
    ///
    /// Columns: `motif`, `motif.i`, `sequence`, `start`, `stop`, `score`, `match`.
    pub fn write_tsv<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writeln!(writer, "motif\tmotif.i\tsequence\tstart\tstop\tscore\tmatch")?;
        for hit in &self.hits {
            writeln!(
                writer,
                "{}\t{}\t{}\t{}\t{}\t{}\t{}",
                self.motif_name(hit.motif),
                hit.motif,
                hit.sequence,
                hit.start,
                hit.stop,
                hit.score,
                hit.matched
            )?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a HitTable {
    type Item = &'a Hit;
    type IntoIter = std::slice::Iter<'a, Hit>;

    fn into_iter(self) -> Self::IntoIter {
        self.hits.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_scores() -> ScoreVectors {
        vec![
            // motif 0
            vec![vec![40_000, 0, 0, 0, 40_000], vec![39_999, 40_000]],
            // motif 1
            vec![vec![5_000, 4_999, 6_000, 0, 0], vec![0, 0]],
        ]
    }

    #[test]
    fn test_extract_order_and_threshold() {
        let hits = extract_hits(&sample_scores(), &[40_000, 5_000]);
        let keys: Vec<_> = hits.iter().map(|h| (h.motif, h.sequence, h.offset)).collect();
        assert_eq!(keys, vec![(0, 0, 0), (0, 0, 4), (0, 1, 1), (1, 0, 0), (1, 0, 2)]);
        assert!(hits.iter().all(|h| h.score >= [40_000, 5_000][h.motif]));
    }

    #[test]
    fn test_attach_matches() {
        let seqs = vec!["ACGTACGT", "TACGT"];
        let raw = extract_hits(&sample_scores(), &[40_000, i64::MAX]);
        let hits = attach_matches(&raw, &seqs, &[4, 4]);

        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0], Hit { motif: 1, sequence: 1, start: 1, stop: 4, score: 40.0, matched: "ACGT".into() });
        assert_eq!(hits[1].start, 5);
        assert_eq!(hits[1].stop, 8);
        assert_eq!(hits[1].matched, "ACGT");
        assert_eq!(hits[2].sequence, 2);
        assert_eq!(hits[2].matched, "ACGT");
        assert!(hits.iter().all(|h| h.width() == 4));
    }

    #[test]
    fn test_raw_width_longer_than_positions() {
        // k = 2: three positions span four raw characters
        let scores: ScoreVectors = vec![vec![vec![0, 7_000, 0]]];
        let raw = extract_hits(&scores, &[7_000]);
        let hits = attach_matches(&raw, &["GGATCC"], &[4]);
        assert_eq!(hits.len(), 1);
        assert_eq!((hits[0].start, hits[0].stop), (2, 5));
        assert_eq!(hits[0].matched, "GATC");
    }

    #[test]
    fn test_write_tsv() {
        let hits = vec![Hit { motif: 1, sequence: 2, start: 3, stop: 6, score: 1.5, matched: "ACGT".into() }];
        let table = HitTable::new(hits, vec!["box".into()], Vec::new());

        let mut out = Vec::new();
        table.write_tsv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "motif\tmotif.i\tsequence\tstart\tstop\tscore\tmatch");
        assert_eq!(lines[1], "box\t1\t2\t3\t6\t1.5\tACGT");
        assert_eq!(table.len(), 1);
        assert!(!table.is_empty());
        assert_eq!((&table).into_iter().count(), 1);
    }

    #[test]
    fn test_notice_message() {
        let notice = ScanNotice::UnrecognizedSymbols { sequences: 2 };
        assert!(notice.to_string().starts_with("Non-standard letters detected"));
    }
}
