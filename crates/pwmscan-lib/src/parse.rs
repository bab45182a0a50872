//! Sequence and motif file parsing
//!
//! Sequences are read from FASTA/FASTQ files, with transparent gzip
//! decompression. Motifs are read from a plain-text format:
//!
//! ```text
//! # comment
//! >NAME [THRESHOLD]
//! 1.2  -0.5  0.0  -2.1
//! -1.0  1.8 -0.3   0.2
//! ```
//!
//! Each line after a header is one motif position; columns follow the
//! alphabet order (or composite-symbol order for k > 1).

use anyhow::{anyhow, bail, Context, Result};
use needletail::parse_fastx_file;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// One sequence record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRecord {
    /// Record identifier (header up to the first whitespace)
    pub id: String,
    /// Raw sequence bytes, case preserved
    pub seq: Vec<u8>,
}

/// One motif read from a motif file
#[derive(Debug, Clone, PartialEq)]
pub struct MotifRecord {
    /// Motif name from the header line
    pub name: String,
    /// Threshold from the header line, if present
    pub threshold: Option<f64>,
    /// Score rows, one per position
    pub rows: Vec<Vec<f64>>,
}

/// Parse a FASTA/FASTQ file and call a function for each sequence
///
/// # Arguments
/// * `path` - Path to input file (may be gzipped)
/// * `callback` - Function called for each sequence, receives (id, sequence)
///
/// # Errors
/// Returns error if the file cannot be opened or a record is malformed
pub fn for_each_sequence<P, F>(path: P, mut callback: F) -> Result<()>
where
    P: AsRef<Path>,
    F: FnMut(&[u8], &[u8]) -> Result<()>,
{
    let path = path.as_ref();

    // needletail automatically handles gzip decompression
    let mut reader = parse_fastx_file(path)
        .with_context(|| format!("Failed to open sequence file: {}", path.display()))?;

    while let Some(record) = reader.next() {
        let record = record
            .with_context(|| format!("Failed to parse sequence record in {}", path.display()))?;
        let seq = record.seq();
        callback(record.id(), &seq)?;
    }

    Ok(())
}

/// Read all sequences of a FASTA/FASTQ file
pub fn parse_sequences<P: AsRef<Path>>(path: P) -> Result<Vec<SequenceRecord>> {
    let mut records = Vec::new();
    for_each_sequence(path, |id, seq| {
        let id = String::from_utf8_lossy(id);
        let id = id.split_whitespace().next().unwrap_or_default().to_string();
        records.push(SequenceRecord { id, seq: seq.to_vec() });
        Ok(())
    })?;
    Ok(records)
}

/// Read all motifs of a motif file
///
/// # Errors
/// Returns error if the file cannot be read, a value is not a number, rows
/// appear before the first header, or a motif has no rows
pub fn parse_motifs<P: AsRef<Path>>(path: P) -> Result<Vec<MotifRecord>> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open motif file: {}", path.display()))?;
    parse_motifs_from(BufReader::new(file))
        .with_context(|| format!("Invalid motif file: {}", path.display()))
}

/// Read motifs from any buffered reader
pub fn parse_motifs_from<R: BufRead>(reader: R) -> Result<Vec<MotifRecord>> {
    let mut motifs: Vec<MotifRecord> = Vec::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(header) = line.strip_prefix('>') {
            motifs.push(parse_header(header, line_no + 1)?);
            continue;
        }

        let current = motifs
            .last_mut()
            .ok_or_else(|| anyhow!("Line {}: scores found before any '>' header", line_no + 1))?;
        let row = line
            .split_whitespace()
            .map(|field| {
                field
                    .parse::<f64>()
                    .with_context(|| format!("Line {}: invalid score {:?}", line_no + 1, field))
            })
            .collect::<Result<Vec<f64>>>()?;
        current.rows.push(row);
    }

    if let Some(empty) = motifs.iter().find(|m| m.rows.is_empty()) {
        bail!("Motif {:?} has no positions", empty.name);
    }

    Ok(motifs)
}

fn parse_header(header: &str, line_no: usize) -> Result<MotifRecord> {
    let mut fields = header.split_whitespace();
    let name = fields
        .next()
        .ok_or_else(|| anyhow!("Line {}: motif header has no name", line_no))?
        .to_string();
    let threshold = fields
        .next()
        .map(|t| {
            t.parse::<f64>()
                .with_context(|| format!("Line {}: invalid threshold {:?}", line_no, t))
        })
        .transpose()?;
    Ok(MotifRecord { name, threshold, rows: Vec::new() })
}
