use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use pwmscan_lib::constants::DEFAULT_ALPHABET;
use pwmscan_lib::parse::{parse_motifs, parse_sequences, MotifRecord};
use pwmscan_lib::postprocess::{gc_content, reverse_complement, switch_antisense_coords, to_forward_coords, Strand, StrandedHit};
use pwmscan_lib::recode::composite_radix;
use pwmscan_lib::{Alphabet, HitTable, ScanConfiguration, ScanNotice, ScoreMatrix, Scanner};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "pwmscan")]
#[command(version = "0.1.0")]
#[command(about = "pwmscan: scan sequences with position-weight matrices", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan sequences and report every window meeting its motif's threshold
    Scan {
        /// Motif file ('>NAME [THRESHOLD]' headers, one row of scores per position)
        #[arg(short, long)]
        motifs: String,

        /// Input FASTA/FASTQ file
        #[arg(short, long)]
        sequences: String,

        /// Alphabet, in matrix column order
        #[arg(short, long, default_value = DEFAULT_ALPHABET)]
        alphabet: String,

        /// Scoring order (k > 1 expects matrices over composite k-mers)
        #[arg(short, long, default_value = "1")]
        k: usize,

        /// Number of threads (0 = all available cores)
        #[arg(short = 't', long, default_value = "0")]
        threads: usize,

        /// Threshold applied to every motif, overriding the motif file
        #[arg(long)]
        threshold: Option<f64>,

        /// Do not warn about characters outside the alphabet
        #[arg(long, default_value = "false")]
        no_warn: bool,

        /// Accept -inf scores in the motif file
        #[arg(long, default_value = "false")]
        allow_nonfinite: bool,

        /// Append the GC content of each match
        #[arg(long, default_value = "false")]
        gc: bool,

        /// Also scan reverse complements (nucleotide alphabets)
        #[arg(long, default_value = "false")]
        both_strands: bool,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Validate a motif file and summarize its motifs
    Info {
        /// Motif file
        #[arg(short, long)]
        motifs: String,

        /// Alphabet, in matrix column order
        #[arg(short, long, default_value = DEFAULT_ALPHABET)]
        alphabet: String,

        /// Scoring order
        #[arg(short, long, default_value = "1")]
        k: usize,

        /// Accept -inf scores in the motif file
        #[arg(long, default_value = "false")]
        allow_nonfinite: bool,
    },
}

/// Options shared by the scan command's steps
struct ScanOptions {
    alphabet: String,
    k: usize,
    threads: usize,
    threshold: Option<f64>,
    no_warn: bool,
    allow_nonfinite: bool,
    gc: bool,
    both_strands: bool,
    output: Option<String>,
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing: use RUST_LOG if set, otherwise default to info
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            motifs,
            sequences,
            alphabet,
            k,
            threads,
            threshold,
            no_warn,
            allow_nonfinite,
            gc,
            both_strands,
            output,
        } => {
            let opts = ScanOptions {
                alphabet,
                k,
                threads,
                threshold,
                no_warn,
                allow_nonfinite,
                gc,
                both_strands,
                output,
            };
            scan_command(&motifs, &sequences, opts)?;
        }
        Commands::Info { motifs, alphabet, k, allow_nonfinite } => {
            info_command(&motifs, &alphabet, k, allow_nonfinite)?;
        }
    }

    Ok(())
}

/// Scan a sequence file with a motif file and write the hit table
fn scan_command(motifs_path: &str, sequences_path: &str, opts: ScanOptions) -> anyhow::Result<()> {
    info!("Scanning sequences...");
    info!("  Motifs: {}", motifs_path);
    info!("  Sequences: {}", sequences_path);
    info!("  Alphabet: {}", opts.alphabet);

    let alphabet: Alphabet = opts.alphabet.parse()?;
    let records = parse_motifs(motifs_path)?;
    let matrices = build_matrices(&records, opts.allow_nonfinite)?;
    let thresholds = resolve_thresholds(&records, opts.threshold)?;
    info!("  Loaded {} motifs", matrices.len());

    let sequences = parse_sequences(sequences_path)?;
    info!("  Loaded {} sequences", sequences.len());

    let mut config = ScanConfiguration::new(opts.k).map_err(|e| anyhow::anyhow!("{}", e))?;
    config.num_threads = opts.threads;
    config.warn_on_unrecognized = !opts.no_warn;
    config.allow_nonfinite = opts.allow_nonfinite;

    let raw: Vec<&[u8]> = sequences.iter().map(|r| r.seq.as_slice()).collect();

    let mut out: Box<dyn Write> = match &opts.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create output file: {}", path))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    if !opts.both_strands && !opts.gc {
        let forward = Scanner::new(config)?.scan(&matrices, &raw, &thresholds, &alphabet)?;
        forward.write_tsv(&mut out)?;
        out.flush()?;
        info!("Reported {} hits", forward.len());
        return Ok(());
    }

    let (forward, stranded) = if opts.both_strands {
        let scan = scan_both_strands(&config, &matrices, &raw, &thresholds, &alphabet)?;
        debug!("  {} notice(s) across both strands", scan.notices.len());
        (scan.forward, scan.hits)
    } else {
        let forward = Scanner::new(config)?.scan(&matrices, &raw, &thresholds, &alphabet)?;
        let hits = forward
            .iter()
            .cloned()
            .map(|hit| StrandedHit { hit, strand: Strand::Forward })
            .collect();
        (forward, hits)
    };

    let gc_values = if opts.gc {
        let matches: Vec<&str> = stranded.iter().map(|s| s.hit.matched.as_str()).collect();
        Some(gc_content(&matches, false))
    } else {
        None
    };

    write_stranded(&mut out, &forward, &stranded, opts.both_strands, gc_values.as_deref())?;
    out.flush()?;
    info!("Reported {} hits", stranded.len());

    Ok(())
}

/// Hits from a scan of both strands
struct StrandScan {
    /// Forward-strand table (motif names, forward notices)
    forward: HitTable,
    /// Hits from both strands in forward coordinates, reverse hits with
    /// start and stop swapped
    hits: Vec<StrandedHit>,
    /// Notices raised across both passes
    notices: Vec<ScanNotice>,
}

/// Scan sequences and their reverse complements
///
/// The reverse pass never warns about unrecognized characters; the
/// reverse complement keeps them, so the forward notice already covers it.
fn scan_both_strands(
    config: &ScanConfiguration,
    matrices: &[ScoreMatrix],
    raw: &[&[u8]],
    thresholds: &[f64],
    alphabet: &Alphabet,
) -> anyhow::Result<StrandScan> {
    let forward = Scanner::new(config.clone())?.scan(matrices, raw, thresholds, alphabet)?;

    let reverse_config = ScanConfiguration { warn_on_unrecognized: false, ..config.clone() };
    let reversed: Vec<Vec<u8>> = raw.iter().map(|s| reverse_complement(s)).collect();
    let reverse = Scanner::new(reverse_config)?.scan(matrices, &reversed, thresholds, alphabet)?;
    debug!("  {} hits on the reverse strand", reverse.len());

    let mut notices = forward.notices().to_vec();
    notices.extend_from_slice(reverse.notices());

    let mut hits: Vec<StrandedHit> = forward
        .iter()
        .cloned()
        .map(|hit| StrandedHit { hit, strand: Strand::Forward })
        .collect();
    for mut hit in reverse.into_hits() {
        let seq_len = raw[hit.sequence - 1].len();
        to_forward_coords(&mut hit, seq_len);
        hits.push(StrandedHit { hit, strand: Strand::Reverse });
    }
    // Keep the table ordered by motif, sequence, then position on the forward strand
    hits.sort_by_key(|s| (s.hit.motif, s.hit.sequence, s.hit.start, s.strand == Strand::Reverse));
    switch_antisense_coords(&mut hits);

    Ok(StrandScan { forward, hits, notices })
}

/// Write hits with the optional strand and gc columns
fn write_stranded<W: Write>(
    out: &mut W,
    table: &HitTable,
    hits: &[StrandedHit],
    with_strand: bool,
    gc: Option<&[f64]>,
) -> anyhow::Result<()> {
    write!(out, "motif\tmotif.i\tsequence\tstart\tstop\tscore\tmatch")?;
    if with_strand {
        write!(out, "\tstrand")?;
    }
    if gc.is_some() {
        write!(out, "\tgc")?;
    }
    writeln!(out)?;

    for (i, stranded) in hits.iter().enumerate() {
        let hit = &stranded.hit;
        write!(
            out,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            table.motif_name(hit.motif),
            hit.motif,
            hit.sequence,
            hit.start,
            hit.stop,
            hit.score,
            hit.matched
        )?;
        if with_strand {
            write!(out, "\t{}", stranded.strand.symbol())?;
        }
        if let Some(gc) = gc {
            write!(out, "\t{:.3}", gc[i])?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Validate motifs against an alphabet and print their score ranges
fn info_command(motifs_path: &str, alphabet: &str, k: usize, allow_nonfinite: bool) -> anyhow::Result<()> {
    let alphabet: Alphabet = alphabet.parse()?;
    let config = ScanConfiguration::new(k).map_err(|e| anyhow::anyhow!("{}", e))?;

    let records = parse_motifs(motifs_path)?;
    let matrices = build_matrices(&records, allow_nonfinite)?;
    info!("Loaded {} motifs from {}", matrices.len(), motifs_path);

    let mut out = BufWriter::new(io::stdout().lock());
    write_motif_summary(&mut out, &records, &matrices, &alphabet, config.k)?;
    out.flush()?;

    Ok(())
}

/// Write one summary row per motif, checking row lengths against `|alphabet|^k`
fn write_motif_summary<W: Write>(
    out: &mut W,
    records: &[MotifRecord],
    matrices: &[ScoreMatrix],
    alphabet: &Alphabet,
    k: usize,
) -> anyhow::Result<()> {
    let radix = composite_radix(alphabet.len(), k)?;

    writeln!(out, "name\twidth\traw.width\tmin.score\tmax.score\tthreshold")?;
    for (record, matrix) in records.iter().zip(matrices) {
        if matrix.row_len() != radix {
            bail!(
                "Motif {:?} has {} columns, expected {} for alphabet {:?} and k={}",
                record.name,
                matrix.row_len(),
                radix,
                String::from_utf8_lossy(alphabet.symbols()),
                k
            );
        }
        let threshold = record.threshold.map_or_else(|| "NA".to_string(), |t| t.to_string());
        writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}\t{}",
            record.name,
            matrix.width(),
            matrix.raw_width(k),
            matrix.min_score(),
            matrix.max_score(),
            threshold
        )?;
    }
    Ok(())
}

/// Convert parsed motif records into fixed-point score matrices
fn build_matrices(records: &[MotifRecord], allow_nonfinite: bool) -> anyhow::Result<Vec<ScoreMatrix>> {
    records
        .iter()
        .map(|record| {
            ScoreMatrix::from_rows(&record.rows, allow_nonfinite)
                .map(|m| m.with_name(record.name.clone()))
                .with_context(|| format!("Invalid motif {:?}", record.name))
        })
        .collect()
}

/// One threshold per motif, from the override or the motif file
fn resolve_thresholds(records: &[MotifRecord], global: Option<f64>) -> anyhow::Result<Vec<f64>> {
    records
        .iter()
        .map(|record| match global.or(record.threshold) {
            Some(t) => Ok(t),
            None => bail!(
                "Motif {:?} has no threshold; add one to its header or pass --threshold",
                record.name
            ),
        })
        .collect()
}
