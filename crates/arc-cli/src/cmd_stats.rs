/// Implementation of `arc stats`.
///
/// Each file is decoded on its own blocking task; the per-file tallies
/// are merged and printed once every task has finished.
///
/// # Example output
///
/// ```text
/// Files:    2
/// Records:  2406  (96422690 payload bytes)
/// Skipped:  4 invalid, 0 empty units
///
/// Content type                 Count
/// ──────────────────────────────────
/// text/html                     2011
/// image/jpeg                     212
/// text/dns                        41
///
/// Status      Count
/// ─────────────────
/// 2xx          2103
/// 3xx           217
/// none           86
/// ```
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use arc_decoder::DecoderStats;
use arc_types::Record;
use arc_wire::envelope::NO_STATUS;

use crate::input::open_decoder;
use crate::{DecodeOpts, StatsArgs};

/// Tallies for one or more files.
#[derive(Debug, Default)]
pub struct Tally {
    pub files: usize,
    pub payload_bytes: u64,
    pub content_types: HashMap<String, u64>,
    pub status_classes: BTreeMap<&'static str, u64>,
    pub decoder: DecoderStats,
}

impl Tally {
    fn add_record(&mut self, record: &Record) {
        self.payload_bytes += record.payload_len() as u64;
        *self
            .content_types
            .entry(record.content_type().to_ascii_lowercase())
            .or_default() += 1;
        let class = match record.status_code() {
            NO_STATUS => "none",
            100..=199 => "1xx",
            200..=299 => "2xx",
            300..=399 => "3xx",
            400..=499 => "4xx",
            500..=599 => "5xx",
            _ => "other",
        };
        *self.status_classes.entry(class).or_default() += 1;
    }

    fn merge(&mut self, other: Tally) {
        self.files += other.files;
        self.payload_bytes += other.payload_bytes;
        for (ctype, n) in other.content_types {
            *self.content_types.entry(ctype).or_default() += n;
        }
        for (class, n) in other.status_classes {
            *self.status_classes.entry(class).or_default() += n;
        }
        let (a, b) = (&mut self.decoder, other.decoder);
        a.emitted += b.emitted;
        a.invalid += b.invalid;
        a.short_payloads += b.short_payloads;
        a.trailing_bytes += b.trailing_bytes;
        a.non_http += b.non_http;
        a.empty_units += b.empty_units;
        a.skipped_bytes += b.skipped_bytes;
    }
}

pub fn run(args: &StatsArgs) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("cannot start the task runtime")?;
    let tallies = runtime.block_on(tally_all(&args.files, &args.decode))?;

    let mut total = Tally::default();
    for tally in tallies {
        total.merge(tally);
    }
    println!("{}", render(&total, args.top));
    Ok(())
}

async fn tally_all(files: &[PathBuf], opts: &DecodeOpts) -> Result<Vec<Tally>> {
    let handles: Vec<_> = files
        .iter()
        .map(|path| {
            let path = path.clone();
            let opts = opts.clone();
            tokio::task::spawn_blocking(move || tally_file(&path, &opts))
        })
        .collect();

    let mut tallies = Vec::with_capacity(handles.len());
    for handle in handles {
        tallies.push(handle.await.context("stats task panicked")??);
    }
    Ok(tallies)
}

fn tally_file(path: &Path, opts: &DecodeOpts) -> Result<Tally> {
    let mut decoder = open_decoder(path, opts)?;
    let mut tally = Tally {
        files: 1,
        ..Tally::default()
    };
    let mut record = Record::new();
    while decoder
        .next_record(&mut record)
        .with_context(|| format!("decoding {}", path.display()))?
    {
        tally.add_record(&record);
    }
    tally.decoder = decoder.stats();
    decoder.close();
    Ok(tally)
}

pub fn render(tally: &Tally, top: usize) -> String {
    let stats = &tally.decoder;
    let mut out = vec![
        format!("Files:    {}", tally.files),
        format!(
            "Records:  {}  ({} payload bytes)",
            stats.emitted, tally.payload_bytes
        ),
        format!(
            "Skipped:  {} invalid, {} empty units",
            stats.invalid, stats.empty_units
        ),
        String::new(),
        format!("{:<24}{:>10}", "Content type", "Count"),
        "─".repeat(34),
    ];

    let mut ctypes: Vec<(&String, &u64)> = tally.content_types.iter().collect();
    ctypes.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    for (ctype, n) in ctypes.iter().take(top) {
        out.push(format!("{ctype:<24}{n:>10}"));
    }
    if ctypes.len() > top {
        let rest: u64 = ctypes[top..].iter().map(|(_, n)| **n).sum();
        out.push(format!("{:<24}{rest:>10}", format!("({} more)", ctypes.len() - top)));
    }

    out.push(String::new());
    out.push(format!("{:<10}{:>7}", "Status", "Count"));
    out.push("─".repeat(17));
    for (class, n) in &tally.status_classes {
        out.push(format!("{class:<10}{n:>7}"));
    }

    let anomalies = [
        ("short payloads", stats.short_payloads),
        ("trailing bytes", stats.trailing_bytes),
        ("non-http URLs", stats.non_http),
    ];
    if anomalies.iter().any(|(_, n)| *n > 0) {
        out.push(String::new());
        out.push("Anomalies".to_string());
        for (label, n) in anomalies {
            out.push(format!("  {label:<16}{n:>6}"));
        }
    }
    out.join("\n")
}
