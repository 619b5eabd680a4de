/// ARC command-line tool: inspect, validate, summarize, and export
/// `.arc.gz` web-archive containers.
///
/// # Command overview
///
/// ```text
/// arc <COMMAND> [OPTIONS]
///
/// Commands:
///   inspect    Print one line (or one JSON object) per record
///   validate   Decode every record and report problems
///   stats      Aggregate counts across one or more files
///   export     Write records in the binary interchange layout
///   help       Print help information
///
/// Global options:
///   -v, --verbose    Log per-record details (RUST_LOG overrides)
///   -h, --help       Print help
///   -V, --version    Print version
/// ```
///
/// # Exit codes
///
/// | Code | Meaning                                         |
/// |------|-------------------------------------------------|
/// | 0    | Success                                         |
/// | 1    | Error (I/O failure, invalid container, abort)   |
///
/// Reports go to stdout, logs and errors to stderr.
use std::path::PathBuf;
use std::process;

use arc_decoder::config::{DEFAULT_MAX_CONSECUTIVE_INVALID, DEFAULT_MAX_HEADER_LINE, DEFAULT_MAX_PAYLOAD_LEN};
use arc_decoder::{DecoderConfig, SchemePolicy};
use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;

mod cmd_export;
mod cmd_inspect;
mod cmd_stats;
mod cmd_validate;
mod input;
mod summary;

// ── CLI root ──────────────────────────────────────────────────────────────────

/// Decode and examine ARC web-archive files.
#[derive(Parser)]
#[command(name = "arc", version, about = "ARC web-archive record decoder")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log per-record details at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,
}

// ── Sub-commands ──────────────────────────────────────────────────────────────

#[derive(Subcommand)]
enum Commands {
    /// Print a summary of each record.
    Inspect(InspectArgs),
    /// Decode every record and report anomalies.
    Validate(ValidateArgs),
    /// Aggregate record statistics across files.
    Stats(StatsArgs),
    /// Write records in the binary interchange layout.
    Export(ExportArgs),
}

// ── Argument structs ──────────────────────────────────────────────────────────

/// Input framing of a container file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum InputFormat {
    /// One gzip member per record (`.arc.gz`).
    Gzip,
    /// One zstd frame per record (`.arc.zst`).
    Zstd,
}

/// Decoder options shared by every command.
///
/// ```text
/// ┌──────────────────┬──────────────────────────────────────────────────┐
/// │ Flag             │ Effect                                           │
/// ├──────────────────┼──────────────────────────────────────────────────┤
/// │ --format         │ gzip | zstd (default: from the file extension)   │
/// │ --max-invalid N  │ abort after N consecutive invalid records        │
/// │ --max-payload N  │ larger declared lengths are invalid              │
/// │ --max-header-line│ longer header lines are invalid                  │
/// │ --strict-scheme  │ skip records whose URL is not http(s)            │
/// │ --allow-separator│ a trailing newline after the payload is normal   │
/// └──────────────────┴──────────────────────────────────────────────────┘
/// ```
#[derive(clap::Args, Clone, Debug)]
pub struct DecodeOpts {
    /// Input framing. Inferred from the extension when omitted.
    #[arg(long, value_enum)]
    pub format: Option<InputFormat>,

    /// Consecutive invalid records tolerated before giving up.
    #[arg(long, default_value_t = DEFAULT_MAX_CONSECUTIVE_INVALID)]
    pub max_invalid: u32,

    /// Largest declared payload length accepted, in bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_PAYLOAD_LEN)]
    pub max_payload: u64,

    /// Longest record header line accepted, in bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_HEADER_LINE)]
    pub max_header_line: usize,

    /// Treat non-http(s) URLs as invalid records instead of warning.
    #[arg(long)]
    pub strict_scheme: bool,

    /// Accept a newline after each payload as the record separator.
    #[arg(long)]
    pub allow_separator: bool,
}

impl DecodeOpts {
    pub fn config(&self) -> DecoderConfig {
        DecoderConfig {
            max_consecutive_invalid: self.max_invalid,
            max_payload_len: self.max_payload,
            max_header_line: self.max_header_line,
            scheme_policy: if self.strict_scheme {
                SchemePolicy::Reject
            } else {
                SchemePolicy::Warn
            },
            allow_record_separator: self.allow_separator,
            ..DecoderConfig::default()
        }
    }
}

/// Arguments for `arc inspect`.
#[derive(clap::Args)]
pub struct InspectArgs {
    /// Container files to read.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Emit one JSON object per record instead of a table row.
    #[arg(long)]
    pub json: bool,

    /// Stop after this many records per file.
    #[arg(long)]
    pub limit: Option<usize>,

    #[command(flatten)]
    pub decode: DecodeOpts,
}

/// Arguments for `arc validate`.
///
/// Exits 1 if any file fails to open, aborts, or hits an I/O error.
/// Skipped records and anomalies are reported but do not fail validation.
#[derive(clap::Args)]
pub struct ValidateArgs {
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    #[command(flatten)]
    pub decode: DecodeOpts,
}

/// Arguments for `arc stats`.
///
/// Files are decoded concurrently, one blocking task per file.
#[derive(clap::Args)]
pub struct StatsArgs {
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Rows shown in the content-type table.
    #[arg(long, default_value_t = 10)]
    pub top: usize,

    #[command(flatten)]
    pub decode: DecodeOpts,
}

/// Arguments for `arc export`.
#[derive(clap::Args)]
pub struct ExportArgs {
    pub file: PathBuf,

    /// Output path.
    #[arg(short, long)]
    pub output: PathBuf,

    /// Re-emit a `.arc.gz` container, one gzip member per record, instead
    /// of the binary layout.
    #[arg(long)]
    pub arc: bool,

    #[command(flatten)]
    pub decode: DecodeOpts,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    });
    builder.parse_default_env();
    builder.format_timestamp(None);
    let _ = builder.try_init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Inspect(args) => cmd_inspect::run(&args),
        Commands::Validate(args) => cmd_validate::run(&args),
        Commands::Stats(args) => cmd_stats::run(&args),
        Commands::Export(args) => cmd_export::run(&args),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}
