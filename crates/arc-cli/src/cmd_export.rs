/// Implementation of `arc export`.
///
/// Writes every decodable record of one container either in the binary
/// interchange layout (default) or as a `.arc.gz` container (`--arc`).
/// In ARC mode the container description and each record go into their
/// own gzip member, so `arc` can read the output back, and each record's
/// length field is rewritten to its actual payload length.
use std::fs::File;
use std::io::{self, BufWriter, Write};

use anyhow::{Context, Result};
use flate2::Compression;
use flate2::write::GzEncoder;
use arc_types::serial::encode_to;
use arc_types::{Record, SerializeError};
use arc_wire::ContainerHeader;

use crate::ExportArgs;
use crate::input::open_decoder;

/// What one export run wrote.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub written: u64,
    /// Records that cannot be represented in the binary layout.
    pub unencodable: u64,
    pub bytes: u64,
}

pub fn run(args: &ExportArgs) -> Result<()> {
    let mut decoder = open_decoder(&args.file, &args.decode)?;
    let file = File::create(&args.output)
        .with_context(|| format!("cannot create {}", args.output.display()))?;
    let mut out = BufWriter::new(file);

    let mut summary = ExportSummary::default();
    if args.arc {
        summary.bytes += write_member(&mut out, |unit| write_container(decoder.container(), unit))?;
    }

    let mut record = Record::new();
    while decoder
        .next_record(&mut record)
        .with_context(|| format!("decoding {}", args.file.display()))?
    {
        if args.arc {
            summary.bytes += write_member(&mut out, |unit| record.write_arc(unit))?;
            summary.written += 1;
        } else {
            export_binary(&record, &mut out, &mut summary)?;
        }
    }
    out.flush()
        .with_context(|| format!("writing {}", args.output.display()))?;
    decoder.close();

    println!(
        "{} → {}: {} records, {} bytes",
        args.file.display(),
        args.output.display(),
        summary.written,
        summary.bytes
    );
    if summary.unencodable > 0 {
        println!("  {} records skipped (not encodable)", summary.unencodable);
    }
    Ok(())
}

/// Append one record in the binary layout, skipping records whose fields
/// do not fit it.
fn export_binary(record: &Record, out: &mut impl Write, summary: &mut ExportSummary) -> Result<()> {
    match encode_to(record, out) {
        Ok(n) => {
            summary.written += 1;
            summary.bytes += n as u64;
            Ok(())
        }
        Err(e @ (SerializeError::InvalidTimestamp(_) | SerializeError::FieldTooLong { .. })) => {
            log::warn!("{} at {}: not exported: {e}", record.url(), record.stream_pos());
            summary.unencodable += 1;
            Ok(())
        }
        Err(e) => Err(e).context("writing record"),
    }
}

/// Compress what `fill` writes into one gzip member and append it to
/// `out`. Returns the compressed size.
fn write_member<F>(out: &mut impl Write, fill: F) -> io::Result<u64>
where
    F: FnOnce(&mut GzEncoder<Vec<u8>>) -> io::Result<usize>,
{
    let mut unit = GzEncoder::new(Vec::new(), Compression::default());
    fill(&mut unit)?;
    let member = unit.finish()?;
    out.write_all(&member)?;
    Ok(member.len() as u64)
}

/// Write the container description unit as ARC text.
fn write_container(container: &ContainerHeader, out: &mut impl Write) -> io::Result<usize> {
    let text = format!(
        "{}\n{}\n{}\n\n",
        container.description,
        container.version_line,
        container.field_names.join(" ")
    );
    out.write_all(text.as_bytes())?;
    Ok(text.len())
}
