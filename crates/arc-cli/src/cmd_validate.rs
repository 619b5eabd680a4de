/// Implementation of `arc validate`.
///
/// Decodes every record of every file and prints a report per file:
///
/// ```text
/// ✓ crawl.arc.gz
///   container  IA-001102.arc (1 0 Alexa Internet)
///   records    1203 decoded, 48211345 bytes read
///   ⚠ invalid  2 records skipped
/// ```
///
/// Skipped records and payload anomalies are warnings. Only a file that
/// cannot be opened, aborts on too many invalid records, or fails with an
/// I/O error counts as a failure.
use std::path::Path;

use anyhow::{Result, bail};
use arc_decoder::DecoderStats;
use arc_types::Record;

use crate::input::open_decoder;
use crate::{DecodeOpts, ValidateArgs};

/// What a complete decode of one file observed.
#[derive(Debug)]
pub struct Report {
    pub container: String,
    pub version: String,
    pub stats: DecoderStats,
    pub bytes_read: u64,
}

pub fn run(args: &ValidateArgs) -> Result<()> {
    let mut failed = 0usize;
    for path in &args.files {
        match validate_file(path, &args.decode) {
            Ok(report) => println!("{}", render(path, &report)),
            Err(e) => {
                println!("✗ {}\n  {e:#}", path.display());
                failed += 1;
            }
        }
    }
    if failed > 0 {
        bail!("{failed} of {} file(s) failed validation", args.files.len());
    }
    Ok(())
}

fn validate_file(path: &Path, opts: &DecodeOpts) -> Result<Report> {
    let mut decoder = open_decoder(path, opts)?;
    let mut record = Record::new();
    while decoder.next_record(&mut record)? {}
    let report = Report {
        container: decoder.container().file_name().to_string(),
        version: decoder.container().version_line.clone(),
        stats: decoder.stats(),
        bytes_read: decoder.position(),
    };
    decoder.close();
    Ok(report)
}

pub fn render(path: &Path, report: &Report) -> String {
    let stats = &report.stats;
    let mut lines = vec![
        format!("✓ {}", path.display()),
        format!("  container  {} ({})", report.container, report.version),
        format!(
            "  records    {} decoded, {} bytes read",
            stats.emitted, report.bytes_read
        ),
    ];
    let warnings = [
        ("invalid", stats.invalid, "records skipped"),
        ("short", stats.short_payloads, "payloads shorter than declared"),
        ("trailing", stats.trailing_bytes, "records with bytes after the payload"),
        ("scheme", stats.non_http, "non-http(s) URLs"),
    ];
    for (label, count, what) in warnings {
        if count > 0 {
            lines.push(format!("  ⚠ {label:<8} {count} {what}"));
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;

    use super::*;

    #[test]
    fn clean_report() {
        let report = Report {
            container: "t.arc".into(),
            version: "1 0 test".into(),
            stats: DecoderStats {
                emitted: 3,
                ..DecoderStats::default()
            },
            bytes_read: 812,
        };
        assert_snapshot!(render(Path::new("t.arc.gz"), &report), @r"
        ✓ t.arc.gz
          container  t.arc (1 0 test)
          records    3 decoded, 812 bytes read
        ");
    }

    #[test]
    fn report_with_warnings() {
        let report = Report {
            container: "t.arc".into(),
            version: "1 0 test".into(),
            stats: DecoderStats {
                emitted: 5,
                invalid: 2,
                trailing_bytes: 1,
                ..DecoderStats::default()
            },
            bytes_read: 4096,
        };
        assert_snapshot!(render(Path::new("t.arc.gz"), &report), @r"
        ✓ t.arc.gz
          container  t.arc (1 0 test)
          records    5 decoded, 4096 bytes read
          ⚠ invalid  2 records skipped
          ⚠ trailing 1 records with bytes after the payload
        ");
    }
}
