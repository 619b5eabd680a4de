/// Implementation of `arc inspect`.
///
/// One row per record, preceded by a heading per file:
///
/// ```text
/// # crawl.arc.gz  (IA-001102.arc)
/// STATUS    POSITION      BYTES  TYPE                      URL
/// 200            141       1534  text/html                 http://example.com/
/// -             1702         56  text/dns                  dns:example.com  [non-http-scheme]
/// ```
///
/// With `--json` each record is one JSON object per line and headings are
/// omitted, so the output can be piped into `jq`.
use std::io::{self, Write};

use anyhow::{Context, Result};
use arc_types::Record;

use crate::InspectArgs;
use crate::input::open_decoder;
use crate::summary::RecordSummary;

pub fn run(args: &InspectArgs) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for path in &args.files {
        let mut decoder = open_decoder(path, &args.decode)?;
        if !args.json {
            writeln!(out, "# {}  ({})", path.display(), decoder.container().file_name())?;
            writeln!(out, "{}", RecordSummary::table_header())?;
        }

        let mut record = Record::new();
        let mut shown = 0usize;
        while args.limit.is_none_or(|limit| shown < limit)
            && decoder
                .next_record(&mut record)
                .with_context(|| format!("decoding {}", path.display()))?
        {
            let summary = RecordSummary::of(&record);
            if args.json {
                serde_json::to_writer(&mut out, &summary)?;
                writeln!(out)?;
            } else {
                writeln!(out, "{}", summary.table_row())?;
            }
            shown += 1;
        }
        decoder.close();
    }
    Ok(())
}
