#![no_main]

use libfuzzer_sys::fuzz_target;

// Fuzz target: RecordHeader::parse_bytes on arbitrary lines.
//
// A successful parse must render back to a line that parses to the same
// header.
fuzz_target!(|data: &[u8]| {
    if let Ok(header) = arc_wire::RecordHeader::parse_bytes(data) {
        let again = arc_wire::RecordHeader::parse(&header.to_line())
            .expect("rendered header line must parse");
        assert_eq!(again, header);
        let _ = header.archive_date();
    }
});
