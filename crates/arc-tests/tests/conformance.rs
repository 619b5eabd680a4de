//! Snapshot of decoding a deliberately damaged archive.
//!
//! The archive mixes every recoverable problem the decoder knows about. The
//! snapshot pins which records come out, where each unit started, what was
//! flagged, and the running totals, so a behavior change shows up as a
//! snapshot diff rather than a scattered assertion failure.
//!
//! | Unit | Contents                                   | Outcome          |
//! |------|--------------------------------------------|------------------|
//! | 0    | container description                      | consumed by open |
//! | 1    | HTTP 200 response                          | emitted          |
//! | 2    | 4-field header                             | skipped          |
//! | 3    | declares 100 bytes, holds 9                | short-payload    |
//! | 4    | 5-byte payload plus one stray byte         | trailing-bytes   |
//! | 5    | empty                                      | ignored          |
//! | 6    | `dns:` record                              | non-http-scheme  |
//! | 7    | HTTP 404 response                          | emitted          |

use std::fmt::Write;

use arc_decoder::{ArcDecoder, GzipMemberSource, MemoryUnitSource, UnitSource, ZstdFrameSource};
use arc_tests::{gzip_members, malformed_unit, raw_unit, record_unit, with_container, zstd_frames};
use insta::assert_snapshot;

fn damaged_archive() -> Vec<Vec<u8>> {
    let mut stray = record_unit("http://x.test/", "text/html", b"abcde");
    stray.push(b'!');
    with_container([
        record_unit("http://a.test/", "text/html", b"HTTP/1.1 200 OK\r\n\r\n<p>a</p>"),
        malformed_unit(1),
        raw_unit("http://short.test/ 1.2.3.4 20010101000000 text/html 100", b"too short"),
        stray,
        Vec::new(),
        record_unit("dns:c.test", "text/dns", b"1.2.3.4"),
        record_unit("http://z.test/", "text/html", b"HTTP/1.1 404 Not Found\r\n\r\ngone"),
    ])
}

/// One line per record, then the decoder totals.
fn listing<S: UnitSource>(mut decoder: ArcDecoder<S>, with_positions: bool) -> String {
    let mut out = String::new();
    for record in decoder.by_ref() {
        let record = record.unwrap();
        let pos = if with_positions {
            record.stream_pos().to_string()
        } else {
            "-".to_string()
        };
        writeln!(
            out,
            "{pos:<5} {:<4} {:<20} {:>3}  {}",
            record.status_code(),
            record.url(),
            record.payload_len(),
            record.anomalies()
        )
        .unwrap();
    }
    let stats = decoder.stats();
    write!(
        out,
        "emitted={} invalid={} short={} trailing={} non_http={} empty={} skipped_bytes={}",
        stats.emitted,
        stats.invalid,
        stats.short_payloads,
        stats.trailing_bytes,
        stats.non_http,
        stats.empty_units,
        stats.skipped_bytes
    )
    .unwrap();
    out
}

#[test]
fn damaged_archive_from_memory() {
    let decoder = ArcDecoder::open(MemoryUnitSource::new(damaged_archive())).unwrap();
    assert_snapshot!(listing(decoder, true), @r"
    129   200  http://a.test/        27  none
    248   -1   http://short.test/     9  short-payload
    313   -1   http://x.test/         5  trailing-bytes
    369   -1   dns:c.test             7  non-http-scheme
    421   404  http://z.test/        30  none
    emitted=5 invalid=1 short=1 trailing=1 non_http=1 empty=1 skipped_bytes=4
    ");
}

#[test]
fn compressed_framings_agree_with_memory() {
    let units = damaged_archive();
    let expected = listing(ArcDecoder::open(MemoryUnitSource::new(units.clone())).unwrap(), false);

    let gz = gzip_members(&units);
    let gz_len = gz.len() as u64;
    let gzip = ArcDecoder::open(GzipMemberSource::new(gz.as_slice(), gz_len)).unwrap();
    assert_eq!(listing(gzip, false), expected);

    let zst = zstd_frames(&units);
    let zst_len = zst.len() as u64;
    let zstd = ArcDecoder::open(ZstdFrameSource::new(zst.as_slice(), zst_len)).unwrap();
    assert_eq!(listing(zstd, false), expected);
}
