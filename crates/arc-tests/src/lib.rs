//! Fixture builders shared by the integration tests, the benches, and the
//! `generate_fixtures` binary.
//!
//! Every builder produces decompressed unit bytes; [`gzip_members`] and
//! [`zstd_frames`] wrap a list of units the way an archive file does.

#![allow(clippy::pedantic)]

use std::io::Write;

use flate2::Compression;
use flate2::write::GzEncoder;

/// A well-formed self-description unit, blank separator included.
pub const CONTAINER: &[u8] = b"filedesc://fixture.arc 0.0.0.0 20010101000000 text/plain 76\n\
1 0 Fixture\n\
URL IP-address Archive-date Content-type Archive-length\n\
\n";

/// Timestamp written into every fixture record.
pub const TIMESTAMP: &str = "20010101000000";

/// A record unit whose header declares exactly `payload.len()` bytes.
pub fn record_unit(url: &str, content_type: &str, payload: &[u8]) -> Vec<u8> {
    let line = format!("{url} 1.2.3.4 {TIMESTAMP} {content_type} {}", payload.len());
    raw_unit(&line, payload)
}

/// A unit made of an arbitrary header line and payload.
pub fn raw_unit(header_line: &str, payload: &[u8]) -> Vec<u8> {
    let mut unit = Vec::with_capacity(header_line.len() + 1 + payload.len());
    unit.extend_from_slice(header_line.as_bytes());
    unit.push(b'\n');
    unit.extend_from_slice(payload);
    unit
}

/// A unit whose header line has only four fields.
pub fn malformed_unit(n: usize) -> Vec<u8> {
    raw_unit(&format!("http://bad{n}.test/ 1.2.3.4 text/html 3"), b"xyz")
}

/// An HTTP/1.1 response with a `Content-Type` header and a blank line.
pub fn http_response(status: u16, content_type: &str, body: &[u8]) -> Vec<u8> {
    let mut out = format!(
        "HTTP/1.1 {status} OK\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\n\r\n",
        body.len()
    )
    .into_bytes();
    out.extend_from_slice(body);
    out
}

/// The container unit followed by `records`.
pub fn with_container(records: impl IntoIterator<Item = Vec<u8>>) -> Vec<Vec<u8>> {
    std::iter::once(CONTAINER.to_vec()).chain(records).collect()
}

/// A container of `count` HTML responses of roughly `body_len` bytes each.
pub fn sample_archive(count: usize, body_len: usize) -> Vec<Vec<u8>> {
    with_container((0..count).map(|i| {
        let body = format!("<html><body>page {i} {}</body></html>", "x".repeat(body_len));
        record_unit(
            &format!("http://site.test/page/{i}"),
            "text/html",
            &http_response(200, "text/html", body.as_bytes()),
        )
    }))
}

/// One gzip member per unit.
pub fn gzip_members(units: &[Vec<u8>]) -> Vec<u8> {
    let mut out = Vec::new();
    for unit in units {
        let mut enc = GzEncoder::new(Vec::new(), Compression::default());
        enc.write_all(unit).expect("writing to a Vec cannot fail");
        out.extend(enc.finish().expect("writing to a Vec cannot fail"));
    }
    out
}

/// One zstd frame per unit.
pub fn zstd_frames(units: &[Vec<u8>]) -> Vec<u8> {
    let mut out = Vec::new();
    for unit in units {
        out.extend(zstd::encode_all(unit.as_slice(), 3).expect("in-memory zstd cannot fail"));
    }
    out
}
