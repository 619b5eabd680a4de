//! Sample archive generator for manual testing of the `arc` CLI.
//!
//! Writes a small set of container files exercising the decoder's
//! recovery paths.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin generate_fixtures -p arc-tests -- target/fixtures
//! ```
//!
//! # Generated files
//!
//! | File                  | Contents                                       |
//! |-----------------------|------------------------------------------------|
//! | clean.arc.gz          | 50 HTML responses                              |
//! | clean.arc.zst         | Same records, one zstd frame per unit          |
//! | damaged.arc.gz        | Malformed header, short payload, stray byte    |
//! | mixed_schemes.arc.gz  | http, https and dns records                    |
//! | markup_boundary.arc.gz| Envelope with no blank line before `<html>`    |
//! | abort.arc.gz          | 150 malformed headers                          |

#![allow(clippy::pedantic)]

use std::path::{Path, PathBuf};

use arc_tests::{
    gzip_members, http_response, malformed_unit, raw_unit, record_unit, sample_archive,
    with_container, zstd_frames,
};

fn main() {
    let out_dir = std::env::args_os()
        .nth(1)
        .map_or_else(|| PathBuf::from("fixtures"), PathBuf::from);
    std::fs::create_dir_all(&out_dir)
        .unwrap_or_else(|e| panic!("cannot create {}: {e}", out_dir.display()));

    let clean = sample_archive(50, 200);
    write(&out_dir, "clean.arc.gz", &gzip_members(&clean));
    write(&out_dir, "clean.arc.zst", &zstd_frames(&clean));

    let mut stray = record_unit("http://x.test/", "text/html", b"abcde");
    stray.push(b'!');
    let damaged = with_container([
        record_unit("http://a.test/", "text/html", &http_response(200, "text/html", b"<p>a</p>")),
        malformed_unit(1),
        raw_unit("http://short.test/ 1.2.3.4 20010101000000 text/html 100", b"too short"),
        stray,
        Vec::new(),
        record_unit("http://z.test/", "text/html", &http_response(404, "text/html", b"gone")),
    ]);
    write(&out_dir, "damaged.arc.gz", &gzip_members(&damaged));

    let mixed = with_container([
        record_unit("http://a.test/", "text/html", &http_response(200, "text/html", b"a")),
        record_unit("https://b.test/", "text/html", &http_response(301, "text/html", b"")),
        record_unit("dns:c.test", "text/dns", b"20010101000000\nc.test. 300 IN A 1.2.3.4\n"),
    ]);
    write(&out_dir, "mixed_schemes.arc.gz", &gzip_members(&mixed));

    let markup = with_container([record_unit(
        "http://m.test/",
        "text/html",
        b"HTTP/1.0 200 OK\r\nContent-Type: text/html\r\n<html><body>no blank line</body></html>",
    )]);
    write(&out_dir, "markup_boundary.arc.gz", &gzip_members(&markup));

    let abort = with_container((0..150).map(malformed_unit));
    write(&out_dir, "abort.arc.gz", &gzip_members(&abort));

    println!("All fixtures written to {}", out_dir.display());
}

fn write(dir: &Path, name: &str, bytes: &[u8]) {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap_or_else(|e| panic!("cannot write {}: {e}", path.display()));
    println!("  {name:<24} {:>8} bytes", bytes.len());
}
