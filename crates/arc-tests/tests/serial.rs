//! Binary layout round-trips over decoded records.
//!
//! Records come out of the decoder, go through `encode`, and must come back
//! with identical header fields and payload bytes. Truncated input must be
//! an explicit error, never a partially filled record.

use arc_decoder::{ArcDecoder, MemoryUnitSource};
use arc_tests::{http_response, raw_unit, record_unit, sample_archive, with_container};
use arc_types::serial::{decode, decode_from, encode, encoded_len};
use arc_types::{Record, SerializeError};

fn decoded(units: Vec<Vec<u8>>) -> Vec<Record> {
    ArcDecoder::open(MemoryUnitSource::new(units))
        .unwrap()
        .map(Result::unwrap)
        .collect()
}

#[test]
fn decoded_records_round_trip() {
    let records = decoded(sample_archive(20, 64));
    assert_eq!(records.len(), 20);
    for record in &records {
        let bytes = encode(record).unwrap();
        assert_eq!(bytes.len(), encoded_len(record));
        let back = decode(&bytes).unwrap();
        assert_eq!(back.header(), record.header());
        assert_eq!(back.payload(), record.payload());
        assert_eq!(back.status_code(), record.status_code());
    }
}

#[test]
fn binary_payloads_and_latin1_urls_round_trip() {
    let mut header = b"http://caf\xe9.test/ 10.0.0.1 19991231235959 image/gif 4".to_vec();
    header.push(b'\n');
    header.extend_from_slice(&[0, 0xFF, b'\n', 0x80]);
    let records = decoded(with_container([header]));

    let record = &records[0];
    assert_eq!(record.url(), "http://café.test/");
    let back = decode(&encode(record).unwrap()).unwrap();
    assert_eq!(back.url(), "http://café.test/");
    assert_eq!(back.timestamp(), "19991231235959");
    assert_eq!(back.payload(), &[0, 0xFF, b'\n', 0x80]);
}

#[test]
fn short_record_round_trips_with_its_declared_length() {
    let records = decoded(with_container([raw_unit(
        "http://short.test/ 1.2.3.4 20010101000000 text/html 10",
        b"abc",
    )]));
    let back = decode(&encode(&records[0]).unwrap()).unwrap();
    assert_eq!(back.declared_length(), 10);
    assert_eq!(back.payload(), b"abc");
}

#[test]
fn every_cut_of_a_stream_is_truncation() {
    let records = decoded(with_container([
        record_unit("http://a.test/", "text/html", &http_response(200, "text/html", b"<p>a</p>")),
        record_unit("http://b.test/", "text/plain", b"plain"),
    ]));
    let mut stream = Vec::new();
    for record in &records {
        stream.extend(encode(record).unwrap());
    }
    let first_len = encoded_len(&records[0]);

    for cut in 0..stream.len() {
        let result = decode_from(&stream[..cut]);
        if cut < first_len {
            assert!(
                matches!(result, Err(SerializeError::TruncatedRecord { .. })),
                "cut {cut}: {result:?}"
            );
        } else {
            let (record, used) = result.unwrap();
            assert_eq!(used, first_len);
            assert_eq!(record.url(), "http://a.test/");
            let rest = decode_from(&stream[used..cut]);
            if cut < stream.len() {
                assert!(
                    matches!(rest, Err(SerializeError::TruncatedRecord { .. })),
                    "cut {cut}: {rest:?}"
                );
            }
        }
    }
}

#[test]
fn encoding_does_not_carry_anomalies() {
    let mut unit = record_unit("http://x.test/", "text/html", b"abcde");
    unit.push(b'!');
    let records = decoded(with_container([unit]));
    assert!(!records[0].anomalies().is_empty());
    let back = decode(&encode(&records[0]).unwrap()).unwrap();
    assert!(back.anomalies().is_empty());
    assert_eq!(back.stream_pos(), 0);
}
