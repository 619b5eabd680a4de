#![no_main]

use arc_decoder::{ArcDecoder, DecoderConfig, MemoryUnitSource};
use libfuzzer_sys::fuzz_target;

const CONTAINER: &[u8] =
    b"filedesc://fuzz.arc 0.0.0.0 20010101000000 text/plain 70\n1 0 fuzz\nURL IP-address Archive-date Content-type Archive-length\n\n";

// Fuzz target: the full decoder over arbitrary record units.
//
// Decoding must terminate, never panic, and never report more records
// than there are units.
fuzz_target!(|units: Vec<Vec<u8>>| {
    let count = units.len();
    let all = std::iter::once(CONTAINER.to_vec()).chain(units);
    let config = DecoderConfig {
        max_consecutive_invalid: 8,
        max_payload_len: 1 << 20,
        ..DecoderConfig::default()
    };
    let Ok(decoder) = ArcDecoder::open_with_config(MemoryUnitSource::new(all), config) else {
        return;
    };
    let mut emitted = 0;
    for record in decoder {
        match record {
            Ok(record) => {
                emitted += 1;
                let _ = record.status_code();
                let _ = record.body();
            }
            Err(_) => break,
        }
    }
    assert!(emitted <= count);
});
