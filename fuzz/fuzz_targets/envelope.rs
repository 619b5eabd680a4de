#![no_main]

use libfuzzer_sys::fuzz_target;

// Fuzz target: envelope parsing on arbitrary payloads.
//
// The body offset must always fall inside the payload.
fuzz_target!(|data: &[u8]| {
    if let Ok(envelope) = arc_wire::parse_envelope(data) {
        assert!(envelope.body_offset <= data.len());
        let _ = envelope.charset();
    }
});
