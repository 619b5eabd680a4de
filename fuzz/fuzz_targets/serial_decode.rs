#![no_main]

use libfuzzer_sys::fuzz_target;

// Fuzz target: binary layout decoding of arbitrary bytes.
//
// Catches unchecked length prefixes and oversized allocations.
fuzz_target!(|data: &[u8]| {
    if let Ok((record, used)) = arc_types::serial::decode_from(data) {
        assert!(used <= data.len());
        assert_eq!(used, arc_types::serial::encoded_len(&record));
    }
});
