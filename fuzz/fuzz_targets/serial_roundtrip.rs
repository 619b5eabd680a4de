#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    url: String,
    origin_address: String,
    content_type: String,
    seconds: u32,
    declared_length: u64,
    payload: Vec<u8>,
}

// Fuzz target: encode then decode a structured record.
fuzz_target!(|input: Input| {
    let Some(timestamp) = arc_wire::timestamp::from_epoch_millis(i64::from(input.seconds) * 1000)
    else {
        return;
    };
    let header = arc_wire::RecordHeader {
        url: input.url,
        origin_address: input.origin_address,
        timestamp,
        declared_content_type: input.content_type,
        declared_length: input.declared_length,
    };
    let record = arc_types::Record::from_parts(header, input.payload);
    let Ok(bytes) = arc_types::serial::encode(&record) else {
        return;
    };
    let back = arc_types::serial::decode(&bytes).expect("encoded record must decode");
    assert_eq!(back.header(), record.header());
    assert_eq!(back.payload(), record.payload());
});
