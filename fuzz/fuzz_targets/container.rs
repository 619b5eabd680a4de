#![no_main]

use libfuzzer_sys::fuzz_target;

// Fuzz target: container description validation over arbitrary lines.
fuzz_target!(|lines: Vec<String>| {
    if let Ok(container) = arc_wire::ContainerHeader::from_lines(&lines) {
        let _ = container.file_name();
        assert!(container.trailer_lines <= arc_wire::container::MAX_TRAILER_LINES);
    }
});
