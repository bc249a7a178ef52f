#![no_main]

use libfuzzer_sys::fuzz_target;
use wavemend_core::{parse, parse_as, ContainerKind};

fuzz_target!(|data: &[u8]| {
    let report = parse(data);
    assert_eq!(report.file_size, data.len() as u64);
    assert!(report.raw_header_bytes.len() <= 54);

    for kind in ContainerKind::ALL {
        let report = parse_as(kind, data);
        if report.format_info.is_some() {
            assert!(report.format_chunk_size.is_some());
        }
    }
});
