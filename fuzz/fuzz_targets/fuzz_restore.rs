#![no_main]

use libfuzzer_sys::fuzz_target;
use wavemend_core::{parse, restore, ContainerKind, PcmFormat, ProfileTable, RestoreParameters};

fuzz_target!(|input: (bool, i16, i16, Vec<u8>)| {
    let (aiff, start, end, data) = input;
    let kind = if aiff { ContainerKind::Aiff } else { ContainerKind::Wave };
    let params = RestoreParameters::new(kind, PcmFormat::new(44100, 16, 2))
        .with_start_offset(Some(start as i64))
        .with_end_offset(Some(end as i64));

    if let Ok(restored) = restore(&data, &params, &ProfileTable::builtin()) {
        assert_eq!(restored.header_len, kind.header_len());
        assert_eq!(
            restored.bytes.len() as u64,
            kind.header_len() as u64 + restored.range.len()
        );
        assert!(!parse(&restored.bytes).has_errors());
    }
});
