//! Inspect, restore, inspect again: the workflow on a damaged session folder.

use std::fs;
use std::process::ExitCode;

use wavemend_cli::commands::{inspect, restore};
use wavemend_core::{parse, synthesize, ContainerKind, PcmFormat};

fn session_file(kind: ContainerKind, format: PcmFormat, payload_len: u32) -> Vec<u8> {
    let mut data = synthesize(kind, &format, payload_len);
    data.extend((0..payload_len).map(|i| (i * 31 % 256) as u8));
    data
}

#[test]
fn test_damaged_session_round_trip() {
    let tmp = tempfile::tempdir().unwrap();
    let src = tmp.path().join("session");
    let dst = tmp.path().join("repaired");
    fs::create_dir_all(src.join("audio")).unwrap();

    let format = PcmFormat::new(48000, 16, 2);
    let original = session_file(ContainerKind::Wave, format, 4000);
    let mut damaged = original.clone();
    damaged[..44].fill(0);
    fs::write(src.join("audio").join("vox.wav"), &damaged).unwrap();

    // Live writes its AIFF audio right after a 54-byte header.
    let aiff = session_file(ContainerKind::Aiff, format, 4000);
    let mut damaged_aiff = aiff.clone();
    damaged_aiff[..12].copy_from_slice(b"\0\0\0\0\0\0\0\0AIFF");
    fs::write(src.join("audio").join("bass.aif"), &damaged_aiff).unwrap();
    fs::write(src.join("project.logicx"), b"{}").unwrap();

    let src_arg = src.to_str().unwrap();
    assert_eq!(inspect::run(src_arg, true).unwrap(), ExitCode::from(1));

    let options = restore::RestoreOptions {
        format,
        application: "live".parse().unwrap(),
        json: true,
        ..restore::RestoreOptions::default()
    };
    let code = restore::run(src_arg, dst.to_str().unwrap(), &options).unwrap();
    assert_eq!(code, ExitCode::SUCCESS);

    let vox = fs::read(dst.join("audio").join("vox.wav")).unwrap();
    assert_eq!(vox, original);
    let bass = fs::read(dst.join("audio").join("bass.aif")).unwrap();
    assert_eq!(bass, aiff);
    assert!(!parse(&bass).has_errors());

    assert_eq!(
        inspect::run(dst.to_str().unwrap(), true).unwrap(),
        ExitCode::SUCCESS
    );

    // A second run leaves the existing results alone.
    let code = restore::run(src_arg, dst.to_str().unwrap(), &options).unwrap();
    assert_eq!(code, ExitCode::SUCCESS);
}

#[test]
fn test_profiles_file_is_applied() {
    let tmp = tempfile::tempdir().unwrap();
    let src = tmp.path().join("take.wav");
    let dst = tmp.path().join("fixed.wav");

    // 100 bytes of vendor preamble before the audio data.
    let mut damaged = vec![0xEEu8; 100];
    damaged.extend_from_slice(&[0x42u8; 600]);
    fs::write(&src, &damaged).unwrap();

    let profiles = tmp.path().join("profiles.json");
    fs::write(
        &profiles,
        r#"{"profiles":[{"application":"logic","wave_default_offset":100,"aiff_default_offset":512}]}"#,
    )
    .unwrap();

    let options = restore::RestoreOptions {
        profiles: Some(profiles),
        json: true,
        ..restore::RestoreOptions::default()
    };
    restore::run(src.to_str().unwrap(), dst.to_str().unwrap(), &options).unwrap();

    let fixed = fs::read(&dst).unwrap();
    assert_eq!(fixed.len(), 44 + 600);
    assert!(fixed[44..].iter().all(|&b| b == 0x42));
}

#[test]
fn test_missing_profiles_file_is_an_error() {
    let tmp = tempfile::tempdir().unwrap();
    let src = tmp.path().join("take.wav");
    fs::write(&src, [0u8; 100]).unwrap();

    let options = restore::RestoreOptions {
        profiles: Some(tmp.path().join("nope.json")),
        ..restore::RestoreOptions::default()
    };
    let err = restore::run(
        src.to_str().unwrap(),
        tmp.path().join("out.wav").to_str().unwrap(),
        &options,
    )
    .unwrap_err();
    assert!(err.to_string().contains("Failed to read profiles file"));
}
