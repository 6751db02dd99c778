// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::fs::File;

use tempfile::TempDir;

use hydrogenline::measurement::MeasurementSettings;

use crate::{get_cmd_output, get_files, hydrogenline, write_json};

#[test]
fn test_capture_settings() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let output = tmp_dir.path().join("settings.json");
    #[rustfmt::skip]
    let cmd = hydrogenline()
        .args([
            "capture-settings",
            "-s", "2048",
            "-b", "11",
            "-t", "1",
            "-g", "-5",
            "-w", "blackman", "hamming",
            "-o", &output.display().to_string(),
        ])
        .ok();
    assert!(cmd.is_ok(), "capture-settings failed: {}", cmd.err().unwrap());
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("Averages"), "{stdout}");

    let settings: MeasurementSettings =
        serde_json::from_reader(File::open(&output).unwrap()).unwrap();
    assert_eq!(settings.bins, 2048);
    assert_eq!(settings.sample_rate, 2_048_000);
    // 1 ms per block.
    assert_eq!(settings.averages, 1000);
    assert_eq!(settings.gain, -5.0);
    assert_eq!(settings.windows.len(), 2);
}

#[test]
fn test_capture_settings_repeated_window() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let output = tmp_dir.path().join("settings.json");
    let cmd = hydrogenline()
        .args([
            "capture-settings",
            "-w",
            "hanning",
            "hanning",
            "-o",
            &output.display().to_string(),
        ])
        .ok();
    assert!(cmd.is_ok(), "capture-settings failed: {}", cmd.err().unwrap());

    let settings: MeasurementSettings =
        serde_json::from_reader(File::open(&output).unwrap()).unwrap();
    assert_eq!(settings.windows.len(), 1);
}

#[test]
fn test_verify_reference() {
    let files = get_files(true);
    let cmd = hydrogenline()
        .arg("verify-reference")
        .arg(&files.reference)
        .arg("-d")
        .arg(&files.measurement)
        .ok();
    assert!(cmd.is_ok(), "verify-reference failed: {}", cmd.err().unwrap());
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("usable reference"), "{stdout}");
}

#[test]
fn test_verify_reference_mismatch() {
    let files = get_files(true);
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let mut settings = crate::get_settings();
    settings.bins *= 2;
    let settings_file = tmp_dir.path().join("settings.json");
    write_json(&settings_file, &settings);

    let cmd = hydrogenline()
        .arg("verify-reference")
        .arg(&files.reference)
        .arg("-d")
        .arg(&settings_file)
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("number of frequency bins"), "{stderr}");
}
