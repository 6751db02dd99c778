// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::fs::File;

use approx::assert_abs_diff_eq;
use tempfile::TempDir;

use hydrogenline::{dsp::BaselinePolicy, window::WindowFunction, ProcessedOutput};

use crate::{get_cmd_output, get_files, hydrogenline, NUM_BINS, NUM_CAPTURES};

fn read_output(path: &std::path::Path) -> ProcessedOutput {
    serde_json::from_reader(File::open(path).unwrap()).unwrap()
}

#[test]
fn test_spectra_with_named_reference() {
    let files = get_files(true);
    #[rustfmt::skip]
    let cmd = hydrogenline()
        .args([
            "spectra",
            "--no-progress-bars",
            "-d", &files.measurement.display().to_string(),
            "-b", "3",
            "-m", "2",
        ])
        .ok();
    assert!(cmd.is_ok(), "spectra failed: {}", cmd.err().unwrap());

    let output = read_output(&files.measurement.with_file_name("run_spectra.json"));
    assert_eq!(output.policy, BaselinePolicy::Pipeline);
    assert_eq!(output.units, "relative");
    assert_eq!(output.timestamps.len(), NUM_CAPTURES - 2);
    assert_eq!(output.timestamps[0], "20240314_12_00_00");
    assert_eq!(output.frequencies_hz.len(), NUM_BINS - 3);
    assert_eq!(
        output.spectra.keys().copied().collect::<Vec<_>>(),
        vec![WindowFunction::Hamming, WindowFunction::Hanning]
    );
    for batch in output.spectra.values() {
        assert_eq!(batch.psd.len(), NUM_CAPTURES - 2);
        for spectrum in &batch.psd {
            assert_eq!(spectrum.len(), NUM_BINS - 3);
            // Baseline-subtracted spectra have a zero mean.
            let mean = spectrum.iter().sum::<f64>() / spectrum.len() as f64;
            assert_abs_diff_eq!(mean, 0.0, epsilon = 1e-9);
        }
        assert!(batch.color_scale_max > 0.0);
    }
}

#[test]
fn test_spectra_without_reference() {
    let files = get_files(false);
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let output = tmp_dir.path().join("out.json");
    #[rustfmt::skip]
    let cmd = hydrogenline()
        .args([
            "spectra",
            "--no-progress-bars",
            "-d", &files.measurement.display().to_string(),
            "--windows", "hanning",
            "-o", &output.display().to_string(),
        ])
        .ok();
    assert!(cmd.is_ok(), "spectra failed: {}", cmd.err().unwrap());

    let output = read_output(&output);
    assert_eq!(output.timestamps.len(), NUM_CAPTURES);
    assert_eq!(output.frequencies_hz.len(), NUM_BINS);
    assert_eq!(output.spectra.len(), 1);
    assert!(output.spectra.contains_key(&WindowFunction::Hanning));
}

#[test]
fn test_spectra_explicit_reference_and_dry_run() {
    let files = get_files(false);
    #[rustfmt::skip]
    let cmd = hydrogenline()
        .args([
            "spectra",
            "--no-progress-bars",
            "--dry-run",
            "-d", &files.measurement.display().to_string(),
            "-r", &files.reference.display().to_string(),
        ])
        .ok();
    assert!(cmd.is_ok(), "spectra failed: {}", cmd.err().unwrap());
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("Dry run"), "{stdout}");
    assert!(!files.measurement.with_file_name("run_spectra.json").exists());
}

#[test]
fn test_spectra_arg_file_and_save_toml() {
    let files = get_files(true);
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let toml = tmp_dir.path().join("args.toml");
    let output = tmp_dir.path().join("out.json");

    // Save the arguments, without processing anything.
    #[rustfmt::skip]
    let cmd = hydrogenline()
        .args([
            "spectra",
            "--no-progress-bars",
            "--dry-run",
            "-d", &files.measurement.display().to_string(),
            "-b", "5",
            "-o", &output.display().to_string(),
            "--save-toml", &toml.display().to_string(),
        ])
        .ok();
    assert!(cmd.is_ok(), "spectra failed: {}", cmd.err().unwrap());
    assert!(toml.exists());
    assert!(!output.exists());

    // Now run from the saved arguments.
    let cmd = hydrogenline()
        .args(["spectra", "--no-progress-bars"])
        .arg(&toml)
        .ok();
    assert!(cmd.is_ok(), "spectra failed: {}", cmd.err().unwrap());
    let output = read_output(&output);
    assert_eq!(output.frequencies_hz.len(), NUM_BINS - 5);
}

#[test]
fn test_spectra_window_too_big() {
    let files = get_files(true);
    #[rustfmt::skip]
    let cmd = hydrogenline()
        .args([
            "spectra",
            "--no-progress-bars",
            "-d", &files.measurement.display().to_string(),
            "-m", &NUM_CAPTURES.to_string(),
        ])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("time median window"), "{stderr}");
}
