// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Integration tests.
//!
//! Some help for laying out these tests was taken from:
//! https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html

mod capture_settings;
mod no_stderr;
mod spectra;
mod waterfall;

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    process::Output,
    str::from_utf8,
};

use assert_cmd::{output::OutputError, Command};
use tempfile::TempDir;
use vec1::vec1;

use hydrogenline::{
    measurement::{Capture, MeasurementRecord, MeasurementSettings, Reference, ReferenceSettings},
    window::WindowFunction,
};

const NUM_BINS: usize = 32;
const NUM_CAPTURES: usize = 8;

fn hydrogenline() -> Command {
    Command::cargo_bin("hydrogenline").unwrap()
}

fn get_cmd_output(result: Result<Output, OutputError>) -> (String, String) {
    let output = match result {
        Ok(o) => o,
        Err(o) => o.as_output().unwrap().clone(),
    };
    (
        from_utf8(&output.stdout).unwrap().to_string(),
        from_utf8(&output.stderr).unwrap().to_string(),
    )
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) {
    let mut f = BufWriter::new(File::create(path).expect("couldn't make file"));
    serde_json::to_writer(&mut f, value).unwrap();
    f.flush().unwrap();
}

fn get_settings() -> MeasurementSettings {
    MeasurementSettings {
        folder: "integration".to_string(),
        bins: NUM_BINS,
        sample_rate: 2_048_000,
        center_freq: 1_420_000_000,
        gain: 30.0,
        windows: vec1![WindowFunction::Hamming, WindowFunction::Hanning],
        averages: 100,
        tint: 0.0016,
        reference: None,
        start: Some("20240314_12_00_00".to_string()),
        stop: Some("20240314_12_07_00".to_string()),
    }
}

/// A receiver gain curve that rolls off towards the band edges.
fn gain_curve() -> Vec<f64> {
    (0..NUM_BINS)
        .map(|j| {
            let x = j as f64 / (NUM_BINS - 1) as f64 - 0.5;
            1e-9 * (1.0 - 2.0 * x * x)
        })
        .collect()
}

struct Files {
    /// Keep the directory alive for as long as the files are needed.
    _dir: TempDir,
    measurement: PathBuf,
    reference: PathBuf,
}

/// Write a measurement with a line drifting across a few bins, and a reference
/// that the measurement names.
fn get_files(name_reference: bool) -> Files {
    let dir = TempDir::new().expect("couldn't make tmp dir");
    let mut settings = get_settings();

    let reference = Reference {
        settings: ReferenceSettings {
            fname: "reference".to_string(),
            bins: settings.bins,
            sample_rate: settings.sample_rate,
            center_freq: settings.center_freq,
            gain: settings.gain,
            windows: settings.windows.clone(),
            averages: settings.averages,
            tint: settings.tint,
        },
        psd: settings
            .windows
            .iter()
            .map(|&w| (w, gain_curve()))
            .collect(),
    };
    let reference_file = dir.path().join("reference.json");
    write_json(&reference_file, &reference);
    if name_reference {
        settings.reference = Some("reference".to_string());
    }

    let captures = (0..NUM_CAPTURES)
        .map(|i| Capture {
            name: format!("20240314_12_{:02}_00.csv", i),
            psd: settings
                .windows
                .iter()
                .map(|&w| {
                    let mut psd = gain_curve();
                    psd[NUM_BINS / 2 + i % 3] *= 1.5;
                    (w, psd)
                })
                .collect(),
        })
        .collect();
    let measurement_file = dir.path().join("run.json");
    write_json(
        &measurement_file,
        &MeasurementRecord {
            settings,
            captures,
        },
    );

    Files {
        _dir: dir,
        measurement: measurement_file,
        reference: reference_file,
    }
}

#[test]
fn test_help() {
    let (stdout, stderr) = get_cmd_output(hydrogenline().arg("--help").ok());
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");
    for subcommand in ["spectra", "waterfall", "verify-reference", "capture-settings"] {
        assert!(stdout.contains(subcommand), "{subcommand} missing from help");
    }
}

#[test]
fn test_no_arguments_prints_help() {
    let cmd = hydrogenline().ok();
    assert!(cmd.is_err());
}

#[test]
fn test_bad_input_is_reported() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let missing = tmp_dir.path().join("missing.json");
    let cmd = hydrogenline()
        .args(["spectra", "--no-progress-bars", "-d"])
        .arg(&missing)
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.starts_with("Error: "), "{stderr}");
    assert!(stderr.contains("doesn't exist"), "{stderr}");
}
