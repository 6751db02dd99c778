// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tests against the input-data arguments shared by subcommands.

use std::{fs::File, io::Write};

use tempfile::TempDir;

use super::*;
use crate::cli::tests::{get_record, get_reference, get_settings, write_json, write_measurement};

#[test]
fn test_merge_prefers_self() {
    let cli = InputDataArgs {
        measurement: Some(PathBuf::from("cli.json")),
        reference: None,
        no_reference: false,
        windows: None,
    };
    let file = InputDataArgs {
        measurement: Some(PathBuf::from("file.json")),
        reference: Some(PathBuf::from("ref.json")),
        no_reference: true,
        windows: Some(vec!["hamming".to_string()]),
    };
    let merged = cli.merge(file);
    assert_eq!(merged.measurement, Some(PathBuf::from("cli.json")));
    assert_eq!(merged.reference, Some(PathBuf::from("ref.json")));
    assert!(merged.no_reference);
    assert_eq!(merged.windows, Some(vec!["hamming".to_string()]));
}

#[test]
fn test_resolve_reference() {
    assert_eq!(
        resolve_reference(Path::new("/data/run/run.json"), "ref"),
        PathBuf::from("/data/run/ref.json")
    );
    assert_eq!(
        resolve_reference(Path::new("/data/run/run.json"), "ref.json"),
        PathBuf::from("/data/run/ref.json")
    );
    assert_eq!(
        resolve_reference(Path::new("/data/run/run.json"), "/refs/ref.json"),
        PathBuf::from("/refs/ref.json")
    );
    assert_eq!(
        resolve_reference(Path::new("run.json"), "ref"),
        PathBuf::from("ref.json")
    );
}

#[test]
fn test_read_json_errors() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.json");
    let result: Result<MeasurementRecord, _> = read_json(&missing);
    assert!(matches!(result, Err(InputDataArgsError::DoesNotExist(_))));

    let garbage = dir.path().join("garbage.json");
    let mut f = File::create(&garbage).unwrap();
    writeln!(f, "{{\"settings\": 3}}").unwrap();
    drop(f);
    let result: Result<MeasurementRecord, _> = read_json(&garbage);
    assert!(matches!(result, Err(InputDataArgsError::Json { .. })));
}

#[test]
fn test_parse_filters_windows() {
    let dir = TempDir::new().unwrap();
    let file = write_measurement(&dir, 2, true);
    let measurement = InputDataArgs {
        measurement: Some(file),
        windows: Some(vec!["BLACKMAN".to_string(), "blackman".to_string()]),
        ..Default::default()
    }
    .parse("Testing")
    .unwrap();
    assert_eq!(measurement.psd().len(), 1);
    assert!(measurement.psd().contains_key(&WindowFunction::Blackman));
    assert_eq!(measurement.settings().windows.len(), 1);
    assert!(measurement
        .reference_psd(WindowFunction::Blackman)
        .is_some());
}

#[test]
fn test_parse_windows() {
    let names = ["Blackman", "hanning", "BLACKMAN", "hamming", "hanning"]
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>();
    let windows = parse_windows(&names).unwrap();
    assert_eq!(
        windows.as_slice(),
        &[
            WindowFunction::Blackman,
            WindowFunction::Hanning,
            WindowFunction::Hamming
        ]
    );

    let result = parse_windows(&["hanning".to_string(), "kaiser".to_string()]);
    assert!(matches!(result, Err(InputDataArgsError::BadWindow(w)) if w == "kaiser"));
    assert!(matches!(
        parse_windows(&[]),
        Err(InputDataArgsError::NoWindows)
    ));
}

#[test]
fn test_parse_window_errors() {
    let dir = TempDir::new().unwrap();
    let file = write_measurement(&dir, 2, false);

    let result = InputDataArgs {
        measurement: Some(file.clone()),
        windows: Some(vec!["kaiser".to_string()]),
        ..Default::default()
    }
    .parse("Testing");
    assert!(matches!(result, Err(InputDataArgsError::BadWindow(_))));

    let result = InputDataArgs {
        measurement: Some(file.clone()),
        windows: Some(vec!["hamming".to_string()]),
        ..Default::default()
    }
    .parse("Testing");
    assert!(matches!(
        result,
        Err(InputDataArgsError::WindowNotInMeasurement(
            WindowFunction::Hamming
        ))
    ));

    let result = InputDataArgs {
        measurement: Some(file),
        windows: Some(vec![]),
        ..Default::default()
    }
    .parse("Testing");
    assert!(matches!(result, Err(InputDataArgsError::NoWindows)));
}

#[test]
fn test_parse_without_measurement() {
    let result = InputDataArgs::default().parse("Testing");
    assert!(matches!(result, Err(InputDataArgsError::NoMeasurement)));
}

#[test]
fn test_parse_mismatched_reference() {
    let dir = TempDir::new().unwrap();
    let settings = get_settings();
    let mut reference = get_reference(&settings);
    reference.settings.sample_rate *= 2;
    let reference_file = dir.path().join("reference.json");
    write_json(&reference_file, &reference);
    let file = dir.path().join("run.json");
    write_json(&file, &get_record(settings, 2));

    let result = InputDataArgs {
        measurement: Some(file),
        reference: Some(reference_file),
        ..Default::default()
    }
    .parse("Testing");
    match result {
        Err(InputDataArgsError::Measurement(MeasurementError::ReferenceMismatch {
            what, ..
        })) => assert_eq!(what, "sample rate"),
        Err(e) => panic!("unexpected error: {e}"),
        Ok(_) => panic!("expected an error"),
    }
}

#[test]
fn test_named_but_missing_reference() {
    let dir = TempDir::new().unwrap();
    let mut settings = get_settings();
    settings.reference = Some("not_here".to_string());
    let file = dir.path().join("run.json");
    write_json(&file, &get_record(settings, 2));

    let result = InputDataArgs {
        measurement: Some(file),
        ..Default::default()
    }
    .parse("Testing");
    match result {
        Err(InputDataArgsError::DoesNotExist(p)) => {
            assert_eq!(p, dir.path().join("not_here.json"))
        }
        Err(e) => panic!("unexpected error: {e}"),
        Ok(_) => panic!("expected an error"),
    }
}

#[test]
fn test_errors_become_hydrogenline_errors() {
    let e: HydrogenlineError = InputDataArgsError::NoWindows.into();
    assert!(matches!(e, HydrogenlineError::Window(_)));
    let e: HydrogenlineError = InputDataArgsError::NoMeasurement.into();
    assert!(matches!(e, HydrogenlineError::InputData(_)));
    let e: HydrogenlineError = InputDataArgsError::Measurement(MeasurementError::NoReference).into();
    assert!(matches!(e, HydrogenlineError::Reference(_)));
    let e: HydrogenlineError =
        InputDataArgsError::Measurement(MeasurementError::DuplicateWindow(WindowFunction::Hanning))
            .into();
    assert!(matches!(e, HydrogenlineError::Window(_)));
}
