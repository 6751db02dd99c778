// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tests to ensure there is no stderr output for successful commands.

use crate::{get_cmd_output, get_files, hydrogenline};

#[test]
fn test_spectra_no_stderr() {
    let files = get_files(true);
    #[rustfmt::skip]
    let cmd = hydrogenline()
        .args([
            "spectra",
            "--no-progress-bars",
            "-d", &files.measurement.display().to_string(),
        ])
        .ok();
    assert!(cmd.is_ok(), "spectra failed: {}", cmd.err().unwrap());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");
}

#[test]
fn test_waterfall_no_stderr() {
    let files = get_files(true);
    #[rustfmt::skip]
    let cmd = hydrogenline()
        .args([
            "waterfall",
            "--no-progress-bars",
            "-d", &files.measurement.display().to_string(),
        ])
        .ok();
    assert!(cmd.is_ok(), "waterfall failed: {}", cmd.err().unwrap());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");
}

#[test]
fn test_capture_settings_no_stderr() {
    let cmd = hydrogenline().arg("capture-settings").ok();
    assert!(cmd.is_ok(), "capture-settings failed: {}", cmd.err().unwrap());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");
}
