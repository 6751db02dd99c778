// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::fs::File;

use approx::assert_abs_diff_eq;

use hydrogenline::{dsp::BaselinePolicy, ProcessedOutput};

use crate::{get_cmd_output, get_files, hydrogenline, NUM_BINS, NUM_CAPTURES};

#[test]
fn test_waterfall() {
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

    let output: ProcessedOutput = serde_json::from_reader(
        File::open(files.measurement.with_file_name("run_waterfall.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(output.policy, BaselinePolicy::ReferenceMean);
    assert_eq!(output.units, "W");
    assert_eq!(output.timestamps.len(), NUM_CAPTURES);
    assert_eq!(output.frequencies_hz.len(), NUM_BINS);
    for batch in output.spectra.values() {
        for (i, spectrum) in batch.psd.iter().enumerate() {
            // Normalised spectra are flat apart from the line.
            let line_bin = NUM_BINS / 2 + i % 3;
            let off_line = spectrum[(line_bin + 5) % NUM_BINS];
            for (j, &p) in spectrum.iter().enumerate() {
                if j != line_bin {
                    assert_abs_diff_eq!(p, off_line, epsilon = 1e-15);
                }
            }
            assert!(spectrum[line_bin] > off_line);
        }
    }
}

#[test]
fn test_waterfall_needs_reference() {
    let files = get_files(false);
    #[rustfmt::skip]
    let cmd = hydrogenline()
        .args([
            "waterfall",
            "--no-progress-bars",
            "-d", &files.measurement.display().to_string(),
        ])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("reference"), "{stderr}");
}
