// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to verify that a reference measurement can calibrate a measurement.

use std::path::PathBuf;

use clap::Parser;
use log::info;

use super::common::{read_json, InfoPrinter};
use crate::{
    dsp::watts_to_dbm,
    measurement::{MeasurementError, MeasurementSettings, Reference, ReferenceWarning},
    HydrogenlineError,
};

/// Verify that a reference measurement is compatible with the settings of a
/// measurement, and print a summary of the reference.
#[derive(Parser, Debug)]
pub(super) struct VerifyReferenceArgs {
    /// Path to the reference measurement file (JSON).
    #[clap(name = "REFERENCE", parse(from_os_str))]
    pub(super) reference: PathBuf,

    /// Path to a measurement file, or a file with just measurement settings
    /// (JSON). Without this, only the reference itself is checked.
    #[clap(short = 'd', long = "data", parse(from_os_str))]
    pub(super) measurement: Option<PathBuf>,
}

/// Either a whole measurement, or only its settings.
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum SettingsFile {
    Measurement { settings: MeasurementSettings },
    Settings(MeasurementSettings),
}

impl VerifyReferenceArgs {
    pub(super) fn run(&self) -> Result<Option<ReferenceWarning>, HydrogenlineError> {
        let reference: Reference = read_json(&self.reference)?;
        let settings = &reference.settings;

        let mut printer = InfoPrinter::new(format!("Reference {}", self.reference.display()).into());
        printer.push_block(vec![
            format!("{} bins", settings.bins).into(),
            format!("Sample rate:      {} kS/s", settings.sample_rate as f64 / 1e3).into(),
            format!("Center frequency: {} MHz", settings.center_freq as f64 / 1e6).into(),
            format!("Gain:             {} dB", settings.gain).into(),
        ]);
        for window in settings.windows.iter() {
            let psd = reference
                .psd
                .get(window)
                .ok_or_else(|| MeasurementError::MissingWindow {
                    window: *window,
                    thing: "the reference".to_string(),
                })?;
            if psd.len() != settings.bins {
                return Err(MeasurementError::BadShape {
                    thing: format!("the {window} reference PSD"),
                    expected: settings.bins,
                    actual: psd.len(),
                }
                .into());
            }
            let mean = psd.iter().sum::<f64>() / psd.len().max(1) as f64;
            printer.push_line(
                format!("{window:9} mean power: {:.2} dBm", watts_to_dbm(mean)).into(),
            );
        }
        printer.display();

        let warning = match &self.measurement {
            Some(measurement) => {
                let measurement_settings = match read_json(measurement)? {
                    SettingsFile::Measurement { settings } => settings,
                    SettingsFile::Settings(settings) => settings,
                };
                let warning = measurement_settings.check_reference(settings)?;
                if let Some(w) = &warning {
                    log::warn!("{w}");
                }
                info!(
                    "{} is a usable reference for {}",
                    self.reference.display(),
                    measurement.display()
                );
                warning
            }
            None => None,
        };

        Ok(warning)
    }
}
