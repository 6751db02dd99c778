// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Work out the radio settings of a capture from user-friendly numbers.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::PathBuf,
};

use clap::Parser;
use log::info;
use vec1::vec1;

use super::common::{parse_windows, InfoPrinter};
use crate::{
    constants::{
        DEFAULT_BINS_EXPONENT, DEFAULT_CENTER_FREQ_HZ, DEFAULT_INTEGRATION_TIME_S,
        DEFAULT_SAMPLE_RATE_KSPS, DEFAULT_WINDOW,
    },
    measurement::{CaptureSettings, MeasurementSettings},
    window::WINDOW_FUNCTIONS_COMMA_SEPARATED,
    HydrogenlineError,
};

lazy_static::lazy_static! {
    static ref SAMPLE_RATE_HELP: String =
        format!("The sample rate [kilo-samples per second]. Default: {DEFAULT_SAMPLE_RATE_KSPS}");

    static ref BINS_HELP: String =
        format!("The number of frequency bins, as a power of 2. Default: {DEFAULT_BINS_EXPONENT}");

    static ref TINT_HELP: String =
        format!("The integration time of a single measurement [seconds]. Default: {DEFAULT_INTEGRATION_TIME_S}");

    static ref CENTER_FREQ_HELP: String =
        format!("The center frequency [Hz]. Default: {DEFAULT_CENTER_FREQ_HZ}");

    static ref WINDOWS_HELP: String =
        format!("The window functions to estimate PSDs with. Default: {DEFAULT_WINDOW}. Supported windows: {}", *WINDOW_FUNCTIONS_COMMA_SEPARATED);
}

/// Print the number of bins, sample rate, number of averages and actual
/// integration time for a capture.
#[derive(Parser, Debug, Default)]
pub(super) struct CaptureSettingsArgs {
    #[clap(short, long, help = SAMPLE_RATE_HELP.as_str())]
    pub(super) sample_rate: Option<u32>,

    #[clap(short, long, help = BINS_HELP.as_str())]
    pub(super) bins: Option<u32>,

    #[clap(short, long, help = TINT_HELP.as_str())]
    pub(super) tint: Option<f64>,

    #[clap(short, long, help = CENTER_FREQ_HELP.as_str())]
    pub(super) center_freq: Option<u64>,

    /// The receiver gain [dB]. Default: 0
    #[clap(short, long, allow_hyphen_values = true)]
    pub(super) gain: Option<f64>,

    #[clap(short, long, multiple_values(true), help = WINDOWS_HELP.as_str())]
    pub(super) windows: Option<Vec<String>>,

    /// Write measurement settings with these values to this JSON file.
    #[clap(short, long, parse(from_os_str))]
    pub(super) output: Option<PathBuf>,
}

impl CaptureSettingsArgs {
    pub(super) fn run(self) -> Result<MeasurementSettings, HydrogenlineError> {
        let Self {
            sample_rate,
            bins,
            tint,
            center_freq,
            gain,
            windows,
            output,
        } = self;

        let capture = CaptureSettings::derive(
            sample_rate.unwrap_or(DEFAULT_SAMPLE_RATE_KSPS),
            bins.unwrap_or(DEFAULT_BINS_EXPONENT),
            tint.unwrap_or(DEFAULT_INTEGRATION_TIME_S),
        )?;
        let windows = match windows {
            Some(windows) => parse_windows(&windows)?,
            None => vec1![DEFAULT_WINDOW],
        };

        let settings = MeasurementSettings {
            folder: String::new(),
            bins: capture.bins,
            sample_rate: capture.sample_rate,
            center_freq: center_freq.unwrap_or(DEFAULT_CENTER_FREQ_HZ),
            gain: gain.unwrap_or(0.0),
            windows,
            averages: capture.averages,
            tint: capture.tint,
            reference: None,
            start: None,
            stop: None,
        };

        let mut printer = InfoPrinter::new("Capture settings".into());
        printer.push_block(vec![
            format!("Bins:             {}", capture.bins).into(),
            format!("Sample rate:      {} S/s", capture.sample_rate).into(),
            format!("Averages:         {}", capture.averages).into(),
            format!("Integration time: {:.3} s", capture.tint).into(),
        ]);
        if let Some(bin) = settings.hydrogen_line_bin() {
            printer.push_line(format!("Hydrogen line in bin {bin}").into());
        } else {
            printer.push_line("The hydrogen line is outside the band".into());
        }
        printer.display();

        if let Some(output) = output {
            let mut f = BufWriter::new(File::create(&output)?);
            serde_json::to_writer_pretty(&mut f, &settings)
                .map_err(|e| HydrogenlineError::Generic(e.to_string()))?;
            f.flush()?;
            info!("Wrote {}", output.display());
        }

        Ok(settings)
    }
}
