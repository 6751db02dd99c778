// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.


use std::path::PathBuf;

use clap::Parser;
use log::{debug, info, trace};
use serde::{Deserialize, Serialize};

use super::common::{display_warnings, InfoPrinter, InputDataArgs, ARG_FILE_HELP};
use crate::{constants::DEFAULT_PEAK_FRACTION, params::SpectraParams, HydrogenlineError};

lazy_static::lazy_static! {
    static ref PEAK_HELP: String =
        format!("The top of the colour scale, as a fraction of the largest corrected power. Default: {DEFAULT_PEAK_FRACTION}");
}

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct SpectraArgs {
    #[clap(name = "ARGUMENTS_FILE", help = ARG_FILE_HELP.as_str(), parse(from_os_str))]
    pub(super) args_file: Option<PathBuf>,

    #[clap(flatten)]
    #[serde(rename = "data")]
    #[serde(default)]
    pub(super) data_args: InputDataArgs,

    /// The number of bins in the moving median across frequency. Values of 0
    /// or 1 disable it. Every bin of the window must be available, so the
    /// spectra lose this many bins. Default: 1
    #[clap(short = 'b', long, help_heading = "PROCESSING")]
    pub(super) freq_window: Option<usize>,

    /// The number of measurements in the moving median across time. Values of
    /// 0 or 1 disable it. Every measurement of the window must be available,
    /// so this many measurements are lost. Default: 1
    #[clap(short = 'm', long, help_heading = "PROCESSING")]
    pub(super) time_window: Option<usize>,

    #[clap(short, long, help = PEAK_HELP.as_str(), help_heading = "PROCESSING")]
    pub(super) peak: Option<f64>,

    /// Path to the output JSON file. The default is next to the measurement
    /// file, with "_spectra" appended to its name.
    #[clap(short, long, parse(from_os_str), help_heading = "OUTPUT FILES")]
    pub(super) output: Option<PathBuf>,
}

impl SpectraArgs {
    /// Both command-line and file arguments overlap in terms of what is
    /// available; this function consolidates everything that was specified
    /// into a single struct. Where applicable, it will prefer CLI parameters
    /// over those in the file.
    ///
    /// This function should only ever merge arguments, and not try to make
    /// sense of them.
    pub(super) fn merge(self) -> Result<SpectraArgs, HydrogenlineError> {
        debug!("Merging command-line arguments with the argument file");

        let cli_args = self;

        if let Some(arg_file) = cli_args.args_file {
            // Read in the file arguments. Ensure all of the file args are
            // accounted for by pattern matching.
            let SpectraArgs {
                args_file: _,
                data_args,
                freq_window,
                time_window,
                peak,
                output,
            } = unpack_arg_file!(arg_file);

            // Merge all the arguments, preferring the CLI args when available.
            Ok(SpectraArgs {
                args_file: None,
                data_args: cli_args.data_args.merge(data_args),
                freq_window: cli_args.freq_window.or(freq_window),
                time_window: cli_args.time_window.or(time_window),
                peak: cli_args.peak.or(peak),
                output: cli_args.output.or(output),
            })
        } else {
            Ok(cli_args)
        }
    }

    pub(super) fn parse(self) -> Result<SpectraParams, HydrogenlineError> {
        debug!("{:#?}", self);

        let Self {
            args_file: _,
            data_args,
            freq_window,
            time_window,
            peak,
            output,
        } = self;

        let peak = peak.unwrap_or(DEFAULT_PEAK_FRACTION);
        if !peak.is_finite() || peak <= 0.0 {
            return Err(SpectraArgsError::BadPeak(peak).into());
        }

        let output = match (output, data_args.measurement.as_ref()) {
            (Some(o), _) => o,
            (None, Some(m)) => default_output(m, "spectra"),
            (None, None) => PathBuf::from("spectra.json"),
        };
        let measurement = data_args.parse("Processing")?;

        let freq_window_size = freq_window.unwrap_or(1);
        let time_window_size = time_window.unwrap_or(1);
        let settings = measurement.settings();
        if freq_window_size > 1 && freq_window_size >= settings.bins {
            return Err(SpectraArgsError::FreqWindowTooBig {
                window: freq_window_size,
                bins: settings.bins,
            }
            .into());
        }
        if time_window_size > 1 && time_window_size >= measurement.num_measurements() {
            return Err(SpectraArgsError::TimeWindowTooBig {
                window: time_window_size,
                measurements: measurement.num_measurements(),
            }
            .into());
        }

        let mut printer = InfoPrinter::new("Processing".into());
        printer.push_block(vec![
            format!("Frequency median window: {freq_window_size} bins").into(),
            format!("Time median window:      {time_window_size} measurements").into(),
            format!("Colour-scale peak:       {peak}").into(),
        ]);
        printer.push_line(format!("Output: {}", output.display()).into());
        printer.display();

        display_warnings();

        Ok(SpectraParams {
            measurement,
            freq_window_size,
            time_window_size,
            peak,
            output,
        })
    }

    pub(super) fn run(self, dry_run: bool) -> Result<(), HydrogenlineError> {
        debug!("Converting arguments into parameters");
        trace!("{:#?}", self);
        let params = self.parse()?;

        if dry_run {
            info!("Dry run -- exiting now.");
            return Ok(());
        }

        params.run()?;
        Ok(())
    }
}

/// The output file next to a measurement file, e.g. "run.json" ->
/// "run_spectra.json".
pub(super) fn default_output(measurement_file: &std::path::Path, suffix: &str) -> PathBuf {
    let stem = measurement_file
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("measurement");
    measurement_file.with_file_name(format!("{stem}_{suffix}.json"))
}

#[derive(thiserror::Error, Debug)]
pub(super) enum SpectraArgsError {
    #[error("The colour-scale peak must be a positive number, not {0}")]
    BadPeak(f64),

    #[error("A frequency median window of {window} bins leaves nothing of the {bins}-bin spectra")]
    FreqWindowTooBig { window: usize, bins: usize },

    #[error("A time median window of {window} measurements leaves nothing of the {measurements} measurements")]
    TimeWindowTooBig { window: usize, measurements: usize },
}
