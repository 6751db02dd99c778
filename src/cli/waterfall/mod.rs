// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.


use std::path::PathBuf;

use clap::Parser;
use log::{debug, info, trace};
use serde::{Deserialize, Serialize};

use super::{
    common::{display_warnings, InfoPrinter, InputDataArgs, ARG_FILE_HELP},
    spectra::default_output,
};
use crate::{
    constants::DEFAULT_PEAK_FRACTION, measurement::MeasurementError, params::WaterfallParams,
    HydrogenlineError,
};

lazy_static::lazy_static! {
    static ref PEAK_HELP: String =
        format!("The top of the colour scale, as a fraction of the largest normalised power. Default: {DEFAULT_PEAK_FRACTION}");
}

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct WaterfallArgs {
    #[clap(name = "ARGUMENTS_FILE", help = ARG_FILE_HELP.as_str(), parse(from_os_str))]
    pub(super) args_file: Option<PathBuf>,

    #[clap(flatten)]
    #[serde(rename = "data")]
    #[serde(default)]
    pub(super) data_args: InputDataArgs,

    /// Don't subtract each spectrum's mean power after dividing by the
    /// reference.
    #[clap(long, help_heading = "PROCESSING")]
    #[serde(default)]
    pub(super) no_normalise: bool,

    #[clap(short, long, help = PEAK_HELP.as_str(), help_heading = "PROCESSING")]
    pub(super) peak: Option<f64>,

    /// Path to the output JSON file. The default is next to the measurement
    /// file, with "_waterfall" appended to its name.
    #[clap(short, long, parse(from_os_str), help_heading = "OUTPUT FILES")]
    pub(super) output: Option<PathBuf>,
}

impl WaterfallArgs {
    /// Consolidate the command-line arguments with those from the argument
    /// file, preferring the command line.
    pub(super) fn merge(self) -> Result<WaterfallArgs, HydrogenlineError> {
        debug!("Merging command-line arguments with the argument file");

        let cli_args = self;

        if let Some(arg_file) = cli_args.args_file {
            let WaterfallArgs {
                args_file: _,
                data_args,
                no_normalise,
                peak,
                output,
            } = unpack_arg_file!(arg_file);

            Ok(WaterfallArgs {
                args_file: None,
                data_args: cli_args.data_args.merge(data_args),
                no_normalise: cli_args.no_normalise || no_normalise,
                peak: cli_args.peak.or(peak),
                output: cli_args.output.or(output),
            })
        } else {
            Ok(cli_args)
        }
    }

    pub(super) fn parse(self) -> Result<WaterfallParams, HydrogenlineError> {
        debug!("{:#?}", self);

        let Self {
            args_file: _,
            data_args,
            no_normalise,
            peak,
            output,
        } = self;

        let peak = peak.unwrap_or(DEFAULT_PEAK_FRACTION);
        if !peak.is_finite() || peak <= 0.0 {
            return Err(WaterfallArgsError::BadPeak(peak).into());
        }

        let output = match (output, data_args.measurement.as_ref()) {
            (Some(o), _) => o,
            (None, Some(m)) => default_output(m, "waterfall"),
            (None, None) => PathBuf::from("waterfall.json"),
        };
        let measurement = data_args.parse("Normalising")?;
        if measurement.reference().is_none() {
            return Err(MeasurementError::NoReference.into());
        }

        let mut printer = InfoPrinter::new("Normalising".into());
        printer.push_block(vec![
            if no_normalise {
                "Keeping each spectrum's mean power".into()
            } else {
                "Subtracting each spectrum's mean power".into()
            },
            format!("Colour-scale peak: {peak}").into(),
        ]);
        printer.push_line(format!("Output: {}", output.display()).into());
        printer.display();

        display_warnings();

        Ok(WaterfallParams {
            measurement,
            normalise: !no_normalise,
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

#[derive(thiserror::Error, Debug)]
pub(super) enum WaterfallArgsError {
    #[error("The colour-scale peak must be a positive number, not {0}")]
    BadPeak(f64),
}
