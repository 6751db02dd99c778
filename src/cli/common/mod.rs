// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Common arguments for command-line interfaces. e.g. The `spectra` and
//! `waterfall` subcommands both take a measurement as input, so the same
//! input-data arguments are shared between them.

mod printers;
#[cfg(test)]
mod tests;

pub(crate) use printers::{display_warnings, InfoPrinter, Warn};

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    str::FromStr,
};

use clap::Parser;
use itertools::Itertools;
use log::debug;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};
use thiserror::Error;
use vec1::Vec1;

use super::HydrogenlineError;
use crate::{
    constants::CAPTURE_TIMESTAMP_FORMAT,
    measurement::{Measurement, MeasurementError, MeasurementRecord, Reference},
    window::{WindowFunction, WINDOW_FUNCTIONS_COMMA_SEPARATED},
};

lazy_static::lazy_static! {
    pub(super) static ref ARG_FILE_TYPES_COMMA_SEPARATED: String = ArgFileTypes::iter().join(", ");

    pub(super) static ref ARG_FILE_HELP: String =
        format!("All arguments may be specified in a file. Any CLI arguments override arguments set in the file. Supported formats: {}", *ARG_FILE_TYPES_COMMA_SEPARATED);

    static ref WINDOWS_HELP: String =
        format!("Only use PSDs estimated with these window functions. The default is to use all windows in the measurement. Supported windows: {}", *WINDOW_FUNCTIONS_COMMA_SEPARATED);
}

#[derive(Debug, Display, EnumIter, EnumString)]
pub(super) enum ArgFileTypes {
    #[strum(serialize = "toml")]
    Toml,
    #[strum(serialize = "json")]
    Json,
}

macro_rules! unpack_arg_file {
    ($arg_file:expr) => ({
        use std::{fs::File, io::Read, str::FromStr};

        use crate::cli::common::{ArgFileTypes, ARG_FILE_TYPES_COMMA_SEPARATED};

        debug!("Attempting to parse argument file {}", $arg_file.display());

        let mut contents = String::new();
        let arg_file_type = $arg_file
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .and_then(|e| ArgFileTypes::from_str(&e).ok());

        match arg_file_type {
            Some(ArgFileTypes::Toml) => {
                debug!("Parsing toml file...");
                let mut fh = File::open(&$arg_file)?;
                fh.read_to_string(&mut contents)?;
                match toml::from_str(&contents) {
                    Ok(p) => p,
                    Err(err) => {
                        return Err(HydrogenlineError::ArgFile(format!(
                            "Couldn't decode toml structure from {:?}:\n{err}",
                            $arg_file
                        )))
                    }
                }
            }
            Some(ArgFileTypes::Json) => {
                debug!("Parsing json file...");
                let mut fh = File::open(&$arg_file)?;
                fh.read_to_string(&mut contents)?;
                match serde_json::from_str(&contents) {
                    Ok(p) => p,
                    Err(err) => {
                        return Err(HydrogenlineError::ArgFile(format!(
                            "Couldn't decode json structure from {:?}:\n{err}",
                            $arg_file
                        )))
                    }
                }
            }

            _ => {
                return Err(HydrogenlineError::ArgFile(format!(
                    "Argument file '{:?}' doesn't have a recognised file extension! Valid extensions are: {}", $arg_file, *ARG_FILE_TYPES_COMMA_SEPARATED)
                ))
            }
        }
    });
}

/// Arguments that locate a measurement and its reference.
#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct InputDataArgs {
    /// Path to the measurement file (JSON), containing the measurement settings
    /// and every averaged capture.
    #[clap(short = 'd', long = "data", parse(from_os_str), help_heading = "INPUT DATA")]
    pub(crate) measurement: Option<PathBuf>,

    /// Path to the reference measurement file (JSON). If this isn't given, the
    /// reference named by the measurement settings is used (relative to the
    /// measurement file), if there is one.
    #[clap(short, long, parse(from_os_str), help_heading = "INPUT DATA")]
    pub(crate) reference: Option<PathBuf>,

    /// Don't use any reference measurement, even if the measurement settings
    /// name one.
    #[clap(long, conflicts_with("reference"), help_heading = "INPUT DATA")]
    #[serde(default)]
    pub(crate) no_reference: bool,

    #[clap(long, multiple_values(true), help = WINDOWS_HELP.as_str(), help_heading = "INPUT DATA")]
    pub(crate) windows: Option<Vec<String>>,
}

impl InputDataArgs {
    /// Merge these arguments with those from an argument file, preferring
    /// these.
    pub(crate) fn merge(self, other: Self) -> Self {
        Self {
            measurement: self.measurement.or(other.measurement),
            reference: self.reference.or(other.reference),
            no_reference: self.no_reference || other.no_reference,
            windows: self.windows.or(other.windows),
        }
    }

    /// Read the measurement (and reference) and make sure they make sense.
    /// `verb` describes what's going to be done with the measurement, and is
    /// used in the printed summary.
    pub(crate) fn parse(self, verb: &str) -> Result<Measurement, InputDataArgsError> {
        let InputDataArgs {
            measurement,
            reference,
            no_reference,
            windows,
        } = self;

        let measurement_file = measurement.ok_or(InputDataArgsError::NoMeasurement)?;
        let mut record: MeasurementRecord = read_json(&measurement_file)?;

        if let Some(windows) = windows {
            let chosen = parse_windows(&windows)?;
            if let Some(&window) = chosen
                .iter()
                .find(|&&w| !record.settings.windows.contains(&w))
            {
                return Err(InputDataArgsError::WindowNotInMeasurement(window));
            }
            record.settings.windows = chosen;
        }

        let reference_file = if no_reference {
            if let Some(name) = record.settings.reference.take() {
                format!("Not using the reference measurement '{name}', as requested").warn();
            }
            None
        } else {
            match (reference, record.settings.reference.as_deref()) {
                (Some(r), _) => Some(r),
                (None, Some(name)) => Some(resolve_reference(&measurement_file, name)),
                (None, None) => None,
            }
        };
        let reference: Option<Reference> = match reference_file.as_ref() {
            Some(f) => Some(read_json(f)?),
            None => None,
        };

        let measurement = Measurement::from_record(record, reference)?;
        for warning in measurement.warnings() {
            warning.to_string().warn();
        }

        let mut printer = InfoPrinter::new(format!("{verb} measurement").into());
        let settings = measurement.settings();
        let mut block = vec![format!("File: {}", measurement_file.display()).into()];
        if !settings.folder.is_empty() {
            block.push(format!("Name: {}", settings.folder).into());
        }
        printer.push_block(block);
        let timestamps = measurement.timestamps();
        if let (Some(first), Some(last)) = (timestamps.first(), timestamps.last()) {
            printer.push_block(vec![
                format!("{} captures", timestamps.len()).into(),
                format!("First: {}", first.format(CAPTURE_TIMESTAMP_FORMAT)).into(),
                format!("Last:  {}", last.format(CAPTURE_TIMESTAMP_FORMAT)).into(),
            ]);
        }
        let mut block = vec![
            format!("{} bins", settings.bins).into(),
            format!("Sample rate:      {} kS/s", settings.sample_rate as f64 / 1e3).into(),
            format!("Center frequency: {} MHz", settings.center_freq as f64 / 1e6).into(),
            format!("Gain:             {} dB", settings.gain).into(),
        ];
        if let Some(bin) = settings.hydrogen_line_bin() {
            block.push(format!("Hydrogen line in bin {bin}").into());
        }
        printer.push_block(block);
        printer.push_line(
            format!(
                "Windows: {}",
                measurement.psd().keys().map(|w| w.to_string()).join(", ")
            )
            .into(),
        );
        match (reference_file, measurement.reference()) {
            (Some(f), Some(r)) => printer.push_block(vec![
                format!("Reference: {}", f.display()).into(),
                format!("Reference gain: {} dB", r.settings.gain).into(),
            ]),
            _ => printer.push_line("No reference; deriving one from the measurement".into()),
        }
        printer.display();

        Ok(measurement)
    }
}

/// Parse window-function names, ignoring case. A window named more than once
/// is only kept once, in the position it was first named.
pub(crate) fn parse_windows(names: &[String]) -> Result<Vec1<WindowFunction>, InputDataArgsError> {
    let mut windows = Vec::with_capacity(names.len());
    for name in names {
        let window = WindowFunction::from_str(&name.to_lowercase())
            .map_err(|_| InputDataArgsError::BadWindow(name.clone()))?;
        if !windows.contains(&window) {
            windows.push(window);
        }
    }
    Vec1::try_from_vec(windows).map_err(|_| InputDataArgsError::NoWindows)
}

/// References named by measurement settings are relative to the measurement
/// file.
fn resolve_reference(measurement_file: &Path, name: &str) -> PathBuf {
    let name = Path::new(name);
    if name.is_absolute() {
        return name.to_path_buf();
    }
    let mut path = measurement_file
        .parent()
        .map(|p| p.join(name))
        .unwrap_or_else(|| name.to_path_buf());
    if path.extension().is_none() {
        path.set_extension("json");
    }
    path
}

pub(crate) fn read_json<T: DeserializeOwned>(file: &Path) -> Result<T, InputDataArgsError> {
    debug!("Reading {}", file.display());
    if !file.exists() {
        return Err(InputDataArgsError::DoesNotExist(file.to_path_buf()));
    }
    let f = BufReader::new(File::open(file)?);
    serde_json::from_reader(f).map_err(|err| InputDataArgsError::Json {
        file: file.to_path_buf(),
        err,
    })
}

#[derive(Error, Debug)]
pub(crate) enum InputDataArgsError {
    #[error("No measurement file was supplied")]
    NoMeasurement,

    #[error("The file {0} doesn't exist")]
    DoesNotExist(PathBuf),

    #[error("Couldn't decode {file}: {err}")]
    Json {
        file: PathBuf,
        err: serde_json::Error,
    },

    #[error("'{0}' isn't a window function; supported windows: {}", *WINDOW_FUNCTIONS_COMMA_SEPARATED)]
    BadWindow(String),

    #[error("The {0} window was requested, but the measurement doesn't use it")]
    WindowNotInMeasurement(WindowFunction),

    #[error("No window functions were requested")]
    NoWindows,

    #[error(transparent)]
    Measurement(#[from] MeasurementError),

    #[error(transparent)]
    IO(#[from] std::io::Error),
}

impl From<InputDataArgsError> for HydrogenlineError {
    fn from(e: InputDataArgsError) -> Self {
        let s = e.to_string();
        match e {
            InputDataArgsError::NoMeasurement
            | InputDataArgsError::DoesNotExist(_)
            | InputDataArgsError::Json { .. } => Self::InputData(s),
            InputDataArgsError::BadWindow(_)
            | InputDataArgsError::WindowNotInMeasurement(_)
            | InputDataArgsError::NoWindows => Self::Window(s),
            InputDataArgsError::Measurement(e) => Self::from(e),
            InputDataArgsError::IO(e) => Self::from(e),
        }
    }
}
