// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for all hydrogenline-related errors. This should be the *only*
//! error enum that is publicly visible.

use thiserror::Error;

use super::{spectra::SpectraArgsError, waterfall::WaterfallArgsError};
use crate::{dsp::DspError, measurement::MeasurementError};

/// The *only* publicly visible error from hydrogenline. Each message should
/// help the user fix their input, unless it's "generic".
#[derive(Error, Debug)]
pub enum HydrogenlineError {
    /// An error related to reading measurement or reference files.
    #[error("{0}\n\nMeasurement and reference files are JSON; check that the paths are right and that the files were written by the capture software.")]
    InputData(String),

    /// An error related to measurement settings or data.
    #[error("{0}")]
    Measurement(String),

    /// An error where a reference can't calibrate a measurement.
    #[error("{0}\n\nThe reference must be captured with the same number of bins, sample rate and center frequency as the measurement.")]
    Reference(String),

    /// An error related to window functions.
    #[error("{0}")]
    Window(String),

    /// An error related to calibrating and denoising spectra.
    #[error("{0}\n\nIf the smoothing windows are large, try smaller ones.")]
    Processing(String),

    /// An error related to argument files.
    #[error("{0}\n\nArgument files are TOML or JSON with the same names as the long command-line arguments; --save-toml writes an example.")]
    ArgFile(String),

    /// A generic error that can't be clarified further, e.g. IO errors.
    #[error("{0}")]
    Generic(String),
}

// When changing the error propagation below, ensure `Self::from(e)` uses the
// correct `e`!

impl From<SpectraArgsError> for HydrogenlineError {
    fn from(e: SpectraArgsError) -> Self {
        Self::Processing(e.to_string())
    }
}

impl From<WaterfallArgsError> for HydrogenlineError {
    fn from(e: WaterfallArgsError) -> Self {
        Self::Processing(e.to_string())
    }
}

impl From<MeasurementError> for HydrogenlineError {
    fn from(e: MeasurementError) -> Self {
        let s = e.to_string();
        match e {
            MeasurementError::ReferenceMismatch { .. }
            | MeasurementError::ReferenceMissingWindow(_)
            | MeasurementError::ReferenceNotSupplied(_)
            | MeasurementError::NoReference => Self::Reference(s),
            MeasurementError::DuplicateWindow(_) => Self::Window(s),
            MeasurementError::MissingWindow { .. }
            | MeasurementError::BadShape { .. }
            | MeasurementError::NoCaptures
            | MeasurementError::BadTimestamp { .. }
            | MeasurementError::ZeroSampleRate
            | MeasurementError::TooManyBins(_)
            | MeasurementError::TooShortIntegration { .. } => Self::Measurement(s),
            MeasurementError::Dsp(e) => Self::from(e),
        }
    }
}

impl From<DspError> for HydrogenlineError {
    fn from(e: DspError) -> Self {
        let s = e.to_string();
        match e {
            DspError::DimensionMismatch { .. } | DspError::ZeroReferencePower(_) => {
                Self::Reference(s)
            }
            DspError::EmptyBatch | DspError::InsufficientData { .. } | DspError::Spline(_) => {
                Self::Processing(s)
            }
        }
    }
}

impl From<std::io::Error> for HydrogenlineError {
    fn from(e: std::io::Error) -> Self {
        Self::Generic(e.to_string())
    }
}
