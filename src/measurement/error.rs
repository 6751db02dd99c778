// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with measurement settings and data.

use thiserror::Error;

use crate::{dsp::DspError, window::WindowFunction};

#[derive(Error, Debug)]
pub enum MeasurementError {
    #[error("The reference measurement and the measurement data have a different {what} ({reference} vs. {measurement})")]
    ReferenceMismatch {
        what: &'static str,
        reference: String,
        measurement: String,
    },

    #[error("The reference measurement has no PSD for the {0} window, which the measurement uses")]
    ReferenceMissingWindow(WindowFunction),

    #[error("The measurement settings name the reference '{0}', but no reference data was supplied")]
    ReferenceNotSupplied(String),

    #[error("This view needs a reference measurement, but none was specified")]
    NoReference,

    #[error("The {0} window is listed more than once in the measurement settings")]
    DuplicateWindow(WindowFunction),

    #[error("The measurement settings list the {window} window, but {thing} has no PSD for it")]
    MissingWindow {
        window: WindowFunction,
        thing: String,
    },

    #[error("Expected {thing} to have {expected} elements, but it had {actual} instead")]
    BadShape {
        thing: String,
        expected: usize,
        actual: usize,
    },

    #[error("The measurement contains no captures")]
    NoCaptures,

    #[error("Couldn't parse '{name}' as a capture timestamp (expected e.g. 20240314_21_05_33): {err}")]
    BadTimestamp {
        name: String,
        err: chrono::format::ParseError,
    },

    #[error("The sample rate must be positive")]
    ZeroSampleRate,

    #[error("2^{0} bins is too many")]
    TooManyBins(u32),

    #[error("An integration time of {tint}s is shorter than a single {bins}-sample block at {sample_rate} samples per second")]
    TooShortIntegration {
        tint: f64,
        bins: usize,
        sample_rate: u64,
    },

    #[error(transparent)]
    Dsp(#[from] DspError),
}
