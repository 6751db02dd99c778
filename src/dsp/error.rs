// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors from the spectral calibration pipeline.

use thiserror::Error;

use crate::math::SplineError;

#[derive(Error, Debug, PartialEq)]
pub enum DspError {
    #[error("Cannot derive a reference PSD from a batch without any measurements")]
    EmptyBatch,

    #[error("The reference PSD has {reference} bins, but the PSD batch has {bins} bins")]
    DimensionMismatch { reference: usize, bins: usize },

    #[error("No PSD data is left ({rows} measurements x {bins} bins); the smoothing windows are probably too large")]
    InsufficientData { rows: usize, bins: usize },

    #[error("The reference PSD has a mean power of {0}; cannot normalise by it")]
    ZeroReferencePower(f64),

    #[error("Couldn't interpolate the reference PSD: {0}")]
    Spline(#[from] SplineError),
}
