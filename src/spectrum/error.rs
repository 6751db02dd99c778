// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

use crate::window::WindowFunction;

#[derive(Error, Debug, PartialEq)]
pub enum SpectrumError {
    #[error("Cannot estimate a spectrum with 0 bins")]
    NoBins,

    #[error("The sample rate must be positive, but got {0}")]
    BadSampleRate(f64),

    #[error("The {window} window with {bins} bins has no power")]
    ZeroWindowPower { window: WindowFunction, bins: usize },

    #[error("Expected a block of {expected} IQ samples, but got {got}")]
    BlockLength { expected: usize, got: usize },

    #[error("No blocks of IQ samples were supplied; cannot average nothing")]
    NoBlocks,
}
