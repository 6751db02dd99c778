// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum SplineError {
    #[error("A spline needs at least one control point")]
    NoPoints,

    #[error("Spline abscissae and ordinates have different lengths ({x} vs. {y})")]
    LengthMismatch { x: usize, y: usize },

    #[error("Spline abscissae must be strictly increasing, but x[{index}] = {value} doesn't exceed the previous value")]
    NotIncreasing { index: usize, value: f64 },

    #[error("Spline control point {index} is not finite ({value})")]
    NotFinite { index: usize, value: f64 },
}
