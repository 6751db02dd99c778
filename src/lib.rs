// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Calibration and denoising of hydrogen-line power spectra.
//!
//! Power spectral densities (PSDs) captured with a software-defined radio are
//! dominated by the receiver's gain curve. This crate divides measurements by
//! a reference measurement (or an estimate of the gain curve derived from the
//! measurements themselves), smooths them with moving medians across time and
//! frequency, and removes the remaining baseline so that the hydrogen line
//! stands out.

pub mod constants;
pub mod dsp;
pub mod math;
pub mod measurement;
pub mod spectrum;
pub mod window;

mod cli;
pub(crate) mod params;

use crossbeam_utils::atomic::AtomicCell;

pub use cli::{Hydrogenline, HydrogenlineError};
pub use params::{ProcessedBatch, ProcessedOutput};

/// Should progress bars be drawn? Only the binary turns these on.
pub(crate) static PROGRESS_BARS: AtomicCell<bool> = AtomicCell::new(false);
