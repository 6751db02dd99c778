// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Useful constants.

All constants *must* be double precision. Power spectra are kept in double
precision from the moment they are estimated.
 */

use crate::window::WindowFunction;

/// The rest frequency of the neutral-hydrogen 21cm line \[Hz\].
pub const HYDROGEN_LINE_FREQ_HZ: f64 = 1_420_405_751.768;

/// The center frequency the receiver is tuned to when none is supplied \[Hz\].
pub const DEFAULT_CENTER_FREQ_HZ: u64 = 1_420_000_000;

/// The sample rate used when none is supplied \[kilo-samples per second\].
pub const DEFAULT_SAMPLE_RATE_KSPS: u32 = 2048;

/// The default number of frequency bins, expressed as a power of 2.
pub const DEFAULT_BINS_EXPONENT: u32 = 16;

/// The default integration time of a single averaged measurement \[s\].
pub const DEFAULT_INTEGRATION_TIME_S: f64 = 120.0;

/// The window function used to estimate PSDs when none is chosen.
pub const DEFAULT_WINDOW: WindowFunction = WindowFunction::Hanning;

/// The default fraction of the maximum corrected power used for the top of
/// colour scales.
pub const DEFAULT_PEAK_FRACTION: f64 = 0.1;

/// The format of capture timestamps, e.g. "20240314_21_05_33".
pub const CAPTURE_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H_%M_%S";

/// The number of milliwatts in a watt.
pub(crate) const MW_PER_W: f64 = 1e3;
