// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Settings that describe how PSD data were captured.

use std::fmt;

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use vec1::Vec1;

use super::MeasurementError;
use crate::{constants::HYDROGEN_LINE_FREQ_HZ, math::linspace, window::WindowFunction};

/// The radio settings derived from user-friendly capture arguments.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CaptureSettings {
    /// The number of frequency bins (and IQ samples per block).
    pub bins: usize,

    /// \[samples per second\]
    pub sample_rate: u64,

    /// The number of blocks averaged into one measurement.
    pub averages: u64,

    /// The actual integration time of one measurement, accounting for the
    /// whole number of averaged blocks \[s\].
    pub tint: f64,
}

impl CaptureSettings {
    /// Work out the capture settings from a sample rate in kilo-samples per
    /// second, the number of bins as a power of 2 and a desired integration
    /// time \[s\]. The integration time is rounded down to a whole number of
    /// blocks.
    pub fn derive(
        sample_rate_ksps: u32,
        bins_exponent: u32,
        tint: f64,
    ) -> Result<CaptureSettings, MeasurementError> {
        if sample_rate_ksps == 0 {
            return Err(MeasurementError::ZeroSampleRate);
        }
        let bins = 1_usize
            .checked_shl(bins_exponent)
            .filter(|_| bins_exponent < 32)
            .ok_or(MeasurementError::TooManyBins(bins_exponent))?;
        let sample_rate = u64::from(sample_rate_ksps) * 1000;

        let time_per_block = bins as f64 / sample_rate as f64;
        let averages = (tint / time_per_block).floor();
        if !(averages >= 1.0) {
            return Err(MeasurementError::TooShortIntegration {
                tint,
                bins,
                sample_rate,
            });
        }
        let averages = averages as u64;

        Ok(CaptureSettings {
            bins,
            sample_rate,
            averages,
            tint: averages as f64 * time_per_block,
        })
    }
}

/// The settings of a measurement run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementSettings {
    /// The name of the measurement run.
    #[serde(default)]
    pub folder: String,

    pub bins: usize,

    /// \[samples per second\]
    pub sample_rate: u64,

    /// \[Hz\]
    pub center_freq: u64,

    /// The receiver gain \[dB\].
    pub gain: f64,

    /// The window functions that the PSDs were estimated with.
    pub windows: Vec1<WindowFunction>,

    #[serde(default)]
    pub averages: u64,

    /// The integration time of each measurement \[s\].
    #[serde(default)]
    pub tint: f64,

    /// The identifier of the reference measurement to calibrate with, if any.
    #[serde(default)]
    pub reference: Option<String>,

    #[serde(default)]
    pub start: Option<String>,

    #[serde(default)]
    pub stop: Option<String>,
}

/// The settings under which a reference PSD was captured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceSettings {
    #[serde(default)]
    pub fname: String,

    pub bins: usize,

    /// \[samples per second\]
    pub sample_rate: u64,

    /// \[Hz\]
    pub center_freq: u64,

    /// \[dB\]
    pub gain: f64,

    pub windows: Vec1<WindowFunction>,

    #[serde(default)]
    pub averages: u64,

    #[serde(default)]
    pub tint: f64,
}

/// Something about a reference that is suspicious, but doesn't stop it from
/// being used.
#[derive(Debug, Clone, PartialEq)]
pub enum ReferenceWarning {
    GainMismatch { reference: f64, measurement: f64 },
}

impl fmt::Display for ReferenceWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceWarning::GainMismatch {
                reference,
                measurement,
            } => write!(
                f,
                "The reference measurement and measurement data have different receiver gains ({reference} dB vs. {measurement} dB); using the reference as-is"
            ),
        }
    }
}

impl MeasurementSettings {
    /// Check that a reference captured with `reference` settings can be used
    /// to calibrate this measurement. Different bin counts, sample rates or
    /// center frequencies are fatal. A different gain only warrants a warning.
    pub fn check_reference(
        &self,
        reference: &ReferenceSettings,
    ) -> Result<Option<ReferenceWarning>, MeasurementError> {
        fn mismatch<T: ToString>(
            what: &'static str,
            reference: T,
            measurement: T,
        ) -> MeasurementError {
            MeasurementError::ReferenceMismatch {
                what,
                reference: reference.to_string(),
                measurement: measurement.to_string(),
            }
        }

        if reference.bins != self.bins {
            return Err(mismatch("number of frequency bins", reference.bins, self.bins));
        }
        if reference.sample_rate != self.sample_rate {
            return Err(mismatch(
                "sample rate",
                reference.sample_rate,
                self.sample_rate,
            ));
        }
        if reference.center_freq != self.center_freq {
            return Err(mismatch(
                "center frequency",
                reference.center_freq,
                self.center_freq,
            ));
        }
        if let Some(&window) = self
            .windows
            .iter()
            .find(|w| !reference.windows.contains(w))
        {
            return Err(MeasurementError::ReferenceMissingWindow(window));
        }

        if (reference.gain - self.gain).abs() > f64::EPSILON {
            Ok(Some(ReferenceWarning::GainMismatch {
                reference: reference.gain,
                measurement: self.gain,
            }))
        } else {
            Ok(None)
        }
    }

    /// The frequency of every bin \[Hz\].
    pub fn frequencies(&self) -> Array1<f64> {
        let sample_rate = self.sample_rate as f64;
        let center_freq = self.center_freq as f64;
        linspace(-0.5, 0.5, self.bins)
            .into_iter()
            .map(|x| center_freq + x * sample_rate)
            .collect()
    }

    /// The frequencies of a spectrum that has been smoothed down to `num_bins`
    /// bins. Frequency smoothing drops trailing bins, so these are the leading
    /// `num_bins` frequencies of the full axis.
    pub fn frequencies_for(&self, num_bins: usize) -> Array1<f64> {
        let mut freqs = self.frequencies().to_vec();
        freqs.truncate(num_bins);
        Array1::from(freqs)
    }

    /// The index of the bin closest to the rest frequency of the hydrogen
    /// line, if the line is within the band.
    pub fn hydrogen_line_bin(&self) -> Option<usize> {
        let freqs = self.frequencies();
        let (first, last) = (*freqs.first()?, *freqs.last()?);
        if !(first..=last).contains(&HYDROGEN_LINE_FREQ_HZ) {
            return None;
        }
        freqs
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                (*a - HYDROGEN_LINE_FREQ_HZ)
                    .abs()
                    .total_cmp(&(*b - HYDROGEN_LINE_FREQ_HZ).abs())
            })
            .map(|(i, _)| i)
    }
}
