// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Estimate power spectral densities from blocks of complex IQ samples.
//!
//! Every block is multiplied by a window, Fourier transformed and
//! FFT-shifted so that the zero frequency lands in the middle of the
//! spectrum. The squared magnitudes are normalised by the sample rate and the
//! window's power, giving \[W/Hz\]-like units. Many such periodograms are then
//! averaged into one spectrum per window function.

mod error;

pub use error::SpectrumError;

use std::sync::Arc;

use indexmap::IndexMap;
use log::{debug, trace};
use ndarray::prelude::*;
use num_complex::Complex64;
use rustfft::{Fft, FftPlanner};

use crate::window::WindowFunction;

/// A reusable estimator of windowed, FFT-shifted power spectra.
pub struct Periodogram {
    window: WindowFunction,
    coefficients: Vec<f64>,

    /// `sum(w^2)` over the window coefficients.
    window_power: f64,

    sample_rate: f64,
    fft: Arc<dyn Fft<f64>>,
}

impl Periodogram {
    pub fn new(
        window: WindowFunction,
        bins: usize,
        sample_rate: f64,
    ) -> Result<Periodogram, SpectrumError> {
        if bins == 0 {
            return Err(SpectrumError::NoBins);
        }
        if sample_rate.is_nan() || sample_rate <= 0.0 {
            return Err(SpectrumError::BadSampleRate(sample_rate));
        }

        let coefficients = window.coefficients(bins);
        let window_power = coefficients.iter().map(|w| w * w).sum::<f64>();
        if window_power <= 0.0 {
            // e.g. a Hanning window with 2 bins is all zeros.
            return Err(SpectrumError::ZeroWindowPower { window, bins });
        }
        let fft = FftPlanner::<f64>::new().plan_fft_forward(bins);
        trace!("Planned a {bins}-point FFT for the {window} window");

        Ok(Periodogram {
            window,
            coefficients,
            window_power,
            sample_rate,
            fft,
        })
    }

    pub fn window(&self) -> WindowFunction {
        self.window
    }

    pub fn bins(&self) -> usize {
        self.coefficients.len()
    }

    /// Estimate the PSD of a single block of samples. The block must have
    /// exactly as many samples as there are bins.
    pub fn psd(&self, samples: &[Complex64]) -> Result<Array1<f64>, SpectrumError> {
        let mut psd = Array1::zeros(self.bins());
        self.accumulate(samples, psd.view_mut())?;
        Ok(psd)
    }

    /// Add the PSD of a single block of samples to `acc`.
    fn accumulate(
        &self,
        samples: &[Complex64],
        mut acc: ArrayViewMut1<f64>,
    ) -> Result<(), SpectrumError> {
        let bins = self.bins();
        if samples.len() != bins {
            return Err(SpectrumError::BlockLength {
                expected: bins,
                got: samples.len(),
            });
        }

        let mut buffer: Vec<Complex64> = samples
            .iter()
            .zip(self.coefficients.iter())
            .map(|(s, &w)| s * w)
            .collect();
        self.fft.process(&mut buffer);
        // fftshift
        buffer.rotate_right(bins / 2);

        let norm = self.sample_rate * self.window_power;
        acc.iter_mut()
            .zip(buffer.iter())
            .for_each(|(a, b)| *a += b.norm_sqr() / norm);
        Ok(())
    }
}

/// Average the PSDs of many blocks of IQ samples, once for each of the
/// supplied window functions. The returned map is in the same order as
/// `windows`.
pub fn averaged_spectrum<'a, I>(
    blocks: I,
    windows: &[WindowFunction],
    bins: usize,
    sample_rate: f64,
) -> Result<IndexMap<WindowFunction, Array1<f64>>, SpectrumError>
where
    I: IntoIterator<Item = &'a [Complex64]>,
{
    let periodograms = windows
        .iter()
        .map(|&w| Periodogram::new(w, bins, sample_rate))
        .collect::<Result<Vec<_>, _>>()?;
    let mut sums = Array2::zeros((periodograms.len(), bins));

    let mut num_blocks = 0_usize;
    for block in blocks {
        for (periodogram, sum) in periodograms.iter().zip(sums.outer_iter_mut()) {
            periodogram.accumulate(block, sum)?;
        }
        num_blocks += 1;
    }
    if num_blocks == 0 {
        return Err(SpectrumError::NoBlocks);
    }
    debug!(
        "Averaged {num_blocks} blocks of {bins} samples with {} window(s)",
        windows.len()
    );

    sums /= num_blocks as f64;
    Ok(periodograms
        .iter()
        .zip(sums.outer_iter())
        .map(|(p, s)| (p.window(), s.to_owned()))
        .collect())
}
