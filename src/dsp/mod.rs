// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The spectral calibration and denoising pipeline.
//!
//! A "PSD batch" is a 2D array with dimensions `[measurement][bin]`; each row
//! is one averaged power spectrum in linear power units \[W\], and rows are in
//! acquisition order. [`process`] runs every stage in a fixed order:
//!
//! 1. obtain a reference PSD (supplied, or [`derive_reference`]);
//! 2. [`correct_gain`] to flatten the receiver's frequency response;
//! 3. [`smooth_time`], a moving median across measurements;
//! 4. [`smooth_frequency`], a moving median across bins;
//! 5. [`zero_baseline`] so that each spectrum is centred on zero.
//!
//! The two smoothing stages shrink their axis by the window size; they don't
//! pad. A window size of 0 or 1 disables them.

mod error;

pub use error::DspError;

use log::{debug, trace, warn};
use ndarray::{parallel::prelude::*, prelude::*};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::{
    constants::MW_PER_W,
    math::{median, CubicSpline},
};

/// How the baseline of gain-corrected spectra is removed. Both policies are
/// in use and give different absolute levels, so they are kept separate.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum BaselinePolicy {
    /// The full [`process`] pipeline: spline gain correction, smoothing, then
    /// subtracting each spectrum's mean. Used for individual spectra.
    #[strum(serialize = "pipeline")]
    Pipeline,

    /// [`normalise_to_reference`]: divide by the reference scaled to its own
    /// mean power, then (optionally) subtract each spectrum's mean. Used for
    /// waterfalls of many measurements.
    #[strum(serialize = "reference-mean")]
    ReferenceMean,
}

/// Estimate the receiver's gain curve from the measurements themselves, by
/// taking the median of every bin over all measurements.
///
/// This assumes the gain curve is the dominant, persistent feature of the
/// batch and that interference and the (Doppler-shifting) hydrogen line only
/// occupy any given bin in a minority of measurements.
pub fn derive_reference(batch: ArrayView2<f64>) -> Result<Array1<f64>, DspError> {
    let (num_measurements, num_bins) = batch.dim();
    match num_measurements {
        0 => return Err(DspError::EmptyBatch),
        1 => debug!("Deriving a reference PSD from a single measurement; the gain correction will flatten everything"),
        _ => trace!("Deriving a reference PSD from {num_measurements} measurements x {num_bins} bins"),
    }

    let reference: Vec<f64> = batch
        .axis_iter(Axis(1))
        .into_par_iter()
        .map_init(
            || Vec::with_capacity(num_measurements),
            |scratch, bin| median(bin, scratch),
        )
        .collect();
    Ok(Array1::from(reference))
}

/// Remove the frequency-dependent receiver gain from every spectrum in the
/// batch by dividing by the reference PSD.
///
/// The divisor is a cubic spline through the reference, evaluated at every
/// bin index. As the reference is sampled at every bin, this reproduces the
/// reference exactly.
pub fn correct_gain(
    mut batch: Array2<f64>,
    reference: ArrayView1<f64>,
) -> Result<Array2<f64>, DspError> {
    let num_bins = batch.len_of(Axis(1));
    if reference.len() != num_bins {
        return Err(DspError::DimensionMismatch {
            reference: reference.len(),
            bins: num_bins,
        });
    }
    if num_bins == 0 {
        return Ok(batch);
    }

    let spline = CubicSpline::from_samples(&reference.to_vec())?;
    let bin_indices: Vec<f64> = (0..num_bins).map(|i| i as f64).collect();
    let divisor = Array1::from(spline.evaluate_many(&bin_indices));
    if divisor.iter().any(|&d| d == 0.0) {
        warn!("The reference PSD has bins with zero power; the gain-corrected PSD will contain non-finite values");
    }

    batch /= &divisor;
    Ok(batch)
}

/// Apply a moving median of `window_size` measurements across time. Output row
/// `i` is the median of input rows `i..i + window_size`, so the output has
/// `window_size` fewer rows than the input. A `window_size` of 0 or 1 returns
/// the batch untouched.
///
/// If the window is at least as long as the batch, the result has no rows.
/// This is logged, but it is up to the caller to handle.
pub fn smooth_time(batch: Array2<f64>, window_size: usize) -> Array2<f64> {
    if window_size <= 1 {
        return batch;
    }

    let (num_measurements, num_bins) = batch.dim();
    let num_out = num_measurements.saturating_sub(window_size);
    if num_out == 0 {
        warn!("The time smoothing window ({window_size}) isn't smaller than the number of measurements ({num_measurements}); no measurements are left");
    }

    let mut out = Array2::zeros((num_out, num_bins));
    out.axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each_init(
            || Vec::with_capacity(window_size),
            |scratch, (i, mut out_row)| {
                let window = batch.slice(s![i..i + window_size, ..]);
                out_row
                    .iter_mut()
                    .zip(window.axis_iter(Axis(1)))
                    .for_each(|(o, bin)| *o = median(bin, scratch));
            },
        );
    out
}

/// Apply a moving median of `window_size` bins across frequency. Output column
/// `j` is the median of input columns `j..j + window_size`, so the output has
/// `window_size` fewer bins than the input. A `window_size` of 0 or 1 returns
/// the batch untouched.
///
/// If the window is at least as wide as the spectra, the result has no bins.
/// This is logged, but it is up to the caller to handle.
pub fn smooth_frequency(batch: Array2<f64>, window_size: usize) -> Array2<f64> {
    if window_size <= 1 {
        return batch;
    }

    let (num_measurements, num_bins) = batch.dim();
    let num_out = num_bins.saturating_sub(window_size);
    if num_out == 0 {
        warn!("The frequency smoothing window ({window_size}) isn't smaller than the number of bins ({num_bins}); no bins are left");
    }

    let mut out = Array2::zeros((num_measurements, num_out));
    out.axis_iter_mut(Axis(0))
        .into_par_iter()
        .zip(batch.axis_iter(Axis(0)))
        .for_each_init(
            || Vec::with_capacity(window_size),
            |scratch, (mut out_row, in_row)| {
                for (j, o) in out_row.iter_mut().enumerate() {
                    *o = median(in_row.slice(s![j..j + window_size]), scratch);
                }
            },
        );
    out
}

/// Subtract each spectrum's mean power from every one of its bins, so that
/// every spectrum has a mean of zero.
pub fn zero_baseline(mut batch: Array2<f64>) -> Array2<f64> {
    // No bins means no means.
    if let Some(means) = batch.mean_axis(Axis(1)) {
        batch -= &means.insert_axis(Axis(1));
    }
    batch
}

/// Run the whole calibration pipeline on a PSD batch. If no reference is
/// supplied, one is derived from the batch itself.
///
/// The result has `time_window_size` fewer rows and `freq_window_size` fewer
/// bins than the input (when those windows are larger than 1), and may be
/// empty.
pub fn process(
    batch: Array2<f64>,
    freq_window_size: usize,
    time_window_size: usize,
    reference: Option<ArrayView1<f64>>,
) -> Result<Array2<f64>, DspError> {
    let derived;
    let reference: ArrayView1<f64> = match reference {
        Some(r) => r.reborrow(),
        None => {
            derived = derive_reference(batch.view())?;
            derived.view()
        }
    };

    let batch = correct_gain(batch, reference)?;
    let batch = smooth_time(batch, time_window_size);
    let batch = smooth_frequency(batch, freq_window_size);
    let batch = zero_baseline(batch);
    trace!("Processed PSD batch has shape {:?}", batch.dim());
    Ok(batch)
}

/// Divide every spectrum by the reference PSD scaled to its own mean power, so
/// that the absolute level of the reference doesn't bias the result. When
/// `normalise` is true, each spectrum's mean is then subtracted too.
pub fn normalise_to_reference(
    mut batch: Array2<f64>,
    reference: ArrayView1<f64>,
    normalise: bool,
) -> Result<Array2<f64>, DspError> {
    let num_bins = batch.len_of(Axis(1));
    if reference.len() != num_bins {
        return Err(DspError::DimensionMismatch {
            reference: reference.len(),
            bins: num_bins,
        });
    }
    if num_bins == 0 {
        return Ok(batch);
    }

    let reference_mean = reference.sum() / num_bins as f64;
    if reference_mean == 0.0 || !reference_mean.is_finite() {
        return Err(DspError::ZeroReferencePower(reference_mean));
    }

    batch /= &reference;
    batch *= reference_mean;
    if normalise {
        batch = zero_baseline(batch);
    }
    Ok(batch)
}

/// The value used for the top of colour scales: a fraction (`peak`) of the
/// largest power in the batch. Fails if the batch is empty, e.g. because the
/// smoothing windows consumed all of it.
pub fn peak_power(batch: ArrayView2<f64>, peak: f64) -> Result<f64, DspError> {
    if batch.is_empty() {
        let (rows, bins) = batch.dim();
        return Err(DspError::InsufficientData { rows, bins });
    }
    let max = batch.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Ok(peak * max)
}

/// Convert a power in watts to decibel-milliwatts.
#[inline]
pub fn watts_to_dbm(p: f64) -> f64 {
    10.0 * (p * MW_PER_W).log10()
}

/// Convert a power in decibel-milliwatts to watts.
#[inline]
pub fn dbm_to_watts(p: f64) -> f64 {
    10_f64.powf(p / 10.0 - 3.0)
}

pub fn batch_watts_to_dbm<D: Dimension>(p: ArrayView<f64, D>) -> Array<f64, D> {
    p.mapv(watts_to_dbm)
}

pub fn batch_dbm_to_watts<D: Dimension>(p: ArrayView<f64, D>) -> Array<f64, D> {
    p.mapv(dbm_to_watts)
}
