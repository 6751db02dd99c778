// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Some helper mathematics.

mod error;
mod spline;

pub use error::SplineError;
pub use spline::CubicSpline;

use ndarray::ArrayView1;

/// Get the median of the supplied values. The values are copied into a scratch
/// buffer before sorting, so the input is untouched. An even number of values
/// gives the mean of the middle two, like NumPy. NaNs are sorted to the end.
///
/// # Panics
///
/// Panics if there are no values.
pub(crate) fn median(values: ArrayView1<f64>, scratch: &mut Vec<f64>) -> f64 {
    assert!(!values.is_empty(), "cannot take the median of nothing");

    scratch.clear();
    scratch.extend(values.iter().copied());
    scratch.sort_unstable_by(|a, b| a.total_cmp(b));

    let n = scratch.len();
    if n % 2 == 1 {
        scratch[n / 2]
    } else {
        0.5 * (scratch[n / 2 - 1] + scratch[n / 2])
    }
}

/// Evenly-spaced values over `[start, stop]`, inclusive of both ends (like
/// `numpy.linspace`). One value gives `start`.
pub(crate) fn linspace(start: f64, stop: f64, num: usize) -> Vec<f64> {
    match num {
        0 => vec![],
        1 => vec![start],
        _ => {
            let step = (stop - start) / (num - 1) as f64;
            (0..num)
                .map(|i| {
                    // Pin the last value so it isn't affected by rounding.
                    if i == num - 1 {
                        stop
                    } else {
                        start + step * i as f64
                    }
                })
                .collect()
        }
    }
}
