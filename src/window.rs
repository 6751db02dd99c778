// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Window functions applied to IQ blocks before estimating a power spectrum.
//!
//! A measurement may be captured with several window functions at once; the
//! resulting PSD batches are labelled by their [`WindowFunction`] and are
//! never mixed.

use std::f64::consts::PI;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

lazy_static::lazy_static! {
    pub static ref WINDOW_FUNCTIONS_COMMA_SEPARATED: String = WindowFunction::iter().join(", ");
}

/// All supported window functions. The coefficients are the symmetric
/// definitions used by NumPy.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum WindowFunction {
    #[strum(serialize = "hamming")]
    Hamming,

    #[strum(serialize = "hanning")]
    Hanning,

    #[strum(serialize = "blackman")]
    Blackman,

    #[strum(serialize = "bartlett")]
    Bartlett,
}

impl WindowFunction {
    /// The function that generates a single coefficient, given `k` and the
    /// denominator `n - 1`.
    fn generator(self) -> fn(f64, f64) -> f64 {
        match self {
            WindowFunction::Hamming => |k, m| 0.54 - 0.46 * (2.0 * PI * k / m).cos(),
            WindowFunction::Hanning => |k, m| 0.5 - 0.5 * (2.0 * PI * k / m).cos(),
            WindowFunction::Blackman => {
                |k, m| 0.42 - 0.5 * (2.0 * PI * k / m).cos() + 0.08 * (4.0 * PI * k / m).cos()
            }
            WindowFunction::Bartlett => |k, m| 1.0 - (2.0 * k / m - 1.0).abs(),
        }
    }

    /// Generate `n` coefficients of this window.
    pub fn coefficients(self, n: usize) -> Vec<f64> {
        match n {
            0 => vec![],
            1 => vec![1.0],
            _ => {
                let m = (n - 1) as f64;
                let f = self.generator();
                (0..n).map(|k| f(k as f64, m)).collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn test_names_round_trip() {
        for w in WindowFunction::iter() {
            assert_eq!(WindowFunction::from_str(&w.to_string()).unwrap(), w);
        }
        assert!(WindowFunction::from_str("kaiser").is_err());
        assert_eq!(
            *WINDOW_FUNCTIONS_COMMA_SEPARATED,
            "hamming, hanning, blackman, bartlett"
        );
    }

    #[test]
    fn test_serde_names() {
        let s = serde_json::to_string(&WindowFunction::Blackman).unwrap();
        assert_eq!(s, "\"blackman\"");
        let w: WindowFunction = serde_json::from_str("\"hanning\"").unwrap();
        assert_eq!(w, WindowFunction::Hanning);
    }

    #[test]
    fn test_degenerate_lengths() {
        for w in WindowFunction::iter() {
            assert!(w.coefficients(0).is_empty());
            assert_eq!(w.coefficients(1), vec![1.0]);
        }
    }

    #[test]
    fn test_numpy_values() {
        // numpy.hamming(5)
        let expected = [0.08, 0.54, 1.0, 0.54, 0.08];
        for (c, e) in WindowFunction::Hamming.coefficients(5).iter().zip(expected) {
            assert_abs_diff_eq!(*c, e, epsilon = 1e-12);
        }
        // numpy.hanning(5)
        let expected = [0.0, 0.5, 1.0, 0.5, 0.0];
        for (c, e) in WindowFunction::Hanning.coefficients(5).iter().zip(expected) {
            assert_abs_diff_eq!(*c, e, epsilon = 1e-12);
        }
        // numpy.blackman(5)
        let expected = [0.0, 0.34, 1.0, 0.34, 0.0];
        for (c, e) in WindowFunction::Blackman.coefficients(5).iter().zip(expected) {
            assert_abs_diff_eq!(*c, e, epsilon = 1e-12);
        }
        // numpy.bartlett(5)
        let expected = [0.0, 0.5, 1.0, 0.5, 0.0];
        for (c, e) in WindowFunction::Bartlett.coefficients(5).iter().zip(expected) {
            assert_abs_diff_eq!(*c, e, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_windows_are_symmetric() {
        for w in WindowFunction::iter() {
            let c = w.coefficients(64);
            for (a, b) in c.iter().zip(c.iter().rev()) {
                assert_abs_diff_eq!(*a, *b, epsilon = 1e-12);
            }
        }
    }
}
