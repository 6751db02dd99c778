// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Natural cubic-spline interpolation.

use super::SplineError;

/// A piecewise-cubic interpolant with continuous first and second derivatives
/// and zero curvature at both ends ("natural" boundary conditions).
///
/// Evaluating the spline at one of its control points returns that control
/// point's value exactly; no arithmetic is done in that case.
#[derive(Debug, Clone)]
pub struct CubicSpline {
    x: Vec<f64>,
    y: Vec<f64>,

    /// Per-segment polynomial coefficients. For segment `i` and `t = x -
    /// x[i]`, the value is `y[i] + b[i] t + c[i] t^2 + d[i] t^3`. There is one
    /// fewer segment than there are control points.
    b: Vec<f64>,
    c: Vec<f64>,
    d: Vec<f64>,
}

impl CubicSpline {
    /// Fit a spline through the control points `(x[i], y[i])`. The abscissae
    /// must be strictly increasing.
    pub fn new(x: &[f64], y: &[f64]) -> Result<CubicSpline, SplineError> {
        if x.len() != y.len() {
            return Err(SplineError::LengthMismatch {
                x: x.len(),
                y: y.len(),
            });
        }
        if x.is_empty() {
            return Err(SplineError::NoPoints);
        }
        for (index, (&xi, &yi)) in x.iter().zip(y.iter()).enumerate() {
            if !xi.is_finite() {
                return Err(SplineError::NotFinite { index, value: xi });
            }
            if !yi.is_finite() {
                return Err(SplineError::NotFinite { index, value: yi });
            }
        }
        if let Some(index) = x.windows(2).position(|w| w[1] <= w[0]) {
            return Err(SplineError::NotIncreasing {
                index: index + 1,
                value: x[index + 1],
            });
        }

        let n = x.len();
        let num_segments = n - 1;
        let h: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();
        let slopes: Vec<f64> = y
            .windows(2)
            .zip(h.iter())
            .map(|(w, &h)| (w[1] - w[0]) / h)
            .collect();

        // Second derivatives at each control point. The natural boundary
        // conditions pin the first and last to zero; the interior ones come
        // from a tridiagonal system solved with the Thomas algorithm.
        let mut m = vec![0.0; n];
        if n > 2 {
            let num_interior = n - 2;
            let mut diag = Vec::with_capacity(num_interior);
            let mut rhs = Vec::with_capacity(num_interior);
            for i in 1..n - 1 {
                diag.push(2.0 * (h[i - 1] + h[i]));
                rhs.push(6.0 * (slopes[i] - slopes[i - 1]));
            }

            // Forward sweep. The sub-diagonal entry of row k is h[k] and the
            // super-diagonal entry is h[k + 1].
            for k in 1..num_interior {
                let w = h[k] / diag[k - 1];
                diag[k] -= w * h[k];
                rhs[k] -= w * rhs[k - 1];
            }
            // Back substitution.
            m[num_interior] = rhs[num_interior - 1] / diag[num_interior - 1];
            for k in (0..num_interior - 1).rev() {
                m[k + 1] = (rhs[k] - h[k + 1] * m[k + 2]) / diag[k];
            }
        }

        let mut b = Vec::with_capacity(num_segments);
        let mut c = Vec::with_capacity(num_segments);
        let mut d = Vec::with_capacity(num_segments);
        for i in 0..num_segments {
            b.push(slopes[i] - h[i] * (2.0 * m[i] + m[i + 1]) / 6.0);
            c.push(m[i] / 2.0);
            d.push((m[i + 1] - m[i]) / (6.0 * h[i]));
        }

        Ok(CubicSpline {
            x: x.to_vec(),
            y: y.to_vec(),
            b,
            c,
            d,
        })
    }

    /// Fit a spline through `y` sampled at the integer abscissae `0, 1, ...,
    /// y.len() - 1`.
    pub fn from_samples(y: &[f64]) -> Result<CubicSpline, SplineError> {
        let x: Vec<f64> = (0..y.len()).map(|i| i as f64).collect();
        CubicSpline::new(&x, y)
    }

    /// The number of control points.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Evaluate the spline at `x`. Values outside the control points are
    /// extrapolated with the nearest end segment's polynomial.
    pub fn evaluate(&self, x: f64) -> f64 {
        match self.x.binary_search_by(|v| v.total_cmp(&x)) {
            Ok(i) => self.y[i],
            // A single control point makes a constant.
            Err(_) if self.b.is_empty() => self.y[0],
            Err(i) => {
                let segment = i.saturating_sub(1).min(self.b.len() - 1);
                let t = x - self.x[segment];
                self.y[segment]
                    + t * (self.b[segment] + t * (self.c[segment] + t * self.d[segment]))
            }
        }
    }

    /// Evaluate the spline at many points.
    pub fn evaluate_many(&self, x: &[f64]) -> Vec<f64> {
        x.iter().map(|&x| self.evaluate(x)).collect()
    }
}
