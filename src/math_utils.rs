//! Mathematical utility functions for synchrony analysis.
//!
//! This module provides the numerical foundation for the correlation and DFA
//! engines: standardization, regression, polynomial trend fitting, log-spaced
//! window-size generation, and cubic-spline interpolation for resampling.

use crate::errors::{validate_all_finite, SynchronyError, SynchronyResult};

/// Arithmetic mean of a slice. Returns 0.0 for empty input.
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Population variance (n divisor) via Welford's single-pass algorithm.
///
/// The n divisor matches the convention used throughout the correlation
/// pipeline (standardization and Fisher-z dispersion both normalize by n,
/// not n-1).
pub fn population_variance(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }

    let mut mean = 0.0;
    let mut m2 = 0.0;
    for (i, &value) in data.iter().enumerate() {
        let count = (i + 1) as f64;
        let delta = value - mean;
        mean += delta / count;
        m2 += delta * (value - mean);
    }

    (m2 / data.len() as f64).max(0.0)
}

/// Standardizes a series to zero mean and unit variance (population std).
///
/// # Errors
/// Returns [`SynchronyError::Numerical`] for empty or zero-variance input,
/// which cannot be standardized.
pub fn standardize(data: &[f64]) -> SynchronyResult<Vec<f64>> {
    if data.is_empty() {
        return Err(SynchronyError::Numerical {
            reason: "cannot standardize an empty series".to_string(),
        });
    }

    let m = mean(data);
    let std = population_variance(data).sqrt();
    if std <= 0.0 || !std.is_finite() {
        return Err(SynchronyError::Numerical {
            reason: "cannot standardize a zero-variance series".to_string(),
        });
    }

    Ok(data.iter().map(|&x| (x - m) / std).collect())
}

/// Integrates a series after mean-centering: `y[i] = sum_{j<=i} (x[j] - mean(x))`.
///
/// This is the profile construction step of DFA.
pub fn integrate_series(data: &[f64]) -> Vec<f64> {
    let m = mean(data);
    let mut integrated = Vec::with_capacity(data.len());
    let mut cumsum = 0.0;
    for &value in data {
        cumsum += value - m;
        integrated.push(cumsum);
    }
    integrated
}

/// Ordinary least squares regression of `y` on `x`.
///
/// Computes slope and intercept using centered sums for numerical stability,
/// preventing catastrophic cancellation when x values are large but have
/// small variance.
///
/// # Returns
/// `(slope, intercept)`
///
/// # Errors
/// * [`SynchronyError::InsufficientData`] for fewer than 2 points or mismatched lengths
/// * [`SynchronyError::Numerical`] for non-finite input or constant x values
pub fn ols_regression(x: &[f64], y: &[f64]) -> SynchronyResult<(f64, f64)> {
    if x.len() != y.len() || x.len() < 2 {
        return Err(SynchronyError::InsufficientData {
            required: 2,
            actual: x.len().min(y.len()),
        });
    }

    validate_all_finite(x, "regression x")?;
    validate_all_finite(y, "regression y")?;

    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let sum_xy: f64 = x
        .iter()
        .zip(y)
        .map(|(xi, yi)| (xi - mean_x) * (yi - mean_y))
        .sum();
    let sum_x2: f64 = x
        .iter()
        .map(|xi| {
            let centered = xi - mean_x;
            centered * centered
        })
        .sum();

    if sum_x2 < 1e-14 {
        return Err(SynchronyError::Numerical {
            reason: "predictor has zero variance (constant values)".to_string(),
        });
    }

    let slope = sum_xy / sum_x2;
    let intercept = mean_y - slope * mean_x;
    Ok((slope, intercept))
}

/// Fits a degree-`order` polynomial to `y` against local index `0..n-1` and
/// returns the fitted values.
///
/// X values are centered and scaled to `[-1, 1]` before building the normal
/// equations, which keeps the system well conditioned for the low orders
/// (0..=5) used in DFA detrending.
///
/// # Errors
/// * [`SynchronyError::InsufficientData`] when `y.len() <= order`
/// * [`SynchronyError::InvalidParameter`] for `order > 5`
/// * [`SynchronyError::Numerical`] if the normal equations are singular
pub fn polynomial_trend(y: &[f64], order: usize) -> SynchronyResult<Vec<f64>> {
    let n = y.len();
    if n <= order {
        return Err(SynchronyError::InsufficientData {
            required: order + 1,
            actual: n,
        });
    }
    if order > 5 {
        return Err(SynchronyError::InvalidParameter {
            parameter: "order".to_string(),
            value: order as f64,
            constraint: "0..=5".to_string(),
        });
    }

    if order == 0 {
        let m = mean(y);
        return Ok(vec![m; n]);
    }

    // Map index 0..n-1 to [-1, 1]
    let x_mean = (n - 1) as f64 / 2.0;
    let x_scale = if n > 1 { (n - 1) as f64 / 2.0 } else { 1.0 };
    let x_vals: Vec<f64> = (0..n).map(|i| (i as f64 - x_mean) / x_scale).collect();

    // Normal equations A^T A c = A^T y for the Vandermonde matrix A
    let dim = order + 1;
    let mut ata = vec![vec![0.0; dim]; dim];
    let mut aty = vec![0.0; dim];
    for (i, &xi) in x_vals.iter().enumerate() {
        let mut powers = Vec::with_capacity(dim);
        let mut p = 1.0;
        for _ in 0..dim {
            powers.push(p);
            p *= xi;
        }
        for r in 0..dim {
            aty[r] += powers[r] * y[i];
            for c in 0..dim {
                ata[r][c] += powers[r] * powers[c];
            }
        }
    }

    let coeffs = solve_linear_system(&mut ata, &mut aty)?;

    Ok(x_vals
        .iter()
        .map(|&xi| {
            let mut fitted = 0.0;
            let mut p = 1.0;
            for &c in &coeffs {
                fitted += c * p;
                p *= xi;
            }
            fitted
        })
        .collect())
}

/// Solves a small dense linear system in place via Gaussian elimination with
/// partial pivoting. Used only for the (order+1)-dimensional polynomial
/// normal equations.
fn solve_linear_system(a: &mut [Vec<f64>], b: &mut [f64]) -> SynchronyResult<Vec<f64>> {
    let n = b.len();
    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&r1, &r2| {
                a[r1][col]
                    .abs()
                    .partial_cmp(&a[r2][col].abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or(col);
        if a[pivot_row][col].abs() < 1e-12 {
            return Err(SynchronyError::Numerical {
                reason: "singular matrix in polynomial fit".to_string(),
            });
        }
        a.swap(col, pivot_row);
        b.swap(col, pivot_row);

        let pivot_row_vals = a[col].clone();
        let pivot_rhs = b[col];
        for row in (col + 1)..n {
            let factor = a[row][col] / pivot_row_vals[col];
            for c in col..n {
                a[row][c] -= factor * pivot_row_vals[c];
            }
            b[row] -= factor * pivot_rhs;
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let mut sum = b[row];
        for c in (row + 1)..n {
            sum -= a[row][c] * x[c];
        }
        x[row] = sum / a[row][row];
    }
    Ok(x)
}

/// Generates `num` logarithmically spaced integer window sizes between
/// `min_size` and `max_size` (both inclusive endpoints of the log grid).
///
/// Values are truncated to integers and duplicates after truncation are
/// deliberately kept: on short series the duplicated sizes contribute
/// identical points to the fluctuation regression, which matches the
/// reference numerics.
pub fn log_spaced_window_sizes(min_size: usize, max_size: usize, num: usize) -> Vec<usize> {
    if num == 0 {
        return Vec::new();
    }
    if num == 1 || min_size >= max_size {
        return vec![min_size; num];
    }

    let log_min = (min_size as f64).log10();
    let log_max = (max_size as f64).log10();
    (0..num)
        .map(|i| {
            let exponent = log_min + (log_max - log_min) * i as f64 / (num - 1) as f64;
            10f64.powf(exponent) as usize
        })
        .collect()
}

/// Cubic spline through strictly increasing knots with not-a-knot boundary
/// conditions (third-derivative continuity at the second and second-to-last
/// knots).
///
/// Used to resample event-based interval series onto a fixed-rate grid. Two
/// knots degrade to linear interpolation, three to the unique interpolating
/// parabola.
#[derive(Debug, Clone)]
pub struct CubicSpline {
    t: Vec<f64>,
    y: Vec<f64>,
    /// Second derivatives at the knots ("moments").
    m: Vec<f64>,
}

impl CubicSpline {
    /// Builds the spline through `(t[i], y[i])`.
    ///
    /// # Errors
    /// * [`SynchronyError::InsufficientData`] for fewer than 2 knots
    /// * [`SynchronyError::Numerical`] if `t` is not strictly increasing or
    ///   contains non-finite values
    pub fn new(t: &[f64], y: &[f64]) -> SynchronyResult<Self> {
        let n = t.len();
        if n != y.len() {
            return Err(SynchronyError::LengthMismatch {
                len_a: n,
                len_b: y.len(),
            });
        }
        if n < 2 {
            return Err(SynchronyError::InsufficientData {
                required: 2,
                actual: n,
            });
        }
        validate_all_finite(t, "spline knots")?;
        validate_all_finite(y, "spline values")?;
        if t.windows(2).any(|w| w[1] <= w[0]) {
            return Err(SynchronyError::Numerical {
                reason: "spline knots must be strictly increasing".to_string(),
            });
        }

        let m = Self::solve_moments(t, y)?;
        Ok(Self {
            t: t.to_vec(),
            y: y.to_vec(),
            m,
        })
    }

    fn solve_moments(t: &[f64], y: &[f64]) -> SynchronyResult<Vec<f64>> {
        let n = t.len();
        // Linear segment: zero curvature everywhere.
        if n == 2 {
            return Ok(vec![0.0, 0.0]);
        }

        let h: Vec<f64> = t.windows(2).map(|w| w[1] - w[0]).collect();

        // Three knots: not-a-knot at both ends forces the interpolating
        // parabola, whose second derivative is constant.
        if n == 3 {
            let s0 = (y[1] - y[0]) / h[0];
            let s1 = (y[2] - y[1]) / h[1];
            let m = 2.0 * (s1 - s0) / (h[0] + h[1]);
            return Ok(vec![m; 3]);
        }

        // Interior continuity equations for moments M[1..n-1]:
        //   h[i-1] M[i-1] + 2(h[i-1]+h[i]) M[i] + h[i] M[i+1] = rhs[i]
        // plus not-a-knot rows at both ends:
        //   h[1] M[0] - (h[0]+h[1]) M[1] + h[0] M[2] = 0
        //   h[n-2] M[n-3] - (h[n-3]+h[n-2]) M[n-2] + h[n-3] M[n-1] = 0
        // The boundary rows are folded into the first and last interior rows,
        // leaving a tridiagonal system in M[1..=n-2].
        let rhs = |i: usize| {
            6.0 * ((y[i + 1] - y[i]) / h[i] - (y[i] - y[i - 1]) / h[i - 1])
        };

        let interior = n - 2;
        let mut sub = vec![0.0; interior];
        let mut diag = vec![0.0; interior];
        let mut sup = vec![0.0; interior];
        let mut d = vec![0.0; interior];
        for k in 0..interior {
            let i = k + 1;
            sub[k] = h[i - 1];
            diag[k] = 2.0 * (h[i - 1] + h[i]);
            sup[k] = h[i];
            d[k] = rhs(i);
        }

        // Fold M[0] out of the first interior row using the left boundary row.
        let f0 = h[0] / h[1];
        diag[0] += f0 * (h[0] + h[1]);
        sup[0] -= f0 * h[0];
        sub[0] = 0.0;

        // Fold M[n-1] out of the last interior row using the right boundary row.
        let f1 = h[n - 2] / h[n - 3];
        diag[interior - 1] += f1 * (h[n - 3] + h[n - 2]);
        sub[interior - 1] -= f1 * h[n - 2];
        sup[interior - 1] = 0.0;

        // Thomas algorithm; the folded system stays diagonally dominant.
        for k in 1..interior {
            let w = sub[k] / diag[k - 1];
            let (sup_prev, d_prev) = (sup[k - 1], d[k - 1]);
            diag[k] -= w * sup_prev;
            d[k] -= w * d_prev;
        }
        let mut m_inner = vec![0.0; interior];
        m_inner[interior - 1] = d[interior - 1] / diag[interior - 1];
        for k in (0..interior - 1).rev() {
            m_inner[k] = (d[k] - sup[k] * m_inner[k + 1]) / diag[k];
        }

        let mut m = vec![0.0; n];
        m[1..=interior].copy_from_slice(&m_inner);
        // Recover the boundary moments from the not-a-knot rows.
        m[0] = ((h[0] + h[1]) * m[1] - h[0] * m[2]) / h[1];
        m[n - 1] = ((h[n - 3] + h[n - 2]) * m[n - 2] - h[n - 2] * m[n - 3]) / h[n - 3];
        Ok(m)
    }

    /// Evaluates the spline at `x`. Outside the knot range the boundary
    /// segment is extrapolated.
    pub fn eval(&self, x: f64) -> f64 {
        let n = self.t.len();
        // Index of the segment [t[i], t[i+1]] containing x.
        let i = match self.t.binary_search_by(|&knot| {
            knot.partial_cmp(&x).unwrap_or(std::cmp::Ordering::Less)
        }) {
            Ok(idx) => idx.min(n - 2),
            Err(idx) => idx.saturating_sub(1).min(n - 2),
        };

        let h = self.t[i + 1] - self.t[i];
        let a = self.t[i + 1] - x;
        let b = x - self.t[i];
        self.m[i] * a * a * a / (6.0 * h)
            + self.m[i + 1] * b * b * b / (6.0 * h)
            + (self.y[i] / h - self.m[i] * h / 6.0) * a
            + (self.y[i + 1] / h - self.m[i + 1] * h / 6.0) * b
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_and_variance() {
        let data = vec![1.0, 2.0, 3.0, 4.0];
        assert!((mean(&data) - 2.5).abs() < 1e-12);
        assert!((population_variance(&data) - 1.25).abs() < 1e-12);
    }

    #[test]
    fn test_standardize_moments() {
        let data = vec![3.0, 7.0, 1.0, 9.0, 5.0];
        let std = standardize(&data).unwrap();
        assert!(mean(&std).abs() < 1e-12);
        assert!((population_variance(&std) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_standardize_constant_fails() {
        assert!(standardize(&[2.0; 10]).is_err());
        assert!(standardize(&[]).is_err());
    }

    #[test]
    fn test_integrate_series_sums_to_zero() {
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let integrated = integrate_series(&data);
        assert_eq!(integrated.len(), 5);
        // The mean-centered cumulative sum returns to zero at the last sample.
        assert!(integrated.last().unwrap().abs() < 1e-12);
    }

    #[test]
    fn test_ols_recovers_exact_line() {
        let x: Vec<f64> = (0..20).map(|i| i as f64).collect();
        let y: Vec<f64> = x.iter().map(|&xi| 3.0 * xi - 2.0).collect();
        let (slope, intercept) = ols_regression(&x, &y).unwrap();
        assert!((slope - 3.0).abs() < 1e-10);
        assert!((intercept + 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_ols_rejects_constant_predictor() {
        let x = vec![1.0; 10];
        let y: Vec<f64> = (0..10).map(|i| i as f64).collect();
        assert!(ols_regression(&x, &y).is_err());
    }

    #[test]
    fn test_polynomial_trend_fits_quadratic_exactly() {
        let y: Vec<f64> = (0..30)
            .map(|i| {
                let x = i as f64;
                0.5 * x * x - 3.0 * x + 7.0
            })
            .collect();
        let fitted = polynomial_trend(&y, 2).unwrap();
        for (a, b) in y.iter().zip(&fitted) {
            assert!((a - b).abs() < 1e-6, "{} vs {}", a, b);
        }
    }

    #[test]
    fn test_polynomial_trend_order_zero_is_mean() {
        let y = vec![1.0, 2.0, 3.0];
        let fitted = polynomial_trend(&y, 0).unwrap();
        for v in fitted {
            assert!((v - 2.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_polynomial_trend_too_few_points() {
        assert!(polynomial_trend(&[1.0, 2.0], 2).is_err());
    }

    #[test]
    fn test_log_spaced_window_sizes_match_reference() {
        // np.logspace(np.log10(10), np.log10(100), 10).astype(int)
        let sizes = log_spaced_window_sizes(10, 100, 10);
        assert_eq!(sizes, vec![10, 12, 16, 21, 27, 35, 46, 59, 77, 100]);
    }

    #[test]
    fn test_log_spaced_window_sizes_keep_duplicates() {
        let sizes = log_spaced_window_sizes(10, 14, 10);
        assert_eq!(sizes.len(), 10);
        assert!(sizes.windows(2).any(|w| w[0] == w[1]));
    }

    #[test]
    fn test_spline_interpolates_knots() {
        let t = vec![0.0, 1.0, 2.5, 4.0, 5.0, 7.0];
        let y = vec![1.0, -2.0, 0.5, 3.0, 2.0, -1.0];
        let cs = CubicSpline::new(&t, &y).unwrap();
        for (ti, yi) in t.iter().zip(&y) {
            assert!((cs.eval(*ti) - yi).abs() < 1e-9);
        }
    }

    #[test]
    fn test_spline_reproduces_cubic_polynomial() {
        // Not-a-knot splines reproduce any single cubic exactly.
        let poly = |x: f64| 2.0 * x * x * x - x * x + 3.0 * x - 5.0;
        let t: Vec<f64> = (0..8).map(|i| i as f64).collect();
        let y: Vec<f64> = t.iter().map(|&x| poly(x)).collect();
        let cs = CubicSpline::new(&t, &y).unwrap();
        let mut x = 0.25;
        while x < 7.0 {
            assert!((cs.eval(x) - poly(x)).abs() < 1e-7, "at x={}", x);
            x += 0.5;
        }
    }

    #[test]
    fn test_spline_two_knots_is_linear() {
        let cs = CubicSpline::new(&[0.0, 2.0], &[1.0, 5.0]).unwrap();
        assert!((cs.eval(1.0) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_spline_three_knots_is_parabola() {
        let poly = |x: f64| x * x - 2.0 * x + 1.0;
        let t = [0.0, 1.5, 4.0];
        let y: Vec<f64> = t.iter().map(|&x| poly(x)).collect();
        let cs = CubicSpline::new(&t, &y).unwrap();
        assert!((cs.eval(0.7) - poly(0.7)).abs() < 1e-9);
        assert!((cs.eval(3.0) - poly(3.0)).abs() < 1e-9);
    }

    #[test]
    fn test_spline_rejects_unsorted_knots() {
        assert!(CubicSpline::new(&[0.0, 2.0, 1.0], &[1.0, 2.0, 3.0]).is_err());
        assert!(CubicSpline::new(&[0.0, 0.0, 1.0], &[1.0, 2.0, 3.0]).is_err());
    }
}
