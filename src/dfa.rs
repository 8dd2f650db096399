//! Detrended Fluctuation Analysis (DFA).
//!
//! Estimates the scaling exponent of long-range correlation in a 1-D series:
//! integrate the mean-centered series, detrend it per non-overlapping bin
//! with a low-order polynomial, and regress the log RMS fluctuation on the
//! log bin size. The slope `alpha` characterizes the series:
//!
//! * `alpha ≈ 0.5` — white noise (uncorrelated)
//! * `alpha ≈ 1.0` — pink noise (1/f dynamics)
//! * `alpha ≈ 1.5` — non-stationary or strongly trending
//!
//! Beyond the generic estimator, this module applies DFA to the windowed
//! cross-correlation output: per lag (does that lag's correlation strength
//! drift or persist across the recording?) and on the per-window average
//! series.

use crate::cross_correlation::WindowResult;
use crate::errors::{SynchronyError, SynchronyResult};
use crate::math_utils::{integrate_series, log_spaced_window_sizes, mean, ols_regression, polynomial_trend};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Minimum series length for automatic window-size selection.
pub const MIN_DFA_SAMPLES: usize = 100;

/// Smallest window size of the automatic log-spaced grid.
const MIN_WINDOW_SIZE: usize = 10;

/// Number of window sizes in the automatic grid.
const NUM_WINDOW_SIZES: usize = 10;

/// Result of a DFA run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DfaEstimate {
    /// Scaling exponent (slope of the log-log fluctuation fit)
    pub alpha: f64,
    /// Intercept of the log-log fluctuation fit
    pub intercept: f64,
    /// RMS fluctuation per window size, aligned with `window_sizes`
    pub fluctuations: Vec<f64>,
    /// Window sizes the fluctuations were computed at
    pub window_sizes: Vec<usize>,
}

/// DFA of one lag's correlation series across windows.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LagDfa {
    /// The lag whose across-window correlation series was analyzed
    pub lag: i64,
    /// The DFA estimate, or `None` when DFA failed for this lag's series
    /// (too few windows, degenerate fluctuations)
    pub estimate: Option<DfaEstimate>,
}

/// Automatically selects log-spaced DFA window sizes for a series length.
///
/// Ten sizes log-spaced between 10 and `floor(0.1 * len)`, truncated to
/// integers. Duplicates after truncation are kept; they contribute identical
/// fluctuation samples to the regression (a known source of fit noise on
/// short series).
///
/// # Errors
/// * [`SynchronyError::InsufficientData`] when `len < 100`
/// * [`SynchronyError::OrderTooHigh`] when `floor(0.1 * len) <= order`
pub fn make_window_sizes(len: usize, order: usize) -> SynchronyResult<Vec<usize>> {
    if len < MIN_DFA_SAMPLES {
        return Err(SynchronyError::InsufficientData {
            required: MIN_DFA_SAMPLES,
            actual: len,
        });
    }

    let max_window = len / 10;
    if max_window <= order {
        return Err(SynchronyError::OrderTooHigh { order, max_window });
    }

    Ok(log_spaced_window_sizes(MIN_WINDOW_SIZE, max_window, NUM_WINDOW_SIZES))
}

/// DFA with explicit window sizes (the generic estimator).
///
/// For each window size `w`: truncate the series to `floor(N / w) * w`
/// samples, integrate the mean-centered truncated series, fit a
/// degree-`order` polynomial per non-overlapping bin of length `w`, and take
/// the RMS of the detrending residuals over the truncated length. `alpha`
/// and `intercept` come from the OLS fit of `ln F(w)` on `ln w`.
///
/// # Errors
/// * [`SynchronyError::InvalidParameter`] for an empty window-size list
/// * [`SynchronyError::InsufficientData`] when the series is shorter than
///   the largest window
/// * [`SynchronyError::WindowTooSmall`] when the smallest window size is
///   `<= order + 1` (the local fit would be degenerate and the fluctuation
///   artificially zero)
/// * [`SynchronyError::Numerical`] when a fluctuation degenerates to zero
///   or the log-log fit is singular
pub fn dfa_with_window_sizes(
    data: &[f64],
    window_sizes: &[usize],
    order: usize,
) -> SynchronyResult<DfaEstimate> {
    if window_sizes.is_empty() {
        return Err(SynchronyError::InvalidParameter {
            parameter: "window_sizes".to_string(),
            value: 0.0,
            constraint: "at least one window size".to_string(),
        });
    }

    let max_window = *window_sizes.iter().max().expect("nonempty");
    let min_window = *window_sizes.iter().min().expect("nonempty");
    if data.len() < max_window {
        return Err(SynchronyError::InsufficientData {
            required: max_window,
            actual: data.len(),
        });
    }
    if min_window <= order + 1 {
        return Err(SynchronyError::WindowTooSmall { min_window, order });
    }

    let n = data.len();
    let mut fluctuations = Vec::with_capacity(window_sizes.len());
    for &w in window_sizes {
        let num_bins = n / w;
        let truncated_len = num_bins * w;
        // The integration is redone per window size because the truncation
        // point, and with it the centering mean, changes with w.
        let integrated = integrate_series(&data[..truncated_len]);

        let mut sum_squared_residuals = 0.0;
        for bin in 0..num_bins {
            let segment = &integrated[bin * w..(bin + 1) * w];
            let trend = polynomial_trend(segment, order)?;
            for (y, y_hat) in segment.iter().zip(&trend) {
                let residual = y - y_hat;
                sum_squared_residuals += residual * residual;
            }
        }

        let fluctuation = (sum_squared_residuals / truncated_len as f64).sqrt();
        if fluctuation <= 0.0 || !fluctuation.is_finite() {
            log::warn!("degenerate DFA fluctuation at window size {}", w);
            return Err(SynchronyError::Numerical {
                reason: format!("degenerate fluctuation at window size {}", w),
            });
        }
        fluctuations.push(fluctuation);
    }

    let log_w: Vec<f64> = window_sizes.iter().map(|&w| (w as f64).ln()).collect();
    let log_f: Vec<f64> = fluctuations.iter().map(|&f| f.ln()).collect();
    let (alpha, intercept) = ols_regression(&log_w, &log_f)?;

    Ok(DfaEstimate {
        alpha,
        intercept,
        fluctuations,
        window_sizes: window_sizes.to_vec(),
    })
}

/// DFA with automatically selected window sizes.
///
/// Requires at least [`MIN_DFA_SAMPLES`] samples; see [`make_window_sizes`]
/// for the selection rule and [`dfa_with_window_sizes`] for the estimator.
pub fn dfa(data: &[f64], order: usize) -> SynchronyResult<DfaEstimate> {
    let window_sizes = make_window_sizes(data.len(), order)?;
    dfa_with_window_sizes(data, &window_sizes, order)
}

/// Runs DFA independently on each lag's correlation series across windows.
///
/// For lag `l`, the analyzed series is `windows[k].correlations[i(l)]` over
/// all window positions `k`. `max_lag` must be the value the windowed
/// correlation was computed with, without a lag filter (the per-lag
/// diagnostic needs the full `2 * max_lag + 1` lag range to label lags);
/// a filtered run yields an empty result.
///
/// Per-lag DFA failures (too few windows, degenerate series) are recorded as
/// `estimate: None` rather than aborting the whole diagnostic; partial
/// results are expected. An empty `windows` input yields an empty result.
pub fn dfa_per_lag(windows: &[WindowResult], max_lag: usize, order: usize) -> Vec<LagDfa> {
    let num_lags = 2 * max_lag + 1;
    if windows.is_empty() || windows.iter().any(|w| w.correlations.len() != num_lags) {
        return Vec::new();
    }

    (0..num_lags)
        .map(|i| {
            let lag = i as i64 - max_lag as i64;
            let series: Vec<f64> = windows.iter().map(|w| w.correlations[i]).collect();
            LagDfa {
                lag,
                estimate: dfa(&series, order).ok(),
            }
        })
        .collect()
}

/// Runs DFA on the series of per-window mean correlations.
///
/// Characterizes long-range structure in the window-to-window average
/// correlation trend. Returns `None` for empty input or when DFA fails on
/// the average series (the failure is local to this diagnostic; the
/// surrounding correlation computation stays valid).
pub fn dfa_window_averages(windows: &[WindowResult], order: usize) -> Option<DfaEstimate> {
    if windows.is_empty() {
        return None;
    }

    let averages: Vec<f64> = windows.iter().map(|w| mean(&w.correlations)).collect();
    dfa(&averages, order).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic LCG noise, decorrelated enough for DFA sanity checks.
    fn lcg_noise(n: usize, mut state: u64) -> Vec<f64> {
        (0..n)
            .map(|_| {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                (state >> 11) as f64 / (1u64 << 53) as f64 - 0.5
            })
            .collect()
    }

    #[test]
    fn test_make_window_sizes_bounds() {
        let sizes = make_window_sizes(1000, 1).unwrap();
        assert_eq!(sizes.len(), 10);
        assert_eq!(*sizes.first().unwrap(), 10);
        assert_eq!(*sizes.last().unwrap(), 100);
    }

    #[test]
    fn test_make_window_sizes_too_short() {
        assert!(matches!(
            make_window_sizes(50, 1),
            Err(SynchronyError::InsufficientData { required: 100, actual: 50 })
        ));
    }

    #[test]
    fn test_make_window_sizes_order_too_high() {
        // len 100 gives max_window 10; order 10 cannot be detrended there.
        assert!(matches!(
            make_window_sizes(100, 10),
            Err(SynchronyError::OrderTooHigh { order: 10, max_window: 10 })
        ));
    }

    #[test]
    fn test_window_too_small_rejected() {
        let data = lcg_noise(500, 7);
        assert!(matches!(
            dfa_with_window_sizes(&data, &[2, 20, 40], 1),
            Err(SynchronyError::WindowTooSmall { min_window: 2, order: 1 })
        ));
        // Exactly order + 1 is still degenerate.
        assert!(matches!(
            dfa_with_window_sizes(&data, &[3, 20, 40], 2),
            Err(SynchronyError::WindowTooSmall { .. })
        ));
    }

    #[test]
    fn test_dfa_data_shorter_than_largest_window() {
        let data = lcg_noise(30, 9);
        assert!(matches!(
            dfa_with_window_sizes(&data, &[10, 40], 1),
            Err(SynchronyError::InsufficientData { required: 40, actual: 30 })
        ));
    }

    #[test]
    fn test_white_noise_alpha_near_half() {
        let data = lcg_noise(2000, 42);
        let estimate = dfa(&data, 1).unwrap();
        assert!(
            (0.3..=0.7).contains(&estimate.alpha),
            "alpha = {}",
            estimate.alpha
        );
        assert_eq!(estimate.fluctuations.len(), estimate.window_sizes.len());
        assert!(estimate.fluctuations.iter().all(|&f| f > 0.0));
    }

    #[test]
    fn test_integrated_noise_alpha_near_one_or_above() {
        let noise = lcg_noise(2000, 99);
        let mut cumsum = 0.0;
        let walk: Vec<f64> = noise
            .iter()
            .map(|&v| {
                cumsum += v;
                cumsum
            })
            .collect();
        let estimate = dfa(&walk, 1).unwrap();
        assert!(
            estimate.alpha > 0.8,
            "random walk should scale steeper than noise, alpha = {}",
            estimate.alpha
        );
    }

    #[test]
    fn test_dfa_per_lag_covers_full_lag_range() {
        use crate::cross_correlation::{windowed_cross_correlation, WindowedConfig};

        let x = lcg_noise(4000, 3);
        let y = lcg_noise(4000, 5);
        let config = WindowedConfig {
            window_size: 25,
            step_size: 10,
            max_lag: 4,
            ..Default::default()
        };
        let windows = windowed_cross_correlation(&x, &y, &config).unwrap();
        // 398 windows, long enough for the automatic window selector.
        assert!(windows.len() >= MIN_DFA_SAMPLES);

        let per_lag = dfa_per_lag(&windows, 4, 1);
        assert_eq!(per_lag.len(), 9);
        assert_eq!(per_lag[0].lag, -4);
        assert_eq!(per_lag[8].lag, 4);
        for lag_dfa in &per_lag {
            let estimate = lag_dfa.estimate.as_ref().expect("long series should succeed");
            assert!(estimate.alpha.is_finite());
        }
    }

    #[test]
    fn test_dfa_per_lag_short_series_records_absent_results() {
        use crate::cross_correlation::{windowed_cross_correlation, WindowedConfig};

        let x = lcg_noise(300, 11);
        let y = lcg_noise(300, 13);
        let config = WindowedConfig {
            window_size: 50,
            step_size: 25,
            max_lag: 5,
            ..Default::default()
        };
        let windows = windowed_cross_correlation(&x, &y, &config).unwrap();
        // Only 11 windows: every per-lag series is below the DFA minimum.
        let per_lag = dfa_per_lag(&windows, 5, 1);
        assert_eq!(per_lag.len(), 11);
        assert!(per_lag.iter().all(|l| l.estimate.is_none()));
    }

    #[test]
    fn test_dfa_per_lag_empty_input() {
        assert!(dfa_per_lag(&[], 5, 1).is_empty());
    }

    #[test]
    fn test_dfa_window_averages_empty_input() {
        assert!(dfa_window_averages(&[], 1).is_none());
    }

    #[test]
    fn test_dfa_window_averages_long_run() {
        use crate::cross_correlation::{windowed_cross_correlation, WindowedConfig};

        let x = lcg_noise(4000, 17);
        let y = lcg_noise(4000, 23);
        let config = WindowedConfig {
            window_size: 25,
            step_size: 10,
            max_lag: 4,
            ..Default::default()
        };
        let windows = windowed_cross_correlation(&x, &y, &config).unwrap();
        let estimate = dfa_window_averages(&windows, 1).expect("long series should succeed");
        assert!(estimate.alpha.is_finite());
    }
}
