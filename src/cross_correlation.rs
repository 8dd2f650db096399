//! Normalized lagged cross-correlation between two equal-length signals.
//!
//! Two modes: whole-signal ("standard") and sliding-window ("windowed"). Both
//! share the same lag convention, which every downstream interpretation
//! depends on:
//!
//! ```text
//! Rxy(lag) = mean( x[t + lag] * y[t] )   over the overlapping region,
//!                                         on zero-mean/unit-variance signals
//! ```
//!
//! * `lag > 0`: x leads y (x's pattern occurs `lag` steps before y's)
//! * `lag = 0`: simultaneous correlation (Pearson r)
//! * `lag < 0`: y leads x (y's pattern occurs `|lag|` steps before x's)
//!
//! The windowed mode additionally reports a sigmoid-rescaled copy of each
//! window's correlations (display contrast only) and Fisher-z summary
//! statistics per window.

use crate::errors::{SynchronyError, SynchronyResult};
use crate::math_utils::{mean, population_variance, standardize};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Whole-signal cross-correlation: one value per lag in `[-max_lag, max_lag]`.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StandardCorrelation {
    /// Correlation values, aligned with `lags`
    pub corr: Vec<f64>,
    /// Lag values `-max_lag ..= max_lag`
    pub lags: Vec<i64>,
}

/// One sliding window's cross-correlation outcome.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WindowResult {
    /// Start index of the window in the input signals
    pub start_idx: usize,
    /// Index of the window center, for aligning results with the input
    pub center_idx: usize,
    /// Correlation values, one per lag in the active lag range
    pub correlations: Vec<f64>,
    /// Sigmoid-rescaled copy of `correlations`
    pub correlations_sigmoid: Vec<f64>,
    /// Peak correlation in the window
    pub r_max: f64,
    /// Lag at which the peak occurs (0 by convention under window averaging)
    pub tau_max: i64,
    /// Peak of the sigmoid-rescaled correlations
    pub r_max_sigmoid: f64,
    /// Lag of the sigmoid peak (0 by convention under window averaging)
    pub tau_max_sigmoid: i64,
    /// Mean of the Fisher z-transformed per-lag correlations, computed
    /// before any window averaging
    pub avg_z_transformed_corr: f64,
    /// Population variance of the Fisher z-transformed per-lag correlations,
    /// computed before any window averaging
    pub var_z_transformed_corr: f64,
}

/// Configuration for [`windowed_cross_correlation`].
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WindowedConfig {
    /// Number of samples per window
    pub window_size: usize,
    /// Step between consecutive window starts
    pub step_size: usize,
    /// Maximum lag magnitude to evaluate
    pub max_lag: usize,
    /// Report `|r|` instead of signed correlations
    pub absolute: bool,
    /// Collapse each window's per-lag values to the window mean (shape is
    /// preserved; `tau_max` becomes 0 by convention)
    pub average_windows: bool,
    /// Restrict the reported lag range to `[min(a, b), max(a, b)]`, which
    /// must lie within `[-max_lag, max_lag]`
    pub lag_filter: Option<(i64, i64)>,
}

impl Default for WindowedConfig {
    fn default() -> Self {
        Self {
            window_size: 150, // 30 s at 5 Hz
            step_size: 30,    // 6 s
            max_lag: 30,      // 6 s
            absolute: false,
            average_windows: false,
            lag_filter: None,
        }
    }
}

/// Rescales a correlation value with a sigmoid fixed-point-preserving at 0.
///
/// `2 / (1 + exp(-4v)) - 1` maps `(-1, 1)` onto a wider contrast range:
/// identity-like near 0, saturating toward ±1 faster than linear, sign and
/// bounds unchanged. Display-only; never feed the result into further
/// statistics.
pub fn scale_sigmoid(v: f64) -> f64 {
    2.0 / (1.0 + (-4.0 * v).exp()) - 1.0
}

/// Fisher z-transform of a correlation coefficient:
/// `0.5 * ln((1 + r) / (1 - r))`, i.e. `atanh(r)`.
///
/// Variance-stabilizing; `r = ±1` maps to `±∞`, which is propagated as-is.
pub fn fisher_z(r: f64) -> f64 {
    r.atanh()
}

/// Mean of the elementwise product of the lag-shifted overlapping subslices.
///
/// Inputs are assumed standardized; the mean over the overlap is the
/// normalized correlation at that lag, with no additional renormalization
/// for shorter overlaps at large `|lag|`.
fn lagged_mean_product(x: &[f64], y: &[f64], lag: i64) -> f64 {
    let n = x.len();
    let shift = lag.unsigned_abs() as usize;
    let overlap = n - shift;
    let sum: f64 = if lag > 0 {
        x[shift..].iter().zip(&y[..overlap]).map(|(a, b)| a * b).sum()
    } else if lag < 0 {
        x[..overlap].iter().zip(&y[shift..]).map(|(a, b)| a * b).sum()
    } else {
        x.iter().zip(y).map(|(a, b)| a * b).sum()
    };
    sum / overlap as f64
}

/// Index of the maximum value, first occurrence winning ties.
fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if v > values[best] {
            best = i;
        }
    }
    best
}

/// Computes whole-signal cross-correlation over lags `[-max_lag, max_lag]`.
///
/// Both signals are standardized over their full length before the per-lag
/// overlap means are taken. With `absolute`, correlation magnitudes are
/// reported.
///
/// # Errors
/// * [`SynchronyError::LengthMismatch`] when the signals differ in length
/// * [`SynchronyError::InvalidParameter`] when `max_lag >= x.len()`
/// * [`SynchronyError::Numerical`] for zero-variance input
pub fn standard_cross_correlation(
    x: &[f64],
    y: &[f64],
    max_lag: usize,
    absolute: bool,
) -> SynchronyResult<StandardCorrelation> {
    if x.len() != y.len() {
        return Err(SynchronyError::LengthMismatch {
            len_a: x.len(),
            len_b: y.len(),
        });
    }
    if x.is_empty() {
        return Err(SynchronyError::InsufficientData {
            required: 1,
            actual: 0,
        });
    }
    if max_lag >= x.len() {
        return Err(SynchronyError::InvalidParameter {
            parameter: "max_lag".to_string(),
            value: max_lag as f64,
            constraint: format!("< signal length {}", x.len()),
        });
    }

    let x_std = standardize(x)?;
    let y_std = standardize(y)?;

    let max_lag = max_lag as i64;
    let mut corr = Vec::with_capacity((2 * max_lag + 1) as usize);
    let mut lags = Vec::with_capacity((2 * max_lag + 1) as usize);
    for lag in -max_lag..=max_lag {
        let mut r = lagged_mean_product(&x_std, &y_std, lag);
        if absolute {
            r = r.abs();
        }
        corr.push(r);
        lags.push(lag);
    }

    Ok(StandardCorrelation { corr, lags })
}

/// Validates a windowed-correlation configuration against the signal length.
fn validate_windowed_config(config: &WindowedConfig) -> SynchronyResult<(i64, i64)> {
    if config.window_size == 0 {
        return Err(SynchronyError::InvalidParameter {
            parameter: "window_size".to_string(),
            value: 0.0,
            constraint: ">= 1".to_string(),
        });
    }
    if config.step_size == 0 {
        return Err(SynchronyError::InvalidParameter {
            parameter: "step_size".to_string(),
            value: 0.0,
            constraint: ">= 1".to_string(),
        });
    }
    if config.max_lag == 0 {
        return Err(SynchronyError::InvalidParameter {
            parameter: "max_lag".to_string(),
            value: 0.0,
            constraint: ">= 1".to_string(),
        });
    }
    // Keeps every lag's overlap non-empty; the recommended external bound is
    // the stricter max_lag <= window_size / 2.
    if config.max_lag >= config.window_size {
        return Err(SynchronyError::InvalidParameter {
            parameter: "max_lag".to_string(),
            value: config.max_lag as f64,
            constraint: format!("< window_size {}", config.window_size),
        });
    }

    let full = config.max_lag as i64;
    match config.lag_filter {
        None => Ok((-full, full)),
        Some((a, b)) => {
            let (lo, hi) = (a.min(b), a.max(b));
            if lo < -full || hi > full {
                return Err(SynchronyError::InvalidParameter {
                    parameter: "lag_filter".to_string(),
                    value: if lo < -full { lo as f64 } else { hi as f64 },
                    constraint: format!("within [{}, {}]", -full, full),
                });
            }
            Ok((lo, hi))
        }
    }
}

/// Computes sliding-window cross-correlation.
///
/// Windows start at `0, step_size, 2*step_size, ...` and only windows that
/// fully fit are emitted (trailing partial data is dropped); signals shorter
/// than one window yield an empty result, not an error. Each window's
/// segments are standardized independently, so correlations reflect
/// within-window structure.
///
/// Per window, the result carries the per-lag correlations and their
/// sigmoid-rescaled copy, the peak value and lag of each (first occurrence
/// on ties), and the mean/variance of the Fisher z-transformed per-lag
/// correlations. The z statistics are always computed before window
/// averaging, so they characterize the window's correlation strength and
/// dispersion across lags independent of the display-only averaging step.
///
/// # Errors
/// * [`SynchronyError::LengthMismatch`] when the signals differ in length
/// * [`SynchronyError::InvalidParameter`] for zero sizes, `max_lag` not below
///   `window_size`, or a lag filter outside `[-max_lag, max_lag]`
/// * [`SynchronyError::Numerical`] when a window has zero variance and
///   cannot be standardized
pub fn windowed_cross_correlation(
    x: &[f64],
    y: &[f64],
    config: &WindowedConfig,
) -> SynchronyResult<Vec<WindowResult>> {
    if x.len() != y.len() {
        return Err(SynchronyError::LengthMismatch {
            len_a: x.len(),
            len_b: y.len(),
        });
    }
    let (min_lag, max_lag) = validate_windowed_config(config)?;

    let n = x.len();
    if n < config.window_size {
        return Ok(Vec::new());
    }

    let mut results = Vec::new();
    let mut start = 0usize;
    while start + config.window_size <= n {
        let x_window = standardize(&x[start..start + config.window_size])?;
        let y_window = standardize(&y[start..start + config.window_size])?;

        let mut correlations: Vec<f64> = (min_lag..=max_lag)
            .map(|lag| {
                let r = lagged_mean_product(&x_window, &y_window, lag);
                if config.absolute {
                    r.abs()
                } else {
                    r
                }
            })
            .collect();
        let mut correlations_sigmoid: Vec<f64> =
            correlations.iter().map(|&r| scale_sigmoid(r)).collect();

        // Fisher-z summary before any averaging: mean(atanh(r_i)) across
        // lags, not atanh(mean(r_i)).
        let z_transformed: Vec<f64> = correlations.iter().map(|&r| fisher_z(r)).collect();
        let avg_z_transformed_corr = mean(&z_transformed);
        let var_z_transformed_corr = population_variance(&z_transformed);

        if config.average_windows {
            let avg = mean(&correlations);
            correlations.iter_mut().for_each(|v| *v = avg);
            let avg_sigmoid = mean(&correlations_sigmoid);
            correlations_sigmoid.iter_mut().for_each(|v| *v = avg_sigmoid);
        }

        let (r_max, tau_max, r_max_sigmoid, tau_max_sigmoid) = if config.average_windows {
            (correlations[0], 0, correlations_sigmoid[0], 0)
        } else {
            let idx = argmax(&correlations);
            let idx_sigmoid = argmax(&correlations_sigmoid);
            (
                correlations[idx],
                idx as i64 + min_lag,
                correlations_sigmoid[idx_sigmoid],
                idx_sigmoid as i64 + min_lag,
            )
        };

        results.push(WindowResult {
            start_idx: start,
            center_idx: start + config.window_size / 2,
            correlations,
            correlations_sigmoid,
            r_max,
            tau_max,
            r_max_sigmoid,
            tau_max_sigmoid,
            avg_z_transformed_corr,
            var_z_transformed_corr,
        });

        start += config.step_size;
    }

    Ok(results)
}
