//! Signal preprocessing for dyadic analysis.
//!
//! Cleans and aligns two raw physiological signals into equal-length arrays
//! ready for correlation. Event-based signals (inter-beat intervals) are
//! resampled to a fixed rate via cubic-spline interpolation; fixed-rate
//! signals (e.g. electrodermal activity) pass through unchanged. Both raw
//! and standardized variants are returned so callers can switch between them
//! without recomputation.

use std::str::FromStr;

use crate::errors::{validate_all_finite, SynchronyError, SynchronyResult};
use crate::math_utils::{standardize, CubicSpline};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default resampling rate for event-based signals, in Hz.
pub const DEFAULT_RESAMPLING_RATE_HZ: f64 = 5.0;

/// Physiological sampling model of a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SignalType {
    /// Inter-event intervals in milliseconds (e.g. inter-beat intervals);
    /// resampled to a fixed rate before correlation.
    EventBased,
    /// Already sampled at a fixed rate (e.g. electrodermal activity);
    /// passed through unchanged.
    FixedRate,
}

impl FromStr for SignalType {
    type Err = SynchronyError;

    fn from_str(s: &str) -> SynchronyResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "event-based" => Ok(SignalType::EventBased),
            "fixed-rate" => Ok(SignalType::FixedRate),
            other => Err(SynchronyError::InvalidSignalType {
                value: other.to_string(),
            }),
        }
    }
}

/// A preprocessed dyad: both signals aligned to equal length, with their
/// standardized (zero mean, unit variance) variants.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PreprocessedDyad {
    /// First signal, resampled/truncated but otherwise raw
    pub signal_a: Vec<f64>,
    /// Second signal, resampled/truncated but otherwise raw
    pub signal_b: Vec<f64>,
    /// Standardized variant of `signal_a`
    pub signal_a_std: Vec<f64>,
    /// Standardized variant of `signal_b`
    pub signal_b_std: Vec<f64>,
}

/// Drops inter-beat intervals outside the physiological range `[100, 1000)` ms.
fn remove_invalid_event_samples(intervals_ms: &[f64]) -> Vec<f64> {
    intervals_ms
        .iter()
        .copied()
        .filter(|&v| (100.0..1000.0).contains(&v))
        .collect()
}

/// Drops negative samples from a fixed-rate signal. This filter is minimal;
/// callers needing artifact rejection must clean the signal upstream.
fn remove_invalid_fixed_rate_samples(samples: &[f64]) -> Vec<f64> {
    log::warn!("fixed-rate invalid-sample filter only removes negative values");
    samples.iter().copied().filter(|&v| v >= 0.0).collect()
}

/// Resamples an inter-event interval series to a fixed rate.
///
/// Builds the cumulative event time axis (`t[0] = 0`,
/// `t[i] = t[i-1] + intervals_ms[i-1]`), fits a cubic spline through
/// `(t, intervals_ms)`, and samples it every `1000 / target_rate_hz` ms over
/// `[t[0], t[last])` (end exclusive). With `scale_output` the resampled
/// series is rescaled so its sum matches the original sum.
///
/// # Errors
/// [`SynchronyError::Preprocessing`] for fewer than 2 intervals (the spline
/// needs at least 2 knots), non-finite samples, or non-positive intervals
/// (the time axis must be strictly increasing).
pub fn resample_intervals(
    intervals_ms: &[f64],
    target_rate_hz: f64,
    scale_output: bool,
) -> SynchronyResult<Vec<f64>> {
    if intervals_ms.len() < 2 {
        return Err(SynchronyError::Preprocessing {
            reason: format!(
                "event-based signal needs at least 2 samples for interpolation, got {}",
                intervals_ms.len()
            ),
        });
    }
    validate_all_finite(intervals_ms, "interval series")?;
    if intervals_ms.iter().any(|&v| v <= 0.0) {
        return Err(SynchronyError::Preprocessing {
            reason: "inter-event intervals must be positive".to_string(),
        });
    }
    if !(target_rate_hz.is_finite() && target_rate_hz > 0.0) {
        return Err(SynchronyError::InvalidParameter {
            parameter: "target_rate_hz".to_string(),
            value: target_rate_hz,
            constraint: "> 0".to_string(),
        });
    }

    // Event time axis: each interval is stamped at the cumulative time of the
    // preceding intervals.
    let mut t = Vec::with_capacity(intervals_ms.len());
    let mut acc = 0.0;
    for &interval in intervals_ms {
        t.push(acc);
        acc += interval;
    }

    let spline = CubicSpline::new(&t, intervals_ms)?;

    let step_ms = 1000.0 / target_rate_hz;
    let t_end = *t.last().expect("nonempty by construction");
    let mut resampled = Vec::new();
    let mut i = 0usize;
    loop {
        let x = t[0] + i as f64 * step_ms;
        if x >= t_end {
            break;
        }
        resampled.push(spline.eval(x));
        i += 1;
    }

    if scale_output {
        let sum_original: f64 = intervals_ms.iter().sum();
        let sum_resampled: f64 = resampled.iter().sum();
        if sum_resampled.abs() > 0.0 {
            let scale = sum_original / sum_resampled;
            for v in &mut resampled {
                *v *= scale;
            }
        }
    }

    Ok(resampled)
}

/// Preprocesses a dyad's two raw signals into aligned, correlation-ready form.
///
/// Steps:
/// 1. Optionally drop out-of-physiological-range samples (off by default;
///    callers filtering upstream pass validated data).
/// 2. Resample event-based signals to [`DEFAULT_RESAMPLING_RATE_HZ`];
///    fixed-rate signals pass through.
/// 3. Truncate both signals to the shorter length.
/// 4. Standardize each signal (zero mean, unit variance).
///
/// # Errors
/// [`SynchronyError::Preprocessing`] for empty input or event-based signals
/// too short to interpolate; [`SynchronyError::Numerical`] for non-finite
/// samples or zero-variance signals (which cannot be standardized).
pub fn preprocess_dyad(
    raw_a: &[f64],
    raw_b: &[f64],
    signal_type: SignalType,
    remove_invalid_samples: bool,
) -> SynchronyResult<PreprocessedDyad> {
    if raw_a.is_empty() || raw_b.is_empty() {
        return Err(SynchronyError::Preprocessing {
            reason: "signals must be non-empty".to_string(),
        });
    }
    validate_all_finite(raw_a, "signal_a")?;
    validate_all_finite(raw_b, "signal_b")?;

    let (mut signal_a, mut signal_b) = if remove_invalid_samples {
        match signal_type {
            SignalType::EventBased => (
                remove_invalid_event_samples(raw_a),
                remove_invalid_event_samples(raw_b),
            ),
            SignalType::FixedRate => (
                remove_invalid_fixed_rate_samples(raw_a),
                remove_invalid_fixed_rate_samples(raw_b),
            ),
        }
    } else {
        (raw_a.to_vec(), raw_b.to_vec())
    };

    if signal_type == SignalType::EventBased {
        signal_a = resample_intervals(&signal_a, DEFAULT_RESAMPLING_RATE_HZ, false)?;
        signal_b = resample_intervals(&signal_b, DEFAULT_RESAMPLING_RATE_HZ, false)?;
    }

    let min_length = signal_a.len().min(signal_b.len());
    if min_length == 0 {
        return Err(SynchronyError::Preprocessing {
            reason: "no samples left after preprocessing".to_string(),
        });
    }
    signal_a.truncate(min_length);
    signal_b.truncate(min_length);

    let signal_a_std = standardize(&signal_a)?;
    let signal_b_std = standardize(&signal_b)?;

    Ok(PreprocessedDyad {
        signal_a,
        signal_b,
        signal_a_std,
        signal_b_std,
    })
}
