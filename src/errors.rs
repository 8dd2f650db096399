//! Error types and validation functions for dyadic synchrony analysis.
//!
//! This module provides error handling for all analysis operations, including
//! data validation, parameter range checks, and numerical-stability failures.

use thiserror::Error;

/// Error types for synchrony analysis operations.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum SynchronyError {
    /// Signal type string could not be parsed.
    #[error("Invalid signal type: '{value}', expected 'event-based' or 'fixed-rate'")]
    InvalidSignalType {
        /// The unrecognized signal type string
        value: String,
    },

    /// Raw signal is malformed or too short to preprocess.
    #[error("Preprocessing failed: {reason}")]
    Preprocessing {
        /// Description of what made the raw signal unusable
        reason: String,
    },

    /// Insufficient data for the requested analysis.
    #[error("Insufficient data: need at least {required} points, got {actual}")]
    InsufficientData {
        /// Minimum required data points
        required: usize,
        /// Actual number of data points provided
        actual: usize,
    },

    /// DFA polynomial order incompatible with the available window sizes.
    #[error("DFA order {order} too high: largest usable window is {max_window}")]
    OrderTooHigh {
        /// Requested detrending polynomial order
        order: usize,
        /// Largest window size the series length allows
        max_window: usize,
    },

    /// A DFA window size is too small for the detrending order.
    #[error("DFA window size {min_window} too small: must exceed order + 1 = {}", order + 1)]
    WindowTooSmall {
        /// Smallest window size supplied
        min_window: usize,
        /// Requested detrending polynomial order
        order: usize,
    },

    /// The two signals of a dyad have different lengths.
    #[error("Signal length mismatch: {len_a} vs {len_b}")]
    LengthMismatch {
        /// Length of the first signal
        len_a: usize,
        /// Length of the second signal
        len_b: usize,
    },

    /// Invalid parameter value for analysis configuration.
    #[error("Invalid parameter: {parameter} = {value}, expected {constraint}")]
    InvalidParameter {
        /// Parameter name
        parameter: String,
        /// Invalid value provided
        value: f64,
        /// Valid range or constraint description
        constraint: String,
    },

    /// Numerical computation failed due to degenerate input.
    #[error("Numerical computation failed: {reason}")]
    Numerical {
        /// Detailed reason for the numerical failure
        reason: String,
    },
}

/// Result type for synchrony analysis operations.
///
/// Convenience alias for operations that may fail with [`SynchronyError`].
pub type SynchronyResult<T> = Result<T, SynchronyError>;

/// Validates that data has sufficient length for an operation.
///
/// # Arguments
/// * `data` - Input time series data
/// * `min_required` - Minimum number of data points required
///
/// # Returns
/// * `Ok(())` if data length is sufficient
/// * `Err(SynchronyError::InsufficientData)` if data is too short
pub fn validate_data_length(data: &[f64], min_required: usize) -> SynchronyResult<()> {
    if data.len() < min_required {
        Err(SynchronyError::InsufficientData {
            required: min_required,
            actual: data.len(),
        })
    } else {
        Ok(())
    }
}

/// Validates that every sample of a signal is finite.
///
/// Non-finite samples (NaN, ±∞) poison every downstream mean/variance
/// computation, so they are rejected at the boundary.
pub fn validate_all_finite(data: &[f64], name: &str) -> SynchronyResult<()> {
    if let Some(idx) = data.iter().position(|v| !v.is_finite()) {
        return Err(SynchronyError::Numerical {
            reason: format!("non-finite value in {} at index {}", name, idx),
        });
    }
    Ok(())
}

/// Validates that a parameter is within expected bounds (inclusive).
pub fn validate_parameter(value: f64, min: f64, max: f64, name: &str) -> SynchronyResult<()> {
    if value.is_nan() {
        return Err(SynchronyError::InvalidParameter {
            parameter: name.to_string(),
            value,
            constraint: "must not be NaN".to_string(),
        });
    }

    if value < min || value > max {
        Err(SynchronyError::InvalidParameter {
            parameter: name.to_string(),
            value,
            constraint: format!("[{}, {}]", min, max),
        })
    } else {
        Ok(())
    }
}
