//! Per-dyad analysis orchestration.
//!
//! Thin composition of the preprocessor, cross-correlation engine, and DFA
//! diagnostics into a single call: configuration in, one structured result
//! out. Batch iteration over many dyads, caching, and all presentation
//! belong to the caller; everything here is a pure function over the inputs.

use crate::cross_correlation::{
    standard_cross_correlation, windowed_cross_correlation, StandardCorrelation, WindowResult,
    WindowedConfig,
};
use crate::dfa::{dfa_per_lag, dfa_window_averages, DfaEstimate, LagDfa};
use crate::errors::SynchronyResult;
use crate::preprocessing::{preprocess_dyad, PreprocessedDyad, SignalType};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for a full per-dyad analysis.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DyadAnalysisConfig {
    /// Sampling model of both raw signals
    pub signal_type: SignalType,
    /// Drop out-of-physiological-range samples before resampling
    pub remove_invalid_samples: bool,
    /// Feed the standardized signal variants to the correlation engine
    /// instead of the raw (resampled) ones
    pub standardize: bool,
    /// Maximum lag for the whole-signal cross-correlation
    pub max_lag: usize,
    /// Report `|r|` in the whole-signal cross-correlation
    pub absolute: bool,
    /// Sliding-window correlation parameters
    pub windowed: WindowedConfig,
    /// Polynomial detrending order for the DFA diagnostics
    pub dfa_order: usize,
    /// Run the DFA diagnostics on the windowed-correlation output
    pub run_dfa: bool,
}

impl Default for DyadAnalysisConfig {
    fn default() -> Self {
        Self {
            signal_type: SignalType::EventBased,
            remove_invalid_samples: false,
            standardize: false,
            max_lag: 150,
            absolute: false,
            windowed: WindowedConfig::default(),
            dfa_order: 1,
            run_dfa: true,
        }
    }
}

/// Complete analysis result for one dyad.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DyadAnalysis {
    /// Aligned signals and their standardized variants
    pub preprocessed: PreprocessedDyad,
    /// Whole-signal cross-correlation
    pub standard: StandardCorrelation,
    /// Sliding-window cross-correlation, ordered by window start
    pub windowed: Vec<WindowResult>,
    /// Per-lag DFA of the windowed correlations; empty when DFA was not run
    /// (or a lag filter was active), `estimate: None` per lag where DFA
    /// failed
    pub dfa_per_lag: Vec<LagDfa>,
    /// DFA of the per-window average correlation series; `None` when DFA
    /// was not run or failed on that series
    pub dfa_window_averages: Option<DfaEstimate>,
}

/// Analyzes one dyad end to end.
///
/// Preprocessing failures abort the dyad (signals that cannot be aligned
/// cannot be correlated), as do invalid correlation parameters; DFA failures
/// are local to the series being diagnosed and are recorded as absent
/// results instead.
///
/// # Errors
/// Propagates preprocessing and correlation errors; see [`preprocess_dyad`],
/// [`standard_cross_correlation`], and [`windowed_cross_correlation`].
pub fn analyze_dyad(
    raw_a: &[f64],
    raw_b: &[f64],
    config: &DyadAnalysisConfig,
) -> SynchronyResult<DyadAnalysis> {
    let preprocessed = preprocess_dyad(
        raw_a,
        raw_b,
        config.signal_type,
        config.remove_invalid_samples,
    )?;

    let (signal_a, signal_b) = if config.standardize {
        (&preprocessed.signal_a_std, &preprocessed.signal_b_std)
    } else {
        (&preprocessed.signal_a, &preprocessed.signal_b)
    };

    let standard = standard_cross_correlation(signal_a, signal_b, config.max_lag, config.absolute)?;
    let windowed = windowed_cross_correlation(signal_a, signal_b, &config.windowed)?;

    let (per_lag, window_averages) = if config.run_dfa {
        (
            dfa_per_lag(&windowed, config.windowed.max_lag, config.dfa_order),
            dfa_window_averages(&windowed, config.dfa_order),
        )
    } else {
        (Vec::new(), None)
    };

    Ok(DyadAnalysis {
        preprocessed,
        standard,
        windowed,
        dfa_per_lag: per_lag,
        dfa_window_averages: window_averages,
    })
}
