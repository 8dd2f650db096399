//! # Dyadic Synchrony Analysis
//!
//! Numerical analysis of pairwise correlation structure between two aligned
//! physiological time series sampled from the members of a dyad, such as
//! heart-rate-derived inter-beat-interval series or skin-conductance traces.
//!
//! ## Key Features
//!
//! - **Signal Preprocessing**: physiological-range filtering, cubic-spline
//!   resampling of event-based interval signals to a fixed rate, length
//!   alignment, and standardization
//! - **Standard Cross-Correlation**: whole-signal normalized lagged
//!   correlation with a fixed, documented lag-sign convention
//! - **Windowed Cross-Correlation**: sliding-window lagged correlation with
//!   sigmoid contrast rescaling, Fisher-z window statistics, per-window
//!   averaging, and lag-range filtering
//! - **Detrended Fluctuation Analysis**: scaling-exponent estimation with
//!   automatic log-spaced window selection, applied standalone or as a
//!   long-range-correlation diagnostic over the windowed output
//!
//! All functions are pure transformations from input slices to owned result
//! values: no I/O, no shared mutable state, safe to call concurrently on
//! independent inputs. GUI, batch iteration, and export layers are expected
//! to live outside this crate and exchange plain numeric data with it.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dyad_synchrony::{analyze_dyad, DyadAnalysisConfig, SignalType, WindowedConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Two inter-beat-interval recordings in milliseconds.
//!     let ibi_a: Vec<f64> = (0..300).map(|i| 820.0 + 40.0 * (i as f64 * 0.1).sin()).collect();
//!     let ibi_b: Vec<f64> = (0..300).map(|i| 790.0 + 35.0 * (i as f64 * 0.1 + 0.4).sin()).collect();
//!
//!     let config = DyadAnalysisConfig {
//!         signal_type: SignalType::EventBased,
//!         windowed: WindowedConfig {
//!             window_size: 150, // 30 s at the 5 Hz resampling rate
//!             step_size: 30,
//!             max_lag: 30,
//!             ..Default::default()
//!         },
//!         ..Default::default()
//!     };
//!
//!     let analysis = analyze_dyad(&ibi_a, &ibi_b, &config)?;
//!     for window in &analysis.windowed {
//!         println!(
//!             "window @ {}: r_max = {:.3} at lag {}",
//!             window.start_idx, window.r_max, window.tau_max
//!         );
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Lag Convention
//!
//! `Rxy(lag) = mean(x[t + lag] * y[t])` over the overlapping region, on
//! zero-mean/unit-variance signals. For `x` a pure delay of `y` by `k`
//! samples (`x[t] = y[t - k]`), the correlation peaks at `lag = +k`. This
//! convention is shared by both correlation modes and by `tau_max`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analyzer;
pub mod cross_correlation;
pub mod dfa;
pub mod errors;
pub mod math_utils;
pub mod preprocessing;

pub use analyzer::{analyze_dyad, DyadAnalysis, DyadAnalysisConfig};
pub use cross_correlation::{
    fisher_z, scale_sigmoid, standard_cross_correlation, windowed_cross_correlation,
    StandardCorrelation, WindowResult, WindowedConfig,
};
pub use dfa::{
    dfa, dfa_per_lag, dfa_window_averages, dfa_with_window_sizes, make_window_sizes, DfaEstimate,
    LagDfa, MIN_DFA_SAMPLES,
};
pub use errors::{SynchronyError, SynchronyResult};
pub use preprocessing::{
    preprocess_dyad, resample_intervals, PreprocessedDyad, SignalType, DEFAULT_RESAMPLING_RATE_HZ,
};
