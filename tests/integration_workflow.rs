use std::f64::consts::PI;

use dyad_synchrony::{
    analyze_dyad, standard_cross_correlation, DyadAnalysisConfig, SignalType, WindowedConfig,
};
use rand::prelude::*;
use rand_distr::StandardNormal;

fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| start + (end - start) * i as f64 / (n - 1) as f64)
        .collect()
}

#[test]
fn test_sine_cosine_quarter_cycle_phase() {
    // x = sin, y = cos over two full cycles: x is y delayed by a quarter
    // cycle (100 / 8 ≈ 12.5 samples), so Rxy peaks at lag ≈ +12..+13 and
    // mirrors to an equally strong rectified peak at −13..−12. At lag 0 the
    // near-orthogonal sine/cosine give r ≈ 0.
    let theta = linspace(0.0, 4.0 * PI, 100);
    let x: Vec<f64> = theta.iter().map(|&t| t.sin()).collect();
    let y: Vec<f64> = theta.iter().map(|&t| t.cos()).collect();

    let signed = standard_cross_correlation(&x, &y, 20, false).unwrap();
    let zero_idx = signed.lags.iter().position(|&l| l == 0).unwrap();
    assert!(signed.corr[zero_idx].abs() < 0.1, "r(0) = {}", signed.corr[zero_idx]);

    let peak_idx = signed
        .corr
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
        .unwrap()
        .0;
    let peak_lag = signed.lags[peak_idx];
    assert!(
        (12..=13).contains(&peak_lag),
        "signed peak at lag {}",
        peak_lag
    );
    assert!(signed.corr[peak_idx] > 0.9);

    let rectified = standard_cross_correlation(&x, &y, 20, true).unwrap();
    let neg_idx = rectified.lags.iter().position(|&l| l == -12).unwrap();
    assert!(
        rectified.corr[neg_idx] > 0.85,
        "rectified r(-12) = {}",
        rectified.corr[neg_idx]
    );
}

#[test]
fn test_full_pipeline_with_dfa_diagnostics() {
    // A long fixed-rate dyad with a common driver so correlations carry
    // structure, plus independent noise.
    let n = 6000;
    let mut rng = StdRng::seed_from_u64(101);
    let driver: Vec<f64> = (0..n).map(|i| (i as f64 * 0.013).sin()).collect();
    let a: Vec<f64> = driver
        .iter()
        .map(|&d| d + 0.8 * rng.sample::<f64, _>(StandardNormal))
        .collect();
    let b: Vec<f64> = driver
        .iter()
        .map(|&d| d + 0.8 * rng.sample::<f64, _>(StandardNormal))
        .collect();

    let config = DyadAnalysisConfig {
        signal_type: SignalType::FixedRate,
        max_lag: 50,
        windowed: WindowedConfig {
            window_size: 50,
            step_size: 10,
            max_lag: 8,
            ..Default::default()
        },
        ..Default::default()
    };
    let analysis = analyze_dyad(&a, &b, &config).unwrap();

    assert_eq!(analysis.standard.corr.len(), 101);
    let expected_windows = (n - 50) / 10 + 1;
    assert_eq!(analysis.windowed.len(), expected_windows);
    for pair in analysis.windowed.windows(2) {
        assert!(pair[0].start_idx < pair[1].start_idx);
    }

    // Enough windows for the automatic DFA window selector: one alpha per
    // lag, plus the window-average alpha.
    assert_eq!(analysis.dfa_per_lag.len(), 17);
    for lag_dfa in &analysis.dfa_per_lag {
        let estimate = lag_dfa
            .estimate
            .as_ref()
            .expect("per-lag DFA should succeed on a long recording");
        assert!(estimate.alpha.is_finite());
    }
    let avg = analysis
        .dfa_window_averages
        .as_ref()
        .expect("window-average DFA should succeed");
    assert!(avg.alpha.is_finite());
}

#[test]
fn test_event_based_pipeline_resamples_before_correlation() {
    // Inter-beat intervals around 750 ms for both members; the resampled
    // signals end up much longer than the event counts because the 5 Hz
    // grid has a 200 ms step.
    let mut rng = StdRng::seed_from_u64(202);
    let a: Vec<f64> = (0..240)
        .map(|i| 750.0 + 60.0 * (i as f64 * 0.15).sin() + 5.0 * rng.sample::<f64, _>(StandardNormal))
        .collect();
    let b: Vec<f64> = (0..240)
        .map(|i| 750.0 + 60.0 * (i as f64 * 0.15 + 0.6).sin() + 5.0 * rng.sample::<f64, _>(StandardNormal))
        .collect();

    let config = DyadAnalysisConfig {
        signal_type: SignalType::EventBased,
        max_lag: 30,
        windowed: WindowedConfig {
            window_size: 150,
            step_size: 30,
            max_lag: 30,
            ..Default::default()
        },
        run_dfa: false,
        ..Default::default()
    };
    let analysis = analyze_dyad(&a, &b, &config).unwrap();

    let n = analysis.preprocessed.signal_a.len();
    assert_eq!(analysis.preprocessed.signal_b.len(), n);
    // ~240 beats at ~750 ms cover ~180 s; at 5 Hz that is ~890 samples.
    assert!(n > 600, "resampled length {}", n);
    assert_eq!(analysis.windowed.len(), (n - 150) / 30 + 1);
}
