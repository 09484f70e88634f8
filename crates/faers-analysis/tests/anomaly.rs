//! Detector behavior tests.

use chrono::NaiveDate;

use faers_analysis::anomaly::{Baseline, Method, detect, rank_spikes, rolling_zscore, seasonal_spikes};
use faers_analysis::series::ensure_monthly_index;
use faers_model::{PipelineConfig, RollingParams, SeasonalParams};

fn date(y: i32, m: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, 1).unwrap()
}

fn series_of(values: &[f64]) -> faers_analysis::series::MonthlySeries {
    let points: Vec<(NaiveDate, f64)> = values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let year = 2023 + (i / 12) as i32;
            let month = (i % 12) as u32 + 1;
            (date(year, month), *v)
        })
        .collect();
    ensure_monthly_index(&points)
}

#[test]
fn single_spike_is_flagged_at_its_index() {
    // 12 flat months with one surge at index 5.
    let series = series_of(&[
        10.0, 10.0, 10.0, 10.0, 10.0, 100.0, 10.0, 10.0, 10.0, 10.0, 10.0, 10.0,
    ]);
    let frame = rolling_zscore(&series, &RollingParams::default());

    assert_eq!(frame.spike_count(), 1);
    assert!(frame.spikes[5]);
    assert!(frame.z[5] > 2.0);
    for (i, spike) in frame.spikes.iter().enumerate() {
        if i != 5 {
            assert!(!spike, "index {i} should not be a spike");
        }
    }
}

#[test]
fn constant_series_has_zero_z_and_no_spikes() {
    let series = series_of(&[7.0; 10]);
    let frame = rolling_zscore(&series, &RollingParams::default());
    assert!(!frame.is_empty());
    assert!(frame.z.iter().all(|z| *z == 0.0));
    assert_eq!(frame.spike_count(), 0);
}

#[test]
fn series_shorter_than_window_is_explicitly_empty() {
    let series = series_of(&[1.0, 2.0, 3.0]);
    let frame = rolling_zscore(&series, &RollingParams::default());
    assert!(frame.is_empty());
}

#[test]
fn seasonal_requires_two_periods() {
    let series = series_of(&[5.0; 23]);
    let frame = seasonal_spikes(&series, &SeasonalParams::default());
    assert!(frame.is_empty());

    let series = series_of(&[5.0; 24]);
    let frame = seasonal_spikes(&series, &SeasonalParams::default());
    assert!(!frame.is_empty());
    // Constant input: residuals carry no variation, so no spikes.
    assert_eq!(frame.spike_count(), 0);
    assert!(frame.z.iter().all(|z| *z == 0.0));
}

#[test]
fn seasonal_decomposition_exposes_components() {
    // Two years of a seasonal pattern with one outlier month.
    let mut values: Vec<f64> = (0..36usize).map(|i| 50.0 + 10.0 * ((i % 12) as f64)).collect();
    values[20] += 400.0;
    let series = series_of(&values);
    let frame = seasonal_spikes(&series, &SeasonalParams::default());

    assert!(!frame.is_empty());
    let Baseline::Seasonal(decomposition) = &frame.baseline else {
        panic!("expected seasonal baseline");
    };
    // Centered trend is undefined at the edges.
    assert!(decomposition.trend[0].is_none());
    assert!(decomposition.trend[35].is_none());
    assert!(decomposition.trend[18].is_some());
    assert_eq!(decomposition.seasonal.len(), 36);
    assert!(frame.spikes[20]);
}

#[test]
fn seasonal_request_on_short_series_falls_back_to_rolling() {
    let series = series_of(&[
        10.0, 10.0, 10.0, 10.0, 10.0, 100.0, 10.0, 10.0, 10.0, 10.0, 10.0, 10.0,
    ]);
    let config = PipelineConfig::default();

    let fallback = detect(&series, Method::Seasonal, &config);
    assert!(fallback.fell_back);
    assert_eq!(fallback.used, Method::RollingZ);
    assert_eq!(fallback.requested, Method::Seasonal);

    // Same shape and content as asking for rolling directly.
    let direct = detect(&series, Method::RollingZ, &config);
    assert_eq!(fallback.frame.months, direct.frame.months);
    assert_eq!(fallback.frame.z, direct.frame.z);
    assert_eq!(fallback.frame.spikes, direct.frame.spikes);
}

#[test]
fn rolling_request_never_falls_back() {
    let series = series_of(&[1.0, 2.0]);
    let detection = detect(&series, Method::RollingZ, &PipelineConfig::default());
    assert!(!detection.fell_back);
    assert!(detection.frame.is_empty());
}

#[test]
fn unknown_method_names_default_to_seasonal() {
    assert_eq!(Method::from_name("stl"), Method::Seasonal);
    assert_eq!(Method::from_name("rolling_z"), Method::RollingZ);
    assert_eq!(Method::from_name("prophet"), Method::Seasonal);
    assert_eq!(Method::from_name(""), Method::Seasonal);
}

#[test]
fn rank_spikes_orders_by_absolute_z() {
    let series = series_of(&[
        10.0, 10.0, 10.0, 10.0, 10.0, 60.0, 10.0, 10.0, 10.0, 10.0, 10.0, 200.0,
    ]);
    let frame = rolling_zscore(&series, &RollingParams::default());
    let ranked = rank_spikes(&frame, 3);

    assert!(!ranked.is_empty());
    assert_eq!(ranked[0].rank, 1);
    for pair in ranked.windows(2) {
        assert!(pair[0].z.abs() >= pair[1].z.abs());
        assert_eq!(pair[1].rank, pair[0].rank + 1);
    }
}

#[test]
fn rank_spikes_on_spikeless_frame_is_empty() {
    let series = series_of(&[7.0; 10]);
    let frame = rolling_zscore(&series, &RollingParams::default());
    assert!(rank_spikes(&frame, 3).is_empty());
}

#[test]
fn empty_series_detection_is_empty_everywhere() {
    let series = ensure_monthly_index(&[]);
    let detection = detect(&series, Method::Seasonal, &PipelineConfig::default());
    assert!(detection.frame.is_empty());
    assert!(!detection.fell_back);
}
