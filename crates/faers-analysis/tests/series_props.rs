//! Property tests for continuous-series construction.

use chrono::{Datelike, NaiveDate};
use proptest::collection::vec as prop_vec;
use proptest::prelude::{ProptestConfig, Strategy};
use proptest::proptest;

use faers_analysis::anomaly::rolling_zscore;
use faers_analysis::series::{ensure_monthly_index, next_month};
use faers_model::RollingParams;

fn arbitrary_points() -> impl Strategy<Value = Vec<(NaiveDate, f64)>> {
    prop_vec(
        (2015i32..2026, 1u32..13, 1u32..29, 0u64..1000).prop_map(|(y, m, d, v)| {
            (
                NaiveDate::from_ymd_opt(y, m, d).expect("valid date"),
                v as f64,
            )
        }),
        0..60,
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn monthly_index_has_no_gaps(points in arbitrary_points()) {
        let series = ensure_monthly_index(&points);
        for pair in series.months().windows(2) {
            assert_eq!(next_month(pair[0]), Some(pair[1]));
        }
    }

    #[test]
    fn monthly_index_preserves_total(points in arbitrary_points()) {
        let series = ensure_monthly_index(&points);
        let input_total: f64 = points.iter().map(|(_, v)| v).sum();
        let series_total: f64 = series.values().iter().sum();
        assert!((input_total - series_total).abs() < 1e-6);
    }

    #[test]
    fn filled_months_are_zero(points in arbitrary_points()) {
        use std::collections::BTreeSet;
        let observed: BTreeSet<NaiveDate> = points
            .iter()
            .filter_map(|(d, _)| NaiveDate::from_ymd_opt(d.year(), d.month(), 1))
            .collect();
        let series = ensure_monthly_index(&points);
        let filled_total: f64 = series
            .iter()
            .filter(|(month, _)| !observed.contains(month))
            .map(|(_, value)| value)
            .sum();
        assert_eq!(filled_total, 0.0);
    }

    #[test]
    fn constant_series_never_spikes(value in 0u64..500, len in 6usize..40) {
        let points: Vec<(NaiveDate, f64)> = (0..len)
            .filter_map(|i| {
                let year = 2020 + (i / 12) as i32;
                let month = (i % 12) as u32 + 1;
                NaiveDate::from_ymd_opt(year, month, 1).map(|d| (d, value as f64))
            })
            .collect();
        let series = ensure_monthly_index(&points);
        let frame = rolling_zscore(&series, &RollingParams::default());
        assert_eq!(frame.spike_count(), 0);
        assert!(frame.z.iter().all(|z| *z == 0.0));
    }
}
