//! Spike detection over monthly series.
//!
//! Two interchangeable detectors share one output shape: a trailing rolling
//! Z-score, and a seasonal decomposition scored on its residuals. The
//! unified [`detect`] entry point falls back from seasonal to rolling when
//! the series is too short, so callers always get a best-effort result.
//!
//! Statistics use the sample standard deviation (ddof 1); a window or
//! residual set with no variation produces z = 0, never a division artifact.

use chrono::NaiveDate;
use tracing::debug;

use faers_model::{PipelineConfig, RollingParams, SeasonalParams};

use crate::series::MonthlySeries;

/// Detection method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    RollingZ,
    Seasonal,
}

impl Method {
    /// Resolve a method name. `stl` is accepted as an alias for the seasonal
    /// detector; unknown names default to seasonal.
    pub fn from_name(name: &str) -> Method {
        match name.trim().to_lowercase().as_str() {
            "rolling_z" | "rolling-z" | "rolling" => Method::RollingZ,
            "seasonal" | "stl" => Method::Seasonal,
            _ => Method::Seasonal,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Method::RollingZ => "rolling_z",
            Method::Seasonal => "seasonal",
        }
    }
}

/// Rolling mean and standard deviation per month.
#[derive(Debug, Clone, Default)]
pub struct RollingBands {
    pub mean: Vec<f64>,
    pub std: Vec<f64>,
}

/// Additive decomposition components. Trend and residual are undefined at
/// the series edges where the centered average has no full window.
#[derive(Debug, Clone, Default)]
pub struct Decomposition {
    pub trend: Vec<Option<f64>>,
    pub seasonal: Vec<f64>,
    pub resid: Vec<Option<f64>>,
}

/// Baseline components, by detector.
#[derive(Debug, Clone)]
pub enum Baseline {
    Rolling(RollingBands),
    Seasonal(Decomposition),
}

/// Per-month detection result.
#[derive(Debug, Clone)]
pub struct AnomalyFrame {
    pub months: Vec<NaiveDate>,
    pub values: Vec<f64>,
    pub baseline: Baseline,
    pub z: Vec<f64>,
    pub spikes: Vec<bool>,
}

impl AnomalyFrame {
    fn empty_rolling() -> Self {
        Self {
            months: Vec::new(),
            values: Vec::new(),
            baseline: Baseline::Rolling(RollingBands::default()),
            z: Vec::new(),
            spikes: Vec::new(),
        }
    }

    fn empty_seasonal() -> Self {
        Self {
            months: Vec::new(),
            values: Vec::new(),
            baseline: Baseline::Seasonal(Decomposition::default()),
            z: Vec::new(),
            spikes: Vec::new(),
        }
    }

    /// An explicitly empty result, as returned when a detector's data
    /// requirements are unmet.
    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    pub fn spike_count(&self) -> usize {
        self.spikes.iter().filter(|s| **s).count()
    }

    /// Months flagged as spikes, in series order.
    pub fn spike_months(&self) -> Vec<NaiveDate> {
        self.months
            .iter()
            .zip(&self.spikes)
            .filter(|(_, spike)| **spike)
            .map(|(month, _)| *month)
            .collect()
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Sample standard deviation (ddof 1). Undefined for fewer than two values.
fn sample_std(values: &[f64], mean: f64) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let sum_sq: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
    Some((sum_sq / (values.len() - 1) as f64).sqrt())
}

/// Trailing rolling Z-score detection.
///
/// The window at index `i` covers the most recent `window` observations up
/// to and including `i`, shrinking at the start of the series (minimum one
/// observation). Requires `len >= window`, otherwise the result is
/// explicitly empty.
pub fn rolling_zscore(series: &MonthlySeries, params: &RollingParams) -> AnomalyFrame {
    if series.is_empty() || series.len() < params.window || params.window == 0 {
        return AnomalyFrame::empty_rolling();
    }

    let values = series.values();
    let n = values.len();
    let mut means = Vec::with_capacity(n);
    let mut stds = Vec::with_capacity(n);
    let mut z = Vec::with_capacity(n);
    let mut spikes = Vec::with_capacity(n);

    for i in 0..n {
        let start = (i + 1).saturating_sub(params.window);
        let window = &values[start..=i];
        let window_mean = mean(window);
        let window_std = sample_std(window, window_mean);

        let score = match window_std {
            Some(std) if std > 0.0 => (values[i] - window_mean) / std,
            _ => 0.0,
        };

        means.push(window_mean);
        stds.push(window_std.unwrap_or(0.0));
        spikes.push(score.abs() > params.threshold);
        z.push(score);
    }

    AnomalyFrame {
        months: series.months().to_vec(),
        values: values.to_vec(),
        baseline: Baseline::Rolling(RollingBands { mean: means, std: stds }),
        z,
        spikes,
    }
}

/// Seasonal-decomposition detection.
///
/// Requires at least `2 * period` observations; shorter series yield an
/// explicitly empty result. Any internal decomposition failure also
/// degrades to empty rather than propagating.
pub fn seasonal_spikes(series: &MonthlySeries, params: &SeasonalParams) -> AnomalyFrame {
    if params.period == 0 || series.is_empty() || series.len() < 2 * params.period {
        return AnomalyFrame::empty_seasonal();
    }

    let Some(decomposition) = decompose(series.values(), params.period) else {
        debug!("seasonal decomposition failed, returning empty result");
        return AnomalyFrame::empty_seasonal();
    };

    let observed: Vec<f64> = decomposition.resid.iter().flatten().copied().collect();
    let resid_mean = mean(&observed);
    let resid_std = sample_std(&observed, resid_mean);

    let n = series.len();
    let mut z = Vec::with_capacity(n);
    let mut spikes = Vec::with_capacity(n);
    for i in 0..n {
        let score = match (decomposition.resid[i], resid_std) {
            (Some(resid), Some(std)) if std > 0.0 => (resid - resid_mean) / std,
            _ => 0.0,
        };
        spikes.push(score.abs() > params.threshold);
        z.push(score);
    }

    AnomalyFrame {
        months: series.months().to_vec(),
        values: series.values().to_vec(),
        baseline: Baseline::Seasonal(decomposition),
        z,
        spikes,
    }
}

/// Classical additive decomposition: centered moving-average trend,
/// per-position seasonal means recentred to zero, residual remainder.
fn decompose(values: &[f64], period: usize) -> Option<Decomposition> {
    let n = values.len();
    let half = period / 2;
    if n < period + 1 {
        return None;
    }

    let mut trend: Vec<Option<f64>> = vec![None; n];
    if period % 2 == 0 {
        // Even period: 2x(period) average with half weights at both ends.
        for (i, slot) in trend.iter_mut().enumerate().take(n - half).skip(half) {
            let mut acc = 0.5 * values[i - half] + 0.5 * values[i + half];
            for value in &values[i - half + 1..i + half] {
                acc += value;
            }
            *slot = Some(acc / period as f64);
        }
    } else {
        for (i, slot) in trend.iter_mut().enumerate().take(n - half).skip(half) {
            let acc: f64 = values[i - half..=i + half].iter().sum();
            *slot = Some(acc / period as f64);
        }
    }

    // Seasonal effect: mean detrended value per position in the period.
    let mut sums = vec![0.0; period];
    let mut counts = vec![0usize; period];
    for (i, maybe_trend) in trend.iter().enumerate() {
        if let Some(t) = maybe_trend {
            sums[i % period] += values[i] - t;
            counts[i % period] += 1;
        }
    }
    if counts.iter().any(|&c| c == 0) {
        return None;
    }
    let mut seasonal_means: Vec<f64> = sums
        .iter()
        .zip(&counts)
        .map(|(sum, count)| sum / *count as f64)
        .collect();
    let seasonal_center = mean(&seasonal_means);
    for value in &mut seasonal_means {
        *value -= seasonal_center;
    }

    let seasonal: Vec<f64> = (0..n).map(|i| seasonal_means[i % period]).collect();
    let resid: Vec<Option<f64>> = (0..n)
        .map(|i| trend[i].map(|t| values[i] - t - seasonal[i]))
        .collect();

    Some(Decomposition {
        trend,
        seasonal,
        resid,
    })
}

/// Outcome of a [`detect`] call.
#[derive(Debug)]
pub struct Detection {
    pub frame: AnomalyFrame,
    pub requested: Method,
    pub used: Method,
    /// True when the requested method could not run and the rolling
    /// Z-score stood in.
    pub fell_back: bool,
}

/// Unified detection entry point with automatic fallback.
///
/// A seasonal request on a series too short for decomposition (or any
/// internal decomposition failure) transparently falls back to the rolling
/// Z-score so the caller still receives a usable result.
pub fn detect(series: &MonthlySeries, method: Method, config: &PipelineConfig) -> Detection {
    match method {
        Method::RollingZ => Detection {
            frame: rolling_zscore(series, &config.rolling),
            requested: Method::RollingZ,
            used: Method::RollingZ,
            fell_back: false,
        },
        Method::Seasonal => {
            let frame = seasonal_spikes(series, &config.seasonal);
            if frame.is_empty() && !series.is_empty() {
                debug!(
                    n_months = series.len(),
                    "seasonal detector unavailable, falling back to rolling z-score"
                );
                return Detection {
                    frame: rolling_zscore(series, &config.rolling),
                    requested: Method::Seasonal,
                    used: Method::RollingZ,
                    fell_back: true,
                };
            }
            Detection {
                frame,
                requested: Method::Seasonal,
                used: Method::Seasonal,
                fell_back: false,
            }
        }
    }
}

/// A ranked spike row.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedSpike {
    /// 1-based rank by descending |z|.
    pub rank: usize,
    pub month: NaiveDate,
    pub value: f64,
    pub z: f64,
}

/// Top-k spikes by descending absolute Z-score. Empty or spike-less input
/// yields an empty ranking.
pub fn rank_spikes(frame: &AnomalyFrame, k: usize) -> Vec<RankedSpike> {
    let mut flagged: Vec<(NaiveDate, f64, f64)> = frame
        .months
        .iter()
        .zip(&frame.values)
        .zip(&frame.z)
        .zip(&frame.spikes)
        .filter(|(_, spike)| **spike)
        .map(|(((month, value), z), _)| (*month, *value, *z))
        .collect();

    flagged.sort_by(|a, b| {
        b.2.abs()
            .total_cmp(&a.2.abs())
            .then_with(|| a.0.cmp(&b.0))
    });

    flagged
        .into_iter()
        .take(k)
        .enumerate()
        .map(|(idx, (month, value, z))| RankedSpike {
            rank: idx + 1,
            month,
            value,
            z,
        })
        .collect()
}
