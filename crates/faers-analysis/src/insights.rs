//! Insight summaries: load a series, detect, rank, and explain.
//!
//! These are the records the dashboard layer consumes directly. They are
//! always best-effort: a load failure or an empty slice becomes a summary
//! with an explanatory note, never an error.

use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use faers_model::PipelineConfig;

use crate::anomaly::{Method, detect, rank_spikes};
use crate::series::{MonthlySeries, ensure_monthly_index};

/// One ranked spike, dashboard-ready.
#[derive(Debug, Clone, Serialize)]
pub struct SpikeEntry {
    pub rank: usize,
    /// ISO month-start date.
    pub date: String,
    pub value: f64,
    pub z: f64,
}

/// Summary of the top spikes for one scope.
#[derive(Debug, Clone, Serialize)]
pub struct SpikeSummary {
    /// The requested method name.
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reaction: Option<String>,
    pub n_months: usize,
    pub top_spikes: Vec<SpikeEntry>,
    pub note: String,
}

impl SpikeSummary {
    fn noted(method: &str, drug: Option<String>, reaction: Option<String>, note: String) -> Self {
        Self {
            method: method.to_string(),
            drug,
            reaction,
            n_months: 0,
            top_spikes: Vec::new(),
            note,
        }
    }
}

/// Load `(ym, count)` pairs from an overall aggregate CSV.
pub fn load_monthly_counts(path: &Path) -> anyhow::Result<Vec<(NaiveDate, f64)>> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    let ym_idx = column_index(&headers, "ym")?;
    let count_idx = column_index(&headers, "count")?;

    let mut points = Vec::new();
    for record in reader.records() {
        let record = record?;
        if let Some(point) = parse_point(record.get(ym_idx), record.get(count_idx)) {
            points.push(point);
        }
    }
    Ok(points)
}

/// Load `(ym, count)` pairs for one key value from a grouped aggregate CSV.
pub fn load_group_counts(
    path: &Path,
    key_column: &str,
    key: &str,
) -> anyhow::Result<Vec<(NaiveDate, f64)>> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    let ym_idx = column_index(&headers, "ym")?;
    let key_idx = column_index(&headers, key_column)?;
    let count_idx = column_index(&headers, "count")?;

    let mut points = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.get(key_idx) != Some(key) {
            continue;
        }
        if let Some(point) = parse_point(record.get(ym_idx), record.get(count_idx)) {
            points.push(point);
        }
    }
    Ok(points)
}

fn column_index(headers: &csv::StringRecord, name: &str) -> anyhow::Result<usize> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| anyhow::anyhow!("column '{name}' not found"))
}

fn parse_point(ym: Option<&str>, count: Option<&str>) -> Option<(NaiveDate, f64)> {
    let date = NaiveDate::parse_from_str(ym?.trim(), "%Y-%m-%d").ok()?;
    let value = count?.trim().parse::<f64>().ok()?;
    Some((date, value))
}

/// Summarize top spikes in the overall series.
pub fn summarize_overall(
    path: &Path,
    method_name: &str,
    k: usize,
    config: &PipelineConfig,
) -> SpikeSummary {
    match load_monthly_counts(path) {
        Ok(points) => summarize_points(&points, method_name, k, config, None, None),
        Err(error) => SpikeSummary::noted(
            method_name,
            None,
            None,
            format!("error loading data: {error}"),
        ),
    }
}

/// Summarize top spikes for one drug.
pub fn summarize_drug(
    path: &Path,
    drug: &str,
    method_name: &str,
    k: usize,
    config: &PipelineConfig,
) -> SpikeSummary {
    if drug.trim().is_empty() {
        return SpikeSummary::noted(method_name, None, None, "no drug specified".to_string());
    }
    match load_group_counts(path, "drug", drug) {
        Ok(points) if points.is_empty() => SpikeSummary::noted(
            method_name,
            Some(drug.to_string()),
            None,
            format!("no data found for drug: {drug}"),
        ),
        Ok(points) => summarize_points(
            &points,
            method_name,
            k,
            config,
            Some(drug.to_string()),
            None,
        ),
        Err(error) => SpikeSummary::noted(
            method_name,
            Some(drug.to_string()),
            None,
            format!("error loading data: {error}"),
        ),
    }
}

/// Summarize top spikes for one reaction term.
pub fn summarize_reaction(
    path: &Path,
    reaction: &str,
    method_name: &str,
    k: usize,
    config: &PipelineConfig,
) -> SpikeSummary {
    if reaction.trim().is_empty() {
        return SpikeSummary::noted(method_name, None, None, "no reaction specified".to_string());
    }
    match load_group_counts(path, "reaction_pt", reaction) {
        Ok(points) if points.is_empty() => SpikeSummary::noted(
            method_name,
            None,
            Some(reaction.to_string()),
            format!("no data found for reaction: {reaction}"),
        ),
        Ok(points) => summarize_points(
            &points,
            method_name,
            k,
            config,
            None,
            Some(reaction.to_string()),
        ),
        Err(error) => SpikeSummary::noted(
            method_name,
            None,
            Some(reaction.to_string()),
            format!("error loading data: {error}"),
        ),
    }
}

fn summarize_points(
    points: &[(NaiveDate, f64)],
    method_name: &str,
    k: usize,
    config: &PipelineConfig,
    drug: Option<String>,
    reaction: Option<String>,
) -> SpikeSummary {
    let series = ensure_monthly_index(points);
    if series.len() < 2 {
        return SpikeSummary::noted(
            method_name,
            drug,
            reaction,
            "insufficient data available".to_string(),
        );
    }

    let method = Method::from_name(method_name);
    let detection = detect(&series, method, config);
    let ranked = rank_spikes(&detection.frame, k);

    let note = if detection.fell_back {
        format!(
            "fell back to rolling Z-score (insufficient data for {} method)",
            detection.requested.as_str()
        )
    } else if detection.frame.is_empty() {
        format!("no result from {} method", detection.used.as_str())
    } else if ranked.is_empty() {
        format!("no anomalies detected using {} method", detection.used.as_str())
    } else {
        format!("anomaly detection using {} method", detection.used.as_str())
    };
    debug!(n_months = series.len(), spikes = ranked.len(), note = %note, "insight summary");

    SpikeSummary {
        method: method_name.to_string(),
        drug,
        reaction,
        n_months: series.len(),
        top_spikes: ranked
            .into_iter()
            .map(|spike| SpikeEntry {
                rank: spike.rank,
                date: spike.month.to_string(),
                value: spike.value,
                z: spike.z,
            })
            .collect(),
        note,
    }
}

/// ISO month strings flagged as spikes for one series, for plot overlays.
pub fn spike_months(series: &MonthlySeries, method_name: &str, config: &PipelineConfig) -> Vec<String> {
    if series.len() < 2 {
        return Vec::new();
    }
    let detection = detect(series, Method::from_name(method_name), config);
    detection
        .frame
        .spike_months()
        .into_iter()
        .map(|month| month.to_string())
        .collect()
}
