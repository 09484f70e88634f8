//! Persisting the consolidated event table.

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use polars::prelude::{Column, DataFrame, ParquetCompression, ParquetWriter, PolarsResult};
use tracing::info;

use faers_model::Event;

/// Convert events into the persisted column layout. Dates are ISO strings;
/// missing values are nulls.
pub fn events_to_dataframe(events: &[Event]) -> PolarsResult<DataFrame> {
    let event_date: Vec<Option<String>> = events
        .iter()
        .map(|e| e.event_date.map(|d| d.to_string()))
        .collect();
    let case_id: Vec<String> = events.iter().map(|e| e.case_id.clone()).collect();
    let drug: Vec<Option<String>> = events.iter().map(|e| e.drug.clone()).collect();
    let reaction_pt: Vec<String> = events.iter().map(|e| e.reaction_pt.clone()).collect();
    let sex: Vec<&str> = events.iter().map(|e| e.sex.as_str()).collect();
    let age: Vec<Option<f64>> = events.iter().map(|e| e.age).collect();
    let country: Vec<Option<String>> = events.iter().map(|e| e.country.clone()).collect();
    let serious: Vec<bool> = events.iter().map(|e| e.serious).collect();
    let quarter: Vec<String> = events.iter().map(|e| e.quarter.clone()).collect();

    DataFrame::new(vec![
        Column::new("event_date".into(), event_date),
        Column::new("case_id".into(), case_id),
        Column::new("drug".into(), drug),
        Column::new("reaction_pt".into(), reaction_pt),
        Column::new("sex".into(), sex),
        Column::new("age".into(), age),
        Column::new("country".into(), country),
        Column::new("serious".into(), serious),
        Column::new("quarter".into(), quarter),
    ])
}

/// Write the consolidated events as snappy-compressed Parquet.
pub fn write_events_parquet(path: &Path, events: &[Event]) -> Result<()> {
    let mut df = events_to_dataframe(events).context("build events dataframe")?;
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    ParquetWriter::new(file)
        .with_compression(ParquetCompression::Snappy)
        .finish(&mut df)
        .with_context(|| format!("write parquet {}", path.display()))?;
    info!(path = %path.display(), rows = events.len(), "saved consolidated events");
    Ok(())
}
