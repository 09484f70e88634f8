//! Monthly aggregation of the consolidated event table.
//!
//! Three group-by-count tables: overall, by reaction, by drug. Events with
//! no parseable date (or, for the grouped variants, no group key) are
//! excluded from that aggregation and counted. Bucketing is by the first
//! calendar day of the event month.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use polars::prelude::{Column, CsvWriter, DataFrame, PolarsResult, SerWriter};
use tracing::info;

use faers_model::Event;

use crate::series::month_start;

/// One month's overall count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyCount {
    pub month: NaiveDate,
    pub count: u64,
}

/// One (month, group key) count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyGroupCount {
    pub month: NaiveDate,
    pub key: String,
    pub count: u64,
}

/// Overall monthly counts, sorted by month. Returns the rows and the number
/// of events excluded for missing dates.
pub fn monthly_overall(events: &[Event]) -> (Vec<MonthlyCount>, usize) {
    let mut by_month: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    let mut excluded = 0usize;
    for event in events {
        match event.event_date {
            Some(date) => *by_month.entry(month_start(date)).or_insert(0) += 1,
            None => excluded += 1,
        }
    }
    let rows: Vec<MonthlyCount> = by_month
        .into_iter()
        .map(|(month, count)| MonthlyCount { month, count })
        .collect();
    log_exclusions("overall", excluded);
    info!(
        months = rows.len(),
        total = rows.iter().map(|r| r.count).sum::<u64>(),
        "created monthly overall aggregation"
    );
    (rows, excluded)
}

/// Monthly counts by reaction term.
pub fn monthly_by_reaction(events: &[Event]) -> (Vec<MonthlyGroupCount>, usize) {
    let (rows, excluded) = monthly_by_key(events, |event| Some(event.reaction_pt.as_str()));
    log_exclusions("by-reaction", excluded);
    info!(records = rows.len(), "created monthly by-reaction aggregation");
    (rows, excluded)
}

/// Monthly counts by drug. Events whose drug is missing (unmatched left
/// join) are excluded here, not failed.
pub fn monthly_by_drug(events: &[Event]) -> (Vec<MonthlyGroupCount>, usize) {
    let (rows, excluded) = monthly_by_key(events, |event| event.drug.as_deref());
    log_exclusions("by-drug", excluded);
    info!(records = rows.len(), "created monthly by-drug aggregation");
    (rows, excluded)
}

fn monthly_by_key<'a>(
    events: &'a [Event],
    key: impl Fn(&'a Event) -> Option<&'a str>,
) -> (Vec<MonthlyGroupCount>, usize) {
    let mut by_group: BTreeMap<(NaiveDate, &str), u64> = BTreeMap::new();
    let mut excluded = 0usize;
    for event in events {
        match (event.event_date, key(event)) {
            (Some(date), Some(group)) => {
                *by_group.entry((month_start(date), group)).or_insert(0) += 1;
            }
            _ => excluded += 1,
        }
    }

    let mut rows: Vec<MonthlyGroupCount> = by_group
        .into_iter()
        .map(|((month, group), count)| MonthlyGroupCount {
            month,
            key: group.to_string(),
            count,
        })
        .collect();
    // Month ascending, then count descending, then key for determinism.
    rows.sort_by(|a, b| {
        a.month
            .cmp(&b.month)
            .then_with(|| b.count.cmp(&a.count))
            .then_with(|| a.key.cmp(&b.key))
    });
    (rows, excluded)
}

fn log_exclusions(label: &str, excluded: usize) {
    if excluded > 0 {
        info!(
            aggregation = label,
            excluded, "excluded rows with missing date or group key"
        );
    }
}

/// Top-N group keys by total count across all months.
pub fn top_items(rows: &[MonthlyGroupCount], top_n: usize) -> Vec<String> {
    let mut totals: BTreeMap<&str, u64> = BTreeMap::new();
    for row in rows {
        *totals.entry(row.key.as_str()).or_insert(0) += row.count;
    }
    let mut ranked: Vec<(&str, u64)> = totals.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked
        .into_iter()
        .take(top_n)
        .map(|(key, _)| key.to_string())
        .collect()
}

/// `ym,count` frame; months as ISO date strings.
pub fn overall_to_dataframe(rows: &[MonthlyCount]) -> PolarsResult<DataFrame> {
    let ym: Vec<String> = rows.iter().map(|r| r.month.to_string()).collect();
    let count: Vec<u64> = rows.iter().map(|r| r.count).collect();
    DataFrame::new(vec![
        Column::new("ym".into(), ym),
        Column::new("count".into(), count),
    ])
}

/// `ym,<key>,count` frame for the grouped aggregates.
pub fn group_to_dataframe(rows: &[MonthlyGroupCount], key_name: &str) -> PolarsResult<DataFrame> {
    let ym: Vec<String> = rows.iter().map(|r| r.month.to_string()).collect();
    let key: Vec<String> = rows.iter().map(|r| r.key.clone()).collect();
    let count: Vec<u64> = rows.iter().map(|r| r.count).collect();
    DataFrame::new(vec![
        Column::new("ym".into(), ym),
        Column::new(key_name.into(), key),
        Column::new("count".into(), count),
    ])
}

/// Write the overall aggregate as headered CSV.
pub fn write_overall_csv(path: &Path, rows: &[MonthlyCount]) -> Result<()> {
    let mut df = overall_to_dataframe(rows).context("build overall aggregate frame")?;
    write_csv(path, &mut df)
}

/// Write a grouped aggregate as headered CSV.
pub fn write_group_csv(path: &Path, rows: &[MonthlyGroupCount], key_name: &str) -> Result<()> {
    let mut df = group_to_dataframe(rows, key_name).context("build grouped aggregate frame")?;
    write_csv(path, &mut df)
}

fn write_csv(path: &Path, df: &mut DataFrame) -> Result<()> {
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    CsvWriter::new(file)
        .include_header(true)
        .finish(df)
        .with_context(|| format!("write csv {}", path.display()))?;
    info!(path = %path.display(), rows = df.height(), "saved aggregate table");
    Ok(())
}
