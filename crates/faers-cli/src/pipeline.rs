//! Build pipeline with explicit stages.
//!
//! 1. **Discover**: locate quarterly folders under the raw-data root
//! 2. **ETL**: per quarter, read + normalize + join into events
//! 3. **Consolidate**: concatenate quarters, drop cross-quarter duplicates,
//!    sort chronologically
//! 4. **Aggregate**: overall / by-reaction / by-drug monthly counts
//! 5. **Write**: Parquet event table and headered CSV aggregates
//!
//! Each quarter is an independent unit of work: a quarter that fails to
//! load is recorded as an error string and the run continues.

use std::path::PathBuf;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use faers_analysis::aggregate::{
    monthly_by_drug, monthly_by_reaction, monthly_overall, write_group_csv, write_overall_csv,
};
use faers_etl::build::{DatasetStats, consolidate, sort_events_by_date};
use faers_etl::output::write_events_parquet;
use faers_etl::quarter::load_quarter;
use faers_ingest::discover_quarters;
use faers_model::{Event, PipelineConfig};

use crate::types::{BuildResult, OutputPaths, QuarterRow};

/// Options for one build run.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub raw_dir: PathBuf,
    pub out_dir: PathBuf,
    /// Process only the N most recent quarters.
    pub limit_quarters: Option<usize>,
    /// Validate and report without writing artifacts.
    pub dry_run: bool,
    /// Show a progress bar over quarters.
    pub progress: bool,
    pub config: PipelineConfig,
}

/// Run the full build pipeline.
///
/// Only an unusable raw-data root is fatal; everything else degrades to
/// "this quarter produced nothing" plus a recorded error.
pub fn run_build(options: &BuildOptions) -> Result<BuildResult> {
    let mut errors = Vec::new();

    // --- Stage 1: discover -------------------------------------------------
    let mut quarters = discover_quarters(&options.raw_dir)
        .with_context(|| format!("discover quarters in {}", options.raw_dir.display()))?;
    if quarters.is_empty() {
        warn!(raw_dir = %options.raw_dir.display(), "no quarterly folders found");
        errors.push("no quarterly folders found".to_string());
    }
    if let Some(limit) = options.limit_quarters
        && limit > 0
        && limit < quarters.len()
    {
        // Discovery order is chronological, so the tail is the most recent.
        quarters = quarters.split_off(quarters.len() - limit);
        info!(limit, "limited to most recent quarters");
    }

    // --- Stage 2: per-quarter ETL ------------------------------------------
    let bar = if options.progress && !quarters.is_empty() {
        let bar = ProgressBar::new(quarters.len() as u64);
        bar.set_style(
            ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Some(bar)
    } else {
        None
    };

    let mut rows: Vec<QuarterRow> = Vec::new();
    let mut per_quarter: Vec<Vec<Event>> = Vec::new();
    for quarter in &quarters {
        if let Some(bar) = &bar {
            bar.set_message(quarter.name.clone());
        }
        match load_quarter(quarter, &options.config) {
            Ok(Some(outcome)) => {
                rows.push(QuarterRow {
                    name: quarter.name.clone(),
                    demo_rows: outcome.report.initial_demo_rows,
                    events: outcome.report.final_events,
                    loss_percent: outcome.report.total_loss_percent,
                    severity: Some(outcome.report.total_severity),
                    skipped: false,
                });
                per_quarter.push(outcome.events);
            }
            Ok(None) => {
                rows.push(skipped_row(&quarter.name));
            }
            Err(error) => {
                warn!(quarter = %quarter.name, error = %error, "failed to process quarter");
                errors.push(format!("{}: {error}", quarter.name));
                rows.push(skipped_row(&quarter.name));
            }
        }
        if let Some(bar) = &bar {
            bar.inc(1);
        }
    }
    if let Some(bar) = &bar {
        bar.finish_and_clear();
    }

    // --- Stage 3: consolidate ----------------------------------------------
    let consolidated = consolidate(per_quarter);
    let mut events = consolidated.events;
    sort_events_by_date(&mut events);
    let stats = DatasetStats::compute(&events);

    // --- Stage 4: aggregate -------------------------------------------------
    let (overall, _) = monthly_overall(&events);
    let (by_reaction, _) = monthly_by_reaction(&events);
    let (by_drug, _) = monthly_by_drug(&events);

    // --- Stage 5: write -----------------------------------------------------
    let outputs = if options.dry_run {
        info!("dry run, skipping artifact writes");
        None
    } else if events.is_empty() {
        warn!("no events produced, skipping artifact writes");
        None
    } else {
        std::fs::create_dir_all(&options.out_dir)
            .with_context(|| format!("create {}", options.out_dir.display()))?;
        let paths = OutputPaths::in_dir(&options.out_dir);
        write_events_parquet(&paths.events_parquet, &events)?;
        write_overall_csv(&paths.monthly_counts, &overall)?;
        write_group_csv(&paths.monthly_by_reaction, &by_reaction, "reaction_pt")?;
        write_group_csv(&paths.monthly_by_drug, &by_drug, "drug")?;
        Some(paths)
    };

    Ok(BuildResult {
        quarters: rows,
        stats,
        cross_quarter_duplicates: consolidated.cross_quarter_duplicates,
        outputs,
        errors,
    })
}

fn skipped_row(name: &str) -> QuarterRow {
    QuarterRow {
        name: name.to_string(),
        demo_rows: 0,
        events: 0,
        loss_percent: 0.0,
        severity: None,
        skipped: true,
    }
}
