//! Result types shared between the pipeline stages and the summary printer.

use std::path::{Path, PathBuf};

use faers_etl::build::DatasetStats;
use faers_etl::diagnostics::LossSeverity;

/// Paths of the persisted build artifacts.
#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub events_parquet: PathBuf,
    pub monthly_counts: PathBuf,
    pub monthly_by_reaction: PathBuf,
    pub monthly_by_drug: PathBuf,
}

impl OutputPaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            events_parquet: dir.join("faers_events.parquet"),
            monthly_counts: dir.join("monthly_counts.csv"),
            monthly_by_reaction: dir.join("monthly_by_reaction.csv"),
            monthly_by_drug: dir.join("monthly_by_drug.csv"),
        }
    }
}

/// One quarter's line in the build summary.
#[derive(Debug, Clone)]
pub struct QuarterRow {
    pub name: String,
    pub demo_rows: usize,
    pub events: usize,
    pub loss_percent: f64,
    pub severity: Option<LossSeverity>,
    pub skipped: bool,
}

/// Outcome of a full build run.
#[derive(Debug)]
pub struct BuildResult {
    pub quarters: Vec<QuarterRow>,
    pub stats: DatasetStats,
    pub cross_quarter_duplicates: usize,
    /// Artifact paths; `None` on a dry run or when nothing was produced.
    pub outputs: Option<OutputPaths>,
    /// Per-unit failures that were contained rather than fatal.
    pub errors: Vec<String>,
}

impl BuildResult {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}
