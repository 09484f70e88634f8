//! Loading and processing a single quarter.

use tracing::{error, info, warn};

use faers_ingest::reader::{ReadOptions, read_table};
use faers_ingest::{QuarterFolder, RawTable, resolve_table_files};
use faers_model::{Event, PipelineConfig, TableKind};

use crate::diagnostics::QuarterReport;
use crate::join::build_events;
use crate::normalize::{
    NormalizedTables, normalize_demo, normalize_drug, normalize_outc, normalize_reac,
};

/// Result of processing one quarter.
#[derive(Debug)]
pub struct QuarterOutcome {
    pub events: Vec<Event>,
    pub report: QuarterReport,
}

/// Load, normalize, and join one quarter.
///
/// Returns `Ok(None)` when the quarter has to be skipped (missing DEMO or
/// REAC). A table that fails to read is treated as absent and logged; it
/// never aborts the quarter, let alone the run.
pub fn load_quarter(
    quarter: &QuarterFolder,
    config: &PipelineConfig,
) -> faers_ingest::Result<Option<QuarterOutcome>> {
    info!(quarter = %quarter.name, "loading quarter");

    let files = resolve_table_files(quarter)?;
    let options = ReadOptions::from_config(config);

    let mut raw: Vec<(TableKind, RawTable)> = Vec::new();
    for kind in TableKind::ALL {
        let Some(path) = files.get(&kind).and_then(|p| p.as_ref()) else {
            if kind.is_mandatory() {
                warn!(quarter = %quarter.name, kind = %kind, "missing mandatory table file");
            }
            continue;
        };
        match read_table(path, kind, &options) {
            Ok(table) if table.is_empty() => {
                warn!(quarter = %quarter.name, kind = %kind, "table file contains no data rows");
            }
            Ok(table) => raw.push((kind, table)),
            Err(e) => {
                error!(
                    quarter = %quarter.name,
                    kind = %kind,
                    error = %e,
                    "failed to load table, continuing without it"
                );
            }
        }
    }

    let mut tables = NormalizedTables::default();
    for (kind, table) in &raw {
        match kind {
            TableKind::Demo => tables.demo = Some(normalize_demo(table)),
            TableKind::Reac => tables.reac = Some(normalize_reac(table)),
            TableKind::Drug => tables.drug = Some(normalize_drug(table)),
            TableKind::Outc => tables.outc = Some(normalize_outc(table)),
            // THER and INDI carry nothing the event record needs.
            TableKind::Ther | TableKind::Indi => {}
        }
    }

    if tables.reac.is_none() {
        warn!(quarter = %quarter.name, "missing REAC table, skipping quarter");
        return Ok(None);
    }
    if tables.demo.is_none() {
        warn!(quarter = %quarter.name, "missing DEMO table, skipping quarter");
        return Ok(None);
    }

    let (events, report) = build_events(&tables, &quarter.name, config);
    info!(quarter = %quarter.name, events = events.len(), "quarter complete");
    Ok(Some(QuarterOutcome { events, report }))
}
