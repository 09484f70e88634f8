//! The per-quarter join engine.
//!
//! Builds one consolidated event set from the normalized tables:
//! DEMO×REAC inner join (mandatory), left joins to DRUG and to the per-case
//! max-severity OUTC (optional), null filtering, then exact tuple
//! deduplication. Key overlap is analyzed before every join and every step
//! emits a [`JoinDiagnostic`].

use std::collections::{HashMap, HashSet};

use tracing::{info, warn};

use faers_model::{Event, PipelineConfig, UNKNOWN_DRUG};

use crate::diagnostics::{
    JoinDiagnostic, KeyOverlap, LossSeverity, QuarterReport, analyze_key_overlap, loss_percent,
};
use crate::normalize::{DemoRecord, DrugRecord, NormalizedTables, OutcRecord, ReacRecord};

/// A row in flight between join steps: demographics index plus the fields
/// accumulated so far.
#[derive(Debug, Clone)]
struct WorkRow {
    demo_idx: usize,
    case_id: String,
    reaction_pt: Option<String>,
    drug: Option<String>,
    serious: bool,
}

/// Build the consolidated event set for one quarter.
///
/// `tables.demo` and `tables.reac` must be present; the caller gates on
/// that. DRUG and OUTC are optional enrichments.
pub fn build_events(
    tables: &NormalizedTables,
    quarter: &str,
    config: &PipelineConfig,
) -> (Vec<Event>, QuarterReport) {
    let demo: &[DemoRecord] = tables.demo.as_deref().unwrap_or(&[]);
    let reac: &[ReacRecord] = tables.reac.as_deref().unwrap_or(&[]);

    let initial_demo_rows = demo.len();
    let mut overlaps: Vec<KeyOverlap> = Vec::new();
    let mut joins: Vec<JoinDiagnostic> = Vec::new();

    info!(
        quarter,
        demo_rows = demo.len(),
        reac_rows = reac.len(),
        "building consolidated events"
    );

    // --- DEMO x REAC: mandatory inner join ---------------------------------
    overlaps.push(analyze_key_overlap(
        "DEMO",
        "REAC",
        demo.iter().map(|r| r.case_id.as_str()),
        reac.iter().map(|r| r.case_id.as_str()),
        config.key_overlap_warning_percent,
    ));

    let mut reac_index: HashMap<&str, Vec<&ReacRecord>> = HashMap::new();
    for record in reac {
        if record.case_id.is_empty() {
            continue;
        }
        reac_index.entry(record.case_id.as_str()).or_default().push(record);
    }

    let mut rows: Vec<WorkRow> = Vec::new();
    for (demo_idx, demo_row) in demo.iter().enumerate() {
        if demo_row.case_id.is_empty() {
            continue;
        }
        if let Some(matches) = reac_index.get(demo_row.case_id.as_str()) {
            for reac_row in matches {
                rows.push(WorkRow {
                    demo_idx,
                    case_id: demo_row.case_id.clone(),
                    reaction_pt: reac_row.reaction_pt.clone(),
                    drug: None,
                    serious: false,
                });
            }
        }
    }
    joins.push(JoinDiagnostic::inner(
        "DEMO with REAC",
        initial_demo_rows,
        rows.len(),
        &config.join_loss,
    ));

    // --- x DRUG: optional left join ----------------------------------------
    let drug_table: Option<&[DrugRecord]> = tables.drug.as_deref().filter(|t| !t.is_empty());
    match drug_table {
        Some(drugs) => {
            overlaps.push(analyze_key_overlap(
                "EVENTS",
                "DRUG",
                rows.iter().map(|r| r.case_id.as_str()),
                drugs.iter().map(|r| r.case_id.as_str()),
                config.key_overlap_warning_percent,
            ));

            let mut drug_index: HashMap<&str, Vec<&DrugRecord>> = HashMap::new();
            for record in drugs {
                if record.case_id.is_empty() {
                    continue;
                }
                drug_index.entry(record.case_id.as_str()).or_default().push(record);
            }

            let before = rows.len();
            let mut expanded: Vec<WorkRow> = Vec::with_capacity(rows.len());
            for row in rows {
                match drug_index.get(row.case_id.as_str()) {
                    Some(matches) => {
                        for drug_row in matches {
                            let mut next = row.clone();
                            next.drug = drug_row.drug.clone();
                            expanded.push(next);
                        }
                    }
                    None => expanded.push(row),
                }
            }
            rows = expanded;
            joins.push(JoinDiagnostic::left("EVENTS with DRUG", before, rows.len()));
        }
        None => {
            warn!(quarter, "no DRUG table available, setting drug to '{UNKNOWN_DRUG}'");
            for row in &mut rows {
                row.drug = Some(UNKNOWN_DRUG.to_string());
            }
        }
    }

    // --- x OUTC: optional left join against per-case max severity ----------
    let outc_table: Option<&[OutcRecord]> = tables.outc.as_deref().filter(|t| !t.is_empty());
    match outc_table {
        Some(outcomes) => {
            // Collapse duplicate outcome rows per case to the most serious.
            let mut serious_by_case: HashMap<&str, bool> = HashMap::new();
            for record in outcomes {
                if record.case_id.is_empty() {
                    continue;
                }
                let entry = serious_by_case.entry(record.case_id.as_str()).or_insert(false);
                *entry = *entry || record.serious;
            }

            overlaps.push(analyze_key_overlap(
                "EVENTS",
                "OUTC",
                rows.iter().map(|r| r.case_id.as_str()),
                serious_by_case.keys().copied(),
                config.key_overlap_warning_percent,
            ));

            let before = rows.len();
            for row in &mut rows {
                row.serious = serious_by_case
                    .get(row.case_id.as_str())
                    .copied()
                    .unwrap_or(false);
            }
            joins.push(JoinDiagnostic::left("EVENTS with OUTC", before, rows.len()));
        }
        None => {
            warn!(quarter, "no OUTC table available, seriousness defaults to false");
        }
    }

    // --- Null filtering ----------------------------------------------------
    let before_cleanup = rows.len();
    rows.retain(|row| !row.case_id.is_empty() && row.reaction_pt.is_some());
    let null_dropped = before_cleanup - rows.len();
    if null_dropped > 0 {
        info!(
            quarter,
            removed = null_dropped,
            percent = loss_percent(before_cleanup, rows.len()),
            "removed records with null case id or reaction"
        );
    }

    // --- Deduplication ------------------------------------------------------
    let before_dedup = rows.len();
    let mut seen: HashSet<(String, Option<String>, String, Option<chrono::NaiveDate>)> =
        HashSet::new();
    let mut events: Vec<Event> = Vec::with_capacity(rows.len());
    for row in rows {
        let demo_row = &demo[row.demo_idx];
        let reaction_pt = match row.reaction_pt {
            Some(reaction) => reaction,
            None => continue,
        };
        let key = (
            row.case_id.clone(),
            row.drug.clone(),
            reaction_pt.clone(),
            demo_row.event_date,
        );
        if !seen.insert(key) {
            continue;
        }
        events.push(Event {
            event_date: demo_row.event_date,
            case_id: row.case_id,
            drug: row.drug,
            reaction_pt,
            sex: demo_row.sex,
            age: demo_row.age,
            country: demo_row.country.clone(),
            serious: row.serious,
            quarter: quarter.to_string(),
        });
    }
    let duplicates_removed = before_dedup - events.len();
    if duplicates_removed > 0 {
        info!(quarter, removed = duplicates_removed, "removed duplicate records");
    }

    // --- Quarter-level summary ---------------------------------------------
    let total_loss = loss_percent(initial_demo_rows, events.len());
    let total_severity = LossSeverity::classify(total_loss, &config.total_loss);
    info!(
        quarter,
        starting_demo = initial_demo_rows,
        final_events = events.len(),
        total_loss_percent = total_loss,
        severity = total_severity.as_str(),
        "quarter pipeline summary"
    );
    match total_severity {
        LossSeverity::High => {
            warn!(quarter, total_loss_percent = total_loss, "HIGH overall data loss");
        }
        LossSeverity::Moderate => {
            warn!(quarter, total_loss_percent = total_loss, "moderate overall data loss");
        }
        _ => {}
    }

    let report = QuarterReport {
        quarter: quarter.to_string(),
        initial_demo_rows,
        final_events: events.len(),
        overlaps,
        joins,
        null_dropped,
        duplicates_removed,
        total_loss_percent: total_loss,
        total_severity,
    };
    (events, report)
}
