//! Join diagnostics: key overlap, row loss, and severity classification.
//!
//! Silently broken join keys are the failure mode this pipeline actually
//! meets in production data (two tables resolving different key columns
//! match on nothing and the run "succeeds" with an empty result). Overlap
//! and loss statistics are therefore a first-class observable of every join
//! step, not optional logging: they are collected into the quarter report
//! for assertion and mirrored to the log.

use std::collections::HashSet;

use tracing::{info, warn};

use faers_model::LossThresholds;

/// How a join treats unmatched left rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
}

/// Row-loss severity for an inner join or for a whole quarter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LossSeverity {
    High,
    Moderate,
    Minor,
    Perfect,
}

impl LossSeverity {
    /// Classify a loss percentage against the given thresholds.
    pub fn classify(loss_percent: f64, thresholds: &LossThresholds) -> LossSeverity {
        if loss_percent > thresholds.high_percent {
            LossSeverity::High
        } else if loss_percent > thresholds.moderate_percent {
            LossSeverity::Moderate
        } else if loss_percent > 0.0 {
            LossSeverity::Minor
        } else {
            LossSeverity::Perfect
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LossSeverity::High => "HIGH",
            LossSeverity::Moderate => "MODERATE",
            LossSeverity::Minor => "MINOR",
            LossSeverity::Perfect => "PERFECT",
        }
    }
}

/// Audit record emitted by every join step.
#[derive(Debug, Clone)]
pub struct JoinDiagnostic {
    /// Step label, e.g. `"DEMO with REAC"`.
    pub label: String,
    pub kind: JoinKind,
    pub before: usize,
    pub after: usize,
    pub loss_percent: f64,
    /// Loss classification; only meaningful for inner joins.
    pub severity: Option<LossSeverity>,
}

/// Loss percentage relative to the before count; 0 when before is 0.
pub fn loss_percent(before: usize, after: usize) -> f64 {
    if before == 0 {
        0.0
    } else {
        let lost = before.saturating_sub(after);
        lost as f64 / before as f64 * 100.0
    }
}

impl JoinDiagnostic {
    /// Record an inner join, classifying and logging its row loss.
    pub fn inner(label: &str, before: usize, after: usize, thresholds: &LossThresholds) -> Self {
        let lost = before.saturating_sub(after);
        let loss = loss_percent(before, after);
        let severity = LossSeverity::classify(loss, thresholds);

        info!(join = label, before, after, lost, loss_percent = loss, "inner join");
        match severity {
            LossSeverity::High => warn!(
                join = label,
                loss_percent = loss,
                "HIGH data loss: rows dropped due to missing keys"
            ),
            LossSeverity::Moderate => {
                warn!(join = label, loss_percent = loss, "moderate data loss");
            }
            LossSeverity::Minor => info!(join = label, loss_percent = loss, "minor data loss"),
            LossSeverity::Perfect => info!(join = label, "perfect key match, no rows lost"),
        }

        Self {
            label: label.to_string(),
            kind: JoinKind::Inner,
            before,
            after,
            loss_percent: loss,
            severity: Some(severity),
        }
    }

    /// Record a left join. Left joins may grow through one-to-many matches
    /// but must never shrink; a shrink is logged as an anomaly.
    pub fn left(label: &str, before: usize, after: usize) -> Self {
        if after > before {
            info!(
                join = label,
                added = after - before,
                "left join added rows (one-to-many relationship)"
            );
        } else if after < before {
            warn!(
                join = label,
                lost = before - after,
                "unexpected row loss in left join"
            );
        } else {
            info!(join = label, rows = after, "left join preserved row count");
        }

        Self {
            label: label.to_string(),
            kind: JoinKind::Left,
            before,
            after,
            loss_percent: loss_percent(before, after),
            severity: None,
        }
    }

    pub fn lost(&self) -> usize {
        self.before.saturating_sub(self.after)
    }
}

/// Pre-join overlap between the deduplicated non-null key sets of two tables.
#[derive(Debug, Clone)]
pub struct KeyOverlap {
    pub left_name: String,
    pub right_name: String,
    pub left_unique: usize,
    pub right_unique: usize,
    pub overlap: usize,
    pub left_only: usize,
    pub right_only: usize,
    /// Overlap relative to the left side's key count.
    pub overlap_percent: f64,
    /// Set when the overlap fell under the configured warning threshold.
    pub low_overlap: bool,
}

/// Compute and log key overlap between two key iterators. Empty keys are
/// treated as null and excluded from both sets.
pub fn analyze_key_overlap<'a>(
    left_name: &str,
    right_name: &str,
    left_keys: impl Iterator<Item = &'a str>,
    right_keys: impl Iterator<Item = &'a str>,
    warning_threshold_percent: f64,
) -> KeyOverlap {
    let left: HashSet<&str> = left_keys.filter(|key| !key.is_empty()).collect();
    let right: HashSet<&str> = right_keys.filter(|key| !key.is_empty()).collect();

    let overlap = left.intersection(&right).count();
    let left_only = left.len() - overlap;
    let right_only = right.len() - overlap;
    let overlap_percent = if left.is_empty() {
        0.0
    } else {
        overlap as f64 / left.len() as f64 * 100.0
    };
    let low_overlap = overlap_percent < warning_threshold_percent;

    info!(
        left = left_name,
        right = right_name,
        left_unique = left.len(),
        right_unique = right.len(),
        overlap,
        left_only,
        right_only,
        overlap_percent,
        "key overlap analysis"
    );
    if low_overlap {
        warn!(
            left = left_name,
            right = right_name,
            overlap_percent,
            "low key overlap between tables"
        );
    }

    KeyOverlap {
        left_name: left_name.to_string(),
        right_name: right_name.to_string(),
        left_unique: left.len(),
        right_unique: right.len(),
        overlap,
        left_only,
        right_only,
        overlap_percent,
        low_overlap,
    }
}

/// Everything observable about one quarter's event construction.
#[derive(Debug, Clone)]
pub struct QuarterReport {
    /// Quarter folder name.
    pub quarter: String,
    /// DEMO row count the quarter started from.
    pub initial_demo_rows: usize,
    /// Final deduplicated event count.
    pub final_events: usize,
    pub overlaps: Vec<KeyOverlap>,
    pub joins: Vec<JoinDiagnostic>,
    /// Rows dropped for null case id or reaction.
    pub null_dropped: usize,
    /// Exact duplicate tuples removed.
    pub duplicates_removed: usize,
    /// Loss from initial DEMO rows to final events.
    pub total_loss_percent: f64,
    pub total_severity: LossSeverity,
}
