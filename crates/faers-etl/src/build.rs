//! Cross-quarter consolidation.

use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::info;

use faers_model::Event;

/// The concatenated, globally deduplicated event set.
#[derive(Debug)]
pub struct Consolidated {
    pub events: Vec<Event>,
    /// Exact duplicate tuples removed across quarter boundaries.
    pub cross_quarter_duplicates: usize,
}

/// Concatenate per-quarter event sets and drop duplicate
/// `(case_id, drug, reaction_pt, event_date)` tuples across quarters.
/// The first occurrence (earliest quarter) wins.
pub fn consolidate(per_quarter: Vec<Vec<Event>>) -> Consolidated {
    let total: usize = per_quarter.iter().map(Vec::len).sum();
    let mut seen: HashSet<(String, Option<String>, String, Option<NaiveDate>)> =
        HashSet::with_capacity(total);
    let mut events: Vec<Event> = Vec::with_capacity(total);

    for quarter_events in per_quarter {
        for event in quarter_events {
            let key = (
                event.case_id.clone(),
                event.drug.clone(),
                event.reaction_pt.clone(),
                event.event_date,
            );
            if seen.insert(key) {
                events.push(event);
            }
        }
    }

    let cross_quarter_duplicates = total - events.len();
    if cross_quarter_duplicates > 0 {
        info!(removed = cross_quarter_duplicates, "removed cross-quarter duplicates");
    }
    info!(events = events.len(), "consolidated event set ready");

    Consolidated {
        events,
        cross_quarter_duplicates,
    }
}

/// Sort chronologically; events without a date sort last.
pub fn sort_events_by_date(events: &mut [Event]) {
    events.sort_by(|a, b| match (a.event_date, b.event_date) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
}

/// Summary statistics over the consolidated set.
#[derive(Debug, Clone)]
pub struct DatasetStats {
    pub total_events: usize,
    pub date_min: Option<NaiveDate>,
    pub date_max: Option<NaiveDate>,
    pub unique_drugs: usize,
    pub unique_reactions: usize,
    pub serious_events: usize,
}

impl DatasetStats {
    pub fn compute(events: &[Event]) -> Self {
        let mut drugs: HashSet<&str> = HashSet::new();
        let mut reactions: HashSet<&str> = HashSet::new();
        let mut date_min = None;
        let mut date_max = None;
        let mut serious_events = 0usize;

        for event in events {
            if let Some(drug) = event.drug.as_deref() {
                drugs.insert(drug);
            }
            reactions.insert(event.reaction_pt.as_str());
            if let Some(date) = event.event_date {
                date_min = Some(match date_min {
                    Some(current) if current <= date => current,
                    _ => date,
                });
                date_max = Some(match date_max {
                    Some(current) if current >= date => current,
                    _ => date,
                });
            }
            if event.serious {
                serious_events += 1;
            }
        }

        Self {
            total_events: events.len(),
            date_min,
            date_max,
            unique_drugs: drugs.len(),
            unique_reactions: reactions.len(),
            serious_events,
        }
    }

    pub fn serious_percent(&self) -> f64 {
        if self.total_events == 0 {
            0.0
        } else {
            self.serious_events as f64 / self.total_events as f64 * 100.0
        }
    }
}
