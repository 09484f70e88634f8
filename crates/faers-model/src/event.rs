//! The canonical adverse-event record.

use chrono::NaiveDate;

use crate::enums::Sex;

/// Sentinel drug value used when a quarter ships no DRUG table at all.
pub const UNKNOWN_DRUG: &str = "UNKNOWN";

/// Column order of the persisted consolidated event table.
pub const EVENT_COLUMNS: [&str; 9] = [
    "event_date",
    "case_id",
    "drug",
    "reaction_pt",
    "sex",
    "age",
    "country",
    "serious",
    "quarter",
];

/// One consolidated adverse event: a (case, drug, reaction, date) tuple
/// plus demographic and seriousness attributes.
///
/// Invariants maintained by the join engine:
/// - `case_id` and `reaction_pt` are non-empty;
/// - `(case_id, drug, reaction_pt, event_date)` is unique within a quarter
///   and across the concatenated dataset;
/// - `drug` is `Some(UNKNOWN_DRUG)` for every row of a quarter whose DRUG
///   table is absent, and `None` only for cases the DRUG table did not cover.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub event_date: Option<NaiveDate>,
    pub case_id: String,
    pub drug: Option<String>,
    pub reaction_pt: String,
    pub sex: Sex,
    pub age: Option<f64>,
    pub country: Option<String>,
    pub serious: bool,
    /// Source quarter folder name, for traceability. Not part of the
    /// deduplication key.
    pub quarter: String,
}

impl Event {
    /// The deduplication key tuple.
    pub fn dedup_key(&self) -> (&str, Option<&str>, &str, Option<NaiveDate>) {
        (
            self.case_id.as_str(),
            self.drug.as_deref(),
            self.reaction_pt.as_str(),
            self.event_date,
        )
    }
}
