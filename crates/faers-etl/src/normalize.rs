//! Schema normalization: canonical fields out of era-specific columns.
//!
//! Each canonical field resolves to the first alias (exact, case-sensitive)
//! present in the raw table. A field with no matching alias yields
//! all-missing values rather than an error; the join engine decides what a
//! missing key means.

use chrono::NaiveDate;
use tracing::debug;

use faers_ingest::RawTable;
use faers_model::{CanonicalField, Sex, parse_serious_flag};

use crate::dates::parse_event_date;

/// Normalized demographics row.
#[derive(Debug, Clone, PartialEq)]
pub struct DemoRecord {
    /// Never absent; empty string when no alias resolved.
    pub case_id: String,
    pub sex: Sex,
    pub age: Option<f64>,
    pub country: Option<String>,
    pub event_date: Option<NaiveDate>,
}

/// Normalized reaction row.
#[derive(Debug, Clone, PartialEq)]
pub struct ReacRecord {
    pub case_id: String,
    pub reaction_pt: Option<String>,
}

/// Normalized drug row.
#[derive(Debug, Clone, PartialEq)]
pub struct DrugRecord {
    pub case_id: String,
    pub drug: Option<String>,
}

/// Normalized outcome row.
#[derive(Debug, Clone, PartialEq)]
pub struct OutcRecord {
    pub case_id: String,
    pub serious: bool,
}

/// The per-quarter set of normalized tables handed to the join engine.
#[derive(Debug, Default)]
pub struct NormalizedTables {
    pub demo: Option<Vec<DemoRecord>>,
    pub reac: Option<Vec<ReacRecord>>,
    pub drug: Option<Vec<DrugRecord>>,
    pub outc: Option<Vec<OutcRecord>>,
}

/// First alias of `field` that matches a column header exactly.
fn resolve_column(table: &RawTable, field: CanonicalField) -> Option<usize> {
    for alias in field.aliases() {
        if let Some(idx) = table.column_index(alias) {
            return Some(idx);
        }
    }
    debug!(field = field.as_str(), "no source column found for field");
    None
}

fn cell<'a>(table: &'a RawTable, row: usize, col: Option<usize>) -> &'a str {
    match col {
        Some(idx) => table.value(row, idx),
        None => "",
    }
}

/// Upper-case, trim, and collapse internal whitespace runs to one space.
/// Returns `None` when nothing remains.
pub fn clean_term(raw: &str) -> Option<String> {
    let mut out = String::with_capacity(raw.len());
    for part in raw.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(&part.to_uppercase());
    }
    if out.is_empty() { None } else { Some(out) }
}

fn parse_age(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

pub fn normalize_demo(table: &RawTable) -> Vec<DemoRecord> {
    let case_col = resolve_column(table, CanonicalField::CaseId);
    let sex_col = resolve_column(table, CanonicalField::Sex);
    let age_col = resolve_column(table, CanonicalField::Age);
    let country_col = resolve_column(table, CanonicalField::Country);
    let date_col = resolve_column(table, CanonicalField::EventDate);

    let mut records = Vec::with_capacity(table.height());
    for row in 0..table.height() {
        records.push(DemoRecord {
            case_id: cell(table, row, case_col).trim().to_string(),
            sex: Sex::from_raw(cell(table, row, sex_col)),
            age: parse_age(cell(table, row, age_col)),
            country: clean_term(cell(table, row, country_col)),
            event_date: parse_event_date(cell(table, row, date_col)),
        });
    }
    debug!(rows = records.len(), "normalized DEMO");
    records
}

pub fn normalize_reac(table: &RawTable) -> Vec<ReacRecord> {
    let case_col = resolve_column(table, CanonicalField::CaseId);
    let pt_col = resolve_column(table, CanonicalField::ReactionPt);

    let mut records = Vec::with_capacity(table.height());
    for row in 0..table.height() {
        records.push(ReacRecord {
            case_id: cell(table, row, case_col).trim().to_string(),
            reaction_pt: clean_term(cell(table, row, pt_col)),
        });
    }
    debug!(rows = records.len(), "normalized REAC");
    records
}

pub fn normalize_drug(table: &RawTable) -> Vec<DrugRecord> {
    let case_col = resolve_column(table, CanonicalField::CaseId);
    let drug_col = resolve_column(table, CanonicalField::Drug);

    let mut records = Vec::with_capacity(table.height());
    for row in 0..table.height() {
        records.push(DrugRecord {
            case_id: cell(table, row, case_col).trim().to_string(),
            drug: clean_term(cell(table, row, drug_col)),
        });
    }
    debug!(rows = records.len(), "normalized DRUG");
    records
}

pub fn normalize_outc(table: &RawTable) -> Vec<OutcRecord> {
    let case_col = resolve_column(table, CanonicalField::CaseId);
    let serious_col = resolve_column(table, CanonicalField::Serious);

    let mut records = Vec::with_capacity(table.height());
    for row in 0..table.height() {
        records.push(OutcRecord {
            case_id: cell(table, row, case_col).trim().to_string(),
            serious: parse_serious_flag(cell(table, row, serious_col)).unwrap_or(false),
        });
    }
    debug!(rows = records.len(), "normalized OUTC");
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable::from_rows(
            headers.iter().map(|h| (*h).to_string()).collect(),
            rows.iter()
                .map(|row| row.iter().map(|c| (*c).to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn clean_term_collapses_whitespace() {
        assert_eq!(clean_term("  aspirin  low\t dose "), Some("ASPIRIN LOW DOSE".into()));
        assert_eq!(clean_term("headache"), Some("HEADACHE".into()));
        assert_eq!(clean_term("   "), None);
        assert_eq!(clean_term(""), None);
    }

    #[test]
    fn demo_uses_first_matching_alias() {
        // Both PRIMARYID and CASEID present: PRIMARYID wins.
        let t = table(
            &["CASEID", "PRIMARYID", "SEX", "AGE", "EVENT_DT"],
            &[&["case-1", "primary-1", "male", "45.5", "20240105"]],
        );
        let records = normalize_demo(&t);
        assert_eq!(records[0].case_id, "primary-1");
        assert_eq!(records[0].sex, Sex::Male);
        assert_eq!(records[0].age, Some(45.5));
        assert_eq!(
            records[0].event_date,
            NaiveDate::from_ymd_opt(2024, 1, 5)
        );
    }

    #[test]
    fn alias_match_is_case_sensitive() {
        // Lowercase headers resolve through the lowercase aliases, not the
        // uppercase ones.
        let t = table(&["primaryid", "sex"], &[&["1", "F"]]);
        let records = normalize_demo(&t);
        assert_eq!(records[0].case_id, "1");
        assert_eq!(records[0].sex, Sex::Female);
    }

    #[test]
    fn missing_alias_yields_all_missing_field() {
        let t = table(&["PRIMARYID"], &[&["1"], &["2"]]);
        let records = normalize_demo(&t);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].sex, Sex::Unknown);
        assert_eq!(records[0].age, None);
        assert_eq!(records[0].country, None);
        assert_eq!(records[0].event_date, None);
    }

    #[test]
    fn missing_case_id_column_yields_empty_keys() {
        let t = table(&["PT"], &[&["HEADACHE"]]);
        let records = normalize_reac(&t);
        assert_eq!(records[0].case_id, "");
        assert_eq!(records[0].reaction_pt, Some("HEADACHE".into()));
    }

    #[test]
    fn non_numeric_age_is_missing() {
        let t = table(&["PRIMARYID", "AGE"], &[&["1", "forty"], &["2", "61"]]);
        let records = normalize_demo(&t);
        assert_eq!(records[0].age, None);
        assert_eq!(records[1].age, Some(61.0));
    }

    #[test]
    fn outc_serious_defaults_false() {
        let t = table(
            &["PRIMARYID", "SERIOUS"],
            &[&["1", "Y"], &["2", "0"], &["3", "weird"], &["4", ""]],
        );
        let records = normalize_outc(&t);
        assert!(records[0].serious);
        assert!(!records[1].serious);
        assert!(!records[2].serious);
        assert!(!records[3].serious);
    }

    #[test]
    fn drug_names_are_cleaned() {
        let t = table(
            &["PRIMARYID", "DRUGNAME"],
            &[&["1", "  aspirin   extra  strength "]],
        );
        let records = normalize_drug(&t);
        assert_eq!(records[0].drug, Some("ASPIRIN EXTRA STRENGTH".into()));
    }
}
