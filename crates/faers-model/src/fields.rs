//! Canonical field names and the historical column aliases that map to them.
//!
//! FAERS column names drifted across eras (legacy AERS extracts used
//! `CASEID`/`PT` style names, newer extracts `primaryid`/`pt`). Each canonical
//! field carries a priority-ordered alias list; the normalizer picks the
//! first alias present in a table, matched exactly and case-sensitively.

/// A canonical field of the consolidated event record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalField {
    CaseId,
    Drug,
    ReactionPt,
    Sex,
    Age,
    Country,
    Serious,
    EventDate,
}

impl CanonicalField {
    /// Output column name for this field.
    pub fn as_str(self) -> &'static str {
        match self {
            CanonicalField::CaseId => "case_id",
            CanonicalField::Drug => "drug",
            CanonicalField::ReactionPt => "reaction_pt",
            CanonicalField::Sex => "sex",
            CanonicalField::Age => "age",
            CanonicalField::Country => "country",
            CanonicalField::Serious => "serious",
            CanonicalField::EventDate => "event_date",
        }
    }

    /// Priority-ordered source-column aliases for this field.
    ///
    /// Order matters: `PRIMARYID` wins over `CASEID` when both are present,
    /// and `EVENT_DT` over `RECEIPTDATE`.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            CanonicalField::CaseId => &["PRIMARYID", "CASEID", "primaryid", "caseid"],
            CanonicalField::Drug => &["DRUGNAME", "MEDICINALPRODUCT", "drugname", "medicinalproduct"],
            CanonicalField::ReactionPt => &["PT", "REACTIONMEDDRAPT", "pt", "reactionmeddrapt"],
            CanonicalField::Sex => &["SEX", "PATIENTSEX", "sex", "patientsex"],
            CanonicalField::Age => &["AGE", "AGE_YRS", "age", "age_yrs"],
            CanonicalField::Country => &["OCCUR_COUNTRY", "COUNTRY", "occur_country", "country"],
            CanonicalField::Serious => &["SERIOUS", "SERIOUSNESS", "serious", "seriousness"],
            CanonicalField::EventDate => &["EVENT_DT", "RECEIPTDATE", "event_dt", "receiptdate"],
        }
    }
}
