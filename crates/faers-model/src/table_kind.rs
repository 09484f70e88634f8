//! Source table kinds found in a quarterly dump.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// One of the six FAERS ASCII table types shipped per quarter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TableKind {
    /// Demographics: one row per case version.
    Demo,
    /// Reactions: one row per reported MedDRA preferred term.
    Reac,
    /// Drugs: one row per suspect/concomitant product.
    Drug,
    /// Outcomes: one row per reported outcome code.
    Outc,
    /// Therapy dates.
    Ther,
    /// Indications.
    Indi,
}

/// Unknown table-kind token.
#[derive(Debug, Error)]
#[error("unknown table kind: {token}")]
pub struct TableKindParseError {
    pub token: String,
}

impl TableKind {
    /// All table kinds in the order they are resolved within a quarter folder.
    pub const ALL: [TableKind; 6] = [
        TableKind::Demo,
        TableKind::Reac,
        TableKind::Drug,
        TableKind::Outc,
        TableKind::Ther,
        TableKind::Indi,
    ];

    /// The uppercase file-name prefix (`DEMO24Q1.txt` etc.).
    pub fn as_str(self) -> &'static str {
        match self {
            TableKind::Demo => "DEMO",
            TableKind::Reac => "REAC",
            TableKind::Drug => "DRUG",
            TableKind::Outc => "OUTC",
            TableKind::Ther => "THER",
            TableKind::Indi => "INDI",
        }
    }

    /// Whether a quarter can be processed at all without this table.
    ///
    /// DEMO and REAC feed the mandatory inner join; the rest enrich.
    pub fn is_mandatory(self) -> bool {
        matches!(self, TableKind::Demo | TableKind::Reac)
    }

    /// The minimal column subset needed to reconstruct canonical fields
    /// for this table type. Matched case-insensitively against file headers;
    /// when none match, the reader falls back to keeping every column.
    pub fn essential_columns(self) -> &'static [&'static str] {
        match self {
            TableKind::Demo => &[
                "PRIMARYID",
                "CASEID",
                "AGE",
                "AGE_YRS",
                "SEX",
                "PATIENTSEX",
                "OCCUR_COUNTRY",
                "COUNTRY",
                "EVENT_DT",
                "RECEIPTDATE",
            ],
            TableKind::Reac => &["PRIMARYID", "CASEID", "PT", "REACTIONMEDDRAPT"],
            TableKind::Drug => &["PRIMARYID", "CASEID", "DRUGNAME", "MEDICINALPRODUCT"],
            TableKind::Outc => &["PRIMARYID", "CASEID", "OUTC_COD", "SERIOUS", "SERIOUSNESS"],
            TableKind::Ther | TableKind::Indi => &["PRIMARYID", "CASEID"],
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TableKind {
    type Err = TableKindParseError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token.trim().to_uppercase().as_str() {
            "DEMO" => Ok(TableKind::Demo),
            "REAC" => Ok(TableKind::Reac),
            "DRUG" => Ok(TableKind::Drug),
            "OUTC" => Ok(TableKind::Outc),
            "THER" => Ok(TableKind::Ther),
            "INDI" => Ok(TableKind::Indi),
            _ => Err(TableKindParseError {
                token: token.to_string(),
            }),
        }
    }
}
