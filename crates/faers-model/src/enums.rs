//! Value-level encodings shared across the pipeline.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Patient sex, collapsed from the raw token zoo to three values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
    #[default]
    #[serde(rename = "UNK")]
    Unknown,
}

impl Sex {
    /// Collapse a raw sex token via exact lookup. Anything unrecognized
    /// (including empty) is `Unknown`.
    pub fn from_raw(raw: &str) -> Sex {
        match raw.trim() {
            "M" | "MALE" | "m" | "male" => Sex::Male,
            "F" | "FEMALE" | "f" | "female" => Sex::Female,
            _ => Sex::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Sex::Male => "M",
            Sex::Female => "F",
            Sex::Unknown => "UNK",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Collapse a seriousness token to a boolean via exact lookup on the
/// uppercased token. Unrecognized tokens yield `None`; callers default
/// missing seriousness to `false`.
pub fn parse_serious_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_uppercase().as_str() {
        "1" | "Y" | "YES" | "TRUE" => Some(true),
        "0" | "N" | "NO" | "FALSE" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sex_lookup_is_exact() {
        assert_eq!(Sex::from_raw("M"), Sex::Male);
        assert_eq!(Sex::from_raw("female"), Sex::Female);
        assert_eq!(Sex::from_raw("U"), Sex::Unknown);
        assert_eq!(Sex::from_raw(""), Sex::Unknown);
        assert_eq!(Sex::from_raw("Masculine"), Sex::Unknown);
    }

    #[test]
    fn serious_tokens() {
        assert_eq!(parse_serious_flag("1"), Some(true));
        assert_eq!(parse_serious_flag("yes"), Some(true));
        assert_eq!(parse_serious_flag("N"), Some(false));
        assert_eq!(parse_serious_flag("maybe"), None);
        assert_eq!(parse_serious_flag(""), None);
    }
}
