//! Quarter folder discovery and table-file resolution.
//!
//! Quarterly dumps live under a raw-data root as `faers_ascii_<YYYY>q<N>`
//! folders (any letter case). Inside each, a single `ascii` subdirectory
//! holds the per-table text files, whose names vary by era:
//! `DEMO24Q1.txt`, `demo24q1.txt`, `DEMO2024Q1.txt`, ...

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use faers_model::TableKind;

use crate::error::{IngestError, Result};

const QUARTER_PREFIX: &str = "faers_ascii_";

/// A discovered quarterly dump folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuarterFolder {
    /// Folder path.
    pub path: PathBuf,
    /// Folder name as found on disk.
    pub name: String,
    /// Four-digit year parsed from the name.
    pub year: u16,
    /// Quarter number, 1 through 4.
    pub quarter: u8,
}

/// Parse `faers_ascii_<YYYY>q<N>` (case-insensitive). Exact shape only:
/// no suffix after the quarter digit.
fn parse_quarter_name(name: &str) -> Option<(u16, u8)> {
    let lower = name.to_lowercase();
    let rest = lower.strip_prefix(QUARTER_PREFIX)?;
    if rest.len() != 6 {
        return None;
    }
    let (year_part, quarter_part) = rest.split_at(4);
    let year: u16 = year_part.parse().ok()?;
    let quarter_part = quarter_part.strip_prefix('q')?;
    let quarter: u8 = quarter_part.parse().ok()?;
    if (1..=4).contains(&quarter) {
        Some((year, quarter))
    } else {
        None
    }
}

/// Discover all quarterly folders under `raw_dir`, sorted by lowercased
/// name, which is chronological for this naming convention.
pub fn discover_quarters(raw_dir: &Path) -> Result<Vec<QuarterFolder>> {
    if !raw_dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: raw_dir.to_path_buf(),
        });
    }

    let entries = std::fs::read_dir(raw_dir).map_err(|e| IngestError::DirectoryRead {
        path: raw_dir.to_path_buf(),
        source: e,
    })?;

    let mut quarters = Vec::new();
    for entry_result in entries {
        let entry = entry_result.map_err(|e| IngestError::DirectoryRead {
            path: raw_dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|v| v.to_str()) else {
            continue;
        };
        if let Some((year, quarter)) = parse_quarter_name(name) {
            quarters.push(QuarterFolder {
                path: path.clone(),
                name: name.to_string(),
                year,
                quarter,
            });
        }
    }

    quarters.sort_by_key(|q| q.name.to_lowercase());
    tracing::info!(count = quarters.len(), "discovered quarterly folders");
    Ok(quarters)
}

/// Locate the case-insensitively named `ascii` subdirectory of a quarter
/// folder. Returns `None` when absent.
pub fn find_ascii_dir(folder: &Path) -> Result<Option<PathBuf>> {
    let entries = std::fs::read_dir(folder).map_err(|e| IngestError::DirectoryRead {
        path: folder.to_path_buf(),
        source: e,
    })?;
    for entry_result in entries {
        let entry = entry_result.map_err(|e| IngestError::DirectoryRead {
            path: folder.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let matches = path
            .file_name()
            .and_then(|v| v.to_str())
            .map(|name| name.eq_ignore_ascii_case("ascii"))
            .unwrap_or(false);
        if matches {
            return Ok(Some(path));
        }
    }
    Ok(None)
}

/// Candidate file names for one table kind within a quarter.
fn name_templates(kind: TableKind, year: u16, quarter: u8) -> Vec<String> {
    let kind_name = kind.as_str();
    let short_year = year % 100;
    vec![
        format!("{kind_name}{short_year:02}Q{quarter}.txt"),
        format!("{}{short_year:02}q{quarter}.txt", kind_name.to_lowercase()),
        format!("{kind_name}{year}Q{quarter}.txt"),
        format!("{}{year}q{quarter}.txt", kind_name.to_lowercase()),
    ]
}

/// Resolve each table kind to a file in the quarter's `ascii` directory.
///
/// Tries the known naming templates first, then a case-insensitive scan of
/// the directory against each template. Missing files map to `None`; the
/// caller decides whether an absent table is fatal for the quarter.
pub fn resolve_table_files(
    quarter: &QuarterFolder,
) -> Result<BTreeMap<TableKind, Option<PathBuf>>> {
    let mut resolved: BTreeMap<TableKind, Option<PathBuf>> =
        TableKind::ALL.iter().map(|kind| (*kind, None)).collect();

    let Some(ascii_dir) = find_ascii_dir(&quarter.path)? else {
        tracing::warn!(folder = %quarter.path.display(), "no ascii folder found in quarter");
        return Ok(resolved);
    };

    // One directory listing, matched case-insensitively against templates.
    let mut available: Vec<(String, PathBuf)> = Vec::new();
    let entries = std::fs::read_dir(&ascii_dir).map_err(|e| IngestError::DirectoryRead {
        path: ascii_dir.clone(),
        source: e,
    })?;
    for entry_result in entries {
        let entry = entry_result.map_err(|e| IngestError::DirectoryRead {
            path: ascii_dir.clone(),
            source: e,
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|v| v.to_str()) {
            available.push((name.to_lowercase(), path.clone()));
        }
    }

    for kind in TableKind::ALL {
        let mut found = None;
        'templates: for template in name_templates(kind, quarter.year, quarter.quarter) {
            let wanted = template.to_lowercase();
            for (name, path) in &available {
                if *name == wanted {
                    found = Some(path.clone());
                    break 'templates;
                }
            }
        }
        match &found {
            Some(path) => {
                tracing::debug!(kind = %kind, path = %path.display(), "resolved table file");
            }
            None => {
                tracing::debug!(kind = %kind, dir = %ascii_dir.display(), "no table file found");
            }
        }
        resolved.insert(kind, found);
    }

    Ok(resolved)
}
