//! Chunked delimited-file reading with encoding fallback.
//!
//! Source files can exceed comfortable memory limits, so the body is read in
//! fixed-size row chunks and projected down to each table kind's essential
//! columns before anything is retained. UTF-8 is attempted first; on any
//! decode failure the entire file is re-read as Latin-1, which accepts every
//! byte sequence.

use std::path::Path;

use faers_model::{PipelineConfig, TableKind};

use crate::error::{IngestError, Result};
use crate::raw_table::{RawTable, RawTableBuilder};

/// Tokens treated as missing in addition to the empty string.
const MISSING_TOKENS: [&str; 2] = ["NULL", "null"];

/// Options controlling one table read.
#[derive(Debug, Clone)]
pub struct ReadOptions {
    /// Field delimiter (`$` or tab, by deployment).
    pub delimiter: u8,
    /// Rows per chunk in chunked mode.
    pub chunk_size: usize,
    /// File size above which chunked mode is used.
    pub large_file_threshold_bytes: u64,
    /// Dictionary-encode low-cardinality columns after load.
    pub dictionary_encoding: bool,
    /// Release excess buffer capacity every N chunks.
    pub reclaim_interval_chunks: usize,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self::from_config(&PipelineConfig::default())
    }
}

impl ReadOptions {
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            delimiter: config.delimiter,
            chunk_size: config.chunk_size,
            large_file_threshold_bytes: config.large_file_threshold_bytes(),
            dictionary_encoding: config.dictionary_encoding,
            reclaim_interval_chunks: config.reclaim_interval_chunks.max(1),
        }
    }

    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    #[must_use]
    pub fn with_chunk_size(mut self, rows: usize) -> Self {
        self.chunk_size = rows.max(1);
        self
    }

    #[must_use]
    pub fn with_large_file_threshold_bytes(mut self, bytes: u64) -> Self {
        self.large_file_threshold_bytes = bytes;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Encoding {
    Utf8,
    Latin1,
}

enum AttemptError {
    /// A cell failed to decode; retry the whole file with the fallback.
    Decode,
    Fatal(IngestError),
}

/// Read one source table, projecting to the kind's essential columns.
///
/// Files above the configured size threshold are read chunk by chunk; the
/// result is identical either way. Never fails on malformed text encoding:
/// a UTF-8 failure triggers one whole-file Latin-1 retry.
pub fn read_table(path: &Path, kind: TableKind, options: &ReadOptions) -> Result<RawTable> {
    let metadata = std::fs::metadata(path).map_err(|e| IngestError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    let chunked = metadata.len() > options.large_file_threshold_bytes;
    if chunked {
        tracing::info!(
            path = %path.display(),
            size_mb = metadata.len() / (1024 * 1024),
            chunk_size = options.chunk_size,
            "large file detected, using chunked reading"
        );
    }

    match read_with_encoding(path, kind, options, Encoding::Utf8, chunked) {
        Ok(table) => Ok(table),
        Err(AttemptError::Decode) => {
            tracing::warn!(path = %path.display(), "utf-8 decode failed, retrying with latin-1");
            match read_with_encoding(path, kind, options, Encoding::Latin1, chunked) {
                Ok(table) => Ok(table),
                // Latin-1 decoding accepts every byte, so only record-level
                // parse errors can remain.
                Err(AttemptError::Decode) => Err(IngestError::Parse {
                    path: path.to_path_buf(),
                    message: "latin-1 fallback failed to decode".to_string(),
                }),
                Err(AttemptError::Fatal(error)) => Err(error),
            }
        }
        Err(AttemptError::Fatal(error)) => Err(error),
    }
}

fn read_with_encoding(
    path: &Path,
    kind: TableKind,
    options: &ReadOptions,
    encoding: Encoding,
    chunked: bool,
) -> std::result::Result<RawTable, AttemptError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|e| parse_error(path, e))?;

    // Header first, to learn which columns exist before touching the body.
    let header_record = reader
        .byte_headers()
        .map_err(|e| parse_error(path, e))?
        .clone();
    let mut headers = Vec::with_capacity(header_record.len());
    for field in header_record.iter() {
        let cell = decode_cell(field, encoding).ok_or(AttemptError::Decode)?;
        headers.push(normalize_cell(&cell));
    }

    let keep = select_columns(&headers, kind, path);
    let kept_headers: Vec<String> = keep.iter().map(|&idx| headers[idx].clone()).collect();

    let mut builder = RawTableBuilder::new(kept_headers);
    let mut rows_in_chunk = 0usize;
    let mut chunks_done = 0usize;
    for record in reader.byte_records() {
        let record = record.map_err(|e| parse_error(path, e))?;
        let mut row = Vec::with_capacity(keep.len());
        for &idx in &keep {
            let bytes = record.get(idx).unwrap_or(b"");
            let cell = decode_cell(bytes, encoding).ok_or(AttemptError::Decode)?;
            row.push(normalize_cell(&cell));
        }
        builder.push_row(row);

        if chunked {
            rows_in_chunk += 1;
            if rows_in_chunk >= options.chunk_size {
                chunks_done += 1;
                rows_in_chunk = 0;
                tracing::debug!(
                    path = %path.display(),
                    chunk = chunks_done,
                    rows = builder.height(),
                    "chunk complete"
                );
                if chunks_done % options.reclaim_interval_chunks.max(1) == 0 {
                    builder.reclaim();
                }
            }
        }
    }

    let table = builder.finish(options.dictionary_encoding);
    tracing::info!(
        path = %path.display(),
        kind = %kind,
        rows = table.height(),
        columns = table.width(),
        "loaded table"
    );
    Ok(table)
}

/// Indices of the essential columns present in the header, matched
/// case-insensitively. Falls back to every column when none match.
fn select_columns(headers: &[String], kind: TableKind, path: &Path) -> Vec<usize> {
    let essential = kind.essential_columns();
    let keep: Vec<usize> = headers
        .iter()
        .enumerate()
        .filter(|(_, header)| {
            essential
                .iter()
                .any(|wanted| header.eq_ignore_ascii_case(wanted))
        })
        .map(|(idx, _)| idx)
        .collect();

    if keep.is_empty() {
        tracing::warn!(
            path = %path.display(),
            kind = %kind,
            "no essential columns found, keeping all columns"
        );
        (0..headers.len()).collect()
    } else {
        tracing::debug!(
            path = %path.display(),
            kind = %kind,
            kept = keep.len(),
            total = headers.len(),
            "projected to essential columns"
        );
        keep
    }
}

fn decode_cell(bytes: &[u8], encoding: Encoding) -> Option<String> {
    match encoding {
        Encoding::Utf8 => std::str::from_utf8(bytes).ok().map(str::to_string),
        // Latin-1 maps each byte to the code point of the same value and
        // therefore cannot fail.
        Encoding::Latin1 => Some(bytes.iter().map(|&b| char::from(b)).collect()),
    }
}

/// Trim, strip any BOM, and collapse NULL tokens to the empty string.
fn normalize_cell(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    if MISSING_TOKENS.contains(&trimmed) {
        String::new()
    } else {
        trimmed.to_string()
    }
}

fn parse_error(path: &Path, error: csv::Error) -> AttemptError {
    AttemptError::Fatal(IngestError::Parse {
        path: path.to_path_buf(),
        message: error.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_cell_strips_null_tokens() {
        assert_eq!(normalize_cell(" NULL "), "");
        assert_eq!(normalize_cell("null"), "");
        assert_eq!(normalize_cell(" HEADACHE "), "HEADACHE");
        assert_eq!(normalize_cell("\u{feff}PRIMARYID"), "PRIMARYID");
    }

    #[test]
    fn latin1_decodes_any_bytes() {
        let bytes = [0xE9u8, 0xFF, 0x41];
        assert_eq!(decode_cell(&bytes, Encoding::Latin1), Some("éÿA".to_string()));
        assert_eq!(decode_cell(&bytes, Encoding::Utf8), None);
    }
}
