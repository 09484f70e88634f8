//! In-memory raw tables with dictionary-encoded low-cardinality columns.
//!
//! A `RawTable` is one source extract for one (quarter, table kind): untyped
//! string cells, column-major. Columns whose unique-value ratio falls below
//! 0.5 are stored dictionary-encoded (integer codes into an interned value
//! table). Encoding is purely a memory optimization and never changes the
//! values observed through [`RawTable::value`].

use std::collections::{HashMap, HashSet};

/// Unique-value ratio below which a column is dictionary-encoded.
const DICT_ENCODE_MAX_UNIQUE_RATIO: f64 = 0.5;

/// Column storage: plain strings or codes into an interned value table.
#[derive(Debug, Clone)]
pub enum ColumnData {
    Plain(Vec<String>),
    Dict { codes: Vec<u32>, values: Vec<String> },
}

impl ColumnData {
    fn value(&self, row: usize) -> &str {
        match self {
            ColumnData::Plain(cells) => &cells[row],
            ColumnData::Dict { codes, values } => &values[codes[row] as usize],
        }
    }

    fn len(&self) -> usize {
        match self {
            ColumnData::Plain(cells) => cells.len(),
            ColumnData::Dict { codes, .. } => codes.len(),
        }
    }

    fn is_dictionary(&self) -> bool {
        matches!(self, ColumnData::Dict { .. })
    }
}

/// One loaded source table. Missing cells are empty strings.
#[derive(Debug, Clone)]
pub struct RawTable {
    headers: Vec<String>,
    columns: Vec<ColumnData>,
    height: usize,
}

impl RawTable {
    /// An empty table with the given headers.
    pub fn empty(headers: Vec<String>) -> Self {
        let columns = headers.iter().map(|_| ColumnData::Plain(Vec::new())).collect();
        Self {
            headers,
            columns,
            height: 0,
        }
    }

    /// Build a table from row-major data. Intended for tests and small
    /// fixtures; the reader goes through [`RawTableBuilder`].
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let mut builder = RawTableBuilder::new(headers);
        for row in rows {
            builder.push_row(row);
        }
        builder.finish(false)
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.height == 0
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Index of the column whose header matches `name` exactly.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cell value; empty string means missing.
    pub fn value(&self, row: usize, col: usize) -> &str {
        self.columns[col].value(row)
    }

    /// Whether the given column is stored dictionary-encoded.
    pub fn is_dictionary_encoded(&self, col: usize) -> bool {
        self.columns[col].is_dictionary()
    }
}

/// Accumulates rows chunk by chunk and produces a [`RawTable`].
#[derive(Debug)]
pub struct RawTableBuilder {
    headers: Vec<String>,
    columns: Vec<Vec<String>>,
    height: usize,
}

impl RawTableBuilder {
    pub fn new(headers: Vec<String>) -> Self {
        let columns = headers.iter().map(|_| Vec::new()).collect();
        Self {
            headers,
            columns,
            height: 0,
        }
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Append one row, padding or truncating to the header width.
    /// Rows whose cells are all empty are dropped.
    pub fn push_row(&mut self, row: Vec<String>) {
        if row.iter().all(|cell| cell.trim().is_empty()) {
            return;
        }
        let width = self.headers.len();
        let mut cells = row.into_iter();
        for column in self.columns.iter_mut().take(width) {
            column.push(cells.next().unwrap_or_default());
        }
        self.height += 1;
    }

    /// Release excess buffer capacity. Called on a fixed chunk interval
    /// during very large reads to keep the resident set bounded.
    pub fn reclaim(&mut self) {
        for column in &mut self.columns {
            column.shrink_to_fit();
        }
    }

    /// Finish the table, dictionary-encoding low-cardinality columns when
    /// `dictionary_encoding` is set.
    pub fn finish(self, dictionary_encoding: bool) -> RawTable {
        let height = self.height;
        let columns = self
            .columns
            .into_iter()
            .map(|cells| {
                if dictionary_encoding && should_dictionary_encode(&cells) {
                    dictionary_encode(cells)
                } else {
                    ColumnData::Plain(cells)
                }
            })
            .collect::<Vec<_>>();
        debug_assert!(columns.iter().all(|c| c.len() == height));
        RawTable {
            headers: self.headers,
            columns,
            height,
        }
    }
}

fn should_dictionary_encode(cells: &[String]) -> bool {
    if cells.is_empty() {
        return false;
    }
    let mut uniques: HashSet<&str> = HashSet::new();
    for cell in cells {
        uniques.insert(cell.as_str());
    }
    let unique_ratio = uniques.len() as f64 / cells.len() as f64;
    unique_ratio < DICT_ENCODE_MAX_UNIQUE_RATIO
}

fn dictionary_encode(cells: Vec<String>) -> ColumnData {
    let mut lookup: HashMap<String, u32> = HashMap::new();
    let mut values: Vec<String> = Vec::new();
    let mut codes: Vec<u32> = Vec::with_capacity(cells.len());
    for cell in cells {
        let code = match lookup.get(&cell) {
            Some(code) => *code,
            None => {
                let code = values.len() as u32;
                values.push(cell.clone());
                lookup.insert(cell, code);
                code
            }
        };
        codes.push(code);
    }
    ColumnData::Dict { codes, values }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| (*n).to_string()).collect()
    }

    #[test]
    fn push_row_drops_all_empty_rows() {
        let mut builder = RawTableBuilder::new(headers(&["a", "b"]));
        builder.push_row(vec!["1".into(), "x".into()]);
        builder.push_row(vec![String::new(), "  ".into()]);
        builder.push_row(vec!["2".into(), String::new()]);
        let table = builder.finish(false);
        assert_eq!(table.height(), 2);
        assert_eq!(table.value(1, 0), "2");
        assert_eq!(table.value(1, 1), "");
    }

    #[test]
    fn short_rows_are_padded() {
        let mut builder = RawTableBuilder::new(headers(&["a", "b", "c"]));
        builder.push_row(vec!["1".into()]);
        let table = builder.finish(false);
        assert_eq!(table.value(0, 1), "");
        assert_eq!(table.value(0, 2), "");
    }

    #[test]
    fn low_cardinality_column_is_dictionary_encoded() {
        let mut builder = RawTableBuilder::new(headers(&["id", "sex"]));
        for i in 0..10 {
            builder.push_row(vec![format!("case{i}"), if i % 2 == 0 { "M" } else { "F" }.into()]);
        }
        let table = builder.finish(true);
        assert!(!table.is_dictionary_encoded(0));
        assert!(table.is_dictionary_encoded(1));
        // Values are unchanged by the encoding.
        assert_eq!(table.value(0, 1), "M");
        assert_eq!(table.value(1, 1), "F");
        assert_eq!(table.value(9, 1), "F");
    }

    #[test]
    fn encoding_disabled_keeps_plain_columns() {
        let mut builder = RawTableBuilder::new(headers(&["sex"]));
        for _ in 0..10 {
            builder.push_row(vec!["M".into()]);
        }
        let table = builder.finish(false);
        assert!(!table.is_dictionary_encoded(0));
    }
}
