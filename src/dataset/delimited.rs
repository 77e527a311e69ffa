//! Delimited text (CSV, TSV, PSV) parsing using the csv crate
//!
//! RFC 4180 compliant parsing with support for quoted fields, escaped
//! quotes and custom delimiters. The first record is the header row; every
//! other record becomes a [`Record`] keyed by its position.

use std::io::Cursor;

use crate::error::Result;
use crate::model::{Align, CellValue, Column, Record, RowRef, ValueKind};

use super::Dataset;

/// Field delimiter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Delimiter {
    #[default]
    Comma,
    Tab,
    Pipe,
    Semicolon,
}

impl Delimiter {
    pub fn char(self) -> char {
        match self {
            Delimiter::Comma => ',',
            Delimiter::Tab => '\t',
            Delimiter::Pipe => '|',
            Delimiter::Semicolon => ';',
        }
    }

    /// Detect delimiter from file extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "tsv" => Delimiter::Tab,
            "psv" => Delimiter::Pipe,
            _ => Delimiter::Comma,
        }
    }
}

/// Detect delimiter by counting candidates in the first few lines
pub fn detect_delimiter(content: &str) -> Delimiter {
    let head: String = content.lines().take(5).collect::<Vec<_>>().join("\n");

    let counts = [
        (Delimiter::Tab, head.matches('\t').count()),
        (Delimiter::Pipe, head.matches('|').count()),
        (Delimiter::Semicolon, head.matches(';').count()),
        (Delimiter::Comma, head.matches(',').count()),
    ];
    let max = counts.iter().map(|(_, n)| *n).max().unwrap_or(0);
    if max == 0 {
        return Delimiter::Comma;
    }
    counts
        .iter()
        .find(|(_, n)| *n == max)
        .map(|(d, _)| *d)
        .unwrap_or_default()
}

/// Parse CSV text. Ragged rows are padded with nulls.
pub fn parse_csv(content: &str, delimiter: Delimiter) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter.char() as u8)
        .has_headers(false)
        .flexible(true)
        .from_reader(Cursor::new(content.as_bytes()));

    let mut records = reader.records();
    let Some(header) = records.next().transpose()? else {
        return Ok(Dataset::default());
    };
    let keys = unique_keys(header.iter());

    let mut rows: Vec<RowRef> = Vec::new();
    let mut kinds: Vec<Option<ValueKind>> = vec![None; keys.len()];

    for (index, result) in records.enumerate() {
        let record = result?;
        let mut row = Record::new(index as u64);
        for (col, key) in keys.iter().enumerate() {
            let value = record.get(col).map(CellValue::parse).unwrap_or_default();
            kinds[col] = merge_kind(kinds[col], value.kind());
            row.fields.insert(key.clone(), value);
        }
        rows.push(row.into_ref());
    }

    let columns = columns_from_headers(header.iter(), &kinds);
    tracing::debug!(rows = rows.len(), columns = columns.len(), ?delimiter, "parsed CSV");
    Ok(Dataset { columns, rows })
}

/// Sortable, filterable columns for a header row. Columns whose values are
/// all numeric are right-aligned.
pub fn columns_from_headers<'a>(
    headers: impl Iterator<Item = &'a str>,
    kinds: &[Option<ValueKind>],
) -> Vec<Column> {
    let titles: Vec<&str> = headers.collect();
    unique_keys(titles.iter().copied())
        .into_iter()
        .zip(titles)
        .enumerate()
        .map(|(i, (key, title))| {
            let align = match kinds.get(i).copied().flatten() {
                Some(ValueKind::Number) => Align::Right,
                _ => Align::Left,
            };
            let title = if title.trim().is_empty() { key.as_str() } else { title };
            Column::new(&key, title).align(align).sortable().filterable()
        })
        .collect()
}

/// Column keys from header titles; blanks and duplicates get a suffix
fn unique_keys<'a>(titles: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for (i, title) in titles.enumerate() {
        let base = match title.trim() {
            "" => format!("column_{}", i + 1),
            t => t.to_string(),
        };
        let mut key = base.clone();
        let mut n = 2;
        while keys.contains(&key) {
            key = format!("{}_{}", base, n);
            n += 1;
        }
        keys.push(key);
    }
    keys
}

/// Column kind so far; nulls don't change it, mixed kinds become text
fn merge_kind(current: Option<ValueKind>, next: ValueKind) -> Option<ValueKind> {
    match (current, next) {
        (current, ValueKind::Null) => current,
        (None, next) => Some(next),
        (Some(a), b) if a == b => Some(a),
        _ => Some(ValueKind::Text),
    }
}
