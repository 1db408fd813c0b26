//! CSV Module
//!
//! Comma-separated text for tables. Every scalar is written as text, so a
//! decoded table holds strings only.

use std::borrow::Cow;

use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use serde_json::{Map, Value};

use crate::codec::table::{ObjectRow, TabularResult};
use crate::error::{CacheError, Result};

// == Write ==
/// Serializes `table` as CSV.
///
/// With `header`, object rows get a header record listing the union of their
/// field names in first-seen order. Without it, rows are written positionally.
pub fn write_table(table: &TabularResult, header: bool) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new()
        .flexible(true)
        .has_headers(false)
        .from_writer(Vec::new());

    match (table, header) {
        (TabularResult::Objects(rows), true) => {
            let columns = column_names(rows);
            if !columns.is_empty() {
                writer.write_record(&columns).map_err(write_error)?;
            }
            for row in rows {
                let fields = columns
                    .iter()
                    .map(|column| row.get(*column).map_or(Ok(Cow::Borrowed("")), field_text))
                    .collect::<Result<Vec<_>>>()?;
                writer.write_record(fields.iter().map(|f| f.as_bytes())).map_err(write_error)?;
            }
        }
        (TabularResult::Objects(rows), false) => {
            for row in rows {
                write_row(&mut writer, row.values())?;
            }
        }
        (TabularResult::Arrays(rows), false) => {
            for row in rows {
                write_row(&mut writer, row.iter())?;
            }
        }
        (TabularResult::Arrays(rows), true) => {
            if !rows.is_empty() {
                return Err(CacheError::InvalidRequest(
                    "Array rows have no field names for a CSV header".to_string(),
                ));
            }
        }
    }

    writer
        .into_inner()
        .map_err(|e| CacheError::Internal(format!("CSV flush failed: {}", e)))
}

// == Read ==
/// Parses CSV text into a table of strings.
///
/// With `header` the first record names the fields and object rows are
/// produced; otherwise array rows.
pub fn read_table(bytes: &[u8], header: bool) -> Result<TabularResult> {
    let mut reader = ReaderBuilder::new()
        .has_headers(header)
        .flexible(true)
        .from_reader(bytes);

    if header {
        let columns = reader.headers().map_err(read_error)?.clone();
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(read_error)?;
            rows.push(object_row(&columns, &record)?);
        }
        Ok(TabularResult::Objects(rows))
    } else {
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(read_error)?;
            rows.push(record.iter().map(|f| Value::String(f.to_string())).collect());
        }
        Ok(TabularResult::Arrays(rows))
    }
}

fn write_row<'a, W, I>(writer: &mut csv::Writer<W>, values: I) -> Result<()>
where
    W: std::io::Write,
    I: Iterator<Item = &'a Value>,
{
    let fields = values.map(field_text).collect::<Result<Vec<_>>>()?;
    writer
        .write_record(fields.iter().map(|f| f.as_bytes()))
        .map_err(write_error)
}

fn column_names(rows: &[ObjectRow]) -> Vec<&str> {
    let mut columns: Vec<&str> = Vec::new();
    for row in rows {
        for key in row.keys() {
            if !columns.contains(&key.as_str()) {
                columns.push(key);
            }
        }
    }
    columns
}

/// Pairs a record with the header. Records must match the header's width.
fn object_row(columns: &StringRecord, record: &StringRecord) -> Result<ObjectRow> {
    if record.len() != columns.len() {
        let line = record.position().map_or(0, |p| p.line());
        return Err(CacheError::MalformedPayload(format!(
            "CSV record on line {} has {} fields, header has {}",
            line,
            record.len(),
            columns.len()
        )));
    }

    let mut row = Map::with_capacity(columns.len());
    for (column, field) in columns.iter().zip(record.iter()) {
        row.insert(column.to_string(), Value::String(field.to_string()));
    }
    Ok(row)
}

fn field_text(value: &Value) -> Result<Cow<'_, str>> {
    match value {
        Value::Array(_) | Value::Object(_) => Err(CacheError::InvalidRequest(
            "Nested values cannot be encoded as CSV".to_string(),
        )),
        Value::String(s) => Ok(Cow::Borrowed(s.as_str())),
        Value::Null => Ok(Cow::Borrowed("")),
        other => Ok(Cow::Owned(other.to_string())),
    }
}

fn write_error(err: csv::Error) -> CacheError {
    CacheError::Internal(format!("CSV write failed: {}", err))
}

fn read_error(err: csv::Error) -> CacheError {
    CacheError::MalformedPayload(format!("CSV parse failed: {}", err))
}
