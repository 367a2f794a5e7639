//! CSV: a header row plus one object per record. Only an array of flat
//! objects can be written back.

use indexmap::IndexSet;

use crate::error::{EmitError, ParseError, Position};
use crate::format::Format;
use crate::value::{Map, Value};

/// Every cell is read as a string; typing is left to inference.
pub fn parse(text: &str) -> Result<Value, ParseError> {
    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(text.as_bytes());

    let headers = reader.headers().map_err(csv_error)?.clone();
    if headers.is_empty() {
        return Ok(Value::Array(Vec::new()));
    }
    let names: Vec<String> = headers.iter().map(|h| h.trim().to_string()).collect();
    let mut seen = IndexSet::new();
    for name in &names {
        if !seen.insert(name.as_str()) {
            return Err(ParseError::new(Format::Csv, format!("duplicate column `{name}` in header"))
                .at(Position { line: 1, column: 1 }));
        }
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        let row: Map = names
            .iter()
            .zip(record.iter())
            .map(|(name, cell)| (name.clone(), Value::String(cell.to_string())))
            .collect();
        rows.push(Value::Object(row));
    }
    Ok(Value::Array(rows))
}

fn csv_error(error: ::csv::Error) -> ParseError {
    let position = error.position().map(|p| Position { line: p.line() as usize, column: 1 });
    let message = match error.kind() {
        ::csv::ErrorKind::UnequalLengths { expected_len, len, .. } => {
            format!("expected {expected_len} columns, found {len}")
        }
        _ => error.to_string(),
    };
    let err = ParseError::new(Format::Csv, message);
    match position {
        Some(p) => err.at(p),
        None => err,
    }
}

/// Header = union of keys in first-seen order; missing keys and nulls are
/// empty cells.
pub fn serialize(value: &Value) -> Result<String, EmitError> {
    let nested = || EmitError::format(Format::Csv, "nested structure unsupported");
    let Value::Array(records) = value else {
        return Err(nested());
    };

    let mut header: IndexSet<&str> = IndexSet::new();
    for record in records {
        let Value::Object(fields) = record else {
            return Err(nested());
        };
        for (k, v) in fields {
            if !v.is_scalar() {
                return Err(nested());
            }
            header.insert(k.as_str());
        }
    }
    if header.is_empty() {
        return Ok(String::new());
    }

    let mut writer = ::csv::Writer::from_writer(Vec::new());
    let fail = |e: ::csv::Error| EmitError::format(Format::Csv, e.to_string());
    writer.write_record(header.iter()).map_err(fail)?;
    for record in records {
        let fields = record.as_object().ok_or_else(nested)?;
        let row = header
            .iter()
            .map(|k| fields.get(*k).and_then(Value::scalar_text).unwrap_or_default());
        writer.write_record(row).map_err(fail)?;
    }
    let bytes = writer.into_inner().map_err(|e| EmitError::format(Format::Csv, e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| EmitError::format(Format::Csv, e.to_string()))
}
