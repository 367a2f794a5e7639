//! Error taxonomy for the engine.
//!
//! Every engine entry point returns one of these; nothing panics across the
//! crate boundary on user input.

use std::fmt;

use thiserror::Error;

use crate::codegen::TypeTarget;
use crate::format::Format;

/// 1-based location inside the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    /// Translate a byte offset into line/column. Offsets past the end clamp to it.
    pub fn from_offset(text: &str, offset: usize) -> Self {
        let mut end = offset.min(text.len());
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        let before = &text[..end];
        let line = before.matches('\n').count() + 1;
        let column = match before.rfind('\n') {
            Some(nl) => before[nl + 1..].chars().count() + 1,
            None => before.chars().count() + 1,
        };
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Malformed source text.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("invalid {format}{}: {message}", at(.position))]
pub struct ParseError {
    pub format: Format,
    pub message: String,
    pub position: Option<Position>,
}

impl ParseError {
    pub fn new(format: Format, message: impl Into<String>) -> Self {
        Self { format, message: message.into(), position: None }
    }

    pub fn at(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }
}

fn at(position: &Option<Position>) -> String {
    match position {
        Some(p) => format!(" at {p}"),
        None => String::new(),
    }
}

/// The target cannot express the given value or schema shape.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EmitError {
    #[error("{format} output failed: {reason}")]
    Format { format: Format, reason: String },

    #[error("{target} output failed: {reason}")]
    Type { target: TypeTarget, reason: String },
}

impl EmitError {
    pub fn format(format: Format, reason: impl Into<String>) -> Self {
        Self::Format { format, reason: reason.into() }
    }
}

/// Reserved: inference is total over valid values.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("schema inference failed: {0}")]
pub struct SchemaInferenceError(pub String);

/// Failure of the combined parse → emit paths.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Emit(#[from] EmitError),

    #[error(transparent)]
    Inference(#[from] SchemaInferenceError),
}

/// A JSON Schema document that cannot be read into a type schema.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("invalid JSON Schema document at {path}: {message}")]
    Malformed { path: String, message: String },

    #[error("unsupported JSON Schema construct at {path}: {message}")]
    Unsupported { path: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_map_to_line_and_column() {
        let text = "ab\ncdé\nf";
        assert_eq!(Position::from_offset(text, 0), Position { line: 1, column: 1 });
        assert_eq!(Position::from_offset(text, 4), Position { line: 2, column: 2 });
        assert_eq!(Position::from_offset(text, 6), Position { line: 2, column: 3 });
        assert_eq!(Position::from_offset(text, 7), Position { line: 2, column: 4 });
        assert_eq!(Position::from_offset(text, 999), Position { line: 3, column: 2 });
    }

    #[test]
    fn parse_error_mentions_position() {
        let err = ParseError::new(Format::Json, "expected value").at(Position { line: 2, column: 5 });
        assert_eq!(err.to_string(), "invalid JSON at line 2, column 5: expected value");
        let err = ParseError::new(Format::Csv, "empty header");
        assert_eq!(err.to_string(), "invalid CSV: empty header");
    }
}
