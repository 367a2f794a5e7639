//! Text formats: parsers (text → [`Value`]) and emitters ([`Value`] → text).

pub mod csv;
pub mod json;
pub mod xml;
pub mod yaml;

use std::fmt;
use std::str::FromStr;

use crate::error::{EmitError, ParseError};
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Format {
    Json,
    #[value(alias = "yml")]
    Yaml,
    Xml,
    Csv,
}

impl Format {
    pub const ALL: [Format; 4] = [Format::Json, Format::Yaml, Format::Xml, Format::Csv];

    pub fn extension(self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Yaml => "yaml",
            Format::Xml => "xml",
            Format::Csv => "csv",
        }
    }

    /// Guess the format from a file extension (`data.yml` → YAML).
    pub fn from_extension(ext: &str) -> Option<Self> {
        ext.parse().ok()
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Format::Json => "JSON",
            Format::Yaml => "YAML",
            Format::Xml => "XML",
            Format::Csv => "CSV",
        })
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Format::Json),
            "yaml" | "yml" => Ok(Format::Yaml),
            "xml" => Ok(Format::Xml),
            "csv" => Ok(Format::Csv),
            other => Err(format!("unknown format `{other}` (expected json, yaml, xml or csv)")),
        }
    }
}

pub fn parse(text: &str, format: Format) -> Result<Value, ParseError> {
    tracing::debug!(%format, bytes = text.len(), "parse");
    match format {
        Format::Json => json::parse(text),
        Format::Yaml => yaml::parse(text),
        Format::Xml => xml::parse(text),
        Format::Csv => csv::parse(text),
    }
}

pub fn serialize(value: &Value, format: Format) -> Result<String, EmitError> {
    tracing::debug!(%format, root = value.kind(), "serialize");
    match format {
        Format::Json => json::serialize(value),
        Format::Yaml => yaml::serialize(value),
        Format::Xml => xml::serialize(value),
        Format::Csv => csv::serialize(value),
    }
}
