//! Structured-data engine: format conversion, type inference, type emission
//! and schema-driven sample generation.
//!
//! ```text
//! text ──parse──▶ Value ──serialize──▶ text
//!                   │
//!                 infer
//!                   ▼
//!              TypeSchema ──emit_type──▶ TypeScript / Go / Rust / Kotlin / JSON Schema
//!                   │
//!            generate_sample ──▶ Value
//! ```
//!
//! Every call works on its own values; nothing is cached or shared.

pub mod codegen;
pub mod error;
pub mod format;
pub mod inference;
pub mod jq_exec;
pub mod lower;
pub mod sample;
pub mod schema;
pub mod schema_doc;
pub mod validate;
pub mod value;

mod path_de;

pub use codegen::{EmitOptions, TypeEmitter, TypeTarget, emit_type, emit_type_with};
pub use error::{ConversionError, EmitError, ParseError, Position, SchemaError, SchemaInferenceError};
pub use format::{Format, parse, serialize};
pub use inference::{Inference, InferencePolicy, infer_schema, infer_schema_with};
pub use sample::{SampleOptions, generate_sample, generate_sample_seeded, generate_sample_with};
pub use schema::{Field, TypeSchema};
pub use schema_doc::read_json_schema;
pub use validate::{Violation, validate};
pub use value::{Map, Value};

/// Parse `text` as `from` and write it back out as `to`.
pub fn convert(text: &str, from: Format, to: Format) -> Result<String, ConversionError> {
    let value = parse(text, from)?;
    Ok(serialize(&value, to)?)
}

/// Sample several documents into one schema, in the given order.
pub fn infer_schema_from_samples<'a, I>(samples: I, policy: &InferencePolicy) -> TypeSchema
where
    I: IntoIterator<Item = &'a Value>,
{
    inference::infer_from_values(samples, policy)
}

/// Inference policy suited to a source format: formats without typed
/// scalars (CSV) read numbers and booleans out of their strings.
pub fn policy_for(format: Format) -> InferencePolicy {
    match format {
        Format::Csv => InferencePolicy::coercing(),
        Format::Json | Format::Yaml | Format::Xml => InferencePolicy::default(),
    }
}

/// Parse, infer, emit.
pub fn generate_type(text: &str, from: Format, target: TypeTarget) -> Result<String, ConversionError> {
    generate_type_with(text, from, target, &EmitOptions::default())
}

pub fn generate_type_with(
    text: &str,
    from: Format,
    target: TypeTarget,
    opts: &EmitOptions,
) -> Result<String, ConversionError> {
    let value = parse(text, from)?;
    let schema = infer_schema_with(&value, &policy_for(from));
    Ok(emit_type_with(&schema, target, opts)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn convert_wraps_both_failures() {
        assert!(matches!(convert("{", Format::Json, Format::Yaml), Err(ConversionError::Parse(_))));
        assert!(matches!(convert(r#"{"a": {"b": 1}}"#, Format::Json, Format::Csv), Err(ConversionError::Emit(_))));
        assert_eq!(convert("a: 1\n", Format::Yaml, Format::Json).unwrap(), "{\n  \"a\": 1\n}");
    }

    #[test]
    fn csv_cells_are_typed_for_codegen() {
        let out = generate_type("id,price,name\n1,2.5,x\n2,3,\n", Format::Csv, TypeTarget::TypeScript).unwrap();
        assert_eq!(
            out,
            "type Root = RootItem[];\n\ninterface RootItem {\n  id: number;\n  price: number;\n  name: string | null;\n}\n"
        );
    }
}
