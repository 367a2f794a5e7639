//! Type emitters: [`TypeSchema`] → source text for one target language.

pub mod go;
pub mod json_schema;
pub mod kotlin;
pub mod model;
pub mod naming;
pub mod rust;
pub mod typescript;

use std::fmt;
use std::str::FromStr;

use crate::error::EmitError;
use crate::schema::TypeSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum TypeTarget {
    #[value(name = "typescript", alias = "ts")]
    TypeScript,
    #[value(alias = "golang")]
    Go,
    #[value(alias = "rs")]
    Rust,
    #[value(alias = "kt")]
    Kotlin,
    #[value(name = "json-schema", aliases = ["jsonschema", "schema"])]
    JsonSchema,
}

impl TypeTarget {
    pub const ALL: [TypeTarget; 5] = [
        TypeTarget::TypeScript,
        TypeTarget::Go,
        TypeTarget::Rust,
        TypeTarget::Kotlin,
        TypeTarget::JsonSchema,
    ];

    pub fn extension(self) -> &'static str {
        match self {
            TypeTarget::TypeScript => "ts",
            TypeTarget::Go => "go",
            TypeTarget::Rust => "rs",
            TypeTarget::Kotlin => "kt",
            TypeTarget::JsonSchema => "schema.json",
        }
    }

    fn emitter(self) -> &'static dyn TypeEmitter {
        match self {
            TypeTarget::TypeScript => &typescript::TypeScript,
            TypeTarget::Go => &go::Go,
            TypeTarget::Rust => &rust::Rust,
            TypeTarget::Kotlin => &kotlin::Kotlin,
            TypeTarget::JsonSchema => &json_schema::JsonSchema,
        }
    }
}

impl fmt::Display for TypeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TypeTarget::TypeScript => "TypeScript",
            TypeTarget::Go => "Go",
            TypeTarget::Rust => "Rust",
            TypeTarget::Kotlin => "Kotlin",
            TypeTarget::JsonSchema => "JSON Schema",
        })
    }
}

impl FromStr for TypeTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['_', ' '], "-").as_str() {
            "typescript" | "ts" => Ok(TypeTarget::TypeScript),
            "go" | "golang" => Ok(TypeTarget::Go),
            "rust" | "rs" => Ok(TypeTarget::Rust),
            "kotlin" | "kt" => Ok(TypeTarget::Kotlin),
            "json-schema" | "jsonschema" | "schema" => Ok(TypeTarget::JsonSchema),
            other => Err(format!(
                "unknown target `{other}` (expected typescript, go, rust, kotlin or json-schema)"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitOptions {
    /// Name of the top-level type.
    pub root_name: String,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self { root_name: "Root".to_string() }
    }
}

/// One output language.
pub trait TypeEmitter: Sync {
    fn target(&self) -> TypeTarget;

    fn extension(&self) -> &'static str {
        self.target().extension()
    }

    fn emit(&self, schema: &TypeSchema, opts: &EmitOptions) -> Result<String, EmitError>;
}

pub fn emit_type(schema: &TypeSchema, target: TypeTarget) -> Result<String, EmitError> {
    emit_type_with(schema, target, &EmitOptions::default())
}

pub fn emit_type_with(schema: &TypeSchema, target: TypeTarget, opts: &EmitOptions) -> Result<String, EmitError> {
    tracing::debug!(%target, root = schema.kind_name(), root_name = %opts.root_name, "emit type");
    target.emitter().emit(schema, opts)
}
