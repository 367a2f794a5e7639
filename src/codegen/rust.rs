use super::model::{Body, Member, Model, ModelOptions, Shape, distinct_labels};
use super::naming::RUST_NAMING;
use super::{EmitOptions, TypeEmitter, TypeTarget};
use crate::error::EmitError;
use crate::schema::TypeSchema;

const RESERVED_TYPES: &[&str] = &["Box", "Option", "Result", "Self", "String", "Vec"];
const DERIVE: &str = "#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]";
const ANY: &str = "serde_json::Value";

pub struct Rust;

impl TypeEmitter for Rust {
    fn target(&self) -> TypeTarget {
        TypeTarget::Rust
    }

    fn emit(&self, schema: &TypeSchema, opts: &EmitOptions) -> Result<String, EmitError> {
        let model = Model::build(schema, &opts.root_name, ModelOptions { named_unions: true, reserved: RESERVED_TYPES });
        let mut blocks = vec!["use serde::{Deserialize, Serialize};\n".to_string()];
        if model.root_is_alias() {
            blocks.push(format!("pub type {} = {};\n", model.root_name, rust_type(&model, &model.root)));
        }
        for decl in &model.decls {
            blocks.push(match &decl.body {
                Body::Struct(members) => structure(&model, &decl.name, members),
                Body::Union(arms) => untagged_enum(&model, &decl.name, arms),
            });
        }
        Ok(blocks.join("\n"))
    }
}

fn structure(model: &Model, name: &str, members: &[Member]) -> String {
    if members.is_empty() {
        return format!("{DERIVE}\npub struct {name} {{}}\n");
    }
    let idents = RUST_NAMING.field_names(members.iter().map(|m| m.key.as_str()));
    let mut out = format!("{DERIVE}\npub struct {name} {{\n");
    for (m, ident) in members.iter().zip(idents) {
        let mut ty = rust_type(model, &m.shape);
        let mut attrs = Vec::new();
        if ident.trim_start_matches("r#") != m.key {
            attrs.push(format!("rename = {}", serde_json::Value::from(m.key.as_str())));
        }
        if m.optional {
            if !ty.starts_with("Option<") {
                ty = format!("Option<{ty}>");
            }
            attrs.push("default".into());
            attrs.push("skip_serializing_if = \"Option::is_none\"".into());
        }
        if !attrs.is_empty() {
            out.push_str(&format!("    #[serde({})]\n", attrs.join(", ")));
        }
        out.push_str(&format!("    pub {ident}: {ty},\n"));
    }
    out.push_str("}\n");
    out
}

fn untagged_enum(model: &Model, name: &str, arms: &[Shape]) -> String {
    let labels = distinct_labels(arms.iter().map(|a| model.arm_label(a).to_string()));
    let mut out = format!("{DERIVE}\n#[serde(untagged)]\npub enum {name} {{\n");
    for (arm, label) in arms.iter().zip(labels) {
        match arm {
            Shape::Null => out.push_str(&format!("    {label},\n")),
            _ => out.push_str(&format!("    {label}({}),\n", rust_type(model, arm))),
        }
    }
    out.push_str("}\n");
    out
}

fn rust_type(model: &Model, shape: &Shape) -> String {
    match shape {
        Shape::Null => format!("Option<{ANY}>"),
        Shape::Boolean => "bool".into(),
        Shape::Integer => "i64".into(),
        Shape::Float => "f64".into(),
        Shape::String(_) => "String".into(),
        Shape::Array(item) => format!("Vec<{}>", rust_type(model, item)),
        Shape::Named(idx) => model.decls[*idx].name.clone(),
        Shape::Union(_) => ANY.into(),
        Shape::Nullable(inner) => format!("Option<{}>", rust_type(model, inner)),
    }
}
