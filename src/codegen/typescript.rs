use once_cell::sync::Lazy;
use regex::Regex;

use super::model::{Body, Member, Model, ModelOptions, Shape};
use super::{EmitOptions, TypeEmitter, TypeTarget};
use crate::error::EmitError;
use crate::schema::TypeSchema;

/// Globals an interface name would shadow.
const RESERVED_TYPES: &[&str] = &[
    "Array", "Boolean", "Date", "Error", "Map", "Number", "Object", "Promise", "Record", "Set",
    "String", "Symbol",
];

static IDENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").unwrap());

pub struct TypeScript;

impl TypeEmitter for TypeScript {
    fn target(&self) -> TypeTarget {
        TypeTarget::TypeScript
    }

    fn emit(&self, schema: &TypeSchema, opts: &EmitOptions) -> Result<String, EmitError> {
        let model = Model::build(schema, &opts.root_name, ModelOptions { named_unions: false, reserved: RESERVED_TYPES });
        let mut blocks = Vec::new();
        if model.root_is_alias() {
            blocks.push(format!("type {} = {};\n", model.root_name, type_expr(&model, &model.root)));
        }
        for decl in &model.decls {
            blocks.push(match &decl.body {
                Body::Struct(members) => interface(&model, &decl.name, members),
                Body::Union(arms) => format!("type {} = {};\n", decl.name, union_expr(&model, arms)),
            });
        }
        Ok(blocks.join("\n"))
    }
}

fn interface(model: &Model, name: &str, members: &[Member]) -> String {
    if members.is_empty() {
        return format!("interface {name} {{}}\n");
    }
    let mut out = format!("interface {name} {{\n");
    for m in members {
        let opt = if m.optional { "?" } else { "" };
        out.push_str(&format!("  {}{opt}: {};\n", property_key(&m.key), type_expr(model, &m.shape)));
    }
    out.push_str("}\n");
    out
}

fn property_key(key: &str) -> String {
    if IDENT.is_match(key) {
        key.to_string()
    } else {
        serde_json::Value::from(key).to_string()
    }
}

fn type_expr(model: &Model, shape: &Shape) -> String {
    match shape {
        Shape::Null => "null".into(),
        Shape::Boolean => "boolean".into(),
        Shape::Integer | Shape::Float => "number".into(),
        Shape::String(values) if values.is_empty() => "string".into(),
        Shape::String(values) => values
            .iter()
            .map(|v| serde_json::Value::from(v.as_str()).to_string())
            .collect::<Vec<_>>()
            .join(" | "),
        Shape::Array(item) => {
            let inner = type_expr(model, item);
            if is_compound(item) { format!("({inner})[]") } else { format!("{inner}[]") }
        }
        Shape::Named(idx) => model.decls[*idx].name.clone(),
        Shape::Union(arms) => union_expr(model, arms),
        Shape::Nullable(inner) => format!("{} | null", type_expr(model, inner)),
    }
}

fn union_expr(model: &Model, arms: &[Shape]) -> String {
    arms.iter().map(|a| type_expr(model, a)).collect::<Vec<_>>().join(" | ")
}

fn is_compound(shape: &Shape) -> bool {
    match shape {
        Shape::Union(_) | Shape::Nullable(_) => true,
        Shape::String(values) => values.len() > 1,
        _ => false,
    }
}
