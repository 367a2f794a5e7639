//! JSON Schema document → [`TypeSchema`].
//!
//! Reads the subset the JSON Schema emitter writes plus the usual
//! hand-written forms (type lists, `anyOf`, untyped nodes). References are
//! not resolved.

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::SchemaError;
use crate::path_de::from_str_with_path;
use crate::schema::{Field, TypeSchema};
use crate::value::Value;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Node {
    #[serde(rename = "$ref")]
    reference: Option<String>,
    #[serde(rename = "type")]
    ty: Option<TypeNames>,
    #[serde(default)]
    properties: IndexMap<String, Node>,
    #[serde(default)]
    required: Vec<String>,
    items: Option<Box<Node>>,
    #[serde(default)]
    one_of: Vec<Node>,
    #[serde(default)]
    any_of: Vec<Node>,
    #[serde(rename = "enum", default)]
    enum_values: Vec<serde_json::Value>,
    minimum: Option<f64>,
    maximum: Option<f64>,
    pattern: Option<String>,
    format: Option<String>,
    min_items: Option<u32>,
    max_items: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TypeNames {
    One(String),
    Many(Vec<String>),
}

pub fn read_json_schema(text: &str) -> Result<TypeSchema, SchemaError> {
    let root: Node = from_str_with_path(text)?;
    let schema = lower(&root, "#")?;
    tracing::debug!(root = schema.kind_name(), "read JSON Schema");
    Ok(schema)
}

fn lower(node: &Node, path: &str) -> Result<TypeSchema, SchemaError> {
    if let Some(r) = &node.reference {
        return Err(SchemaError::Unsupported { path: path.to_string(), message: format!("`$ref` to {r}") });
    }

    let (key, alternatives) = if !node.one_of.is_empty() {
        ("oneOf", &node.one_of)
    } else {
        ("anyOf", &node.any_of)
    };
    if !alternatives.is_empty() {
        let arms = alternatives
            .iter()
            .enumerate()
            .map(|(i, n)| lower(n, &format!("{path}/{key}/{i}")))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(fold_arms(arms));
    }

    let declared: Option<Vec<&str>> = match &node.ty {
        Some(TypeNames::One(t)) => Some(vec![t.as_str()]),
        Some(TypeNames::Many(ts)) => Some(ts.iter().map(String::as_str).collect()),
        None => None,
    };
    if let Some(unknown) = declared.iter().flatten().find(|t| !TYPE_NAMES.contains(*t)) {
        return Err(SchemaError::Malformed { path: format!("{path}/type"), message: format!("unknown type `{unknown}`") });
    }
    if !node.enum_values.is_empty() {
        return enumeration(node, declared.as_deref(), path);
    }

    let names = match declared {
        Some(names) => names,
        None if !node.properties.is_empty() => vec!["object"],
        None if node.items.is_some() => vec!["array"],
        None => vec!["string"],
    };
    let arms = names
        .into_iter()
        .map(|t| single(node, t, path))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(fold_arms(arms))
}

const TYPE_NAMES: &[&str] = &["null", "boolean", "integer", "number", "string", "array", "object"];

/// Null arms fold into `Nullable`, the rest into one type or a union. A
/// `number` arm absorbs `integer` arms.
fn fold_arms(arms: Vec<TypeSchema>) -> TypeSchema {
    let had_null = arms.iter().any(|a| matches!(a, TypeSchema::Null));
    let has_float = arms.iter().any(|a| matches!(a, TypeSchema::Float { .. }));
    let mut rest: Vec<TypeSchema> = arms
        .into_iter()
        .filter(|a| !matches!(a, TypeSchema::Null))
        .filter(|a| !(has_float && matches!(a, TypeSchema::Integer { .. })))
        .collect();
    let core = match rest.len() {
        0 => return TypeSchema::Null,
        1 => rest.remove(0),
        _ => TypeSchema::Union(rest),
    };
    if had_null { TypeSchema::nullable(core) } else { core }
}

fn single(node: &Node, name: &str, path: &str) -> Result<TypeSchema, SchemaError> {
    let ty = match name {
        "null" => TypeSchema::Null,
        "boolean" => TypeSchema::Boolean,
        "integer" => TypeSchema::Integer {
            min: node.minimum.map(|m| m.ceil() as i64),
            max: node.maximum.map(|m| m.floor() as i64),
        },
        "number" => TypeSchema::Float { min: node.minimum, max: node.maximum },
        "string" => TypeSchema::String {
            enum_values: Vec::new(),
            pattern: node.pattern.clone(),
            format: node.format.clone(),
        },
        "array" => TypeSchema::Array {
            item: Box::new(match &node.items {
                Some(items) => lower(items, &format!("{path}/items"))?,
                None => TypeSchema::Null,
            }),
            min_items: node.min_items,
            max_items: node.max_items,
        },
        "object" => TypeSchema::Object {
            fields: node
                .properties
                .iter()
                .map(|(k, n)| {
                    Ok(Field {
                        name: k.clone(),
                        ty: lower(n, &format!("{path}/properties/{}", k.replace('~', "~0").replace('/', "~1")))?,
                        optional: !node.required.contains(k),
                    })
                })
                .collect::<Result<_, SchemaError>>()?,
        },
        other => {
            return Err(SchemaError::Malformed { path: format!("{path}/type"), message: format!("unknown type `{other}`") });
        }
    };
    Ok(ty)
}

/// `enum` members, narrowed to the declared types. All-string members stay a
/// string facet so `pattern` and `format` still apply.
fn enumeration(node: &Node, declared: Option<&[&str]>, path: &str) -> Result<TypeSchema, SchemaError> {
    let members: Vec<Value> = node
        .enum_values
        .iter()
        .filter(|v| declared.is_none_or(|names| names.iter().any(|t| member_fits(v, t))))
        .map(|v| Value::from(v.clone()))
        .collect();
    if members.is_empty() {
        return Err(SchemaError::Malformed {
            path: format!("{path}/enum"),
            message: "no enum value matches the declared type".to_string(),
        });
    }
    let strings: Option<Vec<String>> = members.iter().map(|m| m.as_str().map(String::from)).collect();
    Ok(match strings {
        Some(enum_values) => TypeSchema::String { enum_values, pattern: node.pattern.clone(), format: node.format.clone() },
        None => TypeSchema::Enum(members),
    })
}

fn member_fits(v: &serde_json::Value, name: &str) -> bool {
    use serde_json::Value as J;
    match (name, v) {
        ("null", J::Null) | ("boolean", J::Bool(_)) | ("number", J::Number(_)) | ("string", J::String(_)) => true,
        ("array", J::Array(_)) | ("object", J::Object(_)) => true,
        ("integer", J::Number(n)) => n.as_f64().is_some_and(|f| f.fract() == 0.0),
        _ => false,
    }
}
