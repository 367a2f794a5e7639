//! Instance validation against a [`TypeSchema`].

use std::fmt;

use regex::Regex;

use crate::schema::TypeSchema;
use crate::value::{Value, format_number};

/// One failed check. `path` is a JSON Pointer (`""` is the root).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub path: String,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_empty() { "/" } else { &self.path };
        write!(f, "{path}: {}", self.message)
    }
}

/// Collects every violation instead of stopping at the first one.
pub fn validate(value: &Value, schema: &TypeSchema) -> Result<(), Vec<Violation>> {
    let mut out = Vec::new();
    check(value, schema, "", &mut out);
    if out.is_empty() { Ok(()) } else { Err(out) }
}

fn check(value: &Value, schema: &TypeSchema, path: &str, out: &mut Vec<Violation>) {
    let mut fail = |message: String| out.push(Violation { path: path.to_string(), message });

    match (schema, value) {
        (TypeSchema::Nullable(_), Value::Null) | (TypeSchema::Null, Value::Null) => {}
        (TypeSchema::Nullable(inner), _) => check(value, inner, path, out),
        (TypeSchema::Boolean, Value::Bool(_)) => {}

        (TypeSchema::Integer { min, max }, Value::Number(n)) => {
            if n.fract() != 0.0 || !n.is_finite() {
                fail(format!("expected integer, found {}", format_number(*n)));
            } else {
                bounds(*n, min.map(|m| m as f64), max.map(|m| m as f64), &mut fail);
            }
        }
        (TypeSchema::Float { min, max }, Value::Number(n)) => bounds(*n, *min, *max, &mut fail),

        (TypeSchema::String { enum_values, pattern, .. }, Value::String(s)) => {
            if !enum_values.is_empty() && !enum_values.contains(s) {
                fail(format!("`{s}` is not one of {}", enum_values.join(", ")));
            }
            if let Some(p) = pattern {
                match Regex::new(p) {
                    Ok(re) if re.is_match(s) => {}
                    Ok(_) => fail(format!("`{s}` does not match /{p}/")),
                    Err(err) => fail(format!("invalid pattern /{p}/: {err}")),
                }
            }
        }

        (TypeSchema::Array { item, min_items, max_items }, Value::Array(xs)) => {
            let len = xs.len() as u64;
            if let Some(mn) = min_items.filter(|&mn| len < u64::from(mn)) {
                fail(format!("expected at least {mn} items, found {len}"));
            }
            if let Some(mx) = max_items.filter(|&mx| len > u64::from(mx)) {
                fail(format!("expected at most {mx} items, found {len}"));
            }
            for (i, x) in xs.iter().enumerate() {
                check(x, item, &format!("{path}/{i}"), out);
            }
        }

        (TypeSchema::Object { fields }, Value::Object(map)) => {
            for f in fields {
                match map.get(&f.name) {
                    Some(v) => check(v, &f.ty, &child(path, &f.name), out),
                    None if f.optional => {}
                    None => out.push(Violation {
                        path: path.to_string(),
                        message: format!("missing required field `{}`", f.name),
                    }),
                }
            }
        }

        (TypeSchema::Union(arms), _) => {
            let matched = arms.iter().filter(|arm| arm_accepts(value, arm)).count();
            if matched != 1 {
                let kinds: Vec<_> = arms.iter().map(TypeSchema::kind_name).collect();
                match matched {
                    0 => fail(format!("{} matches none of {}", value.kind(), kinds.join(" | "))),
                    _ => fail(format!("{} matches more than one of {}", value.kind(), kinds.join(" | "))),
                }
            }
        }

        (TypeSchema::Enum(values), _) => {
            if !values.contains(value) {
                let allowed: Vec<_> = values.iter().map(literal).collect();
                fail(format!("{} is not one of {}", literal(value), allowed.join(", ")));
            }
        }

        (expected, found) => fail(format!("expected {}, found {}", expected.kind_name(), found.kind())),
    }
}

/// Union arms behave like `oneOf` with closed object arms, matching the
/// JSON Schema output.
fn arm_accepts(value: &Value, arm: &TypeSchema) -> bool {
    if let (TypeSchema::Object { fields }, Value::Object(map)) = (arm, value) {
        if map.keys().any(|k| !fields.iter().any(|f| &f.name == k)) {
            return false;
        }
    }
    validate(value, arm).is_ok()
}

fn literal(value: &Value) -> String {
    serde_json::Value::from(value).to_string()
}

fn bounds(n: f64, min: Option<f64>, max: Option<f64>, fail: &mut impl FnMut(String)) {
    if let Some(m) = min.filter(|&m| n < m) {
        fail(format!("{} is below the minimum {}", format_number(n), format_number(m)));
    }
    if let Some(m) = max.filter(|&m| n > m) {
        fail(format!("{} is above the maximum {}", format_number(n), format_number(m)));
    }
}

/// RFC 6901 escaping of one reference token.
fn child(path: &str, key: &str) -> String {
    format!("{path}/{}", key.replace('~', "~0").replace('/', "~1"))
}
