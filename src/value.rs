//! Canonical value tree shared by every format.
//!
//! Parsers produce a [`Value`], emitters consume one. Nothing in here knows
//! about JSON, YAML, XML or CSV specifics; objects keep insertion order so
//! formats that carry order round-trip it.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

pub type Map = IndexMap<String, Value>;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Value>),
    Object(Map),
}

impl Value {
    /// Short kind label used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    pub fn is_scalar(&self) -> bool {
        !matches!(self, Value::Array(_) | Value::Object(_))
    }

    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Value::Object(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(xs) => Some(xs),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// RFC 6901 lookup (`/items/0/name`). The empty pointer selects `self`.
    pub fn pointer(&self, ptr: &str) -> Option<&Value> {
        if ptr.is_empty() {
            return Some(self);
        }
        let rest = ptr.strip_prefix('/')?;
        rest.split('/')
            .map(|tok| tok.replace("~1", "/").replace("~0", "~"))
            .try_fold(self, |node, tok| match node {
                Value::Object(m) => m.get(&tok),
                Value::Array(xs) => {
                    // leading zeros are not valid array indices
                    if tok.len() > 1 && tok.starts_with('0') {
                        return None;
                    }
                    tok.parse::<usize>().ok().and_then(|i| xs.get(i))
                }
                _ => None,
            })
    }

    /// Render a scalar as plain text (CSV cells, XML text, YAML keys).
    /// Containers return `None`.
    pub fn scalar_text(&self) -> Option<String> {
        match self {
            Value::Null => Some(String::new()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Number(n) => Some(format_number(*n)),
            Value::String(s) => Some(s.clone()),
            Value::Array(_) | Value::Object(_) => None,
        }
    }
}

static NUMBER_TEXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][+-]?[0-9]+)?$").unwrap());

/// True for text that spells a JSON-style number. Leading zeros (`007`)
/// don't count, they are usually identifiers.
pub fn looks_like_number(s: &str) -> bool {
    NUMBER_TEXT.is_match(s)
}

/// Type untyped text (XML element content): numbers and `true`/`false`
/// become scalars, everything else stays a string.
pub fn coerce_text(s: &str) -> Value {
    match s {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ if looks_like_number(s) => s.parse::<f64>().map(Value::Number).unwrap_or_else(|_| Value::String(s.to_string())),
        _ => Value::String(s.to_string()),
    }
}

/// Integral doubles print without a fraction (`3` not `3.0`).
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

// ----------------------------- serde_json glue ---------------------------- //

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(xs) => Value::Array(xs.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(m) => {
                Value::Object(m.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<&Value> for serde_json::Value {
    fn from(v: &Value) -> Self {
        match v {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => json_number(*n),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Array(xs) => serde_json::Value::Array(xs.iter().map(Into::into).collect()),
            Value::Object(m) => serde_json::Value::Object(
                m.iter().map(|(k, v)| (k.clone(), v.into())).collect(),
            ),
        }
    }
}

// prefer emitting integers when exact; NaN/inf have no JSON spelling
fn json_number(n: f64) -> serde_json::Value {
    if n.is_finite() && n.fract() == 0.0 && n >= i64::MIN as f64 && n <= i64::MAX as f64 {
        serde_json::Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pointer_walks_objects_and_arrays() {
        let v = Value::from(json!({"a": {"b/c": [10, 20]}, "~k": true}));
        assert_eq!(v.pointer("/a/b~1c/1"), Some(&Value::Number(20.0)));
        assert_eq!(v.pointer("/~0k"), Some(&Value::Bool(true)));
        assert_eq!(v.pointer(""), Some(&v));
        assert_eq!(v.pointer("/a/b~1c/01"), None);
        assert_eq!(v.pointer("a"), None);
    }

    #[test]
    fn json_glue_keeps_order_and_integers() {
        let src = json!({"z": 1, "a": 2.5, "m": [null, "x"]});
        let v = Value::from(src.clone());
        let keys: Vec<_> = v.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["z", "a", "m"]);
        assert_eq!(serde_json::Value::from(&v), src);
    }

    #[test]
    fn text_coercion() {
        assert_eq!(coerce_text("42"), Value::Number(42.0));
        assert_eq!(coerce_text("-1.5e3"), Value::Number(-1500.0));
        assert_eq!(coerce_text("false"), Value::Bool(false));
        assert_eq!(coerce_text("007"), Value::String("007".into()));
        assert_eq!(coerce_text("1.2.3"), Value::String("1.2.3".into()));
        assert_eq!(coerce_text("True"), Value::String("True".into()));
    }

    #[test]
    fn numbers_format_compactly() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(-0.5), "-0.5");
        assert_eq!(format_number(1e20), "100000000000000000000");
    }
}
