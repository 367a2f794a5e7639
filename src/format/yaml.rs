use crate::error::{EmitError, ParseError, Position};
use crate::format::Format;
use crate::value::{Map, Value};

pub fn parse(text: &str) -> Result<Value, ParseError> {
    let doc = serde_yaml::from_str::<serde_yaml::Value>(text).map_err(|error| {
        let msg = error.to_string();
        let msg = match msg.find(" at line ") {
            Some(i) => msg[..i].to_string(),
            None => msg,
        };
        let err = ParseError::new(Format::Yaml, msg);
        match error.location() {
            Some(loc) => err.at(Position { line: loc.line(), column: loc.column() }),
            None => err,
        }
    })?;
    from_yaml(doc, "")
}

fn from_yaml(v: serde_yaml::Value, path: &str) -> Result<Value, ParseError> {
    use serde_yaml::Value as Y;
    Ok(match v {
        Y::Null => Value::Null,
        Y::Bool(b) => Value::Bool(b),
        Y::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
        Y::String(s) => Value::String(s),
        Y::Sequence(xs) => Value::Array(
            xs.into_iter()
                .enumerate()
                .map(|(i, x)| from_yaml(x, &format!("{path}/{i}")))
                .collect::<Result<_, _>>()?,
        ),
        Y::Mapping(m) => {
            let mut out = Map::with_capacity(m.len());
            for (k, x) in m {
                let key = scalar_key(&k).ok_or_else(|| {
                    ParseError::new(Format::Yaml, format!("non-scalar mapping key under `{}`", display_path(path)))
                })?;
                let child = from_yaml(x, &format!("{path}/{key}"))?;
                out.insert(key, child);
            }
            Value::Object(out)
        }
        // explicit tags (`!foo`) carry no meaning here; keep the payload
        Y::Tagged(tagged) => from_yaml(tagged.value, path)?,
    })
}

fn scalar_key(k: &serde_yaml::Value) -> Option<String> {
    use serde_yaml::Value as Y;
    match k {
        Y::String(s) => Some(s.clone()),
        Y::Bool(b) => Some(b.to_string()),
        Y::Number(n) => Some(n.to_string()),
        Y::Null => Some("null".to_string()),
        Y::Tagged(t) => scalar_key(&t.value),
        Y::Sequence(_) | Y::Mapping(_) => None,
    }
}

fn display_path(path: &str) -> &str {
    if path.is_empty() { "/" } else { path }
}

/// Block-style YAML. String scalars that would resolve to another type
/// (`"123"`, `"true"`, `"null"`) come out quoted.
pub fn serialize(value: &Value) -> Result<String, EmitError> {
    serde_yaml::to_string(&to_yaml(value)).map_err(|e| EmitError::format(Format::Yaml, e.to_string()))
}

fn to_yaml(v: &Value) -> serde_yaml::Value {
    use serde_yaml::Value as Y;
    match v {
        Value::Null => Y::Null,
        Value::Bool(b) => Y::Bool(*b),
        Value::Number(n) => {
            if n.is_finite() && n.fract() == 0.0 && n.abs() < 9.0e15 {
                Y::Number((*n as i64).into())
            } else {
                Y::Number((*n).into())
            }
        }
        Value::String(s) => Y::String(s.clone()),
        Value::Array(xs) => Y::Sequence(xs.iter().map(to_yaml).collect()),
        Value::Object(m) => {
            let mut out = serde_yaml::Mapping::with_capacity(m.len());
            for (k, x) in m {
                out.insert(Y::String(k.clone()), to_yaml(x));
            }
            Y::Mapping(out)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_key_order_and_types() {
        let v = parse("zeta: 1\nalpha:\n  - x\n  - 2.5\n  - null\nflag: yes-ish\n").unwrap();
        let m = v.as_object().unwrap();
        assert_eq!(m.keys().map(String::as_str).collect::<Vec<_>>(), ["zeta", "alpha", "flag"]);
        assert_eq!(m["zeta"], Value::Number(1.0));
        assert_eq!(
            m["alpha"],
            Value::Array(vec![Value::String("x".into()), Value::Number(2.5), Value::Null])
        );
    }

    #[test]
    fn ambiguous_strings_stay_strings() {
        let mut m = Map::new();
        m.insert("a".into(), Value::String("123".into()));
        m.insert("b".into(), Value::String("true".into()));
        m.insert("c".into(), Value::String("null".into()));
        m.insert("d".into(), Value::Number(5.0));
        let src = Value::Object(m);
        let out = serialize(&src).unwrap();
        assert!(!out.contains("a: 123"), "{out}");
        assert!(!out.contains("b: true"), "{out}");
        assert!(out.contains("d: 5\n"), "{out}");
        assert_eq!(parse(&out).unwrap(), src);
    }

    #[test]
    fn nested_values_use_block_style() {
        let v = crate::format::json::parse(r#"{"server": {"ports": [80, 443], "name": "edge"}}"#).unwrap();
        let out = serialize(&v).unwrap();
        assert!(out.starts_with("server:\n"), "{out}");
        assert!(!out.contains('{'), "{out}");
        assert_eq!(parse(&out).unwrap(), v);
    }

    #[test]
    fn bad_indentation_is_a_parse_error() {
        let err = parse("a:\n  b: 1\n c: 2\n").unwrap_err();
        assert_eq!(err.format, Format::Yaml);
        assert!(err.position.is_some());
    }

    #[test]
    fn complex_keys_are_rejected() {
        let err = parse("? [1, 2]\n: value\n").unwrap_err();
        assert!(err.message.contains("non-scalar mapping key"), "{}", err.message);
    }
}
