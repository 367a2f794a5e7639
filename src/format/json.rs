use crate::error::{EmitError, ParseError, Position};
use crate::format::Format;
use crate::value::Value;

pub fn parse(text: &str) -> Result<Value, ParseError> {
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(v) => Ok(Value::from(v)),
        Err(error) => {
            let err = ParseError::new(Format::Json, strip_location(&error));
            // serde_json reports line 0 for errors without a location
            if error.line() == 0 {
                Err(err)
            } else {
                Err(err.at(Position { line: error.line(), column: error.column().max(1) }))
            }
        }
    }
}

/// 2-space pretty print; key order is the object's insertion order.
pub fn serialize(value: &Value) -> Result<String, EmitError> {
    let json = serde_json::Value::from(value);
    serde_json::to_string_pretty(&json).map_err(|e| EmitError::format(Format::Json, e.to_string()))
}

// "expected value at line 1 column 5" -> "expected value"
fn strip_location(error: &serde_json::Error) -> String {
    let msg = error.to_string();
    match msg.rfind(" at line ") {
        Some(i) => msg[..i].to_string(),
        None => msg,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pretty_prints_with_two_spaces_in_source_order() {
        let v = parse(r#"{"b": [1, 2.5], "a": null}"#).unwrap();
        let out = serialize(&v).unwrap();
        assert_eq!(out, "{\n  \"b\": [\n    1,\n    2.5\n  ],\n  \"a\": null\n}");
    }

    #[test]
    fn syntax_errors_carry_position() {
        let err = parse("{\n  \"a\": ,\n}").unwrap_err();
        assert_eq!(err.format, Format::Json);
        assert_eq!(err.position.map(|p| p.line), Some(2));
        assert!(err.message.contains("expected value"), "{}", err.message);
    }

    #[test]
    fn round_trip_is_identity() {
        let src = json!({"id": 7, "tags": ["x", "y"], "nested": {"ok": true, "ratio": 0.25, "none": null}});
        let v = parse(&src.to_string()).unwrap();
        let again = parse(&serialize(&v).unwrap()).unwrap();
        assert_eq!(v, again);
        assert_eq!(serde_json::Value::from(&again), src);
    }
}
