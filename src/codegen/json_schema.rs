//! JSON Schema (draft-07) output. Nested objects stay inline.

use serde_json::{Map, Value, json};

use super::{EmitOptions, TypeEmitter, TypeTarget};
use crate::error::EmitError;
use crate::schema::TypeSchema;

pub const DRAFT_07: &str = "http://json-schema.org/draft-07/schema#";

pub struct JsonSchema;

impl TypeEmitter for JsonSchema {
    fn target(&self) -> TypeTarget {
        TypeTarget::JsonSchema
    }

    fn emit(&self, schema: &TypeSchema, opts: &EmitOptions) -> Result<String, EmitError> {
        let mut doc = Map::new();
        doc.insert("$schema".into(), Value::from(DRAFT_07));
        doc.insert("title".into(), Value::from(opts.root_name.as_str()));
        match schema_value(schema) {
            Value::Object(body) => doc.extend(body),
            other => {
                return Err(EmitError::Type { target: TypeTarget::JsonSchema, reason: format!("unexpected node {other}") });
            }
        }
        let mut text = serde_json::to_string_pretty(&Value::Object(doc))
            .map_err(|e| EmitError::Type { target: TypeTarget::JsonSchema, reason: e.to_string() })?;
        text.push('\n');
        Ok(text)
    }
}

/// Schema node for one type, without the document header.
pub fn schema_value(ty: &TypeSchema) -> Value {
    fn obj_of(props: Map<String, Value>, required: Vec<String>) -> Value {
        let mut map = Map::new();
        map.insert("type".into(), Value::from("object"));
        map.insert("properties".into(), Value::Object(props));
        if !required.is_empty() {
            map.insert("required".into(), Value::Array(required.into_iter().map(Value::from).collect()));
        }
        Value::Object(map)
    }

    match ty {
        TypeSchema::Null => json!({ "type": "null" }),
        TypeSchema::Boolean => json!({ "type": "boolean" }),

        TypeSchema::Integer { min, max } => {
            let mut o = json!({ "type": "integer" });
            if let Some(m) = *min { o["minimum"] = Value::from(m); }
            if let Some(m) = *max { o["maximum"] = Value::from(m); }
            o
        }

        TypeSchema::Float { min, max } => {
            let mut o = json!({ "type": "number" });
            if let Some(m) = *min { o["minimum"] = Value::from(m); }
            if let Some(m) = *max { o["maximum"] = Value::from(m); }
            o
        }

        TypeSchema::String { enum_values, pattern, format } => {
            let mut o = json!({ "type": "string" });
            if !enum_values.is_empty() {
                o["enum"] = Value::Array(enum_values.iter().cloned().map(Value::from).collect());
            }
            if let Some(rx) = pattern { o["pattern"] = Value::from(rx.as_str()); }
            if let Some(f) = format { o["format"] = Value::from(f.as_str()); }
            o
        }

        TypeSchema::Array { item, min_items, max_items } => {
            let mut o = json!({
                "type": "array",
                "items": schema_value(item),
            });
            if let Some(mn) = *min_items { o["minItems"] = Value::from(mn); }
            if let Some(mx) = *max_items { o["maxItems"] = Value::from(mx); }
            o
        }

        TypeSchema::Object { fields } => {
            let props = fields.iter().map(|f| (f.name.clone(), schema_value(&f.ty))).collect();
            let req = fields.iter().filter(|f| !f.optional).map(|f| f.name.clone()).collect();
            obj_of(props, req)
        }

        TypeSchema::Nullable(inner) => match **inner {
            TypeSchema::Null => schema_value(inner),
            _ => json!({ "oneOf": [schema_value(inner), { "type": "null" }] }),
        },

        // closed object arms keep `oneOf` exclusive
        TypeSchema::Union(arms) => {
            let arms: Vec<Value> = arms
                .iter()
                .map(|arm| {
                    let mut o = schema_value(arm);
                    if matches!(arm, TypeSchema::Object { .. }) {
                        o["additionalProperties"] = Value::Bool(false);
                    }
                    o
                })
                .collect();
            json!({ "oneOf": arms })
        }

        TypeSchema::Enum(values) => json!({ "enum": values.iter().map(Value::from).collect::<Vec<_>>() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Field;

    #[test]
    fn object_document() {
        let schema = TypeSchema::object(vec![
            Field::new("a", TypeSchema::integer()),
            Field::new("b", TypeSchema::nullable(TypeSchema::string())).optional(),
            Field::new("c", TypeSchema::array(TypeSchema::Union(vec![TypeSchema::Boolean, TypeSchema::float()]))),
        ]);
        let text = JsonSchema.emit(&schema, &EmitOptions::default()).unwrap();
        let doc: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(
            doc,
            json!({
                "$schema": DRAFT_07,
                "title": "Root",
                "type": "object",
                "properties": {
                    "a": { "type": "integer" },
                    "b": { "oneOf": [{ "type": "string" }, { "type": "null" }] },
                    "c": { "type": "array", "items": { "oneOf": [{ "type": "boolean" }, { "type": "number" }] } }
                },
                "required": ["a", "c"]
            })
        );
        // header keys come first
        assert!(text.starts_with("{\n  \"$schema\""));
    }

    #[test]
    fn facets_are_emitted() {
        let schema = TypeSchema::Array {
            item: Box::new(TypeSchema::String {
                enum_values: vec![],
                pattern: Some("^[a-z]+$".into()),
                format: Some("email".into()),
            }),
            min_items: Some(1),
            max_items: Some(3),
        };
        assert_eq!(
            schema_value(&schema),
            json!({
                "type": "array",
                "items": { "type": "string", "pattern": "^[a-z]+$", "format": "email" },
                "minItems": 1,
                "maxItems": 3
            })
        );
        assert_eq!(
            schema_value(&TypeSchema::Integer { min: Some(0), max: None }),
            json!({ "type": "integer", "minimum": 0 })
        );
    }

    #[test]
    fn union_object_arms_are_closed() {
        let data = crate::value::Value::from(json!([{"id": 1, "name": "x", "email": "e"}, {"id": 2}]));
        let schema = crate::inference::infer_schema(&data);
        let body = schema_value(&schema);
        let arms = body["items"]["oneOf"].as_array().unwrap();
        assert_eq!(arms.len(), 2);
        assert!(arms.iter().all(|arm| arm["additionalProperties"] == json!(false)));

        let text = JsonSchema.emit(&schema, &EmitOptions::default()).unwrap();
        let read = crate::schema_doc::read_json_schema(&text).unwrap();
        assert_eq!(crate::validate::validate(&data, &read), Ok(()));
    }

    #[test]
    fn enums_list_their_members() {
        let schema = TypeSchema::Enum(vec![crate::value::Value::Number(1.0), crate::value::Value::Null]);
        assert_eq!(schema_value(&schema), json!({ "enum": [1, null] }));
    }
}
