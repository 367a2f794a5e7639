// Structural type schema. Inference produces it, the type emitters and the
// sample generator consume it.
//
// Facets (bounds, enum, pattern, format, item counts) stay empty for inferred
// schemas; they are filled in when a schema is read from a JSON Schema document.
// Inference never produces `Enum` either.

use crate::inference::{InferencePolicy, infer_from_values};
use crate::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum TypeSchema {
    Null,                    // exactly null
    Boolean,
    Integer { min: Option<i64>, max: Option<i64> },
    Float   { min: Option<f64>, max: Option<f64> },
    String  { enum_values: Vec<String>, pattern: Option<String>, format: Option<String> },
    Array {
        item: Box<TypeSchema>,
        min_items: Option<u32>,
        max_items: Option<u32>,
    },
    Object {
        fields: Vec<Field>,  // first-seen order
    },
    Union(Vec<TypeSchema>),  // arms that could not be widened into one
    Nullable(Box<TypeSchema>),
    Enum(Vec<Value>),        // fixed literals that are not all strings
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub ty: TypeSchema,
    pub optional: bool,      // absent from at least one sampled object
}

impl TypeSchema {
    pub fn integer() -> Self { Self::Integer { min: None, max: None } }
    pub fn float() -> Self { Self::Float { min: None, max: None } }
    pub fn string() -> Self { Self::String { enum_values: Vec::new(), pattern: None, format: None } }

    pub fn array(item: TypeSchema) -> Self {
        Self::Array { item: Box::new(item), min_items: None, max_items: None }
    }

    pub fn object(fields: Vec<Field>) -> Self { Self::Object { fields } }

    pub fn nullable(inner: TypeSchema) -> Self {
        match inner {
            TypeSchema::Null | TypeSchema::Nullable(_) => inner,
            other => Self::Nullable(Box::new(other)),
        }
    }

    /// Strip one `Nullable` layer.
    pub fn non_null(&self) -> (&TypeSchema, bool) {
        match self {
            TypeSchema::Nullable(inner) => (inner, true),
            other => (other, false),
        }
    }

    /// Type of an `Enum`'s members, as inference would type them. Members
    /// that are all strings (or null) keep their literals.
    pub fn enum_base(values: &[Value]) -> TypeSchema {
        let textual = values.iter().all(|v| matches!(v, Value::String(_) | Value::Null));
        let widen = |ty: TypeSchema| match ty {
            TypeSchema::String { pattern, format, .. } if textual => TypeSchema::String {
                enum_values: values.iter().filter_map(|v| v.as_str().map(String::from)).collect(),
                pattern,
                format,
            },
            other => other,
        };
        match infer_from_values(values, &InferencePolicy::default()) {
            TypeSchema::Nullable(inner) => TypeSchema::nullable(widen(*inner)),
            other => widen(other),
        }
    }

    /// Short label used by emitters to name union arms (`Integer`, `Object`, ...).
    pub fn kind_name(&self) -> &'static str {
        match self {
            TypeSchema::Null => "Null",
            TypeSchema::Boolean => "Bool",
            TypeSchema::Integer { .. } => "Integer",
            TypeSchema::Float { .. } => "Float",
            TypeSchema::String { .. } => "String",
            TypeSchema::Array { .. } => "Array",
            TypeSchema::Object { .. } => "Object",
            TypeSchema::Union(_) => "Union",
            TypeSchema::Nullable(inner) => inner.kind_name(),
            TypeSchema::Enum(_) => "Enum",
        }
    }
}

impl Field {
    pub fn new(name: impl Into<String>, ty: TypeSchema) -> Self {
        Self { name: name.into(), ty, optional: false }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn members(j: serde_json::Value) -> Vec<Value> {
        Value::from(j).as_array().unwrap().to_vec()
    }

    #[test]
    fn enum_members_are_typed_like_samples() {
        assert_eq!(TypeSchema::enum_base(&members(json!([1, 2, 3]))), TypeSchema::integer());
        assert_eq!(TypeSchema::enum_base(&members(json!([1, 2.5]))), TypeSchema::float());
        assert_eq!(
            TypeSchema::enum_base(&members(json!(["a", null]))),
            TypeSchema::nullable(TypeSchema::String { enum_values: vec!["a".into()], pattern: None, format: None })
        );
        // a string widens the scalars, but the literals no longer describe it
        assert_eq!(TypeSchema::enum_base(&members(json!(["a", 1]))), TypeSchema::string());
    }
}
