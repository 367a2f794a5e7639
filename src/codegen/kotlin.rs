//! Kotlin output targeting `kotlinx.serialization`.

use super::model::{Body, Member, Model, ModelOptions, Shape, distinct_labels};
use super::naming::KOTLIN_NAMING;
use super::{EmitOptions, TypeEmitter, TypeTarget};
use crate::error::EmitError;
use crate::schema::TypeSchema;

const RESERVED_TYPES: &[&str] = &[
    "Any", "Boolean", "Double", "Int", "JsonElement", "List", "Long", "Map", "Nothing", "String", "Unit",
];
const ANY: &str = "JsonElement";

pub struct Kotlin;

impl TypeEmitter for Kotlin {
    fn target(&self) -> TypeTarget {
        TypeTarget::Kotlin
    }

    fn emit(&self, schema: &TypeSchema, opts: &EmitOptions) -> Result<String, EmitError> {
        let model = Model::build(schema, &opts.root_name, ModelOptions { named_unions: true, reserved: RESERVED_TYPES });
        let mut blocks = Vec::new();
        if model.root_is_alias() {
            blocks.push(format!("typealias {} = {}\n", model.root_name, kotlin_type(&model, &model.root)));
        }
        for decl in &model.decls {
            blocks.push(match &decl.body {
                Body::Struct(members) => data_class(&model, &decl.name, members),
                Body::Union(arms) => sealed_class(&model, &decl.name, arms),
            });
        }
        let body = blocks.join("\n");

        let imports = [
            ("@SerialName(", "kotlinx.serialization.SerialName"),
            ("@Serializable", "kotlinx.serialization.Serializable"),
            (ANY, "kotlinx.serialization.json.JsonElement"),
        ];
        let header: String = imports
            .iter()
            .filter(|(used, _)| body.contains(used))
            .map(|(_, import)| format!("import {import}\n"))
            .collect();
        if header.is_empty() {
            return Ok(body);
        }
        Ok(format!("{header}\n{body}"))
    }
}

fn data_class(model: &Model, name: &str, members: &[Member]) -> String {
    // a data class needs at least one property
    if members.is_empty() {
        return format!("@Serializable\nclass {name}\n");
    }
    let idents = KOTLIN_NAMING.field_names(members.iter().map(|m| m.key.as_str()));
    let mut out = format!("@Serializable\ndata class {name}(\n");
    for (m, ident) in members.iter().zip(idents) {
        let mut ty = kotlin_type(model, &m.shape);
        if m.optional && !ty.ends_with('?') {
            ty.push('?');
        }
        let default = if m.optional { " = null" } else { "" };
        if ident.trim_matches('`') != m.key {
            out.push_str(&format!("    @SerialName({})\n", serde_json::Value::from(m.key.as_str())));
        }
        out.push_str(&format!("    val {ident}: {ty}{default},\n"));
    }
    out.push_str(")\n");
    out
}

/// One wrapper subclass per arm.
fn sealed_class(model: &Model, name: &str, arms: &[Shape]) -> String {
    let labels = distinct_labels(arms.iter().map(|a| format!("{}Value", model.arm_label(a))));
    let mut out = format!("@Serializable\nsealed class {name} {{\n");
    for (arm, label) in arms.iter().zip(labels) {
        out.push_str("    @Serializable\n");
        match arm {
            Shape::Null => out.push_str(&format!("    object {label} : {name}()\n")),
            _ => out.push_str(&format!(
                "    data class {label}(val value: {}) : {name}()\n",
                kotlin_type(model, arm)
            )),
        }
    }
    out.push_str("}\n");
    out
}

fn kotlin_type(model: &Model, shape: &Shape) -> String {
    match shape {
        Shape::Null => format!("{ANY}?"),
        Shape::Boolean => "Boolean".into(),
        Shape::Integer => "Long".into(),
        Shape::Float => "Double".into(),
        Shape::String(_) => "String".into(),
        Shape::Array(item) => format!("List<{}>", kotlin_type(model, item)),
        Shape::Named(idx) => model.decls[*idx].name.clone(),
        Shape::Union(_) => ANY.into(),
        Shape::Nullable(inner) => {
            let inner = kotlin_type(model, inner);
            if inner.ends_with('?') { inner } else { format!("{inner}?") }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Field;
    use pretty_assertions::assert_eq;

    fn emit(schema: &TypeSchema) -> String {
        Kotlin.emit(schema, &EmitOptions::default()).unwrap()
    }

    #[test]
    fn data_class_with_serial_names() {
        let schema = TypeSchema::object(vec![
            Field::new("id", TypeSchema::integer()),
            Field::new("created_at", TypeSchema::nullable(TypeSchema::string())),
            Field::new("scores", TypeSchema::array(TypeSchema::float())).optional(),
        ]);
        let expected = "\
import kotlinx.serialization.SerialName
import kotlinx.serialization.Serializable

@Serializable
data class Root(
    val id: Long,
    @SerialName(\"created_at\")
    val createdAt: String?,
    val scores: List<Double>? = null,
)
";
        assert_eq!(emit(&schema), expected);
    }

    #[test]
    fn unions_become_sealed_classes() {
        let schema = TypeSchema::object(vec![Field::new(
            "value",
            TypeSchema::Union(vec![TypeSchema::integer(), TypeSchema::array(TypeSchema::string())]),
        )]);
        let expected = "\
@Serializable
sealed class Value {
    @Serializable
    data class IntegerValue(val value: Long) : Value()
    @Serializable
    data class ArrayValue(val value: List<String>) : Value()
}
";
        let out = emit(&schema);
        assert!(out.contains("    val value: Value,\n"), "{out}");
        assert!(out.ends_with(expected), "{out}");
    }

    #[test]
    fn imports_follow_usage() {
        let schema = TypeSchema::object(vec![Field::new("id", TypeSchema::integer())]);
        assert_eq!(
            emit(&schema),
            "import kotlinx.serialization.Serializable\n\n@Serializable\ndata class Root(\n    val id: Long,\n)\n"
        );
        assert_eq!(emit(&TypeSchema::array(TypeSchema::integer())), "typealias Root = List<Long>\n");
    }

    #[test]
    fn null_values_use_json_element() {
        let schema = TypeSchema::object(vec![Field::new("meta", TypeSchema::Null)]);
        let out = emit(&schema);
        assert!(out.contains("import kotlinx.serialization.json.JsonElement\n"), "{out}");
        assert!(out.contains("    val meta: JsonElement?,\n"), "{out}");
    }
}
