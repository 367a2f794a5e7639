use super::model::{Body, Member, Model, ModelOptions, Shape};
use super::naming::GO_NAMING;
use super::{EmitOptions, TypeEmitter, TypeTarget};
use crate::error::EmitError;
use crate::schema::TypeSchema;

/// Go has no sum types; unions and always-null values fall back to this.
const ANY: &str = "interface{}";

pub struct Go;

impl TypeEmitter for Go {
    fn target(&self) -> TypeTarget {
        TypeTarget::Go
    }

    fn emit(&self, schema: &TypeSchema, opts: &EmitOptions) -> Result<String, EmitError> {
        let model = Model::build(schema, &opts.root_name, ModelOptions::default());
        let mut blocks = vec!["package main\n".to_string()];
        if model.root_is_alias() {
            blocks.push(format!("type {} {}\n", model.root_name, go_type(&model, &model.root, false)));
        }
        for decl in &model.decls {
            blocks.push(match &decl.body {
                Body::Struct(members) => structure(&model, &decl.name, members),
                Body::Union(_) => format!("type {} {ANY}\n", decl.name),
            });
        }
        Ok(blocks.join("\n"))
    }
}

/// Struct with gofmt-style column alignment of names, types and tags.
fn structure(model: &Model, name: &str, members: &[Member]) -> String {
    let idents = GO_NAMING.field_names(members.iter().map(|m| m.key.as_str()));
    let rows: Vec<(String, String, String)> = members
        .iter()
        .zip(idents)
        .map(|(m, ident)| (ident, go_type(model, &m.shape, m.optional), tag(m)))
        .collect();

    let name_w = rows.iter().map(|r| r.0.len()).max().unwrap_or(0);
    let type_w = rows.iter().map(|r| r.1.len()).max().unwrap_or(0);

    let mut out = format!("type {name} struct {{\n");
    for (ident, ty, tag) in rows {
        out.push_str(&format!("\t{ident:<name_w$} {ty:<type_w$} {tag}\n"));
    }
    out.push_str("}\n");
    out
}

fn tag(m: &Member) -> String {
    let key = m.key.replace('\\', "\\\\").replace('"', "\\\"");
    let omit = if m.optional { ",omitempty" } else { "" };
    format!("`json:\"{key}{omit}\"`")
}

fn go_type(model: &Model, shape: &Shape, optional: bool) -> String {
    let ty = match shape {
        Shape::Nullable(inner) => return pointer(go_type(model, inner, false)),
        Shape::Null | Shape::Union(_) => ANY.to_string(),
        Shape::Boolean => "bool".into(),
        Shape::Integer => "int64".into(),
        Shape::Float => "float64".into(),
        Shape::String(_) => "string".into(),
        Shape::Array(item) => format!("[]{}", go_type(model, item, false)),
        Shape::Named(idx) => model.decls[*idx].name.clone(),
    };
    if optional { pointer(ty) } else { ty }
}

/// Slices and interfaces are already nil-able.
fn pointer(ty: String) -> String {
    if ty.starts_with("[]") || ty.starts_with('*') || ty == ANY {
        ty
    } else {
        format!("*{ty}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Field;
    use pretty_assertions::assert_eq;

    fn emit(schema: &TypeSchema) -> String {
        Go.emit(schema, &EmitOptions::default()).unwrap()
    }

    #[test]
    fn aligned_struct_with_tags() {
        let schema = TypeSchema::object(vec![
            Field::new("id", TypeSchema::integer()),
            Field::new("display_name", TypeSchema::nullable(TypeSchema::string())),
            Field::new("scores", TypeSchema::array(TypeSchema::float())).optional(),
            Field::new("flag", TypeSchema::Boolean).optional(),
        ]);
        let expected = "\
package main

type Root struct {
\tId          int64     `json:\"id\"`
\tDisplayName *string   `json:\"display_name\"`
\tScores      []float64 `json:\"scores,omitempty\"`
\tFlag        *bool     `json:\"flag,omitempty\"`
}
";
        assert_eq!(emit(&schema), expected);
    }

    #[test]
    fn unions_fall_back_to_interface() {
        let schema = TypeSchema::object(vec![
            Field::new("value", TypeSchema::Union(vec![TypeSchema::integer(), TypeSchema::Boolean])),
            Field::new("owner", TypeSchema::nullable(TypeSchema::object(vec![]))),
        ]);
        let expected = "\
package main

type Root struct {
\tValue interface{} `json:\"value\"`
\tOwner *Owner      `json:\"owner\"`
}

type Owner struct {
}
";
        assert_eq!(emit(&schema), expected);
    }

    #[test]
    fn array_root_is_a_named_slice() {
        let schema = TypeSchema::array(TypeSchema::object(vec![Field::new("sku", TypeSchema::string())]));
        let out = emit(&schema);
        assert!(out.contains("type Root []RootItem\n"), "{out}");
        assert!(out.contains("type RootItem struct {\n\tSku string `json:\"sku\"`\n}\n"), "{out}");
    }
}
