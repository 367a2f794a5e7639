//! Named declaration model shared by the source-code emitters.
//!
//! The schema is a tree of anonymous shapes; languages need named types.
//! `Model::build` walks the schema once (pre-order, so a parent is declared
//! before its children) and gives every object, and optionally every union,
//! a unique PascalCase name derived from the field that produced it.
//! Identical shapes at different positions are not deduplicated.

use std::collections::HashSet;

use super::naming::{singularize, type_name};
use crate::schema::TypeSchema;

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Null,
    Boolean,
    Integer,
    Float,
    /// Literal values when the schema carries an enum.
    String(Vec<String>),
    Array(Box<Shape>),
    Named(usize),
    Union(Vec<Shape>),
    Nullable(Box<Shape>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub key: String,
    pub shape: Shape,
    pub optional: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Struct(Vec<Member>),
    Union(Vec<Shape>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Decl {
    pub name: String,
    pub body: Body,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ModelOptions {
    /// Give unions their own declaration (languages without inline unions).
    pub named_unions: bool,
    /// Type names the target already uses (`String`, `List`, ...).
    pub reserved: &'static [&'static str],
}

#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    pub root: Shape,
    pub root_name: String,
    pub decls: Vec<Decl>,
}

impl Model {
    pub fn build(schema: &TypeSchema, root_name: &str, opts: ModelOptions) -> Self {
        let mut b = Builder { decls: Vec::new(), used: HashSet::new(), opts };
        let mut root_name = type_name(root_name);
        let root = if b.declares(schema) {
            let root = b.shape(schema, &root_name);
            if let Shape::Named(idx) = &root {
                root_name = b.decls[*idx].name.clone();
            }
            root
        } else {
            // the root becomes an alias, keep its name free
            root_name = b.claim(&root_name);
            b.shape(schema, &root_name)
        };
        Model { root, root_name, decls: b.decls }
    }

    /// True when the root has no declaration of its own and needs an alias.
    pub fn root_is_alias(&self) -> bool {
        !matches!(self.root, Shape::Named(0))
    }

    /// Variant label for a union arm.
    pub fn arm_label(&self, shape: &Shape) -> &'static str {
        match shape {
            Shape::Null => "Null",
            Shape::Boolean => "Bool",
            Shape::Integer => "Integer",
            Shape::Float => "Float",
            Shape::String(_) => "String",
            Shape::Array(_) => "Array",
            Shape::Named(idx) => match self.decls[*idx].body {
                Body::Struct(_) => "Object",
                Body::Union(_) => "Union",
            },
            Shape::Union(_) => "Union",
            Shape::Nullable(inner) => self.arm_label(inner),
        }
    }
}

struct Builder {
    decls: Vec<Decl>,
    used: HashSet<String>,
    opts: ModelOptions,
}

impl Builder {
    fn declares(&self, ty: &TypeSchema) -> bool {
        match ty {
            TypeSchema::Object { .. } => true,
            TypeSchema::Union(_) => self.opts.named_unions,
            TypeSchema::Enum(values) => self.declares(&TypeSchema::enum_base(values)),
            _ => false,
        }
    }

    fn claim(&mut self, base: &str) -> String {
        let mut name = base.to_string();
        let mut n = 2;
        while self.opts.reserved.contains(&name.as_str()) || !self.used.insert(name.clone()) {
            name = format!("{base}{n}");
            n += 1;
        }
        name
    }

    fn reserve(&mut self, hint: &str, body: Body) -> usize {
        let name = self.claim(hint);
        self.decls.push(Decl { name, body });
        self.decls.len() - 1
    }

    fn shape(&mut self, ty: &TypeSchema, hint: &str) -> Shape {
        match ty {
            TypeSchema::Null => Shape::Null,
            TypeSchema::Boolean => Shape::Boolean,
            TypeSchema::Integer { .. } => Shape::Integer,
            TypeSchema::Float { .. } => Shape::Float,
            TypeSchema::String { enum_values, .. } => Shape::String(enum_values.clone()),
            TypeSchema::Array { item, .. } => Shape::Array(Box::new(self.shape(item, &singularize(hint)))),
            TypeSchema::Nullable(inner) => Shape::Nullable(Box::new(self.shape(inner, hint))),
            TypeSchema::Enum(values) => self.shape(&TypeSchema::enum_base(values), hint),
            TypeSchema::Object { fields } => {
                let idx = self.reserve(hint, Body::Struct(Vec::new()));
                let members = fields
                    .iter()
                    .map(|f| Member {
                        key: f.name.clone(),
                        shape: self.shape(&f.ty, &type_name(&f.name)),
                        optional: f.optional,
                    })
                    .collect();
                self.decls[idx].body = Body::Struct(members);
                Shape::Named(idx)
            }
            TypeSchema::Union(arms) if self.opts.named_unions => {
                let idx = self.reserve(hint, Body::Union(Vec::new()));
                let name = self.decls[idx].name.clone();
                let shapes = arms
                    .iter()
                    .map(|arm| self.shape(arm, &format!("{name}{}", arm.kind_name())))
                    .collect();
                self.decls[idx].body = Body::Union(shapes);
                Shape::Named(idx)
            }
            TypeSchema::Union(arms) => Shape::Union(arms.iter().map(|arm| self.shape(arm, hint)).collect()),
        }
    }
}

/// Suffix repeated labels so every entry is distinct (`Object`, `Object2`).
pub fn distinct_labels(labels: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    labels
        .into_iter()
        .map(|base| {
            let mut label = base.clone();
            let mut n = 2;
            while !seen.insert(label.clone()) {
                label = format!("{base}{n}");
                n += 1;
            }
            label
        })
        .collect()
}
