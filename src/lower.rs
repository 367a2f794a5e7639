use crate::inference::U;
use crate::schema::{Field, TypeSchema};

/// Lower the evidence tree into a schema, applying the widening rules:
/// - `Integer ⊔ Float = Float`
/// - string absorbs the other scalar kinds
/// - null folds into `Nullable(T)` instead of becoming a union arm
pub fn lower_to_schema(u: &U) -> TypeSchema {
    if u.is_bottom() || u.is_exact_null() {
        // exactly null (or nothing observed, e.g. items of `[]`) → Null
        return TypeSchema::Null;
    }
    let base = lower_core(u);
    if u.nullable { TypeSchema::nullable(base) } else { base }
}

fn lower_core(u: &U) -> TypeSchema {
    let mut arms: Vec<TypeSchema> = Vec::new();

    // 1) Arrays first
    if let Some(item) = &u.arr {
        arms.push(TypeSchema::array(lower_to_schema(item)));
    }

    // 2) Objects next, one arm per distinct shape
    for obj in &u.objs {
        let fields = obj.fields.iter().map(|(k, f)| Field {
            name: k.clone(),
            ty: lower_to_schema(&f.ty),
            optional: f.present_in < obj.seen_objects,
        }).collect();
        arms.push(TypeSchema::Object { fields });
    }

    // 3) Scalars; a string anywhere widens the whole scalar group
    if u.has_str {
        arms.push(TypeSchema::string());
    } else {
        if let Some(num) = &u.num {
            arms.push(if num.is_integer() { TypeSchema::integer() } else { TypeSchema::float() });
        }
        if u.has_bool {
            arms.push(TypeSchema::Boolean);
        }
    }

    match arms.len() {
        0 => TypeSchema::Null,
        1 => arms.remove(0),
        _ => TypeSchema::Union(arms),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::{InferencePolicy, join, observe_value};
    use crate::value::Value;
    use serde_json::json;

    fn u(j: serde_json::Value) -> U {
        observe_value(&Value::from(j), &InferencePolicy::default())
    }

    #[test]
    fn null_folds_into_nullable() {
        let p = InferencePolicy::default();
        let joined = join(&u(json!("a")), &u(json!(null)), &p);
        assert_eq!(lower_to_schema(&joined), TypeSchema::nullable(TypeSchema::string()));
        assert_eq!(lower_to_schema(&u(json!(null))), TypeSchema::Null);
    }

    #[test]
    fn mixed_containers_form_unions() {
        let p = InferencePolicy::default();
        let joined = join(&join(&u(json!([1])), &u(json!({"a": 1})), &p), &u(json!(null)), &p);
        assert_eq!(
            lower_to_schema(&joined),
            TypeSchema::nullable(TypeSchema::Union(vec![
                TypeSchema::array(TypeSchema::integer()),
                TypeSchema::object(vec![Field::new("a", TypeSchema::integer())]),
            ]))
        );
    }

    #[test]
    fn string_absorbs_scalars_but_not_containers() {
        let p = InferencePolicy::default();
        let joined = join(&join(&u(json!(true)), &u(json!("x")), &p), &u(json!([])), &p);
        assert_eq!(
            lower_to_schema(&joined),
            TypeSchema::Union(vec![TypeSchema::array(TypeSchema::Null), TypeSchema::string()])
        );
    }
}
