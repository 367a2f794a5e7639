use indexmap::IndexMap;

use super::{InferencePolicy, U, join, observe_value};
use crate::value::Map;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObjC {
    pub fields: IndexMap<String, FieldC>,  // first-seen order
    pub seen_objects: u64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FieldC {
    pub ty: U,
    pub present_in: u64,   // optional = present_in < seen_objects
}

impl ObjC {
    pub(super) fn observe(map: &Map, policy: &InferencePolicy) -> Self {
        let fields = map.iter()
            .map(|(k, v)| (k.clone(), FieldC { ty: observe_value(v, policy), present_in: 1 }))
            .collect();
        ObjC { fields, seen_objects: 1 }
    }

    pub(super) fn join(a: &Self, b: &Self, policy: &InferencePolicy) -> Self {
        let mut out = Self { fields: IndexMap::new(), seen_objects: a.seen_objects + b.seen_objects };

        // keys from a, in a's order
        for (k, fa) in &a.fields {
            let merged = match b.fields.get(k) {
                None => fa.clone(),
                Some(fb) => FieldC {
                    ty: join(&fa.ty, &fb.ty, policy),
                    present_in: fa.present_in + fb.present_in,
                },
            };
            out.fields.insert(k.clone(), merged);
        }
        // then keys only in b
        for (k, fb) in &b.fields {
            if !out.fields.contains_key(k) {
                out.fields.insert(k.clone(), fb.clone());
            }
        }

        out
    }

    /// Jaccard overlap of the two field-name sets; two empty shapes overlap fully.
    pub fn overlap(&self, other: &Self) -> f64 {
        let shared = self.fields.keys().filter(|k| other.fields.contains_key(*k)).count();
        let union = self.fields.len() + other.fields.len() - shared;
        if union == 0 { 1.0 } else { shared as f64 / union as f64 }
    }
}

/// Fold `b`'s shapes into `a`'s: each incoming shape merges into the first
/// existing shape it overlaps enough with, otherwise it becomes its own arm.
pub(super) fn join_shapes(a: &[ObjC], b: &[ObjC], policy: &InferencePolicy) -> Vec<ObjC> {
    let mut out = a.to_vec();
    for shape in b {
        let target = out.iter().position(|existing| existing.overlap(shape) >= policy.merge_threshold);
        match target {
            Some(i) => out[i] = ObjC::join(&out[i], shape, policy),
            None => {
                if !out.is_empty() {
                    tracing::trace!(
                        keys = ?shape.fields.keys().collect::<Vec<_>>(),
                        threshold = policy.merge_threshold,
                        "object shape kept as separate union arm"
                    );
                }
                out.push(shape.clone());
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;
    use serde_json::json;

    fn shape(j: serde_json::Value) -> ObjC {
        let v = Value::from(j);
        ObjC::observe(v.as_object().unwrap(), &InferencePolicy::default())
    }

    #[test]
    fn overlap_is_jaccard() {
        assert_eq!(shape(json!({"a": 1, "b": 2})).overlap(&shape(json!({"a": 3}))), 0.5);
        assert_eq!(shape(json!({"a": 1})).overlap(&shape(json!({"b": 1}))), 0.0);
        assert_eq!(shape(json!({})).overlap(&shape(json!({}))), 1.0);
    }

    #[test]
    fn join_counts_presence() {
        let policy = InferencePolicy::default();
        let joined = ObjC::join(&shape(json!({"a": 1, "b": 2})), &shape(json!({"c": 1, "a": 3})), &policy);
        assert_eq!(joined.seen_objects, 2);
        let presence: Vec<_> = joined.fields.iter().map(|(k, f)| (k.as_str(), f.present_in)).collect();
        assert_eq!(presence, [("a", 2), ("b", 1), ("c", 1)]);
    }

    #[test]
    fn shapes_merge_or_stay_apart() {
        let policy = InferencePolicy::default();
        let arms = join_shapes(&[shape(json!({"a": 1, "b": 2}))], &[shape(json!({"a": 3}))], &policy);
        assert_eq!(arms.len(), 1);
        let arms = join_shapes(&arms, &[shape(json!({"z": 1}))], &policy);
        assert_eq!(arms.len(), 2);
    }
}
