//! Single-pass structural inference engine.
//!
//! Values are observed into an evidence tree `U` (at most one arm per scalar
//! kind, object shapes kept apart unless they overlap enough), folded with a
//! join (⊔), and lowered into a [`TypeSchema`] by [`crate::lower`].
//!
//! Design goals:
//! - One walk over the input; no history besides sufficient statistics.
//! - Deterministic: no hashing order, no randomness, no clock. The same input
//!   always yields the same schema.
//! - Widening happens in lowering, so the evidence stays lossless until then.
pub mod num;
pub mod obj;
pub mod str;

use crate::schema::TypeSchema;
use crate::value::Value;

pub use num::NumC;
pub use obj::{FieldC, ObjC};

// ------------------------------- Policy ---------------------------------- //

/// Field-name overlap (Jaccard) at or above which two object shapes merge
/// into one with optional fields instead of becoming separate union arms.
pub const MERGE_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InferencePolicy {
    pub merge_threshold: f64,
    /// Read strings that spell numbers/booleans as those types and treat
    /// empty strings as null. Used for formats without typed scalars (CSV).
    pub coerce_strings: bool,
}

impl Default for InferencePolicy {
    fn default() -> Self {
        Self { merge_threshold: MERGE_THRESHOLD, coerce_strings: false }
    }
}

impl InferencePolicy {
    pub fn coercing() -> Self {
        Self { coerce_strings: true, ..Self::default() }
    }
}

// ------------------------------ State ------------------------------------- //

#[derive(Clone, Debug, Default, PartialEq)]
pub struct U {
    pub nullable: bool,
    pub has_bool: bool,
    pub has_str: bool,
    pub num: Option<NumC>,
    pub arr: Option<Box<U>>,   // element evidence, joined over every element
    pub objs: Vec<ObjC>,       // distinct object shapes, in first-seen order
}

impl U {
    pub fn empty() -> Self { Self::default() }

    pub fn null() -> Self { Self { nullable: true, ..Self::default() } }

    pub fn is_bottom(&self) -> bool {
        !self.nullable && !self.has_bool && !self.has_str
            && self.num.is_none() && self.arr.is_none() && self.objs.is_empty()
    }

    pub fn is_exact_null(&self) -> bool {
        self.nullable && !self.has_bool && !self.has_str
            && self.num.is_none() && self.arr.is_none() && self.objs.is_empty()
    }
}

// ------------------------------ Observe ---------------------------------- //

pub fn observe_value(v: &Value, policy: &InferencePolicy) -> U {
    match v {
        Value::Null => U::null(),
        Value::Bool(_) => U { has_bool: true, ..U::default() },
        Value::Number(n) => U { num: Some(NumC::observe(*n)), ..U::default() },
        Value::String(s) => str::observe_str(s, policy),
        Value::Array(xs) => {
            let mut item = U::empty();
            for el in xs { item = join(&item, &observe_value(el, policy), policy); }
            U { arr: Some(Box::new(item)), ..U::default() }
        }
        Value::Object(m) => U { objs: vec![ObjC::observe(m, policy)], ..U::default() },
    }
}

// -------------------------------- Join (⊔) -------------------------------- //

pub fn join(a: &U, b: &U, policy: &InferencePolicy) -> U {
    let mut out = U::empty();

    out.nullable = a.nullable || b.nullable;
    out.has_bool = a.has_bool || b.has_bool;
    out.has_str = a.has_str || b.has_str;

    out.num = match (&a.num, &b.num) {
        (None, None) => None,
        (Some(x), None) | (None, Some(x)) => Some(x.clone()),
        (Some(x), Some(y)) => Some(NumC::join(x, y)),
    };

    out.arr = match (&a.arr, &b.arr) {
        (None, None) => None,
        (Some(x), None) | (None, Some(x)) => Some(x.clone()),
        (Some(x), Some(y)) => Some(Box::new(join(x, y, policy))),
    };

    out.objs = obj::join_shapes(&a.objs, &b.objs, policy);

    out
}

// ------------------------------- Front API -------------------------------- //

/// Streaming accumulator: observe any number of samples, then solve.
pub struct Inference { state: U, policy: InferencePolicy }

impl Default for Inference {
    fn default() -> Self { Self::new() }
}

impl Inference {
    pub fn new() -> Self { Self::with_policy(InferencePolicy::default()) }

    pub fn with_policy(policy: InferencePolicy) -> Self { Self { state: U::empty(), policy } }

    pub fn observe_value(&mut self, v: &Value) {
        let obs = observe_value(v, &self.policy);
        self.state = join(&self.state, &obs, &self.policy);
    }

    pub fn state(&self) -> &U { &self.state }

    pub fn solve(&self) -> TypeSchema {
        let schema = crate::lower::lower_to_schema(&self.state);
        tracing::debug!(root = schema.kind_name(), "inference solved");
        schema
    }
}

pub fn infer_schema(v: &Value) -> TypeSchema {
    infer_schema_with(v, &InferencePolicy::default())
}

pub fn infer_schema_with(v: &Value, policy: &InferencePolicy) -> TypeSchema {
    let mut inf = Inference::with_policy(*policy);
    inf.observe_value(v);
    inf.solve()
}

/// Each value is one sample of the same position (e.g. one file per document).
pub fn infer_from_values<'a, I>(values: I, policy: &InferencePolicy) -> TypeSchema
where
    I: IntoIterator<Item = &'a Value>
{
    let mut inf = Inference::with_policy(*policy);
    for v in values { inf.observe_value(v); }
    inf.solve()
}

// ------------------------------- Tests ------------------------------------ //
