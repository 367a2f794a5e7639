use super::{InferencePolicy, NumC, U};
use crate::value::looks_like_number;

// ------- String observation (coercion policy for untyped formats) -------

pub fn observe_str(s: &str, policy: &InferencePolicy) -> U {
    if !policy.coerce_strings {
        return U { has_str: true, ..U::default() };
    }
    let t = s.trim();
    if t.is_empty() || t.eq_ignore_ascii_case("null") {
        return U::null();
    }
    if looks_like_bool(t) {
        return U { has_bool: true, ..U::default() };
    }
    if looks_like_number(t) {
        if let Ok(n) = t.parse::<f64>() {
            return U { num: Some(NumC::observe(n)), ..U::default() };
        }
    }
    U { has_str: true, ..U::default() }
}

pub fn looks_like_bool(s: &str) -> bool {
    s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("false")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_policy_keeps_strings() {
        let u = observe_str("42", &InferencePolicy::default());
        assert!(u.has_str && u.num.is_none());
    }

    #[test]
    fn coercing_policy_types_cells() {
        let p = InferencePolicy::coercing();
        assert!(observe_str(" 42 ", &p).num.as_ref().is_some_and(NumC::is_integer));
        assert!(observe_str("4.2", &p).num.as_ref().is_some_and(|n| !n.is_integer()));
        assert!(observe_str("TRUE", &p).has_bool);
        assert!(observe_str("", &p).is_exact_null());
        assert!(observe_str("NULL", &p).is_exact_null());
        assert!(observe_str("007", &p).has_str);
        assert!(observe_str("12 apples", &p).has_str);
    }
}
