//! Schema → random instance.
//!
//! Works directly on [`TypeSchema`]; the only state is the caller's RNG, so a
//! fixed seed reproduces the same sample.

use chrono::{DateTime, SecondsFormat};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use regex_syntax::hir::{Class, Hir, HirKind};

use crate::schema::TypeSchema;
use crate::value::{Map, Value};

const WORDS: &[&str] = &[
    "lorem", "ipsum", "dolor", "sit", "amet", "consectetur", "adipiscing", "elit", "sed", "do",
    "eiusmod", "tempor", "incididunt", "labore", "magna", "aliqua",
];

/// Extra repetitions allowed past the minimum for unbounded quantifiers (`*`, `+`, `{n,}`).
const UNBOUNDED_EXTRA: u32 = 3;

/// Span used for numbers whose schema states no bounds.
const DEFAULT_SPAN: i64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleOptions {
    /// Chance that an optional field is included.
    pub optional_probability: f64,
    /// Chance that a nullable value is `null`.
    pub null_probability: f64,
    pub min_items: u32,
    pub max_items: u32,
}

impl Default for SampleOptions {
    fn default() -> Self {
        Self { optional_probability: 0.5, null_probability: 0.2, min_items: 1, max_items: 3 }
    }
}

pub fn generate_sample(schema: &TypeSchema) -> Value {
    generate_sample_with(schema, &mut StdRng::from_entropy(), &SampleOptions::default())
}

pub fn generate_sample_seeded(schema: &TypeSchema, seed: u64) -> Value {
    generate_sample_with(schema, &mut StdRng::seed_from_u64(seed), &SampleOptions::default())
}

pub fn generate_sample_with<R: Rng + ?Sized>(schema: &TypeSchema, rng: &mut R, opts: &SampleOptions) -> Value {
    match schema {
        TypeSchema::Null => Value::Null,
        TypeSchema::Boolean => Value::Bool(rng.gen_bool(0.5)),
        TypeSchema::Integer { min, max } => {
            let (lo, hi) = int_bounds(*min, *max);
            Value::Number(rng.gen_range(lo..=hi) as f64)
        }
        TypeSchema::Float { min, max } => Value::Number(float_in(rng, *min, *max)),
        TypeSchema::String { enum_values, pattern, format } => {
            Value::String(string_sample(rng, enum_values, pattern.as_deref(), format.as_deref()))
        }
        TypeSchema::Array { item, min_items, max_items } => {
            let lo = min_items.unwrap_or(opts.min_items);
            let hi = max_items.unwrap_or(opts.max_items.max(lo)).max(lo);
            let count = rng.gen_range(lo..=hi);
            Value::Array((0..count).map(|_| generate_sample_with(item, rng, opts)).collect())
        }
        TypeSchema::Object { fields } => {
            let mut map = Map::new();
            for f in fields {
                if f.optional && !rng.gen_bool(opts.optional_probability.clamp(0.0, 1.0)) {
                    continue;
                }
                map.insert(f.name.clone(), generate_sample_with(&f.ty, rng, opts));
            }
            Value::Object(map)
        }
        TypeSchema::Union(arms) => match arms.len() {
            0 => Value::Null,
            n => generate_sample_with(&arms[rng.gen_range(0..n)], rng, opts),
        },
        TypeSchema::Enum(values) => values.choose(rng).cloned().unwrap_or(Value::Null),
        TypeSchema::Nullable(inner) => {
            if rng.gen_bool(opts.null_probability.clamp(0.0, 1.0)) {
                Value::Null
            } else {
                generate_sample_with(inner, rng, opts)
            }
        }
    }
}

fn int_bounds(min: Option<i64>, max: Option<i64>) -> (i64, i64) {
    let (lo, hi) = match (min, max) {
        (Some(lo), Some(hi)) => (lo, hi),
        (Some(lo), None) => (lo, lo.saturating_add(DEFAULT_SPAN)),
        (None, Some(hi)) => (hi.saturating_sub(DEFAULT_SPAN), hi),
        (None, None) => (0, DEFAULT_SPAN),
    };
    (lo, hi.max(lo))
}

fn float_in<R: Rng + ?Sized>(rng: &mut R, min: Option<f64>, max: Option<f64>) -> f64 {
    let span = DEFAULT_SPAN as f64;
    let lo = min.filter(|m| m.is_finite()).unwrap_or_else(|| max.map_or(0.0, |hi| hi - span));
    let hi = max.filter(|m| m.is_finite()).unwrap_or(lo + span).max(lo);
    if lo == hi {
        return lo;
    }
    // interpolate instead of sampling `lo..=hi`, whose width can overflow
    let t: f64 = rng.gen_range(0.0..=1.0);
    let x = lo * (1.0 - t) + hi * t;
    // two decimals reads better; clamp in case rounding leaves the range
    let rounded = (x * 100.0).round() / 100.0;
    if rounded.is_finite() { rounded.clamp(lo, hi) } else { x.clamp(lo, hi) }
}

fn string_sample<R: Rng + ?Sized>(
    rng: &mut R,
    enum_values: &[String],
    pattern: Option<&str>,
    format: Option<&str>,
) -> String {
    if let Some(v) = enum_values.choose(rng) {
        return v.clone();
    }
    if let Some(p) = pattern {
        match regex_syntax::Parser::new().parse(p) {
            Ok(hir) => {
                let mut out = String::new();
                from_hir(rng, &hir, &mut out);
                return out;
            }
            Err(err) => tracing::warn!(pattern = p, %err, "unusable pattern, ignoring it"),
        }
    }
    match format {
        Some(f) => formatted(rng, f),
        None => word(rng).to_string(),
    }
}

fn word<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    WORDS.choose(rng).copied().unwrap_or("lorem")
}

fn formatted<R: Rng + ?Sized>(rng: &mut R, format: &str) -> String {
    // 2000-01-01 .. 2030-01-01
    let secs = rng.gen_range(946_684_800_i64..1_893_456_000);
    let stamp = DateTime::from_timestamp(secs, 0);
    match format {
        "date-time" => stamp.map(|d| d.to_rfc3339_opts(SecondsFormat::Secs, true)).unwrap_or_default(),
        "date" => stamp.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default(),
        "time" => stamp.map(|d| d.format("%H:%M:%S").to_string()).unwrap_or_default(),
        "email" => format!("{}.{}@example.com", word(rng), word(rng)),
        "uri" | "url" => format!("https://example.com/{}", word(rng)),
        "hostname" => format!("{}.example.com", word(rng)),
        "ipv4" => format!(
            "{}.{}.{}.{}",
            rng.gen_range(1..=254),
            rng.gen_range(0..=255),
            rng.gen_range(0..=255),
            rng.gen_range(1..=254)
        ),
        "uuid" => uuid_v4(rng),
        _ => word(rng).to_string(),
    }
}

fn uuid_v4<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut b: [u8; 16] = rng.r#gen();
    b[6] = (b[6] & 0x0f) | 0x40;
    b[8] = (b[8] & 0x3f) | 0x80;
    let hex: String = b.iter().map(|x| format!("{x:02x}")).collect();
    format!("{}-{}-{}-{}-{}", &hex[0..8], &hex[8..12], &hex[12..16], &hex[16..20], &hex[20..32])
}

/// Append one string matched by `hir`. Look-arounds (anchors, word
/// boundaries) produce nothing.
fn from_hir<R: Rng + ?Sized>(rng: &mut R, hir: &Hir, out: &mut String) {
    match hir.kind() {
        HirKind::Empty | HirKind::Look(_) => {}
        HirKind::Literal(lit) => out.push_str(&String::from_utf8_lossy(&lit.0)),
        HirKind::Class(Class::Unicode(cls)) => {
            let ranges: Vec<(u32, u32)> = cls.ranges().iter().map(|r| (r.start() as u32, r.end() as u32)).collect();
            if let Some(c) = pick_char(rng, &ranges) {
                out.push(c);
            }
        }
        HirKind::Class(Class::Bytes(cls)) => {
            let ranges: Vec<(u32, u32)> = cls.ranges().iter().map(|r| (r.start() as u32, r.end() as u32)).collect();
            if let Some(c) = pick_char(rng, &ranges) {
                out.push(c);
            }
        }
        HirKind::Repetition(rep) => {
            let max = rep.max.unwrap_or(rep.min.saturating_add(UNBOUNDED_EXTRA));
            let count = rng.gen_range(rep.min..=max.max(rep.min));
            for _ in 0..count {
                from_hir(rng, &rep.sub, out);
            }
        }
        HirKind::Capture(cap) => from_hir(rng, &cap.sub, out),
        HirKind::Concat(parts) => {
            for part in parts {
                from_hir(rng, part, out);
            }
        }
        HirKind::Alternation(alts) => {
            if let Some(alt) = alts.choose(rng) {
                from_hir(rng, alt, out);
            }
        }
    }
}

/// Random char from inclusive code point ranges, preferring printable ASCII.
fn pick_char<R: Rng + ?Sized>(rng: &mut R, ranges: &[(u32, u32)]) -> Option<char> {
    let printable: Vec<(u32, u32)> = ranges
        .iter()
        .filter_map(|&(lo, hi)| {
            let (lo, hi) = (lo.max(0x20), hi.min(0x7e));
            (lo <= hi).then_some((lo, hi))
        })
        .collect();
    let pool = if printable.is_empty() { ranges } else { &printable[..] };
    let &(lo, hi) = pool.choose(rng)?;
    char::from_u32(rng.gen_range(lo..=hi)).or_else(|| char::from_u32(lo))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Field;
    use crate::validate::validate;
    use regex::Regex;

    fn string_with(pattern: Option<&str>, format: Option<&str>) -> TypeSchema {
        TypeSchema::String { enum_values: vec![], pattern: pattern.map(Into::into), format: format.map(Into::into) }
    }

    #[test]
    fn seeded_samples_repeat() {
        let schema = TypeSchema::object(vec![
            Field::new("id", TypeSchema::integer()),
            Field::new("tags", TypeSchema::array(TypeSchema::string())).optional(),
            Field::new("score", TypeSchema::nullable(TypeSchema::float())),
        ]);
        assert_eq!(generate_sample_seeded(&schema, 7), generate_sample_seeded(&schema, 7));
    }

    #[test]
    fn required_fields_always_present() {
        let schema = TypeSchema::object(vec![
            Field::new("a", TypeSchema::Boolean),
            Field::new("b", TypeSchema::string()).optional(),
        ]);
        for seed in 0..50 {
            let v = generate_sample_seeded(&schema, seed);
            assert!(v.as_object().unwrap().contains_key("a"));
        }
    }

    #[test]
    fn numbers_respect_bounds() {
        let int = TypeSchema::Integer { min: Some(-3), max: Some(3) };
        let float = TypeSchema::Float { min: Some(0.5), max: Some(0.75) };
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..200 {
            let Value::Number(i) = generate_sample_with(&int, &mut rng, &SampleOptions::default()) else { panic!() };
            assert!((-3.0..=3.0).contains(&i) && i.fract() == 0.0);
            let Value::Number(f) = generate_sample_with(&float, &mut rng, &SampleOptions::default()) else { panic!() };
            assert!((0.5..=0.75).contains(&f));
        }
    }

    #[test]
    fn strings_follow_patterns_and_formats() {
        let mut rng = StdRng::seed_from_u64(3);
        let opts = SampleOptions::default();
        let sku = Regex::new(r"^[A-Z]{3}-\d{2,4}(x|y)?$").unwrap();
        let uuid = Regex::new(r"^[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$").unwrap();
        for _ in 0..50 {
            let Value::String(s) = generate_sample_with(&string_with(Some(r"^[A-Z]{3}-\d{2,4}(x|y)?$"), None), &mut rng, &opts) else { panic!() };
            assert!(sku.is_match(&s), "{s}");
            let Value::String(s) = generate_sample_with(&string_with(None, Some("uuid")), &mut rng, &opts) else { panic!() };
            assert!(uuid.is_match(&s), "{s}");
            let Value::String(s) = generate_sample_with(&string_with(None, Some("date")), &mut rng, &opts) else { panic!() };
            assert!(chrono::NaiveDate::parse_from_str(&s, "%Y-%m-%d").is_ok(), "{s}");
            let Value::String(s) = generate_sample_with(&string_with(None, Some("date-time")), &mut rng, &opts) else { panic!() };
            assert!(DateTime::parse_from_rfc3339(&s).is_ok(), "{s}");
        }
    }

    #[test]
    fn enum_values_are_chosen_from() {
        let schema = TypeSchema::String { enum_values: vec!["red".into(), "green".into()], pattern: None, format: None };
        for seed in 0..20 {
            let v = generate_sample_seeded(&schema, seed);
            assert!(matches!(v.as_str(), Some("red" | "green")));
        }
    }

    #[test]
    fn extreme_bounds_stay_finite() {
        let float = TypeSchema::Float { min: Some(-1e308), max: Some(1e308) };
        let near_max = TypeSchema::Float { min: Some(f64::MAX / 2.0), max: None };
        let int = TypeSchema::Integer { min: Some(i64::MIN), max: Some(i64::MAX) };
        for seed in 0..100 {
            for schema in [&float, &near_max, &int] {
                let v = generate_sample_seeded(schema, seed);
                assert!(matches!(v, Value::Number(n) if n.is_finite()), "{v:?}");
                assert_eq!(validate(&v, schema), Ok(()));
            }
        }
    }

    #[test]
    fn mixed_enums_pick_members() {
        let members: Vec<Value> = vec![Value::Number(7.0), Value::String("seven".into()), Value::Null];
        let schema = TypeSchema::Enum(members.clone());
        let mut seen = Vec::new();
        for seed in 0..50 {
            let v = generate_sample_seeded(&schema, seed);
            assert!(members.contains(&v), "{v:?}");
            if !seen.contains(&v) {
                seen.push(v);
            }
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn array_lengths_stay_small() {
        let schema = TypeSchema::array(TypeSchema::integer());
        for seed in 0..50 {
            let n = generate_sample_seeded(&schema, seed).as_array().unwrap().len();
            assert!((1..=3).contains(&n));
        }
    }

    #[test]
    fn samples_validate() {
        let schema = TypeSchema::array(TypeSchema::Union(vec![
            TypeSchema::object(vec![
                Field::new("id", TypeSchema::integer()),
                Field::new("email", string_with(None, Some("email"))).optional(),
                Field::new("meta", TypeSchema::nullable(TypeSchema::object(vec![Field::new("k", TypeSchema::Boolean)]))),
            ]),
            TypeSchema::string(),
        ]));
        for seed in 0..100 {
            let v = generate_sample_seeded(&schema, seed);
            assert_eq!(validate(&v, &schema), Ok(()), "{v:?}");
        }
    }
}
