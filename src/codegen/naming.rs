//! Identifier conventions shared by the type emitters.

use std::collections::HashSet;

/// Split a raw key into words on separators and case boundaries
/// (`userId`, `user_id`, `user-id` and `USER_ID` all give `user`, `id`;
/// `HTTPServer` gives `HTTP`, `Server`).
pub fn words(s: &str) -> Vec<String> {
    let chars: Vec<char> = s.chars().collect();
    let mut out = Vec::new();
    let mut cur = String::new();
    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            if !cur.is_empty() {
                out.push(std::mem::take(&mut cur));
            }
            continue;
        }
        if let (Some(&prev), false) = (i.checked_sub(1).and_then(|j| chars.get(j)), cur.is_empty()) {
            let next = chars.get(i + 1).copied();
            let boundary = c.is_uppercase()
                && (prev.is_lowercase()
                    || prev.is_ascii_digit()
                    || (prev.is_uppercase() && next.is_some_and(char::is_lowercase)));
            if boundary {
                out.push(std::mem::take(&mut cur));
            }
        }
        cur.push(c);
    }
    if !cur.is_empty() {
        out.push(cur);
    }
    out
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        None => String::new(),
        Some(c) => c.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
    }
}

/// `shipping_address` → `ShippingAddress`
pub fn to_pascal_case(s: &str) -> String {
    words(s).iter().map(|w| capitalize(w)).collect()
}

/// `shippingAddress` → `shipping_address`
pub fn to_snake_case(s: &str) -> String {
    words(s).iter().map(|w| w.to_lowercase()).collect::<Vec<_>>().join("_")
}

/// `shipping_address` → `shippingAddress`
pub fn to_camel_case(s: &str) -> String {
    words(s)
        .iter()
        .enumerate()
        .map(|(i, w)| if i == 0 { w.to_lowercase() } else { capitalize(w) })
        .collect()
}

/// Naive English singular of a PascalCase name, used to name array elements.
pub fn singularize(name: &str) -> String {
    let lower = name.to_ascii_lowercase();
    if lower.len() > 3 && lower.ends_with("ies") {
        format!("{}y", &name[..name.len() - 3])
    } else if lower.len() > 1 && lower.ends_with('s') && !lower.ends_with("ss") && !lower.ends_with("us") {
        name[..name.len() - 1].to_string()
    } else {
        format!("{name}Item")
    }
}

/// PascalCase type name that is never empty and never starts with a digit.
pub fn type_name(raw: &str) -> String {
    let name = to_pascal_case(raw);
    match name.chars().next() {
        None => "Type".to_string(),
        Some(c) if c.is_ascii_digit() => format!("T{name}"),
        Some(_) => name,
    }
}

/// Per-language rules for turning a data key into a field identifier.
#[derive(Debug, Clone, Copy)]
pub struct NamingConvention {
    pub field_to_name: fn(&str) -> String,
    pub reserved_words: &'static [&'static str],
    pub escape_reserved: fn(&str) -> String,
    /// Prefix for identifiers that would otherwise start with a digit or be empty.
    pub fallback_prefix: &'static str,
}

impl NamingConvention {
    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved_words.contains(&name)
    }

    pub fn field_name(&self, key: &str) -> String {
        let name = (self.field_to_name)(key);
        match name.chars().next() {
            None => format!("{}field", self.fallback_prefix),
            Some(c) if c.is_ascii_digit() => format!("{}{name}", self.fallback_prefix),
            Some(_) if self.is_reserved(&name) => (self.escape_reserved)(&name),
            Some(_) => name,
        }
    }

    /// Field identifiers for one struct, with clashes suffixed (`id`, `id2`).
    pub fn field_names<'a>(&self, keys: impl IntoIterator<Item = &'a str>) -> Vec<String> {
        let mut seen = HashSet::new();
        keys.into_iter()
            .map(|k| {
                let base = self.field_name(k);
                let mut name = base.clone();
                let mut n = 2;
                while !seen.insert(name.clone()) {
                    name = format!("{base}{n}");
                    n += 1;
                }
                name
            })
            .collect()
    }
}

fn escape_rust_reserved(name: &str) -> String {
    match name {
        // not allowed as raw identifiers
        "self" | "Self" | "super" | "crate" => format!("{name}_"),
        _ => format!("r#{name}"),
    }
}

fn escape_with_backticks(name: &str) -> String {
    format!("`{name}`")
}

fn no_escape(name: &str) -> String {
    name.to_string()
}

pub const RUST_NAMING: NamingConvention = NamingConvention {
    field_to_name: to_snake_case,
    reserved_words: &[
        "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
        "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move",
        "mut", "pub", "ref", "return", "self", "Self", "static", "struct", "super", "trait",
        "true", "type", "unsafe", "use", "where", "while", "abstract", "become", "box", "do",
        "final", "gen", "macro", "override", "priv", "try", "typeof", "unsized", "virtual", "yield",
    ],
    escape_reserved: escape_rust_reserved,
    fallback_prefix: "_",
};

pub const KOTLIN_NAMING: NamingConvention = NamingConvention {
    field_to_name: to_camel_case,
    reserved_words: &[
        "as", "break", "class", "continue", "do", "else", "false", "for", "fun", "if", "in",
        "interface", "is", "null", "object", "package", "return", "super", "this", "throw",
        "true", "try", "typealias", "typeof", "val", "var", "when", "while",
    ],
    escape_reserved: escape_with_backticks,
    fallback_prefix: "_",
};

/// Exported Go identifiers are PascalCase, so no keyword can collide.
pub const GO_NAMING: NamingConvention = NamingConvention {
    field_to_name: to_pascal_case,
    reserved_words: &[],
    escape_reserved: no_escape,
    fallback_prefix: "F",
};
