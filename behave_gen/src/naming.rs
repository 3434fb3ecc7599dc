//! Rust identifiers for API model names

use proc_macro2::{Ident, Span};

const KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "dyn", "else", "enum", "extern",
    "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut",
    "pub", "ref", "return", "static", "struct", "trait", "true", "type", "unsafe", "use",
    "where", "while", "abstract", "become", "box", "do", "final", "gen", "macro", "override",
    "priv", "try", "typeof", "unsized", "virtual", "yield",
];

/// Convert a PascalCase or camelCase model name to snake_case.
///
/// Runs of capitals are kept together: `SSEKMSKeyId` becomes `ssekms_key_id`.
pub fn to_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if !c.is_ascii_alphanumeric() {
            if !result.ends_with('_') {
                result.push('_');
            }
            continue;
        }
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let boundary = prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_lower);
            if boundary && !result.ends_with('_') {
                result.push('_');
            }
        }
        result.extend(c.to_lowercase());
    }
    result.trim_matches('_').to_string()
}

/// A field or function identifier, escaped when it collides with a keyword
pub fn field_ident(name: &str) -> Ident {
    let mut snake = to_snake_case(name);
    if snake.is_empty() || snake.starts_with(|c: char| c.is_ascii_digit()) {
        snake.insert(0, '_');
    }
    match snake.as_str() {
        "self" | "super" | "crate" | "extern" => {
            Ident::new(&format!("{snake}_"), Span::call_site())
        }
        s if KEYWORDS.contains(&s) => Ident::new_raw(s, Span::call_site()),
        s => Ident::new(s, Span::call_site()),
    }
}

/// A type identifier for a shape name
pub fn type_ident(name: &str) -> Ident {
    let mut cleaned: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    if cleaned.is_empty() || cleaned.starts_with(|c: char| c.is_ascii_digit()) {
        cleaned.insert(0, '_');
    }
    if cleaned == "Self" {
        cleaned.push('_');
    }
    Ident::new(&cleaned, Span::call_site())
}

/// The client method building a request for an operation
pub fn request_method_ident(operation: &str) -> Ident {
    Ident::new(&format!("{}_request", to_snake_case(operation)), Span::call_site())
}
