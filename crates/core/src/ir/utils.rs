//! Lexical helpers for generated TypeScript.

use serde_json::Value;

/// Words that can never be a generated binding name.
///
/// Keywords plus the built-in type names, so `string` or `number` components
/// do not shadow the primitives in type positions.
pub const RESERVED_WORDS: &[&str] = &[
    "any", "async", "await", "boolean", "break", "case", "catch", "class", "const", "continue",
    "debugger", "default", "delete", "do", "else", "enum", "export", "extends", "false",
    "finally", "for", "function", "if", "implements", "import", "in", "instanceof", "interface",
    "let", "never", "new", "null", "number", "object", "package", "private", "protected",
    "public", "return", "static", "string", "super", "switch", "symbol", "this", "throw", "true",
    "try", "typeof", "undefined", "unknown", "var", "void", "while", "with", "yield",
];

/// `[A-Za-z_$][A-Za-z0-9_$]*`
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Double-quoted string literal.
pub fn js_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// `3`, not `3.0`.
pub fn js_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// A JSON value as a JavaScript literal, with bare keys where they are identifiers.
pub fn js_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => js_string(s),
        Value::Array(items) => {
            let items = items.iter().map(js_value).collect::<Vec<_>>().join(", ");
            format!("[{items}]")
        }
        Value::Object(map) if map.is_empty() => "{}".to_string(),
        Value::Object(map) => {
            let entries = map
                .iter()
                .map(|(k, v)| format!("{}: {}", quote_if_needed(k), js_value(v)))
                .collect::<Vec<_>>()
                .join(", ");
            format!("{{ {entries} }}")
        }
    }
}

/// Object key: bare when it is an identifier, quoted otherwise.
pub fn quote_if_needed(name: &str) -> String {
    if is_identifier(name) {
        name.to_string()
    } else {
        js_string(name)
    }
}

/// `params.foo`, `params?.foo`, `params["x-id"]` or `params?.["x-id"]`.
pub fn format_param_access(obj: &str, prop: &str, required: bool) -> String {
    let chain = if required { "" } else { "?." };
    if is_identifier(prop) {
        let dot = if required { "." } else { "" };
        format!("{obj}{chain}{dot}{prop}")
    } else {
        format!("{obj}{chain}[{}]", js_string(prop))
    }
}

/// `pets` -> `Pets`
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    chars
        .next()
        .map(|first| first.to_uppercase().chain(chars).collect())
        .unwrap_or_default()
}

/// `ListPets` -> `listPets`
pub fn lowercase_first(s: &str) -> String {
    let mut chars = s.chars();
    chars
        .next()
        .map(|first| first.to_lowercase().chain(chars).collect())
        .unwrap_or_default()
}
