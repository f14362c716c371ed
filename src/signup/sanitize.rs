//! Field sanitizer for raw user-supplied values.

use serde_json::Value;

/// Default content of the phone field: the country prefix and a space.
pub const PHONE_PREFIX: &str = "+92 ";

/// Coerce an untyped form value to a trimmed string without `<` or `>`.
///
/// Total: null becomes empty, scalars use their textual form, arrays are
/// joined with commas, objects become `[object Object]`.
pub fn sanitize(value: &Value) -> String {
    sanitize_str(&coerce_text(value))
}

/// Sanitize a value that is already a string.
pub fn sanitize_str(value: &str) -> String {
    value.trim().replace(['<', '>'], "")
}

/// Sanitize an optional field looked up from a form object.
pub fn sanitize_field(form: &Value, field: &str) -> String {
    form.get(field).map(sanitize).unwrap_or_default()
}

/// Remove every whitespace character.
pub fn strip_whitespace(value: &str) -> String {
    value.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Format a partially typed mobile number as `+92 NNN NNNNNNN`.
///
/// Non-digits are dropped, a leading `92` is treated as the prefix, and at
/// most ten local digits are kept.
pub fn format_phone_display(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    let local = digits.strip_prefix("92").unwrap_or(&digits);
    let local: String = local.chars().take(10).collect();

    if local.len() <= 3 {
        format!("{PHONE_PREFIX}{local}")
    } else {
        format!("{PHONE_PREFIX}{} {}", &local[..3], &local[3..])
    }
}

/// Textual form of an untyped value, without trimming or stripping.
pub fn coerce_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items.iter().map(coerce_text).collect::<Vec<_>>().join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}
