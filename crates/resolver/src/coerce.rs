//! Typed coercion of default-clause literals

use refract_domain::Value;

/// Parses the literal text of a default clause into a typed value.
///
/// The case-sensitive literals `true`, `false`, and `null` map to
/// their typed forms; otherwise an integer parse is attempted, then a
/// float parse, and failing both the text stays a string. This applies
/// only to literal default text, never to values obtained by resolving
/// a reference path.
#[must_use]
pub fn coerce_literal(text: &str) -> Value {
    match text {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        "null" => Value::Null,
        _ => {
            if let Ok(int) = text.parse::<i64>() {
                Value::Int(int)
            } else if let Ok(float) = text.parse::<f64>() {
                Value::from(float)
            } else {
                Value::String(text.to_string())
            }
        }
    }
}
