//! Value semantics shared by the evaluator: rendering, truthiness, and the
//! loose equality used by `when:` comparisons.

use serde_json::Value;

/// Render a resolved value for projection into an element.
///
/// `null` (the missing sentinel included) renders as the empty string;
/// strings render unquoted; composites render as compact JSON.
#[must_use]
pub fn render(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        composite => serde_json::to_string(composite).unwrap_or_default(),
    }
}

/// Truthiness for conditional rules: `null`, `false`, `0`, `NaN`, and the
/// empty string are falsy; arrays and objects (even empty ones) are truthy.
///
/// An emptied list collapses to `null` in the store precisely so that it
/// reads falsy here while a present-but-empty list stays truthy.
#[must_use]
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Equality for `when:<path>:<arg>:…` comparisons.
///
/// Strict [`Value`] equality, except that a number on one side coerces a
/// numeric string or boolean on the other (the loose comparison the
/// attribute vocabulary has always promised).
#[must_use]
pub fn loose_eq(a: &Value, b: &Value) -> bool {
    if a == b {
        return true;
    }
    match (a, b) {
        (Value::Number(number), other) | (other, Value::Number(number)) => {
            match (number.as_f64(), coerce(other)) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            }
        }
        _ => false,
    }
}

fn coerce(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        Value::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
        _ => None,
    }
}
