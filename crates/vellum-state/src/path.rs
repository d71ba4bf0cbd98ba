//! Dot-separated path handling.
//!
//! Paths address locations in the state tree from the root; the empty path
//! addresses the root itself. A non-empty path that parses as a number is a
//! numeric literal, not an address.

use serde_json::Number;

/// Numeric-literal detection: the whole path parses as a number.
///
/// Integer-valued literals come back as integers (`"3"` → `3`, not `3.0`).
/// Non-finite parses (`"inf"`, `"NaN"`) are not literals.
#[must_use]
pub fn literal(path: &str) -> Option<Number> {
    if path.is_empty() {
        return None;
    }
    if let Ok(int) = path.parse::<i64>() {
        return Some(Number::from(int));
    }
    match path.parse::<f64>() {
        Ok(float) if float.is_finite() => Number::from_f64(float),
        _ => None,
    }
}

/// The path's segments. The empty path has no segments; empty segments
/// (stray dots) are skipped.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('.').filter(|seg| !seg.is_empty())
}

/// All but the last segment, for write targeting. `base("a.b.c")` is
/// `"a.b"`; a single-segment path has the root (`""`) as its base.
#[must_use]
pub fn base(path: &str) -> &str {
    match path.rfind('.') {
        Some(dot) => &path[..dot],
        None => "",
    }
}

/// The last segment. `key("a.b.c")` is `"c"`.
#[must_use]
pub fn key(path: &str) -> &str {
    match path.rfind('.') {
        Some(dot) => &path[dot + 1..],
        None => path,
    }
}

/// Segment-wise prefix relation in either direction.
///
/// A write at `a` must invalidate bindings that depend on `b` when one path
/// is an ancestor of (or equal to) the other: `user` overlaps `user.name`,
/// but `username` does not overlap `user`. The empty path (the root)
/// overlaps everything.
#[must_use]
pub fn overlaps(a: &str, b: &str) -> bool {
    if a.is_empty() || b.is_empty() {
        return true;
    }
    let mut left = segments(a);
    let mut right = segments(b);
    loop {
        match (left.next(), right.next()) {
            (Some(l), Some(r)) if l == r => {}
            (Some(_), Some(_)) => return false,
            _ => return true,
        }
    }
}
