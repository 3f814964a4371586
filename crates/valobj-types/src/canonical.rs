//! Canonical form of plain values.
//!
//! Mapping keys are sorted recursively at every depth; sequence order is
//! significant and kept. Two mappings holding the same entries in different
//! insertion order therefore share one canonical form.
//!
//! Numbers are compared by value, not by encoding: `3`, `3.0` and `-0.0`
//! versus `0` are the same number, so integral floats are rewritten as
//! integers everywhere a plain value is canonicalized.

use serde_json::{Map, Number, Value};

/// Rewrite every integral float inside `value` as an integer, in place.
///
/// Floats outside the `i64`/`u64` range keep their float form. Key order is
/// untouched.
pub fn normalize_numbers(value: &mut Value) {
    match value {
        Value::Number(n) => {
            if let Some(int) = integral(n) {
                *n = int;
            }
        }
        Value::Array(items) => items.iter_mut().for_each(normalize_numbers),
        Value::Object(map) => map.values_mut().for_each(normalize_numbers),
        _ => {}
    }
}

/// The integer equal to `n`, if `n` is a float with no fractional part.
fn integral(n: &Number) -> Option<Number> {
    if !n.is_f64() {
        return None;
    }
    let f = n.as_f64()?;
    if !f.is_finite() || f.fract() != 0.0 {
        return None;
    }
    // 2^63 and 2^64 are exact in f64; both bounds are exclusive.
    if f >= -9_223_372_036_854_775_808.0 && f < 9_223_372_036_854_775_808.0 {
        Some(Number::from(f as i64))
    } else if f > 0.0 && f < 18_446_744_073_709_551_616.0 {
        Some(Number::from(f as u64))
    } else {
        None
    }
}

/// Return a copy of `value` with every mapping's keys sorted and every
/// integral float written as an integer.
pub fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));
            let mut sorted = Map::with_capacity(entries.len());
            for (key, item) in entries {
                sorted.insert(key.clone(), canonicalize(item));
            }
            Value::Object(sorted)
        }
        Value::Number(n) => integral(n).map_or_else(|| value.clone(), Value::Number),
        scalar => scalar.clone(),
    }
}

/// Compact JSON text of the canonical form.
pub fn canonical_json(value: &Value) -> String {
    canonicalize(value).to_string()
}
