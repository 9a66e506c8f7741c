use crate::{primitive_type::PrimitiveType, schemas::Draft};
use num_cmp::NumCmp;
use serde_json::{Map, Number, Value};
use std::cmp::Ordering;

macro_rules! num_cmp {
    ($left:expr, $right:expr) => {
        if let Some(b) = $right.as_u64() {
            NumCmp::num_cmp($left, b)
        } else if let Some(b) = $right.as_i64() {
            NumCmp::num_cmp($left, b)
        } else {
            $right.as_f64().and_then(|b| NumCmp::num_cmp($left, b))
        }
    };
}

/// Compare two JSON numbers without losing precision on large integers.
#[inline]
pub(crate) fn compare(left: &Number, right: &Number) -> Option<Ordering> {
    if let Some(a) = left.as_u64() {
        num_cmp!(a, right)
    } else if let Some(a) = left.as_i64() {
        num_cmp!(a, right)
    } else {
        left.as_f64().and_then(|a| num_cmp!(a, right))
    }
}

/// JSON equality where numbers compare by value, so `1` equals `1.0`.
#[inline]
pub(crate) fn equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(left), Value::Number(right)) => {
            compare(left, right) == Some(Ordering::Equal)
        }
        (Value::Array(left), Value::Array(right)) => equal_arrays(left, right),
        (Value::Object(left), Value::Object(right)) => equal_objects(left, right),
        (_, _) => left == right,
    }
}

#[inline]
pub(crate) fn equal_arrays(left: &[Value], right: &[Value]) -> bool {
    left.len() == right.len() && left.iter().zip(right.iter()).all(|(a, b)| equal(a, b))
}

#[inline]
pub(crate) fn equal_objects(left: &Map<String, Value>, right: &Map<String, Value>) -> bool {
    left.len() == right.len()
        && left
            .iter()
            .all(|(key, value)| right.get(key).map_or(false, |other| equal(value, other)))
}

/// Whether `instance` is of `primitive_type` under the rules of `draft`.
///
/// Every integer is a number. From draft 6 on, a number with a zero fractional part is an
/// integer too.
pub(crate) fn is_of_type(draft: Draft, instance: &Value, primitive_type: PrimitiveType) -> bool {
    match (PrimitiveType::from(instance), primitive_type) {
        (actual, expected) if actual == expected => true,
        (PrimitiveType::Integer, PrimitiveType::Number) => true,
        (PrimitiveType::Number, PrimitiveType::Integer) => {
            matches!(draft, Draft::Draft6 | Draft::Draft7)
                && instance
                    .as_f64()
                    .map_or(false, |number| number.is_finite() && number.fract() == 0.)
        }
        _ => false,
    }
}

/// A non-negative integer limit, as used by the `max*` / `min*` keywords.
pub(crate) fn limit_of(value: &Value) -> Option<u64> {
    match value {
        Value::Number(number) => number.as_u64().or_else(|| {
            number
                .as_f64()
                .filter(|limit| *limit >= 0. && limit.fract() == 0. && *limit <= u64::MAX as f64)
                .map(|limit| limit as u64)
        }),
        _ => None,
    }
}

/// Whether `value` can be used as a schema in `draft`.
pub(crate) fn is_schema(draft: Draft, value: &Value) -> bool {
    match value {
        Value::Object(_) => true,
        Value::Bool(_) => draft.allows_boolean_schemas(),
        _ => false,
    }
}
