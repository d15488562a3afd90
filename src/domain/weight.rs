//! Sort key for weights read from untyped JSON.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// A JSON weight with a total order.
///
/// Values of different kinds order as null < bool < number < string < array < object.
/// Numbers compare numerically (integers exactly, mixed or fractional as `f64`),
/// strings lexically, arrays and objects by their JSON text.
/// Equality follows the ordering, so `1` and `1.0` are equal weights.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JsonWeight(pub Value);

impl JsonWeight {
    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

impl Default for JsonWeight {
    fn default() -> Self {
        JsonWeight(Value::from(0))
    }
}

impl From<Value> for JsonWeight {
    fn from(value: Value) -> Self {
        JsonWeight(value)
    }
}

fn kind_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

fn compare_numbers(a: &Number, b: &Number) -> Ordering {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x.cmp(&y);
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x.cmp(&y);
    }
    let x = a.as_f64().unwrap_or(f64::NAN);
    let y = b.as_f64().unwrap_or(f64::NAN);
    x.total_cmp(&y)
}

impl Ord for JsonWeight {
    fn cmp(&self, other: &Self) -> Ordering {
        match (&self.0, &other.0) {
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Number(a), Value::Number(b)) => compare_numbers(a, b),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Null, Value::Null) => Ordering::Equal,
            (a, b) if kind_rank(a) == kind_rank(b) => a.to_string().cmp(&b.to_string()),
            (a, b) => kind_rank(a).cmp(&kind_rank(b)),
        }
    }
}

impl PartialOrd for JsonWeight {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for JsonWeight {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for JsonWeight {}

impl fmt::Display for JsonWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Value::String(s) => write!(f, "{}", s),
            other => write!(f, "{}", other),
        }
    }
}
