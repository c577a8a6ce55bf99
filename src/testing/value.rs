use std::cmp::Ordering;
use std::fmt::{self, Display};

use serde_json::Value;

/// A value observed or expected by a check.
///
/// JSON scalars are normalized into the scalar variants so that a status code
/// read from a response compares equal to an integer literal in a test.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Json(Value),
}

/// Outcome of comparing two check values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Equal,
    NotEqual,
    Incompatible,
}

impl CheckValue {
    /// Kind name used in failure messages.
    pub fn kind(&self) -> &'static str {
        match self {
            CheckValue::Null => "null",
            CheckValue::Bool(_) => "boolean",
            CheckValue::Int(_) | CheckValue::Float(_) => "number",
            CheckValue::Str(_) => "string",
            CheckValue::Json(Value::Array(_)) => "array",
            CheckValue::Json(_) => "object",
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            CheckValue::Int(value) => Some(*value as f64),
            CheckValue::Float(value) => Some(*value),
            _ => None,
        }
    }

    /// Compare by value. Integers and floats compare numerically; any other
    /// pairing of different kinds is incompatible.
    pub fn compare(&self, other: &CheckValue) -> Comparison {
        let equal = match (self, other) {
            (CheckValue::Null, CheckValue::Null) => true,
            (CheckValue::Bool(a), CheckValue::Bool(b)) => a == b,
            (CheckValue::Int(a), CheckValue::Int(b)) => a == b,
            (CheckValue::Str(a), CheckValue::Str(b)) => a == b,
            (CheckValue::Json(a), CheckValue::Json(b)) => json_equal(a, b),
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(a), Some(b)) => a == b,
                _ => return Comparison::Incompatible,
            },
        };

        if equal {
            Comparison::Equal
        } else {
            Comparison::NotEqual
        }
    }

    /// Ordering for numeric values and for strings; `None` for anything else.
    pub fn partial_order(&self, other: &CheckValue) -> Option<Ordering> {
        match (self, other) {
            (CheckValue::Str(a), CheckValue::Str(b)) => Some(a.cmp(b)),
            (a, b) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        }
    }
}

fn json_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| json_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(key, x)| ys.get(key).is_some_and(|y| json_equal(x, y)))
        }
        _ => a == b,
    }
}

impl Display for CheckValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckValue::Null => write!(f, "null"),
            CheckValue::Bool(value) => write!(f, "{value}"),
            CheckValue::Int(value) => write!(f, "{value}"),
            CheckValue::Float(value) => write!(f, "{value}"),
            CheckValue::Str(value) => write!(f, "{value}"),
            CheckValue::Json(value) => write!(f, "{value}"),
        }
    }
}

impl From<Value> for CheckValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => CheckValue::Null,
            Value::Bool(value) => CheckValue::Bool(value),
            Value::Number(number) => match number.as_i64() {
                Some(value) => CheckValue::Int(value),
                None => CheckValue::Float(number.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(value) => CheckValue::Str(value),
            other => CheckValue::Json(other),
        }
    }
}

impl From<&Value> for CheckValue {
    fn from(value: &Value) -> Self {
        CheckValue::from(value.clone())
    }
}

macro_rules! int_check_value {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for CheckValue {
                fn from(value: $ty) -> Self {
                    CheckValue::Int(i64::from(value))
                }
            }
        )*
    };
}

int_check_value!(i8, i16, i32, i64, u8, u16, u32);

impl From<u64> for CheckValue {
    fn from(value: u64) -> Self {
        match i64::try_from(value) {
            Ok(value) => CheckValue::Int(value),
            Err(_) => CheckValue::Float(value as f64),
        }
    }
}

impl From<usize> for CheckValue {
    fn from(value: usize) -> Self {
        CheckValue::from(value as u64)
    }
}

impl From<f32> for CheckValue {
    fn from(value: f32) -> Self {
        CheckValue::Float(f64::from(value))
    }
}

impl From<f64> for CheckValue {
    fn from(value: f64) -> Self {
        CheckValue::Float(value)
    }
}

impl From<bool> for CheckValue {
    fn from(value: bool) -> Self {
        CheckValue::Bool(value)
    }
}

impl From<&str> for CheckValue {
    fn from(value: &str) -> Self {
        CheckValue::Str(value.to_string())
    }
}

impl From<String> for CheckValue {
    fn from(value: String) -> Self {
        CheckValue::Str(value)
    }
}

impl From<&String> for CheckValue {
    fn from(value: &String) -> Self {
        CheckValue::Str(value.clone())
    }
}

impl<T: Into<CheckValue>> From<Option<T>> for CheckValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(CheckValue::Null, Into::into)
    }
}
