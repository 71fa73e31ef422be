//! Driver-neutral parameter and column values.

use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::convert::Infallible;
use uuid::Uuid;

/// A single SQL parameter or column value.
///
/// Deserializes from plain JSON so API payloads can be handed straight to the
/// translation layer: numbers become [`Value::Int`] when they fit an `i64` and
/// [`Value::Float`] when they are written as floats, arrays become
/// [`Value::List`], objects become [`Value::Json`]. Integers outside the `i64`
/// range are rejected.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(into = "serde_json::Value")]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Json(serde_json::Value),
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
    List(Vec<Value>),
}

impl Value {
    /// Short type label used in decode errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Bytes(_) => "bytes",
            Value::Json(_) => "json",
            Value::Uuid(_) => "uuid",
            Value::Timestamp(_) => "timestamp",
            Value::List(_) => "list",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Wrap a JSON document without flattening it into scalar variants.
    pub fn json(value: serde_json::Value) -> Self {
        Value::Json(value)
    }

    /// Build a list value from anything convertible.
    pub fn list<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

/// Convert JSON, handing integers that do not fit an `i64` to `wide`.
fn from_json_with<E>(
    value: serde_json::Value,
    wide: &impl Fn(serde_json::Number) -> Result<Value, E>,
) -> Result<Value, E> {
    Ok(match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int(i)
            } else if n.is_f64() {
                Value::Float(n.as_f64().unwrap_or(f64::NAN))
            } else {
                return wide(n);
            }
        }
        serde_json::Value::String(s) => Value::Text(s),
        serde_json::Value::Array(items) => Value::List(
            items
                .into_iter()
                .map(|item| from_json_with(item, wide))
                .collect::<Result<_, _>>()?,
        ),
        obj @ serde_json::Value::Object(_) => Value::Json(obj),
    })
}

/// Integers beyond `i64` stay exact as [`Value::Json`] numbers.
impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        let wide = |n: serde_json::Number| Ok::<_, Infallible>(Value::Json(n.into()));
        match from_json_with(value, &wide) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let json = serde_json::Value::deserialize(deserializer)?;
        from_json_with(json, &|n| {
            Err(D::Error::custom(format!(
                "integer {n} is outside the 64-bit signed range"
            )))
        })
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Int(i) => serde_json::Value::from(i),
            Value::Float(f) => serde_json::Value::from(f),
            Value::Text(s) => serde_json::Value::String(s),
            Value::Bytes(b) => serde_json::Value::from(b),
            Value::Json(j) => j,
            Value::Uuid(u) => serde_json::Value::String(u.to_string()),
            Value::Timestamp(ts) => serde_json::Value::String(ts.to_rfc3339()),
            Value::List(items) => {
                serde_json::Value::Array(items.into_iter().map(Into::into).collect())
            }
        }
    }
}

macro_rules! impl_from_scalar {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v.into())
                }
            }
        )*
    };
}

impl_from_scalar! {
    bool => Bool,
    i16 => Int,
    i32 => Int,
    i64 => Int,
    u32 => Int,
    f32 => Float,
    f64 => Float,
    String => Text,
    Vec<u8> => Bytes,
    Uuid => Uuid,
    DateTime<Utc> => Timestamp,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_owned())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Conversion from a [`Value`] into a concrete Rust type.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self, ValueTypeError>;
}

/// A value did not have the shape the caller asked for.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("expected {expected}, found {found}")]
pub struct ValueTypeError {
    pub expected: &'static str,
    pub found: &'static str,
}

impl ValueTypeError {
    fn new(expected: &'static str, value: &Value) -> Self {
        Self {
            expected,
            found: value.type_name(),
        }
    }
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self, ValueTypeError> {
        Ok(value)
    }
}

impl FromValue for i64 {
    fn from_value(value: Value) -> Result<Self, ValueTypeError> {
        match value {
            Value::Int(v) => Ok(v),
            other => Err(ValueTypeError::new("int", &other)),
        }
    }
}

impl FromValue for i32 {
    fn from_value(value: Value) -> Result<Self, ValueTypeError> {
        match value {
            Value::Int(v) => i32::try_from(v).map_err(|_| ValueTypeError {
                expected: "int4",
                found: "out-of-range int",
            }),
            other => Err(ValueTypeError::new("int4", &other)),
        }
    }
}

impl FromValue for i16 {
    fn from_value(value: Value) -> Result<Self, ValueTypeError> {
        match value {
            Value::Int(v) => i16::try_from(v).map_err(|_| ValueTypeError {
                expected: "int2",
                found: "out-of-range int",
            }),
            other => Err(ValueTypeError::new("int2", &other)),
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self, ValueTypeError> {
        match value {
            Value::Float(v) => Ok(v),
            Value::Int(v) => Ok(v as f64),
            other => Err(ValueTypeError::new("float", &other)),
        }
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self, ValueTypeError> {
        match value {
            Value::Bool(v) => Ok(v),
            other => Err(ValueTypeError::new("bool", &other)),
        }
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self, ValueTypeError> {
        match value {
            Value::Text(v) => Ok(v),
            other => Err(ValueTypeError::new("text", &other)),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: Value) -> Result<Self, ValueTypeError> {
        match value {
            Value::Bytes(v) => Ok(v),
            other => Err(ValueTypeError::new("bytes", &other)),
        }
    }
}

impl FromValue for Uuid {
    fn from_value(value: Value) -> Result<Self, ValueTypeError> {
        match value {
            Value::Uuid(v) => Ok(v),
            Value::Text(ref s) => Uuid::parse_str(s).map_err(|_| ValueTypeError::new("uuid", &value)),
            other => Err(ValueTypeError::new("uuid", &other)),
        }
    }
}

impl FromValue for DateTime<Utc> {
    fn from_value(value: Value) -> Result<Self, ValueTypeError> {
        match value {
            Value::Timestamp(v) => Ok(v),
            other => Err(ValueTypeError::new("timestamp", &other)),
        }
    }
}

impl FromValue for serde_json::Value {
    fn from_value(value: Value) -> Result<Self, ValueTypeError> {
        Ok(value.into())
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self, ValueTypeError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}
