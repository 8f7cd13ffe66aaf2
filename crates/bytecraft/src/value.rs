//! Dynamic values seen by scope expressions and produced by type-erased schemas.

use std::collections::BTreeMap;

use bytes::Bytes;

use crate::{encoding, errors::Error};

/// Fields of a parsed or to-be-built struct, keyed by field name.
pub type Record = BTreeMap<String, Value>;

/// A value produced when parsing, or consumed when building, through the dynamic layer.
///
/// Typed schemas convert their outputs with [IntoValue] and [FromValue] so that
/// every already-known field can sit in a [crate::context::Scope].
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Value {
    #[default]
    Null,
    U64(u64),
    I64(i64),
    F64(f64),
    Text(String),
    Array(Vec<Value>),
    Struct(Record),
    /// Raw bytes. Listed last so that untagged deserialization prefers `Text` and `Array`.
    Bytes(Bytes),
}

impl Value {
    /// Builds a [Value::Struct] from `(name, value)` pairs.
    pub fn record<K: Into<String>>(fields: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Struct(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::U64(_) => "unsigned integer",
            Value::I64(_) => "signed integer",
            Value::F64(_) => "float",
            Value::Text(_) => "text",
            Value::Array(_) => "array",
            Value::Struct(_) => "struct",
            Value::Bytes(_) => "bytes",
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Value::U64(v) => Some(v),
            Value::I64(v) => u64::try_from(v).ok(),
            Value::F64(v) if is_integral(v) && (0.0..TWO_POW_64).contains(&v) => Some(v as u64),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::U64(v) => i64::try_from(v).ok(),
            Value::I64(v) => Some(v),
            Value::F64(v) if is_integral(v) && (-TWO_POW_63..TWO_POW_63).contains(&v) => {
                Some(v as i64)
            }
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::U64(v) => Some(v as f64),
            Value::I64(v) => Some(v as f64),
            Value::F64(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Value::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&Record> {
        match self {
            Value::Struct(record) => Some(record),
            _ => None,
        }
    }

    /// Looks up a field of a [Value::Struct].
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.as_struct()?.get(field)
    }

    /// Canonical switch key.
    ///
    /// Integers render in decimal (an integral float renders like the integer),
    /// text is used verbatim and bytes render as lowercase hex. Null, arrays and
    /// structs have no key.
    pub fn to_key(&self) -> Option<String> {
        match self {
            Value::U64(v) => Some(v.to_string()),
            Value::I64(v) => Some(v.to_string()),
            Value::F64(v) => Some(match self.as_i64() {
                Some(int) => int.to_string(),
                None => v.to_string(),
            }),
            Value::Text(text) => Some(text.clone()),
            Value::Bytes(bytes) => Some(encoding::to_hex(bytes)),
            Value::Null | Value::Array(_) | Value::Struct(_) => None,
        }
    }
}

// Exclusive upper bounds: u64::MAX and i64::MAX round up to these as f64.
const TWO_POW_64: f64 = 18446744073709551616.0;
const TWO_POW_63: f64 = 9223372036854775808.0;

fn is_integral(v: f64) -> bool {
    v.is_finite() && v.fract() == 0.0
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::U64(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::I64(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::F64(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<Bytes> for Value {
    fn from(value: Bytes) -> Self {
        Value::Bytes(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Array(value)
    }
}

impl From<Record> for Value {
    fn from(value: Record) -> Self {
        Value::Struct(value)
    }
}

/// Conversion of a typed schema output into a [Value].
pub trait IntoValue {
    fn into_value(self) -> Value;
}

/// Conversion of a [Value] into a typed schema input.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self, Error>;
}

fn invalid(expected: &'static str, found: &Value) -> Error {
    Error::InvalidValue {
        expected,
        found: found.type_name(),
    }
}

macro_rules! impl_unsigned {
    ($($type:ty),*) => {$(
        impl IntoValue for $type {
            fn into_value(self) -> Value {
                Value::U64(self as u64)
            }
        }

        impl FromValue for $type {
            fn from_value(value: &Value) -> Result<Self, Error> {
                value
                    .as_u64()
                    .and_then(|v| <$type>::try_from(v).ok())
                    .ok_or_else(|| invalid(stringify!($type), value))
            }
        }
    )*};
}

macro_rules! impl_signed {
    ($($type:ty),*) => {$(
        impl IntoValue for $type {
            fn into_value(self) -> Value {
                Value::I64(self as i64)
            }
        }

        impl FromValue for $type {
            fn from_value(value: &Value) -> Result<Self, Error> {
                value
                    .as_i64()
                    .and_then(|v| <$type>::try_from(v).ok())
                    .ok_or_else(|| invalid(stringify!($type), value))
            }
        }
    )*};
}

impl_unsigned!(u8, u16, u32, u64);
impl_signed!(i8, i16, i32, i64);

impl IntoValue for f32 {
    fn into_value(self) -> Value {
        Value::F64(self as f64)
    }
}

impl FromValue for f32 {
    fn from_value(value: &Value) -> Result<Self, Error> {
        value
            .as_f64()
            .filter(|v| !v.is_finite() || v.abs() <= f32::MAX as f64)
            .map(|v| v as f32)
            .ok_or_else(|| invalid("f32", value))
    }
}

impl IntoValue for f64 {
    fn into_value(self) -> Value {
        Value::F64(self)
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self, Error> {
        value.as_f64().ok_or_else(|| invalid("f64", value))
    }
}

impl IntoValue for Bytes {
    fn into_value(self) -> Value {
        Value::Bytes(self)
    }
}

impl FromValue for Bytes {
    /// Accepts raw bytes, or an array of integers in `0..=255`.
    fn from_value(value: &Value) -> Result<Self, Error> {
        match value {
            Value::Bytes(bytes) => Ok(bytes.clone()),
            Value::Array(items) => items
                .iter()
                .map(|item| item.as_u64().and_then(|v| u8::try_from(v).ok()))
                .collect::<Option<Vec<u8>>>()
                .map(Bytes::from)
                .ok_or_else(|| invalid("bytes", value)),
            _ => Err(invalid("bytes", value)),
        }
    }
}

impl IntoValue for String {
    fn into_value(self) -> Value {
        Value::Text(self)
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self, Error> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| invalid("text", value))
    }
}

impl IntoValue for Record {
    fn into_value(self) -> Value {
        Value::Struct(self)
    }
}

impl FromValue for Record {
    fn from_value(value: &Value) -> Result<Self, Error> {
        value.as_struct().cloned().ok_or_else(|| invalid("struct", value))
    }
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self, Error> {
        Ok(value.clone())
    }
}

impl<T: IntoValue> IntoValue for Vec<T> {
    fn into_value(self) -> Value {
        Value::Array(self.into_iter().map(IntoValue::into_value).collect())
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value) -> Result<Self, Error> {
        value
            .as_array()
            .ok_or_else(|| invalid("array", value))?
            .iter()
            .map(T::from_value)
            .collect()
    }
}
