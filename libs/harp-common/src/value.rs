use std::borrow::Cow;

use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};

use crate::error::ConvertError;
use crate::target::{ScalarType, TargetType};

pub use crate::target::EnumValue;

/// Dynamic value handed to and returned from the converter.
///
/// - Scalars: stored at their exact width, so range checks are exact
/// - String: `Cow` (zero-copy when borrowed from the caller)
/// - `Null`: the absent value
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    Null,
    Bool(bool),
    Char(char),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Float32(f32),
    Float64(f64),
    String(Cow<'a, str>),
    DateTime(NaiveDateTime),
    Enum(EnumValue),
}

impl<'a> Value<'a> {
    /// Runtime kind name, as used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Char(_) => "char",
            Value::Int8(_) => "int8",
            Value::Int16(_) => "int16",
            Value::Int32(_) => "int32",
            Value::Int64(_) => "int64",
            Value::UInt8(_) => "uint8",
            Value::UInt16(_) => "uint16",
            Value::UInt32(_) => "uint32",
            Value::UInt64(_) => "uint64",
            Value::Float32(_) => "float32",
            Value::Float64(_) => "float64",
            Value::String(_) => "string",
            Value::DateTime(_) => "datetime",
            Value::Enum(_) => "enum",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_ref()),
            _ => None,
        }
    }

    /// Detach from the borrowed input.
    pub fn into_owned(self) -> Value<'static> {
        match self {
            Value::Null => Value::Null,
            Value::Bool(v) => Value::Bool(v),
            Value::Char(v) => Value::Char(v),
            Value::Int8(v) => Value::Int8(v),
            Value::Int16(v) => Value::Int16(v),
            Value::Int32(v) => Value::Int32(v),
            Value::Int64(v) => Value::Int64(v),
            Value::UInt8(v) => Value::UInt8(v),
            Value::UInt16(v) => Value::UInt16(v),
            Value::UInt32(v) => Value::UInt32(v),
            Value::UInt64(v) => Value::UInt64(v),
            Value::Float32(v) => Value::Float32(v),
            Value::Float64(v) => Value::Float64(v),
            Value::String(s) => Value::String(Cow::Owned(s.into_owned())),
            Value::DateTime(v) => Value::DateTime(v),
            Value::Enum(v) => Value::Enum(v),
        }
    }
}

impl Serialize for Value<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Bool(v) => serializer.serialize_bool(*v),
            Value::Char(v) => serializer.serialize_char(*v),
            Value::Int8(v) => serializer.serialize_i8(*v),
            Value::Int16(v) => serializer.serialize_i16(*v),
            Value::Int32(v) => serializer.serialize_i32(*v),
            Value::Int64(v) => serializer.serialize_i64(*v),
            Value::UInt8(v) => serializer.serialize_u8(*v),
            Value::UInt16(v) => serializer.serialize_u16(*v),
            Value::UInt32(v) => serializer.serialize_u32(*v),
            Value::UInt64(v) => serializer.serialize_u64(*v),
            Value::Float32(v) => serializer.serialize_f32(*v),
            Value::Float64(v) => serializer.serialize_f64(*v),
            Value::String(s) => serializer.serialize_str(s),
            Value::DateTime(v) => serializer.collect_str(&v.format("%Y-%m-%dT%H:%M:%S%.f")),
            Value::Enum(v) => match v.name() {
                Some(name) => serializer.serialize_str(name),
                None => serializer.serialize_i64(v.value()),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Rust values → Value
// ---------------------------------------------------------------------------

macro_rules! impl_from_primitive {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value<'_> {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

impl_from_primitive! {
    bool => Bool,
    char => Char,
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    u8 => UInt8,
    u16 => UInt16,
    u32 => UInt32,
    u64 => UInt64,
    f32 => Float32,
    f64 => Float64,
    NaiveDateTime => DateTime,
    EnumValue => Enum,
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(s: &'a str) -> Self {
        Value::String(Cow::Borrowed(s))
    }
}

impl From<String> for Value<'_> {
    fn from(s: String) -> Self {
        Value::String(Cow::Owned(s))
    }
}

impl<'a> From<Cow<'a, str>> for Value<'a> {
    fn from(s: Cow<'a, str>) -> Self {
        Value::String(s)
    }
}

impl<'a, T: Into<Value<'a>>> From<Option<T>> for Value<'a> {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

// ---------------------------------------------------------------------------
// Value → Rust values
// ---------------------------------------------------------------------------

/// Rust types `Converter::convert_to` can produce.
///
/// `target_type()` tells the converter what to coerce into; `from_value`
/// then unwraps a value already coerced to that type.
pub trait FromValue: Sized {
    fn target_type() -> TargetType;

    fn from_value(value: Value<'_>) -> Result<Self, ConvertError>;
}

/// Error for a value that does not have the shape `target` promised.
pub fn unexpected(value: &Value<'_>, target: &TargetType) -> ConvertError {
    match value {
        Value::Null => ConvertError::Null { target: target.to_string() },
        other => ConvertError::invalid_cast(other.kind(), target),
    }
}

macro_rules! impl_from_value {
    ($($ty:ty => $variant:ident, $scalar:ident);* $(;)?) => {
        $(
            impl FromValue for $ty {
                fn target_type() -> TargetType {
                    TargetType::Scalar(ScalarType::$scalar)
                }

                fn from_value(value: Value<'_>) -> Result<Self, ConvertError> {
                    match value {
                        Value::$variant(v) => Ok(v),
                        other => Err(unexpected(&other, &Self::target_type())),
                    }
                }
            }
        )*
    };
}

impl_from_value! {
    bool => Bool, Bool;
    char => Char, Char;
    i8 => Int8, Int8;
    i16 => Int16, Int16;
    i32 => Int32, Int32;
    i64 => Int64, Int64;
    u8 => UInt8, UInt8;
    u16 => UInt16, UInt16;
    u32 => UInt32, UInt32;
    u64 => UInt64, UInt64;
    f32 => Float32, Float32;
    f64 => Float64, Float64;
}

impl FromValue for String {
    fn target_type() -> TargetType {
        TargetType::Scalar(ScalarType::String)
    }

    fn from_value(value: Value<'_>) -> Result<Self, ConvertError> {
        match value {
            Value::String(s) => Ok(s.into_owned()),
            other => Err(unexpected(&other, &Self::target_type())),
        }
    }
}

impl FromValue for NaiveDateTime {
    fn target_type() -> TargetType {
        TargetType::DateTime
    }

    fn from_value(value: Value<'_>) -> Result<Self, ConvertError> {
        match value {
            Value::DateTime(v) => Ok(v),
            other => Err(unexpected(&other, &Self::target_type())),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn target_type() -> TargetType {
        TargetType::optional(T::target_type())
    }

    fn from_value(value: Value<'_>) -> Result<Self, ConvertError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}
