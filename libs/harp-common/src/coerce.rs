//! Generic coercion between primitive kinds.
//!
//! This is the fallback every conversion ends in: widening and narrowing
//! between numbers (range-checked), text ⇄ number, text ⇄ bool, and the few
//! datetime/char pairings that make sense. It knows nothing about
//! empty-string or enum-name special cases; those belong to the converter.

use std::borrow::Cow;
use std::fmt::{Display, LowerExp};
use std::num::IntErrorKind;
use std::sync::Arc;

use crate::culture::Culture;
use crate::error::ConvertError;
use crate::target::{EnumType, ScalarType, TargetType};
use crate::value::Value;

/// Coerce `value` into `target`.
///
/// `Null` only converts into `Optional` targets. A non-null value headed
/// for `Optional(U)` is coerced into `U`.
pub fn coerce<'a>(
    value: &Value<'a>,
    target: &TargetType,
    culture: &Culture,
) -> Result<Value<'a>, ConvertError> {
    match target {
        TargetType::Optional(inner) => {
            if value.is_null() {
                return Ok(Value::Null);
            }
            coerce(value, inner, culture)
        }
        _ if value.is_null() => Err(ConvertError::Null { target: target.to_string() }),
        TargetType::Scalar(scalar) => to_scalar(value, *scalar, culture),
        TargetType::DateTime => to_date_time(value, culture),
        TargetType::Enum(ty) => to_enum(value, ty),
    }
}

fn to_scalar<'a>(
    value: &Value<'a>,
    scalar: ScalarType,
    culture: &Culture,
) -> Result<Value<'a>, ConvertError> {
    match scalar {
        ScalarType::String => to_text(value, culture).map(Value::String),
        ScalarType::Bool => to_bool(value),
        ScalarType::Char => to_char(value),
        s if s.is_integer() => to_integer(value, s),
        s => to_float(value, s),
    }
}

/// Numeric view of a non-text value. `None` for kinds without one.
enum Number {
    Int(i128),
    Float(f64),
}

fn number(value: &Value<'_>) -> Option<Number> {
    let n = match value {
        Value::Bool(b) => Number::Int(i128::from(*b)),
        Value::Int8(v) => Number::Int((*v).into()),
        Value::Int16(v) => Number::Int((*v).into()),
        Value::Int32(v) => Number::Int((*v).into()),
        Value::Int64(v) => Number::Int((*v).into()),
        Value::UInt8(v) => Number::Int((*v).into()),
        Value::UInt16(v) => Number::Int((*v).into()),
        Value::UInt32(v) => Number::Int((*v).into()),
        Value::UInt64(v) => Number::Int((*v).into()),
        Value::Float32(v) => Number::Float((*v).into()),
        Value::Float64(v) => Number::Float(*v),
        Value::Enum(e) => Number::Int(e.value().into()),
        Value::Null | Value::Char(_) | Value::String(_) | Value::DateTime(_) => return None,
    };
    Some(n)
}

// ---------------------------------------------------------------------------
// Integers
// ---------------------------------------------------------------------------

fn to_integer<'a>(value: &Value<'a>, scalar: ScalarType) -> Result<Value<'a>, ConvertError> {
    let wide = match value {
        Value::String(s) => return parse_integer(s, scalar),
        Value::Char(c) => i128::from(u32::from(*c)),
        other => match number(other) {
            Some(Number::Int(i)) => i,
            Some(Number::Float(f)) => {
                float_to_int(f).ok_or_else(|| ConvertError::overflow(f, scalar))?
            }
            None => return Err(ConvertError::invalid_cast(other.kind(), scalar)),
        },
    };
    narrow(wide, scalar)
}

/// Round half to even, then truncate. NaN, infinities and huge values have no integer.
fn float_to_int(f: f64) -> Option<i128> {
    let rounded = f.round_ties_even();
    (rounded.is_finite() && rounded.abs() < 1e38).then_some(rounded as i128)
}

fn parse_integer<'a>(s: &str, scalar: ScalarType) -> Result<Value<'a>, ConvertError> {
    let trimmed = s.trim();
    match trimmed.parse::<i128>() {
        Ok(wide) => narrow(wide, scalar),
        Err(e) if matches!(e.kind(), IntErrorKind::PosOverflow | IntErrorKind::NegOverflow) => {
            Err(ConvertError::overflow(trimmed, scalar))
        }
        Err(_) => Err(ConvertError::format(s, scalar)),
    }
}

fn narrow<'a>(wide: i128, scalar: ScalarType) -> Result<Value<'a>, ConvertError> {
    macro_rules! narrow {
        ($variant:ident, $ty:ty) => {
            <$ty>::try_from(wide)
                .map(Value::$variant)
                .map_err(|_| ConvertError::overflow(wide, scalar))
        };
    }

    match scalar {
        ScalarType::Int8 => narrow!(Int8, i8),
        ScalarType::Int16 => narrow!(Int16, i16),
        ScalarType::Int32 => narrow!(Int32, i32),
        ScalarType::Int64 => narrow!(Int64, i64),
        ScalarType::UInt8 => narrow!(UInt8, u8),
        ScalarType::UInt16 => narrow!(UInt16, u16),
        ScalarType::UInt32 => narrow!(UInt32, u32),
        ScalarType::UInt64 => narrow!(UInt64, u64),
        other => Err(ConvertError::invalid_cast("int128", other)),
    }
}

// ---------------------------------------------------------------------------
// Floats, bools, chars
// ---------------------------------------------------------------------------

fn to_float<'a>(value: &Value<'a>, scalar: ScalarType) -> Result<Value<'a>, ConvertError> {
    if let Value::String(s) = value {
        let trimmed = s.trim();
        let parsed = match scalar {
            ScalarType::Float32 => trimmed.parse::<f32>().map(Value::Float32),
            _ => trimmed.parse::<f64>().map(Value::Float64),
        };
        return parsed.map_err(|_| ConvertError::format(s, scalar));
    }

    let wide = match number(value) {
        Some(Number::Int(i)) => i as f64,
        Some(Number::Float(f)) => f,
        None => return Err(ConvertError::invalid_cast(value.kind(), scalar)),
    };
    Ok(match scalar {
        ScalarType::Float32 => Value::Float32(wide as f32),
        _ => Value::Float64(wide),
    })
}

fn to_bool<'a>(value: &Value<'a>) -> Result<Value<'a>, ConvertError> {
    let b = match value {
        Value::String(s) => parse_bool(s)?,
        other => match number(other) {
            Some(Number::Int(i)) => i != 0,
            Some(Number::Float(f)) => f != 0.0,
            None => return Err(ConvertError::invalid_cast(other.kind(), ScalarType::Bool)),
        },
    };
    Ok(Value::Bool(b))
}

fn parse_bool(s: &str) -> Result<bool, ConvertError> {
    let trimmed = s.trim();
    if trimmed.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if trimmed.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(ConvertError::format(s, ScalarType::Bool))
    }
}

fn to_char<'a>(value: &Value<'a>) -> Result<Value<'a>, ConvertError> {
    match value {
        Value::Char(c) => Ok(Value::Char(*c)),
        Value::String(s) => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(Value::Char(c)),
                _ => Err(ConvertError::format(s, ScalarType::Char)),
            }
        }
        Value::Bool(_) | Value::Float32(_) | Value::Float64(_) => {
            Err(ConvertError::invalid_cast(value.kind(), ScalarType::Char))
        }
        other => match number(other) {
            Some(Number::Int(i)) => u32::try_from(i)
                .ok()
                .and_then(char::from_u32)
                .map(Value::Char)
                .ok_or_else(|| ConvertError::overflow(i, ScalarType::Char)),
            _ => Err(ConvertError::invalid_cast(other.kind(), ScalarType::Char)),
        },
    }
}

// ---------------------------------------------------------------------------
// Text, dates, enums
// ---------------------------------------------------------------------------

fn to_text<'a>(value: &Value<'a>, culture: &Culture) -> Result<Cow<'a, str>, ConvertError> {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Bool(true) => Cow::Borrowed("True"),
        Value::Bool(false) => Cow::Borrowed("False"),
        Value::Char(c) => Cow::Owned(c.to_string()),
        Value::Int8(v) => Cow::Owned(v.to_string()),
        Value::Int16(v) => Cow::Owned(v.to_string()),
        Value::Int32(v) => Cow::Owned(v.to_string()),
        Value::Int64(v) => Cow::Owned(v.to_string()),
        Value::UInt8(v) => Cow::Owned(v.to_string()),
        Value::UInt16(v) => Cow::Owned(v.to_string()),
        Value::UInt32(v) => Cow::Owned(v.to_string()),
        Value::UInt64(v) => Cow::Owned(v.to_string()),
        Value::Float32(v) => Cow::Owned(float_text(*v, 7)),
        Value::Float64(v) => Cow::Owned(float_text(*v, 15)),
        Value::DateTime(v) => Cow::Owned(culture.format_date_time(v)),
        Value::Enum(e) => Cow::Owned(e.to_string()),
        Value::Null => {
            return Err(ConvertError::Null { target: ScalarType::String.to_string() });
        }
    };
    Ok(text)
}

/// Shortest round-trip text; exponent form (`1E+20`, `1E-05`) once the decimal
/// exponent reaches `digits` or drops below -5.
fn float_text<F: Display + LowerExp>(v: F, digits: i32) -> String {
    let scientific = format!("{v:e}");
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return v.to_string();
    };
    match exponent.parse::<i32>() {
        Ok(exp) if exp >= digits || exp < -5 => {
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{mantissa}E{sign}{:02}", exp.unsigned_abs())
        }
        _ => v.to_string(),
    }
}

fn to_date_time<'a>(value: &Value<'a>, culture: &Culture) -> Result<Value<'a>, ConvertError> {
    match value {
        Value::DateTime(v) => Ok(Value::DateTime(*v)),
        Value::String(s) => culture.parse_date_time(s).map(Value::DateTime),
        other => Err(ConvertError::invalid_cast(other.kind(), TargetType::DateTime)),
    }
}

/// Only the same enumeration converts; names are parsed by the converter, not here.
fn to_enum<'a>(value: &Value<'a>, ty: &Arc<EnumType>) -> Result<Value<'a>, ConvertError> {
    match value {
        Value::Enum(e) if e.enum_type() == ty => Ok(Value::Enum(e.clone())),
        other => Err(ConvertError::invalid_cast(
            other.kind(),
            TargetType::Enum(Arc::clone(ty)),
        )),
    }
}
