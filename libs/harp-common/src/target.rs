use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ConvertError;

// ════════════════════════════════════════════════════════════════
//  Scalar Type
// ════════════════════════════════════════════════════════════════

/// Primitive kinds the generic coercion converts between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarType {
    Bool,
    Char,
    Int8,
    Int16,
    Int32,
    Int64,
    #[serde(rename = "uint8")]
    UInt8,
    #[serde(rename = "uint16")]
    UInt16,
    #[serde(rename = "uint32")]
    UInt32,
    #[serde(rename = "uint64")]
    UInt64,
    Float32,
    Float64,
    String,
}

impl ScalarType {
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            ScalarType::Int8
                | ScalarType::Int16
                | ScalarType::Int32
                | ScalarType::Int64
                | ScalarType::UInt8
                | ScalarType::UInt16
                | ScalarType::UInt32
                | ScalarType::UInt64
        )
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScalarType::Bool => "bool",
            ScalarType::Char => "char",
            ScalarType::Int8 => "int8",
            ScalarType::Int16 => "int16",
            ScalarType::Int32 => "int32",
            ScalarType::Int64 => "int64",
            ScalarType::UInt8 => "uint8",
            ScalarType::UInt16 => "uint16",
            ScalarType::UInt32 => "uint32",
            ScalarType::UInt64 => "uint64",
            ScalarType::Float32 => "float32",
            ScalarType::Float64 => "float64",
            ScalarType::String => "string",
        };
        f.write_str(name)
    }
}

impl FromStr for ScalarType {
    type Err = ConvertError;

    /// Accepts the display names plus the Rust primitive spellings (`i32`, `f64`, ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let scalar = match s.trim().to_ascii_lowercase().as_str() {
            "bool" | "boolean" => ScalarType::Bool,
            "char" => ScalarType::Char,
            "int8" | "i8" => ScalarType::Int8,
            "int16" | "i16" => ScalarType::Int16,
            "int32" | "i32" | "int" => ScalarType::Int32,
            "int64" | "i64" | "long" => ScalarType::Int64,
            "uint8" | "u8" | "byte" => ScalarType::UInt8,
            "uint16" | "u16" => ScalarType::UInt16,
            "uint32" | "u32" => ScalarType::UInt32,
            "uint64" | "u64" => ScalarType::UInt64,
            "float32" | "f32" | "float" => ScalarType::Float32,
            "float64" | "f64" | "double" => ScalarType::Float64,
            "string" | "str" => ScalarType::String,
            _ => return Err(ConvertError::format(s, "scalar type")),
        };
        Ok(scalar)
    }
}

// ════════════════════════════════════════════════════════════════
//  Enum Type
// ════════════════════════════════════════════════════════════════

/// Runtime description of an enumeration: its name and ordered members.
///
/// Built by `#[derive(ConvertEnum)]` for Rust enums, or declared in
/// configuration for enumerations that only exist as data.
#[derive(Debug, PartialEq, Eq)]
pub struct EnumType {
    name: String,
    members: Vec<(String, i64)>,
}

impl EnumType {
    pub fn new<N: Into<String>>(
        name: impl Into<String>,
        members: impl IntoIterator<Item = (N, i64)>,
    ) -> Self {
        Self {
            name: name.into(),
            members: members.into_iter().map(|(n, v)| (n.into(), v)).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn members(&self) -> impl Iterator<Item = (&str, i64)> {
        self.members.iter().map(|(n, v)| (n.as_str(), *v))
    }

    /// Discriminant of the member with exactly this name (case-sensitive).
    pub fn value(&self, name: &str) -> Option<i64> {
        self.members.iter().find(|(n, _)| n == name).map(|(_, v)| *v)
    }

    /// Name of the first member declared with this discriminant.
    pub fn name_of(&self, value: i64) -> Option<&str> {
        self.members
            .iter()
            .find(|(_, v)| *v == value)
            .map(|(n, _)| n.as_str())
    }
}

/// A value of some enumeration: descriptor plus discriminant.
///
/// The discriminant need not name a declared member (numeric parsing and
/// comma-combined names can produce any value).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    ty: Arc<EnumType>,
    value: i64,
}

impl EnumValue {
    pub fn new(ty: Arc<EnumType>, value: i64) -> Self {
        Self { ty, value }
    }

    /// Parse a member name of `ty`.
    ///
    /// - surrounding whitespace is ignored, names are case-sensitive
    /// - a leading digit or sign is parsed as a raw discriminant
    /// - `"A, B"` combines the members with bitwise OR
    pub fn parse(ty: &Arc<EnumType>, input: &str) -> Result<Self, ConvertError> {
        let unknown = || ConvertError::UnknownMember {
            input: input.to_string(),
            enum_name: ty.name().to_string(),
        };

        let trimmed = input.trim();
        let first = trimmed.bytes().next().ok_or_else(unknown)?;

        if first.is_ascii_digit() || first == b'-' || first == b'+' {
            let value = trimmed.parse::<i64>().map_err(|_| unknown())?;
            return Ok(Self::new(Arc::clone(ty), value));
        }

        let mut value = 0;
        for part in trimmed.split(',') {
            value |= ty.value(part.trim()).ok_or_else(unknown)?;
        }
        Ok(Self::new(Arc::clone(ty), value))
    }

    pub fn enum_type(&self) -> &Arc<EnumType> {
        &self.ty
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    /// Declared member name, `None` for undefined discriminants.
    pub fn name(&self) -> Option<&str> {
        self.ty.name_of(self.value)
    }
}

impl fmt::Display for EnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "{}", self.value),
        }
    }
}

/// Rust enums usable as conversion targets.
///
/// Implement with `#[derive(ConvertEnum)]` on a fieldless enum.
pub trait ConvertEnum: Sized {
    /// Shared descriptor, built once per type.
    fn enum_type() -> Arc<EnumType>;

    fn discriminant(&self) -> i64;

    fn from_discriminant(value: i64) -> Option<Self>;
}

// ════════════════════════════════════════════════════════════════
//  Target Type
// ════════════════════════════════════════════════════════════════

/// What a value should be converted into.
#[derive(Debug, Clone, PartialEq)]
pub enum TargetType {
    Scalar(ScalarType),
    DateTime,
    Enum(Arc<EnumType>),
    /// Either absent or a value of the inner type.
    Optional(Box<TargetType>),
}

impl TargetType {
    /// Wrap in `Optional`. Already-optional types are returned unchanged.
    pub fn optional(inner: TargetType) -> Self {
        match inner {
            TargetType::Optional(_) => inner,
            other => TargetType::Optional(Box::new(other)),
        }
    }

    /// Type after stripping one `Optional` layer.
    pub fn effective(&self) -> &TargetType {
        match self {
            TargetType::Optional(inner) => inner,
            other => other,
        }
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, TargetType::Optional(_))
    }
}

impl From<ScalarType> for TargetType {
    fn from(scalar: ScalarType) -> Self {
        TargetType::Scalar(scalar)
    }
}

impl From<Arc<EnumType>> for TargetType {
    fn from(ty: Arc<EnumType>) -> Self {
        TargetType::Enum(ty)
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetType::Scalar(s) => write!(f, "{s}"),
            TargetType::DateTime => f.write_str("datetime"),
            TargetType::Enum(ty) => write!(f, "enum {}", ty.name()),
            TargetType::Optional(inner) => write!(f, "optional<{inner}>"),
        }
    }
}

impl FromStr for TargetType {
    type Err = ConvertError;

    /// Scalars and `datetime`; a trailing `?` makes the type optional (`int32?`).
    ///
    /// Enumerations have no textual form here, they need a descriptor.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(inner) = s.strip_suffix('?') {
            return Ok(TargetType::optional(inner.parse()?));
        }
        match s.to_ascii_lowercase().as_str() {
            "datetime" | "date" => Ok(TargetType::DateTime),
            _ => s
                .parse::<ScalarType>()
                .map(TargetType::Scalar)
                .map_err(|_| ConvertError::format(s, "target type")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn access() -> Arc<EnumType> {
        Arc::new(EnumType::new(
            "Access",
            [("None", 0), ("Read", 1), ("Write", 2), ("Execute", 4)],
        ))
    }

    #[test]
    fn parses_member_names_case_sensitively() {
        let ty = access();
        assert_eq!(EnumValue::parse(&ty, "Write").unwrap().value(), 2);
        assert_eq!(EnumValue::parse(&ty, "  Read ").unwrap().value(), 1);
        assert!(EnumValue::parse(&ty, "write").is_err());
        assert!(EnumValue::parse(&ty, "").is_err());
        assert!(EnumValue::parse(&ty, "   ").is_err());
    }

    #[test]
    fn comma_separated_members_are_combined() {
        let v = EnumValue::parse(&access(), "Read, Write").unwrap();
        assert_eq!(v.value(), 3);
        assert_eq!(v.name(), None);
        assert_eq!(v.to_string(), "3");
        assert!(EnumValue::parse(&access(), "Read, Bogus").is_err());
    }

    #[test]
    fn numeric_input_is_a_raw_discriminant() {
        let ty = access();
        assert_eq!(EnumValue::parse(&ty, "4").unwrap().to_string(), "Execute");
        assert_eq!(EnumValue::parse(&ty, "-7").unwrap().value(), -7);
        assert!(EnumValue::parse(&ty, "4x").is_err());
    }

    #[test]
    fn optional_never_nests() {
        let opt = TargetType::optional(ScalarType::Int32.into());
        let twice = TargetType::optional(opt.clone());
        assert_eq!(opt, twice);
        assert_eq!(twice.effective(), &TargetType::Scalar(ScalarType::Int32));
        assert_eq!(twice.to_string(), "optional<int32>");
    }

    #[test]
    fn target_type_from_str() {
        assert_eq!("i64".parse::<TargetType>().unwrap(), TargetType::Scalar(ScalarType::Int64));
        assert_eq!(
            "datetime?".parse::<TargetType>().unwrap(),
            TargetType::optional(TargetType::DateTime)
        );
        assert!("decimal".parse::<TargetType>().is_err());
    }

    #[test]
    fn scalar_type_serde_names() {
        let json = serde_json::to_string(&ScalarType::UInt16).unwrap();
        assert_eq!(json, "\"uint16\"");
        let back: ScalarType = serde_json::from_str("\"float64\"").unwrap();
        assert_eq!(back, ScalarType::Float64);
    }
}
