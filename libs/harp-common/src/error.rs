use std::fmt;

/// Category of a conversion error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Absent value where a non-optional type was required.
    Null,
    /// The pair of kinds has no conversion at all.
    InvalidCast,
    /// The value does not fit the target range.
    Overflow,
    /// Text that does not parse as the target type.
    Format,
    /// Invalid converter configuration.
    Config,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Null => f.write_str("null"),
            ErrorKind::InvalidCast => f.write_str("invalid_cast"),
            ErrorKind::Overflow => f.write_str("overflow"),
            ErrorKind::Format => f.write_str("format"),
            ErrorKind::Config => f.write_str("config"),
        }
    }
}

/// Error returned by the fallible conversion paths.
///
/// `Converter::try_convert` never surfaces these; `Converter::convert` and
/// `Converter::convert_to` return them unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConvertError {
    #[error("null cannot be converted to non-optional {target}")]
    Null { target: String },

    #[error("invalid cast from {from} to {to}")]
    InvalidCast { from: &'static str, to: String },

    #[error("value {value} is out of range for {to}")]
    Overflow { value: String, to: String },

    #[error("{input:?} is not a valid {to}")]
    Format { input: String, to: String },

    #[error("{input:?} is not a member of enum {enum_name}")]
    UnknownMember { input: String, enum_name: String },

    #[error("{value} is not a defined value of enum {enum_name}")]
    UndefinedEnumValue { enum_name: String, value: i64 },

    #[error("{input:?} does not match date pattern {pattern:?}")]
    DatePattern { input: String, pattern: String },

    #[error("config error: {0}")]
    Config(String),
}

impl ConvertError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConvertError::Null { .. } => ErrorKind::Null,
            ConvertError::InvalidCast { .. } => ErrorKind::InvalidCast,
            ConvertError::Overflow { .. } | ConvertError::UndefinedEnumValue { .. } => {
                ErrorKind::Overflow
            }
            ConvertError::Format { .. }
            | ConvertError::UnknownMember { .. }
            | ConvertError::DatePattern { .. } => ErrorKind::Format,
            ConvertError::Config(_) => ErrorKind::Config,
        }
    }

    pub(crate) fn invalid_cast(from: &'static str, to: impl fmt::Display) -> Self {
        Self::InvalidCast { from, to: to.to_string() }
    }

    pub(crate) fn overflow(value: impl fmt::Display, to: impl fmt::Display) -> Self {
        Self::Overflow { value: value.to_string(), to: to.to_string() }
    }

    pub(crate) fn format(input: &str, to: impl fmt::Display) -> Self {
        Self::Format { input: input.to_string(), to: to.to_string() }
    }

    /// Add context to a configuration error, preserving other variants.
    ///
    /// Produces: `"context: original message"`.
    pub fn with_context(self, ctx: impl fmt::Display) -> Self {
        match self {
            ConvertError::Config(msg) => ConvertError::Config(format!("{ctx}: {msg}")),
            other => other,
        }
    }
}

impl From<toml::de::Error> for ConvertError {
    fn from(e: toml::de::Error) -> Self {
        Self::Config(e.to_string())
    }
}
