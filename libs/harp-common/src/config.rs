use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Deserialize;

use crate::converter::Converter;
use crate::culture::Culture;
use crate::error::ConvertError;
use crate::target::EnumType;

/// Converter configuration — parsed from TOML.
///
/// ```toml
/// culture = "de-DE"
/// short_date_pattern = "%d.%m.%Y"
///
/// [[enums]]
/// name = "Color"
/// members = { Red = 0, Green = 1, Blue = 2 }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConvertConfig {
    /// Built-in culture name. Defaults to the invariant culture.
    #[serde(default)]
    pub culture: Option<String>,

    /// Overrides the culture's short-date pattern (chrono strftime syntax).
    #[serde(default)]
    pub short_date_pattern: Option<String>,

    /// Overrides the culture's long-time pattern.
    #[serde(default)]
    pub long_time_pattern: Option<String>,

    /// Enumerations that exist only as data.
    #[serde(default)]
    pub enums: Vec<EnumConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnumConfig {
    pub name: String,
    /// Member name → discriminant.
    pub members: BTreeMap<String, i64>,
}

impl ConvertConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self, ConvertError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConvertError::Config(format!("{path}: {e}")))?;
        let config = Self::parse(&content).map_err(|e| e.with_context(path))?;
        tracing::debug!(
            path,
            culture = config.culture.as_deref().unwrap_or("invariant"),
            enums = config.enums.len(),
            "loaded converter config"
        );
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(toml_str: &str) -> Result<Self, ConvertError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Resolve the culture, applying pattern overrides.
    pub fn culture(&self) -> Result<Culture, ConvertError> {
        let mut culture = match &self.culture {
            Some(name) => Culture::lookup(name)
                .ok_or_else(|| ConvertError::Config(format!("unknown culture {name:?}")))?,
            None => Culture::invariant(),
        };
        if let Some(pattern) = &self.short_date_pattern {
            culture = culture.with_short_date_pattern(pattern.as_str())?;
        }
        if let Some(pattern) = &self.long_time_pattern {
            culture = culture.with_long_time_pattern(pattern.as_str())?;
        }
        Ok(culture)
    }

    pub fn converter(&self) -> Result<Converter, ConvertError> {
        self.culture().map(Converter::new)
    }

    /// Descriptor of a declared enumeration. Members are ordered by discriminant.
    pub fn enum_type(&self, name: &str) -> Option<Arc<EnumType>> {
        self.enums.iter().find(|e| e.name == name).map(|e| {
            let mut members: Vec<_> = e.members.iter().map(|(n, v)| (n.clone(), *v)).collect();
            members.sort_by_key(|(_, v)| *v);
            Arc::new(EnumType::new(e.name.clone(), members))
        })
    }
}
