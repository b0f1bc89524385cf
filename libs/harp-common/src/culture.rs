use chrono::format::{self, Item, ParseErrorKind, Parsed, StrftimeItems};
use chrono::{NaiveDateTime, NaiveTime};

use crate::error::ConvertError;

/// Date/time patterns of a locale, in chrono strftime syntax.
///
/// Passed explicitly to the converter; nothing here consults process-wide
/// locale state unless the caller asks for [`Culture::from_env`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Culture {
    name: String,
    short_date_pattern: String,
    long_time_pattern: String,
}

/// `(name, short date, long time)`
const BUILTIN: &[(&str, &str, &str)] = &[
    ("invariant", "%m/%d/%Y", "%H:%M:%S"),
    ("en-US", "%-m/%-d/%Y", "%-I:%M:%S %p"),
    ("en-GB", "%d/%m/%Y", "%H:%M:%S"),
    ("de-DE", "%d.%m.%Y", "%H:%M:%S"),
    ("fr-FR", "%d/%m/%Y", "%H:%M:%S"),
    ("ru-RU", "%d.%m.%Y", "%H:%M:%S"),
    ("ja-JP", "%Y/%m/%d", "%H:%M:%S"),
    ("zh-CN", "%Y/%-m/%-d", "%H:%M:%S"),
    ("sv-SE", "%Y-%m-%d", "%H:%M:%S"),
    ("nl-NL", "%d-%m-%Y", "%H:%M:%S"),
];

/// Fallback forms for the generic string → datetime coercion.
const ISO_PATTERNS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d"];

impl Culture {
    /// Build a culture from explicit patterns. Fails on malformed patterns.
    pub fn new(
        name: impl Into<String>,
        short_date_pattern: impl Into<String>,
        long_time_pattern: impl Into<String>,
    ) -> Result<Self, ConvertError> {
        let culture = Self {
            name: name.into(),
            short_date_pattern: short_date_pattern.into(),
            long_time_pattern: long_time_pattern.into(),
        };
        validate_pattern(&culture.short_date_pattern)?;
        validate_pattern(&culture.long_time_pattern)?;
        Ok(culture)
    }

    pub fn invariant() -> Self {
        Self::builtin(BUILTIN[0])
    }

    /// Look up a built-in culture.
    ///
    /// Matching ignores case and treats `_` like `-` (`de_de` finds `de-DE`).
    pub fn lookup(name: &str) -> Option<Self> {
        let wanted = name.trim().replace('_', "-");
        BUILTIN
            .iter()
            .find(|(n, _, _)| n.eq_ignore_ascii_case(&wanted))
            .map(|entry| Self::builtin(*entry))
    }

    /// Culture named by `LC_ALL`, `LC_TIME` or `LANG`, in that order.
    ///
    /// POSIX suffixes (`.UTF-8`, `@euro`) are ignored. Unknown or unset
    /// locales resolve to the invariant culture.
    pub fn from_env() -> Self {
        ["LC_ALL", "LC_TIME", "LANG"]
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|v| !v.is_empty())
            .and_then(|locale| {
                let base = locale.split(['.', '@']).next().unwrap_or_default();
                Self::lookup(base)
            })
            .unwrap_or_else(Self::invariant)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn short_date_pattern(&self) -> &str {
        &self.short_date_pattern
    }

    pub fn long_time_pattern(&self) -> &str {
        &self.long_time_pattern
    }

    /// Replace the short-date pattern, keeping everything else.
    pub fn with_short_date_pattern(mut self, pattern: impl Into<String>) -> Result<Self, ConvertError> {
        self.short_date_pattern = pattern.into();
        validate_pattern(&self.short_date_pattern)?;
        Ok(self)
    }

    pub fn with_long_time_pattern(mut self, pattern: impl Into<String>) -> Result<Self, ConvertError> {
        self.long_time_pattern = pattern.into();
        validate_pattern(&self.long_time_pattern)?;
        Ok(self)
    }

    /// Parse `input` with exactly the short-date pattern, no other formats.
    ///
    /// The whole input must match, including whitespace: chrono skips
    /// spaces before numeric fields, so input whitespace is checked against
    /// the pattern's own first. Numeric fields still take one or two digits.
    /// Time of day is midnight unless the pattern itself carries time fields.
    pub fn parse_short_date(&self, input: &str) -> Result<NaiveDateTime, ConvertError> {
        if whitespace_shape(input) != whitespace_shape(&self.short_date_pattern) {
            return Err(ConvertError::DatePattern {
                input: input.to_string(),
                pattern: self.short_date_pattern.clone(),
            });
        }
        parse_exact(input, &self.short_date_pattern)
    }

    /// Lenient parse used by the generic coercion: general pattern
    /// (short date + long time), then short date, then ISO-8601 forms.
    pub fn parse_date_time(&self, input: &str) -> Result<NaiveDateTime, ConvertError> {
        let input = input.trim();
        let general = self.general_pattern();
        std::iter::once(general.as_str())
            .chain(std::iter::once(self.short_date_pattern.as_str()))
            .chain(ISO_PATTERNS.iter().copied())
            .find_map(|pattern| parse_exact(input, pattern).ok())
            .ok_or_else(|| ConvertError::format(input, "datetime"))
    }

    /// `"{short date} {long time}"`.
    pub fn format_date_time(&self, value: &NaiveDateTime) -> String {
        value.format(&self.general_pattern()).to_string()
    }

    fn general_pattern(&self) -> String {
        format!("{} {}", self.short_date_pattern, self.long_time_pattern)
    }

    fn builtin((name, short_date, long_time): (&str, &str, &str)) -> Self {
        Self {
            name: name.to_string(),
            short_date_pattern: short_date.to_string(),
            long_time_pattern: long_time.to_string(),
        }
    }
}

impl Default for Culture {
    fn default() -> Self {
        Self::invariant()
    }
}

fn validate_pattern(pattern: &str) -> Result<(), ConvertError> {
    if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
        return Err(ConvertError::Config(format!("invalid date/time pattern {pattern:?}")));
    }
    Ok(())
}

/// Runs of whitespace (`true`) and non-whitespace (`false`), in order.
fn whitespace_shape(text: &str) -> Vec<bool> {
    let mut shape = Vec::new();
    for c in text.chars() {
        let space = c.is_whitespace();
        if shape.last() != Some(&space) {
            shape.push(space);
        }
    }
    shape
}

fn parse_exact(input: &str, pattern: &str) -> Result<NaiveDateTime, ConvertError> {
    let mismatch = || ConvertError::DatePattern {
        input: input.to_string(),
        pattern: pattern.to_string(),
    };

    let mut parsed = Parsed::new();
    format::parse(&mut parsed, input, StrftimeItems::new(pattern)).map_err(|_| mismatch())?;

    let date = parsed.to_naive_date().map_err(|_| mismatch())?;
    let time = match parsed.to_naive_time() {
        Ok(time) => time,
        Err(e) if e.kind() == ParseErrorKind::NotEnough => NaiveTime::MIN,
        Err(_) => return Err(mismatch()),
    };
    Ok(date.and_time(time))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_time(NaiveTime::MIN)
    }

    #[test]
    fn short_date_uses_only_the_culture_pattern() {
        let de = Culture::lookup("de-DE").unwrap();
        assert_eq!(de.parse_short_date("24.12.2023").unwrap(), date(2023, 12, 24));
        assert!(de.parse_short_date("12/24/2023").is_err());
        assert!(de.parse_short_date("2023-12-24").is_err());
        assert!(de.parse_short_date("24.12.2023 10:00").is_err());
    }

    #[test]
    fn short_date_rejects_stray_whitespace() {
        let gb = Culture::lookup("en-GB").unwrap();
        assert!(gb.parse_short_date(" 05/11/2023").is_err());
        assert!(gb.parse_short_date("05/ 11/2023").is_err());
        assert!(gb.parse_short_date("05/11/2023 ").is_err());

        let spaced = Culture::invariant().with_short_date_pattern("%d %m %Y").unwrap();
        assert_eq!(spaced.parse_short_date("05 11 2023").unwrap(), date(2023, 11, 5));
        assert!(spaced.parse_short_date("05  11 2023").is_ok());
        assert!(spaced.parse_short_date("05 112023").is_err());
    }

    #[test]
    fn invalid_calendar_dates_are_rejected() {
        let gb = Culture::lookup("en-GB").unwrap();
        assert!(gb.parse_short_date("31/02/2024").is_err());
        assert_eq!(gb.parse_short_date("29/02/2024").unwrap(), date(2024, 2, 29));
    }

    #[test]
    fn lookup_is_forgiving_about_spelling() {
        assert_eq!(Culture::lookup("DE_de").unwrap().name(), "de-DE");
        assert!(Culture::lookup("xx-YY").is_none());
    }

    #[test]
    fn custom_patterns_are_validated() {
        assert!(Culture::new("custom", "%d %B %Y", "%H:%M").is_ok());
        let err = Culture::new("broken", "%Q", "%H:%M").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Config);
    }

    #[test]
    fn lenient_parse_falls_back_to_iso() {
        let ru = Culture::lookup("ru-RU").unwrap();
        let noon = NaiveDate::from_ymd_opt(2024, 3, 8).unwrap().and_hms_opt(12, 30, 0).unwrap();
        assert_eq!(ru.parse_date_time("08.03.2024 12:30:00").unwrap(), noon);
        assert_eq!(ru.parse_date_time("2024-03-08T12:30:00").unwrap(), noon);
        assert_eq!(ru.parse_date_time("08.03.2024").unwrap(), date(2024, 3, 8));
        assert!(ru.parse_date_time("March 8").is_err());
    }

    #[test]
    fn formats_with_general_pattern() {
        let ja = Culture::lookup("ja-JP").unwrap();
        let value = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap().and_hms_opt(7, 5, 9).unwrap();
        assert_eq!(ja.format_date_time(&value), "2024/01/05 07:05:09");
    }
}
