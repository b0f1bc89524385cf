use crate::coerce::coerce;
use crate::culture::Culture;
use crate::error::ConvertError;
use crate::target::{EnumValue, TargetType};
use crate::value::{FromValue, Value};

/// Value-to-type conversion.
///
/// Two flavours with different failure policies:
///
/// - [`Converter::try_convert`]: total. Every failure becomes `None`.
/// - [`Converter::convert_to`]: partial. Coercion errors reach the caller as-is.
///
/// The only state is the [`Culture`] supplying date patterns, so a converter
/// can be shared freely between threads.
#[derive(Debug, Clone, Default)]
pub struct Converter {
    culture: Culture,
}

impl Converter {
    pub fn new(culture: Culture) -> Self {
        Self { culture }
    }

    pub fn culture(&self) -> &Culture {
        &self.culture
    }

    /// Best-effort conversion that never fails.
    ///
    /// `None` means the conversion failed. `Some(Value::Null)` is a successful
    /// conversion to the absent value, which is what `Null` input and empty
    /// strings always produce.
    pub fn try_convert<'a>(&self, value: &Value<'a>, target: &TargetType) -> Option<Value<'a>> {
        match self.convert(value, target) {
            Ok(converted) => Some(converted),
            Err(e) => {
                tracing::trace!(from = value.kind(), target = %target, error = %e, "conversion failed");
                None
            }
        }
    }

    /// The routine behind [`Converter::try_convert`], with the error kept.
    ///
    /// 1. `Null` → `Null`, whatever the target
    /// 2. one `Optional` layer is stripped from the target
    /// 3. strings: empty → `Null`; datetime targets use exactly the culture's
    ///    short-date pattern; enum targets parse member names
    /// 4. everything else goes through the generic coercion
    pub fn convert<'a>(
        &self,
        value: &Value<'a>,
        target: &TargetType,
    ) -> Result<Value<'a>, ConvertError> {
        if value.is_null() {
            return Ok(Value::Null);
        }

        let effective = target.effective();
        if let Value::String(s) = value {
            if s.is_empty() {
                return Ok(Value::Null);
            }
            match effective {
                TargetType::DateTime => {
                    return self.culture.parse_short_date(s).map(Value::DateTime);
                }
                TargetType::Enum(ty) => return EnumValue::parse(ty, s).map(Value::Enum),
                _ => {}
            }
        }

        coerce(value, effective, &self.culture)
    }

    /// Direct conversion into a statically known type.
    ///
    /// `Option<U>` targets turn `Null` into `None` and coerce anything else
    /// into `U`. Non-optional targets coerce directly, so `Null` is an error.
    /// No empty-string, enum-name or short-date handling happens here.
    pub fn convert_to<T: FromValue>(&self, value: &Value<'_>) -> Result<T, ConvertError> {
        let coerced = coerce(value, &T::target_type(), &self.culture)?;
        T::from_value(coerced)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{NaiveDate, NaiveDateTime};

    use super::*;
    use crate::error::ErrorKind;
    use crate::target::{EnumType, ScalarType};

    fn planet() -> Arc<EnumType> {
        Arc::new(EnumType::new("Planet", [("Mercury", 1), ("Venus", 2), ("Earth", 3)]))
    }

    #[test]
    fn null_converts_to_null_for_every_target() {
        let converter = Converter::default();
        let targets = [
            TargetType::Scalar(ScalarType::Int32),
            TargetType::Scalar(ScalarType::String),
            TargetType::DateTime,
            TargetType::Enum(planet()),
            TargetType::optional(ScalarType::Bool.into()),
        ];
        for target in &targets {
            assert_eq!(converter.try_convert(&Value::Null, target), Some(Value::Null), "{target}");
        }
    }

    #[test]
    fn empty_string_short_circuits() {
        let converter = Converter::default();
        for target in [TargetType::Scalar(ScalarType::Int64), TargetType::DateTime, TargetType::Enum(planet())] {
            assert_eq!(converter.try_convert(&Value::from(""), &target), Some(Value::Null));
        }
    }

    #[test]
    fn whitespace_is_not_empty() {
        let converter = Converter::default();
        let target = TargetType::Scalar(ScalarType::Int32);
        assert_eq!(converter.try_convert(&Value::from("  "), &target), None);
    }

    #[test]
    fn datetime_uses_only_the_short_date_pattern() {
        let converter = Converter::new(Culture::lookup("en-GB").unwrap());
        let target = TargetType::optional(TargetType::DateTime);
        let expected = NaiveDate::from_ymd_opt(2023, 11, 5).unwrap().and_hms_opt(0, 0, 0).unwrap();

        assert_eq!(
            converter.try_convert(&Value::from("05/11/2023"), &target),
            Some(Value::DateTime(expected))
        );
        // accepted by the lenient coercion, but not by the exact short-date parse
        assert_eq!(converter.try_convert(&Value::from("2023-11-05"), &target), None);
        assert_eq!(converter.try_convert(&Value::from("05/11/2023 10:00:00"), &target), None);
    }

    #[test]
    fn datetime_rejects_whitespace_the_pattern_lacks() {
        let converter = Converter::new(Culture::lookup("en-GB").unwrap());
        let target = TargetType::DateTime;

        assert_eq!(converter.try_convert(&Value::from(" 05/11/2023"), &target), None);
        assert_eq!(converter.try_convert(&Value::from("05/ 11/2023"), &target), None);
        assert_eq!(converter.try_convert(&Value::from("05/11/2023 "), &target), None);
    }

    #[test]
    fn enum_names_parse_and_unknown_names_fail() {
        let converter = Converter::default();
        let target = TargetType::Enum(planet());

        let earth = converter.try_convert(&Value::from("Earth"), &target).unwrap();
        assert_eq!(earth, Value::Enum(EnumValue::new(planet(), 3)));
        assert_eq!(converter.try_convert(&Value::from("Pluto"), &target), None);

        let err = converter.convert(&Value::from("Pluto"), &target).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[test]
    fn non_text_falls_through_to_coercion() {
        let converter = Converter::default();
        let target = TargetType::optional(ScalarType::UInt8.into());
        assert_eq!(converter.try_convert(&Value::Int32(255), &target), Some(Value::UInt8(255)));
        assert_eq!(converter.try_convert(&Value::Int32(256), &target), None);
        assert_eq!(
            converter.try_convert(&Value::from("42"), &ScalarType::Int32.into()),
            Some(Value::Int32(42))
        );
    }

    #[test]
    fn convert_to_optional_handles_null() {
        let converter = Converter::default();
        assert_eq!(converter.convert_to::<Option<i32>>(&Value::Null).unwrap(), None);
        assert_eq!(converter.convert_to::<Option<i32>>(&Value::from("12")).unwrap(), Some(12));
    }

    #[test]
    fn convert_to_propagates_errors() {
        let converter = Converter::default();

        let err = converter.convert_to::<i32>(&Value::from("twelve")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);

        let err = converter.convert_to::<u8>(&Value::Int64(-1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Overflow);

        let err = converter.convert_to::<i32>(&Value::Null).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Null);

        // no empty-string short-circuit on this path
        assert!(converter.convert_to::<Option<i32>>(&Value::from("")).is_err());
    }

    #[test]
    fn convert_to_datetime_is_lenient() {
        let converter = Converter::new(Culture::lookup("de-DE").unwrap());
        let parsed: NaiveDateTime = converter.convert_to(&Value::from("2024-01-31 23:59:00")).unwrap();
        assert_eq!(
            parsed,
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap().and_hms_opt(23, 59, 0).unwrap()
        );
    }
}
