//! Generic value-to-type conversion helpers.
//!
//! [`Converter::try_convert`] is the safe variant: it never fails, it only
//! reports whether the conversion worked. [`Converter::convert_to`] is the
//! direct variant: it converts into a Rust type and hands any error back.

// Lets `#[derive(ConvertEnum)]` output (which names `::harp_common`) compile inside this crate.
extern crate self as harp_common;

pub mod coerce;
pub mod config;
pub mod converter;
pub mod culture;
pub mod error;
pub mod target;
pub mod value;

pub use harp_common_derive::ConvertEnum;

pub use config::ConvertConfig;
pub use converter::Converter;
pub use culture::Culture;
pub use error::{ConvertError, ErrorKind};
pub use target::{ConvertEnum, EnumType, EnumValue, ScalarType, TargetType};
pub use value::{FromValue, Value};
