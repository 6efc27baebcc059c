//! Value converter registry
//!
//! One converter per declared field type, chosen when a shape's schema is
//! built. Unsupported types fail there, never while parsing a line.

use super::errors::{ConvertCause, DatasheetError, DatasheetResult};
use super::types::{FieldDef, FieldType, FieldValue, IntWidth};

/// Parse function for one declared field
#[derive(Debug, Clone, PartialEq)]
pub enum Converter {
    Bool,
    Int(IntWidth),
    Float32,
    Float64,
    Text,
    Enum(&'static [&'static str]),
    /// Null passes through; anything else goes to the inner converter
    Nullable(Box<Converter>),
}

impl Converter {
    /// Selects the converter for a declared field
    pub fn for_field(shape: &'static str, field: &FieldDef) -> DatasheetResult<Self> {
        let inner = match field.field_type {
            FieldType::Bool => Converter::Bool,
            FieldType::Int(width) => Converter::Int(width),
            FieldType::Float32 => Converter::Float32,
            FieldType::Float64 | FieldType::Decimal => Converter::Float64,
            FieldType::String => Converter::Text,
            FieldType::Enum { members } => Converter::Enum(members),
            FieldType::List(_) => {
                return Err(DatasheetError::unsupported_type(
                    shape,
                    field.name,
                    field.field_type.type_name(),
                ))
            }
        };

        if field.nullable {
            Ok(Converter::Nullable(Box::new(inner)))
        } else {
            Ok(inner)
        }
    }

    /// Converts one raw token. `None` is an empty field.
    pub fn convert(&self, raw: Option<&str>) -> Result<FieldValue, ConvertCause> {
        match (self, raw) {
            (Converter::Nullable(_), None) => Ok(FieldValue::Null),
            (Converter::Nullable(inner), Some(_)) => inner.convert(raw),
            (_, None) => Err(ConvertCause::Missing),
            (Converter::Bool, Some(text)) => parse_bool(text),
            (Converter::Int(width), Some(text)) => parse_int(*width, text),
            (Converter::Float32, Some(text)) => {
                let value: f32 = text.trim().parse()?;
                Ok(FieldValue::Float(f64::from(value)))
            }
            (Converter::Float64, Some(text)) => Ok(FieldValue::Float(text.trim().parse()?)),
            (Converter::Text, Some(text)) => Ok(FieldValue::Text(text.to_string())),
            (Converter::Enum(members), Some(text)) => members
                .iter()
                .position(|m| *m == text)
                .map(FieldValue::Enum)
                .ok_or_else(|| ConvertCause::UnknownMember(text.to_string())),
        }
    }
}

fn parse_bool(text: &str) -> Result<FieldValue, ConvertCause> {
    match text {
        "0" => Ok(FieldValue::Bool(false)),
        "1" => Ok(FieldValue::Bool(true)),
        other => {
            let trimmed = other.trim();
            if trimmed.eq_ignore_ascii_case("true") {
                Ok(FieldValue::Bool(true))
            } else if trimmed.eq_ignore_ascii_case("false") {
                Ok(FieldValue::Bool(false))
            } else {
                // Surfaces the std parse error for anything else
                Ok(FieldValue::Bool(trimmed.parse::<bool>()?))
            }
        }
    }
}

fn parse_int(width: IntWidth, text: &str) -> Result<FieldValue, ConvertCause> {
    let value = match width {
        IntWidth::I8 => FieldValue::Int(i64::from(text.parse::<i8>()?)),
        IntWidth::I16 => FieldValue::Int(i64::from(text.parse::<i16>()?)),
        IntWidth::I32 => FieldValue::Int(i64::from(text.parse::<i32>()?)),
        IntWidth::I64 => FieldValue::Int(text.parse::<i64>()?),
        IntWidth::U8 => FieldValue::UInt(u64::from(text.parse::<u8>()?)),
        IntWidth::U16 => FieldValue::UInt(u64::from(text.parse::<u16>()?)),
        IntWidth::U32 => FieldValue::UInt(u64::from(text.parse::<u32>()?)),
        IntWidth::U64 => FieldValue::UInt(text.parse::<u64>()?),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conv(field: FieldDef) -> Converter {
        Converter::for_field("sample", &field).unwrap()
    }

    #[test]
    fn test_bool_digits_and_literals() {
        let c = conv(FieldDef::required("flag", FieldType::Bool));
        assert_eq!(c.convert(Some("0")).unwrap(), FieldValue::Bool(false));
        assert_eq!(c.convert(Some("1")).unwrap(), FieldValue::Bool(true));
        assert_eq!(c.convert(Some("True")).unwrap(), FieldValue::Bool(true));
        assert_eq!(c.convert(Some("false")).unwrap(), FieldValue::Bool(false));
        assert!(matches!(c.convert(Some("2")), Err(ConvertCause::Bool(_))));
    }

    #[test]
    fn test_int_overflow_and_digits() {
        let c = conv(FieldDef::required("id", FieldType::Int(IntWidth::U8)));
        assert_eq!(c.convert(Some("255")).unwrap(), FieldValue::UInt(255));
        assert!(matches!(c.convert(Some("256")), Err(ConvertCause::Int(_))));
        assert!(matches!(c.convert(Some("-1")), Err(ConvertCause::Int(_))));
        assert!(matches!(c.convert(Some("12a")), Err(ConvertCause::Int(_))));

        let s = conv(FieldDef::required("delta", FieldType::Int(IntWidth::I32)));
        assert_eq!(s.convert(Some("-42")).unwrap(), FieldValue::Int(-42));
    }

    #[test]
    fn test_float_is_locale_invariant() {
        let c = conv(FieldDef::required("scale", FieldType::Float64));
        assert_eq!(c.convert(Some("1.5")).unwrap(), FieldValue::Float(1.5));
        assert!(c.convert(Some("1,5")).is_err());

        let d = conv(FieldDef::required("price", FieldType::Decimal));
        assert_eq!(d.convert(Some("0.25")).unwrap(), FieldValue::Float(0.25));
    }

    #[test]
    fn test_string_passthrough() {
        let c = conv(FieldDef::required("name", FieldType::String));
        assert_eq!(
            c.convert(Some("  spaced ")).unwrap(),
            FieldValue::Text("  spaced ".to_string())
        );
    }

    #[test]
    fn test_enum_is_case_sensitive() {
        const MEMBERS: &[&str] = &["Small", "Large"];
        let c = conv(FieldDef::required("size", FieldType::Enum { members: MEMBERS }));
        assert_eq!(c.convert(Some("Large")).unwrap(), FieldValue::Enum(1));
        assert!(matches!(
            c.convert(Some("large")),
            Err(ConvertCause::UnknownMember(_))
        ));
    }

    #[test]
    fn test_nullable_skips_inner_on_null() {
        let c = conv(FieldDef::nullable("cap", FieldType::Int(IntWidth::U32)));
        assert_eq!(c.convert(None).unwrap(), FieldValue::Null);
        assert_eq!(c.convert(Some("10")).unwrap(), FieldValue::UInt(10));
        assert!(c.convert(Some("x")).is_err());
    }

    #[test]
    fn test_required_rejects_null() {
        let c = conv(FieldDef::required("id", FieldType::Int(IntWidth::U32)));
        assert_eq!(c.convert(None), Err(ConvertCause::Missing));
    }

    #[test]
    fn test_list_is_rejected_at_build_time() {
        let field = FieldDef::required("tags", FieldType::List(&FieldType::String));
        let err = Converter::for_field("sample", &field).unwrap_err();
        assert_eq!(
            err.code(),
            super::super::errors::DatasheetErrorCode::CensusSchemaUnsupportedType
        );
    }
}
