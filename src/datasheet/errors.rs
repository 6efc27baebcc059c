//! Datasheet error types
//!
//! Error codes:
//! - CENSUS_SCHEMA_UNKNOWN_LABEL (SCHEMA)
//! - CENSUS_SCHEMA_DUPLICATE_LABEL (SCHEMA)
//! - CENSUS_SCHEMA_NO_FIELDS (SCHEMA)
//! - CENSUS_SCHEMA_MISSING_COLUMN (SCHEMA)
//! - CENSUS_SCHEMA_UNSUPPORTED_TYPE (SCHEMA)
//! - CENSUS_CONVERSION_FAILED (CONVERSION)
//! - CENSUS_SLOT_MISMATCH (CONVERSION)
//! - CENSUS_MISSING_HEADER (FORMAT)
//! - CENSUS_INVALID_ENCODING (FORMAT)
//! - CENSUS_UNENCODABLE_VALUE (FORMAT)
//! - CENSUS_DESERIALIZE_CANCELLED (CANCELLED)
//!
//! Every kind is fatal for the sheet being processed.

use std::fmt;
use std::num::{ParseFloatError, ParseIntError};
use std::str::ParseBoolError;

use thiserror::Error;

/// Broad classification of datasheet failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Header or shape declaration cannot be resolved
    Schema,
    /// A raw value could not be converted
    Conversion,
    /// The byte stream is not a well-formed datasheet
    Format,
    /// Processing stopped on request
    Cancelled,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Schema => write!(f, "SCHEMA"),
            ErrorKind::Conversion => write!(f, "CONVERSION"),
            ErrorKind::Format => write!(f, "FORMAT"),
            ErrorKind::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// Datasheet error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasheetErrorCode {
    /// Header label matches no field of the shape
    CensusSchemaUnknownLabel,
    /// Two labels or two fields normalize to the same name
    CensusSchemaDuplicateLabel,
    /// Shape declares no fields
    CensusSchemaNoFields,
    /// Required field has no header column
    CensusSchemaMissingColumn,
    /// Declared field type has no converter
    CensusSchemaUnsupportedType,
    /// Raw value failed to parse
    CensusConversionFailed,
    /// Shape constructor disagrees with its field declaration
    CensusSlotMismatch,
    /// Stream does not start with the header marker
    CensusMissingHeader,
    /// Field bytes are not UTF-8
    CensusInvalidEncoding,
    /// Value contains a separator or line break
    CensusUnencodableValue,
    /// Cancellation observed between lines
    CensusDeserializeCancelled,
}

impl DatasheetErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            DatasheetErrorCode::CensusSchemaUnknownLabel => "CENSUS_SCHEMA_UNKNOWN_LABEL",
            DatasheetErrorCode::CensusSchemaDuplicateLabel => "CENSUS_SCHEMA_DUPLICATE_LABEL",
            DatasheetErrorCode::CensusSchemaNoFields => "CENSUS_SCHEMA_NO_FIELDS",
            DatasheetErrorCode::CensusSchemaMissingColumn => "CENSUS_SCHEMA_MISSING_COLUMN",
            DatasheetErrorCode::CensusSchemaUnsupportedType => "CENSUS_SCHEMA_UNSUPPORTED_TYPE",
            DatasheetErrorCode::CensusConversionFailed => "CENSUS_CONVERSION_FAILED",
            DatasheetErrorCode::CensusSlotMismatch => "CENSUS_SLOT_MISMATCH",
            DatasheetErrorCode::CensusMissingHeader => "CENSUS_MISSING_HEADER",
            DatasheetErrorCode::CensusInvalidEncoding => "CENSUS_INVALID_ENCODING",
            DatasheetErrorCode::CensusUnencodableValue => "CENSUS_UNENCODABLE_VALUE",
            DatasheetErrorCode::CensusDeserializeCancelled => "CENSUS_DESERIALIZE_CANCELLED",
        }
    }

    /// Returns the kind of failure this code reports
    pub fn kind(&self) -> ErrorKind {
        match self {
            DatasheetErrorCode::CensusSchemaUnknownLabel
            | DatasheetErrorCode::CensusSchemaDuplicateLabel
            | DatasheetErrorCode::CensusSchemaNoFields
            | DatasheetErrorCode::CensusSchemaMissingColumn
            | DatasheetErrorCode::CensusSchemaUnsupportedType => ErrorKind::Schema,
            DatasheetErrorCode::CensusConversionFailed
            | DatasheetErrorCode::CensusSlotMismatch => ErrorKind::Conversion,
            DatasheetErrorCode::CensusMissingHeader
            | DatasheetErrorCode::CensusInvalidEncoding
            | DatasheetErrorCode::CensusUnencodableValue => ErrorKind::Format,
            DatasheetErrorCode::CensusDeserializeCancelled => ErrorKind::Cancelled,
        }
    }
}

impl fmt::Display for DatasheetErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Why a single raw value failed to convert
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertCause {
    #[error("invalid integer: {0}")]
    Int(#[from] ParseIntError),

    #[error("invalid number: {0}")]
    Float(#[from] ParseFloatError),

    #[error("invalid boolean: {0}")]
    Bool(#[from] ParseBoolError),

    #[error("'{0}' is not a member of the enumeration")]
    UnknownMember(String),

    #[error("value is required but the field is empty")]
    Missing,
}

/// Datasheet error with full context
#[derive(Debug, Clone)]
pub struct DatasheetError {
    code: DatasheetErrorCode,
    message: String,
    shape: Option<&'static str>,
    field: Option<String>,
    raw_value: Option<String>,
    line: Option<usize>,
    cause: Option<ConvertCause>,
}

impl DatasheetError {
    fn new(code: DatasheetErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            shape: None,
            field: None,
            raw_value: None,
            line: None,
            cause: None,
        }
    }

    /// Header label with no matching field
    pub fn unknown_label(shape: &'static str, label: impl Into<String>) -> Self {
        let label = label.into();
        let mut err = Self::new(
            DatasheetErrorCode::CensusSchemaUnknownLabel,
            format!(
                "The {} shape has no field for the header labelled '{}'",
                shape, label
            ),
        );
        err.shape = Some(shape);
        err.field = Some(label);
        err
    }

    /// Two header columns, or two declared fields, share a normalized name
    pub fn duplicate_label(shape: &'static str, label: impl Into<String>) -> Self {
        let label = label.into();
        let mut err = Self::new(
            DatasheetErrorCode::CensusSchemaDuplicateLabel,
            format!(
                "The label '{}' resolves to more than one column or field of {}",
                label, shape
            ),
        );
        err.shape = Some(shape);
        err.field = Some(label);
        err
    }

    /// Shape exposes no usable field list
    pub fn no_fields(shape: &'static str) -> Self {
        let mut err = Self::new(
            DatasheetErrorCode::CensusSchemaNoFields,
            format!("Cannot deserialize to {}: it declares no fields", shape),
        );
        err.shape = Some(shape);
        err
    }

    /// Required field is absent from the header
    pub fn missing_column(shape: &'static str, field: &str) -> Self {
        let mut err = Self::new(
            DatasheetErrorCode::CensusSchemaMissingColumn,
            format!(
                "The header has no column for required field '{}' of {}",
                field, shape
            ),
        );
        err.shape = Some(shape);
        err.field = Some(field.to_string());
        err
    }

    /// Declared type has no converter
    pub fn unsupported_type(shape: &'static str, field: &str, type_name: &str) -> Self {
        let mut err = Self::new(
            DatasheetErrorCode::CensusSchemaUnsupportedType,
            format!(
                "Field '{}' of {} has type {}, which datasheets cannot carry",
                field, shape, type_name
            ),
        );
        err.shape = Some(shape);
        err.field = Some(field.to_string());
        err
    }

    /// Raw value failed to convert
    pub fn conversion(
        shape: &'static str,
        field: &str,
        raw_value: Option<&str>,
        cause: ConvertCause,
    ) -> Self {
        let mut err = Self::new(
            DatasheetErrorCode::CensusConversionFailed,
            format!(
                "Failed to convert value {:?} for field '{}' of {}",
                raw_value.unwrap_or(""),
                field,
                shape
            ),
        );
        err.shape = Some(shape);
        err.field = Some(field.to_string());
        err.raw_value = raw_value.map(str::to_string);
        err.cause = Some(cause);
        err
    }

    /// Constructor read a slot that does not match the declaration
    pub fn slot_mismatch(shape: &'static str, field: &str, reason: impl Into<String>) -> Self {
        let mut err = Self::new(
            DatasheetErrorCode::CensusSlotMismatch,
            format!("Slot '{}' of {}: {}", field, shape, reason.into()),
        );
        err.shape = Some(shape);
        err.field = Some(field.to_string());
        err
    }

    /// Stream lacks the leading header marker
    pub fn missing_header() -> Self {
        Self::new(
            DatasheetErrorCode::CensusMissingHeader,
            "No header found".to_string(),
        )
    }

    /// Field bytes are not valid UTF-8
    pub fn invalid_encoding(line: usize, reason: impl Into<String>) -> Self {
        let mut err = Self::new(
            DatasheetErrorCode::CensusInvalidEncoding,
            format!("Line {} is not valid UTF-8: {}", line, reason.into()),
        );
        err.line = Some(line);
        err
    }

    /// A value cannot be written without corrupting the line structure
    pub fn unencodable(shape: &'static str, field: &str, raw_value: &str) -> Self {
        let mut err = Self::new(
            DatasheetErrorCode::CensusUnencodableValue,
            format!(
                "Value {:?} of field '{}' of {} contains a separator or line break",
                raw_value, field, shape
            ),
        );
        err.shape = Some(shape);
        err.field = Some(field.to_string());
        err.raw_value = Some(raw_value.to_string());
        err
    }

    /// Deserialization stopped because cancellation was requested
    pub fn cancelled(shape: &'static str, line: usize) -> Self {
        let mut err = Self::new(
            DatasheetErrorCode::CensusDeserializeCancelled,
            format!("Deserialization of {} cancelled before line {}", shape, line),
        );
        err.shape = Some(shape);
        err.line = Some(line);
        err
    }

    /// Attaches the 1-based line number the error occurred on
    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    pub fn code(&self) -> DatasheetErrorCode {
        self.code
    }

    pub fn kind(&self) -> ErrorKind {
        self.code.kind()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Target shape, if known
    pub fn shape(&self) -> Option<&'static str> {
        self.shape
    }

    /// Field name or offending header label, if applicable
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// The raw text that failed to convert, if any
    pub fn raw_value(&self) -> Option<&str> {
        self.raw_value.as_deref()
    }

    pub fn line(&self) -> Option<usize> {
        self.line
    }

    /// Underlying parse failure, for conversion errors
    pub fn cause(&self) -> Option<&ConvertCause> {
        self.cause.as_ref()
    }
}

impl fmt::Display for DatasheetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.kind(), self.code.code(), self.message)?;
        if let Some(line) = self.line {
            write!(f, " (line {})", line)?;
        }
        if let Some(cause) = &self.cause {
            write!(f, ": {}", cause)?;
        }
        Ok(())
    }
}

impl std::error::Error for DatasheetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_ref()
            .map(|c| c as &(dyn std::error::Error + 'static))
    }
}

/// Result type for datasheet operations
pub type DatasheetResult<T> = Result<T, DatasheetError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            DatasheetErrorCode::CensusSchemaUnknownLabel.code(),
            "CENSUS_SCHEMA_UNKNOWN_LABEL"
        );
        assert_eq!(
            DatasheetErrorCode::CensusMissingHeader.code(),
            "CENSUS_MISSING_HEADER"
        );
    }

    #[test]
    fn test_kinds() {
        assert_eq!(DatasheetError::no_fields("x").kind(), ErrorKind::Schema);
        assert_eq!(DatasheetError::missing_header().kind(), ErrorKind::Format);
        assert_eq!(DatasheetError::cancelled("x", 3).kind(), ErrorKind::Cancelled);
    }

    #[test]
    fn test_conversion_error_carries_context() {
        let cause: ConvertCause = "abc".parse::<u32>().unwrap_err().into();
        let err = DatasheetError::conversion("currency", "currency_id", Some("abc"), cause)
            .at_line(4);

        assert_eq!(err.shape(), Some("currency"));
        assert_eq!(err.field(), Some("currency_id"));
        assert_eq!(err.raw_value(), Some("abc"));
        assert_eq!(err.line(), Some(4));
        assert!(err.source().is_some());

        let display = err.to_string();
        assert!(display.contains("CENSUS_CONVERSION_FAILED"));
        assert!(display.contains("currency_id"));
        assert!(display.contains("line 4"));
    }
}
