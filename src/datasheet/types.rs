//! Field schema descriptors for datasheet record shapes
//!
//! A record shape declares its fields once, statically and in constructor
//! order. The resolver turns that declaration into a cached slot table, so
//! nothing about a shape is discovered at runtime.

use super::errors::{DatasheetError, DatasheetResult};

/// Width and signedness of an integer field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntWidth {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
}

impl IntWidth {
    pub fn is_signed(&self) -> bool {
        matches!(
            self,
            IntWidth::I8 | IntWidth::I16 | IntWidth::I32 | IntWidth::I64
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IntWidth::I8 => "i8",
            IntWidth::U8 => "u8",
            IntWidth::I16 => "i16",
            IntWidth::U16 => "u16",
            IntWidth::I32 => "i32",
            IntWidth::U32 => "u32",
            IntWidth::I64 => "i64",
            IntWidth::U64 => "u64",
        }
    }
}

/// Semantic type of a declared field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// `0`/`1` or a boolean literal
    Bool,
    /// Base-10 integer of the given width
    Int(IntWidth),
    /// 32-bit float
    Float32,
    /// 64-bit float
    Float64,
    /// Decimal number, held as a 64-bit float
    Decimal,
    /// UTF-8 text, passed through unchanged
    String,
    /// Enumeration matched by case-sensitive member name
    Enum {
        /// Member names in declaration order
        members: &'static [&'static str],
    },
    /// Homogeneous list. Declarable on a shape but has no datasheet encoding.
    List(&'static FieldType),
}

impl FieldType {
    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::Bool => "bool",
            FieldType::Int(width) => width.as_str(),
            FieldType::Float32 => "f32",
            FieldType::Float64 => "f64",
            FieldType::Decimal => "decimal",
            FieldType::String => "string",
            FieldType::Enum { .. } => "enum",
            FieldType::List(_) => "list",
        }
    }
}

/// One declared field of a record shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    /// Canonical snake_case field name
    pub name: &'static str,
    /// Declared value type
    pub field_type: FieldType,
    /// Whether an empty datasheet field is accepted as null
    pub nullable: bool,
}

impl FieldDef {
    /// A field that must carry a value on every line
    pub const fn required(name: &'static str, field_type: FieldType) -> Self {
        Self {
            name,
            field_type,
            nullable: false,
        }
    }

    /// A field whose empty value decodes to null
    pub const fn nullable(name: &'static str, field_type: FieldType) -> Self {
        Self {
            name,
            field_type,
            nullable: true,
        }
    }
}

/// A converted datasheet value, positioned by field slot
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    /// Index into the field's enumeration members
    Enum(usize),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    fn kind(&self) -> &'static str {
        match self {
            FieldValue::Null => "null",
            FieldValue::Bool(_) => "bool",
            FieldValue::Int(_) => "signed integer",
            FieldValue::UInt(_) => "unsigned integer",
            FieldValue::Float(_) => "float",
            FieldValue::Text(_) => "string",
            FieldValue::Enum(_) => "enum",
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<f32> for FieldValue {
    fn from(value: f32) -> Self {
        FieldValue::Float(f64::from(value))
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

macro_rules! signed_field_value {
    ($($t:ty),*) => {$(
        impl From<$t> for FieldValue {
            fn from(value: $t) -> Self {
                FieldValue::Int(i64::from(value))
            }
        }
    )*};
}

macro_rules! unsigned_field_value {
    ($($t:ty),*) => {$(
        impl From<$t> for FieldValue {
            fn from(value: $t) -> Self {
                FieldValue::UInt(u64::from(value))
            }
        }
    )*};
}

signed_field_value!(i8, i16, i32, i64);
unsigned_field_value!(u8, u16, u32, u64);

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}

/// An enumeration that can appear as a datasheet field
pub trait DatasheetEnum: Sized + Copy {
    /// Member names, in the order `member_index` numbers them
    const MEMBERS: &'static [&'static str];

    /// Maps a member index back to the variant
    fn from_member_index(index: usize) -> Option<Self>;

    /// Index of this variant in `MEMBERS`
    fn member_index(&self) -> usize;
}

/// A record shape that can be read from and written to a datasheet.
///
/// Implementors list their fields in constructor order; `from_slots`
/// receives the converted values in exactly that order.
pub trait Datasheet: Sized + 'static {
    /// Shape name used in diagnostics
    const SHAPE: &'static str;

    /// Declared fields, in slot order
    fn fields() -> &'static [FieldDef];

    /// Constructs a record from converted slot values
    fn from_slots(slots: SlotReader) -> DatasheetResult<Self>;

    /// Decomposes a record into slot values, in `fields()` order
    fn to_slots(&self) -> Vec<FieldValue>;
}

/// Sequential, typed access to the converted values of one line
pub struct SlotReader {
    shape: &'static str,
    fields: &'static [FieldDef],
    values: std::vec::IntoIter<FieldValue>,
    position: usize,
}

impl SlotReader {
    pub fn new(shape: &'static str, fields: &'static [FieldDef], values: Vec<FieldValue>) -> Self {
        Self {
            shape,
            fields,
            values: values.into_iter(),
            position: 0,
        }
    }

    fn next_value(&mut self) -> DatasheetResult<(FieldValue, &'static str)> {
        let name = self
            .fields
            .get(self.position)
            .map(|f| f.name)
            .unwrap_or("<past end>");
        let value = self
            .values
            .next()
            .ok_or_else(|| DatasheetError::slot_mismatch(self.shape, name, "value missing"))?;
        self.position += 1;
        Ok((value, name))
    }

    fn mismatch<T>(&self, name: &str, expected: &str, found: &FieldValue) -> DatasheetResult<T> {
        Err(DatasheetError::slot_mismatch(
            self.shape,
            name,
            format!("expected {}, found {}", expected, found.kind()),
        ))
    }

    /// Reads a required integer slot
    pub fn int<T>(&mut self) -> DatasheetResult<T>
    where
        T: TryFrom<i64> + TryFrom<u64>,
    {
        let (value, name) = self.next_value()?;
        match self.narrow(name, value)? {
            Some(v) => Ok(v),
            None => self.mismatch(name, "integer", &FieldValue::Null),
        }
    }

    /// Reads a nullable integer slot
    pub fn opt_int<T>(&mut self) -> DatasheetResult<Option<T>>
    where
        T: TryFrom<i64> + TryFrom<u64>,
    {
        let (value, name) = self.next_value()?;
        self.narrow(name, value)
    }

    fn narrow<T>(&self, name: &str, value: FieldValue) -> DatasheetResult<Option<T>>
    where
        T: TryFrom<i64> + TryFrom<u64>,
    {
        let narrowed = match &value {
            FieldValue::Null => return Ok(None),
            FieldValue::Int(v) => <T as TryFrom<i64>>::try_from(*v).ok(),
            FieldValue::UInt(v) => <T as TryFrom<u64>>::try_from(*v).ok(),
            other => return self.mismatch(name, "integer", other),
        };
        match narrowed {
            Some(v) => Ok(Some(v)),
            None => self.mismatch(name, "integer within declared width", &value),
        }
    }

    /// Reads a required float slot
    pub fn float(&mut self) -> DatasheetResult<f64> {
        let (value, name) = self.next_value()?;
        match value {
            FieldValue::Float(v) => Ok(v),
            other => self.mismatch(name, "float", &other),
        }
    }

    /// Reads a nullable float slot
    pub fn opt_float(&mut self) -> DatasheetResult<Option<f64>> {
        let (value, name) = self.next_value()?;
        match value {
            FieldValue::Null => Ok(None),
            FieldValue::Float(v) => Ok(Some(v)),
            other => self.mismatch(name, "float", &other),
        }
    }

    /// Reads a required f32 slot
    pub fn f32(&mut self) -> DatasheetResult<f32> {
        self.float().map(|v| v as f32)
    }

    /// Reads a nullable f32 slot
    pub fn opt_f32(&mut self) -> DatasheetResult<Option<f32>> {
        self.opt_float().map(|v| v.map(|f| f as f32))
    }

    /// Reads a required boolean slot
    pub fn bool(&mut self) -> DatasheetResult<bool> {
        let (value, name) = self.next_value()?;
        match value {
            FieldValue::Bool(v) => Ok(v),
            other => self.mismatch(name, "bool", &other),
        }
    }

    /// Reads a nullable boolean slot
    pub fn opt_bool(&mut self) -> DatasheetResult<Option<bool>> {
        let (value, name) = self.next_value()?;
        match value {
            FieldValue::Null => Ok(None),
            FieldValue::Bool(v) => Ok(Some(v)),
            other => self.mismatch(name, "bool", &other),
        }
    }

    /// Reads a required string slot
    pub fn string(&mut self) -> DatasheetResult<String> {
        let (value, name) = self.next_value()?;
        match value {
            FieldValue::Text(v) => Ok(v),
            other => self.mismatch(name, "string", &other),
        }
    }

    /// Reads a nullable string slot
    pub fn opt_string(&mut self) -> DatasheetResult<Option<String>> {
        let (value, name) = self.next_value()?;
        match value {
            FieldValue::Null => Ok(None),
            FieldValue::Text(v) => Ok(Some(v)),
            other => self.mismatch(name, "string", &other),
        }
    }

    /// Reads a required enumeration slot
    pub fn enumeration<E: DatasheetEnum>(&mut self) -> DatasheetResult<E> {
        let (value, name) = self.next_value()?;
        match value {
            FieldValue::Enum(index) => match E::from_member_index(index) {
                Some(v) => Ok(v),
                None => self.mismatch(name, "known enum member", &FieldValue::Enum(index)),
            },
            other => self.mismatch(name, "enum", &other),
        }
    }
}
