//! Datasheet ingestion engine
//!
//! Datasheets are `^`-delimited UTF-8 tables extracted from the client data
//! pack. Reading one goes through four steps:
//!
//! 1. The tokenizer splits the bytes into lines of optional raw tokens
//! 2. The resolver maps the header line onto a record shape's slots
//! 3. The converter for each slot parses its raw token
//! 4. The materializer builds the record once every column converted
//!
//! A single bad value fails the whole sheet.

mod converter;
mod errors;
mod materializer;
mod models;
mod resolver;
mod serializer;
mod tokenizer;
mod types;

pub use converter::Converter;
pub use errors::{ConvertCause, DatasheetError, DatasheetErrorCode, DatasheetResult, ErrorKind};
pub use materializer::{materialize, Records};
pub use models::{ClientDatasheet, Currency, Experience, Faction, ImageSetMapping, ImageType};
pub use resolver::{normalize_label, ColumnSlot, FieldSchema, SchemaRegistry, ShapeSchema};
pub use serializer::DatasheetSerializer;
pub use tokenizer::{LineTokenizer, RawLine, FIELD_SEPARATOR, HEADER_MARKER};
pub use types::{
    Datasheet, DatasheetEnum, FieldDef, FieldType, FieldValue, IntWidth, SlotReader,
};
