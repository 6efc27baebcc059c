//! Datasheet serializer
//!
//! Entry point for reading and writing datasheets. Holds the shape cache it
//! resolves headers against, so one serializer should be shared for the life
//! of the process.

use std::sync::Arc;

use super::errors::{DatasheetError, DatasheetResult};
use super::materializer::Records;
use super::resolver::SchemaRegistry;
use super::tokenizer::{LineTokenizer, FIELD_SEPARATOR, HEADER_MARKER};
use super::types::{Datasheet, FieldDef, FieldType, FieldValue};
use crate::shutdown::Shutdown;

const LINE_TERMINATOR: &[u8] = b"\r\n";

/// Reads and writes datasheets of any registered shape
#[derive(Debug, Clone, Default)]
pub struct DatasheetSerializer {
    registry: Arc<SchemaRegistry>,
}

impl DatasheetSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses an existing shape cache
    pub fn with_registry(registry: Arc<SchemaRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }

    /// Opens a datasheet for lazy reading.
    ///
    /// The header is resolved immediately, so schema errors surface here and
    /// not on the first record.
    pub fn records<'a, T: Datasheet>(&self, data: &'a [u8]) -> DatasheetResult<Records<'a, T>> {
        let mut lines = LineTokenizer::with_header(data)?;
        let header = lines.next().ok_or_else(DatasheetError::missing_header)??;
        let schema = self.registry.resolve::<T>(&header)?;
        Ok(Records::new(schema, lines))
    }

    /// Reads every record of a datasheet. Any failure discards the sheet.
    pub fn deserialize<T: Datasheet>(&self, data: &[u8]) -> DatasheetResult<Vec<T>> {
        self.records::<T>(data)?.collect()
    }

    /// As [`deserialize`](Self::deserialize), stopping between lines once
    /// `shutdown` is triggered.
    pub fn deserialize_until<T: Datasheet>(
        &self,
        data: &[u8],
        shutdown: &Shutdown,
    ) -> DatasheetResult<Vec<T>> {
        if shutdown.is_triggered() {
            return Err(DatasheetError::cancelled(T::SHAPE, 1));
        }
        self.records::<T>(data)?.until(shutdown).collect()
    }

    /// Writes records as a datasheet.
    ///
    /// The header carries the upper-cased field names. Every field is
    /// followed by `^` and every line ends with `\r\n`. Nulls, and empty
    /// strings, are written as empty fields and so read back as null.
    pub fn serialize<T: Datasheet>(&self, records: &[T]) -> DatasheetResult<Vec<u8>> {
        // Validates the shape the same way reading it would
        self.registry.shape::<T>()?;

        let fields = T::fields();
        let mut out = Vec::with_capacity(64 * (records.len() + 1));

        out.push(HEADER_MARKER);
        for field in fields {
            out.extend_from_slice(field.name.to_ascii_uppercase().as_bytes());
            out.push(FIELD_SEPARATOR);
        }
        out.extend_from_slice(LINE_TERMINATOR);

        for record in records {
            let slots = record.to_slots();
            if slots.len() != fields.len() {
                return Err(DatasheetError::slot_mismatch(
                    T::SHAPE,
                    "<record>",
                    format!("{} slots for {} fields", slots.len(), fields.len()),
                ));
            }

            for (field, value) in fields.iter().zip(&slots) {
                encode_value::<T>(field, value, &mut out)?;
                out.push(FIELD_SEPARATOR);
            }
            out.extend_from_slice(LINE_TERMINATOR);
        }

        Ok(out)
    }
}

fn encode_value<T: Datasheet>(
    field: &FieldDef,
    value: &FieldValue,
    out: &mut Vec<u8>,
) -> DatasheetResult<()> {
    let text = match (value, field.field_type) {
        (FieldValue::Null, _) => return Ok(()),
        (FieldValue::Bool(true), _) => "1".to_string(),
        (FieldValue::Bool(false), _) => "0".to_string(),
        (FieldValue::Int(v), _) => v.to_string(),
        (FieldValue::UInt(v), _) => v.to_string(),
        // Shortest text that reads back to the same f32
        (FieldValue::Float(v), FieldType::Float32) => (*v as f32).to_string(),
        (FieldValue::Float(v), _) => v.to_string(),
        (FieldValue::Enum(index), FieldType::Enum { members }) => members
            .get(*index)
            .map(|m| m.to_string())
            .ok_or_else(|| {
                DatasheetError::slot_mismatch(
                    T::SHAPE,
                    field.name,
                    format!("enum index {} out of range", index),
                )
            })?,
        (FieldValue::Enum(_), _) => {
            return Err(DatasheetError::slot_mismatch(
                T::SHAPE,
                field.name,
                "enum value for a non-enum field",
            ))
        }
        (FieldValue::Text(s), _) => {
            if s.bytes()
                .any(|b| b == FIELD_SEPARATOR || b == b'\r' || b == b'\n')
            {
                return Err(DatasheetError::unencodable(T::SHAPE, field.name, s));
            }
            s.clone()
        }
    };

    out.extend_from_slice(text.as_bytes());
    Ok(())
}
