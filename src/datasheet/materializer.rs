//! Record materializer
//!
//! Turns tokenized lines into typed records through a resolved
//! [`FieldSchema`]. A record is only constructed once every mapped column of
//! its line has converted.

use std::marker::PhantomData;

use super::errors::{DatasheetError, DatasheetResult};
use super::resolver::FieldSchema;
use super::tokenizer::{LineTokenizer, RawLine};
use super::types::{Datasheet, FieldValue, SlotReader};
use crate::shutdown::Shutdown;

/// Converts one raw line into a record of shape `T`.
///
/// Columns the schema does not map are ignored. Tokens missing from a short
/// line are treated as empty.
pub fn materialize<T: Datasheet>(
    schema: &FieldSchema,
    line: &RawLine<'_>,
    line_number: usize,
) -> DatasheetResult<T> {
    let mut values = vec![FieldValue::Null; schema.slot_count()];
    let fields = schema.shape().fields();

    for column in schema.columns() {
        let raw = line.get(column.column).copied().flatten();
        values[column.slot] = schema
            .converter(column.slot)
            .convert(raw)
            .map_err(|cause| {
                DatasheetError::conversion(T::SHAPE, fields[column.slot].name, raw, cause)
                    .at_line(line_number)
            })?;
    }

    T::from_slots(SlotReader::new(T::SHAPE, T::fields(), values))
        .map_err(|e| e.at_line(line_number))
}

/// Lazy, single-pass sequence of records.
///
/// Yields each record as its line is read. After the first error the
/// iterator is exhausted.
pub struct Records<'a, T> {
    schema: FieldSchema,
    lines: LineTokenizer<'a>,
    shutdown: Option<&'a Shutdown>,
    done: bool,
    _shape: PhantomData<fn() -> T>,
}

impl<'a, T: Datasheet> Records<'a, T> {
    pub(crate) fn new(schema: FieldSchema, lines: LineTokenizer<'a>) -> Self {
        Self {
            schema,
            lines,
            shutdown: None,
            done: false,
            _shape: PhantomData,
        }
    }

    /// Stops with a cancellation error once `shutdown` is triggered.
    ///
    /// Checked before each line, never during a conversion.
    pub fn until(mut self, shutdown: &'a Shutdown) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Resolved column mapping used for this stream
    pub fn schema(&self) -> &FieldSchema {
        &self.schema
    }

    fn step(&mut self) -> Option<DatasheetResult<T>> {
        if let Some(shutdown) = self.shutdown {
            if shutdown.is_triggered() {
                return Some(Err(DatasheetError::cancelled(
                    T::SHAPE,
                    self.lines.line_number() + 1,
                )));
            }
        }

        let line = match self.lines.next()? {
            Ok(line) => line,
            Err(e) => return Some(Err(e)),
        };
        Some(materialize(&self.schema, &line, self.lines.line_number()))
    }
}

impl<'a, T: Datasheet> Iterator for Records<'a, T> {
    type Item = DatasheetResult<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self.step();
        if !matches!(item, Some(Ok(_))) {
            self.done = true;
        }
        item
    }
}

impl<'a, T: Datasheet> std::iter::FusedIterator for Records<'a, T> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasheet::errors::DatasheetErrorCode;
    use crate::datasheet::resolver::SchemaRegistry;
    use crate::datasheet::types::{FieldDef, FieldType, IntWidth};

    #[derive(Debug, PartialEq)]
    struct Row {
        id: u32,
        note: Option<String>,
    }

    impl Datasheet for Row {
        const SHAPE: &'static str = "row";

        fn fields() -> &'static [FieldDef] {
            const FIELDS: &[FieldDef] = &[
                FieldDef::required("id", FieldType::Int(IntWidth::U32)),
                FieldDef::nullable("note", FieldType::String),
            ];
            FIELDS
        }

        fn from_slots(mut slots: SlotReader) -> DatasheetResult<Self> {
            Ok(Self {
                id: slots.int()?,
                note: slots.opt_string()?,
            })
        }

        fn to_slots(&self) -> Vec<FieldValue> {
            vec![self.id.into(), self.note.clone().into()]
        }
    }

    fn records(data: &[u8]) -> Records<'_, Row> {
        let registry = SchemaRegistry::new();
        let mut lines = LineTokenizer::with_header(data).unwrap();
        let header = lines.next().unwrap().unwrap();
        let schema = registry.resolve::<Row>(&header).unwrap();
        Records::new(schema, lines)
    }

    #[test]
    fn test_unmapped_and_short_lines() {
        let registry = SchemaRegistry::new();
        let header = vec![Some("EXTRA"), Some("ID")];
        // EXTRA is unknown, so resolve against a header without it
        assert!(registry.resolve::<Row>(&header).is_err());

        let schema = registry.resolve::<Row>(&[None, Some("ID")]).unwrap();
        let row: Row = materialize(&schema, &vec![Some("ignored"), Some("9")], 2).unwrap();
        assert_eq!(row, Row { id: 9, note: None });
    }

    #[test]
    fn test_lazy_iteration() {
        let rows: Vec<Row> = records(b"#ID^NOTE^\n1^a^\n2^^\n")
            .collect::<DatasheetResult<_>>()
            .unwrap();
        assert_eq!(
            rows,
            vec![
                Row { id: 1, note: Some("a".into()) },
                Row { id: 2, note: None },
            ]
        );
    }

    #[test]
    fn test_fuses_after_error() {
        let mut iter = records(b"#ID^NOTE^\n1^a^\nbad^b^\n3^c^\n");
        assert!(iter.next().unwrap().is_ok());

        let err = iter.next().unwrap().unwrap_err();
        assert_eq!(err.code(), DatasheetErrorCode::CensusConversionFailed);
        assert_eq!(err.field(), Some("id"));
        assert_eq!(err.raw_value(), Some("bad"));
        assert_eq!(err.line(), Some(3));

        assert!(iter.next().is_none());
    }

    #[test]
    fn test_cancellation_between_lines() {
        let (trigger, shutdown) = crate::shutdown::channel();
        let mut iter = records(b"#ID^\n1^\n2^\n").until(&shutdown);
        assert!(iter.next().unwrap().is_ok());

        trigger.trigger();
        let err = iter.next().unwrap().unwrap_err();
        assert_eq!(err.code(), DatasheetErrorCode::CensusDeserializeCancelled);
        assert!(iter.next().is_none());
    }
}
