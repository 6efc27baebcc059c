//! Schema resolver
//!
//! Maps header columns onto the slots of a record shape. The per-shape part
//! (normalized field names and converters) is built once and cached in a
//! [`SchemaRegistry`]; mapping a particular header is a table lookup.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::converter::Converter;
use super::errors::{DatasheetError, DatasheetResult};
use super::types::{Datasheet, FieldDef, FieldType};

/// Decoration stripped from both ends of a header label
const LABEL_DECORATION: char = '*';

/// Normalizes a header label or field name for matching.
///
/// Strips `*` decoration from both ends, removes underscores, lowercases.
pub fn normalize_label(label: &str) -> String {
    label
        .trim_matches(LABEL_DECORATION)
        .chars()
        .filter(|c| *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Cached, header-independent description of one shape
#[derive(Debug)]
pub struct ShapeSchema {
    shape: &'static str,
    fields: &'static [FieldDef],
    converters: Vec<Converter>,
    slots_by_name: HashMap<String, usize>,
}

impl ShapeSchema {
    fn build(shape: &'static str, fields: &'static [FieldDef]) -> DatasheetResult<Self> {
        if fields.is_empty() {
            return Err(DatasheetError::no_fields(shape));
        }

        let mut converters = Vec::with_capacity(fields.len());
        let mut slots_by_name = HashMap::with_capacity(fields.len());

        for (slot, field) in fields.iter().enumerate() {
            converters.push(Converter::for_field(shape, field)?);
            if slots_by_name
                .insert(normalize_label(field.name), slot)
                .is_some()
            {
                return Err(DatasheetError::duplicate_label(shape, field.name));
            }
        }

        Ok(Self {
            shape,
            fields,
            converters,
            slots_by_name,
        })
    }

    pub fn shape(&self) -> &'static str {
        self.shape
    }

    pub fn fields(&self) -> &'static [FieldDef] {
        self.fields
    }

    pub fn slot_count(&self) -> usize {
        self.fields.len()
    }

    /// Slot of the field a label refers to, if any
    pub fn slot_for(&self, label: &str) -> Option<usize> {
        self.slots_by_name.get(&normalize_label(label)).copied()
    }

    /// Maps a header line onto this shape.
    ///
    /// Null labels are skipped. Every other label must name exactly one
    /// field, and every required field must be covered by some column.
    pub fn resolve(self: &Arc<Self>, header: &[Option<&str>]) -> DatasheetResult<FieldSchema> {
        let mut columns = Vec::with_capacity(header.len());
        let mut covered = vec![false; self.slot_count()];

        for (column, label) in header.iter().enumerate() {
            let Some(label) = label else { continue };
            let slot = self
                .slot_for(label)
                .ok_or_else(|| DatasheetError::unknown_label(self.shape, *label))?;

            if covered[slot] {
                return Err(DatasheetError::duplicate_label(self.shape, *label));
            }
            covered[slot] = true;

            let field = &self.fields[slot];
            columns.push(ColumnSlot {
                column,
                slot,
                field_type: field.field_type,
                nullable: field.nullable,
            });
        }

        if let Some((slot, _)) = covered
            .iter()
            .enumerate()
            .find(|(slot, seen)| !**seen && !self.fields[*slot].nullable)
        {
            return Err(DatasheetError::missing_column(
                self.shape,
                self.fields[slot].name,
            ));
        }

        Ok(FieldSchema {
            shape: Arc::clone(self),
            columns,
            column_count: header.len(),
        })
    }
}

/// One header column and the slot it fills
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSlot {
    /// Position in the header line
    pub column: usize,
    /// Position in the shape's field list
    pub slot: usize,
    pub field_type: FieldType,
    pub nullable: bool,
}

/// Column-to-slot table for one header against one shape
#[derive(Debug, Clone)]
pub struct FieldSchema {
    shape: Arc<ShapeSchema>,
    columns: Vec<ColumnSlot>,
    column_count: usize,
}

impl FieldSchema {
    pub fn shape(&self) -> &ShapeSchema {
        &self.shape
    }

    /// Mapped columns, in header order
    pub fn columns(&self) -> &[ColumnSlot] {
        &self.columns
    }

    /// Number of columns the header declared, mapped or not
    pub fn column_count(&self) -> usize {
        self.column_count
    }

    pub fn slot_count(&self) -> usize {
        self.shape.slot_count()
    }

    /// Converter for the given slot
    pub fn converter(&self, slot: usize) -> &Converter {
        &self.shape.converters[slot]
    }
}

/// Process-wide cache of shape schemas, keyed by shape type.
///
/// Entries are only ever inserted. Two callers racing on the same shape
/// both build it; whichever lands first is kept and both get that entry.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    shapes: RwLock<HashMap<TypeId, Arc<ShapeSchema>>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached schema for `T`, building it on first use
    pub fn shape<T: Datasheet>(&self) -> DatasheetResult<Arc<ShapeSchema>> {
        let key = TypeId::of::<T>();

        {
            let shapes = self
                .shapes
                .read()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if let Some(schema) = shapes.get(&key) {
                return Ok(Arc::clone(schema));
            }
        }

        let built = Arc::new(ShapeSchema::build(T::SHAPE, T::fields())?);

        let mut shapes = self
            .shapes
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(Arc::clone(shapes.entry(key).or_insert(built)))
    }

    /// Resolves a header line against shape `T`
    pub fn resolve<T: Datasheet>(&self, header: &[Option<&str>]) -> DatasheetResult<FieldSchema> {
        self.shape::<T>()?.resolve(header)
    }

    /// Number of cached shapes
    pub fn len(&self) -> usize {
        self.shapes
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasheet::errors::DatasheetErrorCode;
    use crate::datasheet::types::{FieldValue, IntWidth, SlotReader};

    struct Sample;

    impl Datasheet for Sample {
        const SHAPE: &'static str = "sample";

        fn fields() -> &'static [FieldDef] {
            const FIELDS: &[FieldDef] = &[
                FieldDef::required("a", FieldType::Int(IntWidth::U32)),
                FieldDef::required("b", FieldType::String),
                FieldDef::nullable("cd", FieldType::Bool),
            ];
            FIELDS
        }

        fn from_slots(_slots: SlotReader) -> DatasheetResult<Self> {
            Ok(Sample)
        }

        fn to_slots(&self) -> Vec<FieldValue> {
            Vec::new()
        }
    }

    struct Empty;

    impl Datasheet for Empty {
        const SHAPE: &'static str = "empty";

        fn fields() -> &'static [FieldDef] {
            &[]
        }

        fn from_slots(_slots: SlotReader) -> DatasheetResult<Self> {
            Ok(Empty)
        }

        fn to_slots(&self) -> Vec<FieldValue> {
            Vec::new()
        }
    }

    #[test]
    fn test_normalize_label() {
        assert_eq!(normalize_label("*B*"), "b");
        assert_eq!(normalize_label("c_d"), "cd");
        assert_eq!(normalize_label("**IMAGE_SET_ID"), "imagesetid");
        assert_eq!(normalize_label("Plain"), "plain");
    }

    #[test]
    fn test_resolves_decorated_header() {
        let registry = SchemaRegistry::new();
        let schema = registry
            .resolve::<Sample>(&[Some("a"), Some("*B*"), Some("c_d")])
            .unwrap();

        let mapping: Vec<(usize, usize)> =
            schema.columns().iter().map(|c| (c.column, c.slot)).collect();
        assert_eq!(mapping, vec![(0, 0), (1, 1), (2, 2)]);
    }

    #[test]
    fn test_header_order_is_independent_of_field_order() {
        let registry = SchemaRegistry::new();
        let schema = registry
            .resolve::<Sample>(&[Some("C_D"), Some("A"), Some("b")])
            .unwrap();

        let mapping: Vec<(usize, usize)> =
            schema.columns().iter().map(|c| (c.column, c.slot)).collect();
        assert_eq!(mapping, vec![(0, 2), (1, 0), (2, 1)]);
    }

    #[test]
    fn test_null_labels_are_unmapped() {
        let registry = SchemaRegistry::new();
        let schema = registry
            .resolve::<Sample>(&[Some("a"), None, Some("b")])
            .unwrap();
        assert_eq!(schema.columns().len(), 2);
        assert_eq!(schema.column_count(), 3);
    }

    #[test]
    fn test_unknown_label_fails() {
        let registry = SchemaRegistry::new();
        let err = registry
            .resolve::<Sample>(&[Some("a"), Some("b"), Some("zzz")])
            .unwrap_err();
        assert_eq!(err.code(), DatasheetErrorCode::CensusSchemaUnknownLabel);
        assert_eq!(err.field(), Some("zzz"));
    }

    #[test]
    fn test_duplicate_label_fails() {
        let registry = SchemaRegistry::new();
        let err = registry
            .resolve::<Sample>(&[Some("a"), Some("b"), Some("*A*")])
            .unwrap_err();
        assert_eq!(err.code(), DatasheetErrorCode::CensusSchemaDuplicateLabel);
    }

    #[test]
    fn test_missing_required_column_fails() {
        let registry = SchemaRegistry::new();
        let err = registry.resolve::<Sample>(&[Some("a")]).unwrap_err();
        assert_eq!(err.code(), DatasheetErrorCode::CensusSchemaMissingColumn);
        assert_eq!(err.field(), Some("b"));

        // Nullable fields may be left out
        assert!(registry.resolve::<Sample>(&[Some("a"), Some("b")]).is_ok());
    }

    #[test]
    fn test_shape_without_fields_fails() {
        let registry = SchemaRegistry::new();
        let err = registry.resolve::<Empty>(&[Some("a")]).unwrap_err();
        assert_eq!(err.code(), DatasheetErrorCode::CensusSchemaNoFields);
    }

    #[test]
    fn test_shape_is_cached_once() {
        let registry = SchemaRegistry::new();
        let first = registry.shape::<Sample>().unwrap();
        let second = registry.shape::<Sample>().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_concurrent_first_use_shares_one_entry() {
        const THREADS: usize = 8;

        let registry = SchemaRegistry::new();
        let barrier = std::sync::Barrier::new(THREADS);

        let schemas: Vec<Arc<ShapeSchema>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..THREADS)
                .map(|_| {
                    scope.spawn(|| {
                        barrier.wait();
                        registry.shape::<Sample>().unwrap()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(schemas.iter().all(|s| Arc::ptr_eq(s, &schemas[0])));
        assert_eq!(registry.len(), 1);
    }
}
