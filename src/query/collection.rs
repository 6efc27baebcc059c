//! Collection catalog
//!
//! Declares, per queryable collection, the fields a request may name and the
//! JSON type of each. Projection, existence checks, sorting and operand
//! typing all go through this table.

use std::collections::BTreeMap;

use serde_json::{Number, Value};

use super::errors::{QueryError, QueryResult};
use super::filter::FilterOperator;

/// JSON type of a collection field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Integer,
    Float,
    Boolean,
    String,
    /// Nested document; sub-paths are compared as strings
    Object,
    /// Array of scalars; a clause matches when any element does
    Array(&'static FieldKind),
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Integer => "integer",
            FieldKind::Float => "number",
            FieldKind::Boolean => "boolean",
            FieldKind::String => "string",
            FieldKind::Object => "object",
            FieldKind::Array(_) => "array",
        }
    }

    /// Kind an operand is typed as. Arrays compare element-wise.
    fn operand_kind(&self) -> FieldKind {
        match self {
            FieldKind::Array(element) => **element,
            other => *other,
        }
    }

    /// Converts a raw operand to a JSON value of this kind
    fn type_operand(&self, raw: &str) -> Option<Value> {
        match self {
            FieldKind::Integer => {
                if let Ok(v) = raw.parse::<i64>() {
                    Some(Value::from(v))
                } else {
                    raw.parse::<u64>().ok().map(Value::from)
                }
            }
            FieldKind::Float => raw
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number),
            FieldKind::Boolean => match raw {
                "1" => Some(Value::Bool(true)),
                "0" => Some(Value::Bool(false)),
                _ => raw.parse::<bool>().ok().map(Value::Bool),
            },
            FieldKind::Array(element) => element.type_operand(raw),
            FieldKind::String | FieldKind::Object => Some(Value::String(raw.to_string())),
        }
    }
}

/// One declared field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldAccessor {
    pub name: &'static str,
    pub kind: FieldKind,
}

const fn field(name: &'static str, kind: FieldKind) -> FieldAccessor {
    FieldAccessor { name, kind }
}

/// Queryable shape of one collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionDescriptor {
    pub name: &'static str,
    pub fields: &'static [FieldAccessor],
}

impl CollectionDescriptor {
    /// Accessor for a field path. Dotted paths resolve on their first segment.
    pub fn accessor(&self, path: &str) -> Option<&FieldAccessor> {
        let head = path.split('.').next().unwrap_or(path);
        self.fields.iter().find(|f| f.name == head)
    }

    /// Fails unless `path` names a declared field
    pub fn require_field(&self, path: &str) -> QueryResult<&FieldAccessor> {
        self.accessor(path)
            .ok_or_else(|| QueryError::unknown_field(self.name, path))
    }

    /// Converts a filter operand to the JSON type the field stores.
    ///
    /// Regex operands and sub-paths of nested fields stay strings. A range
    /// bound on an integer field may be fractional.
    pub fn type_operand(
        &self,
        path: &str,
        operator: FilterOperator,
        raw: &str,
    ) -> QueryResult<Value> {
        let accessor = self.require_field(path)?;
        let nested = path.len() > accessor.name.len();

        if operator.is_regex() || nested {
            return Ok(Value::String(raw.to_string()));
        }

        let kind = accessor.kind.operand_kind();
        kind.type_operand(raw)
            .or_else(|| match kind {
                FieldKind::Integer if operator.is_range() => FieldKind::Float.type_operand(raw),
                _ => None,
            })
            .ok_or_else(|| QueryError::InvalidOperand {
                field: path.to_string(),
                operand: raw.to_string(),
                expected: kind.as_str(),
            })
    }
}

use FieldKind::{Array, Boolean, Float, Integer, Object, String as Text};

const CURRENCY: &[FieldAccessor] = &[
    field("currency_id", Integer),
    field("name_id", Integer),
    field("description_id", Integer),
    field("icon_image_set_id", Integer),
    field("map_icon_image_set_id", Integer),
    field("inventory_cap", Integer),
];

const EXPERIENCE: &[FieldAccessor] = &[
    field("experience_id", Integer),
    field("award_type_id", Integer),
    field("name_id", Integer),
    field("xp", Float),
    field("notify_radius", Float),
];

const FACTION: &[FieldAccessor] = &[
    field("faction_id", Integer),
    field("name_id", Integer),
    field("short_name_id", Integer),
    field("image_set_id", Integer),
    field("hud_tint_rgb", Integer),
    field("code_tag", Text),
    field("user_selectable", Boolean),
];

const IMAGE_SET: &[FieldAccessor] = &[
    field("image_set_id", Integer),
    field("image_id", Integer),
    field("image_type", Text),
];

const WORLD: &[FieldAccessor] = &[
    field("world_id", Integer),
    field("name", Object),
    field("is_locked", Boolean),
    field("is_unprivileged_access_allowed", Boolean),
];

const FIRE_GROUP: &[FieldAccessor] = &[
    field("fire_group_id", Integer),
    field("fire_mode_ids", Array(&Integer)),
    field("chamber_duration_ms", Integer),
    field("transition_duration_ms", Integer),
    field("spool_up_time_ms", Integer),
    field("spool_up_initial_refire_ms", Integer),
    field("can_chamber_ironsights", Boolean),
];

const FIRE_GROUP_TO_FIRE_MODE: &[FieldAccessor] = &[
    field("fire_group_id", Integer),
    field("fire_mode_id", Integer),
    field("fire_mode_index", Integer),
];

const FIRE_MODE: &[FieldAccessor] = &[
    field("fire_mode_id", Integer),
    field("fire_mode_type_id", Integer),
    field("description", Object),
    field("ability_id", Integer),
    field("ammo_item_id", Integer),
    field("ammo_slot", Integer),
    field("automatic", Boolean),
    field("iron_sights", Boolean),
    field("cof_recoil", Float),
    field("fire_refire_ms", Integer),
    field("max_damage", Integer),
    field("max_damage_range", Integer),
    field("min_damage", Integer),
    field("min_damage_range", Integer),
    field("move_modifier", Float),
    field("reload_time_ms", Integer),
];

/// The collections the service knows how to query, keyed by name
#[derive(Debug, Clone)]
pub struct CollectionCatalog {
    collections: BTreeMap<&'static str, CollectionDescriptor>,
}

impl CollectionCatalog {
    pub fn new(descriptors: impl IntoIterator<Item = CollectionDescriptor>) -> Self {
        Self {
            collections: descriptors.into_iter().map(|d| (d.name, d)).collect(),
        }
    }

    /// Catalog of every collection the builders produce or the store serves
    pub fn builtin() -> Self {
        Self::new([
            CollectionDescriptor { name: "currency", fields: CURRENCY },
            CollectionDescriptor { name: "experience", fields: EXPERIENCE },
            CollectionDescriptor { name: "faction", fields: FACTION },
            CollectionDescriptor { name: "image_set", fields: IMAGE_SET },
            CollectionDescriptor { name: "world", fields: WORLD },
            CollectionDescriptor { name: "fire_group", fields: FIRE_GROUP },
            CollectionDescriptor {
                name: "fire_group_to_fire_mode",
                fields: FIRE_GROUP_TO_FIRE_MODE,
            },
            CollectionDescriptor { name: "fire_mode", fields: FIRE_MODE },
        ])
    }

    pub fn get(&self, name: &str) -> Option<&CollectionDescriptor> {
        self.collections.get(name)
    }

    pub fn require(&self, name: &str) -> QueryResult<&CollectionDescriptor> {
        self.get(name)
            .ok_or_else(|| QueryError::UnknownCollection(name.to_string()))
    }

    /// Collection names, sorted
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.collections.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }
}

impl Default for CollectionCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builtin_lookup() {
        let catalog = CollectionCatalog::builtin();
        assert!(catalog.get("fire_group").is_some());
        assert_eq!(
            catalog.require("weapons").unwrap_err(),
            QueryError::UnknownCollection("weapons".to_string())
        );
    }

    #[test]
    fn test_dotted_path_resolves_on_head() {
        let catalog = CollectionCatalog::builtin();
        let world = catalog.get("world").unwrap();
        assert_eq!(world.accessor("name.en").unwrap().name, "name");
        assert!(world.accessor("names.en").is_none());
    }

    #[test]
    fn test_operand_typing() {
        let catalog = CollectionCatalog::builtin();
        let world = catalog.get("world").unwrap();

        assert_eq!(
            world.type_operand("world_id", FilterOperator::Gt, "5").unwrap(),
            json!(5)
        );
        assert_eq!(
            world.type_operand("is_locked", FilterOperator::Eq, "1").unwrap(),
            json!(true)
        );
        assert_eq!(
            world.type_operand("name.en", FilterOperator::Eq, "Connery").unwrap(),
            json!("Connery")
        );
        assert_eq!(
            world
                .type_operand("world_id", FilterOperator::RegexContains, "1")
                .unwrap(),
            json!("1")
        );
    }

    #[test]
    fn test_bad_operand() {
        let catalog = CollectionCatalog::builtin();
        let world = catalog.get("world").unwrap();
        let err = world
            .type_operand("world_id", FilterOperator::Eq, "ten")
            .unwrap_err();
        assert!(matches!(err, QueryError::InvalidOperand { expected: "integer", .. }));
    }

    #[test]
    fn test_fractional_range_bound_on_integer_field() {
        let catalog = CollectionCatalog::builtin();
        let world = catalog.get("world").unwrap();
        assert_eq!(
            world.type_operand("world_id", FilterOperator::Gt, "1.5").unwrap(),
            json!(1.5)
        );
        assert!(world
            .type_operand("world_id", FilterOperator::Eq, "1.5")
            .is_err());
    }

    #[test]
    fn test_array_operand_typed_by_element() {
        let catalog = CollectionCatalog::builtin();
        let fire_group = catalog.get("fire_group").unwrap();
        assert_eq!(
            fire_group
                .type_operand("fire_mode_ids", FilterOperator::Eq, "70")
                .unwrap(),
            json!(70)
        );
        let err = fire_group
            .type_operand("fire_mode_ids", FilterOperator::Eq, "x")
            .unwrap_err();
        assert!(matches!(err, QueryError::InvalidOperand { expected: "integer", .. }));
    }

    #[test]
    fn test_float_operand() {
        let catalog = CollectionCatalog::builtin();
        let fire_mode = catalog.get("fire_mode").unwrap();
        assert_eq!(
            fire_mode
                .type_operand("move_modifier", FilterOperator::Lt, "0.5")
                .unwrap(),
            json!(0.5)
        );
    }
}
