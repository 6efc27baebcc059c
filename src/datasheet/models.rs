//! Client datasheet record shapes
//!
//! Each shape lists its fields in constructor order. Header labels in the
//! shipped files are upper snake case (`ICON_ID`), sometimes wrapped in `*`;
//! the resolver matches them against these names.

use serde::Serialize;

use super::errors::DatasheetResult;
use super::types::{Datasheet, DatasheetEnum, FieldDef, FieldType, FieldValue, IntWidth, SlotReader};

const U32: FieldType = FieldType::Int(IntWidth::U32);
const I32: FieldType = FieldType::Int(IntWidth::I32);

/// A datasheet shipped in the client data pack, read from a fixed file
pub trait ClientDatasheet: Datasheet {
    /// File name inside the data pack
    const FILE_NAME: &'static str;
}

/// A currency a character can hold
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Currency {
    pub id: u32,
    pub name_id: i32,
    pub description_id: Option<i32>,
    pub icon_id: u32,
    pub map_icon_id: u32,
    /// Inventory cap, if any
    pub value_max: Option<u32>,
}

impl Datasheet for Currency {
    const SHAPE: &'static str = "Currency";

    fn fields() -> &'static [FieldDef] {
        const FIELDS: &[FieldDef] = &[
            FieldDef::required("id", U32),
            FieldDef::required("name_id", I32),
            FieldDef::nullable("description_id", I32),
            FieldDef::required("icon_id", U32),
            FieldDef::required("map_icon_id", U32),
            FieldDef::nullable("value_max", U32),
        ];
        FIELDS
    }

    fn from_slots(mut slots: SlotReader) -> DatasheetResult<Self> {
        Ok(Self {
            id: slots.int()?,
            name_id: slots.int()?,
            description_id: slots.opt_int()?,
            icon_id: slots.int()?,
            map_icon_id: slots.int()?,
            value_max: slots.opt_int()?,
        })
    }

    fn to_slots(&self) -> Vec<FieldValue> {
        vec![
            self.id.into(),
            self.name_id.into(),
            self.description_id.into(),
            self.icon_id.into(),
            self.map_icon_id.into(),
            self.value_max.into(),
        ]
    }
}

impl ClientDatasheet for Currency {
    const FILE_NAME: &'static str = "Currency.txt";
}

/// An experience award
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Experience {
    pub id: u32,
    pub award_type_id: u32,
    pub string_id: i32,
    pub xp: f64,
    pub notify_radius: Option<f32>,
}

impl Datasheet for Experience {
    const SHAPE: &'static str = "Experience";

    fn fields() -> &'static [FieldDef] {
        const FIELDS: &[FieldDef] = &[
            FieldDef::required("id", U32),
            FieldDef::required("award_type_id", U32),
            FieldDef::required("string_id", I32),
            FieldDef::required("xp", FieldType::Decimal),
            FieldDef::nullable("notify_radius", FieldType::Float32),
        ];
        FIELDS
    }

    fn from_slots(mut slots: SlotReader) -> DatasheetResult<Self> {
        Ok(Self {
            id: slots.int()?,
            award_type_id: slots.int()?,
            string_id: slots.int()?,
            xp: slots.float()?,
            notify_radius: slots.opt_f32()?,
        })
    }

    fn to_slots(&self) -> Vec<FieldValue> {
        vec![
            self.id.into(),
            self.award_type_id.into(),
            self.string_id.into(),
            self.xp.into(),
            self.notify_radius.into(),
        ]
    }
}

impl ClientDatasheet for Experience {
    const FILE_NAME: &'static str = "Experience.txt";
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Faction {
    pub id: u32,
    pub name_id: i32,
    pub short_name_id: Option<i32>,
    pub icon_id: Option<u32>,
    pub hud_tint_rgb: u32,
    pub code_tag: String,
    pub user_selectable: bool,
}

impl Datasheet for Faction {
    const SHAPE: &'static str = "Faction";

    fn fields() -> &'static [FieldDef] {
        const FIELDS: &[FieldDef] = &[
            FieldDef::required("id", U32),
            FieldDef::required("name_id", I32),
            FieldDef::nullable("short_name_id", I32),
            FieldDef::nullable("icon_id", U32),
            FieldDef::required("hud_tint_rgb", U32),
            FieldDef::required("code_tag", FieldType::String),
            FieldDef::required("user_selectable", FieldType::Bool),
        ];
        FIELDS
    }

    fn from_slots(mut slots: SlotReader) -> DatasheetResult<Self> {
        Ok(Self {
            id: slots.int()?,
            name_id: slots.int()?,
            short_name_id: slots.opt_int()?,
            icon_id: slots.opt_int()?,
            hud_tint_rgb: slots.int()?,
            code_tag: slots.string()?,
            user_selectable: slots.bool()?,
        })
    }

    fn to_slots(&self) -> Vec<FieldValue> {
        vec![
            self.id.into(),
            self.name_id.into(),
            self.short_name_id.into(),
            self.icon_id.into(),
            self.hud_tint_rgb.into(),
            self.code_tag.clone().into(),
            self.user_selectable.into(),
        ]
    }
}

impl ClientDatasheet for Faction {
    const FILE_NAME: &'static str = "Factions.txt";
}

/// Size class of an image within an image set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ImageType {
    Small,
    Large,
    Massive,
}

impl DatasheetEnum for ImageType {
    const MEMBERS: &'static [&'static str] = &["Small", "Large", "Massive"];

    fn from_member_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(ImageType::Small),
            1 => Some(ImageType::Large),
            2 => Some(ImageType::Massive),
            _ => None,
        }
    }

    fn member_index(&self) -> usize {
        *self as usize
    }
}

/// Links an image set to one of its images
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageSetMapping {
    pub image_set_id: u32,
    pub image_id: u32,
    pub image_type: ImageType,
}

impl Datasheet for ImageSetMapping {
    const SHAPE: &'static str = "ImageSetMapping";

    fn fields() -> &'static [FieldDef] {
        const FIELDS: &[FieldDef] = &[
            FieldDef::required("image_set_id", U32),
            FieldDef::required("image_id", U32),
            FieldDef::required(
                "image_type",
                FieldType::Enum {
                    members: ImageType::MEMBERS,
                },
            ),
        ];
        FIELDS
    }

    fn from_slots(mut slots: SlotReader) -> DatasheetResult<Self> {
        Ok(Self {
            image_set_id: slots.int()?,
            image_id: slots.int()?,
            image_type: slots.enumeration()?,
        })
    }

    fn to_slots(&self) -> Vec<FieldValue> {
        vec![
            self.image_set_id.into(),
            self.image_id.into(),
            FieldValue::Enum(self.image_type.member_index()),
        ]
    }
}

impl ClientDatasheet for ImageSetMapping {
    const FILE_NAME: &'static str = "ImageSetMappings.txt";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasheet::DatasheetSerializer;

    #[test]
    fn test_currency_from_shipped_header() {
        let data = b"#*ID*^NAME_ID^DESCRIPTION_ID^ICON_ID^MAP_ICON_ID^VALUE_MAX^\r\n\
                     1^4294^^5^6^750^\r\n\
                     4^4296^12^7^8^^\r\n";
        let currencies: Vec<Currency> = DatasheetSerializer::new().deserialize(data).unwrap();

        assert_eq!(currencies.len(), 2);
        assert_eq!(currencies[0].description_id, None);
        assert_eq!(currencies[0].value_max, Some(750));
        assert_eq!(currencies[1].description_id, Some(12));
        assert_eq!(currencies[1].value_max, None);
    }

    #[test]
    fn test_image_set_mapping_enum() {
        let data = b"#IMAGE_SET_ID^IMAGE_ID^IMAGE_TYPE^\n10^20^Large^\n";
        let mappings: Vec<ImageSetMapping> = DatasheetSerializer::new().deserialize(data).unwrap();
        assert_eq!(mappings[0].image_type, ImageType::Large);
    }

    #[test]
    fn test_faction_round_trip() {
        let factions = vec![Faction {
            id: 2,
            name_id: 100,
            short_name_id: None,
            icon_id: Some(94),
            hud_tint_rgb: 0x4a_da_ff,
            code_tag: "NC".to_string(),
            user_selectable: true,
        }];
        let serializer = DatasheetSerializer::new();
        let bytes = serializer.serialize(&factions).unwrap();
        assert_eq!(serializer.deserialize::<Faction>(&bytes).unwrap(), factions);
    }
}
