//! Small leaf sub-structures composed by `GkgRecord` (ported from the
//! teacher's `model::{count,theme,location,source,...}` modules).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationType {
    Unknown,
    Country,
    UsState,
    UsCity,
    WorldCity,
    WorldState,
}

impl From<i32> for LocationType {
    fn from(value: i32) -> Self {
        match value {
            1 => LocationType::Country,
            2 => LocationType::UsState,
            3 => LocationType::UsCity,
            4 => LocationType::WorldCity,
            5 => LocationType::WorldState,
            _ => LocationType::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceCollectionId {
    Web,
    Citation,
    Core,
    DticDoc,
    JstorDoc,
    NonTextualSource,
    Unknown,
}

impl From<i32> for SourceCollectionId {
    fn from(value: i32) -> Self {
        match value {
            1 => SourceCollectionId::Web,
            2 => SourceCollectionId::Citation,
            3 => SourceCollectionId::Core,
            4 => SourceCollectionId::DticDoc,
            5 => SourceCollectionId::JstorDoc,
            6 => SourceCollectionId::NonTextualSource,
            _ => SourceCollectionId::Unknown,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CountV1 {
    pub count_type: String,
    pub count: i64,
    pub object_type: String,
    pub location_type: i32,
    pub location_name: String,
    pub location_country_code: String,
    pub location_adm1_code: String,
    pub location_lat: f64,
    pub location_long: f64,
    pub location_feature_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CountV21 {
    pub base: CountV1,
    pub location_adm2_code: String,
    pub char_offset: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnhancedTheme {
    pub theme: String,
    pub char_offset: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocationV1 {
    pub location_type: i32,
    pub location_name: String,
    pub country_code: String,
    pub adm1_code: String,
    pub lat: f64,
    pub lon: f64,
    pub feature_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnhancedLocation {
    pub location_type: i32,
    pub location_name: String,
    pub country_code: String,
    pub adm1_code: String,
    pub adm2_code: String,
    pub lat: f64,
    pub lon: f64,
    pub feature_id: String,
    pub char_offset: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnhancedEntity {
    pub name: String,
    pub char_offset: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnhancedDate {
    pub date_resolution: i32,
    pub month: i32,
    pub day: i32,
    pub year: i32,
    pub char_offset: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GcamEntry {
    pub dimension: String,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NameEntry {
    pub name: String,
    pub char_offset: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AmountEntry {
    pub amount: f64,
    pub object: String,
    pub char_offset: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TranslationInfo {
    pub source_language: String,
    pub engine: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_type_from_i32_maps_known_values() {
        assert_eq!(LocationType::from(3), LocationType::UsCity);
        assert_eq!(LocationType::from(99), LocationType::Unknown);
    }

    #[test]
    fn source_collection_id_from_i32_maps_known_values() {
        assert_eq!(SourceCollectionId::from(1), SourceCollectionId::Web);
        assert_eq!(SourceCollectionId::from(0), SourceCollectionId::Unknown);
    }
}
