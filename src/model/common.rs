//! Generic sub-structures shared by event-shaped records (§3.1).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Actor {
    pub code: Option<String>,
    pub name: Option<String>,
    pub country_code: Option<String>,
    pub group: Option<String>,
    pub ethnic: Option<String>,
    pub religion1: Option<String>,
    pub religion2: Option<String>,
    pub type1: Option<String>,
    pub type2: Option<String>,
    pub type3: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Location {
    pub location_type: i32,
    pub name: Option<String>,
    pub country_code: Option<String>,
    pub admin1_code: Option<String>,
    pub admin2_code: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub feature_id: Option<String>,
}
