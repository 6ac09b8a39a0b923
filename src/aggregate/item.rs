use crate::geo::Coordinate;
use serde::{Deserialize, Serialize};

/// Stable downstream address of an item; forts use string ids, wild
/// entities their numeric encounter id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemUid {
    Text(String),
    Number(u64),
}

/// GeoJSON point, coordinates ordered `[lng, lat]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: [f64; 2],
}

impl From<Coordinate> for GeoPoint {
    fn from(c: Coordinate) -> Self {
        Self {
            kind: "Point".to_string(),
            coordinates: [c.lng, c.lat],
        }
    }
}

/// One map object pushed downstream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputItem {
    #[serde(rename = "type")]
    pub kind: String,
    pub uid: ItemUid,
    pub location: GeoPoint,
    pub properties: serde_json::Map<String, serde_json::Value>,
}

impl OutputItem {
    pub fn property(&self, key: &str) -> Option<&serde_json::Value> {
        self.properties.get(key)
    }
}
