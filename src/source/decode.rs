//! Decoding of raw map objects payloads into typed entities
//!
//! Payload shape:
//!
//! ```text
//! { "status": 1,
//!   "map_cells": [
//!     { "current_timestamp_ms": 1469000000000,
//!       "forts": [ { "id", "latitude", "longitude", "last_modified_timestamp_ms",
//!                    "type"?, "owned_by_team"?, "lure_info"? } ],
//!       "wild_pokemons": [ { "encounter_id", "latitude", "longitude",
//!                            "time_till_hidden_ms", "pokemon_data": { "pokemon_id" } } ] } ] }
//! ```
//!
//! Optional fields stay optional (`Option`), required ones fail the decode.

use super::SourceError;
use crate::geo::Coordinate;
use serde::Deserialize;

/// Status value of a successful map objects response
pub const STATUS_SUCCESS: i64 = 1;

#[derive(Debug)]
pub enum DecodeError {
    Malformed(serde_json::Error),
    InvalidField { field: &'static str, value: String },
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        DecodeError::Malformed(err)
    }
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::Malformed(e) => write!(f, "Malformed payload: {}", e),
            DecodeError::InvalidField { field, value } => {
                write!(f, "Invalid value for {}: {}", field, value)
            }
        }
    }
}

impl std::error::Error for DecodeError {}

/// Fort owner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Team {
    Neutral,
    Blue,
    Red,
    Yellow,
}

impl Team {
    fn from_code(code: i64) -> Result<Self, DecodeError> {
        match code {
            0 => Ok(Team::Neutral),
            1 => Ok(Team::Blue),
            2 => Ok(Team::Red),
            3 => Ok(Team::Yellow),
            other => Err(DecodeError::InvalidField {
                field: "owned_by_team",
                value: other.to_string(),
            }),
        }
    }
}

/// Location-fixed point of interest (gym or pokestop)
#[derive(Debug, Clone, PartialEq)]
pub struct StaticEntity {
    pub id: String,
    pub position: Coordinate,
    /// Set when the payload carries the fort `type` field (pokestops)
    pub has_marker: bool,
    pub owner_team: Option<Team>,
    pub lure_info: Option<serde_json::Value>,
    pub last_modified_ms: i64,
}

impl StaticEntity {
    pub fn has_lure_info(&self) -> bool {
        self.lure_info.is_some()
    }
}

/// Short-lived entity that expires `time_till_hidden_ms` after observation
#[derive(Debug, Clone, PartialEq)]
pub struct TransientEntity {
    pub encounter_id: u64,
    pub species_id: u32,
    pub position: Coordinate,
    pub time_till_hidden_ms: i64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MapCell {
    pub current_timestamp_ms: Option<i64>,
    pub forts: Vec<StaticEntity>,
    pub wild: Vec<TransientEntity>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapObjects {
    pub status: i64,
    pub cells: Vec<MapCell>,
}

impl MapObjects {
    /// Reject responses whose status is not success
    pub fn into_success(self) -> Result<Self, SourceError> {
        if self.status == STATUS_SUCCESS {
            Ok(self)
        } else {
            Err(SourceError::Status(self.status))
        }
    }
}

#[derive(Deserialize)]
struct RawResponse {
    status: i64,
    #[serde(default)]
    map_cells: Vec<RawCell>,
}

#[derive(Deserialize)]
struct RawCell {
    #[serde(default)]
    current_timestamp_ms: Option<i64>,
    #[serde(default)]
    forts: Vec<RawFort>,
    #[serde(default)]
    wild_pokemons: Vec<RawWild>,
}

#[derive(Deserialize)]
struct RawFort {
    id: String,
    latitude: f64,
    longitude: f64,
    last_modified_timestamp_ms: i64,
    #[serde(rename = "type", default)]
    marker: Option<serde_json::Value>,
    #[serde(default)]
    owned_by_team: Option<i64>,
    #[serde(default)]
    lure_info: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct RawWild {
    encounter_id: u64,
    latitude: f64,
    longitude: f64,
    time_till_hidden_ms: i64,
    pokemon_data: RawPokemonData,
}

#[derive(Deserialize)]
struct RawPokemonData {
    pokemon_id: u32,
}

/// Decode a raw payload; missing required fields fail instead of defaulting
pub fn decode_map_objects(payload: serde_json::Value) -> Result<MapObjects, DecodeError> {
    let raw: RawResponse = serde_json::from_value(payload)?;

    let mut cells = Vec::with_capacity(raw.map_cells.len());
    for cell in raw.map_cells {
        let mut forts = Vec::with_capacity(cell.forts.len());
        for fort in cell.forts {
            forts.push(StaticEntity {
                id: fort.id,
                position: Coordinate { lat: fort.latitude, lng: fort.longitude },
                has_marker: fort.marker.is_some(),
                owner_team: fort.owned_by_team.map(Team::from_code).transpose()?,
                lure_info: fort.lure_info,
                last_modified_ms: fort.last_modified_timestamp_ms,
            });
        }

        let wild = cell
            .wild_pokemons
            .into_iter()
            .map(|w| TransientEntity {
                encounter_id: w.encounter_id,
                species_id: w.pokemon_data.pokemon_id,
                position: Coordinate { lat: w.latitude, lng: w.longitude },
                time_till_hidden_ms: w.time_till_hidden_ms,
            })
            .collect();

        cells.push(MapCell {
            current_timestamp_ms: cell.current_timestamp_ms,
            forts,
            wild,
        });
    }

    Ok(MapObjects { status: raw.status, cells })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_forts_and_wild() {
        let payload = json!({
            "status": 1,
            "map_cells": [
                {
                    "current_timestamp_ms": 1469000000000i64,
                    "forts": [
                        { "id": "gym-1", "latitude": 37.0, "longitude": -122.0,
                          "last_modified_timestamp_ms": 10, "owned_by_team": 2 },
                        { "id": "stop-1", "latitude": 37.1, "longitude": -122.1,
                          "last_modified_timestamp_ms": 11, "type": 1,
                          "lure_info": { "lure_expires_timestamp_ms": 99 } }
                    ],
                    "wild_pokemons": [
                        { "encounter_id": 123456789012u64, "latitude": 37.2, "longitude": -122.2,
                          "time_till_hidden_ms": 60000, "pokemon_data": { "pokemon_id": 16 } }
                    ]
                },
                { "current_timestamp_ms": 1469000000000i64 }
            ]
        });

        let objects = decode_map_objects(payload).unwrap().into_success().unwrap();
        assert_eq!(objects.cells.len(), 2);

        let cell = &objects.cells[0];
        assert_eq!(cell.forts.len(), 2);
        assert!(!cell.forts[0].has_marker);
        assert_eq!(cell.forts[0].owner_team, Some(Team::Red));
        assert!(!cell.forts[0].has_lure_info());
        assert!(cell.forts[1].has_marker);
        assert_eq!(cell.forts[1].owner_team, None);
        assert!(cell.forts[1].has_lure_info());

        assert_eq!(cell.wild.len(), 1);
        assert_eq!(cell.wild[0].encounter_id, 123456789012);
        assert_eq!(cell.wild[0].species_id, 16);
        assert_eq!(cell.wild[0].time_till_hidden_ms, 60000);

        assert!(objects.cells[1].forts.is_empty());
        assert!(objects.cells[1].wild.is_empty());
    }

    #[test]
    fn test_missing_required_field_fails() {
        let payload = json!({
            "status": 1,
            "map_cells": [ { "forts": [ { "id": "x", "latitude": 1.0, "longitude": 2.0 } ] } ]
        });
        let err = decode_map_objects(payload).unwrap_err();
        assert!(matches!(err, DecodeError::Malformed(_)));
        assert!(err.to_string().contains("last_modified_timestamp_ms"));
    }

    #[test]
    fn test_wild_without_species_fails() {
        let payload = json!({
            "status": 1,
            "map_cells": [ { "wild_pokemons": [
                { "encounter_id": 1, "latitude": 1.0, "longitude": 2.0, "time_till_hidden_ms": 5 }
            ] } ]
        });
        assert!(decode_map_objects(payload).is_err());
    }

    #[test]
    fn test_unknown_team_fails() {
        let payload = json!({
            "status": 1,
            "map_cells": [ { "forts": [
                { "id": "x", "latitude": 1.0, "longitude": 2.0,
                  "last_modified_timestamp_ms": 0, "owned_by_team": 7 }
            ] } ]
        });
        assert!(matches!(
            decode_map_objects(payload),
            Err(DecodeError::InvalidField { field: "owned_by_team", .. })
        ));
    }

    #[test]
    fn test_non_success_status_is_source_error() {
        let objects = decode_map_objects(json!({ "status": 2 })).unwrap();
        assert!(matches!(objects.into_success(), Err(SourceError::Status(2))));
    }
}
