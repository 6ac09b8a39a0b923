//! Turning a finished walk into downstream map items
//!
//! ## Forts
//!
//! A fort without the `type` marker is a gym, with it a pokestop. Owner
//! colors: Blue → `0000FF` "Blue Gym", Red → `FF0000` "Red Gym",
//! Yellow → `FF0000` "Yellow Gym". Neutral owners get no color. Ownerless
//! forts are gray (`808080`); an ownerless fort that still carries lure info
//! is also logged as a diagnostic record.
//!
//! ## Wild entities
//!
//! `WillDisappear` is `time_till_hidden_ms` plus one capture instant taken
//! for the whole batch, not per observation.

use super::item::{ItemUid, OutputItem};
use super::species::SpeciesNames;
use super::walk::WalkAggregate;
use crate::queue::ScanMode;
use crate::source::{StaticEntity, Team, TransientEntity};
use serde_json::{json, Map, Value};

const COLOR_BLUE: &str = "0000FF";
const COLOR_RED: &str = "FF0000";
const COLOR_GRAY: &str = "808080";

/// Items for one walk; `capture_ms` is stamped on every wild item
pub fn classify(
    aggregate: &WalkAggregate,
    mode: ScanMode,
    species: &SpeciesNames,
    capture_ms: i64,
) -> Vec<OutputItem> {
    match mode {
        ScanMode::StaticOnly => aggregate.forts().map(fort_item).collect(),
        ScanMode::WildOnly => aggregate
            .wild()
            .map(|w| wild_item(w, species, capture_ms))
            .collect(),
    }
}

pub fn fort_item(fort: &StaticEntity) -> OutputItem {
    let mut props = Map::new();
    props.insert("id".to_string(), json!(fort.id));
    props.insert("LastModifiedMs".to_string(), json!(fort.last_modified_ms));

    let kind = if fort.has_marker {
        props.insert("marker-symbol".to_string(), json!("circle"));
        props.insert("title".to_string(), json!("PokeStop"));
        props.insert("lure".to_string(), json!(fort.has_lure_info()));
        "pokestop"
    } else {
        props.insert("marker-symbol".to_string(), json!("town-hall"));
        props.insert("marker-size".to_string(), json!("large"));
        "gym"
    };
    props.insert("type".to_string(), json!(kind));

    match fort.owner_team {
        Some(Team::Blue) => {
            props.insert("marker-color".to_string(), json!(COLOR_BLUE));
            props.insert("title".to_string(), json!("Blue Gym"));
        }
        Some(Team::Red) => {
            props.insert("marker-color".to_string(), json!(COLOR_RED));
            props.insert("title".to_string(), json!("Red Gym"));
        }
        Some(Team::Yellow) => {
            // Yellow gyms share the red marker color
            props.insert("marker-color".to_string(), json!(COLOR_RED));
            props.insert("title".to_string(), json!("Yellow Gym"));
        }
        Some(Team::Neutral) => {}
        None => {
            if let Some(lure_info) = &fort.lure_info {
                props.insert("lure".to_string(), json!(true));
                props.insert("lure_info".to_string(), lure_info.clone());
                log_lured_ownerless(kind, fort, &props);
            }
            props.insert("marker-color".to_string(), json!(COLOR_GRAY));
        }
    }

    OutputItem {
        kind: kind.to_string(),
        uid: ItemUid::Text(fort.id.clone()),
        location: fort.position.into(),
        properties: props,
    }
}

fn log_lured_ownerless(kind: &str, fort: &StaticEntity, props: &Map<String, Value>) {
    if !log::log_enabled!(log::Level::Debug) {
        return;
    }
    let record = json!({
        "type": kind,
        "uid": fort.id,
        "location": { "type": "Point", "coordinates": [fort.position.lng, fort.position.lat] },
        "properties": props,
    });
    log::debug!("Ownerless fort {} carries lure info: {}", fort.id, record);
}

pub fn wild_item(wild: &TransientEntity, species: &SpeciesNames, capture_ms: i64) -> OutputItem {
    let name = species.display_name(wild.species_id);

    let mut props = Map::new();
    props.insert("id".to_string(), json!(format!("wild{}", wild.encounter_id)));
    props.insert("type".to_string(), json!("wild"));
    props.insert("pokemonNumber".to_string(), json!(wild.species_id));
    props.insert("TimeTillHiddenMs".to_string(), json!(wild.time_till_hidden_ms));
    props.insert(
        "WillDisappear".to_string(),
        json!(wild.time_till_hidden_ms + capture_ms),
    );
    props.insert("title".to_string(), json!(format!("Wild {}", name)));
    props.insert("marker-color".to_string(), json!(COLOR_RED));

    OutputItem {
        kind: "pokemon".to_string(),
        uid: ItemUid::Number(wild.encounter_id),
        location: wild.position.into(),
        properties: props,
    }
}
