//! Id-keyed collection of everything one walk has seen

use crate::source::{MapObjects, StaticEntity, TransientEntity};
use std::collections::BTreeMap;

/// Lives for a single walk; a later sighting of the same id replaces the earlier one
#[derive(Debug, Clone, Default)]
pub struct WalkAggregate {
    forts: BTreeMap<String, StaticEntity>,
    wild: BTreeMap<u64, TransientEntity>,
}

impl WalkAggregate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_fort(&mut self, fort: StaticEntity) {
        self.forts.insert(fort.id.clone(), fort);
    }

    pub fn insert_wild(&mut self, wild: TransientEntity) {
        self.wild.insert(wild.encounter_id, wild);
    }

    /// Fold every entity of one sample response into the aggregate
    pub fn absorb(&mut self, objects: MapObjects) {
        for cell in objects.cells {
            for fort in cell.forts {
                self.insert_fort(fort);
            }
            for wild in cell.wild {
                self.insert_wild(wild);
            }
        }
    }

    pub fn forts(&self) -> impl Iterator<Item = &StaticEntity> {
        self.forts.values()
    }

    pub fn wild(&self) -> impl Iterator<Item = &TransientEntity> {
        self.wild.values()
    }

    pub fn fort_count(&self) -> usize {
        self.forts.len()
    }

    pub fn wild_count(&self) -> usize {
        self.wild.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forts.is_empty() && self.wild.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coordinate;
    use crate::source::{MapCell, Team};

    fn fort(id: &str, modified: i64) -> StaticEntity {
        StaticEntity {
            id: id.to_string(),
            position: Coordinate { lat: 1.0, lng: 2.0 },
            has_marker: false,
            owner_team: Some(Team::Blue),
            lure_info: None,
            last_modified_ms: modified,
        }
    }

    fn wild(encounter_id: u64) -> TransientEntity {
        TransientEntity {
            encounter_id,
            species_id: 1,
            position: Coordinate { lat: 1.0, lng: 2.0 },
            time_till_hidden_ms: 1000,
        }
    }

    #[test]
    fn test_same_fort_id_keeps_latest() {
        let mut aggregate = WalkAggregate::new();
        aggregate.insert_fort(fort("f1", 1));
        aggregate.insert_fort(fort("f1", 2));

        assert_eq!(aggregate.fort_count(), 1);
        assert_eq!(aggregate.forts().next().unwrap().last_modified_ms, 2);
    }

    #[test]
    fn test_distinct_encounters_coexist() {
        let mut aggregate = WalkAggregate::new();
        aggregate.insert_wild(wild(10));
        aggregate.insert_wild(wild(11));
        assert_eq!(aggregate.wild_count(), 2);
    }

    #[test]
    fn test_absorb_across_samples() {
        let mut aggregate = WalkAggregate::new();
        assert!(aggregate.is_empty());

        let sample = |modified| MapObjects {
            status: 1,
            cells: vec![MapCell {
                current_timestamp_ms: None,
                forts: vec![fort("f1", modified)],
                wild: vec![wild(7)],
            }],
        };
        aggregate.absorb(sample(1));
        aggregate.absorb(sample(5));

        assert_eq!(aggregate.fort_count(), 1);
        assert_eq!(aggregate.wild_count(), 1);
        assert_eq!(aggregate.forts().next().unwrap().last_modified_ms, 5);
    }
}
