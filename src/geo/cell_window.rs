//! Spatial query windows built from hierarchical S2 cells
//!
//! The remote source filters map objects by cell id. A window is the
//! level-15 cell containing the coordinate plus `radius` neighbours on
//! each side along the Hilbert curve ordering, returned ascending.

use super::{Coordinate, ValidationError};
use s2::cellid::CellID;
use s2::latlng::LatLng;

/// Subdivision level every window is built at
pub const CELL_LEVEL: u64 = 15;

/// Neighbours walked on each side of the origin cell by default
pub const DEFAULT_RADIUS: usize = 10;

/// Ascending, duplicate-free list of `2 * radius + 1` cell ids
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellWindow {
    ids: Vec<u64>,
}

impl CellWindow {
    pub fn ids(&self) -> &[u64] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Compute the window of cells around `coordinate`
///
/// Neighbours are plain `next`/`prev` steps, not the wrapping variants: within
/// `radius` cells of either end of the curve the window holds ids past the end
/// that name no real cell. The remote source returns nothing for them.
pub fn cell_window(coordinate: Coordinate, radius: usize) -> Result<CellWindow, ValidationError> {
    coordinate.validate()?;

    let origin = CellID::from(&LatLng::from_degrees(coordinate.lat, coordinate.lng)).parent(CELL_LEVEL);

    let mut ids = Vec::with_capacity(2 * radius + 1);
    ids.push(origin.0);

    let mut next = origin.next();
    let mut prev = origin.prev();
    for _ in 0..radius {
        ids.push(next.0);
        ids.push(prev.0);
        next = next.next();
        prev = prev.prev();
    }

    ids.sort_unstable();
    Ok(CellWindow { ids })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin_id(lat: f64, lng: f64) -> u64 {
        CellID::from(&LatLng::from_degrees(lat, lng)).parent(CELL_LEVEL).0
    }

    #[test]
    fn test_window_is_sorted_unique_and_sized() {
        let samples = [
            (37.0, -122.0),
            (0.0, 0.0),
            (-33.8688, 151.2093),
            (51.5074, -0.1278),
            (89.9, 179.9),
            (-89.9, -179.9),
        ];

        for (lat, lng) in samples {
            let window = cell_window(Coordinate::new(lat, lng).unwrap(), DEFAULT_RADIUS).unwrap();
            let ids = window.ids();
            assert_eq!(ids.len(), 21, "window size at ({}, {})", lat, lng);
            assert!(
                ids.windows(2).all(|pair| pair[0] < pair[1]),
                "window must be strictly ascending at ({}, {})",
                lat,
                lng
            );
        }
    }

    #[test]
    fn test_window_contains_origin_cell() {
        let window = cell_window(Coordinate::new(37.0, -122.0).unwrap(), DEFAULT_RADIUS).unwrap();
        assert!(window.ids().contains(&origin_id(37.0, -122.0)));
    }

    #[test]
    fn test_window_is_deterministic() {
        let c = Coordinate::new(48.8566, 2.3522).unwrap();
        assert_eq!(cell_window(c, 10).unwrap(), cell_window(c, 10).unwrap());
    }

    #[test]
    fn test_neighbours_are_consecutive_curve_steps() {
        // Adjacent level-15 cells differ by twice the level's lowest set bit
        let step = 1u64 << (2 * (30 - CELL_LEVEL) + 1);
        let window = cell_window(Coordinate::new(37.0, -122.0).unwrap(), DEFAULT_RADIUS).unwrap();
        assert!(window.ids().windows(2).all(|pair| pair[1] - pair[0] == step));
        assert_eq!(window.ids()[DEFAULT_RADIUS], origin_id(37.0, -122.0));
    }

    #[test]
    fn test_zero_radius_is_origin_only() {
        let window = cell_window(Coordinate::new(1.0, 2.0).unwrap(), 0).unwrap();
        assert_eq!(window.ids(), &[origin_id(1.0, 2.0)]);
    }

    #[test]
    fn test_out_of_range_coordinate_rejected() {
        let bad = Coordinate { lat: 12.0, lng: 200.0 };
        assert_eq!(
            cell_window(bad, DEFAULT_RADIUS),
            Err(ValidationError::LongitudeOutOfRange(200.0))
        );
    }
}
