//! Per-walk aggregation and classification into downstream map items
//!
//! ```text
//! MapObjects (per sample) → WalkAggregate (id-keyed, last write wins)
//!     ↓ walk succeeded
//! classify(mode, species, capture instant) → Vec<OutputItem> → sink
//! ```

pub mod classify;
pub mod item;
pub mod species;
pub mod walk;

pub use classify::{classify, fort_item, wild_item};
pub use item::{GeoPoint, ItemUid, OutputItem};
pub use species::{SpeciesError, SpeciesNames};
pub use walk::WalkAggregate;
