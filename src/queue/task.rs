use crate::geo::Coordinate;
use serde::{Deserialize, Serialize};

/// Which entity family a task reports downstream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScanMode {
    /// Transient (wild) entities only, over the full spiral
    WildOnly,
    /// Static forts only, from a single sample at the center
    StaticOnly,
}

impl ScanMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanMode::WildOnly => "wild",
            ScanMode::StaticOnly => "static",
        }
    }
}

/// A sampling request; re-enqueued unchanged when its walk fails
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub center: Coordinate,
    pub mode: ScanMode,
}

impl Task {
    pub fn new(center: Coordinate, mode: ScanMode) -> Self {
        Self { center, mode }
    }
}

impl std::fmt::Display for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} @ {},{}", self.mode.as_str(), self.center.lat, self.center.lng)
    }
}
