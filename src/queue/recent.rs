//! Bounded memory of recently accepted ingress requests
//!
//! Holds the raw `(lat, lon)` strings exactly as requested so that a
//! repeated click on the same spot is rejected. Oldest entries fall out
//! first once the window is full.

use std::collections::VecDeque;

pub const RECENT_REQUEST_CAPACITY: usize = 20;

#[derive(Debug, Clone)]
pub struct RecentRequestWindow {
    entries: VecDeque<(String, String)>,
    capacity: usize,
}

impl Default for RecentRequestWindow {
    fn default() -> Self {
        Self::new(RECENT_REQUEST_CAPACITY)
    }
}

impl RecentRequestWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn contains(&self, lat: &str, lon: &str) -> bool {
        self.entries.iter().any(|(a, b)| a == lat && b == lon)
    }

    /// Record an accepted request, evicting the oldest one when full
    pub fn record(&mut self, lat: &str, lon: &str) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back((lat.to_string(), lon.to_string()));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
