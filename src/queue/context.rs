//! Process-scoped scan state shared by ingress and workers

use super::recent::RecentRequestWindow;
use super::task::{ScanMode, Task};
use super::task_queue::TaskQueue;
use crate::geo::{Coordinate, ValidationError};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

/// Why an ingress request did not produce a task
#[derive(Debug, Clone, PartialEq)]
pub enum EnqueueError {
    Invalid(ValidationError),
    Duplicate { lat: String, lon: String },
}

impl From<ValidationError> for EnqueueError {
    fn from(err: ValidationError) -> Self {
        EnqueueError::Invalid(err)
    }
}

impl std::fmt::Display for EnqueueError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnqueueError::Invalid(e) => write!(f, "{}", e),
            EnqueueError::Duplicate { lat, lon } => {
                write!(f, "Already requested recently: {},{}", lat, lon)
            }
        }
    }
}

impl std::error::Error for EnqueueError {}

/// Owns the task queue and the recent-request window for the process lifetime
#[derive(Debug)]
pub struct ScanContext {
    queue: TaskQueue,
    recent: Mutex<RecentRequestWindow>,
    depth_file: Option<PathBuf>,
    depth_file_enabled: AtomicBool,
}

impl Default for ScanContext {
    fn default() -> Self {
        Self::new(None)
    }
}

impl ScanContext {
    /// Create the context; `depth_file` receives the queue depth after changes
    pub fn new(depth_file: Option<PathBuf>) -> Self {
        let depth_file_enabled = AtomicBool::new(depth_file.is_some());
        Self {
            queue: TaskQueue::new(),
            recent: Mutex::new(RecentRequestWindow::default()),
            depth_file,
            depth_file_enabled,
        }
    }

    pub fn queue(&self) -> &TaskQueue {
        &self.queue
    }

    pub fn depth(&self) -> usize {
        self.queue.len()
    }

    /// Validate an ingress request and enqueue it
    ///
    /// Range is checked before the duplicate window, so an out-of-range
    /// request is rejected whatever the window holds. Returns the queue
    /// depth after the push.
    pub fn submit(&self, lat: &str, lon: &str, mode: ScanMode) -> Result<usize, EnqueueError> {
        let center = Coordinate::parse(lat, lon)?;

        {
            let mut recent = self.recent.lock().unwrap_or_else(PoisonError::into_inner);
            if recent.contains(lat, lon) {
                log::debug!("Rejected duplicate request {},{}", lat, lon);
                return Err(EnqueueError::Duplicate {
                    lat: lat.to_string(),
                    lon: lon.to_string(),
                });
            }
            recent.record(lat, lon);
        }

        let depth = self.queue.push(Task::new(center, mode));
        log::info!("📥 Queued {} task at {},{} (depth {})", mode.as_str(), lat, lon, depth);
        self.publish_depth();
        Ok(depth)
    }

    /// Put a failed task back at the tail of the queue
    pub fn requeue(&self, task: Task) {
        let depth = self.queue.push(task);
        log::info!("🔁 Requeued {} (depth {})", task, depth);
        self.publish_depth();
    }

    /// Rewrite the depth file, if configured; the first failure disables it
    pub fn publish_depth(&self) {
        let Some(path) = &self.depth_file else {
            return;
        };
        if !self.depth_file_enabled.load(Ordering::Relaxed) {
            return;
        }

        let depth = self.depth();
        log::debug!("Updating queue depth file with {}", depth);
        if let Err(e) = std::fs::write(path, depth.to_string()) {
            log::warn!(
                "⚠️  Failed to write queue depth to {}: {} (disabling)",
                path.display(),
                e
            );
            self.depth_file_enabled.store(false, Ordering::Relaxed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::RECENT_REQUEST_CAPACITY;

    #[test]
    fn test_submit_enqueues_task() {
        let ctx = ScanContext::default();
        let depth = ctx.submit("37.0", "-122.0", ScanMode::StaticOnly).unwrap();
        assert_eq!(depth, 1);

        let task = ctx.queue().try_pop().unwrap();
        assert_eq!(task.center, Coordinate { lat: 37.0, lng: -122.0 });
        assert_eq!(task.mode, ScanMode::StaticOnly);
    }

    #[test]
    fn test_duplicate_rejected_within_window() {
        let ctx = ScanContext::default();
        ctx.submit("1.5", "2.5", ScanMode::WildOnly).unwrap();

        let err = ctx.submit("1.5", "2.5", ScanMode::StaticOnly).unwrap_err();
        assert!(matches!(err, EnqueueError::Duplicate { .. }));
        assert_eq!(ctx.depth(), 1);

        // Different string for the same number is a different request
        assert!(ctx.submit("1.50", "2.5", ScanMode::WildOnly).is_ok());
    }

    #[test]
    fn test_duplicate_accepted_after_eviction() {
        let ctx = ScanContext::default();
        ctx.submit("10", "10", ScanMode::WildOnly).unwrap();
        for i in 0..RECENT_REQUEST_CAPACITY {
            ctx.submit(&format!("{}", i), "0", ScanMode::WildOnly).unwrap();
        }
        assert!(ctx.submit("10", "10", ScanMode::WildOnly).is_ok());
    }

    #[test]
    fn test_longitude_out_of_range_rejected_regardless_of_window() {
        let ctx = ScanContext::default();
        let err = ctx.submit("0", "180.1", ScanMode::WildOnly).unwrap_err();
        assert_eq!(
            err,
            EnqueueError::Invalid(ValidationError::LongitudeOutOfRange(180.1))
        );
        // Rejected requests are not remembered, and are rejected again
        let err = ctx.submit("0", "180.1", ScanMode::WildOnly).unwrap_err();
        assert!(matches!(err, EnqueueError::Invalid(_)));
        assert_eq!(ctx.depth(), 0);
    }

    #[test]
    fn test_requeue_appends_unchanged() {
        let ctx = ScanContext::default();
        let task = Task::new(Coordinate::new(5.0, 6.0).unwrap(), ScanMode::WildOnly);
        ctx.requeue(task);
        assert_eq!(ctx.queue().try_pop(), Some(task));
    }

    #[test]
    fn test_depth_file_tracks_queue() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("queue_depth");
        let ctx = ScanContext::new(Some(path.clone()));

        ctx.submit("1", "1", ScanMode::WildOnly).unwrap();
        ctx.submit("2", "2", ScanMode::WildOnly).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "2");

        ctx.queue().try_pop();
        ctx.publish_depth();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "1");
    }

    #[test]
    fn test_depth_file_failure_disables_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("queue_depth");
        let ctx = ScanContext::new(Some(path.clone()));

        ctx.submit("1", "1", ScanMode::WildOnly).unwrap();
        assert!(!ctx.depth_file_enabled.load(Ordering::Relaxed));

        // Later writes are skipped even once the directory exists
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        ctx.submit("2", "2", ScanMode::WildOnly).unwrap();
        assert!(!path.exists());
    }
}
