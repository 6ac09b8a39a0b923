//! The per-account worker loop
//!
//! ```text
//! connect ──► pop task ──► walk ──ok──► deliver, publish depth ──┐
//!   ▲                        │                                   │
//!   │                        └─err─► drop walk + session          │
//!   │                                 connect (retry forever)     │
//!   │                                 requeue task unchanged ─────┤
//!   └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Samples of one walk are queried one after another on the worker's own
//! session with a fixed pause after each query.
//!
//! A walk that cannot build a cell window for one of its samples is rejected
//! instead of requeued: the same settings would fail the same way on retry.
//! The task a worker holds is kept in a slot shared with its supervisor, so a
//! panicking walk still gets its task requeued.

use super::backoff::ExponentialBackoff;
use crate::aggregate::{classify, SpeciesNames, WalkAggregate};
use crate::geo::spiral::{static_map_path, DEFAULT_JITTER_MAX};
use crate::geo::{cell_window, Coordinate, SpiralSampler, ValidationError, DEFAULT_RADIUS};
use crate::queue::{ScanContext, ScanMode, Task};
use crate::sink::{MapSink, SinkError};
use crate::source::{decode_map_objects, Credential, DecodeError, MapSource, SourceError};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Tunables for one walk
#[derive(Debug, Clone, PartialEq)]
pub struct WalkSettings {
    /// Grid spacing of the spiral, in degrees
    pub step_size: f64,
    pub wild_step_limit: usize,
    pub static_step_limit: usize,
    pub jitter_max: f64,
    pub cell_radius: usize,
    /// Pause after each remote query
    pub throttle: Duration,
    pub auth_retry_initial_ms: u64,
    pub auth_retry_max_ms: u64,
}

impl Default for WalkSettings {
    fn default() -> Self {
        Self {
            step_size: 0.001,
            wild_step_limit: 49,
            static_step_limit: 1,
            jitter_max: DEFAULT_JITTER_MAX,
            cell_radius: DEFAULT_RADIUS,
            throttle: Duration::from_millis(300),
            auth_retry_initial_ms: 1_000,
            auth_retry_max_ms: 60_000,
        }
    }
}

impl WalkSettings {
    pub fn step_limit(&self, mode: ScanMode) -> usize {
        match mode {
            ScanMode::WildOnly => self.wild_step_limit,
            ScanMode::StaticOnly => self.static_step_limit,
        }
    }

    pub fn sampler(&self, task: &Task) -> SpiralSampler {
        SpiralSampler::new(task.center, self.step_size, self.step_limit(task.mode))
            .with_jitter(self.jitter_max)
    }
}

/// Anything that aborts a walk; the task is retried from scratch
#[derive(Debug)]
pub enum WalkError {
    Cell(ValidationError),
    Source(SourceError),
    Sink(SinkError),
}

impl From<ValidationError> for WalkError {
    fn from(err: ValidationError) -> Self {
        WalkError::Cell(err)
    }
}

impl From<SourceError> for WalkError {
    fn from(err: SourceError) -> Self {
        WalkError::Source(err)
    }
}

impl From<DecodeError> for WalkError {
    fn from(err: DecodeError) -> Self {
        WalkError::Source(SourceError::Decode(err))
    }
}

impl From<SinkError> for WalkError {
    fn from(err: SinkError) -> Self {
        WalkError::Sink(err)
    }
}

impl std::fmt::Display for WalkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WalkError::Cell(e) => write!(f, "Cell window error: {}", e),
            WalkError::Source(e) => write!(f, "Remote query failed: {}", e),
            WalkError::Sink(e) => write!(f, "Delivery failed: {}", e),
        }
    }
}

impl std::error::Error for WalkError {}

impl WalkError {
    /// Whether a fresh session and another attempt could succeed
    pub fn is_retryable(&self) -> bool {
        !matches!(self, WalkError::Cell(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    Completed { delivered: usize },
    Requeued,
    /// Dropped with an error log; retrying can never succeed
    Rejected,
}

pub struct Worker<S: MapSource> {
    credential: Credential,
    source: Arc<S>,
    context: Arc<ScanContext>,
    sink: Arc<dyn MapSink>,
    species: Arc<SpeciesNames>,
    settings: WalkSettings,
    in_flight: Arc<Mutex<Option<Task>>>,
}

impl<S: MapSource> Clone for Worker<S> {
    fn clone(&self) -> Self {
        Self {
            credential: self.credential.clone(),
            source: Arc::clone(&self.source),
            context: Arc::clone(&self.context),
            sink: Arc::clone(&self.sink),
            species: Arc::clone(&self.species),
            settings: self.settings.clone(),
            in_flight: Arc::clone(&self.in_flight),
        }
    }
}

impl<S: MapSource + 'static> Worker<S> {
    pub fn new(
        credential: Credential,
        source: Arc<S>,
        context: Arc<ScanContext>,
        sink: Arc<dyn MapSink>,
        species: Arc<SpeciesNames>,
        settings: WalkSettings,
    ) -> Self {
        Self {
            credential,
            source,
            context,
            sink,
            species,
            settings,
            in_flight: Arc::new(Mutex::new(None)),
        }
    }

    pub fn name(&self) -> &str {
        &self.credential.username
    }

    /// Log in, retrying until the remote source accepts the account
    pub async fn connect(&self) -> S::Session {
        let mut backoff = ExponentialBackoff::new(
            self.settings.auth_retry_initial_ms,
            self.settings.auth_retry_max_ms,
        );

        loop {
            match self.source.authenticate(&self.credential).await {
                Ok(session) => {
                    log::info!(
                        "🔐 [{}] Logged in ({} failed attempts)",
                        self.name(),
                        backoff.attempts()
                    );
                    return session;
                }
                Err(e) => {
                    log::warn!("❌ [{}] Login failed: {}", self.name(), e);
                    backoff.sleep().await;
                }
            }
        }
    }

    /// Serve tasks forever
    pub async fn run(self) {
        let mut session = self.connect().await;
        loop {
            let (next, _) = self.run_once(session).await;
            session = next;
        }
    }

    /// Wait for one task and process it; returns the session to keep using
    pub async fn run_once(&self, session: S::Session) -> (S::Session, TaskOutcome) {
        let task = self.context.queue().pop().await;
        self.set_in_flight(Some(task));
        let result = self.handle(session, task).await;
        self.set_in_flight(None);
        result
    }

    /// Put back the task an aborted run was holding, if any
    pub fn requeue_in_flight(&self) -> Option<Task> {
        let task = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()?;
        self.context.requeue(task);
        Some(task)
    }

    fn set_in_flight(&self, task: Option<Task>) {
        *self.in_flight.lock().unwrap_or_else(PoisonError::into_inner) = task;
    }

    /// Process one task; on failure the session is replaced and the task requeued
    pub async fn handle(&self, mut session: S::Session, task: Task) -> (S::Session, TaskOutcome) {
        log::info!("🗺️  [{}] Walking {}", self.name(), task);

        match self.walk(&mut session, &task).await {
            Ok(delivered) => {
                log::info!("✅ [{}] {} done, {} items delivered", self.name(), task, delivered);
                self.context.publish_depth();
                (session, TaskOutcome::Completed { delivered })
            }
            Err(e) if !e.is_retryable() => {
                log::error!("🚫 [{}] {} rejected, retry cannot succeed: {}", self.name(), task, e);
                self.context.publish_depth();
                (session, TaskOutcome::Rejected)
            }
            Err(e) => {
                log::warn!("❌ [{}] {} failed: {}", self.name(), task, e);
                drop(session);
                let fresh = self.connect().await;
                self.context.requeue(task);
                (fresh, TaskOutcome::Requeued)
            }
        }
    }

    /// Run the full sampling walk for `task` and deliver its items
    pub async fn walk(&self, session: &mut S::Session, task: &Task) -> Result<usize, WalkError> {
        let points = self.plan(task);
        let mut aggregate = WalkAggregate::new();

        for point in &points {
            let cells = cell_window(*point, self.settings.cell_radius)?;
            log::debug!("[{}] Sampling {},{}", self.name(), point.lat, point.lng);

            let payload = self.source.query(session, *point, &cells).await?;
            tokio::time::sleep(self.settings.throttle).await;

            let objects = decode_map_objects(payload)?.into_success()?;
            aggregate.absorb(objects);
        }

        // One capture instant for the whole batch
        let capture_ms = chrono::Utc::now().timestamp_millis();
        let items = classify(&aggregate, task.mode, &self.species, capture_ms);
        log::debug!(
            "[{}] Walk saw {} forts, {} wild; path: {}",
            self.name(),
            aggregate.fort_count(),
            aggregate.wild_count(),
            static_map_path(&points)
        );

        self.sink.deliver(&items).await?;
        Ok(items.len())
    }

    fn plan(&self, task: &Task) -> Vec<Coordinate> {
        let mut rng = rand::thread_rng();
        self.settings.sampler(task).samples(&mut rng).collect()
    }
}
