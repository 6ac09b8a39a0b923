//! Supervised pool of workers, one per account

use super::runner::Worker;
use crate::source::MapSource;
use tokio::task::JoinSet;

/// Runs every worker under its own supervisor; a panicked worker is
/// restarted with a fresh session for the same account, and the task it
/// was holding goes back on the queue
pub struct WorkerPool {
    supervisors: JoinSet<()>,
    size: usize,
}

impl WorkerPool {
    pub fn spawn<S: MapSource + 'static>(workers: Vec<Worker<S>>) -> Self {
        let size = workers.len();
        let mut supervisors = JoinSet::new();
        for worker in workers {
            log::info!("👷 Starting worker for {}", worker.name());
            supervisors.spawn(supervise(worker));
        }
        Self { supervisors, size }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Wait until every supervisor has stopped
    pub async fn join(mut self) {
        while let Some(result) = self.supervisors.join_next().await {
            if let Err(e) = result {
                log::error!("❌ Worker supervisor failed: {}", e);
            }
        }
        log::warn!("All {} workers stopped", self.size);
    }
}

async fn supervise<S: MapSource + 'static>(worker: Worker<S>) {
    let mut restarts = 0u32;
    loop {
        let handle = tokio::spawn(worker.clone().run());
        match handle.await {
            Ok(()) => {
                log::warn!("[{}] Worker exited", worker.name());
                return;
            }
            Err(e) if e.is_panic() => {
                restarts += 1;
                log::error!(
                    "💥 [{}] Worker panicked, restarting (restart #{})",
                    worker.name(),
                    restarts
                );
                if let Some(task) = worker.requeue_in_flight() {
                    log::warn!("[{}] Recovered {} from the panicked walk", worker.name(), task);
                }
            }
            Err(e) => {
                log::warn!("[{}] Worker cancelled: {}", worker.name(), e);
                return;
            }
        }
    }
}
