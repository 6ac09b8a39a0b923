//! Session-owning workers that execute sampling walks
//!
//! One worker per account. Each worker owns its session, pulls tasks from
//! the shared queue and runs the walk strictly sequentially. Any failure
//! discards the walk and the session, logs in again, and puts the task back.

pub mod backoff;
pub mod pool;
pub mod runner;

pub use backoff::ExponentialBackoff;
pub use pool::WorkerPool;
pub use runner::{TaskOutcome, WalkError, WalkSettings, Worker};
