//! Shared task intake
//!
//! - `Task` / `ScanMode` - one unit of sampling work
//! - `TaskQueue` - unbounded FIFO shared by ingress and every worker
//! - `RecentRequestWindow` - ring of the last accepted request strings
//! - `ScanContext` - process-scoped owner of the two, handed out by `Arc`

pub mod context;
pub mod recent;
pub mod task;
pub mod task_queue;

pub use context::{EnqueueError, ScanContext};
pub use recent::{RecentRequestWindow, RECENT_REQUEST_CAPACITY};
pub use task::{ScanMode, Task};
pub use task_queue::TaskQueue;
