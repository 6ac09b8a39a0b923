//! Unbounded FIFO of pending tasks with an async blocking pop

use super::task::Task;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;

/// Cloneable handle to one shared queue
#[derive(Debug, Clone, Default)]
pub struct TaskQueue {
    inner: Arc<QueueInner>,
}

#[derive(Debug, Default)]
struct QueueInner {
    tasks: Mutex<VecDeque<Task>>,
    available: Notify,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a task; never blocks. Returns the depth after the push.
    pub fn push(&self, task: Task) -> usize {
        let depth = {
            let mut tasks = self.lock();
            tasks.push_back(task);
            tasks.len()
        };
        self.inner.available.notify_one();
        depth
    }

    /// Take the oldest task without waiting
    pub fn try_pop(&self) -> Option<Task> {
        self.lock().pop_front()
    }

    /// Wait until a task is available and take it
    pub async fn pop(&self) -> Task {
        loop {
            // Register interest before checking so a push between the check
            // and the await is not missed.
            let notified = self.inner.available.notified();
            if let Some(task) = self.try_pop() {
                return task;
            }
            notified.await;
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Task>> {
        // The critical sections never panic midway, so a poisoned queue is
        // still consistent.
        self.inner.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coordinate;
    use crate::queue::ScanMode;
    use std::collections::HashSet;
    use std::time::Duration;

    fn task(i: u32) -> Task {
        Task::new(
            Coordinate::new(f64::from(i) * 0.01, 0.0).unwrap(),
            ScanMode::StaticOnly,
        )
    }

    #[test]
    fn test_fifo_order() {
        let queue = TaskQueue::new();
        assert_eq!(queue.push(task(1)), 1);
        assert_eq!(queue.push(task(2)), 2);
        assert_eq!(queue.try_pop(), Some(task(1)));
        assert_eq!(queue.try_pop(), Some(task(2)));
        assert!(queue.try_pop().is_none());
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn test_pop_waits_for_push() {
        let queue = TaskQueue::new();
        let consumer = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.pop().await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!consumer.is_finished());

        queue.push(task(5));
        let popped = tokio::time::timeout(Duration::from_secs(2), consumer)
            .await
            .expect("consumer should wake")
            .unwrap();
        assert_eq!(popped, task(5));
    }

    #[tokio::test]
    async fn test_concurrent_consumers_see_each_task_once() {
        let queue = TaskQueue::new();
        let total = 200u32;
        for i in 0..total {
            queue.push(task(i));
        }

        let mut handles = Vec::new();
        for _ in 0..4 {
            let queue = queue.clone();
            handles.push(tokio::spawn(async move {
                let mut seen = Vec::new();
                while let Some(t) = queue.try_pop() {
                    seen.push(t.center.lat.to_bits());
                    tokio::task::yield_now().await;
                }
                seen
            }));
        }

        let mut all = HashSet::new();
        for handle in handles {
            for bits in handle.await.unwrap() {
                assert!(all.insert(bits), "task popped twice");
            }
        }
        assert_eq!(all.len(), total as usize);
    }
}
