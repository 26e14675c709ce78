//! Batch completion tracking
//!
//! A batch registers its total number of work units up front; every task
//! marks its unit done whether it succeeded or not. [`CompletionTracker::wait`]
//! returns once nothing is outstanding.

use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Notify;

#[derive(Debug)]
pub struct CompletionTracker {
    total: usize,
    remaining: AtomicUsize,
    notify: Notify,
}

impl CompletionTracker {
    pub fn start(total: usize) -> Self {
        Self {
            total,
            remaining: AtomicUsize::new(total),
            notify: Notify::new(),
        }
    }

    /// Marks one unit done
    ///
    /// Extra calls beyond the registered total are ignored.
    pub fn done(&self) {
        let previous = self
            .remaining
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));
        if previous == Ok(1) {
            self.notify.notify_waiters();
        }
    }

    /// Marks `n` units done at once
    pub fn done_many(&self, n: usize) {
        for _ in 0..n {
            self.done();
        }
    }

    pub fn outstanding(&self) -> usize {
        self.remaining.load(Ordering::Acquire)
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Waits until every unit is done
    pub async fn wait(&self) {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.outstanding() == 0 {
                return;
            }
            notified.await;
        }
    }
}
