//! Two-lane FIFO of work items with a coalescing wake signal.
//!
//! Producers on any thread push under the mutex; the single consumer (the
//! bound main thread) pops one item at a time, so items pushed while an item
//! runs are seen by the same drain pass.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::error::DispatchError;

/// A unit of work executed on the main thread.
pub type Work = Box<dyn FnOnce() + Send + 'static>;

/// Submission lane. `High` items run before any pending `Normal` item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Priority {
    High,
    #[default]
    Normal,
}

#[derive(Default)]
struct QueueState {
    high: VecDeque<Work>,
    normal: VecDeque<Work>,
    /// An explicit `wake()` not yet observed by the consumer.
    wake_requested: bool,
    /// The condvar was notified since the consumer last checked the queue.
    /// Further signals while set do not notify again.
    notified: bool,
    closed: bool,
}

impl QueueState {
    fn len(&self) -> usize {
        self.high.len() + self.normal.len()
    }

    fn signal(&mut self, cond: &Condvar) {
        if !self.notified {
            self.notified = true;
            cond.notify_one();
        }
    }

    fn ready(&self) -> bool {
        self.len() > 0 || self.wake_requested || self.closed
    }
}

#[derive(Default)]
pub(crate) struct WorkQueue {
    state: Mutex<QueueState>,
    cond: Condvar,
}

impl WorkQueue {
    pub(crate) fn push(&self, priority: Priority, work: Work) -> Result<(), DispatchError> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(DispatchError::Closed);
        }
        match priority {
            Priority::High => state.high.push_back(work),
            Priority::Normal => state.normal.push_back(work),
        }
        state.signal(&self.cond);
        Ok(())
    }

    /// Remove the next item, high lane first.
    pub(crate) fn pop(&self) -> Option<Work> {
        let mut state = self.state.lock();
        state.high.pop_front().or_else(|| state.normal.pop_front())
    }

    pub(crate) fn len(&self) -> usize {
        self.state.lock().len()
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Closed with nothing left to run.
    pub(crate) fn is_finished(&self) -> bool {
        let state = self.state.lock();
        state.closed && state.len() == 0
    }

    pub(crate) fn wake(&self) {
        let mut state = self.state.lock();
        state.wake_requested = true;
        state.signal(&self.cond);
    }

    /// Block until work is queued, a wake was signalled, the queue closed or
    /// `timeout` elapsed. Returns `false` only on timeout. Pushes already
    /// drained do not count: an empty queue without a wake request blocks.
    pub(crate) fn wait(&self, timeout: Option<Duration>) -> bool {
        let deadline = timeout.map(|t| Instant::now() + t);
        let mut state = self.state.lock();
        while !state.ready() {
            // Re-arm so the next push or wake notifies this waiter.
            state.notified = false;
            match deadline {
                Some(deadline) => {
                    if self.cond.wait_until(&mut state, deadline).timed_out() {
                        break;
                    }
                }
                None => self.cond.wait(&mut state),
            }
        }
        let woke = state.ready();
        state.wake_requested = false;
        state.notified = false;
        woke
    }

    /// Reject further pushes. Returns the items still queued when `take` is
    /// set, so the caller can drop them outside the lock.
    pub(crate) fn close(&self, take: bool) -> Vec<Work> {
        let mut state = self.state.lock();
        state.closed = true;
        let taken = if take {
            let mut items: Vec<Work> = state.high.drain(..).collect();
            items.extend(state.normal.drain(..));
            items
        } else {
            Vec::new()
        };
        // Closing always wakes the consumer, even when a signal is pending.
        state.notified = true;
        self.cond.notify_all();
        taken
    }
}
