//! Main-thread dispatcher.
//!
//! All UI-affine work runs on one thread, the *main thread*, bound once per
//! dispatcher. Any thread can hand work to it with
//! [`Dispatcher::dispatch_on_main`]; the main thread runs queued work in
//! submission order whenever it drains the queue, either from its own loop
//! ([`Dispatcher::run`]) or from an application event loop that interleaves
//! draining with native event processing.
//!
//! # Ordering
//!
//! Items from one submitting thread run in the order they were submitted.
//! `High` priority items overtake pending `Normal` items but keep FIFO order
//! among themselves. Items submitted while the queue is draining, including
//! from a running item, run in the same pass.
//!
//! # Failure containment
//!
//! A panicking work item is logged and dropped; the next item still runs.
//! [`Dispatcher::dispatch_on_main_sync`] is the exception: the panic is
//! reported to the blocked caller as [`DispatchError::Panicked`].

mod queue;

pub use queue::{Priority, Work};

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, OnceLock};
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};

use desktop_toolkit_config::{DispatcherConfig, ShutdownPolicy};

use crate::error::DispatchError;
use queue::WorkQueue;

/// Runtime dispatcher settings, usually derived from [`DispatcherConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatcherOptions {
    pub shutdown_policy: ShutdownPolicy,
    /// `None` blocks synchronous callers indefinitely.
    pub sync_timeout: Option<Duration>,
    /// `None` disables slow-item warnings.
    pub slow_item_warn: Option<Duration>,
}

impl Default for DispatcherOptions {
    fn default() -> Self {
        Self::from(&DispatcherConfig::default())
    }
}

impl From<&DispatcherConfig> for DispatcherOptions {
    fn from(config: &DispatcherConfig) -> Self {
        Self {
            shutdown_policy: config.shutdown_policy,
            sync_timeout: config.sync_timeout_ms.map(Duration::from_millis),
            slow_item_warn: match config.slow_item_warn_ms {
                0 => None,
                ms => Some(Duration::from_millis(ms)),
            },
        }
    }
}

struct Shared {
    queue: WorkQueue,
    main_thread: OnceLock<ThreadId>,
    options: DispatcherOptions,
}

/// Handle to a main-thread dispatcher.
///
/// Cloning is cheap and every clone refers to the same queue, so a handle can
/// be moved into worker threads freely.
#[derive(Clone)]
pub struct Dispatcher {
    shared: Arc<Shared>,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("main_thread", &self.shared.main_thread.get())
            .field("pending", &self.pending())
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(DispatcherOptions::default())
    }
}

impl Dispatcher {
    pub fn new(options: DispatcherOptions) -> Self {
        Self {
            shared: Arc::new(Shared {
                queue: WorkQueue::default(),
                main_thread: OnceLock::new(),
                options,
            }),
        }
    }

    pub fn options(&self) -> &DispatcherOptions {
        &self.shared.options
    }

    /// Designate the calling thread as the main thread.
    ///
    /// Binding the same thread again is a no-op; binding a different one is
    /// an error.
    pub fn bind_to_current_thread(&self) -> Result<(), DispatchError> {
        let current = thread::current().id();
        let bound = *self.shared.main_thread.get_or_init(|| current);
        if bound == current {
            log::debug!("Dispatcher bound to main thread {:?}", current);
            Ok(())
        } else {
            Err(DispatchError::AlreadyBound)
        }
    }

    /// `true` only on the bound main thread. Lock-free.
    pub fn is_main_thread(&self) -> bool {
        self.shared.main_thread.get() == Some(&thread::current().id())
    }

    /// Queue `work` for the main thread and return immediately.
    pub fn dispatch_on_main<F>(&self, work: F) -> Result<(), DispatchError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.dispatch_on_main_with_priority(Priority::Normal, work)
    }

    pub fn dispatch_on_main_with_priority<F>(
        &self,
        priority: Priority,
        work: F,
    ) -> Result<(), DispatchError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.shared.queue.push(priority, Box::new(work))
    }

    /// Run `work` on the main thread and wait for its result.
    ///
    /// Called on the main thread itself, `work` runs inline: queueing it
    /// would deadlock the caller against its own drain loop.
    pub fn dispatch_on_main_sync<T, F>(&self, work: F) -> Result<T, DispatchError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        if self.is_main_thread() {
            return panic::catch_unwind(AssertUnwindSafe(work))
                .map_err(|payload| DispatchError::Panicked(panic_message(payload.as_ref())));
        }

        let (tx, rx) = mpsc::sync_channel(1);
        self.dispatch_on_main(move || {
            let result = panic::catch_unwind(AssertUnwindSafe(work))
                .map_err(|payload| panic_message(payload.as_ref()));
            // The caller may have timed out and gone away.
            let _ = tx.send(result);
        })?;

        // A disconnected channel means the item was dropped unexecuted.
        let outcome = match self.shared.options.sync_timeout {
            Some(timeout) => rx.recv_timeout(timeout).map_err(|e| match e {
                RecvTimeoutError::Timeout => DispatchError::Timeout,
                RecvTimeoutError::Disconnected => DispatchError::Cancelled,
            })?,
            None => rx.recv().map_err(|_| DispatchError::Cancelled)?,
        };
        outcome.map_err(DispatchError::Panicked)
    }

    /// Bind the calling thread, run `body` on it, then drain anything `body`
    /// queued.
    pub fn start_on_main_thread<T, F>(&self, body: F) -> Result<T, DispatchError>
    where
        F: FnOnce() -> T,
    {
        self.bind_to_current_thread()?;
        let value = body();
        self.drain()?;
        Ok(value)
    }

    /// Run queued work until the queue is empty. Main thread only.
    ///
    /// Returns the number of items run.
    pub fn drain(&self) -> Result<usize, DispatchError> {
        self.ensure_main_thread()?;
        let mut ran = 0;
        while let Some(work) = self.shared.queue.pop() {
            self.run_item(work);
            ran += 1;
        }
        if ran > 0 {
            log::trace!("Drained {} work item(s)", ran);
        }
        Ok(ran)
    }

    /// Block the main thread until work arrives, [`wake`](Self::wake) is
    /// called, the dispatcher closes or `timeout` elapses.
    ///
    /// Returns `Ok(false)` on timeout.
    pub fn wait(&self, timeout: Option<Duration>) -> Result<bool, DispatchError> {
        self.ensure_main_thread()?;
        Ok(self.shared.queue.wait(timeout))
    }

    /// Wake the main thread without queueing work.
    pub fn wake(&self) {
        self.shared.queue.wake();
    }

    /// Bind the calling thread and process work until [`close`](Self::close)
    /// is called and the queue has been finalized.
    pub fn run(&self) -> Result<(), DispatchError> {
        self.bind_to_current_thread()?;
        log::info!("Dispatcher loop started");
        loop {
            self.drain()?;
            if self.shared.queue.is_finished() {
                break;
            }
            self.wait(None)?;
        }
        log::info!("Dispatcher loop finished");
        Ok(())
    }

    /// Stop accepting work and finalize what is queued according to the
    /// shutdown policy.
    ///
    /// Under [`ShutdownPolicy::Drain`] the queued items still run: inline when
    /// called on the main thread, otherwise on the main thread's next drain.
    /// Under [`ShutdownPolicy::Cancel`] they are dropped right away and
    /// blocked synchronous callers receive [`DispatchError::Cancelled`].
    pub fn close(&self) {
        match self.shared.options.shutdown_policy {
            ShutdownPolicy::Drain => {
                self.shared.queue.close(false);
                log::info!(
                    "Dispatcher closed, draining {} pending item(s)",
                    self.pending()
                );
                if self.is_main_thread() {
                    // Cannot fail: the main-thread check just passed.
                    let _ = self.drain();
                }
            }
            ShutdownPolicy::Cancel => {
                let cancelled = self.shared.queue.close(true);
                log::info!(
                    "Dispatcher closed, cancelled {} pending item(s)",
                    cancelled.len()
                );
                drop(cancelled);
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.shared.queue.is_closed()
    }

    /// Number of queued items not yet run.
    pub fn pending(&self) -> usize {
        self.shared.queue.len()
    }

    fn ensure_main_thread(&self) -> Result<(), DispatchError> {
        if self.is_main_thread() {
            Ok(())
        } else {
            Err(DispatchError::NotMainThread)
        }
    }

    fn run_item(&self, work: Work) {
        let started = Instant::now();
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(work)) {
            log::error!(
                "Dispatched work item panicked: {}",
                panic_message(payload.as_ref())
            );
        }
        if let Some(threshold) = self.shared.options.slow_item_warn {
            let elapsed = started.elapsed();
            if elapsed >= threshold {
                log::warn!(
                    "Dispatched work item blocked the main thread for {:?} (threshold {:?})",
                    elapsed,
                    threshold
                );
            }
        }
    }
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn test_unbound_dispatcher_is_not_main_thread() {
        let dispatcher = Dispatcher::default();
        assert!(!dispatcher.is_main_thread());
        assert_eq!(dispatcher.drain(), Err(DispatchError::NotMainThread));
    }

    #[test]
    fn test_binding_twice_from_other_thread_fails() {
        let dispatcher = Dispatcher::default();
        dispatcher.bind_to_current_thread().unwrap();
        dispatcher.bind_to_current_thread().unwrap();
        let other = dispatcher.clone();
        let result = thread::spawn(move || other.bind_to_current_thread())
            .join()
            .unwrap();
        assert_eq!(result, Err(DispatchError::AlreadyBound));
    }

    #[test]
    fn test_sync_dispatch_on_main_thread_runs_inline() {
        let dispatcher = Dispatcher::default();
        dispatcher.bind_to_current_thread().unwrap();
        assert_eq!(dispatcher.dispatch_on_main_sync(|| 6 * 7), Ok(42));
        assert_eq!(dispatcher.pending(), 0);
    }

    #[test]
    fn test_panicking_item_does_not_stop_drain() {
        let dispatcher = Dispatcher::default();
        dispatcher.bind_to_current_thread().unwrap();
        let ran = Arc::new(AtomicBool::new(false));
        dispatcher
            .dispatch_on_main(|| panic!("boom"))
            .unwrap();
        let flag = Arc::clone(&ran);
        dispatcher
            .dispatch_on_main(move || flag.store(true, Ordering::SeqCst))
            .unwrap();
        assert_eq!(dispatcher.drain(), Ok(2));
        assert!(ran.load(Ordering::SeqCst));
    }

    #[test]
    fn test_inline_sync_panic_is_reported() {
        let dispatcher = Dispatcher::default();
        dispatcher.bind_to_current_thread().unwrap();
        let result: Result<(), _> = dispatcher.dispatch_on_main_sync(|| panic!("inline boom"));
        assert_eq!(result, Err(DispatchError::Panicked("inline boom".into())));
    }

    #[test]
    fn test_start_on_main_thread_drains_after_body() {
        let dispatcher = Dispatcher::default();
        let ran = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&ran);
        let inner = dispatcher.clone();
        let value = dispatcher
            .start_on_main_thread(move || {
                inner
                    .dispatch_on_main(move || flag.store(true, Ordering::SeqCst))
                    .unwrap();
                "started"
            })
            .unwrap();
        assert_eq!(value, "started");
        assert!(ran.load(Ordering::SeqCst));
    }

    #[test]
    fn test_options_from_config() {
        let config = DispatcherConfig {
            shutdown_policy: ShutdownPolicy::Cancel,
            sync_timeout_ms: Some(1500),
            slow_item_warn_ms: 0,
        };
        let options = DispatcherOptions::from(&config);
        assert_eq!(options.shutdown_policy, ShutdownPolicy::Cancel);
        assert_eq!(options.sync_timeout, Some(Duration::from_millis(1500)));
        assert_eq!(options.slow_item_warn, None);
    }

    #[test]
    fn test_panic_message_variants() {
        assert_eq!(panic_message(&"static"), "static");
        assert_eq!(panic_message(&String::from("owned")), "owned");
        assert_eq!(panic_message(&42u32), "non-string panic payload");
    }
}
