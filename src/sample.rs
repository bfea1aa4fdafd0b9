//! Headless demo run used by the `desktop-toolkit` binary.
//!
//! One window is opened on the UI thread while worker threads hammer the
//! dispatcher with fire-and-forget decrements, each finishing with a
//! synchronous barrier. Once every worker is done, a native close request is
//! injected for the window, which ends the event loop.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use desktop_toolkit_config::Config;
use desktop_toolkit_events::{
    EventHandlerResult, EventTaxonomy, Linux, Macos, Platform, PlatformEvent, Win32,
};

use crate::application::Application;
use crate::dispatcher::{Dispatcher, DispatcherOptions};
use crate::error::DispatchError;
use crate::platform::HeadlessBinding;
use crate::window::WindowParams;

/// Outcome of a demo run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleReport {
    pub platform: Platform,
    pub work_items: usize,
    /// Counter value after every work item ran; 0 on success.
    pub final_counter: i64,
    /// Counter value each worker observed at its synchronous barrier.
    pub barrier_values: Vec<i64>,
    /// Handled native events by variant name.
    pub events: BTreeMap<&'static str, usize>,
    pub open_windows_at_exit: usize,
    pub elapsed: Duration,
}

impl fmt::Display for SampleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "platform:        {}", self.platform)?;
        writeln!(f, "work items:      {}", self.work_items)?;
        writeln!(f, "final counter:   {}", self.final_counter)?;
        writeln!(f, "barrier values:  {:?}", self.barrier_values)?;
        writeln!(f, "open windows:    {}", self.open_windows_at_exit)?;
        writeln!(f, "elapsed:         {:?}", self.elapsed)?;
        writeln!(f, "native events:")?;
        for (name, count) in &self.events {
            writeln!(f, "  {name:<32} {count}")?;
        }
        Ok(())
    }
}

/// Run the demo with the taxonomy of `platform`.
pub fn run_sample(
    platform: Platform,
    config: &Config,
    workers: usize,
    tasks: usize,
) -> Result<SampleReport> {
    match platform {
        Platform::Macos => run_headless::<Macos>(config, workers, tasks),
        Platform::Linux => run_headless::<Linux>(config, workers, tasks),
        Platform::Win32 => run_headless::<Win32>(config, workers, tasks),
    }
}

fn run_headless<T: EventTaxonomy>(config: &Config, workers: usize, tasks: usize) -> Result<SampleReport> {
    let started = Instant::now();
    let dispatcher = Dispatcher::new(DispatcherOptions::from(&config.dispatcher));
    let binding = HeadlessBinding::<T>::new(dispatcher.clone());
    let sender = binding.sender();
    let mut app =
        Application::new(dispatcher.clone(), binding).with_window_defaults(config.window.clone());

    let params = WindowParams::from_defaults(&config.window);
    let window = app
        .context_mut()
        .create_window(&params)
        .context("Failed to create demo window")?;

    let events: Rc<RefCell<BTreeMap<&'static str, usize>>> = Rc::default();
    let seen = Rc::clone(&events);
    app.install_event_handler(move |ctx, event| {
        *seen.borrow_mut().entry(event.name()).or_insert(0) += 1;
        if !event.is_close_request() {
            return EventHandlerResult::Continue;
        }
        if let Some(id) = event.window_id() {
            if let Err(e) = ctx.set_title(id, "closing") {
                log::warn!("Could not retitle {}: {}", id, e);
            }
            if let Err(e) = ctx.close_window(id) {
                log::error!("Close request for {} failed: {}", id, e);
            }
        }
        if ctx.open_windows().is_empty() {
            ctx.stop_event_loop();
        }
        EventHandlerResult::Stop
    });

    let work_items = workers * tasks;
    let counter = Arc::new(AtomicI64::new(work_items as i64));
    let coordinator = {
        let dispatcher = dispatcher.clone();
        let counter = Arc::clone(&counter);
        thread::Builder::new()
            .name("sample-coordinator".to_string())
            .spawn(move || -> Result<Vec<i64>, DispatchError> {
                let handles: Vec<_> = (0..workers)
                    .map(|_| {
                        let dispatcher = dispatcher.clone();
                        let counter = Arc::clone(&counter);
                        thread::spawn(move || -> Result<i64, DispatchError> {
                            for _ in 0..tasks {
                                let counter = Arc::clone(&counter);
                                dispatcher.dispatch_on_main(move || {
                                    counter.fetch_sub(1, Ordering::SeqCst);
                                })?;
                            }
                            let counter = Arc::clone(&counter);
                            dispatcher.dispatch_on_main_sync(move || counter.load(Ordering::SeqCst))
                        })
                    })
                    .collect();

                let mut barrier_values = Vec::with_capacity(handles.len());
                for handle in handles {
                    let value = handle
                        .join()
                        .map_err(|_| DispatchError::Panicked("sample worker panicked".into()))??;
                    barrier_values.push(value);
                }
                sender.send_event::<T>(&T::close_request(window));
                Ok(barrier_values)
            })
            .context("Failed to spawn sample coordinator")?
    };

    let loop_result = app.run_event_loop();
    // Releases any worker still blocked on a barrier if the loop ended early.
    dispatcher.close();
    let barrier_values = coordinator
        .join()
        .map_err(|_| anyhow!("sample coordinator panicked"))?;
    loop_result.context("Event loop failed")?;
    let barrier_values = barrier_values.context("Sample worker failed")?;

    let events = events.borrow().clone();
    Ok(SampleReport {
        platform: T::PLATFORM,
        work_items,
        final_counter: counter.load(Ordering::SeqCst),
        barrier_values,
        events,
        open_windows_at_exit: app.context().open_windows().len(),
        elapsed: started.elapsed(),
    })
}
