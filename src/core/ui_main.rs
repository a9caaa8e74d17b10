//! # UiMain: the façade wiring executor, gate, pump and periodic task together.
//!
//! ## Control flow
//! ```text
//! caller thread                              worker thread
//! ─────────────                              ─────────────
//! initialize()
//!   ├─ running = true
//!   ├─ post(init job) ─────────────────────► init job
//!   └─ gate.await_or_timeout(5s) ◄──┐          ├─ Subsystem::init + register token
//!                                   │          ├─ spawn pump, periodic (+ signal listener)
//!                                   └──────────└─ gate.resolve(Ready | Failed | Aborted)
//!
//! schedule_task(work) ─ post ──────────────► work(&mut S)        (serialized)
//!
//! quit() ─ post ───────────────────────────► push Custom(token) into subsystem queue
//!                                            pump polls it → running = false, stop
//!                                            teardown → worker exits → join()
//! ```
//!
//! ## Rules
//! - The subsystem is only touched on the worker, inside the serialized domain.
//! - `initialize()` is the only blocking call, bounded by `Config::init_timeout`.
//! - `schedule_task()` and `quit()` are fire-and-forget; after the executor
//!   stopped they are silently dropped.
//! - On init failure or timeout, the executor is stopped before `initialize()`
//!   returns: closures scheduled afterwards never run.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::broadcast;

use super::{
    builder::UiMainBuilder,
    context::{Shared, UiContext},
    executor::SerializedExecutor,
    gate::GateState,
};
use crate::{
    config::Config,
    error::RuntimeError,
    events::{Event, EventKind},
    subsystem::Subsystem,
};

/// Handle to a thread-confined subsystem.
///
/// Cheap to share behind an `Arc`: every method takes `&self` and may be
/// called from any thread. Dropping the handle stops the worker and joins it,
/// except when the last handle is dropped inside a scheduled closure: the
/// worker is then detached and completes teardown without anyone waiting.
pub struct UiMain<S: Subsystem> {
    shared: Arc<Shared>,
    executor: SerializedExecutor<UiContext<S>>,
    init_requested: AtomicBool,
}

impl<S: Subsystem> UiMain<S> {
    /// Starts building a runtime around the subsystem produced by `factory`.
    ///
    /// `factory` runs on the worker thread; `S` itself never crosses threads.
    pub fn builder<F>(factory: F) -> UiMainBuilder<S, F>
    where
        F: FnOnce() -> S + Send + 'static,
    {
        UiMainBuilder::new(factory)
    }

    /// Starts the worker with `cfg` and no subscribers.
    pub fn new<F>(cfg: Config, factory: F) -> Result<Self, RuntimeError>
    where
        F: FnOnce() -> S + Send + 'static,
    {
        UiMainBuilder::new(factory).with_config(cfg).build()
    }

    pub(crate) fn from_parts(shared: Arc<Shared>, executor: SerializedExecutor<UiContext<S>>) -> Self {
        Self {
            shared,
            executor,
            init_requested: AtomicBool::new(false),
        }
    }

    /// Initializes the subsystem on the worker and waits for the outcome.
    ///
    /// Blocks for at most `Config::init_timeout`. On failure or timeout the
    /// session is stopped and `is_running()` is `false` afterwards.
    pub fn initialize(&self) -> Result<(), RuntimeError> {
        if self.executor.is_worker_thread() {
            return Err(RuntimeError::CalledFromWorker);
        }
        if self.init_requested.swap(true, Ordering::AcqRel) {
            return Err(RuntimeError::AlreadyInitialized);
        }

        let shared = &self.shared;
        shared.set_running(true);
        shared
            .bus
            .publish(Event::new(EventKind::InitStarting).with_current_thread());

        if !self.executor.post(|ctx| ctx.initialize()) {
            shared.set_running(false);
            return Err(RuntimeError::ExecutorStopped);
        }

        let timeout = shared.cfg.init_timeout;
        let settled = shared
            .gate
            .await_or_timeout(timeout, |state| state.is_resolved() || !shared.is_running());
        if !settled {
            shared.stop();
            shared
                .bus
                .publish(Event::new(EventKind::InitTimedOut).with_timeout(timeout));
            return Err(RuntimeError::InitTimeout { timeout });
        }

        match shared.gate.state() {
            GateState::Ready => Ok(()),
            GateState::Failed(reason) => Err(RuntimeError::InitFailed { reason }),
            GateState::Pending | GateState::Aborted => Err(RuntimeError::InitAborted),
        }
    }

    /// Runs `work` on the worker thread with exclusive access to the subsystem.
    ///
    /// Returns immediately. `work` runs after every closure this thread
    /// scheduled before it, and never concurrently with any other closure.
    pub fn schedule_task<F>(&self, work: F)
    where
        F: FnOnce(&mut S) + Send + 'static,
    {
        self.executor.post(move |ctx| ctx.with_subsystem(work));
    }

    /// Requests shutdown through the subsystem's own event queue.
    ///
    /// Safe to call any number of times, from any thread, including from
    /// inside a scheduled closure.
    pub fn quit(&self) {
        self.shared
            .bus
            .publish(Event::new(EventKind::QuitRequested).with_current_thread());
        self.executor.post(|ctx| ctx.push_quit());
    }

    /// Whether the session should keep polling.
    pub fn is_running(&self) -> bool {
        self.shared.is_running()
    }

    /// Whether the executor was asked to stop.
    pub fn is_stopped(&self) -> bool {
        self.executor.is_stopped()
    }

    /// Whether the current thread is the worker thread.
    pub fn is_worker_thread(&self) -> bool {
        self.executor.is_worker_thread()
    }

    /// Runtime configuration.
    pub fn config(&self) -> &Config {
        &self.shared.cfg
    }

    /// Creates a receiver for subsequent runtime events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.shared.bus.subscribe()
    }

    /// Blocks until the session ends on its own (quit, terminate event, init
    /// failure) and the worker thread exits.
    pub fn join(self) -> Result<(), RuntimeError> {
        self.executor.join()
    }

    /// Requests quit and waits for the worker thread to exit.
    pub fn shutdown(self) -> Result<(), RuntimeError> {
        self.quit();
        self.join()
    }
}
