//! # LogWriter: events as `tracing` records
//!
//! A subscriber that turns incoming [`Event`]s into structured `tracing`
//! records. Install any `tracing` subscriber (e.g. `tracing_subscriber::fmt`)
//! to see them.
//!
//! ## Example output (fmt subscriber)
//! ```text
//! INFO uistrand: subsystem initialized thread="ui-main"
//! INFO uistrand: window closed window=2 title="inspector"
//! INFO uistrand: periodic tick tick=3 thread="ui-main"
//! WARN uistrand: scheduled task panicked reason="boom"
//! INFO uistrand: event pump stopped reason="quit-token"
//! ```

use tracing::{debug, error, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Subscribe for LogWriter {
    fn on_event(&self, e: &Event) {
        let reason = e.reason.as_deref().unwrap_or("");
        let thread = e.thread.as_deref().unwrap_or("");
        match e.kind {
            EventKind::InitStarting => {
                debug!(target: "uistrand", thread, seq = e.seq, "initialization requested");
            }
            EventKind::InitSucceeded => {
                info!(target: "uistrand", thread, "subsystem initialized");
            }
            EventKind::InitFailed => {
                error!(target: "uistrand", reason, "subsystem initialization failed");
            }
            EventKind::InitTimedOut => {
                error!(target: "uistrand", timeout_ms = e.timeout_ms, "subsystem initialization timed out");
            }
            EventKind::InitAborted => {
                warn!(target: "uistrand", "initialization finished after caller gave up; session aborted");
            }
            EventKind::TaskPanicked => {
                warn!(target: "uistrand", reason, "scheduled task panicked");
            }
            EventKind::TaskDropped => {
                debug!(target: "uistrand", "task submitted after stop was dropped");
            }
            EventKind::JobsDiscarded => {
                debug!(target: "uistrand", count = e.count, "pending tasks discarded at stop");
            }
            EventKind::ExecutorStopped => {
                info!(target: "uistrand", "executor stopped");
            }
            EventKind::QuitRequested => {
                info!(target: "uistrand", "quit requested");
            }
            EventKind::SignalReceived => {
                info!(target: "uistrand", "termination signal received");
            }
            EventKind::WindowClosed => {
                info!(target: "uistrand", window = ?e.window, title = reason, "window closed");
            }
            EventKind::PumpStopped => {
                info!(target: "uistrand", reason, "event pump stopped");
            }
            EventKind::PumpPanicked => {
                error!(target: "uistrand", reason, "event pump panicked");
            }
            EventKind::PeriodicTick => {
                info!(target: "uistrand", tick = e.tick, thread, "periodic tick");
            }
            EventKind::SubsystemQuit => {
                debug!(target: "uistrand", "subsystem torn down");
            }
            EventKind::SubscriberPanicked => {
                warn!(target: "uistrand", reason, "subscriber panicked");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
