//! # Runtime events emitted by the façade, executor, pump and periodic task.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Init events**: the startup handshake between caller and worker
//! - **Executor events**: serialized job execution and shutdown
//! - **Pump events**: reactions to subsystem events (window close, quit)
//! - **Subscriber events**: isolation of misbehaving subscribers
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use uistrand::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::InitTimedOut)
//!     .with_reason("worker still inside init")
//!     .with_timeout(Duration::from_secs(5));
//!
//! assert_eq!(ev.kind, EventKind::InitTimedOut);
//! assert_eq!(ev.timeout_ms, Some(5000));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

use crate::subsystem::WindowId;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Init events ===
    /// `initialize()` was called; the init job is being posted.
    ///
    /// Sets: `thread` (caller thread)
    InitStarting,

    /// Subsystem initialized; pump and periodic task spawned.
    ///
    /// Sets: `thread` (worker thread)
    InitSucceeded,

    /// Subsystem initialization failed; the executor is stopping.
    ///
    /// Sets: `reason`
    InitFailed,

    /// The caller stopped waiting for the worker.
    ///
    /// Sets: `timeout_ms`
    InitTimedOut,

    /// Worker finished init after the caller gave up; session torn down.
    InitAborted,

    // === Executor events ===
    /// A scheduled closure panicked; the executor keeps running.
    ///
    /// Sets: `reason` (panic payload)
    TaskPanicked,

    /// A closure was submitted after stop and dropped without running.
    TaskDropped,

    /// Closures still queued at stop time were discarded.
    ///
    /// Sets: `count`
    JobsDiscarded,

    /// The worker loop exited.
    ExecutorStopped,

    // === Pump events ===
    /// `quit()` was called; the custom token is being injected.
    QuitRequested,

    /// An OS termination signal was observed on the worker.
    SignalReceived,

    /// A window close request was honoured.
    ///
    /// Sets: `window`, `reason` (window title, if known)
    WindowClosed,

    /// The event pump exited.
    ///
    /// Sets: `reason` (`quit-token`, `terminate`, `not-running`)
    PumpStopped,

    /// The event pump panicked; the session is stopping.
    ///
    /// Sets: `reason`
    PumpPanicked,

    /// The periodic task fired.
    ///
    /// Sets: `tick` (1-based), `thread`
    PeriodicTick,

    /// The subsystem was torn down (`Subsystem::quit`).
    SubsystemQuit,

    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets: `reason` (`subscriber=<name> info=<panic>`)
    SubscriberPanicked,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Human-readable reason (errors, panic payloads, titles).
    pub reason: Option<Arc<str>>,
    /// Window the event refers to.
    pub window: Option<WindowId>,
    /// Name of the thread that produced the event.
    pub thread: Option<Arc<str>>,
    /// Timeout in milliseconds (compact).
    pub timeout_ms: Option<u32>,
    /// Periodic tick counter (starting from 1).
    pub tick: Option<u64>,
    /// Number of affected items.
    pub count: Option<usize>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            reason: None,
            window: None,
            thread: None,
            timeout_ms: None,
            tick: None,
            count: None,
        }
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a window id.
    #[inline]
    pub fn with_window(mut self, window: WindowId) -> Self {
        self.window = Some(window);
        self
    }

    /// Attaches the name of the current thread.
    #[inline]
    pub fn with_current_thread(mut self) -> Self {
        let current = std::thread::current();
        self.thread = Some(current.name().unwrap_or("unnamed").into());
        self
    }

    /// Attaches a timeout duration (stored as milliseconds).
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.timeout_ms = Some(ms);
        self
    }

    /// Attaches a periodic tick counter.
    #[inline]
    pub fn with_tick(mut self, tick: u64) -> Self {
        self.tick = Some(tick);
        self
    }

    /// Attaches an item count.
    #[inline]
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_reason(format!("subscriber={subscriber} info={info}"))
    }

    /// True for `SubscriberPanicked`; the bus never re-reports panics raised
    /// while delivering such an event.
    #[inline]
    pub fn is_subscriber_panic(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberPanicked)
    }
}
