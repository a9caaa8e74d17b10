//! # Runtime configuration.
//!
//! Provides [`Config`] centralized settings for a [`UiMain`](crate::UiMain).
//!
//! ## Sentinel values
//! - `periodic = 0s` → no periodic task is spawned
//! - `poll_interval = 0s` → clamped to 1ms (the event pump never busy-loops)
//! - `bus_capacity = 0` → clamped to 1

use std::time::Duration;

/// Configuration for the worker thread and its background tasks.
///
/// ## Field semantics
/// - `init_timeout`: how long `initialize()` blocks waiting for the worker
/// - `poll_interval`: event pump suspension between drains
/// - `periodic`: period of the recurring background task (`0s` = disabled)
/// - `bus_capacity`: event bus ring buffer size (min 1)
/// - `thread_name`: name of the worker thread
/// - `quit_on_signal`: translate SIGINT/SIGTERM/SIGQUIT into a subsystem quit event
#[derive(Clone, Debug)]
pub struct Config {
    /// Maximum time `initialize()` waits for the worker to finish subsystem setup.
    ///
    /// On expiry the caller forces `running = false`; the worker may still be
    /// inside `Subsystem::init` and will abort the session once it returns.
    pub init_timeout: Duration,

    /// Sleep between two event-pump drains.
    ///
    /// Other serialized work (scheduled tasks, periodic ticks) runs during
    /// this window.
    pub poll_interval: Duration,

    /// Period of the recurring background task.
    ///
    /// Deadlines are rearmed additively (`previous deadline + period`), so the
    /// duration of the tick action does not accumulate as drift.
    pub periodic: Duration,

    /// Capacity of the event bus broadcast channel ring buffer.
    pub bus_capacity: usize,

    /// Name given to the worker thread.
    pub thread_name: String,

    /// Whether OS termination signals stop the session.
    ///
    /// The signal is turned into a `UiEvent::Quit` pushed on the worker, so it
    /// goes through the event pump like a native terminate event.
    pub quit_on_signal: bool,
}

impl Config {
    /// Returns the periodic task period as an `Option`.
    ///
    /// - `None` → periodic task disabled
    /// - `Some(d)` → fires every `d`
    #[inline]
    pub fn periodic_period(&self) -> Option<Duration> {
        if self.periodic == Duration::ZERO {
            None
        } else {
            Some(self.periodic)
        }
    }

    /// Returns the pump sleep interval clamped to a minimum of 1ms.
    #[inline]
    pub fn poll_interval_clamped(&self) -> Duration {
        self.poll_interval.max(Duration::from_millis(1))
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `init_timeout = 5s`
    /// - `poll_interval = 10ms`
    /// - `periodic = 2s`
    /// - `bus_capacity = 1024`
    /// - `thread_name = "ui-main"`
    /// - `quit_on_signal = false`
    fn default() -> Self {
        Self {
            init_timeout: Duration::from_secs(5),
            poll_interval: Duration::from_millis(10),
            periodic: Duration::from_secs(2),
            bus_capacity: 1024,
            thread_name: "ui-main".to_string(),
            quit_on_signal: false,
        }
    }
}
