//! # Event fan-out to multiple subscribers.
//!
//! Provides [`SubscriberSet`], which delivers each event to every subscriber in
//! registration order, isolating panics.
//!
//! ## Rules
//! - **Per-subscriber FIFO**: each subscriber sees events in publish order per thread
//! - **Isolation**: a panicking subscriber doesn't prevent delivery to the others
//! - **Reporting**: panics are returned to the [`Bus`](crate::Bus), which turns them
//!   into `SubscriberPanicked` events
//!
//! **Warning**: `AssertUnwindSafe` is used, which can leave shared state inconsistent
//! if a subscriber uses `Arc<Mutex<T>>` and panics while holding the lock.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::error::panic_message;
use crate::events::Event;
use crate::subscribers::Subscribe;

/// Fan-out coordinator for multiple event subscribers.
#[derive(Default)]
pub struct SubscriberSet {
    subs: Vec<Arc<dyn Subscribe>>,
}

impl SubscriberSet {
    /// Creates a set over the given subscribers.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>) -> Self {
        Self { subs }
    }

    /// Creates a set without subscribers.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of registered subscribers.
    pub fn len(&self) -> usize {
        self.subs.len()
    }

    /// Returns true when no subscriber is registered.
    pub fn is_empty(&self) -> bool {
        self.subs.is_empty()
    }

    /// Delivers `event` to all subscribers.
    ///
    /// Returns `(subscriber name, panic info)` for every subscriber that panicked.
    pub fn emit(&self, event: &Event) -> Vec<(&'static str, String)> {
        let mut panics = Vec::new();
        for sub in &self.subs {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| sub.on_event(event))) {
                panics.push((sub.name(), panic_message(&*payload)));
            }
        }
        panics
    }
}
