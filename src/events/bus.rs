//! # Event bus for broadcasting runtime events.
//!
//! [`Bus`] combines two delivery paths:
//! - a [`tokio::sync::broadcast`] channel for programmatic observers
//!   ([`UiMain::subscribe`](crate::UiMain::subscribe)),
//! - synchronous fan-out to a [`SubscriberSet`] on the publishing thread.
//!
//! ## Architecture
//! ```text
//! Publishers (both thread roles):      Consumers:
//!   caller  (initialize/quit) ──┐
//!   worker  (executor/pump)   ──┼──► Bus ──► broadcast ──► Receiver(s)
//!   periodic task             ──┘       └──► SubscriberSet ──► LogWriter, ...
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never waits on a receiver.
//! - **Bounded capacity**: slow receivers get `RecvError::Lagged(n)` and skip `n` oldest items.
//! - **No persistence**: events are lost if there are no active receivers at send time.
//! - **Panic isolation**: a panicking subscriber produces `SubscriberPanicked`, which is
//!   never re-published for a `SubscriberPanicked` event (no feedback loop).

use std::sync::Arc;

use tokio::sync::broadcast;

use super::event::Event;
use crate::subscribers::SubscriberSet;

/// Broadcast channel plus subscriber fan-out for runtime events.
///
/// Cheap to clone (internally holds an `Arc`-backed sender and set).
#[derive(Clone)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
    subs: Arc<SubscriberSet>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity and subscribers.
    ///
    /// The minimum capacity is 1 (clamped).
    pub fn new(capacity: usize, subs: SubscriberSet) -> Self {
        let capacity = capacity.max(1);
        let (tx, _rx) = broadcast::channel::<Event>(capacity);
        Self {
            tx,
            subs: Arc::new(subs),
        }
    }

    /// Publishes an event to all receivers and subscribers.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev.clone());

        let panics = self.subs.emit(&ev);
        if ev.is_subscriber_panic() {
            return;
        }
        for (name, info) in panics {
            self.publish(Event::subscriber_panicked(name, info));
        }
    }

    /// Creates a new receiver that will observe subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

impl std::fmt::Debug for Bus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bus")
            .field("receivers", &self.tx.receiver_count())
            .field("subscribers", &self.subs.len())
            .finish()
    }
}
