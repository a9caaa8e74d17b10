//! # Core subscriber trait
//!
//! `Subscribe` is the extension point for plugging custom event handlers into the
//! runtime. Subscribers are called synchronously on the thread that published
//! the event: the caller thread for init/quit events, the worker thread for
//! everything the executor, pump and periodic task report.
//!
//! ## Contract
//! - Implementations must be quick: a slow subscriber delays the worker's
//!   serialized work. Offload heavy processing to a channel of your own.
//! - Panics are caught and reported as
//!   [`EventKind::SubscriberPanicked`](crate::EventKind::SubscriberPanicked).
//!
//! ## Example
//! ```rust
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use uistrand::{Event, EventKind, Subscribe};
//!
//! #[derive(Default)]
//! struct ClosedWindows(AtomicUsize);
//!
//! impl Subscribe for ClosedWindows {
//!     fn on_event(&self, ev: &Event) {
//!         if ev.kind == EventKind::WindowClosed {
//!             self.0.fetch_add(1, Ordering::Relaxed);
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "closed-windows" }
//! }
//! ```

use crate::events::Event;

/// Contract for event subscribers.
pub trait Subscribe: Send + Sync + 'static {
    /// Handle a single event for this subscriber.
    fn on_event(&self, event: &Event);

    /// Human-readable name (for logs/metrics).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
