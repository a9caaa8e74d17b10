//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to runtime events emitted by the façade, the serialized
//! executor, the event pump and the periodic task.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] broadcast channel plus synchronous subscriber fan-out
//!
//! ## Quick reference
//! - **Publishers**: `UiMain` (caller thread), `SerializedExecutor`, the event
//!   pump and periodic task (worker thread), the bus itself (subscriber panics).
//! - **Consumers**: `UiMain::subscribe()` receivers and the `SubscriberSet`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
