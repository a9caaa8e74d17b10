//! Runtime core: worker thread, serialization and lifecycle.
//!
//! The public entry point is [`UiMain`], which confines a [`Subsystem`] to one
//! worker thread and exposes `initialize`, `schedule_task` and `quit`.
//!
//! Internal modules:
//! - [`executor`]: the worker thread and its FIFO serialization domain;
//! - [`gate`]: init handshake between caller and worker (mutex + condvar);
//! - [`context`]: shared flags and the worker-local session state;
//! - [`pump`]: subsystem event polling loop;
//! - [`periodic`]: drift-free recurring timer;
//! - [`shutdown`]: cross-platform shutdown signal handling;
//! - [`ui_main`], [`builder`]: the façade.
//!
//! [`Subsystem`]: crate::Subsystem

mod builder;
mod context;
mod executor;
mod gate;
mod periodic;
mod pump;
mod shutdown;
mod ui_main;

pub use builder::UiMainBuilder;
pub use context::TickHook;
pub use executor::{Job, SerializedExecutor};
pub use gate::{GateState, InitGate};
pub use ui_main::UiMain;
