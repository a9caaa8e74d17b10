//! # Thread-confined subsystem contract.
//!
//! A [`Subsystem`] is the single-threaded resource being wrapped (a windowing
//! toolkit, typically). Its methods are only ever called on the worker thread,
//! from inside the serialized domain; implementations therefore need not be
//! `Send` or `Sync`. The runtime builds the value on the worker thread from a
//! `FnOnce() -> S + Send` factory and never moves it out.
//!
//! [`HeadlessSubsystem`] is an in-memory implementation for tests, demos and
//! environments without a display.

mod headless;

pub use headless::{HeadlessHandle, HeadlessSubsystem};

use crate::error::SubsystemError;

/// Stable identifier of a window owned by the subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(pub u32);

impl std::fmt::Display for WindowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Event type registered with the subsystem for application use.
///
/// The runtime registers exactly one at init time and uses it as its
/// "please stop" signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CustomEventToken(pub u32);

/// Event polled from (or pushed into) the subsystem queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// Application-wide terminate request (last window closed, OS quit, ...).
    Quit,
    /// The user asked to close one window.
    WindowCloseRequested(WindowId),
    /// Event of a registered custom type.
    Custom(CustomEventToken),
    /// Any other event, identified by its raw type.
    Other(u32),
}

/// Operations the runtime needs from the wrapped subsystem.
pub trait Subsystem: 'static {
    /// Initializes the subsystem. Called once, on the worker thread.
    fn init(&mut self) -> Result<(), SubsystemError>;

    /// Registers a new custom event type.
    fn register_custom_event(&mut self) -> Result<CustomEventToken, SubsystemError>;

    /// Pops the next pending event, if any. Must not block.
    fn poll_event(&mut self) -> Option<UiEvent>;

    /// Appends an event to the subsystem's own queue.
    fn push_event(&mut self, event: UiEvent) -> Result<(), SubsystemError>;

    /// Destroys one window; the rest of the subsystem stays up.
    fn destroy_window(&mut self, window: WindowId);

    /// Tears the subsystem down. Called at most once by the runtime.
    fn quit(&mut self);

    /// Title of a live window, for diagnostics.
    fn window_title(&self, _window: WindowId) -> Option<String> {
        None
    }
}
