//! # In-memory subsystem without a display.
//!
//! [`HeadlessSubsystem`] behaves like a minimal windowing toolkit: it owns
//! windows keyed by a stable [`WindowId`], keeps an event queue, and hands out
//! custom event types starting at `0x8000`. It also checks its own thread
//! confinement: once initialized, every call made from another thread is
//! counted and visible through [`HeadlessHandle::foreign_thread_calls`].
//!
//! [`HeadlessHandle`] plays the role of the operating system: it can be used
//! from any thread to inject events (close requests, quit) and to inspect state.
//!
//! ## Example
//! ```rust
//! use uistrand::{HeadlessSubsystem, Subsystem, UiEvent};
//!
//! let mut ui = HeadlessSubsystem::new();
//! let os = ui.handle();
//! ui.init().unwrap();
//!
//! let id = ui.create_window("main", 640, 480).unwrap();
//! os.request_close(id);
//! assert_eq!(ui.poll_event(), Some(UiEvent::WindowCloseRequested(id)));
//! ```

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};
use std::time::Duration;

use super::{CustomEventToken, Subsystem, UiEvent, WindowId};
use crate::error::SubsystemError;

/// First id handed out by `register_custom_event`.
const FIRST_CUSTOM_EVENT: u32 = 0x8000;

#[derive(Debug, Clone)]
struct HeadlessWindow {
    title: String,
    width: u32,
    height: u32,
}

#[derive(Debug, Default)]
struct HeadlessState {
    queue: VecDeque<UiEvent>,
    windows: BTreeMap<WindowId, HeadlessWindow>,
    next_window: u32,
    next_event_type: u32,
    owner: Option<ThreadId>,
    initialized: bool,
    created: usize,
    destroyed: Vec<WindowId>,
    quit_calls: usize,
    polls: u64,
    foreign_calls: usize,
}

fn lock(state: &Mutex<HeadlessState>) -> MutexGuard<'_, HeadlessState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-memory [`Subsystem`] implementation.
#[derive(Debug)]
pub struct HeadlessSubsystem {
    state: Arc<Mutex<HeadlessState>>,
    init_delay: Duration,
    init_failure: Option<String>,
    max_windows: Option<usize>,
}

impl Default for HeadlessSubsystem {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessSubsystem {
    /// Creates a subsystem that initializes immediately and successfully.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(HeadlessState::default())),
            init_delay: Duration::ZERO,
            init_failure: None,
            max_windows: None,
        }
    }

    /// Makes `init` block the calling thread for `delay` first.
    pub fn with_init_delay(mut self, delay: Duration) -> Self {
        self.init_delay = delay;
        self
    }

    /// Makes `init` fail with `reason`.
    pub fn fail_init(mut self, reason: impl Into<String>) -> Self {
        self.init_failure = Some(reason.into());
        self
    }

    /// Makes `create_window` fail once `max` windows are alive.
    pub fn with_max_windows(mut self, max: usize) -> Self {
        self.max_windows = Some(max);
        self
    }

    /// Returns a thread-safe handle for event injection and inspection.
    pub fn handle(&self) -> HeadlessHandle {
        HeadlessHandle {
            state: Arc::clone(&self.state),
        }
    }

    /// Creates a window and returns its id.
    pub fn create_window(
        &mut self,
        title: impl Into<String>,
        width: u32,
        height: u32,
    ) -> Result<WindowId, SubsystemError> {
        let mut st = self.enter();
        if !st.initialized {
            return Err(SubsystemError::CreateWindow {
                reason: "video subsystem not initialized".into(),
            });
        }
        if let Some(max) = self.max_windows.filter(|max| st.windows.len() >= *max) {
            return Err(SubsystemError::CreateWindow {
                reason: format!("window limit of {max} reached"),
            });
        }
        st.next_window += 1;
        let id = WindowId(st.next_window);
        st.windows.insert(
            id,
            HeadlessWindow {
                title: title.into(),
                width,
                height,
            },
        );
        st.created += 1;
        Ok(id)
    }

    /// Size of a live window.
    pub fn window_size(&self, window: WindowId) -> Option<(u32, u32)> {
        let st = self.enter();
        st.windows.get(&window).map(|w| (w.width, w.height))
    }

    /// Locks the state, recording the call if it comes from a foreign thread.
    fn enter(&self) -> MutexGuard<'_, HeadlessState> {
        let mut st = lock(&self.state);
        if st.owner.is_some_and(|owner| owner != thread::current().id()) {
            st.foreign_calls += 1;
        }
        st
    }
}

impl Subsystem for HeadlessSubsystem {
    fn init(&mut self) -> Result<(), SubsystemError> {
        if !self.init_delay.is_zero() {
            thread::sleep(self.init_delay);
        }
        let mut st = lock(&self.state);
        st.owner = Some(thread::current().id());
        if let Some(reason) = &self.init_failure {
            return Err(SubsystemError::Init {
                reason: reason.clone(),
            });
        }
        st.initialized = true;
        Ok(())
    }

    fn register_custom_event(&mut self) -> Result<CustomEventToken, SubsystemError> {
        let mut st = self.enter();
        if !st.initialized {
            return Err(SubsystemError::Register {
                reason: "subsystem not initialized".into(),
            });
        }
        let token = CustomEventToken(FIRST_CUSTOM_EVENT + st.next_event_type);
        st.next_event_type += 1;
        Ok(token)
    }

    fn poll_event(&mut self) -> Option<UiEvent> {
        let mut st = self.enter();
        st.polls += 1;
        if !st.initialized {
            return None;
        }
        st.queue.pop_front()
    }

    fn push_event(&mut self, event: UiEvent) -> Result<(), SubsystemError> {
        let mut st = self.enter();
        if !st.initialized {
            return Err(SubsystemError::Push {
                reason: "subsystem not initialized".into(),
            });
        }
        st.queue.push_back(event);
        Ok(())
    }

    fn destroy_window(&mut self, window: WindowId) {
        let mut st = self.enter();
        if st.windows.remove(&window).is_some() {
            st.destroyed.push(window);
        }
    }

    fn quit(&mut self) {
        let mut st = self.enter();
        st.quit_calls += 1;
        st.initialized = false;
        st.windows.clear();
        st.queue.clear();
    }

    fn window_title(&self, window: WindowId) -> Option<String> {
        let st = self.enter();
        st.windows.get(&window).map(|w| w.title.clone())
    }
}

/// Thread-safe view of a [`HeadlessSubsystem`].
///
/// Stands in for the operating system: event injection here is not a
/// subsystem API call and is never counted as a foreign-thread call.
#[derive(Debug, Clone)]
pub struct HeadlessHandle {
    state: Arc<Mutex<HeadlessState>>,
}

impl HeadlessHandle {
    /// Appends an event as if the OS had delivered it.
    pub fn push_os_event(&self, event: UiEvent) {
        lock(&self.state).queue.push_back(event);
    }

    /// Simulates the user clicking a window's close button.
    pub fn request_close(&self, window: WindowId) {
        self.push_os_event(UiEvent::WindowCloseRequested(window));
    }

    /// Simulates an application-level terminate request.
    pub fn request_quit(&self) {
        self.push_os_event(UiEvent::Quit);
    }

    /// Ids of live windows, ascending.
    pub fn windows(&self) -> Vec<WindowId> {
        lock(&self.state).windows.keys().copied().collect()
    }

    /// Title of a live window.
    pub fn title(&self, window: WindowId) -> Option<String> {
        lock(&self.state)
            .windows
            .get(&window)
            .map(|w| w.title.clone())
    }

    /// Total number of windows ever created.
    pub fn created_count(&self) -> usize {
        lock(&self.state).created
    }

    /// Windows destroyed through `destroy_window`, in order.
    pub fn destroyed(&self) -> Vec<WindowId> {
        lock(&self.state).destroyed.clone()
    }

    /// Number of `quit` calls.
    pub fn quit_calls(&self) -> usize {
        lock(&self.state).quit_calls
    }

    /// Number of `poll_event` calls.
    pub fn polls(&self) -> u64 {
        lock(&self.state).polls
    }

    /// Events not yet polled.
    pub fn pending_events(&self) -> usize {
        lock(&self.state).queue.len()
    }

    /// Whether `init` succeeded and `quit` has not run since.
    pub fn is_initialized(&self) -> bool {
        lock(&self.state).initialized
    }

    /// Subsystem calls made from a thread other than the initializing one.
    pub fn foreign_thread_calls(&self) -> usize {
        lock(&self.state).foreign_calls
    }
}
