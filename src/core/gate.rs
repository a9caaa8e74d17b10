//! # One-shot startup gate.
//!
//! [`InitGate`] lets the caller thread block until the worker has either
//! finished subsystem setup or failed, bounded by a timeout.
//!
//! ## State machine
//! ```text
//!             resolve(Ready)
//!   Pending ─────────────────► Ready      (terminal)
//!      │      resolve(Failed)
//!      ├─────────────────────► Failed     (terminal)
//!      │      resolve(Aborted)
//!      └─────────────────────► Aborted    (terminal)
//!
//!   TimedOut is observed by the waiter only; the gate itself stays Pending.
//! ```
//!
//! ## Rules
//! - The first `resolve` wins; later calls are ignored.
//! - State the waiter's predicate depends on is changed inside
//!   `resolve_with`, under the same lock the predicate is evaluated with.
//! - `await_or_timeout` re-checks its predicate on every wake-up (spurious
//!   wake-ups are harmless).

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Observable state of an [`InitGate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateState {
    /// Worker has not reported yet.
    Pending,
    /// Subsystem initialized; background tasks are running.
    Ready,
    /// Initialization failed.
    Failed(String),
    /// Initialization finished after the session was already stopped.
    Aborted,
}

impl GateState {
    /// True for every state but `Pending`.
    #[inline]
    pub fn is_resolved(&self) -> bool {
        !matches!(self, GateState::Pending)
    }
}

/// Mutex + condition variable barrier resolved exactly once.
#[derive(Debug)]
pub struct InitGate {
    state: Mutex<GateState>,
    cv: Condvar,
}

impl Default for InitGate {
    fn default() -> Self {
        Self::new()
    }
}

impl InitGate {
    /// Creates a pending gate.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(GateState::Pending),
            cv: Condvar::new(),
        }
    }

    /// Resolves the gate and wakes all waiters.
    ///
    /// Returns `false` if the gate was already resolved (the new state is dropped).
    pub fn resolve(&self, outcome: GateState) -> bool {
        self.resolve_with(outcome, || {})
    }

    /// Resolves the gate, running `under_lock` first while the gate lock is held.
    ///
    /// A waiter whose predicate also reads outside state (a running flag
    /// cleared by `under_lock`) sees both changes together, never the flag
    /// without the outcome. `under_lock` is skipped when the gate is already
    /// resolved and must not touch the gate itself.
    pub fn resolve_with<F>(&self, outcome: GateState, under_lock: F) -> bool
    where
        F: FnOnce(),
    {
        let mut state = self.lock();
        if state.is_resolved() || !outcome.is_resolved() {
            return false;
        }
        under_lock();
        *state = outcome;
        drop(state);
        self.cv.notify_all();
        true
    }

    /// Blocks until `done(&state)` holds or `timeout` elapses.
    ///
    /// Returns whether the predicate became true.
    pub fn await_or_timeout<P>(&self, timeout: Duration, mut done: P) -> bool
    where
        P: FnMut(&GateState) -> bool,
    {
        let guard = self.lock();
        let (guard, _res) = self
            .cv
            .wait_timeout_while(guard, timeout, |state| !done(state))
            .unwrap_or_else(PoisonError::into_inner);
        done(&guard)
    }

    /// Current state snapshot.
    pub fn state(&self) -> GateState {
        self.lock().clone()
    }

    /// Wakes waiters so they re-check predicates that depend on outside state.
    pub fn notify(&self) {
        let _guard = self.lock();
        self.cv.notify_all();
    }

    fn lock(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
