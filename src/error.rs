//! Error types used by the uistrand runtime and subsystems.
//!
//! This module defines two main error enums:
//!
//! - [`RuntimeError`]: errors raised by the runtime itself (worker startup, init gate).
//! - [`SubsystemError`]: errors reported by a [`Subsystem`](crate::Subsystem) implementation.
//!
//! Both types provide `as_label` for logging. Task failures never surface here:
//! a panicking scheduled closure is caught on the worker and reported as
//! [`EventKind::TaskPanicked`](crate::EventKind::TaskPanicked).

use std::any::Any;
use std::time::Duration;
use thiserror::Error;

/// # Errors produced by the uistrand runtime.
///
/// Only [`UiMain::initialize`](crate::UiMain::initialize) and the worker
/// lifecycle calls report these; scheduling is fire-and-forget.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// The single-threaded tokio runtime for the worker could not be built.
    #[error("failed to build worker runtime: {0}")]
    Runtime(#[source] std::io::Error),

    /// The worker thread could not be spawned.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[source] std::io::Error),

    /// The subsystem reported an initialization failure.
    #[error("subsystem initialization failed: {reason}")]
    InitFailed {
        /// Failure reported by the subsystem.
        reason: String,
    },

    /// The worker did not finish subsystem initialization in time.
    #[error("subsystem initialization timed out after {timeout:?}")]
    InitTimeout {
        /// The configured init timeout.
        timeout: Duration,
    },

    /// The session was stopped while initialization was still pending.
    #[error("initialization aborted before completion")]
    InitAborted,

    /// `initialize()` was called more than once.
    #[error("initialize() called more than once")]
    AlreadyInitialized,

    /// `initialize()` was called from the worker thread, which would block the gate forever.
    #[error("initialize() must not be called from the worker thread")]
    CalledFromWorker,

    /// The executor is stopped; the request could not be queued.
    #[error("executor already stopped")]
    ExecutorStopped,

    /// The worker thread panicked outside of a scheduled closure.
    #[error("worker thread panicked: {reason}")]
    WorkerPanicked {
        /// Panic payload rendered as text.
        reason: String,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    /// use uistrand::RuntimeError;
    ///
    /// let err = RuntimeError::InitTimeout { timeout: Duration::from_secs(5) };
    /// assert_eq!(err.as_label(), "runtime_init_timeout");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::Runtime(_) => "runtime_build_failed",
            RuntimeError::Spawn(_) => "runtime_spawn_failed",
            RuntimeError::InitFailed { .. } => "runtime_init_failed",
            RuntimeError::InitTimeout { .. } => "runtime_init_timeout",
            RuntimeError::InitAborted => "runtime_init_aborted",
            RuntimeError::AlreadyInitialized => "runtime_already_initialized",
            RuntimeError::CalledFromWorker => "runtime_called_from_worker",
            RuntimeError::ExecutorStopped => "runtime_executor_stopped",
            RuntimeError::WorkerPanicked { .. } => "runtime_worker_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::InitFailed { reason } => format!("init failed: {reason}"),
            RuntimeError::InitTimeout { timeout } => format!("init timed out after {timeout:?}"),
            RuntimeError::WorkerPanicked { reason } => format!("worker panicked: {reason}"),
            other => other.to_string(),
        }
    }

    /// Indicates whether the error means the subsystem never became usable.
    pub fn is_init_error(&self) -> bool {
        matches!(
            self,
            RuntimeError::InitFailed { .. }
                | RuntimeError::InitTimeout { .. }
                | RuntimeError::InitAborted
        )
    }
}

/// # Errors reported by a subsystem implementation.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubsystemError {
    /// The subsystem could not be initialized.
    #[error("init failed: {reason}")]
    Init {
        /// Backend-specific reason.
        reason: String,
    },

    /// A custom event type could not be registered.
    #[error("custom event registration failed: {reason}")]
    Register {
        /// Backend-specific reason.
        reason: String,
    },

    /// An event could not be pushed into the subsystem queue.
    #[error("event push failed: {reason}")]
    Push {
        /// Backend-specific reason.
        reason: String,
    },

    /// A window could not be created.
    #[error("window creation failed: {reason}")]
    CreateWindow {
        /// Backend-specific reason.
        reason: String,
    },
}

impl SubsystemError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            SubsystemError::Init { .. } => "subsystem_init",
            SubsystemError::Register { .. } => "subsystem_register",
            SubsystemError::Push { .. } => "subsystem_push",
            SubsystemError::CreateWindow { .. } => "subsystem_create_window",
        }
    }
}

/// Renders a panic payload as text.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
