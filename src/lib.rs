//! # uistrand
//!
//! **uistrand** confines a single-threaded subsystem (typically a windowing
//! toolkit) to one dedicated worker thread, and lets any other thread hand
//! it work without ever touching it directly.
//!
//! Every piece of work runs inside one serialization domain: scheduled
//! closures, the event pump and the periodic task interleave cooperatively on
//! the worker but never run in parallel with each other.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │ caller thr.  │   │ caller thr.  │   │  OS signal   │
//!     │ initialize() │   │schedule_task │   │  (optional)  │
//!     │   quit()     │   │   quit()     │   │              │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  │
//! ┌───────────────────────────────────────────┐    │
//! │  UiMain (façade)                          │    │
//! │  - Shared: running flag, InitGate, Bus    │    │
//! │  - SerializedExecutor (unbounded FIFO)    │    │
//! └──────────────────────┬────────────────────┘    │
//!                        ▼                         ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  worker thread "ui-main": current_thread runtime + LocalSet       │
//! │                                                                   │
//! │   job loop ──► closure(&mut S)     one at a time, FIFO            │
//! │   pump     ──► drain events, sleep(poll_interval)                 │
//! │   periodic ──► tick every `periodic`, additive rearm              │
//! │                                                                   │
//! │   UiContext { RefCell<S>, quit token, teardown-once }             │
//! └──────────────────────┬────────────────────────────────────────────┘
//!                        ▼
//!               Bus (broadcast + SubscriberSet) ──► LogWriter, custom
//! ```
//!
//! ### Lifecycle
//! ```text
//! UiMain::builder(factory).build()   worker spawned, S built on it
//!   │
//!   ├─► initialize()  ── blocks ≤ init_timeout on the InitGate
//!   │       ├─ Ok            pump + periodic running, running = true
//!   │       ├─ InitFailed    running = false, executor stopped
//!   │       └─ InitTimeout   running = false, executor stopped;
//!   │                        a late init is torn down (InitAborted)
//!   │
//!   ├─► schedule_task(|s| ...)  × N
//!   │
//!   ├─► quit() ─► custom event in the subsystem queue ─► pump observes it
//!   │                 └─► running = false, stop executor, S::quit() once
//!   │
//!   └─► join()  worker exits
//! ```
//!
//! ## Features
//! | Area              | Description                                                     | Key types / traits                    |
//! |-------------------|-----------------------------------------------------------------|---------------------------------------|
//! | **Façade**        | Initialize, schedule work, quit, join.                          | [`UiMain`], [`UiMainBuilder`]         |
//! | **Serialization** | One worker thread, FIFO jobs, panic isolation.                  | [`SerializedExecutor`]                |
//! | **Init handshake**| Bounded wait for worker-side init.                              | [`InitGate`], [`GateState`]           |
//! | **Subsystem**     | Contract of the confined resource, plus an in-memory impl.      | [`Subsystem`], [`HeadlessSubsystem`]  |
//! | **Subscriber API**| Hook into runtime events (logging, metrics, custom subscribers).| [`Subscribe`], [`Event`]              |
//! | **Errors**        | Typed errors for the runtime and the subsystem.                 | [`RuntimeError`], [`SubsystemError`]  |
//! | **Configuration** | Centralize runtime settings.                                    | [`Config`]                            |
//!
//! ## Optional features
//! - `logging` (default): exports the built-in [`LogWriter`] subscriber.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use uistrand::{Config, HeadlessSubsystem, UiMain};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let ui = HeadlessSubsystem::new();
//!     let os = ui.handle();
//!
//!     let cfg = Config {
//!         periodic: Duration::ZERO,
//!         ..Config::default()
//!     };
//!
//!     #[cfg(feature = "logging")]
//!     let subs: Vec<Arc<dyn uistrand::Subscribe>> = vec![Arc::new(uistrand::LogWriter)];
//!     #[cfg(not(feature = "logging"))]
//!     let subs: Vec<Arc<dyn uistrand::Subscribe>> = Vec::new();
//!
//!     let main = UiMain::builder(move || ui)
//!         .with_config(cfg)
//!         .with_subscribers(subs)
//!         .build()?;
//!     main.initialize()?;
//!
//!     for i in 0..3 {
//!         main.schedule_task(move |ui| {
//!             if ui.create_window(format!("window {i}"), 640, 480).is_err() {
//!                 eprintln!("window {i} could not be created");
//!             }
//!         });
//!     }
//!
//!     main.shutdown()?;
//!     assert_eq!(os.created_count(), 3);
//!     assert_eq!(os.quit_calls(), 1);
//!     Ok(())
//! }
//! ```
mod config;
mod core;
mod error;
mod events;
mod subscribers;
mod subsystem;

// ---- Public re-exports ----

pub use config::Config;
pub use core::{
    GateState, InitGate, Job, SerializedExecutor, TickHook, UiMain, UiMainBuilder,
};
pub use error::{RuntimeError, SubsystemError};
pub use events::{Bus, Event, EventKind};
pub use subscribers::{Subscribe, SubscriberSet};
pub use subsystem::{
    CustomEventToken, HeadlessHandle, HeadlessSubsystem, Subsystem, UiEvent, WindowId,
};

// Optional: expose the built-in logger subscriber.
// Enabled by default; opt out with `default-features = false`.
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
