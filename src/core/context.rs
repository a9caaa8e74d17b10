//! # Shared and worker-local session state.
//!
//! [`Shared`] is the only state touched by both thread roles: the `running`
//! flag (atomic), the init gate (mutex + condvar), the stop token and the bus.
//!
//! [`UiContext`] lives on the worker thread only. It owns the subsystem and
//! everything spawned around it; every subsystem call in the crate goes
//! through [`UiContext::with_subsystem`].

use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures::FutureExt;
use tokio_util::sync::CancellationToken;

use super::gate::{GateState, InitGate};
use super::{periodic, pump, shutdown};
use crate::{
    config::Config,
    error::panic_message,
    events::{Bus, Event, EventKind},
    subsystem::{CustomEventToken, Subsystem, UiEvent},
};

/// Application hook run on every periodic tick, serialized with everything else.
pub type TickHook<S> = Box<dyn FnMut(&mut S, u64) + Send + 'static>;

/// State visible to the caller and the worker.
pub(crate) struct Shared {
    pub(crate) cfg: Config,
    pub(crate) bus: Bus,
    pub(crate) gate: InitGate,
    running: AtomicBool,
    token: CancellationToken,
}

impl Shared {
    pub(crate) fn new(cfg: Config, bus: Bus, token: CancellationToken) -> Self {
        Self {
            cfg,
            bus,
            gate: InitGate::new(),
            running: AtomicBool::new(false),
            token,
        }
    }

    #[inline]
    pub(crate) fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    #[inline]
    pub(crate) fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::Release);
    }

    /// Clears `running` and stops the executor.
    pub(crate) fn stop(&self) {
        self.halt();
        self.gate.notify();
    }

    /// `stop` without waking gate waiters; safe to call under the gate lock.
    fn halt(&self) {
        self.set_running(false);
        self.token.cancel();
    }

    /// Resolves the init gate with a failed outcome and stops, as one step
    /// from the point of view of `UiMain::initialize`.
    fn fail_init(&self, outcome: GateState) {
        self.gate.resolve_with(outcome, || self.halt());
        self.stop();
    }
}

/// Worker-local session state. Never leaves the worker thread.
pub(crate) struct UiContext<S: Subsystem> {
    pub(crate) shared: Arc<Shared>,
    subsystem: RefCell<S>,
    quit_token: Cell<Option<CustomEventToken>>,
    initialized: Cell<bool>,
    torn_down: Cell<bool>,
    on_tick: RefCell<Option<TickHook<S>>>,
}

impl<S: Subsystem> UiContext<S> {
    pub(crate) fn new(
        shared: Arc<Shared>,
        subsystem: S,
        on_tick: Option<TickHook<S>>,
    ) -> Self {
        Self {
            shared,
            subsystem: RefCell::new(subsystem),
            quit_token: Cell::new(None),
            initialized: Cell::new(false),
            torn_down: Cell::new(false),
            on_tick: RefCell::new(on_tick),
        }
    }

    /// Runs `f` with exclusive access to the subsystem.
    ///
    /// Never called across an `.await`, so borrows cannot overlap.
    pub(crate) fn with_subsystem<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        f(&mut self.subsystem.borrow_mut())
    }

    /// Token registered at init; `None` until init succeeded.
    pub(crate) fn quit_token(&self) -> Option<CustomEventToken> {
        self.quit_token.get()
    }

    /// Worker side of `UiMain::initialize`.
    ///
    /// Ends by resolving the gate exactly once. On failure (or when the caller
    /// already gave up) `running` is cleared and the executor stopped under
    /// the gate lock, together with the outcome: the caller never observes a
    /// stopped session with a pending gate, and anything scheduled afterwards
    /// is dropped.
    pub(crate) fn initialize(self: &Rc<Self>) {
        let shared = &self.shared;
        let registered = self.with_subsystem(|s| s.init()).and_then(|()| {
            self.initialized.set(true);
            self.with_subsystem(|s| s.register_custom_event())
        });

        let token = match registered {
            Ok(token) => token,
            Err(e) => {
                let reason = e.to_string();
                self.teardown();
                shared.fail_init(GateState::Failed(reason.clone()));
                shared
                    .bus
                    .publish(Event::new(EventKind::InitFailed).with_reason(reason));
                return;
            }
        };

        if !shared.is_running() {
            self.teardown();
            shared.fail_init(GateState::Aborted);
            shared.bus.publish(Event::new(EventKind::InitAborted));
            return;
        }

        self.quit_token.set(Some(token));
        self.spawn_pump();
        if let Some(period) = shared.cfg.periodic_period() {
            self.spawn_periodic(period);
        }
        if shared.cfg.quit_on_signal {
            self.spawn_signal_listener();
        }

        shared
            .bus
            .publish(Event::new(EventKind::InitSucceeded).with_current_thread());
        shared.gate.resolve(GateState::Ready);
    }

    /// Worker side of `UiMain::quit`: route the stop request through the event queue.
    pub(crate) fn push_quit(&self) {
        let Some(token) = self.quit_token() else {
            // Nothing polls the queue before init succeeded.
            self.shared.stop();
            return;
        };
        if let Err(e) = self.with_subsystem(|s| s.push_event(UiEvent::Custom(token))) {
            tracing::warn!(error = %e, "could not push quit event; stopping directly");
            self.shared.stop();
        }
    }

    /// Tears the subsystem down once, if it was initialized.
    pub(crate) fn teardown(&self) {
        if !self.initialized.get() || self.torn_down.replace(true) {
            return;
        }
        self.with_subsystem(|s| s.quit());
        self.shared.bus.publish(Event::new(EventKind::SubsystemQuit));
    }

    fn spawn_pump(self: &Rc<Self>) {
        let ctx = Rc::clone(self);
        let interval = self.shared.cfg.poll_interval_clamped();
        tokio::task::spawn_local(async move {
            let shared = Arc::clone(&ctx.shared);
            let res = AssertUnwindSafe(pump::run(ctx, interval))
                .catch_unwind()
                .await;
            if let Err(payload) = res {
                shared.stop();
                shared.bus.publish(
                    Event::new(EventKind::PumpPanicked).with_reason(panic_message(&*payload)),
                );
            }
        });
    }

    fn spawn_periodic(self: &Rc<Self>, period: Duration) {
        let ctx = Rc::clone(self);
        tokio::task::spawn_local(async move {
            periodic::run_periodic(
                period,
                || ctx.shared.is_running(),
                |tick| ctx.on_periodic(tick),
            )
            .await;
        });
    }

    fn spawn_signal_listener(self: &Rc<Self>) {
        let ctx = Rc::clone(self);
        tokio::task::spawn_local(async move {
            match shutdown::wait_for_shutdown_signal().await {
                Ok(()) => ctx.on_shutdown_signal(),
                Err(e) => tracing::warn!(error = %e, "signal registration failed"),
            }
        });
    }

    /// Routes an OS termination signal through the subsystem queue as a
    /// native `Quit`, so the pump handles it like any terminate event.
    pub(crate) fn on_shutdown_signal(&self) {
        self.shared.bus.publish(Event::new(EventKind::SignalReceived));
        if !self.shared.is_running() {
            return;
        }
        if let Err(e) = self.with_subsystem(|s| s.push_event(UiEvent::Quit)) {
            tracing::warn!(error = %e, "could not push terminate event; stopping directly");
            self.shared.stop();
        }
    }

    fn on_periodic(&self, tick: u64) {
        self.shared.bus.publish(
            Event::new(EventKind::PeriodicTick)
                .with_tick(tick)
                .with_current_thread(),
        );
        let mut slot = self.on_tick.borrow_mut();
        let Some(hook) = slot.as_mut() else {
            return;
        };
        let res = panic::catch_unwind(AssertUnwindSafe(|| {
            self.with_subsystem(|s| hook(s, tick));
        }));
        if let Err(payload) = res {
            self.shared
                .bus
                .publish(Event::new(EventKind::TaskPanicked).with_reason(panic_message(&*payload)));
        }
    }
}

impl<S: Subsystem> Drop for UiContext<S> {
    fn drop(&mut self) {
        self.teardown();
    }
}
