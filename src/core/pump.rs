//! # Event pump: the long-running poll loop on the worker.
//!
//! ```text
//! Starting ──► Polling ──(queue empty)──► Idle-Wait(poll_interval) ──► Polling ...
//!                 │
//!                 ├─ Custom(quit token) ─┐
//!                 ├─ Quit (terminate)  ──┼──► running=false, stop executor ──► Stopped
//!                 ├─ WindowCloseRequested(id) → destroy that window, keep draining
//!                 └─ anything else → ignored
//!
//! Stopped: subsystem teardown (exactly once)
//! ```
//!
//! Each wake drains the whole queue, then sleeps; the sleep is where
//! scheduled tasks and periodic ticks get the worker.

use std::rc::Rc;
use std::time::Duration;

use tokio::time;

use super::context::UiContext;
use crate::{
    events::{Event, EventKind},
    subsystem::{Subsystem, UiEvent},
};

/// Why the pump stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PumpExit {
    /// Our own custom token was polled (`UiMain::quit`).
    QuitRequested,
    /// The subsystem reported an application-level terminate event.
    Terminated,
    /// `running` was cleared by someone else.
    NotRunning,
}

impl PumpExit {
    fn as_label(self) -> &'static str {
        match self {
            PumpExit::QuitRequested => "quit-token",
            PumpExit::Terminated => "terminate",
            PumpExit::NotRunning => "not-running",
        }
    }
}

/// Polls until a stop condition, then tears the subsystem down.
pub(crate) async fn run<S: Subsystem>(ctx: Rc<UiContext<S>>, interval: Duration) -> PumpExit {
    let exit = loop {
        if !ctx.shared.is_running() {
            break PumpExit::NotRunning;
        }
        if let Some(exit) = drain(&ctx) {
            break exit;
        }
        time::sleep(interval).await;
    };

    ctx.shared.stop();
    ctx.shared
        .bus
        .publish(Event::new(EventKind::PumpStopped).with_reason(exit.as_label()));
    ctx.teardown();
    exit
}

/// Drains every pending event. Returns `Some` as soon as a stop event is seen;
/// events queued behind it are left unpolled.
pub(crate) fn drain<S: Subsystem>(ctx: &UiContext<S>) -> Option<PumpExit> {
    let quit = ctx.quit_token();
    ctx.with_subsystem(|sub| {
        while let Some(event) = sub.poll_event() {
            match event {
                UiEvent::Custom(token) if Some(token) == quit => {
                    return Some(PumpExit::QuitRequested);
                }
                UiEvent::Quit => return Some(PumpExit::Terminated),
                UiEvent::WindowCloseRequested(window) => {
                    let title = sub.window_title(window).unwrap_or_default();
                    sub.destroy_window(window);
                    ctx.shared.bus.publish(
                        Event::new(EventKind::WindowClosed)
                            .with_window(window)
                            .with_reason(title),
                    );
                }
                other => tracing::trace!(?other, "ignoring subsystem event"),
            }
        }
        None
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::core::context::Shared;
    use crate::core::gate::GateState;
    use crate::events::Bus;
    use crate::subscribers::SubscriberSet;
    use crate::subsystem::{HeadlessHandle, HeadlessSubsystem, WindowId};
    use std::sync::Arc;
    use tokio_util::sync::CancellationToken;

    fn context(cfg: Config) -> (Rc<UiContext<HeadlessSubsystem>>, HeadlessHandle, CancellationToken) {
        let token = CancellationToken::new();
        let bus = Bus::new(64, SubscriberSet::empty());
        let shared = Arc::new(Shared::new(cfg, bus, token.clone()));
        let ui = HeadlessSubsystem::new();
        let os = ui.handle();
        let ctx = Rc::new(UiContext::new(shared, ui, None));
        (ctx, os, token)
    }

    fn init(ctx: &UiContext<HeadlessSubsystem>) -> Vec<WindowId> {
        ctx.with_subsystem(|s| {
            s.init().unwrap();
            vec![
                s.create_window("one", 1, 1).unwrap(),
                s.create_window("two", 1, 1).unwrap(),
            ]
        })
    }

    #[test]
    fn test_close_event_destroys_only_that_window() {
        let (ctx, os, token) = context(Config::default());
        let ids = init(&ctx);
        ctx.shared.set_running(true);

        os.request_close(ids[0]);
        os.push_os_event(UiEvent::Other(42));
        assert_eq!(drain(&ctx), None);

        assert_eq!(os.windows(), vec![ids[1]]);
        assert!(ctx.shared.is_running());
        assert!(!token.is_cancelled());
    }

    #[test]
    fn test_terminate_skips_remaining_events() {
        let (ctx, os, _token) = context(Config::default());
        let ids = init(&ctx);

        os.request_quit();
        os.request_close(ids[0]);
        assert_eq!(drain(&ctx), Some(PumpExit::Terminated));
        assert_eq!(os.pending_events(), 1);
        assert_eq!(os.windows().len(), 2);
    }

    #[test]
    fn test_foreign_custom_event_is_ignored() {
        let (ctx, os, _token) = context(Config::default());
        init(&ctx);
        // Token not registered by the runtime: must not stop the pump.
        os.push_os_event(UiEvent::Custom(crate::CustomEventToken(1)));
        assert_eq!(drain(&ctx), None);
    }

    async fn run_initialized<F>(ctx: &Rc<UiContext<HeadlessSubsystem>>, token: &CancellationToken, stop: F)
    where
        F: FnOnce(&UiContext<HeadlessSubsystem>),
    {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                ctx.shared.set_running(true);
                ctx.initialize();
                assert_eq!(ctx.shared.gate.state(), GateState::Ready);
                stop(ctx);
                time::timeout(Duration::from_secs(1), token.cancelled())
                    .await
                    .unwrap();
            })
            .await;
    }

    fn no_periodic() -> Config {
        Config {
            periodic: Duration::ZERO,
            ..Config::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_quit_token_stops_pump_and_tears_down_once() {
        let (ctx, os, token) = context(no_periodic());
        let mut events = ctx.shared.bus.subscribe();

        run_initialized(&ctx, &token, |ctx| ctx.push_quit()).await;

        assert!(!ctx.shared.is_running());
        assert_eq!(os.quit_calls(), 1);
        drop(ctx);
        assert_eq!(os.quit_calls(), 1);

        let stopped = std::iter::from_fn(|| events.try_recv().ok())
            .find(|ev| ev.kind == EventKind::PumpStopped)
            .unwrap();
        assert_eq!(stopped.reason.as_deref(), Some("quit-token"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_signal_terminates_through_pump() {
        let (ctx, os, token) = context(no_periodic());
        let mut events = ctx.shared.bus.subscribe();

        run_initialized(&ctx, &token, |ctx| ctx.on_shutdown_signal()).await;

        assert!(!ctx.shared.is_running());
        assert_eq!(os.quit_calls(), 1);
        let seen: Vec<Event> = std::iter::from_fn(|| events.try_recv().ok()).collect();
        assert!(seen.iter().any(|ev| ev.kind == EventKind::SignalReceived));
        let stopped = seen
            .iter()
            .find(|ev| ev.kind == EventKind::PumpStopped)
            .unwrap();
        assert_eq!(stopped.reason.as_deref(), Some("terminate"));
    }

    #[test]
    fn test_shutdown_signal_stops_directly_when_push_fails() {
        let (ctx, os, token) = context(Config::default());
        // Never initialized: the headless queue rejects pushes.
        ctx.shared.set_running(true);

        ctx.on_shutdown_signal();

        assert!(token.is_cancelled());
        assert!(!ctx.shared.is_running());
        assert_eq!(os.pending_events(), 0);
    }

    #[test]
    fn test_shutdown_signal_after_stop_pushes_nothing() {
        let (ctx, os, token) = context(Config::default());
        init(&ctx);

        ctx.on_shutdown_signal();

        assert_eq!(os.pending_events(), 0);
        assert!(!token.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleared_flag_stops_pump_within_one_interval() {
        let (ctx, os, token) = context(no_periodic());
        let mut events = ctx.shared.bus.subscribe();

        run_initialized(&ctx, &token, |ctx| ctx.shared.set_running(false)).await;

        assert_eq!(os.quit_calls(), 1);
        let stopped = std::iter::from_fn(|| events.try_recv().ok())
            .find(|ev| ev.kind == EventKind::PumpStopped)
            .unwrap();
        assert_eq!(stopped.reason.as_deref(), Some("not-running"));
    }
}
