use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, mpsc};
use std::thread;
use std::time::{Duration, Instant};

use tokio::sync::broadcast::{self, error::TryRecvError};
use uistrand::{
    Config, Event, EventKind, HeadlessSubsystem, RuntimeError, Subscribe, UiMain, WindowId,
};

const WAIT: Duration = Duration::from_secs(5);

fn cfg() -> Config {
    Config {
        periodic: Duration::ZERO,
        ..Config::default()
    }
}

fn wait_for(events: &mut broadcast::Receiver<Event>, kind: EventKind) -> Event {
    let deadline = Instant::now() + WAIT;
    loop {
        match events.try_recv() {
            Ok(ev) if ev.kind == kind => return ev,
            Ok(_) | Err(TryRecvError::Lagged(_)) => continue,
            Err(TryRecvError::Empty) => {
                assert!(Instant::now() < deadline, "timed out waiting for {kind:?}");
                thread::sleep(Duration::from_millis(2));
            }
            Err(TryRecvError::Closed) => panic!("bus closed before {kind:?}"),
        }
    }
}

#[test]
fn test_initialize_create_three_windows_then_quit() -> anyhow::Result<()> {
    let ui = HeadlessSubsystem::new();
    let os = ui.handle();
    let main = UiMain::new(cfg(), move || ui)?;

    main.initialize()?;
    assert!(main.is_running());
    assert!(os.is_initialized());

    let active = Arc::new(AtomicUsize::new(0));
    let overlaps = Arc::new(AtomicUsize::new(0));
    let (tx, rx) = mpsc::channel();
    for i in 0..3 {
        let active = Arc::clone(&active);
        let overlaps = Arc::clone(&overlaps);
        let tx = tx.clone();
        main.schedule_task(move |ui| {
            if active.fetch_add(1, Ordering::SeqCst) != 0 {
                overlaps.fetch_add(1, Ordering::SeqCst);
            }
            let id = ui.create_window(format!("window {i}"), 640, 480);
            active.fetch_sub(1, Ordering::SeqCst);
            tx.send(id).unwrap();
        });
    }
    let ids: Vec<WindowId> = (0..3)
        .map(|_| rx.recv_timeout(WAIT).unwrap().unwrap())
        .collect();
    assert_eq!(ids, vec![WindowId(1), WindowId(2), WindowId(3)]);
    assert_eq!(os.created_count(), 3);
    assert_eq!(overlaps.load(Ordering::SeqCst), 0);

    let started = Instant::now();
    main.quit();
    main.join()?;
    assert!(started.elapsed() < Duration::from_secs(1));

    assert_eq!(os.quit_calls(), 1);
    assert_eq!(os.foreign_thread_calls(), 0);
    assert!(!os.is_initialized());
    Ok(())
}

#[test]
fn test_init_failure_stops_session() -> anyhow::Result<()> {
    let ui = HeadlessSubsystem::new().fail_init("no video device");
    let os = ui.handle();
    let main = UiMain::new(cfg(), move || ui)?;
    let mut events = main.subscribe();

    let err = main.initialize().unwrap_err();
    assert!(matches!(&err, RuntimeError::InitFailed { reason } if reason.contains("no video device")));
    assert!(err.is_init_error());
    assert!(!main.is_running());

    let failed = wait_for(&mut events, EventKind::InitFailed);
    assert!(failed.reason.as_deref().unwrap_or_default().contains("no video device"));

    let ran = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&ran);
    main.schedule_task(move |_| flag.store(true, Ordering::SeqCst));
    wait_for(&mut events, EventKind::TaskDropped);

    main.join()?;
    assert!(!ran.load(Ordering::SeqCst));
    assert_eq!(os.quit_calls(), 0);
    assert_eq!(os.polls(), 0);
    Ok(())
}

struct SlowOnInitFailed;

impl Subscribe for SlowOnInitFailed {
    fn on_event(&self, event: &Event) {
        if event.kind == EventKind::InitFailed {
            thread::sleep(Duration::from_millis(200));
        }
    }
}

#[test]
fn test_init_failure_is_reported_as_failure_with_slow_subscriber() -> anyhow::Result<()> {
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(SlowOnInitFailed)];
    let main = UiMain::builder(|| HeadlessSubsystem::new().fail_init("no video device"))
        .with_config(cfg())
        .with_subscribers(subs)
        .build()?;

    let err = main.initialize().unwrap_err();
    assert!(
        matches!(&err, RuntimeError::InitFailed { reason } if reason.contains("no video device")),
        "unexpected outcome: {err:?}"
    );
    assert!(!main.is_running());
    main.join()?;
    Ok(())
}

#[test]
fn test_init_failure_outcome_is_stable_across_runs() -> anyhow::Result<()> {
    for run in 0..50 {
        let main = UiMain::new(cfg(), || HeadlessSubsystem::new().fail_init("no video device"))?;
        let err = main.initialize().unwrap_err();
        assert!(
            matches!(err, RuntimeError::InitFailed { .. }),
            "run {run}: unexpected outcome {err:?}"
        );
        assert!(!main.is_running());
        main.join()?;
    }
    Ok(())
}

#[test]
fn test_init_timeout_returns_promptly_and_late_init_is_torn_down() -> anyhow::Result<()> {
    let ui = HeadlessSubsystem::new().with_init_delay(Duration::from_millis(400));
    let os = ui.handle();
    let main = UiMain::new(
        Config {
            init_timeout: Duration::from_millis(100),
            ..cfg()
        },
        move || ui,
    )?;
    let mut events = main.subscribe();

    let started = Instant::now();
    let err = main.initialize().unwrap_err();
    assert!(matches!(err, RuntimeError::InitTimeout { timeout } if timeout == Duration::from_millis(100)));
    assert!(started.elapsed() < Duration::from_millis(350));
    assert!(!main.is_running());

    let timed_out = wait_for(&mut events, EventKind::InitTimedOut);
    assert_eq!(timed_out.timeout_ms, Some(100));
    wait_for(&mut events, EventKind::InitAborted);

    main.join()?;
    assert_eq!(os.quit_calls(), 1);
    assert_eq!(os.polls(), 0);
    Ok(())
}

#[test]
fn test_closing_one_window_keeps_session_running() -> anyhow::Result<()> {
    let ui = HeadlessSubsystem::new();
    let os = ui.handle();
    let main = UiMain::new(cfg(), move || ui)?;
    main.initialize()?;
    let mut events = main.subscribe();

    let (tx, rx) = mpsc::channel();
    main.schedule_task(move |ui| {
        let first = ui.create_window("first", 320, 200).unwrap();
        let second = ui.create_window("second", 320, 200).unwrap();
        tx.send((first, second)).unwrap();
    });
    let (first, second) = rx.recv_timeout(WAIT)?;

    os.request_close(first);
    let closed = wait_for(&mut events, EventKind::WindowClosed);
    assert_eq!(closed.window, Some(first));
    assert_eq!(closed.reason.as_deref(), Some("first"));

    assert!(main.is_running());
    assert_eq!(os.windows(), vec![second]);
    assert_eq!(os.destroyed(), vec![first]);

    main.shutdown()?;
    assert_eq!(os.quit_calls(), 1);
    Ok(())
}

#[test]
fn test_no_poll_after_quit_token_is_observed() -> anyhow::Result<()> {
    let ui = HeadlessSubsystem::new();
    let os = ui.handle();
    let main = UiMain::new(cfg(), move || ui)?;
    main.initialize()?;
    let mut events = main.subscribe();

    main.quit();
    let stopped = wait_for(&mut events, EventKind::PumpStopped);
    assert_eq!(stopped.reason.as_deref(), Some("quit-token"));

    let polls = os.polls();
    assert!(polls > 0);
    thread::sleep(main.config().poll_interval * 5);
    assert_eq!(os.polls(), polls);

    main.join()?;
    assert_eq!(os.polls(), polls);
    assert_eq!(os.quit_calls(), 1);
    Ok(())
}

#[test]
fn test_last_handle_dropped_inside_task_still_tears_down() -> anyhow::Result<()> {
    let ui = HeadlessSubsystem::new();
    let os = ui.handle();
    let main = Arc::new(UiMain::new(cfg(), move || ui)?);
    main.initialize()?;
    let mut events = main.subscribe();

    let (go_tx, go_rx) = mpsc::channel::<()>();
    let handle = Arc::clone(&main);
    main.schedule_task(move |_| {
        go_rx.recv().unwrap();
        handle.quit();
        drop(handle);
    });
    drop(main);
    go_tx.send(())?;

    wait_for(&mut events, EventKind::SubsystemQuit);
    assert_eq!(os.quit_calls(), 1);
    Ok(())
}

#[test]
fn test_os_terminate_event_ends_session() -> anyhow::Result<()> {
    let ui = HeadlessSubsystem::new();
    let os = ui.handle();
    let main = UiMain::new(cfg(), move || ui)?;
    main.initialize()?;
    let mut events = main.subscribe();

    os.request_quit();
    let stopped = wait_for(&mut events, EventKind::PumpStopped);
    assert_eq!(stopped.reason.as_deref(), Some("terminate"));
    assert!(!main.is_running());

    main.join()?;
    assert_eq!(os.quit_calls(), 1);
    Ok(())
}

#[test]
fn test_quit_is_idempotent_after_stop() -> anyhow::Result<()> {
    let ui = HeadlessSubsystem::new();
    let os = ui.handle();
    let main = Arc::new(UiMain::new(cfg(), move || ui)?);
    main.initialize()?;
    let mut events = main.subscribe();

    main.quit();
    wait_for(&mut events, EventKind::ExecutorStopped);
    assert!(main.is_stopped());

    let callers: Vec<_> = (0..4)
        .map(|_| {
            let main = Arc::clone(&main);
            thread::spawn(move || {
                for _ in 0..10 {
                    main.quit();
                }
            })
        })
        .collect();
    for c in callers {
        c.join().unwrap();
    }
    wait_for(&mut events, EventKind::TaskDropped);

    drop(main);
    assert_eq!(os.quit_calls(), 1);
    Ok(())
}

#[test]
fn test_tasks_from_many_threads_never_overlap_and_keep_submitter_order() -> anyhow::Result<()> {
    const THREADS: usize = 6;
    const PER_THREAD: usize = 100;

    let ui = HeadlessSubsystem::new();
    let os = ui.handle();
    let main = Arc::new(UiMain::new(cfg(), move || ui)?);
    main.initialize()?;

    let active = Arc::new(AtomicUsize::new(0));
    let overlaps = Arc::new(AtomicUsize::new(0));
    let seen = Arc::new(Mutex::new(Vec::with_capacity(THREADS * PER_THREAD)));

    let submitters: Vec<_> = (0..THREADS)
        .map(|t| {
            let main = Arc::clone(&main);
            let active = Arc::clone(&active);
            let overlaps = Arc::clone(&overlaps);
            let seen = Arc::clone(&seen);
            thread::spawn(move || {
                for n in 0..PER_THREAD {
                    let active = Arc::clone(&active);
                    let overlaps = Arc::clone(&overlaps);
                    let seen = Arc::clone(&seen);
                    main.schedule_task(move |_| {
                        if active.fetch_add(1, Ordering::SeqCst) != 0 {
                            overlaps.fetch_add(1, Ordering::SeqCst);
                        }
                        seen.lock().unwrap().push((t, n));
                        active.fetch_sub(1, Ordering::SeqCst);
                    });
                }
            })
        })
        .collect();
    for s in submitters {
        s.join().unwrap();
    }

    let (tx, rx) = mpsc::channel();
    main.schedule_task(move |_| tx.send(()).unwrap());
    rx.recv_timeout(WAIT)?;

    let seen = seen.lock().unwrap().clone();
    assert_eq!(seen.len(), THREADS * PER_THREAD);
    assert_eq!(overlaps.load(Ordering::SeqCst), 0);
    for t in 0..THREADS {
        let order: Vec<usize> = seen.iter().filter(|(s, _)| *s == t).map(|(_, n)| *n).collect();
        assert_eq!(order, (0..PER_THREAD).collect::<Vec<_>>());
    }
    assert_eq!(os.foreign_thread_calls(), 0);

    main.quit();
    Ok(())
}

#[test]
fn test_panicking_task_does_not_stop_session() -> anyhow::Result<()> {
    let ui = HeadlessSubsystem::new();
    let os = ui.handle();
    let main = UiMain::new(cfg(), move || ui)?;
    main.initialize()?;
    let mut events = main.subscribe();

    main.schedule_task(|_| panic!("window factory exploded"));
    let panicked = wait_for(&mut events, EventKind::TaskPanicked);
    assert_eq!(panicked.reason.as_deref(), Some("window factory exploded"));

    let (tx, rx) = mpsc::channel();
    main.schedule_task(move |ui| tx.send(ui.create_window("after", 1, 1).is_ok()).unwrap());
    assert!(rx.recv_timeout(WAIT)?);
    assert!(main.is_running());

    main.shutdown()?;
    assert_eq!(os.created_count(), 1);
    Ok(())
}

#[test]
fn test_failed_window_creation_can_unwind_session_from_task() -> anyhow::Result<()> {
    let ui = HeadlessSubsystem::new().with_max_windows(1);
    let os = ui.handle();
    let main = Arc::new(UiMain::new(cfg(), move || ui)?);
    main.initialize()?;
    let mut events = main.subscribe();

    for i in 0..2 {
        let handle = Arc::clone(&main);
        main.schedule_task(move |ui| {
            if ui.create_window(format!("window {i}"), 1, 1).is_err() {
                handle.quit();
            }
        });
    }

    let stopped = wait_for(&mut events, EventKind::PumpStopped);
    assert_eq!(stopped.reason.as_deref(), Some("quit-token"));
    assert_eq!(os.created_count(), 1);

    drop(main);
    assert_eq!(os.quit_calls(), 1);
    Ok(())
}

#[test]
fn test_periodic_ticks_are_published() -> anyhow::Result<()> {
    let main = UiMain::new(
        Config {
            periodic: Duration::from_millis(20),
            ..cfg()
        },
        HeadlessSubsystem::new,
    )?;
    let mut events = main.subscribe();
    main.initialize()?;

    assert_eq!(wait_for(&mut events, EventKind::PeriodicTick).tick, Some(1));
    assert_eq!(wait_for(&mut events, EventKind::PeriodicTick).tick, Some(2));

    main.shutdown()?;
    Ok(())
}

struct Recorder(Mutex<Vec<EventKind>>);

impl Subscribe for Recorder {
    fn on_event(&self, event: &Event) {
        self.0.lock().unwrap().push(event.kind);
    }
}

struct Faulty;

impl Subscribe for Faulty {
    fn on_event(&self, event: &Event) {
        if event.kind == EventKind::InitSucceeded {
            panic!("subscriber bug");
        }
    }

    fn name(&self) -> &'static str {
        "faulty"
    }
}

#[test]
fn test_subscribers_see_lifecycle_and_panics_are_isolated() -> anyhow::Result<()> {
    let recorder = Arc::new(Recorder(Mutex::new(Vec::new())));
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(Faulty), recorder.clone()];
    let main = UiMain::builder(HeadlessSubsystem::new)
        .with_config(cfg())
        .with_subscribers(subs)
        .build()?;
    let mut events = main.subscribe();

    main.initialize()?;
    let panic = wait_for(&mut events, EventKind::SubscriberPanicked);
    assert_eq!(panic.reason.as_deref().map(|r| r.contains("subscriber bug")), Some(true));

    main.shutdown()?;

    let kinds = recorder.0.lock().unwrap().clone();
    let pos = |k: EventKind| {
        kinds
            .iter()
            .position(|x| *x == k)
            .unwrap_or_else(|| panic!("{k:?} not recorded"))
    };
    assert!(pos(EventKind::InitStarting) < pos(EventKind::InitSucceeded));
    assert!(pos(EventKind::InitSucceeded) < pos(EventKind::QuitRequested));
    assert!(pos(EventKind::PumpStopped) < pos(EventKind::SubsystemQuit));
    pos(EventKind::SubscriberPanicked);
    pos(EventKind::ExecutorStopped);
    Ok(())
}
