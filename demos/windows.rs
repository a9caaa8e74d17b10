//! # Example: Three Windows
//!
//! Confines a [`HeadlessSubsystem`] to the `ui-main` worker thread, opens three
//! windows from scheduled closures, lets the "OS" close one of them, then quits.
//!
//! Run with:
//! ```text
//! RUST_LOG=uistrand=debug cargo run --example windows
//! ```
//! Ctrl-C during the run is routed through the subsystem as a terminate event.

use std::{collections::BTreeMap, sync::Arc, sync::mpsc, thread, time::Duration};

use tracing_subscriber::EnvFilter;
use uistrand::{Config, HeadlessSubsystem, LogWriter, Subscribe, UiMain, WindowId};

const WINDOWS: [(&str, u32, u32); 3] = [
    ("editor", 1280, 800),
    ("inspector", 420, 800),
    ("console", 1280, 240),
];

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("uistrand=info")),
        )
        .with_thread_names(true)
        .init();

    let ui = HeadlessSubsystem::new();
    let os = ui.handle();

    let cfg = Config {
        periodic: Duration::from_millis(500),
        quit_on_signal: true,
        ..Config::default()
    };
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];

    let main = UiMain::builder(move || ui)
        .with_config(cfg)
        .with_subscribers(subs)
        .on_tick(|_ui, tick| tracing::debug!(tick, "heartbeat"))
        .build()?;
    main.initialize()?;

    let (tx, rx) = mpsc::channel();
    for (title, w, h) in WINDOWS {
        let tx = tx.clone();
        main.schedule_task(move |ui| match ui.create_window(title, w, h) {
            Ok(id) => {
                let _ = tx.send((id, title));
            }
            Err(e) => tracing::error!(error = %e, title, "window creation failed"),
        });
    }
    drop(tx);

    let windows: BTreeMap<WindowId, &str> = rx.iter().take(WINDOWS.len()).collect();
    for (id, title) in &windows {
        println!("opened window {id}: {title}");
    }

    let main = Arc::new(main);
    let closer = {
        let main = Arc::clone(&main);
        let os = os.clone();
        let first = windows.keys().next().copied();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(1200));
            if let Some(id) = first {
                os.request_close(id);
            }
            thread::sleep(Duration::from_millis(800));
            main.quit();
        })
    };

    closer
        .join()
        .map_err(|_| anyhow::anyhow!("closer thread panicked"))?;
    let main = Arc::try_unwrap(main).map_err(|_| anyhow::anyhow!("handle still shared"))?;
    main.join()?;

    println!(
        "done: created={} destroyed={:?} teardowns={}",
        os.created_count(),
        os.destroyed(),
        os.quit_calls()
    );
    Ok(())
}
