//! # SerializedExecutor: one worker thread, one FIFO serialization domain.
//!
//! The executor owns a dedicated OS thread running a single-threaded tokio
//! runtime inside a [`LocalSet`]. Posted closures are drained from an
//! unbounded FIFO queue and executed one at a time; local tasks spawned on
//! the worker (event pump, periodic task) interleave with them only at their
//! own suspension points. Nothing here ever runs in parallel with anything
//! else on the worker.
//!
//! ## Architecture
//! ```text
//! caller threads                         worker thread ("ui-main")
//!   post(job) ──► [unbounded mpsc] ──►  loop {
//!   post(job) ──►        │                 select! (biased) {
//!   stop()   ──► CancellationToken ───►      cancelled  → break
//!                                            job        → run_job (catch_unwind)
//!                                          }
//!                                          yield_now()   ← pump / periodic run here
//!                                        }
//!                                        discard queued jobs → ExecutorStopped
//! ```
//!
//! ## Rules
//! - **Mutual exclusion**: at most one closure runs at a time.
//! - **FIFO per submitter**: closures from one thread run in submission order.
//! - **Stop**: the in-flight closure finishes; nothing is dequeued afterwards;
//!   queued closures are dropped unexecuted (`JobsDiscarded`).
//! - **Post after stop**: silently dropped (`TaskDropped`), `post` returns `false`.
//! - **Panics**: caught per closure, reported as `TaskPanicked`; the loop continues.

use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;
use std::sync::Mutex;
use std::thread::{self, JoinHandle, ThreadId};

use tokio::{runtime, select, sync::mpsc, task::LocalSet};
use tokio_util::sync::CancellationToken;

use crate::{
    error::{RuntimeError, panic_message},
    events::{Bus, Event, EventKind},
};

/// Closure executed on the worker with access to the worker-local context.
pub type Job<C> = Box<dyn FnOnce(&Rc<C>) + Send + 'static>;

/// Single worker thread draining a FIFO of closures, one at a time.
///
/// `C` is a worker-local context built on the worker thread; it may hold
/// `!Send` state and is handed to every job by reference.
pub struct SerializedExecutor<C: 'static> {
    tx: mpsc::UnboundedSender<Job<C>>,
    token: CancellationToken,
    bus: Bus,
    worker: Mutex<Option<JoinHandle<()>>>,
    worker_id: ThreadId,
}

impl<C: 'static> SerializedExecutor<C> {
    /// Spawns the worker thread and starts draining jobs.
    ///
    /// `make_ctx` runs on the worker thread before the first job. Cancelling
    /// `token` (directly or through [`stop`](Self::stop)) ends the loop.
    pub fn start<F>(
        thread_name: &str,
        bus: Bus,
        token: CancellationToken,
        make_ctx: F,
    ) -> Result<Self, RuntimeError>
    where
        F: FnOnce() -> C + Send + 'static,
    {
        let rt = runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(RuntimeError::Runtime)?;
        let (tx, rx) = mpsc::unbounded_channel::<Job<C>>();

        let worker_bus = bus.clone();
        let worker_token = token.clone();
        let handle = thread::Builder::new()
            .name(thread_name.to_string())
            .spawn(move || {
                let local = LocalSet::new();
                local.block_on(&rt, drive(rx, worker_token, worker_bus, make_ctx));
                // Local tasks (and their context clones) are dropped here,
                // while the runtime is still alive.
                drop(local);
            })
            .map_err(RuntimeError::Spawn)?;
        let worker_id = handle.thread().id();

        Ok(Self {
            tx,
            token,
            bus,
            worker: Mutex::new(Some(handle)),
            worker_id,
        })
    }

    /// Enqueues `job` for serialized execution. Never blocks.
    ///
    /// Returns `false` if the executor is stopped and the job was dropped.
    pub fn post<F>(&self, job: F) -> bool
    where
        F: FnOnce(&Rc<C>) + Send + 'static,
    {
        if self.token.is_cancelled() || self.tx.send(Box::new(job)).is_err() {
            self.bus.publish(Event::new(EventKind::TaskDropped));
            return false;
        }
        true
    }

    /// Requests shutdown. The in-flight job (if any) completes first.
    pub fn stop(&self) {
        self.token.cancel();
    }

    /// Whether stop has been requested.
    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Whether the current thread is the worker thread.
    pub fn is_worker_thread(&self) -> bool {
        thread::current().id() == self.worker_id
    }

    /// Blocks until the worker thread exits.
    ///
    /// Does not request a stop: the worker exits once something calls
    /// [`stop`](Self::stop) or cancels the token. Calling it from the worker
    /// thread, or a second time, returns immediately.
    pub fn join(&self) -> Result<(), RuntimeError> {
        if self.is_worker_thread() {
            return Ok(());
        }
        let handle = self
            .worker
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .take();
        match handle {
            Some(h) => h.join().map_err(|payload| RuntimeError::WorkerPanicked {
                reason: panic_message(&*payload),
            }),
            None => Ok(()),
        }
    }
}

/// Stops the worker and joins it.
///
/// Dropped on the worker itself (the last handle released inside a job), the
/// thread cannot join itself: it is left detached, finishes the current job,
/// runs teardown and exits on its own. Nothing then waits for it, so a process
/// that exits right away may cut teardown short; keep a handle on another
/// thread and `join` it when teardown must complete.
impl<C: 'static> Drop for SerializedExecutor<C> {
    fn drop(&mut self) {
        self.stop();
        if self.is_worker_thread() {
            tracing::debug!("executor dropped on its worker; thread left detached");
            return;
        }
        if let Err(e) = self.join() {
            tracing::error!(error = %e, "worker thread did not exit cleanly");
        }
    }
}

/// Worker loop: drains jobs until the token is cancelled or all senders are gone.
async fn drive<C, F>(
    mut rx: mpsc::UnboundedReceiver<Job<C>>,
    token: CancellationToken,
    bus: Bus,
    make_ctx: F,
) where
    F: FnOnce() -> C,
{
    let ctx = Rc::new(make_ctx());
    loop {
        let job = select! {
            biased;
            _ = token.cancelled() => break,
            job = rx.recv() => match job {
                Some(job) => job,
                None => break,
            },
        };
        run_job(job, &ctx, &bus);
        tokio::task::yield_now().await;
    }

    rx.close();
    let mut discarded = 0usize;
    while rx.try_recv().is_ok() {
        discarded += 1;
    }
    if discarded > 0 {
        bus.publish(Event::new(EventKind::JobsDiscarded).with_count(discarded));
    }
    bus.publish(Event::new(EventKind::ExecutorStopped).with_current_thread());
}

/// Runs one job, converting a panic into a `TaskPanicked` event.
fn run_job<C>(job: Job<C>, ctx: &Rc<C>, bus: &Bus) {
    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| job(ctx))) {
        bus.publish(Event::new(EventKind::TaskPanicked).with_reason(panic_message(&*payload)));
    }
}
