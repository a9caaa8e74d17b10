//! # Recurring timer task.
//!
//! ```text
//! Armed ──(deadline)──► Fired ──(running?)──► action(tick) ──► Armed(deadline + period)
//!                          └──── !running ───► Stopped
//! ```
//!
//! Deadlines are rearmed additively from the previous deadline, never from
//! "now", so the time spent inside the action does not accumulate as drift.

use std::time::Duration;

use tokio::time::{self, Instant};

/// Next deadline after `prev`.
#[inline]
pub(crate) fn next_deadline(prev: Instant, period: Duration) -> Instant {
    prev + period
}

/// Fires `on_fire(tick)` every `period` while `is_running()` holds.
///
/// `tick` starts at 1. `is_running` is checked before arming and again after
/// each wake-up, so a stop observed during the wait skips the action.
pub(crate) async fn run_periodic<R, F>(period: Duration, mut is_running: R, mut on_fire: F)
where
    R: FnMut() -> bool,
    F: FnMut(u64),
{
    let mut deadline = next_deadline(Instant::now(), period);
    let mut tick = 0u64;
    while is_running() {
        time::sleep_until(deadline).await;
        if !is_running() {
            return;
        }
        tick += 1;
        on_fire(tick);
        deadline = next_deadline(deadline, period);
    }
}
