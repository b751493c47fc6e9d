//! Cancellable repeating timer for periodic refresh.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Ownership token for an active repeating timer.
///
/// At most one handle exists per session. Cancellation is synchronous and
/// total: no tick body starts after `cancel` returns. Dropping the handle
/// cancels it, so an abandoned session cannot leak a running timer.
#[derive(Debug)]
pub struct PollHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl PollHandle {
    /// Stop the timer. Safe to call more than once.
    pub fn cancel(&self) {
        self.cancel.cancel();
        self.task.abort();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Spawn a task that runs `tick` every `period`.
///
/// The first tick fires one full period after the call; callers wanting
/// immediate data fetch it themselves before starting the timer. Must be
/// called from within a Tokio runtime.
pub fn spawn_repeating<F, Fut>(period: Duration, mut tick: F) -> PollHandle
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let cancel = CancellationToken::new();
    let token = cancel.clone();

    let task = tokio::spawn(async move {
        let start = tokio::time::Instant::now() + period;
        let mut interval = tokio::time::interval_at(start, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = interval.tick() => tick().await,
            }
        }
    });

    PollHandle { cancel, task }
}
