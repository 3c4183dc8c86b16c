//! Framework-independent debounce with cancel-on-supersede.
//!
//! The autosave path schedules a write after a quiet period; every new
//! edit replaces the previously scheduled write. Nothing here knows about
//! drafts - the utility runs any future after the delay.

use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use tokio::task::JoinHandle;

/// Runs a scheduled future after a quiet delay, cancelling any previously
/// scheduled one.
///
/// A future that has already started running (the delay elapsed) is not
/// cancelled; whichever write lands last wins, matching the engine's
/// last-writer-wins persistence model.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    /// Creates a debouncer with the given quiet delay.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(None),
        }
    }

    /// Schedules `work` to run after the delay, superseding any pending
    /// scheduled work.
    pub fn call<F>(&self, work: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let delay = self.delay;
        let mut pending = self.pending.lock().expect("debouncer mutex poisoned");
        if let Some(previous) = pending.take() {
            previous.abort();
        }
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Detach once the delay has elapsed: a later abort only ever
            // lands on a task still in its quiet period, never on a write
            // that is already in flight.
            tokio::spawn(work);
        }));
    }

    /// Cancels any pending scheduled work.
    pub fn cancel(&self) {
        if let Some(previous) = self.pending.lock().expect("debouncer mutex poisoned").take() {
            previous.abort();
        }
    }
}
