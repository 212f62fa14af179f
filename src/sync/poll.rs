/// Cancellable periodic scheduler for the dashboard refresh loop.
///
/// The dashboard re-fetches backend status on a fixed period for as long as
/// the watch session lives. Rather than a fire-and-forget timer, the poller
/// is an explicit background thread with a cancellation channel, so tests
/// can stop it deterministically and assert how many ticks ran.
///
/// There is no drift correction: the next tick is scheduled one full period
/// after the previous tick completed. A slow tick therefore stretches the
/// cycle, which is acceptable for a human-facing status display.
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

// ---------------------------------------------------------------------------
// Poller
// ---------------------------------------------------------------------------

/// Spawns the periodic refresh thread.
pub struct Poller;

impl Poller {
    /// Run `tick` every `period` on a background thread until the returned
    /// handle is cancelled or dropped.
    ///
    /// The first tick fires one full period after spawn — callers that want
    /// an immediate refresh do it before starting the poller.
    pub fn spawn<F>(period: Duration, mut tick: F) -> PollHandle
    where
        F: FnMut() + Send + 'static,
    {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let ticks = Arc::new(AtomicU64::new(0));
        let thread_ticks = Arc::clone(&ticks);

        let join = thread::spawn(move || {
            loop {
                match stop_rx.recv_timeout(period) {
                    // Cancelled, or the handle was dropped.
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    Err(RecvTimeoutError::Timeout) => {
                        tick();
                        thread_ticks.fetch_add(1, Ordering::SeqCst);
                    }
                }
            }
        });

        PollHandle {
            stop_tx,
            ticks,
            join: Some(join),
        }
    }
}

/// Handle to a running poller.
///
/// Dropping the handle stops the poller (the thread sees the channel
/// disconnect on its next wakeup). Call [`cancel`](Self::cancel) to stop it
/// synchronously, or [`run_forever`](Self::run_forever) to park the calling
/// thread behind it.
pub struct PollHandle {
    stop_tx: mpsc::Sender<()>,
    ticks: Arc<AtomicU64>,
    join: Option<JoinHandle<()>>,
}

impl PollHandle {
    /// Number of completed ticks so far.
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::SeqCst)
    }

    /// Stop the poller and wait for the thread to exit.
    pub fn cancel(mut self) {
        let _ = self.stop_tx.send(());
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }

    /// Block the calling thread for as long as the poller runs.
    ///
    /// Used by `simdash watch`, where the poller owns the sync client and
    /// the main thread has nothing left to do until the process is killed.
    pub fn run_forever(mut self) {
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
