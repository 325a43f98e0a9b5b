//! Countdown tick source.
//!
//! A [`Ticker`] owns at most one spawned tokio task that sends a tick
//! every second, stamped with the epoch it was armed under. The state
//! machine bumps its epoch on every mode transition, so ticks from a
//! cancelled countdown that are already in flight are recognized as
//! stale and discarded instead of decrementing the new mode's clock.

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};

/// A single countdown tick, stamped with the arming epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// Epoch of the countdown this tick belongs to.
    pub epoch: u64,
}

/// Spawns and cancels the per-second tick task.
#[derive(Debug, Default)]
pub struct Ticker {
    handle: Option<JoinHandle<()>>,
    armed_epoch: Option<u64>,
}

impl Ticker {
    /// Creates a ticker with no task running.
    pub fn new() -> Self {
        Self {
            handle: None,
            armed_epoch: None,
        }
    }

    /// Arms the ticker for the given epoch, cancelling any previous task.
    ///
    /// The first tick fires one second after arming, not immediately.
    pub fn arm(&mut self, epoch: u64, tx: UnboundedSender<Tick>) {
        self.cancel();

        let handle = tokio::spawn(async move {
            let start = Instant::now() + Duration::from_secs(1);
            let mut ticker = interval_at(start, Duration::from_secs(1));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                if tx.send(Tick { epoch }).is_err() {
                    // Daemon is gone
                    break;
                }
            }
        });

        self.handle = Some(handle);
        self.armed_epoch = Some(epoch);
    }

    /// Cancels the tick task. No-op if not armed.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        self.armed_epoch = None;
    }

    /// Returns true if a tick task is running.
    pub fn is_armed(&self) -> bool {
        self.handle
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }

    /// Returns the epoch the ticker is currently armed under.
    pub fn armed_epoch(&self) -> Option<u64> {
        self.armed_epoch
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.cancel();
    }
}

// ============================================================================
// Tests
// ============================================================================
