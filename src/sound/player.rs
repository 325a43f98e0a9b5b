//! Alert beep playback using rodio.
//!
//! The alert is a short multi-beep sequence synthesized from sine waves;
//! no sound assets are bundled. Playback runs on a dedicated short-lived
//! thread so it can never block the daemon's scheduling context.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rodio::source::{SineWave, Source};
use rodio::{OutputStream, Sink};
use tracing::{debug, warn};

use super::error::SoundError;

// ============================================================================
// Alert shape
// ============================================================================

/// Number of beeps in one alert.
pub const BEEP_COUNT: u32 = 4;

/// Gap between beep starts (beeps fire at 0, 0.3, 0.6, 0.9s).
pub const BEEP_INTERVAL: Duration = Duration::from_millis(300);

/// Length of a single beep.
const BEEP_DURATION: Duration = Duration::from_millis(180);

/// Beep frequency in Hz.
const BEEP_FREQUENCY: f32 = 880.0;

/// Beep amplitude (0.0..=1.0).
const BEEP_AMPLITUDE: f32 = 0.25;

// ============================================================================
// AlertPlayer
// ============================================================================

/// Plays the break alert sequence.
pub trait AlertPlayer {
    /// Fires the alert. Best-effort and non-blocking: failures are logged,
    /// never returned to the state machine.
    fn play_alert(&self);

    /// Returns true if playback is currently enabled.
    fn is_enabled(&self) -> bool;
}

// ============================================================================
// RodioAlertPlayer
// ============================================================================

/// Alert player backed by rodio.
///
/// Each alert opens its own output stream on a throwaway thread, plays the
/// staggered beeps and exits; the daemon never waits on it.
#[derive(Debug, Default)]
pub struct RodioAlertPlayer {
    /// Whether playback is disabled.
    disabled: AtomicBool,
}

impl RodioAlertPlayer {
    /// Creates a new alert player.
    pub fn new(disabled: bool) -> Self {
        Self {
            disabled: AtomicBool::new(disabled),
        }
    }

    /// Disables alert playback.
    pub fn disable(&self) {
        self.disabled.store(true, Ordering::Relaxed);
    }

    /// Enables alert playback.
    pub fn enable(&self) {
        self.disabled.store(false, Ordering::Relaxed);
    }

    /// Plays the beep sequence on the calling thread.
    ///
    /// # Errors
    ///
    /// Returns an error if no audio device is available or the stream
    /// cannot be created.
    fn play_sequence_blocking() -> Result<(), SoundError> {
        let (_stream, stream_handle) = OutputStream::try_default()
            .map_err(|e| SoundError::DeviceNotAvailable(e.to_string()))?;

        for i in 0..BEEP_COUNT {
            if i > 0 {
                std::thread::sleep(BEEP_INTERVAL);
            }

            let sink = Sink::try_new(&stream_handle)
                .map_err(|e| SoundError::StreamError(e.to_string()))?;
            let beep = SineWave::new(BEEP_FREQUENCY)
                .take_duration(BEEP_DURATION)
                .amplify(BEEP_AMPLITUDE);
            sink.append(beep);
            sink.detach();
        }

        // Keep the stream alive until the last beep has finished
        std::thread::sleep(BEEP_DURATION);
        Ok(())
    }
}

impl AlertPlayer for RodioAlertPlayer {
    fn play_alert(&self) {
        if self.disabled.load(Ordering::Relaxed) {
            debug!("アラート再生は無効化されています");
            return;
        }

        std::thread::spawn(|| {
            if let Err(e) = Self::play_sequence_blocking() {
                warn!("アラート再生に失敗しました: {}", e);
            } else {
                debug!("アラートを再生しました");
            }
        });
    }

    fn is_enabled(&self) -> bool {
        !self.disabled.load(Ordering::Relaxed)
    }
}

// ============================================================================
// MockAlertPlayer
// ============================================================================

/// Counting alert player used by tests.
#[derive(Debug, Default)]
pub struct MockAlertPlayer {
    alerts: Arc<AtomicU32>,
}

impl MockAlertPlayer {
    /// Creates a mock player.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a counter handle that survives moving the player.
    #[must_use]
    pub fn counter(&self) -> Arc<AtomicU32> {
        Arc::clone(&self.alerts)
    }

    /// Number of alerts fired so far.
    #[must_use]
    pub fn alert_count(&self) -> u32 {
        self.alerts.load(Ordering::SeqCst)
    }
}

impl AlertPlayer for MockAlertPlayer {
    fn play_alert(&self) {
        self.alerts.fetch_add(1, Ordering::SeqCst);
    }

    fn is_enabled(&self) -> bool {
        true
    }
}

// ============================================================================
// Tests
// ============================================================================
