//! Mode state machine.
//!
//! Owns the timer state, the overlay arena and the sleep assertion, and
//! drives every mode transition:
//! - Work countdown → break (overlays up, sleep assertion held, alert)
//! - Break countdown → work (auto-end) or expired break (waiting on a key)
//! - Forced break teardown on display topology changes
//!
//! Every transition bumps the epoch. Ticks are stamped with the epoch of
//! the countdown that produced them and stale ones are discarded, so a
//! tick from a dismissed break can never decrement the next work session.
//!
//! Events are fired into an unbounded channel; the daemon translates them
//! into tray updates, alert playback and notifications.

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::overlay::{Display, OverlayBackend, OverlayManager};
use crate::power::SleepInhibitor;
use crate::types::{ConfigParams, ResponseData, TimerConfig, TimerMode, TimerState};

// ============================================================================
// TimerEvent
// ============================================================================

/// State machine events for the daemon loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerEvent {
    /// A countdown started (or resumed)
    Started {
        /// Mode the countdown belongs to
        mode: TimerMode,
    },
    /// The work countdown was paused
    Paused,
    /// The countdown was halted and reset
    Stopped,
    /// One second elapsed
    Tick {
        /// Remaining seconds
        remaining_seconds: u32,
    },
    /// A break began and the overlays are up
    BreakStarted {
        /// Whether the break was requested manually
        manual: bool,
    },
    /// A break ended normally (auto-end or dismissal)
    BreakEnded,
    /// The break countdown hit zero but auto-end is off; overlays stay up
    BreakExpired,
    /// A break was torn down by a display topology change
    BreakInterrupted,
    /// The break alert should play
    AlertRequested,
    /// The status indicator visibility changed
    IndicatorToggled {
        /// New visibility
        visible: bool,
    },
    /// Overlays should be re-asserted shortly (after a Space change)
    ReassertRequested {
        /// Epoch the request belongs to
        epoch: u64,
    },
}

// ============================================================================
// ModeStateMachine
// ============================================================================

/// The daemon's mode state machine.
pub struct ModeStateMachine {
    /// Current timer state
    state: TimerState,
    /// Transition counter; bumped on every mode transition
    epoch: u64,
    /// Break overlay arena
    overlays: OverlayManager,
    /// System sleep assertion
    inhibitor: Box<dyn SleepInhibitor>,
    /// Last known display topology
    displays: Vec<Display>,
    /// Event sender channel
    event_tx: mpsc::UnboundedSender<TimerEvent>,
}

impl ModeStateMachine {
    /// Creates a state machine in idle work mode.
    pub fn new(
        config: TimerConfig,
        overlay_backend: Box<dyn OverlayBackend>,
        inhibitor: Box<dyn SleepInhibitor>,
        event_tx: mpsc::UnboundedSender<TimerEvent>,
    ) -> Self {
        Self {
            state: TimerState::new(config),
            epoch: 0,
            overlays: OverlayManager::new(overlay_backend),
            inhibitor,
            displays: Vec::new(),
            event_tx,
        }
    }

    /// Returns a reference to the current timer state.
    pub fn state(&self) -> &TimerState {
        &self.state
    }

    /// Returns the current epoch.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Returns true if a countdown is running.
    pub fn is_running(&self) -> bool {
        self.state.is_running
    }

    /// Returns true if break mode is active (overlays up).
    pub fn is_on_break(&self) -> bool {
        self.state.mode == TimerMode::Break && !self.overlays.is_empty()
    }

    /// Number of live overlays.
    pub fn overlay_count(&self) -> usize {
        self.overlays.count()
    }

    /// Returns true if the sleep assertion is held.
    pub fn inhibitor_held(&self) -> bool {
        self.inhibitor.is_held()
    }

    /// Builds a status snapshot for IPC responses.
    pub fn status(&self) -> ResponseData {
        ResponseData::from_timer_state(&self.state).with_overlay_count(self.overlays.count())
    }

    /// Updates the known display topology without reacting to it.
    ///
    /// Used at startup, before any break has been shown.
    pub fn seed_displays(&mut self, displays: Vec<Display>) {
        self.displays = displays;
    }

    // ------------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------------

    /// Starts (or resumes) the countdown for the current mode.
    ///
    /// Valid from any state; a paused countdown resumes from where it
    /// left off. Starting while already running is a no-op.
    pub fn start(&mut self) -> Result<()> {
        if self.state.is_running {
            debug!("タイマーは既に実行中です");
            return Ok(());
        }

        if self.state.remaining_seconds == 0 {
            self.state.reset_remaining();
        }
        self.state.is_running = true;
        self.epoch += 1;

        info!(
            mode = self.state.mode.as_str(),
            remaining = self.state.remaining_seconds,
            "タイマーを開始"
        );
        self.emit(TimerEvent::Started {
            mode: self.state.mode,
        })
    }

    /// Pauses the countdown, preserving the remaining time.
    ///
    /// Pausing while already paused is a no-op.
    pub fn pause(&mut self) -> Result<()> {
        if !self.state.is_running {
            debug!("タイマーは既に停止しています");
            return Ok(());
        }

        self.state.is_running = false;
        self.epoch += 1;

        info!(remaining = self.state.remaining_seconds, "タイマーを一時停止");
        self.emit(TimerEvent::Paused)
    }

    /// Halts the countdown and refills it to the current mode's full
    /// duration. The mode itself is left alone; a showing break stays up
    /// until it is dismissed.
    pub fn stop(&mut self) -> Result<()> {
        self.state.is_running = false;
        self.state.reset_remaining();
        self.epoch += 1;

        info!(mode = self.state.mode.as_str(), "タイマーを停止しました");
        self.emit(TimerEvent::Stopped)
    }

    /// Resets the countdown to the full duration of the current mode,
    /// leaving the running flag alone.
    pub fn reset_timer(&mut self) -> Result<()> {
        self.state.reset_remaining();

        info!(
            mode = self.state.mode.as_str(),
            remaining = self.state.remaining_seconds,
            "タイマーをリセットしました"
        );
        self.emit(TimerEvent::Tick {
            remaining_seconds: self.state.remaining_seconds,
        })
    }

    /// Forces break mode immediately.
    ///
    /// # Errors
    ///
    /// Returns an error if a break is already showing.
    pub fn start_break_manually(&mut self) -> Result<()> {
        if self.state.mode == TimerMode::Break {
            anyhow::bail!("既に休憩中です");
        }
        self.begin_break(true)
    }

    /// Processes a tick from the ticker.
    ///
    /// Ticks stamped with a stale epoch are discarded.
    pub fn on_tick(&mut self, tick_epoch: u64) -> Result<()> {
        if tick_epoch != self.epoch {
            debug!(
                tick_epoch,
                current_epoch = self.epoch,
                "古いエポックのティックを破棄"
            );
            return Ok(());
        }
        if !self.state.is_running {
            return Ok(());
        }

        let completed = self.state.tick();
        self.emit(TimerEvent::Tick {
            remaining_seconds: self.state.remaining_seconds,
        })?;

        if completed {
            self.handle_countdown_complete()?;
        }
        Ok(())
    }

    /// Handles a countdown reaching zero.
    fn handle_countdown_complete(&mut self) -> Result<()> {
        match self.state.mode {
            TimerMode::Work => {
                info!("作業時間が終了しました。休憩を開始します");
                self.begin_break(false)
            }
            TimerMode::Break => {
                if self.state.config.auto_end_break {
                    info!("休憩時間が終了しました");
                    self.end_break()?;
                    self.emit(TimerEvent::AlertRequested)
                } else {
                    // Overlays and the sleep assertion stay up until the
                    // user presses a key on the overlay
                    info!("休憩時間が終了しました。キー入力を待っています");
                    self.state.is_running = false;
                    self.epoch += 1;
                    self.emit(TimerEvent::BreakExpired)?;
                    self.emit(TimerEvent::AlertRequested)
                }
            }
        }
    }

    /// Dismisses the break, optionally starting a new work cycle.
    ///
    /// The teardown order is fixed: epoch bump (invalidates in-flight
    /// ticks), overlay teardown, sleep assertion release, then the mode
    /// reset.
    ///
    /// # Errors
    ///
    /// Returns an error if no break is active.
    pub fn dismiss_break(&mut self, start_new: bool) -> Result<()> {
        if self.state.mode != TimerMode::Break {
            anyhow::bail!("休憩中ではありません");
        }

        self.end_break()?;

        if start_new {
            self.state.is_running = true;
            self.emit(TimerEvent::Started {
                mode: TimerMode::Work,
            })?;
        }
        Ok(())
    }

    /// Reacts to a display topology change.
    ///
    /// Outside a break the new topology is only recorded. During a break
    /// the break is torn down and `BreakInterrupted` is emitted; the
    /// daemon posts the notification.
    pub fn on_display_topology_changed(&mut self, displays: Vec<Display>) -> Result<()> {
        let was_on_break = self.state.mode == TimerMode::Break;
        self.displays = displays;

        if !was_on_break {
            return Ok(());
        }

        warn!("休憩中にディスプレイ構成が変更されたため休憩を終了します");
        self.end_break()?;
        self.emit(TimerEvent::BreakInterrupted)
    }

    /// Reacts to an active Space change.
    ///
    /// During a break the overlays must come back to the front once the
    /// Space switch settles, so a delayed re-assert is requested with
    /// the current epoch. If the break ends before the delay elapses the
    /// epoch no longer matches and the re-assert is dropped.
    pub fn on_workspace_changed(&mut self) -> Result<()> {
        if self.state.mode != TimerMode::Break {
            return Ok(());
        }

        debug!("Space変更を検出。オーバーレイの再表示を予約");
        self.emit(TimerEvent::ReassertRequested { epoch: self.epoch })
    }

    /// Brings the overlays back to the front if the epoch still matches.
    pub fn reassert_overlays(&mut self, request_epoch: u64) {
        if request_epoch != self.epoch || self.state.mode != TimerMode::Break {
            debug!(request_epoch, "再表示要求は失効しています");
            return;
        }
        self.overlays.show_all();
    }

    /// Reacts to a notification action.
    pub fn on_notification_action(
        &mut self,
        action: crate::notification::NotificationAction,
    ) -> Result<()> {
        use crate::notification::NotificationAction;

        match action {
            NotificationAction::StartNewCycle => {
                info!("通知から新しいサイクルを開始します");
                if self.state.mode == TimerMode::Break {
                    self.end_break()?;
                }
                self.state.enter_mode(TimerMode::Work);
                self.state.is_running = true;
                self.epoch += 1;
                self.emit(TimerEvent::Started {
                    mode: TimerMode::Work,
                })
            }
            NotificationAction::Later
            | NotificationAction::Default
            | NotificationAction::Dismissed => Ok(()),
        }
    }

    /// Applies a configuration update.
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting configuration is invalid or
    /// no parameter was given.
    pub fn apply_config(&mut self, params: &ConfigParams) -> Result<()> {
        if params.is_empty() {
            anyhow::bail!("変更する設定項目を指定してください");
        }

        let mut candidate = self.state.config.clone();
        if let Some(minutes) = params.work_minutes {
            candidate.work_seconds = minutes
                .checked_mul(60)
                .ok_or_else(|| anyhow::anyhow!("作業時間が長すぎます: {}分", minutes))?;
        }
        if let Some(minutes) = params.break_minutes {
            candidate.break_seconds = minutes
                .checked_mul(60)
                .ok_or_else(|| anyhow::anyhow!("休憩時間が長すぎます: {}分", minutes))?;
        }
        candidate.validate().map_err(anyhow::Error::msg)?;

        if params.work_minutes.is_some() {
            self.state.set_work_seconds(candidate.work_seconds);
        }
        if params.break_minutes.is_some() {
            self.state.set_break_seconds(candidate.break_seconds);
        }
        if let Some(auto_end) = params.auto_end_break {
            self.state.config.auto_end_break = auto_end;
        }
        if let Some(show) = params.show_indicator {
            if self.state.config.show_status_indicator != show {
                self.state.config.show_status_indicator = show;
                self.emit(TimerEvent::IndicatorToggled { visible: show })?;
            }
        }

        info!(
            work_seconds = self.state.config.work_seconds,
            break_seconds = self.state.config.break_seconds,
            auto_end_break = self.state.config.auto_end_break,
            show_indicator = self.state.config.show_status_indicator,
            "設定を更新しました"
        );
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Break lifecycle
    // ------------------------------------------------------------------------

    /// Enters break mode: overlays up on every display, sleep assertion
    /// held, alert fired.
    fn begin_break(&mut self, manual: bool) -> Result<()> {
        self.epoch += 1;
        self.state.enter_mode(TimerMode::Break);
        self.state.is_running = true;

        let count = self.overlays.rebuild(&self.displays);
        debug!(overlays = count, "休憩オーバーレイを表示しました");

        // Losing the assertion is not worth losing the break over
        if let Err(e) = self.inhibitor.acquire() {
            warn!("スリープ抑制の取得に失敗しました: {}", e);
        }

        self.emit(TimerEvent::BreakStarted { manual })?;
        self.emit(TimerEvent::AlertRequested)
    }

    /// Leaves break mode and resets to an idle work session.
    fn end_break(&mut self) -> Result<()> {
        self.epoch += 1;
        self.teardown_break();
        self.state.enter_mode(TimerMode::Work);
        self.state.is_running = false;
        self.emit(TimerEvent::BreakEnded)
    }

    /// Tears down break artifacts: overlays first, then the assertion.
    fn teardown_break(&mut self) {
        self.overlays.teardown();
        self.inhibitor.release();
    }

    fn emit(&self, event: TimerEvent) -> Result<()> {
        self.event_tx
            .send(event)
            .context("イベントチャネルが閉じられています")
    }
}

impl std::fmt::Debug for ModeStateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModeStateMachine")
            .field("state", &self.state)
            .field("epoch", &self.epoch)
            .field("overlays", &self.overlays.count())
            .field("inhibitor_held", &self.inhibitor.is_held())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::NotificationAction;
    use crate::overlay::{MockOverlayBackend, MockOverlayProbe};
    use crate::power::{MockInhibitorProbe, MockSleepInhibitor};

    struct Harness {
        machine: ModeStateMachine,
        rx: mpsc::UnboundedReceiver<TimerEvent>,
        overlay_probe: MockOverlayProbe,
        inhibitor_probe: MockInhibitorProbe,
    }

    fn harness(config: TimerConfig) -> Harness {
        let (tx, rx) = mpsc::unbounded_channel();
        let (backend, overlay_probe) = MockOverlayBackend::new();
        let (inhibitor, inhibitor_probe) = MockSleepInhibitor::new();
        let mut machine =
            ModeStateMachine::new(config, Box::new(backend), Box::new(inhibitor), tx);
        machine.seed_displays(vec![Display::new(0, 0.0, 0.0, 1920.0, 1080.0)]);
        Harness {
            machine,
            rx,
            overlay_probe,
            inhibitor_probe,
        }
    }

    fn default_harness() -> Harness {
        harness(TimerConfig::default())
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<TimerEvent>) -> Vec<TimerEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    // ------------------------------------------------------------------------
    // Start / Pause / Stop
    // ------------------------------------------------------------------------

    mod start_pause_stop_tests {
        use super::*;

        #[test]
        fn test_start() {
            let mut h = default_harness();

            h.machine.start().unwrap();

            assert!(h.machine.is_running());
            assert_eq!(h.machine.state().mode, TimerMode::Work);
            assert_eq!(h.machine.epoch(), 1);
            assert_eq!(
                drain(&mut h.rx),
                vec![TimerEvent::Started {
                    mode: TimerMode::Work
                }]
            );
        }

        #[test]
        fn test_start_already_running_is_noop() {
            let mut h = default_harness();

            h.machine.start().unwrap();
            let epoch = h.machine.epoch();
            drain(&mut h.rx);

            h.machine.start().unwrap();

            assert!(h.machine.is_running());
            assert_eq!(h.machine.epoch(), epoch);
            assert!(drain(&mut h.rx).is_empty());
        }

        #[test]
        fn test_pause_preserves_remaining() {
            let mut h = default_harness();

            h.machine.start().unwrap();
            h.machine.on_tick(h.machine.epoch()).unwrap();
            h.machine.on_tick(h.machine.epoch()).unwrap();
            let remaining = h.machine.state().remaining_seconds;

            h.machine.pause().unwrap();

            assert!(!h.machine.is_running());
            assert_eq!(h.machine.state().remaining_seconds, remaining);
        }

        #[test]
        fn test_resume_continues_exactly_where_paused() {
            let mut h = default_harness();

            h.machine.start().unwrap();
            for _ in 0..10 {
                h.machine.on_tick(h.machine.epoch()).unwrap();
            }
            h.machine.pause().unwrap();
            let paused_at = h.machine.state().remaining_seconds;
            assert_eq!(paused_at, 15 * 60 - 10);

            h.machine.start().unwrap();
            assert_eq!(h.machine.state().remaining_seconds, paused_at);

            h.machine.on_tick(h.machine.epoch()).unwrap();
            assert_eq!(h.machine.state().remaining_seconds, paused_at - 1);
        }

        #[test]
        fn test_pause_not_running_is_noop() {
            let mut h = default_harness();

            h.machine.pause().unwrap();

            assert!(!h.machine.is_running());
            assert_eq!(h.machine.epoch(), 0);
            assert!(drain(&mut h.rx).is_empty());
        }

        #[test]
        fn test_pause_bumps_epoch() {
            let mut h = default_harness();

            h.machine.start().unwrap();
            let epoch = h.machine.epoch();
            h.machine.pause().unwrap();

            assert_eq!(h.machine.epoch(), epoch + 1);
        }

        #[test]
        fn test_stop_resets_to_idle_work() {
            let mut h = default_harness();

            h.machine.start().unwrap();
            h.machine.on_tick(h.machine.epoch()).unwrap();
            h.machine.stop().unwrap();

            assert!(!h.machine.is_running());
            assert_eq!(h.machine.state().mode, TimerMode::Work);
            assert_eq!(h.machine.state().remaining_seconds, 15 * 60);
        }

        #[test]
        fn test_stop_when_idle_is_harmless() {
            let mut h = default_harness();

            h.machine.stop().unwrap();

            assert!(!h.machine.is_running());
            assert_eq!(h.machine.state().remaining_seconds, 15 * 60);
        }

        #[test]
        fn test_stop_keeps_mode_and_break_artifacts() {
            let mut h = default_harness();

            h.machine.start_break_manually().unwrap();
            h.machine.on_tick(h.machine.epoch()).unwrap();

            h.machine.stop().unwrap();

            // Stop halts and refills the countdown but never dismisses
            // the break; the overlays and the assertion stay up
            assert!(!h.machine.is_running());
            assert_eq!(h.machine.state().mode, TimerMode::Break);
            assert_eq!(h.machine.state().remaining_seconds, 5 * 60);
            assert!(h.inhibitor_probe.is_held());
            assert_eq!(h.machine.overlay_count(), 1);

            h.machine.dismiss_break(false).unwrap();
            assert!(!h.inhibitor_probe.is_held());
            assert_eq!(h.machine.overlay_count(), 0);
        }

        #[test]
        fn test_reset_restores_full_duration() {
            let mut h = default_harness();

            h.machine.start().unwrap();
            for _ in 0..30 {
                h.machine.on_tick(h.machine.epoch()).unwrap();
            }
            h.machine.reset_timer().unwrap();

            assert_eq!(h.machine.state().remaining_seconds, 15 * 60);
            // Reset does not halt the countdown
            assert!(h.machine.is_running());
        }
    }

    // ------------------------------------------------------------------------
    // Ticks and epoch guard
    // ------------------------------------------------------------------------

    mod tick_tests {
        use super::*;

        #[test]
        fn test_tick_decrements() {
            let mut h = default_harness();

            h.machine.start().unwrap();
            drain(&mut h.rx);

            h.machine.on_tick(h.machine.epoch()).unwrap();

            assert_eq!(h.machine.state().remaining_seconds, 15 * 60 - 1);
            assert_eq!(
                drain(&mut h.rx),
                vec![TimerEvent::Tick {
                    remaining_seconds: 15 * 60 - 1
                }]
            );
        }

        #[test]
        fn test_stale_tick_is_discarded() {
            let mut h = default_harness();

            h.machine.start().unwrap();
            let old_epoch = h.machine.epoch();
            h.machine.pause().unwrap();
            h.machine.start().unwrap();
            drain(&mut h.rx);

            let remaining = h.machine.state().remaining_seconds;
            h.machine.on_tick(old_epoch).unwrap();

            assert_eq!(h.machine.state().remaining_seconds, remaining);
            assert!(drain(&mut h.rx).is_empty());
        }

        #[test]
        fn test_tick_while_not_running_is_ignored() {
            let mut h = default_harness();

            let remaining = h.machine.state().remaining_seconds;
            h.machine.on_tick(h.machine.epoch()).unwrap();

            assert_eq!(h.machine.state().remaining_seconds, remaining);
        }

        #[test]
        fn test_work_countdown_completion_enters_break() {
            let mut h = harness(TimerConfig::default().with_work_seconds(1));

            h.machine.start().unwrap();
            drain(&mut h.rx);

            h.machine.on_tick(h.machine.epoch()).unwrap();

            assert_eq!(h.machine.state().mode, TimerMode::Break);
            assert!(h.machine.is_running());
            assert_eq!(h.machine.state().remaining_seconds, 5 * 60);
            assert_eq!(h.machine.overlay_count(), 1);
            assert!(h.inhibitor_probe.is_held());

            let events = drain(&mut h.rx);
            assert!(events.contains(&TimerEvent::BreakStarted { manual: false }));
            assert!(events.contains(&TimerEvent::AlertRequested));
        }

        #[test]
        fn test_break_completion_auto_end_returns_to_work() {
            let config = TimerConfig::default()
                .with_work_seconds(1)
                .with_break_seconds(1)
                .with_auto_end_break(true);
            let mut h = harness(config);

            h.machine.start().unwrap();
            h.machine.on_tick(h.machine.epoch()).unwrap(); // work done, break begins
            drain(&mut h.rx);

            h.machine.on_tick(h.machine.epoch()).unwrap(); // break done

            // The break is dismissed but the next work session waits for
            // the user to start it
            assert_eq!(h.machine.state().mode, TimerMode::Work);
            assert!(!h.machine.is_running());
            assert_eq!(h.machine.state().remaining_seconds, 1);
            assert_eq!(h.machine.overlay_count(), 0);
            assert!(!h.inhibitor_probe.is_held());

            let events = drain(&mut h.rx);
            assert!(events.contains(&TimerEvent::BreakEnded));
            assert!(events.contains(&TimerEvent::AlertRequested));
        }

        #[test]
        fn test_break_completion_without_auto_end_waits() {
            let config = TimerConfig::default()
                .with_work_seconds(1)
                .with_break_seconds(1)
                .with_auto_end_break(false);
            let mut h = harness(config);

            h.machine.start().unwrap();
            h.machine.on_tick(h.machine.epoch()).unwrap();
            drain(&mut h.rx);

            h.machine.on_tick(h.machine.epoch()).unwrap();

            // Overlays and the assertion stay up until dismissal
            assert_eq!(h.machine.state().mode, TimerMode::Break);
            assert!(!h.machine.is_running());
            assert_eq!(h.machine.state().remaining_seconds, 0);
            assert_eq!(h.machine.overlay_count(), 1);
            assert!(h.inhibitor_probe.is_held());

            let events = drain(&mut h.rx);
            assert!(events.contains(&TimerEvent::BreakExpired));
            assert!(events.contains(&TimerEvent::AlertRequested));
        }
    }

    // ------------------------------------------------------------------------
    // Break lifecycle
    // ------------------------------------------------------------------------

    mod break_tests {
        use super::*;

        #[test]
        fn test_manual_break() {
            let mut h = default_harness();

            h.machine.start_break_manually().unwrap();

            assert_eq!(h.machine.state().mode, TimerMode::Break);
            assert!(h.machine.is_running());
            assert_eq!(h.machine.overlay_count(), 1);
            assert!(h.inhibitor_probe.is_held());

            let events = drain(&mut h.rx);
            assert!(events.contains(&TimerEvent::BreakStarted { manual: true }));
            assert!(events.contains(&TimerEvent::AlertRequested));
        }

        #[test]
        fn test_manual_break_while_on_break_fails() {
            let mut h = default_harness();

            h.machine.start_break_manually().unwrap();
            assert!(h.machine.start_break_manually().is_err());
        }

        #[test]
        fn test_dismiss_break() {
            let mut h = default_harness();

            h.machine.start_break_manually().unwrap();
            drain(&mut h.rx);

            h.machine.dismiss_break(false).unwrap();

            assert_eq!(h.machine.state().mode, TimerMode::Work);
            assert!(!h.machine.is_running());
            assert_eq!(h.machine.state().remaining_seconds, 15 * 60);
            assert_eq!(h.machine.overlay_count(), 0);
            assert!(!h.inhibitor_probe.is_held());
            assert_eq!(drain(&mut h.rx), vec![TimerEvent::BreakEnded]);
        }

        #[test]
        fn test_dismiss_break_and_start_new_cycle() {
            let mut h = default_harness();

            h.machine.start_break_manually().unwrap();
            drain(&mut h.rx);

            h.machine.dismiss_break(true).unwrap();

            assert_eq!(h.machine.state().mode, TimerMode::Work);
            assert!(h.machine.is_running());
            assert_eq!(h.machine.state().remaining_seconds, 15 * 60);

            let events = drain(&mut h.rx);
            assert_eq!(
                events,
                vec![
                    TimerEvent::BreakEnded,
                    TimerEvent::Started {
                        mode: TimerMode::Work
                    }
                ]
            );
        }

        #[test]
        fn test_dismiss_without_break_fails() {
            let mut h = default_harness();
            assert!(h.machine.dismiss_break(false).is_err());
        }

        #[test]
        fn test_dismiss_invalidates_pending_ticks() {
            let mut h = default_harness();

            h.machine.start_break_manually().unwrap();
            let break_epoch = h.machine.epoch();
            h.machine.dismiss_break(true).unwrap();
            drain(&mut h.rx);

            // Tick from the dismissed break arrives late
            let remaining = h.machine.state().remaining_seconds;
            h.machine.on_tick(break_epoch).unwrap();

            assert_eq!(h.machine.state().remaining_seconds, remaining);
        }

        #[test]
        fn test_inhibitor_never_leaks_across_cycles() {
            let config = TimerConfig::default()
                .with_work_seconds(1)
                .with_break_seconds(1)
                .with_auto_end_break(true);
            let mut h = harness(config);

            h.machine.start().unwrap();
            for _ in 0..6 {
                h.machine.on_tick(h.machine.epoch()).unwrap();
            }

            // Every acquire has a matching release; at most one is held
            assert_eq!(
                h.inhibitor_probe.acquire_count(),
                h.inhibitor_probe.release_count() + u32::from(h.inhibitor_probe.is_held())
            );
        }

        #[test]
        fn test_break_survives_inhibitor_failure() {
            let mut h = default_harness();
            h.inhibitor_probe.set_fail_acquire(true);

            h.machine.start_break_manually().unwrap();

            // Break proceeds without the assertion
            assert_eq!(h.machine.state().mode, TimerMode::Break);
            assert_eq!(h.machine.overlay_count(), 1);
            assert!(!h.inhibitor_probe.is_held());
        }

        #[test]
        fn test_overlay_per_display() {
            let mut h = default_harness();
            h.machine.seed_displays(vec![
                Display::new(0, 0.0, 0.0, 1920.0, 1080.0),
                Display::new(1, 1920.0, 0.0, 2560.0, 1440.0),
                Display::new(2, 4480.0, 0.0, 1920.0, 1080.0),
            ]);

            h.machine.start_break_manually().unwrap();

            assert_eq!(h.machine.overlay_count(), 3);
        }

        #[test]
        fn test_zero_displays_gets_fallback_overlay() {
            let mut h = default_harness();
            h.machine.seed_displays(Vec::new());

            h.machine.start_break_manually().unwrap();

            assert_eq!(h.machine.overlay_count(), 1);
        }
    }

    // ------------------------------------------------------------------------
    // Display topology and Space changes
    // ------------------------------------------------------------------------

    mod topology_tests {
        use super::*;

        #[test]
        fn test_topology_change_outside_break_only_records() {
            let mut h = default_harness();

            h.machine.start().unwrap();
            drain(&mut h.rx);

            h.machine
                .on_display_topology_changed(vec![
                    Display::new(0, 0.0, 0.0, 1920.0, 1080.0),
                    Display::new(1, 1920.0, 0.0, 1920.0, 1080.0),
                ])
                .unwrap();

            assert!(h.machine.is_running());
            assert!(drain(&mut h.rx).is_empty());

            // The recorded topology is used for the next break
            h.machine.pause().unwrap();
            h.machine.start_break_manually().unwrap();
            assert_eq!(h.machine.overlay_count(), 2);
        }

        #[test]
        fn test_topology_change_during_break_interrupts() {
            let mut h = default_harness();

            h.machine.start_break_manually().unwrap();
            drain(&mut h.rx);

            h.machine
                .on_display_topology_changed(vec![Display::new(0, 0.0, 0.0, 1280.0, 800.0)])
                .unwrap();

            assert_eq!(h.machine.state().mode, TimerMode::Work);
            assert!(!h.machine.is_running());
            assert_eq!(h.machine.overlay_count(), 0);
            assert!(!h.inhibitor_probe.is_held());

            let events = drain(&mut h.rx);
            assert!(events.contains(&TimerEvent::BreakEnded));
            assert!(events.contains(&TimerEvent::BreakInterrupted));
        }

        #[test]
        fn test_workspace_change_during_break_requests_reassert() {
            let mut h = default_harness();

            h.machine.start_break_manually().unwrap();
            drain(&mut h.rx);

            h.machine.on_workspace_changed().unwrap();

            let events = drain(&mut h.rx);
            assert_eq!(
                events,
                vec![TimerEvent::ReassertRequested {
                    epoch: h.machine.epoch()
                }]
            );
        }

        #[test]
        fn test_workspace_change_outside_break_is_ignored() {
            let mut h = default_harness();

            h.machine.on_workspace_changed().unwrap();
            assert!(drain(&mut h.rx).is_empty());
        }

        #[test]
        fn test_reassert_orders_overlays_front() {
            let mut h = default_harness();

            h.machine.start_break_manually().unwrap();
            h.overlay_probe.clear_ops();

            h.machine.reassert_overlays(h.machine.epoch());

            use crate::overlay::MockOverlayOp;
            assert!(h
                .overlay_probe
                .ops()
                .iter()
                .any(|op| matches!(op, MockOverlayOp::OrderFront(_))));
        }

        #[test]
        fn test_stale_reassert_is_dropped() {
            let mut h = default_harness();

            h.machine.start_break_manually().unwrap();
            let epoch = h.machine.epoch();
            h.machine.dismiss_break(false).unwrap();
            h.overlay_probe.clear_ops();

            h.machine.reassert_overlays(epoch);

            assert!(h.overlay_probe.ops().is_empty());
        }
    }

    // ------------------------------------------------------------------------
    // Notification actions
    // ------------------------------------------------------------------------

    mod notification_action_tests {
        use super::*;

        #[test]
        fn test_start_new_cycle_action_starts_work() {
            let mut h = default_harness();
            drain(&mut h.rx);

            h.machine
                .on_notification_action(NotificationAction::StartNewCycle)
                .unwrap();

            assert_eq!(h.machine.state().mode, TimerMode::Work);
            assert!(h.machine.is_running());
            assert_eq!(h.machine.state().remaining_seconds, 15 * 60);
        }

        #[test]
        fn test_later_action_changes_nothing() {
            let mut h = default_harness();
            drain(&mut h.rx);

            h.machine
                .on_notification_action(NotificationAction::Later)
                .unwrap();

            assert!(!h.machine.is_running());
            assert!(drain(&mut h.rx).is_empty());
        }
    }

    // ------------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------------

    mod config_tests {
        use super::*;

        #[test]
        fn test_apply_config_durations() {
            let mut h = default_harness();

            let params = ConfigParams {
                work_minutes: Some(25),
                break_minutes: Some(10),
                ..Default::default()
            };
            h.machine.apply_config(&params).unwrap();

            assert_eq!(h.machine.state().config.work_seconds, 25 * 60);
            assert_eq!(h.machine.state().config.break_seconds, 10 * 60);
            // Idle work countdown picks up the new duration
            assert_eq!(h.machine.state().remaining_seconds, 25 * 60);
        }

        #[test]
        fn test_apply_config_rejects_out_of_range() {
            let mut h = default_harness();

            let params = ConfigParams {
                work_minutes: Some(0),
                ..Default::default()
            };
            assert!(h.machine.apply_config(&params).is_err());

            let params = ConfigParams {
                work_minutes: Some(121),
                ..Default::default()
            };
            assert!(h.machine.apply_config(&params).is_err());
        }

        #[test]
        fn test_apply_config_huge_minutes_errors_without_panic() {
            // A raw IPC request is not bounded by the CLI's range check
            let mut h = default_harness();

            let params = ConfigParams {
                work_minutes: Some(100_000_000),
                ..Default::default()
            };
            assert!(h.machine.apply_config(&params).is_err());
            assert_eq!(h.machine.state().config.work_seconds, 15 * 60);

            let params = ConfigParams {
                break_minutes: Some(u32::MAX),
                ..Default::default()
            };
            assert!(h.machine.apply_config(&params).is_err());
            assert_eq!(h.machine.state().config.break_seconds, 5 * 60);
        }

        #[test]
        fn test_apply_config_empty_fails() {
            let mut h = default_harness();
            assert!(h.machine.apply_config(&ConfigParams::default()).is_err());
        }

        #[test]
        fn test_toggle_indicator_emits_event() {
            let mut h = default_harness();
            drain(&mut h.rx);

            let params = ConfigParams {
                show_indicator: Some(false),
                ..Default::default()
            };
            h.machine.apply_config(&params).unwrap();

            assert_eq!(
                drain(&mut h.rx),
                vec![TimerEvent::IndicatorToggled { visible: false }]
            );

            // Re-applying the same value is a no-op
            h.machine.apply_config(&params).unwrap();
            assert!(drain(&mut h.rx).is_empty());
        }

        #[test]
        fn test_apply_auto_end_break() {
            let mut h = default_harness();

            let params = ConfigParams {
                auto_end_break: Some(false),
                ..Default::default()
            };
            h.machine.apply_config(&params).unwrap();

            assert!(!h.machine.state().config.auto_end_break);
        }
    }

    // ------------------------------------------------------------------------
    // Status
    // ------------------------------------------------------------------------

    mod status_tests {
        use super::*;

        #[test]
        fn test_status_snapshot() {
            let mut h = default_harness();

            h.machine.start_break_manually().unwrap();
            let status = h.machine.status();

            assert_eq!(status.mode.as_deref(), Some("break"));
            assert_eq!(status.is_running, Some(true));
            assert_eq!(status.overlay_count, Some(1));
        }
    }
}
