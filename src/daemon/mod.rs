//! Daemon module for the break-lock timer.
//!
//! This module contains the core daemon functionality:
//! - `machine`: Mode state machine (work/break transitions, overlays, sleep assertion)
//! - `ticker`: Epoch-stamped per-second tick source
//! - `ipc`: Unix Domain Socket server and request dispatch
//!
//! The daemon is single-threaded: a current-thread tokio runtime drives
//! one `select!` loop over IPC connections, ticks, platform events and
//! state machine events. The state machine is shared through
//! `Rc<RefCell<_>>`; nothing here crosses a thread boundary except the
//! spawned tick task, which only owns a channel sender.

pub mod ipc;
pub mod machine;
pub mod ticker;

pub use ipc::{default_socket_path, IpcServer, RequestHandler, DEFAULT_SOCKET_PATH};
pub use machine::{ModeStateMachine, TimerEvent};
pub use ticker::{Tick, Ticker};

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use anyhow::Result;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::{Duration, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::events::PlatformEvent;
use crate::menubar::{MenuAction, TrayIconManager, TrayUpdate};
use crate::notification::NotificationSender;
use crate::overlay::keys::{BreakKey, BreakKeyAction};
use crate::overlay::{Display, OverlayBackend};
use crate::power::SleepInhibitor;
use crate::sound::{AlertPlayer, RodioAlertPlayer};
use crate::types::TimerConfig;

// ============================================================================
// Constants
// ============================================================================

/// Delay before re-asserting overlays after a Space change.
///
/// The Space switch animation needs to settle before ordering the
/// windows front again, otherwise the overlay lands on the old Space.
const REASSERT_DELAY_MS: u64 = 500;

/// Interval for polling tray updates, menu clicks and notification actions.
const POLL_INTERVAL_MS: u64 = 200;

// ============================================================================
// Daemon
// ============================================================================

/// The break-lock daemon.
///
/// Owns the state machine, the IPC server, the tick source, the status
/// indicator and the alert player. Generic over the notification sender
/// so tests can drive it with a mock.
pub struct Daemon<N: NotificationSender> {
    machine: Rc<RefCell<ModeStateMachine>>,
    handler: RequestHandler,
    server: IpcServer,
    ticker: Ticker,
    tick_tx: UnboundedSender<Tick>,
    tick_rx: UnboundedReceiver<Tick>,
    event_rx: UnboundedReceiver<TimerEvent>,
    platform_tx: UnboundedSender<PlatformEvent>,
    platform_rx: UnboundedReceiver<PlatformEvent>,
    tray: TrayIconManager,
    tray_tx: crossbeam_channel::Sender<TrayUpdate>,
    player: RodioAlertPlayer,
    notifier: Option<N>,
}

impl<N: NotificationSender> Daemon<N> {
    /// Creates a daemon bound to the given socket path.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket cannot be bound.
    pub fn new(
        config: TimerConfig,
        socket_path: &Path,
        overlay_backend: Box<dyn OverlayBackend>,
        inhibitor: Box<dyn SleepInhibitor>,
        notifier: Option<N>,
    ) -> Result<Self> {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (tick_tx, tick_rx) = mpsc::unbounded_channel();
        let (platform_tx, platform_rx) = mpsc::unbounded_channel();
        let (tray_tx, tray_rx) = crossbeam_channel::unbounded();

        let machine = Rc::new(RefCell::new(ModeStateMachine::new(
            config,
            overlay_backend,
            inhibitor,
            event_tx,
        )));
        let handler = RequestHandler::new(Rc::clone(&machine));
        let server = IpcServer::new(socket_path)?;
        let tray = TrayIconManager::new(machine.borrow().state().clone(), tray_rx);

        Ok(Self {
            machine,
            handler,
            server,
            ticker: Ticker::new(),
            tick_tx,
            tick_rx,
            event_rx,
            platform_tx,
            platform_rx,
            tray,
            tray_tx,
            player: RodioAlertPlayer::new(false),
            notifier,
        })
    }

    /// Returns a sender for platform events (observers feed this).
    pub fn platform_sender(&self) -> UnboundedSender<PlatformEvent> {
        self.platform_tx.clone()
    }

    /// Returns a shared handle to the state machine.
    pub fn machine(&self) -> Rc<RefCell<ModeStateMachine>> {
        Rc::clone(&self.machine)
    }

    /// Seeds the initial display topology.
    pub fn seed_displays(&self, displays: Vec<Display>) {
        self.machine.borrow_mut().seed_displays(displays);
    }

    /// Runs the daemon until a quit request or Ctrl-C.
    ///
    /// # Errors
    ///
    /// Returns an error if the status indicator cannot be initialized.
    pub async fn run(mut self) -> Result<()> {
        self.tray.initialize()?;
        info!(socket = ?self.server.socket_path(), "デーモンを起動しました");

        let Daemon {
            machine,
            handler,
            server,
            mut ticker,
            tick_tx,
            mut tick_rx,
            mut event_rx,
            platform_tx: _platform_tx,
            mut platform_rx,
            mut tray,
            tray_tx,
            player,
            notifier,
        } = self;

        let mut poll = tokio::time::interval(Duration::from_millis(POLL_INTERVAL_MS));
        poll.set_missed_tick_behavior(MissedTickBehavior::Skip);

        // Pending overlay re-assert, scheduled by `ReassertRequested`
        let mut reassert: Option<(Instant, u64)> = None;

        'main: loop {
            tokio::select! {
                conn = server.accept() => {
                    let mut stream = match conn {
                        Ok(stream) => stream,
                        Err(e) => {
                            warn!("接続の受け付けに失敗しました: {:#}", e);
                            continue;
                        }
                    };
                    let response = match IpcServer::receive_request(&mut stream).await {
                        Ok(request) => handler.handle(request),
                        Err(e) => {
                            warn!("リクエストの読み取りに失敗しました: {:#}", e);
                            crate::types::IpcResponse::error(e.to_string())
                        }
                    };
                    sync_ticker(&machine, &mut ticker, &tick_tx);
                    if let Err(e) = IpcServer::send_response(&mut stream, &response).await {
                        warn!("レスポンスの送信に失敗しました: {:#}", e);
                    }
                }

                Some(tick) = tick_rx.recv() => {
                    if let Err(e) = machine.borrow_mut().on_tick(tick.epoch) {
                        error!("ティック処理に失敗しました: {:#}", e);
                    }
                    sync_ticker(&machine, &mut ticker, &tick_tx);
                }

                Some(event) = platform_rx.recv() => {
                    handle_platform_event(&machine, event);
                    sync_ticker(&machine, &mut ticker, &tick_tx);
                }

                Some(event) = event_rx.recv() => {
                    handle_timer_event(
                        &machine,
                        event,
                        &mut tray,
                        &tray_tx,
                        &player,
                        notifier.as_ref(),
                        &mut reassert,
                    )
                    .await;
                    sync_ticker(&machine, &mut ticker, &tick_tx);
                }

                _ = maybe_sleep(reassert), if reassert.is_some() => {
                    if let Some((_, epoch)) = reassert.take() {
                        machine.borrow_mut().reassert_overlays(epoch);
                    }
                }

                _ = poll.tick() => {
                    while tray.process_pending_update() {}

                    while let Some(action) = tray.try_recv_menu_action() {
                        if action == MenuAction::Quit {
                            info!("メニューから終了が要求されました");
                            break 'main;
                        }
                        handle_menu_action(&machine, action);
                        sync_ticker(&machine, &mut ticker, &tick_tx);
                    }

                    if let Some(notifier) = notifier.as_ref() {
                        while let Some(action) = notifier.try_recv_action() {
                            if let Err(e) = machine.borrow_mut().on_notification_action(action) {
                                warn!("通知アクションの処理に失敗しました: {:#}", e);
                            }
                            sync_ticker(&machine, &mut ticker, &tick_tx);
                        }
                    }
                }

                _ = tokio::signal::ctrl_c() => {
                    info!("終了シグナルを受信しました");
                    break 'main;
                }
            }
        }

        // Shutdown: tear the break down (releasing the sleep assertion),
        // clear notifications and drop the tray icon. The socket file is
        // removed by the server's Drop.
        ticker.cancel();
        if machine.borrow().state().mode == crate::types::TimerMode::Break {
            if let Err(e) = machine.borrow_mut().dismiss_break(false) {
                warn!("休憩の解除に失敗しました: {:#}", e);
            }
        }
        if let Some(notifier) = notifier.as_ref() {
            notifier.clear_all();
        }
        tray.shutdown();
        info!("デーモンを停止しました");
        Ok(())
    }
}

/// Sleeps until the re-assert deadline, if one is scheduled.
async fn maybe_sleep(deadline: Option<(Instant, u64)>) {
    if let Some((at, _)) = deadline {
        tokio::time::sleep_until(at).await;
    }
}

/// Aligns the tick task with the machine: armed exactly while a
/// countdown is running, under the machine's current epoch.
fn sync_ticker(
    machine: &Rc<RefCell<ModeStateMachine>>,
    ticker: &mut Ticker,
    tick_tx: &UnboundedSender<Tick>,
) {
    let (running, epoch) = {
        let machine = machine.borrow();
        (machine.is_running(), machine.epoch())
    };

    if running {
        if ticker.armed_epoch() != Some(epoch) {
            ticker.arm(epoch, tick_tx.clone());
        }
    } else {
        ticker.cancel();
    }
}

/// Routes a platform event into the state machine.
fn handle_platform_event(machine: &Rc<RefCell<ModeStateMachine>>, event: PlatformEvent) {
    match event {
        PlatformEvent::DisplayTopologyChanged(displays) => {
            if let Err(e) = machine.borrow_mut().on_display_topology_changed(displays) {
                error!("ディスプレイ構成変更の処理に失敗しました: {:#}", e);
            }
        }
        PlatformEvent::WorkspaceChanged => {
            if let Err(e) = machine.borrow_mut().on_workspace_changed() {
                error!("Space変更の処理に失敗しました: {:#}", e);
            }
        }
        PlatformEvent::KeyPressed(keycode) => {
            if !machine.borrow().is_on_break() {
                return;
            }
            let key = BreakKey::from_keycode(keycode);
            if let Some(action) = BreakKeyAction::for_key(key) {
                let start_new = action == BreakKeyAction::DismissAndStartNew;
                if let Err(e) = machine.borrow_mut().dismiss_break(start_new) {
                    warn!("キー入力による休憩解除に失敗しました: {:#}", e);
                }
            }
        }
    }
}

/// Routes a status indicator menu click into the state machine.
fn handle_menu_action(machine: &Rc<RefCell<ModeStateMachine>>, action: MenuAction) {
    let result = {
        let mut machine = machine.borrow_mut();
        match action {
            MenuAction::Start => machine.start(),
            MenuAction::Pause => machine.pause(),
            MenuAction::Stop => machine.stop(),
            MenuAction::Break => machine.start_break_manually(),
            // Quit is handled by the run loop
            MenuAction::Quit => Ok(()),
        }
    };
    if let Err(e) = result {
        warn!(action = %action, "メニュー操作に失敗しました: {:#}", e);
    }
}

/// Translates a state machine event into its side effects: status
/// indicator updates, alert playback, notifications and scheduled
/// overlay re-asserts.
async fn handle_timer_event<N: NotificationSender>(
    machine: &Rc<RefCell<ModeStateMachine>>,
    event: TimerEvent,
    tray: &mut TrayIconManager,
    tray_tx: &crossbeam_channel::Sender<TrayUpdate>,
    player: &RodioAlertPlayer,
    notifier: Option<&N>,
    reassert: &mut Option<(Instant, u64)>,
) {
    match event {
        TimerEvent::Tick { remaining_seconds } => {
            debug!(remaining_seconds, "ティック");
            refresh_tray(machine, tray, tray_tx, false);
        }
        TimerEvent::Started { .. }
        | TimerEvent::Paused
        | TimerEvent::Stopped
        | TimerEvent::BreakStarted { .. }
        | TimerEvent::BreakEnded
        | TimerEvent::BreakExpired => {
            refresh_tray(machine, tray, tray_tx, true);
        }
        TimerEvent::BreakInterrupted => {
            refresh_tray(machine, tray, tray_tx, true);
            if let Some(notifier) = notifier {
                if let Err(e) = notifier.post_break_interrupted().await {
                    warn!("休憩中断通知の送信に失敗しました: {}", e);
                }
            }
        }
        TimerEvent::AlertRequested => {
            player.play_alert();
        }
        TimerEvent::IndicatorToggled { visible } => {
            let _ = tray_tx.send(TrayUpdate::SetVisible(visible));
            while tray.process_pending_update() {}
        }
        TimerEvent::ReassertRequested { epoch } => {
            *reassert = Some((
                Instant::now() + Duration::from_millis(REASSERT_DELAY_MS),
                epoch,
            ));
        }
    }
}

/// Pushes the current state into the status indicator.
fn refresh_tray(
    machine: &Rc<RefCell<ModeStateMachine>>,
    tray: &mut TrayIconManager,
    tray_tx: &crossbeam_channel::Sender<TrayUpdate>,
    rebuild_menu: bool,
) {
    tray.update_state(machine.borrow().state().clone());
    let _ = tray_tx.send(TrayUpdate::SetTitle(tray.generate_title()));
    if rebuild_menu {
        let _ = tray_tx.send(TrayUpdate::RebuildMenu);
    }
    while tray.process_pending_update() {}
}

// ============================================================================
// Entry point
// ============================================================================

/// Builds the platform backends and runs the daemon (macOS).
#[cfg(target_os = "macos")]
pub async fn run_daemon(config: TimerConfig, socket_path: &Path) -> Result<()> {
    use anyhow::Context;
    use objc2::MainThreadMarker;

    use crate::events::observers::{current_displays, PlatformObservers};
    use crate::notification::NotificationManager;
    use crate::overlay::CocoaOverlayBackend;
    use crate::power::CaffeinateInhibitor;

    let mtm = MainThreadMarker::new()
        .context("デーモンはメインスレッドで起動してください")?;

    let overlay_backend = CocoaOverlayBackend::new()?;
    let inhibitor = CaffeinateInhibitor::new();
    let notifier = NotificationManager::new_with_fallback().await;

    let daemon = Daemon::new(
        config,
        socket_path,
        Box::new(overlay_backend),
        Box::new(inhibitor),
        notifier,
    )?;
    daemon.seed_displays(current_displays(mtm));

    // Observers must outlive the run loop
    let _observers = PlatformObservers::install(mtm, daemon.platform_sender());

    daemon.run().await
}

/// Builds headless stand-ins and runs the daemon (non-macOS).
///
/// Overlays, the sleep assertion and notifications have no effect off
/// macOS; the timer, IPC surface and logging still work, which is enough
/// for development.
#[cfg(not(target_os = "macos"))]
pub async fn run_daemon(config: TimerConfig, socket_path: &Path) -> Result<()> {
    use crate::notification::MockNotificationSender;
    use crate::overlay::MockOverlayBackend;
    use crate::power::MockSleepInhibitor;

    warn!("macOS以外ではオーバーレイとスリープ抑止は動作しません");

    let (overlay_backend, _overlay_probe) = MockOverlayBackend::new();
    let (inhibitor, _inhibitor_probe) = MockSleepInhibitor::new();

    let daemon = Daemon::new(
        config,
        socket_path,
        Box::new(overlay_backend),
        Box::new(inhibitor),
        None::<MockNotificationSender>,
    )?;
    daemon.run().await
}

// ============================================================================
// Tests
// ============================================================================
