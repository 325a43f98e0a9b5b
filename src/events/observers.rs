//! Cocoa event observers (macOS only).
//!
//! Installs block-based observers for screen parameter changes and
//! active Space changes, plus a local key monitor for the break overlay.
//! All events are forwarded into a tokio channel consumed by the daemon.

use std::ptr::NonNull;

use block2::RcBlock;
use objc2::rc::Retained;
use objc2::runtime::{AnyObject, ProtocolObject};
use objc2::MainThreadMarker;
use objc2_app_kit::{
    NSApplicationDidChangeScreenParametersNotification, NSEvent, NSEventMask, NSScreen,
    NSWorkspace, NSWorkspaceActiveSpaceDidChangeNotification,
};
use objc2_foundation::{NSNotification, NSNotificationCenter, NSObjectProtocol};
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use super::PlatformEvent;
use crate::overlay::Display;

/// Observer token kept alive for the daemon's lifetime.
type ObserverToken = Retained<ProtocolObject<dyn NSObjectProtocol>>;

/// Enumerates the currently connected displays.
pub fn current_displays(mtm: MainThreadMarker) -> Vec<Display> {
    NSScreen::screens(mtm)
        .iter()
        .enumerate()
        .map(|(index, screen)| {
            let frame = screen.frame();
            Display::new(
                index as u32,
                frame.origin.x,
                frame.origin.y,
                frame.size.width,
                frame.size.height,
            )
        })
        .collect()
}

/// Installed Cocoa observers.
///
/// Dropping this removes the observers and the key monitor.
pub struct PlatformObservers {
    mtm: MainThreadMarker,
    screen_observer: ObserverToken,
    workspace_observer: ObserverToken,
    key_monitor: Option<Retained<AnyObject>>,
}

impl PlatformObservers {
    /// Installs all observers, forwarding events into `tx`.
    ///
    /// Must be called on the main thread.
    pub fn install(mtm: MainThreadMarker, tx: UnboundedSender<PlatformEvent>) -> Self {
        let screen_observer = Self::install_screen_observer(mtm, tx.clone());
        let workspace_observer = Self::install_workspace_observer(tx.clone());
        let key_monitor = Self::install_key_monitor(tx);

        debug!("プラットフォームイベント監視を開始しました");
        Self {
            mtm,
            screen_observer,
            workspace_observer,
            key_monitor,
        }
    }

    /// Observes display topology changes.
    fn install_screen_observer(
        mtm: MainThreadMarker,
        tx: UnboundedSender<PlatformEvent>,
    ) -> ObserverToken {
        let block = RcBlock::new(move |_note: NonNull<NSNotification>| {
            // The callback runs on the main thread, so re-enumerating
            // screens here is safe.
            let displays = current_displays(mtm);
            debug!(count = displays.len(), "ディスプレイ構成が変更されました");
            let _ = tx.send(PlatformEvent::DisplayTopologyChanged(displays));
        });

        let center = NSNotificationCenter::defaultCenter();
        unsafe {
            center.addObserverForName_object_queue_usingBlock(
                Some(NSApplicationDidChangeScreenParametersNotification),
                None,
                None,
                &block,
            )
        }
    }

    /// Observes active Space changes.
    fn install_workspace_observer(tx: UnboundedSender<PlatformEvent>) -> ObserverToken {
        let block = RcBlock::new(move |_note: NonNull<NSNotification>| {
            debug!("アクティブなSpaceが変更されました");
            let _ = tx.send(PlatformEvent::WorkspaceChanged);
        });

        let workspace = unsafe { NSWorkspace::sharedWorkspace() };
        let center = unsafe { workspace.notificationCenter() };
        unsafe {
            center.addObserverForName_object_queue_usingBlock(
                Some(NSWorkspaceActiveSpaceDidChangeNotification),
                None,
                None,
                &block,
            )
        }
    }

    /// Monitors key-down events delivered to this application.
    ///
    /// The overlay windows capture input, so key presses during a break
    /// arrive here. The event is passed through unchanged; the daemon
    /// decides what the key means.
    fn install_key_monitor(
        tx: UnboundedSender<PlatformEvent>,
    ) -> Option<Retained<AnyObject>> {
        let block = RcBlock::new(
            move |event: NonNull<NSEvent>| -> *mut NSEvent {
                let keycode = unsafe { event.as_ref().keyCode() };
                let _ = tx.send(PlatformEvent::KeyPressed(keycode));
                event.as_ptr()
            },
        );

        unsafe { NSEvent::addLocalMonitorForEventsMatchingMask_handler(NSEventMask::KeyDown, &block) }
    }
}

impl Drop for PlatformObservers {
    fn drop(&mut self) {
        let _ = self.mtm;
        let center = NSNotificationCenter::defaultCenter();
        unsafe {
            center.removeObserver(&self.screen_observer);
        }

        let workspace = unsafe { NSWorkspace::sharedWorkspace() };
        let ws_center = unsafe { workspace.notificationCenter() };
        unsafe {
            ws_center.removeObserver(&self.workspace_observer);
        }

        if let Some(monitor) = self.key_monitor.take() {
            unsafe {
                NSEvent::removeMonitor(&monitor);
            }
        }
        debug!("プラットフォームイベント監視を停止しました");
    }
}

impl std::fmt::Debug for PlatformObservers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformObservers")
            .field("key_monitor", &self.key_monitor.is_some())
            .finish_non_exhaustive()
    }
}
