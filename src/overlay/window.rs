//! Cocoa overlay windows (macOS only).
//!
//! Creates one borderless `NSWindow` per display, leveled above
//! full-screen applications, joining every Space and capturing input
//! without activating the application.

use std::collections::HashMap;

use objc2::rc::Retained;
use objc2::MainThreadMarker;
use objc2_app_kit::{
    NSBackingStoreType, NSColor, NSScreen, NSWindow, NSWindowCollectionBehavior,
    NSWindowStyleMask,
};
use objc2_foundation::{NSPoint, NSRect, NSSize};

use super::{Display, OverlayBackend, OverlayError, OverlayHandle};

/// Window level above the screen saver (kCGScreenSaverWindowLevel), so the
/// overlay also covers full-screen applications.
const OVERLAY_WINDOW_LEVEL: isize = 1000;

/// Overlay backend backed by real Cocoa windows.
///
/// All operations must run on the main thread; the stored
/// `MainThreadMarker` enforces this at construction time.
pub struct CocoaOverlayBackend {
    /// Main thread proof
    mtm: MainThreadMarker,
    /// Live windows keyed by handle
    windows: HashMap<OverlayHandle, Retained<NSWindow>>,
    /// Next handle value
    next_handle: u64,
}

impl CocoaOverlayBackend {
    /// Creates a Cocoa backend.
    ///
    /// # Errors
    ///
    /// Returns an error if called off the main thread.
    pub fn new() -> Result<Self, OverlayError> {
        let mtm = MainThreadMarker::new().ok_or_else(|| {
            OverlayError::NotMainThread(
                "CocoaOverlayBackendはメインスレッドで作成してください".to_string(),
            )
        })?;

        Ok(Self {
            mtm,
            windows: HashMap::new(),
            next_handle: 0,
        })
    }

    /// Enumerates the currently connected displays.
    pub fn current_displays(&self) -> Vec<Display> {
        let screens = NSScreen::screens(self.mtm);
        screens
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
}

impl OverlayBackend for CocoaOverlayBackend {
    fn create(&mut self, display: &Display) -> Result<OverlayHandle, OverlayError> {
        let rect = NSRect::new(
            NSPoint::new(display.bounds.x, display.bounds.y),
            NSSize::new(display.bounds.width, display.bounds.height),
        );

        // SAFETY: Borderless window with buffered backing; `defer: false`
        // creates the window device immediately. Run on the main thread,
        // which `self.mtm` guarantees.
        let window = unsafe {
            NSWindow::initWithContentRect_styleMask_backing_defer(
                self.mtm.alloc(),
                rect,
                NSWindowStyleMask::Borderless,
                NSBackingStoreType::Buffered,
                false,
            )
        };

        window.setLevel(OVERLAY_WINDOW_LEVEL);
        window.setOpaque(true);
        window.setBackgroundColor(Some(&NSColor::blackColor()));
        window.setIgnoresMouseEvents(false);
        window.setHidesOnDeactivate(false);
        // Join every Space, stay usable next to full-screen apps, and keep
        // out of the window cycle (Cmd-backtick).
        window.setCollectionBehavior(
            NSWindowCollectionBehavior::CanJoinAllSpaces
                | NSWindowCollectionBehavior::FullScreenAuxiliary
                | NSWindowCollectionBehavior::IgnoresCycle,
        );
        // Ordering front without activating keeps focus where it was.
        window.orderFrontRegardless();

        self.next_handle += 1;
        let handle = OverlayHandle(self.next_handle);
        self.windows.insert(handle, window);
        Ok(handle)
    }

    fn destroy(&mut self, handle: OverlayHandle) {
        if let Some(window) = self.windows.remove(&handle) {
            window.orderOut(None);
        }
    }

    fn order_front(&mut self, handle: OverlayHandle) {
        if let Some(window) = self.windows.get(&handle) {
            window.orderFrontRegardless();
        }
    }

    fn hide(&mut self, handle: OverlayHandle) {
        if let Some(window) = self.windows.get(&handle) {
            window.orderOut(None);
        }
    }
}

impl std::fmt::Debug for CocoaOverlayBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CocoaOverlayBackend")
            .field("windows", &self.windows.len())
            .finish_non_exhaustive()
    }
}
