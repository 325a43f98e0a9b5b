//! PomoLock Library
//!
//! This library provides the core functionality for PomoLock, a
//! break-enforcing work timer. It includes:
//! - Mode state machine for work/break transitions
//! - Full-screen break overlays, one per connected display (macOS only)
//! - System sleep inhibition during breaks (macOS only)
//! - IPC server/client for daemon-CLI communication
//! - CLI command parsing and output formatting
//! - Menu bar countdown indicator with tray icon (macOS only)
//! - Native macOS notifications for interrupted breaks (macOS only)
//! - Break alert sound playback

pub mod cli;
pub mod daemon;
pub mod events;
pub mod menubar;
pub mod notification;
pub mod overlay;
pub mod power;
pub mod sound;
pub mod types;

// Re-export commonly used types for convenience
pub use types::{
    ConfigParams, IpcRequest, IpcResponse, MachinePhase, ResponseData, TimerConfig, TimerMode,
    TimerState,
};

// Re-export daemon types
pub use daemon::{Daemon, ModeStateMachine, TimerEvent};

// Re-export overlay types
pub use overlay::{
    BreakKey, BreakKeyAction, Display, DisplayId, MockOverlayBackend, OverlayBackend,
    OverlayError, OverlayHandle, OverlayManager,
};

// Re-export power types
pub use power::{CaffeinateInhibitor, MockSleepInhibitor, PowerError, SleepInhibitor};

// Re-export notification types
pub use notification::{MockNotificationSender, NotificationAction, NotificationError, NotificationSender};

#[cfg(target_os = "macos")]
pub use notification::NotificationManager;

// Re-export menubar types
pub use menubar::{
    EventHandler, IconManager, MenuAction, MenuBuilder, MenuConfig, MenuItemConfig, MenuItemId,
    TrayIconManager, TrayUpdate,
};

// Re-export sound types
pub use sound::{AlertPlayer, MockAlertPlayer, RodioAlertPlayer, SoundError};
