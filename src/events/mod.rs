//! Platform event sources.
//!
//! The daemon reacts to three kinds of ambient events while a break is
//! showing:
//!
//! - Display topology changes (a monitor plugged in or removed)
//! - Active Space changes (the user switching Spaces mid-break)
//! - Key presses on the break overlay (Escape / Return)
//!
//! The macOS observers in `observers.rs` forward these into a tokio
//! channel consumed by the daemon's select loop. The event types here
//! are platform-independent so the state machine can be driven by tests.

#[cfg(target_os = "macos")]
pub mod observers;

#[cfg(target_os = "macos")]
pub use observers::PlatformObservers;

use crate::overlay::Display;

// ============================================================================
// PlatformEvent
// ============================================================================

/// An ambient event the daemon must react to.
#[derive(Debug, Clone)]
pub enum PlatformEvent {
    /// The set of connected displays changed. Carries the new topology.
    DisplayTopologyChanged(Vec<Display>),
    /// The active Space changed.
    WorkspaceChanged,
    /// A key was pressed while an overlay is up. Carries the raw keycode.
    KeyPressed(u16),
}
