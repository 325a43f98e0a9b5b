//! Break overlay management.
//!
//! This module owns the set of full-screen break overlays:
//! - One overlay per connected display, tracked in an ordered arena keyed
//!   by display identifier
//! - Explicit destroy-old-then-create-new rebuild on every entry into
//!   break mode and on every display-topology change
//! - Front-most re-assertion after workspace switches
//!
//! The actual windows are created through the [`OverlayBackend`] trait:
//! a Cocoa implementation on macOS and a recording mock for tests. All
//! arena logic is platform-independent.

pub mod error;
pub mod keys;

#[cfg(target_os = "macos")]
mod window;

pub use error::OverlayError;
pub use keys::{BreakKey, BreakKeyAction};

#[cfg(target_os = "macos")]
pub use window::CocoaOverlayBackend;

use tracing::{debug, warn};

// ============================================================================
// Display
// ============================================================================

/// Identifier of a connected display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DisplayId(pub u32);

impl DisplayId {
    /// Synthetic id used for the fallback overlay when no display is
    /// enumerable.
    pub const FALLBACK: DisplayId = DisplayId(u32::MAX);
}

/// Pixel bounds of a display in global coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayBounds {
    /// Origin x
    pub x: f64,
    /// Origin y
    pub y: f64,
    /// Width in pixels
    pub width: f64,
    /// Height in pixels
    pub height: f64,
}

/// A connected display, as reported by the platform layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Display {
    /// Display identifier
    pub id: DisplayId,
    /// Display bounds
    pub bounds: DisplayBounds,
}

impl Display {
    /// Creates a display description.
    pub fn new(id: u32, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            id: DisplayId(id),
            bounds: DisplayBounds {
                x,
                y,
                width,
                height,
            },
        }
    }

    /// The default-sized overlay target used when no display is
    /// enumerable.
    pub fn fallback() -> Self {
        Self {
            id: DisplayId::FALLBACK,
            bounds: DisplayBounds {
                x: 0.0,
                y: 0.0,
                width: 800.0,
                height: 600.0,
            },
        }
    }
}

// ============================================================================
// OverlayBackend
// ============================================================================

/// Opaque handle to a live overlay window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OverlayHandle(pub u64);

/// Platform window operations used by the [`OverlayManager`].
///
/// Implementations create borderless, always-on-top, input-capturing
/// windows that join every workspace and never activate the application.
pub trait OverlayBackend {
    /// Creates a full-screen overlay window covering the given display.
    fn create(&mut self, display: &Display) -> Result<OverlayHandle, OverlayError>;

    /// Destroys an overlay window. Destroying an unknown handle is a no-op.
    fn destroy(&mut self, handle: OverlayHandle);

    /// Brings an overlay window in front of everything else, unhiding it
    /// if necessary.
    fn order_front(&mut self, handle: OverlayHandle);

    /// Hides an overlay window without destroying it.
    fn hide(&mut self, handle: OverlayHandle);
}

// ============================================================================
// OverlayManager
// ============================================================================

/// Owns the arena of per-display break overlays.
///
/// The arena is rebuilt (old handles destroyed first, then new ones
/// created) on every entry into break mode and on every display-topology
/// change, so a handle can never outlive the display set it was created
/// for.
pub struct OverlayManager {
    /// Window backend
    backend: Box<dyn OverlayBackend>,
    /// Live overlays in creation order
    overlays: Vec<(DisplayId, OverlayHandle)>,
}

impl OverlayManager {
    /// Creates a manager with the given backend.
    pub fn new(backend: Box<dyn OverlayBackend>) -> Self {
        Self {
            backend,
            overlays: Vec::new(),
        }
    }

    /// Destroys all current overlays and creates one per display.
    ///
    /// An empty display list degrades to a single fallback overlay.
    /// Creation failures are logged and skipped; they never abort the
    /// rebuild. Returns the number of live overlays.
    pub fn rebuild(&mut self, displays: &[Display]) -> usize {
        self.teardown();

        let fallback = [Display::fallback()];
        let targets: &[Display] = if displays.is_empty() {
            warn!("ディスプレイを検出できません。デフォルトサイズで表示します");
            &fallback
        } else {
            displays
        };

        for target in targets {
            match self.backend.create(target) {
                Ok(handle) => {
                    debug!(display = target.id.0, "オーバーレイを作成しました");
                    self.overlays.push((target.id, handle));
                }
                Err(e) => {
                    warn!(
                        display = target.id.0,
                        "オーバーレイの作成に失敗しました: {}", e
                    );
                }
            }
        }

        self.overlays.len()
    }

    /// Brings every overlay to the front.
    ///
    /// Safe to call repeatedly; callers re-invoke this after workspace
    /// switches once the OS animation has settled.
    pub fn show_all(&mut self) {
        for (_, handle) in &self.overlays {
            self.backend.order_front(*handle);
        }
    }

    /// Hides every overlay without destroying it.
    pub fn hide_all(&mut self) {
        for (_, handle) in &self.overlays {
            self.backend.hide(*handle);
        }
    }

    /// Destroys every overlay.
    pub fn teardown(&mut self) {
        for (id, handle) in self.overlays.drain(..) {
            debug!(display = id.0, "オーバーレイを破棄しました");
            self.backend.destroy(handle);
        }
    }

    /// Returns the number of live overlays.
    pub fn count(&self) -> usize {
        self.overlays.len()
    }

    /// Returns true if no overlay is live.
    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }

    /// Returns the display ids of the live overlays, in creation order.
    pub fn display_ids(&self) -> Vec<DisplayId> {
        self.overlays.iter().map(|(id, _)| *id).collect()
    }
}

impl Drop for OverlayManager {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl std::fmt::Debug for OverlayManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayManager")
            .field("overlays", &self.overlays)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// MockOverlayBackend
// ============================================================================

/// Operations recorded by the mock backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOverlayOp {
    /// An overlay was created for a display
    Create(DisplayId),
    /// An overlay was destroyed
    Destroy(OverlayHandle),
    /// An overlay was ordered to the front
    OrderFront(OverlayHandle),
    /// An overlay was hidden
    Hide(OverlayHandle),
}

#[derive(Debug, Default)]
struct MockOverlayState {
    ops: Vec<MockOverlayOp>,
    live: Vec<OverlayHandle>,
    next_handle: u64,
    fail_creation: bool,
}

/// Shared view into a [`MockOverlayBackend`], for test assertions after
/// the backend has been moved into an [`OverlayManager`].
#[derive(Debug, Clone, Default)]
pub struct MockOverlayProbe {
    state: std::sync::Arc<std::sync::Mutex<MockOverlayState>>,
}

impl MockOverlayProbe {
    /// Returns the recorded operations in order.
    pub fn ops(&self) -> Vec<MockOverlayOp> {
        self.state.lock().unwrap().ops.clone()
    }

    /// Returns the number of currently live (created, not destroyed)
    /// overlays.
    pub fn live_count(&self) -> usize {
        self.state.lock().unwrap().live.len()
    }

    /// Makes all subsequent create calls fail.
    pub fn set_fail_creation(&self, fail: bool) {
        self.state.lock().unwrap().fail_creation = fail;
    }

    /// Clears the recorded operations (live handles are kept).
    pub fn clear_ops(&self) {
        self.state.lock().unwrap().ops.clear();
    }
}

/// Recording backend used by tests; no real windows are created.
#[derive(Debug, Default)]
pub struct MockOverlayBackend {
    state: std::sync::Arc<std::sync::Mutex<MockOverlayState>>,
}

impl MockOverlayBackend {
    /// Creates a mock backend and a probe sharing its state.
    pub fn new() -> (Self, MockOverlayProbe) {
        let backend = Self::default();
        let probe = MockOverlayProbe {
            state: std::sync::Arc::clone(&backend.state),
        };
        (backend, probe)
    }
}

impl OverlayBackend for MockOverlayBackend {
    fn create(&mut self, display: &Display) -> Result<OverlayHandle, OverlayError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_creation {
            return Err(OverlayError::CreationFailed("mock failure".to_string()));
        }
        state.next_handle += 1;
        let handle = OverlayHandle(state.next_handle);
        state.ops.push(MockOverlayOp::Create(display.id));
        state.live.push(handle);
        Ok(handle)
    }

    fn destroy(&mut self, handle: OverlayHandle) {
        let mut state = self.state.lock().unwrap();
        state.ops.push(MockOverlayOp::Destroy(handle));
        state.live.retain(|h| *h != handle);
    }

    fn order_front(&mut self, handle: OverlayHandle) {
        self.state
            .lock()
            .unwrap()
            .ops
            .push(MockOverlayOp::OrderFront(handle));
    }

    fn hide(&mut self, handle: OverlayHandle) {
        self.state
            .lock()
            .unwrap()
            .ops
            .push(MockOverlayOp::Hide(handle));
    }
}

// ============================================================================
// Tests
// ============================================================================
