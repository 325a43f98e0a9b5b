//! Event handling for status indicator interactions.
//!
//! This module handles:
//! - Menu event processing
//! - Command dispatching based on menu item clicks
//!
//! The event types and command mapping are platform-independent.
//! Actual event handling with tray-icon is done in the platform-specific code.

use std::fmt;

// ============================================================================
// MenuAction
// ============================================================================

/// Actions that can be triggered from the status indicator menu.
///
/// These actions are platform-independent and represent what the user
/// wants to do. The actual state machine call happens in the daemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    /// Start (or resume) the work countdown
    Start,
    /// Pause the work countdown
    Pause,
    /// Stop the countdown and reset
    Stop,
    /// Start a break immediately
    Break,
    /// Quit the daemon
    Quit,
}

impl fmt::Display for MenuAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MenuAction::Start => write!(f, "start"),
            MenuAction::Pause => write!(f, "pause"),
            MenuAction::Stop => write!(f, "stop"),
            MenuAction::Break => write!(f, "break"),
            MenuAction::Quit => write!(f, "quit"),
        }
    }
}

impl MenuAction {
    /// Returns a human-readable description of this action.
    pub fn description(&self) -> &'static str {
        match self {
            MenuAction::Start => "開始",
            MenuAction::Pause => "一時停止",
            MenuAction::Stop => "停止",
            MenuAction::Break => "休憩",
            MenuAction::Quit => "終了",
        }
    }
}

// ============================================================================
// MenuItemId
// ============================================================================

/// Identifiers for menu items.
///
/// On macOS, these map to actual menu item IDs from tray-icon.
/// For testing, we use our own enum-based identification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuItemId {
    /// Start menu item
    Start,
    /// Pause menu item
    Pause,
    /// Stop menu item
    Stop,
    /// Break menu item
    Break,
    /// Quit menu item
    Quit,
    /// Unknown or unhandled menu item
    Unknown,
}

impl MenuItemId {
    /// Converts a menu item ID to the corresponding action.
    ///
    /// Returns `None` for items like title or status that don't
    /// trigger actions.
    pub fn to_action(&self) -> Option<MenuAction> {
        match self {
            MenuItemId::Start => Some(MenuAction::Start),
            MenuItemId::Pause => Some(MenuAction::Pause),
            MenuItemId::Stop => Some(MenuAction::Stop),
            MenuItemId::Break => Some(MenuAction::Break),
            MenuItemId::Quit => Some(MenuAction::Quit),
            MenuItemId::Unknown => None,
        }
    }
}

// ============================================================================
// EventHandler
// ============================================================================

/// Handles menu events and converts them to actions.
#[derive(Debug, Default)]
pub struct EventHandler;

impl EventHandler {
    /// Creates a new EventHandler.
    pub fn new() -> Self {
        Self
    }

    /// Processes a menu item click and returns the corresponding action.
    pub fn handle_click(&self, item_id: MenuItemId) -> Option<MenuAction> {
        let action = item_id.to_action();

        if let Some(ref action) = action {
            tracing::info!(
                action = %action,
                "メニューバーからアクションを受信"
            );
        }

        action
    }
}

// ============================================================================
// TrayUpdate
// ============================================================================

/// Updates that can be sent to the status indicator from other parts
/// of the system.
///
/// This enum is used with crossbeam-channel to send updates from the
/// state machine (running in tokio) to the indicator (running on the
/// main thread).
#[derive(Debug, Clone)]
pub enum TrayUpdate {
    /// Update the title text displayed in the menu bar
    SetTitle(String),
    /// Update the menu items (rebuild the menu)
    RebuildMenu,
    /// Show or hide the indicator; hiding destroys the tray icon
    /// object rather than blanking its title
    SetVisible(bool),
    /// Shutdown the indicator
    Shutdown,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // ------------------------------------------------------------------------
    // MenuAction Tests
    // ------------------------------------------------------------------------

    mod menu_action_tests {
        use super::*;

        #[test]
        fn test_display() {
            assert_eq!(format!("{}", MenuAction::Start), "start");
            assert_eq!(format!("{}", MenuAction::Pause), "pause");
            assert_eq!(format!("{}", MenuAction::Stop), "stop");
            assert_eq!(format!("{}", MenuAction::Break), "break");
            assert_eq!(format!("{}", MenuAction::Quit), "quit");
        }

        #[test]
        fn test_description() {
            assert_eq!(MenuAction::Start.description(), "開始");
            assert_eq!(MenuAction::Pause.description(), "一時停止");
            assert_eq!(MenuAction::Stop.description(), "停止");
            assert_eq!(MenuAction::Break.description(), "休憩");
            assert_eq!(MenuAction::Quit.description(), "終了");
        }

        #[test]
        fn test_eq() {
            assert_eq!(MenuAction::Start, MenuAction::Start);
            assert_ne!(MenuAction::Start, MenuAction::Pause);
        }
    }

    // ------------------------------------------------------------------------
    // MenuItemId Tests
    // ------------------------------------------------------------------------

    mod menu_item_id_tests {
        use super::*;

        #[test]
        fn test_to_action() {
            assert_eq!(MenuItemId::Start.to_action(), Some(MenuAction::Start));
            assert_eq!(MenuItemId::Pause.to_action(), Some(MenuAction::Pause));
            assert_eq!(MenuItemId::Stop.to_action(), Some(MenuAction::Stop));
            assert_eq!(MenuItemId::Break.to_action(), Some(MenuAction::Break));
            assert_eq!(MenuItemId::Quit.to_action(), Some(MenuAction::Quit));
        }

        #[test]
        fn test_to_action_unknown() {
            assert_eq!(MenuItemId::Unknown.to_action(), None);
        }

        #[test]
        fn test_hash() {
            use std::collections::HashSet;

            let mut set = HashSet::new();
            set.insert(MenuItemId::Start);
            set.insert(MenuItemId::Pause);
            set.insert(MenuItemId::Stop);
            set.insert(MenuItemId::Break);
            set.insert(MenuItemId::Quit);
            set.insert(MenuItemId::Unknown);

            assert_eq!(set.len(), 6);
            assert!(set.contains(&MenuItemId::Break));
        }
    }

    // ------------------------------------------------------------------------
    // EventHandler Tests
    // ------------------------------------------------------------------------

    mod event_handler_tests {
        use super::*;

        #[test]
        fn test_handle_click_start() {
            let handler = EventHandler::new();
            assert_eq!(handler.handle_click(MenuItemId::Start), Some(MenuAction::Start));
        }

        #[test]
        fn test_handle_click_break() {
            let handler = EventHandler::new();
            assert_eq!(handler.handle_click(MenuItemId::Break), Some(MenuAction::Break));
        }

        #[test]
        fn test_handle_click_unknown() {
            let handler = EventHandler::new();
            assert_eq!(handler.handle_click(MenuItemId::Unknown), None);
        }
    }

    // ------------------------------------------------------------------------
    // TrayUpdate Tests
    // ------------------------------------------------------------------------

    mod tray_update_tests {
        use super::*;

        #[test]
        fn test_set_title() {
            let update = TrayUpdate::SetTitle("🍅 14:59".to_string());
            match update {
                TrayUpdate::SetTitle(title) => assert_eq!(title, "🍅 14:59"),
                _ => panic!("Expected SetTitle"),
            }
        }

        #[test]
        fn test_set_visible() {
            assert!(matches!(TrayUpdate::SetVisible(false), TrayUpdate::SetVisible(false)));
        }

        #[test]
        fn test_clone() {
            let update = TrayUpdate::SetTitle("test".to_string());
            let cloned = update.clone();
            match cloned {
                TrayUpdate::SetTitle(title) => assert_eq!(title, "test"),
                _ => panic!("Expected SetTitle"),
            }
        }
    }
}
