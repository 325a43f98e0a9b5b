//! Keyboard policy while a break overlay is shown.
//!
//! The global key monitor (platform layer) feeds key-down events through
//! [`BreakKey::from_keycode`]; the mapping to a dismissal action is
//! platform-independent and testable without real key events.

// ============================================================================
// BreakKey
// ============================================================================

/// macOS virtual keycode for the Escape key.
const KEYCODE_ESCAPE: u16 = 53;

/// macOS virtual keycode for the Return key.
const KEYCODE_RETURN: u16 = 36;

/// macOS virtual keycode for the keypad Enter key.
const KEYCODE_KEYPAD_ENTER: u16 = 76;

/// A key pressed while the break overlay has input focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakKey {
    /// Escape key
    Escape,
    /// Return / keypad Enter key
    Accept,
    /// Any other key (swallowed by the overlay, no action)
    Other(u16),
}

impl BreakKey {
    /// Maps a hardware keycode to a break key.
    pub fn from_keycode(keycode: u16) -> Self {
        match keycode {
            KEYCODE_ESCAPE => BreakKey::Escape,
            KEYCODE_RETURN | KEYCODE_KEYPAD_ENTER => BreakKey::Accept,
            other => BreakKey::Other(other),
        }
    }
}

// ============================================================================
// BreakKeyAction
// ============================================================================

/// Dismissal action triggered by a key press during a break.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakKeyAction {
    /// End the break without starting a new cycle
    Dismiss,
    /// End the break and immediately start a new work cycle
    DismissAndStartNew,
}

impl BreakKeyAction {
    /// Returns the action for a key, or `None` if the key does nothing.
    pub fn for_key(key: BreakKey) -> Option<Self> {
        match key {
            BreakKey::Escape => Some(BreakKeyAction::Dismiss),
            BreakKey::Accept => Some(BreakKeyAction::DismissAndStartNew),
            BreakKey::Other(_) => None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_keycode_escape() {
        assert_eq!(BreakKey::from_keycode(53), BreakKey::Escape);
    }

    #[test]
    fn test_from_keycode_return() {
        assert_eq!(BreakKey::from_keycode(36), BreakKey::Accept);
        assert_eq!(BreakKey::from_keycode(76), BreakKey::Accept);
    }

    #[test]
    fn test_from_keycode_other() {
        assert_eq!(BreakKey::from_keycode(0), BreakKey::Other(0));
        assert_eq!(BreakKey::from_keycode(125), BreakKey::Other(125));
    }

    #[test]
    fn test_escape_dismisses() {
        assert_eq!(
            BreakKeyAction::for_key(BreakKey::Escape),
            Some(BreakKeyAction::Dismiss)
        );
    }

    #[test]
    fn test_accept_starts_new_cycle() {
        assert_eq!(
            BreakKeyAction::for_key(BreakKey::Accept),
            Some(BreakKeyAction::DismissAndStartNew)
        );
    }

    #[test]
    fn test_other_keys_do_nothing() {
        assert_eq!(BreakKeyAction::for_key(BreakKey::Other(12)), None);
    }
}
