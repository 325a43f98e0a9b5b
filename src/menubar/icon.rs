//! Icon and title generation for the status indicator.
//!
//! This module handles:
//! - Generating display text for the menu bar (e.g., "🍅 14:59")
//!
//! The text generation logic is platform-independent and fully testable.

use crate::types::{TimerMode, TimerState};

// ============================================================================
// Constants
// ============================================================================

/// Glyph shown during a work session
const WORK_GLYPH: &str = "🍅";

/// Glyph shown during a break
const BREAK_GLYPH: &str = "☕";

// ============================================================================
// IconManager
// ============================================================================

/// Generates the menu bar title from the current timer state.
///
/// The indicator always shows the mode glyph plus the remaining time,
/// whether or not the countdown is running, so a paused timer still
/// reads "🍅 12:34".
#[derive(Debug, Default)]
pub struct IconManager;

impl IconManager {
    /// Creates a new IconManager.
    pub fn new() -> Self {
        Self
    }

    /// Generates the title text for display in the menu bar.
    ///
    /// Format:
    /// - Work mode: "🍅 MM:SS"
    /// - Break mode: "☕ MM:SS"
    pub fn generate_title(&self, state: &TimerState) -> String {
        format!(
            "{} {}",
            self.get_glyph(state.mode),
            Self::format_time(state.remaining_seconds)
        )
    }

    /// Returns the glyph for the given mode.
    pub fn get_glyph(&self, mode: TimerMode) -> &'static str {
        match mode {
            TimerMode::Work => WORK_GLYPH,
            TimerMode::Break => BREAK_GLYPH,
        }
    }

    /// Formats remaining time as an MM:SS string.
    ///
    /// Minutes overflow past two digits rather than wrapping, so a
    /// two-hour work session reads "120:00".
    pub fn format_time(remaining_seconds: u32) -> String {
        let minutes = remaining_seconds / 60;
        let seconds = remaining_seconds % 60;
        format!("{:02}:{:02}", minutes, seconds)
    }
}

// ============================================================================
// Tests
// ============================================================================
