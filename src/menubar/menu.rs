//! Menu building and item state management for the status indicator.
//!
//! This module handles:
//! - Menu item configuration and state
//! - Determining which menu items should be enabled based on the machine phase
//!
//! The configuration logic is platform-independent and fully testable.
//! Actual menu creation using tray-icon is done in the platform-specific code.

use crate::types::{MachinePhase, TimerState};

// ============================================================================
// MenuItemConfig
// ============================================================================

/// Configuration for a menu item.
#[derive(Debug, Clone)]
pub struct MenuItemConfig {
    /// Display text for the menu item
    pub text: String,
    /// Whether the menu item is enabled (clickable)
    pub enabled: bool,
}

impl MenuItemConfig {
    /// Creates a new menu item configuration.
    pub fn new(text: impl Into<String>, enabled: bool) -> Self {
        Self {
            text: text.into(),
            enabled,
        }
    }
}

// ============================================================================
// MenuConfig
// ============================================================================

/// Complete menu configuration based on current timer state.
#[derive(Debug, Clone)]
pub struct MenuConfig {
    /// Title item (always disabled, shows app name)
    pub title: MenuItemConfig,
    /// Status info items (always disabled, show current state)
    pub status_items: Vec<MenuItemConfig>,
    /// Start button
    pub start: MenuItemConfig,
    /// Pause button
    pub pause: MenuItemConfig,
    /// Stop button
    pub stop: MenuItemConfig,
    /// Break-now button
    pub take_break: MenuItemConfig,
    /// Quit button (always enabled)
    pub quit: MenuItemConfig,
}

// ============================================================================
// MenuBuilder
// ============================================================================

/// Builds menu configuration based on timer state.
#[derive(Debug, Default)]
pub struct MenuBuilder;

impl MenuBuilder {
    /// Creates a new MenuBuilder.
    pub fn new() -> Self {
        Self
    }

    /// Builds a complete menu configuration for the current timer state.
    pub fn build(&self, state: &TimerState) -> MenuConfig {
        let phase = state.phase();

        MenuConfig {
            title: MenuItemConfig::new("PomoLock", false),
            status_items: self.build_status_items(state),
            start: MenuItemConfig::new("▶ 開始", Self::is_start_enabled(phase)),
            pause: MenuItemConfig::new("⏸ 一時停止", Self::is_pause_enabled(phase)),
            stop: MenuItemConfig::new("⏹ 停止", Self::is_stop_enabled(phase)),
            take_break: MenuItemConfig::new("☕ 今すぐ休憩", Self::is_break_enabled(phase)),
            quit: MenuItemConfig::new("終了", true),
        }
    }

    /// Builds the status display items.
    fn build_status_items(&self, state: &TimerState) -> Vec<MenuItemConfig> {
        let phase_text = match state.phase() {
            MachinePhase::Idle => "待機中",
            MachinePhase::Working => "作業中",
            MachinePhase::OnBreak => "休憩中",
            MachinePhase::BreakExpired => "休憩終了待ち",
        };

        let minutes = state.remaining_seconds / 60;
        let seconds = state.remaining_seconds % 60;

        vec![
            MenuItemConfig::new(phase_text, false),
            MenuItemConfig::new(format!("残り時間: {:02}:{:02}", minutes, seconds), false),
        ]
    }

    /// Start is enabled whenever the work countdown is not running.
    pub fn is_start_enabled(phase: MachinePhase) -> bool {
        matches!(phase, MachinePhase::Idle)
    }

    /// Pause is enabled only while working.
    pub fn is_pause_enabled(phase: MachinePhase) -> bool {
        phase == MachinePhase::Working
    }

    /// Stop is enabled whenever something is in progress.
    pub fn is_stop_enabled(phase: MachinePhase) -> bool {
        phase != MachinePhase::Idle
    }

    /// Break-now is enabled unless a break is already showing.
    pub fn is_break_enabled(phase: MachinePhase) -> bool {
        !matches!(phase, MachinePhase::OnBreak | MachinePhase::BreakExpired)
    }
}

// ============================================================================
// Tests
// ============================================================================
