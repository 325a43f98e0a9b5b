//! Core data types for Pomolock.
//!
//! This module defines the data structures used for:
//! - Timer configuration with validation
//! - Timer/mode state management
//! - IPC request/response serialization

use serde::{Deserialize, Serialize};

// ============================================================================
// TimerMode
// ============================================================================

/// The two alternating intervals of the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerMode {
    /// Focus period before a break
    Work,
    /// Break period (overlay shown)
    Break,
}

impl TimerMode {
    /// Returns the string representation of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerMode::Work => "work",
            TimerMode::Break => "break",
        }
    }
}

impl Default for TimerMode {
    fn default() -> Self {
        TimerMode::Work
    }
}

// ============================================================================
// MachinePhase
// ============================================================================

/// Derived phase of the state machine, used for status reporting.
///
/// Unlike [`TimerMode`], the phase also reflects whether the countdown is
/// running and whether an expired break is waiting for the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MachinePhase {
    /// Timer is not counting down
    Idle,
    /// Counting down a work interval
    Working,
    /// Counting down a break interval (overlay shown)
    OnBreak,
    /// Break countdown hit zero with auto-end disabled; overlay stays up
    /// until the user or a notification action dismisses it
    BreakExpired,
}

impl MachinePhase {
    /// Returns the string representation of the phase.
    pub fn as_str(&self) -> &'static str {
        match self {
            MachinePhase::Idle => "idle",
            MachinePhase::Working => "working",
            MachinePhase::OnBreak => "on_break",
            MachinePhase::BreakExpired => "break_expired",
        }
    }
}

// ============================================================================
// TimerConfig
// ============================================================================

/// Maximum work duration in seconds (2 hours).
pub const MAX_WORK_SECONDS: u32 = 2 * 60 * 60;

/// Maximum break duration in seconds (1 hour).
pub const MAX_BREAK_SECONDS: u32 = 60 * 60;

/// Configuration for the break-lock timer.
///
/// Durations are mutated only through the setters on [`TimerState`] so that
/// `remaining_seconds` can never go stale relative to the active duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerConfig {
    /// Work duration in seconds (1..=7200)
    pub work_seconds: u32,
    /// Break duration in seconds (1..=3600)
    pub break_seconds: u32,
    /// Whether the break overlay is dismissed automatically when the
    /// break countdown expires
    pub auto_end_break: bool,
    /// Whether the menu bar countdown is shown
    pub show_status_indicator: bool,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            work_seconds: 15 * 60,
            break_seconds: 5 * 60,
            auto_end_break: true,
            show_status_indicator: true,
        }
    }
}

impl TimerConfig {
    /// Creates a new configuration with the specified work duration.
    pub fn with_work_seconds(mut self, seconds: u32) -> Self {
        self.work_seconds = seconds;
        self
    }

    /// Creates a new configuration with the specified break duration.
    pub fn with_break_seconds(mut self, seconds: u32) -> Self {
        self.break_seconds = seconds;
        self
    }

    /// Creates a new configuration with the specified auto-end flag.
    pub fn with_auto_end_break(mut self, auto_end: bool) -> Self {
        self.auto_end_break = auto_end;
        self
    }

    /// Returns the configured duration for the given mode.
    pub fn duration_for(&self, mode: TimerMode) -> u32 {
        match mode {
            TimerMode::Work => self.work_seconds,
            TimerMode::Break => self.break_seconds,
        }
    }

    /// Validates the configuration.
    ///
    /// Returns an error message if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        if self.work_seconds < 1 || self.work_seconds > MAX_WORK_SECONDS {
            return Err("作業時間は1秒〜2時間の範囲で指定してください".to_string());
        }
        if self.break_seconds < 1 || self.break_seconds > MAX_BREAK_SECONDS {
            return Err("休憩時間は1秒〜1時間の範囲で指定してください".to_string());
        }
        Ok(())
    }
}

// ============================================================================
// TimerState
// ============================================================================

/// Represents the current state of the timer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerState {
    /// Current mode (work or break)
    pub mode: TimerMode,
    /// Whether the countdown is ticking
    pub is_running: bool,
    /// Remaining seconds in the current interval
    pub remaining_seconds: u32,
    /// Timer configuration
    pub config: TimerConfig,
}

impl TimerState {
    /// Creates a new TimerState in idle work mode, ready to count down
    /// a full work interval.
    pub fn new(config: TimerConfig) -> Self {
        Self {
            mode: TimerMode::Work,
            is_running: false,
            remaining_seconds: config.work_seconds,
            config,
        }
    }

    /// Resets `remaining_seconds` to the configured duration for the
    /// current mode. Does not alter `is_running`.
    pub fn reset_remaining(&mut self) {
        self.remaining_seconds = self.config.duration_for(self.mode);
    }

    /// Switches to the given mode and resets the countdown.
    pub fn enter_mode(&mut self, mode: TimerMode) {
        self.mode = mode;
        self.reset_remaining();
    }

    /// Decrements the countdown by one second.
    ///
    /// Returns true if the countdown has reached 0.
    pub fn tick(&mut self) -> bool {
        if self.remaining_seconds > 0 {
            self.remaining_seconds -= 1;
        }
        self.remaining_seconds == 0
    }

    /// Sets the work duration, resetting the countdown if work is the
    /// active mode.
    pub fn set_work_seconds(&mut self, seconds: u32) {
        self.config.work_seconds = seconds;
        if self.mode == TimerMode::Work {
            self.reset_remaining();
        }
    }

    /// Sets the break duration, resetting the countdown if break is the
    /// active mode.
    pub fn set_break_seconds(&mut self, seconds: u32) {
        self.config.break_seconds = seconds;
        if self.mode == TimerMode::Break {
            self.reset_remaining();
        }
    }

    /// Returns the derived machine phase.
    pub fn phase(&self) -> MachinePhase {
        match (self.mode, self.is_running) {
            (TimerMode::Break, true) => MachinePhase::OnBreak,
            (TimerMode::Break, false)
                if self.remaining_seconds == 0 && !self.config.auto_end_break =>
            {
                MachinePhase::BreakExpired
            }
            (TimerMode::Break, false) => MachinePhase::Idle,
            (TimerMode::Work, true) => MachinePhase::Working,
            (TimerMode::Work, false) => MachinePhase::Idle,
        }
    }
}

// ============================================================================
// IPC Types
// ============================================================================

/// Configuration parameters for the set command.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigParams {
    /// Work duration in minutes
    #[serde(rename = "workMinutes", skip_serializing_if = "Option::is_none")]
    pub work_minutes: Option<u32>,
    /// Break duration in minutes
    #[serde(rename = "breakMinutes", skip_serializing_if = "Option::is_none")]
    pub break_minutes: Option<u32>,
    /// Auto-end-break flag
    #[serde(rename = "autoEndBreak", skip_serializing_if = "Option::is_none")]
    pub auto_end_break: Option<bool>,
    /// Menu bar countdown visibility
    #[serde(rename = "showIndicator", skip_serializing_if = "Option::is_none")]
    pub show_indicator: Option<bool>,
}

impl ConfigParams {
    /// Returns true if no parameter is set.
    pub fn is_empty(&self) -> bool {
        self.work_minutes.is_none()
            && self.break_minutes.is_none()
            && self.auto_end_break.is_none()
            && self.show_indicator.is_none()
    }
}

/// IPC request from client to daemon.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "lowercase")]
pub enum IpcRequest {
    /// Start (or resume) the countdown in the current mode
    Start,
    /// Pause the countdown
    Pause,
    /// Halt the countdown and refill it to the current mode's duration
    Stop,
    /// Reset the countdown without altering the running flag
    Reset,
    /// Force break mode immediately (overlay + inhibitor)
    Break,
    /// Dismiss the break overlay
    Dismiss {
        /// Whether to immediately start a new work cycle
        #[serde(rename = "startNew", default)]
        start_new: bool,
    },
    /// Update configuration
    Set {
        /// Configuration parameters
        #[serde(flatten)]
        params: ConfigParams,
    },
    /// Query the current status
    Status,
}

/// Response data for IPC responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponseData {
    /// Current mode ("work" or "break")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    /// Derived machine phase
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    /// Whether the countdown is ticking
    #[serde(rename = "isRunning", skip_serializing_if = "Option::is_none")]
    pub is_running: Option<bool>,
    /// Remaining seconds
    #[serde(rename = "remainingSeconds", skip_serializing_if = "Option::is_none")]
    pub remaining_seconds: Option<u32>,
    /// Number of live break overlays
    #[serde(rename = "overlayCount", skip_serializing_if = "Option::is_none")]
    pub overlay_count: Option<usize>,
}

impl ResponseData {
    /// Creates response data from timer state.
    pub fn from_timer_state(state: &TimerState) -> Self {
        Self {
            mode: Some(state.mode.as_str().to_string()),
            phase: Some(state.phase().as_str().to_string()),
            is_running: Some(state.is_running),
            remaining_seconds: Some(state.remaining_seconds),
            overlay_count: None,
        }
    }

    /// Attaches the live overlay count.
    pub fn with_overlay_count(mut self, count: usize) -> Self {
        self.overlay_count = Some(count);
        self
    }
}

/// IPC response from daemon to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpcResponse {
    /// Response status ("success" or "error")
    pub status: String,
    /// Human-readable message
    pub message: String,
    /// Optional response data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseData>,
}

impl IpcResponse {
    /// Creates a success response.
    pub fn success(message: impl Into<String>, data: Option<ResponseData>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
            data,
        }
    }

    /// Creates an error response.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            data: None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
