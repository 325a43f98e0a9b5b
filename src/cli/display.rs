//! Output formatting for the PomoLock CLI.
//!
//! This module provides formatted output for:
//! - Success messages
//! - Error messages
//! - Status display

use crate::types::IpcResponse;

// ============================================================================
// Output
// ============================================================================

/// Output formatting utilities for CLI commands.
pub struct Output;

impl Output {
    /// Shows a success message for timer start.
    pub fn show_start_success(response: &IpcResponse) {
        println!("* タイマーを開始しました");
        Self::show_remaining(response);
    }

    /// Shows a success message for timer pause.
    pub fn show_pause_success(response: &IpcResponse) {
        println!("|| タイマーを一時停止しました");
        Self::show_remaining(response);
    }

    /// Shows a success message for timer stop.
    pub fn show_stop_success(_response: &IpcResponse) {
        println!("[] タイマーを停止しました");
    }

    /// Shows a success message for timer reset.
    pub fn show_reset_success(response: &IpcResponse) {
        println!("* タイマーをリセットしました");
        Self::show_remaining(response);
    }

    /// Shows a success message for break start.
    pub fn show_break_success(response: &IpcResponse) {
        println!("* 休憩を開始しました");
        Self::show_remaining(response);
    }

    /// Shows a success message for break dismissal.
    pub fn show_dismiss_success(response: &IpcResponse) {
        println!("* {}", response.message);
    }

    /// Shows a success message for a settings update.
    pub fn show_set_success(response: &IpcResponse) {
        println!("* 設定を更新しました");
        Self::show_remaining(response);
    }

    /// Shows the current timer status.
    pub fn show_status(response: &IpcResponse) {
        println!("PomoLock ステータス");
        println!("─────────────────────────────");

        if let Some(data) = &response.data {
            let phase = data.phase.as_deref().unwrap_or("unknown");
            let phase_display = match phase {
                "idle" => "待機中",
                "working" => "作業中",
                "on_break" => "休憩中",
                "break_expired" => "休憩終了待ち",
                _ => phase,
            };
            println!("状態: {}", phase_display);

            if let Some(remaining) = data.remaining_seconds {
                let (minutes, seconds) = Self::format_time(remaining);
                println!("残り時間: {}:{:02}", minutes, seconds);
            }
            if let Some(count) = data.overlay_count {
                if count > 0 {
                    println!("オーバーレイ: {}枚", count);
                }
            }
        } else {
            println!("タイマーは起動していません");
        }
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("エラー: {}", message);
    }

    /// Prints the remaining time line, if the response carries one.
    fn show_remaining(response: &IpcResponse) {
        if let Some(data) = &response.data {
            if let Some(remaining) = data.remaining_seconds {
                let (minutes, seconds) = Self::format_time(remaining);
                println!("  残り時間: {}:{:02}", minutes, seconds);
            }
        }
    }

    /// Formats remaining seconds as (minutes, seconds).
    fn format_time(total_seconds: u32) -> (u32, u32) {
        let minutes = total_seconds / 60;
        let seconds = total_seconds % 60;
        (minutes, seconds)
    }
}

// ============================================================================
// Tests
// ============================================================================
