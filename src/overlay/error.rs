//! Overlay system error types.

use thiserror::Error;

/// Errors that can occur while managing break overlays.
///
/// None of these are fatal: a failed overlay leaves the state machine
/// untouched and is only surfaced through logging.
#[derive(Debug, Error)]
pub enum OverlayError {
    /// The backend could not create a window for a display.
    #[error("オーバーレイウィンドウの作成に失敗しました: {0}")]
    CreationFailed(String),

    /// The backend was used off the main thread.
    #[error("オーバーレイはメインスレッドでのみ操作できます: {0}")]
    NotMainThread(String),

    /// The platform has no overlay support.
    #[error("このプラットフォームではオーバーレイを利用できません")]
    BackendUnavailable,

    /// A handle was used after it had been destroyed.
    #[error("破棄済みのオーバーレイハンドルです: {0}")]
    StaleHandle(u64),
}
