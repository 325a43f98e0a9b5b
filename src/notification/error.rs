//! Notification system error types.

use thiserror::Error;

/// Errors that can occur in the notification system.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// Failed to request notification authorization from the system.
    #[error("通知許可の取得に失敗しました: {0}")]
    AuthorizationFailed(String),

    /// Failed to post a notification.
    #[error("通知の送信に失敗しました: {0}")]
    SendFailed(String),

    /// Notification permission was denied by the user.
    #[error("通知許可が拒否されています")]
    PermissionDenied,

    /// The binary is not code-signed (required for notifications on macOS).
    #[error("バイナリが署名されていません。codesignで署名してください")]
    UnsignedBinary,

    /// Failed to initialize the notification system.
    #[error("通知システムの初期化に失敗しました: {0}")]
    InitializationFailed(String),

    /// The notification center is not available.
    #[error("通知センターが利用できません")]
    NotAvailable,
}

impl NotificationError {
    /// Returns true if this error is related to permissions.
    #[must_use]
    pub fn is_permission_error(&self) -> bool {
        matches!(
            self,
            Self::PermissionDenied | Self::AuthorizationFailed(_)
        )
    }

    /// Returns a user-friendly suggestion for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::AuthorizationFailed(_) | Self::PermissionDenied => {
                "システム設定 > 通知 でアプリの通知を許可してください"
            }
            Self::UnsignedBinary => {
                "codesign --force --deep --sign - target/release/pomolock"
            }
            Self::SendFailed(_) => "通知センターを確認してください",
            Self::InitializationFailed(_) => "アプリケーションを再起動してください",
            Self::NotAvailable => "macOSで実行してください",
        }
    }
}
