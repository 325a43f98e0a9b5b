//! Power management error types.

use thiserror::Error;

/// Errors that can occur while holding off system sleep.
///
/// Acquisition failures are logged by the caller and never block a mode
/// transition.
#[derive(Debug, Error)]
pub enum PowerError {
    /// The caffeinate helper binary is not present.
    #[error("caffeinateコマンドが見つかりません: {0}")]
    HelperNotFound(String),

    /// Spawning the assertion helper failed.
    #[error("スリープ抑制の開始に失敗しました: {0}")]
    AcquireFailed(String),

    /// Releasing the assertion failed.
    #[error("スリープ抑制の解除に失敗しました: {0}")]
    ReleaseFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PowerError::HelperNotFound("/usr/bin/caffeinate".to_string());
        assert!(err.to_string().contains("/usr/bin/caffeinate"));

        let err = PowerError::AcquireFailed("spawn failed".to_string());
        assert!(err.to_string().contains("spawn failed"));

        let err = PowerError::ReleaseFailed("kill failed".to_string());
        assert!(err.to_string().contains("kill failed"));
    }
}
