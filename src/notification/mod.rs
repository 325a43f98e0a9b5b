//! User notification bridge.
//!
//! When a break is torn down by a display topology change, the daemon
//! posts a single notification with two actions: start a new work cycle
//! or do nothing. This module provides:
//!
//! - Notification authorization handling (best-effort)
//! - The break-interrupted notification with its action buttons
//! - Delegate-based action handling, with exactly one delegate instance
//!   registered for the daemon's lifetime
//! - A platform-independent [`NotificationSender`] trait with a mock
//!   implementation for tests
//!
//! # Requirements
//!
//! - macOS 10.14+
//! - The binary must be code-signed for notifications to work:
//!   `codesign --force --deep --sign - target/release/pomolock`

pub mod error;

#[cfg(target_os = "macos")]
mod actions;
#[cfg(target_os = "macos")]
mod center;
#[cfg(target_os = "macos")]
mod content;
#[cfg(target_os = "macos")]
mod delegate;
#[cfg(target_os = "macos")]
mod request;

pub use self::error::NotificationError;

#[cfg(target_os = "macos")]
pub use self::actions::{action_ids, category_ids};
#[cfg(target_os = "macos")]
pub use self::delegate::NotificationDelegate;

// ============================================================================
// NotificationAction
// ============================================================================

/// Actions triggered from a posted notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationAction {
    /// User chose to start a new work cycle.
    StartNewCycle,
    /// User chose to do nothing for now.
    Later,
    /// User clicked the notification itself (default action).
    Default,
    /// User dismissed the notification.
    Dismissed,
}

// ============================================================================
// NotificationSender
// ============================================================================

/// Posts notifications and surfaces user responses to the daemon.
#[allow(async_fn_in_trait)]
pub trait NotificationSender {
    /// Posts the break-interrupted notification.
    async fn post_break_interrupted(&self) -> Result<(), NotificationError>;

    /// Tries to receive a user action without blocking.
    fn try_recv_action(&self) -> Option<NotificationAction>;

    /// Returns true if notifications can be posted.
    fn is_available(&self) -> bool;

    /// Removes all pending and delivered notifications.
    fn clear_all(&self);
}

// ============================================================================
// NotificationManager (macOS)
// ============================================================================

/// Manages the notification system.
///
/// Owns the single delegate instance and the channel its actions arrive
/// on. Created once by the daemon; dropping it unhooks nothing on the
/// Cocoa side, so it lives for the daemon's lifetime.
#[cfg(target_os = "macos")]
pub struct NotificationManager {
    /// Receiver for action events from the delegate.
    action_receiver: std::sync::mpsc::Receiver<NotificationAction>,
    /// Retained delegate to keep it alive.
    _delegate: objc2::rc::Retained<NotificationDelegate>,
}

#[cfg(target_os = "macos")]
impl NotificationManager {
    /// Creates a new notification manager.
    ///
    /// This will:
    /// 1. Request notification authorization from the user
    /// 2. Create and register the delegate
    /// 3. Register the break-interrupted category (action buttons)
    ///
    /// # Errors
    ///
    /// Returns an error if authorization is denied, the caller is not on
    /// the main thread, or the system notification center is unavailable.
    pub async fn new() -> Result<Self, NotificationError> {
        use objc2::MainThreadMarker;

        let mtm = MainThreadMarker::new().ok_or_else(|| {
            NotificationError::InitializationFailed(
                "通知システムはメインスレッドで初期化する必要があります".to_string(),
            )
        })?;

        let granted = center::NotificationCenter::request_authorization().await?;
        if !granted {
            return Err(NotificationError::PermissionDenied);
        }

        let (sender, receiver) = std::sync::mpsc::channel();

        // Single delegate for the daemon's lifetime
        let delegate = NotificationDelegate::new(mtm, sender);
        center::NotificationCenter::set_delegate(&NotificationDelegate::as_protocol(&delegate));

        center::NotificationCenter::set_notification_categories(&actions::create_categories());

        Ok(Self {
            action_receiver: receiver,
            _delegate: delegate,
        })
    }

    /// Creates a notification manager with fallback behavior.
    ///
    /// Returns `None` if initialization fails (with the error logged),
    /// allowing the daemon to continue without notifications.
    pub async fn new_with_fallback() -> Option<Self> {
        match Self::new().await {
            Ok(manager) => Some(manager),
            Err(NotificationError::UnsignedBinary) => {
                tracing::warn!("バイナリが署名されていません。通知機能は無効です。");
                tracing::info!(
                    "署名するには: codesign --force --deep --sign - target/release/pomolock"
                );
                None
            }
            Err(NotificationError::PermissionDenied) => {
                tracing::warn!("通知許可が拒否されています。通知機能は無効です。");
                tracing::info!("システム設定 > 通知 で許可してください。");
                None
            }
            Err(e) => {
                tracing::warn!("通知システムの初期化に失敗しました: {}", e);
                None
            }
        }
    }

    /// Checks if notifications are currently authorized.
    pub async fn is_authorized() -> Result<bool, NotificationError> {
        center::NotificationCenter::is_authorized().await
    }
}

#[cfg(target_os = "macos")]
impl NotificationSender for NotificationManager {
    async fn post_break_interrupted(&self) -> Result<(), NotificationError> {
        let content = content::create_break_interrupted_content();
        let request = request::create_notification_request(&content);
        center::NotificationCenter::add_notification_request(&request).await
    }

    fn try_recv_action(&self) -> Option<NotificationAction> {
        match self.action_receiver.try_recv() {
            Ok(action) => Some(action),
            Err(_) => None,
        }
    }

    fn is_available(&self) -> bool {
        true
    }

    fn clear_all(&self) {
        center::NotificationCenter::remove_all_pending_notifications();
        center::NotificationCenter::remove_all_delivered_notifications();
    }
}

// ============================================================================
// MockNotificationSender
// ============================================================================

/// Recording notification sender used by tests.
#[derive(Debug, Default)]
pub struct MockNotificationSender {
    posted: std::sync::Mutex<u32>,
    pending_actions: std::sync::Mutex<Vec<NotificationAction>>,
    available: std::sync::atomic::AtomicBool,
    should_fail: std::sync::atomic::AtomicBool,
}

impl MockNotificationSender {
    #[must_use]
    pub fn new() -> Self {
        Self {
            posted: std::sync::Mutex::new(0),
            pending_actions: std::sync::Mutex::new(Vec::new()),
            available: std::sync::atomic::AtomicBool::new(true),
            should_fail: std::sync::atomic::AtomicBool::new(false),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available
            .store(available, std::sync::atomic::Ordering::SeqCst);
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail
            .store(should_fail, std::sync::atomic::Ordering::SeqCst);
    }

    /// Queues an action as if the user had clicked a notification button.
    pub fn inject_action(&self, action: NotificationAction) {
        self.pending_actions.lock().unwrap().push(action);
    }

    /// Number of break-interrupted notifications posted so far.
    #[must_use]
    pub fn posted_count(&self) -> u32 {
        *self.posted.lock().unwrap()
    }
}

impl NotificationSender for MockNotificationSender {
    async fn post_break_interrupted(&self) -> Result<(), NotificationError> {
        if self.should_fail.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(NotificationError::SendFailed("mock failure".to_string()));
        }
        *self.posted.lock().unwrap() += 1;
        Ok(())
    }

    fn try_recv_action(&self) -> Option<NotificationAction> {
        let mut actions = self.pending_actions.lock().unwrap();
        if actions.is_empty() {
            None
        } else {
            Some(actions.remove(0))
        }
    }

    fn is_available(&self) -> bool {
        self.available.load(std::sync::atomic::Ordering::SeqCst)
    }

    fn clear_all(&self) {
        // No-op for mock
    }
}
