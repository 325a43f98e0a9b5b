//! Notification delegate implementation.
//!
//! Implements the `UNUserNotificationCenterDelegate` protocol to handle
//! notification events such as action button clicks. Exactly one delegate
//! instance is created by the manager and registered with the center; it
//! stays alive for the daemon's lifetime.

use std::sync::mpsc::Sender;

use block2::Block;
use objc2::rc::Retained;
use objc2::runtime::ProtocolObject;
use objc2::{define_class, msg_send, DefinedClass, MainThreadMarker, MainThreadOnly};
use objc2_foundation::{NSObject, NSObjectProtocol};
use objc2_user_notifications::{
    UNNotification, UNNotificationPresentationOptions, UNNotificationResponse,
    UNUserNotificationCenter, UNUserNotificationCenterDelegate,
};

use super::actions::action_ids;
use super::NotificationAction;

/// Instance variables for the notification delegate.
#[derive(Clone)]
pub struct NotificationDelegateIvars {
    /// Channel sender for notification action events.
    pub action_sender: Sender<NotificationAction>,
}

define_class!(
    /// Delegate that handles notification events.
    ///
    /// Receives callbacks when the user interacts with a posted
    /// notification and forwards them to the daemon as actions.
    // SAFETY:
    // - The superclass NSObject does not have any subclassing requirements.
    // - `NotificationDelegate` does not implement `Drop`.
    #[unsafe(super(NSObject))]
    #[ivars = NotificationDelegateIvars]
    #[name = "PomoLockNotificationDelegate"]
    #[thread_kind = MainThreadOnly]
    pub struct NotificationDelegate;

    impl NotificationDelegate {}

    unsafe impl NSObjectProtocol for NotificationDelegate {}

    unsafe impl UNUserNotificationCenterDelegate for NotificationDelegate {
        /// Called when a notification is about to be presented while the
        /// app is in the foreground.
        #[unsafe(method(userNotificationCenter:willPresentNotification:withCompletionHandler:))]
        fn will_present_notification(
            &self,
            _center: &UNUserNotificationCenter,
            _notification: &UNNotification,
            completion_handler: &Block<dyn Fn(UNNotificationPresentationOptions)>,
        ) {
            // Show notification even when the app is in the foreground
            let options = UNNotificationPresentationOptions::Banner
                | UNNotificationPresentationOptions::Sound;

            completion_handler.call((options,));
        }

        /// Called when the user interacts with a notification.
        #[unsafe(method(userNotificationCenter:didReceiveNotificationResponse:withCompletionHandler:))]
        fn did_receive_notification_response(
            &self,
            _center: &UNUserNotificationCenter,
            response: &UNNotificationResponse,
            completion_handler: &Block<dyn Fn()>,
        ) {
            let action_identifier = response.actionIdentifier();
            let action_str = action_identifier.to_string();

            let action = match action_str.as_str() {
                id if id == action_ids::START_NEW_CYCLE => {
                    Some(NotificationAction::StartNewCycle)
                }
                id if id == action_ids::LATER => Some(NotificationAction::Later),
                "com.apple.UNNotificationDefaultActionIdentifier" => {
                    Some(NotificationAction::Default)
                }
                "com.apple.UNNotificationDismissActionIdentifier" => {
                    Some(NotificationAction::Dismissed)
                }
                _ => None,
            };

            if let Some(action) = action {
                let _ = self.ivars().action_sender.send(action);
            }

            // Must call completion handler
            completion_handler.call(());
        }
    }
);

impl NotificationDelegate {
    /// Creates a new notification delegate.
    #[must_use]
    pub fn new(
        mtm: MainThreadMarker,
        action_sender: Sender<NotificationAction>,
    ) -> Retained<Self> {
        let ivars = NotificationDelegateIvars { action_sender };
        let this = Self::alloc(mtm).set_ivars(ivars);
        unsafe { msg_send![super(this), init] }
    }

    /// Converts a retained delegate to a protocol object.
    #[must_use]
    pub fn as_protocol(
        delegate: &Retained<Self>,
    ) -> Retained<ProtocolObject<dyn UNUserNotificationCenterDelegate>> {
        ProtocolObject::from_retained(delegate.clone())
    }
}
