//! Notification action and category definitions.
//!
//! A break that gets torn down by a display topology change posts a
//! single notification offering to start a fresh work cycle or do
//! nothing. The identifiers here bind those buttons to the category.

use objc2::rc::Retained;
use objc2_foundation::{NSArray, NSString};
use objc2_user_notifications::{
    UNNotificationAction, UNNotificationActionOptions, UNNotificationCategory,
    UNNotificationCategoryOptions,
};

/// Notification action identifiers.
pub mod action_ids {
    /// Action ID for starting a new work cycle.
    pub const START_NEW_CYCLE: &str = "START_NEW_CYCLE_ACTION";
    /// Action ID for dismissing without starting anything.
    pub const LATER: &str = "LATER_ACTION";
}

/// Notification category identifiers.
pub mod category_ids {
    /// Category for break-interrupted notifications.
    pub const BREAK_INTERRUPTED: &str = "BREAK_INTERRUPTED";
}

/// Creates the start-new-cycle action.
#[must_use]
pub fn create_start_new_cycle_action() -> Retained<UNNotificationAction> {
    let identifier = NSString::from_str(action_ids::START_NEW_CYCLE);
    let title = NSString::from_str("新しいサイクルを開始");

    unsafe {
        UNNotificationAction::actionWithIdentifier_title_options(
            &identifier,
            &title,
            UNNotificationActionOptions::Foreground,
        )
    }
}

/// Creates the later action.
#[must_use]
pub fn create_later_action() -> Retained<UNNotificationAction> {
    let identifier = NSString::from_str(action_ids::LATER);
    let title = NSString::from_str("後で");

    unsafe {
        UNNotificationAction::actionWithIdentifier_title_options(
            &identifier,
            &title,
            UNNotificationActionOptions::empty(),
        )
    }
}

/// Creates a notification category with the given identifier and actions.
fn create_category(
    identifier: &str,
    actions: &[Retained<UNNotificationAction>],
) -> Retained<UNNotificationCategory> {
    let identifier = NSString::from_str(identifier);

    let actions_array: Retained<NSArray<UNNotificationAction>> = unsafe {
        let refs: Vec<&UNNotificationAction> = actions.iter().map(|a| a.as_ref()).collect();
        NSArray::from_slice(&refs)
    };

    let intent_identifiers: Retained<NSArray<NSString>> =
        unsafe { NSArray::from_slice(&[] as &[&NSString]) };

    unsafe {
        UNNotificationCategory::categoryWithIdentifier_actions_intentIdentifiers_options(
            &identifier,
            &actions_array,
            &intent_identifiers,
            UNNotificationCategoryOptions::empty(),
        )
    }
}

/// Creates all notification categories.
#[must_use]
pub fn create_categories() -> Vec<Retained<UNNotificationCategory>> {
    let actions = vec![create_start_new_cycle_action(), create_later_action()];

    vec![create_category(category_ids::BREAK_INTERRUPTED, &actions)]
}
