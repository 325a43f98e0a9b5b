//! Status indicator (menu bar) module.
//!
//! This module provides:
//! - Tray icon management for the macOS menu bar
//! - Real-time countdown display (e.g., "🍅 14:59")
//! - Dropdown menu with start/pause/stop/break actions
//! - Show/hide driven by the `show_status_indicator` setting
//!
//! # Architecture
//!
//! The module is split into platform-independent and platform-specific parts:
//!
//! - `icon.rs`: Title text generation (platform-independent, fully testable)
//! - `menu.rs`: Menu configuration (platform-independent, fully testable)
//! - `event.rs`: Event types and handling (platform-independent, fully testable)
//! - `mod.rs`: TrayIconManager (platform-specific on macOS)
//!
//! Hiding the indicator destroys the underlying tray icon object instead of
//! blanking its title, so a disabled indicator takes no menu bar space at
//! all. Re-enabling recreates it from the current state.
//!
//! # Usage
//!
//! The indicator is owned by the daemon's main thread. Updates are sent via
//! a crossbeam channel from the state machine (running in tokio) to the
//! indicator.
//!
//! ```ignore
//! use pomolock::menubar::{TrayIconManager, TrayUpdate};
//! use crossbeam_channel::unbounded;
//!
//! let (tx, rx) = unbounded();
//! let mut manager = TrayIconManager::new(initial_state, rx);
//! manager.initialize()?;
//!
//! // From the state machine (tokio task)
//! tx.send(TrayUpdate::SetTitle("🍅 14:59".to_string()))?;
//! ```

pub mod event;
pub mod icon;
pub mod menu;

// Re-export main types
pub use event::{EventHandler, MenuAction, MenuItemId, TrayUpdate};
pub use icon::IconManager;
pub use menu::{MenuBuilder, MenuConfig, MenuItemConfig};

use crate::types::TimerState;
use crossbeam_channel::Receiver;
use std::sync::{Arc, RwLock};

// ============================================================================
// TrayIconManager
// ============================================================================

/// Manages the status indicator and its menu.
///
/// This struct coordinates between:
/// - IconManager: generates display text
/// - MenuBuilder: configures menu items
/// - EventHandler: processes menu clicks
///
/// On macOS it also owns the actual tray-icon instance. On other
/// platforms it operates in a no-op mode.
pub struct TrayIconManager {
    /// Icon manager for title generation
    icon_manager: IconManager,
    /// Menu builder for menu configuration
    menu_builder: MenuBuilder,
    /// Event handler for menu clicks
    event_handler: EventHandler,
    /// Current timer state (shared with daemon)
    current_state: Arc<RwLock<TimerState>>,
    /// Channel for receiving updates from the state machine
    update_rx: Receiver<TrayUpdate>,
    /// Whether the indicator should be visible
    visible: bool,
    /// Whether the manager is initialized
    initialized: bool,
    /// Platform-specific tray icon instance (macOS only)
    #[cfg(target_os = "macos")]
    tray_icon: Option<tray_icon::TrayIcon>,
    /// Maps native menu item ids back to our identifiers (macOS only)
    #[cfg(target_os = "macos")]
    menu_ids: std::collections::HashMap<tray_icon::menu::MenuId, MenuItemId>,
}

impl TrayIconManager {
    /// Creates a new TrayIconManager.
    ///
    /// Visibility follows the `show_status_indicator` setting in the
    /// initial state's config.
    ///
    /// # Note
    ///
    /// On macOS, the actual tray icon is not created until `initialize()`
    /// is called, because macOS requires a running event loop first.
    pub fn new(initial_state: TimerState, update_rx: Receiver<TrayUpdate>) -> Self {
        let visible = initial_state.config.show_status_indicator;
        Self {
            icon_manager: IconManager::new(),
            menu_builder: MenuBuilder::new(),
            event_handler: EventHandler::new(),
            current_state: Arc::new(RwLock::new(initial_state)),
            update_rx,
            visible,
            initialized: false,
            #[cfg(target_os = "macos")]
            tray_icon: None,
            #[cfg(target_os = "macos")]
            menu_ids: std::collections::HashMap::new(),
        }
    }

    /// Returns a handle to the current state.
    pub fn current_state(&self) -> Arc<RwLock<TimerState>> {
        Arc::clone(&self.current_state)
    }

    /// Returns whether the manager is initialized.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Returns whether the indicator is currently visible.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Returns a reference to the event handler.
    pub fn event_handler(&self) -> &EventHandler {
        &self.event_handler
    }

    /// Generates the current title for the menu bar.
    pub fn generate_title(&self) -> String {
        let state = self.current_state.read().unwrap();
        self.icon_manager.generate_title(&state)
    }

    /// Generates the current menu configuration.
    pub fn generate_menu_config(&self) -> MenuConfig {
        let state = self.current_state.read().unwrap();
        self.menu_builder.build(&state)
    }

    /// Updates the current state.
    pub fn update_state(&self, state: TimerState) {
        let mut current = self.current_state.write().unwrap();
        *current = state;
    }

    /// Processes a pending update from the channel.
    ///
    /// Returns `true` if an update was processed, `false` if the channel
    /// was empty.
    pub fn process_pending_update(&mut self) -> bool {
        match self.update_rx.try_recv() {
            Ok(update) => {
                self.handle_update(update);
                true
            }
            Err(crossbeam_channel::TryRecvError::Empty) => false,
            Err(crossbeam_channel::TryRecvError::Disconnected) => {
                tracing::warn!("ステータス表示の更新チャネルが切断されました");
                false
            }
        }
    }

    /// Handles an update from the state machine.
    fn handle_update(&mut self, update: TrayUpdate) {
        match update {
            TrayUpdate::SetTitle(title) => {
                tracing::debug!(title = %title, "ステータス表示タイトル更新");
                #[cfg(target_os = "macos")]
                if let Some(ref tray_icon) = self.tray_icon {
                    tray_icon.set_title(Some(&title));
                }
            }
            TrayUpdate::RebuildMenu => {
                tracing::debug!("メニュー再構築");
                #[cfg(target_os = "macos")]
                if let Err(e) = self.rebuild_menu() {
                    tracing::error!("メニューの再構築に失敗しました: {:#}", e);
                }
            }
            TrayUpdate::SetVisible(visible) => {
                self.set_visible(visible);
            }
            TrayUpdate::Shutdown => {
                tracing::info!("ステータス表示をシャットダウン");
                self.shutdown();
            }
        }
    }

    /// Shows or hides the indicator.
    ///
    /// Hiding drops the tray icon object entirely; showing recreates it
    /// from the current state.
    pub fn set_visible(&mut self, visible: bool) {
        if self.visible == visible {
            return;
        }
        self.visible = visible;

        #[cfg(target_os = "macos")]
        {
            if visible {
                if self.initialized {
                    if let Err(e) = self.create_tray_icon() {
                        tracing::error!("ステータス表示の再作成に失敗しました: {:#}", e);
                    }
                }
            } else {
                self.tray_icon = None;
                tracing::info!("ステータス表示を非表示にしました");
            }
        }
    }

    /// Polls for a menu click, returning the action it maps to.
    ///
    /// Menu events arrive on tray-icon's global receiver; the native ids
    /// are resolved through the map recorded when the menu was built.
    #[cfg(target_os = "macos")]
    pub fn try_recv_menu_action(&self) -> Option<MenuAction> {
        let event = tray_icon::menu::MenuEvent::receiver().try_recv().ok()?;
        let item_id = self
            .menu_ids
            .get(event.id())
            .copied()
            .unwrap_or(MenuItemId::Unknown);
        self.event_handler.handle_click(item_id)
    }

    /// Polls for a menu click (non-macOS, always `None`).
    #[cfg(not(target_os = "macos"))]
    pub fn try_recv_menu_action(&self) -> Option<MenuAction> {
        None
    }

    /// Shuts down the tray icon.
    pub fn shutdown(&mut self) {
        self.initialized = false;
        #[cfg(target_os = "macos")]
        {
            self.tray_icon = None;
        }
    }

    /// Initializes the tray icon (macOS only).
    ///
    /// Must be called from the main thread after the event loop is running.
    ///
    /// # Errors
    ///
    /// Returns an error if the tray icon cannot be created.
    #[cfg(target_os = "macos")]
    pub fn initialize(&mut self) -> anyhow::Result<()> {
        self.initialized = true;
        if self.visible {
            self.create_tray_icon()?;
        }
        Ok(())
    }

    /// Initializes the tray icon (non-macOS, no-op).
    #[cfg(not(target_os = "macos"))]
    pub fn initialize(&mut self) -> anyhow::Result<()> {
        tracing::warn!("ステータス表示はmacOSでのみサポートされています");
        self.initialized = true;
        Ok(())
    }

    /// Creates the tray icon from the current state (macOS only).
    #[cfg(target_os = "macos")]
    fn create_tray_icon(&mut self) -> anyhow::Result<()> {
        use anyhow::Context;
        use tray_icon::TrayIconBuilder;

        let state = self.current_state.read().unwrap();
        let title = self.icon_manager.generate_title(&state);
        let menu_config = self.menu_builder.build(&state);
        drop(state);

        let menu = self.build_native_menu(&menu_config)?;

        let tray_icon = TrayIconBuilder::new()
            .with_title(&title)
            .with_menu(Box::new(menu))
            .with_tooltip("PomoLock")
            .build()
            .context("トレイアイコンの作成に失敗しました")?;

        self.tray_icon = Some(tray_icon);
        tracing::info!("ステータス表示を初期化しました");
        Ok(())
    }

    /// Replaces the menu on the existing tray icon (macOS only).
    #[cfg(target_os = "macos")]
    fn rebuild_menu(&mut self) -> anyhow::Result<()> {
        if self.tray_icon.is_none() {
            return Ok(());
        }

        let config = self.generate_menu_config();
        let menu = self.build_native_menu(&config)?;
        if let Some(ref tray_icon) = self.tray_icon {
            tray_icon.set_menu(Some(Box::new(menu)));
        }
        Ok(())
    }

    /// Builds a native menu from the configuration (macOS only).
    ///
    /// Records the native ids of the action items so clicks can be
    /// resolved back to [`MenuItemId`] values.
    #[cfg(target_os = "macos")]
    fn build_native_menu(
        &mut self,
        config: &MenuConfig,
    ) -> anyhow::Result<tray_icon::menu::Menu> {
        use tray_icon::menu::{Menu, MenuItem, PredefinedMenuItem};

        let menu = Menu::new();
        self.menu_ids.clear();

        // Title (disabled)
        let title_item = MenuItem::new(&config.title.text, false, None);
        menu.append(&title_item)?;

        menu.append(&PredefinedMenuItem::separator())?;

        // Status items (all disabled)
        for item in &config.status_items {
            let status_item = MenuItem::new(&item.text, false, None);
            menu.append(&status_item)?;
        }

        menu.append(&PredefinedMenuItem::separator())?;

        // Action items
        let start_item = MenuItem::new(&config.start.text, config.start.enabled, None);
        menu.append(&start_item)?;
        self.menu_ids.insert(start_item.id().clone(), MenuItemId::Start);

        let pause_item = MenuItem::new(&config.pause.text, config.pause.enabled, None);
        menu.append(&pause_item)?;
        self.menu_ids.insert(pause_item.id().clone(), MenuItemId::Pause);

        let stop_item = MenuItem::new(&config.stop.text, config.stop.enabled, None);
        menu.append(&stop_item)?;
        self.menu_ids.insert(stop_item.id().clone(), MenuItemId::Stop);

        let break_item =
            MenuItem::new(&config.take_break.text, config.take_break.enabled, None);
        menu.append(&break_item)?;
        self.menu_ids.insert(break_item.id().clone(), MenuItemId::Break);

        menu.append(&PredefinedMenuItem::separator())?;

        // Quit item
        let quit_item = MenuItem::new(&config.quit.text, config.quit.enabled, None);
        menu.append(&quit_item)?;
        self.menu_ids.insert(quit_item.id().clone(), MenuItemId::Quit);

        Ok(menu)
    }
}

impl std::fmt::Debug for TrayIconManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrayIconManager")
            .field("visible", &self.visible)
            .field("initialized", &self.initialized)
            .field("icon_manager", &self.icon_manager)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
