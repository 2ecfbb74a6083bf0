//! The event router tying config, registry, shortcuts and tray together.
//!
//! A [`Shell`] is driven by its host: call [`Shell::start`] once the host is
//! ready, then feed every host event through [`Shell::handle`] on the same
//! thread. The shell never blocks and never holds onto the host between
//! events.

use std::{path::PathBuf, result::Result as StdResult};

use config::Config;
use tracing::{debug, error, info, warn};

use crate::{
    Result,
    dispatch::{self, Route},
    geometry::PanelSize,
    host::{Host, HotkeyId, Theme, ViewId},
    input::{KeyInput, NavCommand},
    registry::{CachePolicy, Registry},
    shortcuts::{ShortcutAction, ShortcutManager},
    tray::{MenuId, TrayAction, TrayController},
};

/// Title of every error dialog.
const ERROR_TITLE: &str = "Error";

/// Everything a host reports to the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellEvent {
    /// A registered global hotkey fired.
    Hotkey(HotkeyId),
    /// A tray menu entry was clicked.
    Menu(MenuId),
    /// An activation URL arrived (protocol handler or second instance).
    OpenUrl(String),
    /// A view's first page load completed or failed.
    LoadFinished {
        /// View that loaded.
        view: ViewId,
        /// `Err` carries the renderer's failure description.
        result: StdResult<(), String>,
    },
    /// A view's content closed itself.
    ViewDestroyed(ViewId),
    /// A key event inside a view, before the page handles it.
    KeyInput {
        /// View with keyboard focus.
        view: ViewId,
        /// The key event.
        input: KeyInput,
    },
    /// The system appearance changed.
    ThemeChanged(Theme),
    /// The panel gained focus.
    PanelFocused,
    /// The panel lost focus.
    PanelBlurred,
    /// The window manager asked to close the panel.
    PanelCloseRequested,
}

/// Whether the host should keep running after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep processing events.
    Continue,
    /// Tear down and exit.
    Exit,
}

/// Application state for one running popcorn process.
#[derive(Debug)]
pub struct Shell {
    /// Active configuration. Replaced only by a successful reload.
    config: Config,
    /// Where the configuration was read from.
    config_path: PathBuf,
    /// Panel and views.
    registry: Registry,
    /// Global hotkeys.
    shortcuts: ShortcutManager,
    /// Tray menu.
    tray: TrayController,
    /// Set once quit was requested.
    quitting: bool,
}

impl Shell {
    /// Create a shell for an already-validated `config`.
    pub fn new(config: Config, config_path: PathBuf) -> Self {
        let registry = Registry::new(
            PanelSize::from_config(&config),
            CachePolicy::from_config(&config),
        );
        Self {
            config,
            config_path,
            registry,
            shortcuts: ShortcutManager::new(),
            tray: TrayController::new(),
            quitting: false,
        }
    }

    /// Install the tray menu and hotkeys, then open the default app.
    ///
    /// A global shortcut the host refuses is fatal here, unlike on reload.
    pub fn start<H: Host + ?Sized>(&mut self, host: &mut H) -> Result<()> {
        let theme = host.theme();
        self.registry.set_theme(host, theme);
        self.tray.rebuild(host, &self.config);
        self.shortcuts.bind(host, &self.config)?;
        info!(
            apps = self.config.apps.len(),
            config = %self.config_path.display(),
            "popcorn started"
        );
        self.toggle_default(host);
        Ok(())
    }

    /// Route one host event.
    pub fn handle<H: Host + ?Sized>(&mut self, host: &mut H, event: ShellEvent) -> Flow {
        match event {
            ShellEvent::Hotkey(id) => self.on_hotkey(host, id),
            ShellEvent::Menu(id) => return self.on_menu(host, &id),
            ShellEvent::OpenUrl(url) => self.open_url(host, &url),
            ShellEvent::LoadFinished { view, result } => {
                self.registry.on_load_finished(host, view, result);
            }
            ShellEvent::ViewDestroyed(view) => self.registry.on_view_destroyed(host, view),
            ShellEvent::KeyInput { view, input } => self.on_key(host, view, &input),
            ShellEvent::ThemeChanged(theme) => self.registry.set_theme(host, theme),
            ShellEvent::PanelFocused => self.registry.on_panel_focused(host),
            ShellEvent::PanelBlurred => self.registry.on_panel_blurred(host),
            ShellEvent::PanelCloseRequested => {
                if !self.quitting {
                    host.hide_panel();
                }
            }
        }
        if self.quitting {
            Flow::Exit
        } else {
            Flow::Continue
        }
    }

    /// Toggle `url` under `identity`. Host failures are logged and dropped.
    pub fn toggle<H: Host + ?Sized>(&mut self, host: &mut H, url: &str, identity: Option<&str>) {
        match self.registry.toggle(host, url, identity) {
            Ok(outcome) => debug!(?identity, ?outcome, "toggled"),
            Err(e) => error!(?identity, url, "toggle failed: {}", e),
        }
    }

    /// Route an activation URL; unknown apps and garbage input get a dialog.
    pub fn open_url<H: Host + ?Sized>(&mut self, host: &mut H, raw: &str) {
        match dispatch::route(raw, &self.config) {
            Ok(Route::App { name, url }) => self.toggle(host, &url, Some(&name)),
            Ok(Route::AdHoc(url)) => self.toggle(host, &url, None),
            Err(e) => {
                warn!(url = raw, "cannot open: {}", e);
                host.show_error(ERROR_TITLE, &e.user_message());
            }
        }
    }

    /// Re-read the config file and swap it in.
    ///
    /// On a load or validation failure nothing changes: the previous config,
    /// bindings and menu stay active and an error dialog is shown.
    pub fn reload_config<H: Host + ?Sized>(&mut self, host: &mut H) -> Result<()> {
        let config = match config::load_from_path(&self.config_path) {
            Ok(config) => config,
            Err(e) => {
                error!("config reload failed: {}", e);
                host.show_error(ERROR_TITLE, &e.pretty());
                return Err(e.into());
            }
        };
        self.config = config;
        self.registry.reconfigure(
            host,
            PanelSize::from_config(&self.config),
            CachePolicy::from_config(&self.config),
        );
        let bound = self.shortcuts.bind(host, &self.config);
        self.tray.rebuild(host, &self.config);
        if let Err(e) = bound {
            error!("{}", e);
            host.show_error(ERROR_TITLE, &e.user_message());
            return Err(e);
        }
        info!(apps = self.config.apps.len(), "config reloaded");
        Ok(())
    }

    /// Open the config file in the user's default editor.
    pub fn edit_config<H: Host + ?Sized>(&self, host: &mut H) {
        debug!(path = %self.config_path.display(), "opening config");
        host.open_path(&self.config_path);
    }

    /// Release hotkeys, let the panel close and stop the host.
    pub fn quit<H: Host + ?Sized>(&mut self, host: &mut H) {
        info!("quitting");
        self.quitting = true;
        self.shortcuts.clear(host);
        if self.registry.has_panel() {
            host.set_panel_closable(true);
        }
        host.quit();
    }

    /// Active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Path the configuration is read from.
    pub fn config_path(&self) -> &PathBuf {
        &self.config_path
    }

    /// Panel and view state.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Hotkey bindings.
    pub fn shortcuts(&self) -> &ShortcutManager {
        &self.shortcuts
    }

    /// Tray menu state.
    pub fn tray(&self) -> &TrayController {
        &self.tray
    }

    /// Toggle the configured default app.
    fn toggle_default<H: Host + ?Sized>(&mut self, host: &mut H) {
        let Some(app) = self.config.default_entry() else {
            host.show_error(ERROR_TITLE, "No default app configured");
            return;
        };
        let (name, url) = (app.name.clone(), app.url.clone());
        self.toggle(host, &url, Some(&name));
    }

    /// A global hotkey fired.
    fn on_hotkey<H: Host + ?Sized>(&mut self, host: &mut H, id: HotkeyId) {
        let Some(action) = self.shortcuts.action(id).cloned() else {
            debug!(?id, "hotkey without binding");
            return;
        };
        match action {
            ShortcutAction::TogglePanel => {
                if !self.registry.toggle_panel(host) {
                    self.toggle_default(host);
                }
            }
            ShortcutAction::ToggleApp { name, url } => self.toggle(host, &url, Some(&name)),
        }
    }

    /// A tray entry was clicked.
    fn on_menu<H: Host + ?Sized>(&mut self, host: &mut H, id: &MenuId) -> Flow {
        let Some(action) = self.tray.action(id).cloned() else {
            debug!(?id, "menu click without action");
            return Flow::Continue;
        };
        match action {
            TrayAction::ToggleApp { name, url } => self.toggle(host, &url, Some(&name)),
            TrayAction::EditConfig => self.edit_config(host),
            TrayAction::ReloadConfig => {
                if let Err(e) = self.reload_config(host) {
                    debug!("reload abandoned: {}", e);
                }
            }
            TrayAction::Quit => {
                self.quit(host);
                return Flow::Exit;
            }
        }
        Flow::Continue
    }

    /// A key event arrived from a view.
    fn on_key<H: Host + ?Sized>(&mut self, host: &mut H, view: ViewId, input: &KeyInput) {
        if !self.registry.contains(view) {
            return;
        }
        let Some(command) = NavCommand::from_input(input) else {
            return;
        };
        debug!(?view, ?command, "navigation key");
        match command {
            NavCommand::Back => host.go_back(view),
            NavCommand::Forward => host.go_forward(view),
            NavCommand::Reload => host.reload_view(view),
            NavCommand::Home => host.go_to_start(view),
            NavCommand::EditConfig => self.edit_config(host),
        }
    }
}
