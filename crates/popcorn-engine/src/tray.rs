//! Tray menu model and the controller that rebuilds it from config.

use std::collections::HashMap;

use config::Config;
use tracing::debug;

use crate::host::TrayMenu;

/// Hover text for the tray icon.
pub const TOOLTIP: &str = "Popcorn";

/// Stable menu item identifiers for the fixed entries.
pub mod ids {
    /// "Edit Config".
    pub const EDIT_CONFIG: &str = "edit-config";
    /// "Reload Config".
    pub const RELOAD_CONFIG: &str = "reload-config";
    /// "Quit".
    pub const QUIT: &str = "quit";
    /// Prefix for per-app entries; the app name follows.
    pub const APP_PREFIX: &str = "app:";
}

/// Menu item identifier, stable across rebuilds.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MenuId(pub String);

impl MenuId {
    /// Identifier of the entry toggling app `name`.
    pub fn for_app(name: &str) -> Self {
        Self(format!("{}{}", ids::APP_PREFIX, name))
    }
}

impl From<&str> for MenuId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// One tray menu entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuItem {
    /// Clickable entry.
    Action {
        /// Identifier reported back on click.
        id: MenuId,
        /// Visible label.
        label: String,
        /// Accelerator hint shown next to the label.
        accelerator: Option<String>,
    },
    /// Horizontal rule.
    Separator,
}

/// A complete tray menu, handed to the host as a whole.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Menu {
    /// Entries top to bottom.
    pub items: Vec<MenuItem>,
}

impl Menu {
    /// Labels of the clickable entries, in order.
    pub fn labels(&self) -> Vec<&str> {
        self.items
            .iter()
            .filter_map(|i| match i {
                MenuItem::Action { label, .. } => Some(label.as_str()),
                MenuItem::Separator => None,
            })
            .collect()
    }
}

/// What a menu click asks the shell to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrayAction {
    /// Toggle a configured app.
    ToggleApp {
        /// App name (view identity).
        name: String,
        /// App URL.
        url: String,
    },
    /// Open the config file in the default editor.
    EditConfig,
    /// Reload the config from disk.
    ReloadConfig,
    /// Quit popcorn.
    Quit,
}

/// Owns the menu's click table; rebuilt in full on every config change.
#[derive(Debug, Default)]
pub struct TrayController {
    /// Click table for the menu currently installed.
    actions: HashMap<MenuId, TrayAction>,
    /// The menu currently installed.
    menu: Menu,
}

impl TrayController {
    /// Create a controller with an empty menu.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the menu for `config` and replace the host's menu with it.
    pub fn rebuild<H: TrayMenu + ?Sized>(&mut self, host: &mut H, config: &Config) {
        let (menu, actions) = build_menu(config);
        debug!(items = menu.items.len(), "rebuilding tray menu");
        host.set_tooltip(TOOLTIP);
        host.set_menu(&menu);
        self.menu = menu;
        self.actions = actions;
    }

    /// Action bound to `id` in the current menu.
    pub fn action(&self, id: &MenuId) -> Option<&TrayAction> {
        self.actions.get(id)
    }

    /// The menu currently installed.
    pub fn menu(&self) -> &Menu {
        &self.menu
    }
}

/// Build the menu and its click table for `config`.
pub fn build_menu(config: &Config) -> (Menu, HashMap<MenuId, TrayAction>) {
    let mut items = Vec::with_capacity(config.apps.len() + 6);
    let mut actions = HashMap::with_capacity(config.apps.len() + 3);

    for app in config.apps.values() {
        let id = MenuId::for_app(&app.name);
        items.push(MenuItem::Action {
            id: id.clone(),
            label: app.name.clone(),
            accelerator: config::accelerator(app.shortcut.as_ref()),
        });
        actions.insert(
            id,
            TrayAction::ToggleApp {
                name: app.name.clone(),
                url: app.url.clone(),
            },
        );
    }

    items.push(MenuItem::Separator);
    push_fixed(
        &mut items,
        &mut actions,
        ids::EDIT_CONFIG,
        "Edit Config",
        Some("Command+,"),
        TrayAction::EditConfig,
    );
    push_fixed(
        &mut items,
        &mut actions,
        ids::RELOAD_CONFIG,
        "Reload Config",
        None,
        TrayAction::ReloadConfig,
    );
    items.push(MenuItem::Separator);
    push_fixed(
        &mut items,
        &mut actions,
        ids::QUIT,
        "Quit",
        Some("Command+Q"),
        TrayAction::Quit,
    );

    (Menu { items }, actions)
}

/// Append one of the fixed entries.
fn push_fixed(
    items: &mut Vec<MenuItem>,
    actions: &mut HashMap<MenuId, TrayAction>,
    id: &str,
    label: &str,
    accelerator: Option<&str>,
    action: TrayAction,
) {
    items.push(MenuItem::Action {
        id: id.into(),
        label: label.to_string(),
        accelerator: accelerator.map(str::to_string),
    });
    actions.insert(id.into(), action);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> Config {
        config::load_from_str(
            r#"{
                "shortcut": { "modifiers": ["cmd"], "key": "p" },
                "defaultApp": "b",
                "apps": {
                    "b": { "url": "https://b", "shortcut": { "modifiers": ["cmd", "shift"], "key": "b" } },
                    "a": { "url": "https://a" }
                }
            }"#,
            None,
        )
        .unwrap()
    }

    #[test]
    fn apps_then_fixed_entries() {
        let (menu, actions) = build_menu(&cfg());
        assert_eq!(
            menu.labels(),
            ["b", "a", "Edit Config", "Reload Config", "Quit"]
        );
        assert_eq!(menu.items[2], MenuItem::Separator);
        assert_eq!(menu.items[5], MenuItem::Separator);
        assert_eq!(
            menu.items[4],
            MenuItem::Action {
                id: MenuId::from(ids::RELOAD_CONFIG),
                label: "Reload Config".into(),
                accelerator: None,
            }
        );
        assert_eq!(
            menu.items[0],
            MenuItem::Action {
                id: MenuId::for_app("b"),
                label: "b".into(),
                accelerator: Some("Command+Shift+B".into()),
            }
        );
        assert_eq!(
            actions.get(&MenuId::for_app("a")),
            Some(&TrayAction::ToggleApp {
                name: "a".into(),
                url: "https://a".into()
            })
        );
        assert_eq!(actions.get(&MenuId::from(ids::QUIT)), Some(&TrayAction::Quit));
        assert_eq!(actions.len(), 5);
    }
}
