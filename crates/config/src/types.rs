//! Core configuration data types used in the config crate.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::defaults::{PANEL_HEIGHT, PANEL_WIDTH};

/// Modifier names accepted in shortcut descriptions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    /// Control key.
    Ctrl,
    /// Alt key.
    Alt,
    /// Option key (same as alt).
    Option,
    /// Shift key.
    Shift,
    /// Meta key (Command on macOS).
    Meta,
    /// Super key (Command on macOS).
    Super,
    /// Command key.
    Cmd,
    /// Shift+Control+Alt+Command at once.
    Hyper,
}

/// A keyboard shortcut as written in the config file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShortcutSpec {
    /// Modifiers held with the key, in the order they were written.
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    /// Key name or character.
    pub key: String,
}

impl ShortcutSpec {
    /// Build a shortcut from modifiers and a key.
    pub fn new(modifiers: impl IntoIterator<Item = Modifier>, key: impl Into<String>) -> Self {
        Self {
            modifiers: modifiers.into_iter().collect(),
            key: key.into(),
        }
    }
}

/// One launchable web app.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AppEntry {
    /// Unique app name; also the view identity and the `popcorn://` host.
    pub name: String,
    /// URL loaded into the app's view.
    pub url: String,
    /// Optional global shortcut toggling this app.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shortcut: Option<ShortcutSpec>,
}

/// A validated configuration.
///
/// Instances only come out of the loader, so `default_app` always names an
/// entry of `apps` and the global `shortcut` is always present.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Apps keyed by name, in file order.
    pub apps: IndexMap<String, AppEntry>,
    /// App toggled by the global shortcut when no panel exists yet.
    pub default_app: String,
    /// Global panel toggle shortcut.
    pub shortcut: ShortcutSpec,
    /// Panel width override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Panel height override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Upper bound on live named views; unbounded when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_cached_views: Option<usize>,
}

impl Config {
    /// Look up an app by name.
    pub fn app(&self, name: &str) -> Option<&AppEntry> {
        self.apps.get(name)
    }

    /// The default app entry.
    pub fn default_entry(&self) -> Option<&AppEntry> {
        self.apps.get(&self.default_app)
    }

    /// Panel size as `(width, height)`, falling back to the built-in defaults.
    pub fn panel_size(&self) -> (u32, u32) {
        (
            self.width.unwrap_or(PANEL_WIDTH),
            self.height.unwrap_or(PANEL_HEIGHT),
        )
    }
}
