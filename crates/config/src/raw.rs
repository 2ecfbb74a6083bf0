use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::{AppEntry, Config, Error, ShortcutSpec};

// ===== FILE SHAPE =====
//
// Everything is optional at this level so that missing keys surface as
// validation errors naming the key, rather than serde's generic message.

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RawConfig {
    #[serde(default)]
    pub shortcut: Option<ShortcutSpec>,
    #[serde(default)]
    pub default_app: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub max_cached_views: Option<usize>,
    #[serde(default)]
    pub apps: IndexMap<String, RawApp>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawApp {
    pub url: String,
    /// Kept untyped: a malformed app shortcut drops the binding, not the config.
    #[serde(default)]
    pub shortcut: Option<Value>,
}

impl RawConfig {
    /// Validate and convert into a [`Config`].
    pub fn into_config(self) -> Result<Config, Error> {
        let shortcut = self
            .shortcut
            .ok_or_else(|| Error::invalid("No shortcut configured"))?;
        check_shortcut("shortcut", &shortcut)?;

        let default_app = self
            .default_app
            .ok_or_else(|| Error::invalid("No default app configured"))?;

        if matches!(self.width, Some(0)) || matches!(self.height, Some(0)) {
            return Err(Error::invalid("width and height must be positive"));
        }
        if matches!(self.max_cached_views, Some(0)) {
            return Err(Error::invalid("maxCachedViews must be at least 1"));
        }

        let mut apps = IndexMap::with_capacity(self.apps.len());
        for (name, raw) in self.apps {
            if name.is_empty() {
                return Err(Error::invalid("App names must not be empty"));
            }
            let shortcut = raw.shortcut.and_then(|v| app_shortcut(&name, v));
            apps.insert(
                name.clone(),
                AppEntry {
                    name,
                    url: raw.url,
                    shortcut,
                },
            );
        }

        if !apps.contains_key(&default_app) {
            return Err(Error::invalid(format!(
                "Default app not found: {default_app}"
            )));
        }

        Ok(Config {
            apps,
            default_app,
            shortcut,
            width: self.width,
            height: self.height,
            max_cached_views: self.max_cached_views,
        })
    }
}

fn check_shortcut(at: &str, s: &ShortcutSpec) -> Result<(), Error> {
    if s.key.trim().is_empty() {
        return Err(Error::invalid(format!("{at}: key must not be empty")));
    }
    Ok(())
}

/// Parse an app's shortcut, or `None` with a warning when it cannot be bound.
fn app_shortcut(app: &str, value: Value) -> Option<ShortcutSpec> {
    let at = format!("apps.{app}.shortcut");
    let parsed = serde_json::from_value::<ShortcutSpec>(value)
        .map_err(|e| Error::invalid(format!("{at}: {e}")))
        .and_then(|s| check_shortcut(&at, &s).map(|()| s));
    match parsed {
        Ok(s) => Some(s),
        Err(e) => {
            warn!("ignoring shortcut: {}", e);
            None
        }
    }
}
