//! Configuration model for popcorn: apps, shortcuts, panel size and parsing.
#![allow(missing_docs)]

use std::{
    env,
    ffi::OsString,
    path::{Path, PathBuf},
};

pub mod accelerator;
pub mod defaults;
mod error;
mod loader;
mod raw;
mod types;

#[cfg(test)]
mod test_parse;

pub use accelerator::accelerator;
pub use error::Error;
pub use loader::{load_from_path, load_from_str};
pub use types::{AppEntry, Config, Modifier, ShortcutSpec};

use defaults::{CONFIG_DIR, CONFIG_ENV, CONFIG_FILE};

/// Resolve the effective config path from the process environment.
///
/// Policy:
/// 1) Use `explicit` when provided.
/// 2) Else `$POPCORN_CONFIG`.
/// 3) Else `$XDG_CONFIG_HOME/popcorn/popcorn.json`.
/// 4) Else `~/.config/popcorn/popcorn.json`.
///
/// The path is not checked for existence; loading reports a missing file.
pub fn resolve_config_path(explicit: Option<&Path>) -> PathBuf {
    resolve_config_path_with(explicit, |key| env::var_os(key))
}

/// [`resolve_config_path`] with an injectable environment lookup.
pub fn resolve_config_path_with<F>(explicit: Option<&Path>, var: F) -> PathBuf
where
    F: Fn(&str) -> Option<OsString>,
{
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    let nonempty = |key: &str| var(key).filter(|v| !v.is_empty());

    if let Some(p) = nonempty(CONFIG_ENV) {
        return PathBuf::from(p);
    }
    if let Some(xdg) = nonempty("XDG_CONFIG_HOME") {
        let mut p = PathBuf::from(xdg);
        p.push(CONFIG_DIR);
        p.push(CONFIG_FILE);
        return p;
    }

    let mut p = PathBuf::from(var("HOME").unwrap_or_default());
    p.push(".config");
    p.push(CONFIG_DIR);
    p.push(CONFIG_FILE);
    p
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<OsString> {
        let map: HashMap<String, OsString> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), OsString::from(v)))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn explicit_wins() {
        let p = resolve_config_path_with(
            Some(Path::new("/x/y.json")),
            lookup(&[("POPCORN_CONFIG", "/env.json")]),
        );
        assert_eq!(p, PathBuf::from("/x/y.json"));
    }

    #[test]
    fn env_var_before_xdg() {
        let p = resolve_config_path_with(
            None,
            lookup(&[("POPCORN_CONFIG", "/env.json"), ("XDG_CONFIG_HOME", "/xdg")]),
        );
        assert_eq!(p, PathBuf::from("/env.json"));
    }

    #[test]
    fn xdg_then_home() {
        let p = resolve_config_path_with(None, lookup(&[("XDG_CONFIG_HOME", "/xdg"), ("HOME", "/h")]));
        assert_eq!(p, PathBuf::from("/xdg/popcorn/popcorn.json"));

        let p = resolve_config_path_with(None, lookup(&[("HOME", "/h"), ("XDG_CONFIG_HOME", "")]));
        assert_eq!(p, PathBuf::from("/h/.config/popcorn/popcorn.json"));
    }
}
