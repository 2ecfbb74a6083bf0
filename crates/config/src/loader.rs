//! Parse and load user configuration.

use std::{fs, io::ErrorKind, path::Path};

use tracing::debug;

use crate::{Config, Error, error::mark_position, raw::RawConfig};

/// Parse a configuration from a JSON string.
///
/// `path` only decorates errors; nothing is read from disk.
pub fn load_from_str(source: &str, path: Option<&Path>) -> Result<Config, Error> {
    let result = serde_json::from_str::<RawConfig>(source)
        .map_err(|e| {
            let (line, column) = (e.line().max(1), e.column().max(1));
            Error::Syntax {
                path: None,
                line,
                column,
                message: e.to_string(),
                excerpt: mark_position(source, line, column),
            }
        })
        .and_then(RawConfig::into_config);
    match path {
        Some(p) => result.map_err(|e| e.in_file(p)),
        None => result,
    }
}

/// Load a validated `Config` from a JSON file at `path`.
pub fn load_from_path(path: &Path) -> Result<Config, Error> {
    let source = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => Error::NotFound {
            path: path.to_path_buf(),
        },
        _ => Error::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        },
    })?;
    let config = load_from_str(&source, Some(path))?;
    debug!(
        path = %path.display(),
        apps = config.apps.len(),
        "loaded config"
    );
    Ok(config)
}
