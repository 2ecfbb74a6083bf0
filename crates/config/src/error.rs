//! Configuration errors and their user-facing rendering.

use std::{
    fmt::Write as _,
    path::{Path, PathBuf},
};

use thiserror::Error;

/// Why a configuration could not be produced.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// No file exists at the resolved path.
    #[error("Config file not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// The file exists but could not be read.
    #[error("Could not read {}: {message}", path.display())]
    Io { path: PathBuf, message: String },

    /// The text is not a well-formed configuration document.
    ///
    /// `line` and `column` are 1-based; `excerpt` shows the offending line with a marker.
    #[error("{message}")]
    Syntax {
        path: Option<PathBuf>,
        line: usize,
        column: usize,
        message: String,
        excerpt: String,
    },

    /// The document parsed but breaks a configuration rule.
    #[error("{message}")]
    Invalid {
        path: Option<PathBuf>,
        message: String,
    },
}

impl Error {
    /// Multi-line text suitable for an error dialog or stderr.
    pub fn pretty(&self) -> String {
        let origin = |path: Option<&Path>| match path {
            Some(p) => format!(" in {}", p.display()),
            None => String::new(),
        };
        match self {
            Self::NotFound { .. } | Self::Io { .. } => self.to_string(),
            Self::Syntax {
                path,
                line,
                column,
                message,
                excerpt,
            } => format!(
                "Config parse error{} (line {line}, column {column}): {message}\n{excerpt}",
                origin(path.as_deref())
            ),
            Self::Invalid { path, message } => {
                format!("Invalid config{}: {message}", origin(path.as_deref()))
            }
        }
    }

    /// File the error refers to, if known.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::NotFound { path } | Self::Io { path, .. } => Some(path),
            Self::Syntax { path, .. } | Self::Invalid { path, .. } => path.as_deref(),
        }
    }

    /// Attribute an in-memory error to the file it came from.
    pub(crate) fn in_file(mut self, file: &Path) -> Self {
        if let Self::Syntax { path, .. } | Self::Invalid { path, .. } = &mut self {
            *path = Some(file.to_path_buf());
        }
        self
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            path: None,
            message: message.into(),
        }
    }
}

/// The line before `line`, `line` itself and a marker under `column`.
pub(crate) fn mark_position(source: &str, line: usize, column: usize) -> String {
    let mut out = String::new();
    let first = line.saturating_sub(1).max(1);
    for (n, text) in source.lines().enumerate().map(|(i, t)| (i + 1, t)) {
        if n < first {
            continue;
        }
        if n > line {
            break;
        }
        let _ignored = writeln!(out, "{n:>4} | {text}");
    }
    let _ignored = writeln!(out, "{:>4} | {:>column$}", "", "^");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_sits_under_column() {
        let src = "{\n  \"a\": 1,\n  oops\n}";
        let ex = mark_position(src, 3, 3);
        let lines: Vec<&str> = ex.lines().collect();
        assert_eq!(lines, ["   2 |   \"a\": 1,", "   3 |   oops", "     |   ^"]);
    }

    #[test]
    fn pretty_names_the_file() {
        let err = Error::invalid("defaultApp is missing").in_file(Path::new("/tmp/p.json"));
        assert_eq!(err.pretty(), "Invalid config in /tmp/p.json: defaultApp is missing");
        assert_eq!(err.path(), Some(Path::new("/tmp/p.json")));
    }

    #[test]
    fn not_found_mentions_path() {
        let err = Error::NotFound {
            path: PathBuf::from("/nope.json"),
        };
        assert_eq!(err.pretty(), "Config file not found: /nope.json");
    }
}
