use std::result::Result as StdResult;

use thiserror::Error;

/// Convenient result type for the engine crate.
pub type Result<T> = StdResult<T, Error>;

/// Unified error type for the popcorn engine.
#[derive(Debug, Error)]
pub enum Error {
    /// Loading or validating the config failed.
    #[error(transparent)]
    Config(#[from] config::Error),

    /// The host collaborator refused an operation.
    #[error("Host error: {0}")]
    Host(String),

    /// A `popcorn://` activation named an app that is not configured.
    #[error("App not found: {0}")]
    UnknownApp(String),

    /// An activation string that is not a URL at all.
    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl {
        /// The rejected input.
        url: String,
        /// Parser message.
        reason: String,
    },

    /// The host refused the global toggle accelerator.
    #[error("Global shortcut {accelerator} could not be registered: {reason}")]
    GlobalShortcut {
        /// Accelerator that was rejected.
        accelerator: String,
        /// Host message.
        reason: String,
    },
}

impl Error {
    /// Text shown in the user-facing error dialog.
    pub fn user_message(&self) -> String {
        match self {
            Self::Config(e) => e.pretty(),
            other => other.to_string(),
        }
    }
}
