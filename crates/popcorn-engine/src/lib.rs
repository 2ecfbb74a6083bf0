//! Popcorn Engine
//!
//! The Popcorn Engine crate holds everything popcorn does that is not tied to
//! a particular windowing toolkit:
//! - keeps one panel and a cache of web views keyed by app name
//! - binds global hotkeys and builds the tray menu from config
//! - routes `popcorn://` activations and plain URLs to view toggles
//! - places the panel on the display under the pointer
//!
//! The engine is synchronous and single-threaded. It exposes:
//! - [`Shell`]: the type you construct and feed [`ShellEvent`]s
//! - [`host`]: the traits a desktop backend implements
//! - [`Registry`], [`ShortcutManager`] and [`TrayController`] for callers that
//!   want a single piece
//!
//! [`test_support`] carries a recording host for tests.

mod error;
mod shell;

pub mod dispatch;
pub mod geometry;
pub mod host;
pub mod input;
pub mod registry;
pub mod shortcuts;
pub mod test_support;
pub mod tray;

pub use error::{Error, Result};
pub use registry::{CachePolicy, Registry, ToggleOutcome};
pub use shell::{Flow, Shell, ShellEvent};
pub use shortcuts::{ShortcutAction, ShortcutManager};
pub use tray::{Menu, MenuId, MenuItem, TrayAction, TrayController};
