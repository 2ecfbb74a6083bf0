// Defaults and constants for the panel and config file layout

/// Panel width used when the config does not set one.
pub const PANEL_WIDTH: u32 = 750;
/// Panel height used when the config does not set one.
pub const PANEL_HEIGHT: u32 = 440;

/// Environment variable naming an explicit config file.
pub(crate) const CONFIG_ENV: &str = "POPCORN_CONFIG";
/// Directory under the XDG config home holding the config file.
pub(crate) const CONFIG_DIR: &str = "popcorn";
/// File name of the config file.
pub(crate) const CONFIG_FILE: &str = "popcorn.json";
