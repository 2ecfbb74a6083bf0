//! Translate shortcut descriptions into host accelerator strings.
//!
//! The accelerator grammar is `Modifier+Modifier+Key`, e.g. `Command+Shift+P`.

use crate::{Modifier, ShortcutSpec};

/// Separator between accelerator tokens.
pub const SEPARATOR: &str = "+";

impl Modifier {
    /// Accelerator tokens this modifier expands to.
    pub fn tokens(self) -> &'static [&'static str] {
        match self {
            Self::Ctrl => &["Control"],
            Self::Alt | Self::Option => &["Alt"],
            Self::Shift => &["Shift"],
            Self::Meta | Self::Super | Self::Cmd => &["Command"],
            Self::Hyper => &["Shift", "Control", "Alt", "Command"],
        }
    }
}

impl ShortcutSpec {
    /// Render this shortcut in accelerator form.
    pub fn accelerator(&self) -> String {
        let mut parts: Vec<String> = self
            .modifiers
            .iter()
            .flat_map(|m| m.tokens().iter().map(|t| (*t).to_string()))
            .collect();
        parts.push(capitalize(&self.key));
        parts.join(SEPARATOR)
    }
}

/// Accelerator for an optional shortcut; `None` means no binding was requested.
pub fn accelerator(shortcut: Option<&ShortcutSpec>) -> Option<String> {
    shortcut.map(ShortcutSpec::accelerator)
}

/// Uppercase the first character and keep the rest as written.
fn capitalize(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
