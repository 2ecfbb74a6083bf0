//! Keyboard shortcuts handled inside a view.

/// Kind of raw key event delivered by a content surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEventKind {
    /// Key pressed.
    Down,
    /// Key released.
    Up,
}

/// A raw key event from a view, before the page sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInput {
    /// Press or release.
    pub kind: KeyEventKind,
    /// DOM-style key value (`"["`, `"r"`, `"Escape"`, ...).
    pub key: String,
    /// Whether the meta (Command) modifier is held.
    pub meta: bool,
}

impl KeyInput {
    /// A key-down event with the meta modifier held.
    pub fn meta_down(key: impl Into<String>) -> Self {
        Self {
            kind: KeyEventKind::Down,
            key: key.into(),
            meta: true,
        }
    }
}

/// Navigation command triggered from inside a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavCommand {
    /// History back.
    Back,
    /// History forward.
    Forward,
    /// Reload the page.
    Reload,
    /// Return to the first history entry.
    Home,
    /// Open the config file.
    EditConfig,
}

impl NavCommand {
    /// Command for `input`; `None` means the page keeps the event.
    pub fn from_input(input: &KeyInput) -> Option<Self> {
        if input.kind != KeyEventKind::Down || !input.meta {
            return None;
        }
        match input.key.as_str() {
            "[" => Some(Self::Back),
            "]" => Some(Self::Forward),
            "r" => Some(Self::Reload),
            "Escape" => Some(Self::Home),
            "," => Some(Self::EditConfig),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meta_keys_map() {
        assert_eq!(NavCommand::from_input(&KeyInput::meta_down("[")), Some(NavCommand::Back));
        assert_eq!(NavCommand::from_input(&KeyInput::meta_down("]")), Some(NavCommand::Forward));
        assert_eq!(NavCommand::from_input(&KeyInput::meta_down("r")), Some(NavCommand::Reload));
        assert_eq!(NavCommand::from_input(&KeyInput::meta_down("Escape")), Some(NavCommand::Home));
        assert_eq!(NavCommand::from_input(&KeyInput::meta_down(",")), Some(NavCommand::EditConfig));
        assert_eq!(NavCommand::from_input(&KeyInput::meta_down("x")), None);
    }

    #[test]
    fn needs_meta_and_key_down() {
        let mut input = KeyInput::meta_down("r");
        input.meta = false;
        assert_eq!(NavCommand::from_input(&input), None);
        let mut input = KeyInput::meta_down("r");
        input.kind = KeyEventKind::Up;
        assert_eq!(NavCommand::from_input(&input), None);
    }
}
