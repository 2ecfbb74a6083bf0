//! Integration tests for loading configuration files from disk.

#[cfg(test)]
mod tests {
    use std::fs;

    use config::{Error, load_from_path};

    #[test]
    fn missing_file_is_reported_as_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("popcorn.json");
        let err = load_from_path(&path).unwrap_err();
        assert_eq!(err, Error::NotFound { path: path.clone() });
        assert!(err.to_string().starts_with("Config file not found"));
    }

    #[test]
    fn errors_carry_the_file_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("popcorn.json");
        fs::write(&path, "{ not json").unwrap();
        let err = load_from_path(&path).unwrap_err();
        assert!(matches!(err, Error::Syntax { .. }));
        assert_eq!(err.path(), Some(path.as_path()));
        assert!(err.pretty().starts_with(&format!("Config parse error in {}", path.display())));
    }

    #[test]
    fn loads_a_valid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("popcorn.json");
        fs::write(
            &path,
            r#"{
                "shortcut": { "modifiers": ["ctrl", "alt"], "key": "space" },
                "defaultApp": "mail",
                "height": 600,
                "apps": { "mail": { "url": "https://mail.example.com" } }
            }"#,
        )
        .unwrap();
        let cfg = load_from_path(&path).unwrap();
        assert_eq!(cfg.shortcut.accelerator(), "Control+Alt+Space");
        assert_eq!(cfg.panel_size(), (750, 600));
        assert_eq!(cfg.default_entry().map(|a| a.url.as_str()), Some("https://mail.example.com"));
    }
}
