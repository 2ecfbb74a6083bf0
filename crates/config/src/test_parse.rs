#[cfg(test)]
mod tests {
    use crate::*; // bring Config and helpers into scope

    const BASIC: &str = r#"{
        "shortcut": { "modifiers": ["cmd", "shift"], "key": "p" },
        "defaultApp": "chat",
        "width": 900,
        "apps": {
            "chat": { "url": "https://chat.example.com", "shortcut": { "modifiers": ["hyper"], "key": "c" } },
            "notes": { "url": "https://notes.example.com" },
            "calendar": { "url": "https://cal.example.com" }
        }
    }"#;

    #[test]
    fn basic_config_parses() {
        let cfg = load_from_str(BASIC, None).unwrap();
        assert_eq!(cfg.default_app, "chat");
        assert_eq!(cfg.shortcut.accelerator(), "Command+Shift+P");
        assert_eq!(cfg.panel_size(), (900, defaults::PANEL_HEIGHT));
        assert_eq!(cfg.max_cached_views, None);
        let chat = cfg.app("chat").unwrap();
        assert_eq!(chat.name, "chat");
        assert_eq!(
            accelerator(chat.shortcut.as_ref()).as_deref(),
            Some("Shift+Control+Alt+Command+C")
        );
        assert_eq!(accelerator(cfg.app("notes").unwrap().shortcut.as_ref()), None);
    }

    #[test]
    fn apps_keep_file_order() {
        let cfg = load_from_str(BASIC, None).unwrap();
        let names: Vec<&str> = cfg.apps.keys().map(String::as_str).collect();
        assert_eq!(names, ["chat", "notes", "calendar"]);
    }

    #[test]
    fn malformed_json_reports_location() {
        let src = "{\n  \"defaultApp\": \"a\",\n  \"apps\": {\n}";
        match load_from_str(src, None) {
            Err(Error::Syntax { line, excerpt, .. }) => {
                assert_eq!(line, 4);
                assert!(excerpt.contains('^'));
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn missing_shortcut_fails_validation() {
        let src = r#"{ "defaultApp": "a", "apps": { "a": { "url": "https://a" } } }"#;
        let err = load_from_str(src, None).unwrap_err();
        assert!(matches!(err, Error::Invalid { .. }));
        assert_eq!(err.to_string(), "No shortcut configured");
    }

    #[test]
    fn default_app_must_exist() {
        let src = r#"{
            "shortcut": { "modifiers": ["cmd"], "key": "p" },
            "defaultApp": "missing",
            "apps": { "a": { "url": "https://a" } }
        }"#;
        let err = load_from_str(src, None).unwrap_err();
        assert_eq!(err.to_string(), "Default app not found: missing");
    }

    #[test]
    fn missing_default_app_fails() {
        let src = r#"{
            "shortcut": { "modifiers": ["cmd"], "key": "p" },
            "apps": { "a": { "url": "https://a" } }
        }"#;
        let err = load_from_str(src, None).unwrap_err();
        assert_eq!(err.to_string(), "No default app configured");
    }

    #[test]
    fn unknown_modifier_fails() {
        let src = r#"{
            "shortcut": { "modifiers": ["command"], "key": "p" },
            "defaultApp": "a",
            "apps": { "a": { "url": "https://a" } }
        }"#;
        assert!(matches!(load_from_str(src, None), Err(Error::Syntax { .. })));
    }

    #[test]
    fn misspelled_app_key_fails() {
        // shortcut => shortcat should error rather than silently drop the binding
        let src = r#"{
            "shortcut": { "modifiers": ["cmd"], "key": "p" },
            "defaultApp": "a",
            "apps": { "a": { "url": "https://a", "shortcat": { "key": "a" } } }
        }"#;
        assert!(load_from_str(src, None).is_err());
    }

    #[test]
    fn bad_app_shortcut_only_drops_that_binding() {
        let src = r#"{
            "shortcut": { "modifiers": ["cmd"], "key": "p" },
            "defaultApp": "a",
            "apps": {
                "a": { "url": "https://a", "shortcut": { "modifiers": ["cmd"], "key": "a" } },
                "b": { "url": "https://b", "shortcut": { "modifiers": ["control"], "key": "b" } },
                "c": { "url": "https://c", "shortcut": { "modifiers": ["cmd"], "key": " " } },
                "d": { "url": "https://d", "shortcut": "cmd+d" }
            }
        }"#;
        let cfg = load_from_str(src, None).unwrap();
        assert_eq!(cfg.apps.len(), 4);
        assert_eq!(accelerator(cfg.app("a").unwrap().shortcut.as_ref()).as_deref(), Some("Command+A"));
        for name in ["b", "c", "d"] {
            assert_eq!(cfg.app(name).unwrap().shortcut, None, "app {name}");
        }
    }

    #[test]
    fn global_shortcut_stays_strict() {
        let empty_key = r#"{
            "shortcut": { "modifiers": ["cmd"], "key": "" },
            "defaultApp": "a",
            "apps": { "a": { "url": "https://a" } }
        }"#;
        let err = load_from_str(empty_key, None).unwrap_err();
        assert_eq!(err.to_string(), "shortcut: key must not be empty");
    }

    #[test]
    fn cache_limit_parses() {
        let src = r#"{
            "shortcut": { "key": "f12" },
            "defaultApp": "a",
            "maxCachedViews": 2,
            "apps": { "a": { "url": "https://a" } }
        }"#;
        let cfg = load_from_str(src, None).unwrap();
        assert_eq!(cfg.max_cached_views, Some(2));
        assert_eq!(cfg.shortcut.accelerator(), "F12");
        assert_eq!(cfg.panel_size(), (750, 440));
    }
}
