//! Route activation URLs (`popcorn://<app>` or plain URLs) to toggles.

use config::Config;
use url::Url;

use crate::{Error, Result};

/// Custom URI scheme handled by popcorn.
pub const SCHEME: &str = "popcorn";

/// Where an activation URL leads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// A configured app, cached under its name.
    App {
        /// App name.
        name: String,
        /// App URL.
        url: String,
    },
    /// Any other URL, opened in a fresh uncached view.
    AdHoc(String),
}

/// Resolve `raw` against `config`.
pub fn route(raw: &str, config: &Config) -> Result<Route> {
    let parsed = Url::parse(raw).map_err(|e| Error::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    if parsed.scheme() != SCHEME {
        return Ok(Route::AdHoc(raw.to_string()));
    }
    let name = parsed.host_str().unwrap_or_default();
    match config.app(name) {
        Some(app) => Ok(Route::App {
            name: app.name.clone(),
            url: app.url.clone(),
        }),
        None => Err(Error::UnknownApp(name.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> Config {
        config::load_from_str(
            r#"{
                "shortcut": { "modifiers": ["cmd"], "key": "p" },
                "defaultApp": "chat",
                "apps": { "chat": { "url": "https://chat.example.com/" } }
            }"#,
            None,
        )
        .unwrap()
    }

    #[test]
    fn scheme_routes_to_app() {
        assert_eq!(
            route("popcorn://chat", &cfg()).unwrap(),
            Route::App {
                name: "chat".into(),
                url: "https://chat.example.com/".into()
            }
        );
        // Trailing path segments are ignored.
        assert!(matches!(
            route("popcorn://chat/whatever", &cfg()),
            Ok(Route::App { .. })
        ));
    }

    #[test]
    fn unknown_app_is_an_error() {
        match route("popcorn://mail", &cfg()) {
            Err(Error::UnknownApp(name)) => assert_eq!(name, "mail"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn other_urls_are_ad_hoc() {
        assert_eq!(
            route("https://example.com/a?b=c", &cfg()).unwrap(),
            Route::AdHoc("https://example.com/a?b=c".into())
        );
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(
            route("not a url", &cfg()),
            Err(Error::InvalidUrl { .. })
        ));
    }
}
