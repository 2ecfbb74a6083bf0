//! The panel/view registry and its toggle state machine.
//!
//! The registry owns the only panel handle and the identity → view map.
//! Every activation ends in [`Registry::toggle`], which picks one of four
//! paths:
//!
//! - identity cached and attached: flip panel visibility
//! - identity cached, ready, not attached: re-parent it into the panel
//! - identity cached, still loading: make it the pending view
//! - identity unknown (or ad-hoc): create a view and start loading it
//!
//! Views are attached only after their first load completes, and only if
//! they are still the pending view at that point, so the panel never shows
//! a blank page and a slow load never steals the panel from a later toggle.

use std::{collections::HashMap, result::Result as StdResult};

use config::Config;
use tracing::{debug, trace, warn};

use crate::{
    Result,
    geometry::{self, PanelSize},
    host::{Host, Theme, ViewId},
};

/// How many named views stay alive when they are not displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CachePolicy {
    /// Upper bound on live named views; `None` keeps them until their
    /// content destroys itself.
    pub max_views: Option<usize>,
}

impl CachePolicy {
    /// Policy requested by `cfg`.
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            max_views: cfg.max_cached_views,
        }
    }
}

/// What a toggle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The panel is now visible with the requested view.
    Shown,
    /// The panel was visible with the requested view and is now hidden.
    Hidden,
    /// The requested view is still loading; it will be shown when done.
    Pending,
    /// A new view was created and started loading.
    Created,
}

/// Load progress of a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadState {
    /// First load in flight.
    Loading,
    /// First load done; the view may be attached.
    Ready,
}

/// Bookkeeping for one live view.
#[derive(Debug)]
struct ViewEntry {
    /// App name, or `None` for ad-hoc views.
    identity: Option<String>,
    /// Load progress.
    state: LoadState,
    /// Recency stamp for eviction.
    last_used: u64,
}

/// The single panel.
#[derive(Debug, Default)]
struct Panel {
    /// View currently displayed.
    attached: Option<ViewId>,
}

/// Owns the panel and every live view.
#[derive(Debug, Default)]
pub struct Registry {
    /// The panel, once created.
    panel: Option<Panel>,
    /// Every live view, named or ad-hoc.
    views: HashMap<ViewId, ViewEntry>,
    /// Named views only.
    by_identity: HashMap<String, ViewId>,
    /// View to show when its load completes.
    pending: Option<ViewId>,
    /// Panel size.
    size: PanelSize,
    /// Eviction policy.
    policy: CachePolicy,
    /// Appearance applied to view backgrounds.
    theme: Theme,
    /// Recency clock.
    tick: u64,
}

impl Registry {
    /// Create an empty registry.
    pub fn new(size: PanelSize, policy: CachePolicy) -> Self {
        Self {
            size,
            policy,
            ..Self::default()
        }
    }

    /// Show, hide, switch to, or create the view for `identity`.
    ///
    /// `identity` is the app name; `None` opens `url` in a fresh view that is
    /// never reused.
    pub fn toggle<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        url: &str,
        identity: Option<&str>,
    ) -> Result<ToggleOutcome> {
        let created = self.ensure_panel(host)?;
        if !created && !host.is_panel_visible() {
            let bounds = geometry::panel_bounds(&*host, self.size);
            host.set_panel_bounds(bounds);
        }

        let cached = identity.and_then(|name| self.by_identity.get(name).copied());
        let Some(view) = cached else {
            return self.spawn(host, url, identity);
        };
        self.touch(view);

        if self.attached() == Some(view) {
            self.pending = None;
            return Ok(self.flip(host, view));
        }
        if self.state(view) == Some(LoadState::Loading) {
            trace!(?view, "toggle while loading; show deferred");
            self.pending = Some(view);
            return Ok(ToggleOutcome::Pending);
        }
        self.pending = None;
        self.present(host, view);
        Ok(ToggleOutcome::Shown)
    }

    /// Flip the panel if it displays a view. Returns `false` when there is
    /// nothing to flip (no panel, or nothing attached yet).
    pub fn toggle_panel<H: Host + ?Sized>(&mut self, host: &mut H) -> bool {
        let Some(view) = self.attached() else {
            return false;
        };
        self.pending = None;
        if !host.is_panel_visible() {
            let bounds = geometry::panel_bounds(&*host, self.size);
            host.set_panel_bounds(bounds);
        }
        self.flip(host, view);
        true
    }

    /// A view finished (or failed) its load.
    pub fn on_load_finished<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        view: ViewId,
        result: StdResult<(), String>,
    ) {
        let Some(entry) = self.views.get_mut(&view) else {
            trace!(?view, "load finished for a view that is gone");
            return;
        };
        if entry.state == LoadState::Ready {
            trace!(?view, "later navigation finished");
            return;
        }
        match result {
            Ok(()) => {
                entry.state = LoadState::Ready;
                let ad_hoc = entry.identity.is_none();
                if self.pending == Some(view) {
                    self.pending = None;
                    self.present(host, view);
                } else if ad_hoc {
                    debug!(?view, "ad-hoc view superseded before it loaded");
                    self.evict(host, view);
                }
            }
            Err(reason) => {
                warn!(?view, identity = ?entry.identity, "load failed: {}", reason);
                if self.pending == Some(view) {
                    self.pending = None;
                }
                self.evict(host, view);
            }
        }
    }

    /// A view's content closed itself. Its host resources are released.
    pub fn on_view_destroyed<H: Host + ?Sized>(&mut self, host: &mut H, view: ViewId) {
        let Some(entry) = self.forget(view) else {
            return;
        };
        debug!(?view, identity = ?entry.identity, "view destroyed");
        if self.pending == Some(view) {
            self.pending = None;
        }
        if let Some(panel) = self.panel.as_mut()
            && panel.attached == Some(view)
        {
            panel.attached = None;
            host.hide_panel();
        }
        host.destroy_view(view);
    }

    /// Apply `theme` to every live view and to views created later.
    pub fn set_theme<H: Host + ?Sized>(&mut self, host: &mut H, theme: Theme) {
        self.theme = theme;
        for view in self.views.keys() {
            host.set_view_background(*view, theme.background());
        }
    }

    /// Adopt a new size and cache policy after a config reload.
    pub fn reconfigure<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        size: PanelSize,
        policy: CachePolicy,
    ) {
        let resized = size != self.size;
        self.size = size;
        self.policy = policy;
        if resized && let Some(view) = self.attached() {
            host.set_view_bounds(view, size.content_bounds());
        }
        self.enforce_limit(host);
    }

    /// The panel lost focus.
    pub fn on_panel_blurred<H: Host + ?Sized>(&mut self, host: &mut H) {
        if self.panel.is_some() && host.is_panel_visible() {
            host.hide_panel();
        }
    }

    /// The panel gained focus.
    pub fn on_panel_focused<H: Host + ?Sized>(&mut self, host: &mut H) {
        if let Some(view) = self.attached() {
            host.focus_view(view);
        }
    }

    /// Whether the panel has been created.
    pub fn has_panel(&self) -> bool {
        self.panel.is_some()
    }

    /// View displayed in the panel.
    pub fn attached(&self) -> Option<ViewId> {
        self.panel.as_ref().and_then(|p| p.attached)
    }

    /// View waiting for its load to complete before being shown.
    pub fn pending(&self) -> Option<ViewId> {
        self.pending
    }

    /// Cached view for `identity`.
    pub fn view_for(&self, identity: &str) -> Option<ViewId> {
        self.by_identity.get(identity).copied()
    }

    /// Whether `view` is tracked.
    pub fn contains(&self, view: ViewId) -> bool {
        self.views.contains_key(&view)
    }

    /// Number of live views, named and ad-hoc.
    pub fn len(&self) -> usize {
        self.views.len()
    }

    /// Whether no views are live.
    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Create the panel if it does not exist. Returns whether it was created.
    fn ensure_panel<H: Host + ?Sized>(&mut self, host: &mut H) -> Result<bool> {
        if self.panel.is_some() {
            return Ok(false);
        }
        let bounds = geometry::panel_bounds(&*host, self.size);
        host.create_panel(bounds)?;
        debug!(?bounds, "panel created");
        self.panel = Some(Panel::default());
        Ok(true)
    }

    /// Hide if visible, else focus and show.
    fn flip<H: Host + ?Sized>(&mut self, host: &mut H, view: ViewId) -> ToggleOutcome {
        if host.is_panel_visible() {
            host.hide_panel();
            ToggleOutcome::Hidden
        } else {
            host.focus_view(view);
            host.show_panel();
            ToggleOutcome::Shown
        }
    }

    /// Create a view for `identity` and start loading `url`.
    fn spawn<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        url: &str,
        identity: Option<&str>,
    ) -> Result<ToggleOutcome> {
        let view = host.create_view()?;
        self.tick += 1;
        self.views.insert(
            view,
            ViewEntry {
                identity: identity.map(str::to_string),
                state: LoadState::Loading,
                last_used: self.tick,
            },
        );
        if let Some(name) = identity {
            self.by_identity.insert(name.to_string(), view);
        }
        host.set_view_bounds(view, self.size.content_bounds());
        host.set_view_background(view, self.theme.background());
        self.pending = Some(view);
        debug!(?view, ?identity, url, "loading new view");
        host.load_url(view, url);
        Ok(ToggleOutcome::Created)
    }

    /// Attach `view`, size it, focus it and show the panel.
    fn present<H: Host + ?Sized>(&mut self, host: &mut H, view: ViewId) {
        let previous = self.attached();
        host.attach_view(view);
        host.set_view_bounds(view, self.size.content_bounds());
        host.focus_view(view);
        host.show_panel();
        if let Some(panel) = self.panel.as_mut() {
            panel.attached = Some(view);
        }
        self.touch(view);

        if let Some(prev) = previous.filter(|p| *p != view)
            && self.views.get(&prev).is_some_and(|e| e.identity.is_none())
        {
            debug!(view = ?prev, "releasing detached ad-hoc view");
            self.evict(host, prev);
        }
        self.enforce_limit(host);
    }

    /// Evict least recently used named views beyond the cache limit. The
    /// attached and pending views are never evicted.
    fn enforce_limit<H: Host + ?Sized>(&mut self, host: &mut H) {
        let Some(max) = self.policy.max_views else {
            return;
        };
        while self.by_identity.len() > max {
            let attached = self.attached();
            let victim = self
                .by_identity
                .values()
                .copied()
                .filter(|v| Some(*v) != attached && Some(*v) != self.pending)
                .min_by_key(|v| self.views.get(v).map_or(0, |e| e.last_used));
            let Some(victim) = victim else {
                break;
            };
            debug!(view = ?victim, max, "evicting cached view");
            self.evict(host, victim);
        }
    }

    /// Forget `view` and ask the host to destroy it.
    fn evict<H: Host + ?Sized>(&mut self, host: &mut H, view: ViewId) {
        if self.forget(view).is_some() {
            host.destroy_view(view);
        }
    }

    /// Drop all bookkeeping for `view`.
    fn forget(&mut self, view: ViewId) -> Option<ViewEntry> {
        let entry = self.views.remove(&view)?;
        if let Some(name) = &entry.identity
            && self.by_identity.get(name) == Some(&view)
        {
            self.by_identity.remove(name);
        }
        Some(entry)
    }

    /// Load state of `view`.
    fn state(&self, view: ViewId) -> Option<LoadState> {
        self.views.get(&view).map(|e| e.state)
    }

    /// Mark `view` as most recently used.
    fn touch(&mut self, view: ViewId) {
        self.tick += 1;
        if let Some(entry) = self.views.get_mut(&view) {
            entry.last_used = self.tick;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ShellEvent,
        host::{Display, Point, Rect},
        test_support::{Call, MockHost},
    };

    fn registry() -> Registry {
        Registry::new(PanelSize::default(), CachePolicy::default())
    }

    /// Deliver every outstanding successful load.
    fn settle(reg: &mut Registry, host: &mut MockHost) {
        for event in host.finish_loads() {
            if let ShellEvent::LoadFinished { view, result } = event {
                reg.on_load_finished(host, view, result);
            }
        }
    }

    #[test]
    fn first_toggle_waits_for_load() {
        let mut host = MockHost::new();
        let mut reg = registry();
        let outcome = reg.toggle(&mut host, "https://a", Some("a")).unwrap();
        assert_eq!(outcome, ToggleOutcome::Created);
        assert!(!host.visible());
        assert_eq!(reg.attached(), None);

        settle(&mut reg, &mut host);
        let view = reg.view_for("a").unwrap();
        assert!(host.visible());
        assert_eq!(host.attached(), Some(view));
        assert_eq!(reg.attached(), Some(view));
        assert_eq!(reg.pending(), None);
    }

    #[test]
    fn toggle_again_hides_then_shows() {
        let mut host = MockHost::new();
        let mut reg = registry();
        reg.toggle(&mut host, "https://a", Some("a")).unwrap();
        settle(&mut reg, &mut host);
        assert_eq!(
            reg.toggle(&mut host, "https://a", Some("a")).unwrap(),
            ToggleOutcome::Hidden
        );
        assert!(!host.visible());
        assert_eq!(
            reg.toggle(&mut host, "https://a", Some("a")).unwrap(),
            ToggleOutcome::Shown
        );
        assert!(host.visible());
        assert_eq!(host.count(|c| matches!(c, Call::CreateView(_))), 1);
        assert_eq!(host.count(|c| matches!(c, Call::CreatePanel(_))), 1);
    }

    #[test]
    fn later_toggle_wins_over_slow_load() {
        let mut host = MockHost::new();
        let mut reg = registry();
        reg.toggle(&mut host, "https://a", Some("a")).unwrap();
        reg.toggle(&mut host, "https://b", Some("b")).unwrap();
        let a = reg.view_for("a").unwrap();
        let b = reg.view_for("b").unwrap();
        assert_eq!(reg.pending(), Some(b));

        reg.on_load_finished(&mut host, a, Ok(()));
        assert!(!host.visible());
        reg.on_load_finished(&mut host, b, Ok(()));
        assert_eq!(host.attached(), Some(b));

        // The slow one is cached and ready.
        assert_eq!(
            reg.toggle(&mut host, "https://a", Some("a")).unwrap(),
            ToggleOutcome::Shown
        );
        assert_eq!(host.attached(), Some(a));
    }

    #[test]
    fn reentrant_toggle_while_loading_stays_pending() {
        let mut host = MockHost::new();
        let mut reg = registry();
        reg.toggle(&mut host, "https://a", Some("a")).unwrap();
        assert_eq!(
            reg.toggle(&mut host, "https://a", Some("a")).unwrap(),
            ToggleOutcome::Pending
        );
        assert_eq!(host.count(|c| matches!(c, Call::CreateView(_))), 1);
        settle(&mut reg, &mut host);
        assert_eq!(host.count(|c| *c == Call::ShowPanel), 1);
    }

    #[test]
    fn failed_load_drops_the_view() {
        let mut host = MockHost::new();
        let mut reg = registry();
        reg.toggle(&mut host, "https://a", Some("a")).unwrap();
        let a = reg.view_for("a").unwrap();
        reg.on_load_finished(&mut host, a, Err("dns".into()));
        assert!(reg.is_empty());
        assert!(host.calls_contains(&Call::DestroyView(a)));
        assert!(!host.visible());

        reg.toggle(&mut host, "https://a", Some("a")).unwrap();
        assert_ne!(reg.view_for("a"), Some(a));
    }

    #[test]
    fn destroyed_attached_view_hides_panel() {
        let mut host = MockHost::new();
        let mut reg = registry();
        reg.toggle(&mut host, "https://a", Some("a")).unwrap();
        settle(&mut reg, &mut host);
        let a = reg.view_for("a").unwrap();
        reg.on_view_destroyed(&mut host, a);
        assert!(!host.visible());
        assert_eq!(reg.view_for("a"), None);
        assert_eq!(reg.attached(), None);
        assert!(reg.has_panel());
        assert!(!host.views.contains_key(&a));
        assert!(host.calls_contains(&Call::DestroyView(a)));
    }

    #[test]
    fn destroy_before_load_suppresses_show() {
        let mut host = MockHost::new();
        let mut reg = registry();
        reg.toggle(&mut host, "https://a", Some("a")).unwrap();
        let a = reg.view_for("a").unwrap();
        assert_eq!(reg.pending(), Some(a));

        reg.on_view_destroyed(&mut host, a);
        assert_eq!(reg.pending(), None);
        assert!(!host.views.contains_key(&a));

        // A completion racing the teardown is ignored.
        reg.on_load_finished(&mut host, a, Ok(()));
        assert_eq!(host.count(|c| *c == Call::ShowPanel), 0);
        assert_eq!(host.count(|c| *c == Call::Attach(a)), 0);
        assert_eq!(reg.attached(), None);
        assert!(!host.visible());
    }

    #[test]
    fn destroyed_view_gets_no_theme_updates() {
        let mut host = MockHost::new();
        let mut reg = registry();
        reg.toggle(&mut host, "https://a", Some("a")).unwrap();
        settle(&mut reg, &mut host);
        reg.toggle(&mut host, "https://b", Some("b")).unwrap();
        settle(&mut reg, &mut host);
        let a = reg.view_for("a").unwrap();
        let b = reg.view_for("b").unwrap();
        reg.on_view_destroyed(&mut host, a);
        host.take_calls();

        reg.set_theme(&mut host, Theme::Dark);
        assert_eq!(host.count(|c| matches!(c, Call::Background(v, _) if *v == a)), 0);
        assert_eq!(host.count(|c| matches!(c, Call::Background(v, _) if *v == b)), 1);
    }

    #[test]
    fn ad_hoc_views_are_never_reused() {
        let mut host = MockHost::new();
        let mut reg = registry();
        reg.toggle(&mut host, "https://x", None).unwrap();
        settle(&mut reg, &mut host);
        let first = reg.attached().unwrap();
        reg.toggle(&mut host, "https://x", None).unwrap();
        settle(&mut reg, &mut host);
        let second = reg.attached().unwrap();
        assert_ne!(first, second);
        // The detached ad-hoc view is released.
        assert!(host.calls_contains(&Call::DestroyView(first)));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn superseded_ad_hoc_load_is_released() {
        let mut host = MockHost::new();
        let mut reg = registry();
        reg.toggle(&mut host, "https://x", None).unwrap();
        reg.toggle(&mut host, "https://a", Some("a")).unwrap();
        settle(&mut reg, &mut host);
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.attached(), reg.view_for("a"));
    }

    #[test]
    fn cache_limit_evicts_least_recent() {
        let mut host = MockHost::new();
        let mut reg = Registry::new(
            PanelSize::default(),
            CachePolicy { max_views: Some(2) },
        );
        for name in ["a", "b", "c"] {
            reg.toggle(&mut host, &format!("https://{name}"), Some(name))
                .unwrap();
            settle(&mut reg, &mut host);
        }
        assert_eq!(reg.view_for("a"), None);
        assert!(reg.view_for("b").is_some());
        assert!(reg.view_for("c").is_some());
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn theme_applies_to_live_and_new_views() {
        let mut host = MockHost::new();
        let mut reg = registry();
        reg.toggle(&mut host, "https://a", Some("a")).unwrap();
        let a = reg.view_for("a").unwrap();
        reg.set_theme(&mut host, Theme::Dark);
        assert!(host.calls_contains(&Call::Background(a, "#000".into())));
        reg.toggle(&mut host, "https://b", Some("b")).unwrap();
        let b = reg.view_for("b").unwrap();
        assert!(host.calls_contains(&Call::Background(b, "#000".into())));
    }

    #[test]
    fn hidden_panel_moves_to_cursor_display() {
        let mut host = MockHost::new();
        host.displays.push(Display {
            id: 2,
            bounds: Rect::new(1920, 0, 2560, 1440),
            work_area: Rect::new(1920, 0, 2560, 1440),
        });
        let mut reg = registry();
        reg.toggle(&mut host, "https://a", Some("a")).unwrap();
        settle(&mut reg, &mut host);
        reg.toggle(&mut host, "https://a", Some("a")).unwrap();

        host.cursor = Point { x: 2500, y: 400 };
        reg.toggle(&mut host, "https://a", Some("a")).unwrap();
        let bounds = host.panel.as_ref().unwrap().bounds;
        let cx = bounds.center_x();
        assert!((1920..1920 + 2560).contains(&cx));
    }
}
