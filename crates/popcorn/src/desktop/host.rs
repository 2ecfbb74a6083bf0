//! `popcorn_engine::host` implemented on tao, wry, tray-icon and global-hotkey.

use std::{collections::HashMap, path::Path, process::Command};

use global_hotkey::{GlobalHotKeyManager, hotkey::HotKey};
use popcorn_engine::{
    Error, Menu, Result, ShellEvent,
    host::{
        ContentSurface, Desktop, Display, GlobalHotkeys, HotkeyId, PanelWindow, Point, Rect,
        Screen, Theme, TrayMenu, ViewId,
    },
    input::{KeyEventKind, KeyInput},
};
use serde::Deserialize;
use tao::{
    dpi::{LogicalPosition, LogicalSize},
    event_loop::{EventLoopProxy, EventLoopWindowTarget},
    window::{self, Window, WindowBuilder},
};
use tracing::{debug, trace, warn};
use tray_icon::TrayIcon;
use wry::{PageLoadEvent, WebView, WebViewBuilder, dpi as wry_dpi, http::Request};

use super::{UserEvent, post, tray};

/// Title of the panel window.
const PANEL_TITLE: &str = "Popcorn";

/// Forwards navigation keys and `window.close()` to the shell.
const PAGE_SCRIPT: &str = r#"
(() => {
  const keys = ["[", "]", "r", "Escape", ","];
  window.addEventListener("keydown", (e) => {
    if (!e.metaKey || !keys.includes(e.key)) return;
    e.preventDefault();
    window.ipc.postMessage(JSON.stringify({ type: "key", key: e.key, meta: true }));
  }, true);
  window.close = () => window.ipc.postMessage(JSON.stringify({ type: "close" }));
})();
"#;

/// Messages posted by [`PAGE_SCRIPT`].
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum PageMessage {
    /// Intercepted key-down.
    Key {
        /// DOM key value.
        key: String,
        /// Meta modifier held.
        #[serde(default)]
        meta: bool,
    },
    /// The page called `window.close()`.
    Close,
}

/// One embedded view. The webview is built on the first `load_url`, so a
/// page-load event always belongs to a real URL.
struct ViewSlot {
    /// Built webview.
    webview: Option<WebView>,
    /// Bounds inside the panel.
    bounds: Rect,
    /// Background as RGBA.
    background: (u8, u8, u8, u8),
    /// Whether this view is the one displayed.
    visible: bool,
    /// First URL loaded, used by the "home" command.
    start_url: Option<String>,
}

/// Native resources that outlive a single event.
pub struct DesktopState {
    /// Handle for posting events back into the loop.
    proxy: EventLoopProxy<UserEvent>,
    /// The panel window.
    window: Option<Window>,
    /// Embedded views.
    views: HashMap<ViewId, ViewSlot>,
    /// Next view id.
    next_view: u64,
    /// Global hotkey registry.
    hotkeys: GlobalHotKeyManager,
    /// Hotkeys currently registered by id.
    registered: HashMap<HotkeyId, HotKey>,
    /// Tray icon, installed once the loop runs.
    tray: Option<TrayIcon>,
    /// Set by `Desktop::quit`.
    pub quit_requested: bool,
}

impl DesktopState {
    /// Create the hotkey manager; everything else is created lazily.
    pub fn new(proxy: EventLoopProxy<UserEvent>) -> Result<Self> {
        let hotkeys = GlobalHotKeyManager::new()
            .map_err(|e| Error::Host(format!("hotkey manager unavailable: {e}")))?;
        Ok(Self {
            proxy,
            window: None,
            views: HashMap::new(),
            next_view: 1,
            hotkeys,
            registered: HashMap::new(),
            tray: None,
            quit_requested: false,
        })
    }

    /// Create the tray icon. Must run after the event loop started.
    pub fn install_tray(&mut self) {
        if self.tray.is_none() {
            self.tray = tray::build_tray();
        }
    }
}

/// The host handed to the shell for one event.
pub struct DesktopHost<'a> {
    /// Window target of the running loop.
    pub target: &'a EventLoopWindowTarget<UserEvent>,
    /// Long-lived native state.
    pub state: &'a mut DesktopState,
}

impl DesktopHost<'_> {
    /// Webview for `view`, if built.
    fn webview(&self, view: ViewId) -> Option<&WebView> {
        self.state.views.get(&view).and_then(|s| s.webview.as_ref())
    }

    /// Run `script` in `view`.
    fn eval(&self, view: ViewId, script: &str) {
        if let Some(webview) = self.webview(view)
            && let Err(e) = webview.evaluate_script(script)
        {
            warn!(?view, "script failed: {}", e);
        }
    }

    /// Build the webview for `view` loading `url`.
    fn build_webview(&self, view: ViewId, slot: &ViewSlot, url: &str) -> Result<WebView> {
        let window = self
            .state
            .window
            .as_ref()
            .ok_or_else(|| Error::Host("panel not created".into()))?;

        let ipc_proxy = self.state.proxy.clone();
        let load_proxy = self.state.proxy.clone();
        WebViewBuilder::new()
            .with_url(url)
            .with_bounds(to_wry_rect(slot.bounds))
            .with_visible(slot.visible)
            .with_background_color(slot.background)
            .with_initialization_script(PAGE_SCRIPT)
            // Right-click "Inspect Element" in debug builds.
            .with_devtools(cfg!(debug_assertions))
            .with_ipc_handler(move |req: Request<String>| {
                match serde_json::from_str::<PageMessage>(req.body()) {
                    Ok(PageMessage::Key { key, meta }) => {
                        let input = KeyInput {
                            kind: KeyEventKind::Down,
                            key,
                            meta,
                        };
                        post(&ipc_proxy, ShellEvent::KeyInput { view, input });
                    }
                    Ok(PageMessage::Close) => post(&ipc_proxy, ShellEvent::ViewDestroyed(view)),
                    Err(e) => trace!(?view, "ignoring page message: {}", e),
                }
            })
            .with_on_page_load_handler(move |event, url| {
                if matches!(event, PageLoadEvent::Finished) {
                    trace!(?view, url = %url, "page loaded");
                    post(&load_proxy, ShellEvent::LoadFinished { view, result: Ok(()) });
                }
            })
            .build_as_child(window)
            .map_err(|e| Error::Host(e.to_string()))
    }

    /// Physical cursor position, if the platform reports one.
    fn raw_cursor(&self) -> Option<(f64, f64)> {
        self.target
            .cursor_position()
            .ok()
            .map(|p| (p.x, p.y))
    }
}

impl PanelWindow for DesktopHost<'_> {
    fn create_panel(&mut self, bounds: Rect) -> Result<()> {
        let window = WindowBuilder::new()
            .with_title(PANEL_TITLE)
            .with_decorations(false)
            .with_always_on_top(true)
            .with_resizable(false)
            .with_minimizable(false)
            .with_maximizable(false)
            .with_closable(false)
            .with_visible(false)
            .with_inner_size(LogicalSize::new(bounds.width, bounds.height))
            .with_position(LogicalPosition::new(bounds.x, bounds.y))
            .build(self.target)
            .map_err(|e| Error::Host(format!("panel window: {e}")))?;
        post(
            &self.state.proxy,
            ShellEvent::ThemeChanged(map_theme(window.theme())),
        );
        self.state.window = Some(window);
        Ok(())
    }

    fn set_panel_bounds(&mut self, bounds: Rect) {
        if let Some(window) = &self.state.window {
            window.set_outer_position(LogicalPosition::new(bounds.x, bounds.y));
            window.set_inner_size(LogicalSize::new(bounds.width, bounds.height));
        }
    }

    fn attach_view(&mut self, view: ViewId) {
        for (id, slot) in &mut self.state.views {
            slot.visible = *id == view;
            if let Some(webview) = &slot.webview
                && let Err(e) = webview.set_visible(slot.visible)
            {
                warn!(view = ?id, "set_visible failed: {}", e);
            }
        }
    }

    fn show_panel(&mut self) {
        if let Some(window) = &self.state.window {
            window.set_visible(true);
            window.set_focus();
        }
    }

    fn hide_panel(&mut self) {
        if let Some(window) = &self.state.window {
            window.set_visible(false);
        }
    }

    fn is_panel_visible(&self) -> bool {
        self.state.window.as_ref().is_some_and(Window::is_visible)
    }

    fn set_panel_closable(&mut self, closable: bool) {
        if let Some(window) = &self.state.window {
            window.set_closable(closable);
        }
    }
}

impl ContentSurface for DesktopHost<'_> {
    fn create_view(&mut self) -> Result<ViewId> {
        if self.state.window.is_none() {
            return Err(Error::Host("panel not created".into()));
        }
        let view = ViewId(self.state.next_view);
        self.state.next_view += 1;
        self.state.views.insert(
            view,
            ViewSlot {
                webview: None,
                bounds: Rect::default(),
                background: (255, 255, 255, 255),
                visible: false,
                start_url: None,
            },
        );
        Ok(view)
    }

    fn load_url(&mut self, view: ViewId, url: &str) {
        let Some(slot) = self.state.views.get(&view) else {
            return;
        };
        if let Some(webview) = &slot.webview {
            if let Err(e) = webview.load_url(url) {
                warn!(?view, url, "load failed: {}", e);
            }
            return;
        }
        match self.build_webview(view, slot, url) {
            Ok(webview) => {
                if let Some(slot) = self.state.views.get_mut(&view) {
                    slot.webview = Some(webview);
                    slot.start_url = Some(url.to_string());
                }
            }
            Err(e) => post(
                &self.state.proxy,
                ShellEvent::LoadFinished {
                    view,
                    result: Err(e.to_string()),
                },
            ),
        }
    }

    fn set_view_bounds(&mut self, view: ViewId, bounds: Rect) {
        if let Some(slot) = self.state.views.get_mut(&view) {
            slot.bounds = bounds;
            if let Some(webview) = &slot.webview
                && let Err(e) = webview.set_bounds(to_wry_rect(bounds))
            {
                warn!(?view, "set_bounds failed: {}", e);
            }
        }
    }

    fn focus_view(&mut self, view: ViewId) {
        if let Some(webview) = self.webview(view)
            && let Err(e) = webview.focus()
        {
            debug!(?view, "focus failed: {}", e);
        }
    }

    fn reload_view(&mut self, view: ViewId) {
        if let Some(webview) = self.webview(view)
            && let Err(e) = webview.reload()
        {
            warn!(?view, "reload failed: {}", e);
        }
    }

    fn go_back(&mut self, view: ViewId) {
        self.eval(view, "history.back()");
    }

    fn go_forward(&mut self, view: ViewId) {
        self.eval(view, "history.forward()");
    }

    fn go_to_start(&mut self, view: ViewId) {
        let Some(slot) = self.state.views.get(&view) else {
            return;
        };
        if let (Some(webview), Some(url)) = (&slot.webview, &slot.start_url)
            && let Err(e) = webview.load_url(url)
        {
            warn!(?view, "navigation home failed: {}", e);
        }
    }

    fn set_view_background(&mut self, view: ViewId, color: &str) {
        let Some(rgba) = parse_hex_color(color) else {
            warn!(color, "unsupported background color");
            return;
        };
        if let Some(slot) = self.state.views.get_mut(&view) {
            slot.background = rgba;
            if let Some(webview) = &slot.webview
                && let Err(e) = webview.set_background_color(rgba)
            {
                debug!(?view, "set_background_color failed: {}", e);
            }
        }
    }

    fn destroy_view(&mut self, view: ViewId) {
        // Dropping the webview tears it down.
        if self.state.views.remove(&view).is_some() {
            debug!(?view, "view destroyed");
        }
    }
}

impl Screen for DesktopHost<'_> {
    fn cursor_position(&self) -> Point {
        let Some((x, y)) = self.raw_cursor() else {
            return Point::default();
        };
        // Scale by the monitor the cursor is on.
        let scale = self
            .target
            .available_monitors()
            .find(|m| {
                let (pos, size) = (m.position(), m.size());
                x >= f64::from(pos.x)
                    && y >= f64::from(pos.y)
                    && x < f64::from(pos.x) + f64::from(size.width)
                    && y < f64::from(pos.y) + f64::from(size.height)
            })
            .or_else(|| self.target.primary_monitor())
            .map_or(1.0, |m| m.scale_factor());
        Point {
            x: (x / scale).floor() as i32,
            y: (y / scale).floor() as i32,
        }
    }

    fn displays(&self) -> Vec<Display> {
        self.target
            .available_monitors()
            .enumerate()
            .map(|(i, m)| {
                let scale = m.scale_factor();
                let pos = m.position().to_logical::<i32>(scale);
                let size = m.size().to_logical::<u32>(scale);
                let bounds = Rect::new(pos.x, pos.y, size.width, size.height);
                Display {
                    id: u32::try_from(i).unwrap_or(u32::MAX),
                    bounds,
                    work_area: bounds,
                }
            })
            .collect()
    }
}

impl GlobalHotkeys for DesktopHost<'_> {
    fn register(&mut self, accelerator: &str) -> Result<HotkeyId> {
        let hotkey: HotKey = accelerator
            .parse()
            .map_err(|e| Error::Host(format!("{accelerator}: {e}")))?;
        self.state
            .hotkeys
            .register(hotkey)
            .map_err(|e| Error::Host(e.to_string()))?;
        let id = HotkeyId(hotkey.id());
        self.state.registered.insert(id, hotkey);
        Ok(id)
    }

    fn unregister(&mut self, id: HotkeyId) {
        if let Some(hotkey) = self.state.registered.remove(&id)
            && let Err(e) = self.state.hotkeys.unregister(hotkey)
        {
            debug!(?id, "unregister failed: {}", e);
        }
    }

    fn unregister_all(&mut self) {
        let all: Vec<HotKey> = self.state.registered.drain().map(|(_, hk)| hk).collect();
        if !all.is_empty()
            && let Err(e) = self.state.hotkeys.unregister_all(&all)
        {
            debug!("unregister_all failed: {}", e);
        }
    }
}

impl TrayMenu for DesktopHost<'_> {
    fn set_tooltip(&mut self, tooltip: &str) {
        if let Some(icon) = &self.state.tray
            && let Err(e) = icon.set_tooltip(Some(tooltip))
        {
            warn!("set_tooltip failed: {}", e);
        }
    }

    fn set_menu(&mut self, menu: &Menu) {
        if let Some(icon) = &self.state.tray {
            icon.set_menu(Some(Box::new(tray::native_menu(menu))));
        }
    }
}

impl Desktop for DesktopHost<'_> {
    fn show_error(&mut self, title: &str, message: &str) {
        super::error_dialog(title, message);
    }

    fn open_path(&mut self, path: &Path) {
        let opener = if cfg!(target_os = "macos") {
            "open"
        } else {
            "xdg-open"
        };
        if Command::new(opener).arg(path).spawn().is_err() {
            warn!(path = %path.display(), "failed to open config file");
        }
    }

    fn theme(&self) -> Theme {
        self.state
            .window
            .as_ref()
            .map_or(Theme::Light, |w| map_theme(w.theme()))
    }

    fn quit(&mut self) {
        self.state.quit_requested = true;
    }
}

/// Engine theme for a tao theme.
pub fn map_theme(theme: window::Theme) -> Theme {
    match theme {
        window::Theme::Dark => Theme::Dark,
        _ => Theme::Light,
    }
}

/// Panel-local rectangle in wry's terms.
fn to_wry_rect(r: Rect) -> wry::Rect {
    wry::Rect {
        position: wry_dpi::LogicalPosition::new(r.x, r.y).into(),
        size: wry_dpi::LogicalSize::new(r.width, r.height).into(),
    }
}

/// Parse `#rgb` or `#rrggbb` into opaque RGBA.
fn parse_hex_color(color: &str) -> Option<(u8, u8, u8, u8)> {
    let hex = color.strip_prefix('#')?;
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        3 => {
            let mut it = hex.chars().map(|c| channel(&c.to_string()).map(|v| v * 17));
            Some((it.next()??, it.next()??, it.next()??, 255))
        }
        6 => Some((
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
            255,
        )),
        _ => None,
    }
}
