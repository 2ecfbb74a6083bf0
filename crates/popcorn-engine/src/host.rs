//! Host collaborator API.
//!
//! The engine never talks to the windowing toolkit, web renderer, tray or
//! hotkey registry directly. Each concern is a small trait; a concrete host
//! implements all of them and is handed to the engine by `&mut` for the
//! duration of one event. Asynchronous outcomes (page loads, view teardown,
//! hotkey presses) come back as [`ShellEvent`](crate::ShellEvent)s.

use std::path::Path;

use crate::{Result, tray::Menu};

/// Opaque handle for an embedded view, allocated by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(pub u64);

/// Opaque handle for a registered global hotkey, allocated by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HotkeyId(pub u32);

/// Screen point in global desktop coordinates (top-left origin).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: i32,
    /// Vertical coordinate.
    pub y: i32,
}

/// Axis-aligned rectangle in global desktop coordinates (top-left origin).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width in logical pixels.
    pub width: u32,
    /// Height in logical pixels.
    pub height: u32,
}

impl Rect {
    /// Construct a rectangle.
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// True when `p` lies inside (left/top edges inclusive, right/bottom exclusive).
    pub fn contains(&self, p: Point) -> bool {
        let (x, y) = (i64::from(p.x), i64::from(p.y));
        let (left, top) = (i64::from(self.x), i64::from(self.y));
        x >= left
            && y >= top
            && x < left + i64::from(self.width)
            && y < top + i64::from(self.height)
    }

    /// Squared distance from `p` to the closest point of the rectangle; 0 inside.
    pub fn distance_sq(&self, p: Point) -> i64 {
        let clamp = |v: i64, lo: i64, hi: i64| v.clamp(lo, hi.max(lo));
        let (x, y) = (i64::from(p.x), i64::from(p.y));
        let left = i64::from(self.x);
        let top = i64::from(self.y);
        let right = left + i64::from(self.width) - 1;
        let bottom = top + i64::from(self.height) - 1;
        let dx = x - clamp(x, left, right);
        let dy = y - clamp(y, top, bottom);
        dx.saturating_mul(dx).saturating_add(dy.saturating_mul(dy))
    }

    /// Horizontal center.
    pub fn center_x(&self) -> i64 {
        i64::from(self.x) + i64::from(self.width) / 2
    }
}

/// One attached display as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Display {
    /// Host display identifier.
    pub id: u32,
    /// Full display bounds.
    pub bounds: Rect,
    /// Bounds minus menu bars, docks and panels.
    pub work_area: Rect,
}

/// System appearance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    /// Light appearance.
    #[default]
    Light,
    /// Dark appearance.
    Dark,
}

impl Theme {
    /// Background painted behind view content while it loads.
    pub fn background(self) -> &'static str {
        match self {
            Self::Light => "#fff",
            Self::Dark => "#000",
        }
    }
}

/// The single frameless, always-on-top panel window.
pub trait PanelWindow {
    /// Create the panel, hidden, at `bounds`. Only called when none exists.
    fn create_panel(&mut self, bounds: Rect) -> Result<()>;
    /// Move and resize the panel.
    fn set_panel_bounds(&mut self, bounds: Rect);
    /// Display `view` in the panel, replacing whatever it displayed before.
    fn attach_view(&mut self, view: ViewId);
    /// Bring the panel to the front and make it visible.
    fn show_panel(&mut self);
    /// Hide the panel without destroying it.
    fn hide_panel(&mut self);
    /// Whether the panel is currently visible.
    fn is_panel_visible(&self) -> bool;
    /// Allow or forbid closing the panel through the window manager.
    fn set_panel_closable(&mut self, closable: bool);
}

/// Navigable web content surfaces hosted in the panel.
pub trait ContentSurface {
    /// Create an empty, detached view.
    fn create_view(&mut self) -> Result<ViewId>;
    /// Start loading `url`; completion arrives as `ShellEvent::LoadFinished`.
    fn load_url(&mut self, view: ViewId, url: &str);
    /// Position `view` relative to the panel's content area.
    fn set_view_bounds(&mut self, view: ViewId, bounds: Rect);
    /// Give keyboard focus to `view`.
    fn focus_view(&mut self, view: ViewId);
    /// Reload the current page.
    fn reload_view(&mut self, view: ViewId);
    /// Navigate one history entry back.
    fn go_back(&mut self, view: ViewId);
    /// Navigate one history entry forward.
    fn go_forward(&mut self, view: ViewId);
    /// Navigate to the first history entry.
    fn go_to_start(&mut self, view: ViewId);
    /// Paint `color` (CSS notation) behind the content.
    fn set_view_background(&mut self, view: ViewId, color: &str);
    /// Tear down `view` and release its resources.
    fn destroy_view(&mut self, view: ViewId);
}

/// Pointer and display queries.
pub trait Screen {
    /// Current pointer position.
    fn cursor_position(&self) -> Point;
    /// All attached displays.
    fn displays(&self) -> Vec<Display>;
}

/// Global accelerator registration.
pub trait GlobalHotkeys {
    /// Register `accelerator` (e.g. `Command+Shift+P`).
    fn register(&mut self, accelerator: &str) -> Result<HotkeyId>;
    /// Unregister one hotkey. Unknown ids are ignored.
    fn unregister(&mut self, id: HotkeyId);
    /// Unregister every hotkey this process registered.
    fn unregister_all(&mut self);
}

/// Tray icon and its context menu.
pub trait TrayMenu {
    /// Set the hover text.
    fn set_tooltip(&mut self, tooltip: &str);
    /// Replace the whole context menu.
    fn set_menu(&mut self, menu: &Menu);
}

/// Process-level desktop services.
pub trait Desktop {
    /// Show a blocking error dialog.
    fn show_error(&mut self, title: &str, message: &str);
    /// Open `path` with the platform's default handler.
    fn open_path(&mut self, path: &Path);
    /// Current system appearance.
    fn theme(&self) -> Theme;
    /// Terminate the process after the current event.
    fn quit(&mut self);
}

/// Everything the shell needs from its host.
pub trait Host: PanelWindow + ContentSurface + Screen + GlobalHotkeys + TrayMenu + Desktop {}

impl<T> Host for T where T: PanelWindow + ContentSurface + Screen + GlobalHotkeys + TrayMenu + Desktop
{}
