//! Test support utilities for popcorn-engine unit and integration tests.
//! These helpers are public so integration tests can reach them; they are
//! not used by the engine itself.

use std::{
    collections::{BTreeMap, HashSet, VecDeque},
    mem,
    path::{Path, PathBuf},
};

use crate::{
    Error, Result, ShellEvent,
    host::{
        ContentSurface, Desktop, Display, GlobalHotkeys, HotkeyId, PanelWindow, Point, Rect,
        Screen, Theme, TrayMenu, ViewId,
    },
    tray::Menu,
};

/// One recorded host call.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreatePanel(Rect),
    SetPanelBounds(Rect),
    Attach(ViewId),
    ShowPanel,
    HidePanel,
    SetClosable(bool),
    CreateView(ViewId),
    LoadUrl(ViewId, String),
    SetViewBounds(ViewId, Rect),
    FocusView(ViewId),
    Reload(ViewId),
    Back(ViewId),
    Forward(ViewId),
    Home(ViewId),
    Background(ViewId, String),
    DestroyView(ViewId),
    Register(String),
    Unregister(HotkeyId),
    UnregisterAll,
    Tooltip(String),
    SetMenu(Menu),
    ShowError(String, String),
    OpenPath(PathBuf),
    Quit,
}

/// Panel state as seen by the mock.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default)]
pub struct MockPanel {
    pub bounds: Rect,
    pub visible: bool,
    pub attached: Option<ViewId>,
    pub closable: bool,
}

/// In-memory host that records every call and keeps just enough state to
/// answer queries.
#[allow(missing_docs, clippy::missing_docs_in_private_items)]
#[derive(Debug)]
pub struct MockHost {
    pub calls: Vec<Call>,
    pub panel: Option<MockPanel>,
    /// Live views and the URLs loaded into each, oldest first.
    pub views: BTreeMap<ViewId, Vec<String>>,
    pub hotkeys: BTreeMap<HotkeyId, String>,
    pub menu: Option<Menu>,
    pub tooltip: Option<String>,
    pub errors: Vec<(String, String)>,
    pub opened: Vec<PathBuf>,
    pub cursor: Point,
    pub displays: Vec<Display>,
    pub theme: Theme,
    pub quit: bool,
    /// Accelerators `register` refuses.
    pub rejected: HashSet<String>,
    /// Loads started but not yet reported back.
    loads: VecDeque<ViewId>,
    next_view: u64,
    next_hotkey: u32,
}

impl Default for MockHost {
    fn default() -> Self {
        Self {
            calls: Vec::new(),
            panel: None,
            views: BTreeMap::new(),
            hotkeys: BTreeMap::new(),
            menu: None,
            tooltip: None,
            errors: Vec::new(),
            opened: Vec::new(),
            cursor: Point { x: 100, y: 100 },
            displays: vec![Display {
                id: 1,
                bounds: Rect::new(0, 0, 1920, 1080),
                work_area: Rect::new(0, 0, 1920, 1080),
            }],
            theme: Theme::Light,
            quit: false,
            rejected: HashSet::new(),
            loads: VecDeque::new(),
            next_view: 1,
            next_hotkey: 1,
        }
    }
}

#[allow(missing_docs)]
impl MockHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse future registrations of `accelerator`.
    pub fn reject(&mut self, accelerator: &str) {
        self.rejected.insert(accelerator.to_string());
    }

    pub fn visible(&self) -> bool {
        self.panel.as_ref().is_some_and(|p| p.visible)
    }

    pub fn attached(&self) -> Option<ViewId> {
        self.panel.as_ref().and_then(|p| p.attached)
    }

    pub fn calls_contains(&self, call: &Call) -> bool {
        self.calls.contains(call)
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }

    /// Clear the call log, keeping state.
    pub fn take_calls(&mut self) -> Vec<Call> {
        mem::take(&mut self.calls)
    }

    /// Accelerators currently registered, sorted.
    pub fn accelerators(&self) -> Vec<String> {
        let mut v: Vec<String> = self.hotkeys.values().cloned().collect();
        v.sort();
        v
    }

    /// Id the mock handed out for `accelerator`.
    pub fn hotkey_id(&self, accelerator: &str) -> Option<HotkeyId> {
        self.hotkeys
            .iter()
            .find(|(_, a)| a.as_str() == accelerator)
            .map(|(id, _)| *id)
    }

    /// Report every outstanding load as successful, oldest first.
    pub fn finish_loads(&mut self) -> Vec<ShellEvent> {
        self.loads
            .drain(..)
            .map(|view| ShellEvent::LoadFinished {
                view,
                result: Ok(()),
            })
            .collect()
    }

    /// Report the load of `view` as failed.
    pub fn fail_load(&mut self, view: ViewId, reason: &str) -> ShellEvent {
        self.loads.retain(|v| *v != view);
        ShellEvent::LoadFinished {
            view,
            result: Err(reason.to_string()),
        }
    }

    /// Panel state, created on first use.
    fn panel_mut(&mut self) -> &mut MockPanel {
        self.panel.get_or_insert_with(MockPanel::default)
    }
}

impl PanelWindow for MockHost {
    fn create_panel(&mut self, bounds: Rect) -> Result<()> {
        self.calls.push(Call::CreatePanel(bounds));
        self.panel = Some(MockPanel {
            bounds,
            ..MockPanel::default()
        });
        Ok(())
    }

    fn set_panel_bounds(&mut self, bounds: Rect) {
        self.calls.push(Call::SetPanelBounds(bounds));
        self.panel_mut().bounds = bounds;
    }

    fn attach_view(&mut self, view: ViewId) {
        self.calls.push(Call::Attach(view));
        self.panel_mut().attached = Some(view);
    }

    fn show_panel(&mut self) {
        self.calls.push(Call::ShowPanel);
        self.panel_mut().visible = true;
    }

    fn hide_panel(&mut self) {
        self.calls.push(Call::HidePanel);
        self.panel_mut().visible = false;
    }

    fn is_panel_visible(&self) -> bool {
        self.visible()
    }

    fn set_panel_closable(&mut self, closable: bool) {
        self.calls.push(Call::SetClosable(closable));
        self.panel_mut().closable = closable;
    }
}

impl ContentSurface for MockHost {
    fn create_view(&mut self) -> Result<ViewId> {
        let view = ViewId(self.next_view);
        self.next_view += 1;
        self.calls.push(Call::CreateView(view));
        self.views.insert(view, Vec::new());
        Ok(view)
    }

    fn load_url(&mut self, view: ViewId, url: &str) {
        self.calls.push(Call::LoadUrl(view, url.to_string()));
        if let Some(history) = self.views.get_mut(&view) {
            history.push(url.to_string());
        }
        self.loads.push_back(view);
    }

    fn set_view_bounds(&mut self, view: ViewId, bounds: Rect) {
        self.calls.push(Call::SetViewBounds(view, bounds));
    }

    fn focus_view(&mut self, view: ViewId) {
        self.calls.push(Call::FocusView(view));
    }

    fn reload_view(&mut self, view: ViewId) {
        self.calls.push(Call::Reload(view));
    }

    fn go_back(&mut self, view: ViewId) {
        self.calls.push(Call::Back(view));
    }

    fn go_forward(&mut self, view: ViewId) {
        self.calls.push(Call::Forward(view));
    }

    fn go_to_start(&mut self, view: ViewId) {
        self.calls.push(Call::Home(view));
    }

    fn set_view_background(&mut self, view: ViewId, color: &str) {
        self.calls.push(Call::Background(view, color.to_string()));
    }

    fn destroy_view(&mut self, view: ViewId) {
        self.calls.push(Call::DestroyView(view));
        self.views.remove(&view);
        self.loads.retain(|v| *v != view);
        if let Some(panel) = self.panel.as_mut()
            && panel.attached == Some(view)
        {
            panel.attached = None;
        }
    }
}

impl Screen for MockHost {
    fn cursor_position(&self) -> Point {
        self.cursor
    }

    fn displays(&self) -> Vec<Display> {
        self.displays.clone()
    }
}

impl GlobalHotkeys for MockHost {
    fn register(&mut self, accelerator: &str) -> Result<HotkeyId> {
        self.calls.push(Call::Register(accelerator.to_string()));
        if self.rejected.contains(accelerator) {
            return Err(Error::Host(format!("{accelerator} is taken")));
        }
        let id = HotkeyId(self.next_hotkey);
        self.next_hotkey += 1;
        self.hotkeys.insert(id, accelerator.to_string());
        Ok(id)
    }

    fn unregister(&mut self, id: HotkeyId) {
        self.calls.push(Call::Unregister(id));
        self.hotkeys.remove(&id);
    }

    fn unregister_all(&mut self) {
        self.calls.push(Call::UnregisterAll);
        self.hotkeys.clear();
    }
}

impl TrayMenu for MockHost {
    fn set_tooltip(&mut self, tooltip: &str) {
        self.calls.push(Call::Tooltip(tooltip.to_string()));
        self.tooltip = Some(tooltip.to_string());
    }

    fn set_menu(&mut self, menu: &Menu) {
        self.calls.push(Call::SetMenu(menu.clone()));
        self.menu = Some(menu.clone());
    }
}

impl Desktop for MockHost {
    fn show_error(&mut self, title: &str, message: &str) {
        self.calls
            .push(Call::ShowError(title.to_string(), message.to_string()));
        self.errors.push((title.to_string(), message.to_string()));
    }

    fn open_path(&mut self, path: &Path) {
        self.calls.push(Call::OpenPath(path.to_path_buf()));
        self.opened.push(path.to_path_buf());
    }

    fn theme(&self) -> Theme {
        self.theme
    }

    fn quit(&mut self) {
        self.calls.push(Call::Quit);
        self.quit = true;
    }
}
