//! Global shortcut bindings derived from config.

use std::collections::HashMap;

use config::Config;
use tracing::{debug, trace, warn};

use crate::{
    Error, Result,
    host::{GlobalHotkeys, HotkeyId},
};

/// What a global hotkey press asks the shell to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShortcutAction {
    /// Flip the panel if it is showing something, else toggle the default app.
    TogglePanel,
    /// Toggle one app.
    ToggleApp {
        /// App name (view identity).
        name: String,
        /// App URL.
        url: String,
    },
}

/// Manages global hotkey bindings and their lifecycle.
#[derive(Debug, Default)]
pub struct ShortcutManager {
    /// Map registration id → (accelerator, action).
    id_map: HashMap<HotkeyId, (String, ShortcutAction)>,
    /// Map accelerator → registration id, used to resolve duplicates.
    inv_map: HashMap<String, HotkeyId>,
}

impl ShortcutManager {
    /// Create a manager with nothing bound.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every binding with the ones `config` asks for.
    ///
    /// Everything previously registered is released first, so calling this
    /// with nothing bound is fine. Per-app accelerators the host rejects are
    /// skipped. A rejected global accelerator is reported as an error once
    /// the per-app bindings are in place.
    pub fn bind<H: GlobalHotkeys + ?Sized>(&mut self, host: &mut H, config: &Config) -> Result<()> {
        host.unregister_all();
        self.id_map.clear();
        self.inv_map.clear();

        let global = config.shortcut.accelerator();
        debug!("Registering global shortcut: {}", global);
        let global_result = self.register(host, &global, ShortcutAction::TogglePanel);

        for app in config.apps.values() {
            let Some(accelerator) = config::accelerator(app.shortcut.as_ref()) else {
                continue;
            };
            debug!("Registering {} shortcut: {}", app.name, accelerator);
            let action = ShortcutAction::ToggleApp {
                name: app.name.clone(),
                url: app.url.clone(),
            };
            if let Err(e) = self.register(host, &accelerator, action) {
                warn!("skipping shortcut {} for {}: {}", accelerator, app.name, e);
            }
        }

        debug!("Shortcuts bound: {} accelerators active", self.id_map.len());
        global_result.map_err(|e| Error::GlobalShortcut {
            accelerator: global,
            reason: e.to_string(),
        })
    }

    /// Release every binding.
    pub fn clear<H: GlobalHotkeys + ?Sized>(&mut self, host: &mut H) {
        host.unregister_all();
        self.id_map.clear();
        self.inv_map.clear();
    }

    /// Register one accelerator. A later registration of the same accelerator
    /// replaces the earlier one.
    fn register<H: GlobalHotkeys + ?Sized>(
        &mut self,
        host: &mut H,
        accelerator: &str,
        action: ShortcutAction,
    ) -> Result<()> {
        if let Some(old) = self.inv_map.remove(accelerator) {
            warn!("accelerator {} bound twice; the later binding wins", accelerator);
            host.unregister(old);
            self.id_map.remove(&old);
        }
        let id = host.register(accelerator)?;
        trace!("Registered {} with id {:?}", accelerator, id);
        self.id_map.insert(id, (accelerator.to_string(), action));
        self.inv_map.insert(accelerator.to_string(), id);
        Ok(())
    }

    /// Action bound to `id`, if any.
    pub fn action(&self, id: HotkeyId) -> Option<&ShortcutAction> {
        self.id_map.get(&id).map(|(_, action)| action)
    }

    /// Registration id for `accelerator`, if bound.
    pub fn id_for(&self, accelerator: &str) -> Option<HotkeyId> {
        self.inv_map.get(accelerator).copied()
    }

    /// Snapshot current bindings as sorted (accelerator, action) pairs.
    pub fn bindings_snapshot(&self) -> Vec<(String, ShortcutAction)> {
        let mut pairs: Vec<(String, ShortcutAction)> = self.id_map.values().cloned().collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        pairs
    }
}
