use image::{Rgba, RgbaImage};
use popcorn_engine::{Menu, MenuItem, tray::TOOLTIP};
use tracing::{error, warn};
use tray_icon::{
    Icon, TrayIcon, TrayIconBuilder,
    menu::{self as native, PredefinedMenuItem, accelerator::Accelerator},
};

/// Icon edge in pixels.
const ICON_SIZE: u32 = 32;

/// Render the tray icon: a filled kernel shape on a transparent background.
fn tray_icon_image() -> Option<Icon> {
    let center = f64::from(ICON_SIZE) / 2.0 - 0.5;
    let radius = f64::from(ICON_SIZE) / 2.0 - 3.0;
    let img = RgbaImage::from_fn(ICON_SIZE, ICON_SIZE, |x, y| {
        let dx = f64::from(x) - center;
        let dy = f64::from(y) - center;
        // Three overlapping lobes on top of a round base.
        let lobes = [(-6.0, -5.0), (0.0, -8.0), (6.0, -5.0)]
            .iter()
            .any(|(ox, oy)| (dx - ox).hypot(dy - oy) < 6.5);
        if dx.hypot(dy) < radius * 0.7 || lobes {
            Rgba([0, 0, 0, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    });
    let (w, h) = img.dimensions();
    Icon::from_rgba(img.into_raw(), w, h).ok()
}

/// Create the tray icon with an empty menu; the shell installs the real one.
pub fn build_tray() -> Option<TrayIcon> {
    let mut builder = TrayIconBuilder::new()
        .with_menu(Box::new(native::Menu::new()))
        .with_tooltip(TOOLTIP);
    if let Some(icon) = tray_icon_image() {
        builder = builder.with_icon(icon).with_icon_as_template(true);
    }
    match builder.build() {
        Ok(t) => Some(t),
        Err(e) => {
            error!("Failed to create tray icon: {}", e);
            None
        }
    }
}

/// Convert the engine's menu model to a native menu.
pub fn native_menu(menu: &Menu) -> native::Menu {
    let out = native::Menu::new();
    for item in &menu.items {
        let appended = match item {
            MenuItem::Action {
                id,
                label,
                accelerator,
            } => {
                let accel = accelerator.as_deref().and_then(|a| match a.parse::<Accelerator>() {
                    Ok(accel) => Some(accel),
                    Err(e) => {
                        warn!(accelerator = a, "menu accelerator not supported: {}", e);
                        None
                    }
                });
                out.append(&native::MenuItem::with_id(
                    native::MenuId::new(&id.0),
                    label,
                    true,
                    accel,
                ))
            }
            MenuItem::Separator => out.append(&PredefinedMenuItem::separator()),
        };
        if let Err(e) = appended {
            warn!("failed to append menu item: {}", e);
        }
    }
    out
}
