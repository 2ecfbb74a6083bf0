//! Panel placement relative to the display under the pointer.

use crate::host::{Display, Point, Rect, Screen};

/// Fallback display used when the host has not reported any displays.
const DEFAULT_DISPLAY: Display = Display {
    id: 0,
    bounds: Rect::new(0, 0, 1440, 900),
    work_area: Rect::new(0, 0, 1440, 900),
};

/// Panel size in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelSize {
    /// Width.
    pub width: u32,
    /// Height.
    pub height: u32,
}

impl PanelSize {
    /// Size as reported by a config.
    pub fn from_config(cfg: &config::Config) -> Self {
        let (width, height) = cfg.panel_size();
        Self { width, height }
    }

    /// The panel's content area in panel-local coordinates.
    pub fn content_bounds(self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }
}

impl Default for PanelSize {
    fn default() -> Self {
        Self {
            width: config::defaults::PANEL_WIDTH,
            height: config::defaults::PANEL_HEIGHT,
        }
    }
}

/// Display that contains `cursor`, else the nearest one, else a fixed fallback.
pub fn display_for_point(displays: &[Display], cursor: Point) -> Display {
    displays
        .iter()
        .find(|d| d.bounds.contains(cursor))
        .or_else(|| {
            displays
                .iter()
                .min_by_key(|d| d.bounds.distance_sq(cursor))
        })
        .copied()
        .unwrap_or(DEFAULT_DISPLAY)
}

/// Panel bounds on `display`: centered horizontally, with its middle a third
/// of the way down the work area.
pub fn panel_bounds_on(display: &Display, size: PanelSize) -> Rect {
    let work = display.work_area;
    let half = |v: u32| f64::from(v) / 2.0;
    let x = f64::from(work.x) + (half(work.width) - half(size.width)).floor();
    let y = f64::from(work.y) + (f64::from(work.height) / 3.0 - half(size.height)).floor();
    Rect::new(x as i32, y as i32, size.width, size.height)
}

/// Panel bounds for the display currently under the pointer.
pub fn panel_bounds<S: Screen + ?Sized>(screen: &S, size: PanelSize) -> Rect {
    let display = display_for_point(&screen.displays(), screen.cursor_position());
    panel_bounds_on(&display, size)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dual() -> Vec<Display> {
        vec![
            Display {
                id: 1,
                bounds: Rect::new(0, 0, 1920, 1080),
                work_area: Rect::new(0, 25, 1920, 1055),
            },
            Display {
                id: 2,
                bounds: Rect::new(1920, -200, 2560, 1440),
                work_area: Rect::new(1920, -200, 2560, 1400),
            },
        ]
    }

    #[test]
    fn centers_on_primary() {
        let r = panel_bounds_on(&dual()[0], PanelSize::default());
        // 1920/2 - 750/2 = 585; 25 + floor(1055/3 - 220) = 25 + 131
        assert_eq!(r, Rect::new(585, 156, 750, 440));
    }

    #[test]
    fn follows_cursor_to_secondary() {
        let displays = dual();
        let cursor = Point { x: 2500, y: 300 };
        let d = display_for_point(&displays, cursor);
        assert_eq!(d.id, 2);
        let r = panel_bounds_on(&d, PanelSize::default());
        let cx = r.center_x();
        assert!(cx >= 1920 && cx < 1920 + 2560, "center {cx} outside secondary");
        assert_eq!(r.x, 1920 + 1280 - 375);
        assert_eq!(r.y, -200 + (1400 / 3) - 220);
    }

    #[test]
    fn cursor_in_gap_uses_nearest_display() {
        let displays = dual();
        // Below the primary display, closer to it than to the secondary.
        let d = display_for_point(&displays, Point { x: 100, y: 1200 });
        assert_eq!(d.id, 1);
    }

    #[test]
    fn no_displays_falls_back() {
        let r = panel_bounds_on(
            &display_for_point(&[], Point::default()),
            PanelSize {
                width: 400,
                height: 300,
            },
        );
        assert_eq!(r, Rect::new(520, 150, 400, 300));
    }

    #[test]
    fn oversized_panel_goes_negative() {
        let d = Display {
            id: 9,
            bounds: Rect::new(0, 0, 800, 600),
            work_area: Rect::new(0, 0, 800, 600),
        };
        let r = panel_bounds_on(
            &d,
            PanelSize {
                width: 1001,
                height: 440,
            },
        );
        // floor(400 - 500.5) = -101
        assert_eq!(r.x, -101);
    }
}
