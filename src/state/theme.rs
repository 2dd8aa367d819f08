use egui::{Color32, Visuals};
use serde::{Deserialize, Serialize};

use crate::state::data_series::LineColor;

/// Smallest luma difference between a line and the surface under it.
const MIN_LINE_CONTRAST: i32 = 48;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

/// Colours used to paint the chart area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartPalette {
    pub background: Color32,
    pub grid: Color32,
    pub axis: Color32,
    /// Opaque colour the chart sits on, even when `background` is transparent.
    pub surface: Color32,
    /// Drawn instead of a line colour that would vanish into `surface`.
    pub ink: Color32,
}

impl ChartPalette {
    pub fn line_color(&self, color: LineColor) -> Color32 {
        let line = color.color32();
        let contrast = (luma(line) - luma(self.surface)).abs();
        if contrast < MIN_LINE_CONTRAST {
            self.ink
        } else {
            line
        }
    }
}

fn luma(c: Color32) -> i32 {
    (299 * c.r() as i32 + 587 * c.g() as i32 + 114 * c.b() as i32) / 1000
}

impl Theme {
    pub fn toggle(&self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn visuals(&self) -> Visuals {
        match self {
            Theme::Dark => Visuals::dark(),
            Theme::Light => Visuals::light(),
        }
    }

    /// Palette for the chart. A plot opened for an explicit input is drawn
    /// without a pane background so it blends into whatever hosts it.
    pub fn palette(&self, from_explicit_args: bool) -> ChartPalette {
        let (background, grid, axis, ink) = match self {
            Theme::Dark => (
                Color32::from_rgb(20, 20, 20),
                Color32::from_rgba_premultiplied(100, 100, 100, 60),
                Color32::from_gray(170),
                Color32::WHITE,
            ),
            Theme::Light => (
                Color32::from_rgb(255, 255, 255),
                Color32::from_rgba_premultiplied(180, 180, 180, 80),
                Color32::from_gray(90),
                Color32::from_gray(20),
            ),
        };
        ChartPalette {
            background: if from_explicit_args {
                Color32::TRANSPARENT
            } else {
                background
            },
            grid,
            axis,
            surface: background,
            ink,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Theme::Dark => "Dark",
            Theme::Light => "Light",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn white_line_stays_visible_on_light_charts() {
        for explicit in [false, true] {
            let light = Theme::Light.palette(explicit);
            assert_eq!(light.line_color(LineColor::White), light.ink);
            assert_eq!(light.line_color(LineColor::Red), LineColor::Red.color32());
        }
        let dark = Theme::Dark.palette(false);
        assert_eq!(dark.line_color(LineColor::White), LineColor::White.color32());
        assert_eq!(dark.line_color(LineColor::Blue), LineColor::Blue.color32());
    }

    #[test]
    fn explicit_charts_have_no_pane_background() {
        let palette = Theme::Dark.palette(true);
        assert_eq!(palette.background, Color32::TRANSPARENT);
        assert_eq!(palette.surface, Color32::from_rgb(20, 20, 20));
    }
}
