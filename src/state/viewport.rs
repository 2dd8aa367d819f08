use serde::{Deserialize, Serialize};

use crate::error::PlotError;

/// Default numeric range used when no saved viewport exists.
pub const DEFAULT_MIN: f64 = -10.0;
pub const DEFAULT_MAX: f64 = 10.0;

/// Visible axis bounds of the plot, in data coordinates.
///
/// Serialised as four plain `f64` fields so a save/restore cycle through
/// JSON reproduces the exact values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Viewport {
    /// Build a viewport, rejecting non-finite or empty ranges.
    pub fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Result<Self, PlotError> {
        let viewport = Self {
            x_min,
            x_max,
            y_min,
            y_max,
        };
        viewport.validate()?;
        Ok(viewport)
    }

    /// The square `[min, max] x [min, max]` viewport.
    pub fn square(min: f64, max: f64) -> Self {
        Self {
            x_min: min,
            x_max: max,
            y_min: min,
            y_max: max,
        }
    }

    pub fn validate(&self) -> Result<(), PlotError> {
        let ordered = |lo: f64, hi: f64| lo.is_finite() && hi.is_finite() && lo < hi;
        if !ordered(self.x_min, self.x_max) {
            return Err(PlotError::InvalidDomain {
                x_min: self.x_min,
                x_max: self.x_max,
            });
        }
        if !ordered(self.y_min, self.y_max) {
            return Err(PlotError::InvalidRange {
                y_min: self.y_min,
                y_max: self.y_max,
            });
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    pub fn x_span(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn y_span(&self) -> f64 {
        self.y_max - self.y_min
    }

    /// Shift the view by a data-space offset.
    pub fn panned(&self, dx: f64, dy: f64) -> Self {
        Self {
            x_min: self.x_min + dx,
            x_max: self.x_max + dx,
            y_min: self.y_min + dy,
            y_max: self.y_max + dy,
        }
    }

    /// Scale the view about a fixed data point. `factor < 1` zooms in.
    pub fn zoomed_about(&self, cx: f64, cy: f64, factor: f64) -> Self {
        Self {
            x_min: cx + (self.x_min - cx) * factor,
            x_max: cx + (self.x_max - cx) * factor,
            y_min: cy + (self.y_min - cy) * factor,
            y_max: cy + (self.y_max - cy) * factor,
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::square(DEFAULT_MIN, DEFAULT_MAX)
    }
}
