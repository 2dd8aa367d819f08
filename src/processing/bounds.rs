use crate::state::data_series::Series;
use crate::state::viewport::Viewport;

/// Padding applied around a range that collapsed to a single value.
const DEGENERATE_PAD: f64 = 0.5;

/// Extent of the finite samples of one or more series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DataBounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl DataBounds {
    /// Bounds over every finite point of `series`, or `None` if there is none.
    pub fn of<'a>(series: impl IntoIterator<Item = &'a Series>) -> Option<Self> {
        let mut bounds = DataBounds {
            x_min: f64::INFINITY,
            x_max: f64::NEG_INFINITY,
            y_min: f64::INFINITY,
            y_max: f64::NEG_INFINITY,
        };
        for s in series {
            for (x, y) in s.points() {
                if x.is_finite() && y.is_finite() {
                    bounds.x_min = bounds.x_min.min(x);
                    bounds.x_max = bounds.x_max.max(x);
                    bounds.y_min = bounds.y_min.min(y);
                    bounds.y_max = bounds.y_max.max(y);
                }
            }
        }
        if bounds.x_min.is_finite() {
            Some(bounds)
        } else {
            None
        }
    }
}

/// Intersect `[data_lo, data_hi]` with `[lo, hi]`. When the two do not
/// overlap the data range is used on its own; a single value is padded.
fn clamp_range(data_lo: f64, data_hi: f64, lo: f64, hi: f64) -> (f64, f64) {
    let (a, b) = (data_lo.max(lo), data_hi.min(hi));
    let (a, b) = if a <= b { (a, b) } else { (data_lo, data_hi) };
    if b - a <= f64::EPSILON * a.abs().max(b.abs()).max(1.0) {
        (a - DEGENERATE_PAD, b + DEGENERATE_PAD)
    } else {
        (a, b)
    }
}

/// Initial viewport for a plot with no saved one: the data's extent
/// intersected with the default range on both axes.
pub fn initial_viewport(bounds: Option<DataBounds>, default_min: f64, default_max: f64) -> Viewport {
    let Some(bounds) = bounds else {
        return Viewport::square(default_min, default_max);
    };
    let (x_min, x_max) = clamp_range(bounds.x_min, bounds.x_max, default_min, default_max);
    let (y_min, y_max) = clamp_range(bounds.y_min, bounds.y_max, default_min, default_max);
    Viewport {
        x_min,
        x_max,
        y_min,
        y_max,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(points: &[(f64, f64)]) -> Series {
        let mut s = Series::new("s");
        for &(x, y) in points {
            s.push(x, y);
        }
        s
    }

    #[test]
    fn bounds_skip_non_finite_points() {
        let s = series(&[(-1.0, 2.0), (0.0, f64::NAN), (3.0, -4.0)]);
        let b = DataBounds::of([&s]).unwrap();
        assert_eq!(b, DataBounds { x_min: -1.0, x_max: 3.0, y_min: -4.0, y_max: 2.0 });
        assert_eq!(DataBounds::of([&Series::new("empty")]), None);
    }

    #[test]
    fn data_is_clipped_to_default_range() {
        // x^2 over [-10, 10]: y in [0, 100] -> [0, 10]
        let s = series(&[(-10.0, 100.0), (0.0, 0.0), (10.0, 100.0)]);
        let v = initial_viewport(DataBounds::of([&s]), -10.0, 10.0);
        assert_eq!(v, Viewport { x_min: -10.0, x_max: 10.0, y_min: 0.0, y_max: 10.0 });
    }

    #[test]
    fn constant_function_gets_padded() {
        let s = series(&[(-10.0, 3.0), (10.0, 3.0)]);
        let v = initial_viewport(DataBounds::of([&s]), -10.0, 10.0);
        assert_eq!((v.y_min, v.y_max), (2.5, 3.5));
        assert!(v.is_valid());
    }

    #[test]
    fn disjoint_data_uses_its_own_range() {
        let s = series(&[(-10.0, 90.0), (10.0, 110.0)]);
        let v = initial_viewport(DataBounds::of([&s]), -10.0, 10.0);
        assert_eq!((v.y_min, v.y_max), (90.0, 110.0));
    }

    #[test]
    fn no_data_falls_back_to_default() {
        assert_eq!(initial_viewport(None, -10.0, 10.0), Viewport::default());
    }
}
