use serde::{Deserialize, Serialize};

/// Named line colours offered for the real and imaginary graphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineColor {
    White,
    Grey,
    Red,
    Blue,
    Green,
}

impl LineColor {
    pub const ALL: [LineColor; 5] = [
        LineColor::White,
        LineColor::Grey,
        LineColor::Red,
        LineColor::Blue,
        LineColor::Green,
    ];

    pub fn rgba(&self) -> [u8; 4] {
        match self {
            LineColor::White => [255, 255, 255, 255],
            LineColor::Grey => [128, 128, 128, 255],
            LineColor::Red => [255, 0, 0, 255],
            LineColor::Blue => [0, 135, 255, 255],
            LineColor::Green => [0, 200, 0, 255],
        }
    }

    pub fn color32(&self) -> egui::Color32 {
        let [r, g, b, a] = self.rgba();
        egui::Color32::from_rgba_unmultiplied(r, g, b, a)
    }

    pub fn label(&self) -> &'static str {
        match self {
            LineColor::White => "White",
            LineColor::Grey => "Grey",
            LineColor::Red => "Red",
            LineColor::Blue => "Blue",
            LineColor::Green => "Green",
        }
    }
}

/// An ordered run of `(x, y)` samples, ascending in x.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    pub label: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    /// Ascending indices of points that follow a gap. The segment between
    /// `i - 1` and `i` is not drawn for any `i` listed here.
    pub breaks: Vec<usize>,
}

impl Series {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            x: Vec::new(),
            y: Vec::new(),
            breaks: Vec::new(),
        }
    }

    pub fn with_capacity(label: impl Into<String>, capacity: usize) -> Self {
        Self {
            label: label.into(),
            x: Vec::with_capacity(capacity),
            y: Vec::with_capacity(capacity),
            breaks: Vec::new(),
        }
    }

    pub fn push(&mut self, x: f64, y: f64) {
        self.x.push(x);
        self.y.push(y);
    }

    /// Start a new run at the next pushed point. A gap before the first
    /// point is ignored and repeated gaps collapse into one.
    pub fn mark_gap(&mut self) {
        let next = self.len();
        if next > 0 && self.breaks.last() != Some(&next) {
            self.breaks.push(next);
        }
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn clear(&mut self) {
        self.x.clear();
        self.y.clear();
        self.breaks.clear();
    }

    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }

    pub fn last_x(&self) -> Option<f64> {
        self.x.last().copied()
    }
}

/// Legend label for the real graph of `f(variable)`.
pub fn real_label(variable: &str) -> String {
    format!("Re(f({variable}))")
}

/// Legend label for the imaginary graph of `f(variable)`.
pub fn imaginary_label(variable: &str) -> String {
    format!("Im(f({variable}))")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gaps_collapse_and_skip_the_start() {
        let mut s = Series::new("s");
        s.mark_gap();
        s.push(0.0, 0.0);
        s.push(1.0, 1.0);
        s.mark_gap();
        s.mark_gap();
        s.push(3.0, 3.0);
        assert_eq!(s.breaks, vec![2]);
        s.clear();
        assert!(s.breaks.is_empty());
    }
}
