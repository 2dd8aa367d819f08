use crate::render::ChartSink;
use crate::state::data_series::Series;
use crate::state::viewport::Viewport;

/// Retained chart contents drawn by the plot panel each frame.
#[derive(Default)]
pub struct Chart {
    viewport: Viewport,
    real: Series,
    imaginary: Option<Series>,
    ctx: Option<egui::Context>,
    revision: u64,
}

impl Chart {
    pub fn new() -> Self {
        Self::default()
    }

    /// A chart that asks `ctx` for a repaint whenever it changes.
    pub fn with_context(ctx: egui::Context) -> Self {
        Self {
            ctx: Some(ctx),
            ..Self::default()
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Move the axes without touching the data; used while the user drags
    /// so the view follows the pointer before the next pass arrives.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn real(&self) -> &Series {
        &self.real
    }

    pub fn imaginary(&self) -> Option<&Series> {
        self.imaginary.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.real.is_empty() && self.imaginary.as_ref().map_or(true, Series::is_empty)
    }

    /// Bumped on every redraw request.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

impl ChartSink for Chart {
    fn update_axis_bounds(&mut self, viewport: &Viewport) {
        self.viewport = *viewport;
    }

    fn replace_series(&mut self, real: Series, imaginary: Option<Series>) {
        self.real = real;
        self.imaginary = imaginary;
    }

    fn redraw(&mut self) {
        self.revision += 1;
        if let Some(ctx) = &self.ctx {
            ctx.request_repaint();
        }
    }
}

/// Split `series` into runs of finite points. Lines are never drawn across
/// a gap left by a failed or non-finite sample.
pub fn finite_runs(series: &Series) -> Vec<Vec<(f64, f64)>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();
    let mut breaks = series.breaks.iter().peekable();
    for (i, (x, y)) in series.points().enumerate() {
        if breaks.next_if(|&&b| b <= i).is_some() && !current.is_empty() {
            runs.push(std::mem::take(&mut current));
        }
        if x.is_finite() && y.is_finite() {
            current.push((x, y));
        } else if !current.is_empty() {
            runs.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sink_calls_update_contents() {
        let mut chart = Chart::new();
        assert!(chart.is_empty());
        let mut real = Series::new("Re(f(x))");
        real.push(0.0, 1.0);
        chart.replace_series(real.clone(), None);
        chart.update_axis_bounds(&Viewport::square(-1.0, 1.0));
        chart.redraw();
        assert_eq!(chart.real(), &real);
        assert!(chart.imaginary().is_none());
        assert_eq!(chart.viewport(), Viewport::square(-1.0, 1.0));
        assert_eq!(chart.revision(), 1);
    }

    #[test]
    fn runs_break_at_non_finite_values() {
        let mut s = Series::new("s");
        for (x, y) in [(0.0, 1.0), (1.0, 2.0), (2.0, f64::INFINITY), (3.0, 4.0)] {
            s.push(x, y);
        }
        let runs = finite_runs(&s);
        assert_eq!(runs, vec![vec![(0.0, 1.0), (1.0, 2.0)], vec![(3.0, 4.0)]]);
    }

    #[test]
    fn runs_break_at_marked_gaps() {
        let mut s = Series::new("s");
        s.push(0.0, 1.0);
        s.push(1.0, 2.0);
        s.mark_gap();
        s.push(3.0, 4.0);
        s.push(4.0, 5.0);
        s.mark_gap();
        let runs = finite_runs(&s);
        assert_eq!(
            runs,
            vec![vec![(0.0, 1.0), (1.0, 2.0)], vec![(3.0, 4.0), (4.0, 5.0)]]
        );
    }
}
