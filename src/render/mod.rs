pub mod chart;
pub mod plot_interaction;

use crate::state::data_series::Series;
use crate::state::viewport::Viewport;

/// What the plot session needs from whatever draws the chart.
///
/// All calls happen on the thread that owns the session, never on the
/// sampling worker.
pub trait ChartSink {
    fn update_axis_bounds(&mut self, viewport: &Viewport);
    /// Replace the visible dataset. `imaginary` is `None` until a pass has
    /// produced a significant imaginary part.
    fn replace_series(&mut self, real: Series, imaginary: Option<Series>);
    fn redraw(&mut self);
}
