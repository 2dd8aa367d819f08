use crate::render::chart::{finite_runs, Chart};
use crate::render::plot_interaction::{self, ViewAction};
use crate::session::Notice;
use crate::state::data_series::Series;
use crate::state::settings::PlotSettings;
use crate::state::theme::ChartPalette;
use crate::state::viewport::Viewport;

/// Requests the plot panel hands back to the app.
pub enum PanelAction {
    None,
    /// The user panned or zoomed; the chart already shows the new axes.
    ViewChanged(Viewport),
    ResetZoom,
}

const LEFT_MARGIN: f32 = 60.0;
const RIGHT_MARGIN: f32 = 16.0;
const TOP_MARGIN: f32 = 10.0;
const BOTTOM_MARGIN: f32 = 36.0;
const POINT_RADIUS: f32 = 2.0;

/// Draw the chart into the remaining space of `ui` and translate pointer
/// input into view changes.
pub fn show_plot_panel(
    ui: &mut egui::Ui,
    chart: &mut Chart,
    settings: &PlotSettings,
    palette: ChartPalette,
    notice: Option<&Notice>,
    variable: &str,
) -> PanelAction {
    let mut action = PanelAction::None;

    let size = ui.available_size().max(egui::vec2(200.0, 150.0));
    let total_rect = ui.allocate_space(size).1;
    let plot_rect = egui::Rect::from_min_max(
        egui::pos2(total_rect.left() + LEFT_MARGIN, total_rect.top() + TOP_MARGIN),
        egui::pos2(total_rect.right() - RIGHT_MARGIN, total_rect.bottom() - BOTTOM_MARGIN),
    );

    let response = ui.interact(plot_rect, egui::Id::new("fnplot_chart"), egui::Sense::click_and_drag());
    match plot_interaction::handle_input(&chart.viewport(), &response, plot_rect) {
        ViewAction::Unchanged => {}
        ViewAction::Moved(viewport) => {
            chart.set_viewport(viewport);
            action = PanelAction::ViewChanged(viewport);
        }
        ViewAction::Reset => action = PanelAction::ResetZoom,
    }

    let view = chart.viewport();
    let painter = ui.painter_at(total_rect);
    painter.rect_filled(plot_rect, 0.0, palette.background);

    let x_grid = plot_interaction::compute_grid_lines(view.x_min, view.x_max);
    let y_grid = plot_interaction::compute_grid_lines(view.y_min, view.y_max);
    draw_grid(&painter, &view, plot_rect, &x_grid, &y_grid, palette);
    draw_axes_and_labels(&painter, &view, plot_rect, total_rect, variable, palette);

    let data_painter = painter.with_clip_rect(plot_rect);
    if let Some(imaginary) = chart.imaginary() {
        let color = palette.line_color(settings.imag_line_color);
        draw_series(&data_painter, &view, plot_rect, imaginary, color, settings.interpolate);
    }
    let real_color = palette.line_color(settings.real_line_color);
    draw_series(&data_painter, &view, plot_rect, chart.real(), real_color, settings.interpolate);

    let legend: Vec<(&Series, egui::Color32)> = std::iter::once((chart.real(), real_color))
        .chain(chart.imaginary().map(|s| (s, palette.line_color(settings.imag_line_color))))
        .filter(|(s, _)| !s.label.is_empty())
        .collect();
    draw_legend(&painter, plot_rect, &legend);

    if let Some(notice) = notice {
        draw_notice(&painter, plot_rect, &notice.message());
    }

    action
}

fn draw_grid(
    painter: &egui::Painter,
    view: &Viewport,
    plot_rect: egui::Rect,
    x_grid: &[plot_interaction::GridLine],
    y_grid: &[plot_interaction::GridLine],
    palette: ChartPalette,
) {
    let minor = egui::Stroke::new(0.5, palette.grid.gamma_multiply(0.5));
    let major = egui::Stroke::new(1.0, palette.grid);
    for line in x_grid {
        let x = plot_interaction::data_to_screen(view, line.value, view.y_min, plot_rect).x;
        painter.vline(x, plot_rect.y_range(), if line.major { major } else { minor });
    }
    for line in y_grid {
        let y = plot_interaction::data_to_screen(view, view.x_min, line.value, plot_rect).y;
        painter.hline(plot_rect.x_range(), y, if line.major { major } else { minor });
    }

    // Coordinate axes through the origin when visible.
    let axis = egui::Stroke::new(1.2, palette.axis);
    let origin = plot_interaction::data_to_screen(view, 0.0, 0.0, plot_rect);
    if plot_rect.x_range().contains(origin.x) {
        painter.vline(origin.x, plot_rect.y_range(), axis);
    }
    if plot_rect.y_range().contains(origin.y) {
        painter.hline(plot_rect.x_range(), origin.y, axis);
    }
}

fn draw_axes_and_labels(
    painter: &egui::Painter,
    view: &Viewport,
    plot_rect: egui::Rect,
    total_rect: egui::Rect,
    variable: &str,
    palette: ChartPalette,
) {
    let text_color = painter.ctx().style().visuals.text_color();
    let dim_color = text_color.gamma_multiply(0.6);
    let font = egui::FontId::proportional(10.0);

    painter.rect_stroke(plot_rect, 0.0, egui::Stroke::new(1.0, palette.axis.gamma_multiply(0.6)), egui::StrokeKind::Outside);

    if let Some(step) = plot_interaction::nice_step(view.x_min, view.x_max, 8) {
        for line in plot_interaction::compute_grid_lines(view.x_min, view.x_max).into_iter().filter(|l| l.major) {
            let x = plot_interaction::data_to_screen(view, line.value, view.y_min, plot_rect).x;
            painter.text(
                egui::pos2(x, plot_rect.bottom() + 4.0),
                egui::Align2::CENTER_TOP,
                plot_interaction::format_tick_value(line.value, step),
                font.clone(),
                dim_color,
            );
        }
    }
    if let Some(step) = plot_interaction::nice_step(view.y_min, view.y_max, 8) {
        for line in plot_interaction::compute_grid_lines(view.y_min, view.y_max).into_iter().filter(|l| l.major) {
            let y = plot_interaction::data_to_screen(view, view.x_min, line.value, plot_rect).y;
            painter.text(
                egui::pos2(plot_rect.left() - 4.0, y),
                egui::Align2::RIGHT_CENTER,
                plot_interaction::format_tick_value(line.value, step),
                font.clone(),
                dim_color,
            );
        }
    }

    if !variable.is_empty() {
        painter.text(
            egui::pos2(plot_rect.center().x, total_rect.bottom() - 2.0),
            egui::Align2::CENTER_BOTTOM,
            variable,
            egui::FontId::proportional(12.0),
            text_color,
        );
    }
}

fn draw_series(
    painter: &egui::Painter,
    view: &Viewport,
    plot_rect: egui::Rect,
    series: &Series,
    color: egui::Color32,
    interpolate: bool,
) {
    for run in finite_runs(series) {
        let points: Vec<egui::Pos2> = run
            .iter()
            .map(|&(x, y)| plot_interaction::data_to_screen(view, x, y, plot_rect))
            .collect();
        if interpolate && points.len() > 1 {
            painter.add(egui::Shape::line(points, egui::Stroke::new(1.5, color)));
        } else {
            for p in points {
                painter.circle_filled(p, POINT_RADIUS, color);
            }
        }
    }
}

fn draw_legend(painter: &egui::Painter, plot_rect: egui::Rect, entries: &[(&Series, egui::Color32)]) {
    if entries.is_empty() {
        return;
    }
    let text_color = painter.ctx().style().visuals.text_color();
    let bg_color = painter.ctx().style().visuals.window_fill;
    let font = egui::FontId::proportional(11.0);

    let max_width = entries
        .iter()
        .map(|(s, _)| painter.layout_no_wrap(s.label.clone(), font.clone(), text_color).rect.width())
        .fold(0.0_f32, f32::max);
    let legend_width = max_width + 24.0;
    let x = plot_rect.right() - 8.0;
    let mut y = plot_rect.top() + 8.0;

    let legend_rect = egui::Rect::from_min_size(
        egui::pos2(x - legend_width - 4.0, y - 4.0),
        egui::vec2(legend_width + 8.0, entries.len() as f32 * 16.0 + 8.0),
    );
    painter.rect_filled(legend_rect, 4.0, bg_color.gamma_multiply(0.85));
    painter.rect_stroke(legend_rect, 4.0, egui::Stroke::new(0.5, text_color.gamma_multiply(0.3)), egui::StrokeKind::Outside);

    for (series, color) in entries {
        let swatch = egui::Rect::from_min_size(egui::pos2(x - legend_width, y), egui::vec2(12.0, 12.0));
        painter.rect_filled(swatch, 2.0, *color);
        painter.text(
            egui::pos2(x - legend_width + 16.0, y + 6.0),
            egui::Align2::LEFT_CENTER,
            &series.label,
            font.clone(),
            text_color,
        );
        y += 16.0;
    }
}

fn draw_notice(painter: &egui::Painter, plot_rect: egui::Rect, message: &str) {
    let font = egui::FontId::proportional(16.0);
    let text_color = painter.ctx().style().visuals.strong_text_color();
    let galley = painter.layout_no_wrap(message.to_string(), font.clone(), text_color);
    let bg_rect = egui::Rect::from_center_size(plot_rect.center(), galley.rect.size() + egui::vec2(24.0, 14.0));
    let bg_color = painter.ctx().style().visuals.window_fill;
    painter.rect_filled(bg_rect, 6.0, bg_color.gamma_multiply(0.9));
    painter.text(plot_rect.center(), egui::Align2::CENTER_CENTER, message, font, text_color);
}
