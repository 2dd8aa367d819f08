use crate::state::viewport::Viewport;

/// Wheel zoom speed per scroll point, and the clamp applied per frame.
const ZOOM_PER_POINT: f64 = 0.001;
const MAX_ZOOM_STEP: f64 = 2.0;

/// Outcome of pointer input over the plot area for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewAction {
    Unchanged,
    /// Pan or zoom produced a new viewport.
    Moved(Viewport),
    /// Double-click: return to the default range.
    Reset,
}

/// Translate drag, wheel and double-click on `response` into a view change.
pub fn handle_input(view: &Viewport, response: &egui::Response, rect: egui::Rect) -> ViewAction {
    if response.double_clicked() {
        return ViewAction::Reset;
    }
    if rect.width() <= 0.0 || rect.height() <= 0.0 {
        return ViewAction::Unchanged;
    }

    let mut next = *view;
    let mut moved = false;

    if response.dragged_by(egui::PointerButton::Primary) {
        let delta = response.drag_delta();
        if delta != egui::Vec2::ZERO {
            let dx = -(delta.x as f64) * view.x_span() / rect.width() as f64;
            let dy = (delta.y as f64) * view.y_span() / rect.height() as f64;
            next = next.panned(dx, dy);
            moved = true;
        }
    }

    let scroll = if response.hovered() {
        response.ctx.input(|i| i.smooth_scroll_delta.y)
    } else {
        0.0
    };
    if scroll.abs() > 0.0 {
        if let Some(pointer) = response.hover_pos() {
            let factor = (1.0 - scroll as f64 * ZOOM_PER_POINT).clamp(1.0 / MAX_ZOOM_STEP, MAX_ZOOM_STEP);
            let (cx, cy) = screen_to_data(&next, pointer, rect);
            next = next.zoomed_about(cx, cy, factor);
            moved = true;
        }
    }

    if moved && next.is_valid() {
        ViewAction::Moved(next)
    } else {
        ViewAction::Unchanged
    }
}

pub fn screen_to_data(view: &Viewport, pos: egui::Pos2, rect: egui::Rect) -> (f64, f64) {
    let t_x = (pos.x - rect.left()) as f64 / rect.width() as f64;
    let t_y = 1.0 - (pos.y - rect.top()) as f64 / rect.height() as f64;
    (view.x_min + t_x * view.x_span(), view.y_min + t_y * view.y_span())
}

pub fn data_to_screen(view: &Viewport, x: f64, y: f64, rect: egui::Rect) -> egui::Pos2 {
    let t_x = (x - view.x_min) / view.x_span();
    let t_y = 1.0 - (y - view.y_min) / view.y_span();
    egui::Pos2::new(
        rect.left() + (t_x as f32) * rect.width(),
        rect.top() + (t_y as f32) * rect.height(),
    )
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLine {
    pub value: f64,
    pub major: bool,
}

/// Major step from the 1-2-5 sequence giving roughly `target` intervals.
pub fn nice_step(min: f64, max: f64, target: usize) -> Option<f64> {
    let range = max - min;
    if !(range > 0.0 && range.is_finite()) || target == 0 {
        return None;
    }
    let raw = range / target as f64;
    let order = 10f64.powf(raw.log10().floor());
    let step = match raw / order {
        n if n <= 1.0 => order,
        n if n <= 2.0 => 2.0 * order,
        n if n <= 5.0 => 5.0 * order,
        _ => 10.0 * order,
    };
    Some(step)
}

/// Grid positions inside `[min, max]`: a major line every nice step and
/// four minor lines between.
pub fn compute_grid_lines(min: f64, max: f64) -> Vec<GridLine> {
    let Some(major) = nice_step(min, max, 8) else {
        return Vec::new();
    };
    let minor = major / 5.0;
    let start = (min / minor).floor() as i64;
    let end = (max / minor).ceil() as i64;

    (start..=end)
        .map(|i| i as f64 * minor)
        .filter(|&value| value >= min && value <= max)
        .map(|value| GridLine {
            value,
            major: ((value / major).round() * major - value).abs() < major * 0.01,
        })
        .collect()
}

/// Tick label text. `step` is the spacing of neighbouring ticks and picks
/// the number of decimals.
pub fn format_tick_value(value: f64, step: f64) -> String {
    if value.abs() < step * 1e-6 {
        return "0".to_string();
    }
    if value.abs() >= 1e6 || value.abs() < 1e-3 {
        return format!("{value:.2e}");
    }
    let decimals = if step > 0.0 && step < 1.0 {
        (-step.log10().floor()) as usize
    } else {
        0
    };
    format!("{value:.decimals$}")
}
