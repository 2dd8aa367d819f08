use crate::state::data_series::LineColor;
use crate::state::settings::PlotSettings;
use crate::state::theme::Theme;

/// Editable copy of the preferences, created when the dialog opens. Numeric
/// fields are kept as text until the user applies them.
pub struct SettingsDialogState {
    pub draft: PlotSettings,
    pub steps: String,
    pub default_min: String,
    pub default_max: String,
    pub error: String,
}

impl SettingsDialogState {
    pub fn new(settings: &PlotSettings) -> Self {
        Self {
            draft: settings.clone(),
            steps: settings.steps.to_string(),
            default_min: settings.default_min.to_string(),
            default_max: settings.default_max.to_string(),
            error: String::new(),
        }
    }

    /// Merge the text fields into the draft, or describe what is wrong.
    pub fn parsed(&self) -> Result<PlotSettings, String> {
        let steps: usize = self
            .steps
            .trim()
            .parse()
            .map_err(|_| format!("'{}' is not a whole number", self.steps.trim()))?;
        if steps == 0 {
            return Err("Number of steps must be at least 1".to_string());
        }
        let min: f64 = self
            .default_min
            .trim()
            .parse()
            .map_err(|_| format!("'{}' is not a number", self.default_min.trim()))?;
        let max: f64 = self
            .default_max
            .trim()
            .parse()
            .map_err(|_| format!("'{}' is not a number", self.default_max.trim()))?;
        if !(min.is_finite() && max.is_finite() && min < max) {
            return Err("Default range needs min < max".to_string());
        }
        Ok(PlotSettings {
            steps,
            default_min: min,
            default_max: max,
            ..self.draft.clone()
        })
    }
}

pub enum DialogResult {
    Open,
    Apply(PlotSettings),
    Closed,
}

fn color_combo(ui: &mut egui::Ui, id: &str, value: &mut LineColor) {
    egui::ComboBox::from_id_salt(id)
        .selected_text(egui::RichText::new(value.label()).color(value.color32()))
        .width(100.0)
        .show_ui(ui, |ui| {
            for color in LineColor::ALL {
                ui.selectable_value(value, color, egui::RichText::new(color.label()).color(color.color32()));
            }
        });
}

pub fn show_settings_dialog(ctx: &egui::Context, state: &mut SettingsDialogState) -> DialogResult {
    let mut open = true;
    let mut result = DialogResult::Open;

    egui::Window::new("Preferences")
        .open(&mut open)
        .collapsible(false)
        .resizable(false)
        .default_width(360.0)
        .show(ctx, |ui| {
            ui.label(egui::RichText::new("Graph").strong().size(15.0));
            ui.add_space(4.0);
            egui::Grid::new("graph_settings_grid")
                .num_columns(2)
                .spacing([10.0, 6.0])
                .show(ui, |ui| {
                    ui.label("Interpolate:");
                    ui.checkbox(&mut state.draft.interpolate, "Join samples with lines");
                    ui.end_row();

                    ui.label("Real part:");
                    color_combo(ui, "real_line_color", &mut state.draft.real_line_color);
                    ui.end_row();

                    ui.label("Imaginary part:");
                    color_combo(ui, "imag_line_color", &mut state.draft.imag_line_color);
                    ui.end_row();

                    ui.label("Number of steps:");
                    ui.add(egui::TextEdit::singleline(&mut state.steps).desired_width(80.0));
                    ui.end_row();

                    ui.label("Default range:");
                    ui.horizontal(|ui| {
                        ui.add(egui::TextEdit::singleline(&mut state.default_min).desired_width(60.0));
                        ui.label("to");
                        ui.add(egui::TextEdit::singleline(&mut state.default_max).desired_width(60.0));
                    });
                    ui.end_row();
                });

            ui.add_space(8.0);
            ui.label(egui::RichText::new("Appearance").strong().size(15.0));
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                for theme in [Theme::Dark, Theme::Light] {
                    ui.selectable_value(&mut state.draft.theme, theme, theme.label());
                }
            });

            if !state.error.is_empty() {
                ui.add_space(6.0);
                ui.colored_label(egui::Color32::from_rgb(255, 80, 80), &state.error);
            }

            ui.add_space(10.0);
            ui.horizontal(|ui| {
                if ui.add(egui::Button::new("Apply").min_size(egui::vec2(80.0, 28.0))).clicked() {
                    match state.parsed() {
                        Ok(settings) => {
                            state.error.clear();
                            result = DialogResult::Apply(settings);
                        }
                        Err(e) => state.error = e,
                    }
                }
                if ui.add(egui::Button::new("Defaults").min_size(egui::vec2(80.0, 28.0))).clicked() {
                    *state = SettingsDialogState::new(&PlotSettings::default());
                }
            });
        });

    if !open {
        return DialogResult::Closed;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_text_fields_into_settings() {
        let mut state = SettingsDialogState::new(&PlotSettings::default());
        state.steps = " 250 ".into();
        state.default_min = "-2.5".into();
        state.default_max = "4".into();
        state.draft.interpolate = false;
        let settings = state.parsed().unwrap();
        assert_eq!(settings.steps, 250);
        assert_eq!((settings.default_min, settings.default_max), (-2.5, 4.0));
        assert!(!settings.interpolate);
    }

    #[test]
    fn rejects_unusable_values() {
        let mut state = SettingsDialogState::new(&PlotSettings::default());
        state.steps = "0".into();
        assert!(state.parsed().is_err());
        state.steps = "ten".into();
        assert!(state.parsed().is_err());
        state.steps = "10".into();
        state.default_min = "3".into();
        state.default_max = "3".into();
        assert!(state.parsed().is_err());
    }
}
