use std::path::PathBuf;
use std::sync::Arc;

use eframe::egui;

use crate::display::{DisplayHub, DisplayState, Operation};
use crate::render::chart::Chart;
use crate::session::{PlotSession, SessionSnapshot};
use crate::state::prepared_input::PlotInput;
use crate::state::settings::PlotSettings;
use crate::ui::plot_panel::{self, PanelAction};
use crate::ui::settings_dialog::{self, DialogResult, SettingsDialogState};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const SETTINGS_KEY: &str = "fnplot_settings";
const SESSION_KEY: &str = "fnplot_session";
const EDITOR_KEY: &str = "fnplot_editor";

/// Contents of the input bar, persisted between runs.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct EditorState {
    expression: String,
    variable: String,
    /// Plot the text directly instead of publishing it to the display.
    explicit: bool,
    operation: Operation,
}

impl Default for EditorState {
    fn default() -> Self {
        Self {
            expression: "sin(x)/x".to_string(),
            variable: "x".to_string(),
            explicit: true,
            operation: Operation::Simplify,
        }
    }
}

/// The function plotter window.
pub struct FnPlotApp {
    session: Option<PlotSession<Chart>>,
    hub: Arc<DisplayHub>,
    editor: EditorState,
    settings_dialog: Option<SettingsDialogState>,
    /// Shown in place of the chart when the session could not start.
    error_message: Option<String>,
    show_about: bool,
    /// Mirrors the preferences to disk when set.
    settings_file: Option<PathBuf>,
}

impl FnPlotApp {
    /// `settings_file`, when given, takes precedence over the stored
    /// preferences and is rewritten whenever they change.
    pub fn new(cc: &eframe::CreationContext<'_>, settings_file: Option<PathBuf>) -> Self {
        let ctx = cc.egui_ctx.clone();

        let (settings, snapshot, editor) = match cc.storage {
            Some(storage) => (
                eframe::get_value::<PlotSettings>(storage, SETTINGS_KEY)
                    .map(PlotSettings::validated)
                    .unwrap_or_default(),
                eframe::get_value::<SessionSnapshot>(storage, SESSION_KEY),
                eframe::get_value::<EditorState>(storage, EDITOR_KEY).unwrap_or_default(),
            ),
            None => (PlotSettings::default(), None, EditorState::default()),
        };
        let settings = match &settings_file {
            Some(path) => PlotSettings::load_or(path, settings),
            None => settings,
        };

        let mut style = (*ctx.style()).clone();
        style.text_styles.insert(egui::TextStyle::Body, egui::FontId::proportional(15.0));
        style.text_styles.insert(egui::TextStyle::Button, egui::FontId::proportional(14.5));
        style.spacing.button_padding = egui::vec2(10.0, 5.0);
        style.spacing.item_spacing = egui::vec2(8.0, 6.0);
        ctx.set_style(style);
        ctx.set_visuals(settings.theme.visuals());

        // Both the hub and the sampling worker wake the UI so a published
        // display result or a finished pass is applied without further input.
        let repaint = ctx.clone();
        let hub = Arc::new(DisplayHub::with_waker(move || repaint.request_repaint()));
        let repaint = ctx.clone();
        let session = PlotSession::with_waker(Chart::with_context(ctx), settings, move || {
            repaint.request_repaint()
        });

        let mut app = Self {
            session: None,
            hub,
            editor,
            settings_dialog: None,
            error_message: None,
            show_about: false,
            settings_file,
        };

        match session {
            Ok(mut session) => {
                let snapshot = snapshot.unwrap_or_default();
                let explicit = snapshot.input.is_some();
                session.restore(snapshot);
                if !explicit {
                    session.follow_display(&app.hub);
                }
                app.session = Some(session);
            }
            Err(e) => {
                tracing::error!("Cannot start plot session: {e}");
                app.error_message = Some(e.to_string());
            }
        }
        app
    }

    fn write_settings_file(&self) {
        let (Some(path), Some(session)) = (&self.settings_file, &self.session) else {
            return;
        };
        if let Err(e) = session.settings().save(path) {
            tracing::warn!("Cannot write settings file {:?}: {e}", path);
        }
    }

    fn submit(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if self.editor.explicit {
            if let Err(e) = session.set_input(PlotInput::new(&self.editor.expression, &self.editor.variable)) {
                tracing::debug!("Input rejected: {e}");
            }
        } else {
            // Behave like the calculator: publish the result and let the
            // session pick it up from the feed.
            if session.input().is_from_explicit_args() {
                session.follow_display(&self.hub);
            }
            self.hub
                .publish(DisplayState::new(self.editor.expression.trim(), self.editor.operation));
        }
    }

    fn show_input_bar(&mut self, ui: &mut egui::Ui) {
        let mut submit = false;
        ui.horizontal(|ui| {
            ui.label("f =");
            let response = ui.add(
                egui::TextEdit::singleline(&mut self.editor.expression)
                    .hint_text("expression, e.g. sqrt(x)")
                    .desired_width(ui.available_width() - 360.0),
            );
            if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                submit = true;
            }

            ui.checkbox(&mut self.editor.explicit, "Variable:")
                .on_hover_text("Plot over the given variable instead of following the display");
            if self.editor.explicit {
                ui.add(egui::TextEdit::singleline(&mut self.editor.variable).desired_width(50.0));
            } else {
                egui::ComboBox::from_id_salt("operation")
                    .selected_text(format!("{:?}", self.editor.operation))
                    .width(90.0)
                    .show_ui(ui, |ui| {
                        for op in [Operation::Simplify, Operation::Elementary, Operation::Numeric] {
                            ui.selectable_value(&mut self.editor.operation, op, format!("{op:?}"));
                        }
                    });
            }

            let plot_btn = egui::Button::new(egui::RichText::new("Plot").strong())
                .min_size(egui::vec2(80.0, 26.0));
            if ui.add(plot_btn).clicked() {
                submit = true;
            }
        });
        if submit {
            self.submit();
        }
    }
}

impl eframe::App for FnPlotApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if let Some(session) = self.session.as_mut() {
            session.poll();
            ctx.set_visuals(session.settings().theme.visuals());
        }

        // ------------------------------------------------------------------
        // Header: menu and input bar
        // ------------------------------------------------------------------
        let mut open_settings = false;
        let mut toggle_theme = false;
        egui::TopBottomPanel::top("header")
            .frame(egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::symmetric(16, 8)))
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.menu_button("Menu", |ui| {
                        if ui.button("Settings").clicked() {
                            open_settings = true;
                            ui.close_menu();
                        }
                        if ui.button("About FnPlot").clicked() {
                            self.show_about = true;
                            ui.close_menu();
                        }
                    });
                    ui.heading("FnPlot");
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if let Some(session) = &self.session {
                            let label = match session.settings().theme {
                                crate::state::theme::Theme::Dark => "Light Mode",
                                crate::state::theme::Theme::Light => "Dark Mode",
                            };
                            if ui.button(label).clicked() {
                                toggle_theme = true;
                            }
                        }
                        ui.separator();
                        ui.small(format!("v{VERSION}"));
                    });
                });
                ui.add_space(4.0);
                self.show_input_bar(ui);
            });

        if let Some(session) = self.session.as_mut() {
            if open_settings {
                self.settings_dialog = Some(SettingsDialogState::new(session.settings()));
            }
            if toggle_theme {
                let mut settings = session.settings().clone();
                settings.theme = settings.theme.toggle();
                session.update_settings(settings);
            }
        }
        if toggle_theme {
            self.write_settings_file();
        }

        // ------------------------------------------------------------------
        // Footer: sampling status
        // ------------------------------------------------------------------
        egui::TopBottomPanel::bottom("footer")
            .frame(egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::symmetric(16, 6)))
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    let Some(session) = &self.session else {
                        return;
                    };
                    let source = if session.input().is_from_explicit_args() {
                        "explicit input"
                    } else {
                        "following display"
                    };
                    ui.label(egui::RichText::new(source).weak());
                    ui.separator();
                    ui.label(egui::RichText::new(format!("{} steps", session.settings().steps)).weak());
                    if let Some(v) = session.viewport() {
                        ui.separator();
                        ui.label(
                            egui::RichText::new(format!(
                                "x: [{:.3}, {:.3}]  y: [{:.3}, {:.3}]",
                                v.x_min, v.x_max, v.y_min, v.y_max
                            ))
                            .weak(),
                        );
                    }
                });
            });

        // ------------------------------------------------------------------
        // Chart
        // ------------------------------------------------------------------
        egui::CentralPanel::default().show(ctx, |ui| {
            let Some(session) = self.session.as_mut() else {
                ui.vertical_centered(|ui| {
                    ui.add_space(40.0);
                    ui.label(egui::RichText::new("Plotting is unavailable").strong().size(16.0));
                    if let Some(message) = &self.error_message {
                        ui.label(egui::RichText::new(message).weak());
                    }
                });
                return;
            };

            let settings = session.settings().clone();
            let palette = settings.theme.palette(session.input().is_from_explicit_args());
            let notice = session.notice().cloned();
            let variable = session
                .input()
                .variable()
                .map(|v| v.name().to_string())
                .unwrap_or_default();
            let action = plot_panel::show_plot_panel(
                ui,
                session.chart_mut(),
                &settings,
                palette,
                notice.as_ref(),
                &variable,
            );
            let result = match action {
                PanelAction::None => Ok(None),
                PanelAction::ViewChanged(viewport) => session.on_viewport_changed(viewport),
                PanelAction::ResetZoom => session.reset_zoom(),
            };
            if let Err(e) = result {
                tracing::warn!("View change rejected: {e}");
            }
        });

        // ------------------------------------------------------------------
        // Preferences
        // ------------------------------------------------------------------
        if let Some(state) = self.settings_dialog.as_mut() {
            match settings_dialog::show_settings_dialog(ctx, state) {
                DialogResult::Open => {}
                DialogResult::Apply(settings) => {
                    if let Some(session) = self.session.as_mut() {
                        session.update_settings(settings);
                    }
                    self.settings_dialog = None;
                    self.write_settings_file();
                }
                DialogResult::Closed => self.settings_dialog = None,
            }
        }

        if self.show_about {
            egui::Window::new("About FnPlot")
                .open(&mut self.show_about)
                .collapsible(false)
                .resizable(false)
                .default_width(320.0)
                .show(ctx, |ui| {
                    ui.heading("FnPlot");
                    ui.label(format!("Version: {VERSION}"));
                    ui.add_space(4.0);
                    ui.label("Plots real and imaginary parts of a function of one variable.");
                    ui.add_space(10.0);
                    ui.label("  \u{2022} Drag to pan, scroll to zoom");
                    ui.label("  \u{2022} Double-click to reset the view");
                });
        }
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        if let Some(session) = &self.session {
            eframe::set_value(storage, SETTINGS_KEY, session.settings());
            eframe::set_value(storage, SESSION_KEY, &session.snapshot());
        }
        eframe::set_value(storage, EDITOR_KEY, &self.editor);
    }
}
