pub mod plot_panel;
pub mod settings_dialog;
