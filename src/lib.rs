//! Function plotter: samples a one-variable expression over the visible
//! range and redraws it as the user pans and zooms.

pub mod app;
pub mod display;
pub mod error;
pub mod expr;
pub mod processing;
pub mod render;
pub mod session;
pub mod state;
pub mod ui;
