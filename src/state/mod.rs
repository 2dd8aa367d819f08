pub mod data_series;
pub mod prepared_input;
pub mod settings;
pub mod theme;
pub mod viewport;
