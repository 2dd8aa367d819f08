pub mod bounds;
pub mod scheduler;
pub mod series_builder;
