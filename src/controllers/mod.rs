pub mod alerts_controller;
pub mod cache_controller;
pub mod forecast_controller;
pub mod rule_editor;
pub mod statistics_controller;
