pub mod api_client;
pub mod geolocation;
pub mod rule_eval;
