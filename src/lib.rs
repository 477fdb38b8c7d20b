//! Client library for the weather dashboard API.
//!
//! The interesting part is the alert subsystem: a rule editor, a live
//! WebSocket channel, and the section that keeps the cached alert list in
//! step with the server. The remaining controllers (statistics, forecast,
//! cache) are thin state holders over [`services::api_client::ApiClient`].

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod ws;

pub mod controllers;
