//! PROVREG server: business services, HTTP API and configuration.

pub mod api;
pub mod config;
pub mod service;
pub mod state;
