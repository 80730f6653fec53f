//! Care Portal Gateway Library
//!
//! Same-origin gateway for the healthcare portal: relays `/proxy/*` (and the
//! `/_/api/*`, `/_api/*` aliases) to the backend API, gates protected page
//! sections by role and sub-role, and resolves each identity's navigation menu.

pub mod access;
pub mod backend;
pub mod config;
pub mod forwarder;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::schema::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
