//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, layers)
//!     → request.rs (assign / propagate request ID)
//!     → /proxy, /_/api, /_api  → proxy.rs → forwarder
//!     → /session/*             → session.rs (menu, landing redirect)
//!     → anything else          → middleware (section guard) → session.rs page context
//!     → response.rs (JSON errors)
//! ```

pub mod middleware;
pub mod proxy;
pub mod request;
pub mod response;
pub mod server;
pub mod session;

pub use request::X_REQUEST_ID;
pub use server::{AppState, HttpServer};
