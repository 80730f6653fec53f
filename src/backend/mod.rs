//! Server-side access to the backend API.

pub mod client;

pub use client::{ApiClient, ApiError, BearerToken};
