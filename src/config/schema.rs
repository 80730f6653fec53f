//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::access::menu::MenuTableConfig;

/// Root configuration for the portal gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Backend API the forwarder relays to.
    pub backend: BackendConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request size limits.
    pub security: SecurityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Protected sections and identity headers.
    pub access: AccessConfig,

    /// Navigation menu settings.
    pub menu: MenuConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Backend API configuration.
///
/// An empty or unparsable `url` disables forwarding (every proxied request
/// fails with a configuration error).
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BackendConfig {
    /// Absolute backend URL, optionally with a base path (e.g. "http://api:9000/v1").
    pub url: String,
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum buffered request body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Access control configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AccessConfig {
    /// Where denied page requests are redirected.
    pub unauthorized_path: String,

    /// Header carrying the authenticated role.
    pub role_header: String,

    /// Header carrying the authenticated sub-role.
    pub sub_role_header: String,

    /// Protected page sections.
    pub sections: Vec<SectionConfig>,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            unauthorized_path: "/unauthorized".to_string(),
            role_header: "x-portal-role".to_string(),
            sub_role_header: "x-portal-sub-role".to_string(),
            sections: Vec::new(),
        }
    }
}

/// A protected page section and its access policy.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct SectionConfig {
    /// Section identifier for logging/metrics.
    pub name: String,

    /// Path prefix the section covers.
    pub path_prefix: String,

    /// Roles allowed to view the section.
    pub allowed_roles: Vec<String>,

    /// Sub-roles allowed to view the section. Empty means any sub-role.
    #[serde(default)]
    pub allowed_sub_roles: Vec<String>,
}

/// How the active menu entry is chosen for a path.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ActiveMatch {
    /// Only an entry whose path equals the current path is active.
    #[default]
    Exact,
    /// When nothing matches exactly, the landing entry is active.
    LandingFallback,
}

/// Navigation menu configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct MenuConfig {
    /// Active entry selection rule.
    pub active_match: ActiveMatch,

    /// Replaces the built-in menu table when present.
    pub table: Option<MenuTableConfig>,
}
