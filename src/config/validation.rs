//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Check that every declared path is absolute
//! - Detect duplicate section names
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - The backend URL is not validated here: a missing or malformed URL
//!   disables forwarding instead of preventing startup

use std::collections::HashSet;
use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::GatewayConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    /// Human readable explanation.
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::new("security.max_body_size", "must be greater than 0"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if !config.access.unauthorized_path.starts_with('/') {
        errors.push(ValidationError::new("access.unauthorized_path", "must start with '/'"));
    }

    for (field, value) in [
        ("access.role_header", &config.access.role_header),
        ("access.sub_role_header", &config.access.sub_role_header),
    ] {
        if axum::http::HeaderName::from_bytes(value.as_bytes()).is_err() {
            errors.push(ValidationError::new(field, format!("'{}' is not a header name", value)));
        }
    }

    let mut seen = HashSet::new();
    for (i, section) in config.access.sections.iter().enumerate() {
        let field = format!("access.sections[{}]", i);
        if !seen.insert(section.name.as_str()) {
            errors.push(ValidationError::new(
                format!("{}.name", field),
                format!("duplicate section '{}'", section.name),
            ));
        }
        if !section.path_prefix.starts_with('/') {
            errors.push(ValidationError::new(format!("{}.path_prefix", field), "must start with '/'"));
        }
        if section.allowed_roles.is_empty() {
            errors.push(ValidationError::new(
                format!("{}.allowed_roles", field),
                "at least one role is required",
            ));
        }
    }

    if let Some(table) = &config.menu.table {
        for (role, sub_roles) in table {
            for (sub_role, entries) in sub_roles {
                for (i, entry) in entries.iter().enumerate() {
                    if !entry.path.starts_with('/') {
                        errors.push(ValidationError::new(
                            format!("menu.table.{}.{}[{}].path", role, sub_role, i),
                            "must start with '/'",
                        ));
                    }
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
