//! Identity claims attached to authenticated sessions.

use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};

/// Role and sub-role of an authenticated session.
///
/// Produced by the authentication layer; immutable until the user signs in again.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentityClaim {
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_role: Option<String>,
}

impl IdentityClaim {
    pub fn new(role: impl Into<String>, sub_role: Option<&str>) -> Self {
        Self {
            role: role.into(),
            sub_role: sub_role.map(str::to_string),
        }
    }
}

/// Resolves the identity of the session making a request.
///
/// `None` means the request is unauthenticated.
pub trait IdentityResolver: Send + Sync + std::fmt::Debug {
    fn resolve(&self, headers: &HeaderMap) -> Option<IdentityClaim>;
}

/// Reads the claim from headers set by the authentication layer in front of
/// the gateway.
#[derive(Debug, Clone)]
pub struct HeaderIdentityResolver {
    role_header: String,
    sub_role_header: String,
}

impl HeaderIdentityResolver {
    pub fn new(role_header: impl Into<String>, sub_role_header: impl Into<String>) -> Self {
        Self {
            role_header: role_header.into(),
            sub_role_header: sub_role_header.into(),
        }
    }

    fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }
}

impl IdentityResolver for HeaderIdentityResolver {
    fn resolve(&self, headers: &HeaderMap) -> Option<IdentityClaim> {
        let role = Self::header(headers, &self.role_header)?;
        let sub_role = Self::header(headers, &self.sub_role_header);
        Some(IdentityClaim::new(role, sub_role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> HeaderIdentityResolver {
        HeaderIdentityResolver::new("x-portal-role", "x-portal-sub-role")
    }

    #[test]
    fn test_resolves_role_and_sub_role() {
        let mut headers = HeaderMap::new();
        headers.insert("x-portal-role", "doctor".parse().unwrap());
        headers.insert("x-portal-sub-role", "dietitian".parse().unwrap());

        let claim = resolver().resolve(&headers).unwrap();
        assert_eq!(claim, IdentityClaim::new("doctor", Some("dietitian")));
    }

    #[test]
    fn test_missing_or_blank_role_is_unauthenticated() {
        let mut headers = HeaderMap::new();
        assert!(resolver().resolve(&headers).is_none());

        headers.insert("x-portal-role", "  ".parse().unwrap());
        headers.insert("x-portal-sub-role", "patient".parse().unwrap());
        assert!(resolver().resolve(&headers).is_none());
    }

    #[test]
    fn test_sub_role_optional() {
        let mut headers = HeaderMap::new();
        headers.insert("x-portal-role", "clinic".parse().unwrap());
        let claim = resolver().resolve(&headers).unwrap();
        assert_eq!(claim.sub_role, None);
    }
}
