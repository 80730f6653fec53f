//! Access policies and the per-request guard state machine.
//!
//! ```text
//!            identity satisfies policy
//! Pending ───────────────────────────────▶ Allowed
//!    │
//!    │ unauthenticated / role or sub-role not allowed
//!    ▼
//! Denied
//! ```
//!
//! Allowed and Denied are terminal for a guard. Re-entering a protected page
//! builds a new guard, which starts at Pending again.

use std::collections::HashSet;

use crate::access::identity::IdentityClaim;
use crate::config::SectionConfig;

/// Roles and sub-roles permitted to view a protected page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AccessPolicy {
    allowed_roles: HashSet<String>,
    allowed_sub_roles: HashSet<String>,
}

impl AccessPolicy {
    /// An empty `sub_roles` list admits every sub-role of an allowed role.
    pub fn new<R, S>(roles: R, sub_roles: S) -> Self
    where
        R: IntoIterator,
        R::Item: Into<String>,
        S: IntoIterator,
        S::Item: Into<String>,
    {
        Self {
            allowed_roles: roles.into_iter().map(Into::into).collect(),
            allowed_sub_roles: sub_roles.into_iter().map(Into::into).collect(),
        }
    }

    /// Evaluate an identity. `None` is an unauthenticated session.
    pub fn evaluate(&self, identity: Option<&IdentityClaim>) -> Decision {
        let Some(identity) = identity else {
            return Decision::Denied(DenyReason::Unauthenticated);
        };

        if !self.allowed_roles.contains(&identity.role) {
            return Decision::Denied(DenyReason::RoleNotAllowed);
        }

        if self.allowed_sub_roles.is_empty() {
            return Decision::Allowed;
        }

        match &identity.sub_role {
            Some(sub_role) if self.allowed_sub_roles.contains(sub_role) => Decision::Allowed,
            _ => Decision::Denied(DenyReason::SubRoleNotAllowed),
        }
    }
}

/// Outcome of evaluating a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    Denied(DenyReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    Unauthenticated,
    RoleNotAllowed,
    SubRoleNotAllowed,
}

impl DenyReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DenyReason::Unauthenticated => "unauthenticated",
            DenyReason::RoleNotAllowed => "role_not_allowed",
            DenyReason::SubRoleNotAllowed => "sub_role_not_allowed",
        }
    }
}

/// Render state of a protected page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    /// Identity not resolved yet; render a placeholder.
    Pending,
    /// Redirect to the unauthorized page and render nothing else.
    Denied(DenyReason),
    /// Render the protected content.
    Allowed,
}

impl GuardState {
    pub fn as_str(&self) -> &'static str {
        match self {
            GuardState::Pending => "pending",
            GuardState::Denied(_) => "denied",
            GuardState::Allowed => "allowed",
        }
    }
}

/// Guard for a single render of a protected page.
#[derive(Debug)]
pub struct AccessGuard<'a> {
    policy: &'a AccessPolicy,
    state: GuardState,
}

impl<'a> AccessGuard<'a> {
    pub fn new(policy: &'a AccessPolicy) -> Self {
        Self {
            policy,
            state: GuardState::Pending,
        }
    }

    pub fn state(&self) -> GuardState {
        self.state
    }

    /// Settle the guard with the resolved identity.
    ///
    /// Only the first resolution moves the guard out of `Pending`; later calls
    /// return the settled state unchanged.
    pub fn resolve(&mut self, identity: Option<&IdentityClaim>) -> GuardState {
        if self.state == GuardState::Pending {
            self.state = match self.policy.evaluate(identity) {
                Decision::Allowed => GuardState::Allowed,
                Decision::Denied(reason) => GuardState::Denied(reason),
            };
        }
        self.state
    }
}

/// A protected path prefix and its policy.
#[derive(Debug, Clone)]
pub struct ProtectedSection {
    pub name: String,
    pub path_prefix: String,
    pub policy: AccessPolicy,
}

impl From<&SectionConfig> for ProtectedSection {
    fn from(config: &SectionConfig) -> Self {
        Self {
            name: config.name.clone(),
            path_prefix: config.path_prefix.clone(),
            policy: AccessPolicy::new(
                config.allowed_roles.iter().cloned(),
                config.allowed_sub_roles.iter().cloned(),
            ),
        }
    }
}

/// Immutable set of protected sections.
#[derive(Debug, Clone, Default)]
pub struct SectionPolicies {
    // Longest prefix first so nested sections win.
    sections: Vec<ProtectedSection>,
}

impl SectionPolicies {
    pub fn from_config(configs: &[SectionConfig]) -> Self {
        let mut sections: Vec<ProtectedSection> = configs.iter().map(ProtectedSection::from).collect();
        sections.sort_by(|a, b| b.path_prefix.len().cmp(&a.path_prefix.len()));
        Self { sections }
    }

    /// Section covering `path`, if any. Prefixes match on segment boundaries,
    /// so `/doctor` covers `/doctor` and `/doctor/x` but not `/doctors`.
    pub fn section_for(&self, path: &str) -> Option<&ProtectedSection> {
        self.sections
            .iter()
            .find(|s| prefix_covers(&s.path_prefix, path))
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

fn prefix_covers(prefix: &str, path: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return true;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
