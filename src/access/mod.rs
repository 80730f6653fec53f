//! Access control subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming page request
//!     → identity.rs (resolve role / sub-role from the session)
//!     → policy.rs (find protected section, run guard: Pending → Allowed | Denied)
//!     → menu.rs (role → sub-role → ordered entries, active entry)
//! ```
//!
//! # Design Decisions
//! - Policies and menus are built at startup and never mutated
//! - Denial and empty menus are ordinary values, never errors
//! - Unknown roles are a typed "not found" (empty slice), not a fallback

pub mod identity;
pub mod menu;
pub mod policy;

pub use identity::{HeaderIdentityResolver, IdentityClaim, IdentityResolver};
pub use menu::{active_index, render_menu, MenuEntry, MenuItem, MenuTable};
pub use policy::{AccessGuard, AccessPolicy, Decision, DenyReason, GuardState, SectionPolicies};
