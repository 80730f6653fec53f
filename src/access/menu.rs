//! Role based navigation menus.
//!
//! The menu table maps role → sub-role → ordered entries. Entry order is
//! render order, and the first entry of a list is the landing path for that
//! identity. Unknown roles or sub-roles resolve to an empty menu, which callers
//! render as "no menu" rather than an error.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::access::identity::IdentityClaim;
use crate::config::{ActiveMatch, MenuConfig};

/// One navigation entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuEntry {
    pub label: String,
    pub path: String,
    pub icon: String,
}

/// Serialized form of a menu table: role → sub-role → entries.
pub type MenuTableConfig = HashMap<String, HashMap<String, Vec<MenuEntry>>>;

/// An entry with its active flag, as handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    pub label: String,
    pub path: String,
    pub icon: String,
    pub active: bool,
}

type BuiltinEntries = &'static [(&'static str, &'static str, &'static str)];

const BUILTIN: &[(&str, &str, BuiltinEntries)] = &[
    (
        "customer",
        "patient",
        &[
            ("Dashboard", "/patient/dashboard", "dashboard"),
            ("Appointments", "/patient/appointments", "calendar"),
            ("Find Doctors", "/patient/doctors", "stethoscope"),
            ("Prescriptions", "/patient/prescriptions", "prescription"),
            ("Profile", "/patient/profile", "user"),
        ],
    ),
    (
        "customer",
        "ambulance",
        &[
            ("Dashboard", "/ambulance/dashboard", "dashboard"),
            ("Fleet", "/ambulance/fleet", "ambulance"),
            ("Bookings", "/ambulance/bookings", "clipboard"),
            ("Registration", "/ambulance/registration", "id-card"),
            ("Profile", "/ambulance/profile", "user"),
        ],
    ),
    (
        "customer",
        "oxygen",
        &[
            ("Dashboard", "/oxygen/dashboard", "dashboard"),
            ("Inventory", "/oxygen/inventory", "cylinder"),
            ("Orders", "/oxygen/orders", "clipboard"),
            ("Profile", "/oxygen/profile", "user"),
        ],
    ),
    (
        "doctor",
        "doctor",
        &[
            ("Dashboard", "/doctor/dashboard", "dashboard"),
            ("Appointments", "/doctor/appointments", "calendar"),
            ("Patients", "/doctor/patients", "users"),
            ("Schedule", "/doctor/schedule", "clock"),
            ("Profile", "/doctor/profile", "user"),
        ],
    ),
    (
        "doctor",
        "dietitian",
        &[
            ("Dashboard", "/dietitian/dashboard", "dashboard"),
            ("Clients", "/dietitian/clients", "users"),
            ("Diet Plans", "/dietitian/plans", "nutrition"),
            ("Profile", "/dietitian/profile", "user"),
        ],
    ),
    (
        "clinic",
        "clinic",
        &[
            ("Dashboard", "/clinic/dashboard", "dashboard"),
            ("Doctors", "/clinic/doctors", "stethoscope"),
            ("Appointments", "/clinic/appointments", "calendar"),
            ("Profile", "/clinic/profile", "user"),
        ],
    ),
];

/// Immutable two-level menu lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuTable {
    roles: MenuTableConfig,
}

impl MenuTable {
    pub fn new(roles: MenuTableConfig) -> Self {
        Self { roles }
    }

    /// The configured table, or the built-in one when none is configured.
    pub fn from_config(config: &MenuConfig) -> Self {
        match &config.table {
            Some(table) => Self::new(table.clone()),
            None => Self::builtin(),
        }
    }

    /// The menus shipped with the portal.
    pub fn builtin() -> Self {
        let mut roles: MenuTableConfig = HashMap::new();
        for (role, sub_role, entries) in BUILTIN {
            let entries = entries
                .iter()
                .map(|(label, path, icon)| MenuEntry {
                    label: label.to_string(),
                    path: path.to_string(),
                    icon: icon.to_string(),
                })
                .collect();
            roles
                .entry(role.to_string())
                .or_default()
                .insert(sub_role.to_string(), entries);
        }
        Self { roles }
    }

    /// Ordered entries for a role/sub-role pair; empty when either is unknown.
    pub fn resolve(&self, role: &str, sub_role: &str) -> &[MenuEntry] {
        self.roles
            .get(role)
            .and_then(|subs| subs.get(sub_role))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Entries for an identity. A claim without a sub-role has no menu.
    pub fn for_identity(&self, identity: &IdentityClaim) -> &[MenuEntry] {
        match &identity.sub_role {
            Some(sub_role) => self.resolve(&identity.role, sub_role),
            None => &[],
        }
    }

    /// Default landing path: the first entry's path.
    pub fn landing_path(&self, identity: &IdentityClaim) -> Option<&str> {
        self.for_identity(identity).first().map(|e| e.path.as_str())
    }

    /// Known roles, sorted.
    pub fn roles(&self) -> Vec<&str> {
        let mut roles: Vec<&str> = self.roles.keys().map(String::as_str).collect();
        roles.sort_unstable();
        roles
    }
}

/// Index of the active entry for `current_path`.
///
/// With [`ActiveMatch::LandingFallback`] the landing entry is active whenever
/// no entry matches exactly.
pub fn active_index(entries: &[MenuEntry], current_path: &str, rule: ActiveMatch) -> Option<usize> {
    if let Some(i) = entries.iter().position(|e| e.path == current_path) {
        return Some(i);
    }
    match rule {
        ActiveMatch::Exact => None,
        ActiveMatch::LandingFallback if !entries.is_empty() => Some(0),
        ActiveMatch::LandingFallback => None,
    }
}

/// Entries with their active flags set for `current_path`.
pub fn render_menu(entries: &[MenuEntry], current_path: &str, rule: ActiveMatch) -> Vec<MenuItem> {
    let active = active_index(entries, current_path, rule);
    entries
        .iter()
        .enumerate()
        .map(|(i, e)| MenuItem {
            label: e.label.clone(),
            path: e.path.clone(),
            icon: e.icon.clone(),
            active: Some(i) == active,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ambulance_menu_and_landing() {
        let table = MenuTable::builtin();
        let entries = table.resolve("customer", "ambulance");
        assert!(!entries.is_empty());
        assert_eq!(entries[0].path, "/ambulance/dashboard");

        let identity = IdentityClaim::new("customer", Some("ambulance"));
        assert_eq!(table.landing_path(&identity), Some("/ambulance/dashboard"));
    }

    #[test]
    fn test_unknown_keys_resolve_empty() {
        let table = MenuTable::builtin();
        assert!(table.resolve("customer", "unknown_subtype").is_empty());
        assert!(table.resolve("pharmacist", "patient").is_empty());
        assert!(table
            .for_identity(&IdentityClaim::new("customer", None))
            .is_empty());
        assert_eq!(table.landing_path(&IdentityClaim::new("ghost", Some("x"))), None);
    }

    #[test]
    fn test_resolution_is_stable() {
        let table = MenuTable::builtin();
        let first = table.resolve("doctor", "dietitian").to_vec();
        let second = table.resolve("doctor", "dietitian").to_vec();
        assert_eq!(first, second);
        let labels: Vec<_> = first.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["Dashboard", "Clients", "Diet Plans", "Profile"]);
    }

    #[test]
    fn test_exact_active_match() {
        let table = MenuTable::builtin();
        let entries = table.resolve("doctor", "doctor");
        assert_eq!(active_index(entries, "/doctor/patients", ActiveMatch::Exact), Some(2));
        assert_eq!(active_index(entries, "/doctor/patients/42", ActiveMatch::Exact), None);
    }

    #[test]
    fn test_landing_fallback_active_match() {
        let table = MenuTable::builtin();
        let entries = table.resolve("doctor", "doctor");
        assert_eq!(
            active_index(entries, "/doctor/patients/42", ActiveMatch::LandingFallback),
            Some(0)
        );
        assert_eq!(active_index(&[], "/x", ActiveMatch::LandingFallback), None);
    }

    #[test]
    fn test_render_marks_single_active_entry() {
        let table = MenuTable::builtin();
        let items = render_menu(table.resolve("clinic", "clinic"), "/clinic/doctors", ActiveMatch::Exact);
        let active: Vec<_> = items.iter().filter(|i| i.active).map(|i| i.path.as_str()).collect();
        assert_eq!(active, vec!["/clinic/doctors"]);
    }

    #[test]
    fn test_custom_table_replaces_builtin() {
        let mut subs = HashMap::new();
        subs.insert(
            "nurse".to_string(),
            vec![MenuEntry {
                label: "Ward".into(),
                path: "/ward".into(),
                icon: "bed".into(),
            }],
        );
        let mut roles = HashMap::new();
        roles.insert("staff".to_string(), subs);

        let table = MenuTable::new(roles);
        assert_eq!(table.resolve("staff", "nurse")[0].path, "/ward");
        assert!(table.resolve("customer", "patient").is_empty());
        assert_eq!(table.roles(), vec!["staff"]);
    }
}
