//! Role-based permission evaluation.
//!
//! Roles are decoded once during bootstrap from a static JSON document
//! mapping role names to their permission lists. Permissions are flat
//! strings compared by equality. The [`ADMINISTRATOR_ROLE`] bypasses every
//! check.
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Role that is granted every permission
pub const ADMINISTRATOR_ROLE: &str = "administrator";

/// Role definition bundled with the crate
pub const DEFAULT_ROLES: &str = include_str!("roles.json");

/// A named set of permissions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub permissions: HashSet<String>,
}

impl Role {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            permissions: HashSet::new(),
        }
    }

    pub fn can(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }
}

/// Role name to [`Role`] mapping
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleTable {
    roles: HashMap<String, Role>,
}

impl RoleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a role definition. Role names are taken from the map keys.
    pub fn from_json(source: &str) -> serde_json::Result<Self> {
        let mut table: RoleTable = serde_json::from_str(source)?;
        for (name, role) in table.roles.iter_mut() {
            role.name = name.clone();
        }
        Ok(table)
    }

    pub fn role(&self, name: &str) -> Option<&Role> {
        self.roles.get(name)
    }

    pub fn role_names(&self) -> impl Iterator<Item = &str> {
        self.roles.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// Add `permission` to `role`, creating the role if needed.
    pub fn grant(&mut self, role: &str, permission: impl Into<String>) {
        self.roles
            .entry(role.to_string())
            .or_insert_with(|| Role::new(role))
            .permissions
            .insert(permission.into());
    }

    pub fn revoke(&mut self, role: &str, permission: &str) -> bool {
        self.roles
            .get_mut(role)
            .is_some_and(|r| r.permissions.remove(permission))
    }

    /// Whether any of `roles` grants `permission`.
    pub fn can<S: AsRef<str>>(&self, permission: &str, roles: &[S]) -> bool {
        if roles.iter().any(|r| r.as_ref() == ADMINISTRATOR_ROLE) {
            return true;
        }
        roles
            .iter()
            .filter_map(|r| self.roles.get(r.as_ref()))
            .any(|role| role.can(permission))
    }
}

/// Shared read-only handle on the decoded role table, for request handlers.
#[derive(Debug, Clone, Default)]
pub struct Acl {
    table: Arc<RoleTable>,
}

impl Acl {
    pub fn new(table: Arc<RoleTable>) -> Self {
        Self { table }
    }

    pub fn can<S: AsRef<str>>(&self, permission: &str, roles: &[S]) -> bool {
        self.table.can(permission, roles)
    }

    pub fn table(&self) -> &RoleTable {
        &self.table
    }
}
