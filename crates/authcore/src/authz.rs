// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Role hierarchy and permission derivation.
//!
//! Pure functions: no clock, no I/O, no store access. Decisions here are
//! advisory for UX only; the server remains the authority on every call.
//! Unknown role or permission names match nothing; they never error and
//! never grant.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::credential::UserRecord;

/// Suffix marking a permission that grants everything sharing its prefix,
/// e.g. `users:*` grants `users:delete`.
const WILDCARD_SUFFIX: &str = ":*";

/// Grants every permission.
const GLOBAL_WILDCARD: &str = "*";

/// One role in the hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleDef {
    pub name: String,
    /// Position in the total order; higher levels inherit everything
    /// declared at lower levels.
    pub level: u32,
    /// Permissions declared at this level.
    pub permissions: Vec<String>,
}

impl RoleDef {
    pub fn new(name: &str, level: u32, permissions: &[&str]) -> Self {
        Self {
            name: name.to_owned(),
            level,
            permissions: permissions.iter().map(|p| (*p).to_owned()).collect(),
        }
    }
}

/// Static role table. Read-only at runtime; hosts may supply their own.
#[derive(Debug, Clone)]
pub struct RoleHierarchy {
    roles: Vec<RoleDef>,
}

impl Default for RoleHierarchy {
    fn default() -> Self {
        Self::new(vec![
            RoleDef::new("guest", 1, &["profile:read"]),
            RoleDef::new("user", 2, &["profile:*", "content:read", "content:create"]),
            RoleDef::new("moderator", 3, &["content:*", "users:read", "reports:*"]),
            RoleDef::new("admin", 4, &["users:*", "roles:read", "audit:view"]),
            RoleDef::new("superadmin", 5, &["*"]),
        ])
    }
}

impl RoleHierarchy {
    pub fn new(mut roles: Vec<RoleDef>) -> Self {
        roles.sort_by_key(|r| r.level);
        Self { roles }
    }

    /// Look up a role case-insensitively.
    fn find(&self, name: &str) -> Option<&RoleDef> {
        self.roles.iter().find(|r| r.name.eq_ignore_ascii_case(name))
    }

    /// The hierarchy level of a role, or None for an unknown name.
    pub fn level_of(&self, name: &str) -> Option<u32> {
        self.find(name).map(|r| r.level)
    }

    /// Union of the role's own permissions and every permission declared
    /// at a lower-or-equal level. Empty for an unknown role.
    pub fn effective_permissions(&self, role: &str) -> HashSet<String> {
        let Some(level) = self.level_of(role) else {
            return HashSet::new();
        };
        self.roles
            .iter()
            .filter(|r| r.level <= level)
            .flat_map(|r| r.permissions.iter().cloned())
            .collect()
    }

    /// Everything granted across all of the user's roles.
    fn user_permissions(&self, user: &UserRecord) -> HashSet<String> {
        user.roles.iter().flat_map(|role| self.effective_permissions(role)).collect()
    }

    /// Whether the user is at least as senior as `role`: true when any held
    /// role's level is >= the queried role's level, not only on an exact
    /// match.
    pub fn has_role(&self, user: &UserRecord, role: &str) -> bool {
        let Some(required) = self.level_of(role) else {
            return false;
        };
        user.roles.iter().filter_map(|r| self.level_of(r)).any(|level| level >= required)
    }

    /// Whether the user's effective set grants `permission`, exactly or
    /// through a wildcard.
    pub fn has_permission(&self, user: &UserRecord, permission: &str) -> bool {
        self.user_permissions(user).iter().any(|granted| grant_matches(granted, permission))
    }

    /// Composite check: the role gate (when given) fails fast; the
    /// permission list honors any-of/all-of.
    pub fn has_access(&self, user: &UserRecord, check: &AccessCheck) -> bool {
        if let Some(ref role) = check.role {
            if !self.has_role(user, role) {
                return false;
            }
        }
        if check.permissions.is_empty() {
            return true;
        }
        let granted = self.user_permissions(user);
        let matches =
            |p: &String| granted.iter().any(|g| grant_matches(g, p));
        if check.require_all {
            check.permissions.iter().all(matches)
        } else {
            check.permissions.iter().any(matches)
        }
    }
}

/// Composite access request.
#[derive(Debug, Clone, Default)]
pub struct AccessCheck {
    /// Minimum role, checked hierarchically.
    pub role: Option<String>,
    /// Permissions to check against the user's effective set.
    pub permissions: Vec<String>,
    /// All permissions required (true) or any one of them (false).
    pub require_all: bool,
}

impl AccessCheck {
    pub fn role(name: &str) -> Self {
        Self { role: Some(name.to_owned()), ..Self::default() }
    }

    pub fn any_of(permissions: &[&str]) -> Self {
        Self {
            permissions: permissions.iter().map(|p| (*p).to_owned()).collect(),
            require_all: false,
            ..Self::default()
        }
    }

    pub fn all_of(permissions: &[&str]) -> Self {
        Self {
            permissions: permissions.iter().map(|p| (*p).to_owned()).collect(),
            require_all: true,
            ..Self::default()
        }
    }

    pub fn with_role(mut self, name: &str) -> Self {
        self.role = Some(name.to_owned());
        self
    }
}

/// Whether a granted permission string covers `permission`: exact match,
/// shared-prefix wildcard, or the global wildcard.
fn grant_matches(granted: &str, permission: &str) -> bool {
    if granted == GLOBAL_WILDCARD {
        return true;
    }
    if let Some(prefix) = granted.strip_suffix(WILDCARD_SUFFIX) {
        return permission
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with(':'));
    }
    granted == permission
}

#[cfg(test)]
#[path = "authz_tests.rs"]
mod tests;
