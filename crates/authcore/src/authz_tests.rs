// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::credential::UserRecord;

fn user(roles: &[&str]) -> UserRecord {
    UserRecord {
        user_id: "u1".to_owned(),
        email: "user@example.com".to_owned(),
        roles: roles.iter().map(|r| (*r).to_owned()).collect(),
    }
}

#[test]
fn wildcard_grants_matching_prefix_only() {
    let hierarchy = RoleHierarchy::new(vec![RoleDef::new("editor", 1, &["users:*"])]);
    let u = user(&["editor"]);
    assert!(hierarchy.has_permission(&u, "users:delete"));
    assert!(hierarchy.has_permission(&u, "users:profile:read"));
    assert!(!hierarchy.has_permission(&u, "audit:view"));
    // The bare prefix is not covered, and neither is a longer first segment.
    assert!(!hierarchy.has_permission(&u, "users"));
    assert!(!hierarchy.has_permission(&u, "usersx:delete"));
}

#[test]
fn global_wildcard_grants_everything() {
    let hierarchy = RoleHierarchy::default();
    let u = user(&["superadmin"]);
    assert!(hierarchy.has_permission(&u, "users:delete"));
    assert!(hierarchy.has_permission(&u, "anything:at:all"));
}

#[test]
fn effective_permissions_union_lower_levels() {
    let hierarchy = RoleHierarchy::default();
    let perms = hierarchy.effective_permissions("moderator");
    // Own level plus everything below it.
    assert!(perms.contains("content:*"));
    assert!(perms.contains("users:read"));
    assert!(perms.contains("profile:*"));
    assert!(perms.contains("profile:read"));
    // Nothing declared above level 3.
    assert!(!perms.contains("users:*"));
    assert!(!perms.contains("audit:view"));
    assert!(!perms.contains("*"));
}

#[test]
fn level_three_role_lacks_level_four_grants() {
    let hierarchy = RoleHierarchy::default();
    let u = user(&["moderator"]);
    assert!(hierarchy.has_permission(&u, "content:edit"));
    assert!(hierarchy.has_permission(&u, "reports:export"));
    assert!(!hierarchy.has_permission(&u, "audit:view"));
    assert!(!hierarchy.has_permission(&u, "users:delete"));
}

#[test]
fn role_check_is_hierarchical_not_exact() {
    let hierarchy = RoleHierarchy::default();
    assert!(hierarchy.has_role(&user(&["admin"]), "user"));
    assert!(hierarchy.has_role(&user(&["admin"]), "admin"));
    assert!(!hierarchy.has_role(&user(&["user"]), "admin"));
}

#[test]
fn unknown_names_never_grant_and_never_error() {
    let hierarchy = RoleHierarchy::default();
    assert!(hierarchy.effective_permissions("owner").is_empty());
    assert!(!hierarchy.has_role(&user(&["admin"]), "owner"));
    let u = user(&["intruder"]);
    assert!(!hierarchy.has_permission(&u, "profile:read"));
    assert!(!hierarchy.has_role(&u, "guest"));
}

#[test]
fn role_names_are_case_insensitive() {
    let hierarchy = RoleHierarchy::default();
    let u = user(&["Admin"]);
    assert!(hierarchy.has_role(&u, "ADMIN"));
    assert!(hierarchy.has_permission(&u, "users:delete"));
    assert_eq!(hierarchy.level_of("MODERATOR"), Some(3));
}

#[test]
fn multiple_roles_union_their_grants() {
    let hierarchy = RoleHierarchy::new(vec![
        RoleDef::new("billing", 1, &["invoices:*"]),
        RoleDef::new("support", 2, &["tickets:*"]),
    ]);
    let u = user(&["billing", "support"]);
    assert!(hierarchy.has_permission(&u, "invoices:read"));
    assert!(hierarchy.has_permission(&u, "tickets:close"));
}

#[test]
fn access_role_gate_fails_fast() {
    let hierarchy = RoleHierarchy::default();
    let u = user(&["user"]);
    // Permission alone would pass, but the role gate is hard.
    let check = AccessCheck::any_of(&["profile:read"]).with_role("admin");
    assert!(!hierarchy.has_access(&u, &check));
}

#[test]
fn access_honors_all_vs_any() {
    let hierarchy = RoleHierarchy::default();
    let u = user(&["moderator"]);
    assert!(hierarchy.has_access(&u, &AccessCheck::any_of(&["users:delete", "users:read"])));
    assert!(!hierarchy.has_access(&u, &AccessCheck::all_of(&["users:delete", "users:read"])));
    assert!(hierarchy.has_access(&u, &AccessCheck::all_of(&["content:edit", "users:read"])));
}

#[test]
fn role_only_check_passes_with_empty_permission_list() {
    let hierarchy = RoleHierarchy::default();
    assert!(hierarchy.has_access(&user(&["moderator"]), &AccessCheck::role("user")));
    assert!(!hierarchy.has_access(&user(&["guest"]), &AccessCheck::role("user")));
}
