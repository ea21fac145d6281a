use std::collections::BTreeSet;

use warden::prelude::*;

use crate::fixtures::{event_index, principal};

fn entry(raw: &str, ids: &[&str]) -> AclEntry {
    AclEntry {
        principal: principal(raw),
        permissions: ids.iter().map(|id| id.to_string()).collect(),
    }
}

fn perms(ids: &[&str]) -> BTreeSet<String> {
    ids.iter().map(|id| id.to_string()).collect()
}

#[test]
fn granting_removes_the_full_descendant_closure() {
    let index = event_index();
    // "manage" implies edit, read, and delete across two levels.
    let start = entry("User:1", &["read", "delete", "register"]);
    let updated = set_permission(&index, &start, "manage", true).expect("grant");
    assert_eq!(updated.permissions, perms(&["manage", "register"]));
}

#[test]
fn granted_permission_is_present_exactly_once() {
    let index = event_index();
    let start = entry("User:1", &["manage"]);
    let updated = set_permission(&index, &start, "manage", true).expect("grant");
    assert_eq!(updated.permissions.len(), 1);
    assert!(updated.permissions.contains("manage"));
}

#[test]
fn no_mutation_sequence_produces_an_empty_set() {
    let index = event_index();
    let mut current = entry("User:1", &["read"]);
    let script: &[(&str, bool)] = &[
        ("manage", true),
        ("manage", false),
        ("read", false),
        ("register", true),
        ("register", false),
        ("edit", true),
        ("edit", false),
    ];
    for (permission, add) in script {
        current = set_permission(&index, &current, permission, *add).expect("mutate");
        assert!(
            !current.permissions.is_empty(),
            "empty set after ({permission}, {add})"
        );
    }
    // The last removal fell back to the default permission.
    assert_eq!(current.permissions, perms(&["read"]));
}

#[test]
fn removing_a_permission_never_touches_others() {
    let index = event_index();
    let start = entry("User:1", &["edit", "register"]);
    let updated = set_permission(&index, &start, "edit", false).expect("remove");
    assert_eq!(updated.permissions, perms(&["register"]));
}

#[test]
fn intermediate_grant_collapses_only_its_own_subtree() {
    let index = event_index();
    let start = entry("User:1", &["read", "delete"]);
    let updated = set_permission(&index, &start, "edit", true).expect("grant");
    // "edit" implies "read" but not "delete".
    assert_eq!(updated.permissions, perms(&["delete", "edit"]));
}

#[test]
fn unknown_permission_id_is_rejected() {
    let index = event_index();
    let start = entry("User:1", &["read"]);
    assert_eq!(
        set_permission(&index, &start, "moderate", true),
        Err(AclError::UnknownPermission("moderate".to_string()))
    );
}
