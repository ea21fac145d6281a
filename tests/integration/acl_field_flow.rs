use std::collections::BTreeSet;

use futures::executor::block_on;
use warden::prelude::*;

use crate::fixtures::{event_index, populated_source, principal};

#[test]
fn grant_edit_and_render_one_session() {
    let source = populated_source();
    let mut field = AclField::new(event_index(), Resolver::new(source.clone()));

    field.grant(principal("User:1"));
    field.grant(principal("Group::2"));
    field
        .set_permission(&principal("Group::2"), "manage", true)
        .expect("set manage");

    let view = block_on(field.view());
    assert_eq!(view.rows.len(), 2);
    assert!(view.fetch_error.is_none());

    // Groups sort before users regardless of insertion order.
    let names: Vec<String> = view
        .rows
        .iter()
        .filter_map(|row| match row {
            AclRow::Resolved { info, .. } => Some(info.name.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(names, ["Admins", "Bob"]);

    // One batched request covered both identifiers.
    assert_eq!(source.calls().len(), 1);
    let mut batch = source.calls()[0].clone();
    batch.sort();
    assert_eq!(batch, ["Group::2", "User:1"]);
}

#[test]
fn resolved_and_pending_partition_matches_the_cache() {
    let source = populated_source();
    let mut field = AclField::new(event_index(), Resolver::new(source));

    field.grant(principal("User:1"));
    field.grant(principal("Group::2"));
    field.grant(principal("User:3"));

    let view = block_on(field.view());
    assert_eq!(view.resolved_count(), 2);
    assert_eq!(view.pending_count(), 1);

    match &view.rows[2] {
        AclRow::Pending {
            principal: pending,
            placeholder,
            permissions,
        } => {
            assert_eq!(pending.as_str(), "User:3");
            assert_eq!(*placeholder, "Unknown user");
            // Pending rows still show what the entry authorizes.
            assert_eq!(permissions.len(), 1);
            assert_eq!(permissions[0].id, "read");
        }
        other => panic!("expected pending row, got {other:?}"),
    }
}

#[test]
fn revoking_a_principal_drops_its_row() {
    let source = populated_source();
    let mut field = AclField::new(event_index(), Resolver::new(source));

    field.grant(principal("User:1"));
    field.grant(principal("Group::2"));
    assert!(field.revoke(&principal("User:1")));

    let view = block_on(field.view());
    assert_eq!(view.rows.len(), 1);
    match &view.rows[0] {
        AclRow::Resolved { info, .. } => assert_eq!(info.identifier, "Group::2"),
        other => panic!("expected resolved row, got {other:?}"),
    }
}

#[test]
fn replace_permissions_with_empty_set_removes_the_entry() {
    let source = populated_source();
    let mut field = AclField::new(event_index(), Resolver::new(source));

    field.grant(principal("User:1"));
    field
        .replace_permissions(&principal("User:1"), BTreeSet::new())
        .expect("replace");

    assert!(field.acl().is_empty());
    let view = block_on(field.view());
    assert!(view.rows.is_empty());
}

#[test]
fn acl_round_trips_through_the_wire_format() {
    let source = populated_source();
    let mut field = AclField::new(event_index(), Resolver::new(source));
    field.grant(principal("User:1"));
    field
        .set_permission(&principal("User:1"), "edit", true)
        .expect("set edit");

    let json = serde_json::to_value(field.acl()).expect("serialize");
    assert_eq!(json, serde_json::json!({"User:1": ["edit"]}));

    let restored: Acl = serde_json::from_value(json).expect("deserialize");
    assert_eq!(&restored, field.acl());
}

#[test]
fn multipass_and_local_groups_share_the_top_slot_sorted_by_name() {
    let source = populated_source();
    let mut field = AclField::new(event_index(), Resolver::new(source));

    field.grant(principal("Group:ldap-editors"));
    field.grant(principal("Group::2"));
    field.grant(principal("User:1"));

    let view = block_on(field.view());
    let names: Vec<String> = view
        .rows
        .iter()
        .filter_map(|row| match row {
            AclRow::Resolved { info, .. } => Some(info.name.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(names, ["Admins", "LDAP Editors", "Bob"]);
}
