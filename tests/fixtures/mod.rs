use std::collections::BTreeMap;
use std::sync::Arc;

use warden::prelude::*;
use warden::taxonomy::{PermissionDef, PermissionTaxonomy};

/// Event-style taxonomy used across the suite:
///
/// ```text
/// manage ── edit ── read
///       └── delete
/// register
/// ```
///
/// with `read` as the default permission.
pub fn event_taxonomy() -> PermissionTaxonomy {
    let manage = PermissionDef::new("Manage", "Full management rights")
        .with_child(
            "edit",
            PermissionDef::new("Edit", "Modify content")
                .with_child("read", PermissionDef::new("Read", "View content")),
        )
        .with_child("delete", PermissionDef::new("Delete", "Remove content"));
    let mut tree = BTreeMap::new();
    tree.insert("manage".to_string(), manage);
    tree.insert(
        "register".to_string(),
        PermissionDef::new("Register", "Sign up participants"),
    );
    PermissionTaxonomy::new(tree, "read")
}

pub fn event_index() -> Arc<PermissionIndex> {
    Arc::new(PermissionIndex::build(&event_taxonomy()).expect("taxonomy builds"))
}

/// Mock source preloaded with a user, a local group, and a multipass group.
pub fn populated_source() -> Arc<MockPrincipalSource> {
    Arc::new(
        MockPrincipalSource::new()
            .with_record(
                PrincipalInfo::new("User:1", "Bob", PrincipalType::User)
                    .with_detail("bob@example.test"),
            )
            .with_record(PrincipalInfo::new(
                "Group::2",
                "Admins",
                PrincipalType::LocalGroup,
            ))
            .with_record(PrincipalInfo::new(
                "Group:ldap-editors",
                "LDAP Editors",
                PrincipalType::MultipassGroup,
            )),
    )
}

pub fn principal(raw: &str) -> PrincipalIdentifier {
    PrincipalIdentifier::parse(raw).expect("well-formed identifier")
}
