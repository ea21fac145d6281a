use warden::prelude::*;

#[test]
fn common_identifier_forms_classify_correctly() {
    assert_eq!(classify("User:42"), Ok(PrincipalType::User));
    assert_eq!(classify("Group::5"), Ok(PrincipalType::LocalGroup));
    assert_eq!(
        classify("Group:ldap-admins"),
        Ok(PrincipalType::MultipassGroup)
    );
    assert_eq!(classify("EventRole:3"), Ok(PrincipalType::EventRole));
    assert_eq!(
        classify("Foo:1"),
        Err(AclError::UnknownIdentifierType("Foo:1".to_string()))
    );
}

#[test]
fn classification_is_total_over_the_prefix_grammar() {
    let well_formed = [
        "User:1",
        "ExternalUser:alice@example.test",
        "Group::10",
        "Group:staff",
        "EventRole:2",
        "CategoryRole:4",
        "RegistrationForm:8",
        "Email:carol@example.test",
        "EventPerson:16",
    ];
    for raw in well_formed {
        assert!(classify(raw).is_ok(), "identifier {raw}");
        assert!(PrincipalIdentifier::parse(raw).is_ok(), "identifier {raw}");
    }

    let malformed = ["", "user:1", "Groups:1", "Role:1", "User", ":User:1"];
    for raw in malformed {
        assert_eq!(
            classify(raw),
            Err(AclError::UnknownIdentifierType(raw.to_string())),
            "identifier {raw:?}"
        );
    }
}

#[test]
fn parsed_identifier_keeps_the_raw_string_as_key() {
    let id = PrincipalIdentifier::parse("ExternalUser:alice@example.test").expect("parse");
    assert_eq!(id.as_str(), "ExternalUser:alice@example.test");
    assert_eq!(id.kind(), PrincipalType::User);
}

#[test]
fn sort_priority_total_order_matches_the_display_contract() {
    assert_eq!(PrincipalType::LocalGroup.sort_priority(), 0);
    assert_eq!(PrincipalType::MultipassGroup.sort_priority(), 0);
    assert_eq!(PrincipalType::EventRole.sort_priority(), 1);
    assert_eq!(PrincipalType::CategoryRole.sort_priority(), 2);
    assert_eq!(PrincipalType::RegistrationForm.sort_priority(), 3);
    assert_eq!(PrincipalType::User.sort_priority(), 4);
    assert_eq!(PrincipalType::Email.sort_priority(), 5);
    assert_eq!(PrincipalType::EventPerson.sort_priority(), 6);
}

#[test]
fn placeholder_labels_are_keyed_by_type() {
    assert_eq!(PrincipalType::User.placeholder_label(), "Unknown user");
    assert_eq!(PrincipalType::LocalGroup.placeholder_label(), "Unknown group");
    assert_eq!(
        PrincipalType::MultipassGroup.placeholder_label(),
        "Unknown group"
    );
    assert_eq!(
        PrincipalType::RegistrationForm.placeholder_label(),
        "Unknown registration form"
    );
}
