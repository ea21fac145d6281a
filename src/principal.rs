//! Principal identifiers and their classification.
//!
//! Identifiers are opaque strings carrying a structural prefix that encodes
//! the principal type. Parsing happens once, at the ingestion boundary; the
//! rest of the crate works with the tagged form.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AclError, AclResult};

/// The kind of subject an identifier addresses.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrincipalType {
    User,
    LocalGroup,
    MultipassGroup,
    EventRole,
    CategoryRole,
    RegistrationForm,
    Email,
    EventPerson,
}

impl PrincipalType {
    /// Fixed total order used as the primary sort key wherever principals
    /// are listed. Local and multipass groups share the top slot.
    pub fn sort_priority(self) -> u8 {
        match self {
            PrincipalType::LocalGroup | PrincipalType::MultipassGroup => 0,
            PrincipalType::EventRole => 1,
            PrincipalType::CategoryRole => 2,
            PrincipalType::RegistrationForm => 3,
            PrincipalType::User => 4,
            PrincipalType::Email => 5,
            PrincipalType::EventPerson => 6,
        }
    }

    /// Loading-placeholder label shown while an identifier of this type is
    /// still unresolved.
    pub fn placeholder_label(self) -> &'static str {
        match self {
            PrincipalType::User => "Unknown user",
            PrincipalType::LocalGroup | PrincipalType::MultipassGroup => "Unknown group",
            PrincipalType::EventRole => "Unknown event role",
            PrincipalType::CategoryRole => "Unknown category role",
            PrincipalType::RegistrationForm => "Unknown registration form",
            PrincipalType::Email => "Unknown email",
            PrincipalType::EventPerson => "Unknown person",
        }
    }
}

impl fmt::Display for PrincipalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PrincipalType::User => "user",
            PrincipalType::LocalGroup => "local_group",
            PrincipalType::MultipassGroup => "multipass_group",
            PrincipalType::EventRole => "event_role",
            PrincipalType::CategoryRole => "category_role",
            PrincipalType::RegistrationForm => "registration_form",
            PrincipalType::Email => "email",
            PrincipalType::EventPerson => "event_person",
        };
        f.write_str(name)
    }
}

/// A principal identifier parsed into its tagged form.
///
/// The raw string (prefix included) stays the stable ACL key; the tag is
/// derived from it exactly once, here.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PrincipalIdentifier {
    raw: String,
    kind: PrincipalType,
}

// Prefix checks ordered most specific first: `Group:` is a textual prefix
// of `Group::`, so the double-colon form must be tested before it.
const PREFIX_GRAMMAR: &[(&str, PrincipalType)] = &[
    ("User:", PrincipalType::User),
    ("ExternalUser:", PrincipalType::User),
    ("Group::", PrincipalType::LocalGroup),
    ("Group:", PrincipalType::MultipassGroup),
    ("EventRole:", PrincipalType::EventRole),
    ("CategoryRole:", PrincipalType::CategoryRole),
    ("RegistrationForm:", PrincipalType::RegistrationForm),
    ("Email:", PrincipalType::Email),
    ("EventPerson:", PrincipalType::EventPerson),
];

impl PrincipalIdentifier {
    /// Parses a raw identifier, classifying it by structural prefix.
    pub fn parse(raw: impl Into<String>) -> AclResult<Self> {
        let raw = raw.into();
        let kind = classify(&raw)?;
        Ok(Self { raw, kind })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn kind(&self) -> PrincipalType {
        self.kind
    }

    pub fn into_string(self) -> String {
        self.raw
    }

    /// Sort key: type priority first, then the raw identifier
    /// case-insensitively.
    pub fn sort_key(&self) -> (u8, String) {
        (self.kind.sort_priority(), self.raw.to_lowercase())
    }
}

/// Maps a raw identifier to its principal type by structural prefix.
pub fn classify(raw: &str) -> AclResult<PrincipalType> {
    for (prefix, kind) in PREFIX_GRAMMAR {
        if raw.starts_with(prefix) {
            return Ok(*kind);
        }
    }
    Err(AclError::UnknownIdentifierType(raw.to_string()))
}

impl Ord for PrincipalIdentifier {
    fn cmp(&self, other: &Self) -> Ordering {
        // Exact-raw tiebreak keeps the ordering consistent with Eq when two
        // identifiers differ only by case.
        self.sort_key()
            .cmp(&other.sort_key())
            .then_with(|| self.raw.cmp(&other.raw))
    }
}

impl PartialOrd for PrincipalIdentifier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for PrincipalIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl TryFrom<String> for PrincipalIdentifier {
    type Error = AclError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(raw)
    }
}

impl From<PrincipalIdentifier> for String {
    fn from(identifier: PrincipalIdentifier) -> Self {
        identifier.raw
    }
}
