//! ACL entries and the permission-set algebra.
//!
//! Granting a coarser permission makes everything it implies redundant, so
//! implied permissions are dropped to keep the stored set minimal. An entry
//! with zero permissions is not a representable state: the configured
//! default permission is substituted whenever a mutation would empty a set.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{AclError, AclResult};
use crate::principal::PrincipalIdentifier;
use crate::taxonomy::PermissionIndex;

/// One ACL entry: a principal bound to a non-empty set of permission ids.
///
/// Permission sets are true sets, so re-granting a permission that is
/// already present cannot introduce a duplicate.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct AclEntry {
    pub principal: PrincipalIdentifier,
    pub permissions: BTreeSet<String>,
}

impl AclEntry {
    /// Creates an entry holding exactly the index's default permission.
    pub fn with_default(principal: PrincipalIdentifier, index: &PermissionIndex) -> Self {
        let mut permissions = BTreeSet::new();
        permissions.insert(index.default_permission().to_string());
        Self {
            principal,
            permissions,
        }
    }
}

/// Pure permission-set mutation: returns a new entry, never mutates.
///
/// With `add=true` the new set is `(permissions \ descendants(id)) ∪ {id}`;
/// with `add=false` it is `permissions \ {id}`. An empty result is replaced
/// by the index's default permission.
pub fn set_permission(
    index: &PermissionIndex,
    entry: &AclEntry,
    permission_id: &str,
    add: bool,
) -> AclResult<AclEntry> {
    if !index.contains(permission_id) {
        return Err(AclError::UnknownPermission(permission_id.to_string()));
    }
    let mut permissions = entry.permissions.clone();
    if add {
        let implied = index.descendants(permission_id);
        permissions.retain(|id| !implied.contains(id));
        permissions.insert(permission_id.to_string());
    } else {
        permissions.remove(permission_id);
    }
    if permissions.is_empty() {
        permissions.insert(index.default_permission().to_string());
    }
    Ok(AclEntry {
        principal: entry.principal.clone(),
        permissions,
    })
}

/// An access-control list keyed by raw principal identifier.
///
/// Serializes as `map<identifier, set<permission-id>>`, the same shape the
/// backing store exchanges with its clients.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Acl {
    entries: BTreeMap<PrincipalIdentifier, BTreeSet<String>>,
}

impl Acl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn contains(&self, identifier: &PrincipalIdentifier) -> bool {
        self.entries.contains_key(identifier)
    }

    pub fn permissions(&self, identifier: &PrincipalIdentifier) -> Option<&BTreeSet<String>> {
        self.entries.get(identifier)
    }

    pub fn entry(&self, identifier: &PrincipalIdentifier) -> Option<AclEntry> {
        self.entries.get(identifier).map(|permissions| AclEntry {
            principal: identifier.clone(),
            permissions: permissions.clone(),
        })
    }

    /// Iterates entries in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (&PrincipalIdentifier, &BTreeSet<String>)> {
        self.entries.iter()
    }

    pub fn principals(&self) -> Vec<PrincipalIdentifier> {
        self.entries.keys().cloned().collect()
    }

    /// Adds a principal with the default permission. Returns `false` when
    /// the principal is already present; the existing entry is kept as-is
    /// so callers can report the duplicate.
    pub fn grant(&mut self, principal: PrincipalIdentifier, index: &PermissionIndex) -> bool {
        if self.entries.contains_key(&principal) {
            return false;
        }
        let entry = AclEntry::with_default(principal, index);
        self.entries.insert(entry.principal, entry.permissions);
        true
    }

    /// Removes the whole entry for `identifier`, if present.
    pub fn revoke(&mut self, identifier: &PrincipalIdentifier) -> bool {
        self.entries.remove(identifier).is_some()
    }

    /// Adds or removes a single permission on an existing entry, writing
    /// the mutated entry back under the same identifier.
    pub fn set_permission(
        &mut self,
        identifier: &PrincipalIdentifier,
        permission_id: &str,
        add: bool,
        index: &PermissionIndex,
    ) -> AclResult<()> {
        let Some(entry) = self.entry(identifier) else {
            // Granting a permission to an absent principal creates the
            // entry; removing from one is a no-op.
            if add {
                let seed = AclEntry::with_default(identifier.clone(), index);
                let updated = set_permission(index, &seed, permission_id, true)?;
                self.entries.insert(updated.principal, updated.permissions);
            }
            return Ok(());
        };
        let updated = set_permission(index, &entry, permission_id, add)?;
        self.entries.insert(updated.principal, updated.permissions);
        Ok(())
    }

    /// Replaces an entry's permission set wholesale. An empty set removes
    /// the entry entirely; this is the delete path of the editing surface,
    /// distinct from `set_permission` which substitutes the default.
    pub fn replace_permissions(
        &mut self,
        identifier: &PrincipalIdentifier,
        permissions: BTreeSet<String>,
        index: &PermissionIndex,
    ) -> AclResult<()> {
        if permissions.is_empty() {
            self.entries.remove(identifier);
            return Ok(());
        }
        for id in &permissions {
            if !index.contains(id) {
                return Err(AclError::UnknownPermission(id.clone()));
            }
        }
        self.entries.insert(identifier.clone(), permissions);
        Ok(())
    }
}

impl FromIterator<(PrincipalIdentifier, BTreeSet<String>)> for Acl {
    fn from_iter<T: IntoIterator<Item = (PrincipalIdentifier, BTreeSet<String>)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
