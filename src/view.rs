//! Display composition: resolved, pending, and malformed ACL rows.
//!
//! `AclField` ties one ACL to a permission index and a resolution scope,
//! the way an editing widget owns one list for its lifetime. Rendering
//! resolves the ACL's identifiers and emits a partitioned, ordered list.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::acl::Acl;
use crate::error::{AclError, AclResult};
use crate::principal::PrincipalIdentifier;
use crate::resolve::{BoxFuture, PrincipalInfo, Resolver};
use crate::taxonomy::{PermissionIndex, PermissionLabel};

/// One row of the rendered ACL.
#[derive(Clone, Debug, PartialEq)]
pub enum AclRow {
    /// Principal resolved to display metadata. Not actionable when the
    /// backing entity no longer exists (`info.invalid`).
    Resolved {
        info: PrincipalInfo,
        permissions: Vec<PermissionLabel>,
        actionable: bool,
    },
    /// Principal awaiting resolution; shown as a typed loading placeholder.
    Pending {
        principal: PrincipalIdentifier,
        placeholder: &'static str,
        permissions: Vec<PermissionLabel>,
    },
    /// Identifier outside the known prefix grammar, isolated so one bad
    /// entry never aborts the whole render.
    Malformed { identifier: String, message: String },
}

/// Rendered ACL: resolved rows first, then pending, then malformed.
#[derive(Clone, Debug, Default)]
pub struct AclView {
    pub rows: Vec<AclRow>,
    /// Recoverable fetch failure from the underlying resolution, surfaced
    /// so callers can show a non-fatal warning and re-render later.
    pub fetch_error: Option<AclError>,
}

impl AclView {
    pub fn resolved_count(&self) -> usize {
        self.rows
            .iter()
            .filter(|row| matches!(row, AclRow::Resolved { .. }))
            .count()
    }

    pub fn pending_count(&self) -> usize {
        self.rows
            .iter()
            .filter(|row| matches!(row, AclRow::Pending { .. }))
            .count()
    }
}

/// One ACL editing session: the list, its permission index, and a scoped
/// resolver. The resolver's cache lives exactly as long as the field.
pub struct AclField {
    acl: Acl,
    index: Arc<PermissionIndex>,
    resolver: Resolver,
    malformed: Vec<AclRow>,
}

impl AclField {
    pub fn new(index: Arc<PermissionIndex>, resolver: Resolver) -> Self {
        Self {
            acl: Acl::new(),
            index,
            resolver,
            malformed: Vec::new(),
        }
    }

    pub fn with_acl(mut self, acl: Acl) -> Self {
        self.acl = acl;
        self
    }

    /// Replaces the current list with a raw `identifier -> permission set`
    /// payload, as exchanged with the backing store. Identifiers outside
    /// the prefix grammar are kept aside as malformed rows instead of
    /// failing the whole load; unknown permission ids are structural errors
    /// and do fail, leaving the field empty.
    pub fn load_raw_entries(
        &mut self,
        entries: BTreeMap<String, BTreeSet<String>>,
    ) -> AclResult<()> {
        self.acl = Acl::new();
        let keys: Vec<String> = entries.keys().cloned().collect();
        let (parsed, malformed) = screen_identifiers(&keys);
        for identifier in parsed {
            let permissions = entries[identifier.as_str()].clone();
            self.acl.replace_permissions(&identifier, permissions, &self.index)?;
        }
        self.malformed = malformed;
        Ok(())
    }

    pub fn acl(&self) -> &Acl {
        &self.acl
    }

    pub fn index(&self) -> &PermissionIndex {
        &self.index
    }

    /// Adds a principal with the default permission; `false` when already
    /// present.
    pub fn grant(&mut self, principal: PrincipalIdentifier) -> bool {
        self.acl.grant(principal, &self.index)
    }

    /// Removes the whole entry for a principal.
    pub fn revoke(&mut self, identifier: &PrincipalIdentifier) -> bool {
        self.acl.revoke(identifier)
    }

    /// Adds or removes one permission on a principal's entry. Rejected for
    /// a principal known to be invalid.
    pub fn set_permission(
        &mut self,
        identifier: &PrincipalIdentifier,
        permission_id: &str,
        add: bool,
    ) -> AclResult<()> {
        self.ensure_actionable(identifier)?;
        self.acl
            .set_permission(identifier, permission_id, add, &self.index)
    }

    /// Replaces a principal's permission set; empty removes the entry.
    /// Rejected for a principal known to be invalid, except the empty case,
    /// which shares the cleanup path with `revoke`.
    pub fn replace_permissions(
        &mut self,
        identifier: &PrincipalIdentifier,
        permissions: BTreeSet<String>,
    ) -> AclResult<()> {
        if !permissions.is_empty() {
            self.ensure_actionable(identifier)?;
        }
        self.acl
            .replace_permissions(identifier, permissions, &self.index)
    }

    /// A principal that resolved but whose backing entity no longer exists
    /// renders for context only; its permissions cannot be changed. Removal
    /// stays allowed so the stale entry can be cleaned up.
    fn ensure_actionable(&self, identifier: &PrincipalIdentifier) -> AclResult<()> {
        match self.resolver.cache().get(identifier.as_str()) {
            Some(info) if info.invalid => Err(AclError::InvalidPrincipal(
                identifier.as_str().to_string(),
            )),
            _ => Ok(()),
        }
    }

    /// Resolves the ACL's principals and produces the ordered display list.
    pub fn view(&mut self) -> BoxFuture<'_, AclView> {
        Box::pin(async move {
            let principals = self.acl.principals();
            let resolution = self.resolver.resolve(&principals).await;

            let mut rows = Vec::with_capacity(principals.len());
            for info in resolution.resolved {
                let permissions = self.permission_labels(info.identifier.as_str());
                let actionable = !info.invalid;
                rows.push(AclRow::Resolved {
                    info,
                    permissions,
                    actionable,
                });
            }
            for principal in resolution.pending {
                let permissions = self.permission_labels(principal.as_str());
                rows.push(AclRow::Pending {
                    placeholder: principal.kind().placeholder_label(),
                    principal,
                    permissions,
                });
            }
            rows.extend(self.malformed.iter().cloned());
            AclView {
                rows,
                fetch_error: resolution.fetch_error,
            }
        })
    }

    fn permission_labels(&self, identifier: &str) -> Vec<PermissionLabel> {
        let Ok(parsed) = PrincipalIdentifier::parse(identifier) else {
            return Vec::new();
        };
        let Some(permissions) = self.acl.permissions(&parsed) else {
            return Vec::new();
        };
        permissions
            .iter()
            .map(|id| {
                self.index.label(id).cloned().unwrap_or(PermissionLabel {
                    id: id.clone(),
                    title: id.clone(),
                    description: String::new(),
                })
            })
            .collect()
    }
}

/// Screens raw ACL keys that may include malformed identifiers.
///
/// Well-formed identifiers are returned for normal resolution; malformed
/// ones become isolated `Malformed` rows.
pub fn screen_identifiers(raw_keys: &[String]) -> (Vec<PrincipalIdentifier>, Vec<AclRow>) {
    let mut parsed = Vec::new();
    let mut malformed = Vec::new();
    for raw in raw_keys {
        match PrincipalIdentifier::parse(raw.clone()) {
            Ok(identifier) => parsed.push(identifier),
            Err(err) => malformed.push(AclRow::Malformed {
                identifier: raw.clone(),
                message: err.to_string(),
            }),
        }
    }
    malformed.sort_by(|a, b| match (a, b) {
        (
            AclRow::Malformed { identifier: a, .. },
            AclRow::Malformed { identifier: b, .. },
        ) => a.cmp(b),
        _ => std::cmp::Ordering::Equal,
    });
    (parsed, malformed)
}
