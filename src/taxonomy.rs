//! Permission taxonomy and the flat index derived from it.
//!
//! The taxonomy is an externally supplied forest of permission definitions
//! where a coarser permission implies everything below it. It is loaded once
//! per session; the index built from it is read-only afterwards.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{AclError, AclResult};

/// One node of the permission tree.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PermissionDef {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub children: BTreeMap<String, PermissionDef>,
}

impl PermissionDef {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            children: BTreeMap::new(),
        }
    }

    pub fn with_child(mut self, id: impl Into<String>, child: PermissionDef) -> Self {
        self.children.insert(id.into(), child);
        self
    }
}

/// The full permission metadata supplied by configuration: a forest of
/// definitions plus the designated default permission id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PermissionTaxonomy {
    pub tree: BTreeMap<String, PermissionDef>,
    pub default_permission: String,
}

impl PermissionTaxonomy {
    pub fn new(
        tree: BTreeMap<String, PermissionDef>,
        default_permission: impl Into<String>,
    ) -> Self {
        Self {
            tree,
            default_permission: default_permission.into(),
        }
    }
}

/// Display metadata for a single permission, flattened out of the tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PermissionLabel {
    pub id: String,
    pub title: String,
    pub description: String,
}

/// Flat adjacency index over the taxonomy.
///
/// Every permission id at any depth is a top-level key, mapped to its
/// direct children only. Descendant closures are precomputed at build time
/// so permission-set mutations never walk the tree.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PermissionIndex {
    children: HashMap<String, Vec<String>>,
    descendants: HashMap<String, BTreeSet<String>>,
    labels: HashMap<String, PermissionLabel>,
    default_permission: String,
}

impl PermissionIndex {
    /// Builds the index from a taxonomy, failing fast on duplicate ids,
    /// cycles, or an unknown default permission.
    pub fn build(taxonomy: &PermissionTaxonomy) -> AclResult<Self> {
        let mut index = Self {
            children: HashMap::new(),
            descendants: HashMap::new(),
            labels: HashMap::new(),
            default_permission: taxonomy.default_permission.clone(),
        };
        for (id, def) in &taxonomy.tree {
            index.insert_subtree(id, def)?;
        }
        let ids: Vec<String> = index.children.keys().cloned().collect();
        for id in ids {
            let mut path = HashSet::new();
            let closure = index.closure_of(&id, &mut path)?;
            index.descendants.insert(id, closure);
        }
        if !index.children.contains_key(&taxonomy.default_permission) {
            return Err(AclError::UnknownPermission(
                taxonomy.default_permission.clone(),
            ));
        }
        Ok(index)
    }

    fn insert_subtree(&mut self, id: &str, def: &PermissionDef) -> AclResult<()> {
        if self.children.contains_key(id) {
            return Err(AclError::DuplicatePermissionId(id.to_string()));
        }
        self.children
            .insert(id.to_string(), def.children.keys().cloned().collect());
        self.labels.insert(
            id.to_string(),
            PermissionLabel {
                id: id.to_string(),
                title: def.title.clone(),
                description: def.description.clone(),
            },
        );
        for (child_id, child) in &def.children {
            self.insert_subtree(child_id, child)?;
        }
        Ok(())
    }

    fn closure_of(&self, id: &str, path: &mut HashSet<String>) -> AclResult<BTreeSet<String>> {
        if let Some(cached) = self.descendants.get(id) {
            return Ok(cached.clone());
        }
        if !path.insert(id.to_string()) {
            return Err(AclError::CyclicTaxonomy(id.to_string()));
        }
        let mut closure = BTreeSet::new();
        if let Some(children) = self.children.get(id) {
            for child in children {
                closure.insert(child.clone());
                closure.extend(self.closure_of(child, path)?);
            }
        }
        path.remove(id);
        Ok(closure)
    }

    /// The default permission id, substituted whenever a mutation would
    /// leave an ACL entry empty.
    pub fn default_permission(&self) -> &str {
        &self.default_permission
    }

    pub fn contains(&self, id: &str) -> bool {
        self.children.contains_key(id)
    }

    /// Direct children of `id`; empty for leaves and unknown ids.
    pub fn children(&self, id: &str) -> &[String] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Full descendant closure of `id`; empty for leaves and unknown ids.
    pub fn descendants(&self, id: &str) -> BTreeSet<String> {
        self.descendants.get(id).cloned().unwrap_or_default()
    }

    /// Display metadata for `id`, if it exists in the taxonomy.
    pub fn label(&self, id: &str) -> Option<&PermissionLabel> {
        self.labels.get(id)
    }

    /// All known permission ids, in sorted order.
    pub fn permission_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.children.keys().cloned().collect();
        ids.sort();
        ids
    }
}
