//! Warden ACL Core
//!
//! A Rust library for managing access-control lists bound to a hierarchical
//! permission taxonomy, and for resolving opaque principal identifiers into
//! displayable records.
//!
//! ## Features
//!
//! - **Permission taxonomy**: a tree of permission definitions flattened
//!   into an index with precomputed descendant closures
//! - **Implication algebra**: granting a coarser permission drops everything
//!   it implies; an entry's permission set is never empty
//! - **Principal classification**: opaque identifiers parsed once into a
//!   tagged type with a fixed display ordering
//! - **Batched resolution**: a scoped, additive cache that fetches only
//!   unknown identifiers, one request per resolve call
//! - **View composition**: resolved, pending, and malformed rows in a
//!   stable, partitioned order
//!
//! # Example
//! ```rust,no_run
//! use std::collections::BTreeMap;
//! use std::sync::Arc;
//!
//! use warden::prelude::*;
//! use warden::taxonomy::{PermissionDef, PermissionTaxonomy};
//!
//! # fn run() -> Result<(), AclError> {
//! let manage = PermissionDef::new("Manage", "Full management rights")
//!     .with_child("read", PermissionDef::new("Read", "View content"));
//! let mut tree = BTreeMap::new();
//! tree.insert("manage".to_string(), manage);
//! let taxonomy = PermissionTaxonomy::new(tree, "read");
//! let index = Arc::new(PermissionIndex::build(&taxonomy)?);
//!
//! let source = Arc::new(MockPrincipalSource::new());
//! let mut field = AclField::new(index, Resolver::new(source));
//! field.grant(PrincipalIdentifier::parse("User:42")?);
//! field.set_permission(&PrincipalIdentifier::parse("User:42")?, "manage", true)?;
//! # Ok(())
//! # }
//! ```

// Core modules
pub mod error;
pub mod cancel;
pub mod taxonomy;
pub mod principal;
pub mod acl;
pub mod resolve;
pub mod provider;
pub mod view;

/// Prelude - commonly used types
pub mod prelude {
    pub use crate::acl::{set_permission, Acl, AclEntry};
    pub use crate::cancel::CancellationToken;
    pub use crate::error::{AclError, AclResult};
    pub use crate::principal::{classify, PrincipalIdentifier, PrincipalType};
    pub use crate::provider::http::{HttpPrincipalSource, HttpPrincipalSourceConfig};
    pub use crate::resolve::{
        BoxFuture,
        MockPrincipalSource,
        PrincipalInfo,
        PrincipalSource,
        Resolution,
        ResolutionCache,
        Resolver,
    };
    pub use crate::taxonomy::{
        PermissionDef,
        PermissionIndex,
        PermissionLabel,
        PermissionTaxonomy,
    };
    pub use crate::view::{screen_identifiers, AclField, AclRow, AclView};
}
