//! Error types for ACL and resolution operations.

use std::fmt;

/// Result alias used throughout the crate.
pub type AclResult<T> = Result<T, AclError>;

/// Errors raised by the permission engine, identifier parsing, and the
/// principal resolution pipeline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AclError {
    /// A permission id appears more than once in the supplied taxonomy.
    DuplicatePermissionId(String),
    /// The taxonomy contains a cycle reachable from the named id.
    CyclicTaxonomy(String),
    /// A permission id is not present in the taxonomy index.
    UnknownPermission(String),
    /// A principal identifier does not match any known prefix grammar.
    UnknownIdentifierType(String),
    /// An edit referenced a principal whose backing entity no longer
    /// exists. Such entries stay displayable but reject mutation.
    InvalidPrincipal(String),
    /// The batched principal fetch failed (network or server error).
    FetchFailed { endpoint: String, message: String },
    /// The batched principal fetch was cancelled.
    Aborted { reason: String },
    /// A principal source was constructed with invalid configuration.
    MissingConfig(String),
}

impl AclError {
    /// Whether the failure is recoverable by retrying later.
    ///
    /// Resolution failures leave identifiers pending and are retried on the
    /// next resolve call; structural and classification failures indicate
    /// malformed input and are never retried.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AclError::FetchFailed { .. } | AclError::Aborted { .. }
        )
    }
}

impl fmt::Display for AclError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AclError::DuplicatePermissionId(id) => {
                write!(f, "duplicate permission id in taxonomy: {id}")
            }
            AclError::CyclicTaxonomy(id) => {
                write!(f, "taxonomy contains a cycle through permission: {id}")
            }
            AclError::UnknownPermission(id) => write!(f, "unknown permission id: {id}"),
            AclError::UnknownIdentifierType(raw) => {
                write!(f, "unrecognized principal identifier: {raw}")
            }
            AclError::InvalidPrincipal(identifier) => {
                write!(f, "principal no longer exists: {identifier}")
            }
            AclError::FetchFailed { endpoint, message } => {
                write!(f, "principal fetch against {endpoint} failed: {message}")
            }
            AclError::Aborted { reason } => write!(f, "principal fetch aborted: {reason}"),
            AclError::MissingConfig(message) => write!(f, "invalid configuration: {message}"),
        }
    }
}

impl std::error::Error for AclError {}
