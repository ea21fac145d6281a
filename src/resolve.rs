//! Principal resolution: scoped cache, batched fetch, and partitioning.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cancel::CancellationToken;
use crate::error::{AclError, AclResult};
use crate::principal::{PrincipalIdentifier, PrincipalType};

/// Boxed future used at the resolution seam.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

fn default_resolved_at() -> DateTime<Utc> {
    Utc::now()
}

/// Resolved display record for one principal.
///
/// Immutable once cached. `invalid` marks a principal that existed but no
/// longer resolves (a deleted user, say): still displayable, not actionable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PrincipalInfo {
    pub identifier: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: PrincipalType,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub meta: serde_json::Value,
    #[serde(default)]
    pub invalid: bool,
    #[serde(default = "default_resolved_at")]
    pub resolved_at: DateTime<Utc>,
}

impl PrincipalInfo {
    pub fn new(
        identifier: impl Into<String>,
        name: impl Into<String>,
        kind: PrincipalType,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            name: name.into(),
            kind,
            detail: None,
            meta: serde_json::Value::Null,
            invalid: false,
            resolved_at: Utc::now(),
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_meta(mut self, meta: serde_json::Value) -> Self {
        self.meta = meta;
        self
    }

    pub fn invalid(mut self) -> Self {
        self.invalid = true;
        self
    }

    /// Sort key: type priority first, then the display name
    /// case-insensitively.
    pub fn sort_key(&self) -> (u8, String, String) {
        (
            self.kind.sort_priority(),
            self.name.to_lowercase(),
            self.identifier.clone(),
        )
    }
}

/// Source of principal display records, batched.
///
/// One call resolves many identifiers; identifiers omitted from the result
/// simply stay pending on the caller's side.
pub trait PrincipalSource: Send + Sync {
    fn resolve_batch(
        &self,
        identifiers: Vec<String>,
        cancel: CancellationToken,
    ) -> BoxFuture<'_, AclResult<HashMap<String, PrincipalInfo>>>;
}

/// Additive identifier → info store scoped to one editing session.
///
/// Entries are never evicted or overwritten: identifiers are stable keys,
/// so the first resolved record wins for the lifetime of the scope.
#[derive(Debug)]
pub struct ResolutionCache {
    scope_id: Uuid,
    entries: HashMap<String, PrincipalInfo>,
}

impl Default for ResolutionCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ResolutionCache {
    /// Creates an empty cache under a freshly minted scope id.
    pub fn new() -> Self {
        Self {
            scope_id: Uuid::new_v4(),
            entries: HashMap::new(),
        }
    }

    pub fn scope_id(&self) -> Uuid {
        self.scope_id
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.entries.contains_key(identifier)
    }

    pub fn get(&self, identifier: &str) -> Option<&PrincipalInfo> {
        self.entries.get(identifier)
    }

    /// Merges a fetch response. First write wins; merging is commutative
    /// and idempotent, so late results from a superseded fetch are safe.
    pub fn merge(&mut self, records: HashMap<String, PrincipalInfo>) {
        for (identifier, info) in records {
            self.entries.entry(identifier).or_insert(info);
        }
    }
}

/// Outcome of one resolve call over a set of identifiers.
#[derive(Clone, Debug, Default)]
pub struct Resolution {
    /// Records now present in the cache, ordered by type priority then name.
    pub resolved: Vec<PrincipalInfo>,
    /// Identifiers still absent, ordered by type priority then identifier.
    /// Rendered as loading placeholders and retried on the next call.
    pub pending: Vec<PrincipalIdentifier>,
    /// Recoverable fetch failure, if the batched lookup did not complete.
    pub fetch_error: Option<AclError>,
}

/// Resolves principal identifiers against a scoped cache, fetching only the
/// identifiers not yet known.
pub struct Resolver {
    cache: ResolutionCache,
    source: Arc<dyn PrincipalSource>,
    cancel: CancellationToken,
}

impl Resolver {
    pub fn new(source: Arc<dyn PrincipalSource>) -> Self {
        Self {
            cache: ResolutionCache::new(),
            source,
            cancel: CancellationToken::new(),
        }
    }

    pub fn cache(&self) -> &ResolutionCache {
        &self.cache
    }

    /// Token handed to every fetch issued by this resolver. Cancelling it
    /// tears the scope down; the cache stays valid either way.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Resolves `ids`, issuing at most one batched fetch for the cache
    /// misses, then partitions and sorts the result.
    ///
    /// A failed fetch is recoverable: the missing identifiers stay pending
    /// and the error is carried in the resolution for the caller to surface.
    pub fn resolve(&mut self, ids: &[PrincipalIdentifier]) -> BoxFuture<'_, Resolution> {
        let ids: Vec<PrincipalIdentifier> = ids.to_vec();
        Box::pin(async move {
            let mut fetch_error = None;
            let missing = self.missing_from_cache(&ids);
            if !missing.is_empty() {
                match self
                    .source
                    .resolve_batch(missing, self.cancel.clone())
                    .await
                {
                    Ok(records) => self.cache.merge(records),
                    Err(err) => fetch_error = Some(err),
                }
            }
            let mut resolution = self.partition(&ids);
            resolution.fetch_error = fetch_error;
            resolution
        })
    }

    fn missing_from_cache(&self, ids: &[PrincipalIdentifier]) -> Vec<String> {
        let mut seen = HashSet::new();
        ids.iter()
            .map(PrincipalIdentifier::as_str)
            .filter(|id| !self.cache.contains(id))
            .filter(|id| seen.insert(id.to_string()))
            .map(str::to_string)
            .collect()
    }

    fn partition(&self, ids: &[PrincipalIdentifier]) -> Resolution {
        let mut resolved = Vec::new();
        let mut pending = Vec::new();
        let mut seen = HashSet::new();
        for id in ids {
            if !seen.insert(id.as_str().to_string()) {
                continue;
            }
            match self.cache.get(id.as_str()) {
                Some(info) => resolved.push(info.clone()),
                None => pending.push(id.clone()),
            }
        }
        resolved.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        pending.sort();
        Resolution {
            resolved,
            pending,
            fetch_error: None,
        }
    }
}

/// Deterministic in-memory source for tests and local use.
#[derive(Default)]
pub struct MockPrincipalSource {
    records: HashMap<String, PrincipalInfo>,
    fail_next: Mutex<Option<AclError>>,
    calls: Mutex<Vec<Vec<String>>>,
}

impl MockPrincipalSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(mut self, info: PrincipalInfo) -> Self {
        self.records.insert(info.identifier.clone(), info);
        self
    }

    pub fn add_record(&mut self, info: PrincipalInfo) {
        self.records.insert(info.identifier.clone(), info);
    }

    /// Makes the next `resolve_batch` call fail with `err`.
    pub fn fail_next(&self, err: AclError) {
        *self.fail_next.lock().unwrap() = Some(err);
    }

    /// Identifier batches received so far, in call order.
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

impl PrincipalSource for MockPrincipalSource {
    fn resolve_batch(
        &self,
        identifiers: Vec<String>,
        cancel: CancellationToken,
    ) -> BoxFuture<'_, AclResult<HashMap<String, PrincipalInfo>>> {
        self.calls.lock().unwrap().push(identifiers.clone());
        let failure = self.fail_next.lock().unwrap().take();
        let mut records = HashMap::new();
        for identifier in &identifiers {
            if let Some(info) = self.records.get(identifier) {
                records.insert(identifier.clone(), info.clone());
            }
        }
        Box::pin(async move {
            if cancel.is_cancelled() {
                return Err(AclError::Aborted {
                    reason: cancel.abort_reason(),
                });
            }
            if let Some(err) = failure {
                return Err(err);
            }
            Ok(records)
        })
    }
}
