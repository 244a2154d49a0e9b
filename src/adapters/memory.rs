//! In-memory implementations of every port.
//!
//! Used by tests and by hosts that keep aggregates in process. Each adapter
//! can be switched into a failing mode to exercise the engine's error paths.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    ContentId, PersistedAggregate, ScopeId, SealedAggregate, SocialSignals, StoredAggregate,
    ViewerId,
};
use crate::domain::ports::{
    AggregateReader, AggregateWriter, ScopeResolver, SnapshotSealer, SocialGraph,
};

type PairKey = (ViewerId, ContentId);

fn key(viewer: &ViewerId, content: &ContentId) -> PairKey {
    (viewer.clone(), content.clone())
}

/// Aggregate store backed by a map. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAggregateStore {
    entries: Arc<RwLock<HashMap<PairKey, StoredAggregate>>>,
    read_failure: Arc<RwLock<Option<String>>>,
    write_failure: Arc<RwLock<Option<String>>>,
}

impl InMemoryAggregateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a plaintext aggregate.
    pub async fn insert(&self, viewer: &ViewerId, content: &ContentId, aggregate: PersistedAggregate) {
        self.insert_stored(viewer, content, StoredAggregate::Plain(aggregate))
            .await;
    }

    pub async fn insert_stored(&self, viewer: &ViewerId, content: &ContentId, stored: StoredAggregate) {
        self.entries.write().await.insert(key(viewer, content), stored);
    }

    pub async fn get(&self, viewer: &ViewerId, content: &ContentId) -> Option<StoredAggregate> {
        self.entries.read().await.get(&key(viewer, content)).cloned()
    }

    /// The stored aggregate, if it was written in plaintext.
    pub async fn get_plain(&self, viewer: &ViewerId, content: &ContentId) -> Option<PersistedAggregate> {
        match self.get(viewer, content).await {
            Some(StoredAggregate::Plain(aggregate)) => Some(aggregate),
            _ => None,
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Make every read fail with `FetchFailed`, or restore reads with `None`.
    pub async fn fail_reads(&self, reason: Option<&str>) {
        *self.read_failure.write().await = reason.map(str::to_string);
    }

    /// Make every write fail with `WriteFailed`, or restore writes with `None`.
    pub async fn fail_writes(&self, reason: Option<&str>) {
        *self.write_failure.write().await = reason.map(str::to_string);
    }
}

#[async_trait]
impl AggregateReader for InMemoryAggregateStore {
    async fn read(
        &self,
        viewer: &ViewerId,
        content: &ContentId,
    ) -> DomainResult<Option<StoredAggregate>> {
        if let Some(reason) = self.read_failure.read().await.clone() {
            return Err(DomainError::FetchFailed(reason));
        }
        Ok(self.get(viewer, content).await)
    }
}

#[async_trait]
impl AggregateWriter for InMemoryAggregateStore {
    async fn write(
        &self,
        viewer: &ViewerId,
        content: &ContentId,
        aggregate: StoredAggregate,
    ) -> DomainResult<()> {
        if let Some(reason) = self.write_failure.read().await.clone() {
            return Err(DomainError::WriteFailed(reason));
        }
        self.insert_stored(viewer, content, aggregate).await;
        Ok(())
    }
}

/// Social graph answering from a fixed table; unknown pairs have no signals.
#[derive(Debug, Clone, Default)]
pub struct StaticSocialGraph {
    signals: Arc<RwLock<HashMap<PairKey, SocialSignals>>>,
    failure: Arc<RwLock<Option<String>>>,
}

impl StaticSocialGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set(&self, viewer: &ViewerId, content: &ContentId, signals: SocialSignals) {
        self.signals.write().await.insert(key(viewer, content), signals);
    }

    /// Make every query fail with `FetchFailed`, or restore it with `None`.
    pub async fn fail_queries(&self, reason: Option<&str>) {
        *self.failure.write().await = reason.map(str::to_string);
    }
}

#[async_trait]
impl SocialGraph for StaticSocialGraph {
    async fn signals(&self, viewer: &ViewerId, content: &ContentId) -> DomainResult<SocialSignals> {
        if let Some(reason) = self.failure.read().await.clone() {
            return Err(DomainError::FetchFailed(reason));
        }
        Ok(self
            .signals
            .read()
            .await
            .get(&key(viewer, content))
            .cloned()
            .unwrap_or_default())
    }
}

/// Scope resolver over a fixed set of readers.
#[derive(Clone, Default)]
pub struct StaticScopeResolver {
    scopes: HashMap<ScopeId, Arc<dyn AggregateReader>>,
}

impl StaticScopeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<ScopeId>, reader: Arc<dyn AggregateReader>) -> Self {
        self.scopes.insert(scope.into(), reader);
        self
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }
}

impl std::fmt::Debug for StaticScopeResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticScopeResolver")
            .field("scopes", &self.scopes.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[async_trait]
impl ScopeResolver for StaticScopeResolver {
    async fn resolve(&self, scope: &ScopeId) -> DomainResult<Arc<dyn AggregateReader>> {
        self.scopes
            .get(scope)
            .cloned()
            .ok_or_else(|| DomainError::ScopeResolutionFailed {
                scope: scope.to_string(),
                reason: "unknown scope".to_string(),
            })
    }
}

/// Sealer that masks the JSON encoding of an aggregate with a key.
///
/// This is obfuscation for tests and local stores, not encryption. A payload
/// sealed under one key id cannot be opened by a sealer holding another.
#[derive(Debug, Clone)]
pub struct KeyedJsonSealer {
    key_id: String,
    key: Vec<u8>,
}

impl KeyedJsonSealer {
    /// An empty `key` leaves the JSON unmasked.
    pub fn new(key_id: impl Into<String>, key: impl Into<Vec<u8>>) -> Self {
        Self {
            key_id: key_id.into(),
            key: key.into(),
        }
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    fn mask(&self, bytes: &[u8]) -> Vec<u8> {
        if self.key.is_empty() {
            return bytes.to_vec();
        }
        bytes
            .iter()
            .zip(self.key.iter().cycle())
            .map(|(b, k)| b ^ k)
            .collect()
    }
}

#[async_trait]
impl SnapshotSealer for KeyedJsonSealer {
    async fn seal(&self, aggregate: &PersistedAggregate) -> DomainResult<SealedAggregate> {
        let json = serde_json::to_vec(aggregate)?;
        Ok(SealedAggregate {
            key_id: self.key_id.clone(),
            payload: self.mask(&json),
        })
    }

    async fn unseal(&self, sealed: &SealedAggregate) -> DomainResult<PersistedAggregate> {
        if sealed.key_id != self.key_id {
            return Err(DomainError::DecryptionFailed(format!(
                "snapshot sealed with key '{}', sealer holds '{}'",
                sealed.key_id, self.key_id
            )));
        }
        serde_json::from_slice(&self.mask(&sealed.payload))
            .map_err(|e| DomainError::DecryptionFailed(format!("corrupt sealed payload: {e}")))
    }
}
