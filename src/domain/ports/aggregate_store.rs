//! Aggregate store ports.
//!
//! The engine never talks to a store directly. Reads and writes of the
//! cumulative aggregate go through these traits; transport, retries and
//! timeouts belong to the adapter.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{ContentId, StoredAggregate, ViewerId};

/// Read side of the aggregate store.
#[async_trait]
pub trait AggregateReader: Send + Sync {
    /// Fetch the stored aggregate for a viewer and content.
    ///
    /// Returns `Ok(None)` when the pair has never been persisted (first-ever
    /// session). Transport failures map to `DomainError::FetchFailed`.
    async fn read(
        &self,
        viewer: &ViewerId,
        content: &ContentId,
    ) -> DomainResult<Option<StoredAggregate>>;
}

/// Write side of the aggregate store.
#[async_trait]
pub trait AggregateWriter: Send + Sync {
    /// Persist a fully reconciled aggregate, replacing the previous one.
    async fn write(
        &self,
        viewer: &ViewerId,
        content: &ContentId,
        aggregate: StoredAggregate,
    ) -> DomainResult<()>;
}
