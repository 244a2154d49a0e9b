//! Snapshot sealing port.
//!
//! Some stores keep aggregates sealed (encrypted). Reconciliation takes an
//! optional sealer and runs the same field logic whether or not the snapshot
//! was sealed.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{PersistedAggregate, SealedAggregate};

/// Seal/unseal strategy for stored aggregates.
#[async_trait]
pub trait SnapshotSealer: Send + Sync {
    /// Seal an aggregate before it is written.
    async fn seal(&self, aggregate: &PersistedAggregate) -> DomainResult<SealedAggregate>;

    /// Open a sealed aggregate. Failures map to `DomainError::DecryptionFailed`.
    async fn unseal(&self, sealed: &SealedAggregate) -> DomainResult<PersistedAggregate>;
}
