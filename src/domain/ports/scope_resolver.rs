//! Scope resolver port.

use async_trait::async_trait;
use std::sync::Arc;

use super::AggregateReader;
use crate::domain::errors::DomainResult;
use crate::domain::models::ScopeId;

/// Maps a scope id to the aggregate store of that deployment.
#[async_trait]
pub trait ScopeResolver: Send + Sync {
    /// Resolve a scope to a reader handle.
    ///
    /// Unknown or unreachable scopes map to
    /// `DomainError::ScopeResolutionFailed`.
    async fn resolve(&self, scope: &ScopeId) -> DomainResult<Arc<dyn AggregateReader>>;
}
