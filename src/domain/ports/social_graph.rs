//! Social graph query port.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{ContentId, SocialSignals, ViewerId};

/// Source of the viewer's current social signals for a piece of content.
#[async_trait]
pub trait SocialGraph: Send + Sync {
    /// Latest signals; these replace whatever the aggregate held before.
    async fn signals(&self, viewer: &ViewerId, content: &ContentId) -> DomainResult<SocialSignals>;
}
