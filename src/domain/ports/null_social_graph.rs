//! Null social graph implementation.
//!
//! Used when the host has no social graph but the type system requires a
//! SocialGraph implementation.

use async_trait::async_trait;

use super::SocialGraph;
use crate::domain::errors::DomainResult;
use crate::domain::models::{ContentId, SocialSignals, ViewerId};

/// A social graph in which nobody has interacted with anything.
#[derive(Debug, Clone, Default)]
pub struct NullSocialGraph;

impl NullSocialGraph {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SocialGraph for NullSocialGraph {
    async fn signals(&self, _viewer: &ViewerId, _content: &ContentId) -> DomainResult<SocialSignals> {
        Ok(SocialSignals::default())
    }
}
