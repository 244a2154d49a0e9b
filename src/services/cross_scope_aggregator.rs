//! Aggregation of one viewer's metrics across several scopes.
//!
//! A "global" milestone counts engagement from every declared scope plus the
//! local one. Each scope is resolved and read concurrently; if any lookup
//! fails the whole aggregation fails, there is no partial result. The combined
//! snapshot is then evaluated like any other.

use futures::future::try_join_all;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::domain::errors::DomainResult;
use crate::domain::models::{
    ContentId, MetricsSnapshot, PersistedAggregate, ScopeId, SocialSignals, ViewerId,
};
use crate::domain::ports::{ScopeResolver, SnapshotSealer};
use crate::services::aggregate_reconciler::{open_stored, percent, ratio};

/// Combines per-scope aggregates into one snapshot.
#[derive(Clone)]
pub struct CrossScopeAggregator {
    resolver: Arc<dyn ScopeResolver>,
    sealer: Option<Arc<dyn SnapshotSealer>>,
}

impl CrossScopeAggregator {
    pub fn new(resolver: Arc<dyn ScopeResolver>) -> Self {
        Self {
            resolver,
            sealer: None,
        }
    }

    /// Open sealed per-scope snapshots with `sealer`.
    #[must_use]
    pub fn with_sealer(mut self, sealer: Arc<dyn SnapshotSealer>) -> Self {
        self.sealer = Some(sealer);
        self
    }

    /// Fetch the aggregate of every scope, in declaration order.
    ///
    /// Scopes that have no aggregate for this pair contribute nothing.
    pub async fn fetch_scopes(
        &self,
        scopes: &[ScopeId],
        viewer: &ViewerId,
        content: &ContentId,
    ) -> DomainResult<Vec<PersistedAggregate>> {
        let lookups = scopes.iter().map(|scope| async move {
            let reader = self.resolver.resolve(scope).await?;
            let stored = reader.read(viewer, content).await?;
            let aggregate = open_stored(self.sealer.as_deref(), stored).await?;
            debug!(scope = %scope, found = aggregate.is_some(), "scope aggregate fetched");
            Ok::<_, crate::domain::errors::DomainError>(aggregate)
        });

        let found = try_join_all(lookups).await?;
        Ok(found.into_iter().flatten().collect())
    }

    /// Fetch every declared scope and combine them with the local aggregate.
    #[instrument(skip_all, fields(viewer = %viewer, content_id = %content, scopes = scopes.len()))]
    pub async fn aggregate(
        &self,
        scopes: &[ScopeId],
        viewer: &ViewerId,
        content: &ContentId,
        local: &PersistedAggregate,
    ) -> DomainResult<MetricsSnapshot> {
        let remote = self.fetch_scopes(scopes, viewer, content).await?;
        info!(found = remote.len(), "combining scope aggregates");
        Ok(Self::combine(&remote, local).to_snapshot())
    }

    /// Combine remote aggregates with the local one, merged last.
    ///
    /// Counters are summed, saturating at `u64::MAX`, and flags are ORed. Ratios are rebuilt from the
    /// combined counters and fall back to the local ratio when their
    /// denominator is zero.
    pub fn combine(remote: &[PersistedAggregate], local: &PersistedAggregate) -> PersistedAggregate {
        let all: Vec<&PersistedAggregate> = remote.iter().chain(std::iter::once(local)).collect();

        let sum = |get: fn(&PersistedAggregate) -> u64| {
            all.iter().map(|a| get(a)).fold(0, u64::saturating_add)
        };
        let any = |get: fn(&SocialSignals) -> bool| all.iter().any(|a| get(&a.social));

        let play_count = sum(|a| a.play_count);
        let pause_count = sum(|a| a.pause_count);
        let click_count = sum(|a| a.click_count);
        let impression_count = sum(|a| a.impression_count);
        let bounce_count = sum(|a| a.bounce_count);
        let total_duration: f64 = all.iter().map(|a| a.total_duration).sum();
        let media_duration = if local.media_duration > 0.0 {
            local.media_duration
        } else {
            all.iter().map(|a| a.media_duration).fold(0.0, f64::max)
        };

        PersistedAggregate {
            play_count,
            total_duration,
            media_duration,
            pause_count,
            skip_count: sum(|a| a.skip_count),
            click_count,
            impression_count,
            bounce_count,
            volume_change_count: sum(|a| a.volume_change_count),
            fullscreen_count: sum(|a| a.fullscreen_count),
            buffer_count: sum(|a| a.buffer_count),
            interaction_count: sum(|a| a.interaction_count),

            avd: ratio(total_duration, play_count as f64, local.avd),
            engagement_rate: percent(
                total_duration,
                play_count as f64 * media_duration,
                local.engagement_rate,
            ),
            bounce_rate: percent(bounce_count as f64, impression_count as f64, local.bounce_rate),
            ctr: percent(click_count as f64, impression_count as f64, local.ctr),
            play_pause_ratio: ratio(play_count as f64, pause_count as f64, local.play_pause_ratio),

            most_replayed: local.most_replayed.clone(),
            social: SocialSignals {
                has_mirrored: any(|s| s.has_mirrored),
                has_reacted: any(|s| s.has_reacted),
                has_bookmarked: any(|s| s.has_bookmarked),
                has_not_interested: any(|s| s.has_not_interested),
                mirror_count: sum(|a| a.social.mirror_count),
                comment_count: sum(|a| a.social.comment_count),
                reaction_count: sum(|a| a.social.reaction_count),
            },
            updated_at: local.updated_at,
        }
    }
}
