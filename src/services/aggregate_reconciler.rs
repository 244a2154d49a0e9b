//! Reconciliation of a persisted aggregate with one session's deltas.
//!
//! Counters add up. Ratios are rebuilt from the combined numerator and
//! denominator rather than averaged, and keep their previous value when the
//! combined denominator is zero. Social signals are replaced by the latest
//! value from the social graph.
//!
//! Sealed and plaintext snapshots share the same field logic; the optional
//! [`SnapshotSealer`] only wraps the read and the write.

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    PersistedAggregate, RecorderConfig, SessionDelta, SocialSignals, StoredAggregate, ViewerId,
};
use crate::domain::ports::{AggregateReader, SnapshotSealer, SocialGraph};
use crate::services::interval_reconciler::{top_ranges, IntervalReconciler};

/// Builds the next aggregate snapshot from the previous one and a session.
#[derive(Clone)]
pub struct AggregateReconciler {
    most_replayed_limit: usize,
    sealer: Option<Arc<dyn SnapshotSealer>>,
}

impl std::fmt::Debug for AggregateReconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AggregateReconciler")
            .field("most_replayed_limit", &self.most_replayed_limit)
            .field("sealed", &self.sealer.is_some())
            .finish()
    }
}

impl AggregateReconciler {
    pub fn new(config: &RecorderConfig) -> Self {
        Self {
            most_replayed_limit: config.most_replayed_limit,
            sealer: None,
        }
    }

    /// Use `sealer` to open sealed snapshots on read and to seal on write.
    #[must_use]
    pub fn with_sealer(mut self, sealer: Arc<dyn SnapshotSealer>) -> Self {
        self.sealer = Some(sealer);
        self
    }

    pub fn is_sealed(&self) -> bool {
        self.sealer.is_some()
    }

    /// Turn a stored snapshot into a usable aggregate.
    pub async fn open(&self, stored: Option<StoredAggregate>) -> DomainResult<Option<PersistedAggregate>> {
        open_stored(self.sealer.as_deref(), stored).await
    }

    /// Wrap an aggregate for the write collaborator, sealing it if configured.
    pub async fn seal(&self, aggregate: PersistedAggregate) -> DomainResult<StoredAggregate> {
        match &self.sealer {
            Some(sealer) => sealer.seal(&aggregate).await.map(StoredAggregate::Sealed),
            None => Ok(StoredAggregate::Plain(aggregate)),
        }
    }

    /// Read the previous aggregate and the current social signals, then merge
    /// the session into them.
    #[instrument(skip_all, fields(viewer = %viewer, content_id = %session.content_id))]
    pub async fn reconcile(
        &self,
        reader: &dyn AggregateReader,
        social: &dyn SocialGraph,
        viewer: &ViewerId,
        session: &SessionDelta,
    ) -> DomainResult<PersistedAggregate> {
        let (stored, signals) = futures::try_join!(
            reader.read(viewer, &session.content_id),
            social.signals(viewer, &session.content_id),
        )?;

        let previous = self.open(stored).await?;
        if previous.is_none() {
            debug!("no persisted aggregate, first session for this pair");
        }

        self.merge(previous.as_ref(), session, signals)
    }

    /// Merge a session into the previous aggregate (absent for a first-ever
    /// session). Fails only if the persisted ranges are malformed.
    pub fn merge(
        &self,
        previous: Option<&PersistedAggregate>,
        session: &SessionDelta,
        social: SocialSignals,
    ) -> DomainResult<PersistedAggregate> {
        let empty = PersistedAggregate::default();
        let prev = previous.unwrap_or(&empty);
        let delta = &session.counters;

        let play_count = prev.play_count.saturating_add(delta.play_count);
        let total_duration = prev.total_duration + delta.total_duration;
        let pause_count = prev.pause_count.saturating_add(delta.pause_count);
        let click_count = prev.click_count.saturating_add(delta.click_count);
        let impression_count = prev.impression_count.saturating_add(delta.impression_count);
        let bounce_count = prev.bounce_count.saturating_add(session.bounce_count);

        let media_duration = if session.media_duration > 0.0 {
            session.media_duration
        } else {
            prev.media_duration
        };

        let previous_ranges = IntervalReconciler::parse_all(&prev.most_replayed)?;
        let merged_ranges = IntervalReconciler::reconcile(&previous_ranges, &session.timeline);
        let most_replayed = top_ranges(&merged_ranges, self.most_replayed_limit)
            .iter()
            .map(IntervalReconciler::format)
            .collect();

        let aggregate = PersistedAggregate {
            play_count,
            total_duration,
            media_duration,
            pause_count,
            skip_count: prev.skip_count.saturating_add(delta.skip_count),
            click_count,
            impression_count,
            bounce_count,
            volume_change_count: prev
                .volume_change_count
                .saturating_add(delta.volume_change_count),
            fullscreen_count: prev.fullscreen_count.saturating_add(delta.fullscreen_count),
            buffer_count: prev.buffer_count.saturating_add(delta.buffer_count),
            interaction_count: prev.interaction_count.saturating_add(delta.interaction_count),

            avd: ratio(total_duration, play_count as f64, prev.avd),
            engagement_rate: percent(
                total_duration,
                play_count as f64 * media_duration,
                prev.engagement_rate,
            ),
            bounce_rate: percent(
                bounce_count as f64,
                impression_count as f64,
                prev.bounce_rate,
            ),
            ctr: percent(click_count as f64, impression_count as f64, prev.ctr),
            play_pause_ratio: ratio(play_count as f64, pause_count as f64, prev.play_pause_ratio),

            most_replayed,
            social,
            updated_at: Some(Utc::now()),
        };

        debug!(
            content_id = %session.content_id,
            play_count = aggregate.play_count,
            total_duration = aggregate.total_duration,
            "aggregate reconciled"
        );

        Ok(aggregate)
    }
}

/// Open a stored snapshot, unsealing it with `sealer` when needed.
pub async fn open_stored(
    sealer: Option<&dyn SnapshotSealer>,
    stored: Option<StoredAggregate>,
) -> DomainResult<Option<PersistedAggregate>> {
    match stored {
        None => Ok(None),
        Some(StoredAggregate::Plain(aggregate)) => Ok(Some(aggregate)),
        Some(StoredAggregate::Sealed(sealed)) => match sealer {
            Some(sealer) => sealer.unseal(&sealed).await.map(Some),
            None => Err(DomainError::DecryptionFailed(format!(
                "snapshot sealed with key '{}' but no sealer is configured",
                sealed.key_id
            ))),
        },
    }
}

/// `numerator / denominator`, or the previous ratio when nothing can be
/// divided.
pub(crate) fn ratio(numerator: f64, denominator: f64, previous: Option<f64>) -> Option<f64> {
    if denominator > 0.0 {
        Some(numerator / denominator)
    } else {
        previous
    }
}

pub(crate) fn percent(numerator: f64, denominator: f64, previous: Option<f64>) -> Option<f64> {
    if denominator > 0.0 {
        Some(numerator / denominator * 100.0)
    } else {
        previous
    }
}
