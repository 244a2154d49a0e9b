//! Session flush workflow.
//!
//! Moves one recorder's session through read → reconcile → write, and resets
//! the recorder only once the write succeeded. The engine provides no retry
//! or deduplication; a failed flush leaves the recorder untouched so the
//! caller can decide what to do.

use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::domain::errors::DomainResult;
use crate::domain::models::{ContentId, PersistedAggregate, ViewerId};
use crate::domain::ports::{AggregateReader, AggregateWriter, SocialGraph};
use crate::services::{AggregateReconciler, SessionManager};

/// Flushes recorded sessions into the aggregate store.
///
/// # Examples
///
/// ```no_run
/// use quest_engagement::application::EngagementFlow;
/// use quest_engagement::domain::models::{ContentId, ViewerId};
/// use quest_engagement::services::SessionManager;
///
/// async fn example(flow: &EngagementFlow, sessions: &mut SessionManager) {
///     let updated = flow
///         .flush(sessions, &ViewerId::from("viewer"), &ContentId::from("video"))
///         .await;
///     assert!(updated.is_ok());
/// }
/// ```
#[derive(Clone)]
pub struct EngagementFlow {
    reader: Arc<dyn AggregateReader>,
    writer: Arc<dyn AggregateWriter>,
    social: Arc<dyn SocialGraph>,
    reconciler: AggregateReconciler,
}

impl EngagementFlow {
    pub fn new(
        reader: Arc<dyn AggregateReader>,
        writer: Arc<dyn AggregateWriter>,
        social: Arc<dyn SocialGraph>,
        reconciler: AggregateReconciler,
    ) -> Self {
        Self {
            reader,
            writer,
            social,
            reconciler,
        }
    }

    /// Reconcile and persist the session recorded for `content_id`.
    ///
    /// Returns the written aggregate, or `None` when there is no attached
    /// session or it recorded nothing since the last flush.
    #[instrument(skip(self, sessions), fields(viewer = %viewer, content_id = %content_id))]
    pub async fn flush(
        &self,
        sessions: &mut SessionManager,
        viewer: &ViewerId,
        content_id: &ContentId,
    ) -> DomainResult<Option<PersistedAggregate>> {
        let Some(recorder) = sessions.get(content_id) else {
            debug!("no attached session to flush");
            return Ok(None);
        };
        let delta = recorder.delta();
        if delta.is_empty() {
            debug!("session recorded nothing, skipping flush");
            return Ok(None);
        }

        let aggregate = self
            .reconciler
            .reconcile(self.reader.as_ref(), self.social.as_ref(), viewer, &delta)
            .await?;
        let stored = self.reconciler.seal(aggregate.clone()).await?;
        self.writer.write(viewer, content_id, stored).await?;

        if let Some(recorder) = sessions.get_mut(content_id) {
            recorder.reset();
        }

        info!(
            play_count = aggregate.play_count,
            total_duration = aggregate.total_duration,
            sealed = self.reconciler.is_sealed(),
            "session flushed"
        );
        Ok(Some(aggregate))
    }
}
