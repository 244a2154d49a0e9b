//! Milestone eligibility workflow.
//!
//! Resolves the snapshot a milestone is judged against (the local aggregate,
//! or the cross-scope combination when the milestone declares scopes), then
//! runs the criteria over it. In strict mode collaborator errors reach the
//! caller; in lenient mode they are logged and the viewer is reported as not
//! eligible.

use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    ContentId, EvaluationMode, MetricsSnapshot, MilestoneCriteria, PersistedAggregate, ViewerId,
};
use crate::domain::ports::{AggregateReader, ScopeResolver, SnapshotSealer};
use crate::services::aggregate_reconciler::open_stored;
use crate::services::{CriteriaProgress, CrossScopeAggregator, EligibilityEvaluator};

/// Result of evaluating one milestone for one video.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityOutcome {
    pub eligible: bool,
    /// Constrained fields whose criterion does not hold
    pub failed_fields: Vec<String>,
    /// Set when a collaborator error was swallowed in lenient mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EligibilityOutcome {
    fn degraded(error: &DomainError) -> Self {
        Self {
            eligible: false,
            failed_fields: Vec::new(),
            error: Some(error.to_string()),
        }
    }
}

/// Progress of one video of a multi-video milestone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoProgress {
    pub content_id: ContentId,
    pub progress: CriteriaProgress,
}

/// Result of evaluating one milestone over several videos.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiVideoOutcome {
    /// True only when every video's progress is complete
    pub eligible: bool,
    pub videos: Vec<VideoProgress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Evaluates milestones against persisted aggregates.
///
/// # Examples
///
/// ```no_run
/// use quest_engagement::application::MilestoneEvaluator;
/// use quest_engagement::domain::models::{ContentId, MilestoneCriteria, ViewerId};
///
/// async fn example(evaluator: &MilestoneEvaluator, milestone: &MilestoneCriteria) {
///     let outcome = evaluator
///         .evaluate(&ViewerId::from("viewer"), &ContentId::from("video"), milestone)
///         .await
///         .unwrap();
///     println!("eligible: {}", outcome.eligible);
/// }
/// ```
#[derive(Clone)]
pub struct MilestoneEvaluator {
    reader: Arc<dyn AggregateReader>,
    cross_scope: Option<CrossScopeAggregator>,
    sealer: Option<Arc<dyn SnapshotSealer>>,
    evaluator: EligibilityEvaluator,
    mode: EvaluationMode,
}

impl MilestoneEvaluator {
    pub fn new(reader: Arc<dyn AggregateReader>, mode: EvaluationMode) -> Self {
        Self {
            reader,
            cross_scope: None,
            sealer: None,
            evaluator: EligibilityEvaluator::new(),
            mode,
        }
    }

    /// Enable milestones that declare scopes.
    #[must_use]
    pub fn with_scope_resolver(mut self, resolver: Arc<dyn ScopeResolver>) -> Self {
        let mut aggregator = CrossScopeAggregator::new(resolver);
        if let Some(sealer) = &self.sealer {
            aggregator = aggregator.with_sealer(Arc::clone(sealer));
        }
        self.cross_scope = Some(aggregator);
        self
    }

    /// Open sealed snapshots, locally and in every scope.
    #[must_use]
    pub fn with_sealer(mut self, sealer: Arc<dyn SnapshotSealer>) -> Self {
        self.cross_scope = self
            .cross_scope
            .map(|aggregator| aggregator.with_sealer(Arc::clone(&sealer)));
        self.sealer = Some(sealer);
        self
    }

    pub fn mode(&self) -> EvaluationMode {
        self.mode
    }

    /// The local aggregate of the pair; a pair never seen reads as all zeros.
    pub async fn local_aggregate(
        &self,
        viewer: &ViewerId,
        content: &ContentId,
    ) -> DomainResult<PersistedAggregate> {
        let stored = self.reader.read(viewer, content).await?;
        let aggregate = open_stored(self.sealer.as_deref(), stored).await?;
        Ok(aggregate.unwrap_or_default())
    }

    /// Snapshot the milestone is judged against, starting from `local`.
    pub async fn snapshot_for(
        &self,
        viewer: &ViewerId,
        content: &ContentId,
        local: &PersistedAggregate,
        milestone: &MilestoneCriteria,
    ) -> DomainResult<MetricsSnapshot> {
        if !milestone.is_cross_scope() {
            return Ok(local.to_snapshot());
        }

        match &self.cross_scope {
            Some(aggregator) => {
                aggregator
                    .aggregate(&milestone.scopes, viewer, content, local)
                    .await
            }
            None => Err(DomainError::ScopeResolutionFailed {
                scope: milestone
                    .scopes
                    .first()
                    .map(ToString::to_string)
                    .unwrap_or_default(),
                reason: "no scope resolver configured".to_string(),
            }),
        }
    }

    /// Evaluate `milestone` for one video, reading its local aggregate.
    #[instrument(skip(self, milestone), fields(viewer = %viewer, content_id = %content, mode = ?self.mode))]
    pub async fn evaluate(
        &self,
        viewer: &ViewerId,
        content: &ContentId,
        milestone: &MilestoneCriteria,
    ) -> DomainResult<EligibilityOutcome> {
        let result = async {
            let local = self.local_aggregate(viewer, content).await?;
            self.judge(viewer, content, &local, milestone).await
        }
        .await;
        self.apply_mode(result, EligibilityOutcome::degraded)
    }

    /// Evaluate `milestone` against an aggregate the caller already holds,
    /// typically the one a flush just wrote.
    #[instrument(skip(self, local, milestone), fields(viewer = %viewer, content_id = %content, mode = ?self.mode))]
    pub async fn evaluate_aggregate(
        &self,
        viewer: &ViewerId,
        content: &ContentId,
        local: &PersistedAggregate,
        milestone: &MilestoneCriteria,
    ) -> DomainResult<EligibilityOutcome> {
        let result = self.judge(viewer, content, local, milestone).await;
        self.apply_mode(result, EligibilityOutcome::degraded)
    }

    /// Evaluate `milestone` over several videos at once.
    ///
    /// Every video is partitioned into completed and still-to-complete
    /// fields; the milestone is met only when every video is complete.
    #[instrument(skip(self, contents, milestone), fields(viewer = %viewer, videos = contents.len(), mode = ?self.mode))]
    pub async fn evaluate_videos(
        &self,
        viewer: &ViewerId,
        contents: &[ContentId],
        milestone: &MilestoneCriteria,
    ) -> DomainResult<MultiVideoOutcome> {
        let lookups = contents.iter().map(|content| async move {
            let local = self.local_aggregate(viewer, content).await?;
            let snapshot = self.snapshot_for(viewer, content, &local, milestone).await?;
            Ok::<_, DomainError>(VideoProgress {
                content_id: content.clone(),
                progress: self.evaluator.partition(&snapshot, &milestone.criteria),
            })
        });

        let result = try_join_all(lookups).await.map(|videos| {
            let eligible = !videos.is_empty() && videos.iter().all(|v| v.progress.is_complete());
            info!(eligible, "multi-video milestone evaluated");
            MultiVideoOutcome {
                eligible,
                videos,
                error: None,
            }
        });

        self.apply_mode(result, |error| MultiVideoOutcome {
            error: Some(error.to_string()),
            ..Default::default()
        })
    }

    async fn judge(
        &self,
        viewer: &ViewerId,
        content: &ContentId,
        local: &PersistedAggregate,
        milestone: &MilestoneCriteria,
    ) -> DomainResult<EligibilityOutcome> {
        let snapshot = self.snapshot_for(viewer, content, local, milestone).await?;
        let failed_fields = self.evaluator.failed_fields(&snapshot, &milestone.criteria);
        let eligible = failed_fields.is_empty();
        info!(eligible, failed = failed_fields.len(), "milestone evaluated");
        Ok(EligibilityOutcome {
            eligible,
            failed_fields,
            error: None,
        })
    }

    fn apply_mode<T>(
        &self,
        result: DomainResult<T>,
        degraded: impl FnOnce(&DomainError) -> T,
    ) -> DomainResult<T> {
        match (result, self.mode) {
            (Ok(outcome), _) => Ok(outcome),
            (Err(error), EvaluationMode::Strict) => Err(error),
            (Err(error), EvaluationMode::Lenient) => {
                warn!(error = %error, kind = error.kind(), "evaluation failed, reporting not eligible");
                Ok(degraded(&error))
            }
        }
    }
}
