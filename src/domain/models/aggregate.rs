//! Persisted engagement aggregate.
//!
//! A `PersistedAggregate` holds the cumulative statistics of one
//! (viewer, content) pair as kept by the external store. It is never mutated
//! in place: reconciliation builds a new one from the previous snapshot and a
//! session delta.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::metrics::{MetricField, MetricValue, MetricsSnapshot};

/// Social signals reported by the social-graph collaborator.
///
/// Always replaced wholesale by the latest fetched value, never merged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SocialSignals {
    pub has_mirrored: bool,
    /// Liked / reacted to the content
    pub has_reacted: bool,
    pub has_bookmarked: bool,
    /// Flagged the content as not interesting
    pub has_not_interested: bool,
    pub mirror_count: u64,
    pub comment_count: u64,
    pub reaction_count: u64,
}

/// Cumulative engagement statistics for one viewer and one piece of content.
///
/// Ratio fields are `None` until a first non-zero denominator is seen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistedAggregate {
    pub play_count: u64,
    /// Watched media time in seconds
    pub total_duration: f64,
    /// Media length in seconds, taken from the latest session
    pub media_duration: f64,
    pub pause_count: u64,
    pub skip_count: u64,
    pub click_count: u64,
    pub impression_count: u64,
    pub bounce_count: u64,
    pub volume_change_count: u64,
    pub fullscreen_count: u64,
    pub buffer_count: u64,
    pub interaction_count: u64,

    pub avd: Option<f64>,
    pub engagement_rate: Option<f64>,
    pub bounce_rate: Option<f64>,
    pub ctr: Option<f64>,
    pub play_pause_ratio: Option<f64>,

    /// Most replayed ranges in their persisted text form
    pub most_replayed: Vec<String>,

    pub social: SocialSignals,

    pub updated_at: Option<DateTime<Utc>>,
}

impl PersistedAggregate {
    /// Flatten into the named-field view consumed by the eligibility evaluator.
    ///
    /// Ratios that were never defined are left out of the snapshot.
    pub fn to_snapshot(&self) -> MetricsSnapshot {
        let mut snapshot = MetricsSnapshot::new();
        let count = |v: u64| MetricValue::Number(v as f64);

        snapshot.insert(MetricField::PlayCount, count(self.play_count));
        snapshot.insert(
            MetricField::TotalDuration,
            MetricValue::Number(self.total_duration),
        );
        snapshot.insert(MetricField::PauseCount, count(self.pause_count));
        snapshot.insert(MetricField::SkipCount, count(self.skip_count));
        snapshot.insert(MetricField::ClickCount, count(self.click_count));
        snapshot.insert(MetricField::ImpressionCount, count(self.impression_count));
        snapshot.insert(MetricField::BounceCount, count(self.bounce_count));
        snapshot.insert(
            MetricField::VolumeChangeCount,
            count(self.volume_change_count),
        );
        snapshot.insert(MetricField::FullscreenCount, count(self.fullscreen_count));
        snapshot.insert(MetricField::BufferCount, count(self.buffer_count));
        snapshot.insert(MetricField::InteractionCount, count(self.interaction_count));

        let ratios = [
            (MetricField::Avd, self.avd),
            (MetricField::EngagementRate, self.engagement_rate),
            (MetricField::BounceRate, self.bounce_rate),
            (MetricField::Ctr, self.ctr),
            (MetricField::PlayPauseRatio, self.play_pause_ratio),
        ];
        for (field, ratio) in ratios {
            if let Some(value) = ratio {
                snapshot.insert(field, MetricValue::Number(value));
            }
        }

        snapshot.insert(
            MetricField::HasMirrored,
            MetricValue::Bool(self.social.has_mirrored),
        );
        snapshot.insert(
            MetricField::HasReacted,
            MetricValue::Bool(self.social.has_reacted),
        );
        snapshot.insert(
            MetricField::HasBookmarked,
            MetricValue::Bool(self.social.has_bookmarked),
        );
        snapshot.insert(
            MetricField::HasNotInterested,
            MetricValue::Bool(self.social.has_not_interested),
        );
        snapshot.insert(MetricField::MirrorCount, count(self.social.mirror_count));
        snapshot.insert(MetricField::CommentCount, count(self.social.comment_count));
        snapshot.insert(MetricField::ReactionCount, count(self.social.reaction_count));

        snapshot
    }
}

/// An aggregate as it sits in the external store.
///
/// Sealed snapshots must go through a `SnapshotSealer` before use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum StoredAggregate {
    Plain(PersistedAggregate),
    Sealed(SealedAggregate),
}

/// Opaque sealed payload produced by a `SnapshotSealer`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SealedAggregate {
    /// Identifies the key or scheme needed to open the payload
    pub key_id: String,
    pub payload: Vec<u8>,
}
