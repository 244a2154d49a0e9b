//! Resolved metrics snapshot.
//!
//! The eligibility evaluator works on named numeric/boolean fields rather than
//! on the typed aggregate, so criteria can reference any field by its
//! serialized name.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Every named field a snapshot can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetricField {
    PlayCount,
    TotalDuration,
    Avd,
    EngagementRate,
    BounceRate,
    Ctr,
    PlayPauseRatio,
    PauseCount,
    SkipCount,
    ClickCount,
    ImpressionCount,
    BounceCount,
    VolumeChangeCount,
    FullscreenCount,
    HasMirrored,
    HasReacted,
    HasBookmarked,
    HasNotInterested,
    BufferCount,
    InteractionCount,
    MirrorCount,
    CommentCount,
    ReactionCount,
}

impl MetricField {
    /// Fields that must all be populated in a video's completed record before a
    /// multi-video milestone counts as eligible.
    pub const TRACKED: [Self; 18] = [
        Self::PlayCount,
        Self::TotalDuration,
        Self::Avd,
        Self::EngagementRate,
        Self::BounceRate,
        Self::Ctr,
        Self::PlayPauseRatio,
        Self::PauseCount,
        Self::SkipCount,
        Self::ClickCount,
        Self::ImpressionCount,
        Self::BounceCount,
        Self::VolumeChangeCount,
        Self::FullscreenCount,
        Self::HasMirrored,
        Self::HasReacted,
        Self::HasBookmarked,
        Self::HasNotInterested,
    ];

    pub const ALL: [Self; 23] = [
        Self::PlayCount,
        Self::TotalDuration,
        Self::Avd,
        Self::EngagementRate,
        Self::BounceRate,
        Self::Ctr,
        Self::PlayPauseRatio,
        Self::PauseCount,
        Self::SkipCount,
        Self::ClickCount,
        Self::ImpressionCount,
        Self::BounceCount,
        Self::VolumeChangeCount,
        Self::FullscreenCount,
        Self::HasMirrored,
        Self::HasReacted,
        Self::HasBookmarked,
        Self::HasNotInterested,
        Self::BufferCount,
        Self::InteractionCount,
        Self::MirrorCount,
        Self::CommentCount,
        Self::ReactionCount,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PlayCount => "playCount",
            Self::TotalDuration => "totalDuration",
            Self::Avd => "avd",
            Self::EngagementRate => "engagementRate",
            Self::BounceRate => "bounceRate",
            Self::Ctr => "ctr",
            Self::PlayPauseRatio => "playPauseRatio",
            Self::PauseCount => "pauseCount",
            Self::SkipCount => "skipCount",
            Self::ClickCount => "clickCount",
            Self::ImpressionCount => "impressionCount",
            Self::BounceCount => "bounceCount",
            Self::VolumeChangeCount => "volumeChangeCount",
            Self::FullscreenCount => "fullscreenCount",
            Self::HasMirrored => "hasMirrored",
            Self::HasReacted => "hasReacted",
            Self::HasBookmarked => "hasBookmarked",
            Self::HasNotInterested => "hasNotInterested",
            Self::BufferCount => "bufferCount",
            Self::InteractionCount => "interactionCount",
            Self::MirrorCount => "mirrorCount",
            Self::CommentCount => "commentCount",
            Self::ReactionCount => "reactionCount",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.as_str() == name)
    }
}

impl fmt::Display for MetricField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single field value: numeric or boolean.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Bool(bool),
    Number(f64),
}

impl MetricValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Bool(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            Self::Number(_) => None,
        }
    }
}

/// Named numeric/boolean fields describing one viewer's engagement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricsSnapshot {
    values: BTreeMap<String, MetricValue>,
}

impl MetricsSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: MetricField, value: MetricValue) {
        self.values.insert(field.as_str().to_string(), value);
    }

    pub fn get(&self, field: MetricField) -> Option<MetricValue> {
        self.get_named(field.as_str())
    }

    pub fn get_named(&self, name: &str) -> Option<MetricValue> {
        self.values.get(name).copied()
    }

    pub fn number(&self, field: MetricField) -> Option<f64> {
        self.get(field).and_then(|v| v.as_number())
    }

    pub fn boolean(&self, field: MetricField) -> Option<bool> {
        self.get(field).and_then(|v| v.as_bool())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, MetricValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(MetricField, MetricValue)> for MetricsSnapshot {
    fn from_iter<I: IntoIterator<Item = (MetricField, MetricValue)>>(iter: I) -> Self {
        let mut snapshot = Self::new();
        for (field, value) in iter {
            snapshot.insert(field, value);
        }
        snapshot
    }
}
