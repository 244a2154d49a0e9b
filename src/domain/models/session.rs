//! Session-local engagement data.
//!
//! `SessionCounters` are the raw counters a recorder accumulates between two
//! flushes. `SessionDelta` is the immutable view of one session handed to the
//! aggregate reconciler.

use serde::{Deserialize, Serialize};

use super::identity::ContentId;
use super::time_range::TimeRange;

/// Raw counters accumulated by one recorder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCounters {
    pub play_count: u64,
    /// Watched media time in seconds
    pub total_duration: f64,
    pub pause_count: u64,
    /// Seeks away from the current position
    pub skip_count: u64,
    pub click_count: u64,
    pub volume_change_count: u64,
    pub fullscreen_count: u64,
    pub quality_change_count: u64,
    pub buffer_count: u64,
    pub impression_count: u64,
    /// Every user interaction, regardless of kind
    pub interaction_count: u64,
}

/// What one playback session contributes to the persisted aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDelta {
    pub content_id: ContentId,
    /// Total media length in seconds, as reported by the player
    pub media_duration: f64,
    pub counters: SessionCounters,
    pub bounce_count: u64,
    /// Bucketed view timeline, in recording order
    pub timeline: Vec<TimeRange>,
}

impl SessionDelta {
    /// True if the session recorded nothing worth persisting.
    pub fn is_empty(&self) -> bool {
        self.counters == SessionCounters::default() && self.timeline.is_empty()
    }
}
