//! Per-content playback session recorder.
//!
//! One recorder tracks one piece of content from the moment its player is
//! attached until its metrics are flushed. It is driven by playback lifecycle
//! events carrying the current media time, and produces raw counters plus a
//! bucketed view timeline. Everything here is in-memory and infallible.

use tracing::trace;

use crate::domain::models::{
    ContentId, PlaybackEvent, RecorderConfig, SessionCounters, SessionDelta, TimeRange,
};
use crate::services::interval_reconciler::IntervalReconciler;

/// Session state machine for one content id.
#[derive(Debug, Clone)]
pub struct EngagementRecorder {
    content_id: ContentId,
    media_duration: f64,
    start_threshold_secs: f64,
    bounce_threshold_secs: f64,

    counters: SessionCounters,
    timeline: IntervalReconciler,

    active: bool,
    started: bool,
    seeking: bool,
    buffering: bool,
    last_update_time: f64,
}

impl EngagementRecorder {
    /// Fresh recorder for one attached session.
    pub fn new(content_id: ContentId, media_duration: f64, config: &RecorderConfig) -> Self {
        Self {
            content_id,
            media_duration: sanitize_duration(media_duration),
            start_threshold_secs: config.start_threshold_secs,
            bounce_threshold_secs: config.bounce_threshold_secs,
            counters: SessionCounters::default(),
            timeline: IntervalReconciler::new(config.bucket_size_secs),
            active: false,
            started: false,
            seeking: false,
            buffering: false,
            last_update_time: 0.0,
        }
    }

    // -------------------------------------------------------------------------
    // Event dispatch
    // -------------------------------------------------------------------------

    /// Apply one playback event.
    pub fn handle(&mut self, event: PlaybackEvent) {
        trace!(content_id = %self.content_id, event = event.as_str(), "playback event");

        match event {
            PlaybackEvent::Play { time } => self.on_play(time),
            PlaybackEvent::Pause => self.on_pause(),
            PlaybackEvent::Ended { time } => self.on_end(time),
            PlaybackEvent::TimeUpdate { time } => self.on_time_update(time),
            PlaybackEvent::Seeking => self.on_seeking(),
            PlaybackEvent::Seeked { time } => self.on_seeked(time),
            PlaybackEvent::VolumeChange => self.on_volume_change(),
            PlaybackEvent::Click => self.on_click(),
            PlaybackEvent::Waiting { .. } => self.on_buffer_start(),
            PlaybackEvent::Playing { .. } => self.on_buffer_end(),
            PlaybackEvent::FullscreenChange => self.on_fullscreen_toggle(),
            PlaybackEvent::QualityChange => self.on_quality_change(),
            PlaybackEvent::MuteToggle => self.on_mute_toggle(),
        }
    }

    /// Playback (re)started at `time`. A play near the beginning starts a new view.
    pub fn on_play(&mut self, time: f64) {
        self.active = true;
        if time < self.start_threshold_secs {
            self.started = true;
        }
        self.last_update_time = time;
    }

    /// Count the time since the previous update as watched, unless playback
    /// is inactive, seeking, or has no reference point yet.
    pub fn on_time_update(&mut self, time: f64) {
        if self.active && self.last_update_time > 0.0 && !self.seeking {
            let delta = time - self.last_update_time;
            if delta > 0.0 {
                self.counters.total_duration += delta.max(0.0);
                self.timeline.accumulate(self.last_update_time, time);
            }
        }
        self.last_update_time = time;
    }

    /// Playback reached the end. Completes the view if it was started.
    pub fn on_end(&mut self, time: f64) {
        if self.started {
            self.counters.play_count += 1;
            self.counters.total_duration += (time - self.last_update_time).max(0.0);
        }
        self.active = false;
        self.started = false;
        self.last_update_time = 0.0;
    }

    /// Playback paused; time updates stop counting until the next play.
    pub fn on_pause(&mut self) {
        self.counters.interaction_count += 1;
        self.counters.pause_count += 1;
        self.active = false;
    }

    /// A seek began. The current view can no longer complete.
    pub fn on_seeking(&mut self) {
        if self.active {
            self.seeking = true;
        }
        self.started = false;
        self.counters.interaction_count += 1;
        self.counters.skip_count += 1;
    }

    /// A seek finished at `time`, which becomes the new reference point.
    pub fn on_seeked(&mut self, time: f64) {
        self.counters.interaction_count += 1;
        self.seeking = false;
        self.started = false;
        self.last_update_time = time;
    }

    /// Volume changed.
    pub fn on_volume_change(&mut self) {
        self.counters.interaction_count += 1;
        self.counters.volume_change_count += 1;
    }

    /// The viewer clicked through on the player.
    pub fn on_click(&mut self) {
        self.counters.interaction_count += 1;
        self.counters.click_count += 1;
    }

    /// Fullscreen entered or left.
    pub fn on_fullscreen_toggle(&mut self) {
        self.counters.interaction_count += 1;
        self.counters.fullscreen_count += 1;
    }

    /// Rendition quality changed.
    pub fn on_quality_change(&mut self) {
        self.counters.interaction_count += 1;
        self.counters.quality_change_count += 1;
    }

    /// Muting counts as a volume change.
    pub fn on_mute_toggle(&mut self) {
        self.counters.interaction_count += 1;
        self.counters.volume_change_count += 1;
    }

    /// A stall begins. Repeated `waiting` events within one stall count once.
    pub fn on_buffer_start(&mut self) {
        if !self.buffering {
            self.buffering = true;
            self.counters.buffer_count += 1;
        }
    }

    /// Playback resumed after a stall.
    pub fn on_buffer_end(&mut self) {
        self.buffering = false;
    }

    /// The player became visible to the viewer.
    pub fn record_impression(&mut self) {
        self.counters.impression_count += 1;
    }

    // -------------------------------------------------------------------------
    // Derived values
    // -------------------------------------------------------------------------

    /// Average view duration per completed play; zero before the first play.
    pub fn avd(&self) -> f64 {
        if self.counters.play_count == 0 {
            0.0
        } else {
            self.counters.total_duration / self.counters.play_count as f64
        }
    }

    /// The `n` most watched buckets of this session.
    pub fn most_replayed_area(&self, n: usize) -> Vec<TimeRange> {
        self.timeline.top_ranges(n)
    }

    /// Content this session records.
    pub fn content_id(&self) -> &ContentId {
        &self.content_id
    }

    /// Media length in seconds; zero while unknown.
    pub fn media_duration(&self) -> f64 {
        self.media_duration
    }

    /// Players often learn the media length after attaching.
    pub fn set_media_duration(&mut self, media_duration: f64) {
        self.media_duration = sanitize_duration(media_duration);
    }

    /// Counters accumulated since the last reset.
    pub fn counters(&self) -> &SessionCounters {
        &self.counters
    }

    /// View buckets in creation order.
    pub fn timeline(&self) -> &[TimeRange] {
        self.timeline.ranges()
    }

    /// Watched seconds since the last reset.
    pub fn total_duration(&self) -> f64 {
        self.counters.total_duration
    }

    /// Completed plays since the last reset.
    pub fn play_count(&self) -> u64 {
        self.counters.play_count
    }

    /// True while playing.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// True once a play began near the start of the media.
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// True between `Seeking` and `Seeked`.
    pub fn is_seeking(&self) -> bool {
        self.seeking
    }

    /// Media time of the last progress reference point.
    pub fn last_update_time(&self) -> f64 {
        self.last_update_time
    }

    /// Snapshot of what this session contributes to the aggregate.
    ///
    /// A session bounces when it was shown but watched less than the bounce
    /// threshold in total.
    pub fn delta(&self) -> SessionDelta {
        let bounced = self.counters.impression_count > 0
            && self.counters.total_duration < self.bounce_threshold_secs;

        SessionDelta {
            content_id: self.content_id.clone(),
            media_duration: self.media_duration,
            counters: self.counters.clone(),
            bounce_count: u64::from(bounced),
            timeline: self.timeline.ranges().to_vec(),
        }
    }

    /// Zero every counter and flag and clear the timeline.
    ///
    /// Called once the session's metrics were flushed.
    pub fn reset(&mut self) {
        self.counters = SessionCounters::default();
        self.timeline.clear();
        self.active = false;
        self.started = false;
        self.seeking = false;
        self.buffering = false;
        self.last_update_time = 0.0;
    }
}

fn sanitize_duration(duration: f64) -> f64 {
    if duration.is_finite() && duration > 0.0 {
        duration
    } else {
        0.0
    }
}
