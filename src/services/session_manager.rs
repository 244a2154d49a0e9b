//! Caller-owned registry of active playback sessions.
//!
//! The manager owns one [`EngagementRecorder`] per content id. It is created
//! by the host and passed to whatever needs it; there is no global instance.
//! Each recorder is only ever mutated through its own content id.

use std::collections::HashMap;
use tracing::{debug, warn};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{ContentId, PlaybackEvent, RecorderConfig};
use crate::services::engagement_recorder::EngagementRecorder;

/// Map from content id to its session recorder.
#[derive(Debug, Default)]
pub struct SessionManager {
    config: RecorderConfig,
    sessions: HashMap<ContentId, EngagementRecorder>,
}

impl SessionManager {
    /// Empty registry whose recorders use `config`.
    pub fn new(config: RecorderConfig) -> Self {
        Self {
            config,
            sessions: HashMap::new(),
        }
    }

    /// Configuration handed to every new recorder.
    pub fn config(&self) -> &RecorderConfig {
        &self.config
    }

    /// Start a session for `content_id` and record its impression.
    ///
    /// Attaching a second session for an id that was not detached first is a
    /// caller error.
    pub fn attach(
        &mut self,
        content_id: ContentId,
        media_duration: f64,
    ) -> DomainResult<&mut EngagementRecorder> {
        if self.sessions.contains_key(&content_id) {
            warn!(content_id = %content_id, "session already attached");
            return Err(DomainError::ValidationFailed(format!(
                "a session for content {content_id} is already attached"
            )));
        }

        debug!(content_id = %content_id, media_duration, "session attached");
        let mut recorder = EngagementRecorder::new(content_id.clone(), media_duration, &self.config);
        recorder.record_impression();
        Ok(self.sessions.entry(content_id).or_insert(recorder))
    }

    /// Destroy the session for `content_id`, returning its recorder.
    pub fn detach(&mut self, content_id: &ContentId) -> Option<EngagementRecorder> {
        let removed = self.sessions.remove(content_id);
        if removed.is_some() {
            debug!(content_id = %content_id, "session detached");
        }
        removed
    }

    /// The recorder attached for `content_id`, if any.
    pub fn get(&self, content_id: &ContentId) -> Option<&EngagementRecorder> {
        self.sessions.get(content_id)
    }

    /// Mutable access to the recorder attached for `content_id`.
    pub fn get_mut(&mut self, content_id: &ContentId) -> Option<&mut EngagementRecorder> {
        self.sessions.get_mut(content_id)
    }

    /// Route a playback event to its session. Returns false if no session is
    /// attached for `content_id`.
    pub fn dispatch(&mut self, content_id: &ContentId, event: PlaybackEvent) -> bool {
        match self.sessions.get_mut(content_id) {
            Some(recorder) => {
                recorder.handle(event);
                true
            }
            None => {
                debug!(content_id = %content_id, event = event.as_str(), "event for unknown session dropped");
                false
            }
        }
    }

    /// Ids of every attached session, in no particular order.
    pub fn content_ids(&self) -> impl Iterator<Item = &ContentId> {
        self.sessions.keys()
    }

    /// Number of attached sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// True when no session is attached.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
