//! Common test utilities for integration tests
//!
//! Provides shared fixtures and helpers used across the integration test
//! files: an in-memory engine wired end to end, canned sessions and
//! fully-populated aggregates.

use std::sync::Arc;

use quest_engagement::adapters::{InMemoryAggregateStore, KeyedJsonSealer, StaticSocialGraph};
use quest_engagement::application::EngagementFlow;
use quest_engagement::domain::models::{
    ContentId, PersistedAggregate, PlaybackEvent, RecorderConfig, SocialSignals, ViewerId,
};
use quest_engagement::services::{AggregateReconciler, SessionManager};

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
/// Call this at the beginning of tests that need logging.
#[allow(dead_code)]
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

#[allow(dead_code)]
pub fn viewer() -> ViewerId {
    ViewerId::from("viewer-1")
}

#[allow(dead_code)]
pub fn video(name: &str) -> ContentId {
    ContentId::from(name)
}

#[allow(dead_code)]
pub fn test_sealer() -> Arc<KeyedJsonSealer> {
    Arc::new(KeyedJsonSealer::new("test-key", b"quest".to_vec()))
}

/// In-memory store, social graph and flow sharing one store.
#[allow(dead_code)]
pub struct Harness {
    pub store: Arc<InMemoryAggregateStore>,
    pub social: Arc<StaticSocialGraph>,
    pub flow: EngagementFlow,
    pub sessions: SessionManager,
}

#[allow(dead_code)]
impl Harness {
    pub fn new() -> Self {
        Self::with_config(RecorderConfig::default())
    }

    pub fn sealed() -> Self {
        let config = RecorderConfig::default();
        Self::with_reconciler(
            AggregateReconciler::new(&config).with_sealer(test_sealer()),
            config,
        )
    }

    /// Flow and sessions sharing a non-default recorder configuration.
    pub fn with_config(config: RecorderConfig) -> Self {
        Self::with_reconciler(AggregateReconciler::new(&config), config)
    }

    fn with_reconciler(reconciler: AggregateReconciler, config: RecorderConfig) -> Self {
        let store = Arc::new(InMemoryAggregateStore::new());
        let social = Arc::new(StaticSocialGraph::new());
        let flow = EngagementFlow::new(store.clone(), store.clone(), social.clone(), reconciler);
        Self {
            store,
            social,
            flow,
            sessions: SessionManager::new(config),
        }
    }

    /// Attach `content` and play it from 0.25s to `0.25 + watched` seconds,
    /// reporting progress every 10 seconds, then end playback.
    pub fn watch(&mut self, content: &ContentId, media_duration: f64, watched: f64) {
        if self.sessions.get(content).is_none() {
            self.sessions
                .attach(content.clone(), media_duration)
                .expect("attach should succeed");
        }
        play_through(&mut self.sessions, content, watched);
    }
}

/// Drive an attached session through one full play of `watched` seconds.
#[allow(dead_code)]
pub fn play_through(sessions: &mut SessionManager, content: &ContentId, watched: f64) {
    let start = 0.25;
    sessions.dispatch(content, PlaybackEvent::Play { time: start });
    let mut time = start;
    while time + 10.0 < start + watched {
        time += 10.0;
        sessions.dispatch(content, PlaybackEvent::TimeUpdate { time });
    }
    sessions.dispatch(content, PlaybackEvent::Ended { time: start + watched });
}

/// An aggregate with every tracked field populated.
#[allow(dead_code)]
pub fn full_aggregate(play_count: u64, has_reacted: bool) -> PersistedAggregate {
    let total_duration = 30.0 * play_count as f64;
    PersistedAggregate {
        play_count,
        total_duration,
        media_duration: 60.0,
        pause_count: 1,
        impression_count: play_count,
        click_count: 1,
        avd: Some(30.0),
        engagement_rate: Some(50.0),
        bounce_rate: Some(0.0),
        ctr: Some(100.0 / play_count.max(1) as f64),
        play_pause_ratio: Some(play_count as f64),
        social: SocialSignals {
            has_reacted,
            ..Default::default()
        },
        ..Default::default()
    }
}
