//! Integration tests for routing events through several live sessions.

mod common;

use common::{video, viewer, Harness};
use quest_engagement::domain::models::PlaybackEvent;

#[tokio::test]
async fn test_sessions_are_isolated_per_content() {
    let mut harness = Harness::new();
    let (a, b) = (video("a"), video("b"));
    harness.sessions.attach(a.clone(), 100.0).unwrap();
    harness.sessions.attach(b.clone(), 50.0).unwrap();

    for event in [
        PlaybackEvent::Play { time: 0.25 },
        PlaybackEvent::TimeUpdate { time: 5.25 },
        PlaybackEvent::VolumeChange,
        PlaybackEvent::MuteToggle,
        PlaybackEvent::FullscreenChange,
        PlaybackEvent::QualityChange,
        PlaybackEvent::Waiting { time: 5.25 },
        PlaybackEvent::Waiting { time: 5.25 },
        PlaybackEvent::Playing { time: 5.25 },
        PlaybackEvent::Ended { time: 10.25 },
    ] {
        assert!(harness.sessions.dispatch(&a, event));
    }
    harness.sessions.dispatch(&b, PlaybackEvent::Click);

    let counters = harness.sessions.get(&a).unwrap().counters().clone();
    assert_eq!(counters.play_count, 1);
    assert!((counters.total_duration - 10.0).abs() < f64::EPSILON);
    assert_eq!(counters.volume_change_count, 2);
    assert_eq!(counters.fullscreen_count, 1);
    assert_eq!(counters.quality_change_count, 1);
    assert_eq!(counters.buffer_count, 1);
    assert_eq!(counters.click_count, 0);

    let written_a = harness
        .flow
        .flush(&mut harness.sessions, &viewer(), &a)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(written_a.engagement_rate, Some(10.0));
    assert_eq!(written_a.buffer_count, 1);

    // flushing one session leaves the other untouched
    assert_eq!(harness.sessions.get(&b).unwrap().counters().click_count, 1);

    let written_b = harness
        .flow
        .flush(&mut harness.sessions, &viewer(), &b)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(written_b.ctr, Some(100.0));
    assert_eq!(written_b.bounce_count, 1);
    assert_eq!(harness.store.len().await, 2);
}

#[tokio::test]
async fn test_detached_session_drops_events() {
    let mut harness = Harness::new();
    let content = video("a");
    harness.watch(&content, 60.0, 30.0);

    let recorder = harness.sessions.detach(&content).unwrap();
    assert_eq!(recorder.play_count(), 1);
    assert!(!harness.sessions.dispatch(&content, PlaybackEvent::Click));

    let flushed = harness
        .flow
        .flush(&mut harness.sessions, &viewer(), &content)
        .await
        .unwrap();
    assert!(flushed.is_none());
}
