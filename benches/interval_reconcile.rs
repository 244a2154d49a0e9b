//! Performance benchmarks for view-timeline reconciliation
//!
//! Targets:
//! - Bucketing a long session: <1ms
//! - Reconciling 10k persisted ranges with a session: <5ms
//! - Full aggregate merge (parse, reconcile, top-n, format): <10ms

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use quest_engagement::domain::models::{
    ContentId, PersistedAggregate, PlaybackEvent, RecorderConfig, SocialSignals, TimeRange,
};
use quest_engagement::services::{AggregateReconciler, EngagementRecorder, IntervalReconciler};

/// Disjoint ranges, one every `stride` seconds.
fn spaced_ranges(count: usize, stride: f64) -> Vec<TimeRange> {
    (0..count)
        .map(|i| {
            let start = i as f64 * stride;
            TimeRange::new(start, start + 1.0, (i % 7) as u64 + 1)
        })
        .collect()
}

/// A two-hour session with a rewatched middle section.
fn long_session() -> EngagementRecorder {
    let mut recorder = EngagementRecorder::new(
        ContentId::from("bench"),
        7200.0,
        &RecorderConfig::default(),
    );
    recorder.handle(PlaybackEvent::Play { time: 0.25 });
    let mut time = 0.25;
    while time < 7200.0 {
        time += 0.25;
        recorder.handle(PlaybackEvent::TimeUpdate { time });
    }
    recorder.handle(PlaybackEvent::Seeking);
    recorder.handle(PlaybackEvent::Seeked { time: 3000.0 });
    recorder.handle(PlaybackEvent::Play { time: 3000.0 });
    time = 3000.0;
    while time < 3600.0 {
        time += 0.25;
        recorder.handle(PlaybackEvent::TimeUpdate { time });
    }
    recorder
}

fn bench_accumulate(c: &mut Criterion) {
    let mut group = c.benchmark_group("accumulate");

    for bucket_size in [1.0, 5.0] {
        group.bench_with_input(
            BenchmarkId::new("two_hours", bucket_size),
            &bucket_size,
            |b, &bucket_size| {
                b.iter(|| {
                    let mut timeline = IntervalReconciler::new(bucket_size);
                    let mut time = 0.0;
                    while time < 7200.0 {
                        timeline.accumulate(black_box(time), black_box(time + 0.25));
                        time += 0.25;
                    }
                    timeline
                });
            },
        );
    }

    group.finish();
}

fn bench_reconcile(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile");
    let session = long_session();

    for count in [100, 1_000, 10_000] {
        let persisted = spaced_ranges(count, 3.0);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &persisted, |b, persisted| {
            b.iter(|| IntervalReconciler::reconcile(black_box(persisted), black_box(session.timeline())));
        });
    }

    group.finish();
}

fn bench_merge(c: &mut Criterion) {
    let reconciler = AggregateReconciler::new(&RecorderConfig::default());
    let session = long_session().delta();
    let previous = PersistedAggregate {
        play_count: 40,
        total_duration: 90_000.0,
        most_replayed: spaced_ranges(10, 600.0)
            .iter()
            .map(IntervalReconciler::format)
            .collect(),
        ..Default::default()
    };

    c.bench_function("merge_aggregate", |b| {
        b.iter(|| {
            reconciler
                .merge(black_box(Some(&previous)), black_box(&session), SocialSignals::default())
                .unwrap()
        });
    });
}

criterion_group!(benches, bench_accumulate, bench_reconcile, bench_merge);
criterion_main!(benches);
