//! Integration tests for milestone eligibility, local and across scopes.

mod common;

use std::sync::Arc;

use common::{full_aggregate, test_sealer, video, viewer, Harness};
use quest_engagement::adapters::{InMemoryAggregateStore, StaticScopeResolver};
use quest_engagement::application::MilestoneEvaluator;
use quest_engagement::domain::models::{
    CriterionOperator, EligibilityCriterion, EvaluationMode, MetricField,
    MilestoneCriteria, MilestoneEligibilityCriteria, PersistedAggregate, ScopeId, SocialSignals,
    StoredAggregate,
};
use quest_engagement::domain::ports::SnapshotSealer;
use quest_engagement::DomainError;

fn play_count_between(min: f64, max: f64) -> MilestoneEligibilityCriteria {
    MilestoneEligibilityCriteria::new().with(
        MetricField::PlayCount,
        EligibilityCriterion::range(min, max, CriterionOperator::And).unwrap(),
    )
}

fn reacted() -> MilestoneEligibilityCriteria {
    MilestoneEligibilityCriteria::new().with(
        MetricField::HasReacted,
        EligibilityCriterion::boolean(true, CriterionOperator::And),
    )
}

async fn store_with(aggregate: PersistedAggregate) -> Arc<InMemoryAggregateStore> {
    let store = Arc::new(InMemoryAggregateStore::new());
    store.insert(&viewer(), &video("intro"), aggregate).await;
    store
}

#[tokio::test]
async fn test_local_milestone() {
    let store = store_with(full_aggregate(3, false)).await;
    let evaluator = MilestoneEvaluator::new(store, EvaluationMode::Strict);

    let met = evaluator
        .evaluate(&viewer(), &video("intro"), &MilestoneCriteria::local(play_count_between(1.0, 5.0)))
        .await
        .unwrap();
    assert!(met.eligible);
    assert!(met.failed_fields.is_empty());

    let unmet = evaluator
        .evaluate(
            &viewer(),
            &video("intro"),
            &MilestoneCriteria::local(play_count_between(1.0, 5.0).with(
                MetricField::HasReacted,
                EligibilityCriterion::boolean(true, CriterionOperator::And),
            )),
        )
        .await
        .unwrap();
    assert!(!unmet.eligible);
    assert_eq!(unmet.failed_fields, vec!["hasReacted"]);
    assert!(unmet.error.is_none());
}

#[tokio::test]
async fn test_missing_aggregate_reads_as_zeros() {
    let evaluator = MilestoneEvaluator::new(
        Arc::new(InMemoryAggregateStore::new()),
        EvaluationMode::Strict,
    );

    let needs_a_play = evaluator
        .evaluate(&viewer(), &video("unseen"), &MilestoneCriteria::local(play_count_between(1.0, 10.0)))
        .await
        .unwrap();
    assert!(!needs_a_play.eligible);

    let allows_zero = evaluator
        .evaluate(&viewer(), &video("unseen"), &MilestoneCriteria::local(play_count_between(0.0, 10.0)))
        .await
        .unwrap();
    assert!(allows_zero.eligible);

    // ratios are undefined on an empty aggregate, so an AND range holds vacuously
    let avd = MilestoneEligibilityCriteria::new().with(
        MetricField::Avd,
        EligibilityCriterion::range(10.0, 20.0, CriterionOperator::And).unwrap(),
    );
    let vacuous = evaluator
        .evaluate(&viewer(), &video("unseen"), &MilestoneCriteria::local(avd))
        .await
        .unwrap();
    assert!(vacuous.eligible);
}

#[tokio::test]
async fn test_criteria_from_json() {
    let store = store_with(full_aggregate(3, true)).await;
    let evaluator = MilestoneEvaluator::new(store, EvaluationMode::Strict);

    let milestone: MilestoneCriteria = serde_json::from_str(
        r#"{
            "criteria": {
                "playCount": {"minValue": 2, "maxValue": 100},
                "hasReacted": {"boolValue": true, "operator": "or"},
                "ctr": null
            }
        }"#,
    )
    .unwrap();
    assert!(!milestone.is_cross_scope());

    let outcome = evaluator
        .evaluate(&viewer(), &video("intro"), &milestone)
        .await
        .unwrap();
    assert!(outcome.eligible);

    let inverted = serde_json::from_str::<MilestoneCriteria>(
        r#"{"criteria": {"playCount": {"minValue": 5, "maxValue": 1}}}"#,
    );
    assert!(inverted.is_err());

    let misspelled = serde_json::from_str::<MilestoneCriteria>(
        r#"{"criteria": {"playcount": {"minValue": 50, "maxValue": 100, "operator": "and"}}}"#,
    );
    assert!(misspelled.is_err());
}

#[tokio::test]
async fn test_strict_mode_surfaces_fetch_errors() {
    let store = Arc::new(InMemoryAggregateStore::new());
    store.fail_reads(Some("timeout")).await;
    let evaluator = MilestoneEvaluator::new(store, EvaluationMode::Strict);

    let err = evaluator
        .evaluate(&viewer(), &video("intro"), &MilestoneCriteria::local(reacted()))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::FetchFailed(_)));
}

#[tokio::test]
async fn test_lenient_mode_reports_not_eligible() {
    let store = Arc::new(InMemoryAggregateStore::new());
    store.fail_reads(Some("timeout")).await;
    let evaluator = MilestoneEvaluator::new(store, EvaluationMode::Lenient);

    // an empty AND would otherwise be vacuously eligible
    let outcome = evaluator
        .evaluate(&viewer(), &video("intro"), &MilestoneCriteria::default())
        .await
        .unwrap();
    assert!(!outcome.eligible);
    assert!(outcome.error.unwrap().contains("timeout"));
}

#[tokio::test]
async fn test_cross_scope_flags_are_ored_and_counters_summed() {
    let local = store_with(full_aggregate(2, false)).await;
    let remote = store_with(full_aggregate(3, true)).await;
    let resolver = StaticScopeResolver::new().with_scope("eu", remote);
    let evaluator =
        MilestoneEvaluator::new(local, EvaluationMode::Strict).with_scope_resolver(Arc::new(resolver));

    let local_only = evaluator
        .evaluate(&viewer(), &video("intro"), &MilestoneCriteria::local(reacted()))
        .await
        .unwrap();
    assert!(!local_only.eligible);

    let global = MilestoneCriteria {
        criteria: reacted().with(
            MetricField::PlayCount,
            EligibilityCriterion::range(5.0, 5.0, CriterionOperator::And).unwrap(),
        ),
        scopes: vec![ScopeId::from("eu")],
    };
    let outcome = evaluator
        .evaluate(&viewer(), &video("intro"), &global)
        .await
        .unwrap();
    assert!(outcome.eligible, "failed: {:?}", outcome.failed_fields);
}

#[tokio::test]
async fn test_scope_without_aggregate_contributes_nothing() {
    let local = store_with(full_aggregate(2, false)).await;
    let resolver =
        StaticScopeResolver::new().with_scope("apac", Arc::new(InMemoryAggregateStore::new()));
    let evaluator =
        MilestoneEvaluator::new(local, EvaluationMode::Strict).with_scope_resolver(Arc::new(resolver));

    let milestone = MilestoneCriteria {
        criteria: play_count_between(2.0, 2.0),
        scopes: vec![ScopeId::from("apac")],
    };
    let outcome = evaluator
        .evaluate(&viewer(), &video("intro"), &milestone)
        .await
        .unwrap();
    assert!(outcome.eligible);
}

#[tokio::test]
async fn test_unknown_scope_fails_whole_aggregation() {
    let local = store_with(full_aggregate(2, true)).await;
    let resolver = StaticScopeResolver::new().with_scope("eu", Arc::new(InMemoryAggregateStore::new()));
    let milestone = MilestoneCriteria {
        criteria: reacted(),
        scopes: vec![ScopeId::from("eu"), ScopeId::from("mars")],
    };

    let strict = MilestoneEvaluator::new(local.clone(), EvaluationMode::Strict)
        .with_scope_resolver(Arc::new(resolver.clone()));
    let err = strict
        .evaluate(&viewer(), &video("intro"), &milestone)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::ScopeResolutionFailed { ref scope, .. } if scope == "mars"
    ));

    let lenient = MilestoneEvaluator::new(local, EvaluationMode::Lenient)
        .with_scope_resolver(Arc::new(resolver));
    let outcome = lenient
        .evaluate(&viewer(), &video("intro"), &milestone)
        .await
        .unwrap();
    assert!(!outcome.eligible);
}

#[tokio::test]
async fn test_scopes_without_resolver_fail() {
    let evaluator = MilestoneEvaluator::new(
        store_with(full_aggregate(1, true)).await,
        EvaluationMode::Strict,
    );
    let milestone = MilestoneCriteria {
        criteria: reacted(),
        scopes: vec![ScopeId::from("eu")],
    };
    let err = evaluator
        .evaluate(&viewer(), &video("intro"), &milestone)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::ScopeResolutionFailed { .. }));
}

#[tokio::test]
async fn test_sealed_aggregates_are_opened_locally_and_remotely() {
    let sealer = test_sealer();
    let sealed_local = sealer.seal(&full_aggregate(1, false)).await.unwrap();
    let sealed_remote = sealer.seal(&full_aggregate(1, true)).await.unwrap();

    let local = Arc::new(InMemoryAggregateStore::new());
    local
        .insert_stored(&viewer(), &video("intro"), StoredAggregate::Sealed(sealed_local))
        .await;
    let remote = Arc::new(InMemoryAggregateStore::new());
    remote
        .insert_stored(&viewer(), &video("intro"), StoredAggregate::Sealed(sealed_remote))
        .await;

    let milestone = MilestoneCriteria {
        criteria: reacted(),
        scopes: vec![ScopeId::from("eu")],
    };

    // resolver first, sealer second: the sealer still reaches the scopes
    let evaluator = MilestoneEvaluator::new(local.clone(), EvaluationMode::Strict)
        .with_scope_resolver(Arc::new(StaticScopeResolver::new().with_scope("eu", remote.clone())))
        .with_sealer(sealer);
    let outcome = evaluator
        .evaluate(&viewer(), &video("intro"), &milestone)
        .await
        .unwrap();
    assert!(outcome.eligible);

    let unsealed = MilestoneEvaluator::new(local, EvaluationMode::Strict);
    let err = unsealed
        .evaluate(&viewer(), &video("intro"), &MilestoneCriteria::local(reacted()))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::DecryptionFailed(_)));
}

#[tokio::test]
async fn test_evaluate_freshly_flushed_aggregate() {
    let mut harness = Harness::new();
    let content = video("intro");
    harness
        .social
        .set(
            &viewer(),
            &content,
            SocialSignals {
                has_reacted: true,
                ..Default::default()
            },
        )
        .await;
    harness.watch(&content, 60.0, 30.0);
    let written = harness
        .flow
        .flush(&mut harness.sessions, &viewer(), &content)
        .await
        .unwrap()
        .unwrap();

    let evaluator = MilestoneEvaluator::new(harness.store.clone(), EvaluationMode::Strict);
    let milestone = MilestoneCriteria::local(reacted().with(
        MetricField::Avd,
        EligibilityCriterion::range(20.0, 60.0, CriterionOperator::And).unwrap(),
    ));

    let from_memory = evaluator
        .evaluate_aggregate(&viewer(), &content, &written, &milestone)
        .await
        .unwrap();
    let from_store = evaluator
        .evaluate(&viewer(), &content, &milestone)
        .await
        .unwrap();
    assert!(from_memory.eligible);
    assert_eq!(from_memory, from_store);
}

#[tokio::test]
async fn test_multi_video_requires_every_video_complete() {
    let store = Arc::new(InMemoryAggregateStore::new());
    store.insert(&viewer(), &video("a"), full_aggregate(2, true)).await;
    store
        .insert(
            &viewer(),
            &video("b"),
            PersistedAggregate {
                play_count: 2,
                ..Default::default()
            },
        )
        .await;
    let evaluator = MilestoneEvaluator::new(store.clone(), EvaluationMode::Strict);
    let milestone = MilestoneCriteria::local(play_count_between(1.0, 10.0));

    let partial = evaluator
        .evaluate_videos(&viewer(), &[video("a"), video("b")], &milestone)
        .await
        .unwrap();
    assert!(!partial.eligible);
    assert_eq!(partial.videos.len(), 2);
    assert_eq!(partial.videos[0].content_id, video("a"));
    assert!(partial.videos[0].progress.is_complete());
    assert!(!partial.videos[1].progress.is_complete());
    assert!(partial.videos[1]
        .progress
        .missing_tracked()
        .contains(&MetricField::Avd));

    store.insert(&viewer(), &video("b"), full_aggregate(4, false)).await;
    let complete = evaluator
        .evaluate_videos(&viewer(), &[video("a"), video("b")], &milestone)
        .await
        .unwrap();
    assert!(complete.eligible);

    let unmet = MilestoneCriteria::local(reacted());
    let outcome = evaluator
        .evaluate_videos(&viewer(), &[video("a"), video("b")], &unmet)
        .await
        .unwrap();
    assert!(!outcome.eligible);
    assert!(outcome.videos[1].progress.to_complete.contains_key("hasReacted"));
}

#[tokio::test]
async fn test_multi_video_lenient_on_failure() {
    let store = Arc::new(InMemoryAggregateStore::new());
    store.fail_reads(Some("offline")).await;
    let evaluator = MilestoneEvaluator::new(store, EvaluationMode::Lenient);

    let outcome = evaluator
        .evaluate_videos(&viewer(), &[video("a")], &MilestoneCriteria::local(reacted()))
        .await
        .unwrap();
    assert!(!outcome.eligible);
    assert!(outcome.videos.is_empty());
    assert!(outcome.error.is_some());
}
