//! Quest Engagement - video engagement metrics and milestone eligibility
//!
//! Records what a viewer does during a playback session, folds each session
//! into a persisted per-viewer aggregate, and decides whether the aggregate
//! satisfies a milestone's completion criteria, optionally summed across
//! several independent deployments ("scopes").
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Models, port traits and errors
//! - **Service Layer** (`services`): Recording, reconciliation and evaluation
//! - **Application Layer** (`application`): Flush and milestone workflows
//! - **Adapters** (`adapters`): In-memory port implementations
//! - **Infrastructure Layer** (`infrastructure`): Configuration and logging
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use quest_engagement::adapters::{InMemoryAggregateStore, StaticSocialGraph};
//! use quest_engagement::application::EngagementFlow;
//! use quest_engagement::domain::models::{ContentId, PlaybackEvent, RecorderConfig, ViewerId};
//! use quest_engagement::services::{AggregateReconciler, SessionManager};
//!
//! # async fn run() -> quest_engagement::DomainResult<()> {
//! let store = Arc::new(InMemoryAggregateStore::new());
//! let flow = EngagementFlow::new(
//!     store.clone(),
//!     store.clone(),
//!     Arc::new(StaticSocialGraph::new()),
//!     AggregateReconciler::new(&RecorderConfig::default()),
//! );
//!
//! let video = ContentId::from("video");
//! let mut sessions = SessionManager::default();
//! sessions.attach(video.clone(), 120.0)?;
//! sessions.dispatch(&video, PlaybackEvent::Play { time: 0.0 });
//! sessions.dispatch(&video, PlaybackEvent::TimeUpdate { time: 30.0 });
//! flow.flush(&mut sessions, &ViewerId::from("viewer"), &video).await?;
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use application::{EligibilityOutcome, EngagementFlow, MilestoneEvaluator, MultiVideoOutcome};
pub use domain::models::{
    Config, ContentId, EligibilityCriterion, MetricField, MetricValue, MetricsSnapshot,
    MilestoneCriteria, MilestoneEligibilityCriteria, PersistedAggregate, PlaybackEvent, ScopeId,
    TimeRange, ViewerId,
};
pub use domain::ports::{
    AggregateReader, AggregateWriter, ScopeResolver, SnapshotSealer, SocialGraph,
};
pub use domain::{DomainError, DomainResult};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{
    AggregateReconciler, CrossScopeAggregator, EligibilityEvaluator, EngagementRecorder,
    IntervalReconciler, SessionManager,
};
