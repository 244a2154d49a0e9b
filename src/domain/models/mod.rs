//! Domain models
//!
//! Plain data exchanged between the engine and its collaborators.

pub mod aggregate;
pub mod config;
pub mod criteria;
pub mod identity;
pub mod metrics;
pub mod playback;
pub mod session;
pub mod time_range;

pub use aggregate::{PersistedAggregate, SealedAggregate, SocialSignals, StoredAggregate};
pub use config::{Config, EvaluationConfig, EvaluationMode, LoggingConfig, RecorderConfig};
pub use criteria::{
    BooleanCriterion, CriterionKind, CriterionOperator, EligibilityCriterion, MilestoneCriteria,
    MilestoneEligibilityCriteria, RangeCriterion,
};
pub use identity::{ContentId, ScopeId, ViewerId};
pub use metrics::{MetricField, MetricValue, MetricsSnapshot};
pub use playback::PlaybackEvent;
pub use session::{SessionCounters, SessionDelta};
pub use time_range::TimeRange;
