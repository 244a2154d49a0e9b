//! Application workflows composed from the domain services.

pub mod engagement_flow;
pub mod milestone_evaluator;

pub use engagement_flow::EngagementFlow;
pub use milestone_evaluator::{
    EligibilityOutcome, MilestoneEvaluator, MultiVideoOutcome, VideoProgress,
};
