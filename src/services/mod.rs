pub mod aggregate_reconciler;
pub mod cross_scope_aggregator;
pub mod eligibility_evaluator;
pub mod engagement_recorder;
pub mod interval_reconciler;
pub mod session_manager;

pub use aggregate_reconciler::AggregateReconciler;
pub use cross_scope_aggregator::CrossScopeAggregator;
pub use eligibility_evaluator::{CriteriaProgress, EligibilityEvaluator, PendingCriterion};
pub use engagement_recorder::EngagementRecorder;
pub use interval_reconciler::IntervalReconciler;
pub use session_manager::SessionManager;
