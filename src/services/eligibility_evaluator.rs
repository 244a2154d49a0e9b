//! Evaluation of milestone criteria against a metrics snapshot.
//!
//! Each criterion turns the field's value into boolean sub-conditions:
//! a range criterion yields `value >= min` and `value <= max` when the value
//! is numeric, a boolean criterion yields `value == expected` when the value
//! is boolean. The criterion's operator combines its own sub-conditions; the
//! criteria of different fields are always combined with AND.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::domain::models::{
    CriterionKind, CriterionOperator, EligibilityCriterion, MetricField, MetricValue,
    MetricsSnapshot, MilestoneEligibilityCriteria,
};

/// A field whose criterion is not met yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingCriterion {
    /// Current value, if the snapshot has one
    pub current: Option<MetricValue>,
    pub criterion: EligibilityCriterion,
}

/// Completed-vs-remaining breakdown of one snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriteriaProgress {
    /// Fields that are unconstrained or whose criterion is met
    pub completed: BTreeMap<String, MetricValue>,
    /// Fields whose criterion still has to be met
    pub to_complete: BTreeMap<String, PendingCriterion>,
}

impl CriteriaProgress {
    /// True when nothing remains and every tracked field is populated.
    pub fn is_complete(&self) -> bool {
        self.to_complete.is_empty()
            && MetricField::TRACKED
                .iter()
                .all(|field| self.completed.contains_key(field.as_str()))
    }

    /// Tracked fields that have no value in the completed record.
    pub fn missing_tracked(&self) -> Vec<MetricField> {
        MetricField::TRACKED
            .into_iter()
            .filter(|field| !self.completed.contains_key(field.as_str()))
            .collect()
    }
}

/// Stateless criteria evaluator.
#[derive(Debug, Clone, Copy, Default)]
pub struct EligibilityEvaluator;

impl EligibilityEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// Sub-conditions generated by `criterion` for `value`.
    ///
    /// A value of the wrong type, or no value at all, generates none.
    pub fn sub_conditions(criterion: &EligibilityCriterion, value: Option<MetricValue>) -> Vec<bool> {
        match (criterion.kind(), value) {
            (CriterionKind::Range(range), Some(MetricValue::Number(v))) => {
                vec![v >= range.min_value, v <= range.max_value]
            }
            (CriterionKind::Boolean(expected), Some(MetricValue::Bool(v))) => {
                vec![v == expected.bool_value]
            }
            _ => Vec::new(),
        }
    }

    /// Whether one criterion holds for `value`.
    ///
    /// With no sub-conditions, `and` holds vacuously and `or` does not.
    pub fn criterion_met(criterion: &EligibilityCriterion, value: Option<MetricValue>) -> bool {
        let conditions = Self::sub_conditions(criterion, value);
        match criterion.operator() {
            CriterionOperator::And => conditions.iter().all(|&c| c),
            CriterionOperator::Or => conditions.iter().any(|&c| c),
        }
    }

    /// True if every constrained field's criterion holds.
    pub fn evaluate(&self, snapshot: &MetricsSnapshot, criteria: &MilestoneEligibilityCriteria) -> bool {
        self.failed_fields(snapshot, criteria).is_empty()
    }

    /// Names of the constrained fields whose criterion does not hold.
    pub fn failed_fields(
        &self,
        snapshot: &MetricsSnapshot,
        criteria: &MilestoneEligibilityCriteria,
    ) -> Vec<String> {
        criteria
            .constrained()
            .filter(|(name, criterion)| {
                let met = Self::criterion_met(criterion, snapshot.get_named(name));
                if !met {
                    debug!(field = %name, value = ?snapshot.get_named(name), "criterion not met");
                }
                !met
            })
            .map(|(name, _)| name.to_string())
            .collect()
    }

    /// Split the snapshot into completed and still-to-complete fields.
    ///
    /// Every tracked field and every constrained field is placed in exactly
    /// one of the two records, except unconstrained fields without a value,
    /// which appear in neither.
    pub fn partition(
        &self,
        snapshot: &MetricsSnapshot,
        criteria: &MilestoneEligibilityCriteria,
    ) -> CriteriaProgress {
        let mut progress = CriteriaProgress::default();

        for field in MetricField::TRACKED {
            let name = field.as_str();
            if criteria.get(name).is_none() {
                if let Some(value) = snapshot.get_named(name) {
                    progress.completed.insert(name.to_string(), value);
                }
            }
        }

        for (name, criterion) in criteria.constrained() {
            let value = snapshot.get_named(name);
            match value {
                Some(value) if Self::criterion_met(criterion, Some(value)) => {
                    progress.completed.insert(name.to_string(), value);
                }
                _ => {
                    progress.to_complete.insert(
                        name.to_string(),
                        PendingCriterion {
                            current: value,
                            criterion: *criterion,
                        },
                    );
                }
            }
        }

        progress
    }
}
