//! Milestone eligibility criteria.
//!
//! A criterion is either a numeric range or a boolean match. The shape is
//! decided once, when the criterion is built or deserialized, so evaluation
//! never has to sniff which properties are present.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::identity::ScopeId;
use super::metrics::MetricField;
use crate::domain::errors::{DomainError, DomainResult};

/// How the sub-conditions generated by one criterion are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CriterionOperator {
    /// Every sub-condition must hold
    #[default]
    #[serde(alias = "AND")]
    And,
    /// At least one sub-condition must hold
    #[serde(alias = "OR")]
    Or,
}

/// Inclusive numeric bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeCriterion {
    pub min_value: f64,
    pub max_value: f64,
}

/// Exact boolean match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BooleanCriterion {
    pub bool_value: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CriterionKind {
    Range(RangeCriterion),
    Boolean(BooleanCriterion),
}

/// One field's requirement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCriterion", into = "RawCriterion")]
pub struct EligibilityCriterion {
    kind: CriterionKind,
    operator: CriterionOperator,
}

impl EligibilityCriterion {
    /// Build a range criterion. Fails if either bound is not finite or the
    /// bounds are inverted.
    pub fn range(min_value: f64, max_value: f64, operator: CriterionOperator) -> DomainResult<Self> {
        if !min_value.is_finite() || !max_value.is_finite() {
            return Err(DomainError::ValidationFailed(format!(
                "range bounds must be finite, got [{min_value}, {max_value}]"
            )));
        }
        if min_value > max_value {
            return Err(DomainError::ValidationFailed(format!(
                "minValue {min_value} is greater than maxValue {max_value}"
            )));
        }
        Ok(Self {
            kind: CriterionKind::Range(RangeCriterion {
                min_value,
                max_value,
            }),
            operator,
        })
    }

    pub fn boolean(bool_value: bool, operator: CriterionOperator) -> Self {
        Self {
            kind: CriterionKind::Boolean(BooleanCriterion { bool_value }),
            operator,
        }
    }

    pub fn kind(&self) -> CriterionKind {
        self.kind
    }

    pub fn operator(&self) -> CriterionOperator {
        self.operator
    }
}

/// Wire shape of a criterion, before its kind is decided.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCriterion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    min_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    bool_value: Option<bool>,
    #[serde(default)]
    operator: CriterionOperator,
}

impl TryFrom<RawCriterion> for EligibilityCriterion {
    type Error = DomainError;

    fn try_from(raw: RawCriterion) -> Result<Self, Self::Error> {
        match (raw.min_value, raw.max_value, raw.bool_value) {
            (Some(min), Some(max), None) => Self::range(min, max, raw.operator),
            (None, None, Some(value)) => Ok(Self::boolean(value, raw.operator)),
            (None, None, None) => Err(DomainError::ValidationFailed(
                "criterion needs either minValue/maxValue or boolValue".to_string(),
            )),
            (_, _, Some(_)) => Err(DomainError::ValidationFailed(
                "criterion cannot mix boolValue with range bounds".to_string(),
            )),
            _ => Err(DomainError::ValidationFailed(
                "range criterion needs both minValue and maxValue".to_string(),
            )),
        }
    }
}

impl From<EligibilityCriterion> for RawCriterion {
    fn from(criterion: EligibilityCriterion) -> Self {
        match criterion.kind {
            CriterionKind::Range(range) => Self {
                min_value: Some(range.min_value),
                max_value: Some(range.max_value),
                bool_value: None,
                operator: criterion.operator,
            },
            CriterionKind::Boolean(boolean) => Self {
                min_value: None,
                max_value: None,
                bool_value: Some(boolean.bool_value),
                operator: criterion.operator,
            },
        }
    }
}

type CriteriaMap = BTreeMap<String, Option<EligibilityCriterion>>;

/// Per-field criteria of one milestone. `None` entries are unconstrained.
///
/// Every key names a [`MetricField`]; unknown names are rejected on insert
/// and on deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CriteriaMap", into = "CriteriaMap")]
pub struct MilestoneEligibilityCriteria {
    fields: CriteriaMap,
}

impl MilestoneEligibilityCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert keyed by a known field.
    #[must_use]
    pub fn with(mut self, field: MetricField, criterion: EligibilityCriterion) -> Self {
        self.fields
            .insert(field.as_str().to_string(), Some(criterion));
        self
    }

    /// Insert a criterion by field name. Fails if `name` is not a metric field.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        criterion: Option<EligibilityCriterion>,
    ) -> DomainResult<()> {
        let name = name.into();
        if MetricField::from_name(&name).is_none() {
            return Err(DomainError::ValidationFailed(format!(
                "unknown criteria field '{name}'"
            )));
        }
        self.fields.insert(name, criterion);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&EligibilityCriterion> {
        self.fields.get(name).and_then(Option::as_ref)
    }

    /// Entries that actually impose a constraint.
    pub fn constrained(&self) -> impl Iterator<Item = (&str, &EligibilityCriterion)> {
        self.fields
            .iter()
            .filter_map(|(name, criterion)| criterion.as_ref().map(|c| (name.as_str(), c)))
    }

    pub fn is_unconstrained(&self) -> bool {
        self.constrained().next().is_none()
    }
}

impl TryFrom<CriteriaMap> for MilestoneEligibilityCriteria {
    type Error = DomainError;

    fn try_from(fields: CriteriaMap) -> Result<Self, Self::Error> {
        let mut criteria = Self::new();
        for (name, criterion) in fields {
            criteria.insert(name, criterion)?;
        }
        Ok(criteria)
    }
}

impl From<MilestoneEligibilityCriteria> for CriteriaMap {
    fn from(criteria: MilestoneEligibilityCriteria) -> Self {
        criteria.fields
    }
}

/// Criteria plus the extra scopes whose metrics count toward them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneCriteria {
    pub criteria: MilestoneEligibilityCriteria,
    /// Scopes beyond the local one; empty for local-only milestones
    #[serde(default)]
    pub scopes: Vec<ScopeId>,
}

impl MilestoneCriteria {
    pub fn local(criteria: MilestoneEligibilityCriteria) -> Self {
        Self {
            criteria,
            scopes: Vec::new(),
        }
    }

    pub fn is_cross_scope(&self) -> bool {
        !self.scopes.is_empty()
    }
}
