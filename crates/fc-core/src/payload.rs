//! Request payloads for repository mutations.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::model::{ConceptStatus, ConceptType, Periodicity};
use crate::normalize::{CalculationInput, ScopeInput};

/// Payload for creating a concept. Only `name` is required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateConcept {
    #[serde(default)]
    pub code: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub concept_type: Option<ConceptType>,
    #[serde(default)]
    pub calculation: Option<CalculationInput>,
    #[serde(default)]
    pub periodicity: Option<Periodicity>,
    #[serde(default)]
    pub scope: Option<ScopeInput>,
    #[serde(default)]
    pub valid_from: Option<NaiveDate>,
    #[serde(default)]
    pub valid_to: Option<NaiveDate>,
    /// Initial status; `active` when absent. Only `draft` and `active` are accepted.
    #[serde(default)]
    pub status: Option<ConceptStatus>,
}

impl CreateConcept {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Partial update. Absent fields keep their stored values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateConcept {
    pub name: Option<String>,
    pub description: Option<String>,
    /// Replaces the whole calculation (re-normalized) when present.
    pub calculation: Option<CalculationInput>,
    pub periodicity: Option<Periodicity>,
    /// Replaces the whole scope (re-normalized) when present.
    pub scope: Option<ScopeInput>,
}

/// A future-dated rate change. `base_amount` and `formula` default to the
/// concept's current calculation values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct ScheduleVersion {
    pub valid_from: Option<NaiveDate>,
    pub base_amount: Option<Decimal>,
    pub formula: Option<String>,
}

impl ScheduleVersion {
    pub fn at(valid_from: NaiveDate, base_amount: Decimal) -> Self {
        Self {
            valid_from: Some(valid_from),
            base_amount: Some(base_amount),
            formula: None,
        }
    }
}
