//! Concept data model.
//!
//! JSON field names are camelCase and enum values snake_case, so a
//! serialized [`Concept`] reads like the record an admin screen renders.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use fc_common::{ConceptCode, ConceptId, Error};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Implements `Display` and `FromStr` over the snake_case wire names.
macro_rules! wire_names {
    ($ty:ident, $what:literal, { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $name),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($name => Ok($ty::$variant),)+
                    other => Err(Error::Validation(format!(
                        "unknown {} {:?}",
                        $what, other
                    ))),
                }
            }
        }
    };
}

/// What kind of charge a concept is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConceptType {
    Fee,
    Fine,
    Misc,
}

wire_names!(ConceptType, "concept type", {
    Fee => "fee",
    Fine => "fine",
    Misc => "misc",
});

/// How often a concept is billed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Periodicity {
    Monthly,
    Quarterly,
    Yearly,
    OneTime,
}

wire_names!(Periodicity, "periodicity", {
    Monthly => "monthly",
    Quarterly => "quarterly",
    Yearly => "yearly",
    OneTime => "one_time",
});

/// Pricing formula class governing how `baseAmount` is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationMethod {
    /// Flat amount per billing period.
    Fixed,
    /// Amount per unit of `unitBasis`.
    PerUnit,
    /// Amount per square metre of the property.
    PerM2,
    /// Amount computed from `formula`.
    Formula,
}

wire_names!(CalculationMethod, "calculation method", {
    Fixed => "fixed",
    PerUnit => "per_unit",
    PerM2 => "per_m2",
    Formula => "formula",
});

/// Targeting discriminator for a [`Scope`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppliesTo {
    #[default]
    All,
    Blocks,
    PropertyTypes,
    Infractions,
    Selection,
}

wire_names!(AppliesTo, "scope target", {
    All => "all",
    Blocks => "blocks",
    PropertyTypes => "property_types",
    Infractions => "infractions",
    Selection => "selection",
});

impl AppliesTo {
    /// Lenient parse: anything unrecognised targets every property.
    pub fn parse_or_all(s: &str) -> Self {
        s.parse().unwrap_or(AppliesTo::All)
    }
}

/// Concept status.
///
/// Only `Draft`, `Active` and `Disabled` are ever stored; `Scheduled` and
/// `Expired` are derived from the versioning window when a concept is read
/// (see [`crate::lifecycle::effective_status`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConceptStatus {
    Draft,
    Active,
    Scheduled,
    Disabled,
    Expired,
}

wire_names!(ConceptStatus, "status", {
    Draft => "draft",
    Active => "active",
    Scheduled => "scheduled",
    Disabled => "disabled",
    Expired => "expired",
});

impl ConceptStatus {
    /// Whether this status may be written to storage.
    pub fn is_storable(&self) -> bool {
        matches!(
            self,
            ConceptStatus::Draft | ConceptStatus::Active | ConceptStatus::Disabled
        )
    }
}

/// Fully-populated pricing record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Calculation {
    pub method: CalculationMethod,
    pub base_amount: Decimal,
    pub currency: String,
    /// Only meaningful for [`CalculationMethod::PerUnit`]; cleared otherwise.
    pub unit_basis: Option<String>,
    pub formula: Option<String>,
    /// Reserved for tiered pricing. Always `None`.
    pub scale: Option<serde_json::Value>,
}

/// Targeting rule. Exactly the set matching `applies_to` is populated.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scope {
    pub applies_to: AppliesTo,
    pub blocks: BTreeSet<String>,
    pub property_types: BTreeSet<String>,
    pub infractions: BTreeSet<String>,
    pub selection_ids: BTreeSet<String>,
}

/// The window during which the current calculation is in force.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionWindow {
    pub valid_from: NaiveDate,
    pub valid_to: Option<NaiveDate>,
}

impl VersionWindow {
    pub fn starting(valid_from: NaiveDate) -> Self {
        Self {
            valid_from,
            valid_to: None,
        }
    }
}

/// A future-dated rate change held until `valid_from`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingVersion {
    pub valid_from: NaiveDate,
    pub base_amount: Decimal,
    pub formula: Option<String>,
}

/// Invariant: `next.valid_from > current.valid_from` whenever `next` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Versioning {
    pub current: VersionWindow,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<PendingVersion>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Audit {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by_name: String,
    pub updated_by_name: String,
}

impl Audit {
    pub fn fresh(now: DateTime<Utc>, actor: &str) -> Self {
        Self {
            created_at: now,
            updated_at: now,
            created_by_name: actor.to_string(),
            updated_by_name: actor.to_string(),
        }
    }

    pub fn touch(&mut self, now: DateTime<Utc>, actor: &str) {
        self.updated_at = now;
        self.updated_by_name = actor.to_string();
    }
}

/// A billable or penalizing line item definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Concept {
    pub id: ConceptId,
    pub code: ConceptCode,
    pub name: String,
    pub description: String,
    pub concept_type: ConceptType,
    pub calculation: Calculation,
    pub periodicity: Periodicity,
    pub scope: Scope,
    pub versioning: Versioning,
    pub status: ConceptStatus,
    pub audit: Audit,
}
