//! Calculation normalizer.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::model::{Calculation, CalculationMethod};

/// Partially-specified calculation, as submitted by an editor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CalculationInput {
    pub method: Option<CalculationMethod>,
    pub base_amount: Option<Decimal>,
    pub currency: Option<String>,
    pub unit_basis: Option<String>,
    pub formula: Option<String>,
}

impl CalculationInput {
    /// Fixed amount in the default currency.
    pub fn fixed(base_amount: Decimal) -> Self {
        Self {
            method: Some(CalculationMethod::Fixed),
            base_amount: Some(base_amount),
            ..Self::default()
        }
    }
}

/// Produce a fully-populated [`Calculation`].
///
/// `method` defaults to fixed, `base_amount` to zero, `currency` to
/// `default_currency`. Blank strings count as absent. `unit_basis` survives
/// only for per-unit pricing and `scale` is always `None`.
pub fn normalize_calculation(input: &CalculationInput, default_currency: &str) -> Calculation {
    let method = input.method.unwrap_or(CalculationMethod::Fixed);
    let unit_basis = match method {
        CalculationMethod::PerUnit => non_blank(input.unit_basis.as_deref()),
        _ => None,
    };

    Calculation {
        method,
        base_amount: input.base_amount.unwrap_or(Decimal::ZERO),
        currency: non_blank(input.currency.as_deref())
            .unwrap_or_else(|| default_currency.to_string()),
        unit_basis,
        formula: non_blank(input.formula.as_deref()),
        scale: None,
    }
}

fn non_blank(s: Option<&str>) -> Option<String> {
    s.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
