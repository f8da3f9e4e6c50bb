//! Adapters from loosely-shaped JSON payloads to the canonical request types.
//!
//! Older editors post calculation fields either flat on the payload
//! (`{"name": .., "method": "fixed", "baseAmount": 100}`) or nested under a
//! `calculation` key. Both shapes are folded into a [`CalculationInput`]
//! here, so the normalizers only ever see one shape. A flat field wins over
//! its nested counterpart; null and empty-string values count as absent.
//!
//! Scope lists may also arrive as the comma-separated text an operator
//! typed (`"blocks": "Torre A, Torre B"`); they are split here with
//! [`parse_list`].

use fc_common::{Error, Result};
use serde_json::{Map, Value};

use crate::normalize::{parse_list, CalculationInput};
use crate::payload::{CreateConcept, ScheduleVersion, UpdateConcept};

const CALCULATION_FIELDS: [&str; 5] = ["method", "baseAmount", "currency", "unitBasis", "formula"];
const NESTED_KEY: &str = "calculation";
const SCOPE_KEY: &str = "scope";
const SCOPE_LIST_FIELDS: [&str; 4] = ["blocks", "propertyTypes", "infractions", "selectionIds"];

/// Collect calculation fields from a flat or nested payload.
pub fn calculation_from_json(value: &Value) -> Result<CalculationInput> {
    let obj = as_object(value)?;
    let nested = obj.get(NESTED_KEY).and_then(Value::as_object);

    let mut merged = Map::new();
    for field in CALCULATION_FIELDS {
        let picked = present(obj.get(field)).or_else(|| present(nested.and_then(|n| n.get(field))));
        if let Some(v) = picked {
            merged.insert(field.to_string(), v.clone());
        }
    }

    serde_json::from_value(Value::Object(merged))
        .map_err(|e| Error::Validation(format!("invalid calculation: {}", e)))
}

/// Build a [`CreateConcept`] from either payload shape.
pub fn create_from_json(value: Value) -> Result<CreateConcept> {
    let calculation = calculation_from_json(&value)?;
    let rest = split_scope_lists(strip_calculation(value)?);
    let mut payload: CreateConcept = serde_json::from_value(rest)
        .map_err(|e| Error::Validation(format!("invalid concept payload: {}", e)))?;
    payload.calculation = Some(calculation);
    Ok(payload)
}

/// Build an [`UpdateConcept`]. The calculation is replaced only when the
/// payload carries at least one calculation field.
pub fn update_from_json(value: Value) -> Result<UpdateConcept> {
    let has_calculation = {
        let obj = as_object(&value)?;
        present(obj.get(NESTED_KEY)).is_some()
            || CALCULATION_FIELDS
                .iter()
                .any(|f| present(obj.get(*f)).is_some())
    };
    let calculation = if has_calculation {
        Some(calculation_from_json(&value)?)
    } else {
        None
    };
    let rest = split_scope_lists(strip_calculation(value)?);
    let mut payload: UpdateConcept = serde_json::from_value(rest)
        .map_err(|e| Error::Validation(format!("invalid update payload: {}", e)))?;
    payload.calculation = calculation;
    Ok(payload)
}

/// Build a [`ScheduleVersion`] from `{validFrom, baseAmount, formula}` or
/// from `{validFrom, calculation: {..}}`. Only `baseAmount` and `formula`
/// are taken from the calculation; the other calculation fields are ignored.
/// Any other key is rejected.
pub fn schedule_from_json(value: Value) -> Result<ScheduleVersion> {
    let calculation = calculation_from_json(&value)?;
    let rest = strip_calculation(value)?;
    let mut payload: ScheduleVersion = serde_json::from_value(rest)
        .map_err(|e| Error::Validation(format!("invalid schedule payload: {}", e)))?;
    payload.base_amount = calculation.base_amount;
    payload.formula = calculation.formula;
    Ok(payload)
}

fn as_object(value: &Value) -> Result<&Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| Error::Validation("payload must be a JSON object".to_string()))
}

fn strip_calculation(value: Value) -> Result<Value> {
    match value {
        Value::Object(mut obj) => {
            obj.remove(NESTED_KEY);
            for field in CALCULATION_FIELDS {
                obj.remove(field);
            }
            Ok(Value::Object(obj))
        }
        _ => Err(Error::Validation("payload must be a JSON object".to_string())),
    }
}

fn split_scope_lists(mut value: Value) -> Value {
    if let Some(scope) = value.get_mut(SCOPE_KEY).and_then(Value::as_object_mut) {
        for field in SCOPE_LIST_FIELDS {
            let split = match scope.get(field) {
                Some(Value::String(raw)) => parse_list(raw),
                _ => continue,
            };
            let items = split.into_iter().map(Value::String).collect();
            scope.insert(field.to_string(), Value::Array(items));
        }
    }
    value
}

fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| match v {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        _ => true,
    })
}
