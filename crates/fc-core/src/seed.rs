//! Demonstration concepts loaded into a fresh repository.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use fc_common::{ConceptCode, ConceptId};
use fc_config::settings::{DEFAULT_ACTOR, DEFAULT_CURRENCY};
use rust_decimal::Decimal;

use crate::model::{
    AppliesTo, Audit, Calculation, CalculationMethod, Concept, ConceptStatus, ConceptType,
    Periodicity, Scope, VersionWindow, Versioning,
};

/// The demo collection, newest first (the order a listing shows them).
pub fn demo_concepts() -> Vec<Concept> {
    vec![
        demo(
            "FEE-MANT",
            "Cuota Ordinaria",
            "Mantenimiento general y operación",
            ConceptType::Fee,
            fixed(120),
            Periodicity::Monthly,
            Scope::default(),
            day(2025, 1, 1),
            stamp(2025, 1, 1, 10),
        ),
        demo(
            "FEE-AGUA",
            "Agua",
            "Consumo de agua prorrateado por unidad",
            ConceptType::Fee,
            Calculation {
                method: CalculationMethod::PerUnit,
                unit_basis: Some("unit".to_string()),
                ..fixed(15)
            },
            Periodicity::Monthly,
            Scope {
                applies_to: AppliesTo::Blocks,
                blocks: ["Torre A", "Torre B"].iter().map(|s| s.to_string()).collect(),
                ..Scope::default()
            },
            day(2025, 2, 1),
            stamp(2025, 2, 1, 9),
        ),
        demo(
            "FEE-SEG",
            "Seguridad",
            "Servicio de guardia y monitoreo",
            ConceptType::Fee,
            fixed(35),
            Periodicity::Monthly,
            Scope::default(),
            day(2025, 3, 1),
            stamp(2025, 3, 1, 9),
        ),
        demo(
            "FINE-RUIDO",
            "Multa Ruido",
            "Ruido excesivo fuera de horario",
            ConceptType::Fine,
            fixed(50),
            Periodicity::OneTime,
            Scope {
                applies_to: AppliesTo::Infractions,
                infractions: std::iter::once("ruido".to_string()).collect(),
                ..Scope::default()
            },
            day(2025, 1, 15),
            stamp(2025, 1, 15, 9),
        ),
    ]
}

#[allow(clippy::too_many_arguments)]
fn demo(
    code: &str,
    name: &str,
    description: &str,
    concept_type: ConceptType,
    calculation: Calculation,
    periodicity: Periodicity,
    scope: Scope,
    valid_from: NaiveDate,
    created_at: DateTime<Utc>,
) -> Concept {
    Concept {
        id: ConceptId::new(),
        code: ConceptCode(code.to_string()),
        name: name.to_string(),
        description: description.to_string(),
        concept_type,
        calculation,
        periodicity,
        scope,
        versioning: Versioning {
            current: VersionWindow::starting(valid_from),
            next: None,
        },
        status: ConceptStatus::Active,
        audit: Audit::fresh(created_at, DEFAULT_ACTOR),
    }
}

fn fixed(amount: i64) -> Calculation {
    Calculation {
        method: CalculationMethod::Fixed,
        base_amount: Decimal::from(amount),
        currency: DEFAULT_CURRENCY.to_string(),
        unit_basis: None,
        formula: None,
        scale: None,
    }
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn stamp(y: i32, m: u32, d: u32, hour: u32) -> DateTime<Utc> {
    day(y, m, d)
        .and_time(NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or_default())
        .and_utc()
}
