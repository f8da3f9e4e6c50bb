//! Concept lifecycle state machine.
//!
//! # State Machine
//!
//! ```text
//!            enable              disable
//!   Draft ──────────▶ Active ──────────────▶ Disabled
//!     │                │  ▲   ◀──────────────
//!     │ delete         │  │       enable
//!     ▼                │  │ next.valid_from arrives (promotion)
//! (removed)            ▼  │
//!                    Scheduled ─────▶ Disabled (pending version cancelled)
//!
//!   Active | Scheduled ──(current.valid_to passed)──▶ Expired
//! ```
//!
//! Only `Draft`, `Active` and `Disabled` are stored. `Scheduled` and
//! `Expired` are derived by [`effective_status`] from the versioning window
//! and the evaluation date, and every transition check runs against the
//! derived status.

use chrono::NaiveDate;
use fc_common::{Error, Result};

use crate::model::{Concept, ConceptStatus, PendingVersion, VersionWindow};

/// Operator-triggered status changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleAction {
    Enable,
    Disable,
}

impl LifecycleAction {
    pub fn verb(&self) -> &'static str {
        match self {
            LifecycleAction::Enable => "enable",
            LifecycleAction::Disable => "disable",
        }
    }
}

/// The status a concept shows on `today`.
pub fn effective_status(concept: &Concept, today: NaiveDate) -> ConceptStatus {
    match concept.status {
        ConceptStatus::Active | ConceptStatus::Scheduled => {
            let window = &concept.versioning.current;
            if window.valid_to.is_some_and(|to| to < today) {
                ConceptStatus::Expired
            } else if concept
                .versioning
                .next
                .as_ref()
                .is_some_and(|next| next.valid_from > today)
            {
                ConceptStatus::Scheduled
            } else {
                ConceptStatus::Active
            }
        }
        stored => stored,
    }
}

/// Target status of `action` from `from`, or `None` if the move is illegal.
pub fn transition_target(from: ConceptStatus, action: LifecycleAction) -> Option<ConceptStatus> {
    use ConceptStatus::*;
    match (from, action) {
        (Draft | Disabled, LifecycleAction::Enable) => Some(Active),
        (Active | Scheduled, LifecycleAction::Disable) => Some(Disabled),
        _ => None,
    }
}

/// Check `action` against the concept's effective status.
pub fn check_transition(
    concept: &Concept,
    action: LifecycleAction,
    today: NaiveDate,
) -> Result<ConceptStatus> {
    let from = effective_status(concept, today);
    transition_target(from, action).ok_or_else(|| Error::InvalidTransition {
        id: concept.id.to_string(),
        from: from.to_string(),
        action: action.verb(),
    })
}

/// Deletion is the terminal move out of `Draft`, and only from there.
pub fn ensure_deletable(concept: &Concept, today: NaiveDate) -> Result<()> {
    match effective_status(concept, today) {
        ConceptStatus::Draft => Ok(()),
        other => Err(Error::InvalidState(format!(
            "only draft concepts may be deleted; {} is {}",
            concept.code, other
        ))),
    }
}

/// Validate a scheduling request and return its effective date.
///
/// `valid_from` must be present and strictly after `current.valid_from`.
/// Any status may carry a pending version; a disabled concept keeps it until
/// it is promoted or replaced.
pub fn check_schedule(concept: &Concept, valid_from: Option<NaiveDate>) -> Result<NaiveDate> {
    let valid_from =
        valid_from.ok_or_else(|| Error::Validation("validFrom is required".to_string()))?;
    let current_from = concept.versioning.current.valid_from;
    if valid_from <= current_from {
        return Err(Error::Validation(format!(
            "validFrom {} must be after the current version start {} of {}",
            valid_from, current_from, concept.code
        )));
    }
    Ok(valid_from)
}

/// Promote a due pending version into `current`.
///
/// Returns `true` when a promotion happened. The old `valid_to` is carried
/// over only while it still lies after the new start.
pub fn reconcile(concept: &mut Concept, today: NaiveDate) -> bool {
    let due = concept
        .versioning
        .next
        .as_ref()
        .is_some_and(|next| next.valid_from <= today);
    if !due {
        return false;
    }
    let Some(PendingVersion {
        valid_from,
        base_amount,
        formula,
    }) = concept.versioning.next.take()
    else {
        return false;
    };

    let valid_to = concept
        .versioning
        .current
        .valid_to
        .filter(|to| *to > valid_from);
    concept.versioning.current = VersionWindow {
        valid_from,
        valid_to,
    };
    concept.calculation.base_amount = base_amount;
    concept.calculation.formula = formula;
    true
}

/// Copy of `concept` carrying its effective status, for handing to callers.
pub fn present(concept: &Concept, today: NaiveDate) -> Concept {
    let mut out = concept.clone();
    out.status = effective_status(concept, today);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;
    use rust_decimal::Decimal;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn concept_with_status(status: ConceptStatus) -> Concept {
        let mut c = seed::demo_concepts().remove(0);
        c.status = status;
        c
    }

    #[test]
    fn test_stored_statuses_pass_through() {
        let today = date(2025, 6, 1);
        for status in [ConceptStatus::Draft, ConceptStatus::Disabled] {
            assert_eq!(effective_status(&concept_with_status(status), today), status);
        }
        assert_eq!(
            effective_status(&concept_with_status(ConceptStatus::Active), today),
            ConceptStatus::Active
        );
    }

    #[test]
    fn test_pending_version_reads_as_scheduled() {
        let mut c = concept_with_status(ConceptStatus::Active);
        c.versioning.next = Some(PendingVersion {
            valid_from: date(2025, 7, 1),
            base_amount: Decimal::from(150),
            formula: None,
        });
        assert_eq!(effective_status(&c, date(2025, 6, 1)), ConceptStatus::Scheduled);
        assert_eq!(effective_status(&c, date(2025, 7, 1)), ConceptStatus::Active);
    }

    #[test]
    fn test_passed_valid_to_reads_as_expired() {
        let mut c = concept_with_status(ConceptStatus::Active);
        c.versioning.current.valid_to = Some(date(2025, 5, 31));
        assert_eq!(effective_status(&c, date(2025, 5, 31)), ConceptStatus::Active);
        assert_eq!(effective_status(&c, date(2025, 6, 1)), ConceptStatus::Expired);
    }

    #[test]
    fn test_transition_table() {
        use ConceptStatus::*;
        use LifecycleAction::*;
        assert_eq!(transition_target(Draft, Enable), Some(Active));
        assert_eq!(transition_target(Disabled, Enable), Some(Active));
        assert_eq!(transition_target(Active, Disable), Some(Disabled));
        assert_eq!(transition_target(Scheduled, Disable), Some(Disabled));
        assert_eq!(transition_target(Active, Enable), None);
        assert_eq!(transition_target(Draft, Disable), None);
        assert_eq!(transition_target(Expired, Enable), None);
        assert_eq!(transition_target(Expired, Disable), None);
    }

    #[test]
    fn test_check_transition_reports_current_status() {
        let c = concept_with_status(ConceptStatus::Draft);
        let err = check_transition(&c, LifecycleAction::Disable, date(2025, 6, 1)).unwrap_err();
        match err {
            Error::InvalidTransition { from, action, .. } => {
                assert_eq!(from, "draft");
                assert_eq!(action, "disable");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_only_draft_is_deletable() {
        let today = date(2025, 6, 1);
        assert!(ensure_deletable(&concept_with_status(ConceptStatus::Draft), today).is_ok());
        for status in [ConceptStatus::Active, ConceptStatus::Disabled] {
            let err = ensure_deletable(&concept_with_status(status), today).unwrap_err();
            assert!(matches!(err, Error::InvalidState(_)));
        }
    }

    #[test]
    fn test_schedule_requires_later_date() {
        let c = concept_with_status(ConceptStatus::Active);
        let start = c.versioning.current.valid_from;

        assert!(matches!(check_schedule(&c, None), Err(Error::Validation(_))));
        assert!(matches!(check_schedule(&c, Some(start)), Err(Error::Validation(_))));
        let next = start.succ_opt().unwrap();
        assert_eq!(check_schedule(&c, Some(next)).unwrap(), next);
    }

    #[test]
    fn test_schedule_checks_date_whatever_the_status() {
        for status in [ConceptStatus::Draft, ConceptStatus::Disabled] {
            let c = concept_with_status(status);
            assert!(matches!(check_schedule(&c, None), Err(Error::Validation(_))));
            assert_eq!(
                check_schedule(&c, Some(date(2030, 1, 1))).unwrap(),
                date(2030, 1, 1)
            );
        }
    }

    #[test]
    fn test_reconcile_promotes_due_version() {
        let mut c = concept_with_status(ConceptStatus::Active);
        c.versioning.current.valid_to = Some(date(2026, 12, 31));
        c.versioning.next = Some(PendingVersion {
            valid_from: date(2025, 7, 1),
            base_amount: Decimal::from(150),
            formula: Some("m2 * 2".to_string()),
        });

        assert!(!reconcile(&mut c, date(2025, 6, 30)));
        assert!(c.versioning.next.is_some());

        assert!(reconcile(&mut c, date(2025, 7, 1)));
        assert!(c.versioning.next.is_none());
        assert_eq!(c.versioning.current.valid_from, date(2025, 7, 1));
        assert_eq!(c.versioning.current.valid_to, Some(date(2026, 12, 31)));
        assert_eq!(c.calculation.base_amount, Decimal::from(150));
        assert_eq!(c.calculation.formula.as_deref(), Some("m2 * 2"));
    }

    #[test]
    fn test_reconcile_drops_stale_valid_to() {
        let mut c = concept_with_status(ConceptStatus::Active);
        c.versioning.current.valid_to = Some(date(2025, 6, 15));
        c.versioning.next = Some(PendingVersion {
            valid_from: date(2025, 7, 1),
            base_amount: Decimal::from(10),
            formula: None,
        });
        assert!(reconcile(&mut c, date(2025, 8, 1)));
        assert_eq!(c.versioning.current.valid_to, None);
        assert_eq!(effective_status(&c, date(2025, 8, 1)), ConceptStatus::Active);
    }
}
