//! In-memory concept repository.
//!
//! The repository exclusively owns the canonical collection. Callers only
//! ever receive copies, with the status field set to the effective status
//! for the repository clock's "today". Every public operation starts by
//! promoting due scheduled versions, validates fully, and only then writes,
//! so a failed call leaves the collection untouched.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use fc_common::{ConceptCode, ConceptId, Error, Result};
use fc_config::Settings;
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::clock::Clock;
use crate::lifecycle::{self, LifecycleAction};
use crate::model::{Audit, Concept, ConceptStatus, PendingVersion, VersionWindow, Versioning};
use crate::normalize::{normalize_calculation, normalize_scope};
use crate::payload::{CreateConcept, ScheduleVersion, UpdateConcept};
use crate::query::{self, ConceptPage, ListQuery};
use crate::seed;

/// Suffix appended to the name of a cloned concept.
pub const CLONE_NAME_SUFFIX: &str = " (Copia)";

/// Owned, id-indexed concept collection.
///
/// Entries are keyed by an insertion sequence number; listing walks the
/// sequence backwards, so the most recently created concept comes first and
/// insertion order breaks any tie.
pub struct ConceptRepository {
    entries: BTreeMap<u64, Concept>,
    index: HashMap<ConceptId, u64>,
    next_seq: u64,
    clock: Arc<dyn Clock>,
    default_currency: String,
    actor: String,
}

impl ConceptRepository {
    /// Empty repository using the currency and actor from `settings`.
    pub fn new(settings: &Settings, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: BTreeMap::new(),
            index: HashMap::new(),
            next_seq: 0,
            clock,
            default_currency: settings.default_currency.clone(),
            actor: settings.actor_name.clone(),
        }
    }

    /// Repository seeded with the demo concepts when `settings` asks for it.
    pub fn from_settings(settings: &Settings, clock: Arc<dyn Clock>) -> Self {
        let mut repo = Self::new(settings, clock);
        if settings.seed_demo_data {
            repo.seed(seed::demo_concepts());
        }
        repo
    }

    /// Load concepts given in listing order (newest first).
    pub fn seed(&mut self, concepts: Vec<Concept>) {
        for concept in concepts.into_iter().rev() {
            self.insert(concept);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Promote every pending version whose date has arrived.
    ///
    /// Returns the number of promotions.
    pub fn reconcile(&mut self) -> usize {
        let today = self.clock.today();
        let now = self.clock.now();
        let mut promoted = 0;
        for concept in self.entries.values_mut() {
            if lifecycle::reconcile(concept, today) {
                concept.audit.touch(now, &self.actor);
                info!(
                    id = %concept.id,
                    code = %concept.code,
                    valid_from = %concept.versioning.current.valid_from,
                    "promoted scheduled version"
                );
                promoted += 1;
            }
        }
        promoted
    }

    /// A page of concepts matching the query's filter, newest first.
    pub fn list(&mut self, query: &ListQuery) -> Result<ConceptPage> {
        if query.page_size == 0 {
            return Err(Error::Validation("pageSize must be at least 1".to_string()));
        }
        self.reconcile();
        let today = self.clock.today();
        let presented: Vec<Concept> = self
            .entries
            .values()
            .rev()
            .map(|c| lifecycle::present(c, today))
            .collect();
        let page = query::run(&presented, query);
        debug!(
            total = page.total,
            returned = page.items.len(),
            page = query.page,
            "listed concepts"
        );
        Ok(page)
    }

    pub fn get(&mut self, id: &ConceptId) -> Result<Concept> {
        self.reconcile();
        let today = self.clock.today();
        self.entry(id).map(|c| lifecycle::present(c, today))
    }

    /// Look a concept up by its exact code.
    pub fn find_by_code(&mut self, code: &str) -> Result<Concept> {
        self.reconcile();
        let today = self.clock.today();
        self.entries
            .values()
            .rev()
            .find(|c| c.code.as_str() == code)
            .map(|c| lifecycle::present(c, today))
            .ok_or_else(|| Error::not_found(code))
    }

    pub fn create(&mut self, payload: CreateConcept) -> Result<Concept> {
        self.reconcile();
        let today = self.clock.today();
        let now = self.clock.now();

        let name = required_name(&payload.name)?;
        let calculation_input = payload.calculation.unwrap_or_default();
        if let Some(amount) = calculation_input.base_amount {
            check_amount(amount)?;
        }
        let status = match payload.status {
            None => ConceptStatus::Active,
            Some(s) if s.is_storable() && s != ConceptStatus::Disabled => s,
            Some(other) => {
                return Err(Error::Validation(format!(
                    "initial status must be draft or active, got {}",
                    other
                )))
            }
        };
        let valid_from = payload.valid_from.unwrap_or(today);
        if let Some(valid_to) = payload.valid_to {
            if valid_to < valid_from {
                return Err(Error::Validation(format!(
                    "validTo {} precedes validFrom {}",
                    valid_to, valid_from
                )));
            }
        }

        let concept = Concept {
            id: ConceptId::new(),
            code: ConceptCode::or_generate(payload.code.as_deref()),
            name,
            description: payload
                .description
                .as_deref()
                .map(str::trim)
                .unwrap_or_default()
                .to_string(),
            concept_type: payload.concept_type.unwrap_or(crate::model::ConceptType::Fee),
            calculation: normalize_calculation(&calculation_input, &self.default_currency),
            periodicity: payload
                .periodicity
                .unwrap_or(crate::model::Periodicity::Monthly),
            scope: normalize_scope(&payload.scope.unwrap_or_default()),
            versioning: Versioning {
                current: VersionWindow {
                    valid_from,
                    valid_to: payload.valid_to,
                },
                next: None,
            },
            status,
            audit: Audit::fresh(now, &self.actor),
        };

        info!(id = %concept.id, code = %concept.code, status = %concept.status, "created concept");
        let out = lifecycle::present(&concept, today);
        self.insert(concept);
        Ok(out)
    }

    pub fn update(&mut self, id: &ConceptId, payload: UpdateConcept) -> Result<Concept> {
        self.reconcile();
        let today = self.clock.today();
        let now = self.clock.now();
        let default_currency = self.default_currency.clone();
        let actor = self.actor.clone();

        let name = payload.name.as_deref().map(required_name).transpose()?;
        if let Some(amount) = payload.calculation.as_ref().and_then(|c| c.base_amount) {
            check_amount(amount)?;
        }

        let concept = self.entry_mut(id)?;
        if let Some(name) = name {
            concept.name = name;
        }
        if let Some(description) = payload.description {
            concept.description = description.trim().to_string();
        }
        if let Some(calculation) = &payload.calculation {
            concept.calculation = normalize_calculation(calculation, &default_currency);
        }
        if let Some(periodicity) = payload.periodicity {
            concept.periodicity = periodicity;
        }
        if let Some(scope) = &payload.scope {
            concept.scope = normalize_scope(scope);
        }
        concept.audit.touch(now, &actor);

        info!(id = %concept.id, code = %concept.code, "updated concept");
        Ok(lifecycle::present(concept, today))
    }

    /// Copy a concept into a new draft with a fresh version window.
    pub fn clone_concept(&mut self, id: &ConceptId) -> Result<Concept> {
        self.reconcile();
        let today = self.clock.today();
        let now = self.clock.now();

        let original = self.entry(id)?;
        let copy = Concept {
            id: ConceptId::new(),
            code: original.code.cloned(),
            name: format!("{}{}", original.name, CLONE_NAME_SUFFIX),
            status: ConceptStatus::Draft,
            versioning: Versioning {
                current: VersionWindow::starting(today),
                next: None,
            },
            audit: Audit::fresh(now, &self.actor),
            ..original.clone()
        };

        info!(source = %id, id = %copy.id, code = %copy.code, "cloned concept");
        let out = lifecycle::present(&copy, today);
        self.insert(copy);
        Ok(out)
    }

    /// Remove a draft concept.
    pub fn delete(&mut self, id: &ConceptId) -> Result<()> {
        self.reconcile();
        let today = self.clock.today();

        lifecycle::ensure_deletable(self.entry(id)?, today)?;
        if let Some(seq) = self.index.remove(id) {
            self.entries.remove(&seq);
        }
        info!(id = %id, "deleted concept");
        Ok(())
    }

    pub fn enable(&mut self, id: &ConceptId) -> Result<Concept> {
        self.apply_action(id, LifecycleAction::Enable)
    }

    /// Disable a concept. A pending version, if any, is cancelled.
    pub fn disable(&mut self, id: &ConceptId) -> Result<Concept> {
        self.apply_action(id, LifecycleAction::Disable)
    }

    /// Set `versioning.next`, replacing any earlier pending version.
    ///
    /// The current window is left as is; promotion happens on a later
    /// operation once `valid_from` has arrived.
    pub fn schedule_version(&mut self, id: &ConceptId, payload: ScheduleVersion) -> Result<Concept> {
        self.reconcile();
        let today = self.clock.today();
        let now = self.clock.now();
        let actor = self.actor.clone();

        if let Some(amount) = payload.base_amount {
            check_amount(amount)?;
        }
        let concept = self.entry_mut(id)?;
        let valid_from = lifecycle::check_schedule(concept, payload.valid_from)?;

        let next = PendingVersion {
            valid_from,
            base_amount: payload
                .base_amount
                .unwrap_or(concept.calculation.base_amount),
            formula: payload
                .formula
                .or_else(|| concept.calculation.formula.clone()),
        };
        info!(
            id = %concept.id,
            code = %concept.code,
            valid_from = %next.valid_from,
            base_amount = %next.base_amount,
            "scheduled version"
        );
        concept.versioning.next = Some(next);
        concept.audit.touch(now, &actor);
        Ok(lifecycle::present(concept, today))
    }

    fn apply_action(&mut self, id: &ConceptId, action: LifecycleAction) -> Result<Concept> {
        self.reconcile();
        let today = self.clock.today();
        let now = self.clock.now();
        let actor = self.actor.clone();

        let concept = self.entry_mut(id)?;
        let target = lifecycle::check_transition(concept, action, today)?;
        if !target.is_storable() {
            return Err(Error::InvalidState(format!(
                "{} cannot be stored as {}",
                concept.code, target
            )));
        }
        if action == LifecycleAction::Disable {
            if let Some(pending) = concept.versioning.next.take() {
                info!(
                    id = %concept.id,
                    valid_from = %pending.valid_from,
                    "cancelled pending version on disable"
                );
            }
        }
        concept.status = target;
        concept.audit.touch(now, &actor);

        info!(id = %concept.id, code = %concept.code, action = action.verb(), "changed concept status");
        Ok(lifecycle::present(concept, today))
    }

    fn insert(&mut self, concept: Concept) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.index.insert(concept.id.clone(), seq);
        self.entries.insert(seq, concept);
    }

    fn entry(&self, id: &ConceptId) -> Result<&Concept> {
        self.index
            .get(id)
            .and_then(|seq| self.entries.get(seq))
            .ok_or_else(|| Error::not_found(id))
    }

    fn entry_mut(&mut self, id: &ConceptId) -> Result<&mut Concept> {
        match self.index.get(id) {
            Some(seq) => self.entries.get_mut(seq).ok_or_else(|| Error::not_found(id)),
            None => Err(Error::not_found(id)),
        }
    }
}

fn required_name(raw: &str) -> Result<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(Error::Validation("name is required".to_string()));
    }
    Ok(name.to_string())
}

fn check_amount(amount: Decimal) -> Result<()> {
    if amount < Decimal::ZERO {
        return Err(Error::Validation(format!(
            "baseAmount must not be negative, got {}",
            amount
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::model::{AppliesTo, CalculationMethod};
    use crate::normalize::{CalculationInput, ScopeInput};
    use chrono::{Duration, NaiveDate};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn repo_at(today: NaiveDate) -> (ConceptRepository, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::at_date(today));
        let repo = ConceptRepository::new(&Settings::for_tests(), clock.clone());
        (repo, clock)
    }

    fn seeded_at(today: NaiveDate) -> (ConceptRepository, Arc<ManualClock>) {
        let (mut repo, clock) = repo_at(today);
        repo.seed(seed::demo_concepts());
        (repo, clock)
    }

    fn fee(name: &str, amount: i64) -> CreateConcept {
        CreateConcept {
            calculation: Some(CalculationInput::fixed(Decimal::from(amount))),
            ..CreateConcept::named(name)
        }
    }

    #[test]
    fn test_create_fills_defaults() {
        let (mut repo, _) = repo_at(date(2025, 6, 1));
        let c = repo.create(CreateConcept::named("Cuota X")).unwrap();

        assert!(!c.id.as_str().is_empty());
        assert!(c.code.is_generated());
        assert_eq!(c.status, ConceptStatus::Active);
        assert_eq!(c.concept_type, crate::model::ConceptType::Fee);
        assert_eq!(c.periodicity, crate::model::Periodicity::Monthly);
        assert_eq!(c.calculation.method, CalculationMethod::Fixed);
        assert_eq!(c.calculation.base_amount, Decimal::ZERO);
        assert_eq!(c.calculation.currency, "BOB");
        assert_eq!(c.scope.applies_to, AppliesTo::All);
        assert_eq!(c.versioning.current.valid_from, date(2025, 6, 1));
        assert_eq!(c.audit.created_at, c.audit.updated_at);
        assert_eq!(c.audit.created_by_name, "Admin");
    }

    #[test]
    fn test_create_rejects_bad_input_without_writing() {
        let (mut repo, _) = repo_at(date(2025, 6, 1));

        let err = repo.create(CreateConcept::named("  ")).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let err = repo.create(fee("Negativa", -1)).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let payload = CreateConcept {
            status: Some(ConceptStatus::Expired),
            ..CreateConcept::named("Vencida")
        };
        assert!(matches!(repo.create(payload), Err(Error::Validation(_))));

        let payload = CreateConcept {
            valid_from: Some(date(2025, 6, 10)),
            valid_to: Some(date(2025, 6, 9)),
            ..CreateConcept::named("Ventana")
        };
        assert!(matches!(repo.create(payload), Err(Error::Validation(_))));

        assert!(repo.is_empty());
    }

    #[test]
    fn test_newest_first_listing() {
        let (mut repo, _) = seeded_at(date(2025, 6, 1));
        let created = repo.create(fee("Cuota X", 100)).unwrap();

        let page = repo.list(&ListQuery::default()).unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(page.items[0].id, created.id);
        assert_eq!(page.items[1].code.as_str(), "FEE-MANT");
        assert_eq!(page.items[4].code.as_str(), "FINE-RUIDO");
    }

    #[test]
    fn test_list_rejects_zero_page_size() {
        let (mut repo, _) = seeded_at(date(2025, 6, 1));
        let query = ListQuery {
            page_size: 0,
            ..ListQuery::default()
        };
        assert!(matches!(repo.list(&query), Err(Error::Validation(_))));
    }

    #[test]
    fn test_update_overwrites_only_supplied_fields() {
        let (mut repo, clock) = repo_at(date(2025, 6, 1));
        let c = repo.create(fee("Cuota X", 100)).unwrap();
        clock.advance(Duration::hours(2));

        let updated = repo
            .update(
                &c.id,
                UpdateConcept {
                    description: Some("Nueva descripción".to_string()),
                    scope: Some(ScopeInput::targeting(
                        AppliesTo::Blocks,
                        vec!["Torre C".to_string()],
                    )),
                    ..UpdateConcept::default()
                },
            )
            .unwrap();

        assert_eq!(updated.name, "Cuota X");
        assert_eq!(updated.description, "Nueva descripción");
        assert_eq!(updated.calculation, c.calculation);
        assert_eq!(updated.scope.applies_to, AppliesTo::Blocks);
        assert_eq!(updated.code, c.code);
        assert!(updated.audit.updated_at > c.audit.updated_at);
        assert_eq!(updated.audit.created_at, c.audit.created_at);
    }

    #[test]
    fn test_update_unknown_id() {
        let (mut repo, _) = repo_at(date(2025, 6, 1));
        let err = repo
            .update(&ConceptId::from("missing"), UpdateConcept::default())
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[test]
    fn test_clone_is_independent_draft() {
        let (mut repo, _) = seeded_at(date(2025, 6, 1));
        let agua = repo.find_by_code("FEE-AGUA").unwrap();
        repo.schedule_version(&agua.id, ScheduleVersion::at(date(2025, 9, 1), Decimal::from(18)))
            .unwrap();

        let copy = repo.clone_concept(&agua.id).unwrap();
        assert_ne!(copy.id, agua.id);
        assert_eq!(copy.status, ConceptStatus::Draft);
        assert_eq!(copy.code.as_str(), "FEE-AGUA-CLONE");
        assert_eq!(copy.name, "Agua (Copia)");
        assert!(copy.versioning.next.is_none());
        assert_eq!(copy.versioning.current.valid_from, date(2025, 6, 1));
        assert_eq!(copy.calculation, agua.calculation);
        assert_eq!(copy.scope, agua.scope);

        repo.update(
            &copy.id,
            UpdateConcept {
                scope: Some(ScopeInput::default()),
                ..UpdateConcept::default()
            },
        )
        .unwrap();
        assert_eq!(repo.get(&agua.id).unwrap().scope, agua.scope);
    }

    #[test]
    fn test_delete_only_drafts() {
        let (mut repo, _) = seeded_at(date(2025, 6, 1));
        let mant = repo.find_by_code("FEE-MANT").unwrap();
        assert!(matches!(repo.delete(&mant.id), Err(Error::InvalidState(_))));

        let draft = repo.clone_concept(&mant.id).unwrap();
        repo.delete(&draft.id).unwrap();
        assert!(matches!(repo.get(&draft.id), Err(Error::NotFound { .. })));
        assert_eq!(repo.len(), 4);
        assert!(matches!(repo.delete(&draft.id), Err(Error::NotFound { .. })));
    }

    #[test]
    fn test_enable_disable_follow_state_machine() {
        let (mut repo, _) = repo_at(date(2025, 6, 1));
        let draft = repo
            .create(CreateConcept {
                status: Some(ConceptStatus::Draft),
                ..CreateConcept::named("Borrador")
            })
            .unwrap();
        assert_eq!(draft.status, ConceptStatus::Draft);

        assert!(matches!(
            repo.disable(&draft.id),
            Err(Error::InvalidTransition { .. })
        ));
        assert_eq!(repo.enable(&draft.id).unwrap().status, ConceptStatus::Active);
        assert!(matches!(
            repo.enable(&draft.id),
            Err(Error::InvalidTransition { .. })
        ));
        assert_eq!(repo.disable(&draft.id).unwrap().status, ConceptStatus::Disabled);
        assert_eq!(repo.enable(&draft.id).unwrap().status, ConceptStatus::Active);
    }

    #[test]
    fn test_schedule_version_validation() {
        let (mut repo, _) = seeded_at(date(2025, 6, 1));
        let mant = repo.find_by_code("FEE-MANT").unwrap();

        let missing = repo.schedule_version(&mant.id, ScheduleVersion::default());
        assert!(matches!(missing, Err(Error::Validation(_))));

        let same_day = ScheduleVersion::at(date(2025, 1, 1), Decimal::from(130));
        assert!(matches!(
            repo.schedule_version(&mant.id, same_day),
            Err(Error::Validation(_))
        ));

        let negative = ScheduleVersion::at(date(2025, 7, 1), Decimal::from(-5));
        assert!(matches!(
            repo.schedule_version(&mant.id, negative),
            Err(Error::Validation(_))
        ));
        assert!(repo.get(&mant.id).unwrap().versioning.next.is_none());
    }

    #[test]
    fn test_schedule_defaults_to_current_values() {
        let (mut repo, _) = seeded_at(date(2025, 6, 1));
        let mant = repo.find_by_code("FEE-MANT").unwrap();
        let scheduled = repo
            .schedule_version(
                &mant.id,
                ScheduleVersion {
                    valid_from: Some(date(2025, 7, 1)),
                    ..ScheduleVersion::default()
                },
            )
            .unwrap();

        let next = scheduled.versioning.next.as_ref().unwrap();
        assert_eq!(next.base_amount, Decimal::from(120));
        assert_eq!(next.formula, None);
        assert_eq!(scheduled.versioning.current, mant.versioning.current);
        assert_eq!(scheduled.status, ConceptStatus::Scheduled);
    }

    #[test]
    fn test_scheduled_version_promotes_on_read() {
        let (mut repo, clock) = seeded_at(date(2025, 6, 1));
        let mant = repo.find_by_code("FEE-MANT").unwrap();
        repo.schedule_version(&mant.id, ScheduleVersion::at(date(2025, 7, 1), Decimal::from(150)))
            .unwrap();

        let filter = ListQuery {
            filter: crate::query::ConceptFilter {
                status: Some(ConceptStatus::Scheduled),
                ..Default::default()
            },
            ..ListQuery::default()
        };
        assert_eq!(repo.list(&filter).unwrap().total, 1);

        clock.set(
            date(2025, 7, 1)
                .and_hms_opt(0, 0, 1)
                .unwrap()
                .and_utc(),
        );
        assert_eq!(repo.list(&filter).unwrap().total, 0);

        let promoted = repo.get(&mant.id).unwrap();
        assert_eq!(promoted.status, ConceptStatus::Active);
        assert!(promoted.versioning.next.is_none());
        assert_eq!(promoted.versioning.current.valid_from, date(2025, 7, 1));
        assert_eq!(promoted.calculation.base_amount, Decimal::from(150));
    }

    #[test]
    fn test_disable_cancels_pending_version() {
        let (mut repo, _) = seeded_at(date(2025, 6, 1));
        let seg = repo.find_by_code("FEE-SEG").unwrap();
        repo.schedule_version(&seg.id, ScheduleVersion::at(date(2025, 8, 1), Decimal::from(40)))
            .unwrap();

        let disabled = repo.disable(&seg.id).unwrap();
        assert_eq!(disabled.status, ConceptStatus::Disabled);
        assert!(disabled.versioning.next.is_none());
    }

    #[test]
    fn test_disabled_concept_accepts_schedule() {
        let (mut repo, _) = seeded_at(date(2025, 6, 1));
        let seg = repo.find_by_code("FEE-SEG").unwrap();
        repo.disable(&seg.id).unwrap();

        let missing = repo.schedule_version(&seg.id, ScheduleVersion::default());
        assert!(matches!(missing, Err(Error::Validation(_))));

        let scheduled = repo
            .schedule_version(&seg.id, ScheduleVersion::at(date(2025, 9, 1), Decimal::from(40)))
            .unwrap();
        assert_eq!(scheduled.status, ConceptStatus::Disabled);
        assert_eq!(
            scheduled.versioning.next.as_ref().unwrap().base_amount,
            Decimal::from(40)
        );

        let enabled = repo.enable(&seg.id).unwrap();
        assert_eq!(enabled.status, ConceptStatus::Scheduled);
    }

    #[test]
    fn test_expired_concept_cannot_be_disabled() {
        let (mut repo, clock) = repo_at(date(2025, 6, 1));
        let c = repo
            .create(CreateConcept {
                valid_to: Some(date(2025, 6, 30)),
                ..CreateConcept::named("Temporal")
            })
            .unwrap();
        clock.advance(Duration::days(45));

        assert_eq!(repo.get(&c.id).unwrap().status, ConceptStatus::Expired);
        assert!(matches!(
            repo.disable(&c.id),
            Err(Error::InvalidTransition { .. })
        ));
    }
}
