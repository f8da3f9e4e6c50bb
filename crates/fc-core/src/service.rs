//! Async concept service with simulated round-trip latency.
//!
//! Each call first waits out the configured latency, then takes the
//! repository lock and runs the operation to completion. The lock is never
//! held across an await point, so an operation is either fully applied or
//! not at all from any observer's point of view.

use std::sync::Arc;
use std::time::Duration;

use fc_common::{ConceptId, Result};
use fc_config::Settings;
use tokio::sync::Mutex;
use tracing::warn;

use crate::clock::{Clock, SystemClock};
use crate::model::Concept;
use crate::payload::{CreateConcept, ScheduleVersion, UpdateConcept};
use crate::query::{ConceptPage, ListQuery};
use crate::repository::ConceptRepository;

pub struct ConceptService {
    repo: Mutex<ConceptRepository>,
    latency: Duration,
}

impl ConceptService {
    /// Service on the wall clock, seeded according to `settings`.
    pub fn new(settings: &Settings) -> Self {
        Self::with_clock(settings, Arc::new(SystemClock))
    }

    pub fn with_clock(settings: &Settings, clock: Arc<dyn Clock>) -> Self {
        Self::from_repository(
            ConceptRepository::from_settings(settings, clock),
            Duration::from_millis(settings.latency_ms),
        )
    }

    pub fn from_repository(repo: ConceptRepository, latency: Duration) -> Self {
        Self {
            repo: Mutex::new(repo),
            latency,
        }
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }

    async fn round_trip(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    pub async fn list(&self, query: &ListQuery) -> Result<ConceptPage> {
        self.round_trip().await;
        let result = self.repo.lock().await.list(query);
        logged("list", None, result)
    }

    pub async fn get(&self, id: &ConceptId) -> Result<Concept> {
        self.round_trip().await;
        let result = self.repo.lock().await.get(id);
        logged("get", Some(id), result)
    }

    pub async fn find_by_code(&self, code: &str) -> Result<Concept> {
        self.round_trip().await;
        let result = self.repo.lock().await.find_by_code(code);
        logged("find_by_code", None, result)
    }

    pub async fn create(&self, payload: CreateConcept) -> Result<Concept> {
        self.round_trip().await;
        let result = self.repo.lock().await.create(payload);
        logged("create", None, result)
    }

    pub async fn update(&self, id: &ConceptId, payload: UpdateConcept) -> Result<Concept> {
        self.round_trip().await;
        let result = self.repo.lock().await.update(id, payload);
        logged("update", Some(id), result)
    }

    pub async fn clone_concept(&self, id: &ConceptId) -> Result<Concept> {
        self.round_trip().await;
        let result = self.repo.lock().await.clone_concept(id);
        logged("clone", Some(id), result)
    }

    pub async fn delete(&self, id: &ConceptId) -> Result<()> {
        self.round_trip().await;
        let result = self.repo.lock().await.delete(id);
        logged("delete", Some(id), result)
    }

    pub async fn enable(&self, id: &ConceptId) -> Result<Concept> {
        self.round_trip().await;
        let result = self.repo.lock().await.enable(id);
        logged("enable", Some(id), result)
    }

    pub async fn disable(&self, id: &ConceptId) -> Result<Concept> {
        self.round_trip().await;
        let result = self.repo.lock().await.disable(id);
        logged("disable", Some(id), result)
    }

    pub async fn schedule_version(
        &self,
        id: &ConceptId,
        payload: ScheduleVersion,
    ) -> Result<Concept> {
        self.round_trip().await;
        let result = self.repo.lock().await.schedule_version(id, payload);
        logged("schedule_version", Some(id), result)
    }

    /// Promote due scheduled versions now. Suitable for a periodic task;
    /// every other operation also does this before it runs.
    pub async fn reconcile(&self) -> usize {
        self.repo.lock().await.reconcile()
    }
}

fn logged<T>(op: &'static str, id: Option<&ConceptId>, result: Result<T>) -> Result<T> {
    if let Err(e) = &result {
        match id {
            Some(id) => warn!(op, id = %id, kind = e.kind(), error = %e, "concept operation rejected"),
            None => warn!(op, kind = e.kind(), error = %e, "concept operation rejected"),
        }
    }
    result
}
