//! Consumer-side list state for an admin screen.
//!
//! The view keeps its own copy of the current page and never patches a
//! concept in place: results from the service replace local items
//! wholesale. Any change that affects what should be on screen (filters,
//! paging, a successful mutation) marks the view dirty; a later
//! [`ConceptListView::refresh_if_dirty`] performs one coalesced reload.
//!
//! Only one listing request runs at a time. A `fetch_list` issued while
//! another is outstanding returns `Ok(false)` without touching the service.

use std::future::Future;
use std::sync::Arc;

use fc_common::{ConceptId, Result};
use tokio::sync::Mutex;
use tracing::debug;

use crate::model::Concept;
use crate::payload::{CreateConcept, ScheduleVersion, UpdateConcept};
use crate::query::{ConceptFilter, ListQuery};
use crate::service::ConceptService;

/// What the screen renders.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewSnapshot {
    pub items: Vec<Concept>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub filter: ConceptFilter,
    pub loading: bool,
    /// Message of the last failed operation, verbatim.
    pub error: Option<String>,
    pub dirty: bool,
}

struct ViewState {
    view: ViewSnapshot,
    /// Bumped on every invalidation; a listing that started under an older
    /// generation leaves the view dirty when it lands.
    generation: u64,
}

impl ViewState {
    fn invalidate(&mut self) {
        self.view.dirty = true;
        self.generation += 1;
    }
}

pub struct ConceptListView {
    service: Arc<ConceptService>,
    state: Mutex<ViewState>,
}

impl ConceptListView {
    pub fn new(service: Arc<ConceptService>, page_size: usize) -> Self {
        Self {
            service,
            state: Mutex::new(ViewState {
                view: ViewSnapshot {
                    items: Vec::new(),
                    total: 0,
                    page: 1,
                    page_size: page_size.max(1),
                    filter: ConceptFilter::default(),
                    loading: false,
                    error: None,
                    dirty: true,
                },
                generation: 0,
            }),
        }
    }

    pub async fn snapshot(&self) -> ViewSnapshot {
        self.state.lock().await.view.clone()
    }

    /// Edit the filter; returns to page 1.
    pub async fn set_filter<F>(&self, edit: F)
    where
        F: FnOnce(&mut ConceptFilter),
    {
        let mut state = self.state.lock().await;
        edit(&mut state.view.filter);
        state.view.page = 1;
        state.invalidate();
    }

    pub async fn reset_filters(&self) {
        self.set_filter(|f| *f = ConceptFilter::default()).await;
    }

    pub async fn set_page(&self, page: usize) {
        let mut state = self.state.lock().await;
        state.view.page = page.max(1);
        state.invalidate();
    }

    /// Change the page size; returns to page 1.
    pub async fn set_page_size(&self, page_size: usize) {
        let mut state = self.state.lock().await;
        state.view.page_size = page_size.max(1);
        state.view.page = 1;
        state.invalidate();
    }

    /// Force the next `refresh_if_dirty` to reload.
    pub async fn invalidate(&self) {
        self.state.lock().await.invalidate();
    }

    /// Load the current page. Returns `Ok(false)` when a listing is
    /// already in flight.
    pub async fn fetch_list(&self) -> Result<bool> {
        let (query, generation) = {
            let mut state = self.state.lock().await;
            if state.view.loading {
                debug!("listing already in flight; skipping fetch");
                return Ok(false);
            }
            state.view.loading = true;
            state.view.error = None;
            let query = ListQuery {
                filter: state.view.filter.clone(),
                page: state.view.page,
                page_size: state.view.page_size,
            };
            (query, state.generation)
        };

        let result = self.service.list(&query).await;

        let mut state = self.state.lock().await;
        state.view.loading = false;
        match result {
            Ok(page) => {
                state.view.items = page.items;
                state.view.total = page.total;
                state.view.dirty = state.generation != generation;
                Ok(true)
            }
            Err(e) => {
                state.view.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Reload once if anything invalidated the view since the last load.
    pub async fn refresh_if_dirty(&self) -> Result<bool> {
        if !self.state.lock().await.view.dirty {
            return Ok(false);
        }
        self.fetch_list().await
    }

    pub async fn create(&self, payload: CreateConcept) -> Result<Concept> {
        self.mutate(self.service.create(payload), |view, rec| {
            view.items.insert(0, rec.clone());
            view.total += 1;
        })
        .await
    }

    pub async fn update(&self, id: &ConceptId, payload: UpdateConcept) -> Result<Concept> {
        self.mutate(self.service.update(id, payload), replace_item).await
    }

    pub async fn schedule(&self, id: &ConceptId, payload: ScheduleVersion) -> Result<Concept> {
        self.mutate(self.service.schedule_version(id, payload), replace_item)
            .await
    }

    pub async fn enable(&self, id: &ConceptId) -> Result<Concept> {
        self.mutate(self.service.enable(id), replace_item).await
    }

    pub async fn disable(&self, id: &ConceptId) -> Result<Concept> {
        self.mutate(self.service.disable(id), replace_item).await
    }

    pub async fn clone_concept(&self, id: &ConceptId) -> Result<Concept> {
        self.mutate(self.service.clone_concept(id), |view, rec| {
            view.items.insert(0, rec.clone());
            view.total += 1;
        })
        .await
    }

    pub async fn remove(&self, id: &ConceptId) -> Result<()> {
        self.mutate(self.service.delete(id), |view, _| {
            let before = view.items.len();
            view.items.retain(|c| &c.id != id);
            if view.items.len() < before {
                view.total = view.total.saturating_sub(1);
            }
        })
        .await
    }

    async fn mutate<T, Fut, A>(&self, op: Fut, apply: A) -> Result<T>
    where
        Fut: Future<Output = Result<T>>,
        A: FnOnce(&mut ViewSnapshot, &T),
    {
        self.state.lock().await.view.error = None;
        let result = op.await;

        let mut state = self.state.lock().await;
        match &result {
            Ok(value) => {
                apply(&mut state.view, value);
                state.invalidate();
            }
            Err(e) => state.view.error = Some(e.to_string()),
        }
        result
    }
}

fn replace_item(view: &mut ViewSnapshot, rec: &Concept) {
    if let Some(slot) = view.items.iter_mut().find(|c| c.id == rec.id) {
        *slot = rec.clone();
    }
}
