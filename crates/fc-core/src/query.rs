//! Filter, search and paginate over concept listings.

use chrono::Utc;
use fc_common::schema::SCHEMA_VERSION;
use serde::{Deserialize, Serialize};

use crate::model::{Concept, ConceptStatus, ConceptType, Periodicity};

/// Conjunctive listing filter. `None` (or an empty search) means no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConceptFilter {
    pub status: Option<ConceptStatus>,
    pub periodicity: Option<Periodicity>,
    pub concept_type: Option<ConceptType>,
    /// Case-insensitive substring matched against name, description and code.
    pub search: Option<String>,
}

impl ConceptFilter {
    pub fn search(query: impl Into<String>) -> Self {
        Self {
            search: Some(query.into()),
            ..Self::default()
        }
    }

    pub fn matches(&self, concept: &Concept) -> bool {
        if self.status.is_some_and(|s| s != concept.status) {
            return false;
        }
        if self.periodicity.is_some_and(|p| p != concept.periodicity) {
            return false;
        }
        if self.concept_type.is_some_and(|t| t != concept.concept_type) {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            Some(q) if !q.is_empty() => {
                let q = q.to_lowercase();
                [
                    concept.name.as_str(),
                    concept.description.as_str(),
                    concept.code.as_str(),
                ]
                .iter()
                .any(|field| field.to_lowercase().contains(&q))
            }
            _ => true,
        }
    }
}

/// Filter plus page coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListQuery {
    pub filter: ConceptFilter,
    /// 1-based.
    pub page: usize,
    pub page_size: usize,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            filter: ConceptFilter::default(),
            page: 1,
            page_size: fc_config::settings::DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of results. `total` counts every match, before pagination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptPage {
    pub items: Vec<Concept>,
    pub total: usize,
}

/// Keep the concepts matching `filter`, preserving order.
pub fn apply<'a, I>(items: I, filter: &ConceptFilter) -> Vec<Concept>
where
    I: IntoIterator<Item = &'a Concept>,
{
    items
        .into_iter()
        .filter(|c| filter.matches(c))
        .cloned()
        .collect()
}

/// Slice out a 1-based page. Page 0 is read as page 1; pages past the end
/// are empty but still report the full `total`.
pub fn paginate(items: Vec<Concept>, page: usize, page_size: usize) -> ConceptPage {
    let total = items.len();
    let start = page.max(1).saturating_sub(1).saturating_mul(page_size);
    let items = items.into_iter().skip(start).take(page_size).collect();
    ConceptPage { items, total }
}

/// Filter then paginate.
pub fn run<'a, I>(items: I, query: &ListQuery) -> ConceptPage
where
    I: IntoIterator<Item = &'a Concept>,
{
    paginate(apply(items, &query.filter), query.page, query.page_size)
}

/// Listing envelope for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    pub schema_version: String,
    pub generated_at: String,
    pub items: Vec<Concept>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
}

impl ListResponse {
    pub fn new(page: ConceptPage, query: &ListQuery) -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            generated_at: Utc::now().to_rfc3339(),
            items: page.items,
            total: page.total,
            page: query.page.max(1),
            page_size: query.page_size,
        }
    }
}
