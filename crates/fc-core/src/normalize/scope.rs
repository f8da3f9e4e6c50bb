//! Scope normalizer.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::model::{AppliesTo, Scope};

/// Scope as submitted by an editor. `applies_to` is a raw string so that an
/// unrecognised target degrades to [`AppliesTo::All`] instead of failing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScopeInput {
    pub applies_to: Option<String>,
    pub blocks: BTreeSet<String>,
    pub property_types: BTreeSet<String>,
    pub infractions: BTreeSet<String>,
    pub selection_ids: BTreeSet<String>,
}

impl ScopeInput {
    pub fn targeting(applies_to: AppliesTo, items: impl IntoIterator<Item = String>) -> Self {
        let items: BTreeSet<String> = items.into_iter().collect();
        let mut input = Self {
            applies_to: Some(applies_to.as_str().to_string()),
            ..Self::default()
        };
        match applies_to {
            AppliesTo::All => {}
            AppliesTo::Blocks => input.blocks = items,
            AppliesTo::PropertyTypes => input.property_types = items,
            AppliesTo::Infractions => input.infractions = items,
            AppliesTo::Selection => input.selection_ids = items,
        }
        input
    }
}

/// Keep only the set matching the target; the other three come back empty.
pub fn normalize_scope(input: &ScopeInput) -> Scope {
    let applies_to = input
        .applies_to
        .as_deref()
        .map(AppliesTo::parse_or_all)
        .unwrap_or_default();

    let mut scope = Scope {
        applies_to,
        ..Scope::default()
    };
    match applies_to {
        AppliesTo::All => {}
        AppliesTo::Blocks => scope.blocks = clean(&input.blocks),
        AppliesTo::PropertyTypes => scope.property_types = clean(&input.property_types),
        AppliesTo::Infractions => scope.infractions = clean(&input.infractions),
        AppliesTo::Selection => scope.selection_ids = clean(&input.selection_ids),
    }
    scope
}

/// Split comma-separated operator input ("Torre A, Torre B") into a set.
pub fn parse_list(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn clean(items: &BTreeSet<String>) -> BTreeSet<String> {
    items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
