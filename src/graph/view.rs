use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::registry::{EntityRegistry, RelationshipRegistry};
use super::types::{Category, Entity, EntityId, Relationship};

/// Which relationship categories are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn matches(self, category: Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(only) => only == category,
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(CategoryFilter::All);
        }
        Category::parse(s).map(CategoryFilter::Only).ok_or_else(|| {
            format!("unknown category '{s}' (use all, blood, marriage, friendship or community)")
        })
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => f.write_str("all"),
            CategoryFilter::Only(category) => write!(f, "{category}"),
        }
    }
}

/// Selection, hover, filter and search for one graph view. Owned by whoever
/// composes the view; renderers only read it.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub selected: Option<EntityId>,
    pub hovered: Option<EntityId>,
    pub filter: CategoryFilter,
    pub search: String,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select `id`, replacing any previous selection. Selecting the
    /// already-selected entity clears the selection.
    pub fn select(&mut self, id: &EntityId) {
        if self.selected.as_ref() == Some(id) {
            self.selected = None;
        } else {
            self.selected = Some(id.clone());
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn set_hovered(&mut self, id: Option<&EntityId>) {
        self.hovered = id.cloned();
    }

    pub fn set_filter(&mut self, filter: CategoryFilter) {
        self.filter = filter;
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
    }

    pub fn is_selected(&self, id: &EntityId) -> bool {
        self.selected.as_ref() == Some(id)
    }

    pub fn is_hovered(&self, id: &EntityId) -> bool {
        self.hovered.as_ref() == Some(id)
    }

    fn search_term(&self) -> Option<String> {
        let term = self.search.trim();
        (!term.is_empty()).then(|| term.to_lowercase())
    }

    /// Entities drawn emphasised: the selection, the hovered entity and
    /// everything related to the selection.
    pub fn highlighted<'a>(
        &self,
        relationships: impl IntoIterator<Item = &'a Relationship>,
    ) -> HashSet<EntityId> {
        let mut ids: HashSet<EntityId> = self.hovered.iter().cloned().collect();
        if let Some(selected) = &self.selected {
            ids.insert(selected.clone());
            ids.extend(related(relationships, selected).into_iter().cloned());
        }
        ids
    }
}

/// Ids on the other end of every relationship touching `id`.
pub fn related<'a>(
    relationships: impl IntoIterator<Item = &'a Relationship>,
    id: &EntityId,
) -> Vec<&'a EntityId> {
    relationships
        .into_iter()
        .filter_map(|r| r.other_end(id))
        .collect()
}

/// The subset of both registries a view currently shows.
#[derive(Debug, Clone, Default)]
pub struct FilteredView<'a> {
    pub entities: Vec<&'a Entity>,
    pub relationships: Vec<&'a Relationship>,
}

/// Apply the category filter and search term.
///
/// The search matches name or city, case-insensitively. While searching, a
/// relationship is kept only when both of its endpoints matched.
pub fn filter_view<'a>(
    entities: &'a EntityRegistry,
    relationships: &'a RelationshipRegistry,
    view: &ViewState,
) -> FilteredView<'a> {
    let term = view.search_term();
    let entities: Vec<&Entity> = entities
        .iter()
        .filter(|e| match &term {
            Some(term) => {
                e.name.to_lowercase().contains(term)
                    || e.location.city.to_lowercase().contains(term)
            }
            None => true,
        })
        .collect();

    let matched: Option<HashSet<&EntityId>> =
        term.as_ref().map(|_| entities.iter().map(|e| &e.id).collect());

    let relationships = relationships
        .iter()
        .filter(|r| view.filter.matches(r.category))
        .filter(|r| match &matched {
            Some(ids) => ids.contains(&r.from) && ids.contains(&r.to),
            None => true,
        })
        .collect();

    FilteredView {
        entities,
        relationships,
    }
}

/// Summary numbers for a network.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkStats {
    pub total_families: usize,
    pub total_connections: usize,
    /// Connections per family, counting each connection at both ends.
    pub average_connections: f64,
    /// Rounded share of verified connections.
    pub verified_percentage: u32,
}

impl NetworkStats {
    pub fn compute(entities: &EntityRegistry, relationships: &RelationshipRegistry) -> Self {
        Self::from_parts(entities.len(), relationships.as_slice())
    }

    pub fn from_parts(total_families: usize, relationships: &[Relationship]) -> Self {
        let total_connections = relationships.len();
        let average_connections = if total_connections == 0 || total_families == 0 {
            0.0
        } else {
            (total_connections * 2) as f64 / total_families as f64
        };
        let verified_percentage = if total_connections == 0 {
            0
        } else {
            let verified = relationships.iter().filter(|r| r.verified).count();
            (verified as f64 * 100.0 / total_connections as f64).round() as u32
        };

        Self {
            total_families,
            total_connections,
            average_connections,
            verified_percentage,
        }
    }
}
