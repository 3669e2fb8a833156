//! Immutable catalog state driven by a pure reducer.
//!
//! The browse page keeps a single [`CatalogState`]. Every user interaction is
//! expressed as a [`CatalogAction`]; `reduce` returns the next state and never
//! mutates the previous one. The loaded document list is shared behind an
//! `Arc`, so filter changes do not copy it.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use notemarket_model::{Bounds, Document, SortKey};
use serde::{Deserialize, Serialize};

use super::facets::{Facets, extract_facets};
use super::filtering::{FilterSelection, apply_selection};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogState {
    documents: Arc<Vec<Document>>,
    selection: FilterSelection,
    status: LoadStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CatalogAction {
    Loading,
    Loaded(Vec<Document>),
    LoadFailed(String),
    ToggleUniversity(String),
    ToggleCourse(String),
    ToggleTag(String),
    SetPageRange(Bounds<u32>),
    SetPriceRange(Bounds<f64>),
    SetYear(Option<i32>),
    SetSearch(Option<String>),
    SetSort(SortKey),
    /// Replace the whole selection, e.g. from query parameters.
    Select(FilterSelection),
    RemoveFilter(ActiveFilter),
    ClearFilters,
}

/// One removable chip in the active-filter summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ActiveFilter {
    University(String),
    Course(String),
    Tag(String),
    Pages(Bounds<u32>),
    Price(Bounds<f64>),
    Year(i32),
    Search(String),
}

impl ActiveFilter {
    pub fn label(&self) -> String {
        match self {
            ActiveFilter::University(u) => u.clone(),
            ActiveFilter::Course(c) => c.clone(),
            ActiveFilter::Tag(t) => format!("#{t}"),
            ActiveFilter::Pages(b) => format!("{} sider", range_label(b)),
            ActiveFilter::Price(b) => format!("{} kr", range_label(b)),
            ActiveFilter::Year(y) => y.to_string(),
            ActiveFilter::Search(q) => format!("\"{q}\""),
        }
    }
}

impl fmt::Display for ActiveFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

fn range_label<T: fmt::Display>(bounds: &Bounds<T>) -> String {
    match (&bounds.min, &bounds.max) {
        (Some(min), Some(max)) => format!("{min}-{max}"),
        (Some(min), None) => format!("{min}+"),
        (None, Some(max)) => format!("0-{max}"),
        (None, None) => String::new(),
    }
}

/// Everything the browse page renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogView {
    pub documents: Vec<Document>,
    pub facets: Facets,
    pub active_filters: Vec<ActiveFilter>,
    /// Number of loaded documents before filtering.
    pub total: usize,
    pub sort: SortKey,
    pub status: LoadStatus,
}

impl CatalogState {
    pub fn new(documents: Vec<Document>) -> Self {
        Self {
            documents: Arc::new(documents),
            selection: FilterSelection::default(),
            status: LoadStatus::Ready,
        }
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn selection(&self) -> &FilterSelection {
        &self.selection
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    #[must_use]
    pub fn reduce(&self, action: CatalogAction) -> CatalogState {
        let mut next = self.clone();
        match action {
            CatalogAction::Loading => next.status = LoadStatus::Loading,
            CatalogAction::Loaded(documents) => {
                next.documents = Arc::new(documents);
                next.status = LoadStatus::Ready;
            }
            // A failed refresh keeps whatever was loaded before.
            CatalogAction::LoadFailed(message) => {
                next.status = LoadStatus::Failed(message);
            }
            CatalogAction::ToggleUniversity(value) => {
                toggle(&mut next.selection.universities, value.trim().to_string());
            }
            CatalogAction::ToggleCourse(value) => {
                toggle(
                    &mut next.selection.courses,
                    notemarket_model::normalize_course_code(&value),
                );
            }
            CatalogAction::ToggleTag(value) => {
                toggle(&mut next.selection.tags, value.trim().to_string());
            }
            CatalogAction::SetPageRange(bounds) => next.selection.pages = bounds,
            CatalogAction::SetPriceRange(bounds) => next.selection.price = bounds,
            CatalogAction::SetYear(year) => next.selection.year = year,
            CatalogAction::SetSearch(search) => {
                next.selection.search = search;
                next.selection = next.selection.normalized();
            }
            CatalogAction::SetSort(sort) => next.selection.sort = sort,
            CatalogAction::Select(selection) => next.selection = selection.normalized(),
            CatalogAction::RemoveFilter(filter) => remove(&mut next.selection, &filter),
            CatalogAction::ClearFilters => {
                next.selection = FilterSelection {
                    sort: self.selection.sort,
                    ..FilterSelection::default()
                };
            }
        }
        next
    }

    pub fn active_filters(&self) -> Vec<ActiveFilter> {
        let s = &self.selection;
        let mut chips = Vec::new();
        chips.extend(s.universities.iter().cloned().map(ActiveFilter::University));
        chips.extend(s.courses.iter().cloned().map(ActiveFilter::Course));
        chips.extend(s.tags.iter().cloned().map(ActiveFilter::Tag));
        if !s.pages.is_unbounded() {
            chips.push(ActiveFilter::Pages(s.pages));
        }
        if !s.price.is_unbounded() {
            chips.push(ActiveFilter::Price(s.price));
        }
        if let Some(year) = s.year {
            chips.push(ActiveFilter::Year(year));
        }
        if let Some(search) = &s.search {
            chips.push(ActiveFilter::Search(search.clone()));
        }
        chips
    }

    /// Derive the rendered view. Facets come from the full loaded list so
    /// options do not disappear while filtering.
    pub fn view(&self) -> CatalogView {
        CatalogView {
            documents: apply_selection(&self.documents, &self.selection),
            facets: extract_facets(&self.documents),
            active_filters: self.active_filters(),
            total: self.documents.len(),
            sort: self.selection.sort,
            status: self.status.clone(),
        }
    }
}

fn toggle(set: &mut BTreeSet<String>, value: String) {
    if value.is_empty() {
        return;
    }
    if !set.remove(&value) {
        set.insert(value);
    }
}

fn remove(selection: &mut FilterSelection, filter: &ActiveFilter) {
    match filter {
        ActiveFilter::University(u) => {
            selection.universities.remove(u);
        }
        ActiveFilter::Course(c) => {
            selection.courses.remove(c);
        }
        ActiveFilter::Tag(t) => {
            selection.tags.remove(t);
        }
        ActiveFilter::Pages(_) => selection.pages = Bounds::unbounded(),
        ActiveFilter::Price(_) => selection.price = Bounds::unbounded(),
        ActiveFilter::Year(_) => selection.year = None,
        ActiveFilter::Search(_) => selection.search = None,
    }
}
