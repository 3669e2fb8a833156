//! Filter selection applied to the catalog.
//!
//! A document passes when every active facet accepts it. Facets with an empty
//! selection accept everything, including documents that lack the field. A
//! non-empty facet rejects documents that lack the field.

use std::collections::BTreeSet;

use notemarket_model::{Bounds, Document, SortKey, normalize_course_code};
use serde::{Deserialize, Serialize};

use super::sorting::sort_documents;

/// Transient UI filter state. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSelection {
    pub universities: BTreeSet<String>,
    pub courses: BTreeSet<String>,
    pub tags: BTreeSet<String>,
    pub pages: Bounds<u32>,
    pub price: Bounds<f64>,
    pub year: Option<i32>,
    pub search: Option<String>,
    pub sort: SortKey,
}

impl FilterSelection {
    /// Trim every value, drop blanks, upper-case course codes.
    pub fn normalized(mut self) -> Self {
        self.universities = clean_set(self.universities, |v| v.to_string());
        self.courses = clean_set(self.courses, normalize_course_code);
        self.tags = clean_set(self.tags, |v| v.to_string());
        self.search = self
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        self
    }

    /// True when no filter is active. The sort key does not count.
    pub fn is_empty(&self) -> bool {
        self.universities.is_empty()
            && self.courses.is_empty()
            && self.tags.is_empty()
            && self.pages.is_unbounded()
            && self.price.is_unbounded()
            && self.year.is_none()
            && self.search.is_none()
    }

    pub fn matches(&self, doc: &Document) -> bool {
        self.matches_university(doc)
            && self.matches_course(doc)
            && self.matches_tags(doc)
            && self.matches_pages(doc)
            && self.price.contains(doc.price)
            && self.year.is_none_or(|year| doc.created_year() == year)
            && self.matches_search(doc)
    }

    fn matches_university(&self, doc: &Document) -> bool {
        if self.universities.is_empty() {
            return true;
        }
        doc.university
            .as_deref()
            .is_some_and(|u| self.universities.contains(u.trim()))
    }

    fn matches_course(&self, doc: &Document) -> bool {
        if self.courses.is_empty() {
            return true;
        }
        doc.course_code
            .as_deref()
            .is_some_and(|c| self.courses.contains(&normalize_course_code(c)))
    }

    fn matches_tags(&self, doc: &Document) -> bool {
        self.tags.is_empty() || doc.tags.iter().any(|t| self.tags.contains(t.trim()))
    }

    // Unknown page counts only pass an open range.
    fn matches_pages(&self, doc: &Document) -> bool {
        if self.pages.is_unbounded() {
            return true;
        }
        doc.page_count.is_some_and(|p| self.pages.contains(p))
    }

    fn matches_search(&self, doc: &Document) -> bool {
        let Some(needle) = self.search.as_deref() else {
            return true;
        };
        let needle = needle.to_lowercase();
        let hit = |value: Option<&str>| {
            value.is_some_and(|v| v.to_lowercase().contains(&needle))
        };
        hit(Some(doc.title.as_str()))
            || hit(doc.course_code.as_deref())
            || hit(doc.university.as_deref())
            || hit(doc.description.as_deref())
    }
}

fn clean_set(
    values: BTreeSet<String>,
    normalize: impl Fn(&str) -> String,
) -> BTreeSet<String> {
    values
        .iter()
        .map(|v| normalize(v.trim()))
        .filter(|v| !v.is_empty())
        .collect()
}

/// Keep the documents accepted by `selection`, in input order.
pub fn filter_documents(documents: &[Document], selection: &FilterSelection) -> Vec<Document> {
    documents
        .iter()
        .filter(|doc| selection.matches(doc))
        .cloned()
        .collect()
}

/// Filter then stably sort by the selection's sort key. The input slice is
/// left untouched.
pub fn apply_selection(documents: &[Document], selection: &FilterSelection) -> Vec<Document> {
    let mut visible = filter_documents(documents, selection);
    sort_documents(&mut visible, selection.sort);
    visible
}
