use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Datelike, Utc};
use notemarket_model::{Document, DocumentId, normalize_course_code};
use serde::{Deserialize, Serialize};

const TOP_N: usize = 5;
const UNKNOWN: &str = "Ukjent";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelCount {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewedDocument {
    pub id: DocumentId,
    pub title: String,
    pub course_code: Option<String>,
    pub view_count: u64,
}

/// Aggregates shown on the statistics page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogStatistics {
    pub total_documents: usize,
    pub documents_this_month: usize,
    pub unique_courses: usize,
    pub unique_universities: usize,
    pub average_price: Option<f64>,
    pub top_courses: Vec<LabelCount>,
    pub top_courses_this_month: Vec<LabelCount>,
    pub top_universities: Vec<LabelCount>,
    pub most_viewed: Vec<ViewedDocument>,
}

impl CatalogStatistics {
    pub fn compute(documents: &[Document], now: DateTime<Utc>) -> Self {
        let this_month: Vec<&Document> = documents
            .iter()
            .filter(|d| {
                d.created_at.year() == now.year() && d.created_at.month() == now.month()
            })
            .collect();

        let unique_courses: BTreeSet<String> = documents
            .iter()
            .filter_map(course_label)
            .collect();
        let unique_universities: BTreeSet<&str> = documents
            .iter()
            .filter_map(|d| d.university.as_deref().map(str::trim))
            .filter(|u| !u.is_empty())
            .collect();

        let average_price = (!documents.is_empty()).then(|| {
            documents.iter().map(|d| d.price).sum::<f64>() / documents.len() as f64
        });

        let mut most_viewed: Vec<&Document> = documents.iter().collect();
        most_viewed.sort_by(|a, b| b.view_count.cmp(&a.view_count));

        Self {
            total_documents: documents.len(),
            documents_this_month: this_month.len(),
            unique_courses: unique_courses.len(),
            unique_universities: unique_universities.len(),
            average_price,
            top_courses: top_counts(documents.iter().map(course_or_unknown)),
            top_courses_this_month: top_counts(
                this_month.iter().map(|d| course_or_unknown(d)),
            ),
            top_universities: top_counts(documents.iter().map(|d| {
                d.university
                    .as_deref()
                    .map(str::trim)
                    .filter(|u| !u.is_empty())
                    .unwrap_or(UNKNOWN)
                    .to_string()
            })),
            most_viewed: most_viewed
                .into_iter()
                .take(TOP_N)
                .map(|d| ViewedDocument {
                    id: d.id,
                    title: d.title.clone(),
                    course_code: d.course_code.clone(),
                    view_count: d.view_count,
                })
                .collect(),
        }
    }
}

fn course_label(doc: &Document) -> Option<String> {
    doc.course_code
        .as_deref()
        .map(normalize_course_code)
        .filter(|c| !c.is_empty())
}

fn course_or_unknown(doc: &Document) -> String {
    course_label(doc).unwrap_or_else(|| UNKNOWN.to_string())
}

// Highest count first, ties by label.
fn top_counts(labels: impl Iterator<Item = String>) -> Vec<LabelCount> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for label in labels {
        *counts.entry(label).or_default() += 1;
    }
    let mut entries: Vec<LabelCount> = counts
        .into_iter()
        .map(|(label, count)| LabelCount { label, count })
        .collect();
    entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    entries.truncate(TOP_N);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::test_support::doc;
    use chrono::TimeZone;

    #[test]
    fn empty_catalog_has_no_average() {
        let stats = CatalogStatistics::compute(&[], Utc::now());
        assert_eq!(stats.total_documents, 0);
        assert_eq!(stats.average_price, None);
        assert!(stats.top_courses.is_empty());
    }

    #[test]
    fn counts_and_rankings() {
        let now = Utc.with_ymd_and_hms(2024, 10, 15, 12, 0, 0).unwrap();
        let mut docs = vec![
            doc("a", Some("UiO"), Some("inf1000"), 100.0, None),
            doc("b", Some("UiO"), Some("INF1000"), 200.0, None),
            doc("c", None, Some("MAT1100"), 300.0, None),
            doc("d", Some("NTNU"), None, 0.0, None),
        ];
        for (i, d) in docs.iter_mut().enumerate() {
            d.created_at = now;
            d.view_count = i as u64;
        }
        docs[3].created_at = Utc.with_ymd_and_hms(2024, 9, 30, 12, 0, 0).unwrap();

        let stats = CatalogStatistics::compute(&docs, now);
        assert_eq!(stats.total_documents, 4);
        assert_eq!(stats.documents_this_month, 3);
        assert_eq!(stats.unique_courses, 2);
        assert_eq!(stats.unique_universities, 2);
        assert_eq!(stats.average_price, Some(150.0));
        assert_eq!(
            stats.top_courses[0],
            LabelCount {
                label: "INF1000".into(),
                count: 2
            }
        );
        assert!(stats.top_courses_this_month.iter().all(|c| c.label != UNKNOWN));
        let universities: Vec<_> =
            stats.top_universities.iter().map(|u| u.label.as_str()).collect();
        assert_eq!(universities, vec!["UiO", "NTNU", "Ukjent"]);
        assert_eq!(stats.most_viewed[0].title, "d");
    }
}
