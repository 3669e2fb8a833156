use std::collections::BTreeSet;

use notemarket_model::{Document, normalize_course_code};
use serde::{Deserialize, Serialize};

/// Distinct filterable values present in a document list, each sorted
/// lexicographically for stable rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facets {
    pub universities: Vec<String>,
    pub courses: Vec<String>,
    pub tags: Vec<String>,
}

impl Facets {
    pub fn is_empty(&self) -> bool {
        self.universities.is_empty() && self.courses.is_empty() && self.tags.is_empty()
    }
}

pub fn extract_facets(documents: &[Document]) -> Facets {
    let mut universities = BTreeSet::new();
    let mut courses = BTreeSet::new();
    let mut tags = BTreeSet::new();

    for doc in documents {
        if let Some(university) = non_blank(doc.university.as_deref()) {
            universities.insert(university.to_string());
        }
        if let Some(course) = non_blank(doc.course_code.as_deref()) {
            courses.insert(normalize_course_code(course));
        }
        tags.extend(
            doc.tags
                .iter()
                .filter_map(|t| non_blank(Some(t)))
                .map(str::to_string),
        );
    }

    Facets {
        universities: universities.into_iter().collect(),
        courses: courses.into_iter().collect(),
        tags: tags.into_iter().collect(),
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::test_support::doc;

    #[test]
    fn universities_are_sorted_and_deduplicated() {
        let docs = vec![
            doc("a", Some("UiO"), None, 0.0, None),
            doc("b", Some("UiB"), None, 0.0, None),
            doc("c", Some("UiO"), None, 0.0, None),
        ];
        assert_eq!(extract_facets(&docs).universities, vec!["UiB", "UiO"]);
    }

    #[test]
    fn courses_are_uppercased_and_blanks_skipped() {
        let mut blank = doc("d", Some(""), Some("  "), 0.0, None);
        blank.tags = ["".to_string(), "eksamen".to_string()].into();
        let mut other = doc("e", None, Some("inf1000"), 0.0, None);
        other.tags = ["notater".to_string(), "eksamen".to_string()].into();
        let docs = vec![blank, other, doc("f", None, Some("INF1000"), 0.0, None)];

        let facets = extract_facets(&docs);
        assert!(facets.universities.is_empty());
        assert_eq!(facets.courses, vec!["INF1000"]);
        assert_eq!(facets.tags, vec!["eksamen", "notater"]);
    }

    #[test]
    fn empty_input_yields_empty_facets() {
        assert!(extract_facets(&[]).is_empty());
    }
}
