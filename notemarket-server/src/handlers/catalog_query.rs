//! Query-string form of a [`FilterSelection`].
//!
//! `university`, `course` and `tag` may repeat and may hold comma-separated
//! lists. Everything else takes a single value; the last one wins.
//! `limit` caps how many matching documents are returned and is parsed
//! separately, since it is not part of the selection.

use std::str::FromStr;

use notemarket_core::FilterSelection;
use notemarket_model::SortKey;

use crate::infra::errors::AppError;

pub fn parse_selection(pairs: &[(String, String)]) -> Result<FilterSelection, AppError> {
    let mut selection = FilterSelection::default();
    for (key, value) in pairs {
        match key.as_str() {
            "university" => extend_list(&mut selection.universities, value),
            "course" => extend_list(&mut selection.courses, value),
            "tag" => extend_list(&mut selection.tags, value),
            "min_pages" => selection.pages.min = parse_optional(key, value)?,
            "max_pages" => selection.pages.max = parse_optional(key, value)?,
            "min_price" => selection.price.min = parse_price(key, value)?,
            "max_price" => selection.price.max = parse_price(key, value)?,
            "year" => selection.year = parse_optional(key, value)?,
            "q" => selection.search = Some(value.clone()),
            "sort" => {
                selection.sort = SortKey::from_str(value)
                    .map_err(|e| AppError::bad_request(e.to_string()))?;
            }
            _ => {}
        }
    }
    Ok(selection.normalized())
}

/// Optional positive `limit`, for short listings such as the newest few.
pub fn parse_limit(pairs: &[(String, String)]) -> Result<Option<usize>, AppError> {
    let mut limit = None;
    for (key, value) in pairs.iter().filter(|(k, _)| k == "limit") {
        limit = parse_optional::<usize>(key, value)?;
    }
    match limit {
        Some(0) => Err(AppError::bad_request("limit must be at least 1")),
        other => Ok(other),
    }
}

fn extend_list(target: &mut std::collections::BTreeSet<String>, value: &str) {
    target.extend(value.split(',').map(|v| v.trim().to_string()));
}

fn parse_optional<T: FromStr>(key: &str, value: &str) -> Result<Option<T>, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse()
        .map(Some)
        .map_err(|_| AppError::bad_request(format!("invalid value for {key}: {value:?}")))
}

fn parse_price(key: &str, value: &str) -> Result<Option<f64>, AppError> {
    match parse_optional::<f64>(key, &value.replace(',', "."))? {
        Some(price) if !price.is_finite() || price < 0.0 => Err(AppError::bad_request(format!(
            "{key} must be a non-negative number"
        ))),
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn repeated_and_comma_separated_lists_merge() {
        let selection = parse_selection(&pairs(&[
            ("university", "UiO,NTNU"),
            ("university", "UiB"),
            ("course", "inf1000"),
            ("tag", "eksamen, , notater"),
        ]))
        .unwrap();
        assert_eq!(
            selection.universities.iter().collect::<Vec<_>>(),
            ["NTNU", "UiB", "UiO"]
        );
        assert!(selection.courses.contains("INF1000"));
        assert_eq!(selection.tags.len(), 2);
    }

    #[test]
    fn ranges_year_search_and_sort() {
        let selection = parse_selection(&pairs(&[
            ("min_pages", "5"),
            ("max_pages", ""),
            ("min_price", "49,5"),
            ("year", "2024"),
            ("q", "  lineær algebra "),
            ("sort", "price-high"),
        ]))
        .unwrap();
        assert_eq!(selection.pages.min, Some(5));
        assert_eq!(selection.pages.max, None);
        assert_eq!(selection.price.min, Some(49.5));
        assert_eq!(selection.year, Some(2024));
        assert_eq!(selection.search.as_deref(), Some("lineær algebra"));
        assert_eq!(selection.sort, SortKey::PriceHigh);
    }

    #[test]
    fn empty_query_is_an_empty_selection() {
        let selection = parse_selection(&[]).unwrap();
        assert!(selection.is_empty());
        assert_eq!(selection.sort, SortKey::Newest);
    }

    #[test]
    fn malformed_values_are_rejected() {
        assert!(parse_selection(&pairs(&[("min_pages", "many")])).is_err());
        assert!(parse_selection(&pairs(&[("min_price", "-10")])).is_err());
        assert!(parse_selection(&pairs(&[("sort", "cheapest")])).is_err());
    }

    #[test]
    fn limit_is_optional_and_positive() {
        assert_eq!(parse_limit(&[]).unwrap(), None);
        assert_eq!(parse_limit(&pairs(&[("limit", "4")])).unwrap(), Some(4));
        assert!(parse_limit(&pairs(&[("limit", "0")])).is_err());
        assert!(parse_limit(&pairs(&[("limit", "fire")])).is_err());
        assert!(parse_selection(&pairs(&[("limit", "4")])).unwrap().is_empty());
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let selection = parse_selection(&pairs(&[("page", "2")])).unwrap();
        assert!(selection.is_empty());
    }
}
