use std::cmp::Ordering;

use notemarket_model::{Document, SortKey};

/// Compare two documents for the given sort key. Equal keys compare equal so a
/// stable sort keeps their input order.
pub fn compare_documents(a: &Document, b: &Document, key: SortKey) -> Ordering {
    match key {
        SortKey::Newest => b.created_at.cmp(&a.created_at),
        SortKey::Oldest => a.created_at.cmp(&b.created_at),
        SortKey::PriceLow => a.price.total_cmp(&b.price),
        SortKey::PriceHigh => b.price.total_cmp(&a.price),
    }
}

/// Stable in-place sort.
pub fn sort_documents(items: &mut [Document], key: SortKey) {
    items.sort_by(|a, b| compare_documents(a, b, key));
}

/// Sorted copy; the input is left untouched.
pub fn sorted_documents(items: &[Document], key: SortKey) -> Vec<Document> {
    let mut out = items.to_vec();
    sort_documents(&mut out, key);
    out
}
