//! Client-side search for the searchable single-selects.

use crate::catalog::{AccountType, Enseigne};

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

/// Institutions whose name or parent category name contains `query`
/// (case-insensitive). An empty query matches everything.
pub fn filter_enseignes<'a>(enseignes: &'a [Enseigne], query: &str) -> Vec<&'a Enseigne> {
    let needle = query.trim().to_lowercase();
    enseignes
        .iter()
        .filter(|e| {
            needle.is_empty()
                || contains_ignore_case(&e.name, &needle)
                || e.category_name()
                    .map(|c| contains_ignore_case(c, &needle))
                    .unwrap_or(false)
        })
        .collect()
}

/// Account types whose name contains `query` (case-insensitive).
pub fn filter_account_types<'a>(types: &'a [AccountType], query: &str) -> Vec<&'a AccountType> {
    let needle = query.trim().to_lowercase();
    types
        .iter()
        .filter(|t| needle.is_empty() || contains_ignore_case(&t.name, &needle))
        .collect()
}
