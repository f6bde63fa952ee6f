//! Tag redundancy resolution.
//!
//! When a technique carries both `…/property` and `…/property/completeness`,
//! only the more specific tag is worth displaying. [`resolve_most_specific`]
//! keeps the maximal elements of a tag set under the path-prefix order.
//!
//! Resolution never crosses category boundaries: callers apply it to one
//! dimension group, or to one flat category group, at a time. The check is
//! quadratic in the set size, which is fine for a single technique's tags.

use std::collections::{BTreeMap, HashSet};

use crate::tag::{is_descendant_of, tag_category};

/// Remove every tag that has a strict descendant in the same set.
///
/// Output keeps input order; exact duplicates collapse to their first
/// occurrence.
pub fn resolve_most_specific<S: AsRef<str>>(tags: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    let unique: Vec<&str> = tags
        .iter()
        .map(AsRef::as_ref)
        .filter(|t| seen.insert(*t))
        .collect();

    unique
        .iter()
        .filter(|tag| !unique.iter().any(|other| is_descendant_of(other, tag)))
        .map(|tag| tag.to_string())
        .collect()
}

/// Group tags by category, resolving redundancy within each category.
///
/// Categories iterate in lexicographic order.
pub fn group_flat_by_category<S: AsRef<str>>(tags: &[S]) -> BTreeMap<String, Vec<String>> {
    let mut by_category: BTreeMap<String, Vec<&str>> = BTreeMap::new();
    for tag in tags {
        let tag = tag.as_ref();
        by_category
            .entry(tag_category(tag).to_string())
            .or_default()
            .push(tag);
    }
    by_category
        .into_iter()
        .map(|(category, tags)| (category, resolve_most_specific(&tags)))
        .collect()
}
