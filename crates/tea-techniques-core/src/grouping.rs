//! Dimension grouping engine.
//!
//! Places a technique's tags into the dimensions configured for one goal.
//!
//! # Routing
//!
//! For each tag, in input order:
//!
//! 1. If the tag's category is one of the goal's `source_categories`, it is
//!    routed into the dimension keyed by that category. The built-in
//!    hierarchy uses this to borrow `explanatory-scope/*` tags into the
//!    explainability hierarchy; no other goal borrows anything unless its
//!    configuration says so.
//! 2. Otherwise the tag must look like
//!    `assurance-goal-category/<goal>/<dimension-key>/…` with a configured
//!    dimension key.
//! 3. Anything else is unmapped: excluded from grouping but reported in
//!    [`DimensionGroups::unmapped`], so grouped ∪ unmapped is always the
//!    input set.
//!
//! Dimensions that receive no tags are omitted. Tags are not sorted; within a
//! dimension they keep input order.

use std::collections::HashSet;

use crate::hierarchy::{DimensionConfig, GoalHierarchy, HierarchyConfig};
use crate::redundancy::resolve_most_specific;
use crate::tag::ParsedTag;

/// Tags placed in one dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionGroup<'a> {
    pub config: &'a DimensionConfig,
    pub tags: Vec<String>,
}

impl DimensionGroup<'_> {
    pub fn key(&self) -> &str {
        &self.config.key
    }

    /// The group's tags with redundant ancestors removed.
    pub fn most_specific(&self) -> Vec<String> {
        resolve_most_specific(&self.tags)
    }
}

/// Result of [`group_tags_by_dimension`]. Iterates in first-seen order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DimensionGroups<'a> {
    groups: Vec<DimensionGroup<'a>>,
    order: Vec<String>,
    /// Input tags that no configured dimension accepted.
    pub unmapped: Vec<String>,
}

impl<'a> DimensionGroups<'a> {
    pub fn get(&self, key: &str) -> Option<&DimensionGroup<'a>> {
        self.groups.iter().find(|g| g.key() == key)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DimensionGroup<'a>> {
        self.groups.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(DimensionGroup::key)
    }

    /// Groups in configured dimension order.
    pub fn ordered(&self) -> Vec<&DimensionGroup<'a>> {
        self.order.iter().filter_map(|key| self.get(key)).collect()
    }

    /// Every grouped tag, across dimensions, in first-seen dimension order.
    pub fn grouped_tags(&self) -> impl Iterator<Item = &str> {
        self.groups
            .iter()
            .flat_map(|g| g.tags.iter().map(String::as_str))
    }
}

/// Group `tags` into the dimensions configured for `goal` (a goal slug).
///
/// A goal without a hierarchy yields no groups, with every tag reported as
/// unmapped.
pub fn group_tags_by_dimension<'a, S: AsRef<str>>(
    config: &'a HierarchyConfig,
    tags: &[S],
    goal: &str,
) -> DimensionGroups<'a> {
    let mut result = DimensionGroups::default();
    let mut seen: HashSet<&str> = HashSet::new();

    let Some(hierarchy) = config.goal(goal) else {
        for tag in tags {
            let tag = tag.as_ref();
            if seen.insert(tag) {
                result.unmapped.push(tag.to_string());
            }
        }
        return result;
    };
    result.order = hierarchy.dimension_order();

    for tag in tags {
        let tag = tag.as_ref();
        if !seen.insert(tag) {
            continue;
        }
        let parsed = ParsedTag::parse(tag);
        match route(hierarchy, &parsed, goal) {
            Some(dim) => match result.groups.iter().position(|g| g.config.key == dim.key) {
                Some(i) => result.groups[i].tags.push(tag.to_string()),
                None => result.groups.push(DimensionGroup {
                    config: dim,
                    tags: vec![tag.to_string()],
                }),
            },
            None => result.unmapped.push(tag.to_string()),
        }
    }

    result
}

/// The dimension a tag belongs to within one goal's hierarchy, if any.
pub fn route<'a>(
    hierarchy: &'a GoalHierarchy,
    tag: &ParsedTag,
    goal: &str,
) -> Option<&'a DimensionConfig> {
    if hierarchy.source_categories.iter().any(|c| *c == tag.category) {
        return hierarchy.dimension(&tag.category);
    }
    match tag.goal_dimension() {
        Some((tag_goal, key)) if tag_goal == goal => hierarchy.dimension(key),
        _ => None,
    }
}
