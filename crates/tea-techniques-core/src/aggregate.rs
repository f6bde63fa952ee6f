//! Aggregation and index building.
//!
//! [`CatalogIndex::build`] walks the technique list once and derives every
//! index the static site needs. It is a pure, full-recompute function of
//! `(techniques, hierarchy, goals)`: there is no incremental path, and two
//! builds over the same input are identical.
//!
//! Ordering policy: tag lists are sorted lexicographically; technique lists
//! keep source order (positions into the input slice).

use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::goals::{GoalCatalog, GoalInfo};
use crate::grouping::group_tags_by_dimension;
use crate::hierarchy::{DimensionConfig, HierarchyConfig};
use crate::models::Technique;
use crate::search::SearchEntry;
use crate::tag::tag_category;

/// Per-tag statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct TagStat {
    pub category: String,
    /// Techniques whose `tags` contain this exact tag (at most once each).
    pub count: usize,
    /// Positions of those techniques, in source order.
    pub techniques: Vec<usize>,
}

/// Aggregates for one dimension within one goal.
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionIndex {
    pub config: DimensionConfig,
    /// Grouped tag → number of the goal's techniques carrying it.
    pub subcategories: BTreeMap<String, usize>,
    /// The goal's techniques with at least one tag in this dimension.
    pub techniques: Vec<usize>,
}

/// Aggregates for one assurance goal.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalIndex {
    pub info: GoalInfo,
    pub slug: String,
    /// Techniques listing the goal (exact, case-sensitive).
    pub techniques: Vec<usize>,
    pub has_hierarchy: bool,
    /// Non-empty dimensions, in configured dimension order.
    pub dimensions: Vec<DimensionIndex>,
}

/// Every derived index over a technique list.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogIndex {
    pub tags: BTreeMap<String, TagStat>,
    /// Category → sorted tags.
    pub categories: BTreeMap<String, Vec<String>>,
    /// Goal catalog order first, then goals only found in data, by name.
    pub goals: Vec<GoalIndex>,
    /// One entry per technique, in source order.
    pub search: Vec<SearchEntry>,
}

impl CatalogIndex {
    pub fn build(techniques: &[Technique], hierarchy: &HierarchyConfig, catalog: &GoalCatalog) -> Self {
        let mut tags: BTreeMap<String, TagStat> = BTreeMap::new();
        let mut goal_names: BTreeSet<&str> = BTreeSet::new();
        let mut search = Vec::with_capacity(techniques.len());

        for (pos, technique) in techniques.iter().enumerate() {
            let mut counted = HashSet::new();
            for tag in &technique.tags {
                if !counted.insert(tag.as_str()) {
                    continue;
                }
                let stat = tags.entry(tag.clone()).or_insert_with(|| TagStat {
                    category: tag_category(tag).to_string(),
                    count: 0,
                    techniques: Vec::new(),
                });
                stat.count += 1;
                stat.techniques.push(pos);
            }
            goal_names.extend(technique.assurance_goals.iter().map(String::as_str));
            search.push(SearchEntry::from_technique(technique));
        }

        let mut categories: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (tag, stat) in &tags {
            categories
                .entry(stat.category.clone())
                .or_default()
                .push(tag.clone());
        }

        let mut infos: Vec<GoalInfo> = catalog.iter().cloned().collect();
        infos.extend(
            goal_names
                .into_iter()
                .filter(|name| !catalog.contains(name))
                .map(|name| GoalInfo {
                    name: name.to_string(),
                    description: String::new(),
                }),
        );

        let goals = infos
            .into_iter()
            .map(|info| {
                let members = techniques
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.has_goal(&info.name))
                    .map(|(pos, _)| pos)
                    .collect();
                build_goal(info, members, techniques, hierarchy)
            })
            .collect();

        Self {
            tags,
            categories,
            goals,
            search,
        }
    }

    pub fn goal(&self, slug: &str) -> Option<&GoalIndex> {
        self.goals.iter().find(|g| g.slug == slug)
    }

    pub fn tag_count(&self, tag: &str) -> usize {
        self.tags.get(tag).map_or(0, |s| s.count)
    }
}

fn build_goal(
    info: GoalInfo,
    techniques_in_goal: Vec<usize>,
    techniques: &[Technique],
    hierarchy: &HierarchyConfig,
) -> GoalIndex {
    let slug = info.slug();
    let mut dimensions: BTreeMap<String, DimensionIndex> = BTreeMap::new();

    for &pos in &techniques_in_goal {
        let groups = group_tags_by_dimension(hierarchy, &techniques[pos].tags, &slug);
        for group in groups.iter() {
            let dim = dimensions
                .entry(group.key().to_string())
                .or_insert_with(|| DimensionIndex {
                    config: group.config.clone(),
                    subcategories: BTreeMap::new(),
                    techniques: Vec::new(),
                });
            for tag in &group.tags {
                *dim.subcategories.entry(tag.clone()).or_insert(0) += 1;
            }
            dim.techniques.push(pos);
        }
    }

    let ordered = hierarchy
        .get_dimension_order(&slug)
        .into_iter()
        .filter_map(|key| dimensions.remove(&key))
        .collect();

    GoalIndex {
        has_hierarchy: hierarchy.has_hierarchy(&slug),
        info,
        slug,
        techniques: techniques_in_goal,
        dimensions: ordered,
    }
}
