//! Display-ready tag view for one technique.
//!
//! Combines grouping and redundancy resolution the way a technique page
//! presents tags: for each of the technique's goals that has a hierarchy,
//! resolved tags per dimension (in configured order); everything else in flat
//! category groups.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::grouping::group_tags_by_dimension;
use crate::hierarchy::HierarchyConfig;
use crate::models::Technique;
use crate::redundancy::group_flat_by_category;
use crate::tag::goal_slug;

#[derive(Debug, Clone, Serialize)]
pub struct DimensionView {
    /// Dimension key.
    pub category: String,
    pub name: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GoalView {
    pub goal: String,
    pub slug: String,
    pub dimensions: Vec<DimensionView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TechniqueTagView {
    pub slug: String,
    pub goals: Vec<GoalView>,
    /// Category → resolved tags, for tags not shown under any dimension.
    pub flat: BTreeMap<String, Vec<String>>,
}

impl TechniqueTagView {
    /// Build the view. When `only_goal` is set, only that goal (display name
    /// or slug) is expanded hierarchically.
    pub fn build(technique: &Technique, config: &HierarchyConfig, only_goal: Option<&str>) -> Self {
        let mut goals = Vec::new();
        let mut shown: Vec<&str> = Vec::new();

        for goal in &technique.assurance_goals {
            let slug = goal_slug(goal);
            if let Some(wanted) = only_goal {
                if wanted != goal && wanted != slug {
                    continue;
                }
            }
            let groups = group_tags_by_dimension(config, &technique.tags, &slug);
            if groups.is_empty() {
                continue;
            }
            let dimensions = groups
                .ordered()
                .into_iter()
                .map(|group| DimensionView {
                    category: group.key().to_string(),
                    name: group.config.name.clone(),
                    tags: group.most_specific(),
                })
                .collect();
            shown.extend(technique.tags.iter().map(String::as_str).filter(|t| {
                groups.grouped_tags().any(|g| g == *t)
            }));
            goals.push(GoalView {
                goal: goal.clone(),
                slug,
                dimensions,
            });
        }

        let remaining: Vec<&str> = technique
            .tags
            .iter()
            .map(String::as_str)
            .filter(|t| !shown.contains(t))
            .collect();

        Self {
            slug: technique.slug.clone(),
            goals,
            flat: group_flat_by_category(&remaining),
        }
    }
}
