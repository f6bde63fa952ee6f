//! Per-goal dimension hierarchies.
//!
//! A [`HierarchyConfig`] maps a goal slug (the second segment of an
//! `assurance-goal-category` tag) to the ordered set of dimensions that its
//! tags are grouped into. It is an immutable value: build it once (from the
//! built-in defaults or from configuration) and pass it by reference to the
//! grouping engine and the index builder.
//!
//! Goals without an entry have no hierarchy. That is the normal state for
//! most goals and their techniques fall back to flat tag grouping.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

use crate::tag::EXPLANATORY_SCOPE_CATEGORY;

/// A named grouping bucket within a goal's hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionConfig {
    /// Matches the third segment of `assurance-goal-category/<goal>/<key>/…`,
    /// or a borrowed source category.
    pub key: String,
    pub name: String,
    /// Display order; dimensions without one sort last.
    #[serde(default)]
    pub order: Option<u32>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

/// Dimensions configured for one goal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoalHierarchy {
    /// Declaration order is the final ordering tie-break.
    #[serde(default)]
    pub dimensions: Vec<DimensionConfig>,
    /// Tie-break ranking for dimensions with equal (or no) numeric order.
    #[serde(default)]
    pub default_order: Vec<String>,
    /// Tag categories outside `assurance-goal-category` whose tags are routed
    /// into the dimension keyed by the category name.
    #[serde(default)]
    pub source_categories: Vec<String>,
}

impl GoalHierarchy {
    pub fn dimension(&self, key: &str) -> Option<&DimensionConfig> {
        self.dimensions.iter().find(|d| d.key == key)
    }

    /// Dimension keys sorted by numeric order, then `default_order` rank,
    /// then declaration order.
    pub fn dimension_order(&self) -> Vec<String> {
        let rank = |key: &str| {
            self.default_order
                .iter()
                .position(|k| k == key)
                .unwrap_or(usize::MAX)
        };
        let mut indexed: Vec<(usize, &DimensionConfig)> =
            self.dimensions.iter().enumerate().collect();
        indexed.sort_by(|(ia, a), (ib, b)| {
            let oa = a.order.map(u64::from).unwrap_or(u64::MAX);
            let ob = b.order.map(u64::from).unwrap_or(u64::MAX);
            oa.cmp(&ob)
                .then(rank(&a.key).cmp(&rank(&b.key)))
                .then(ia.cmp(ib))
        });
        indexed.into_iter().map(|(_, d)| d.key.clone()).collect()
    }
}

/// Configuration problems detected when a hierarchy is constructed.
#[derive(Debug, Error, PartialEq)]
pub enum HierarchyError {
    #[error("goal '{goal}' declares dimension '{key}' more than once")]
    DuplicateDimension { goal: String, key: String },
    #[error("goal '{goal}' borrows category '{category}' but has no dimension keyed '{category}'")]
    UnroutedSourceCategory { goal: String, category: String },
    #[error("goal '{goal}' lists unknown dimension '{key}' in default_order")]
    UnknownDefaultOrderKey { goal: String, key: String },
}

/// Immutable registry: goal slug → [`GoalHierarchy`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct HierarchyConfig {
    goals: BTreeMap<String, GoalHierarchy>,
}

impl HierarchyConfig {
    /// Build a registry, rejecting inconsistent goal entries.
    pub fn new(goals: BTreeMap<String, GoalHierarchy>) -> Result<Self, HierarchyError> {
        for (goal, hierarchy) in &goals {
            let mut seen = HashSet::new();
            for dim in &hierarchy.dimensions {
                if !seen.insert(dim.key.as_str()) {
                    return Err(HierarchyError::DuplicateDimension {
                        goal: goal.clone(),
                        key: dim.key.clone(),
                    });
                }
            }
            for category in &hierarchy.source_categories {
                if hierarchy.dimension(category).is_none() {
                    return Err(HierarchyError::UnroutedSourceCategory {
                        goal: goal.clone(),
                        category: category.clone(),
                    });
                }
            }
            for key in &hierarchy.default_order {
                if hierarchy.dimension(key).is_none() {
                    return Err(HierarchyError::UnknownDefaultOrderKey {
                        goal: goal.clone(),
                        key: key.clone(),
                    });
                }
            }
        }
        Ok(Self { goals })
    }

    /// The catalog's standard hierarchy: explainability is the only goal with
    /// configured dimensions, and it borrows `explanatory-scope` tags.
    pub fn builtin() -> Self {
        let dim = |key: &str, name: &str, order: u32, description: &str, icon: &str| {
            DimensionConfig {
                key: key.to_string(),
                name: name.to_string(),
                order: Some(order),
                description: Some(description.to_string()),
                icon: Some(icon.to_string()),
            }
        };

        let explainability = GoalHierarchy {
            dimensions: vec![
                dim(
                    EXPLANATORY_SCOPE_CATEGORY,
                    "Explanatory Scope",
                    1,
                    "Whether explanations describe individual predictions or overall model behaviour",
                    "scope",
                ),
                dim(
                    "attribution-methods",
                    "Attribution Methods",
                    2,
                    "Techniques that attribute a prediction to input features or training data",
                    "attribution",
                ),
                dim(
                    "analysis-type",
                    "Analysis Type",
                    3,
                    "The kind of analysis performed on the model or its outputs",
                    "analysis",
                ),
                dim(
                    "visualization-methods",
                    "Visualization Methods",
                    4,
                    "Visual representations of model behaviour",
                    "chart",
                ),
                dim(
                    "model-approximation",
                    "Model Approximation",
                    5,
                    "Surrogate or simplified models that mimic the original",
                    "approximation",
                ),
                dim(
                    "example-based-methods",
                    "Example-Based Methods",
                    6,
                    "Explanations expressed through representative or counterfactual examples",
                    "examples",
                ),
                dim(
                    "property",
                    "Properties",
                    7,
                    "Desirable properties an explanation technique provides",
                    "property",
                ),
            ],
            default_order: Vec::new(),
            source_categories: vec![EXPLANATORY_SCOPE_CATEGORY.to_string()],
        };

        Self {
            goals: BTreeMap::from([("explainability".to_string(), explainability)]),
        }
    }

    pub fn has_hierarchy(&self, goal: &str) -> bool {
        self.goals.contains_key(goal)
    }

    pub fn goal(&self, goal: &str) -> Option<&GoalHierarchy> {
        self.goals.get(goal)
    }

    pub fn get_dimension(&self, goal: &str, key: &str) -> Option<&DimensionConfig> {
        self.goals.get(goal)?.dimension(key)
    }

    /// Dimension keys for `goal` in display order; empty for goals without
    /// a hierarchy.
    pub fn get_dimension_order(&self, goal: &str) -> Vec<String> {
        self.goals
            .get(goal)
            .map(GoalHierarchy::dimension_order)
            .unwrap_or_default()
    }
}
