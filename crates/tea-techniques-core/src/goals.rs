//! The catalog of known assurance goals.

use serde::{Deserialize, Serialize};

use crate::tag::goal_slug;

/// A top-level AI-trustworthiness objective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalInfo {
    /// Display name as it appears in `assurance_goals`, e.g. `"Explainability"`.
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl GoalInfo {
    pub fn slug(&self) -> String {
        goal_slug(&self.name)
    }
}

/// Ordered list of goals; the order drives `assurance-goals.json`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GoalCatalog {
    goals: Vec<GoalInfo>,
}

impl GoalCatalog {
    pub fn new(goals: Vec<GoalInfo>) -> Self {
        Self { goals }
    }

    pub fn builtin() -> Self {
        let goal = |name: &str, description: &str| GoalInfo {
            name: name.to_string(),
            description: description.to_string(),
        };
        Self::new(vec![
            goal(
                "Explainability",
                "Techniques that make the behaviour and outputs of AI systems understandable to people.",
            ),
            goal(
                "Fairness",
                "Techniques that detect, measure and mitigate unjustified bias in data and models.",
            ),
            goal(
                "Privacy",
                "Techniques that protect personal data used to train or operate AI systems.",
            ),
            goal(
                "Reliability",
                "Techniques that establish consistent, well-calibrated performance under expected conditions.",
            ),
            goal(
                "Safety",
                "Techniques that prevent AI systems from causing harm, including under failure or misuse.",
            ),
            goal(
                "Security",
                "Techniques that protect AI systems against adversarial attack and unauthorised access.",
            ),
            goal(
                "Transparency",
                "Techniques that document and disclose how AI systems are built, trained and governed.",
            ),
        ])
    }

    pub fn iter(&self) -> impl Iterator<Item = &GoalInfo> {
        self.goals.iter()
    }

    pub fn get(&self, name: &str) -> Option<&GoalInfo> {
        self.goals.iter().find(|g| g.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.goals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.goals.is_empty()
    }
}
