//! Technique records as authored in the catalog source data.
//!
//! These types mirror the input JSON one-to-one. Fields the pipeline does not
//! interpret are kept in [`Technique::extra`] so that emitted per-technique
//! files reproduce the source record exactly.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// An optional field that remembers whether it was absent (`None`) or an
/// explicit `null` (`Some(None)`), so both serialize back as they came in.
pub type Nullable<T> = Option<Option<T>>;

fn nullable<'de, D, T>(deserializer: D) -> Result<Nullable<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// A single AI-assurance technique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Technique {
    /// Unique, URL-safe identifier.
    pub slug: String,
    pub name: String,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub acronym: Nullable<String>,
    pub description: String,
    /// Assurance goal display names, e.g. `"Explainability"`.
    pub assurance_goals: Vec<String>,
    /// Slash-delimited tag paths.
    pub tags: Vec<String>,
    #[serde(default)]
    pub related_technique_slugs: Vec<String>,
    #[serde(default)]
    pub resources: Vec<Resource>,
    #[serde(default)]
    pub example_use_cases: Vec<ExampleUseCase>,
    #[serde(default)]
    pub limitations: Vec<Limitation>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub complexity_rating: Nullable<u8>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub computational_cost_rating: Nullable<u8>,
    /// Fields not modelled above, preserved verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Technique {
    /// Exact, case-sensitive goal membership.
    pub fn has_goal(&self, goal: &str) -> bool {
        self.assurance_goals.iter().any(|g| g == goal)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn acronym(&self) -> Option<&str> {
        self.acronym.as_ref().and_then(|a| a.as_deref())
    }

    pub fn complexity(&self) -> Option<u8> {
        self.complexity_rating.flatten()
    }

    pub fn computational_cost(&self) -> Option<u8> {
        self.computational_cost_rating.flatten()
    }
}

/// External reference material for a technique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub title: String,
    pub url: String,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub description: Nullable<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<Vec<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub publication_date: Nullable<String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub source_type: Nullable<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExampleUseCase {
    pub description: String,
    /// Goal display name this example illustrates, if any.
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub goal: Nullable<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Limitation {
    pub description: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// The lightweight projection written to `techniques-metadata.json` and
/// embedded in category and filter listings.
#[derive(Debug, Clone, Serialize)]
pub struct TechniqueSummary<'a> {
    pub slug: &'a str,
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acronym: Option<&'a str>,
    pub description: &'a str,
    pub assurance_goals: &'a [String],
    pub tags: &'a [String],
}

impl<'a> From<&'a Technique> for TechniqueSummary<'a> {
    fn from(t: &'a Technique) -> Self {
        Self {
            slug: &t.slug,
            name: &t.name,
            acronym: t.acronym(),
            description: &t.description,
            assurance_goals: &t.assurance_goals,
            tags: &t.tags,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_fields_survive_round_trip() {
        let raw = serde_json::json!({
            "slug": "shap",
            "name": "SHapley Additive exPlanations",
            "acronym": "SHAP",
            "description": "Attributes predictions to features.",
            "assurance_goals": ["Explainability"],
            "tags": ["assurance-goal-category/explainability"],
            "related_technique_slugs": [],
            "resources": [
                {"title": "t", "url": "https://x", "description": null, "doi": "10.1/x", "authors": []}
            ],
            "example_use_cases": [{"description": "Credit", "goal": null, "sector": "finance"}],
            "limitations": [{"description": "Costly", "severity": "high"}],
            "complexity_rating": 4,
            "computational_cost_rating": null,
            "last_reviewed": "2024-11-02"
        });
        let technique: Technique = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(technique.extra.len(), 1);
        assert_eq!(technique.resources[0].extra["doi"], "10.1/x");
        assert_eq!(technique.complexity(), Some(4));
        assert_eq!(technique.computational_cost(), None);
        assert_eq!(serde_json::to_value(&technique).unwrap(), raw);
    }

    #[test]
    fn test_absent_optional_fields_stay_absent() {
        let raw = serde_json::json!({
            "slug": "lime",
            "name": "LIME",
            "description": "",
            "assurance_goals": [],
            "tags": [],
            "related_technique_slugs": [],
            "resources": [{"title": "t", "url": "https://x"}],
            "example_use_cases": [],
            "limitations": []
        });
        let technique: Technique = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(technique.acronym(), None);
        assert_eq!(serde_json::to_value(&technique).unwrap(), raw);
    }

    #[test]
    fn test_goal_membership_is_case_sensitive() {
        let technique: Technique = serde_json::from_value(serde_json::json!({
            "slug": "lime",
            "name": "LIME",
            "description": "",
            "assurance_goals": ["Explainability"],
            "tags": []
        }))
        .unwrap();
        assert!(technique.has_goal("Explainability"));
        assert!(!technique.has_goal("explainability"));
    }
}
