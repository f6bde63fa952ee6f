//! Slash-delimited tag paths.
//!
//! A tag such as `assurance-goal-category/explainability/property/completeness`
//! encodes a category (first segment) and, for hierarchical tags, a goal, a
//! dimension key and a value path:
//!
//! ```text
//! assurance-goal-category / explainability / property / completeness
//! └────── category ─────┘   └─── goal ───┘   └ key ─┘   └ value ──┘
//! ```
//!
//! [`ParsedTag`] is produced once per tag so downstream code works on the
//! structured form instead of re-splitting strings.
//!
//! # Example
//!
//! ```rust
//! use tea_techniques_core::tag::{tag_display_value, ParsedTag};
//!
//! let tag = ParsedTag::parse("assurance-goal-category/explainability/attribution-methods/shap");
//! assert_eq!(tag.category, "assurance-goal-category");
//! assert_eq!(tag.goal.as_deref(), Some("explainability"));
//! assert_eq!(tag.dimension_key.as_deref(), Some("attribution-methods"));
//! assert_eq!(tag_display_value("data-type/llm"), "Large Language Model");
//! ```

use serde::Serialize;

/// Category whose tags carry a goal and dimension key.
pub const ASSURANCE_GOAL_CATEGORY: &str = "assurance-goal-category";

/// Category that lives outside the goal namespace but is borrowed into the
/// explainability hierarchy.
pub const EXPLANATORY_SCOPE_CATEGORY: &str = "explanatory-scope";

/// Separator used when flattening a tag path into a file-name slug.
pub const TAG_SLUG_SEPARATOR: &str = "--";

/// Segments whose display form is not a plain title-casing of the kebab name.
const DISPLAY_OVERRIDES: &[(&str, &str)] = &[
    ("ai", "AI"),
    ("api", "API"),
    ("cnn", "Convolutional Neural Network"),
    ("dnn", "Deep Neural Network"),
    ("gan", "Generative Adversarial Network"),
    ("gdpr", "GDPR"),
    ("gnn", "Graph Neural Network"),
    ("lime", "LIME"),
    ("llm", "Large Language Model"),
    ("ml", "Machine Learning"),
    ("nlp", "Natural Language Processing"),
    ("rnn", "Recurrent Neural Network"),
    ("shap", "SHAP"),
    ("svm", "Support Vector Machine"),
    ("xai", "Explainable AI"),
];

/// Split a tag on `/`. Empty segments are passed through untouched.
pub fn parse_tag_segments(tag: &str) -> Vec<&str> {
    tag.split('/').collect()
}

/// The first path segment.
pub fn tag_category(tag: &str) -> &str {
    tag.split('/').next().unwrap_or_default()
}

/// Human-readable form of the last segment.
///
/// The override table is consulted before the generic kebab-case to
/// Title Case conversion.
pub fn tag_display_value(tag: &str) -> String {
    let last = tag.rsplit('/').next().unwrap_or_default();
    if let Some((_, display)) = DISPLAY_OVERRIDES.iter().find(|(key, _)| *key == last) {
        return (*display).to_string();
    }
    kebab_to_title(last)
}

/// True iff `candidate` is a strict descendant of `ancestor` in the path tree.
pub fn is_descendant_of(candidate: &str, ancestor: &str) -> bool {
    candidate != ancestor
        && candidate.len() > ancestor.len()
        && candidate.starts_with(ancestor)
        && candidate.as_bytes()[ancestor.len()] == b'/'
}

/// File-name slug for a tag: segments after the category joined by `--`.
///
/// A bare category tag slugs to the category name itself.
pub fn tag_slug(tag: &str) -> String {
    let segments = parse_tag_segments(tag);
    if segments.len() <= 1 {
        return segments.first().copied().unwrap_or_default().to_string();
    }
    segments[1..].join(TAG_SLUG_SEPARATOR)
}

/// URL slug for a goal display name: `"Explainability"` → `"explainability"`.
pub fn goal_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

fn kebab_to_title(segment: &str) -> String {
    segment
        .split('-')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Structured form of a tag string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedTag {
    pub raw: String,
    pub category: String,
    /// Second segment of an `assurance-goal-category` tag with ≥ 3 segments.
    pub goal: Option<String>,
    /// Third segment of an `assurance-goal-category` tag with ≥ 3 segments.
    pub dimension_key: Option<String>,
    /// Segments after the dimension key (hierarchical tags) or after the
    /// category (all other tags).
    pub value_path: Vec<String>,
}

impl ParsedTag {
    pub fn parse(tag: &str) -> Self {
        let segments = parse_tag_segments(tag);
        let category = segments.first().copied().unwrap_or_default().to_string();

        if category == ASSURANCE_GOAL_CATEGORY && segments.len() >= 3 {
            return Self {
                raw: tag.to_string(),
                category,
                goal: Some(segments[1].to_string()),
                dimension_key: Some(segments[2].to_string()),
                value_path: segments[3..].iter().map(|s| s.to_string()).collect(),
            };
        }

        Self {
            raw: tag.to_string(),
            category,
            goal: None,
            dimension_key: None,
            value_path: segments.iter().skip(1).map(|s| s.to_string()).collect(),
        }
    }

    /// Goal and dimension key, when both are present.
    pub fn goal_dimension(&self) -> Option<(&str, &str)> {
        match (&self.goal, &self.dimension_key) {
            (Some(goal), Some(key)) => Some((goal, key)),
            _ => None,
        }
    }

    /// Problems that suggest an upstream data error. The tag itself is still
    /// processed permissively.
    pub fn defects(&self) -> Vec<String> {
        let mut defects = Vec::new();
        let segments = parse_tag_segments(&self.raw);
        if segments.iter().any(|s| s.is_empty()) {
            defects.push("contains an empty path segment".to_string());
        }
        if let Some(bad) = self
            .raw
            .chars()
            .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-' || *c == '/'))
        {
            defects.push(format!("contains unexpected character {:?}", bad));
        }
        defects
    }
}
