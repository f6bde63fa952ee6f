//! Search corpus and keyword search.
//!
//! Each technique contributes one [`SearchEntry`]: a lowercase `search_text`
//! (name, description, goals and tags joined by spaces) and the deduplicated
//! token list derived from it. The same entries are written to
//! `search-index.json` and queried by `tea search`.
//!
//! # Scoring
//!
//! 1. Tokenize the query with the same rules as the corpus.
//! 2. Per query token: `1.0` for an exact token match, `0.5` for a prefix
//!    match, plus `0.5` when the token appears in the technique name.
//! 3. `+1.0` when the whole lowercase query occurs in `search_text`.
//! 4. Drop zero scores and min-max normalize the rest to `[0, 1]`.
//! 5. Sort by score (desc), name (asc), slug (asc); truncate to `limit`.

use serde::Serialize;
use std::collections::HashSet;

use crate::models::Technique;
use crate::tag::goal_slug;

/// Minimum token length kept in the corpus.
const MIN_TOKEN_LEN: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchEntry {
    pub slug: String,
    pub name: String,
    pub description: String,
    pub assurance_goals: Vec<String>,
    pub tags: Vec<String>,
    pub search_text: String,
    pub tokens: Vec<String>,
}

impl SearchEntry {
    pub fn from_technique(technique: &Technique) -> Self {
        let mut parts: Vec<&str> = vec![technique.name.as_str(), technique.description.as_str()];
        parts.extend(technique.assurance_goals.iter().map(String::as_str));
        parts.extend(technique.tags.iter().map(String::as_str));
        let search_text = parts.join(" ").to_lowercase();
        let tokens = tokenize(&search_text);

        Self {
            slug: technique.slug.clone(),
            name: technique.name.clone(),
            description: technique.description.clone(),
            assurance_goals: technique.assurance_goals.clone(),
            tags: technique.tags.clone(),
            search_text,
            tokens,
        }
    }

    fn in_goal(&self, goal: &str) -> bool {
        self.assurance_goals
            .iter()
            .any(|g| g == goal || goal_slug(g) == goal)
    }
}

/// Lowercase words split on anything that is not alphanumeric, first
/// occurrence order, duplicates and one-character tokens removed.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() >= MIN_TOKEN_LEN)
        .map(str::to_lowercase)
        .filter(|w| seen.insert(w.clone()))
        .collect()
}

#[derive(Debug, Clone)]
pub struct SearchRequest<'a> {
    pub query: &'a str,
    /// Restrict to techniques listing this goal (display name or slug).
    pub goal: Option<&'a str>,
    pub limit: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub slug: String,
    pub name: String,
    /// Normalized relevance in `[0.0, 1.0]`.
    pub score: f64,
    /// Query tokens that matched.
    pub matched: Vec<String>,
}

/// Run a keyword query over the corpus.
pub fn search(entries: &[SearchEntry], req: &SearchRequest<'_>) -> Vec<SearchHit> {
    let query_tokens = tokenize(req.query);
    if query_tokens.is_empty() {
        return Vec::new();
    }
    let phrase = req.query.trim().to_lowercase();

    let mut hits: Vec<SearchHit> = entries
        .iter()
        .filter(|e| req.goal.map_or(true, |g| e.in_goal(g)))
        .filter_map(|entry| {
            let name = entry.name.to_lowercase();
            let mut raw = 0.0;
            let mut matched = Vec::new();
            for token in &query_tokens {
                let score = if entry.tokens.iter().any(|t| t == token) {
                    1.0
                } else if entry.tokens.iter().any(|t| t.starts_with(token.as_str())) {
                    0.5
                } else {
                    continue;
                };
                raw += score;
                if name.contains(token.as_str()) {
                    raw += 0.5;
                }
                matched.push(token.clone());
            }
            if matched.is_empty() {
                return None;
            }
            if entry.search_text.contains(&phrase) {
                raw += 1.0;
            }
            Some(SearchHit {
                slug: entry.slug.clone(),
                name: entry.name.clone(),
                score: raw,
                matched,
            })
        })
        .collect();

    normalize_scores(&mut hits);

    hits.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.name.cmp(&b.name))
            .then(a.slug.cmp(&b.slug))
    });
    hits.truncate(req.limit);
    hits
}

/// Min-max normalize scores in place. If all scores are equal they become `1.0`.
pub fn normalize_scores(hits: &mut [SearchHit]) {
    if hits.is_empty() {
        return;
    }
    let s_min = hits.iter().map(|h| h.score).fold(f64::INFINITY, f64::min);
    let s_max = hits.iter().map(|h| h.score).fold(f64::NEG_INFINITY, f64::max);
    for hit in hits.iter_mut() {
        hit.score = if (s_max - s_min).abs() < f64::EPSILON {
            1.0
        } else {
            (hit.score - s_min) / (s_max - s_min)
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(slug: &str, name: &str, description: &str, goals: &[&str]) -> SearchEntry {
        let technique: Technique = serde_json::from_value(serde_json::json!({
            "slug": slug,
            "name": name,
            "description": description,
            "assurance_goals": goals,
            "tags": ["technique-type/algorithmic"],
        }))
        .unwrap();
        SearchEntry::from_technique(&technique)
    }

    fn request(query: &str) -> SearchRequest<'_> {
        SearchRequest {
            query,
            goal: None,
            limit: 10,
        }
    }

    #[test]
    fn test_search_text_and_tokens() {
        let e = entry("shap", "SHAP Values", "Game-theoretic attribution.", &["Explainability"]);
        assert_eq!(
            e.search_text,
            "shap values game-theoretic attribution. explainability technique-type/algorithmic"
        );
        assert_eq!(
            e.tokens,
            vec![
                "shap",
                "values",
                "game",
                "theoretic",
                "attribution",
                "explainability",
                "technique",
                "type",
                "algorithmic"
            ]
        );
    }

    #[test]
    fn test_tokenize_drops_short_and_duplicate_words() {
        assert_eq!(tokenize("a bb BB cc-dd"), vec!["bb", "cc", "dd"]);
        assert!(tokenize("   ").is_empty());
    }

    #[test]
    fn test_empty_query_returns_nothing() {
        let entries = vec![entry("a", "Alpha", "", &[])];
        assert!(search(&entries, &request("  ")).is_empty());
    }

    #[test]
    fn test_name_match_ranks_first() {
        let entries = vec![
            entry("b", "Permutation Importance", "Measures feature relevance.", &["Explainability"]),
            entry("a", "Feature Ablation", "Removes inputs.", &["Explainability"]),
        ];
        let hits = search(&entries, &request("feature"));
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].slug, "a");
        assert!((hits[0].score - 1.0).abs() < 1e-9);
        assert!((hits[1].score - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_prefix_match_and_goal_filter() {
        let entries = vec![
            entry("a", "Counterfactuals", "", &["Explainability"]),
            entry("b", "Counterfactual Fairness", "", &["Fairness"]),
        ];
        let hits = search(&entries, &request("counter"));
        assert_eq!(hits.len(), 2);

        let req = SearchRequest {
            query: "counter",
            goal: Some("fairness"),
            limit: 10,
        };
        let hits = search(&entries, &req);
        assert_eq!(hits.iter().map(|h| h.slug.as_str()).collect::<Vec<_>>(), vec!["b"]);
    }

    #[test]
    fn test_deterministic_ties_and_limit() {
        let entries = vec![
            entry("z", "Same", "", &[]),
            entry("y", "Same", "", &[]),
            entry("x", "Same", "", &[]),
        ];
        let req = SearchRequest {
            query: "same",
            goal: None,
            limit: 2,
        };
        let hits = search(&entries, &req);
        assert_eq!(hits.iter().map(|h| h.slug.as_str()).collect::<Vec<_>>(), vec!["x", "y"]);
    }
}
