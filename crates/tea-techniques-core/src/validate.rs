//! Input validation for raw technique records.
//!
//! Validation runs over the untyped JSON before anything is aggregated, so a
//! single pass can report every problem in every file instead of stopping at
//! the first deserialization error.
//!
//! | Class | Severity | Examples |
//! |-------|----------|----------|
//! | Malformed record | error | missing field, wrong type, bad or duplicate slug |
//! | Output clash | error | two goals or two tags that map to one output file |
//! | Dangling reference | warning | unknown related slug, unknown goal |
//! | Malformed tag | warning | empty segment, uppercase or odd characters |
//! | Unmapped tag | warning | dimension key not configured for its goal |
//!
//! Any error fails the whole run. Warnings are informational: the records are
//! still processed, and consuming pages tolerate dangling references.

use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::artifacts::filter_path;
use crate::error::CatalogError;
use crate::goals::GoalCatalog;
use crate::grouping::route;
use crate::hierarchy::HierarchyConfig;
use crate::models::Technique;
use crate::tag::{goal_slug, ParsedTag};

/// A raw record with a label identifying where it came from
/// (e.g. `data/techniques.json[12]`).
#[derive(Debug, Clone)]
pub struct SourceRecord {
    pub origin: String,
    pub value: Value,
}

/// Split a JSON document into records. A top-level array yields one record
/// per element; anything else is a single record.
pub fn records_from_json(origin: &str, text: &str) -> Result<Vec<SourceRecord>, CatalogError> {
    let value: Value = serde_json::from_str(text).map_err(|source| CatalogError::Json {
        origin: origin.to_string(),
        source,
    })?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, value)| SourceRecord {
                origin: format!("{}[{}]", origin, i),
                value,
            })
            .collect(),
        value => vec![SourceRecord {
            origin: origin.to_string(),
            value,
        }],
    })
}

/// One validation finding.
#[derive(Debug, Clone, PartialEq)]
pub struct Issue {
    pub origin: String,
    /// Field path within the record, e.g. `tags[2]`. Empty for whole-record issues.
    pub path: String,
    pub message: String,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}: {}", self.origin, self.message)
        } else {
            write!(f, "{}: {}: {}", self.origin, self.path, self.message)
        }
    }
}

/// Every finding from one validation pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    pub records: usize,
    pub errors: Vec<Issue>,
    pub warnings: Vec<Issue>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for issue in &self.errors {
            writeln!(f, "error: {}", issue)?;
        }
        for issue in &self.warnings {
            writeln!(f, "warning: {}", issue)?;
        }
        Ok(())
    }
}

/// Accumulates findings for one record.
struct Checker<'r> {
    origin: &'r str,
    report: &'r mut ValidationReport,
}

impl Checker<'_> {
    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.report.errors.push(Issue {
            origin: self.origin.to_string(),
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.report.warnings.push(Issue {
            origin: self.origin.to_string(),
            path: path.into(),
            message: message.into(),
        });
    }

    fn required_string<'v>(&mut self, obj: &'v Map<String, Value>, path: &str, key: &str) -> Option<&'v str> {
        let full = join_path(path, key);
        match obj.get(key) {
            None => {
                self.error(full, "missing required field");
                None
            }
            Some(Value::String(s)) => Some(s),
            Some(other) => {
                self.error(full, format!("expected string, found {}", kind(other)));
                None
            }
        }
    }

    fn optional_string(&mut self, obj: &Map<String, Value>, path: &str, key: &str) {
        match obj.get(key) {
            None | Some(Value::Null) | Some(Value::String(_)) => {}
            Some(other) => self.error(
                join_path(path, key),
                format!("expected string, found {}", kind(other)),
            ),
        }
    }

    fn string_array<'v>(
        &mut self,
        obj: &'v Map<String, Value>,
        path: &str,
        key: &str,
        required: bool,
    ) -> Vec<&'v str> {
        let full = join_path(path, key);
        let items = match obj.get(key) {
            None if required => {
                self.error(full, "missing required field");
                return Vec::new();
            }
            None => return Vec::new(),
            Some(Value::Array(items)) => items,
            Some(other) => {
                self.error(full, format!("expected array, found {}", kind(other)));
                return Vec::new();
            }
        };
        let mut strings = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            match item {
                Value::String(s) => strings.push(s.as_str()),
                other => self.error(
                    format!("{}[{}]", full, i),
                    format!("expected string, found {}", kind(other)),
                ),
            }
        }
        strings
    }

    fn object_array<'v>(
        &mut self,
        obj: &'v Map<String, Value>,
        key: &str,
    ) -> Vec<(String, &'v Map<String, Value>)> {
        let items = match obj.get(key) {
            None => {
                self.error(key, "missing required field");
                return Vec::new();
            }
            Some(Value::Array(items)) => items,
            Some(other) => {
                self.error(key, format!("expected array, found {}", kind(other)));
                return Vec::new();
            }
        };
        let mut objects = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let path = format!("{}[{}]", key, i);
            match item {
                Value::Object(map) => objects.push((path, map)),
                other => self.error(path, format!("expected object, found {}", kind(other))),
            }
        }
        objects
    }

    fn rating(&mut self, obj: &Map<String, Value>, key: &str) {
        match obj.get(key) {
            None | Some(Value::Null) => {}
            Some(Value::Number(n)) if n.as_u64().is_some_and(|v| (1..=5).contains(&v)) => {}
            Some(other) => self.error(key, format!("expected integer 1-5, found {}", other)),
        }
    }
}

fn join_path(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn is_url_safe_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// References collected in the first pass and checked once all slugs are known.
struct PendingRefs<'v> {
    origin: &'v str,
    related: Vec<(usize, &'v str)>,
    slug: Option<&'v str>,
}

/// Validate every record. Never fails; inspect [`ValidationReport::is_ok`].
pub fn validate_records(
    records: &[SourceRecord],
    hierarchy: &HierarchyConfig,
    goals: &GoalCatalog,
) -> ValidationReport {
    let mut report = ValidationReport {
        records: records.len(),
        ..Default::default()
    };
    let mut slugs: HashMap<&str, &str> = HashMap::new();
    let mut pending = Vec::new();
    // Output paths derived from goal names and tags must stay one-to-one.
    let mut goal_pages: HashMap<String, String> =
        goals.iter().map(|g| (g.slug(), g.name.clone())).collect();
    let mut filter_files: HashMap<String, String> = HashMap::new();

    for record in records {
        let mut check = Checker {
            origin: &record.origin,
            report: &mut report,
        };
        let Value::Object(obj) = &record.value else {
            check.error("", format!("expected object, found {}", kind(&record.value)));
            continue;
        };

        let slug = check.required_string(obj, "", "slug");
        if let Some(slug) = slug {
            if !is_url_safe_slug(slug) {
                check.error("slug", format!("'{}' is not a URL-safe slug ([a-z0-9-]+)", slug));
            } else if let Some(first) = slugs.get(slug) {
                check.error("slug", format!("duplicate slug '{}' (first defined in {})", slug, first));
            } else {
                slugs.insert(slug, &record.origin);
            }
        }
        check.required_string(obj, "", "name");
        check.required_string(obj, "", "description");
        check.optional_string(obj, "", "acronym");
        check.rating(obj, "complexity_rating");
        check.rating(obj, "computational_cost_rating");

        let technique_goals = check.string_array(obj, "", "assurance_goals", true);
        for (i, goal) in technique_goals.iter().enumerate() {
            if !goals.contains(goal) {
                check.warn(format!("assurance_goals[{}]", i), format!("unknown assurance goal '{}'", goal));
            }
            let page = goal_slug(goal);
            match goal_pages.get(&page) {
                Some(existing) if existing != goal => check.error(
                    format!("assurance_goals[{}]", i),
                    format!("goal '{}' has the same slug '{}' as goal '{}'", goal, page, existing),
                ),
                Some(_) => {}
                None => {
                    goal_pages.insert(page, goal.to_string());
                }
            }
        }
        let goal_slugs: Vec<String> = technique_goals.iter().map(|g| goal_slug(g)).collect();

        let tags = check.string_array(obj, "", "tags", true);
        let mut seen_tags = HashSet::new();
        for (i, tag) in tags.iter().enumerate() {
            let path = format!("tags[{}]", i);
            if !seen_tags.insert(*tag) {
                check.warn(path.clone(), format!("duplicate tag '{}' is counted once", tag));
                continue;
            }
            let file = filter_path(tag);
            match filter_files.get(&file) {
                Some(existing) if existing != tag => check.error(
                    path.clone(),
                    format!("tag '{}' maps to the same file '{}' as tag '{}'", tag, file, existing),
                ),
                Some(_) => {}
                None => {
                    filter_files.insert(file, tag.to_string());
                }
            }
            let parsed = ParsedTag::parse(tag);
            for defect in parsed.defects() {
                check.warn(path.clone(), format!("malformed tag '{}': {}", tag, defect));
            }
            if let Some((tag_goal, key)) = parsed.goal_dimension() {
                if !goal_slugs.iter().any(|g| g == tag_goal) {
                    check.warn(
                        path.clone(),
                        format!("tag '{}' names goal '{}' which the technique does not list", tag, tag_goal),
                    );
                }
                if let Some(goal_hierarchy) = hierarchy.goal(tag_goal) {
                    if route(goal_hierarchy, &parsed, tag_goal).is_none() {
                        check.warn(
                            path,
                            format!("dimension '{}' is not configured for goal '{}'; tag is shown flat", key, tag_goal),
                        );
                    }
                }
            }
        }

        let related = check.string_array(obj, "", "related_technique_slugs", true);

        for (path, resource) in check.object_array(obj, "resources") {
            check.required_string(resource, &path, "title");
            check.required_string(resource, &path, "url");
            check.optional_string(resource, &path, "description");
            check.optional_string(resource, &path, "publication_date");
            check.optional_string(resource, &path, "source_type");
            check.string_array(resource, &path, "authors", false);
        }

        for (path, use_case) in check.object_array(obj, "example_use_cases") {
            check.required_string(use_case, &path, "description");
            check.optional_string(use_case, &path, "goal");
            if let Some(Value::String(goal)) = use_case.get("goal") {
                if !goals.contains(goal) {
                    check.warn(join_path(&path, "goal"), format!("unknown assurance goal '{}'", goal));
                }
            }
        }

        for (path, limitation) in check.object_array(obj, "limitations") {
            check.required_string(limitation, &path, "description");
        }

        pending.push(PendingRefs {
            origin: &record.origin,
            related: related.into_iter().enumerate().collect(),
            slug,
        });
    }

    for refs in pending {
        for (i, target) in refs.related {
            let path = format!("related_technique_slugs[{}]", i);
            let message = if Some(target) == refs.slug {
                format!("technique lists itself ('{}') as related", target)
            } else if !slugs.contains_key(target) {
                format!("related technique '{}' does not exist", target)
            } else {
                continue;
            };
            report.warnings.push(Issue {
                origin: refs.origin.to_string(),
                path,
                message,
            });
        }
    }

    report
}

/// Validate and decode records into techniques, in record order.
///
/// Fails with [`CatalogError::Invalid`] carrying the full report when any
/// error was found; otherwise returns the techniques together with the
/// report's warnings.
pub fn parse_techniques(
    records: Vec<SourceRecord>,
    hierarchy: &HierarchyConfig,
    goals: &GoalCatalog,
) -> Result<(Vec<Technique>, ValidationReport), CatalogError> {
    let report = validate_records(&records, hierarchy, goals);
    if !report.is_ok() {
        return Err(CatalogError::Invalid(report));
    }
    let techniques = records
        .into_iter()
        .map(|record| {
            serde_json::from_value(record.value).map_err(|source| CatalogError::Decode {
                origin: record.origin,
                source,
            })
        })
        .collect::<Result<Vec<Technique>, _>>()?;
    Ok((techniques, report))
}
