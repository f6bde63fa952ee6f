//! Static artifact rendering.
//!
//! Maps a [`CatalogIndex`] onto the JSON files read by the statically
//! generated pages. Rendering is pure: it returns `(relative path, bytes)`
//! pairs and leaves writing to the caller.
//!
//! Consuming pages use a different vocabulary from the index: a dimension is
//! a `category` and a grouped tag is a `subcategory`.
//!
//! | Path | Contents |
//! |------|----------|
//! | `techniques.json` | full technique records |
//! | `techniques-metadata.json` | lightweight records |
//! | `techniques/<slug>.json` | one full record |
//! | `assurance-goals.json` | goals with counts |
//! | `tags.json` | unique tags with counts |
//! | `search-index.json` | search corpus |
//! | `search/<goal>-index.json` | per-goal search corpus |
//! | `search-manifest.json` | goal slug → search index path |
//! | `categories/<goal>.json` | goal technique subset |
//! | `categories/<goal>/index.json` | dimension overview |
//! | `categories/<goal>/<dimension>/index.json` | subcategories and counts |
//! | `filters/<category>/<tag-slug>.json` | tag technique subset |

use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

use crate::aggregate::{CatalogIndex, DimensionIndex, GoalIndex};
use crate::error::CatalogError;
use crate::models::{Technique, TechniqueSummary};
use crate::search::SearchEntry;
use crate::tag::{tag_display_value, tag_slug};

pub const TECHNIQUES_FILE: &str = "techniques.json";
pub const TECHNIQUES_METADATA_FILE: &str = "techniques-metadata.json";
pub const ASSURANCE_GOALS_FILE: &str = "assurance-goals.json";
pub const TAGS_FILE: &str = "tags.json";
pub const SEARCH_INDEX_FILE: &str = "search-index.json";
pub const SEARCH_MANIFEST_FILE: &str = "search-manifest.json";

/// Output subdirectories wholly owned by the renderer.
pub const MANAGED_DIRS: &[&str] = &["techniques", "categories", "filters", "search"];

/// One rendered output file.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    /// Relative to the output directory, `/`-separated.
    pub path: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub pretty: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { pretty: true }
    }
}

#[derive(Serialize)]
struct GoalRef<'a> {
    name: &'a str,
    slug: &'a str,
    description: &'a str,
}

impl<'a> From<&'a GoalIndex> for GoalRef<'a> {
    fn from(goal: &'a GoalIndex) -> Self {
        Self {
            name: &goal.info.name,
            slug: &goal.slug,
            description: &goal.info.description,
        }
    }
}

#[derive(Serialize)]
struct AssuranceGoalEntry<'a> {
    name: &'a str,
    slug: &'a str,
    description: &'a str,
    technique_count: usize,
    has_hierarchy: bool,
}

#[derive(Serialize)]
struct TagEntry<'a> {
    tag: &'a str,
    category: &'a str,
    name: String,
    count: usize,
}

#[derive(Serialize)]
struct SearchManifest {
    all: String,
    goals: BTreeMap<String, String>,
}

#[derive(Serialize)]
struct CategoryPage<'a> {
    goal: GoalRef<'a>,
    technique_count: usize,
    techniques: Vec<TechniqueSummary<'a>>,
}

#[derive(Serialize)]
struct DimensionOverview<'a> {
    category: &'a str,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    icon: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    order: Option<u32>,
    subcategory_count: usize,
    technique_count: usize,
    path: String,
}

#[derive(Serialize)]
struct GoalDimensionsPage<'a> {
    goal: GoalRef<'a>,
    categories: Vec<DimensionOverview<'a>>,
}

#[derive(Serialize)]
struct Subcategory<'a> {
    tag: &'a str,
    name: String,
    slug: String,
    count: usize,
}

#[derive(Serialize)]
struct DimensionPage<'a> {
    goal: GoalRef<'a>,
    category: &'a str,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    icon: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    order: Option<u32>,
    subcategory_count: usize,
    technique_count: usize,
    subcategories: Vec<Subcategory<'a>>,
    techniques: Vec<&'a str>,
}

#[derive(Serialize)]
struct FilterPage<'a> {
    tag: &'a str,
    category: &'a str,
    name: String,
    count: usize,
    techniques: Vec<TechniqueSummary<'a>>,
}

/// Replace characters that do not belong in a file name.
fn path_segment(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        "_".to_string()
    } else {
        cleaned
    }
}

pub fn goal_search_path(goal_slug: &str) -> String {
    format!("search/{}-index.json", path_segment(goal_slug))
}

pub fn dimension_path(goal_slug: &str, key: &str) -> String {
    format!(
        "categories/{}/{}/index.json",
        path_segment(goal_slug),
        path_segment(key)
    )
}

pub fn filter_path(tag: &str) -> String {
    format!(
        "filters/{}/{}.json",
        path_segment(crate::tag::tag_category(tag)),
        path_segment(&tag_slug(tag))
    )
}

struct Renderer<'a> {
    techniques: &'a [Technique],
    options: RenderOptions,
    artifacts: Vec<Artifact>,
    paths: HashSet<String>,
}

impl<'a> Renderer<'a> {
    fn emit<T: Serialize>(&mut self, path: String, value: &T) -> Result<(), CatalogError> {
        let mut bytes = if self.options.pretty {
            serde_json::to_vec_pretty(value)
        } else {
            serde_json::to_vec(value)
        }
        .map_err(|source| CatalogError::Serialize {
            path: path.clone(),
            source,
        })?;
        bytes.push(b'\n');
        if !self.paths.insert(path.clone()) {
            return Err(CatalogError::PathCollision { path });
        }
        self.artifacts.push(Artifact { path, bytes });
        Ok(())
    }

    fn summaries(&self, positions: &[usize]) -> Vec<TechniqueSummary<'a>> {
        positions
            .iter()
            .map(|&pos| TechniqueSummary::from(&self.techniques[pos]))
            .collect()
    }

    fn dimension_page(&self, goal: &'a GoalIndex, dim: &'a DimensionIndex) -> DimensionPage<'a> {
        DimensionPage {
            goal: GoalRef::from(goal),
            category: &dim.config.key,
            name: &dim.config.name,
            description: dim.config.description.as_deref(),
            icon: dim.config.icon.as_deref(),
            order: dim.config.order,
            subcategory_count: dim.subcategories.len(),
            technique_count: dim.techniques.len(),
            subcategories: dim
                .subcategories
                .iter()
                .map(|(tag, &count)| Subcategory {
                    tag,
                    name: tag_display_value(tag),
                    slug: tag_slug(tag),
                    count,
                })
                .collect(),
            techniques: dim
                .techniques
                .iter()
                .map(|&pos| self.techniques[pos].slug.as_str())
                .collect(),
        }
    }
}

/// Render every artifact for a catalog, in a deterministic order.
pub fn render_artifacts(
    techniques: &[Technique],
    index: &CatalogIndex,
    options: RenderOptions,
) -> Result<Vec<Artifact>, CatalogError> {
    let mut r = Renderer {
        techniques,
        options,
        artifacts: Vec::new(),
        paths: HashSet::new(),
    };

    r.emit(TECHNIQUES_FILE.to_string(), &techniques)?;
    let all: Vec<usize> = (0..techniques.len()).collect();
    let metadata = r.summaries(&all);
    r.emit(TECHNIQUES_METADATA_FILE.to_string(), &metadata)?;
    for technique in techniques {
        r.emit(format!("techniques/{}.json", path_segment(&technique.slug)), technique)?;
    }

    let goals: Vec<AssuranceGoalEntry<'_>> = index
        .goals
        .iter()
        .map(|g| AssuranceGoalEntry {
            name: &g.info.name,
            slug: &g.slug,
            description: &g.info.description,
            technique_count: g.techniques.len(),
            has_hierarchy: g.has_hierarchy,
        })
        .collect();
    r.emit(ASSURANCE_GOALS_FILE.to_string(), &goals)?;

    let tags: Vec<TagEntry<'_>> = index
        .tags
        .iter()
        .map(|(tag, stat)| TagEntry {
            tag,
            category: &stat.category,
            name: tag_display_value(tag),
            count: stat.count,
        })
        .collect();
    r.emit(TAGS_FILE.to_string(), &tags)?;

    r.emit(SEARCH_INDEX_FILE.to_string(), &index.search)?;
    let mut manifest = SearchManifest {
        all: SEARCH_INDEX_FILE.to_string(),
        goals: BTreeMap::new(),
    };
    for goal in &index.goals {
        let entries: Vec<&SearchEntry> = goal.techniques.iter().map(|&pos| &index.search[pos]).collect();
        let path = goal_search_path(&goal.slug);
        r.emit(path.clone(), &entries)?;
        manifest.goals.insert(goal.slug.clone(), path);
    }
    r.emit(SEARCH_MANIFEST_FILE.to_string(), &manifest)?;

    for goal in &index.goals {
        let page = CategoryPage {
            goal: GoalRef::from(goal),
            technique_count: goal.techniques.len(),
            techniques: r.summaries(&goal.techniques),
        };
        r.emit(format!("categories/{}.json", path_segment(&goal.slug)), &page)?;

        if !goal.has_hierarchy {
            continue;
        }
        let overview = GoalDimensionsPage {
            goal: GoalRef::from(goal),
            categories: goal
                .dimensions
                .iter()
                .map(|dim| DimensionOverview {
                    category: &dim.config.key,
                    name: &dim.config.name,
                    description: dim.config.description.as_deref(),
                    icon: dim.config.icon.as_deref(),
                    order: dim.config.order,
                    subcategory_count: dim.subcategories.len(),
                    technique_count: dim.techniques.len(),
                    path: dimension_path(&goal.slug, &dim.config.key),
                })
                .collect(),
        };
        r.emit(format!("categories/{}/index.json", path_segment(&goal.slug)), &overview)?;

        for dim in &goal.dimensions {
            let page = r.dimension_page(goal, dim);
            r.emit(dimension_path(&goal.slug, &dim.config.key), &page)?;
        }
    }

    for (tag, stat) in &index.tags {
        let page = FilterPage {
            tag,
            category: &stat.category,
            name: tag_display_value(tag),
            count: stat.count,
            techniques: r.summaries(&stat.techniques),
        };
        r.emit(filter_path(tag), &page)?;
    }

    Ok(r.artifacts)
}
