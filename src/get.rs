//! Technique retrieval by slug.
//!
//! Prints a technique's record together with its tags grouped the way the
//! technique page shows them: per goal dimension where a hierarchy exists,
//! flat by category otherwise.

use anyhow::{bail, Result};
use serde::Serialize;

use tea_techniques_core::models::Technique;
use tea_techniques_core::view::TechniqueTagView;

use crate::config::Config;
use crate::load::load_catalog;

#[derive(Debug, Serialize)]
pub struct TechniqueResponse {
    pub technique: Technique,
    pub tag_view: TechniqueTagView,
}

/// Core get function returning structured data.
pub fn get_technique(config: &Config, slug: &str, goal: Option<&str>) -> Result<TechniqueResponse> {
    let loaded = load_catalog(config)?;
    let Some(technique) = loaded.techniques.into_iter().find(|t| t.slug == slug) else {
        bail!("Technique not found: {}", slug);
    };
    let tag_view = TechniqueTagView::build(&technique, &loaded.catalog.hierarchy, goal);
    Ok(TechniqueResponse {
        technique,
        tag_view,
    })
}

pub fn run_get(config: &Config, slug: &str, goal: Option<&str>, json: bool) -> Result<()> {
    let resp = get_technique(config, slug, goal)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&resp)?);
        return Ok(());
    }

    let t = &resp.technique;
    println!("--- Technique ---");
    println!("slug:         {}", t.slug);
    println!("name:         {}", t.name);
    if let Some(acronym) = t.acronym() {
        println!("acronym:      {}", acronym);
    }
    println!("goals:        {}", t.assurance_goals.join(", "));
    if let Some(rating) = t.complexity() {
        println!("complexity:   {}/5", rating);
    }
    if let Some(rating) = t.computational_cost() {
        println!("cost:         {}/5", rating);
    }
    if !t.related_technique_slugs.is_empty() {
        println!("related:      {}", t.related_technique_slugs.join(", "));
    }
    println!();

    println!("--- Description ---");
    println!("{}", t.description);
    println!();

    for goal in &resp.tag_view.goals {
        println!("--- {} ---", goal.goal);
        for dim in &goal.dimensions {
            println!("[{}]", dim.name);
            for tag in &dim.tags {
                println!("  {}", tag);
            }
        }
        println!();
    }

    if !resp.tag_view.flat.is_empty() {
        println!("--- Tags ---");
        for (category, tags) in &resp.tag_view.flat {
            println!("[{}]", category);
            for tag in tags {
                println!("  {}", tag);
            }
        }
        println!();
    }

    if !t.resources.is_empty() {
        println!("--- Resources ({}) ---", t.resources.len());
        for resource in &t.resources {
            println!("{}", resource.title);
            println!("  {}", resource.url);
        }
        println!();
    }

    if !t.limitations.is_empty() {
        println!("--- Limitations ({}) ---", t.limitations.len());
        for limitation in &t.limitations {
            println!("- {}", limitation.description);
        }
        println!();
    }

    Ok(())
}
