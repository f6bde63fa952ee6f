//! `tea search`: keyword search over the technique catalog.
//!
//! Uses the same corpus that `search-index.json` is built from, so results
//! match what the static site search sees.

use anyhow::{bail, Result};

use tea_techniques_core::search::{search, SearchEntry, SearchHit, SearchRequest};

use crate::config::Config;
use crate::load::load_catalog;

pub const DEFAULT_LIMIT: usize = 10;

/// Core search function returning structured hits.
pub fn search_catalog(
    config: &Config,
    query: &str,
    goal: Option<&str>,
    limit: Option<usize>,
) -> Result<Vec<SearchHit>> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT);
    if limit == 0 {
        bail!("--limit must be >= 1");
    }

    let loaded = load_catalog(config)?;
    let entries: Vec<SearchEntry> = loaded
        .techniques
        .iter()
        .map(SearchEntry::from_technique)
        .collect();

    Ok(search(
        &entries,
        &SearchRequest { query, goal, limit },
    ))
}

pub fn run_search(
    config: &Config,
    query: &str,
    goal: Option<&str>,
    limit: Option<usize>,
) -> Result<()> {
    if query.trim().is_empty() {
        bail!("Search query must not be empty");
    }

    let hits = search_catalog(config, query, goal, limit)?;
    if hits.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for (i, hit) in hits.iter().enumerate() {
        println!("{}. [{:.2}] {}", i + 1, hit.score, hit.name);
        println!("    slug: {}", hit.slug);
        println!("    matched: {}", hit.matched.join(", "));
        println!();
    }
    Ok(())
}
