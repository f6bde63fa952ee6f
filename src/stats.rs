//! Catalog statistics.
//!
//! Summarizes what the input contains: technique and tag counts, per-goal
//! coverage and per-category tag usage. Used by `tea stats` to sanity check a
//! dataset before building.

use anyhow::Result;

use tea_techniques_core::aggregate::CatalogIndex;

use crate::config::Config;
use crate::load::load_catalog;

pub fn run_stats(config: &Config) -> Result<()> {
    let loaded = load_catalog(config)?;
    let index = CatalogIndex::build(
        &loaded.techniques,
        &loaded.catalog.hierarchy,
        &loaded.catalog.goals,
    );

    let input_size: u64 = loaded
        .files
        .iter()
        .filter_map(|p| std::fs::metadata(p).ok())
        .map(|m| m.len())
        .sum();

    println!("TEA Techniques — Catalog Stats");
    println!("==============================");
    println!();
    println!("  Input:       {}", config.data.input.display());
    println!(
        "  Files:       {} ({})",
        loaded.files.len(),
        format_bytes(input_size)
    );
    println!(
        "  Modified:    {}",
        loaded
            .modified
            .map(|m| format_ts_relative(m.timestamp()))
            .unwrap_or_else(|| "unknown".to_string())
    );
    println!("  Output:      {}", config.data.output_dir.display());
    println!();
    println!("  Techniques:  {}", loaded.techniques.len());
    println!("  Tags:        {}", index.tags.len());
    println!("  Categories:  {}", index.categories.len());
    println!("  Warnings:    {}", loaded.warnings);

    if !index.goals.is_empty() {
        println!();
        println!("  By goal:");
        println!(
            "  {:<24} {:>10} {:>10}   {}",
            "GOAL", "TECHNIQUES", "DIMENSIONS", "HIERARCHY"
        );
        println!("  {}", "-".repeat(60));
        for goal in &index.goals {
            println!(
                "  {:<24} {:>10} {:>10}   {}",
                goal.info.name,
                goal.techniques.len(),
                goal.dimensions.len(),
                if goal.has_hierarchy { "yes" } else { "-" }
            );
        }
    }

    if !index.categories.is_empty() {
        println!();
        println!("  By tag category:");
        println!("  {:<32} {:>6} {:>6}", "CATEGORY", "TAGS", "USES");
        println!("  {}", "-".repeat(46));
        for (category, tags) in &index.categories {
            let uses: usize = tags.iter().map(|t| index.tag_count(t)).sum();
            println!("  {:<32} {:>6} {:>6}", category, tags.len(), uses);
        }
    }

    println!();
    Ok(())
}

/// Format a byte count as a human-readable string.
fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}

/// Format a Unix timestamp relative to now, e.g. "3 hours ago".
fn format_ts_relative(ts: i64) -> String {
    let delta = chrono::Utc::now().timestamp() - ts;

    if delta < 0 {
        return format_ts_iso(ts);
    }

    if delta < 60 {
        "just now".to_string()
    } else if delta < 3600 {
        let mins = delta / 60;
        format!("{} min{} ago", mins, if mins == 1 { "" } else { "s" })
    } else if delta < 86400 {
        let hours = delta / 3600;
        format!("{} hour{} ago", hours, if hours == 1 { "" } else { "s" })
    } else if delta < 86400 * 30 {
        let days = delta / 86400;
        format!("{} day{} ago", days, if days == 1 { "" } else { "s" })
    } else {
        format_ts_iso(ts)
    }
}

fn format_ts_iso(ts: i64) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| ts.to_string())
}
