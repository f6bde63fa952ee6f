//! Reading technique records from disk.
//!
//! `data.input` is either a single JSON file or a directory. Directories are
//! walked with `walkdir` and filtered with the configured include/exclude
//! globs; files are read in sorted relative-path order so record order is
//! stable across machines. The output directory is skipped if it lives
//! inside the input tree.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use tea_techniques_core::models::Technique;
use tea_techniques_core::validate::{parse_techniques, records_from_json, SourceRecord};
use tea_techniques_core::CatalogError;

use crate::config::{Catalog, Config};

/// Raw records plus a little provenance for reporting.
#[derive(Debug)]
pub struct LoadedInput {
    pub records: Vec<SourceRecord>,
    pub files: Vec<PathBuf>,
    /// Newest modification time across the input files.
    pub modified: Option<DateTime<Utc>>,
}

/// Validated techniques ready for indexing.
#[derive(Debug)]
pub struct LoadedCatalog {
    pub techniques: Vec<Technique>,
    pub catalog: Catalog,
    pub files: Vec<PathBuf>,
    pub modified: Option<DateTime<Utc>>,
    pub warnings: usize,
}

pub fn load_records(config: &Config) -> Result<LoadedInput> {
    let input = &config.data.input;
    if !input.exists() {
        bail!("Input does not exist: {}", input.display());
    }

    let files = if input.is_file() {
        vec![input.clone()]
    } else {
        discover_files(config)?
    };
    tracing::debug!(count = files.len(), input = %input.display(), "discovered input files");

    let mut records = Vec::new();
    let mut modified: Option<DateTime<Utc>> = None;
    for path in &files {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let origin = origin_label(input, path);
        records.extend(records_from_json(&origin, &text)?);

        if let Ok(time) = std::fs::metadata(path).and_then(|m| m.modified()) {
            let time = DateTime::<Utc>::from(time);
            modified = Some(modified.map_or(time, |m| m.max(time)));
        }
    }

    Ok(LoadedInput {
        records,
        files,
        modified,
    })
}

/// Load, validate and decode. Validation warnings are logged; errors fail
/// with the full report.
pub fn load_catalog(config: &Config) -> Result<LoadedCatalog> {
    let catalog = config.catalog()?;
    let input = load_records(config)?;

    let (techniques, report) =
        match parse_techniques(input.records, &catalog.hierarchy, &catalog.goals) {
            Ok(parsed) => parsed,
            Err(CatalogError::Invalid(report)) => {
                for issue in &report.errors {
                    tracing::error!("{}", issue);
                }
                bail!(
                    "{} validation error(s) in technique data; run `tea validate` for the full report",
                    report.errors.len()
                );
            }
            Err(e) => return Err(e.into()),
        };

    for issue in &report.warnings {
        tracing::warn!("{}", issue);
    }

    Ok(LoadedCatalog {
        techniques,
        catalog,
        files: input.files,
        modified: input.modified,
        warnings: report.warnings.len(),
    })
}

fn discover_files(config: &Config) -> Result<Vec<PathBuf>> {
    let root = &config.data.input;
    let include_set = build_globset(&config.data.include_globs)?;
    let mut excludes = vec!["**/.git/**".to_string(), "**/node_modules/**".to_string()];
    excludes.extend(config.data.exclude_globs.iter().cloned());
    let exclude_set = build_globset(&excludes)?;

    let output_dir = &config.data.output_dir;
    let mut files = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.starts_with(output_dir) {
            continue;
        }

        let relative = path.strip_prefix(root).unwrap_or(path);
        let rel_str = relative.to_string_lossy().replace('\\', "/");

        if exclude_set.is_match(&rel_str) {
            continue;
        }
        if !include_set.is_match(&rel_str) {
            continue;
        }
        files.push(path.to_path_buf());
    }

    files.sort();
    Ok(files)
}

fn origin_label(input: &Path, path: &Path) -> String {
    if input == path {
        return path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
    }
    path.strip_prefix(input)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern).with_context(|| format!("Invalid glob: {}", pattern))?);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BuildConfig, DataConfig};
    use std::collections::BTreeMap;
    use std::fs;
    use tempfile::TempDir;

    fn config_for(input: PathBuf, output_dir: PathBuf) -> Config {
        Config {
            data: DataConfig {
                input,
                output_dir,
                include_globs: vec!["**/*.json".to_string()],
                exclude_globs: vec!["**/drafts/**".to_string()],
            },
            build: BuildConfig::default(),
            goals: Vec::new(),
            hierarchy: BTreeMap::new(),
        }
    }

    fn technique_json(slug: &str) -> String {
        serde_json::json!({
            "slug": slug,
            "name": slug.to_uppercase(),
            "description": "Test technique.",
            "assurance_goals": ["Explainability"],
            "tags": ["explanatory-scope/local"],
            "related_technique_slugs": [],
            "resources": [],
            "example_use_cases": [],
            "limitations": []
        })
        .to_string()
    }

    #[test]
    fn test_directory_input_sorted_and_filtered() {
        let dir = TempDir::new().unwrap();
        let data = dir.path().join("data");
        fs::create_dir_all(data.join("drafts")).unwrap();
        fs::create_dir_all(data.join("out")).unwrap();
        fs::write(data.join("b.json"), technique_json("bravo")).unwrap();
        fs::write(data.join("a.json"), format!("[{}]", technique_json("alpha"))).unwrap();
        fs::write(data.join("notes.md"), "ignored").unwrap();
        fs::write(data.join("drafts/c.json"), technique_json("charlie")).unwrap();
        fs::write(data.join("out/techniques.json"), "[]").unwrap();

        let config = config_for(data.clone(), data.join("out"));
        let loaded = load_records(&config).unwrap();
        let origins: Vec<&str> = loaded.records.iter().map(|r| r.origin.as_str()).collect();
        assert_eq!(origins, vec!["a.json[0]", "b.json"]);
        assert_eq!(loaded.files.len(), 2);
        assert!(loaded.modified.is_some());
    }

    #[test]
    fn test_load_catalog_from_file() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("techniques.json");
        fs::write(
            &input,
            format!("[{}, {}]", technique_json("alpha"), technique_json("bravo")),
        )
        .unwrap();

        let loaded = load_catalog(&config_for(input, dir.path().join("out"))).unwrap();
        let slugs: Vec<&str> = loaded.techniques.iter().map(|t| t.slug.as_str()).collect();
        assert_eq!(slugs, vec!["alpha", "bravo"]);
    }

    #[test]
    fn test_load_catalog_rejects_invalid() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("techniques.json");
        fs::write(&input, r#"[{"slug": "x"}]"#).unwrap();
        let err = load_catalog(&config_for(input, dir.path().join("out"))).unwrap_err();
        assert!(err.to_string().contains("validation error"));
    }

    #[test]
    fn test_missing_input() {
        let dir = TempDir::new().unwrap();
        let config = config_for(dir.path().join("missing.json"), dir.path().join("out"));
        assert!(load_records(&config).is_err());
    }
}
