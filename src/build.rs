//! `tea build`: render the catalog into static JSON files.
//!
//! Rendering happens in the core crate. This module owns the filesystem side:
//! optional cleaning of managed directories, then writing every artifact with
//! bounded concurrency. A file whose current bytes already match is left
//! untouched so rebuilds do not churn modification times. Changed files are
//! written to a sibling temporary file and renamed into place. Files left in
//! the managed directories by earlier builds that the current catalog no
//! longer produces are removed afterwards.

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use walkdir::WalkDir;

use tea_techniques_core::aggregate::CatalogIndex;
use tea_techniques_core::artifacts::{render_artifacts, Artifact, RenderOptions, MANAGED_DIRS};

use crate::config::Config;
use crate::load::load_catalog;
use crate::progress::{BuildProgressEvent, BuildProgressReporter, ProgressMode};

/// Report writing progress every this many files.
const PROGRESS_EVERY: u64 = 100;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WriteSummary {
    pub written: usize,
    pub unchanged: usize,
    /// Stale files deleted from managed directories.
    pub removed: usize,
}

enum WriteOutcome {
    Written,
    Unchanged,
}

pub async fn run_build(config: &Config, clean: bool, progress: ProgressMode) -> Result<()> {
    let reporter = progress.reporter();
    reporter.report(BuildProgressEvent::Loading);

    let loaded = load_catalog(config)?;
    reporter.report(BuildProgressEvent::Loaded {
        records: loaded.techniques.len() as u64,
    });

    let index = CatalogIndex::build(
        &loaded.techniques,
        &loaded.catalog.hierarchy,
        &loaded.catalog.goals,
    );
    let artifacts = render_artifacts(
        &loaded.techniques,
        &index,
        RenderOptions {
            pretty: config.build.pretty,
        },
    )?;

    let output_dir = &config.data.output_dir;
    if clean || config.build.clean {
        clean_output(output_dir).await?;
    }

    let total = artifacts.len();
    let keep: HashSet<String> = artifacts.iter().map(|a| a.path.clone()).collect();
    let mut summary =
        write_artifacts(output_dir, artifacts, config.build.concurrency, reporter.as_ref()).await?;
    summary.removed = prune_stale(output_dir, &keep)?;

    tracing::info!(
        written = summary.written,
        unchanged = summary.unchanged,
        removed = summary.removed,
        "build complete"
    );
    println!(
        "Built {} techniques, {} goals, {} tags into {}",
        loaded.techniques.len(),
        index.goals.len(),
        index.tags.len(),
        output_dir.display()
    );
    println!(
        "  files: {} total ({} written, {} unchanged, {} removed)",
        total, summary.written, summary.unchanged, summary.removed
    );
    if loaded.warnings > 0 {
        eprintln!(
            "{} validation warning(s); run `tea validate` for details",
            loaded.warnings
        );
    }

    Ok(())
}

/// Remove the directories the renderer owns. Other files in the output
/// directory are left alone.
pub async fn clean_output(output_dir: &Path) -> Result<()> {
    for dir in MANAGED_DIRS {
        let path = output_dir.join(dir);
        match tokio::fs::remove_dir_all(&path).await {
            Ok(()) => tracing::debug!(path = %path.display(), "removed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to remove {}", path.display()))
            }
        }
    }
    Ok(())
}

/// Write artifacts under `output_dir` with at most `concurrency` files in
/// flight. Every file is attempted; failures are collected and reported
/// together.
pub async fn write_artifacts(
    output_dir: &Path,
    artifacts: Vec<Artifact>,
    concurrency: usize,
    reporter: &dyn BuildProgressReporter,
) -> Result<WriteSummary> {
    let total = artifacts.len() as u64;
    let done = AtomicU64::new(0);

    let results: Vec<(String, Result<WriteOutcome>)> = stream::iter(artifacts)
        .map(|artifact| {
            let done = &done;
            async move {
                let target = artifact_path(output_dir, &artifact.path);
                let result = write_if_changed(&target, &artifact.bytes).await;
                let n = done.fetch_add(1, Ordering::Relaxed) + 1;
                if n % PROGRESS_EVERY == 0 || n == total {
                    reporter.report(BuildProgressEvent::Writing { n, total });
                }
                (artifact.path, result)
            }
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    let mut summary = WriteSummary::default();
    let mut errors = Vec::new();
    for (path, result) in results {
        match result {
            Ok(WriteOutcome::Written) => summary.written += 1,
            Ok(WriteOutcome::Unchanged) => {
                tracing::trace!(path = %path, "unchanged");
                summary.unchanged += 1;
            }
            Err(e) => errors.push(format!("  {}: {:#}", path, e)),
        }
    }

    if !errors.is_empty() {
        errors.sort();
        anyhow::bail!(
            "Failed to write {} file(s):\n{}",
            errors.len(),
            errors.join("\n")
        );
    }
    Ok(summary)
}

/// Delete files under the managed directories whose relative path is not in
/// `keep`, then any directories left empty. Returns the number of files removed.
pub fn prune_stale(output_dir: &Path, keep: &HashSet<String>) -> Result<usize> {
    let mut removed = 0;
    for dir in MANAGED_DIRS {
        let root = output_dir.join(dir);
        if !root.is_dir() {
            continue;
        }
        for entry in WalkDir::new(&root).min_depth(1).contents_first(true) {
            let entry = entry?;
            let path = entry.path();
            if entry.file_type().is_dir() {
                // Only succeeds when empty
                if std::fs::remove_dir(path).is_ok() {
                    tracing::debug!(path = %path.display(), "removed empty directory");
                }
                continue;
            }
            let relative = path
                .strip_prefix(output_dir)
                .unwrap_or(path)
                .to_string_lossy()
                .replace('\\', "/");
            if keep.contains(&relative) {
                continue;
            }
            std::fs::remove_file(path)
                .with_context(|| format!("Failed to remove stale {}", path.display()))?;
            tracing::debug!(path = %relative, "removed stale artifact");
            removed += 1;
        }
    }
    Ok(removed)
}

fn artifact_path(output_dir: &Path, relative: &str) -> PathBuf {
    relative
        .split('/')
        .fold(output_dir.to_path_buf(), |path, segment| path.join(segment))
}

async fn write_if_changed(target: &Path, bytes: &[u8]) -> Result<WriteOutcome> {
    if let Ok(existing) = tokio::fs::read(target).await {
        if existing == bytes {
            return Ok(WriteOutcome::Unchanged);
        }
    }

    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let mut tmp = target.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    tokio::fs::write(&tmp, bytes)
        .await
        .with_context(|| format!("Failed to write {}", tmp.display()))?;
    tokio::fs::rename(&tmp, target)
        .await
        .with_context(|| format!("Failed to move {} into place", target.display()))?;
    Ok(WriteOutcome::Written)
}
