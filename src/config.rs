use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tea_techniques_core::goals::{GoalCatalog, GoalInfo};
use tea_techniques_core::hierarchy::{GoalHierarchy, HierarchyConfig};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub data: DataConfig,
    #[serde(default)]
    pub build: BuildConfig,
    /// Replaces the built-in goal catalog when non-empty.
    #[serde(default)]
    pub goals: Vec<GoalInfo>,
    /// Replaces the built-in hierarchy when non-empty. Keyed by goal slug.
    #[serde(default)]
    pub hierarchy: BTreeMap<String, GoalHierarchy>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DataConfig {
    /// A JSON file or a directory of JSON files.
    pub input: PathBuf,
    pub output_dir: PathBuf,
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
    #[serde(default)]
    pub exclude_globs: Vec<String>,
}

fn default_include_globs() -> Vec<String> {
    vec!["**/*.json".to_string()]
}

#[derive(Debug, Deserialize, Clone)]
pub struct BuildConfig {
    #[serde(default = "default_pretty")]
    pub pretty: bool,
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default)]
    pub clean: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            pretty: true,
            concurrency: 16,
            clean: false,
        }
    }
}

fn default_pretty() -> bool {
    true
}
fn default_concurrency() -> usize {
    16
}

/// Everything a command needs besides the technique data itself.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub goals: GoalCatalog,
    pub hierarchy: HierarchyConfig,
}

impl Config {
    /// Goal catalog and hierarchy, falling back to the built-in ones.
    pub fn catalog(&self) -> Result<Catalog> {
        let goals = if self.goals.is_empty() {
            GoalCatalog::builtin()
        } else {
            GoalCatalog::new(self.goals.clone())
        };
        let hierarchy = if self.hierarchy.is_empty() {
            HierarchyConfig::builtin()
        } else {
            HierarchyConfig::new(self.hierarchy.clone()).context("Invalid [hierarchy] config")?
        };
        Ok(Catalog { goals, hierarchy })
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let mut config: Config =
        toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    // Relative data paths resolve against the config file's directory
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    if config.data.input.is_relative() {
        config.data.input = base.join(&config.data.input);
    }
    if config.data.output_dir.is_relative() {
        config.data.output_dir = base.join(&config.data.output_dir);
    }

    if config.build.concurrency == 0 {
        anyhow::bail!("build.concurrency must be > 0");
    }

    if config.data.include_globs.is_empty() {
        anyhow::bail!("data.include_globs must not be empty");
    }

    for goal in &config.goals {
        if goal.name.trim().is_empty() {
            anyhow::bail!("goals: every goal needs a non-empty name");
        }
    }

    // Surface hierarchy problems at load time rather than mid-build
    config.catalog()?;

    Ok(config)
}
