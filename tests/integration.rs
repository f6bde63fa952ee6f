use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn tea_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("tea");
    path
}

fn techniques() -> Value {
    json!([
        {
            "slug": "shapley-additive-explanations",
            "name": "SHapley Additive exPlanations",
            "acronym": "SHAP",
            "description": "Attributes a prediction to input features using Shapley values from cooperative game theory.",
            "assurance_goals": ["Explainability", "Fairness"],
            "tags": [
                "assurance-goal-category/explainability/attribution-methods/shapley-values",
                "assurance-goal-category/explainability/property",
                "assurance-goal-category/explainability/property/consistency",
                "explanatory-scope/local",
                "explanatory-scope/global",
                "data-type/tabular",
                "applicable-models/agnostic"
            ],
            "related_technique_slugs": ["local-interpretable-model-agnostic-explanations"],
            "resources": [
                {
                    "title": "A Unified Approach to Interpreting Model Predictions",
                    "url": "https://arxiv.org/abs/1705.07874",
                    "authors": ["Scott M. Lundberg", "Su-In Lee"],
                    "source_type": "technical_paper"
                }
            ],
            "example_use_cases": [
                {"description": "Explaining credit decisions to applicants.", "goal": "Explainability"}
            ],
            "limitations": [{"description": "Exact computation is exponential in the number of features."}],
            "complexity_rating": 4,
            "computational_cost_rating": 4
        },
        {
            "slug": "local-interpretable-model-agnostic-explanations",
            "name": "Local Interpretable Model-Agnostic Explanations",
            "acronym": "LIME",
            "description": "Fits a simple surrogate model around a single prediction.",
            "assurance_goals": ["Explainability"],
            "tags": [
                "assurance-goal-category/explainability/model-approximation/local-surrogate",
                "explanatory-scope/local",
                "data-type/tabular",
                "data-type/text"
            ],
            "related_technique_slugs": ["shapley-additive-explanations"],
            "resources": [],
            "example_use_cases": [],
            "limitations": [{"description": "Explanations can be unstable across runs."}]
        },
        {
            "slug": "differential-privacy",
            "name": "Differential Privacy",
            "description": "Adds calibrated noise so individual records cannot be identified.",
            "assurance_goals": ["Privacy"],
            "tags": [
                "assurance-goal-category/privacy/formal-guarantee",
                "data-type/any",
                "technique-type/algorithmic"
            ],
            "related_technique_slugs": [],
            "resources": [],
            "example_use_cases": [],
            "limitations": []
        }
    ])
}

fn setup_test_env(data: &Value) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();
    let data_dir = root.join("data");
    fs::create_dir_all(&data_dir).unwrap();
    fs::write(
        data_dir.join("techniques.json"),
        serde_json::to_string_pretty(data).unwrap(),
    )
    .unwrap();

    let config_content = format!(
        r#"[data]
input = "{root}/data/techniques.json"
output_dir = "{root}/public/data"

[build]
pretty = true
concurrency = 4
"#,
        root = root.display()
    );
    let config_path = config_dir.join("tea.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_tea(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = tea_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run tea binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

fn build(config_path: &Path) {
    let (stdout, stderr, success) = run_tea(config_path, &["build", "--progress", "off"]);
    assert!(success, "build failed: stdout={}, stderr={}", stdout, stderr);
}

fn read_json(out: &Path, relative: &str) -> Value {
    let path = out.join(relative);
    let text = fs::read_to_string(&path).unwrap_or_else(|e| panic!("read {:?}: {}", path, e));
    serde_json::from_str(&text).unwrap()
}

/// Every file under `dir`, relative path → bytes.
fn snapshot(dir: &Path) -> Vec<(PathBuf, Vec<u8>)> {
    let mut files = Vec::new();
    let mut stack = vec![dir.to_path_buf()];
    while let Some(current) = stack.pop() {
        for entry in fs::read_dir(&current).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                stack.push(path);
            } else {
                let bytes = fs::read(&path).unwrap();
                files.push((path.strip_prefix(dir).unwrap().to_path_buf(), bytes));
            }
        }
    }
    files.sort();
    files
}

#[test]
fn test_build_writes_expected_tree() {
    let (tmp, config_path) = setup_test_env(&techniques());
    let (stdout, stderr, success) = run_tea(&config_path, &["build", "--progress", "off"]);
    assert!(success, "build failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("Built 3 techniques"));

    let out = tmp.path().join("public/data");
    for path in [
        "techniques.json",
        "techniques-metadata.json",
        "assurance-goals.json",
        "tags.json",
        "search-index.json",
        "search-manifest.json",
        "techniques/differential-privacy.json",
        "categories/explainability.json",
        "categories/explainability/index.json",
        "categories/explainability/explanatory-scope/index.json",
        "categories/privacy.json",
        "search/privacy-index.json",
        "filters/data-type/tabular.json",
        "filters/assurance-goal-category/explainability--property--consistency.json",
    ] {
        assert!(out.join(path).is_file(), "missing {}", path);
    }
    assert!(!out.join("categories/privacy").exists());
}

#[test]
fn test_rebuild_is_byte_identical() {
    let (tmp, config_path) = setup_test_env(&techniques());
    let out = tmp.path().join("public/data");

    build(&config_path);
    let first = snapshot(&out);

    let (stdout, _, success) = run_tea(&config_path, &["build", "--progress", "off"]);
    assert!(success);
    assert!(stdout.contains("0 written"), "unexpected rewrite: {}", stdout);
    assert_eq!(first, snapshot(&out));

    let (_, _, success) = run_tea(&config_path, &["build", "--clean", "--progress", "off"]);
    assert!(success);
    assert_eq!(first, snapshot(&out));
}

#[test]
fn test_per_technique_files_round_trip() {
    let (tmp, config_path) = setup_test_env(&techniques());
    build(&config_path);
    let out = tmp.path().join("public/data");

    let listing = read_json(&out, "techniques.json");
    let listing = listing.as_array().unwrap();
    assert_eq!(listing.len(), 3);
    for (input, listed) in techniques().as_array().unwrap().iter().zip(listing) {
        let slug = input["slug"].as_str().unwrap();
        let single = read_json(&out, &format!("techniques/{}.json", slug));
        assert_eq!(&single, listed);
        assert_eq!(&single, input);
    }
}

#[test]
fn test_tag_counts_and_filters() {
    let (tmp, config_path) = setup_test_env(&techniques());
    build(&config_path);
    let out = tmp.path().join("public/data");

    let tags = read_json(&out, "tags.json");
    let tags = tags.as_array().unwrap();
    let count = |tag: &str| {
        tags.iter()
            .find(|t| t["tag"] == tag)
            .map(|t| t["count"].as_u64().unwrap())
    };
    assert_eq!(count("data-type/tabular"), Some(2));
    assert_eq!(count("explanatory-scope/local"), Some(2));
    assert_eq!(count("technique-type/algorithmic"), Some(1));
    assert_eq!(count("data-type/image"), None);

    let filter = read_json(&out, "filters/data-type/tabular.json");
    assert_eq!(filter["count"], 2);
    assert_eq!(filter["techniques"][0]["slug"], "shapley-additive-explanations");
}

#[test]
fn test_goal_pages_and_dimensions() {
    let (tmp, config_path) = setup_test_env(&techniques());
    build(&config_path);
    let out = tmp.path().join("public/data");

    let goals = read_json(&out, "assurance-goals.json");
    let goals = goals.as_array().unwrap();
    assert_eq!(goals.len(), 7);
    assert_eq!(goals[0]["slug"], "explainability");
    assert_eq!(goals[0]["technique_count"], 2);
    assert_eq!(goals[0]["has_hierarchy"], true);

    let overview = read_json(&out, "categories/explainability/index.json");
    let keys: Vec<&str> = overview["categories"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["category"].as_str().unwrap())
        .collect();
    assert_eq!(
        keys,
        vec!["explanatory-scope", "attribution-methods", "model-approximation", "property"]
    );

    let scope = read_json(&out, "categories/explainability/explanatory-scope/index.json");
    assert_eq!(scope["technique_count"], 2);
    assert_eq!(scope["subcategory_count"], 2);

    let manifest = read_json(&out, "search-manifest.json");
    assert_eq!(manifest["goals"]["privacy"], "search/privacy-index.json");
    let privacy = read_json(&out, "search/privacy-index.json");
    assert_eq!(privacy.as_array().unwrap().len(), 1);
}

#[test]
fn test_validate_reports_all_errors() {
    let mut data = techniques();
    data[1]["slug"] = json!("shapley-additive-explanations");
    data[2].as_object_mut().unwrap().remove("description");
    let (tmp, config_path) = setup_test_env(&data);

    let (stdout, _, success) = run_tea(&config_path, &["validate"]);
    assert!(!success);
    assert!(stdout.contains("duplicate slug"), "stdout: {}", stdout);
    assert!(stdout.contains("techniques.json[2]: description: missing required field"));
    assert!(stdout.contains("2 error(s)"));

    let (_, stderr, success) = run_tea(&config_path, &["build", "--progress", "off"]);
    assert!(!success);
    assert!(stderr.contains("validation error"));
    assert!(!tmp.path().join("public/data/techniques.json").exists());
}

#[test]
fn test_validate_strict_fails_on_warnings() {
    let mut data = techniques();
    data[2]["assurance_goals"] = json!(["Privacy", "Robustness"]);
    let (_tmp, config_path) = setup_test_env(&data);

    let (stdout, _, success) = run_tea(&config_path, &["validate"]);
    assert!(success, "stdout: {}", stdout);
    assert!(stdout.contains("unknown assurance goal 'Robustness'"));

    let (_, _, success) = run_tea(&config_path, &["validate", "--strict"]);
    assert!(!success);
}

#[test]
fn test_rebuild_removes_artifacts_of_deleted_techniques() {
    let (tmp, config_path) = setup_test_env(&techniques());
    let out = tmp.path().join("public/data");
    build(&config_path);
    assert!(out.join("techniques/differential-privacy.json").is_file());
    assert!(out.join("filters/technique-type/algorithmic.json").is_file());
    fs::write(out.join("README.txt"), "hand written").unwrap();

    let mut data = techniques();
    data.as_array_mut().unwrap().pop();
    fs::write(
        tmp.path().join("data/techniques.json"),
        serde_json::to_string_pretty(&data).unwrap(),
    )
    .unwrap();

    let (stdout, stderr, success) = run_tea(&config_path, &["build", "--progress", "off"]);
    assert!(success, "build failed: stdout={}, stderr={}", stdout, stderr);
    assert!(!stdout.contains(" 0 removed"), "nothing pruned: {}", stdout);

    let listing = read_json(&out, "techniques.json");
    assert_eq!(listing.as_array().unwrap().len(), 2);
    assert!(!out.join("techniques/differential-privacy.json").exists());
    assert!(!out.join("filters/technique-type/algorithmic.json").exists());
    assert!(!out.join("filters/technique-type").exists());
    assert!(out.join("techniques/shapley-additive-explanations.json").is_file());
    assert!(out.join("filters/data-type/tabular.json").is_file());
    assert!(out.join("README.txt").is_file());

    // A pruned tree matches a clean build of the same input
    let pruned = snapshot(&out);
    let (_, _, success) = run_tea(&config_path, &["build", "--clean", "--progress", "off"]);
    assert!(success);
    assert_eq!(pruned, snapshot(&out));
}

#[test]
fn test_goal_differing_in_case_fails_validate_and_build() {
    let mut data = techniques();
    data[2]["assurance_goals"] = json!(["privacy"]);
    let (tmp, config_path) = setup_test_env(&data);

    let (stdout, _, success) = run_tea(&config_path, &["validate"]);
    assert!(!success, "stdout: {}", stdout);
    assert!(
        stdout.contains("goal 'privacy' has the same slug 'privacy' as goal 'Privacy'"),
        "stdout: {}",
        stdout
    );

    let (_, stderr, success) = run_tea(&config_path, &["build", "--progress", "off"]);
    assert!(!success);
    assert!(stderr.contains("validation error"), "stderr: {}", stderr);
    assert!(!tmp.path().join("public/data/techniques.json").exists());
}

#[test]
fn test_json_progress_reports_loaded_after_validation() {
    let (_tmp, config_path) = setup_test_env(&techniques());
    let (_, stderr, success) = run_tea(&config_path, &["build", "--progress", "json"]);
    assert!(success, "stderr: {}", stderr);

    let events: Vec<Value> = stderr
        .lines()
        .filter_map(|line| serde_json::from_str::<Value>(line).ok())
        .filter(|event| event["event"] == "progress")
        .collect();
    let phases: Vec<&str> = events.iter().filter_map(|e| e["phase"].as_str()).collect();
    assert_eq!(&phases[..2], &["loading", "loaded"]);
    assert!(phases[2..].iter().all(|phase| *phase == "writing"));
    assert_eq!(events[1]["records"], 3);
    let last = events.last().unwrap();
    assert_eq!(last["n"], last["total"]);

    let mut data = techniques();
    data[0].as_object_mut().unwrap().remove("name");
    let (_tmp, config_path) = setup_test_env(&data);
    let (_, stderr, success) = run_tea(&config_path, &["build", "--progress", "json"]);
    assert!(!success);
    assert!(stderr.contains(r#""phase":"loading""#), "stderr: {}", stderr);
    assert!(!stderr.contains(r#""phase":"loaded""#), "stderr: {}", stderr);
}

#[test]
fn test_search_ranks_name_matches() {
    let (_tmp, config_path) = setup_test_env(&techniques());

    let (stdout, stderr, success) = run_tea(&config_path, &["search", "privacy"]);
    assert!(success, "search failed: {}", stderr);
    assert!(stdout.starts_with("1. [1.00] Differential Privacy"), "stdout: {}", stdout);

    let (stdout, _, success) = run_tea(
        &config_path,
        &["search", "explanations", "--goal", "fairness"],
    );
    assert!(success);
    assert!(stdout.contains("slug: shapley-additive-explanations"));
    assert!(!stdout.contains("local-interpretable"));

    let (stdout, _, success) = run_tea(&config_path, &["search", "zebra"]);
    assert!(success);
    assert!(stdout.contains("No results."));
}

#[test]
fn test_get_shows_grouped_tags() {
    let (_tmp, config_path) = setup_test_env(&techniques());

    let (stdout, stderr, success) = run_tea(&config_path, &["get", "shapley-additive-explanations"]);
    assert!(success, "get failed: {}", stderr);
    assert!(stdout.contains("acronym:      SHAP"));
    assert!(stdout.contains("--- Explainability ---"));
    assert!(stdout.contains("[Attribution Methods]"));
    assert!(stdout.contains("[data-type]"));
    assert!(!stdout.contains("  assurance-goal-category/explainability/property\n"));

    let (stdout, _, success) = run_tea(
        &config_path,
        &["get", "shapley-additive-explanations", "--json"],
    );
    assert!(success);
    let value: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(value["technique"]["slug"], "shapley-additive-explanations");

    let (_, stderr, success) = run_tea(&config_path, &["get", "nope"]);
    assert!(!success);
    assert!(stderr.contains("Technique not found"));
}

#[test]
fn test_stats_summary() {
    let (_tmp, config_path) = setup_test_env(&techniques());
    let (stdout, stderr, success) = run_tea(&config_path, &["stats"]);
    assert!(success, "stats failed: {}", stderr);
    assert!(stdout.contains("Techniques:  3"));
    assert!(stdout.contains("Explainability"));
    assert!(stdout.contains("data-type"));
}
