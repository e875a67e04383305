//! Init command - write an example ashwam.toml into a data directory

use anyhow::{Context, Result};
use ashwam_eval::config::TOML_CONFIG;
use ashwam_eval::loader::RUNS_DIR;
use console::style;
use std::path::Path;

const EXAMPLE_CONFIG: &str = r#"# ashwam-eval configuration
# CLI flags override these values.

[stability]
# How global polarity-flip / bucket-drift totals are counted:
#   "exact"  - sum of per-journal event counts
#   "legacy" - sum of trunc(rate * clusters), matches older reports
event_counting = "exact"

# Drop items whose fields are out of vocabulary or whose evidence span
# is not found verbatim in journals.jsonl before aligning runs
validate_items = false

[output]
stable_outputs = "stable_outputs.jsonl"
summary = "stability_summary.json"
per_journal = "per_journal_stability.jsonl"

[defaults]
# Console format (text, json, markdown)
format = "text"

# Parallel workers (default: one per CPU)
# workers = 4
"#;

/// Run the init command
pub fn run(path: &Path) -> Result<()> {
    let data_path = path
        .canonicalize()
        .with_context(|| format!("Path does not exist: {}", path.display()))?;

    if !data_path.is_dir() {
        anyhow::bail!("Path is not a directory: {}", data_path.display());
    }

    let config_path = data_path.join(TOML_CONFIG);
    if config_path.exists() {
        println!(
            "{} Already initialized at {}",
            style("✓").green(),
            style(config_path.display()).cyan()
        );
    } else {
        std::fs::write(&config_path, EXAMPLE_CONFIG)
            .with_context(|| format!("Failed to create {}", config_path.display()))?;
        println!(
            "{} Created {}",
            style("✓").green(),
            style(config_path.display()).cyan()
        );
    }

    if !data_path.join(RUNS_DIR).is_dir() {
        println!(
            "{} No {}/ directory yet; add <journal_id>.<run_id>.json files there",
            style("!").yellow(),
            RUNS_DIR
        );
    }

    println!("\nNext steps:");
    println!(
        "  {} Evaluate stability",
        style(format!("ashwam-eval stability --data {} --out out", path.display())).cyan()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ashwam_eval::config::{load_project_config, EventCounting};

    #[test]
    fn test_example_config_parses() {
        let dir = tempfile::tempdir().unwrap();
        run(dir.path()).unwrap();

        let config = load_project_config(dir.path());
        assert_eq!(config.stability.event_counting, EventCounting::Exact);
        assert!(!config.stability.validate_items);
        assert_eq!(config.defaults.format.as_deref(), Some("text"));
        assert_eq!(config.defaults.workers, None);
    }

    #[test]
    fn test_init_keeps_existing_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(TOML_CONFIG);
        std::fs::write(&path, "[stability]\nevent_counting = \"legacy\"\n").unwrap();

        run(dir.path()).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("legacy"));
    }

    #[test]
    fn test_init_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(run(&dir.path().join("nope")).is_err());
    }
}
