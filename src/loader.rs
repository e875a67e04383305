//! Loading journals and extraction run outputs from a data directory
//!
//! Layout:
//! - `journals.jsonl`: one `{"journal_id", "text", ...}` object per line
//! - `llm_runs/<journal_id>.<run_id>.json`: `{"items": [...]}` per run

use crate::models::Item;
use crate::stability::Runs;
use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

pub const JOURNALS_FILE: &str = "journals.jsonl";
pub const RUNS_DIR: &str = "llm_runs";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("run file name '{0}' is not of the form <journal_id>.<run_id>.json")]
    BadRunFileName(String),

    #[error("{} has no 'items' array", .path.display())]
    MissingItems { path: PathBuf },
}

/// One journal entry
#[derive(Debug, Clone, Deserialize)]
pub struct Journal {
    pub journal_id: String,
    #[serde(default)]
    pub text: String,
}

/// journal id -> run id -> items
pub type JournalRuns = IndexMap<String, Runs>;

/// Load `journals.jsonl`, keyed by journal id in file order.
pub fn load_journals(path: &Path) -> Result<IndexMap<String, Journal>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read journals from {}", path.display()))?;

    let mut journals = IndexMap::new();
    for (lineno, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let journal: Journal = serde_json::from_str(line)
            .with_context(|| format!("{}:{}: invalid journal record", path.display(), lineno + 1))?;
        journals.insert(journal.journal_id.clone(), journal);
    }

    debug!("Loaded {} journals from {}", journals.len(), path.display());
    Ok(journals)
}

/// Split `<journal_id>.<run_id>[...].json` into its journal and run ids.
pub fn parse_run_file_name(name: &str) -> Result<(&str, &str), LoadError> {
    let mut parts = name.split('.');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(journal), Some(run), Some(_)) if !journal.is_empty() && !run.is_empty() => {
            Ok((journal, run))
        }
        _ => Err(LoadError::BadRunFileName(name.to_string())),
    }
}

fn items_from_value(value: Value, path: &Path) -> Result<Vec<Item>> {
    let raw = match value {
        Value::Array(items) => items,
        Value::Object(mut obj) => match obj.remove("items") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(LoadError::MissingItems {
                    path: path.to_path_buf(),
                }
                .into())
            }
        },
        _ => {
            return Err(LoadError::MissingItems {
                path: path.to_path_buf(),
            }
            .into())
        }
    };

    let mut items = Vec::with_capacity(raw.len());
    for (idx, entry) in raw.into_iter().enumerate() {
        if !entry.is_object() {
            warn!("{}: item {} is not an object, skipping", path.display(), idx);
            continue;
        }
        items.push(serde_json::from_value(entry)?);
    }
    Ok(items)
}

/// Load an item list from `{"items": [...]}` or a bare JSON array.
pub fn load_items(path: &Path) -> Result<Vec<Item>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    items_from_value(value, path)
}

/// Load every run file under `dir`, grouped by journal.
///
/// Files are visited in sorted name order, so journals and their runs come
/// out in lexicographic order regardless of directory listing order.
pub fn load_runs_dir(dir: &Path) -> Result<JournalRuns> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read runs directory {}", dir.display()))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    let mut by_journal = JournalRuns::new();
    for path in &paths {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| LoadError::BadRunFileName(path.display().to_string()))?;
        let (journal_id, run_id) = parse_run_file_name(name)?;

        let items = load_items(path)?;
        debug!("{}: run {} has {} items", journal_id, run_id, items.len());

        by_journal
            .entry(journal_id.to_string())
            .or_default()
            .insert(run_id.to_string(), items);
    }

    debug!(
        "Loaded {} run files for {} journals from {}",
        paths.len(),
        by_journal.len(),
        dir.display()
    );
    Ok(by_journal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Domain;

    #[test]
    fn test_parse_run_file_name() {
        assert_eq!(parse_run_file_name("j1.run1.json").unwrap(), ("j1", "run1"));
        assert_eq!(parse_run_file_name("j1.run1.v2.json").unwrap(), ("j1", "run1"));
        assert!(parse_run_file_name("j1.json").is_err());
        assert!(parse_run_file_name(".run1.json").is_err());
    }

    #[test]
    fn test_load_runs_dir_sorted_and_grouped() {
        let dir = tempfile::tempdir().unwrap();
        let write = |name: &str, body: &str| std::fs::write(dir.path().join(name), body).unwrap();

        write("j2.run1.json", r#"{"items": []}"#);
        write("j1.run2.json", r#"{"items": [{"domain": "food", "evidence_span": "rice"}]}"#);
        write("j1.run1.json", r#"{"items": [{"domain": "symptom", "evidence_span": "cough"}, "junk"]}"#);
        write("notes.txt", "ignored");

        let runs = load_runs_dir(dir.path()).unwrap();
        assert_eq!(runs.keys().collect::<Vec<_>>(), vec!["j1", "j2"]);

        let j1 = &runs["j1"];
        assert_eq!(j1.keys().collect::<Vec<_>>(), vec!["run1", "run2"]);
        assert_eq!(j1["run1"].len(), 1);
        assert_eq!(j1["run1"][0].domain, Some(Domain::Symptom));
        assert!(runs["j2"]["run1"].is_empty());
    }

    #[test]
    fn test_run_file_without_run_id_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("j1.run1.json"), r#"{"items": []}"#).unwrap();
        std::fs::write(dir.path().join("j1.json"), r#"{"items": []}"#).unwrap();

        let err = load_runs_dir(dir.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LoadError>(),
            Some(LoadError::BadRunFileName(name)) if name == "j1.json"
        ));
    }

    #[test]
    fn test_missing_items_array() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("j1.run1.json"), r#"{"output": []}"#).unwrap();

        let err = load_runs_dir(dir.path()).unwrap_err();
        assert!(err.downcast_ref::<LoadError>().is_some());
    }

    #[test]
    fn test_load_items_bare_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gold.json");
        std::fs::write(&path, r#"[{"domain": "mind", "evidence_span": "foggy"}]"#).unwrap();
        assert_eq!(load_items(&path).unwrap().len(), 1);
    }

    #[test]
    fn test_load_journals_skips_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(JOURNALS_FILE);
        std::fs::write(
            &path,
            "{\"journal_id\": \"j1\", \"text\": \"slept badly\"}\n\n{\"journal_id\": \"j2\", \"text\": \"ok\", \"lang\": \"en\"}\n",
        )
        .unwrap();

        let journals = load_journals(&path).unwrap();
        assert_eq!(journals.len(), 2);
        assert_eq!(journals["j1"].text, "slept badly");
    }
}
