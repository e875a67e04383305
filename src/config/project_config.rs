//! Project-level configuration support
//!
//! Loads per-dataset configuration from `ashwam.toml` or `.ashwamrc.json`
//! in the data directory.
//!
//! # Configuration Format
//!
//! ```toml
//! # ashwam.toml
//!
//! [stability]
//! event_counting = "exact"   # or "legacy"
//! validate_items = false
//!
//! [output]
//! stable_outputs = "stable_outputs.jsonl"
//! summary = "stability_summary.json"
//! per_journal = "per_journal_stability.jsonl"
//!
//! [defaults]
//! format = "text"
//! workers = 4
//! ```

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, warn};

/// How global polarity-flip / bucket-drift event totals are derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventCounting {
    /// Sum the raw per-journal event counts
    #[default]
    Exact,
    /// Sum `trunc(rounded_rate * total_clusters)` per journal; lossy, kept
    /// so totals line up with reports produced by the earlier tooling
    Legacy,
}

impl FromStr for EventCounting {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "exact" => Ok(EventCounting::Exact),
            "legacy" => Ok(EventCounting::Legacy),
            _ => Err(anyhow!(
                "Unknown event counting '{}'. Valid values: exact, legacy",
                s
            )),
        }
    }
}

impl std::fmt::Display for EventCounting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventCounting::Exact => write!(f, "exact"),
            EventCounting::Legacy => write!(f, "legacy"),
        }
    }
}

/// Stability pass settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StabilityConfig {
    #[serde(default)]
    pub event_counting: EventCounting,

    /// Drop items that fail schema/evidence validation before aligning
    #[serde(default)]
    pub validate_items: bool,
}

/// Output file names, relative to the output directory
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub stable_outputs: String,
    pub summary: String,
    pub per_journal: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            stable_outputs: "stable_outputs.jsonl".to_string(),
            summary: "stability_summary.json".to_string(),
            per_journal: "per_journal_stability.jsonl".to_string(),
        }
    }
}

/// Default CLI flags
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CliDefaults {
    /// Default console format (text, json, markdown)
    #[serde(default)]
    pub format: Option<String>,

    /// Default number of workers
    #[serde(default)]
    pub workers: Option<usize>,
}

/// Project-level configuration loaded from ashwam.toml or .ashwamrc.json
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub stability: StabilityConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub defaults: CliDefaults,
}

pub const TOML_CONFIG: &str = "ashwam.toml";
pub const JSON_CONFIG: &str = ".ashwamrc.json";

/// Load configuration from `dir`, falling back to defaults.
///
/// A config file that fails to parse is reported and skipped, never fatal.
pub fn load_project_config(dir: &Path) -> ProjectConfig {
    // Try TOML first (preferred format)
    let toml_path = dir.join(TOML_CONFIG);
    if toml_path.exists() {
        match load_toml_config(&toml_path) {
            Ok(config) => {
                debug!("Loaded project config from {}", toml_path.display());
                return config;
            }
            Err(e) => {
                warn!("Failed to load {}: {}", toml_path.display(), e);
            }
        }
    }

    let json_path = dir.join(JSON_CONFIG);
    if json_path.exists() {
        match load_json_config(&json_path) {
            Ok(config) => {
                debug!("Loaded project config from {}", json_path.display());
                return config;
            }
            Err(e) => {
                warn!("Failed to load {}: {}", json_path.display(), e);
            }
        }
    }

    debug!("No project config found, using defaults");
    ProjectConfig::default()
}

/// Load configuration from a TOML file
fn load_toml_config(path: &Path) -> anyhow::Result<ProjectConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: ProjectConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Load configuration from a JSON file
fn load_json_config(path: &Path) -> anyhow::Result<ProjectConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: ProjectConfig = serde_json::from_str(&content)?;
    Ok(config)
}
