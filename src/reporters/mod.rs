//! Console reporters for stability results
//!
//! Supports multiple output formats:
//! - `text` - Terminal output with colors
//! - `json` - Machine-readable JSON
//! - `markdown` - GitHub-flavored Markdown

mod json;
mod markdown;
mod text;

use crate::report::StabilityReport;
use anyhow::{anyhow, Result};
use std::str::FromStr;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Markdown,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" | "terminal" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            _ => Err(anyhow!(
                "Unknown format '{}'. Valid formats: text, json, markdown",
                s
            )),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

/// Render a stability report in the specified format
pub fn report(report: &StabilityReport, format: &str) -> Result<String> {
    let fmt = OutputFormat::from_str(format)?;
    report_with_format(report, fmt)
}

/// Render a stability report using an OutputFormat enum
pub fn report_with_format(report: &StabilityReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => text::render(report),
        OutputFormat::Json => json::render(report),
        OutputFormat::Markdown => markdown::render(report),
    }
}

/// Color band for a rate where higher is better (agreement)
pub(crate) fn agreement_band(rate: f64) -> RateBand {
    if rate >= 0.8 {
        RateBand::Good
    } else if rate >= 0.5 {
        RateBand::Fair
    } else {
        RateBand::Poor
    }
}

/// Color band for a rate where lower is better (flips, drift)
pub(crate) fn instability_band(rate: f64) -> RateBand {
    agreement_band(1.0 - rate)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RateBand {
    Good,
    Fair,
    Poor,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::EventCounting;
    use crate::report::{JournalStability, StabilitySummary};

    /// Create a small StabilityReport for testing
    pub(crate) fn test_report() -> StabilityReport {
        StabilityReport {
            summary: StabilitySummary {
                total_clusters: 5,
                stable_clusters: 3,
                overall_agreement_rate: 0.6,
                polarity_flip_events: 1,
                bucket_drift_events: 2,
            },
            journals: vec![
                JournalStability {
                    journal_id: "j001".into(),
                    agreement_rate: 0.6667,
                    polarity_flip_rate: 0.0,
                    bucket_drift_rate: 0.3333,
                    total_clusters: 3,
                    stable_clusters: 2,
                },
                JournalStability {
                    journal_id: "j002".into(),
                    agreement_rate: 0.5,
                    polarity_flip_rate: 0.5,
                    bucket_drift_rate: 0.5,
                    total_clusters: 2,
                    stable_clusters: 1,
                },
            ],
            event_counting: EventCounting::Exact,
            total_journals: 2,
            rejected_items: 0,
        }
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!(OutputFormat::from_str("text").unwrap(), OutputFormat::Text);
        assert_eq!(OutputFormat::from_str("JSON").unwrap(), OutputFormat::Json);
        assert_eq!(
            OutputFormat::from_str("md").unwrap(),
            OutputFormat::Markdown
        );
        assert!(OutputFormat::from_str("sarif").is_err());
    }

    #[test]
    fn test_rate_bands() {
        assert_eq!(agreement_band(0.9), RateBand::Good);
        assert_eq!(agreement_band(0.5), RateBand::Fair);
        assert_eq!(agreement_band(0.1), RateBand::Poor);
        assert_eq!(instability_band(0.0), RateBand::Good);
        assert_eq!(instability_band(0.75), RateBand::Poor);
    }
}
