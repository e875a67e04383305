//! JSON reporter
//!
//! Outputs the full StabilityReport as pretty-printed JSON.
//! Useful for machine consumption, piping to jq, or further processing.

use crate::report::StabilityReport;
use anyhow::Result;

/// Render report as JSON
pub fn render(report: &StabilityReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}
