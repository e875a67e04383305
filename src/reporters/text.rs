//! Text (terminal) reporter with colors and formatting

use super::{agreement_band, instability_band, RateBand};
use crate::report::{JournalStability, StabilityReport};
use anyhow::Result;

/// Maximum journals listed in the breakdown
const MAX_JOURNALS: usize = 20;

/// Reset ANSI color
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

fn band_color(band: RateBand) -> &'static str {
    match band {
        RateBand::Good => "\x1b[32m", // Green
        RateBand::Fair => "\x1b[33m", // Yellow
        RateBand::Poor => "\x1b[31m", // Red
    }
}

fn agreement(rate: f64) -> String {
    let c = band_color(agreement_band(rate));
    format!("{c}{:.4}{RESET}", rate)
}

fn instability(rate: f64) -> String {
    let c = band_color(instability_band(rate));
    format!("{c}{:.4}{RESET}", rate)
}

/// Render report as formatted terminal output
pub fn render(report: &StabilityReport) -> Result<String> {
    let mut out = String::new();
    let s = &report.summary;

    out.push_str(&format!("\n{BOLD}Run-to-Run Stability{RESET}\n"));
    out.push_str(&format!(
        "{DIM}──────────────────────────────────────{RESET}\n"
    ));
    out.push_str(&format!(
        "Journals: {}  Clusters: {}  Stable: {}  Agreement: {}\n",
        report.total_journals,
        s.total_clusters,
        s.stable_clusters,
        agreement(s.overall_agreement_rate)
    ));
    out.push_str(&format!(
        "Polarity flips: {}  Bucket drifts: {}  {DIM}({} counting){RESET}\n",
        s.polarity_flip_events, s.bucket_drift_events, report.event_counting
    ));
    if report.rejected_items > 0 {
        out.push_str(&format!(
            "{DIM}{} items dropped by validation{RESET}\n",
            report.rejected_items
        ));
    }
    out.push('\n');

    if report.journals.is_empty() {
        out.push_str(&format!("{DIM}No journals evaluated.{RESET}\n"));
        return Ok(out);
    }

    out.push_str(&format!("{BOLD}JOURNALS{RESET}\n"));
    out.push_str(&format!(
        "  {DIM}{:<16} {:>9} {:>9} {:>9} {:>8}{RESET}\n",
        "journal", "agree", "flip", "drift", "stable"
    ));

    // Least stable first
    let mut rows: Vec<&JournalStability> = report.journals.iter().collect();
    rows.sort_by(|a, b| {
        a.agreement_rate
            .total_cmp(&b.agreement_rate)
            .then_with(|| a.journal_id.cmp(&b.journal_id))
    });

    for row in rows.iter().take(MAX_JOURNALS) {
        out.push_str(&format!(
            "  {:<16} {:>18} {:>18} {:>18} {:>4}/{:<3}\n",
            truncate(&row.journal_id, 16),
            agreement(row.agreement_rate),
            instability(row.polarity_flip_rate),
            instability(row.bucket_drift_rate),
            row.stable_clusters,
            row.total_clusters
        ));
    }
    if rows.len() > MAX_JOURNALS {
        out.push_str(&format!(
            "  {DIM}... and {} more{RESET}\n",
            rows.len() - MAX_JOURNALS
        ));
    }

    Ok(out)
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}
