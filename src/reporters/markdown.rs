//! Markdown reporter for GitHub-flavored Markdown output
//!
//! Generates reports suitable for pull request comments and evaluation
//! write-ups.

use super::{agreement_band, instability_band, RateBand};
use crate::report::StabilityReport;
use anyhow::Result;
use chrono::Local;

/// Render report as GitHub-flavored Markdown
pub fn render(report: &StabilityReport) -> Result<String> {
    let mut md = String::new();

    md.push_str("# Run-to-Run Stability Report\n\n");

    md.push_str(&render_summary(report));
    md.push('\n');

    md.push_str(&render_journals(report));
    md.push('\n');

    md.push_str(&render_footer());

    Ok(md)
}

fn render_summary(report: &StabilityReport) -> String {
    let s = &report.summary;
    let mut out = format!(
        r#"## Summary

| Metric | Value |
|--------|-------|
| **Journals** | {} |
| **Clusters** | {} |
| **Stable Clusters** | {} |
| **Overall Agreement** | {:.4} {} |
| **Polarity Flip Events** | {} |
| **Bucket Drift Events** | {} |
| **Event Counting** | {} |
"#,
        report.total_journals,
        s.total_clusters,
        s.stable_clusters,
        s.overall_agreement_rate,
        indicator(agreement_band(s.overall_agreement_rate)),
        s.polarity_flip_events,
        s.bucket_drift_events,
        report.event_counting,
    );
    if report.rejected_items > 0 {
        out.push_str(&format!(
            "| **Items Dropped by Validation** | {} |\n",
            report.rejected_items
        ));
    }
    out
}

fn render_journals(report: &StabilityReport) -> String {
    let mut out = String::from("## Journals\n\n");

    if report.journals.is_empty() {
        out.push_str("_No journals evaluated._\n");
        return out;
    }

    out.push_str("| Journal | Agreement | Polarity Flip | Bucket Drift | Stable / Total |\n");
    out.push_str("|---------|-----------|---------------|--------------|----------------|\n");
    for row in &report.journals {
        out.push_str(&format!(
            "| `{}` | {:.4} {} | {:.4} {} | {:.4} {} | {} / {} |\n",
            row.journal_id.replace('|', "\\|"),
            row.agreement_rate,
            indicator(agreement_band(row.agreement_rate)),
            row.polarity_flip_rate,
            indicator(instability_band(row.polarity_flip_rate)),
            row.bucket_drift_rate,
            indicator(instability_band(row.bucket_drift_rate)),
            row.stable_clusters,
            row.total_clusters,
        ));
    }
    out
}

fn render_footer() -> String {
    format!(
        "---\n\n*Generated by ashwam-eval on {}*\n",
        Local::now().format("%Y-%m-%d %H:%M")
    )
}

fn indicator(band: RateBand) -> &'static str {
    match band {
        RateBand::Good => "✅",
        RateBand::Fair => "⚠️",
        RateBand::Poor => "❌",
    }
}
