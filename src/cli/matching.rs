//! Match command - score a prediction list against a gold list

use anyhow::Result;
use ashwam_eval::loader::load_items;
use ashwam_eval::matcher::{match_items, MatchOutcome, MatchScores};
use ashwam_eval::models::Item;
use console::style;
use serde::Serialize;
use std::path::Path;

/// JSON shape of a match result
#[derive(Debug, Serialize)]
struct MatchReport<'a> {
    scores: MatchScores,
    false_negatives: &'a [&'a Item],
    false_positives: &'a [&'a Item],
}

fn describe(item: &Item) -> String {
    format!(
        "{} \"{}\"",
        item.domain.map(|d| d.to_string()).unwrap_or_else(|| "?".into()),
        item.evidence_span.as_deref().unwrap_or("")
    )
}

fn render_text(outcome: &MatchOutcome<'_>) -> String {
    let scores = outcome.scores();
    let mut out = String::new();

    out.push_str(&format!(
        "\n{}  TP {}  FP {}  FN {}\n",
        style("Match").bold(),
        scores.true_positives,
        scores.false_positives,
        scores.false_negatives
    ));
    out.push_str(&format!(
        "Precision: {:.4}  Recall: {:.4}  F1: {}\n",
        scores.precision,
        scores.recall,
        style(format!("{:.4}", scores.f1)).bold()
    ));

    if !outcome.false_negatives.is_empty() {
        out.push_str(&format!("\n{}\n", style("Missed (in gold only)").yellow()));
        for item in &outcome.false_negatives {
            out.push_str(&format!("  - {}\n", describe(item)));
        }
    }
    if !outcome.false_positives.is_empty() {
        out.push_str(&format!("\n{}\n", style("Extra (in predictions only)").red()));
        for item in &outcome.false_positives {
            out.push_str(&format!("  + {}\n", describe(item)));
        }
    }
    out
}

fn render_json(outcome: &MatchOutcome<'_>) -> Result<String> {
    let report = MatchReport {
        scores: outcome.scores(),
        false_negatives: &outcome.false_negatives,
        false_positives: &outcome.false_positives,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

/// Run the match command
pub fn run(gold: &Path, pred: &Path, format: &str) -> Result<()> {
    let gold_items = load_items(gold)?;
    let pred_items = load_items(pred)?;
    tracing::info!(
        "Matching {} predictions against {} gold items",
        pred_items.len(),
        gold_items.len()
    );

    let outcome = match_items(&gold_items, &pred_items);
    let rendered = match format {
        "json" => render_json(&outcome)?,
        _ => render_text(&outcome),
    };
    println!("{}", rendered);
    Ok(())
}
