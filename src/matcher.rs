//! Evidence-grounded matching between extracted items
//!
//! Two items describe the same observation when they share a domain and
//! their evidence spans overlap. The same rule drives cross-run alignment
//! (`stability::align`) and gold-vs-prediction scoring (`match_items`).

use crate::models::Item;
use crate::stability::metrics::rate;
use serde::Serialize;

/// Returns true if one span is contained in the other.
///
/// Containment is exact and case-sensitive. A missing or empty span never
/// overlaps anything.
pub fn spans_overlap(span_a: Option<&str>, span_b: Option<&str>) -> bool {
    match (span_a, span_b) {
        (Some(a), Some(b)) if !a.is_empty() && !b.is_empty() => a.contains(b) || b.contains(a),
        _ => false,
    }
}

/// Same domain (both present) and overlapping evidence.
pub fn items_similar(a: &Item, b: &Item) -> bool {
    match (a.domain, b.domain) {
        (Some(da), Some(db)) if da == db => {
            spans_overlap(a.evidence_span.as_deref(), b.evidence_span.as_deref())
        }
        _ => false,
    }
}

/// Result of matching a gold list against a prediction list
#[derive(Debug, Default)]
pub struct MatchOutcome<'a> {
    pub matched: Vec<(&'a Item, &'a Item)>,
    pub false_negatives: Vec<&'a Item>,
    pub false_positives: Vec<&'a Item>,
}

impl MatchOutcome<'_> {
    pub fn scores(&self) -> MatchScores {
        MatchScores::from_counts(
            self.matched.len(),
            self.false_positives.len(),
            self.false_negatives.len(),
        )
    }
}

/// Precision/recall summary of a match, rounded to 4 places
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MatchScores {
    pub true_positives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

impl MatchScores {
    pub fn from_counts(tp: usize, fp: usize, fn_: usize) -> Self {
        let precision = rate(tp, tp + fp);
        let recall = rate(tp, tp + fn_);
        let f1 = if tp == 0 {
            0.0
        } else {
            // Harmonic mean on unrounded precision/recall.
            rate(2 * tp, 2 * tp + fp + fn_)
        };
        Self {
            true_positives: tp,
            false_positives: fp,
            false_negatives: fn_,
            precision,
            recall,
            f1,
        }
    }
}

/// Pair each gold item with the first unused prediction it is similar to.
///
/// Matching is one-to-one and greedy in gold order; it does not search for
/// an optimal assignment.
pub fn match_items<'a>(gold: &'a [Item], pred: &'a [Item]) -> MatchOutcome<'a> {
    let mut used_gold = vec![false; gold.len()];
    let mut used_pred = vec![false; pred.len()];
    let mut matched = Vec::new();

    for (gi, g) in gold.iter().enumerate() {
        let hit = pred
            .iter()
            .enumerate()
            .find(|(pi, p)| !used_pred[*pi] && items_similar(g, p));

        if let Some((pi, p)) = hit {
            matched.push((g, p));
            used_gold[gi] = true;
            used_pred[pi] = true;
        }
    }

    MatchOutcome {
        matched,
        false_negatives: gold
            .iter()
            .zip(&used_gold)
            .filter(|(_, used)| !**used)
            .map(|(g, _)| g)
            .collect(),
        false_positives: pred
            .iter()
            .zip(&used_pred)
            .filter(|(_, used)| !**used)
            .map(|(p, _)| p)
            .collect(),
    }
}
