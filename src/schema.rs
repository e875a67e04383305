//! Schema and evidence validation for extracted items
//!
//! An item is valid when its domain, polarity and time bucket are in the
//! vocabulary, the bucket that applies to its domain is present, and its
//! evidence span occurs verbatim in the journal text.

use crate::models::Item;
use crate::stability::Runs;
use thiserror::Error;
use tracing::debug;

/// Why an item was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaViolation {
    #[error("domain is missing or not one of symptom, food, emotion, mind")]
    InvalidDomain,

    #[error("polarity is missing or not one of present, absent, uncertain")]
    InvalidPolarity,

    #[error("time_bucket is missing or not one of today, last_night, past_week, unknown")]
    InvalidTimeBucket,

    #[error("{field} is missing or not one of low, medium, high, unknown")]
    InvalidBucket { field: &'static str },

    #[error("evidence span is missing or not found verbatim in the journal text")]
    EvidenceNotInText,

    #[error("journal '{0}' has no text to check evidence against")]
    UnknownJournal(String),
}

/// True if `span` is a non-empty, exact substring of `journal_text`.
pub fn is_valid_evidence_span(span: Option<&str>, journal_text: &str) -> bool {
    matches!(span, Some(s) if !s.is_empty() && journal_text.contains(s))
}

/// Check a single item, reporting the first violation found.
pub fn validate_item(item: &Item, journal_text: &str) -> Result<(), SchemaViolation> {
    if item.domain.is_none() {
        return Err(SchemaViolation::InvalidDomain);
    }
    if item.polarity.is_none() {
        return Err(SchemaViolation::InvalidPolarity);
    }
    if item.time_bucket.is_none() {
        return Err(SchemaViolation::InvalidTimeBucket);
    }
    if !is_valid_evidence_span(item.evidence_span.as_deref(), journal_text) {
        return Err(SchemaViolation::EvidenceNotInText);
    }
    if item.bucket().is_none() {
        return Err(SchemaViolation::InvalidBucket {
            field: item.bucket_field(),
        });
    }
    Ok(())
}

/// Items that passed validation, plus what was dropped and why
#[derive(Debug, Default)]
pub struct Validated {
    pub valid: Vec<Item>,
    /// (index in the input list, reason)
    pub rejected: Vec<(usize, SchemaViolation)>,
}

/// Keep only the valid items, in input order.
pub fn validate_items(items: &[Item], journal_text: &str) -> Validated {
    let mut out = Validated::default();
    for (idx, item) in items.iter().enumerate() {
        match validate_item(item, journal_text) {
            Ok(()) => out.valid.push(item.clone()),
            Err(reason) => out.rejected.push((idx, reason)),
        }
    }
    out
}

/// Validate every run of one journal.
///
/// Returns the runs with invalid items removed (runs left empty are kept,
/// they still count toward the run total) and how many items were dropped.
pub fn validate_runs(runs: &Runs, journal_text: &str) -> (Runs, usize) {
    let mut dropped = 0;
    let filtered = runs
        .iter()
        .map(|(run_id, items)| {
            let validated = validate_items(items, journal_text);
            for (idx, reason) in &validated.rejected {
                debug!("run {}: dropping item {}: {}", run_id, idx, reason);
            }
            dropped += validated.rejected.len();
            (run_id.clone(), validated.valid)
        })
        .collect();
    (filtered, dropped)
}
