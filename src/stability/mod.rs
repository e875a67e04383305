//! Run-to-run stability analysis
//!
//! Given N independent extraction runs over one journal:
//! - `aligner` groups items from different runs into clusters that describe
//!   the same observation,
//! - `metrics` measures how consistently the runs agree,
//! - `aggregator` collapses each cluster into one stable item by majority vote.
//!
//! Everything here is pure and per-journal; nothing is shared across journals.

pub mod aggregator;
pub mod aligner;
pub mod metrics;

pub use aggregator::{aggregate, aggregate_cluster, majority_vote};
pub use aligner::align;
pub use metrics::{
    compute_agreement_rate, compute_bucket_drift_rate, compute_polarity_flip_rate,
    count_bucket_drifts, count_full_agreement, count_polarity_flips, EventCount,
};

use crate::models::{Item, StableItem};
use crate::report::JournalStability;
use indexmap::IndexMap;
use serde::Serialize;

/// Run id -> items that run produced, in iteration order
pub type Runs = IndexMap<String, Vec<Item>>;

/// Items from different runs judged to be the same observation.
///
/// Members keep insertion order. A run holds at most one slot; inserting
/// again for the same run replaces the item but keeps the slot's position.
/// Equality is order-sensitive, since the first member is the template.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Cluster<'a> {
    members: IndexMap<&'a str, &'a Item>,
}

impl<'a> Cluster<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn singleton(run_id: &'a str, item: &'a Item) -> Self {
        let mut cluster = Self::new();
        cluster.insert(run_id, item);
        cluster
    }

    /// Put `item` in `run_id`'s slot, returning the item it replaced.
    pub fn insert(&mut self, run_id: &'a str, item: &'a Item) -> Option<&'a Item> {
        self.members.insert(run_id, item)
    }

    /// Number of runs present in this cluster
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn get(&self, run_id: &str) -> Option<&'a Item> {
        self.members.get(run_id).copied()
    }

    /// First member in insertion order; the aggregation template
    pub fn first(&self) -> Option<(&'a str, &'a Item)> {
        self.members.first().map(|(run, item)| (*run, *item))
    }

    pub fn run_ids(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.members.keys().copied()
    }

    pub fn items(&self) -> impl Iterator<Item = &'a Item> + '_ {
        self.members.values().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a Item)> + '_ {
        self.members.iter().map(|(run, item)| (*run, *item))
    }
}

impl PartialEq for Cluster<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.iter().eq(other.iter())
    }
}

/// Everything one journal's stability pass produces
#[derive(Debug, Clone)]
pub struct JournalEvaluation {
    pub stability: JournalStability,
    pub stable_items: Vec<StableItem>,
    pub polarity_flips: EventCount,
    pub bucket_drifts: EventCount,
}

/// Align, measure and aggregate one journal's runs.
pub fn evaluate_journal(journal_id: &str, runs: &Runs) -> JournalEvaluation {
    let clusters = align(runs);
    let total_runs = runs.len();

    let stability = JournalStability {
        journal_id: journal_id.to_string(),
        agreement_rate: compute_agreement_rate(&clusters, total_runs),
        polarity_flip_rate: compute_polarity_flip_rate(&clusters),
        bucket_drift_rate: compute_bucket_drift_rate(&clusters),
        total_clusters: clusters.len(),
        stable_clusters: count_full_agreement(&clusters, total_runs),
    };

    tracing::debug!(
        "{}: {} runs -> {} clusters ({} stable)",
        journal_id,
        total_runs,
        stability.total_clusters,
        stability.stable_clusters
    );

    JournalEvaluation {
        stability,
        stable_items: aggregate(&clusters),
        polarity_flips: count_polarity_flips(&clusters),
        bucket_drifts: count_bucket_drifts(&clusters),
    }
}
