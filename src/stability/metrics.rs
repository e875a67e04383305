//! Run-to-run stability metrics over aligned clusters
//!
//! Each rate is a pure function of the cluster list, lies in [0, 1], is
//! rounded to 4 decimal places and falls back to 0.0 when nothing can be
//! evaluated. The raw counters behind the rates are public so callers can
//! report exact event counts.

use super::Cluster;
use serde::Serialize;
use std::collections::HashSet;
use std::hash::Hash;

/// Round to 4 decimal places, exact halves to even
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round_ties_even() / 10_000.0
}

/// `numerator / denominator` rounded to 4 places, 0.0 for an empty denominator
pub fn rate(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    round4(numerator as f64 / denominator as f64)
}

/// How many clusters showed an event, out of how many could show one
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EventCount {
    pub events: usize,
    pub evaluated: usize,
}

impl EventCount {
    pub fn rate(&self) -> f64 {
        rate(self.events, self.evaluated)
    }
}

fn distinct<T: Eq + Hash>(values: impl Iterator<Item = Option<T>>) -> usize {
    values.flatten().collect::<HashSet<_>>().len()
}

/// Clusters in which every run is present
pub fn count_full_agreement(clusters: &[Cluster<'_>], total_runs: usize) -> usize {
    clusters.iter().filter(|c| c.len() == total_runs).count()
}

/// Fraction of clusters in which every run is present.
pub fn compute_agreement_rate(clusters: &[Cluster<'_>], total_runs: usize) -> f64 {
    rate(count_full_agreement(clusters, total_runs), clusters.len())
}

/// Clusters with two or more distinct polarities, out of clusters with any polarity
pub fn count_polarity_flips(clusters: &[Cluster<'_>]) -> EventCount {
    let mut count = EventCount::default();
    for cluster in clusters {
        let polarities = distinct(cluster.items().map(|i| i.polarity));
        if polarities > 1 {
            count.events += 1;
        }
        if polarities > 0 {
            count.evaluated += 1;
        }
    }
    count
}

/// Fraction of polarity-bearing clusters whose runs disagree on polarity.
///
/// Clusters where no member has a polarity are left out entirely.
pub fn compute_polarity_flip_rate(clusters: &[Cluster<'_>]) -> f64 {
    count_polarity_flips(clusters).rate()
}

/// True if members disagree on intensity, arousal or time bucket.
///
/// Both intensity and arousal are checked on every member, whatever its domain.
fn has_bucket_drift(cluster: &Cluster<'_>) -> bool {
    distinct(cluster.items().map(|i| i.intensity_bucket)) > 1
        || distinct(cluster.items().map(|i| i.arousal_bucket)) > 1
        || distinct(cluster.items().map(|i| i.time_bucket)) > 1
}

/// Drifting clusters, out of non-empty clusters
pub fn count_bucket_drifts(clusters: &[Cluster<'_>]) -> EventCount {
    let mut count = EventCount::default();
    for cluster in clusters.iter().filter(|c| !c.is_empty()) {
        if has_bucket_drift(cluster) {
            count.events += 1;
        }
        count.evaluated += 1;
    }
    count
}

/// Fraction of non-empty clusters whose runs disagree on any bucket.
pub fn compute_bucket_drift_rate(clusters: &[Cluster<'_>]) -> f64 {
    count_bucket_drifts(clusters).rate()
}
