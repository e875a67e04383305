//! Majority-vote aggregation of aligned clusters
//!
//! Each cluster becomes one stable item. A field is only asserted when a
//! strict majority of the runs that reported it agree; anything weaker
//! abstains as `"uncertain"`.

use super::Cluster;
use crate::models::{Consensus, Item, StableItem};
use std::collections::HashMap;
use std::hash::Hash;

/// Return the value held by a strict majority of `values`, else `Uncertain`.
///
/// Callers drop missing values before voting, so the majority is taken over
/// the values actually reported. Ties, plain pluralities and the empty list
/// all abstain.
pub fn majority_vote<T: Eq + Hash + Clone>(values: &[T]) -> Consensus<T> {
    let mut counts: HashMap<&T, usize> = HashMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }

    match counts.into_iter().max_by_key(|(_, count)| *count) {
        Some((value, count)) if count * 2 > values.len() => Consensus::Agreed(value.clone()),
        _ => Consensus::Uncertain,
    }
}

fn vote_on<T, F>(cluster: &Cluster<'_>, field: F) -> Consensus<T>
where
    T: Eq + Hash + Clone,
    F: Fn(&Item) -> Option<T>,
{
    let values: Vec<T> = cluster.items().filter_map(field).collect();
    majority_vote(&values)
}

/// Collapse one cluster into a stable item.
///
/// The first member is the template for domain, evidence span and any
/// pass-through fields. Polarity, time bucket and the domain-appropriate
/// bucket are each voted on independently.
pub fn aggregate_cluster(cluster: &Cluster<'_>) -> StableItem {
    let fallback = Item::default();
    let template = cluster.first().map(|(_, item)| item).unwrap_or(&fallback);

    let mut stable = StableItem::from_template(
        template,
        vote_on(cluster, |i| i.polarity),
        vote_on(cluster, |i| i.time_bucket),
    );

    if template.is_emotion() {
        stable.arousal_bucket = Some(vote_on(cluster, |i| i.arousal_bucket));
    } else {
        stable.intensity_bucket = Some(vote_on(cluster, |i| i.intensity_bucket));
    }

    stable
}

/// One stable item per cluster, in cluster order.
pub fn aggregate(clusters: &[Cluster<'_>]) -> Vec<StableItem> {
    clusters.iter().map(aggregate_cluster).collect()
}
