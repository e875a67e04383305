//! Cross-run alignment by evidence overlap
//!
//! Greedy, incremental and order-dependent: each item joins the first
//! existing cluster holding any similar item, otherwise it starts a new one.
//! Overlap is not transitive (A ⊂ B and B ⊂ C without A ⊂ C), so different
//! run orders can legitimately produce different clusterings.

use super::{Cluster, Runs};
use crate::matcher::items_similar;
use crate::models::Item;

/// Align items across the runs of one journal.
///
/// Runs are visited in map order and items in run order. When an item lands
/// in a cluster that already has a member from the same run, the newer item
/// takes that run's slot.
pub fn align(runs: &Runs) -> Vec<Cluster<'_>> {
    let mut clusters: Vec<Cluster<'_>> = Vec::new();

    for (run_id, items) in runs {
        for item in items {
            match find_cluster(&clusters, item) {
                Some(idx) => {
                    if clusters[idx].insert(run_id, item).is_some() {
                        tracing::trace!(
                            "run {} matched cluster {} twice; keeping the later item",
                            run_id,
                            idx
                        );
                    }
                }
                None => clusters.push(Cluster::singleton(run_id, item)),
            }
        }
    }

    clusters
}

/// Index of the first cluster with any member similar to `item`.
fn find_cluster(clusters: &[Cluster<'_>], item: &Item) -> Option<usize> {
    clusters
        .iter()
        .position(|cluster| cluster.items().any(|existing| items_similar(existing, item)))
}
